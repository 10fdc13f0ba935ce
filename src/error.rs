use snafu::Snafu;
use std::io;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    /// DNS, connect, TLS or body read failure on a single round trip.
    #[snafu(display("request failed during `{stage}`: {source}"))]
    Transport {
        source: reqwest::Error,
        stage: &'static str,
    },
    /// The identity provider rejected the credentials (bad password, MFA, rate limit).
    #[snafu(display("failed to authenticate: {reason}"))]
    AuthenticationFailed { reason: String },
    /// A response body was not the JSON shape the endpoint is expected to return.
    #[snafu(display("malformed response during `{stage}`: {reason}"))]
    MalformedResponse { stage: &'static str, reason: String },
    /// The redirect URI did not carry the expected token fragments.
    #[snafu(display("unable to match access token: {reason}"))]
    TokenExtractionFailed { reason: String },
    #[snafu(display("unable to resolve `{host}`: {source}"))]
    Resolve { source: io::Error, host: String },
}
