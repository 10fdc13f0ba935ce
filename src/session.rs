use crate::{
    error::{AuthenticationFailedSnafu, MalformedResponseSnafu, Result, TransportSnafu},
    token::extract_tokens,
    transport::{build_client, read_json, Endpoints, HeldCookies, TransportConfig},
};
use log::{debug, info};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use snafu::{OptionExt, ResultExt};
use std::fmt;

pub const CLIENT_ID: &str = "play-valorant-web-prod";
pub const REDIRECT_URI: &str = "https://playvalorant.com/opt_in";
pub const RESPONSE_TYPE: &str = "token id_token";
pub const NONCE: &str = "1";

pub const ENTITLEMENTS_HEADER: &str = "X-Riot-Entitlements-JWT";

pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Deserialize)]
struct CredentialsAccepted {
    response: RedirectResponse,
}

#[derive(Deserialize)]
struct RedirectResponse {
    parameters: RedirectParameters,
}

#[derive(Deserialize)]
struct RedirectParameters {
    uri: String,
}

#[derive(Deserialize)]
struct EntitlementsResponse {
    entitlements_token: String,
}

/// A client bound to one account that has not completed the handshake yet.
pub struct AccountSession {
    client: Client,
    endpoints: Endpoints,
}

/// Terminal handshake state. Only this type can read or write preferences.
pub struct AuthenticatedSession {
    pub(crate) client: Client,
    pub(crate) endpoints: Endpoints,
    access_token: String,
    entitlements_token: String,
}

impl AccountSession {
    pub fn new(config: &TransportConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config)?,
            endpoints: config.endpoints.clone(),
        })
    }

    /// Runs authorize, credential submission, token extraction and entitlement
    /// exchange in order. The first failure ends the handshake.
    pub fn authenticate(self, credentials: &Credentials) -> Result<AuthenticatedSession> {
        info!("Authenticating {}", credentials.username);
        let mut cookies = self.request_authorization()?;
        let uri = self.submit_credentials(credentials, &mut cookies)?;
        let tokens = extract_tokens(&uri)?;
        debug!(
            "Extracted access token ({} chars) and id token ({} chars), expires in {:?}s",
            tokens.access_token.len(),
            tokens.id_token.len(),
            tokens.expires_in
        );
        let entitlements_token = self.request_entitlements(&tokens.access_token, &cookies)?;
        info!("Authenticated {}", credentials.username);
        Ok(AuthenticatedSession {
            client: self.client,
            endpoints: self.endpoints,
            access_token: tokens.access_token,
            entitlements_token,
        })
    }

    fn request_authorization(&self) -> Result<HeldCookies> {
        const STAGE: &str = "authorization request";
        let json = json!({
            "client_id": CLIENT_ID,
            "nonce": NONCE,
            "redirect_uri": REDIRECT_URI,
            "response_type": RESPONSE_TYPE,
        });
        let res = self
            .client
            .post(self.endpoints.authorization_url())
            .json(&json)
            .send()
            .context(TransportSnafu { stage: STAGE })?;
        let mut cookies = HeldCookies::default();
        cookies.capture(&res);
        debug!("{} returned {} ({} cookies)", STAGE, res.status(), cookies.len());
        Ok(cookies)
    }

    fn submit_credentials(
        &self,
        credentials: &Credentials,
        cookies: &mut HeldCookies,
    ) -> Result<String> {
        const STAGE: &str = "credential submission";
        let json = json!({
            "type": "auth",
            "username": credentials.username,
            "password": credentials.password,
        });
        let req = self.client.put(self.endpoints.authorization_url()).json(&json);
        let res = cookies
            .apply(req)
            .send()
            .context(TransportSnafu { stage: STAGE })?;
        cookies.capture(&res);

        let body: Value = read_json(res, STAGE)?;
        redirect_uri(body)
    }

    fn request_entitlements(&self, access_token: &str, cookies: &HeldCookies) -> Result<String> {
        const STAGE: &str = "entitlement exchange";
        let req = self
            .client
            .post(self.endpoints.entitlements_url())
            .bearer_auth(access_token);
        let res = cookies
            .apply(req)
            .send()
            .context(TransportSnafu { stage: STAGE })?;
        let body: EntitlementsResponse = read_json(res, STAGE)?;
        Ok(body.entitlements_token)
    }
}

/// Interprets the credential submission body: provider errors first, then the redirect.
fn redirect_uri(body: Value) -> Result<String> {
    const STAGE: &str = "credential submission";
    let object = body
        .as_object()
        .context(MalformedResponseSnafu {
            stage: STAGE,
            reason: "expected a JSON object",
        })?;
    if let Some(error) = object.get("error") {
        let reason = match error {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return AuthenticationFailedSnafu { reason }.fail();
    }
    let accepted: CredentialsAccepted = serde_json::from_value(body).map_err(|e| {
        MalformedResponseSnafu {
            stage: STAGE,
            reason: e.to_string(),
        }
        .build()
    })?;
    Ok(accepted.response.parameters.uri)
}

impl AuthenticatedSession {
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn entitlements_token(&self) -> &str {
        &self.entitlements_token
    }
}
