use crate::{
    error::{Result, TransportSnafu},
    session::{AuthenticatedSession, ENTITLEMENTS_HEADER},
    transport::read_json,
};
use log::{debug, info};
use reqwest::blocking::RequestBuilder;
use serde::{Deserialize, Serialize};
use snafu::ResultExt;

pub const PLAYER_SETTINGS: &str = "Ares.PlayerSettings";

#[derive(Deserialize)]
struct PreferenceResponse {
    data: String,
}

#[derive(Serialize)]
struct SavePreference<'a> {
    data: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    /// The destination echoed back exactly the blob read from the source.
    Transferred,
    Mismatch,
}

impl TransferOutcome {
    pub fn is_success(self) -> bool {
        self == TransferOutcome::Transferred
    }
}

impl AuthenticatedSession {
    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        req.bearer_auth(self.access_token())
            .header(ENTITLEMENTS_HEADER, self.entitlements_token())
    }

    /// Reads the serialized player settings blob, verbatim.
    pub fn get_settings(&self) -> Result<String> {
        const STAGE: &str = "settings read";
        let url = self.endpoints.get_preference_url(PLAYER_SETTINGS);
        let res = self
            .authorize(self.client.get(url))
            .send()
            .context(TransportSnafu { stage: STAGE })?;
        let body: PreferenceResponse = read_json(res, STAGE)?;
        debug!("Read {} bytes of settings", body.data.len());
        Ok(body.data)
    }

    /// Saves `blob` and returns the `data` value the service echoes back.
    pub fn set_settings(&self, blob: &str) -> Result<String> {
        const STAGE: &str = "settings write";
        let json = SavePreference {
            data: blob,
            kind: PLAYER_SETTINGS,
        };
        let res = self
            .authorize(self.client.put(self.endpoints.save_preference_url()))
            .json(&json)
            .send()
            .context(TransportSnafu { stage: STAGE })?;
        let body: PreferenceResponse = read_json(res, STAGE)?;
        debug!("Service echoed {} bytes of settings", body.data.len());
        Ok(body.data)
    }
}

/// Copies the settings blob from `source` to `destination`. Success means the
/// destination's echo equals the source blob byte for byte; nothing stronger is checked.
pub fn transfer(
    source: &AuthenticatedSession,
    destination: &AuthenticatedSession,
) -> Result<TransferOutcome> {
    let blob = source.get_settings()?;
    let echoed = destination.set_settings(&blob)?;
    let outcome = if blob == echoed {
        TransferOutcome::Transferred
    } else {
        TransferOutcome::Mismatch
    };
    info!("Settings transfer finished: {:?}", outcome);
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::session::tests::{credentials, mock_handshake, session_for, setup_logger};
    use mockito::{Matcher, Server, ServerGuard};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const GET_PATH: &str = "/playerPref/v3/getPreference/Ares.PlayerSettings";
    const SAVE_PATH: &str = "/playerPref/v3/savePreference";

    fn authenticated(server: &mut ServerGuard, username: &str) -> AuthenticatedSession {
        let _handshake = mock_handshake(server, username, "AAA111", "ENT.JWT");
        session_for(server).authenticate(&credentials(username)).unwrap()
    }

    fn mock_read(server: &mut ServerGuard, blob: &str, hits: usize) -> mockito::Mock {
        server
            .mock("GET", GET_PATH)
            .expect(hits)
            .match_header("authorization", "Bearer AAA111")
            .match_header("x-riot-entitlements-jwt", "ENT.JWT")
            .with_body(json!({ "type": PLAYER_SETTINGS, "data": blob }).to_string())
            .create()
    }

    fn mock_echo(server: &mut ServerGuard, expected: &str, echoed: &str) -> mockito::Mock {
        server
            .mock("PUT", SAVE_PATH)
            .match_header("authorization", "Bearer AAA111")
            .match_header("x-riot-entitlements-jwt", "ENT.JWT")
            .match_body(Matcher::Json(
                json!({ "data": expected, "type": "Ares.PlayerSettings" }),
            ))
            .with_body(json!({ "type": PLAYER_SETTINGS, "data": echoed }).to_string())
            .create()
    }

    #[test]
    fn get_settings_returns_data_verbatim() {
        setup_logger();
        let mut server = Server::new();
        let session = authenticated(&mut server, "source");
        let mock = mock_read(&mut server, "eJyrVkrLz1eyUkpKLFKqBQAdegQ0", 1);

        assert_eq!(session.get_settings().unwrap(), "eJyrVkrLz1eyUkpKLFKqBQAdegQ0");
        mock.assert();
    }

    #[test]
    fn get_settings_without_data_is_malformed() {
        setup_logger();
        let mut server = Server::new();
        let session = authenticated(&mut server, "source");
        let _mock = server
            .mock("GET", GET_PATH)
            .with_status(404)
            .with_body(r#"{"errorCode": "RESOURCE_NOT_FOUND"}"#)
            .create();

        let err = session.get_settings().unwrap_err();
        assert!(matches!(err, Error::MalformedResponse { stage: "settings read", .. }));
    }

    #[test]
    fn set_then_get_round_trips() {
        setup_logger();
        let mut server = Server::new();
        let session = authenticated(&mut server, "source");
        let blob = "eJyrVkrLz1eyUkpKLFKqBQAdegQ0";
        let read = mock_read(&mut server, blob, 2);
        let write = mock_echo(&mut server, blob, blob);

        let first = session.get_settings().unwrap();
        let echoed = session.set_settings(&first).unwrap();
        let second = session.get_settings().unwrap();

        assert_eq!(echoed, first);
        assert_eq!(second, first);
        read.assert();
        write.assert();
    }

    #[test]
    fn transfer_succeeds_when_echo_matches() {
        setup_logger();
        for blob in &["eJyrVkrLz1eyUkpKLFKqBQAdegQ0", "", "réglages ✓ 設定"] {
            let mut source_server = Server::new();
            let mut dest_server = Server::new();
            let source = authenticated(&mut source_server, "source");
            let destination = authenticated(&mut dest_server, "destination");
            let read = mock_read(&mut source_server, blob, 1);
            let write = mock_echo(&mut dest_server, blob, blob);

            let outcome = transfer(&source, &destination).unwrap();

            assert_eq!(outcome, TransferOutcome::Transferred);
            assert!(outcome.is_success());
            read.assert();
            write.assert();
        }
    }

    #[test]
    fn transfer_reports_mismatch_when_echo_differs() {
        setup_logger();
        let mut source_server = Server::new();
        let mut dest_server = Server::new();
        let source = authenticated(&mut source_server, "source");
        let destination = authenticated(&mut dest_server, "destination");
        let _read = mock_read(&mut source_server, "new-settings", 1);
        let _write = mock_echo(&mut dest_server, "new-settings", "old-settings");

        let outcome = transfer(&source, &destination).unwrap();

        assert_eq!(outcome, TransferOutcome::Mismatch);
        assert!(!outcome.is_success());
    }

    #[test]
    fn failed_read_skips_the_write() {
        setup_logger();
        let mut source_server = Server::new();
        let mut dest_server = Server::new();
        let source = authenticated(&mut source_server, "source");
        let destination = authenticated(&mut dest_server, "destination");
        let _read = source_server
            .mock("GET", GET_PATH)
            .with_body(r#"{"data": null}"#)
            .create();
        let write = dest_server.mock("PUT", SAVE_PATH).expect(0).create();

        let err = transfer(&source, &destination).unwrap_err();

        assert!(matches!(err, Error::MalformedResponse { .. }));
        write.assert();
    }
}
