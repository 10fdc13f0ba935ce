use crate::error::{MalformedResponseSnafu, ResolveSnafu, Result, TransportSnafu};
use log::{debug, warn};
use reqwest::{
    blocking::{Client, RequestBuilder, Response},
    header::{HeaderMap, HeaderValue, CONTENT_TYPE, COOKIE},
    Url,
};
use serde::de::DeserializeOwned;
use snafu::ResultExt;
use std::{
    collections::BTreeMap,
    io,
    net::{SocketAddr, ToSocketAddrs},
};

pub const USER_AGENT: &str =
    "RiotClient/43.0.1.4195386.4190634 rso-auth (Windows;10;;Professional, x64)";

/// Base URLs of the three services the handshake and settings calls talk to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub auth: String,
    pub entitlements: String,
    pub preferences: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            auth: "https://auth.riotgames.com".to_string(),
            entitlements: "https://entitlements.auth.riotgames.com".to_string(),
            preferences: "https://playerpreferences.riotgames.com".to_string(),
        }
    }
}

impl Endpoints {
    /// Points every service at the same base URL.
    #[cfg(test)]
    pub fn uniform(base: &str) -> Self {
        Self {
            auth: base.to_string(),
            entitlements: base.to_string(),
            preferences: base.to_string(),
        }
    }

    pub fn authorization_url(&self) -> String {
        format!("{}/api/v1/authorization", self.auth)
    }

    pub fn entitlements_url(&self) -> String {
        format!("{}/api/token/v1", self.entitlements)
    }

    pub fn get_preference_url(&self, key: &str) -> String {
        format!("{}/playerPref/v3/getPreference/{}", self.preferences, key)
    }

    pub fn save_preference_url(&self) -> String {
        format!("{}/playerPref/v3/savePreference", self.preferences)
    }

    fn bases(&self) -> [&str; 3] {
        [&self.auth, &self.entitlements, &self.preferences]
    }
}

#[derive(Debug, Clone, Default)]
pub struct TransportConfig {
    pub endpoints: Endpoints,
    /// Skip TLS certificate verification.
    pub insecure: bool,
    /// Resolve every endpoint host once and pin the client to that address.
    pub pin_dns: bool,
}

pub fn build_client(config: &TransportConfig) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    let mut builder = Client::builder()
        .default_headers(headers)
        .user_agent(USER_AGENT);
    if config.insecure {
        warn!("TLS certificate verification is disabled");
        builder = builder.danger_accept_invalid_certs(true);
    }
    if config.pin_dns {
        for (host, addr) in pinned_addresses(&config.endpoints)? {
            debug!("Pinning {} to {}", host, addr);
            builder = builder.resolve(&host, addr);
        }
    }
    builder.build().context(TransportSnafu {
        stage: "client construction",
    })
}

/// Resolves each distinct endpoint domain, preferring its first IPv4 address.
/// IP literals need no pin.
pub fn pinned_addresses(endpoints: &Endpoints) -> Result<Vec<(String, SocketAddr)>> {
    let mut pins: Vec<(String, SocketAddr)> = Vec::new();
    for base in endpoints.bases().iter() {
        let url = Url::parse(base)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))
            .context(ResolveSnafu { host: *base })?;
        let domain = match url.domain() {
            Some(domain) => domain,
            None => continue,
        };
        if pins.iter().any(|(host, _)| host == domain) {
            continue;
        }
        let port = url.port_or_known_default().unwrap_or(443);
        let addrs: Vec<SocketAddr> = (domain, port)
            .to_socket_addrs()
            .context(ResolveSnafu { host: domain })?
            .collect();
        let addr = addrs
            .iter()
            .find(|addr| addr.is_ipv4())
            .or_else(|| addrs.first())
            .copied()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no addresses returned"))
            .context(ResolveSnafu { host: domain })?;
        pins.push((domain.to_string(), addr));
    }
    Ok(pins)
}

/// Cookies handed out by the identity provider, replayed on the next handshake step.
#[derive(Debug, Default, Clone)]
pub struct HeldCookies(BTreeMap<String, String>);

impl HeldCookies {
    /// Merges the response's `Set-Cookie` values over the ones already held.
    pub fn capture(&mut self, response: &Response) {
        for cookie in response.cookies() {
            self.0
                .insert(cookie.name().to_string(), cookie.value().to_string());
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn header_value(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        let pairs: Vec<String> = self
            .0
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect();
        Some(pairs.join("; "))
    }

    pub fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self.header_value() {
            Some(value) => request.header(COOKIE, value),
            None => request,
        }
    }
}

/// Reads the body and decodes it as `T`, whatever the status code.
pub fn read_json<T: DeserializeOwned>(response: Response, stage: &'static str) -> Result<T> {
    let status = response.status();
    let body = response.text().context(TransportSnafu { stage })?;
    debug!("{} responded {} ({} bytes)", stage, status, body.len());
    serde_json::from_str(&body).map_err(|e| {
        MalformedResponseSnafu {
            stage,
            reason: format!("{} (http status {})", e, status),
        }
        .build()
    })
}
