use crate::error::{Result, TokenExtractionFailedSnafu};
use regex::Regex;
use snafu::{ensure, OptionExt};

const TOKEN_PATTERN: &str =
    r"access_token=([A-Za-z0-9._-]*).*id_token=([A-Za-z0-9._-]*).*expires_in=([0-9]*)";

/// Tokens carried in the fragment of the identity provider's redirect URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSet {
    pub access_token: String,
    pub id_token: String,
    pub expires_in: Option<u64>,
}

/// Pulls `access_token`, `id_token` and `expires_in` out of a redirect URI such as
/// `https://playvalorant.com/opt_in#access_token=...&id_token=...&expires_in=3600`.
///
/// The three fragments must appear in that order; any of them may be empty.
pub fn extract_tokens(uri: &str) -> Result<TokenSet> {
    let re = Regex::new(TOKEN_PATTERN).expect("token pattern is a valid regex");
    let captures = re.captures(uri).context(TokenExtractionFailedSnafu {
        reason: "redirect uri has no token fragment",
    })?;
    ensure!(
        captures.len() == 4,
        TokenExtractionFailedSnafu {
            reason: format!("expected 3 captured groups, got {}", captures.len() - 1),
        }
    );
    let group = |i: usize| captures.get(i).map_or("", |m| m.as_str());

    Ok(TokenSet {
        access_token: group(1).to_string(),
        id_token: group(2).to_string(),
        expires_in: group(3).parse().ok(),
    })
}
