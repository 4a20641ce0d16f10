use anyhow::Context;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use tracing::warn;

use crate::config::GridConfig;

/// Encodes the full configuration snapshot as a URL-safe token.
pub fn encode(cfg: &GridConfig) -> anyhow::Result<String> {
    let json = serde_json::to_vec(cfg).context("failed to serialize configuration")?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

/// Decodes a share token back into a configuration. Malformed tokens are a
/// degenerate input, not an error: the failure is logged and `None`
/// returned so callers can fall back to their own configuration.
pub fn decode(token: &str) -> Option<GridConfig> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }

    let bytes = match URL_SAFE_NO_PAD.decode(token) {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(error = %err, "share token is not valid base64");
            return None;
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(cfg) => Some(cfg),
        Err(err) => {
            warn!(error = %err, "share token did not decode to a configuration");
            None
        }
    }
}

/// Editor link carrying the configuration.
pub fn share_url(base: &str, cfg: &GridConfig) -> anyhow::Result<String> {
    Ok(format!("{}?config={}", base.trim_end_matches('/'), encode(cfg)?))
}

/// Standalone-image link: same token, image view.
pub fn image_url(base: &str, cfg: &GridConfig) -> anyhow::Result<String> {
    Ok(format!(
        "{}?config={}&view=image",
        base.trim_end_matches('/'),
        encode(cfg)?
    ))
}
