//! ESI connection configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EsiConfig {
    /// API root; requests go to `{base_url}/v1/markets/...`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Sent on every request; ESI asks clients to identify themselves.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Whole-request timeout.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

fn default_base_url() -> String {
    "https://esi.evetech.net".into()
}

fn default_user_agent() -> String {
    format!("marketsync/{}", env!("CARGO_PKG_VERSION"))
}

const fn default_timeout_ms() -> u64 {
    15_000
}

const fn default_connect_timeout_ms() -> u64 {
    5_000
}

impl Default for EsiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}
