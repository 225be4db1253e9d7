use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use super::constants::DEFAULT_GATEWAY_URL;
use crate::domain::errors::{GatewayError, GatewayResult};

const ENCODING: &str = "json";

/// Transport compression requested from the gateway.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    None,
    #[default]
    Zlib,
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Zlib => write!(f, "zlib"),
        }
    }
}

/// Where to connect and how the caller identifies itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectParams {
    pub url: String,
    pub user_id: Option<String>,
    pub compression: Compression,
}

impl ConnectParams {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            user_id: None,
            compression: Compression::default(),
        }
    }

    #[must_use]
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    #[must_use]
    pub const fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Builds the connect url with `user_id`, `encoding` and `compress` query
    /// parameters appended to any already present.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::InvalidUrl` if the base url does not parse or is
    /// not a `ws`/`wss` url.
    pub fn to_url(&self) -> GatewayResult<String> {
        let mut url =
            Url::parse(&self.url).map_err(|e| GatewayError::invalid_url(e.to_string()))?;

        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(GatewayError::invalid_url(format!(
                "unsupported scheme '{}'",
                url.scheme()
            )));
        }

        {
            let mut query = url.query_pairs_mut();
            if let Some(user_id) = &self.user_id {
                query.append_pair("user_id", user_id);
            }
            query.append_pair("encoding", ENCODING);
            if self.compression == Compression::Zlib {
                query.append_pair("compress", "zlib");
            }
        }

        Ok(url.into())
    }
}

impl Default for ConnectParams {
    fn default() -> Self {
        Self::new(DEFAULT_GATEWAY_URL)
    }
}
