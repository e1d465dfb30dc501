use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Client platform assignments are requested for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Calypso,
    #[serde(rename = "woocommerceandroid")]
    WooCommerceAndroid,
    #[serde(rename = "wpandroid")]
    WordPressAndroid,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown platform: {0}")]
pub struct PlatformParseError(pub String);

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Calypso => "calypso",
            Platform::WooCommerceAndroid => "woocommerceandroid",
            Platform::WordPressAndroid => "wpandroid",
        }
    }
}

impl FromStr for Platform {
    type Err = PlatformParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "calypso" => Ok(Platform::Calypso),
            "woocommerceandroid" => Ok(Platform::WooCommerceAndroid),
            "wpandroid" => Ok(Platform::WordPressAndroid),
            other => Err(PlatformParseError(other.to_string())),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
