//! Confluence space types.

use serde::{Deserialize, Serialize};

/// Space summary as embedded in content and space listings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RawSpace {
    /// Space key.
    pub key: String,
    /// Display name.
    pub name: String,
}
