//! Controller configuration.
//!
//! Hosts usually build [`AlignConfig`] from their component props. It can
//! also be read from JSON using the host's camelCase keys:
//!
//! ```json
//! {
//!   "align": { "points": ["bc", "tc"], "offset": [0, 4], "overflow": { "adjustY": true } },
//!   "monitorBufferTime": 50,
//!   "monitorWindowResize": true
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::AlignError;
use crate::types::AlignmentSpec;

/// Everything about a controller except its target and source.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlignConfig {
    pub align: AlignmentSpec,
    /// Cooldown window in milliseconds. 0 realigns on every trigger.
    pub monitor_buffer_time: u64,
    /// Realign on window resize.
    pub monitor_window_resize: bool,
    pub disabled: bool,
}

impl AlignConfig {
    /// Parse a configuration from JSON. Missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self, AlignError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, AlignError> {
        Ok(serde_json::to_string(self)?)
    }
}
