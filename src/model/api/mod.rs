//! Request and response bodies of the HTTP API.
//!
//! Fields are serialised in camelCase, matching the election data file.

use serde::{Deserialize, Serialize};

pub mod admin;
pub mod voter;

/// Reply to a mutation that has no other data to return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    pub success: bool,
    pub message: String,
}

impl ActionResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
