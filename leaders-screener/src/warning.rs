//! Non-fatal problems surfaced to the user after an operation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A recovered failure tied to one symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub symbol: String,
    pub message: String,
}

impl Warning {
    pub fn new(symbol: impl Into<String>, message: impl fmt::Display) -> Self {
        Self {
            symbol: symbol.into(),
            message: message.to_string(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.symbol, self.message)
    }
}
