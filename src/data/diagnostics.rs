use std::fmt;

use serde::Serialize;

/// Severity of a user-visible load message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Warning,
    Error,
}

/// A non-fatal message produced while loading. Loaders never fail; they
/// return whatever data they could read plus a list of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
}

impl Diagnostic {
    /// Build a warning and log it.
    pub fn warning(message: impl Into<String>) -> Self {
        let message = message.into();
        log::warn!("{message}");
        Self {
            level: Level::Warning,
            message,
        }
    }

    /// Build an error and log it.
    pub fn error(message: impl Into<String>) -> Self {
        let message = message.into();
        log::error!("{message}");
        Self {
            level: Level::Error,
            message,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level {
            Level::Warning => write!(f, "⚠️ {}", self.message),
            Level::Error => write!(f, "❌ {}", self.message),
        }
    }
}
