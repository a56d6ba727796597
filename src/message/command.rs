/*!
 * Lifecycle Commands
 * Strongly-typed command and response payloads for the lifecycle protocol
 */

use crate::core::types::{AppId, Pid};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Application model hosted by an isolate
///
/// One container implementation exists per model. Unknown model names are
/// fatal at the isolate-process entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppModel {
    Midlet,
    Xlet,
    Main,
}

impl AppModel {
    /// Parse a model name as passed on the isolate-process command line
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "MIDLET" => Some(Self::Midlet),
            "XLET" => Some(Self::Xlet),
            "MAIN" => Some(Self::Main),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Midlet => "MIDLET",
            Self::Xlet => "XLET",
            Self::Main => "MAIN",
        }
    }
}

impl fmt::Display for AppModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application descriptor, opaque to the lifecycle runtime
///
/// Carried through start commands and handed to the container unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AppDescriptor {
    pub model: AppModel,
    pub title: String,
    pub main_class: String,
}

impl AppDescriptor {
    #[must_use]
    pub fn new(model: AppModel, title: impl Into<String>, main_class: impl Into<String>) -> Self {
        Self {
            model,
            title: title.into(),
            main_class: main_class.into(),
        }
    }
}

/// Lifecycle command sent from the executive to an isolate, or (for
/// `IsolateInitialized`) from an isolate to the executive
///
/// Tagged variants replace the reference design's string-encoded argument
/// lists, so there is no numeric-parse edge case on the receive side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleCommand {
    StartApp {
        app: AppDescriptor,
        args: Vec<String>,
    },
    PauseApp {
        app_id: AppId,
    },
    ResumeApp {
        app_id: AppId,
    },
    DestroyApp {
        app_id: AppId,
        unconditional: bool,
    },
    IsolateInitialized {
        isolate_id: Pid,
    },
}

impl LifecycleCommand {
    /// Command name for logging
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::StartApp { .. } => "start_app",
            Self::PauseApp { .. } => "pause_app",
            Self::ResumeApp { .. } => "resume_app",
            Self::DestroyApp { .. } => "destroy_app",
            Self::IsolateInitialized { .. } => "isolate_initialized",
        }
    }
}

/// Response to a lifecycle command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleResponse {
    /// Start succeeded; carries the container-assigned application id
    Started { app_id: AppId },
    /// Command executed successfully
    Completed,
    /// Application-level failure (container refusal, unknown app id, ...)
    Failed { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_model_parse() {
        assert_eq!(AppModel::parse("MIDLET"), Some(AppModel::Midlet));
        assert_eq!(AppModel::parse("midlet"), Some(AppModel::Midlet));
        assert_eq!(AppModel::parse("Xlet"), Some(AppModel::Xlet));
        assert_eq!(AppModel::parse("MAIN"), Some(AppModel::Main));
        assert_eq!(AppModel::parse("APPLET"), None);
        assert_eq!(AppModel::parse(""), None);
    }

    #[test]
    fn test_pause_command_round_trip() {
        // The app id must survive encoding exactly, with no truncation or
        // locale-dependent parsing.
        let command = LifecycleCommand::PauseApp { app_id: 17 };
        let bytes = bincode::serialize(&command).unwrap();
        let decoded: LifecycleCommand = bincode::deserialize(&bytes).unwrap();
        assert_eq!(decoded, LifecycleCommand::PauseApp { app_id: 17 });
    }

    #[test]
    fn test_start_command_round_trip() {
        let command = LifecycleCommand::StartApp {
            app: AppDescriptor::new(AppModel::Midlet, "demo", "com.example.Foo"),
            args: vec!["com.example.Foo".to_string()],
        };
        let bytes = bincode::serialize(&command).unwrap();
        let decoded: LifecycleCommand = bincode::deserialize(&bytes).unwrap();
        assert_eq!(decoded, command);
    }

    #[test]
    fn test_destroy_flag_round_trip() {
        let command = LifecycleCommand::DestroyApp {
            app_id: 3,
            unconditional: true,
        };
        let bytes = bincode::serialize(&command).unwrap();
        let decoded: LifecycleCommand = bincode::deserialize(&bytes).unwrap();
        assert_eq!(decoded, command);
    }
}
