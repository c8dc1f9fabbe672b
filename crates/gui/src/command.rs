//! JSON command protocol for scripted and agent-driven sessions.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::fixtures;
use crate::harness::TestHarness;
use crate::interaction::Action;
use crate::normalize::ImageSource;

/// A command the agent can execute against a headless customizer.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum AgentCommand {
    RotateLeft,
    RotateRight,
    PointerEnter,
    PointerLeave,
    /// Upload an image file from disk
    Upload { path: PathBuf },
    /// Upload a generated solid-color PNG
    UploadColor {
        name: String,
        rgba: [u8; 4],
    },
    /// Upload a HEIC-labelled source (goes through the converter)
    UploadHeic { name: String },
    /// Run simulated frames
    Tick { seconds: f32 },
    /// Wait for all uploads and decodes
    Settle,
    /// Report the current view state
    Inspect,
}

/// Response from executing a command.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl CommandResponse {
    fn ok() -> Self {
        Self {
            success: true,
            error: None,
            data: None,
        }
    }

    fn ok_with_data(data: serde_json::Value) -> Self {
        Self {
            success: true,
            error: None,
            data: Some(data),
        }
    }

    fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(msg.into()),
            data: None,
        }
    }
}

/// Execute a single command on the harness.
pub fn execute_command(harness: &mut TestHarness, cmd: AgentCommand) -> CommandResponse {
    match cmd {
        AgentCommand::RotateLeft => dispatch(harness, Action::RotateLeft),
        AgentCommand::RotateRight => dispatch(harness, Action::RotateRight),
        AgentCommand::PointerEnter => dispatch(harness, Action::PointerEnter),
        AgentCommand::PointerLeave => dispatch(harness, Action::PointerLeave),

        AgentCommand::Upload { path } => match harness.upload_path(path) {
            Some(seq) => CommandResponse::ok_with_data(serde_json::json!({ "seq": seq })),
            None => CommandResponse::err("upload was not submitted"),
        },

        AgentCommand::UploadColor { name, rgba } => {
            let seq = harness.upload(ImageSource::new(
                name,
                "image/png",
                fixtures::png_bytes(4, 4, rgba),
            ));
            CommandResponse::ok_with_data(serde_json::json!({ "seq": seq }))
        }

        AgentCommand::UploadHeic { name } => {
            let seq = harness.upload_heic(&name);
            CommandResponse::ok_with_data(serde_json::json!({ "seq": seq }))
        }

        AgentCommand::Tick { seconds } => {
            if !seconds.is_finite() || seconds < 0.0 {
                return CommandResponse::err(format!("invalid tick duration: {seconds}"));
            }
            harness.tick(seconds);
            CommandResponse::ok()
        }

        AgentCommand::Settle => {
            harness.settle();
            match harness.snapshot().last_error {
                Some(error) => CommandResponse::err(error),
                None => CommandResponse::ok(),
            }
        }

        AgentCommand::Inspect => match serde_json::to_value(harness.snapshot()) {
            Ok(data) => CommandResponse::ok_with_data(data),
            Err(e) => CommandResponse::err(format!("snapshot serialization failed: {e}")),
        },
    }
}

fn dispatch(harness: &mut TestHarness, action: Action) -> CommandResponse {
    harness.dispatch(action);
    CommandResponse::ok_with_data(serde_json::json!({ "angle": harness.angle() }))
}

/// Parse and execute a single JSON command string.
pub fn execute_json(harness: &mut TestHarness, json: &str) -> Result<CommandResponse, String> {
    let cmd: AgentCommand =
        serde_json::from_str(json).map_err(|e| format!("Invalid command JSON: {e}"))?;
    Ok(execute_command(harness, cmd))
}

/// Parse and execute multiple JSON commands (array).
pub fn execute_json_batch(
    harness: &mut TestHarness,
    json: &str,
) -> Result<Vec<CommandResponse>, String> {
    let cmds: Vec<AgentCommand> =
        serde_json::from_str(json).map_err(|e| format!("Invalid commands JSON: {e}"))?;
    Ok(cmds
        .into_iter()
        .map(|cmd| execute_command(harness, cmd))
        .collect())
}
