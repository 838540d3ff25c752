//! Editing entry text in an external editor

use crate::error::{Result, TdiaryError};
use std::io::Write;
use tokio::process::Command;

/// Runs the configured editor on a scratch file and reads the result back
pub struct EditorSession {
    command: String,
}

impl EditorSession {
    pub fn new(editor_command: String) -> Self {
        EditorSession {
            command: editor_command,
        }
    }

    /// Open `initial` in the editor, wait for it to exit, and return the saved text.
    pub async fn edit_text(&self, initial: &str) -> Result<String> {
        let mut scratch = tempfile::Builder::new()
            .prefix("tdiary-")
            .suffix(".md")
            .tempfile()?;
        scratch.write_all(initial.as_bytes())?;
        scratch.flush()?;

        let (program, args) = self.parse_command();
        let status = self
            .command_for(&program)
            .args(&args)
            .arg(scratch.path())
            .status()
            .await
            .map_err(|e| {
                TdiaryError::Editor(format!("Failed to launch editor '{}': {}", program, e))
            })?;

        if !status.success() {
            return Err(TdiaryError::Editor(format!(
                "Editor '{}' exited with {}; entry left unchanged",
                program, status
            )));
        }

        Ok(tokio::fs::read_to_string(scratch.path()).await?)
    }

    #[cfg(windows)]
    fn command_for(&self, program: &str) -> Command {
        // cmd /C finds .bat and .cmd editors
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").arg(program);
        cmd
    }

    #[cfg(not(windows))]
    fn command_for(&self, program: &str) -> Command {
        Command::new(program)
    }

    /// Split the command into program and arguments
    fn parse_command(&self) -> (String, Vec<String>) {
        let mut parts = self.command.split_whitespace();

        match parts.next() {
            Some(program) => (program.to_string(), parts.map(str::to_string).collect()),
            None if cfg!(windows) => ("notepad".to_string(), Vec::new()),
            None => ("vi".to_string(), Vec::new()),
        }
    }
}
