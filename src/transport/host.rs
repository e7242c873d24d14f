//! Host commands that hand a script file to InDesign.

use std::{path::Path, process::Stdio, time::Duration};

use async_trait::async_trait;
use tokio::{process::Command, time::timeout};

use super::ScriptHost;
use crate::error::TransportError;

const SCRIPT_PATH: &str = "{{script_path}}";

/// `osascript` telling InDesign to activate and `do script` the file as JavaScript.
#[derive(Debug, Clone)]
pub struct OsascriptHost {
    program: String,
    app: String,
}

impl OsascriptHost {
    pub fn new(program: impl Into<String>, app: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            app: app.into(),
        }
    }

    /// AppleScript source lines, one per `-e`.
    pub fn applescript(&self, script: &Path) -> Vec<String> {
        let path = script.to_string_lossy();
        vec![
            format!("tell application {}", applescript_string(&self.app)),
            "activate".to_string(),
            format!(
                "do script (POSIX file {}) language javascript",
                applescript_string(&path)
            ),
            "end tell".to_string(),
        ]
    }
}

#[async_trait]
impl ScriptHost for OsascriptHost {
    fn program(&self) -> &str {
        &self.program
    }

    async fn run(&self, script: &Path, limit: Duration) -> Result<String, TransportError> {
        let mut cmd = Command::new(&self.program);
        for line in self.applescript(script) {
            cmd.arg("-e").arg(line);
        }
        run_bounded(cmd, &self.program, limit).await
    }
}

/// Arbitrary program with an argument template; `{{script_path}}` is replaced
/// by the scratch file path, which is appended when no argument mentions it.
#[derive(Debug, Clone)]
pub struct CommandHost {
    program: String,
    args_template: Vec<String>,
}

impl CommandHost {
    pub fn new(program: impl Into<String>, args_template: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args_template,
        }
    }

    pub fn args(&self, script: &Path) -> Vec<String> {
        let path = script.to_string_lossy();
        let mut args: Vec<String> = self
            .args_template
            .iter()
            .map(|t| t.replace(SCRIPT_PATH, &path))
            .collect();
        if !self.args_template.iter().any(|t| t.contains(SCRIPT_PATH)) {
            args.push(path.into_owned());
        }
        args
    }
}

#[async_trait]
impl ScriptHost for CommandHost {
    fn program(&self) -> &str {
        &self.program
    }

    async fn run(&self, script: &Path, limit: Duration) -> Result<String, TransportError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.args(script));
        run_bounded(cmd, &self.program, limit).await
    }
}

/// Quote `text` as an AppleScript string literal.
pub fn applescript_string(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Spawn `cmd`, wait at most `limit`, and return stdout on a zero exit.
/// Dropping the wait on timeout kills the child.
async fn run_bounded(
    mut cmd: Command,
    program: &str,
    limit: Duration,
) -> Result<String, TransportError> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let spawn_err = |source| TransportError::Spawn {
        program: program.to_string(),
        source,
    };
    let child = cmd.spawn().map_err(spawn_err)?;
    let out = timeout(limit, child.wait_with_output())
        .await
        .map_err(|_| TransportError::Timeout(limit))?
        .map_err(spawn_err)?;

    let stdout = String::from_utf8_lossy(&out.stdout).into_owned();
    if out.status.success() {
        return Ok(stdout);
    }

    let stderr = String::from_utf8_lossy(&out.stderr).trim().to_string();
    let diagnostic = if !stderr.is_empty() {
        stderr
    } else if !stdout.trim().is_empty() {
        stdout.trim().to_string()
    } else {
        "no output".to_string()
    };
    let status = match out.status.code() {
        Some(code) => format!("code {}", code),
        None => "a signal".to_string(),
    };
    Err(TransportError::Exit {
        program: program.to_string(),
        status,
        diagnostic,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn applescript_quotes_app_and_path() {
        let host = OsascriptHost::new("osascript", "Adobe InDesign 2025");
        let lines = host.applescript(&PathBuf::from("/tmp/a \"b\"/x.jsx"));
        assert_eq!(
            lines,
            vec![
                "tell application \"Adobe InDesign 2025\"".to_string(),
                "activate".to_string(),
                "do script (POSIX file \"/tmp/a \\\"b\\\"/x.jsx\") language javascript".to_string(),
                "end tell".to_string(),
            ]
        );
    }

    #[test]
    fn command_args_substitute_or_append_path() {
        let path = PathBuf::from("/tmp/s.jsx");
        let host = CommandHost::new("sh", vec!["-c".into(), "cat \"$0\"".into(), SCRIPT_PATH.into()]);
        assert_eq!(host.args(&path), vec!["-c", "cat \"$0\"", "/tmp/s.jsx"]);

        let host = CommandHost::new("cat", vec![]);
        assert_eq!(host.args(&path), vec!["/tmp/s.jsx"]);
    }
}
