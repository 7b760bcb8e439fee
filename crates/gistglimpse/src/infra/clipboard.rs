//! Clipboard integration for sharing preview links.

use std::io::Write;
use std::process::{Command, Stdio};
#[cfg(all(
    unix,
    not(any(target_os = "macos", target_os = "android", target_os = "emscripten"))
))]
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};

use crate::domain::model::GistId;

/// Build the shareable link for a gist under `base_url`.
pub fn share_link(base_url: &str, id: &GistId) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), id)
}

/// Clipboard backends in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Backend {
    /// Platform copy commands (`wl-copy`, `xclip`, `pbcopy`, ...).
    Commands,
    /// The in-process `arboard` clipboard.
    System,
}

/// X11 and Wayland selections are served by the owning process, so an in-process clipboard
/// loses its contents when the CLI exits. The copy commands fork a server that outlives us.
#[cfg(all(
    unix,
    not(any(target_os = "macos", target_os = "android", target_os = "emscripten"))
))]
fn backend_order() -> &'static [Backend] {
    &[Backend::Commands, Backend::System]
}

#[cfg(not(all(
    unix,
    not(any(target_os = "macos", target_os = "android", target_os = "emscripten"))
)))]
fn backend_order() -> &'static [Backend] {
    &[Backend::System, Backend::Commands]
}

/// System clipboard with platform command fallbacks.
pub struct Clipboard {
    primary: Option<arboard::Clipboard>,
}

impl Clipboard {
    pub fn new() -> Self {
        let primary = match arboard::Clipboard::new() {
            Ok(clipboard) => Some(clipboard),
            Err(err) => {
                tracing::debug!(error = %err, "system clipboard unavailable, using fallbacks");
                None
            }
        };
        Self { primary }
    }

    /// Copy `text` with the first backend that accepts it.
    pub fn copy(&mut self, text: &str) -> Result<()> {
        for backend in backend_order() {
            let result = match backend {
                Backend::Commands => command_copy(text),
                Backend::System => self.system_copy(text),
            };
            match result {
                Ok(()) => return Ok(()),
                Err(err) => tracing::debug!(?backend, error = %err, "clipboard backend failed"),
            }
        }

        Err(anyhow!("no clipboard backend accepted the text"))
    }

    fn system_copy(&mut self, text: &str) -> Result<()> {
        if let Some(primary) = self.primary.as_mut()
            && set_text(primary, text).is_ok()
        {
            return Ok(());
        }

        self.primary = None;
        Err(anyhow!("system clipboard rejected the text"))
    }

    /// Copy the share link for `id` and return it.
    pub fn copy_share_link(&mut self, base_url: &str, id: &GistId) -> Result<String> {
        let link = share_link(base_url, id);
        self.copy(&link)
            .with_context(|| format!("failed to copy share link {link}"))?;
        tracing::info!(link = %link, "copied share link to clipboard");
        Ok(link)
    }
}

impl Default for Clipboard {
    fn default() -> Self {
        Self::new()
    }
}

/// How long the process keeps serving the selection when no copy command was available.
#[cfg(all(
    unix,
    not(any(target_os = "macos", target_os = "android", target_os = "emscripten"))
))]
const SERVE_WINDOW: Duration = Duration::from_secs(10);

#[cfg(all(
    unix,
    not(any(target_os = "macos", target_os = "android", target_os = "emscripten"))
))]
fn set_text(clipboard: &mut arboard::Clipboard, text: &str) -> Result<(), arboard::Error> {
    use arboard::SetExtLinux;

    tracing::info!(
        seconds = SERVE_WINDOW.as_secs(),
        "holding the clipboard until another application takes it"
    );
    clipboard
        .set()
        .wait_until(Instant::now() + SERVE_WINDOW)
        .text(text.to_owned())
}

#[cfg(not(all(
    unix,
    not(any(target_os = "macos", target_os = "android", target_os = "emscripten"))
)))]
fn set_text(clipboard: &mut arboard::Clipboard, text: &str) -> Result<(), arboard::Error> {
    clipboard.set_text(text.to_owned())
}

fn command_copy(text: &str) -> Result<()> {
    for command in fallback_commands() {
        match pipe_to_command(command, text) {
            Ok(()) => return Ok(()),
            Err(err) => {
                tracing::debug!(command = command[0], error = %err, "clipboard command failed")
            }
        }
    }

    Err(anyhow!("no clipboard command accepted the text"))
}

fn pipe_to_command(command: &[&str], text: &str) -> Result<()> {
    let (program, args) = command
        .split_first()
        .context("clipboard command missing program")?;

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .spawn()
        .with_context(|| format!("failed to spawn clipboard command: {program}"))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(text.as_bytes())
            .context("failed to write clipboard contents")?;
    }

    let status = child
        .wait()
        .with_context(|| format!("clipboard command did not exit cleanly: {program}"))?;
    if status.success() {
        Ok(())
    } else {
        Err(anyhow!("clipboard command exited with status {status}"))
    }
}

#[cfg(target_os = "macos")]
fn fallback_commands() -> Vec<&'static [&'static str]> {
    vec![&["pbcopy"]]
}

#[cfg(all(unix, not(target_os = "macos")))]
fn fallback_commands() -> Vec<&'static [&'static str]> {
    vec![&["wl-copy"], &["xclip", "-selection", "clipboard"], &["xsel", "--clipboard", "--input"]]
}

#[cfg(target_os = "windows")]
fn fallback_commands() -> Vec<&'static [&'static str]> {
    vec![&["clip.exe"]]
}

#[cfg(not(any(unix, target_os = "windows")))]
fn fallback_commands() -> Vec<&'static [&'static str]> {
    Vec::new()
}
