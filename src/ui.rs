// src/ui.rs - User-facing notifications and the mode picker
//
// Notifications are best effort: a missing notification daemon is logged and
// otherwise ignored. The picker is any dmenu-compatible program (options on
// stdin, chosen line on stdout).

use std::io::Write;
use std::process::{Command, Stdio};

use tracing::{debug, warn};

use crate::error::{Error, Result};

pub trait Ui {
    fn notify(&mut self, text: &str);

    /// Index of the chosen option, or None if the user dismissed the prompt.
    fn select(&mut self, prompt: &str, options: &[String]) -> Result<Option<usize>>;
}

pub struct Desktop {
    pub menu_program: String,
}

impl Default for Desktop {
    fn default() -> Self {
        Self {
            menu_program: "rofi".to_string(),
        }
    }
}

impl Desktop {
    fn menu_args(&self, prompt: &str) -> Vec<String> {
        match self.menu_program.as_str() {
            "rofi" => vec!["-dmenu".into(), "-i".into(), "-p".into(), prompt.into()],
            _ => vec!["-i".into(), "-p".into(), prompt.into()],
        }
    }
}

impl Ui for Desktop {
    fn notify(&mut self, text: &str) {
        eprintln!("{text}");

        let status = Command::new("notify-send")
            .args(["--app-name=dispmode", "Display", text])
            .status();
        match status {
            Ok(s) if s.success() => {}
            Ok(s) => warn!("notify-send exited with {s}"),
            Err(e) => warn!("failed to run notify-send: {e}"),
        }
    }

    fn select(&mut self, prompt: &str, options: &[String]) -> Result<Option<usize>> {
        let spawn_err = |source| Error::Spawn {
            program: self.menu_program.clone(),
            source,
        };

        let mut child = Command::new(&self.menu_program)
            .args(self.menu_args(prompt))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(spawn_err)?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(options.join("\n").as_bytes())
                .map_err(spawn_err)?;
        }

        let output = child.wait_with_output().map_err(spawn_err)?;
        // dmenu and rofi exit nonzero when the prompt is dismissed.
        if !output.status.success() {
            debug!("{} dismissed", self.menu_program);
            return Ok(None);
        }

        let choice = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(options.iter().position(|o| *o == choice))
    }
}

// ---- Tests ----
