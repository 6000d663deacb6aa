// src/xrandr.rs - Display-configuration backend
//
// `DisplayBackend` is the seam between mode logic and the real tool. The
// binary drives `xrandr`; tests drive a simulated one (see `testing.rs`).

use std::process::Command;

use tracing::debug;

use crate::display::Resolution;
use crate::error::{Error, Result};

// ---- Requests ----

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    Origin,
    RightOf(String),
    SameAs(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Setting {
    Off,
    On {
        resolution: Resolution,
        placement: Placement,
        primary: bool,
        // None means identity scaling, which also clears a stale transform.
        scale_from: Option<Resolution>,
    },
}

/// Desired state for one output; one of these is one backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    pub output: String,
    pub setting: Setting,
}

impl OutputConfig {
    pub fn off(output: &str) -> Self {
        Self {
            output: output.to_string(),
            setting: Setting::Off,
        }
    }

    pub fn on(output: &str, resolution: Resolution, placement: Placement) -> Self {
        Self {
            output: output.to_string(),
            setting: Setting::On {
                resolution,
                placement,
                primary: false,
                scale_from: None,
            },
        }
    }

    pub fn primary(mut self) -> Self {
        if let Setting::On { primary, .. } = &mut self.setting {
            *primary = true;
        }
        self
    }

    pub fn scaled_from(mut self, source: Resolution) -> Self {
        if let Setting::On { scale_from, .. } = &mut self.setting {
            *scale_from = Some(source);
        }
        self
    }

    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec!["--output".to_string(), self.output.clone()];
        match &self.setting {
            Setting::Off => args.push("--off".to_string()),
            Setting::On {
                resolution,
                placement,
                primary,
                scale_from,
            } => {
                args.push("--mode".to_string());
                args.push(resolution.to_string());
                match placement {
                    Placement::Origin => args.extend(["--pos".to_string(), "0x0".to_string()]),
                    Placement::RightOf(other) => {
                        args.extend(["--right-of".to_string(), other.clone()])
                    }
                    Placement::SameAs(other) => {
                        args.extend(["--same-as".to_string(), other.clone()])
                    }
                }
                if *primary {
                    args.push("--primary".to_string());
                }
                match scale_from {
                    Some(source) => {
                        args.extend(["--scale-from".to_string(), source.to_string()])
                    }
                    None => args.extend(["--scale".to_string(), "1x1".to_string()]),
                }
            }
        }
        args
    }
}

// ---- Backend ----

pub trait DisplayBackend {
    /// Raw output listing, in `xrandr --query` format.
    fn query(&mut self) -> Result<String>;

    fn apply(&mut self, config: &OutputConfig) -> Result<()>;
}

pub struct Xrandr {
    program: String,
}

impl Default for Xrandr {
    fn default() -> Self {
        Self {
            program: "xrandr".to_string(),
        }
    }
}

impl Xrandr {
    fn run(&self, args: &[String]) -> Result<String> {
        debug!("{} {}", self.program, args.join(" "));

        let output = Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|source| Error::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(Error::Tool {
                program: self.program.clone(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

impl DisplayBackend for Xrandr {
    fn query(&mut self) -> Result<String> {
        self.run(&["--query".to_string()])
    }

    fn apply(&mut self, config: &OutputConfig) -> Result<()> {
        self.run(&config.to_args())?;
        Ok(())
    }
}

// ---- Tests ----
