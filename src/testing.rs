// src/testing.rs - Test doubles: a simulated xrandr and a recording UI

use crate::config::{Config, Roles};
use crate::display::{self, Directory, Position, Resolution};
use crate::error::{Error, Result};
use crate::ui::Ui;
use crate::xrandr::{DisplayBackend, OutputConfig, Placement, Setting};

pub fn roles(directory: &Directory) -> Roles {
    Config::new(Some("eDP1".to_string()), None)
        .unwrap()
        .roles(directory)
}

#[derive(Debug, Clone)]
struct FakeOutput {
    name: String,
    connected: bool,
    primary: bool,
    modes: Vec<Resolution>,
    preferred: Option<Resolution>,
    // Applied mode, its offset, and the area it covers after scaling.
    current: Option<(Resolution, Position, Resolution)>,
}

/// Keeps output state in memory, renders it as an `xrandr --query` listing,
/// and updates it from `OutputConfig`s the way xrandr would.
pub struct FakeXrandr {
    outputs: Vec<FakeOutput>,
    pub calls: usize,
    pub fail_on: Option<String>,
}

impl FakeXrandr {
    pub fn from_listing(listing: &str) -> Self {
        let outputs = Directory::parse(listing)
            .outputs()
            .map(|o| FakeOutput {
                name: o.identifier.clone(),
                connected: o.is_connected(),
                primary: o.is_primary,
                modes: o.available_resolutions.clone(),
                preferred: o.preferred_resolution,
                current: o
                    .current_resolution
                    .map(|r| (r, o.position.unwrap_or_default(), o.area.unwrap_or(r))),
            })
            .collect();

        Self {
            outputs,
            calls: 0,
            fail_on: None,
        }
    }

    pub fn snapshot(&mut self) -> Directory {
        display::snapshot(self).unwrap()
    }

    fn find(&self, name: &str) -> Result<&FakeOutput> {
        self.outputs
            .iter()
            .find(|o| o.name == name)
            .ok_or_else(|| rejected(format!("warning: output {name} not found; ignoring")))
    }

    fn render(&self) -> String {
        let mut listing = String::from("Screen 0: minimum 8 x 8, maximum 32767 x 32767\n");
        for output in &self.outputs {
            let state = if output.connected { "connected" } else { "disconnected" };
            let primary = if output.primary { " primary" } else { "" };
            let geometry = match output.current {
                Some((_, pos, area)) => format!(" {area}+{}+{}", pos.x, pos.y),
                None => String::new(),
            };
            listing.push_str(&format!(
                "{} {state}{primary}{geometry} (normal left inverted right x axis y axis)\n",
                output.name
            ));
            if !output.connected {
                continue;
            }
            for mode in &output.modes {
                let active = match output.current {
                    Some((r, ..)) if r == *mode => "*",
                    _ => " ",
                };
                let preferred = if output.preferred == Some(*mode) { "+" } else { "" };
                listing.push_str(&format!("   {mode}     60.00{active}{preferred}\n"));
            }
        }
        listing
    }
}

fn rejected(stderr: String) -> Error {
    Error::Tool {
        program: "xrandr".to_string(),
        stderr,
    }
}

impl DisplayBackend for FakeXrandr {
    fn query(&mut self) -> Result<String> {
        Ok(self.render())
    }

    fn apply(&mut self, config: &OutputConfig) -> Result<()> {
        self.calls += 1;
        if self.fail_on.as_deref() == Some(config.output.as_str()) {
            return Err(rejected(format!("cannot configure {}", config.output)));
        }

        let (resolution, placement, primary, scale_from) = match &config.setting {
            Setting::Off => {
                self.find(&config.output)?;
                for output in self.outputs.iter_mut().filter(|o| o.name == config.output) {
                    output.current = None;
                    output.primary = false;
                }
                return Ok(());
            }
            Setting::On {
                resolution,
                placement,
                primary,
                scale_from,
            } => (*resolution, placement, *primary, *scale_from),
        };

        let target = self.find(&config.output)?;
        if !target.connected || !target.modes.contains(&resolution) {
            return Err(rejected(format!("cannot find mode {resolution}")));
        }

        let position = match placement {
            Placement::Origin => Position::default(),
            Placement::SameAs(other) => self
                .find(other)?
                .current
                .map(|(_, p, _)| p)
                .unwrap_or_default(),
            Placement::RightOf(other) => match self.find(other)?.current {
                Some((_, p, area)) => Position {
                    x: p.x + area.width as i32,
                    y: p.y,
                },
                None => Position::default(),
            },
        };
        let area = scale_from.unwrap_or(resolution);

        for output in &mut self.outputs {
            if output.name == config.output {
                output.current = Some((resolution, position, area));
                output.primary |= primary;
            } else if primary {
                output.primary = false;
            }
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingUi {
    pub messages: Vec<String>,
    pub choice: Option<usize>,
    pub prompts: usize,
}

impl Ui for RecordingUi {
    fn notify(&mut self, text: &str) {
        self.messages.push(text.to_string());
    }

    fn select(&mut self, _prompt: &str, _options: &[String]) -> Result<Option<usize>> {
        self.prompts += 1;
        Ok(self.choice)
    }
}
