// src/audio.rs - Sound card profile and volume control via pactl

use std::process::Command;

use tracing::debug;

use crate::error::{Error, Result};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Profile {
    Hdmi,
    Analog,
    Off,
}

impl Profile {
    pub fn pactl_name(self) -> &'static str {
        match self {
            Profile::Hdmi => "output:hdmi-stereo",
            Profile::Analog => "output:analog-stereo+input:analog-stereo",
            Profile::Off => "off",
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Volume {
    Up,
    Down,
}

const VOLUME_STEP: &str = "5%";

pub fn set_profile(card: &str, profile: Profile) -> Result<()> {
    pactl(&["set-card-profile", card, profile.pactl_name()])
}

pub fn change_volume(direction: Volume) -> Result<()> {
    let delta = match direction {
        Volume::Up => format!("+{VOLUME_STEP}"),
        Volume::Down => format!("-{VOLUME_STEP}"),
    };
    pactl(&["set-sink-volume", "@DEFAULT_SINK@", &delta])
}

fn pactl(args: &[&str]) -> Result<()> {
    debug!("pactl {}", args.join(" "));

    let output = Command::new("pactl")
        .args(args)
        .output()
        .map_err(|source| Error::Spawn {
            program: "pactl".to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(Error::Tool {
            program: "pactl".to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(())
}

// ---- Tests ----
