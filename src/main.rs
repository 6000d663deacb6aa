// src/main.rs - dispmode entry point
//
// One run = one fresh `xrandr --query` snapshot, one command, exit. Output
// roles come from INTERNAL_OUTPUT / EXTERNAL_OUTPUT (or --internal /
// --external); the external one is detected when unset.

mod audio;
mod config;
mod cycle;
mod display;
mod error;
mod modes;
mod ui;
mod xrandr;

#[cfg(test)]
mod testing;

use std::fmt::Display;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::audio::{Profile, Volume};
use crate::config::{Config, Roles};
use crate::display::{Directory, Resolution};
use crate::error::Error;
use crate::modes::{Mode, Outcome};
use crate::ui::{Desktop, Ui};
use crate::xrandr::Xrandr;

#[derive(Parser, Debug)]
#[command(name = "dispmode")]
#[command(version, about = "Switch between laptop panel and external monitor layouts")]
struct Cli {
    /// Laptop panel output, e.g. eDP1
    #[arg(long, env = "INTERNAL_OUTPUT", global = true)]
    internal: Option<String>,

    /// External output; detected from the listing when unset
    #[arg(long, env = "EXTERNAL_OUTPUT", global = true)]
    external: Option<String>,

    /// Sound card for the audio_* commands
    #[arg(long, env = "AUDIO_CARD", default_value = "0", global = true)]
    audio_card: String,

    /// dmenu-compatible picker used when no command is given
    #[arg(long, env = "DISPMODE_MENU", default_value = "rofi", global = true)]
    menu: String,

    /// Verbose logging (can be specified multiple times)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq)]
#[command(rename_all = "snake_case")]
enum Command {
    /// Print an output's preferred resolution
    PrefRes { output: String },
    /// External output only
    Hdmi { resolution: Option<Resolution> },
    /// Laptop panel only
    Edp { resolution: Option<Resolution> },
    /// External output only if one is connected, panel otherwise
    Automon { resolution: Option<Resolution> },
    /// Mirror at the external output's resolution
    CloneHdmi { resolution: Option<Resolution> },
    /// Mirror at the panel's resolution
    CloneEdp { resolution: Option<Resolution> },
    /// Panel plus external output to its right
    Present { resolution: Option<Resolution> },
    /// Switch to the mode after the current one
    RoundRobin,
    /// Print whether an output is active
    IsActive { output: String },
    /// Print the detected external output
    DetectExternal,
    /// Route sound to HDMI
    AudioHdmi,
    /// Route sound to the built-in speakers and jack
    AudioAnalog,
    /// Switch the sound card off
    AudioOff,
    /// Raise the volume
    VolUp,
    /// Lower the volume
    VolDown,
}

impl Command {
    fn mode(&self) -> Option<(Mode, Option<Resolution>)> {
        match *self {
            Command::Hdmi { resolution } => Some((Mode::ExternalOnly, resolution)),
            Command::Edp { resolution } => Some((Mode::InternalOnly, resolution)),
            Command::CloneHdmi { resolution } => Some((Mode::CloneTowardExternal, resolution)),
            Command::CloneEdp { resolution } => Some((Mode::CloneTowardInternal, resolution)),
            Command::Present { resolution } => Some((Mode::Presentation, resolution)),
            _ => None,
        }
    }
}

// Everything a display command needs: roles, the backend, and one snapshot.
struct Session {
    config: Config,
    roles: Roles,
    directory: Directory,
    backend: Xrandr,
}

impl Session {
    fn open(config: Config) -> Result<Self> {
        let mut backend = Xrandr::default();
        let directory = display::snapshot(&mut backend).context("reading the output listing")?;
        let roles = config.roles(&directory);
        Ok(Self {
            config,
            roles,
            directory,
            backend,
        })
    }

    fn apply(
        &mut self,
        mode: Mode,
        resolution: Option<Resolution>,
        ui: &mut dyn Ui,
    ) -> Result<Outcome> {
        let outcome = modes::apply(
            mode,
            &self.directory,
            &self.roles,
            resolution,
            &mut self.backend,
            ui,
        )
        .with_context(|| format!("switching to {mode}"))?;
        Ok(outcome)
    }
}

impl Cli {
    fn config(&self) -> Result<Config, Error> {
        Config::new(self.internal.clone(), self.external.clone())
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut ui = Desktop {
        menu_program: cli.menu.clone(),
    };

    match run(&cli, &mut ui) {
        Ok(code) => code,
        Err(e) => {
            debug!("{e:?}");
            ui.notify(&format!("dispmode: {e:#}"));
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("dispmode={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli, ui: &mut dyn Ui) -> Result<ExitCode> {
    let Some(command) = &cli.command else {
        return interactive(cli, ui);
    };

    match command {
        Command::AudioHdmi => audio::set_profile(&cli.audio_card, Profile::Hdmi)?,
        Command::AudioAnalog => audio::set_profile(&cli.audio_card, Profile::Analog)?,
        Command::AudioOff => audio::set_profile(&cli.audio_card, Profile::Off)?,
        Command::VolUp => audio::change_volume(Volume::Up)?,
        Command::VolDown => audio::change_volume(Volume::Down)?,

        Command::PrefRes { output } => {
            let session = Session::open(cli.config()?)?;
            return Ok(answer(session.directory.preferred_resolution(output)));
        }
        Command::IsActive { output } => {
            let session = Session::open(cli.config()?)?;
            let active = session.directory.is_active(output);
            println!("{active}");
            return Ok(if active { ExitCode::SUCCESS } else { ExitCode::FAILURE });
        }
        Command::DetectExternal => {
            let session = Session::open(cli.config()?)?;
            return Ok(answer(session.directory.resolve_external(&session.config.internal)));
        }
        Command::RoundRobin => {
            let mut session = Session::open(cli.config()?)?;
            cycle::round_robin(&session.directory, &session.roles, &mut session.backend, ui)
                .context("round robin")?;
        }
        Command::Automon { resolution } => {
            let mut session = Session::open(cli.config()?)?;
            cycle::automatic(
                &session.directory,
                &session.roles,
                *resolution,
                &mut session.backend,
                ui,
            )
            .context("automatic mode")?;
        }
        other => {
            if let Some((mode, resolution)) = other.mode() {
                Session::open(cli.config()?)?.apply(mode, resolution, ui)?;
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn interactive(cli: &Cli, ui: &mut dyn Ui) -> Result<ExitCode> {
    let config = cli.config()?;
    if config.external.is_some() {
        return Err(Error::MissingSubcommand.into());
    }

    let mut session = Session::open(config)?;
    let chosen = cycle::menu(&session.directory, &session.roles, &mut session.backend, ui)?;
    if chosen.is_none() {
        debug!("menu dismissed");
    }
    Ok(ExitCode::SUCCESS)
}

// Query commands print their answer and exit nonzero when there is none.
fn answer(value: Option<impl Display>) -> ExitCode {
    match value {
        Some(v) => {
            println!("{v}");
            ExitCode::SUCCESS
        }
        None => ExitCode::FAILURE,
    }
}

// ---- Tests ----
