// src/modes.rs - The five display modes and the actions that apply them
//
// Each mode is split in two: `plan` works out the ordered backend calls from
// a snapshot without touching anything, and `apply` runs that plan. Plans
// always settle the internal panel before the external output, and switch
// an output off before another one is positioned against it.

use std::fmt;

use tracing::info;

use crate::config::Roles;
use crate::display::{Directory, Resolution};
use crate::error::{Error, Result};
use crate::ui::Ui;
use crate::xrandr::{DisplayBackend, OutputConfig, Placement};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Mode {
    InternalOnly,
    ExternalOnly,
    CloneTowardInternal,
    CloneTowardExternal,
    Presentation,
}

impl Mode {
    pub const ALL: [Mode; 5] = [
        Mode::InternalOnly,
        Mode::Presentation,
        Mode::CloneTowardExternal,
        Mode::CloneTowardInternal,
        Mode::ExternalOnly,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Mode::InternalOnly => "Internal only",
            Mode::ExternalOnly => "External only",
            Mode::CloneTowardInternal => "Clone (internal resolution)",
            Mode::CloneTowardExternal => "Clone (external resolution)",
            Mode::Presentation => "Presentation",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Mode::InternalOnly => "internal_only",
            Mode::ExternalOnly => "external_only",
            Mode::CloneTowardInternal => "clone_toward_internal",
            Mode::CloneTowardExternal => "clone_toward_external",
            Mode::Presentation => "presentation",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Outcome {
    Applied(Mode),
    Unavailable(Mode),
}

impl Outcome {
    pub fn message(&self) -> String {
        match self {
            Outcome::Applied(mode) => format!("Display mode: {}", mode.label()),
            Outcome::Unavailable(mode) => {
                format!("unavailable: {mode}: no external output connected")
            }
        }
    }
}

/// Ordered backend calls; each entry is applied separately.
pub type Plan = Vec<OutputConfig>;

// ---- Planning ----

fn target(directory: &Directory, id: &str, requested: Option<Resolution>) -> Result<Resolution> {
    requested
        .or_else(|| directory.preferred_resolution(id))
        .ok_or_else(|| Error::NoResolution(id.to_string()))
}

// The mirroring output takes the anchor's mode when it has one, otherwise it
// keeps its own preferred mode and is scaled onto the anchor's area.
fn mirror(
    directory: &Directory,
    id: &str,
    anchor_res: Resolution,
    placement: Placement,
) -> Result<OutputConfig> {
    if directory.supports(id, anchor_res) {
        return Ok(OutputConfig::on(id, anchor_res, placement));
    }
    let own = target(directory, id, None)?;
    Ok(OutputConfig::on(id, own, placement).scaled_from(anchor_res))
}

/// Backend calls that realize `mode`, or `Ok(None)` when the mode needs an
/// external output and none is connected.
pub fn plan(
    mode: Mode,
    directory: &Directory,
    roles: &Roles,
    requested: Option<Resolution>,
) -> Result<Option<Plan>> {
    let internal = roles.internal.as_str();

    let steps = match (mode, roles.connected_external(directory)) {
        (Mode::InternalOnly, _) => {
            let resolution = target(directory, internal, requested)?;
            let mut steps = Vec::new();
            if let Some(external) = roles.external.as_deref().filter(|id| directory.contains(id)) {
                steps.push(OutputConfig::off(external));
            }
            steps.push(OutputConfig::on(internal, resolution, Placement::Origin).primary());
            steps
        }
        (_, None) => return Ok(None),
        (Mode::ExternalOnly, Some(external)) => {
            let resolution = target(directory, external, requested)?;
            let mut steps = Vec::new();
            if directory.contains(internal) {
                steps.push(OutputConfig::off(internal));
            }
            steps.push(OutputConfig::on(external, resolution, Placement::Origin).primary());
            steps
        }
        (Mode::CloneTowardInternal, Some(external)) => {
            let anchor = target(directory, internal, requested)?;
            vec![
                OutputConfig::on(internal, anchor, Placement::Origin).primary(),
                mirror(directory, external, anchor, Placement::SameAs(internal.to_string()))?,
            ]
        }
        (Mode::CloneTowardExternal, Some(external)) => {
            let anchor = target(directory, external, requested)?;
            // The panel goes first, before the external output has moved, so
            // it is pinned to the origin the external output is about to take.
            vec![
                mirror(directory, internal, anchor, Placement::Origin)?,
                OutputConfig::on(external, anchor, Placement::Origin).primary(),
            ]
        }
        (Mode::Presentation, Some(external)) => {
            let internal_res = target(directory, internal, None)?;
            let external_res = target(directory, external, requested)?;
            let mut steps = Vec::new();
            // Reset first: positioning against an output that still carries
            // an old mirror transform gets rejected.
            if directory.is_active(external) {
                steps.push(OutputConfig::off(external));
            }
            steps.push(OutputConfig::on(internal, internal_res, Placement::Origin).primary());
            steps.push(OutputConfig::on(
                external,
                external_res,
                Placement::RightOf(internal.to_string()),
            ));
            steps
        }
    };

    Ok(Some(steps))
}

// ---- Actions ----

pub fn apply(
    mode: Mode,
    directory: &Directory,
    roles: &Roles,
    requested: Option<Resolution>,
    backend: &mut dyn DisplayBackend,
    ui: &mut dyn Ui,
) -> Result<Outcome> {
    let outcome = match plan(mode, directory, roles, requested)? {
        None => Outcome::Unavailable(mode),
        Some(steps) => {
            for step in &steps {
                backend.apply(step)?;
            }
            info!("applied {mode} in {} steps", steps.len());
            Outcome::Applied(mode)
        }
    };

    ui.notify(&outcome.message());
    Ok(outcome)
}

// ---- Tests ----
