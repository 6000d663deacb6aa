// src/cycle.rs - Working out the current mode, and moving to the next one
//
// Nothing is remembered between runs, so the current mode is read back from
// the snapshot: which outputs are active, whether one is scaled onto another
// area, whether each runs its preferred resolution, and where the external
// output sits. A scaled output is the mirror side of a clone whose output
// could not show the anchor's mode. The fixed cycle is
//
//   internal_only -> presentation -> clone_toward_external
//     -> clone_toward_internal -> external_only -> internal_only
//
// Known blind spot: when both outputs prefer the same resolution and both run
// it, a mirror and a side-by-side layout look identical apart from the
// external output's offset. An offset of 0,0 is read as a clone.

use tracing::{debug, info};

use crate::config::Roles;
use crate::display::{Directory, Resolution};
use crate::error::Result;
use crate::modes::{self, Mode, Outcome};
use crate::ui::Ui;
use crate::xrandr::DisplayBackend;

impl Mode {
    pub fn cycle_next(self) -> Mode {
        match self {
            Mode::InternalOnly => Mode::Presentation,
            Mode::Presentation => Mode::CloneTowardExternal,
            Mode::CloneTowardExternal => Mode::CloneTowardInternal,
            Mode::CloneTowardInternal => Mode::ExternalOnly,
            Mode::ExternalOnly => Mode::InternalOnly,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Inference {
    pub current: Mode,
    pub next: Mode,
}

impl From<Mode> for Inference {
    fn from(current: Mode) -> Self {
        Self {
            current,
            next: current.cycle_next(),
        }
    }
}

pub fn infer(directory: &Directory, roles: &Roles) -> Inference {
    let internal = roles.internal.as_str();
    let Some(external) = roles.connected_external(directory) else {
        return Inference {
            current: Mode::InternalOnly,
            next: Mode::InternalOnly,
        };
    };

    let inference = match (directory.is_active(internal), directory.is_active(external)) {
        (true, false) => Mode::InternalOnly.into(),
        (false, true) => Mode::ExternalOnly.into(),
        // Nothing lit: treat it like external_only so the panel comes back.
        (false, false) => Mode::ExternalOnly.into(),
        (true, true) => both_active(directory, internal, external),
    };

    debug!("inferred {} (next {})", inference.current, inference.next);
    inference
}

fn both_active(directory: &Directory, internal: &str, external: &str) -> Inference {
    if directory.is_scaled(external) {
        return Mode::CloneTowardInternal.into();
    }
    if directory.is_scaled(internal) {
        return Mode::CloneTowardExternal.into();
    }

    match (directory.at_preferred(internal), directory.at_preferred(external)) {
        (true, true) => {
            let same_preferred: Option<Resolution> = directory
                .preferred_resolution(internal)
                .filter(|r| directory.preferred_resolution(external) == Some(*r));
            if same_preferred.is_none() {
                return Mode::Presentation.into();
            }
            let offset = directory.position(external).is_some_and(|p| !p.is_origin());
            if offset {
                Mode::Presentation.into()
            } else {
                // Either clone direction fits; leave the clones entirely.
                Inference {
                    current: Mode::CloneTowardExternal,
                    next: Mode::InternalOnly,
                }
            }
        }
        (true, false) => Mode::CloneTowardInternal.into(),
        (false, _) => Mode::CloneTowardExternal.into(),
    }
}

pub fn round_robin(
    directory: &Directory,
    roles: &Roles,
    backend: &mut dyn DisplayBackend,
    ui: &mut dyn Ui,
) -> Result<Outcome> {
    let Inference { current, next } = infer(directory, roles);
    info!("round robin: {current} -> {next}");
    modes::apply(next, directory, roles, None, backend, ui)
}

/// Use the external output alone when one is connected, the panel otherwise.
pub fn automatic(
    directory: &Directory,
    roles: &Roles,
    requested: Option<Resolution>,
    backend: &mut dyn DisplayBackend,
    ui: &mut dyn Ui,
) -> Result<Outcome> {
    let mode = match roles.connected_external(directory) {
        Some(_) => Mode::ExternalOnly,
        None => Mode::InternalOnly,
    };
    modes::apply(mode, directory, roles, requested, backend, ui)
}

/// Ask the user for a mode. `Ok(None)` when the picker is dismissed.
pub fn menu(
    directory: &Directory,
    roles: &Roles,
    backend: &mut dyn DisplayBackend,
    ui: &mut dyn Ui,
) -> Result<Option<Outcome>> {
    let options: Vec<String> = Mode::ALL.iter().map(|m| m.label().to_string()).collect();
    let Some(index) = ui.select("Display mode", &options)? else {
        return Ok(None);
    };
    let Some(&mode) = Mode::ALL.get(index) else {
        return Ok(None);
    };
    modes::apply(mode, directory, roles, None, backend, ui).map(Some)
}

// ---- Tests ----
