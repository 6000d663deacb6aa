// src/display.rs - Output model, listing parser, and point queries
//
// The listing is the text `xrandr --query` prints: one line per output port
// ("eDP1 connected primary 1920x1200+0+0 ...") followed by indented mode lines
// ("   1920x1200     59.95*+"). Everything else is ignored.
//
// `LazyLock` compiles each regex once, on first use, and shares it afterwards.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::xrandr::DisplayBackend;

// ---- Data Types ----

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Resolution {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidResolution(s.to_string());
        let (w, h) = s.trim().split_once('x').ok_or_else(invalid)?;
        let width: u32 = w.parse().map_err(|_| invalid())?;
        let height: u32 = h.parse().map_err(|_| invalid())?;
        if width == 0 || height == 0 {
            return Err(invalid());
        }
        Ok(Self::new(width, height))
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn is_origin(&self) -> bool {
        self.x == 0 && self.y == 0
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ConnectionState {
    Connected,
    Disconnected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    pub identifier: String,
    pub connection: ConnectionState,
    pub is_active: bool,
    pub is_primary: bool,
    pub current_resolution: Option<Resolution>,
    pub preferred_resolution: Option<Resolution>,
    pub available_resolutions: Vec<Resolution>,
    // Offset and covered area of the applied mode; only meaningful while
    // active. The area differs from the mode when the output is scaled.
    pub position: Option<Position>,
    pub area: Option<Resolution>,
}

impl Output {
    fn new(identifier: &str, connection: ConnectionState) -> Self {
        Self {
            identifier: identifier.to_string(),
            connection,
            is_active: false,
            is_primary: false,
            current_resolution: None,
            preferred_resolution: None,
            available_resolutions: Vec::new(),
            position: None,
            area: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connection == ConnectionState::Connected
    }

    pub fn at_preferred(&self) -> bool {
        match (self.current_resolution, self.preferred_resolution) {
            (Some(current), Some(preferred)) => current == preferred,
            _ => false,
        }
    }

    /// Running one mode stretched over a different area (`--scale-from`).
    /// A rotated output reports its area with the sides swapped.
    pub fn is_scaled(&self) -> bool {
        match (self.current_resolution, self.area) {
            (Some(current), Some(area)) => {
                current != area && Resolution::new(current.height, current.width) != area
            }
            _ => false,
        }
    }

    fn add_mode(&mut self, mode: ModeLine) {
        // A disconnected port can still list stale modes; none of them count.
        if !self.is_connected() {
            return;
        }
        if !self.available_resolutions.contains(&mode.resolution) {
            self.available_resolutions.push(mode.resolution);
        }
        if mode.active && !self.is_active {
            self.is_active = true;
            self.current_resolution = Some(mode.resolution);
        }
        if mode.preferred && self.preferred_resolution.is_none() {
            self.preferred_resolution = Some(mode.resolution);
        }
    }

    fn finish(mut self) -> Self {
        if !self.is_active {
            self.position = None;
            self.area = None;
        }
        self
    }
}

/// Every output from one listing, in listing order. Built once per
/// invocation and never mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directory {
    outputs: Vec<Output>,
}

// ---- Parsing ----

static OUTPUT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\S+)\s+(connected|disconnected)\b(.*)$").expect("output line pattern")
});

static MODE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s+(\d+)x(\d+)(.*)$").expect("mode line pattern"));

static GEOMETRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d+)x(\d+)\+(-?\d+)\+(-?\d+)\b").expect("geometry pattern")
});

#[derive(Debug, PartialEq)]
struct ModeLine {
    resolution: Resolution,
    active: bool,
    preferred: bool,
}

#[derive(Debug, PartialEq)]
enum Line {
    Output(Output),
    Mode(ModeLine),
    // Any other unindented line, e.g. "VIRTUAL1 unknown connection" or the
    // "Screen 0:" banner. It closes the output being scanned.
    Boundary,
    Ignored,
}

fn classify(line: &str) -> Line {
    if let Some(caps) = OUTPUT_LINE.captures(line) {
        let connection = match &caps[2] {
            "connected" => ConnectionState::Connected,
            _ => ConnectionState::Disconnected,
        };
        let mut output = Output::new(&caps[1], connection);
        let rest = &caps[3];
        if connection == ConnectionState::Connected {
            output.is_primary = rest.split_whitespace().any(|t| t == "primary");
            if let Some((area, position)) = parse_geometry(rest) {
                output.area = Some(area);
                output.position = Some(position);
            }
        }
        return Line::Output(output);
    }

    if line.starts_with(|c: char| !c.is_whitespace()) {
        return Line::Boundary;
    }

    if let Some(caps) = MODE_LINE.captures(line) {
        let (Ok(width), Ok(height)) = (caps[1].parse::<u32>(), caps[2].parse::<u32>()) else {
            return Line::Ignored;
        };
        let markers = &caps[3];
        return Line::Mode(ModeLine {
            resolution: Resolution { width, height },
            active: markers.contains('*'),
            preferred: markers.contains('+'),
        });
    }

    Line::Ignored
}

fn parse_geometry(rest: &str) -> Option<(Resolution, Position)> {
    let caps = GEOMETRY.captures(rest)?;
    let area = Resolution::new(caps[1].parse().ok()?, caps[2].parse().ok()?);
    let position = Position {
        x: caps[3].parse().ok()?,
        y: caps[4].parse().ok()?,
    };
    Some((area, position))
}

// The scanner is either inside an output's block of mode lines, or skipping
// lines that belong to no known output (the banner, an output in an unknown
// connection state).
enum Scan {
    Skipping,
    InOutput(Output),
}

impl Directory {
    pub fn parse(listing: &str) -> Self {
        let mut outputs = Vec::new();
        let mut scan = Scan::Skipping;

        for line in listing.lines() {
            scan = match (scan, classify(line)) {
                (Scan::Skipping, Line::Output(next)) => Scan::InOutput(next),
                (Scan::InOutput(done), Line::Output(next)) => {
                    outputs.push(done.finish());
                    Scan::InOutput(next)
                }
                (Scan::InOutput(mut output), Line::Mode(mode)) => {
                    output.add_mode(mode);
                    Scan::InOutput(output)
                }
                (Scan::InOutput(done), Line::Boundary) => {
                    trace!("closing {} at {line:?}", done.identifier);
                    outputs.push(done.finish());
                    Scan::Skipping
                }
                (scan, Line::Mode(_) | Line::Boundary | Line::Ignored) => {
                    trace!("ignoring listing line: {line:?}");
                    scan
                }
            };
        }

        if let Scan::InOutput(last) = scan {
            outputs.push(last.finish());
        }

        debug!("parsed {} outputs", outputs.len());
        Self { outputs }
    }

    pub fn outputs(&self) -> impl Iterator<Item = &Output> {
        self.outputs.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Output> {
        self.outputs.iter().find(|o| o.identifier == id)
    }

    // ---- Queries ----
    //
    // Unknown identifiers answer false/None: "no such output" is an ordinary
    // state for a laptop with nothing plugged in.

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn is_connected(&self, id: &str) -> bool {
        self.get(id).is_some_and(Output::is_connected)
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.get(id).is_some_and(|o| o.is_active)
    }

    pub fn current_resolution(&self, id: &str) -> Option<Resolution> {
        self.get(id)?.current_resolution
    }

    pub fn preferred_resolution(&self, id: &str) -> Option<Resolution> {
        self.get(id)?.preferred_resolution
    }

    pub fn position(&self, id: &str) -> Option<Position> {
        self.get(id)?.position
    }

    pub fn is_scaled(&self, id: &str) -> bool {
        self.get(id).is_some_and(Output::is_scaled)
    }

    pub fn at_preferred(&self, id: &str) -> bool {
        self.get(id).is_some_and(Output::at_preferred)
    }

    pub fn supports(&self, id: &str, resolution: Resolution) -> bool {
        self.get(id)
            .is_some_and(|o| o.available_resolutions.contains(&resolution))
    }

    /// First connected output, in listing order, that is not `internal`.
    pub fn resolve_external(&self, internal: &str) -> Option<&str> {
        self.outputs
            .iter()
            .find(|o| o.is_connected() && o.identifier != internal)
            .map(|o| o.identifier.as_str())
    }
}

pub fn snapshot(backend: &mut dyn DisplayBackend) -> Result<Directory> {
    let listing = backend.query()?;
    let directory = Directory::parse(&listing);
    for o in directory.outputs().filter(|o| o.is_connected()) {
        debug!(
            "{}: active={} primary={} current={:?} preferred={:?} at {:?}, {} modes",
            o.identifier,
            o.is_active,
            o.is_primary,
            o.current_resolution,
            o.preferred_resolution,
            o.position,
            o.available_resolutions.len()
        );
    }
    Ok(directory)
}

// ---- Tests ----
