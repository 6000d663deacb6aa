// src/config.rs - Output role configuration
//
// The internal panel must be named up front. The external output may be
// named too; when it isn't, it is re-detected from every fresh snapshot so a
// monitor plugged in between two commands is picked up.

use tracing::debug;

use crate::display::Directory;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub internal: String,
    pub external: Option<String>,
}

impl Config {
    pub fn new(internal: Option<String>, external: Option<String>) -> Result<Self> {
        let internal = internal
            .filter(|s| !s.trim().is_empty())
            .ok_or(Error::MissingInternal)?;
        let external = external.filter(|s| !s.trim().is_empty());

        if external.as_deref() == Some(internal.as_str()) {
            return Err(Error::SameRoles(internal));
        }

        Ok(Self { internal, external })
    }

    pub fn roles(&self, directory: &Directory) -> Roles {
        let external = match &self.external {
            Some(id) => Some(id.clone()),
            None => directory.resolve_external(&self.internal).map(str::to_string),
        };
        debug!("roles: internal={} external={:?}", self.internal, external);

        Roles {
            internal: self.internal.clone(),
            external,
        }
    }
}

/// Which identifier plays which part for this invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roles {
    pub internal: String,
    pub external: Option<String>,
}

impl Roles {
    /// The external identifier, if it is assigned and currently connected.
    pub fn connected_external<'a>(&'a self, directory: &Directory) -> Option<&'a str> {
        self.external
            .as_deref()
            .filter(|id| directory.is_connected(id))
    }
}

// ---- Tests ----
