// src/error.rs - Error type shared by every module
//
// `thiserror` derives `Display` and `std::error::Error` from the
// `#[error(...)]` attributes, so each variant carries its own message.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("internal output is not configured (set INTERNAL_OUTPUT or pass --internal)")]
    MissingInternal,

    #[error("internal and external output are both set to {0}")]
    SameRoles(String),

    #[error("invalid resolution '{0}', expected WxH")]
    InvalidResolution(String),

    #[error("no resolution known for {0}: it reports no preferred mode")]
    NoResolution(String),

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} failed: {stderr}")]
    Tool { program: String, stderr: String },

    #[error("no mode given: EXTERNAL_OUTPUT is set, so pass a mode subcommand (e.g. round_robin)")]
    MissingSubcommand,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
