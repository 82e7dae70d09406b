// SPDX-FileCopyrightText: 2026 Google LLC
//
// SPDX-License-Identifier: Apache-2.0

use std::{
    fmt::{self, Display},
    io,
    path::PathBuf,
};

use crate::rule_file::ParseError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that aborts a resolution.
///
/// None of these are recoverable: a partially resolved source list would
/// mis-link the firmware, so callers get either a complete result or one of
/// these.
#[derive(Debug)]
pub enum Error {
    /// A rule file was read but lacks its object list.
    Parse { path: PathBuf, source: ParseError },
    /// The root rule file or one of its includes does not exist.
    MissingFile { path: PathBuf, source: io::Error },
    /// A directory handed in through the configuration does not exist.
    MissingDirectory(PathBuf),
    MissingEnv(String),
    Io { path: PathBuf, source: io::Error },
    UnknownFamily(String),
    InvalidMcu { mcu: String, family: &'static str },
    BoardJson(serde_json::Error),
    CargoToml { path: PathBuf, source: toml::de::Error },
    /// `Cargo.toml` has no `[package.metadata.libopencm3]` table.
    MissingMetadata(PathBuf),
    Genlink(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Parse { path, source } => {
                write!(f, "failed to parse rule file {}: {source}", path.display())
            }
            Error::MissingFile { path, source } => {
                write!(f, "rule file {} could not be read: {source}", path.display())
            }
            Error::MissingDirectory(path) => {
                write!(f, "directory {} does not exist", path.display())
            }
            Error::MissingEnv(name) => write!(f, "environment variable {name} is not set"),
            Error::Io { path, source } => write!(f, "I/O error on {}: {source}", path.display()),
            Error::UnknownFamily(tag) => {
                write!(f, "no source tree layout known for family '{tag}'")
            }
            Error::InvalidMcu { mcu, family } => {
                write!(f, "MCU '{mcu}' is too short for the {family} tree layout")
            }
            Error::BoardJson(err) => write!(f, "invalid board descriptor: {err}"),
            Error::CargoToml { path, source } => {
                write!(f, "failed to parse {}: {source}", path.display())
            }
            Error::MissingMetadata(path) => write!(
                f,
                "[package.metadata.libopencm3] section missing in {}",
                path.display()
            ),
            Error::Genlink(msg) => write!(f, "genlink: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parse { source, .. } => Some(source),
            Error::MissingFile { source, .. } | Error::Io { source, .. } => Some(source),
            Error::BoardJson(err) => Some(err),
            Error::CargoToml { source, .. } => Some(source),
            Error::MissingDirectory(_)
            | Error::MissingEnv(_)
            | Error::UnknownFamily(_)
            | Error::InvalidMcu { .. }
            | Error::MissingMetadata(_)
            | Error::Genlink(_) => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::BoardJson(err)
    }
}
