// SPDX-FileCopyrightText: 2026 Google LLC
//
// SPDX-License-Identifier: Apache-2.0

//! Board descriptions, as handed to us by the build orchestrator.
//!
//! Two sources are supported: PlatformIO-style board manifests (JSON with
//! `build` and `upload` sections) and a `[package.metadata.libopencm3]`
//! table in a `Cargo.toml`.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use toml::Value;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct FrameworkOptions {
    /// Linker script to pick among several candidates in the target tree.
    #[serde(default)]
    pub ldscript: Option<PathBuf>,
    #[serde(default)]
    pub ld_device: Option<String>,
    #[serde(default)]
    pub variant: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BuildSection {
    /// Family tag, selects the tree layout.
    pub core: String,
    pub mcu: String,
    pub cpu: String,
    #[serde(default)]
    pub f_cpu: Option<String>,
    #[serde(default)]
    pub ldscript: Option<PathBuf>,
    #[serde(default)]
    pub libopencm3: FrameworkOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct UploadSection {
    #[serde(default)]
    pub maximum_size: Option<u64>,
    #[serde(default)]
    pub maximum_ram_size: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BoardDescriptor {
    pub build: BuildSection,
    #[serde(default)]
    pub upload: UploadSection,
}

/// Flat layout of `[package.metadata.libopencm3]`.
#[derive(Debug, Deserialize)]
struct CargoMetadata {
    core: String,
    mcu: String,
    cpu: String,
    f_cpu: Option<String>,
    ldscript: Option<PathBuf>,
    framework_ldscript: Option<PathBuf>,
    ld_device: Option<String>,
    variant: Option<String>,
    maximum_size: Option<u64>,
    maximum_ram_size: Option<u64>,
}

impl From<CargoMetadata> for BoardDescriptor {
    fn from(meta: CargoMetadata) -> Self {
        BoardDescriptor {
            build: BuildSection {
                core: meta.core,
                mcu: meta.mcu,
                cpu: meta.cpu,
                f_cpu: meta.f_cpu,
                ldscript: meta.ldscript,
                libopencm3: FrameworkOptions {
                    ldscript: meta.framework_ldscript,
                    ld_device: meta.ld_device,
                    variant: meta.variant,
                },
            },
            upload: UploadSection {
                maximum_size: meta.maximum_size,
                maximum_ram_size: meta.maximum_ram_size,
            },
        }
    }
}

fn non_empty(path: &Option<PathBuf>) -> Option<&Path> {
    path.as_deref().filter(|path| !path.as_os_str().is_empty())
}

impl BoardDescriptor {
    pub fn new(core: impl Into<String>, mcu: impl Into<String>, cpu: impl Into<String>) -> Self {
        BoardDescriptor {
            build: BuildSection {
                core: core.into(),
                mcu: mcu.into(),
                cpu: cpu.into(),
                f_cpu: None,
                ldscript: None,
                libopencm3: FrameworkOptions::default(),
            },
            upload: UploadSection::default(),
        }
    }

    pub fn with_ldscript(mut self, ldscript: impl Into<PathBuf>) -> Self {
        self.build.ldscript = Some(ldscript.into());
        self
    }

    pub fn with_framework_ldscript(mut self, ldscript: impl Into<PathBuf>) -> Self {
        self.build.libopencm3.ldscript = Some(ldscript.into());
        self
    }

    pub fn with_ld_device(mut self, device: impl Into<String>) -> Self {
        self.build.libopencm3.ld_device = Some(device.into());
        self
    }

    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.build.libopencm3.variant = Some(variant.into());
        self
    }

    pub fn with_f_cpu(mut self, f_cpu: impl Into<String>) -> Self {
        self.build.f_cpu = Some(f_cpu.into());
        self
    }

    pub fn with_memory(mut self, flash: u64, ram: u64) -> Self {
        self.upload.maximum_size = Some(flash);
        self.upload.maximum_ram_size = Some(ram);
        self
    }

    pub fn from_json_str(src: &str) -> Result<Self> {
        Ok(serde_json::from_str(src)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let src = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_json_str(&src)
    }

    /// Read the board from `[package.metadata.libopencm3]`.
    pub fn from_cargo_metadata(cargo_toml: &Path) -> Result<Self> {
        let text = fs::read_to_string(cargo_toml).map_err(|e| Error::io(cargo_toml, e))?;
        let parse_err = |source| Error::CargoToml {
            path: cargo_toml.to_path_buf(),
            source,
        };

        let doc: Value = text.parse().map_err(parse_err)?;
        let metadata = doc
            .get("package")
            .and_then(|pkg| pkg.get("metadata"))
            .and_then(|meta| meta.get("libopencm3"))
            .ok_or_else(|| Error::MissingMetadata(cargo_toml.to_path_buf()))?;

        let meta: CargoMetadata = metadata.clone().try_into().map_err(parse_err)?;
        Ok(meta.into())
    }

    pub fn core(&self) -> &str {
        &self.build.core
    }

    pub fn mcu(&self) -> &str {
        &self.build.mcu
    }

    pub fn cpu(&self) -> &str {
        &self.build.cpu
    }

    pub fn f_cpu(&self) -> Option<&str> {
        self.build.f_cpu.as_deref()
    }

    /// The board's own linker script, looked up in the project sources.
    /// Boards without one get a script generated.
    pub fn ldscript(&self) -> Option<&Path> {
        non_empty(&self.build.ldscript)
    }

    /// Which of several linker scripts in the framework tree to use.
    pub fn framework_ldscript(&self) -> Option<&Path> {
        non_empty(&self.build.libopencm3.ldscript)
    }

    pub fn ld_device(&self) -> Option<&str> {
        self.build
            .libopencm3
            .ld_device
            .as_deref()
            .filter(|device| !device.is_empty())
    }

    pub fn variant(&self) -> Option<&str> {
        self.build
            .libopencm3
            .variant
            .as_deref()
            .filter(|variant| !variant.is_empty())
    }

    pub fn maximum_size(&self) -> u64 {
        self.upload.maximum_size.unwrap_or(0)
    }

    pub fn maximum_ram_size(&self) -> u64 {
        self.upload.maximum_ram_size.unwrap_or(0)
    }
}
