// SPDX-FileCopyrightText: 2026 Google LLC
//
// SPDX-License-Identifier: Apache-2.0

use std::{
    env,
    path::{Path, PathBuf},
};

use serde::Serialize;

use crate::error::{Error, Result};

/// Environment variable pointing at the libopencm3 checkout.
pub const FRAMEWORK_DIR_ENV: &str = "LIBOPENCM3_DIR";

/// Optional override of the Python interpreter.
pub const PYTHON_ENV: &str = "LIBOPENCM3_PYTHON";

/// Default name of the directory framework objects are built into.
pub const DEFAULT_NAMESPACE: &str = "FrameworkLibOpenCM3";

/// Where things are. Passed explicitly to every component so nothing in the
/// resolution reads process-wide state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildConfig {
    /// Root of the vendored libopencm3 tree.
    pub framework_dir: PathBuf,
    /// The project's own sources. Linker scripts found here override the
    /// framework's.
    pub project_src_dir: PathBuf,
    /// Where build artifacts go.
    pub build_dir: PathBuf,
    /// Sub-directory of `build_dir` that mirrors the framework tree.
    pub namespace: String,
    /// Interpreter for the framework's helper scripts.
    pub python: PathBuf,
}

impl BuildConfig {
    pub fn new(
        framework_dir: impl Into<PathBuf>,
        project_src_dir: impl Into<PathBuf>,
        build_dir: impl Into<PathBuf>,
    ) -> Self {
        BuildConfig {
            framework_dir: framework_dir.into(),
            project_src_dir: project_src_dir.into(),
            build_dir: build_dir.into(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            python: PathBuf::from("python3"),
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_python(mut self, python: impl Into<PathBuf>) -> Self {
        self.python = python.into();
        self
    }

    /// Configuration for a cargo build script: the framework comes from
    /// `LIBOPENCM3_DIR`, project sources from `<manifest dir>/src` and
    /// artifacts go to `OUT_DIR`. `LIBOPENCM3_PYTHON` overrides the
    /// interpreter.
    pub fn from_env() -> Result<Self> {
        let var = |name: &str| {
            env::var_os(name)
                .map(PathBuf::from)
                .ok_or_else(|| Error::MissingEnv(name.to_string()))
        };

        let framework_dir = var(FRAMEWORK_DIR_ENV)?;
        let project_src_dir = var("CARGO_MANIFEST_DIR")?.join("src");
        let build_dir = var("OUT_DIR")?;

        let mut config = BuildConfig::new(framework_dir, project_src_dir, build_dir);
        if let Some(python) = env::var_os(PYTHON_ENV) {
            config.python = PathBuf::from(python);
        }
        Ok(config)
    }

    /// Both source directories have to exist before anything is resolved.
    pub fn validate(&self) -> Result<()> {
        for dir in [&self.framework_dir, &self.project_src_dir] {
            if !dir.is_dir() {
                return Err(Error::MissingDirectory(dir.clone()));
            }
        }
        Ok(())
    }

    /// `<build dir>/<namespace>`, the root object paths are expressed in.
    pub fn artifact_root(&self) -> PathBuf {
        self.build_dir.join(&self.namespace)
    }

    pub fn include_dir(&self) -> PathBuf {
        self.framework_dir.join("include")
    }

    pub fn lib_dir(&self) -> PathBuf {
        self.framework_dir.join("lib")
    }

    pub fn framework_path(&self, rel: impl AsRef<Path>) -> PathBuf {
        self.framework_dir.join(rel)
    }
}
