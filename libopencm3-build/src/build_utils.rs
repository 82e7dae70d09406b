// SPDX-FileCopyrightText: 2026 Google LLC
//
// SPDX-License-Identifier: Apache-2.0

//! Common utilities for build.rs scripts

use std::{
    env,
    path::{Path, PathBuf},
};

use crate::{
    board::BoardDescriptor,
    config::{BuildConfig, FRAMEWORK_DIR_ENV, PYTHON_ENV},
    genlink::{self, LINKER_TEMPLATE},
    resolve, FrameworkBuild,
};

/// Hand the resolved sources and flags to a `cc` build. Objects end up in
/// the configured build namespace. Calling `compile` is left to the caller.
pub fn configure_cc(build: &mut cc::Build, config: &BuildConfig, framework: &FrameworkBuild) {
    build.out_dir(config.artifact_root());

    for path in framework.sources.paths() {
        build.file(path);
    }
    for dir in &framework.flags.include_dirs {
        build.include(dir);
    }
    for define in &framework.flags.defines {
        build.define(&define.name, define.value.as_deref());
    }
    for flag in framework
        .flags
        .ccflags
        .iter()
        .chain(&framework.flags.cflags)
    {
        build.flag(flag.as_str());
    }
}

/// The `cargo:` lines a build script prints for `framework`.
///
/// `ldscript` is the script to link with, either the selected one or one
/// from [`generate_linker_script`].
pub fn cargo_directives(
    config: &BuildConfig,
    framework: &FrameworkBuild,
    ldscript: Option<&Path>,
) -> Vec<String> {
    let mut lines = vec![
        format!("cargo:rerun-if-env-changed={FRAMEWORK_DIR_ENV}"),
        format!("cargo:rerun-if-env-changed={PYTHON_ENV}"),
    ];

    for file in &framework.rules.files {
        lines.push(format!("cargo:rerun-if-changed={}", file.display()));
    }
    for dir in &framework.flags.lib_dirs {
        lines.push(format!("cargo:rustc-link-search={}", dir.display()));
    }
    lines.push(format!(
        "cargo:rustc-link-search={}",
        config.build_dir.display()
    ));

    if let Some(script) = ldscript {
        lines.push(format!("cargo:rerun-if-changed={}", script.display()));
        lines.push(format!("cargo:rustc-link-arg=-T{}", script.display()));
    }

    lines
}

pub fn emit_cargo_directives(
    config: &BuildConfig,
    framework: &FrameworkBuild,
    ldscript: Option<&Path>,
) {
    for line in cargo_directives(config, framework, ldscript) {
        println!("{line}");
    }
}

/// Generate a linker script for `framework.ld_device` from the framework's
/// template, preprocessing it with the C compiler of `build`.
///
/// The script is written to `<build dir>/generated.<device>.ld`.
pub fn generate_linker_script(
    build: &cc::Build,
    config: &BuildConfig,
    board: &BoardDescriptor,
    framework: &FrameworkBuild,
) -> PathBuf {
    let device = &framework.ld_device;
    let symbols = genlink::device_symbols(config, board, device)
        .unwrap_or_else(|e| panic!("Failed to generate symbols for {device}: {e}"));

    let template = config.framework_path(LINKER_TEMPLATE);
    let output = genlink::generated_ldscript_path(&config.build_dir, device);

    let mut command = build.get_compiler().to_command();
    command
        .arg("-P")
        .arg("-E")
        .arg(&template)
        .arg("-o")
        .arg(&output)
        .args(&symbols)
        .args(framework.flags.machine_flags());

    let status = command
        .status()
        .unwrap_or_else(|e| panic!("Failed to run {:?}: {e}", command));
    if !status.success() {
        panic!("Generating linker script {} failed", output.display());
    }

    println!("cargo:rerun-if-changed={}", template.display());
    output
}

/// How a build gets its linker script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkerScriptPlan<'a> {
    Selected(&'a Path),
    /// Nothing was selected and the board has no script of its own.
    Generate,
    /// The board names its own script, but it is not in the project sources
    /// and nothing else was selected.
    Missing,
}

pub fn linker_script_plan<'a>(
    board: &BoardDescriptor,
    framework: &'a FrameworkBuild,
) -> LinkerScriptPlan<'a> {
    match &framework.ldscript {
        Some(script) => LinkerScriptPlan::Selected(script.path()),
        None if board.ldscript().is_none() => LinkerScriptPlan::Generate,
        None => LinkerScriptPlan::Missing,
    }
}

#[allow(clippy::needless_doctest_main)]
/// Standard build script setup: configuration from the environment, board
/// from `[package.metadata.libopencm3]` in the package's `Cargo.toml`.
///
/// Resolves the framework, configures `build` and prints the cargo
/// directives, generating a linker script when none was selected and the
/// board does not declare its own. The caller compiles:
///
/// ```no_run
/// use libopencm3_build::build_utils::standard_framework_build;
///
/// fn main() {
///     let mut build = cc::Build::new();
///     standard_framework_build(&mut build);
///     build.compile("opencm3");
/// }
/// ```
pub fn standard_framework_build(build: &mut cc::Build) -> FrameworkBuild {
    let config = BuildConfig::from_env().unwrap_or_else(|e| panic!("{e}"));
    let manifest_dir = PathBuf::from(
        env::var_os("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set"),
    );
    let cargo_toml = manifest_dir.join("Cargo.toml");
    println!("cargo:rerun-if-changed={}", cargo_toml.display());

    let board = BoardDescriptor::from_cargo_metadata(&cargo_toml).unwrap_or_else(|e| panic!("{e}"));
    let framework = resolve(&config, &board).unwrap_or_else(|e| panic!("{e}"));

    configure_cc(build, &config, &framework);

    let ldscript = match linker_script_plan(&board, &framework) {
        LinkerScriptPlan::Selected(path) => Some(path.to_path_buf()),
        LinkerScriptPlan::Generate => {
            Some(generate_linker_script(build, &config, &board, &framework))
        }
        LinkerScriptPlan::Missing => {
            println!(
                "cargo:warning=linker script {} not found in {}",
                board.ldscript().map_or_else(String::new, |p| p.display().to_string()),
                config.project_src_dir.display()
            );
            None
        }
    };

    emit_cargo_directives(&config, &framework, ldscript.as_deref());
    framework
}
