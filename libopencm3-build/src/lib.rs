// SPDX-FileCopyrightText: 2026 Google LLC
//
// SPDX-License-Identifier: Apache-2.0

//! Build integration for the libopencm3 firmware library.
//!
//! Given a board description and a libopencm3 checkout, work out which part
//! of the tree builds for that board, which C sources go into the library,
//! which linker script applies and what the toolchain needs to be told.
//! Nothing is compiled here; see [`build_utils`] for handing the result to
//! `cc` from a build script.

pub mod board;
pub mod build_utils;
pub mod config;
pub mod error;
pub mod family;
pub mod genlink;
pub mod ldscript;
pub mod locator;
pub mod nvic;
pub mod paths;
pub mod resolver;
pub mod rule_file;
pub mod toolchain;

use std::path::PathBuf;

use serde::Serialize;

pub use crate::board::BoardDescriptor;
pub use crate::config::BuildConfig;
pub use crate::error::{Error, Result};
pub use crate::family::{FamilyRule, FamilyTable, TargetTree};
pub use crate::ldscript::{LinkerScript, LinkerScriptSelector};
pub use crate::locator::{ResolvedSourceList, SourceFile, SourceFileLocator};
pub use crate::resolver::{MergedRuleSet, RuleSetResolver};
pub use crate::rule_file::{BuildRuleParser, BuildRuleSet, ParseError};
pub use crate::toolchain::ToolchainFlags;

/// Everything the orchestrator needs to build libopencm3 for one board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameworkBuild {
    pub target: TargetTree,
    pub rules: MergedRuleSet,
    pub sources: ResolvedSourceList,
    /// `None` if no script could be picked; see [`genlink`] for generating
    /// one.
    pub ldscript: Option<LinkerScript>,
    /// Device name for `genlink`.
    pub ld_device: String,
    pub flags: ToolchainFlags,
}

impl FrameworkBuild {
    /// Object locations inside the configured build namespace.
    pub fn artifact_paths(&self, config: &BuildConfig) -> Vec<PathBuf> {
        self.sources
            .artifact_paths(&config.artifact_root())
            .collect()
    }
}

/// [`resolve_with`] using the built-in family table.
pub fn resolve(config: &BuildConfig, board: &BoardDescriptor) -> Result<FrameworkBuild> {
    resolve_with(&FamilyTable::builtin(), config, board)
}

/// Run the whole resolution for `board`. Either everything resolves or the
/// first fatal error is returned; there are no partial results.
pub fn resolve_with(
    table: &FamilyTable,
    config: &BuildConfig,
    board: &BoardDescriptor,
) -> Result<FrameworkBuild> {
    config.validate()?;

    let target = table.target(board, &config.framework_dir)?;

    for dir in nvic::pending_nvic_headers(&config.framework_dir)? {
        log::warn!(
            "{} has no generated {}, run scripts/irq2nvic_h first",
            dir.display(),
            nvic::NVIC_HEADER
        );
    }

    let rules = RuleSetResolver::new().resolve(&target.root_dir)?;
    let sources = SourceFileLocator::new(&config.framework_dir).locate(&rules, &target.root_dir);
    log::info!(
        "{} of {} objects for {} have sources",
        sources.len(),
        rules.rules.objects.len(),
        board.mcu()
    );

    let ldscript =
        LinkerScriptSelector::new(&config.project_src_dir).select(&target.root_dir, board)?;
    let ld_device = table.ld_device(board)?;
    let flags = ToolchainFlags::for_board(config, board, &target);

    Ok(FrameworkBuild {
        target,
        rules,
        sources,
        ldscript,
        ld_device,
        flags,
    })
}
