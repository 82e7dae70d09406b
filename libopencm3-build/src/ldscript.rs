// SPDX-FileCopyrightText: 2026 Google LLC
//
// SPDX-License-Identifier: Apache-2.0

//! Pick the linker script for a board.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Serialize;

use crate::{
    board::BoardDescriptor,
    error::{Error, Result},
};

pub const LDSCRIPT_SUFFIX: &str = ".ld";

/// Which rule picked the script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", content = "path", rename_all = "snake_case")]
pub enum LinkerScript {
    /// Named by the board and present in the project's sources.
    ProjectOverride(PathBuf),
    /// The only script in the target tree.
    SoleCandidate(PathBuf),
    /// Named by the board, one of several in the target tree.
    NamedCandidate(PathBuf),
}

impl LinkerScript {
    pub fn path(&self) -> &Path {
        match self {
            LinkerScript::ProjectOverride(path)
            | LinkerScript::SoleCandidate(path)
            | LinkerScript::NamedCandidate(path) => path,
        }
    }
}

pub struct LinkerScriptSelector<'a> {
    project_src_dir: &'a Path,
}

impl<'a> LinkerScriptSelector<'a> {
    pub fn new(project_src_dir: &'a Path) -> Self {
        LinkerScriptSelector { project_src_dir }
    }

    /// All `.ld` files directly in `root_dir`, sorted by name.
    pub fn candidates(&self, root_dir: &Path) -> Result<Vec<PathBuf>> {
        let mut names = vec![];
        for entry in fs::read_dir(root_dir).map_err(|e| Error::io(root_dir, e))? {
            let entry = entry.map_err(|e| Error::io(root_dir, e))?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if name.ends_with(LDSCRIPT_SUFFIX) && entry.path().is_file() {
                names.push(name.to_string());
            }
        }
        names.sort();

        Ok(names.into_iter().map(|name| root_dir.join(name)).collect())
    }

    /// The first of these that applies wins:
    ///
    /// 1. the board's own script (or, without one, the framework script
    ///    name) exists in the project sources;
    /// 2. the target tree holds exactly one script;
    /// 3. the framework script name exists in the target tree.
    ///
    /// `None` is a valid answer. Whether a build can go on without a script
    /// is up to the caller.
    pub fn select(&self, root_dir: &Path, board: &BoardDescriptor) -> Result<Option<LinkerScript>> {
        if let Some(name) = board.ldscript().or(board.framework_ldscript()) {
            let path = self.project_src_dir.join(name);
            if path.is_file() {
                log::debug!("using project linker script {}", path.display());
                return Ok(Some(LinkerScript::ProjectOverride(path)));
            }
        }

        let mut candidates = self.candidates(root_dir)?;
        if candidates.len() == 1 {
            let path = candidates.remove(0);
            log::debug!("using the only linker script {}", path.display());
            return Ok(Some(LinkerScript::SoleCandidate(path)));
        }

        if let Some(name) = board.framework_ldscript() {
            let path = root_dir.join(name);
            if path.is_file() {
                log::debug!("using named linker script {}", path.display());
                return Ok(Some(LinkerScript::NamedCandidate(path)));
            }
        }

        log::debug!(
            "no linker script selected from {} candidates in {}",
            candidates.len(),
            root_dir.display()
        );
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    struct Dirs {
        project: TempDir,
        tree: TempDir,
    }

    impl Dirs {
        fn new() -> Self {
            Dirs {
                project: tempfile::tempdir().unwrap(),
                tree: tempfile::tempdir().unwrap(),
            }
        }

        fn select(&self, board: &BoardDescriptor) -> Option<LinkerScript> {
            LinkerScriptSelector::new(self.project.path())
                .select(self.tree.path(), board)
                .unwrap()
        }
    }

    fn board() -> BoardDescriptor {
        BoardDescriptor::new("ststm32", "stm32f103c8t6", "cortex-m3")
    }

    #[test]
    fn project_override_beats_sole_candidate() {
        let dirs = Dirs::new();
        fs::write(dirs.project.path().join("custom.ld"), "").unwrap();
        fs::write(dirs.tree.path().join("stm32f1.ld"), "").unwrap();

        let picked = dirs.select(&board().with_ldscript("custom.ld"));
        assert_eq!(
            picked,
            Some(LinkerScript::ProjectOverride(
                dirs.project.path().join("custom.ld")
            ))
        );
    }

    #[test]
    fn board_script_beats_framework_name() {
        let dirs = Dirs::new();
        fs::write(dirs.project.path().join("custom.ld"), "").unwrap();
        fs::write(dirs.tree.path().join("stm32f103x8.ld"), "").unwrap();
        fs::write(dirs.tree.path().join("stm32f103xb.ld"), "").unwrap();

        let board = board()
            .with_ldscript("custom.ld")
            .with_framework_ldscript("stm32f103x8.ld");
        assert_eq!(
            dirs.select(&board),
            Some(LinkerScript::ProjectOverride(
                dirs.project.path().join("custom.ld")
            ))
        );
    }

    #[test]
    fn framework_name_found_in_project_sources() {
        let dirs = Dirs::new();
        fs::write(dirs.project.path().join("stm32f103x8.ld"), "").unwrap();
        fs::write(dirs.tree.path().join("stm32f103x8.ld"), "").unwrap();

        let picked = dirs.select(&board().with_framework_ldscript("stm32f103x8.ld"));
        assert_eq!(
            picked,
            Some(LinkerScript::ProjectOverride(
                dirs.project.path().join("stm32f103x8.ld")
            ))
        );
    }

    #[test]
    fn board_script_is_not_looked_up_in_tree() {
        let dirs = Dirs::new();
        fs::write(dirs.tree.path().join("stm32f103x8.ld"), "").unwrap();
        fs::write(dirs.tree.path().join("stm32f103xb.ld"), "").unwrap();

        assert_eq!(dirs.select(&board().with_ldscript("stm32f103xb.ld")), None);
    }

    #[test]
    fn sole_candidate_without_override() {
        let dirs = Dirs::new();
        fs::write(dirs.tree.path().join("stm32f1.ld"), "").unwrap();
        fs::write(dirs.tree.path().join("Makefile"), "").unwrap();

        let picked = dirs.select(&board());
        assert_eq!(
            picked,
            Some(LinkerScript::SoleCandidate(
                dirs.tree.path().join("stm32f1.ld")
            ))
        );
    }

    #[test]
    fn nonexistent_override_falls_through_to_sole_candidate() {
        // A board naming a script that exists nowhere still gets the tree's
        // only script rather than nothing.
        let dirs = Dirs::new();
        fs::write(dirs.tree.path().join("stm32f1.ld"), "").unwrap();

        let picked = dirs.select(&board().with_ldscript("typo.ld"));
        assert_eq!(
            picked,
            Some(LinkerScript::SoleCandidate(
                dirs.tree.path().join("stm32f1.ld")
            ))
        );
    }

    #[test]
    fn sole_candidate_beats_named_candidate_in_tree() {
        let dirs = Dirs::new();
        fs::write(dirs.tree.path().join("stm32f1.ld"), "").unwrap();
        fs::create_dir(dirs.tree.path().join("boards")).unwrap();
        fs::write(dirs.tree.path().join("boards/named.ld"), "").unwrap();

        let picked = dirs.select(&board().with_framework_ldscript("boards/named.ld"));
        assert_eq!(
            picked,
            Some(LinkerScript::SoleCandidate(
                dirs.tree.path().join("stm32f1.ld")
            ))
        );
    }

    #[test]
    fn named_candidate_disambiguates() {
        let dirs = Dirs::new();
        fs::write(dirs.tree.path().join("stm32f103x8.ld"), "").unwrap();
        fs::write(dirs.tree.path().join("stm32f103xb.ld"), "").unwrap();

        let picked = dirs.select(&board().with_framework_ldscript("stm32f103xb.ld"));
        assert_eq!(
            picked,
            Some(LinkerScript::NamedCandidate(
                dirs.tree.path().join("stm32f103xb.ld")
            ))
        );
    }

    #[test]
    fn several_candidates_and_no_name_gives_none() {
        let dirs = Dirs::new();
        fs::write(dirs.tree.path().join("stm32f103x8.ld"), "").unwrap();
        fs::write(dirs.tree.path().join("stm32f103xb.ld"), "").unwrap();

        assert_eq!(dirs.select(&board()), None);
        assert_eq!(dirs.select(&board().with_framework_ldscript("stm32f103xc.ld")), None);
    }

    #[test]
    fn no_candidates_gives_none() {
        let dirs = Dirs::new();
        assert_eq!(dirs.select(&board()), None);
    }

    #[test]
    fn candidates_are_sorted_files_only() {
        let dirs = Dirs::new();
        fs::write(dirs.tree.path().join("b.ld"), "").unwrap();
        fs::write(dirs.tree.path().join("a.ld"), "").unwrap();
        fs::write(dirs.tree.path().join("notes.ld.txt"), "").unwrap();
        fs::create_dir(dirs.tree.path().join("dir.ld")).unwrap();

        let candidates = LinkerScriptSelector::new(dirs.project.path())
            .candidates(dirs.tree.path())
            .unwrap();
        assert_eq!(
            candidates,
            [dirs.tree.path().join("a.ld"), dirs.tree.path().join("b.ld")]
        );
    }

    #[test]
    fn missing_tree_is_an_error() {
        let dirs = Dirs::new();
        let err = LinkerScriptSelector::new(dirs.project.path())
            .select(&dirs.tree.path().join("nope"), &board())
            .unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
