// SPDX-FileCopyrightText: 2026 Google LLC
//
// SPDX-License-Identifier: Apache-2.0

//! Follow `include` directives from a root rule file and merge everything
//! they pull in.

use std::{
    collections::HashSet,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde::Serialize;

use crate::{
    error::{Error, Result},
    paths::normalize,
    rule_file::{BuildRuleParser, BuildRuleSet, RULE_FILE_NAME},
};

/// Union of a root rule file and all of its transitive includes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergedRuleSet {
    pub rules: BuildRuleSet,
    /// Every rule file that contributed, root first, in the order they were
    /// parsed.
    pub files: Vec<PathBuf>,
}

#[derive(Default)]
pub struct RuleSetResolver {
    parser: BuildRuleParser,
}

impl RuleSetResolver {
    pub fn new() -> RuleSetResolver {
        RuleSetResolver::default()
    }

    /// Parse `<root_dir>/Makefile` and the transitive closure of its
    /// includes.
    ///
    /// Include paths are taken relative to `root_dir` at every level, the way
    /// make resolves them when run from that directory. Files are visited
    /// breadth-first in declaration order and each file is parsed at most
    /// once, so include cycles terminate.
    pub fn resolve(&self, root_dir: &Path) -> Result<MergedRuleSet> {
        let root_file = normalize(&root_dir.join(RULE_FILE_NAME));
        let rules = self.parse_file(&root_file)?;

        let mut visited = HashSet::from([root_file.clone()]);
        let mut merged = MergedRuleSet {
            rules,
            files: vec![root_file],
        };

        // The merged include list doubles as the work queue: merging only
        // ever appends, so walking it by index is a breadth-first traversal.
        let mut next = 0;
        while let Some(include) = merged.rules.includes.get(next).cloned() {
            next += 1;

            let path = normalize(&root_dir.join(&include));
            if !visited.insert(path.clone()) {
                log::trace!("{} already parsed, skipping", path.display());
                continue;
            }

            let rules = self.parse_file(&path)?;
            merged.rules.merge(rules);
            merged.files.push(path);
        }

        log::debug!(
            "resolved {} rule files under {}: {} objects, {} search paths",
            merged.files.len(),
            root_dir.display(),
            merged.rules.objects.len(),
            merged.rules.search_paths.len()
        );

        Ok(merged)
    }

    fn parse_file(&self, path: &Path) -> Result<BuildRuleSet> {
        log::trace!("parsing rule file {}", path.display());

        let content = fs::read_to_string(path).map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                Error::MissingFile {
                    path: path.to_path_buf(),
                    source,
                }
            } else {
                Error::io(path, source)
            }
        })?;

        self.parser.parse(&content).map_err(|source| Error::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
