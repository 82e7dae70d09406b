// SPDX-FileCopyrightText: 2026 Google LLC
//
// SPDX-License-Identifier: Apache-2.0

//! Map object tokens to the C sources that produce them.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::{
    paths::{normalize, push_unique},
    resolver::MergedRuleSet,
    rule_file::OBJECT_SUFFIX,
};

pub const SOURCE_SUFFIX: &str = ".c";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFile {
    /// Location on disk.
    pub path: PathBuf,
    /// Location relative to the framework directory. Sources found outside
    /// of it keep their absolute path here.
    pub relative: PathBuf,
}

impl SourceFile {
    /// Where the object for this source lives inside a build namespace.
    pub fn artifact_path(&self, namespace: &Path) -> PathBuf {
        namespace.join(&self.relative)
    }
}

/// Sources in object declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResolvedSourceList(Vec<SourceFile>);

impl ResolvedSourceList {
    pub fn iter(&self) -> std::slice::Iter<'_, SourceFile> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.0.iter().map(|src| src.path.as_path())
    }

    pub fn relative_paths(&self) -> impl Iterator<Item = &Path> {
        self.0.iter().map(|src| src.relative.as_path())
    }

    pub fn artifact_paths<'a>(&'a self, namespace: &'a Path) -> impl Iterator<Item = PathBuf> + 'a {
        self.0.iter().map(move |src| src.artifact_path(namespace))
    }
}

impl<'a> IntoIterator for &'a ResolvedSourceList {
    type Item = &'a SourceFile;
    type IntoIter = std::slice::Iter<'a, SourceFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

pub struct SourceFileLocator<'a> {
    framework_dir: &'a Path,
}

impl<'a> SourceFileLocator<'a> {
    /// `framework_dir` is the root the `relative` paths are expressed
    /// against.
    pub fn new(framework_dir: &'a Path) -> Self {
        SourceFileLocator { framework_dir }
    }

    /// Find a source for every object in `rules`, looking in the search
    /// paths (relative to `root_dir`) in order. The first existing file
    /// wins.
    ///
    /// Objects without a source on any search path are left out without
    /// an error. Rule files list objects for parts whose sources are not
    /// shipped in every tree, and those have to be skipped.
    pub fn locate(&self, rules: &MergedRuleSet, root_dir: &Path) -> ResolvedSourceList {
        let framework_dir = normalize(self.framework_dir);
        let mut sources = vec![];

        for obj in &rules.rules.objects {
            let Some(stem) = obj.strip_suffix(OBJECT_SUFFIX) else {
                continue;
            };
            let file_name = format!("{stem}{SOURCE_SUFFIX}");

            let found = rules
                .rules
                .search_paths
                .iter()
                .map(|search_path| normalize(&root_dir.join(search_path).join(&file_name)))
                .find(|candidate| candidate.is_file());

            let Some(path) = found else {
                log::debug!("no source for {obj} on any search path, omitting it");
                continue;
            };

            let relative = path
                .strip_prefix(&framework_dir)
                .map(Path::to_path_buf)
                .unwrap_or_else(|_| path.clone());

            log::trace!("{obj} -> {}", relative.display());
            push_unique(&mut sources, SourceFile { path, relative });
        }

        ResolvedSourceList(sources)
    }
}
