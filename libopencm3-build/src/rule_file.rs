// SPDX-FileCopyrightText: 2026 Google LLC
//
// SPDX-License-Identifier: Apache-2.0

//! Parser for the make dialect used by the libopencm3 library makefiles.
//!
//! Only three kinds of lines matter to us:
//!
//! ```text
//! include ../../Makefile.include
//! VPATH += ../../usb:../:../../cm3:../common
//! OBJS += adc.o adc_common_v1.o can.o \
//!         crc_common_all.o
//! ```
//!
//! Everything else (recipes, other variables, conditionals) is ignored.

use std::fmt::{self, Display};

use regex::Regex;
use serde::Serialize;

use crate::paths::push_unique;

/// Name of the rule file at the root of every parsed directory.
pub const RULE_FILE_NAME: &str = "Makefile";

/// Search path every rule set starts with.
pub const CURRENT_DIR: &str = "./";

pub const OBJECT_SUFFIX: &str = ".o";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// No `OBJS` assignment listing at least one `.o` token.
    MissingObjectList,
}

impl Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::MissingObjectList => {
                write!(f, "no `OBJS` assignment listing object files")
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// The parts of one rule file we care about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildRuleSet {
    pub includes: Vec<String>,
    /// Always starts with [`CURRENT_DIR`].
    pub search_paths: Vec<String>,
    /// Object tokens in declaration order, without duplicates.
    pub objects: Vec<String>,
}

impl Default for BuildRuleSet {
    fn default() -> Self {
        BuildRuleSet {
            includes: vec![],
            search_paths: vec![CURRENT_DIR.to_string()],
            objects: vec![],
        }
    }
}

impl BuildRuleSet {
    /// Order-preserving union with `other`, field by field.
    pub fn merge(&mut self, other: BuildRuleSet) {
        for include in other.includes {
            push_unique(&mut self.includes, include);
        }
        for path in other.search_paths {
            push_unique(&mut self.search_paths, path);
        }
        for obj in other.objects {
            push_unique(&mut self.objects, obj);
        }
    }
}

pub struct BuildRuleParser {
    re_continuation: Regex,
    re_include: Regex,
    re_vpath: Regex,
    re_objs: Regex,
}

impl Default for BuildRuleParser {
    fn default() -> Self {
        Self::new()
    }
}

impl BuildRuleParser {
    pub fn new() -> BuildRuleParser {
        BuildRuleParser {
            re_continuation: Regex::new(r"\\\r?\n").expect("valid continuation pattern"),
            re_include: Regex::new(r"(?m)^include[ \t]+([^\r\n]+)")
                .expect("valid include pattern"),
            re_vpath: Regex::new(r"(?m)^VPATH[ \t]*\+?=([^\r\n]*)")
                .expect("valid VPATH pattern"),
            re_objs: Regex::new(r"(?m)^OBJS[ \t]*\+?=([^\r\n]*)").expect("valid OBJS pattern"),
        }
    }

    /// Parse the contents of a single rule file. Includes are recorded, not
    /// followed.
    pub fn parse(&self, content: &str) -> Result<BuildRuleSet, ParseError> {
        let content = self.re_continuation.replace_all(content, " ");
        let mut rules = BuildRuleSet::default();

        for cap in self.re_include.captures_iter(&content) {
            let include = cap[1].trim();
            if !include.is_empty() {
                push_unique(&mut rules.includes, include.to_string());
            }
        }

        for cap in self.re_vpath.captures_iter(&content) {
            for path in cap[1].split(':').map(str::trim).filter(|p| !p.is_empty()) {
                push_unique(&mut rules.search_paths, path.to_string());
            }
        }

        let mut found_list = false;
        for cap in self.re_objs.captures_iter(&content) {
            for token in cap[1].split_whitespace() {
                if token.len() > OBJECT_SUFFIX.len() && token.ends_with(OBJECT_SUFFIX) {
                    found_list = true;
                    push_unique(&mut rules.objects, token.to_string());
                } else {
                    log::debug!("skipping non-object token `{token}` in OBJS");
                }
            }
        }

        if !found_list {
            return Err(ParseError::MissingObjectList);
        }

        Ok(rules)
    }
}
