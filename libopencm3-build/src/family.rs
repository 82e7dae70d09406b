// SPDX-FileCopyrightText: 2026 Google LLC
//
// SPDX-License-Identifier: Apache-2.0

//! Which part of the libopencm3 tree belongs to which chip family.
//!
//! The library tree is laid out per family, but not uniformly: some
//! families use one flat directory (`lib/lm4f`), others nest a directory
//! per series named after a slice of the part number (`lib/stm32/f1` for
//! `stm32f103c8t6`). The rules live in a [`FamilyTable`] so supporting a
//! new family means adding a [`FamilyRule`], not touching the resolver.

use std::{
    ops::Range,
    path::{Path, PathBuf},
};

use serde::Serialize;

use crate::{
    board::BoardDescriptor,
    error::{Error, Result},
};

/// How the target directory below `<framework>/lib` is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeLayout {
    /// A single directory shared by the whole family.
    Flat(&'static str),
    /// `<parent>/<mcu[slice]>`.
    Nested {
        parent: &'static str,
        slice: Range<usize>,
    },
    /// The directory is named after the variant.
    Variant,
}

/// How the variant name is derived from the part number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariantRule {
    /// The full MCU name.
    Mcu,
    /// `mcu[..len]` followed by `suffix`.
    Prefix { len: usize, suffix: &'static str },
}

/// The preprocessor define selecting the family in the libopencm3 headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefineRule {
    Fixed(&'static str),
    /// The variant, upper-cased.
    Variant,
    /// `mcu[..len]`, upper-cased.
    McuPrefix(usize),
}

/// Device name handed to `genlink`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LdDeviceRule {
    Mcu,
    McuPrefix(usize),
    /// The generator cannot produce precise scripts for this family; a
    /// family-wide name is used together with the board's memory sizes.
    Fixed(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyRule {
    pub name: &'static str,
    /// Values of the board's `core` that select this rule.
    pub tags: &'static [&'static str],
    pub layout: TreeLayout,
    pub variant: VariantRule,
    pub define: DefineRule,
    pub ld_device: LdDeviceRule,
}

/// The board-specific corner of the framework tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetTree {
    pub family: &'static str,
    /// Directory holding the rule file for this target.
    pub root_dir: PathBuf,
    pub variant: String,
    pub defines: Vec<String>,
}

fn mcu_slice<'a>(rule: &FamilyRule, mcu: &'a str, slice: Range<usize>) -> Result<&'a str> {
    mcu.get(slice).ok_or_else(|| Error::InvalidMcu {
        mcu: mcu.to_string(),
        family: rule.name,
    })
}

impl FamilyRule {
    pub fn matches(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    pub fn variant(&self, mcu: &str) -> Result<String> {
        match &self.variant {
            VariantRule::Mcu => Ok(mcu.to_string()),
            VariantRule::Prefix { len, suffix } => {
                Ok(format!("{}{suffix}", mcu_slice(self, mcu, 0..*len)?))
            }
        }
    }

    pub fn define(&self, mcu: &str) -> Result<String> {
        match &self.define {
            DefineRule::Fixed(define) => Ok(define.to_string()),
            DefineRule::Variant => Ok(self.variant(mcu)?.to_uppercase()),
            DefineRule::McuPrefix(len) => Ok(mcu_slice(self, mcu, 0..*len)?.to_uppercase()),
        }
    }

    /// Directory of the target's rule file, relative to `<framework>/lib`.
    pub fn library_dir(&self, mcu: &str) -> Result<PathBuf> {
        match &self.layout {
            TreeLayout::Flat(dir) => Ok(PathBuf::from(dir)),
            TreeLayout::Nested { parent, slice } => {
                Ok(Path::new(parent).join(mcu_slice(self, mcu, slice.clone())?))
            }
            TreeLayout::Variant => Ok(PathBuf::from(self.variant(mcu)?)),
        }
    }

    /// Unlike the tree layout, a part number shorter than the prefix is
    /// used as is.
    pub fn ld_device(&self, mcu: &str) -> Result<String> {
        match &self.ld_device {
            LdDeviceRule::Mcu => Ok(mcu.to_string()),
            LdDeviceRule::McuPrefix(len) => Ok(mcu.chars().take(*len).collect()),
            LdDeviceRule::Fixed(device) => Ok(device.to_string()),
        }
    }
}

pub static BUILTIN_FAMILIES: &[FamilyRule] = &[
    FamilyRule {
        name: "titiva",
        tags: &["titiva", "lm4f"],
        layout: TreeLayout::Flat("lm4f"),
        variant: VariantRule::Mcu,
        define: DefineRule::Fixed("LM4F"),
        ld_device: LdDeviceRule::Fixed("lm4f"),
    },
    FamilyRule {
        name: "ststm32",
        tags: &["ststm32", "stm32"],
        layout: TreeLayout::Nested {
            parent: "stm32",
            slice: 5..7,
        },
        variant: VariantRule::Prefix { len: 7, suffix: "" },
        define: DefineRule::Variant,
        ld_device: LdDeviceRule::McuPrefix(11),
    },
    FamilyRule {
        name: "nxplpc",
        tags: &["nxplpc", "lpc"],
        layout: TreeLayout::Variant,
        variant: VariantRule::Prefix {
            len: 5,
            suffix: "xx",
        },
        define: DefineRule::Variant,
        ld_device: LdDeviceRule::Mcu,
    },
    FamilyRule {
        name: "siliconlabsefm32",
        tags: &["siliconlabsefm32", "efm32"],
        layout: TreeLayout::Nested {
            parent: "efm32",
            slice: 5..7,
        },
        variant: VariantRule::Mcu,
        define: DefineRule::McuPrefix(7),
        ld_device: LdDeviceRule::Mcu,
    },
];

#[derive(Debug, Clone)]
pub struct FamilyTable {
    rules: Vec<FamilyRule>,
}

impl Default for FamilyTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl FamilyTable {
    pub fn builtin() -> FamilyTable {
        FamilyTable {
            rules: BUILTIN_FAMILIES.to_vec(),
        }
    }

    pub fn empty() -> FamilyTable {
        FamilyTable { rules: vec![] }
    }

    /// Add a family. Rules added later take precedence for shared tags.
    pub fn with(mut self, rule: FamilyRule) -> FamilyTable {
        self.rules.insert(0, rule);
        self
    }

    pub fn rule(&self, tag: &str) -> Result<&FamilyRule> {
        self.rules
            .iter()
            .find(|rule| rule.matches(tag))
            .ok_or_else(|| Error::UnknownFamily(tag.to_string()))
    }

    /// Map `board` onto the directory of `framework_dir` it builds from.
    pub fn target(&self, board: &BoardDescriptor, framework_dir: &Path) -> Result<TargetTree> {
        let rule = self.rule(board.core())?;
        let mcu = board.mcu();

        let root_dir = framework_dir.join("lib").join(rule.library_dir(mcu)?);
        let variant = rule.variant(mcu)?;
        let defines = vec![rule.define(mcu)?];

        log::debug!(
            "{mcu} ({}) maps to {} variant {variant}",
            rule.name,
            root_dir.display()
        );

        Ok(TargetTree {
            family: rule.name,
            root_dir,
            variant,
            defines,
        })
    }

    /// Device name for linker script generation; the board may override it.
    pub fn ld_device(&self, board: &BoardDescriptor) -> Result<String> {
        if let Some(device) = board.ld_device() {
            return Ok(device.to_string());
        }
        self.rule(board.core())?.ld_device(board.mcu())
    }
}
