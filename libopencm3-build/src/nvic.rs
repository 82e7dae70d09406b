// SPDX-FileCopyrightText: 2026 Google LLC
//
// SPDX-License-Identifier: Apache-2.0

//! The libopencm3 headers include an `nvic.h` per family that is generated
//! from `irq.json` by `scripts/irq2nvic_h`. A fresh checkout does not have
//! them; we only detect that here.

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::error::{Error, Result};

pub const IRQ_DESCRIPTOR: &str = "irq.json";
pub const NVIC_HEADER: &str = "nvic.h";

/// Directories below `<framework>/include/libopencm3` with an
/// `irq.json` but no `nvic.h`, sorted.
pub fn pending_nvic_headers(framework_dir: &Path) -> Result<Vec<PathBuf>> {
    let root = framework_dir.join("include").join("libopencm3");
    let mut pending = vec![];

    if root.is_dir() {
        walk(&root, &mut pending)?;
    }

    pending.sort();
    Ok(pending)
}

fn walk(dir: &Path, pending: &mut Vec<PathBuf>) -> Result<()> {
    if dir.join(IRQ_DESCRIPTOR).is_file() && !dir.join(NVIC_HEADER).is_file() {
        pending.push(dir.to_path_buf());
    }

    for entry in fs::read_dir(dir).map_err(|e| Error::io(dir, e))? {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        let file_type = entry.file_type().map_err(|e| Error::io(entry.path(), e))?;
        if file_type.is_dir() {
            walk(&entry.path(), pending)?;
        }
    }

    Ok(())
}
