// SPDX-FileCopyrightText: 2026 Google LLC
//
// SPDX-License-Identifier: Apache-2.0

//! Lexical path helpers.

use std::path::{Component, Path, PathBuf};

/// Collapse `.` and `..` components without touching the filesystem.
///
/// `..` at the start of a relative path is kept, `..` directly below the
/// root is dropped. An empty result becomes `.`.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out: Vec<Component> = vec![];

    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                Some(Component::ParentDir) | None => out.push(comp),
                Some(Component::CurDir) => unreachable!("never pushed"),
            },
            other => out.push(other),
        }
    }

    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().collect()
}

/// Append `value` unless it is already present.
pub(crate) fn push_unique<T: PartialEq>(list: &mut Vec<T>, value: T) -> bool {
    if list.contains(&value) {
        false
    } else {
        list.push(value);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_parent_dirs() {
        assert_eq!(
            normalize(Path::new("/fw/lib/stm32/f1/../common/./adc.c")),
            PathBuf::from("/fw/lib/stm32/common/adc.c")
        );
    }

    #[test]
    fn keeps_leading_parent_of_relative_paths() {
        assert_eq!(
            normalize(Path::new("../../cm3/./vector.c")),
            PathBuf::from("../../cm3/vector.c")
        );
        assert_eq!(normalize(Path::new("a/../..")), PathBuf::from(".."));
    }

    #[test]
    fn parent_of_root_is_root() {
        assert_eq!(normalize(Path::new("/../x")), PathBuf::from("/x"));
    }

    #[test]
    fn empty_becomes_current_dir() {
        assert_eq!(normalize(Path::new("./a/..")), PathBuf::from("."));
    }

    #[test]
    fn push_unique_keeps_first_position() {
        let mut list = vec!["a", "b"];
        assert!(!push_unique(&mut list, "a"));
        assert!(push_unique(&mut list, "c"));
        assert_eq!(list, ["a", "b", "c"]);
    }
}
