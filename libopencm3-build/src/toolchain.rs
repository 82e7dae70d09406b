// SPDX-FileCopyrightText: 2026 Google LLC
//
// SPDX-License-Identifier: Apache-2.0

//! Compiler, assembler and linker flags for building libopencm3.

use std::path::PathBuf;

use serde::Serialize;

use crate::{board::BoardDescriptor, config::BuildConfig, family::TargetTree};

const CCFLAGS: &[&str] = &[
    "-Os",
    "-ffunction-sections",
    "-fdata-sections",
    "-Wall",
    "-Wextra",
    "-Wredundant-decls",
    "-Wshadow",
    "-fno-common",
    "-mthumb",
];

const CFLAGS: &[&str] = &[
    "-Wimplicit-function-declaration",
    "-Wmissing-prototypes",
    "-Wstrict-prototypes",
];

const CXXFLAGS: &[&str] = &["-fno-rtti", "-fno-exceptions"];

const LINKFLAGS: &[&str] = &["-Os", "-Wl,--gc-sections", "-mthumb"];

const LINKFLAGS_TAIL: &[&str] = &[
    "-nostartfiles",
    "--static",
    "--specs=nano.specs",
    "--specs=nosys.specs",
];

const LIBS: &[&str] = &["c", "gcc", "m", "stdc++", "nosys"];

/// A preprocessor definition, `NAME` or `NAME=value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Define {
    pub name: String,
    pub value: Option<String>,
}

impl Define {
    pub fn flag(&self) -> String {
        match &self.value {
            Some(value) => format!("-D{}={value}", self.name),
            None => format!("-D{}", self.name),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ToolchainFlags {
    /// Shared by C, C++ and assembly.
    pub ccflags: Vec<String>,
    pub cflags: Vec<String>,
    pub cxxflags: Vec<String>,
    pub asflags: Vec<String>,
    pub linkflags: Vec<String>,
    pub defines: Vec<Define>,
    pub include_dirs: Vec<PathBuf>,
    pub lib_dirs: Vec<PathBuf>,
    pub libs: Vec<String>,
}

/// FPU variant for cores that have one, e.g. `4-sp` for `-mfpu=fpv4-sp-d16`.
pub fn fpu_version(cpu: &str, mcu: &str) -> Option<&'static str> {
    match cpu {
        "cortex-m4" | "cortex-m7" if mcu.starts_with("stm32h7") => Some("5"),
        "cortex-m7" => Some("5-sp"),
        "cortex-m4" => Some("4-sp"),
        _ => None,
    }
}

fn owned(flags: &[&str]) -> Vec<String> {
    flags.iter().map(|flag| flag.to_string()).collect()
}

impl ToolchainFlags {
    pub fn for_board(config: &BuildConfig, board: &BoardDescriptor, target: &TargetTree) -> Self {
        let cpu_flag = format!("-mcpu={}", board.cpu());

        let mut ccflags = owned(CCFLAGS);
        ccflags.push(cpu_flag.clone());

        let mut linkflags = owned(LINKFLAGS);
        linkflags.push(cpu_flag);
        linkflags.extend(owned(LINKFLAGS_TAIL));

        if let Some(version) = fpu_version(board.cpu(), board.mcu()) {
            let fpu = [
                "-mfloat-abi=hard".to_string(),
                format!("-mfpu=fpv{version}-d16"),
            ];
            ccflags.extend(fpu.iter().cloned());
            linkflags.extend(fpu);
        }

        let mut asflags = vec!["-x".to_string(), "assembler-with-cpp".to_string()];
        asflags.extend(ccflags.iter().cloned());

        let mut defines = vec![];
        if let Some(f_cpu) = board.f_cpu() {
            defines.push(Define {
                name: "F_CPU".to_string(),
                value: Some(f_cpu.to_string()),
            });
        }
        if let Some(variant) = board.variant() {
            defines.push(Define {
                name: variant.to_uppercase(),
                value: None,
            });
        }
        for define in &target.defines {
            let define = Define {
                name: define.clone(),
                value: None,
            };
            if !defines.contains(&define) {
                defines.push(define);
            }
        }

        ToolchainFlags {
            ccflags,
            cflags: owned(CFLAGS),
            cxxflags: owned(CXXFLAGS),
            asflags,
            linkflags,
            defines,
            include_dirs: vec![config.framework_dir.clone(), config.include_dir()],
            lib_dirs: vec![config.lib_dir()],
            libs: owned(LIBS),
        }
    }

    /// Architecture flags (`-m...`), as needed when preprocessing linker
    /// scripts.
    pub fn machine_flags(&self) -> impl Iterator<Item = &str> {
        self.ccflags
            .iter()
            .map(String::as_str)
            .filter(|flag| flag.starts_with("-m"))
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::family::FamilyTable;

    fn flags(board: &BoardDescriptor) -> ToolchainFlags {
        let config = BuildConfig::new("/fw", "/proj/src", "/out");
        let target = FamilyTable::builtin()
            .target(board, &config.framework_dir)
            .unwrap();
        ToolchainFlags::for_board(&config, board, &target)
    }

    #[test]
    fn fpu_selection() {
        assert_eq!(fpu_version("cortex-m3", "stm32f103c8t6"), None);
        assert_eq!(fpu_version("cortex-m0", "stm32f030f4p6"), None);
        assert_eq!(fpu_version("cortex-m4", "stm32f407vgt6"), Some("4-sp"));
        assert_eq!(fpu_version("cortex-m7", "stm32f767zi"), Some("5-sp"));
        assert_eq!(fpu_version("cortex-m7", "stm32h743zi"), Some("5"));
        assert_eq!(fpu_version("cortex-m4", "stm32h745zi"), Some("5"));
    }

    #[test]
    fn cortex_m3_has_no_float_abi() {
        let flags = flags(&BoardDescriptor::new("ststm32", "stm32f103c8t6", "cortex-m3"));
        assert!(flags.ccflags.contains(&"-mcpu=cortex-m3".to_string()));
        assert!(!flags.ccflags.iter().any(|f| f.starts_with("-mfloat-abi")));
        assert_eq!(
            flags.linkflags,
            [
                "-Os",
                "-Wl,--gc-sections",
                "-mthumb",
                "-mcpu=cortex-m3",
                "-nostartfiles",
                "--static",
                "--specs=nano.specs",
                "--specs=nosys.specs"
            ]
        );
    }

    #[test]
    fn cortex_m4_gets_hard_float() {
        let flags = flags(&BoardDescriptor::new("ststm32", "stm32f407vgt6", "cortex-m4"));
        assert!(flags.ccflags.ends_with(&[
            "-mcpu=cortex-m4".to_string(),
            "-mfloat-abi=hard".to_string(),
            "-mfpu=fpv4-sp-d16".to_string()
        ]));
        assert!(flags.linkflags.ends_with(&[
            "-mfloat-abi=hard".to_string(),
            "-mfpu=fpv4-sp-d16".to_string()
        ]));
    }

    #[test]
    fn asflags_copy_ccflags() {
        let flags = flags(&BoardDescriptor::new("ststm32", "stm32f407vgt6", "cortex-m4"));
        assert_eq!(&flags.asflags[..2], ["-x", "assembler-with-cpp"]);
        assert_eq!(flags.asflags[2..], flags.ccflags[..]);
    }

    #[test]
    fn defines_and_paths() {
        let board = BoardDescriptor::new("ststm32", "stm32f103c8t6", "cortex-m3")
            .with_f_cpu("72000000L")
            .with_variant("stm32f1");
        let flags = flags(&board);

        let defines: Vec<_> = flags.defines.iter().map(Define::flag).collect();
        assert_eq!(defines, ["-DF_CPU=72000000L", "-DSTM32F1"]);
        assert_eq!(
            flags.include_dirs,
            [Path::new("/fw"), Path::new("/fw/include")]
        );
        assert_eq!(flags.lib_dirs, [Path::new("/fw/lib")]);
        assert_eq!(flags.libs, ["c", "gcc", "m", "stdc++", "nosys"]);
    }

    #[test]
    fn machine_flags() {
        let flags = flags(&BoardDescriptor::new("titiva", "lm4f120h5qr", "cortex-m4"));
        let machine: Vec<_> = flags.machine_flags().collect();
        assert_eq!(
            machine,
            [
                "-mthumb",
                "-mcpu=cortex-m4",
                "-mfloat-abi=hard",
                "-mfpu=fpv4-sp-d16"
            ]
        );
        assert_eq!(flags.defines.len(), 1);
        assert_eq!(flags.defines[0].flag(), "-DLM4F");
    }
}
