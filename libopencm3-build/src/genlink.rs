// SPDX-FileCopyrightText: 2026 Google LLC
//
// SPDX-License-Identifier: Apache-2.0

//! Linker script generation from the framework's device database.
//!
//! Boards that do not bring their own linker script get one generated:
//! `scripts/genlink.py` looks the device up in `ld/devices.data` and prints
//! preprocessor definitions (`-D_ROM_OFF=...`), which are then used to
//! preprocess the template `ld/linker.ld.S`.

use std::{
    path::{Path, PathBuf},
    process::Command,
};

use crate::{
    board::BoardDescriptor,
    config::BuildConfig,
    error::{Error, Result},
};

pub const GENLINK_SCRIPT: &str = "scripts/genlink.py";
pub const DEVICES_DATA: &str = "ld/devices.data";
pub const LINKER_TEMPLATE: &str = "ld/linker.ld.S";

/// Symbols every usable genlink output defines.
const REQUIRED_SYMBOLS: [&str; 2] = ["_ROM_OFF", "_RAM_OFF"];

pub fn genlink_command(config: &BuildConfig, device: &str) -> Command {
    let mut command = Command::new(&config.python);
    command
        .arg(config.framework_path(GENLINK_SCRIPT))
        .arg(config.framework_path(DEVICES_DATA))
        .arg(device)
        .arg("DEFS")
        .current_dir(&config.framework_dir);
    command
}

/// Run genlink for `device`.
///
/// A script that runs but fails gives `Ok(None)`: the device is simply not
/// in the database and the caller has to cope with a less precise script.
pub fn run_genlink(config: &BuildConfig, device: &str) -> Result<Option<String>> {
    let mut command = genlink_command(config, device);
    let output = command
        .output()
        .map_err(|e| Error::Genlink(format!("failed to run {:?}: {e}", command)))?;

    if !output.status.success() {
        log::warn!(
            "couldn't generate linker script symbols for {device}: {}{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        return Ok(None);
    }

    let symbols = String::from_utf8(output.stdout)
        .map_err(|_| Error::Genlink("output is not valid UTF-8".to_string()))?;
    Ok(Some(symbols.trim().to_string()))
}

/// Check genlink output and fill in memory sizes it could not determine
/// from the board's upload limits.
pub fn complete_device_symbols(symbols: &str, board: &BoardDescriptor) -> Result<String> {
    for required in REQUIRED_SYMBOLS {
        if !symbols.contains(required) {
            return Err(Error::Genlink(format!(
                "output lacks {required}: `{symbols}`"
            )));
        }
    }

    let mut symbols = symbols.trim().to_string();
    if !symbols.contains("-D_ROM=") {
        symbols.push_str(&format!(" -D_ROM={}", board.maximum_size()));
    }
    if !symbols.contains("-D_RAM=") {
        symbols.push_str(&format!(" -D_RAM={}", board.maximum_ram_size()));
    }

    Ok(symbols)
}

/// Preprocessor arguments for the linker template, empty when genlink does
/// not know the device.
pub fn device_symbols(
    config: &BuildConfig,
    board: &BoardDescriptor,
    device: &str,
) -> Result<Vec<String>> {
    let Some(output) = run_genlink(config, device)? else {
        return Ok(vec![]);
    };

    let symbols = complete_device_symbols(&output, board)?;
    Ok(symbols.split_whitespace().map(str::to_string).collect())
}

/// Where the generated script for `device` is written.
pub fn generated_ldscript_path(build_dir: &Path, device: &str) -> PathBuf {
    build_dir.join(format!("generated.{device}.ld"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> BoardDescriptor {
        BoardDescriptor::new("ststm32", "stm32f103c8t6", "cortex-m3").with_memory(65536, 20480)
    }

    #[test]
    fn complete_output_is_kept() {
        let out = "-D_ROM=64K -D_RAM=20K -D_ROM_OFF=0x08000000 -D_RAM_OFF=0x20000000\n";
        assert_eq!(
            complete_device_symbols(out, &board()).unwrap(),
            out.trim()
        );
    }

    #[test]
    fn missing_sizes_come_from_the_board() {
        let out = "-D_ROM_OFF=0x08000000 -D_RAM_OFF=0x20000000";
        assert_eq!(
            complete_device_symbols(out, &board()).unwrap(),
            "-D_ROM_OFF=0x08000000 -D_RAM_OFF=0x20000000 -D_ROM=65536 -D_RAM=20480"
        );
    }

    #[test]
    fn unknown_sizes_default_to_zero() {
        let board = BoardDescriptor::new("ststm32", "stm32f103c8t6", "cortex-m3");
        let out = "-D_ROM=64K -D_ROM_OFF=0x08000000 -D_RAM_OFF=0x20000000";
        assert_eq!(
            complete_device_symbols(out, &board).unwrap(),
            "-D_ROM=64K -D_ROM_OFF=0x08000000 -D_RAM_OFF=0x20000000 -D_RAM=0"
        );
    }

    #[test]
    fn offsets_are_required() {
        let err = complete_device_symbols("-D_ROM=64K -D_RAM_OFF=0x20000000", &board()).unwrap_err();
        assert!(matches!(err, Error::Genlink(msg) if msg.contains("_ROM_OFF")));
    }

    #[test]
    fn command_line() {
        let config = BuildConfig::new("/fw", "/proj/src", "/out").with_python("/usr/bin/python3");
        let command = genlink_command(&config, "stm32f103c8");

        assert_eq!(command.get_program(), "/usr/bin/python3");
        let args: Vec<_> = command.get_args().collect();
        assert_eq!(
            args,
            [
                "/fw/scripts/genlink.py",
                "/fw/ld/devices.data",
                "stm32f103c8",
                "DEFS"
            ]
        );
    }

    #[test]
    fn failing_script_gives_no_symbols() {
        let dir = tempfile::tempdir().unwrap();
        let config = BuildConfig::new(dir.path(), dir.path(), dir.path()).with_python("false");
        assert_eq!(run_genlink(&config, "stm32f103c8").unwrap(), None);
        assert!(device_symbols(&config, &board(), "stm32f103c8")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn missing_interpreter_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = BuildConfig::new(dir.path(), dir.path(), dir.path())
            .with_python(dir.path().join("no-such-python"));
        assert!(matches!(
            run_genlink(&config, "stm32f103c8"),
            Err(Error::Genlink(_))
        ));
    }

    #[test]
    fn generated_path() {
        assert_eq!(
            generated_ldscript_path(Path::new("/out"), "stm32f103c8"),
            Path::new("/out/generated.stm32f103c8.ld")
        );
    }
}
