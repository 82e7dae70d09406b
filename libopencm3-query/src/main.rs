// SPDX-FileCopyrightText: 2026 Google LLC
//
// SPDX-License-Identifier: Apache-2.0

//! Inspect how libopencm3 resolves for a board without running a build.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use libopencm3_build::{
    build_utils::{linker_script_plan, LinkerScriptPlan},
    config::{DEFAULT_NAMESPACE, FRAMEWORK_DIR_ENV, PYTHON_ENV},
    nvic, resolve, BoardDescriptor, BuildConfig, FamilyTable, FrameworkBuild,
};

#[derive(Parser)]
#[command(name = "libopencm3-query")]
#[command(about = "Show sources, linker script and flags libopencm3 resolves to for a board")]
struct Cli {
    /// libopencm3 checkout
    #[arg(short, long, env = FRAMEWORK_DIR_ENV)]
    framework_dir: PathBuf,

    /// Project source directory, searched for board linker scripts
    #[arg(short, long, default_value = "src")]
    project_src_dir: PathBuf,

    /// Directory build artifacts would be placed in
    #[arg(short, long, default_value = "build")]
    build_dir: PathBuf,

    #[arg(long, default_value = DEFAULT_NAMESPACE)]
    namespace: String,

    /// Interpreter for the linker script generator
    #[arg(long, env = PYTHON_ENV, default_value = "python3")]
    python: PathBuf,

    /// Increase log verbosity, repeat for more
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct BoardSource {
    /// Board manifest in JSON
    #[arg(long)]
    board: Option<PathBuf>,

    /// Cargo.toml with a [package.metadata.libopencm3] table
    #[arg(long)]
    cargo_toml: Option<PathBuf>,
}

impl BoardSource {
    fn load(&self) -> Result<BoardDescriptor> {
        match (&self.board, &self.cargo_toml) {
            (Some(path), _) => BoardDescriptor::from_json_file(path)
                .with_context(|| format!("reading board {}", path.display())),
            (None, Some(path)) => BoardDescriptor::from_cargo_metadata(path)
                .with_context(|| format!("reading board from {}", path.display())),
            (None, None) => unreachable!("clap requires one board source"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List the C sources that go into the library
    Sources {
        #[command(flatten)]
        board: BoardSource,

        /// Print paths relative to the framework directory
        #[arg(short, long)]
        relative: bool,

        /// Print object paths in the build namespace instead
        #[arg(short, long, conflicts_with = "relative")]
        artifacts: bool,
    },
    /// Print the selected linker script, if any
    Ldscript {
        #[command(flatten)]
        board: BoardSource,
    },
    /// Print compiler and linker flags
    Flags {
        #[command(flatten)]
        board: BoardSource,
    },
    /// Print the target directory, variant and defines as JSON
    Target {
        #[command(flatten)]
        board: BoardSource,
    },
    /// List family directories whose nvic.h has not been generated
    Nvic,
    /// Dump the full resolution as JSON
    Resolve {
        #[command(flatten)]
        board: BoardSource,
    },
}

fn print_flags(build: &FrameworkBuild) {
    let flags = &build.flags;
    let defines: Vec<_> = flags.defines.iter().map(|d| d.flag()).collect();
    let includes: Vec<_> = flags
        .include_dirs
        .iter()
        .map(|dir| format!("-I{}", dir.display()))
        .collect();
    let lib_dirs: Vec<_> = flags
        .lib_dirs
        .iter()
        .map(|dir| format!("-L{}", dir.display()))
        .collect();
    let libs: Vec<_> = flags.libs.iter().map(|lib| format!("-l{lib}")).collect();

    println!("CCFLAGS   = {}", flags.ccflags.join(" "));
    println!("CFLAGS    = {}", flags.cflags.join(" "));
    println!("CXXFLAGS  = {}", flags.cxxflags.join(" "));
    println!("ASFLAGS   = {}", flags.asflags.join(" "));
    println!("CPPFLAGS  = {} {}", defines.join(" "), includes.join(" "));
    println!("LINKFLAGS = {}", flags.linkflags.join(" "));
    println!("LIBS      = {} {}", lib_dirs.join(" "), libs.join(" "));
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => log::Level::Warn,
        1 => log::Level::Info,
        2 => log::Level::Debug,
        _ => log::Level::Trace,
    };
    simple_logger::init_with_level(level)?;

    let config = BuildConfig::new(&cli.framework_dir, &cli.project_src_dir, &cli.build_dir)
        .with_namespace(cli.namespace)
        .with_python(cli.python);

    match cli.command {
        Commands::Sources {
            board,
            relative,
            artifacts,
        } => {
            let build = resolve(&config, &board.load()?)?;
            if artifacts {
                for path in build.artifact_paths(&config) {
                    println!("{}", path.display());
                }
            } else {
                for src in &build.sources {
                    let path = if relative { &src.relative } else { &src.path };
                    println!("{}", path.display());
                }
            }
        }
        Commands::Ldscript { board } => {
            let board = board.load()?;
            let build = resolve(&config, &board)?;
            match linker_script_plan(&board, &build) {
                LinkerScriptPlan::Selected(path) => println!("{}", path.display()),
                LinkerScriptPlan::Generate => log::warn!(
                    "no linker script selected, one would be generated for {}",
                    build.ld_device
                ),
                LinkerScriptPlan::Missing => anyhow::bail!(
                    "board linker script not found in {}",
                    config.project_src_dir.display()
                ),
            }
        }
        Commands::Flags { board } => print_flags(&resolve(&config, &board.load()?)?),
        Commands::Target { board } => {
            let target = FamilyTable::builtin().target(&board.load()?, &config.framework_dir)?;
            println!("{}", serde_json::to_string_pretty(&target)?);
        }
        Commands::Nvic => {
            for dir in nvic::pending_nvic_headers(&config.framework_dir)? {
                println!("{}", dir.display());
            }
        }
        Commands::Resolve { board } => {
            let build = resolve(&config, &board.load()?)?;
            println!("{}", serde_json::to_string_pretty(&build)?);
        }
    }

    Ok(())
}
