use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use patchorder_core::PatchCategory;

mod completion;
mod dispatch;
mod plan;
mod render;

#[derive(Parser, Debug)]
#[command(name = "patchorder")]
#[command(about = "Dependency-aware ordering of schema and data patches", long_about = None)]
struct Cli {
    /// Patch manifest describing every known patch.
    #[arg(long, default_value = "patches.toml")]
    manifest: PathBuf,
    /// Directory holding the applied-patch history.
    #[arg(long, default_value = ".patchorder")]
    state_root: PathBuf,
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print pending patches in install order.
    InstallOrder {
        #[arg(long, value_enum)]
        category: Option<CliPatchCategory>,
        /// Constructor argument handed to the patch factory, as key=value.
        #[arg(long = "arg")]
        arguments: Vec<String>,
        #[arg(long)]
        json: bool,
    },
    /// Print applied patches in uninstall order.
    UninstallOrder {
        #[arg(long, value_enum)]
        category: Option<CliPatchCategory>,
        #[arg(long = "arg")]
        arguments: Vec<String>,
        #[arg(long)]
        json: bool,
    },
    /// Print alias to patch mappings.
    Aliases {
        #[arg(long, value_enum)]
        category: Option<CliPatchCategory>,
        #[arg(long = "arg")]
        arguments: Vec<String>,
    },
    MarkApplied {
        name: String,
        /// Required when the patch is not defined in the manifest.
        #[arg(long, value_enum)]
        category: Option<CliPatchCategory>,
    },
    Unmark {
        name: String,
    },
    Applied,
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum CliPatchCategory {
    Data,
    Schema,
}

impl From<CliPatchCategory> for PatchCategory {
    fn from(value: CliPatchCategory) -> Self {
        match value {
            CliPatchCategory::Data => PatchCategory::Data,
            CliPatchCategory::Schema => PatchCategory::Schema,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    dispatch::run_cli(cli)
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("patchorder=debug,patchorder_resolver=debug,patchorder_ledger=debug")
        } else {
            EnvFilter::new("warn")
        }
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
