use crate::config::ProjectConfig;
use crate::diagnostics::DiagnosticsWalker;
use crate::output;
use crate::peek::PeekResolver;
use crate::project::Project;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        default_value = "tsconfig.json",
        help = "Path to the tsconfig.json used for module resolution"
    )]
    pub tsconfig: PathBuf,

    #[arg(short, long, global = true, help = "Show debug logging on stderr")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the definitions of every identifier in a line range
    Peek {
        #[arg(help = "Source file to peek into")]
        filepath: PathBuf,

        #[arg(help = "First line of the range (1-based)")]
        from_line: usize,

        #[arg(help = "Last line of the range (inclusive)")]
        to_line: usize,
    },

    /// Check that the imports reachable from a file resolve to real exports
    Diagnose {
        #[arg(help = "Entry file of the import walk")]
        filepath: PathBuf,
    },
}

pub fn run(cli: &Cli) -> Result<()> {
    let project = Project::new(ProjectConfig::load_or_default(&cli.tsconfig));
    info!("Project root: {}", project.config().root_dir.display());

    match &cli.command {
        Commands::Peek {
            filepath,
            from_line,
            to_line,
        } => {
            let result = PeekResolver::new(&project)
                .peek(filepath, *from_line, *to_line)
                .with_context(|| format!("Peek failed for {}", filepath.display()))?;
            output::print_json(&result)?;
        }

        Commands::Diagnose { filepath } => {
            let result = DiagnosticsWalker::new(&project).diagnose(filepath);
            output::print_json(&result)?;
        }
    }

    info!("Loaded {} source files", project.loaded_file_count());
    Ok(())
}
