//! Sky command-line tool
//!
//! Runs, checks, compiles and inspects Sky programs.

mod commands;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use output::StyledOutput;

#[derive(Parser)]
#[command(name = "sky")]
#[command(about = "Sky programming language toolchain", long_about = None)]
#[command(version)]
struct Cli {
    /// When to use colors: auto, always or never
    #[arg(long, global = true, default_value = "auto", value_parser = ["auto", "always", "never"])]
    color: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a .sky or .skyc file (default: project.entry from sky.toml)
    Run {
        /// Input file
        file: Option<PathBuf>,
        /// Print every executed instruction to stderr
        #[arg(long)]
        trace: bool,
        /// Maximum call depth, the main frame included
        #[arg(long)]
        max_frames: Option<usize>,
        /// Skip the semantic checker
        #[arg(long)]
        no_check: bool,
    },

    /// Check files without running them
    Check {
        /// Files to check
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Compile a source file to JSON bytecode (.skyc)
    Build {
        /// Input file
        file: PathBuf,
        /// Output file (default: input with .skyc extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print a bytecode listing
    Disasm {
        /// Input file (.sky or .skyc)
        file: PathBuf,
    },

    /// Print the token stream
    Tokens {
        /// Input file
        file: PathBuf,
    },

    /// Print the parsed program
    Ast {
        /// Input file
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    let choice = output::resolve_color_choice(Some(&cli.color));
    let mut out = StyledOutput::new(choice);

    let result = match cli.command {
        Commands::Run {
            file,
            trace,
            max_frames,
            no_check,
        } => commands::run::execute(commands::run::RunArgs {
            file,
            trace,
            max_frames,
            no_check,
        }),
        Commands::Check { files } => commands::check::execute(&files, &mut out),
        Commands::Build { file, output } => commands::build::execute(&file, output, &mut out),
        Commands::Disasm { file } => commands::inspect::disasm(&file, &mut out),
        Commands::Tokens { file } => commands::inspect::tokens(&file, &mut out),
        Commands::Ast { file } => commands::inspect::ast(&file, &mut out),
    };

    out.flush();
    if let Err(err) = result {
        out.stderr_error(&format!("{:#}", err));
        std::process::exit(1);
    }
}
