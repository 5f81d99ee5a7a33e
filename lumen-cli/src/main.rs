//! Lumen CLI - Image brightness binning and histograms.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;

mod commands;
mod exit_codes;
mod utils;

use exit_codes::ExitCode;

const EXIT_CODES_HELP: &str = "\
Exit codes:
  0   Success
  1   General error
  64  Usage error (invalid bin size or configuration)
  65  Data error (malformed manifest)
  66  Input error (manifest not found or unreadable)
  74  I/O error (cannot write table or histogram)";

#[derive(Parser)]
#[command(name = "lumen")]
#[command(author, version, about = "Image brightness binning and histograms", long_about = None)]
#[command(after_help = EXIT_CODES_HELP)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Suppress human-readable output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Width of each brightness range [env: LUMEN_BIN_SIZE] [default: 100]
    #[arg(long, global = true, value_name = "N")]
    pub bin_size: Option<u64>,

    /// How relative image paths are resolved [env: LUMEN_RESOLVE_AGAINST] [default: cwd]
    #[arg(long, global = true, value_enum)]
    pub resolve_against: Option<ResolveArg>,

    /// Base directory for image paths [env: LUMEN_BASE_DIR]
    #[arg(short = 'b', long, global = true, alias = "base_dir", value_name = "DIR")]
    pub base_dir: Option<PathBuf>,

    /// Score images in parallel [env: LUMEN_PARALLEL]
    #[arg(long, global = true)]
    pub parallel: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ResolveArg {
    /// Use the manifest's relative path as written
    Cwd,
    /// Join the relative path with --base-dir
    BaseDir,
    /// Join the relative path with the manifest's directory
    ManifestDir,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned text table
    #[default]
    Table,
    /// JSON array of {range, count}
    Json,
    /// CSV with a header row
    Csv,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum SortArg {
    Asc,
    Desc,
}

#[derive(Subcommand)]
enum Commands {
    /// Annotate a manifest with brightness ranges and render histograms
    Analyze {
        /// Input manifest (headerless CSV: absolute_path,relative_path)
        #[arg(short, long, default_value = "annotation.csv")]
        annotation: PathBuf,

        /// Output path for the annotated manifest
        #[arg(
            short,
            long,
            alias = "processed_annotation",
            default_value = "processed_annotation.csv"
        )]
        processed_annotation: PathBuf,

        /// Output path for the full histogram
        #[arg(
            long = "histogram",
            alias = "brightness_histogram",
            default_value = "brightness_histogram.png"
        )]
        histogram: PathBuf,

        /// Output path for the filtered histogram
        #[arg(
            short,
            long,
            alias = "filtered_brightness_histogram",
            default_value = "filtered_brightness_histogram.png"
        )]
        filtered_histogram: PathBuf,

        /// Lowest range start included in the filtered histogram
        #[arg(long, default_value_t = 101)]
        filter_min: u64,

        /// Highest range start included in the filtered histogram
        #[arg(long, default_value_t = 200)]
        filter_max: u64,

        /// Order rows of the annotated manifest by range
        #[arg(long, value_enum)]
        sort: Option<SortArg>,
    },

    /// Print or write the annotated manifest ordered by range
    Sort {
        /// Input manifest
        #[arg(value_name = "MANIFEST")]
        manifest: PathBuf,

        /// Highest ranges first
        #[arg(short, long)]
        descending: bool,

        /// Write the table here instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Keep rows whose range start lies within [--min, --max]
    Filter {
        /// Input manifest
        #[arg(value_name = "MANIFEST")]
        manifest: PathBuf,

        /// Lowest range start to keep
        #[arg(long)]
        min: Option<u64>,

        /// Highest range start to keep
        #[arg(long)]
        max: Option<u64>,

        /// Write the table here instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Also render a histogram of the filtered rows
        #[arg(long, value_name = "PNG")]
        histogram: Option<PathBuf>,
    },

    /// Count images per brightness range
    Counts {
        /// Input manifest
        #[arg(value_name = "MANIFEST")]
        manifest: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Step through a manifest the way an image viewer would
    Browse {
        /// Input manifest
        #[arg(value_name = "MANIFEST")]
        manifest: PathBuf,

        /// Display region width
        #[arg(long, default_value_t = 800)]
        width: u32,

        /// Display region height
        #[arg(long, default_value_t = 600)]
        height: u32,

        /// Stop after this many images
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
}

fn main() {
    let cli = Cli::parse();
    utils::init_tracing(cli.global.verbose, cli.global.quiet);

    if let Err(err) = run(cli) {
        let exit = ExitCode::from_anyhow(&err);
        if let Some(message) = &exit.message {
            eprintln!("{} {}", "Error:".red().bold(), message);
        }
        std::process::exit(exit.code);
    }
}

fn run(cli: Cli) -> Result<()> {
    let global = cli.global;

    match cli.command {
        Commands::Analyze {
            annotation,
            processed_annotation,
            histogram,
            filtered_histogram,
            filter_min,
            filter_max,
            sort,
        } => commands::analyze::execute(
            commands::analyze::AnalyzeOptions {
                annotation,
                processed_annotation,
                histogram,
                filtered_histogram,
                filter_min,
                filter_max,
                sort,
            },
            &global,
        ),
        Commands::Sort {
            manifest,
            descending,
            output,
        } => commands::sort::execute(manifest, descending, output, &global),
        Commands::Filter {
            manifest,
            min,
            max,
            output,
            histogram,
        } => commands::filter::execute(manifest, min, max, output, histogram, &global),
        Commands::Counts { manifest, format } => {
            commands::counts::execute(manifest, format, &global)
        }
        Commands::Browse {
            manifest,
            width,
            height,
            limit,
        } => commands::browse::execute(manifest, (width, height), limit, &global),
    }
}
