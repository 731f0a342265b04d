//! myst2ipynb: CLI tool to export MyST documents to Jupyter notebooks

mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use config::{CONFIG_FILE_NAME, Config};
use myst2ipynb_core::{ImageMode, MarkdownFormat};
use myst2ipynb_project::{ExportOptions, export_directory, export_page};

#[derive(Parser, Debug)]
#[command(name = "myst2ipynb")]
#[command(about = "Export MyST documents (page JSON) to Jupyter notebooks")]
#[command(version)]
#[command(subcommand_negates_reqs = true)]
#[command(after_help = "Examples:
  myst2ipynb intro.json                        # Export to intro.ipynb
  myst2ipynb intro.json -o nb/intro.ipynb      # Export to specific output file
  myst2ipynb _build/site/content/ -o nb/ -r    # Export directory
  myst2ipynb intro.json --markdown commonmark --images attachment
  myst2ipynb init                              # Write a sample _myst2ipynb.toml")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Input page JSON file or directory
    #[arg(required = true)]
    input: Option<PathBuf>,

    /// Output file or directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of parallel jobs (defaults to number of CPUs)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Process directories recursively
    #[arg(short, long)]
    recursive: bool,

    /// Markdown dialect for markdown cells
    #[arg(long, value_parser = ["myst", "commonmark"])]
    markdown: Option<String>,

    /// Remove solutions (CommonMark output only)
    #[arg(long)]
    drop_solutions: bool,

    /// Keep image references or embed local images as attachments
    #[arg(long, value_parser = ["reference", "attachment"])]
    images: Option<String>,

    /// Directory that `/`-prefixed image URLs are relative to
    #[arg(long)]
    source_root: Option<PathBuf>,

    /// Configuration file (defaults to _myst2ipynb.toml in the current directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Quiet mode - only show errors
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a sample configuration file
    Init {
        /// Directory to write the configuration file into
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },
    /// Print the JSON schema of the configuration file
    Schema,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Some(Command::Init { ref dir, force }) => return init_config(dir, force),
        Some(Command::Schema) => {
            println!("{}", Config::json_schema_string()?);
            return Ok(());
        }
        None => {}
    }

    let Some(input) = cli.input.as_deref() else {
        anyhow::bail!("No input given");
    };

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_from_dir(Path::new("."))?.unwrap_or_default(),
    };
    let settings = Settings::resolve(&cli, &config)?;

    if input.is_file() {
        convert_file(input, cli.output.as_deref(), &settings.options, cli.quiet)
    } else if input.is_dir() {
        let output_dir = cli.output.as_deref().unwrap_or(input);
        convert_directory(input, output_dir, &settings, cli.quiet)
    } else {
        anyhow::bail!("Input path does not exist: {}", input.display());
    }
}

/// Set up the tracing subscriber; `-v`/`-q` override `RUST_LOG`
fn init_logging(verbose: bool, quiet: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else if quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

/// Effective settings: CLI flags > config file > defaults
struct Settings {
    options: ExportOptions,
    recursive: bool,
    jobs: Option<usize>,
}

impl Settings {
    fn resolve(cli: &Cli, config: &Config) -> Result<Self> {
        let markdown = match cli.markdown.as_deref() {
            Some(value) => value.parse()?,
            None => config.markdown_format()?.unwrap_or(MarkdownFormat::Myst),
        };
        let images = match cli.images.as_deref() {
            Some(value) => value.parse()?,
            None => config.image_mode()?.unwrap_or(ImageMode::Reference),
        };

        Ok(Self {
            options: ExportOptions {
                markdown,
                drop_solutions: cli.drop_solutions
                    || config.markdown.drop_solutions.unwrap_or(false),
                images,
                source_root: cli
                    .source_root
                    .clone()
                    .or_else(|| config.images.source_root.clone()),
            },
            recursive: cli.recursive || config.batch.recursive.unwrap_or(false),
            jobs: cli.jobs.or(config.batch.jobs),
        })
    }
}

/// Export a single page file
fn convert_file(
    input: &Path,
    output: Option<&Path>,
    options: &ExportOptions,
    quiet: bool,
) -> Result<()> {
    tracing::debug!("Exporting: {}", input.display());

    let output_path = export_page(input, output, options)
        .with_context(|| format!("Failed to export: {}", input.display()))?;

    if !quiet {
        println!("{}", output_path.display());
    }

    Ok(())
}

/// Export a directory of page files
fn convert_directory(input: &Path, output: &Path, settings: &Settings, quiet: bool) -> Result<()> {
    let result = export_directory(
        input,
        output,
        settings.recursive,
        &settings.options,
        settings.jobs,
    )
    .with_context(|| format!("Failed to export directory: {}", input.display()))?;

    let total = result.success_count + result.failed_files.len();
    if total == 0 {
        if !quiet {
            eprintln!("No .json page files found in {}", input.display());
        }
        return Ok(());
    }

    if !quiet {
        for path in &result.output_files {
            println!("{}", path.display());
        }
    }

    // Report errors
    for (file, e) in &result.failed_files {
        eprintln!("Error exporting {}: {}", file.display(), e);
    }

    let failed_count = result.failed_files.len();
    if !quiet {
        eprintln!(
            "Exported {} files, {} failed",
            result.success_count, failed_count
        );
    }

    if failed_count > 0 {
        anyhow::bail!("{} files failed to export", failed_count);
    }

    Ok(())
}

/// Write a sample `_myst2ipynb.toml`
fn init_config(dir: &Path, force: bool) -> Result<()> {
    let path = dir.join(CONFIG_FILE_NAME);
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    fs::write(&path, Config::sample().to_toml_with_schema()?)
        .with_context(|| format!("Failed to write: {}", path.display()))?;

    println!("{}", path.display());
    Ok(())
}
