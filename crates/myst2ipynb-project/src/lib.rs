//! myst2ipynb-project: Project-level operations for MyST to ipynb export
//!
//! This crate provides the filesystem side of the conversion:
//! - Loading MyST page JSON
//! - Collecting local images for attachment mode
//! - Single page and parallel batch export
//!
//! This crate is designed to be used by various interfaces (CLI, build tools, etc.)

pub mod images;
pub mod page;

pub use images::{collect_image_data, resolve_image_path};
pub use page::MystPage;

use myst2ipynb_core::{
    CommonMarkOptions, ExportEntry, Frontmatter, ImageMode, Images, IpynbOptions, MarkdownFormat,
    MystMarkdown, Notebook, to_ipynb_with,
};
use myst_mdast::{Diagnostic, DiagnosticSink};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

/// Errors that can occur during export
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON in {file}: {source}")]
    Json {
        file: PathBuf,
        source: serde_json::Error,
    },

    #[error("Directory not found: {0}")]
    DirectoryNotFound(PathBuf),
}

/// Result type for project operations
pub type Result<T> = std::result::Result<T, ProjectError>;

/// Extension of exported notebooks
pub const NOTEBOOK_EXTENSION: &str = "ipynb";

/// Options for exporting pages
///
/// A page's own ipynb export entry (frontmatter `exports`) takes precedence
/// over `markdown` and `images`.
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Markdown dialect for markdown cells
    pub markdown: MarkdownFormat,
    /// Remove solutions (CommonMark output only)
    pub drop_solutions: bool,
    /// Keep image references or embed local images as attachments
    pub images: ImageMode,
    /// Directory that `/`-prefixed image URLs are relative to.
    /// Defaults to the input directory for batch export and the page's
    /// directory for single pages.
    pub source_root: Option<PathBuf>,
}

/// Result of a batch export
#[derive(Debug)]
pub struct ExportResult {
    /// Number of successfully exported pages
    pub success_count: usize,
    /// Pages that failed to export, with their errors
    pub failed_files: Vec<(PathBuf, String)>,
    /// Notebooks that were written
    pub output_files: Vec<PathBuf>,
}

/// Outcome of exporting a single page in a batch
enum ExportOutcome {
    Success(PathBuf),
    Failed(PathBuf, String),
}

/// Forwards writer diagnostics to the log
struct LogSink<'a> {
    file: &'a Path,
}

impl DiagnosticSink for LogSink<'_> {
    fn report(&mut self, diagnostic: Diagnostic) {
        tracing::debug!(
            "{}: {} ({})",
            self.file.display(),
            diagnostic.message,
            diagnostic.node_type
        );
    }
}

/// Build the notebook for a loaded page.
///
/// `page_path` locates document-relative images.
pub fn render_notebook(page: &MystPage, page_path: &Path, options: &ExportOptions) -> Notebook {
    let entry = page.frontmatter.ipynb_export();
    let markdown = entry
        .and_then(ExportEntry::markdown_format)
        .unwrap_or(options.markdown);
    let image_mode = entry
        .and_then(ExportEntry::image_mode)
        .unwrap_or(options.images);

    let image_data = (image_mode == ImageMode::Attachment).then(|| {
        let source_root = match &options.source_root {
            Some(root) => root.clone(),
            None => page_dir(page_path).to_path_buf(),
        };
        collect_image_data(&page.mdast, page_path, &source_root)
    });
    let images = match &image_data {
        Some(data) => Images::Attachment(data),
        None => Images::Reference,
    };

    let ipynb_options = IpynbOptions {
        markdown,
        commonmark: CommonMarkOptions {
            drop_solutions: options.drop_solutions,
        },
        images,
    };

    let mut sink = LogSink { file: page_path };
    match to_ipynb_with(
        &MystMarkdown::default(),
        &page.mdast,
        Some(&page.frontmatter),
        &ipynb_options,
        &mut sink,
    ) {
        Ok(notebook) => notebook,
        Err(err) => match err.source {},
    }
}

/// Export a single page file.
///
/// Without an explicit `output`, the page's ipynb export `output` is used
/// (relative to the page), falling back to `<stem>.ipynb` next to the input.
pub fn export_page(input: &Path, output: Option<&Path>, options: &ExportOptions) -> Result<PathBuf> {
    let page = MystPage::load(input)?;
    let notebook = render_notebook(&page, input, options);

    let output_path = match output {
        Some(path) => path.to_path_buf(),
        None => default_output_path(input, &page.frontmatter),
    };
    write_notebook(&notebook, &output_path)?;

    Ok(output_path)
}

/// Export every page (`.json`) in a directory to `output_dir`, in parallel.
///
/// The input tree is mirrored into `output_dir`. A page that fails is
/// recorded in [`ExportResult::failed_files`] and does not stop the batch.
pub fn export_directory(
    input_dir: &Path,
    output_dir: &Path,
    recursive: bool,
    options: &ExportOptions,
    parallel_jobs: Option<usize>,
) -> Result<ExportResult> {
    if !input_dir.is_dir() {
        return Err(ProjectError::DirectoryNotFound(input_dir.to_path_buf()));
    }

    // Configure thread pool if specified
    if let Some(n) = parallel_jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
            .ok();
    }

    fs::create_dir_all(output_dir)?;

    let mut files = collect_page_files(input_dir, recursive)?;
    files.sort();

    let page_options = ExportOptions {
        source_root: Some(
            options
                .source_root
                .clone()
                .unwrap_or_else(|| input_dir.to_path_buf()),
        ),
        ..options.clone()
    };

    let results: Vec<_> = files
        .par_iter()
        .map(|file| export_single_page(file, input_dir, output_dir, &page_options))
        .collect();

    let mut success_count = 0;
    let mut failed_files = Vec::new();
    let mut output_files = Vec::new();

    for result in results {
        match result {
            ExportOutcome::Success(output_path) => {
                success_count += 1;
                output_files.push(output_path);
            }
            ExportOutcome::Failed(path, error) => {
                failed_files.push((path, error));
            }
        }
    }

    Ok(ExportResult {
        success_count,
        failed_files,
        output_files,
    })
}

fn export_single_page(
    input: &Path,
    input_dir: &Path,
    output_dir: &Path,
    options: &ExportOptions,
) -> ExportOutcome {
    let relative = input.strip_prefix(input_dir).unwrap_or(input);
    let output_path = output_dir.join(relative).with_extension(NOTEBOOK_EXTENSION);

    let export = || -> Result<PathBuf> {
        let page = MystPage::load(input)?;
        let notebook = render_notebook(&page, input, options);
        write_notebook(&notebook, &output_path)?;
        Ok(output_path.clone())
    };

    match export() {
        Ok(path) => ExportOutcome::Success(path),
        Err(e) => ExportOutcome::Failed(input.to_path_buf(), e.to_string()),
    }
}

/// Write a notebook, creating parent directories as needed
pub fn write_notebook(notebook: &Notebook, path: &Path) -> Result<()> {
    let json = notebook.to_json_string().map_err(|source| ProjectError::Json {
        file: path.to_path_buf(),
        source,
    })?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, json)?;
    Ok(())
}

/// Output path for a page when none is given
fn default_output_path(input: &Path, frontmatter: &Frontmatter) -> PathBuf {
    let stem = input.file_stem().unwrap_or(input.as_os_str());
    let sibling = input.with_extension(NOTEBOOK_EXTENSION);

    let Some(output) = frontmatter.ipynb_export().and_then(|e| e.output.as_deref()) else {
        return sibling;
    };

    let target = page_dir(input).join(output);
    let is_notebook = target
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(NOTEBOOK_EXTENSION));
    if is_notebook {
        target
    } else {
        // Anything else names a directory
        target.join(stem).with_extension(NOTEBOOK_EXTENSION)
    }
}

fn page_dir(page_path: &Path) -> &Path {
    page_path.parent().unwrap_or_else(|| Path::new(""))
}

/// Collect all page JSON files in a directory
fn collect_page_files(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if path.is_file() {
            if let Some(ext) = path.extension()
                && ext.eq_ignore_ascii_case("json")
            {
                files.push(path);
            }
        } else if path.is_dir() && recursive {
            files.extend(collect_page_files(&path, recursive)?);
        }
    }

    Ok(files)
}
