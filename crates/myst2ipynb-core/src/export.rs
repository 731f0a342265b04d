//! Notebook assembly: top-level units to notebook cells

use crate::attachments::embed_image_attachments;
use crate::commonmark::to_commonmark;
use crate::frontmatter::Frontmatter;
use crate::gated::lift_code_cells;
use crate::notebook::{
    Cell, DEFAULT_LANGUAGE, KernelspecMetadata, LanguageInfo, Notebook, NotebookMetadata,
};
use crate::options::{Images, IpynbOptions, MarkdownFormat};
use myst_mdast::{
    Diagnostic, DiagnosticSink, Node, Root, WriterOptions, mdast_to_md_with_diagnostics,
};
use std::convert::Infallible;

/// Renders a markdown cell's subtree to markdown text
pub trait MarkdownSerializer {
    type Error: std::error::Error + Send + Sync + 'static;

    fn serialize(
        &self,
        root: &Root,
        diagnostics: &mut dyn DiagnosticSink,
    ) -> Result<String, Self::Error>;
}

/// The in-repo MyST writer
#[derive(Debug, Clone, Default)]
pub struct MystMarkdown {
    pub options: WriterOptions,
}

impl MarkdownSerializer for MystMarkdown {
    type Error = Infallible;

    fn serialize(
        &self,
        root: &Root,
        diagnostics: &mut dyn DiagnosticSink,
    ) -> Result<String, Self::Error> {
        Ok(mdast_to_md_with_diagnostics(root, &self.options, diagnostics))
    }
}

/// Serializer failure, tagged with the top-level unit it happened on
#[derive(Debug, thiserror::Error)]
#[error("failed to serialize markdown for top-level unit {index}")]
pub struct SerializeError<E> {
    /// Index into the lifted top-level units
    pub index: usize,
    #[source]
    pub source: E,
}

/// Convert a document to a notebook with the in-repo MyST writer
pub fn to_ipynb(
    root: &Root,
    frontmatter: Option<&Frontmatter>,
    options: &IpynbOptions<'_>,
) -> Notebook {
    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    match to_ipynb_with(
        &MystMarkdown::default(),
        root,
        frontmatter,
        options,
        &mut diagnostics,
    ) {
        Ok(notebook) => notebook,
        Err(err) => match err.source {},
    }
}

/// Convert a document to a notebook using `serializer` for markdown cells.
///
/// The caller's tree is never modified; CommonMark degrading works on a
/// copy of each unit.
pub fn to_ipynb_with<S: MarkdownSerializer>(
    serializer: &S,
    root: &Root,
    frontmatter: Option<&Frontmatter>,
    options: &IpynbOptions<'_>,
    diagnostics: &mut dyn DiagnosticSink,
) -> Result<Notebook, SerializeError<S::Error>> {
    let units = lift_code_cells(&root.children, options.drops_solutions());

    let mut cells = Vec::with_capacity(units.len());
    for (index, unit) in units.iter().enumerate() {
        if unit.is_code_cell() {
            cells.push(Cell::code(code_cell_source(unit)));
            continue;
        }

        let mut subtree = Root::new(vec![unit.clone()]);
        if options.markdown == MarkdownFormat::Commonmark {
            to_commonmark(&mut subtree, &options.commonmark);
        }

        let md = serializer
            .serialize(&subtree, diagnostics)
            .map_err(|source| SerializeError { index, source })?;
        let md = strip_block_breaks(&md);

        let cell = match options.images {
            Images::Attachment(images) => {
                let embedded = embed_image_attachments(md, images);
                Cell::markdown(&embedded.md, embedded.attachments)
            }
            Images::Reference => Cell::markdown(md, None),
        };
        if !cell.is_blank_markdown() {
            cells.push(cell);
        }
    }

    Ok(Notebook::new(cells, notebook_metadata(frontmatter)))
}

/// Literal source of the first code node in a `notebook-code` block
fn code_cell_source(block: &Node) -> &str {
    block
        .children()
        .and_then(|children| {
            children.iter().find_map(|child| match child {
                Node::Code(code) => Some(code.value.as_str()),
                _ => None,
            })
        })
        .unwrap_or_default()
}

/// Drop leading blank lines and `+++` cell-break lines
fn strip_block_breaks(md: &str) -> &str {
    let mut rest = md;
    loop {
        let trimmed = rest.trim_start_matches(['\n', '\r']);
        if !trimmed.starts_with("+++") {
            return trimmed;
        }
        rest = match trimmed.find('\n') {
            Some(end) => &trimmed[end + 1..],
            None => "",
        };
    }
}

fn notebook_metadata(frontmatter: Option<&Frontmatter>) -> NotebookMetadata {
    let kernelspec = frontmatter.and_then(|fm| fm.kernelspec.as_ref());
    let language = kernelspec
        .and_then(|k| k.language.clone().or_else(|| k.name.clone()))
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

    NotebookMetadata {
        language_info: LanguageInfo {
            name: language.clone(),
        },
        kernelspec: kernelspec.map(|k| {
            let name = k.name.clone().unwrap_or_else(|| language.clone());
            KernelspecMetadata {
                display_name: k.display_name.clone().unwrap_or_else(|| name.clone()),
                name,
                language,
            }
        }),
    }
}
