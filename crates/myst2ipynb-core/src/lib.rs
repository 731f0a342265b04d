//! myst2ipynb-core: Core library for converting MyST documents to Jupyter notebooks
//!
//! This crate provides:
//! - Lifting of code cells nested in exercise/solution directives
//! - Degrading of MyST-only nodes to CommonMark
//! - Notebook assembly (nbformat 4.2)
//! - Rewriting of image references into cell attachments
//!
//! Nothing here touches the filesystem; image data is collected by the caller.
//!
//! ## Example
//!
//! ```rust
//! use myst2ipynb_core::{IpynbOptions, to_ipynb};
//! use myst_mdast::{Node, Root};
//!
//! let doc = Root::new(vec![
//!     Node::block(vec![Node::paragraph(vec![Node::text("Hello")])]),
//!     Node::code_cell(Some("python".to_string()), "print('hi')"),
//! ]);
//!
//! let notebook = to_ipynb(&doc, None, &IpynbOptions::default());
//! assert_eq!(notebook.cells.len(), 2);
//! assert!(notebook.cells[1].is_code());
//! ```

pub mod attachments;
pub mod commonmark;
pub mod export;
pub mod frontmatter;
pub mod gated;
pub mod notebook;
pub mod options;

pub use attachments::{EmbeddedMarkdown, ImageDataEntry, ImageDataMap, embed_image_attachments};
pub use commonmark::{degrade_nodes, to_commonmark};
pub use export::{MarkdownSerializer, MystMarkdown, SerializeError, to_ipynb, to_ipynb_with};
pub use frontmatter::{ExportEntry, Frontmatter, Kernelspec};
pub use gated::lift_code_cells;
pub use notebook::{Attachments, Cell, MimeBundle, Notebook, NotebookMetadata};
pub use options::{
    CommonMarkOptions, ImageMode, Images, InvalidOption, IpynbOptions, MarkdownFormat,
};
