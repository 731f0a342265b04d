//! myst-mdast: MyST mdast types and Markdown writer for myst2ipynb
//!
//! This crate provides:
//! - mdast (Markdown Abstract Syntax Tree) types, including MyST extensions
//! - Serialization to MyST Markdown
//!
//! ## Example
//!
//! ```rust
//! use myst_mdast::{Node, Root, mdast_to_md, WriterOptions};
//!
//! let doc = Root::new(vec![
//!     Node::heading(1, vec![Node::text("Hello")]),
//!     Node::paragraph(vec![Node::text("World")]),
//! ]);
//!
//! let md = mdast_to_md(&doc, &WriterOptions::default());
//! assert!(md.contains("# Hello"));
//! ```

pub mod mdast;
pub mod writer;

pub use mdast::{
    Admonition, Align, Aside, Block, Blockquote, Card, Code, Comment, Container, CrossReference,
    DefinitionDescription, DefinitionList, DefinitionTerm, Details, Emphasis, Exercise,
    GenericNode, Grid, Heading, Html, Image, Include, InlineCode, InlineMath, Link, List,
    ListItem, Math, MystDirective, MystRole, MystTarget, NOTEBOOK_CODE, Node, Paragraph, Parent,
    Proof, Root, Solution, Strong, TabItem, Table, TableCell, TableRow, Text, to_plain_text,
};
pub use writer::{
    Diagnostic, DiagnosticSink, WriterOptions, mdast_to_md, mdast_to_md_with_diagnostics,
};
