//! MyST mdast (Markdown Abstract Syntax Tree) types
//!
//! The mdast node family plus the MyST extensions (directives, roles,
//! exercises, proofs, ...) produced by the MyST parsing stage.
//! Reference: https://github.com/syntax-tree/mdast and https://mystmd.org/spec
//!
//! Node kinds this crate does not model (or known kinds with malformed
//! fields) deserialize into [`Node::Other`], which keeps every field and
//! re-serializes unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `kind` of a [`Block`] that holds a notebook code cell
pub const NOTEBOOK_CODE: &str = "notebook-code";

/// Root node of an mdast document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Root {
    #[serde(default)]
    pub children: Vec<Node>,
}

/// An mdast node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Node {
    // Block nodes
    Block(Block),
    Heading(Heading),
    Paragraph(Paragraph),
    ThematicBreak,
    Blockquote(Blockquote),
    List(List),
    ListItem(ListItem),
    Code(Code),
    Table(Table),
    TableRow(TableRow),
    TableCell(TableCell),
    DefinitionList(DefinitionList),
    DefinitionTerm(DefinitionTerm),
    DefinitionDescription(DefinitionDescription),

    // Inline nodes
    Text(Text),
    Emphasis(Emphasis),
    Strong(Strong),
    InlineCode(InlineCode),
    Break,
    Link(Link),
    Image(Image),
    CrossReference(CrossReference),

    // Math (mdast extension)
    Math(Math),
    InlineMath(InlineMath),

    // HTML (for raw output)
    Html(Html),

    // MyST directives and their parts
    Admonition(Admonition),
    AdmonitionTitle(Parent),
    Container(Container),
    Caption(Parent),
    Legend(Parent),
    Exercise(Exercise),
    Solution(Solution),
    Proof(Proof),
    TabSet(Parent),
    TabItem(TabItem),
    Card(Card),
    CardTitle(Parent),
    Header(Parent),
    Footer(Parent),
    Grid(Grid),
    Details(Details),
    Summary(Parent),
    Aside(Aside),
    Include(Include),

    // Unresolved directives/roles, targets and comments
    MystDirective(MystDirective),
    MystRole(MystRole),
    MystTarget(MystTarget),
    Comment(Comment),

    /// Any node kind not listed above
    #[serde(untagged)]
    Other(GenericNode),
}

/// Parent node with nothing but children (caption, legend, titles, ...)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Parent {
    #[serde(default)]
    pub children: Vec<Node>,
}

/// Top-level block (a notebook cell in MyST terms)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Block {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Block metadata (written as `+++ {json}` in MyST)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub children: Vec<Node>,
}

/// Heading node (# to ######)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Heading {
    pub depth: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub children: Vec<Node>,
}

impl Default for Heading {
    fn default() -> Self {
        Self {
            depth: 1,
            identifier: None,
            label: None,
            children: Vec::new(),
        }
    }
}

/// Paragraph node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    #[serde(default)]
    pub children: Vec<Node>,
}

/// Blockquote node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Blockquote {
    #[serde(default)]
    pub children: Vec<Node>,
}

/// List node (ordered or unordered)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct List {
    pub ordered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<u32>,
    pub spread: bool,
    pub children: Vec<Node>,
}

/// List item node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListItem {
    pub spread: bool,
    pub children: Vec<Node>,
}

/// Code block node
///
/// MyST attaches presentation attributes (`class`, `emphasizeLines`, ...)
/// that plain CommonMark cannot express.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Code {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<String>,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emphasize_lines: Option<Vec<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_line_numbers: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starting_line_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Table node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Table {
    pub align: Vec<Option<Align>>,
    pub children: Vec<Node>,
}

/// Table row node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    #[serde(default)]
    pub children: Vec<Node>,
}

/// Table cell node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableCell {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<bool>,
    pub children: Vec<Node>,
}

/// Table alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    Center,
    Right,
}

/// Definition list (extension)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefinitionList {
    #[serde(default)]
    pub children: Vec<Node>,
}

/// Definition term (extension)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefinitionTerm {
    #[serde(default)]
    pub children: Vec<Node>,
}

/// Definition description (extension)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefinitionDescription {
    #[serde(default)]
    pub children: Vec<Node>,
}

/// Text node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Text {
    #[serde(default)]
    pub value: String,
}

/// Emphasis node (*text* or _text_)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Emphasis {
    #[serde(default)]
    pub children: Vec<Node>,
}

/// Strong node (**text** or __text__)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Strong {
    #[serde(default)]
    pub children: Vec<Node>,
}

/// Inline code node (`code`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InlineCode {
    #[serde(default)]
    pub value: String,
}

/// Link node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Link {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub children: Vec<Node>,
}

/// Image node
///
/// `class`, `width`, `height` and `align` come from the `{image}` directive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Image {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub align: Option<String>,
}

impl Image {
    /// Whether the image carries attributes only the `{image}` directive can express
    pub fn has_directive_attributes(&self) -> bool {
        self.class.is_some() || self.width.is_some() || self.height.is_some() || self.align.is_some()
    }
}

/// Cross reference to a labelled target
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossReference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub children: Vec<Node>,
}

/// Display math node ($$...$$)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Math {
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enumerator: Option<String>,
}

/// Inline math node ($...$)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InlineMath {
    #[serde(default)]
    pub value: String,
}

/// Raw HTML node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Html {
    #[serde(default)]
    pub value: String,
}

/// Admonition (`{note}`, `{warning}`, ...)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Admonition {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    pub children: Vec<Node>,
}

/// Enumerated container (`figure`, `table`, `code`, ...)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Container {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enumerator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    pub children: Vec<Node>,
}

/// Exercise directive
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Exercise {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enumerator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    pub children: Vec<Node>,
}

/// Solution directive
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Solution {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    pub children: Vec<Node>,
}

/// Proof-family directive (`prf:theorem`, `prf:lemma`, ...)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Proof {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enumerator: Option<String>,
    pub children: Vec<Node>,
}

/// A single tab of a tab-set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TabItem {
    pub title: String,
    pub children: Vec<Node>,
}

/// Card directive
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Card {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub children: Vec<Node>,
}

/// Grid of cards
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Grid {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<u32>>,
    pub children: Vec<Node>,
}

/// Details/dropdown directive
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Details {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open: Option<bool>,
    pub children: Vec<Node>,
}

/// Aside (`{aside}`, `{sidebar}`, `{margin}`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Aside {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    pub children: Vec<Node>,
}

/// Include directive, already resolved into its children
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Include {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub children: Vec<Node>,
}

/// Directive the parser did not resolve
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MystDirective {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub children: Vec<Node>,
}

/// Role the parser did not resolve
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MystRole {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub children: Vec<Node>,
}

/// Label target, `(label)=`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MystTarget {
    #[serde(default)]
    pub label: String,
}

/// Comment, `% text`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default)]
    pub value: String,
}

/// Node of a kind this crate does not model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenericNode {
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl GenericNode {
    /// The node's `value` field, if it is a string
    pub fn value(&self) -> Option<&str> {
        self.fields.get("value").and_then(Value::as_str)
    }
}

// Convenience constructors
impl Node {
    pub fn text(s: impl Into<String>) -> Self {
        Node::Text(Text { value: s.into() })
    }

    pub fn paragraph(children: Vec<Node>) -> Self {
        Node::Paragraph(Paragraph { children })
    }

    pub fn heading(depth: u8, children: Vec<Node>) -> Self {
        Node::Heading(Heading {
            depth,
            children,
            ..Default::default()
        })
    }

    pub fn block(children: Vec<Node>) -> Self {
        Node::Block(Block {
            children,
            ..Default::default()
        })
    }

    /// A `notebook-code` block holding a single code node
    pub fn code_cell(lang: Option<String>, value: impl Into<String>) -> Self {
        Node::Block(Block {
            kind: Some(NOTEBOOK_CODE.to_string()),
            children: vec![Node::code(lang, value)],
            ..Default::default()
        })
    }

    pub fn code(lang: Option<String>, value: impl Into<String>) -> Self {
        Node::Code(Code {
            lang,
            value: value.into(),
            ..Default::default()
        })
    }

    pub fn inline_code(value: impl Into<String>) -> Self {
        Node::InlineCode(InlineCode {
            value: value.into(),
        })
    }

    pub fn emphasis(children: Vec<Node>) -> Self {
        Node::Emphasis(Emphasis { children })
    }

    pub fn strong(children: Vec<Node>) -> Self {
        Node::Strong(Strong { children })
    }

    pub fn link(url: impl Into<String>, children: Vec<Node>) -> Self {
        Node::Link(Link {
            url: url.into(),
            title: None,
            children,
        })
    }

    pub fn image(url: impl Into<String>, alt: impl Into<String>) -> Self {
        Node::Image(Image {
            url: url.into(),
            alt: Some(alt.into()),
            ..Default::default()
        })
    }

    pub fn list(ordered: bool, children: Vec<Node>) -> Self {
        Node::List(List {
            ordered,
            start: if ordered { Some(1) } else { None },
            spread: false,
            children,
        })
    }

    pub fn list_item(children: Vec<Node>) -> Self {
        Node::ListItem(ListItem {
            spread: false,
            children,
        })
    }

    pub fn math(value: impl Into<String>) -> Self {
        Node::Math(Math {
            value: value.into(),
            ..Default::default()
        })
    }

    pub fn inline_math(value: impl Into<String>) -> Self {
        Node::InlineMath(InlineMath {
            value: value.into(),
        })
    }

    pub fn html(value: impl Into<String>) -> Self {
        Node::Html(Html {
            value: value.into(),
        })
    }

    pub fn blockquote(children: Vec<Node>) -> Self {
        Node::Blockquote(Blockquote { children })
    }

    pub fn admonition_title(children: Vec<Node>) -> Self {
        Node::AdmonitionTitle(Parent { children })
    }

    pub fn exercise(children: Vec<Node>) -> Self {
        Node::Exercise(Exercise {
            children,
            ..Default::default()
        })
    }

    pub fn solution(children: Vec<Node>) -> Self {
        Node::Solution(Solution {
            children,
            ..Default::default()
        })
    }

    pub fn target(label: impl Into<String>) -> Self {
        Node::MystTarget(MystTarget {
            label: label.into(),
        })
    }

    pub fn comment(value: impl Into<String>) -> Self {
        Node::Comment(Comment {
            value: value.into(),
        })
    }
}

// Tree accessors
impl Node {
    /// The mdast `type` string of this node
    pub fn type_name(&self) -> &str {
        match self {
            Node::Block(_) => "block",
            Node::Heading(_) => "heading",
            Node::Paragraph(_) => "paragraph",
            Node::ThematicBreak => "thematicBreak",
            Node::Blockquote(_) => "blockquote",
            Node::List(_) => "list",
            Node::ListItem(_) => "listItem",
            Node::Code(_) => "code",
            Node::Table(_) => "table",
            Node::TableRow(_) => "tableRow",
            Node::TableCell(_) => "tableCell",
            Node::DefinitionList(_) => "definitionList",
            Node::DefinitionTerm(_) => "definitionTerm",
            Node::DefinitionDescription(_) => "definitionDescription",
            Node::Text(_) => "text",
            Node::Emphasis(_) => "emphasis",
            Node::Strong(_) => "strong",
            Node::InlineCode(_) => "inlineCode",
            Node::Break => "break",
            Node::Link(_) => "link",
            Node::Image(_) => "image",
            Node::CrossReference(_) => "crossReference",
            Node::Math(_) => "math",
            Node::InlineMath(_) => "inlineMath",
            Node::Html(_) => "html",
            Node::Admonition(_) => "admonition",
            Node::AdmonitionTitle(_) => "admonitionTitle",
            Node::Container(_) => "container",
            Node::Caption(_) => "caption",
            Node::Legend(_) => "legend",
            Node::Exercise(_) => "exercise",
            Node::Solution(_) => "solution",
            Node::Proof(_) => "proof",
            Node::TabSet(_) => "tabSet",
            Node::TabItem(_) => "tabItem",
            Node::Card(_) => "card",
            Node::CardTitle(_) => "cardTitle",
            Node::Header(_) => "header",
            Node::Footer(_) => "footer",
            Node::Grid(_) => "grid",
            Node::Details(_) => "details",
            Node::Summary(_) => "summary",
            Node::Aside(_) => "aside",
            Node::Include(_) => "include",
            Node::MystDirective(_) => "mystDirective",
            Node::MystRole(_) => "mystRole",
            Node::MystTarget(_) => "mystTarget",
            Node::Comment(_) => "comment",
            Node::Other(n) => &n.node_type,
        }
    }

    /// Children of a parent node, `None` for leaves
    pub fn children(&self) -> Option<&Vec<Node>> {
        match self {
            Node::Block(Block { children, .. })
            | Node::Heading(Heading { children, .. })
            | Node::Paragraph(Paragraph { children })
            | Node::Blockquote(Blockquote { children })
            | Node::List(List { children, .. })
            | Node::ListItem(ListItem { children, .. })
            | Node::Table(Table { children, .. })
            | Node::TableRow(TableRow { children })
            | Node::TableCell(TableCell { children, .. })
            | Node::DefinitionList(DefinitionList { children })
            | Node::DefinitionTerm(DefinitionTerm { children })
            | Node::DefinitionDescription(DefinitionDescription { children })
            | Node::Emphasis(Emphasis { children })
            | Node::Strong(Strong { children })
            | Node::Link(Link { children, .. })
            | Node::CrossReference(CrossReference { children, .. })
            | Node::Admonition(Admonition { children, .. })
            | Node::AdmonitionTitle(Parent { children })
            | Node::Container(Container { children, .. })
            | Node::Caption(Parent { children })
            | Node::Legend(Parent { children })
            | Node::Exercise(Exercise { children, .. })
            | Node::Solution(Solution { children, .. })
            | Node::Proof(Proof { children, .. })
            | Node::TabSet(Parent { children })
            | Node::TabItem(TabItem { children, .. })
            | Node::Card(Card { children, .. })
            | Node::CardTitle(Parent { children })
            | Node::Header(Parent { children })
            | Node::Footer(Parent { children })
            | Node::Grid(Grid { children, .. })
            | Node::Details(Details { children, .. })
            | Node::Summary(Parent { children })
            | Node::Aside(Aside { children, .. })
            | Node::Include(Include { children, .. })
            | Node::MystDirective(MystDirective { children, .. })
            | Node::MystRole(MystRole { children, .. })
            | Node::Other(GenericNode { children, .. }) => Some(children),
            Node::ThematicBreak
            | Node::Code(_)
            | Node::Text(_)
            | Node::InlineCode(_)
            | Node::Break
            | Node::Image(_)
            | Node::Math(_)
            | Node::InlineMath(_)
            | Node::Html(_)
            | Node::MystTarget(_)
            | Node::Comment(_) => None,
        }
    }

    /// Mutable children of a parent node, `None` for leaves
    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Block(Block { children, .. })
            | Node::Heading(Heading { children, .. })
            | Node::Paragraph(Paragraph { children })
            | Node::Blockquote(Blockquote { children })
            | Node::List(List { children, .. })
            | Node::ListItem(ListItem { children, .. })
            | Node::Table(Table { children, .. })
            | Node::TableRow(TableRow { children })
            | Node::TableCell(TableCell { children, .. })
            | Node::DefinitionList(DefinitionList { children })
            | Node::DefinitionTerm(DefinitionTerm { children })
            | Node::DefinitionDescription(DefinitionDescription { children })
            | Node::Emphasis(Emphasis { children })
            | Node::Strong(Strong { children })
            | Node::Link(Link { children, .. })
            | Node::CrossReference(CrossReference { children, .. })
            | Node::Admonition(Admonition { children, .. })
            | Node::AdmonitionTitle(Parent { children })
            | Node::Container(Container { children, .. })
            | Node::Caption(Parent { children })
            | Node::Legend(Parent { children })
            | Node::Exercise(Exercise { children, .. })
            | Node::Solution(Solution { children, .. })
            | Node::Proof(Proof { children, .. })
            | Node::TabSet(Parent { children })
            | Node::TabItem(TabItem { children, .. })
            | Node::Card(Card { children, .. })
            | Node::CardTitle(Parent { children })
            | Node::Header(Parent { children })
            | Node::Footer(Parent { children })
            | Node::Grid(Grid { children, .. })
            | Node::Details(Details { children, .. })
            | Node::Summary(Parent { children })
            | Node::Aside(Aside { children, .. })
            | Node::Include(Include { children, .. })
            | Node::MystDirective(MystDirective { children, .. })
            | Node::MystRole(MystRole { children, .. })
            | Node::Other(GenericNode { children, .. }) => Some(children),
            Node::ThematicBreak
            | Node::Code(_)
            | Node::Text(_)
            | Node::InlineCode(_)
            | Node::Break
            | Node::Image(_)
            | Node::Math(_)
            | Node::InlineMath(_)
            | Node::Html(_)
            | Node::MystTarget(_)
            | Node::Comment(_) => None,
        }
    }

    /// Whether this is a `notebook-code` block
    pub fn is_code_cell(&self) -> bool {
        matches!(self, Node::Block(b) if b.kind.as_deref() == Some(NOTEBOOK_CODE))
    }

    /// Remove target metadata (`identifier`/`label`) that defines a reference target.
    ///
    /// Cross references keep theirs: their label points elsewhere.
    pub fn strip_target(&mut self) {
        let (identifier, label) = match self {
            Node::Block(n) => (&mut n.identifier, &mut n.label),
            Node::Heading(n) => (&mut n.identifier, &mut n.label),
            Node::Code(n) => (&mut n.identifier, &mut n.label),
            Node::Math(n) => (&mut n.identifier, &mut n.label),
            Node::Container(n) => (&mut n.identifier, &mut n.label),
            Node::Exercise(n) => (&mut n.identifier, &mut n.label),
            Node::Solution(n) => (&mut n.identifier, &mut n.label),
            Node::Proof(n) => (&mut n.identifier, &mut n.label),
            Node::Other(n) => {
                n.fields.remove("identifier");
                n.fields.remove("label");
                n.fields.remove("html_id");
                return;
            }
            _ => return,
        };
        *identifier = None;
        *label = None;
    }

    /// Depth-first, pre-order visit of this node and all descendants
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Node)) {
        f(self);
        if let Some(children) = self.children() {
            for child in children {
                child.walk(f);
            }
        }
    }
}

/// Concatenated text content of a node list (text, code and math values)
pub fn to_plain_text(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        node.walk(&mut |n| match n {
            Node::Text(t) => out.push_str(&t.value),
            Node::InlineCode(c) => out.push_str(&c.value),
            Node::InlineMath(m) => out.push_str(&m.value),
            _ => {}
        });
    }
    out
}

impl Root {
    pub fn new(children: Vec<Node>) -> Self {
        Self { children }
    }

    /// Depth-first, pre-order visit of every node in the tree
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Node)) {
        for child in &self.children {
            child.walk(f);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_constructors() {
        let text = Node::text("hello");
        assert!(matches!(text, Node::Text(Text { value }) if value == "hello"));

        let heading = Node::heading(2, vec![Node::text("Title")]);
        assert!(matches!(heading, Node::Heading(Heading { depth: 2, .. })));

        let cell = Node::code_cell(Some("python".to_string()), "print(1)");
        assert!(cell.is_code_cell());
        assert!(!Node::block(vec![]).is_code_cell());
    }

    #[test]
    fn test_deserialize_myst_nodes() {
        let json = r#"{
            "type": "root",
            "children": [
                {"type": "block", "children": [
                    {"type": "admonition", "kind": "note", "children": [
                        {"type": "admonitionTitle", "children": [{"type": "text", "value": "Heads up"}]},
                        {"type": "paragraph", "children": [{"type": "text", "value": "body"}]}
                    ]}
                ]},
                {"type": "block", "kind": "notebook-code", "children": [
                    {"type": "code", "lang": "python", "value": "x = 1", "executable": true},
                    {"type": "output", "id": "abc"}
                ]}
            ]
        }"#;
        let root: Root = serde_json::from_str(json).unwrap();
        assert_eq!(root.children.len(), 2);
        assert!(root.children[1].is_code_cell());

        let Node::Block(block) = &root.children[0] else {
            panic!("Expected Block node");
        };
        let Node::Admonition(adm) = &block.children[0] else {
            panic!("Expected Admonition node");
        };
        assert_eq!(adm.kind.as_deref(), Some("note"));
        assert!(matches!(adm.children[0], Node::AdmonitionTitle(_)));
    }

    #[test]
    fn test_unknown_node_roundtrip() {
        let json = r#"{"type":"footnoteReference","identifier":"a","label":"a"}"#;
        let node: Node = serde_json::from_str(json).unwrap();
        let Node::Other(generic) = &node else {
            panic!("Expected Other node");
        };
        assert_eq!(generic.node_type, "footnoteReference");
        assert_eq!(node.type_name(), "footnoteReference");

        let back: serde_json::Value = serde_json::to_value(&node).unwrap();
        let original: serde_json::Value = serde_json::from_str(json).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn test_missing_fields_default() {
        let node: Node = serde_json::from_str(r#"{"type":"image"}"#).unwrap();
        let Node::Image(img) = node else {
            panic!("Expected Image node");
        };
        assert_eq!(img.url, "");
        assert_eq!(img.alt, None);

        let node: Node = serde_json::from_str(r#"{"type":"heading"}"#).unwrap();
        assert!(matches!(node, Node::Heading(Heading { depth: 1, .. })));
    }

    #[test]
    fn test_strip_target() {
        let mut math = Node::Math(Math {
            value: "x".to_string(),
            identifier: Some("eq".to_string()),
            label: Some("eq".to_string()),
            enumerator: Some("1".to_string()),
        });
        math.strip_target();
        let Node::Math(m) = math else {
            panic!("Expected Math node");
        };
        assert_eq!(m.identifier, None);
        assert_eq!(m.label, None);
        assert_eq!(m.enumerator.as_deref(), Some("1"));

        let mut xref = Node::CrossReference(CrossReference {
            identifier: Some("fig".to_string()),
            ..Default::default()
        });
        xref.strip_target();
        assert!(matches!(xref, Node::CrossReference(CrossReference { identifier: Some(_), .. })));
    }

    #[test]
    fn test_plain_text() {
        let nodes = vec![Node::paragraph(vec![
            Node::text("Energy "),
            Node::inline_math("E"),
            Node::emphasis(vec![Node::text(" matters")]),
        ])];
        assert_eq!(to_plain_text(&nodes), "Energy E matters");
    }

    #[test]
    fn test_serde_roundtrip() {
        let root = Root::new(vec![
            Node::heading(1, vec![Node::text("Title")]),
            Node::paragraph(vec![
                Node::text("Hello "),
                Node::emphasis(vec![Node::text("world")]),
            ]),
        ]);

        let json = serde_json::to_string(&root).unwrap();
        let parsed: Root = serde_json::from_str(&json).unwrap();
        assert_eq!(root, parsed);
    }
}
