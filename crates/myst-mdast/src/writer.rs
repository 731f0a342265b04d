//! mdast to MyST Markdown writer
//!
//! Converts an mdast tree into a Markdown string. mdast node kinds are
//! written as CommonMark; MyST node kinds are written as MyST directives and
//! roles. Node kinds with no Markdown form are reported to a
//! [`DiagnosticSink`] and written as their children.

use crate::mdast::{
    Align, Block, Code, Container, CrossReference, Image, List, Math, MystDirective, Node, Root,
    Table, TableRow,
};
use serde_json::Value;

/// Options for the Markdown writer
#[derive(Debug, Clone)]
pub struct WriterOptions {
    /// Write `+++` block breaks between top-level blocks
    pub block_separators: bool,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            block_separators: true,
        }
    }
}

/// Something the writer could not express faithfully
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// mdast `type` of the offending node
    pub node_type: String,
    pub message: String,
}

/// Receiver for writer diagnostics
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Convert mdast to Markdown, discarding diagnostics
pub fn mdast_to_md(root: &Root, options: &WriterOptions) -> String {
    let mut diagnostics = Vec::new();
    mdast_to_md_with_diagnostics(root, options, &mut diagnostics)
}

/// Convert mdast to Markdown, reporting diagnostics to `sink`
pub fn mdast_to_md_with_diagnostics(
    root: &Root,
    options: &WriterOptions,
    sink: &mut dyn DiagnosticSink,
) -> String {
    let mut writer = Writer::new(options, sink);
    writer.write_root(root)
}

/// Markdown writer state
struct Writer<'a, 's> {
    options: &'a WriterOptions,
    diagnostics: &'s mut dyn DiagnosticSink,
    output: String,
    /// Whether we're at the start of a line
    at_line_start: bool,
}

impl<'a, 's> Writer<'a, 's> {
    fn new(options: &'a WriterOptions, diagnostics: &'s mut dyn DiagnosticSink) -> Self {
        Self {
            options,
            diagnostics,
            output: String::new(),
            at_line_start: true,
        }
    }

    fn write_root(&mut self, root: &Root) -> String {
        for (i, node) in root.children.iter().enumerate() {
            if i > 0 {
                self.ensure_blank_line();
            }
            if let Node::Block(block) = node {
                self.write_block_break(block, i > 0);
            }
            self.write_block(node);
        }
        self.ensure_newline();

        std::mem::take(&mut self.output)
    }

    fn write_block_break(&mut self, block: &Block, separate: bool) {
        match &block.data {
            Some(data) if !data.is_empty() => {
                self.output.push_str("+++ ");
                self.output.push_str(&Value::Object(data.clone()).to_string());
                self.output.push_str("\n\n");
            }
            _ if separate && self.options.block_separators => self.output.push_str("+++\n\n"),
            _ => {}
        }
    }

    /// Write block-level nodes separated by blank lines
    fn write_blocks(&mut self, nodes: &[Node]) {
        for (i, node) in nodes.iter().enumerate() {
            if i > 0 {
                self.ensure_blank_line();
            }
            self.write_block(node);
        }
    }

    /// Write a node in block position
    fn write_block(&mut self, node: &Node) {
        match node {
            Node::Image(img) if img.has_directive_attributes() => self.write_image_directive(img),
            _ if is_inline(node) => {
                self.ensure_newline();
                self.write_node(node);
                self.ensure_newline();
            }
            _ => self.write_node(node),
        }
    }

    /// Write children that may be either inline or block content
    fn write_flow(&mut self, nodes: &[Node]) {
        if nodes.iter().all(is_inline) {
            self.ensure_newline();
            for node in nodes {
                self.write_node(node);
            }
            self.ensure_newline();
        } else {
            self.write_blocks(nodes);
        }
    }

    fn write_node(&mut self, node: &Node) {
        match node {
            Node::Block(b) => {
                self.write_target(b.label.as_deref());
                self.write_blocks(&b.children);
            }
            Node::Heading(h) => self.write_heading(h),
            Node::Paragraph(p) => self.write_paragraph(&p.children),
            Node::ThematicBreak => self.write_thematic_break(),
            Node::Blockquote(b) => self.write_blockquote(&b.children),
            Node::List(l) => self.write_list(l),
            Node::ListItem(li) => self.write_blocks(&li.children),
            Node::Code(c) => self.write_code(c),
            Node::Table(t) => self.write_table(t),
            Node::TableRow(_) => {}  // Handled by write_table
            Node::TableCell(_) => {} // Handled by write_table
            Node::DefinitionList(dl) => self.write_definition_list(&dl.children),
            Node::DefinitionTerm(_) => {} // Handled by write_definition_list
            Node::DefinitionDescription(_) => {} // Handled by write_definition_list
            Node::Text(t) => self.push_inline(&t.value),
            Node::Emphasis(e) => self.write_wrapped("*", &e.children),
            Node::Strong(s) => self.write_wrapped("**", &s.children),
            Node::InlineCode(c) => self.write_inline_code(&c.value),
            Node::Break => self.write_break(),
            Node::Link(l) => self.write_link(&l.children, &l.url, l.title.as_deref()),
            Node::Image(img) => self.write_image(img),
            Node::CrossReference(x) => self.write_cross_reference(x),
            Node::Math(m) => self.write_math(m),
            Node::InlineMath(m) => {
                self.push_inline("$");
                self.push_inline(&m.value);
                self.push_inline("$");
            }
            Node::Html(h) => self.push_inline(&h.value),
            Node::Admonition(a) => {
                let name = a.kind.as_deref().unwrap_or("admonition");
                let title = self.title_of(&a.children);
                let options = class_option(a.class.as_deref());
                self.write_directive(node, name, title.as_deref(), &options, |w| {
                    w.write_blocks_without_titles(&a.children)
                });
            }
            Node::AdmonitionTitle(p)
            | Node::Caption(p)
            | Node::Legend(p)
            | Node::CardTitle(p)
            | Node::Header(p)
            | Node::Footer(p)
            | Node::Summary(p) => self.write_flow(&p.children),
            Node::Container(c) => self.write_container(node, c),
            Node::Exercise(e) => {
                let title = self.title_of(&e.children);
                let mut options = label_option(e.label.as_deref());
                options.extend(class_option(e.class.as_deref()));
                self.write_directive(node, "exercise", title.as_deref(), &options, |w| {
                    w.write_blocks_without_titles(&e.children)
                });
            }
            Node::Solution(s) => {
                let title = self.title_of(&s.children);
                let mut options = label_option(s.label.as_deref());
                options.extend(class_option(s.class.as_deref()));
                self.write_directive(node, "solution", title.as_deref(), &options, |w| {
                    w.write_blocks_without_titles(&s.children)
                });
            }
            Node::Proof(p) => {
                let name = format!("prf:{}", p.kind.as_deref().unwrap_or("proof"));
                let title = self.title_of(&p.children);
                let options = label_option(p.label.as_deref());
                self.write_directive(node, &name, title.as_deref(), &options, |w| {
                    w.write_blocks_without_titles(&p.children)
                });
            }
            Node::TabSet(t) => {
                self.write_directive(node, "tab-set", None, &[], |w| w.write_blocks(&t.children));
            }
            Node::TabItem(t) => {
                let title = (!t.title.is_empty()).then_some(t.title.as_str());
                self.write_directive(node, "tab-item", title, &[], |w| w.write_blocks(&t.children));
            }
            Node::Card(c) => {
                let title = c
                    .children
                    .iter()
                    .find_map(|n| match n {
                        Node::CardTitle(t) => Some(self.inline_text(&t.children)),
                        _ => None,
                    });
                let options: Vec<(&str, String)> =
                    c.url.iter().map(|url| ("link", url.clone())).collect();
                self.write_directive(node, "card", title.as_deref(), &options, |w| {
                    w.write_card_body(&c.children)
                });
            }
            Node::Grid(g) => {
                let columns = g.columns.as_ref().map(|cols| {
                    cols.iter()
                        .map(u32::to_string)
                        .collect::<Vec<_>>()
                        .join(" ")
                });
                self.write_directive(node, "grid", columns.as_deref(), &[], |w| {
                    w.write_blocks(&g.children)
                });
            }
            Node::Details(d) => {
                let title = d.children.iter().find_map(|n| match n {
                    Node::Summary(s) => Some(self.inline_text(&s.children)),
                    _ => None,
                });
                let options: Vec<(&str, String)> = match d.open {
                    Some(true) => vec![("open", String::new())],
                    _ => Vec::new(),
                };
                self.write_directive(node, "dropdown", title.as_deref(), &options, |w| {
                    let body: Vec<Node> = d
                        .children
                        .iter()
                        .filter(|n| !matches!(n, Node::Summary(_)))
                        .cloned()
                        .collect();
                    w.write_blocks(&body);
                });
            }
            Node::Aside(a) => {
                let name = a.kind.as_deref().unwrap_or("aside");
                let title = self.title_of(&a.children);
                let options = class_option(a.class.as_deref());
                self.write_directive(node, name, title.as_deref(), &options, |w| {
                    w.write_blocks_without_titles(&a.children)
                });
            }
            Node::Include(i) => self.write_blocks(&i.children),
            Node::MystDirective(d) => self.write_myst_directive(node, d),
            Node::MystRole(r) => match &r.value {
                Some(value) => {
                    self.push_inline(&format!("{{{}}}", r.name));
                    self.write_inline_code(value);
                }
                None => {
                    for child in &r.children {
                        self.write_node(child);
                    }
                }
            },
            Node::MystTarget(t) => self.write_target(Some(&t.label)),
            Node::Comment(c) => {
                self.ensure_newline();
                for line in c.value.lines() {
                    self.output.push_str("% ");
                    self.output.push_str(line);
                    self.output.push('\n');
                }
                self.at_line_start = true;
            }
            Node::Other(generic) => {
                self.report(
                    &generic.node_type,
                    "no Markdown form for this node; writing its content",
                );
                if !generic.children.is_empty() {
                    self.write_flow(&generic.children);
                } else if let Some(value) = generic.value() {
                    self.push_inline(value);
                }
            }
        }
    }

    fn write_heading(&mut self, h: &crate::mdast::Heading) {
        self.write_target(h.label.as_deref());
        self.ensure_newline();
        for _ in 0..h.depth.clamp(1, 6) {
            self.output.push('#');
        }
        self.output.push(' ');
        for child in &h.children {
            self.write_node(child);
        }
        self.output.push('\n');
        self.at_line_start = true;
    }

    fn write_paragraph(&mut self, children: &[Node]) {
        self.ensure_newline();
        for child in children {
            self.write_node(child);
        }
        self.output.push('\n');
        self.at_line_start = true;
    }

    fn write_thematic_break(&mut self) {
        self.ensure_newline();
        self.output.push_str("---\n");
        self.at_line_start = true;
    }

    fn write_blockquote(&mut self, children: &[Node]) {
        self.ensure_newline();
        let inner = self.capture(|w| w.write_blocks(children));
        for line in inner.trim_end_matches('\n').split('\n') {
            if line.is_empty() {
                self.output.push('>');
            } else {
                self.output.push_str("> ");
                self.output.push_str(line);
            }
            self.output.push('\n');
        }
        self.at_line_start = true;
    }

    fn write_list(&mut self, l: &List) {
        self.ensure_newline();
        let mut num = l.start.unwrap_or(1);
        let items: Vec<_> = l
            .children
            .iter()
            .filter_map(|n| match n {
                Node::ListItem(li) => Some(li),
                _ => None,
            })
            .collect();

        for (idx, li) in items.iter().enumerate() {
            let marker = if l.ordered {
                let m = format!("{}. ", num);
                num += 1;
                m
            } else {
                "- ".to_string()
            };
            let spread = l.spread || li.spread;
            let body = self.capture(|w| {
                for (i, child) in li.children.iter().enumerate() {
                    if i > 0 {
                        if spread {
                            w.ensure_blank_line();
                        } else {
                            w.ensure_newline();
                        }
                    }
                    w.write_block(child);
                }
            });

            // Continuation lines are indented to the content column
            let indent = " ".repeat(marker.len());
            for (i, line) in body.trim_end_matches('\n').split('\n').enumerate() {
                if i == 0 {
                    self.output.push_str(marker.trim_end());
                    if !line.is_empty() {
                        self.output.push(' ');
                        self.output.push_str(line);
                    }
                } else if !line.is_empty() {
                    self.output.push_str(&indent);
                    self.output.push_str(line);
                }
                self.output.push('\n');
            }
            if l.spread && idx + 1 < items.len() {
                self.output.push('\n');
            }
        }
        self.at_line_start = true;
    }

    fn write_code(&mut self, c: &Code) {
        let mut options = Vec::new();
        if let Some(label) = &c.label {
            options.push(("label", label.clone()));
        }
        if let Some(filename) = &c.filename {
            options.push(("filename", filename.clone()));
        }
        if c.show_line_numbers == Some(true) {
            options.push(("linenos", String::new()));
        }
        if let Some(start) = c.starting_line_number {
            options.push(("lineno-start", start.to_string()));
        }
        if let Some(lines) = &c.emphasize_lines {
            let lines: Vec<_> = lines.iter().map(u32::to_string).collect();
            options.push(("emphasize-lines", lines.join(",")));
        }
        if let Some(class) = &c.class {
            options.push(("class", class.clone()));
        }

        if options.is_empty() {
            let mut info = c.lang.clone().unwrap_or_default();
            if let Some(meta) = &c.meta {
                info.push(' ');
                info.push_str(meta);
            }
            self.write_fenced(&info, &[], &c.value);
        } else {
            let info = match &c.lang {
                Some(lang) => format!("{{code-block}} {}", lang),
                None => "{code-block}".to_string(),
            };
            self.write_fenced(&info, &options, &c.value);
        }
    }

    /// Backtick-fenced block with an info string and directive options
    fn write_fenced(&mut self, info: &str, options: &[(&str, String)], value: &str) {
        self.ensure_newline();

        // Fence must be longer than any backtick sequence in content
        let fence_len = calculate_fence_length(value);
        let fence = "`".repeat(fence_len);

        self.output.push_str(&fence);
        self.output.push_str(info);
        self.output.push('\n');
        self.write_options(options);
        self.output.push_str(value);
        if !value.is_empty() && !value.ends_with('\n') {
            self.output.push('\n');
        }
        self.output.push_str(&fence);
        self.output.push('\n');
        self.at_line_start = true;
    }

    fn write_table(&mut self, t: &Table) {
        self.ensure_newline();

        let rows: Vec<&TableRow> = t
            .children
            .iter()
            .filter_map(|n| {
                if let Node::TableRow(r) = n {
                    Some(r)
                } else {
                    None
                }
            })
            .collect();

        if rows.is_empty() {
            return;
        }

        let num_cols = rows.iter().map(|r| r.children.len()).max().unwrap_or(0);

        // Write header row
        if let Some(header) = rows.first() {
            self.write_table_row(header, num_cols);
        }

        // Write separator
        self.output.push('|');
        for i in 0..num_cols {
            let align = t.align.get(i).copied().flatten();
            match align {
                Some(Align::Left) => self.output.push_str(":---|"),
                Some(Align::Center) => self.output.push_str(":--:|"),
                Some(Align::Right) => self.output.push_str("---:|"),
                None => self.output.push_str("----|"),
            }
        }
        self.output.push('\n');

        // Write data rows
        for row in rows.iter().skip(1) {
            self.write_table_row(row, num_cols);
        }

        self.at_line_start = true;
    }

    fn write_table_row(&mut self, row: &TableRow, num_cols: usize) {
        self.output.push('|');
        for (i, cell) in row.children.iter().enumerate() {
            if i >= num_cols {
                break;
            }
            if let Node::TableCell(c) = cell {
                self.output.push(' ');
                let content = self.capture(|w| {
                    for child in &c.children {
                        match child {
                            Node::Paragraph(p) => {
                                for inline in &p.children {
                                    w.write_node(inline);
                                }
                            }
                            _ => w.write_node(child),
                        }
                    }
                });
                self.output
                    .push_str(&content.trim_end().replace('\n', " ").replace('|', "\\|"));
                self.output.push_str(" |");
            }
        }
        // Fill missing cells
        for _ in row.children.len()..num_cols {
            self.output.push_str(" |");
        }
        self.output.push('\n');
    }

    fn write_definition_list(&mut self, children: &[Node]) {
        self.ensure_newline();
        for (i, child) in children.iter().enumerate() {
            match child {
                Node::DefinitionTerm(dt) => {
                    if i > 0 {
                        self.ensure_blank_line();
                    }
                    let term = self.inline_text(&dt.children);
                    self.output.push_str(&term);
                    self.output.push('\n');
                }
                Node::DefinitionDescription(dd) => {
                    let body = self.capture(|w| w.write_blocks(&dd.children));
                    for (j, line) in body.trim_end_matches('\n').split('\n').enumerate() {
                        if j == 0 {
                            self.output.push_str(": ");
                            self.output.push_str(line);
                        } else if !line.is_empty() {
                            self.output.push_str("  ");
                            self.output.push_str(line);
                        }
                        self.output.push('\n');
                    }
                }
                _ => {}
            }
        }
        self.at_line_start = true;
    }

    fn write_wrapped(&mut self, marker: &str, children: &[Node]) {
        self.push_inline(marker);
        for child in children {
            self.write_node(child);
        }
        self.push_inline(marker);
    }

    fn write_inline_code(&mut self, value: &str) {
        // Add space before if the previous character is a backtick
        // This prevents `foo``bar` which CommonMark parses as a single code span
        if self.output.ends_with('`') {
            self.output.push(' ');
        }

        if value.contains('`') {
            self.push_inline("`` ");
            self.push_inline(value);
            self.push_inline(" ``");
        } else {
            self.push_inline("`");
            self.push_inline(value);
            self.push_inline("`");
        }
    }

    fn write_break(&mut self) {
        self.output.push_str("  \n");
        self.at_line_start = true;
    }

    fn write_link(&mut self, children: &[Node], url: &str, title: Option<&str>) {
        self.push_inline("[");
        for child in children {
            self.write_node(child);
        }
        self.push_inline("](");
        self.push_inline(&link_destination(url));
        self.write_link_title(title);
        self.push_inline(")");
    }

    fn write_link_title(&mut self, title: Option<&str>) {
        if let Some(title) = title {
            self.push_inline(" \"");
            self.push_inline(&title.replace('"', "\\\""));
            self.push_inline("\"");
        }
    }

    fn write_image(&mut self, img: &Image) {
        self.push_inline("![");
        self.push_inline(&escape_brackets(img.alt.as_deref().unwrap_or_default()));
        self.push_inline("](");
        self.push_inline(&link_destination(&img.url));
        self.write_link_title(img.title.as_deref());
        self.push_inline(")");
    }

    fn write_image_directive(&mut self, img: &Image) {
        let mut options = Vec::new();
        let attrs = [
            ("alt", &img.alt),
            ("class", &img.class),
            ("width", &img.width),
            ("height", &img.height),
            ("align", &img.align),
        ];
        for (key, value) in attrs {
            if let Some(value) = value {
                options.push((key, value.clone()));
            }
        }
        let node = Node::Image(img.clone());
        self.write_directive(&node, "image", Some(&img.url), &options, |_| {});
    }

    fn write_cross_reference(&mut self, x: &CrossReference) {
        let Some(target) = x.identifier.as_deref().or(x.label.as_deref()) else {
            self.report("crossReference", "cross reference has no target; writing its text");
            for child in &x.children {
                self.write_node(child);
            }
            return;
        };
        if x.children.is_empty() {
            let text = x.label.as_deref().unwrap_or(target).to_string();
            self.write_link(&[Node::text(text)], &format!("#{}", target), None);
        } else {
            self.write_link(&x.children, &format!("#{}", target), None);
        }
    }

    fn write_math(&mut self, m: &Math) {
        match &m.label {
            Some(label) => {
                self.write_fenced("{math}", &[("label", label.clone())], &m.value);
            }
            None => {
                self.ensure_newline();
                self.output.push_str("$$\n");
                self.output.push_str(&m.value);
                if !m.value.ends_with('\n') {
                    self.output.push('\n');
                }
                self.output.push_str("$$\n");
                self.at_line_start = true;
            }
        }
    }

    fn write_container(&mut self, node: &Node, c: &Container) {
        let mut options = label_option(c.label.as_deref());
        options.extend(class_option(c.class.as_deref()));
        let caption = c.children.iter().find_map(|n| match n {
            Node::Caption(p) => Some(p),
            _ => None,
        });

        match c.kind.as_deref() {
            Some("figure") => {
                let image = c.children.iter().find_map(|n| match n {
                    Node::Image(img) => Some(img),
                    _ => None,
                });
                if let Some(img) = image {
                    if let Some(alt) = &img.alt {
                        options.push(("alt", alt.clone()));
                    }
                    if let Some(width) = &img.width {
                        options.push(("width", width.clone()));
                    }
                }
                let url = image.map(|img| img.url.as_str());
                self.write_directive(node, "figure", url, &options, |w| {
                    let body: Vec<Node> = c
                        .children
                        .iter()
                        .filter(|n| !matches!(n, Node::Image(_)))
                        .cloned()
                        .collect();
                    w.write_blocks(&body);
                });
            }
            Some("table") => {
                let title = caption.map(|p| self.inline_text(&p.children));
                self.write_directive(node, "table", title.as_deref(), &options, |w| {
                    let body: Vec<Node> = c
                        .children
                        .iter()
                        .filter(|n| !matches!(n, Node::Caption(_)))
                        .cloned()
                        .collect();
                    w.write_blocks(&body);
                });
            }
            Some("code") => {
                let code = c.children.iter().find_map(|n| match n {
                    Node::Code(code) => Some(code),
                    _ => None,
                });
                if let Some(p) = caption {
                    options.push(("caption", self.inline_text(&p.children)));
                }
                let info = match code.and_then(|code| code.lang.as_deref()) {
                    Some(lang) => format!("{{code-block}} {}", lang),
                    None => "{code-block}".to_string(),
                };
                let value = code.map(|code| code.value.as_str()).unwrap_or_default();
                self.write_fenced(&info, &options, value);
            }
            _ => self.write_blocks(&c.children),
        }
    }

    fn write_myst_directive(&mut self, node: &Node, d: &MystDirective) {
        let options: Vec<(&str, String)> = d
            .options
            .iter()
            .flatten()
            .map(|(key, value)| {
                let value = match value {
                    Value::String(s) => s.clone(),
                    Value::Bool(true) => String::new(),
                    other => other.to_string(),
                };
                (key.as_str(), value)
            })
            .collect();
        self.write_directive(node, &d.name, d.args.as_deref(), &options, |w| {
            match &d.value {
                Some(value) if d.children.is_empty() => {
                    w.ensure_newline();
                    w.output.push_str(value);
                    w.at_line_start = value.is_empty() || value.ends_with('\n');
                }
                _ => w.write_blocks(&d.children),
            }
        });
    }

    fn write_card_body(&mut self, children: &[Node]) {
        let header: Vec<&Node> = children
            .iter()
            .filter(|n| matches!(n, Node::Header(_)))
            .collect();
        let footer: Vec<&Node> = children
            .iter()
            .filter(|n| matches!(n, Node::Footer(_)))
            .collect();
        let body: Vec<Node> = children
            .iter()
            .filter(|n| !matches!(n, Node::Header(_) | Node::Footer(_) | Node::CardTitle(_)))
            .cloned()
            .collect();

        for node in &header {
            self.write_block(node);
        }
        if !header.is_empty() {
            self.ensure_newline();
            self.output.push_str("^^^\n");
        }
        self.write_blocks(&body);
        if !footer.is_empty() {
            self.ensure_newline();
            self.output.push_str("+++\n");
            for node in &footer {
                self.write_block(node);
            }
        }
    }

    /// Colon-fenced directive; the fence grows with the nesting depth of inner directives
    fn write_directive(
        &mut self,
        node: &Node,
        name: &str,
        arg: Option<&str>,
        options: &[(&str, String)],
        body: impl FnOnce(&mut Self),
    ) {
        self.ensure_newline();
        let depth = node.children().map_or(0, |c| nested_directive_depth(c));
        let fence = ":".repeat(3 + depth);

        self.output.push_str(&fence);
        self.output.push('{');
        self.output.push_str(name);
        self.output.push('}');
        if let Some(arg) = arg.filter(|a| !a.is_empty()) {
            self.output.push(' ');
            self.output.push_str(arg);
        }
        self.output.push('\n');
        self.write_options(options);
        self.at_line_start = true;

        body(self);

        self.ensure_newline();
        self.output.push_str(&fence);
        self.output.push('\n');
        self.at_line_start = true;
    }

    fn write_options(&mut self, options: &[(&str, String)]) {
        for (key, value) in options {
            self.output.push(':');
            self.output.push_str(key);
            self.output.push(':');
            if !value.is_empty() {
                self.output.push(' ');
                self.output.push_str(value);
            }
            self.output.push('\n');
        }
    }

    fn write_blocks_without_titles(&mut self, children: &[Node]) {
        let body: Vec<Node> = children
            .iter()
            .filter(|n| !matches!(n, Node::AdmonitionTitle(_)))
            .cloned()
            .collect();
        self.write_blocks(&body);
    }

    /// `(label)=` target line
    fn write_target(&mut self, label: Option<&str>) {
        if let Some(label) = label {
            self.ensure_newline();
            self.output.push('(');
            self.output.push_str(label);
            self.output.push_str(")=\n");
            self.at_line_start = true;
        }
    }

    fn title_of(&mut self, children: &[Node]) -> Option<String> {
        children.iter().find_map(|n| match n {
            Node::AdmonitionTitle(t) => Some(t),
            _ => None,
        })
        .map(|t| self.inline_text(&t.children))
    }

    /// Inline rendering of `nodes` on a single line (paragraphs are unwrapped)
    fn inline_text(&mut self, nodes: &[Node]) -> String {
        let text = self.capture(|w| {
            for node in nodes {
                match node {
                    Node::Paragraph(p) => {
                        for child in &p.children {
                            w.write_node(child);
                        }
                    }
                    _ => w.write_node(node),
                }
            }
        });
        text.trim().replace('\n', " ")
    }

    /// Run `f` and return what it wrote instead of appending it
    fn capture(&mut self, f: impl FnOnce(&mut Self)) -> String {
        let start = self.output.len();
        self.at_line_start = true;
        f(self);
        let captured = self.output.split_off(start);
        self.at_line_start = self.output.is_empty() || self.output.ends_with('\n');
        captured
    }

    fn push_inline(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        self.output.push_str(s);
        self.at_line_start = s.ends_with('\n');
    }

    fn report(&mut self, node_type: &str, message: &str) {
        self.diagnostics.report(Diagnostic {
            node_type: node_type.to_string(),
            message: message.to_string(),
        });
    }

    // Helper methods

    fn ensure_newline(&mut self) {
        if !self.at_line_start && !self.output.is_empty() {
            self.output.push('\n');
            self.at_line_start = true;
        }
    }

    fn ensure_blank_line(&mut self) {
        self.ensure_newline();
        if !self.output.ends_with("\n\n") && !self.output.is_empty() {
            self.output.push('\n');
        }
    }
}

fn label_option(label: Option<&str>) -> Vec<(&'static str, String)> {
    label.map(|l| ("label", l.to_string())).into_iter().collect()
}

fn class_option(class: Option<&str>) -> Vec<(&'static str, String)> {
    class.map(|c| ("class", c.to_string())).into_iter().collect()
}

/// Whether a node is phrasing content
fn is_inline(node: &Node) -> bool {
    matches!(
        node,
        Node::Text(_)
            | Node::Emphasis(_)
            | Node::Strong(_)
            | Node::InlineCode(_)
            | Node::Break
            | Node::Link(_)
            | Node::Image(_)
            | Node::CrossReference(_)
            | Node::InlineMath(_)
            | Node::MystRole(_)
    )
}

/// Whether the writer emits this node as a colon-fenced directive
fn writes_directive(node: &Node) -> bool {
    match node {
        Node::Admonition(_)
        | Node::Exercise(_)
        | Node::Solution(_)
        | Node::Proof(_)
        | Node::TabSet(_)
        | Node::TabItem(_)
        | Node::Card(_)
        | Node::Grid(_)
        | Node::Details(_)
        | Node::Aside(_)
        | Node::MystDirective(_) => true,
        Node::Container(c) => matches!(c.kind.as_deref(), Some("figure") | Some("table")),
        Node::Image(img) => img.has_directive_attributes(),
        _ => false,
    }
}

fn nested_directive_depth(nodes: &[Node]) -> usize {
    nodes
        .iter()
        .map(|n| {
            let inner = n.children().map_or(0, |c| nested_directive_depth(c));
            if writes_directive(n) { inner + 1 } else { inner }
        })
        .max()
        .unwrap_or(0)
}

fn escape_brackets(s: &str) -> String {
    s.replace('[', "\\[").replace(']', "\\]")
}

/// Link or image destination: `<url>` when the URL has whitespace or angle
/// brackets, otherwise the URL with parentheses escaped
fn link_destination(url: &str) -> String {
    if url.contains(|c: char| c.is_whitespace() || c == '<' || c == '>') {
        format!("<{}>", url.replace('<', "\\<").replace('>', "\\>"))
    } else {
        url.replace('(', "\\(").replace(')', "\\)")
    }
}

/// Calculate the minimum fence length needed for a code block.
///
/// The fence must be longer than any sequence of consecutive backticks in the content.
/// Returns at least 3 (the minimum for a valid fenced code block).
fn calculate_fence_length(content: &str) -> usize {
    let mut max_backticks = 0;
    let mut current_run = 0;

    for c in content.chars() {
        if c == '`' {
            current_run += 1;
            max_backticks = max_backticks.max(current_run);
        } else {
            current_run = 0;
        }
    }

    3.max(max_backticks + 1)
}

#[cfg(test)]
mod tests;
