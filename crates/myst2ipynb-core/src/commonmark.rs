//! Degrade MyST-only nodes to CommonMark-expressible equivalents
//!
//! Every node kind maps to zero, one or many replacement nodes. Children are
//! degraded before their parent is rewritten, so a parent only ever sees
//! CommonMark content when it builds its replacement.

use crate::options::CommonMarkOptions;
use myst_mdast::{
    Admonition, Aside, Card, Code, Container, Details, Exercise, Grid, Image, Math,
    MystDirective, MystRole, Node, Parent, Proof, Root, Solution, TabItem,
};
use std::mem;

/// Degrade a whole document in place
pub fn to_commonmark(root: &mut Root, options: &CommonMarkOptions) {
    let children = mem::take(&mut root.children);
    root.children = degrade_nodes(children, options);
}

/// Degrade a list of sibling nodes.
///
/// Replacements are spliced into the list, then target metadata is stripped
/// from every resulting node.
pub fn degrade_nodes(nodes: Vec<Node>, options: &CommonMarkOptions) -> Vec<Node> {
    let mut out: Vec<Node> = nodes
        .into_iter()
        .flat_map(|node| degrade_node(node, options))
        .collect();
    for node in &mut out {
        node.strip_target();
    }
    out
}

fn degrade_node(mut node: Node, options: &CommonMarkOptions) -> Vec<Node> {
    if let Some(children) = node.children_mut() {
        let taken = mem::take(children);
        *children = degrade_nodes(taken, options);
    }

    match node {
        Node::Admonition(a) => vec![degrade_admonition(a)],
        Node::Math(m) => vec![degrade_math(m)],
        Node::InlineMath(m) => vec![Node::html(format!("${}$", m.value))],
        Node::Container(c) => degrade_container(c),
        Node::Exercise(e) => degrade_exercise(e),
        Node::Solution(_) if options.drop_solutions => Vec::new(),
        Node::Solution(s) => degrade_solution(s),
        Node::Proof(p) => degrade_proof(p),
        Node::TabSet(Parent { children }) | Node::Grid(Grid { children, .. }) => children,
        Node::TabItem(t) => degrade_tab_item(t),
        Node::Card(c) => degrade_card(c),
        Node::Details(d) => vec![degrade_details(d)],
        Node::Aside(a) => vec![degrade_aside(a)],
        Node::Code(c) => vec![Node::Code(plain_code(c))],
        Node::Image(img) => vec![Node::Image(plain_image(img))],
        Node::MystDirective(d) => degrade_directive(d),
        Node::MystRole(r) => degrade_role(r),
        Node::Include(i) => i.children,
        Node::MystTarget(_) | Node::Comment(_) => Vec::new(),
        other => vec![other],
    }
}

fn degrade_admonition(a: Admonition) -> Node {
    let (title, body) = split_title(a.children);
    let title = title.unwrap_or_else(|| {
        vec![Node::text(capitalize(a.kind.as_deref().unwrap_or("note")))]
    });
    let mut children = vec![bold_paragraph(title)];
    children.extend(body);
    Node::blockquote(children)
}

fn degrade_math(m: Math) -> Node {
    let mut value = format!("$$\n{}\n$$", m.value);
    if let Some(label) = &m.label {
        value.push_str(&format!("\n<!-- ({label}) -->"));
    }
    Node::html(value)
}

fn degrade_container(c: Container) -> Vec<Node> {
    let mut caption = None;
    let mut legend = Vec::new();
    let mut rest = Vec::new();
    for child in c.children {
        match child {
            Node::Caption(p) => caption = Some(p.children),
            Node::Legend(p) => legend.extend(p.children),
            other => rest.push(other),
        }
    }

    match c.kind.as_deref() {
        Some("figure") => {
            let caption_text = caption
                .as_deref()
                .map(myst_mdast::to_plain_text)
                .unwrap_or_default();
            let mut out: Vec<Node> = rest
                .into_iter()
                .map(|node| match node {
                    Node::Image(mut img) if img.alt.as_deref().is_none_or(str::is_empty) => {
                        if !caption_text.is_empty() {
                            img.alt = Some(caption_text.clone());
                        }
                        Node::Image(img)
                    }
                    other => other,
                })
                .collect();
            if let Some(caption) = caption {
                let mut inline = numbered_prefix("Figure", c.enumerator.as_deref());
                inline.extend(inline_content(caption));
                out.push(Node::paragraph(vec![Node::emphasis(inline)]));
            }
            out.extend(legend);
            out
        }
        Some("table") => {
            let mut out = Vec::new();
            if let Some(caption) = caption {
                let mut inline = numbered_prefix("Table", c.enumerator.as_deref());
                inline.extend(inline_content(caption));
                out.push(bold_paragraph(inline));
            }
            out.extend(rest);
            out.extend(legend);
            out
        }
        Some("code") => rest,
        _ => {
            let mut out = rest;
            if let Some(caption) = caption {
                out.push(Node::paragraph(vec![Node::emphasis(inline_content(caption))]));
            }
            out.extend(legend);
            out
        }
    }
}

fn degrade_exercise(e: Exercise) -> Vec<Node> {
    headed("Exercise", e.enumerator.as_deref(), e.children)
}

fn degrade_solution(s: Solution) -> Vec<Node> {
    headed("Solution", None, s.children)
}

fn degrade_proof(p: Proof) -> Vec<Node> {
    let kind = p
        .kind
        .as_deref()
        .map(|k| k.strip_prefix("prf:").unwrap_or(k))
        .filter(|k| !k.is_empty())
        .unwrap_or("proof");
    headed(&capitalize(kind), p.enumerator.as_deref(), p.children)
}

/// Bold `"<name> N (<title>)"` header followed by the body
fn headed(name: &str, enumerator: Option<&str>, children: Vec<Node>) -> Vec<Node> {
    let (title, body) = split_title(children);
    let mut header = numbered_label(name, enumerator);
    if let Some(title) = title.filter(|t| !t.is_empty()) {
        header.push(Node::text(" ("));
        header.extend(title);
        header.push(Node::text(")"));
    }
    let mut out = vec![bold_paragraph(header)];
    out.extend(body);
    out
}

fn degrade_tab_item(t: TabItem) -> Vec<Node> {
    let mut out = Vec::new();
    if !t.title.is_empty() {
        out.push(bold_paragraph(vec![Node::text(t.title)]));
    }
    out.extend(t.children);
    out
}

fn degrade_card(c: Card) -> Vec<Node> {
    let mut title = None;
    let mut body = Vec::new();
    for child in c.children {
        match child {
            Node::CardTitle(p) => title = Some(inline_content(p.children)),
            Node::Header(_) | Node::Footer(_) => {}
            other => body.push(other),
        }
    }

    let mut out = Vec::new();
    if let Some(title) = title.filter(|t| !t.is_empty()) {
        let title = match c.url {
            Some(url) => vec![Node::link(url, title)],
            None => title,
        };
        out.push(bold_paragraph(title));
    }
    out.extend(body);
    out
}

fn degrade_details(d: Details) -> Node {
    let mut summary = None;
    let mut body = Vec::new();
    for child in d.children {
        match child {
            Node::Summary(p) => summary = Some(inline_content(p.children)),
            other => body.push(other),
        }
    }
    let summary = summary
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| vec![Node::text("Details")]);

    let mut children = vec![bold_paragraph(summary)];
    children.extend(body);
    Node::blockquote(children)
}

fn degrade_aside(a: Aside) -> Node {
    let (title, body) = split_title(a.children);
    let mut children = Vec::new();
    if let Some(title) = title.filter(|t| !t.is_empty()) {
        children.push(bold_paragraph(title));
    }
    children.extend(body);
    Node::blockquote(children)
}

fn degrade_directive(d: MystDirective) -> Vec<Node> {
    if !d.children.is_empty() {
        return d.children;
    }
    match d.value {
        Some(value) => vec![Node::code(Some(d.name).filter(|n| !n.is_empty()), value)],
        None => Vec::new(),
    }
}

fn degrade_role(r: MystRole) -> Vec<Node> {
    if !r.children.is_empty() {
        return r.children;
    }
    match r.value {
        Some(value) => vec![Node::inline_code(value)],
        None => Vec::new(),
    }
}

/// Code node with only the attributes a CommonMark fence can carry
fn plain_code(c: Code) -> Code {
    Code {
        lang: c.lang,
        meta: c.meta,
        value: c.value,
        ..Default::default()
    }
}

/// Image node without `{image}` directive attributes
fn plain_image(img: Image) -> Image {
    Image {
        url: img.url,
        title: img.title,
        alt: img.alt,
        ..Default::default()
    }
}

/// Separate a leading `admonitionTitle` from the body
fn split_title(children: Vec<Node>) -> (Option<Vec<Node>>, Vec<Node>) {
    let mut title = None;
    let mut body = Vec::with_capacity(children.len());
    for child in children {
        match child {
            Node::AdmonitionTitle(p) if title.is_none() && body.is_empty() => {
                title = Some(inline_content(p.children));
            }
            other => body.push(other),
        }
    }
    (title, body)
}

/// Unwrap paragraphs so content can sit inside a single inline parent
fn inline_content(nodes: Vec<Node>) -> Vec<Node> {
    let mut out = Vec::new();
    for node in nodes {
        let inline = match node {
            Node::Paragraph(p) => p.children,
            other => vec![other],
        };
        if !out.is_empty() && !inline.is_empty() {
            out.push(Node::text(" "));
        }
        out.extend(inline);
    }
    out
}

fn bold_paragraph(inline: Vec<Node>) -> Node {
    Node::paragraph(vec![Node::strong(inline)])
}

/// `"<name> N"` as inline text
fn numbered_label(name: &str, enumerator: Option<&str>) -> Vec<Node> {
    match enumerator {
        Some(n) if !n.is_empty() => vec![Node::text(format!("{name} {n}"))],
        _ => vec![Node::text(name)],
    }
}

/// `"<name> N: "` caption prefix, empty without an enumerator
fn numbered_prefix(name: &str, enumerator: Option<&str>) -> Vec<Node> {
    match enumerator {
        Some(n) if !n.is_empty() => vec![Node::text(format!("{name} {n}: "))],
        _ => Vec::new(),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
