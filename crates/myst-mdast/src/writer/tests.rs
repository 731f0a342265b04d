use super::*;
use crate::mdast::*;

fn md(children: Vec<Node>) -> String {
    mdast_to_md(&Root::new(children), &WriterOptions::default())
}

#[test]
fn test_heading_and_paragraph() {
    let out = md(vec![
        Node::heading(1, vec![Node::text("Title")]),
        Node::paragraph(vec![Node::text("Hello world")]),
    ]);
    assert_eq!(out, "# Title\n\nHello world\n");
}

#[test]
fn test_heading_levels_are_clamped() {
    let out = md(vec![Node::heading(9, vec![Node::text("Deep")])]);
    assert_eq!(out, "###### Deep\n");
}

#[test]
fn test_heading_label_target() {
    let out = md(vec![Node::Heading(Heading {
        depth: 1,
        label: Some("intro".to_string()),
        identifier: Some("intro".to_string()),
        children: vec![Node::text("Intro")],
    })]);
    assert_eq!(out, "(intro)=\n# Intro\n");
}

#[test]
fn test_code_block() {
    let out = md(vec![Node::code(Some("python".to_string()), "x = 1")]);
    assert_eq!(out, "```python\nx = 1\n```\n");
}

#[test]
fn test_code_block_with_triple_backticks() {
    let code = "Here is a code block:\n```r\nx <- 1\n```";
    let out = md(vec![Node::code(Some("markdown".to_string()), code)]);
    assert!(out.starts_with("````markdown\n"));
    assert!(out.ends_with("\n````\n"));
}

#[test]
fn test_code_block_directive_attributes() {
    let out = md(vec![Node::Code(Code {
        lang: Some("python".to_string()),
        value: "a = 1\nb = 2".to_string(),
        emphasize_lines: Some(vec![1, 2]),
        ..Default::default()
    })]);
    assert_eq!(
        out,
        "```{code-block} python\n:emphasize-lines: 1,2\na = 1\nb = 2\n```\n"
    );
}

#[test]
fn test_math() {
    assert_eq!(md(vec![Node::math("E=mc^2")]), "$$\nE=mc^2\n$$\n");

    let labelled = Node::Math(Math {
        value: "E=mc^2".to_string(),
        label: Some("eq-energy".to_string()),
        ..Default::default()
    });
    assert_eq!(
        md(vec![labelled]),
        "```{math}\n:label: eq-energy\nE=mc^2\n```\n"
    );

    let inline = md(vec![Node::paragraph(vec![
        Node::text("so "),
        Node::inline_math("x^2"),
    ])]);
    assert_eq!(inline, "so $x^2$\n");
}

#[test]
fn test_image_escaping() {
    let out = md(vec![Node::paragraph(vec![Node::image(
        "/img/a (1).png",
        "x [y]",
    )])]);
    assert_eq!(out, "![x \\[y\\]](</img/a (1).png>)\n");

    let out = md(vec![Node::paragraph(vec![Node::image("/img/a(1).png", "x")])]);
    assert_eq!(out, "![x](/img/a\\(1\\).png)\n");
}

#[test]
fn test_image_title_quotes_are_escaped() {
    let out = md(vec![Node::paragraph(vec![Node::Image(Image {
        url: "/img/<q>.png".to_string(),
        title: Some(r#"say "hi""#.to_string()),
        alt: Some("q".to_string()),
        ..Default::default()
    })])]);
    assert_eq!(out, "![q](</img/\\<q\\>.png> \"say \\\"hi\\\"\")\n");
}

#[test]
fn test_block_image_with_directive_attributes() {
    let out = md(vec![Node::Image(Image {
        url: "/img/a.png".to_string(),
        alt: Some("A".to_string()),
        width: Some("50%".to_string()),
        ..Default::default()
    })]);
    assert_eq!(out, ":::{image} /img/a.png\n:alt: A\n:width: 50%\n:::\n");
}

#[test]
fn test_blockquote_prefixes_every_line() {
    let out = md(vec![Node::blockquote(vec![
        Node::paragraph(vec![Node::text("a")]),
        Node::paragraph(vec![Node::text("b")]),
    ])]);
    assert_eq!(out, "> a\n>\n> b\n");
}

#[test]
fn test_lists() {
    let out = md(vec![Node::list(
        false,
        vec![
            Node::list_item(vec![
                Node::paragraph(vec![Node::text("a")]),
                Node::list(
                    true,
                    vec![Node::list_item(vec![Node::paragraph(vec![Node::text(
                        "b",
                    )])])],
                ),
            ]),
            Node::list_item(vec![Node::paragraph(vec![Node::text("c")])]),
        ],
    )]);
    assert_eq!(out, "- a\n  1. b\n- c\n");
}

#[test]
fn test_table() {
    let cell = |s: &str| {
        Node::TableCell(TableCell {
            header: None,
            children: vec![Node::text(s)],
        })
    };
    let out = md(vec![Node::Table(Table {
        align: vec![None, Some(Align::Right)],
        children: vec![
            Node::TableRow(TableRow {
                children: vec![cell("A"), cell("B")],
            }),
            Node::TableRow(TableRow {
                children: vec![cell("1"), cell("2")],
            }),
        ],
    })]);
    assert_eq!(out, "| A | B |\n|----|---:|\n| 1 | 2 |\n");
}

#[test]
fn test_admonition_directive() {
    let out = md(vec![Node::Admonition(Admonition {
        kind: Some("note".to_string()),
        class: None,
        children: vec![
            Node::admonition_title(vec![Node::text("Heads up")]),
            Node::paragraph(vec![Node::text("Body")]),
        ],
    })]);
    assert_eq!(out, ":::{note} Heads up\nBody\n:::\n");
}

#[test]
fn test_nested_directive_fences_grow() {
    let out = md(vec![Node::exercise(vec![Node::Admonition(Admonition {
        kind: Some("tip".to_string()),
        class: None,
        children: vec![Node::paragraph(vec![Node::text("x")])],
    })])]);
    assert_eq!(out, "::::{exercise}\n:::{tip}\nx\n:::\n::::\n");
}

#[test]
fn test_figure_container() {
    let out = md(vec![Node::Container(Container {
        kind: Some("figure".to_string()),
        label: Some("fig-chart".to_string()),
        children: vec![
            Node::image("/img/chart.png", "A chart"),
            Node::Caption(Parent {
                children: vec![Node::paragraph(vec![Node::text("Sales by month")])],
            }),
        ],
        ..Default::default()
    })]);
    insta::assert_snapshot!(out.trim_end(), @r"
    :::{figure} /img/chart.png
    :label: fig-chart
    :alt: A chart
    Sales by month
    :::
    ");
}

#[test]
fn test_targets_comments_and_roles() {
    let out = md(vec![
        Node::target("my-label"),
        Node::comment("hidden"),
        Node::paragraph(vec![
            Node::text("H"),
            Node::MystRole(MystRole {
                name: "sub".to_string(),
                value: Some("2".to_string()),
                children: vec![],
            }),
            Node::text("O"),
        ]),
    ]);
    assert_eq!(out, "(my-label)=\n\n% hidden\n\nH{sub}`2`O\n");
}

#[test]
fn test_block_breaks() {
    let mut data = serde_json::Map::new();
    data.insert("tags".to_string(), serde_json::json!(["a"]));
    let out = md(vec![
        Node::Block(Block {
            data: Some(data),
            children: vec![Node::paragraph(vec![Node::text("first")])],
            ..Default::default()
        }),
        Node::block(vec![Node::paragraph(vec![Node::text("second")])]),
    ]);
    assert_eq!(out, "+++ {\"tags\":[\"a\"]}\n\nfirst\n\n+++\n\nsecond\n");
}

#[test]
fn test_block_separators_disabled() {
    let root = Root::new(vec![
        Node::block(vec![Node::paragraph(vec![Node::text("first")])]),
        Node::block(vec![Node::paragraph(vec![Node::text("second")])]),
    ]);
    let options = WriterOptions {
        block_separators: false,
    };
    assert_eq!(mdast_to_md(&root, &options), "first\n\nsecond\n");
}

#[test]
fn test_cross_reference() {
    let out = md(vec![Node::paragraph(vec![
        Node::text("See "),
        Node::CrossReference(CrossReference {
            identifier: Some("fig-chart".to_string()),
            children: vec![Node::text("Figure 1")],
            ..Default::default()
        }),
    ])]);
    assert_eq!(out, "See [Figure 1](#fig-chart)\n");
}

#[test]
fn test_diagnostics_are_reported_to_sink() {
    let root = Root::new(vec![Node::paragraph(vec![
        Node::CrossReference(CrossReference {
            children: vec![Node::text("dangling")],
            ..Default::default()
        }),
        Node::Other(GenericNode {
            node_type: "footnoteReference".to_string(),
            ..Default::default()
        }),
    ])]);
    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let out = mdast_to_md_with_diagnostics(&root, &WriterOptions::default(), &mut diagnostics);

    assert_eq!(out, "dangling\n");
    assert_eq!(diagnostics.len(), 2);
    assert_eq!(diagnostics[0].node_type, "crossReference");
    assert_eq!(diagnostics[1].node_type, "footnoteReference");
}

#[test]
fn test_unknown_node_writes_value() {
    let mut fields = serde_json::Map::new();
    fields.insert("value".to_string(), serde_json::json!("raw"));
    let out = md(vec![Node::paragraph(vec![Node::Other(GenericNode {
        node_type: "abbreviation".to_string(),
        children: vec![],
        fields,
    })])]);
    assert_eq!(out, "raw\n");
}
