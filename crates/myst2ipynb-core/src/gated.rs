//! Lift code cells out of exercise and solution directives
//!
//! Gated syntax (`{exercise-start}` ... `{exercise-end}`) makes the parser
//! nest everything between the markers, code cells included, inside the
//! exercise or solution node. A notebook needs those code cells at the top
//! level, so the wrapper is split around them.

use myst_mdast::{Block, Node};
use std::borrow::Cow;

/// Promote code cells nested in exercises and solutions to top-level units.
///
/// Returns `Cow::Borrowed` when nothing had to be split. Solutions that will
/// be dropped (`drop_solutions`) are left intact so they disappear whole.
pub fn lift_code_cells(children: &[Node], drop_solutions: bool) -> Cow<'_, [Node]> {
    if !children.iter().any(|child| needs_lift(child, drop_solutions)) {
        return Cow::Borrowed(children);
    }

    let mut out = Vec::with_capacity(children.len() + 2);
    for child in children {
        match child {
            gated if is_gated(gated, drop_solutions) => out.extend(split_gated(gated)),
            Node::Block(block) if needs_lift(child, drop_solutions) => {
                out.extend(split_block(block, drop_solutions));
            }
            other => out.push(other.clone()),
        }
    }
    Cow::Owned(out)
}

fn needs_lift(node: &Node, drop_solutions: bool) -> bool {
    match node {
        Node::Block(block) if !node.is_code_cell() => block
            .children
            .iter()
            .any(|child| is_gated(child, drop_solutions)),
        _ => is_gated(node, drop_solutions),
    }
}

/// An exercise or (kept) solution with a code cell among its direct children
fn is_gated(node: &Node, drop_solutions: bool) -> bool {
    let children = match node {
        Node::Exercise(e) => &e.children,
        Node::Solution(s) if !drop_solutions => &s.children,
        _ => return false,
    };
    children.iter().any(Node::is_code_cell)
}

enum Piece {
    Run(Vec<Node>),
    Cell(Node),
}

/// Split a gated node's children into runs of prose separated by code cells.
///
/// The first piece is always the node itself holding the first run, so its
/// header is still generated.
fn pieces(node: &Node) -> Vec<Piece> {
    let children = node.children().map(Vec::as_slice).unwrap_or_default();

    let mut pieces = Vec::new();
    let mut run = Vec::new();
    let mut first = true;
    for child in children {
        if child.is_code_cell() {
            pieces.push(close_run(node, &mut run, &mut first));
            pieces.push(Piece::Cell(child.clone()));
        } else {
            run.push(child.clone());
        }
    }
    if first || !run.is_empty() {
        pieces.push(close_run(node, &mut run, &mut first));
    }
    pieces
}

fn close_run(node: &Node, run: &mut Vec<Node>, first: &mut bool) -> Piece {
    let run = std::mem::take(run);
    if std::mem::replace(first, false) {
        let mut wrapper = node.clone();
        if let Some(children) = wrapper.children_mut() {
            *children = run;
        }
        Piece::Run(vec![wrapper])
    } else {
        Piece::Run(run)
    }
}

/// Top-level gated node: later runs are emitted bare
fn split_gated(node: &Node) -> Vec<Node> {
    let mut out = Vec::new();
    for piece in pieces(node) {
        match piece {
            Piece::Run(nodes) => out.extend(nodes),
            Piece::Cell(cell) => out.push(cell),
        }
    }
    out
}

/// Block holding gated nodes: prose between code cells is re-wrapped in
/// copies of the block
fn split_block(block: &Block, drop_solutions: bool) -> Vec<Node> {
    let mut out = Vec::new();
    let mut pending = Vec::new();
    let mut emitted_blocks = 0;

    let mut flush = |pending: &mut Vec<Node>, out: &mut Vec<Node>| {
        if pending.is_empty() {
            return;
        }
        let mut copy = Block {
            kind: block.kind.clone(),
            data: block.data.clone(),
            children: std::mem::take(pending),
            ..Default::default()
        };
        if emitted_blocks == 0 {
            copy.identifier = block.identifier.clone();
            copy.label = block.label.clone();
        }
        emitted_blocks += 1;
        out.push(Node::Block(copy));
    };

    for child in &block.children {
        if !is_gated(child, drop_solutions) {
            pending.push(child.clone());
            continue;
        }
        for piece in pieces(child) {
            match piece {
                Piece::Run(nodes) => pending.extend(nodes),
                Piece::Cell(cell) => {
                    flush(&mut pending, &mut out);
                    out.push(cell);
                }
            }
        }
    }
    flush(&mut pending, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use myst_mdast::{Exercise, Solution};

    fn para(s: &str) -> Node {
        Node::paragraph(vec![Node::text(s)])
    }

    fn cell(code: &str) -> Node {
        Node::code_cell(Some("python".to_string()), code)
    }

    fn exercise(children: Vec<Node>) -> Node {
        Node::Exercise(Exercise {
            enumerator: Some("1".to_string()),
            children,
            ..Default::default()
        })
    }

    fn count_code_cells(nodes: &[Node]) -> usize {
        nodes.iter().filter(|n| n.is_code_cell()).count()
    }

    #[test]
    fn test_nothing_to_lift_is_borrowed() {
        let children = vec![para("a"), cell("x = 1"), exercise(vec![para("b")])];
        let lifted = lift_code_cells(&children, false);
        assert!(matches!(lifted, Cow::Borrowed(_)));
        assert_eq!(lifted.as_ref(), children.as_slice());
    }

    #[test]
    fn test_exercise_with_code_cell() {
        let children = vec![exercise(vec![para("p1"), cell("x = 1"), para("p2")])];
        let lifted = lift_code_cells(&children, false);

        assert!(matches!(lifted, Cow::Owned(_)));
        assert_eq!(
            lifted.as_ref(),
            [exercise(vec![para("p1")]), cell("x = 1"), para("p2")]
        );
    }

    #[test]
    fn test_multiple_runs_and_cells() {
        let children = vec![exercise(vec![
            Node::admonition_title(vec![Node::text("Loop")]),
            para("intro"),
            cell("a = 1"),
            para("middle"),
            para("more"),
            cell("b = 2"),
        ])];
        let lifted = lift_code_cells(&children, false);
        assert_eq!(
            lifted.as_ref(),
            [
                exercise(vec![
                    Node::admonition_title(vec![Node::text("Loop")]),
                    para("intro"),
                ]),
                cell("a = 1"),
                para("middle"),
                para("more"),
                cell("b = 2"),
            ]
        );
    }

    #[test]
    fn test_leading_code_cell_keeps_empty_wrapper() {
        let children = vec![exercise(vec![cell("x"), para("after")])];
        let lifted = lift_code_cells(&children, false);
        assert_eq!(
            lifted.as_ref(),
            [exercise(vec![]), cell("x"), para("after")]
        );
    }

    #[test]
    fn test_solution_lifted_unless_dropped() {
        let children = vec![Node::solution(vec![para("answer"), cell("print(4)")])];

        let lifted = lift_code_cells(&children, false);
        assert_eq!(
            lifted.as_ref(),
            [Node::solution(vec![para("answer")]), cell("print(4)")]
        );

        let kept = lift_code_cells(&children, true);
        assert!(matches!(kept, Cow::Borrowed(_)));
    }

    #[test]
    fn test_block_is_split_around_gated_content() {
        let mut data = serde_json::Map::new();
        data.insert("tags".to_string(), serde_json::json!(["exercise"]));
        let block = Node::Block(Block {
            data: Some(data.clone()),
            label: Some("ex-block".to_string()),
            identifier: Some("ex-block".to_string()),
            children: vec![
                para("before"),
                exercise(vec![para("task"), cell("x = 1"), para("hint")]),
                para("after"),
            ],
            ..Default::default()
        });

        let lifted = lift_code_cells(std::slice::from_ref(&block), false);
        assert_eq!(
            lifted.as_ref(),
            [
                Node::Block(Block {
                    data: Some(data.clone()),
                    label: Some("ex-block".to_string()),
                    identifier: Some("ex-block".to_string()),
                    children: vec![para("before"), exercise(vec![para("task")])],
                    ..Default::default()
                }),
                cell("x = 1"),
                Node::Block(Block {
                    data: Some(data),
                    children: vec![para("hint"), para("after")],
                    ..Default::default()
                }),
            ]
        );
    }

    #[test]
    fn test_block_with_exercise_and_solution() {
        let block = Node::block(vec![
            exercise(vec![para("task"), cell("a")]),
            Node::Solution(Solution {
                children: vec![para("answer"), cell("b")],
                ..Default::default()
            }),
        ]);

        let lifted = lift_code_cells(std::slice::from_ref(&block), false);
        assert_eq!(
            lifted.as_ref(),
            [
                Node::block(vec![exercise(vec![para("task")])]),
                cell("a"),
                Node::block(vec![Node::solution(vec![para("answer")])]),
                cell("b"),
            ]
        );
    }

    #[test]
    fn test_code_cell_count_is_preserved() {
        let children = vec![
            cell("top"),
            exercise(vec![cell("a"), para("x"), cell("b")]),
            Node::block(vec![exercise(vec![cell("c")]), para("y")]),
            Node::solution(vec![cell("d")]),
        ];
        let nested = 4;
        let lifted = lift_code_cells(&children, false);
        assert_eq!(count_code_cells(&lifted), 1 + nested);

        let lifted = lift_code_cells(&children, true);
        assert_eq!(count_code_cells(&lifted), 1 + 3);
    }
}
