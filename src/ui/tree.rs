//! ui::tree
//!
//! Indented text rendering of resolved trees.
//!
//! Each node is one line: path, kind, and name, followed by its effective
//! value when it has one and a `(hidden)` marker when it is not visible.
//! Edges cut by cycle detection are listed under their parent as
//! `<path> (cycle)`.

use std::fmt::Write;

use crate::core::resolve::{ResolvedNode, ResolvedTemplate};

const INDENT: &str = "  ";

/// Render a single resolved subtree.
pub fn format_node(node: &ResolvedNode) -> String {
    let mut out = String::new();
    write_node(&mut out, node, 0);
    out
}

/// Render a resolved template: a header line, then each option root.
pub fn format_template(template: &ResolvedTemplate) -> String {
    let mut out = format!("{} {}\n", template.path, template.name);
    for child in &template.children {
        write_node(&mut out, child, 1);
    }
    out
}

fn write_node(out: &mut String, node: &ResolvedNode, depth: usize) {
    let indent = INDENT.repeat(depth);
    // Writing to a String cannot fail.
    let _ = write!(out, "{}{} [{}] {}", indent, node.path, node.kind, node.name);
    if let Some(value) = &node.value {
        let _ = write!(out, " = {}", value);
    }
    if !node.visible {
        out.push_str(" (hidden)");
    }
    out.push('\n');

    for child in &node.children {
        write_node(out, child, depth + 1);
    }
    for cut in &node.cut_edges {
        let _ = writeln!(out, "{}{}{} (cycle)", indent, INDENT, cut);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::Catalog;
    use crate::core::resolve::{resolve, resolve_template};

    const CATALOG: &str = r#"{
        "templates": [{ "modelicaPath": "tpl", "name": "Template", "options": ["a"] }],
        "options": [
            { "modelicaPath": "a", "name": "A", "type": "dropdown", "options": ["b"],
              "modifiers": { "b": { "value": 3 } } },
            { "modelicaPath": "b", "name": "B", "type": "dropdown", "options": ["a"], "visible": false }
        ]
    }"#;

    #[test]
    fn renders_values_hidden_and_cycles() {
        let catalog = Catalog::load(CATALOG).unwrap();
        let tree = resolve("a", &catalog).unwrap();

        assert_eq!(
            format_node(&tree),
            "a [dropdown] A\n  b [dropdown] B = 3 (hidden)\n    a (cycle)\n"
        );
    }

    #[test]
    fn template_header_then_roots() {
        let catalog = Catalog::load(CATALOG).unwrap();
        let tree = resolve_template("tpl", &catalog).unwrap();
        let text = format_template(&tree);

        assert!(text.starts_with("tpl Template\n  a [dropdown] A\n"));
        assert_eq!(text.lines().count(), 4);
    }
}
