//! Serialize a node tree back to CSS text.
//!
//! Every byte of the output comes from a node field or a raw, so an
//! unchanged tree stringifies to exactly the text it was parsed from.

use crate::ast::{AtRule, Comment, Declaration, Node, Root, Rule};

/// Serialize `root` to CSS text.
pub fn stringify(root: &Root) -> String {
    let mut out = String::new();
    for node in &root.nodes {
        write_node(&mut out, node);
    }
    out.push_str(&root.raws.after);
    out
}

pub(crate) fn write_node(out: &mut String, node: &Node) {
    match node {
        Node::Rule(rule) => write_rule(out, rule),
        Node::Decl(decl) => write_decl(out, decl),
        Node::AtRule(at_rule) => write_at_rule(out, at_rule),
        Node::Comment(comment) => write_comment(out, comment),
    }
}

fn write_rule(out: &mut String, rule: &Rule) {
    out.push_str(&rule.raws.before);
    out.push_str(rule.selector());
    out.push_str(&rule.raws.between);
    out.push('{');
    for child in &rule.nodes {
        write_node(out, child);
    }
    out.push_str(&rule.raws.after);
    out.push('}');
}

fn write_decl(out: &mut String, decl: &Declaration) {
    out.push_str(&decl.raws.before);
    out.push_str(&decl.prop);
    out.push_str(&decl.raws.between);
    out.push_str(decl.value());
    if decl.important {
        if decl.raws.important.is_empty() {
            out.push_str(" !important");
        } else {
            out.push_str(&decl.raws.important);
        }
    }
    out.push_str(&decl.raws.after_value);
    if decl.raws.semicolon {
        out.push(';');
    }
}

fn write_at_rule(out: &mut String, at_rule: &AtRule) {
    out.push_str(&at_rule.raws.before);
    out.push('@');
    out.push_str(&at_rule.name);
    out.push_str(&at_rule.raws.after_name);
    out.push_str(at_rule.params());
    out.push_str(&at_rule.raws.between);
    if let Some(children) = &at_rule.nodes {
        out.push('{');
        for child in children {
            write_node(out, child);
        }
        out.push_str(&at_rule.raws.after);
        out.push('}');
    } else if at_rule.raws.semicolon {
        out.push(';');
    }
}

fn write_comment(out: &mut String, comment: &Comment) {
    out.push_str(&comment.raws.before);
    out.push_str("/*");
    out.push_str(&comment.raws.left);
    out.push_str(&comment.text);
    out.push_str(&comment.raws.right);
    out.push_str("*/");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn mutated_value_replaces_only_the_value() {
        let mut root = parse(".a {\n  color: red;\n}\n").unwrap();
        let Node::Rule(rule) = &mut root.nodes[0] else {
            panic!("expected rule");
        };
        let Node::Decl(decl) = &mut rule.nodes[0] else {
            panic!("expected decl");
        };
        decl.set_value("lime");
        assert_eq!(stringify(&root), ".a {\n  color: lime;\n}\n");
    }

    #[test]
    fn mutated_selector_keeps_trivia() {
        let mut root = parse("  .a  { color: red; }").unwrap();
        let Node::Rule(rule) = &mut root.nodes[0] else {
            panic!("expected rule");
        };
        rule.set_selector(".b:hover");
        assert_eq!(stringify(&root), "  .b:hover  { color: red; }");
    }

    #[test]
    fn important_without_raw_uses_canonical_form() {
        let mut decl = Declaration::new("color", "red");
        decl.important = true;
        decl.raws.between = ": ".to_string();
        let mut out = String::new();
        write_decl(&mut out, &decl);
        assert_eq!(out, "color: red !important");
    }
}
