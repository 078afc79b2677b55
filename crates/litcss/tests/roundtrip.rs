//! Reconstruction of untouched documents must reproduce the host text
//! byte for byte.

use litcss::{parse, stringify};
use litcss_css::Node;

fn assert_roundtrip(source: &str) {
    let doc = parse(source).unwrap();
    assert_eq!(stringify(&doc), source, "round trip failed for {source:?}");
}

#[test]
fn no_templates() {
    assert_roundtrip("");
    assert_roundtrip("const a = 1;\nfunction f() { return a; }\n");
    assert_roundtrip("const t = html`<p>${x}</p>`;");
}

#[test]
fn single_template() {
    assert_roundtrip("const styles = css`\n  .foo { color: hotpink; }\n`;");
}

#[test]
fn single_line_template() {
    assert_roundtrip("const styles = css`.foo { color: hotpink; }`;");
}

#[test]
fn multiple_templates() {
    assert_roundtrip(
        "const a = css`\n  .a { color: red; }\n`;\n\
         const between = 1;\n\
         const b = css`\n  .b { color: blue; }\n`;\n",
    );
}

#[test]
fn value_interpolation() {
    assert_roundtrip("const styles = css`\n  .foo { color: ${color}; }\n`;");
}

#[test]
fn many_interpolations() {
    assert_roundtrip(
        "css`\n  ${sel} {\n    ${prop}: red;\n    color: ${val};\n    ${decl}\n  }\n`;",
    );
}

#[test]
fn multi_line_interpolation() {
    assert_roundtrip("css`\n.a {\n  color: ${{\n    foo: 'bar'\n  }};\n}\n`;");
}

#[test]
fn indented_template() {
    assert_roundtrip("function styles() {\n  return css`\n    .foo {\n      color: red;\n    }\n  `;\n}\n");
}

#[test]
fn mixed_indentation() {
    // the closing line sets the base; the under-indented line is untouched
    assert_roundtrip("const styles = css`\n    .a {\n}\n  `;");
}

#[test]
fn tab_indentation() {
    assert_roundtrip("const styles = css`\n\t\t.a { color: red; }\n\t`;");
}

#[test]
fn content_on_the_opening_line() {
    assert_roundtrip("const styles = css`.a {\n  color: red;\n}`;");
}

#[test]
fn empty_and_blank_templates() {
    assert_roundtrip("const a = css``;");
    assert_roundtrip("const a = css`   `;");
    assert_roundtrip("const a = css`\n`;");
}

#[test]
fn backslash_escapes() {
    assert_roundtrip("css`.a { content: '\\\\2014'; }`;");
    assert_roundtrip("css`.a { content: '\\`'; }`;");
    assert_roundtrip("css`.a { content: '\\${not an expression}'; }`;");
}

#[test]
fn doubled_backslash_before_a_metacharacter_comes_back_single() {
    // the parse-time `\\` collapse is not re-applied before `$`; that
    // escape comes back in its single-backslash form
    let doc = parse("css`.a { content: '\\\\$x'; }`;").unwrap();
    assert_eq!(stringify(&doc), "css`.a { content: '\\$x'; }`;");
}

#[test]
fn suppressed_template_stays_verbatim() {
    let source = "\
// litcss-disable-next-line
const styles = css`not css at all`;
";
    let doc = parse(source).unwrap();
    assert!(doc.styles.is_empty());
    assert!(doc.skipped.is_empty());
    assert_eq!(stringify(&doc), source);
}

#[test]
fn suppression_covers_templates_in_multi_line_statements() {
    let source = "\
// litcss-disable-next-line
const config = {
  styles: css`not css at all`
};
";
    let doc = parse(source).unwrap();
    assert!(doc.styles.is_empty());
    assert!(doc.skipped.is_empty());
    assert_eq!(stringify(&doc), source);
}

#[test]
fn invalid_css_is_skipped_but_preserved() {
    let source = "const broken = css`.a { color: red;`;\nconst ok = css`.b { color: blue; }`;\n";
    let doc = parse(source).unwrap();
    assert_eq!(doc.styles.len(), 1);
    assert_eq!(doc.skipped.len(), 1);
    assert!(doc.skipped[0].reason.contains("unclosed block"));
    assert_eq!(stringify(&doc), source);
}

#[test]
fn node_spans_cover_host_text() {
    let source = "const styles = css`\n  .foo { color: ${color}; }\n`;";
    let doc = parse(source).unwrap();
    let root = &doc.styles[0].root;

    let Node::Rule(rule) = &root.nodes[0] else {
        panic!("expected rule");
    };
    let span = rule.source.unwrap();
    assert_eq!(
        &source[span.start.offset..=span.end.offset],
        ".foo { color: ${color}; }"
    );
    assert_eq!((span.start.line, span.start.column), (2, 3));

    let Node::Decl(decl) = &rule.nodes[0] else {
        panic!("expected decl");
    };
    let span = decl.source.unwrap();
    assert_eq!(
        &source[span.start.offset..=span.end.offset],
        "color: ${color};"
    );
}

#[test]
fn document_serializes_to_json() {
    let source = "const styles = css`\n  .foo { color: ${color}; }\n`;";
    let doc = parse(source).unwrap();
    let json = serde_json::to_string(&doc).unwrap();
    let back: litcss::Document = serde_json::from_str(&json).unwrap();
    assert_eq!(doc, back);
    assert_eq!(stringify(&back), source);
}
