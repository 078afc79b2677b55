//! Serializing a document back into host text.
//!
//! Reconstruction never fails. Each region's writer tracks the current
//! de-indented line so it can re-insert the exact whitespace stripped
//! during extraction, resynchronizing from the cached line spans nodes
//! carry; fragments whose text was reassigned fall back to the region's
//! base indentation. Placeholder tokens in unmutated text are replaced
//! by their interpolation's host text, and everything else is escaped so
//! it stays legal inside a template literal.

use crate::document::Document;
use crate::region::{PlaceholderSlot, Region, SlotKind};
use litcss_css::{AtRule, Comment, Declaration, Node, Root, Rule};
use memchr::memchr_iter;
use once_cell::sync::Lazy;
use regex::Regex;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:--)?LITCSS_(\d+)").unwrap());
static COMMENT_PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^LITCSS_(\d+)$").unwrap());

/// Serialize `doc` back to host source text.
///
/// Reconstruction of an untouched document returns the text it was
/// parsed from, byte for byte.
pub fn stringify(doc: &Document) -> String {
    let mut out = String::new();
    for style in &doc.styles {
        out.push_str(&style.region.code_before);
        if style.root.nodes.is_empty() {
            out.push_str(&style.region.content);
        } else {
            RegionWriter {
                region: &style.region,
                out: &mut out,
                line: Some(1),
            }
            .write_root(&style.root);
        }
    }
    out.push_str(&doc.trailing);
    out
}

struct RegionWriter<'a> {
    region: &'a Region,
    out: &'a mut String,
    /// Current de-indented line, `None` after mutated multi-line text
    /// until the next resync
    line: Option<usize>,
}

impl RegionWriter<'_> {
    fn write_root(&mut self, root: &Root) {
        self.indent(1);
        for node in &root.nodes {
            self.write_node(node);
        }
        if !root.raws.after.is_empty() {
            if let Some((_, end)) = root.raws.lines {
                let mut start = end.saturating_sub(count_newlines(&root.raws.after));
                // a trailing newline terminates the end line itself
                if root.raws.after.ends_with('\n') {
                    start += 1;
                }
                self.line = Some(start);
            }
            self.write_text(&root.raws.after);
        }
    }

    fn write_node(&mut self, node: &Node) {
        match node {
            Node::Rule(rule) => self.write_rule(rule),
            Node::Decl(decl) => self.write_decl(decl),
            Node::AtRule(at_rule) => self.write_at_rule(at_rule),
            Node::Comment(comment) => self.write_comment(comment),
        }
    }

    fn write_rule(&mut self, rule: &Rule) {
        self.resync_start(rule.raws.lines, &rule.raws.before);
        self.write_text(&rule.raws.before);
        if rule.selector_dirty() {
            self.write_literal(rule.selector(), true);
        } else {
            self.write_text(rule.selector());
        }
        self.write_text(&rule.raws.between);
        self.out.push('{');
        for child in &rule.nodes {
            self.write_node(child);
        }
        // the cached end line is the closing brace; skip when a dirty
        // selector has refreshed it away from the parsed text
        if !rule.selector_dirty() {
            self.resync_end(rule.raws.lines, &rule.raws.after);
        }
        self.write_text(&rule.raws.after);
        self.out.push('}');
    }

    fn write_decl(&mut self, decl: &Declaration) {
        self.resync_start(decl.raws.lines, &decl.raws.before);
        self.write_text(&decl.raws.before);
        self.write_text(&decl.prop);
        self.write_text(&decl.raws.between);
        if decl.value_dirty() {
            self.write_literal(decl.value(), true);
        } else {
            self.write_text(decl.value());
        }
        if decl.important {
            if decl.raws.important.is_empty() {
                self.out.push_str(" !important");
            } else {
                self.write_text(&decl.raws.important);
            }
        }
        self.write_text(&decl.raws.after_value);
        if decl.raws.semicolon {
            self.out.push(';');
        }
    }

    fn write_at_rule(&mut self, at_rule: &AtRule) {
        self.resync_start(at_rule.raws.lines, &at_rule.raws.before);
        self.write_text(&at_rule.raws.before);
        self.out.push('@');
        self.write_text(&at_rule.name);
        self.write_text(&at_rule.raws.after_name);
        if at_rule.params_dirty() {
            self.write_literal(at_rule.params(), true);
        } else {
            self.write_text(at_rule.params());
        }
        self.write_text(&at_rule.raws.between);
        if let Some(children) = &at_rule.nodes {
            self.out.push('{');
            for child in children {
                self.write_node(child);
            }
            if !at_rule.params_dirty() {
                self.resync_end(at_rule.raws.lines, &at_rule.raws.after);
            }
            self.write_text(&at_rule.raws.after);
            self.out.push('}');
        } else if at_rule.raws.semicolon {
            self.out.push(';');
        }
    }

    fn write_comment(&mut self, comment: &Comment) {
        self.resync_start(comment.raws.lines, &comment.raws.before);
        self.write_text(&comment.raws.before);
        // a synthetic comment standing in for a whole interpolation is
        // replaced wholesale, delimiters included
        if let Some(slot) = wholesale_slot(self.region, comment) {
            self.out.push_str(&slot.expression);
            return;
        }
        self.out.push_str("/*");
        self.write_text(&comment.raws.left);
        self.write_text(&comment.text);
        self.write_text(&comment.raws.right);
        self.out.push_str("*/");
    }

    fn resync_start(&mut self, lines: Option<(usize, usize)>, before: &str) {
        if let Some((start, _)) = lines {
            self.line = Some(start.saturating_sub(count_newlines(before)));
        }
    }

    fn resync_end(&mut self, lines: Option<(usize, usize)>, after: &str) {
        if let Some((_, end)) = lines {
            self.line = Some(end.saturating_sub(count_newlines(after)));
        }
    }

    /// Emit unmutated text: placeholders substituted, the rest escaped
    /// and line-counted.
    fn write_text(&mut self, text: &str) {
        let region = self.region;
        let mut last = 0;
        for m in PLACEHOLDER.find_iter(text) {
            let token = m.as_str();
            let digits = token.trim_start_matches("--").trim_start_matches("LITCSS_");
            let Ok(index) = digits.parse::<usize>() else {
                continue;
            };
            // only substitute the exact token this slot produced
            let Some(slot) = region.slots.get(index) else {
                continue;
            };
            if slot.placeholder != token {
                continue;
            }
            self.write_literal(&text[last..m.start()], false);
            self.out.push_str(&slot.expression);
            last = m.end();
        }
        self.write_literal(&text[last..], false);
    }

    /// Emit literal CSS text, escaped for the template context. Mutated
    /// text indents interior lines with the base indentation; unmutated
    /// text re-inserts each following line's recorded stripped prefix.
    fn write_literal(&mut self, text: &str, mutated: bool) {
        let region = self.region;
        let mut chars = text.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '\\' => {
                    if matches!(chars.peek(), Some('`' | '$')) {
                        self.out.push('\\');
                        if let Some(escaped) = chars.next() {
                            self.out.push(escaped);
                        }
                    } else {
                        self.out.push_str("\\\\");
                    }
                }
                '`' => self.out.push_str("\\`"),
                '$' if chars.peek() == Some(&'{') => {
                    chars.next();
                    self.out.push_str("\\${");
                }
                '\n' => {
                    self.out.push('\n');
                    if mutated {
                        self.push_base_indent();
                        self.line = None;
                    } else {
                        match self.line {
                            Some(current) => {
                                let next = current + 1;
                                self.line = Some(next);
                                if let Some(prefix) = region.indentation.stripped(next) {
                                    self.out.push_str(prefix);
                                }
                            }
                            None => self.push_base_indent(),
                        }
                    }
                }
                c => self.out.push(c),
            }
        }
    }

    fn indent(&mut self, line: usize) {
        let region = self.region;
        if let Some(prefix) = region.indentation.stripped(line) {
            self.out.push_str(prefix);
        }
    }

    fn push_base_indent(&mut self) {
        for _ in 0..self.region.base_indent {
            self.out.push(' ');
        }
    }
}

fn count_newlines(text: &str) -> usize {
    memchr_iter(b'\n', text.as_bytes()).count()
}

fn wholesale_slot<'r>(region: &'r Region, comment: &Comment) -> Option<&'r PlaceholderSlot> {
    let caps = COMMENT_PLACEHOLDER.captures(&comment.text)?;
    let index: usize = caps[1].parse().ok()?;
    let slot = region.slots.get(index)?;
    matches!(slot.kind, SlotKind::Statement | SlotKind::Block).then_some(slot)
}
