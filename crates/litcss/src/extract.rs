//! Flattening a template candidate into parseable CSS text.
//!
//! Literal chunks are concatenated with a placeholder standing in for
//! each interpolation; the placeholder's shape is chosen by scanning the
//! surrounding text for its grammatical position. The flattened text is
//! then de-indented against the template's base indentation, recording
//! what was removed so reconstruction can put it back.

use crate::region::{IndentationTable, PlaceholderSlot, PrefixSkip, Region, SlotKind};
use crate::scanner::TemplateCandidate;
use litcss_css::Position;

pub(crate) fn extract(source: &str, candidate: &TemplateCandidate) -> Region {
    let mut style = String::new();
    let mut line = 1usize;
    let mut column = 1usize;
    let mut raw_slots = Vec::with_capacity(candidate.interpolations.len());

    for (i, &(chunk_start, chunk_end)) in candidate.chunks.iter().enumerate() {
        push_tracked(
            &mut style,
            &mut line,
            &mut column,
            &unescape(&source[chunk_start..chunk_end]),
        );

        if let Some(&(host_start, host_end)) = candidate.interpolations.get(i) {
            let next_chunk = candidate
                .chunks
                .get(i + 1)
                .map_or("", |&(s, e)| &source[s..e]);
            let kind = classify(&style, next_chunk);
            let placeholder = kind.placeholder(i);

            let style_start = style.len();
            let style_line = line;
            push_tracked(&mut style, &mut line, &mut column, &placeholder);
            raw_slots.push(RawSlot {
                index: i,
                kind,
                placeholder,
                expression: source[host_start.offset..host_end.offset].to_string(),
                host_start,
                host_end,
                style_start,
                style_end: style.len(),
                style_line,
                style_end_column: column,
            });
        }
    }

    let mut lines: Vec<&str> = style.split('\n').collect();
    let mut prefix = PrefixSkip::default();
    if lines.len() > 1
        && lines[0].chars().all(|c| matches!(c, ' ' | '\t' | '\r'))
    {
        prefix.lines = 1;
        prefix.offset = lines[0].len() + 1;
        lines.remove(0);
    }

    let base_indent = candidate.close.column - 1;
    let mut entries = Vec::with_capacity(lines.len());
    let mut flat = String::new();
    for (i, text) in lines.iter().enumerate() {
        if i > 0 {
            flat.push('\n');
        }
        match strip_point(text, base_indent) {
            Some(cut) => {
                entries.push(Some(text[..cut].to_string()));
                flat.push_str(&text[cut..]);
            }
            None => {
                entries.push(None);
                flat.push_str(text);
            }
        }
    }
    let indentation = IndentationTable::from_entries(entries);

    let slots = raw_slots
        .into_iter()
        .map(|slot| {
            let flat_line = slot.style_line - prefix.lines;
            let removed = prefix.offset + indentation.bytes_through(flat_line);
            PlaceholderSlot {
                index: slot.index,
                kind: slot.kind,
                placeholder: slot.placeholder,
                expression: slot.expression,
                host_start: slot.host_start,
                host_end: slot.host_end,
                flat_start: slot.style_start - removed,
                flat_end: slot.style_end - removed,
                flat_line,
                flat_end_column: slot.style_end_column - indentation.width(flat_line),
            }
        })
        .collect();

    let content_start = candidate.anchor.offset + prefix.offset;
    Region {
        anchor: candidate.anchor,
        end_offset: candidate.close.offset,
        base_indent,
        prefix,
        indentation,
        slots,
        code_before: String::new(),
        content: source[content_start..candidate.close.offset].to_string(),
        flat,
    }
}

struct RawSlot {
    index: usize,
    kind: SlotKind,
    placeholder: String,
    expression: String,
    host_start: Position,
    host_end: Position,
    style_start: usize,
    style_end: usize,
    style_line: usize,
    style_end_column: usize,
}

/// Collapse the template escape for a backslash.
fn unescape(chunk: &str) -> String {
    chunk.replace("\\\\", "\\")
}

fn push_tracked(text: &mut String, line: &mut usize, column: &mut usize, s: &str) {
    for c in s.chars() {
        if c == '\n' {
            *line += 1;
            *column = 1;
        } else {
            *column += 1;
        }
    }
    text.push_str(s);
}

/// Byte index after `width` characters of indentation, if the line
/// starts with at least that much.
fn strip_point(line: &str, width: usize) -> Option<usize> {
    if width == 0 {
        return None;
    }
    let mut count = 0;
    for (idx, c) in line.char_indices() {
        if count == width {
            return Some(idx);
        }
        if c == ' ' || c == '\t' {
            count += 1;
        } else {
            return None;
        }
    }
    (count == width).then_some(line.len())
}

/// Classify an interpolation by the text around its insertion point.
///
/// Scans `prefix` backward for the nearest of `{`, `}`, `;`, `:` or a
/// comment delimiter (skipping over complete comments), then refines the
/// provisional answer by the first significant character of `suffix`.
/// Best effort: nearby punctuation is a heuristic, not a grammar.
fn classify(prefix: &str, suffix: &str) -> SlotKind {
    let mut after: Option<char> = None;
    let mut in_comment = false;
    let mut kind = SlotKind::Value;
    for c in prefix.chars().rev() {
        if in_comment {
            if c == '/' && after == Some('*') {
                in_comment = false;
            }
            after = Some(c);
            continue;
        }
        if c == '/' && after == Some('*') {
            kind = SlotKind::Comment;
            break;
        }
        if c == '*' && after == Some('/') {
            in_comment = true;
            after = Some(c);
            continue;
        }
        match c {
            ';' | '{' => {
                kind = SlotKind::Statement;
                break;
            }
            ':' => {
                kind = SlotKind::Value;
                break;
            }
            '}' => {
                kind = SlotKind::Block;
                break;
            }
            _ => {}
        }
        after = Some(c);
    }

    let next = suffix.chars().find(|c| !c.is_whitespace());
    match (kind, next) {
        (SlotKind::Block, Some('{')) => SlotKind::Selector,
        (SlotKind::Statement, Some(':')) => SlotKind::Property,
        (kind, _) => kind,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Options;
    use crate::scanner::scan;

    fn extract_first(source: &str) -> Region {
        let candidates = scan(source, &Options::default()).unwrap();
        extract(source, &candidates[0])
    }

    #[test]
    fn value_interpolation_gets_bare_placeholder() {
        let region = extract_first("css`.a { color: ${color}; }`;");
        assert_eq!(region.slots[0].kind, SlotKind::Value);
        assert_eq!(region.flat, ".a { color: LITCSS_0; }");
        assert_eq!(region.slots[0].flat_start, 12);
        assert_eq!(region.slots[0].flat_end, 20);
        assert_eq!(region.slots[0].expression, "${color}");
    }

    #[test]
    fn property_interpolation_gets_custom_property_placeholder() {
        let region = extract_first("css`.a { ${prop}: red; }`;");
        assert_eq!(region.slots[0].kind, SlotKind::Property);
        assert_eq!(region.flat, ".a { --LITCSS_0: red; }");
    }

    #[test]
    fn selector_interpolation_gets_bare_placeholder() {
        let region = extract_first("css`.a {} ${sel} { color: red; }`;");
        assert_eq!(region.slots[0].kind, SlotKind::Selector);
        assert_eq!(region.flat, ".a {} LITCSS_0 { color: red; }");
    }

    #[test]
    fn statement_interpolation_gets_comment_placeholder() {
        let region = extract_first("css`.a { color: red; ${decl} }`;");
        assert_eq!(region.slots[0].kind, SlotKind::Statement);
        assert_eq!(region.flat, ".a { color: red; /* LITCSS_0 */ }");
    }

    #[test]
    fn block_interpolation_gets_comment_placeholder() {
        let region = extract_first("css`.a {} ${rule} .b {}`;");
        assert_eq!(region.slots[0].kind, SlotKind::Block);
        assert_eq!(region.flat, ".a {} /* LITCSS_0 */ .b {}");
    }

    #[test]
    fn comment_interpolation_gets_bare_placeholder() {
        let region = extract_first("css`/* hi ${name} */ .a {}`;");
        assert_eq!(region.slots[0].kind, SlotKind::Comment);
        assert_eq!(region.flat, "/* hi LITCSS_0 */ .a {}");
    }

    #[test]
    fn a_complete_comment_is_skipped_when_scanning_backward() {
        // the ';' behind the comment decides, not the comment itself
        let region = extract_first("css`.a { color: red; /* x */ ${decl} }`;");
        assert_eq!(region.slots[0].kind, SlotKind::Statement);
    }

    #[test]
    fn leading_interpolation_defaults_to_value() {
        let region = extract_first("css`${x}`;");
        assert_eq!(region.slots[0].kind, SlotKind::Value);
        assert_eq!(region.flat, "LITCSS_0");
    }

    #[test]
    fn multiple_interpolations_index_in_order() {
        let region = extract_first("css`.a { color: ${a}; background: ${b}; }`;");
        assert_eq!(region.flat, ".a { color: LITCSS_0; background: LITCSS_1; }");
        assert_eq!(region.slots[1].index, 1);
    }

    #[test]
    fn blank_first_line_becomes_prefix_skip() {
        let region = extract_first("css`\n.a { color: red; }\n`;");
        assert_eq!(region.prefix, PrefixSkip { lines: 1, offset: 1 });
        assert_eq!(region.flat, ".a { color: red; }\n");
    }

    #[test]
    fn deindents_against_the_closing_backtick_column() {
        let region = extract_first("const a = css`\n  .a {\n    color: red;\n  }\n`;");
        // closing backtick at column 1: nothing to strip
        assert_eq!(region.base_indent, 0);
        assert_eq!(region.flat, "  .a {\n    color: red;\n  }\n");

        let region = extract_first("const a = css`\n    .a {\n      color: red;\n    }\n  `;");
        assert_eq!(region.base_indent, 2);
        assert_eq!(region.flat, "  .a {\n    color: red;\n  }\n");
        assert_eq!(region.indentation.stripped(1), Some("  "));
    }

    #[test]
    fn shorter_indented_lines_are_left_alone() {
        let region = extract_first("const a = css`\n    .a {\n}\n  `;");
        assert_eq!(region.flat, "  .a {\n}\n");
        assert_eq!(region.indentation.stripped(1), Some("  "));
        assert_eq!(region.indentation.stripped(2), None);
    }

    #[test]
    fn tab_indentation_is_preserved_byte_exact() {
        let region = extract_first("const a = css`\n\t\t.a { color: red; }\n  `;");
        assert_eq!(region.indentation.stripped(1), Some("\t\t"));
        assert_eq!(region.flat, ".a { color: red; }\n");
    }

    #[test]
    fn unescapes_doubled_backslashes() {
        let region = extract_first("css`.a { content: '\\\\2014'; }`;");
        assert_eq!(region.flat, ".a { content: '\\2014'; }");
    }

    #[test]
    fn content_holds_the_verbatim_template_text() {
        let region = extract_first("css`\n  .a {}\n`;");
        assert_eq!(region.content, "  .a {}\n");
    }
}
