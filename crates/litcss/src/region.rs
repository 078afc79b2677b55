//! Per-template extraction metadata and the position mapper.
//!
//! A [`Region`] records everything needed to translate positions between
//! the flattened CSS text a template produced and the host document it
//! came from: the anchor where content starts, the prefix skip for a
//! blank first line, the per-line indentation that was stripped, and the
//! placeholder slots standing in for `${...}` interpolations.

use litcss_css::Position;
use serde::{Deserialize, Serialize};

/// Syntactic classification of an interpolation's position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotKind {
    /// Declaration value, the default
    Value,
    /// Before a block, after another block
    Selector,
    /// Declaration property name
    Property,
    /// Between statements
    Statement,
    /// Right after a closed block
    Block,
    /// Inside a CSS comment
    Comment,
}

impl SlotKind {
    /// The placeholder text standing in for slot `index`, shaped to be
    /// legal CSS in this grammatical position.
    pub(crate) fn placeholder(self, index: usize) -> String {
        match self {
            SlotKind::Value | SlotKind::Selector | SlotKind::Comment => {
                format!("LITCSS_{index}")
            }
            SlotKind::Property => format!("--LITCSS_{index}"),
            SlotKind::Statement | SlotKind::Block => format!("/* LITCSS_{index} */"),
        }
    }
}

/// One `${...}` interpolation and its stand-in placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceholderSlot {
    pub index: usize,
    pub kind: SlotKind,
    /// The placeholder token as inserted into the flattened text
    pub placeholder: String,
    /// The interpolation's host text, `${` and `}` included
    pub expression: String,
    /// Host position of the `$`
    pub host_start: Position,
    /// Host position just past the closing `}` (exclusive)
    pub host_end: Position,
    /// Placeholder range in the de-indented text (end exclusive)
    pub flat_start: usize,
    pub flat_end: usize,
    /// 1-based de-indented line the placeholder sits on
    pub flat_line: usize,
    /// 1-based column just past the placeholder on that line
    pub flat_end_column: usize,
}

/// Characters dropped before the first content line.
///
/// Set when the template starts with a blank line: that line belongs to
/// the host-side `code_before` slice, not to the CSS text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixSkip {
    pub lines: usize,
    pub offset: usize,
}

/// Per-line record of the whitespace stripped during de-indentation.
///
/// Keyed by 1-based de-indented line number. A line has an entry only
/// when its leading whitespace was at least as wide as the region's base
/// indentation; the stored text is the exact prefix removed, so
/// tab-indented hosts reconstruct byte for byte.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndentationTable {
    entries: Vec<Option<String>>,
    /// cumulative[i] = bytes stripped from lines 1..=i
    cumulative: Vec<usize>,
}

impl IndentationTable {
    pub(crate) fn from_entries(entries: Vec<Option<String>>) -> Self {
        let mut cumulative = Vec::with_capacity(entries.len() + 1);
        let mut total = 0;
        cumulative.push(0);
        for entry in &entries {
            total += entry.as_ref().map_or(0, String::len);
            cumulative.push(total);
        }
        IndentationTable {
            entries,
            cumulative,
        }
    }

    /// The whitespace stripped from `line`, if any.
    pub fn stripped(&self, line: usize) -> Option<&str> {
        self.entries.get(line.wrapping_sub(1))?.as_deref()
    }

    /// Width in characters of the prefix stripped from `line`.
    pub fn width(&self, line: usize) -> usize {
        self.stripped(line).map_or(0, |s| s.chars().count())
    }

    /// Total bytes stripped from lines 1 through `line` inclusive.
    pub fn bytes_through(&self, line: usize) -> usize {
        self.cumulative[line.min(self.cumulative.len() - 1)]
    }

    /// The sentinel entry for "indentation after the last line".
    pub fn trailing(&self) -> Option<&str> {
        self.entries.last()?.as_deref()
    }
}

/// Extraction metadata for one embedded template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    /// First content character, right after the opening backtick
    pub anchor: Position,
    /// Host offset of the closing backtick
    pub end_offset: usize,
    /// Character column the content block is indented to (the closing
    /// backtick's column), used verbatim for freshly authored lines
    pub base_indent: usize,
    pub prefix: PrefixSkip,
    pub indentation: IndentationTable,
    pub slots: Vec<PlaceholderSlot>,
    /// Host text from the previous region's end (or document start) to
    /// this region's content, prefix skip included
    pub code_before: String,
    /// Verbatim template content after the prefix skip, the fallback
    /// when the parsed tree has no nodes
    pub content: String,
    /// The de-indented flattened CSS text handed to the parser
    pub flat: String,
}

impl Region {
    /// Map a position in the de-indented CSS text to host coordinates.
    ///
    /// Total: any in-range position produces a host position. Positions
    /// inside a placeholder map into its interpolation's host text, with
    /// the placeholder's last character landing on the interpolation's
    /// last character so inclusive spans cover the whole `${...}`.
    pub fn map(&self, pos: Position) -> Position {
        for slot in &self.slots {
            if pos.offset >= slot.flat_start && pos.offset < slot.flat_end {
                if pos.offset + 1 == slot.flat_end {
                    return Position {
                        offset: slot.host_end.offset - 1,
                        line: slot.host_end.line,
                        column: slot.host_end.column.saturating_sub(1),
                    };
                }
                let delta = (pos.offset - slot.flat_start)
                    .min(slot.expression.len().saturating_sub(1));
                return Position {
                    offset: slot.host_start.offset + delta,
                    line: slot.host_start.line,
                    column: slot.host_start.column + delta,
                };
            }
        }

        let mut line = pos.line + self.anchor.line - 1 + self.prefix.lines;
        let mut offset = (pos.offset
            + self.anchor.offset
            + self.prefix.offset
            + self.indentation.bytes_through(pos.line)) as isize;
        let mut column = pos.column + self.indentation.width(pos.line);
        if pos.line == 1 && self.prefix.lines == 0 {
            column += self.anchor.column - 1;
        }

        let mut last_on_line: Option<&PlaceholderSlot> = None;
        for slot in &self.slots {
            if slot.flat_end > pos.offset {
                break;
            }
            offset += slot.expression.len() as isize - slot.placeholder.len() as isize;
            line += slot.host_end.line - slot.host_start.line;
            if slot.flat_line == pos.line {
                last_on_line = Some(slot);
            }
        }
        // a placeholder earlier on this line breaks simple column
        // arithmetic; re-anchor on the interpolation's host end column
        if let Some(slot) = last_on_line {
            column = slot.host_end.column + (pos.column - slot.flat_end_column);
        }

        Position {
            offset: offset as usize,
            line,
            column,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract;
    use crate::options::Options;
    use crate::scanner::scan;

    fn region_for(source: &str) -> Region {
        let candidates = scan(source, &Options::default()).unwrap();
        extract(source, &candidates[0])
    }

    #[test]
    fn maps_simple_multi_line_template() {
        let source = "const styles = css`\n  .foo { color: hotpink; }\n`;";
        let region = region_for(source);
        assert_eq!(region.prefix, PrefixSkip { lines: 1, offset: 1 });
        assert_eq!(region.flat, "  .foo { color: hotpink; }\n");

        // 'c' of color: flat offset 9, line 1, column 10
        let mapped = region.map(Position {
            offset: 9,
            line: 1,
            column: 10,
        });
        assert_eq!(mapped, Position {
            offset: 29,
            line: 2,
            column: 10,
        });
        assert_eq!(&source[mapped.offset..mapped.offset + 5], "color");
    }

    #[test]
    fn maps_through_stripped_indentation() {
        let source = "const x = css`\n    .foo {\n      color: red;\n    }\n  `;";
        let region = region_for(source);
        assert_eq!(region.base_indent, 2);
        assert_eq!(region.flat, "  .foo {\n    color: red;\n  }\n");
        assert_eq!(region.indentation.stripped(2), Some("  "));
        assert_eq!(region.indentation.trailing(), Some("  "));

        // 'c' of color: flat offset 13, line 2, column 5
        let mapped = region.map(Position {
            offset: 13,
            line: 2,
            column: 5,
        });
        assert_eq!(mapped, Position {
            offset: 32,
            line: 3,
            column: 7,
        });
        assert_eq!(&source[mapped.offset..mapped.offset + 5], "color");
    }

    #[test]
    fn maps_first_line_content_relative_to_anchor() {
        let source = "css`.a { color: red; }`;";
        let region = region_for(source);
        assert_eq!(region.prefix, PrefixSkip::default());

        let mapped = region.map(Position {
            offset: 0,
            line: 1,
            column: 1,
        });
        assert_eq!(mapped, Position {
            offset: 4,
            line: 1,
            column: 5,
        });
    }

    #[test]
    fn maps_across_a_placeholder() {
        let source = "css`.a { color: ${color}; }`;";
        let region = region_for(source);
        assert_eq!(region.flat, ".a { color: LITCSS_0; }");

        // the ';' after the placeholder: flat offset 20, line 1, column 21
        let mapped = region.map(Position {
            offset: 20,
            line: 1,
            column: 21,
        });
        assert_eq!(&source[mapped.offset..=mapped.offset], ";");
        assert_eq!(mapped, Position {
            offset: 24,
            line: 1,
            column: 25,
        });
    }

    #[test]
    fn placeholder_interior_maps_into_interpolation() {
        let source = "css`.a { color: ${color}; }`;";
        let region = region_for(source);
        let slot = &region.slots[0];

        let start = region.map(Position {
            offset: slot.flat_start,
            line: 1,
            column: 13,
        });
        let end = region.map(Position {
            offset: slot.flat_end - 1,
            line: 1,
            column: 20,
        });
        assert_eq!(&source[start.offset..=end.offset], "${color}");
    }

    #[test]
    fn maps_across_multi_line_interpolation() {
        let source = "css`\n.a {\n  color: ${{\n    foo: 'bar'\n  }};\n}\n`;";
        let region = region_for(source);
        let slot = &region.slots[0];
        assert_eq!(slot.host_start.line, 3);
        assert_eq!(slot.host_end.line, 5);

        // the ';' after the placeholder, on flat line 2
        let flat_semi = region.flat.find(';').unwrap();
        let mapped = region.map(Position {
            offset: flat_semi,
            line: 2,
            column: 18,
        });
        assert_eq!(&source[mapped.offset..=mapped.offset], ";");
        assert_eq!(mapped.line, 5);
        assert_eq!(mapped.column, slot.host_end.column);
    }

    #[test]
    fn serializes_to_json() {
        let region = region_for("css`.a { color: ${color}; }`;");
        let json = serde_json::to_string(&region).unwrap();
        let back: Region = serde_json::from_str(&json).unwrap();
        assert_eq!(region, back);
    }
}
