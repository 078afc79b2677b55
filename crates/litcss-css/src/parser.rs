//! A recursive-descent parser for the statement-level CSS grammar.
//!
//! The parser is lossless: all trivia lands in node raws, and
//! `stringify(parse(s)?) == s` holds for every accepted input. It covers
//! rules (including nesting), declarations with `!important`, at-rules
//! with and without blocks, and comments. Selector and value
//! micro-grammars are not interpreted; their text is kept verbatim.
//!
//! Unlike postcss, declarations are accepted at the root level: embedded
//! stylesheet fragments are often bare declaration lists.

use crate::ast::{AtRule, Comment, Declaration, Node, Root, Rule};
use crate::error::{ParseError, Result};
use crate::position::{LineIndex, Position, Span};

/// Parse CSS text into a [`Root`].
///
/// # Errors
///
/// Returns a [`ParseError`] for unclosed blocks, comments or strings, for
/// a word that is neither a declaration nor a rule, and for a stray `}`.
pub fn parse(input: &str) -> Result<Root> {
    let mut cur = Cursor::new(input);
    let mut root = Root::default();
    root.raws.after = parse_nodes(&mut cur, &mut root.nodes, None)?;
    root.source = Some(Span {
        start: Position {
            offset: 0,
            line: 1,
            column: 1,
        },
        end: end_position(input),
    });
    Ok(root)
}

/// Position of the last character of `input` (inclusive-end convention).
fn end_position(input: &str) -> Position {
    match input.char_indices().next_back() {
        Some((offset, _)) => {
            let index = LineIndex::new(input);
            // offset of an existing char is always in bounds
            index.position(input, offset).unwrap_or(Position {
                offset,
                line: 1,
                column: 1,
            })
        }
        None => Position {
            offset: 0,
            line: 1,
            column: 1,
        },
    }
}

#[derive(Clone)]
struct Cursor<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Cursor {
            src,
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn at(&self, pat: &str) -> bool {
        self.src[self.pos..].starts_with(pat)
    }

    fn eof(&self) -> bool {
        self.pos >= self.src.len()
    }

    /// Position of the next (not yet consumed) character.
    fn position(&self) -> Position {
        Position {
            offset: self.pos,
            line: self.line,
            column: self.column,
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }
}

/// Parse children until `}` (inside a block) or end of input.
///
/// Returns the trailing trivia (the parent's `after` raw). The closing
/// `}` itself is left for the caller. `block_open` is the position of the
/// enclosing `{`, or `None` at the root.
fn parse_nodes(
    cur: &mut Cursor<'_>,
    nodes: &mut Vec<Node>,
    block_open: Option<Position>,
) -> Result<String> {
    let mut before = String::new();
    loop {
        while let Some(c) = cur.peek() {
            // stray semicolons are kept as trivia
            if c.is_whitespace() || c == ';' {
                before.push(c);
                cur.bump();
            } else {
                break;
            }
        }

        match cur.peek() {
            None => {
                return match block_open {
                    Some(open) => Err(ParseError::UnclosedBlock {
                        line: open.line,
                        column: open.column,
                    }),
                    None => Ok(before),
                };
            }
            Some('}') => {
                if block_open.is_some() {
                    return Ok(before);
                }
                let p = cur.position();
                return Err(ParseError::UnexpectedClose {
                    line: p.line,
                    column: p.column,
                });
            }
            Some(_) if cur.at("/*") => {
                let mut comment = parse_comment(cur)?;
                comment.raws.before = std::mem::take(&mut before);
                nodes.push(Node::Comment(comment));
            }
            Some('@') => {
                let mut at_rule = parse_at_rule(cur)?;
                at_rule.raws.before = std::mem::take(&mut before);
                nodes.push(Node::AtRule(at_rule));
            }
            Some(_) => {
                let (node, rest) = parse_rule_or_decl(cur, std::mem::take(&mut before))?;
                nodes.push(node);
                before = rest;
            }
        }
    }
}

fn parse_comment(cur: &mut Cursor<'_>) -> Result<Comment> {
    let start = cur.position();
    cur.bump();
    cur.bump();
    let inner_start = cur.pos;

    loop {
        if cur.eof() {
            return Err(ParseError::UnclosedComment {
                line: start.line,
                column: start.column,
            });
        }
        if cur.at("*/") {
            let inner = &cur.src[inner_start..cur.pos];
            cur.bump();
            let end = cur.position();
            cur.bump();

            let text_start = inner.len() - inner.trim_start().len();
            let text_end = inner.trim_end().len();
            let mut comment = if text_start >= text_end {
                let mut c = Comment::new("");
                c.raws.left = inner.to_string();
                c
            } else {
                let mut c = Comment::new(&inner[text_start..text_end]);
                c.raws.left = inner[..text_start].to_string();
                c.raws.right = inner[text_end..].to_string();
                c
            };
            comment.source = Some(Span { start, end });
            return Ok(comment);
        }
        cur.bump();
    }
}

fn parse_at_rule(cur: &mut Cursor<'_>) -> Result<AtRule> {
    let start = cur.position();
    cur.bump(); // '@'

    let mut name = String::new();
    while let Some(c) = cur.peek() {
        if c.is_alphanumeric() || c == '-' || c == '_' {
            name.push(c);
            cur.bump();
        } else {
            break;
        }
    }

    let mut after_name = String::new();
    while let Some(c) = cur.peek() {
        if c.is_whitespace() {
            after_name.push(c);
            cur.bump();
        } else {
            break;
        }
    }

    let scanned = scan_until(cur, &['{', ';', '}'])?;
    let raw = &cur.src[scanned.raw_start..scanned.raw_end];
    let params_end = raw.trim_end().len();

    let mut at_rule = AtRule::new(name, &raw[..params_end]);
    at_rule.raws.after_name = after_name;
    at_rule.raws.between = raw[params_end..].to_string();

    match scanned.stop {
        Some('{') => {
            let brace = cur.position();
            cur.bump();
            let mut children = Vec::new();
            at_rule.raws.after = parse_nodes(cur, &mut children, Some(brace))?;
            at_rule.nodes = Some(children);
            let end = cur.position();
            cur.bump(); // '}'
            at_rule.source = Some(Span { start, end });
        }
        Some(';') => {
            let end = cur.position();
            cur.bump();
            at_rule.raws.semicolon = true;
            at_rule.source = Some(Span { start, end });
        }
        _ => {
            at_rule.source = Some(Span {
                start,
                end: scanned.last_sig.unwrap_or(start),
            });
        }
    }
    Ok(at_rule)
}

/// Parse a rule or a declaration.
///
/// Also returns the trivia run that follows a declaration without a
/// trailing semicolon; that whitespace belongs to the enclosing block,
/// not to the declaration.
fn parse_rule_or_decl(cur: &mut Cursor<'_>, before: String) -> Result<(Node, String)> {
    let start = cur.position();
    let scanned = scan_until(cur, &['{', ';', '}'])?;
    let raw = &cur.src[scanned.raw_start..scanned.raw_end];

    if scanned.stop == Some('{') {
        let sel_end = raw.trim_end().len();
        if sel_end == 0 {
            return Err(ParseError::UnknownWord {
                line: start.line,
                column: start.column,
            });
        }
        let mut rule = Rule::new(&raw[..sel_end]);
        rule.raws.before = before;
        rule.raws.between = raw[sel_end..].to_string();

        let brace = cur.position();
        cur.bump();
        rule.raws.after = parse_nodes(cur, &mut rule.nodes, Some(brace))?;
        let end = cur.position();
        cur.bump(); // '}'
        rule.source = Some(Span { start, end });
        return Ok((Node::Rule(rule), String::new()));
    }

    // not a rule: must be a `prop: value` declaration
    let colon = find_colon(raw).ok_or(ParseError::UnknownWord {
        line: start.line,
        column: start.column,
    })?;
    let prop_part = &raw[..colon];
    let prop_end = prop_part.trim_end().len();
    if prop_end == 0 {
        return Err(ParseError::UnknownWord {
            line: start.line,
            column: start.column,
        });
    }

    let value_part = &raw[colon + 1..];
    let value_lead = value_part.len() - value_part.trim_start().len();
    let value_raw = &value_part[value_lead..];
    let value_end = value_raw.trim_end().len();
    let (value, important_raw) = split_important(&value_raw[..value_end]);

    let mut decl = Declaration::new(&prop_part[..prop_end], value);
    decl.raws.before = before;
    decl.raws.between = format!("{}:{}", &prop_part[prop_end..], &value_part[..value_lead]);
    if let Some(important) = important_raw {
        decl.important = true;
        decl.raws.important = important.to_string();
    }

    if scanned.stop == Some(';') {
        decl.raws.after_value = value_raw[value_end..].to_string();
        let end = cur.position();
        cur.bump();
        decl.raws.semicolon = true;
        decl.source = Some(Span { start, end });
        Ok((Node::Decl(decl), String::new()))
    } else {
        decl.source = Some(Span {
            start,
            end: scanned.last_sig.unwrap_or(start),
        });
        Ok((Node::Decl(decl), value_raw[value_end..].to_string()))
    }
}

/// Split a trimmed declaration value into (value, raw `!important` text).
fn split_important(value: &str) -> (&str, Option<&str>) {
    if let Some(bang) = value.rfind('!') {
        let tail = &value[bang + 1..];
        if tail.trim().eq_ignore_ascii_case("important") {
            let val_end = value[..bang].trim_end().len();
            return (&value[..val_end], Some(&value[val_end..]));
        }
    }
    (value, None)
}

/// Find the first `:` in `raw` outside strings, comments and parens.
fn find_colon(raw: &str) -> Option<usize> {
    let bytes = raw.as_bytes();
    let mut i = 0;
    let mut depth = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b':' if depth == 0 => return Some(i),
            b'(' => depth += 1,
            b')' => depth = depth.saturating_sub(1),
            b'\\' => i += 1,
            b'\'' | b'"' => {
                let quote = bytes[i];
                i += 1;
                while i < bytes.len() && bytes[i] != quote {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i += 2;
                while i < bytes.len() && !(bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/')) {
                    i += 1;
                }
                i += 1;
            }
            _ => {}
        }
        i += 1;
    }
    None
}

struct Scanned {
    raw_start: usize,
    raw_end: usize,
    /// Position of the last non-whitespace character consumed
    last_sig: Option<Position>,
    /// The stop character found (not consumed), or `None` at end of input
    stop: Option<char>,
}

/// Consume text until one of `stops` at paren depth 0, outside strings
/// and comments. The stop character itself is not consumed.
fn scan_until(cur: &mut Cursor<'_>, stops: &[char]) -> Result<Scanned> {
    let raw_start = cur.pos;
    let mut last_sig = None;
    let mut depth = 0usize;

    loop {
        let Some(c) = cur.peek() else {
            return Ok(Scanned {
                raw_start,
                raw_end: cur.pos,
                last_sig,
                stop: None,
            });
        };

        if depth == 0 && stops.contains(&c) {
            return Ok(Scanned {
                raw_start,
                raw_end: cur.pos,
                last_sig,
                stop: Some(c),
            });
        }

        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ => {}
        }

        if cur.at("/*") {
            let open = cur.position();
            cur.bump();
            last_sig = Some(cur.position());
            cur.bump();
            loop {
                if cur.eof() {
                    return Err(ParseError::UnclosedComment {
                        line: open.line,
                        column: open.column,
                    });
                }
                if cur.at("*/") {
                    cur.bump();
                    last_sig = Some(cur.position());
                    cur.bump();
                    break;
                }
                cur.bump();
            }
            continue;
        }

        if c == '\'' || c == '"' {
            let open = cur.position();
            cur.bump();
            loop {
                match cur.peek() {
                    None => {
                        return Err(ParseError::UnclosedString {
                            line: open.line,
                            column: open.column,
                        });
                    }
                    Some('\\') => {
                        cur.bump();
                        last_sig = Some(cur.position());
                        cur.bump();
                    }
                    Some(q) if q == c => {
                        last_sig = Some(cur.position());
                        cur.bump();
                        break;
                    }
                    Some(_) => {
                        last_sig = Some(cur.position());
                        cur.bump();
                    }
                }
            }
            continue;
        }

        if c == '\\' {
            cur.bump();
            if !cur.eof() {
                last_sig = Some(cur.position());
                cur.bump();
            }
            continue;
        }

        if !c.is_whitespace() {
            last_sig = Some(cur.position());
        }
        cur.bump();
    }
}
