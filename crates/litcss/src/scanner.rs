//! Lexical scan of a JS/TS host document for tagged template literals.
//!
//! This is the host-language collaborator: it does not build a JS syntax
//! tree, it only tracks enough lexical structure (comments, strings,
//! template nesting, brace depth inside interpolations, statement starts)
//! to delimit every tagged template whose tag is a selected bare
//! identifier. Member-expression tags like `theme.css` are never
//! selected, and a selected template found inside another selected
//! template's interpolation is left opaque. Regex literals are not
//! modeled; a `/` that begins one is treated as an ordinary token.

use crate::error::ScanError;
use crate::options::Options;
use litcss_css::Position;
use std::collections::HashMap;

/// One tagged template literal found in the host source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TemplateCandidate {
    pub tag: String,
    /// Whether a disable comment precedes the enclosing statement
    pub suppressed: bool,
    /// First content character, right after the opening backtick
    pub anchor: Position,
    /// The closing backtick
    pub close: Position,
    /// Byte ranges of the literal chunks between interpolations
    pub chunks: Vec<(usize, usize)>,
    /// Host spans of `${...}` texts; start is the `$`, end is exclusive
    pub interpolations: Vec<(Position, Position)>,
}

pub(crate) fn scan(
    source: &str,
    options: &Options,
) -> std::result::Result<Vec<TemplateCandidate>, ScanError> {
    let mut scanner = Scanner::new(source, options);
    scanner.scan_js(None, true)?;
    Ok(scanner.candidates)
}

#[derive(Debug, Clone)]
struct Ident {
    name: String,
    /// Preceded by `.`, making it a member access
    dotted: bool,
}

struct Scanner<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
    column: usize,
    options: &'a Options,
    candidates: Vec<TemplateCandidate>,
    /// Comment-only lines; the value records a disable marker on the line
    comment_lines: HashMap<usize, bool>,
    line_has_code: bool,
    /// Line of the first significant token of the current statement
    stmt_line: usize,
    stmt_pending: bool,
    last_ident: Option<Ident>,
    prev_dot: bool,
    /// Last significant character, for object-literal detection at `{`
    prev_sig: Option<char>,
    /// Open braces; `true` marks an object literal, whose contents stay
    /// part of the enclosing statement
    braces: Vec<bool>,
}

impl<'a> Scanner<'a> {
    fn new(src: &'a str, options: &'a Options) -> Self {
        Scanner {
            src,
            pos: 0,
            line: 1,
            column: 1,
            options,
            candidates: Vec::new(),
            comment_lines: HashMap::new(),
            line_has_code: false,
            stmt_line: 1,
            stmt_pending: true,
            last_ident: None,
            prev_dot: false,
            prev_sig: None,
            braces: Vec::new(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn at(&self, pat: &str) -> bool {
        self.src[self.pos..].starts_with(pat)
    }

    fn position(&self) -> Position {
        Position {
            offset: self.pos,
            line: self.line,
            column: self.column,
        }
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
            if c == '\n' {
                self.line += 1;
                self.column = 1;
                self.line_has_code = false;
            } else {
                self.column += 1;
            }
        }
    }

    fn mark_significant(&mut self) {
        if self.stmt_pending {
            self.stmt_line = self.line;
            self.stmt_pending = false;
        }
        self.line_has_code = true;
    }

    /// Scan JS tokens. With `in_interpolation`, stop after the `}` that
    /// closes the interpolation opened at that position; without it, run
    /// to end of input. `collect` controls whether selected templates
    /// become candidates.
    fn scan_js(
        &mut self,
        in_interpolation: Option<Position>,
        collect: bool,
    ) -> std::result::Result<(), ScanError> {
        let mut depth = 0usize;
        loop {
            let Some(c) = self.peek() else {
                return match in_interpolation {
                    Some(open) => Err(ScanError::UnterminatedInterpolation {
                        line: open.line,
                        column: open.column,
                    }),
                    None => Ok(()),
                };
            };
            match c {
                '/' if self.at("//") => self.line_comment(),
                '/' if self.at("/*") => self.block_comment(),
                '\'' | '"' => self.string_literal(c),
                '`' => self.template(collect)?,
                '}' if in_interpolation.is_some() && depth == 0 => {
                    self.bump();
                    return Ok(());
                }
                '.' => {
                    self.mark_significant();
                    self.prev_dot = true;
                    self.last_ident = None;
                    self.prev_sig = Some('.');
                    self.bump();
                }
                c if c.is_whitespace() => self.bump(),
                c if c == '_' || c == '$' || c.is_alphabetic() => self.identifier(),
                c => {
                    let object_literal = c == '{' && self.opens_object_literal();
                    self.mark_significant();
                    self.last_ident = None;
                    self.prev_dot = false;
                    match c {
                        '{' => {
                            depth += 1;
                            self.braces.push(object_literal);
                            if !object_literal {
                                self.stmt_pending = true;
                            }
                        }
                        '}' => {
                            depth = depth.saturating_sub(1);
                            if !self.braces.pop().unwrap_or(false) {
                                self.stmt_pending = true;
                            }
                        }
                        ';' => self.stmt_pending = true,
                        _ => {}
                    }
                    self.prev_sig = Some(c);
                    self.bump();
                }
            }
        }
    }

    /// Whether a `{` at the cursor starts an object literal rather than
    /// a block. Lexical approximation: after `return` or after an
    /// operator, a comma or an opening bracket the brace is in value
    /// position; `=>` ends in `>`, which keeps arrow bodies blocks.
    fn opens_object_literal(&self) -> bool {
        if let Some(ident) = &self.last_ident {
            return ident.name == "return";
        }
        matches!(
            self.prev_sig,
            Some('=' | '(' | ',' | '[' | ':' | '?' | '&' | '|' | '+' | '-' | '*' | '/' | '%' | '~' | '^' | '<')
        )
    }

    fn identifier(&mut self) {
        self.mark_significant();
        let dotted = self.prev_dot;
        self.prev_dot = false;
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c == '_' || c == '$' || c.is_alphanumeric()) {
            self.bump();
        }
        self.last_ident = Some(Ident {
            name: self.src[start..self.pos].to_string(),
            dotted,
        });
    }

    fn line_comment(&mut self) {
        let comment_only = !self.line_has_code;
        let line = self.line;
        self.bump();
        self.bump();
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c != '\n') {
            self.bump();
        }
        if comment_only {
            let marker = self.src[start..self.pos].contains(&self.options.disable_marker);
            let entry = self.comment_lines.entry(line).or_insert(false);
            *entry = *entry || marker;
        }
    }

    fn block_comment(&mut self) {
        let comment_only = !self.line_has_code;
        let first = self.line;
        self.bump();
        self.bump();
        loop {
            if self.pos >= self.src.len() {
                break;
            }
            if self.at("*/") {
                self.bump();
                self.bump();
                break;
            }
            self.bump();
        }
        // markers only count in line comments, but the covered lines must
        // stay walkable when looking upward from a statement
        if comment_only {
            for line in first..=self.line {
                self.comment_lines.entry(line).or_insert(false);
            }
        }
    }

    fn string_literal(&mut self, quote: char) {
        self.mark_significant();
        self.last_ident = None;
        self.prev_dot = false;
        self.prev_sig = Some(quote);
        self.bump();
        while let Some(c) = self.peek() {
            match c {
                '\\' => {
                    self.bump();
                    self.bump();
                }
                '\n' => break,
                c if c == quote => {
                    self.bump();
                    break;
                }
                _ => self.bump(),
            }
        }
    }

    fn template(&mut self, collect: bool) -> std::result::Result<(), ScanError> {
        self.mark_significant();
        let tag = self.last_ident.take();
        self.prev_dot = false;
        self.prev_sig = Some('`');
        let open = self.position();
        let selected = collect
            && matches!(&tag, Some(t) if !t.dotted && self.options.is_tag(&t.name));
        let suppressed = selected && self.is_suppressed();
        self.bump(); // '`'
        let anchor = self.position();

        let mut chunks: Vec<(usize, usize)> = Vec::new();
        let mut interpolations = Vec::new();
        let mut chunk_start = self.pos;

        loop {
            let Some(c) = self.peek() else {
                return if selected {
                    Err(ScanError::UnterminatedTemplate {
                        line: open.line,
                        column: open.column,
                    })
                } else {
                    Ok(())
                };
            };
            match c {
                '\\' => {
                    self.bump();
                    self.bump();
                }
                '`' => {
                    let close = self.position();
                    chunks.push((chunk_start, self.pos));
                    self.bump();
                    if selected {
                        let tag = tag.map(|t| t.name).unwrap_or_default();
                        self.candidates.push(TemplateCandidate {
                            tag,
                            suppressed,
                            anchor,
                            close,
                            chunks,
                            interpolations,
                        });
                    }
                    return Ok(());
                }
                '$' if self.at("${") => {
                    let interp_start = self.position();
                    chunks.push((chunk_start, self.pos));
                    self.bump();
                    self.bump();
                    // selected templates inside our own interpolation stay
                    // opaque; inside an unselected template they are fair game
                    self.scan_js(Some(interp_start), collect && !selected)?;
                    interpolations.push((interp_start, self.position()));
                    chunk_start = self.pos;
                }
                _ => self.bump(),
            }
        }
    }

    /// Walk the comment lines immediately above the current statement.
    fn is_suppressed(&self) -> bool {
        let mut line = self.stmt_line;
        while line > 1 {
            line -= 1;
            match self.comment_lines.get(&line) {
                Some(true) => return true,
                Some(false) => {}
                None => return false,
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_default(source: &str) -> Vec<TemplateCandidate> {
        scan(source, &Options::default()).unwrap()
    }

    #[test]
    fn finds_tagged_template() {
        let source = "const styles = css`.foo { color: red; }`;";
        let found = scan_default(source);
        assert_eq!(found.len(), 1);
        let c = &found[0];
        assert_eq!(c.tag, "css");
        assert!(!c.suppressed);
        assert_eq!(c.anchor.offset, 19);
        assert_eq!((c.anchor.line, c.anchor.column), (1, 20));
        assert_eq!(&source[c.chunks[0].0..c.chunks[0].1], ".foo { color: red; }");
        assert_eq!(c.close.offset, 39);
    }

    #[test]
    fn records_interpolation_spans() {
        let source = "css`.foo { color: ${color}; }`;";
        let found = scan_default(source);
        assert_eq!(found[0].chunks.len(), 2);
        let (start, end) = found[0].interpolations[0];
        assert_eq!(&source[start.offset..end.offset], "${color}");
    }

    #[test]
    fn ignores_untagged_and_other_tags() {
        let found = scan_default("const a = `plain`; const b = html`<p></p>`;");
        assert!(found.is_empty());
    }

    #[test]
    fn ignores_member_expression_tags() {
        let found = scan_default("const styles = theme.css`.foo {}`;");
        assert!(found.is_empty());
    }

    #[test]
    fn ignores_templates_inside_strings_and_comments() {
        let found = scan_default("const s = 'css`.a {}`'; // css`.b {}`\n/* css`.c {}` */");
        assert!(found.is_empty());
    }

    #[test]
    fn finds_selected_template_inside_unselected_one() {
        let found = scan_default("const page = html`<style>${css`.a { color: red; }`}</style>`;");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].tag, "css");
    }

    #[test]
    fn nested_selected_templates_stay_opaque() {
        let found = scan_default("css`.a { ${css`.b {}`} }`;");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].interpolations.len(), 1);
    }

    #[test]
    fn disable_comment_suppresses_next_statement() {
        let source = "\
// litcss-disable-next-line
const styles = css`.foo {}`;
const more = css`.bar {}`;
";
        let found = scan_default(source);
        assert_eq!(found.len(), 2);
        assert!(found[0].suppressed);
        assert!(!found[1].suppressed);
    }

    #[test]
    fn disable_comment_covers_multi_line_statements() {
        let source = "\
// litcss-disable-next-line
const config = {
  styles: css`.foo {}`
};
";
        let found = scan_default(source);
        assert!(found[0].suppressed);
    }

    #[test]
    fn disable_comment_does_not_reach_into_block_bodies() {
        let source = "\
// litcss-disable-next-line
function f() {
  return css`.foo {}`;
}
";
        let found = scan_default(source);
        assert_eq!(found.len(), 1);
        assert!(!found[0].suppressed);
    }

    #[test]
    fn disable_comment_covers_returned_object_literals() {
        let source = "\
function f() {
  // litcss-disable-next-line
  return { styles: css`.foo {}` };
}
";
        let found = scan_default(source);
        assert!(found[0].suppressed);
    }

    #[test]
    fn unrelated_comment_does_not_suppress() {
        let source = "// some note\nconst styles = css`.foo {}`;";
        let found = scan_default(source);
        assert!(!found[0].suppressed);
    }

    #[test]
    fn unterminated_selected_template_is_an_error() {
        assert!(matches!(
            scan("const styles = css`.foo {", &Options::default()),
            Err(ScanError::UnterminatedTemplate { line: 1, column: 19 })
        ));
    }

    #[test]
    fn unterminated_interpolation_is_an_error() {
        assert!(matches!(
            scan("css`.foo { color: ${oops", &Options::default()),
            Err(ScanError::UnterminatedInterpolation { .. })
        ));
    }

    #[test]
    fn escaped_backtick_does_not_close_template() {
        let source = "css`.foo { content: '\\`'; }`;";
        let found = scan_default(source);
        assert_eq!(found.len(), 1);
        let c = &found[0];
        assert_eq!(&source[c.chunks[0].0..c.chunks[0].1], ".foo { content: '\\`'; }");
    }

    #[test]
    fn custom_tags() {
        let options = Options {
            tags: vec!["styled".to_string()],
            ..Options::default()
        };
        let found = scan("styled`.a {}`; css`.b {}`;", &options).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].tag, "styled");
    }
}
