//! CSS-in-JS extraction with bidirectional position mapping.
//!
//! `litcss` locates CSS embedded in tagged template literals inside a
//! JS/TS source text, parses each template with [`litcss_css`], rewrites
//! every node's span into host-file coordinates, and can losslessly
//! reconstruct the host text from the (possibly mutated) trees:
//! `stringify(&parse(source)?) == source` whenever nothing was changed
//! in between.
//!
//! Interpolations (`${...}`) are replaced during parsing by placeholder
//! tokens shaped to be legal CSS for their position, and restored
//! verbatim on reconstruction. Indentation shared by the template block
//! is stripped before parsing and re-applied afterwards. Templates whose
//! contents are not valid CSS are skipped with a warning and kept as
//! plain text.
//!
//! ```
//! use litcss::{parse, stringify};
//! use litcss_css::Node;
//!
//! let source = "const styles = css`\n  .foo { color: ${color}; }\n`;";
//! let doc = parse(source)?;
//!
//! let root = &doc.styles[0].root;
//! let Node::Rule(rule) = &root.nodes[0] else { unreachable!() };
//! assert_eq!(rule.selector(), ".foo");
//! assert_eq!(rule.source.unwrap().start.line, 2);
//!
//! assert_eq!(stringify(&doc), source);
//! # Ok::<(), litcss::Error>(())
//! ```

mod annotate;
pub mod document;
pub mod error;
mod extract;
pub mod options;
pub mod reconstruct;
pub mod region;
mod scanner;

pub use document::{Document, EmbeddedStyle, SkippedTemplate};
pub use error::{Error, Result, ScanError};
pub use options::Options;
pub use reconstruct::stringify;
pub use region::{IndentationTable, PlaceholderSlot, PrefixSkip, Region, SlotKind};

use tracing::warn;

/// Parse embedded CSS out of `source` with default [`Options`].
pub fn parse(source: &str) -> Result<Document> {
    parse_with(source, &Options::default())
}

/// Parse embedded CSS out of `source`.
///
/// Fails only when the host scan cannot delimit a selected template;
/// templates containing invalid CSS are skipped, recorded on the
/// returned document, and reported through `tracing`.
pub fn parse_with(source: &str, options: &Options) -> Result<Document> {
    let candidates = scanner::scan(source, options)?;

    let mut doc = Document::default();
    let mut cursor = 0usize;
    for candidate in &candidates {
        if candidate.suppressed {
            continue;
        }
        let mut region = extract::extract(source, candidate);
        match litcss_css::parse(&region.flat) {
            Ok(mut root) => {
                let content_start = candidate.anchor.offset + region.prefix.offset;
                region.code_before = source[cursor..content_start].to_string();
                annotate::annotate(&mut root, &region);
                doc.styles.push(EmbeddedStyle { root, region });
                cursor = candidate.close.offset;
            }
            Err(err) => {
                warn!(
                    line = candidate.anchor.line,
                    column = candidate.anchor.column,
                    error = %err,
                    "skipping template with invalid css"
                );
                doc.skipped.push(SkippedTemplate {
                    line: candidate.anchor.line,
                    column: candidate.anchor.column,
                    reason: err.to_string(),
                });
            }
        }
    }
    doc.trailing = source[cursor..].to_string();
    Ok(doc)
}
