//! The parsed host document.

use crate::region::Region;
use litcss_css::Root;
use serde::{Deserialize, Serialize};

/// One extracted template: its parsed CSS tree plus the extraction
/// metadata the tree's spans and reconstruction depend on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedStyle {
    pub root: Root,
    pub region: Region,
}

/// A template whose CSS failed to parse and was left as plain host text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedTemplate {
    /// Host line of the template's content start
    pub line: usize,
    /// Host column of the template's content start
    pub column: usize,
    pub reason: String,
}

/// All embedded styles found in one host source text, in source order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub styles: Vec<EmbeddedStyle>,
    /// Host text after the last extracted region (the whole source when
    /// there are none)
    pub trailing: String,
    pub skipped: Vec<SkippedTemplate>,
}
