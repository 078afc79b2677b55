//! Engine configuration.

use serde::{Deserialize, Serialize};

/// Options controlling which templates are extracted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Template tags whose contents are treated as CSS. A tag matches
    /// only as a bare identifier, not as a member access like `x.css`.
    pub tags: Vec<String>,
    /// Marker that, found in a line comment immediately above the
    /// enclosing statement, excludes the next template from extraction.
    pub disable_marker: String,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            tags: vec!["css".to_string()],
            disable_marker: "litcss-disable-next-line".to_string(),
        }
    }
}

impl Options {
    pub(crate) fn is_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|t| t == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = Options::default();
        assert!(options.is_tag("css"));
        assert!(!options.is_tag("html"));
        assert_eq!(options.disable_marker, "litcss-disable-next-line");
    }

    #[test]
    fn deserializes_with_defaults() {
        let options: Options = serde_json::from_str("{}").unwrap();
        assert_eq!(options, Options::default());

        let options: Options = serde_json::from_str(r#"{"tags": ["styled"]}"#).unwrap();
        assert!(options.is_tag("styled"));
        assert!(!options.is_tag("css"));
    }
}
