//! Student query: thesis title plus optional project types

/// Title length accepted by the user-facing surfaces; the engine itself
/// accepts any length
pub const MAX_TITLE_CHARS: usize = 300;

/// A single recommendation request
///
/// Tags keep the order in which they were selected, so the composed text
/// (and therefore the embedding) is reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    raw_text: String,
    selected_tags: Vec<String>,
}

impl Query {
    pub fn new(raw_text: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
            selected_tags: Vec::new(),
        }
    }

    /// Add project types in selection order
    ///
    /// Tags are trimmed; blanks and repeats are dropped.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for tag in tags {
            self.push_tag(tag.as_ref());
        }
        self
    }

    fn push_tag(&mut self, tag: &str) {
        let tag = tag.trim();
        if tag.is_empty() || self.selected_tags.iter().any(|t| t == tag) {
            return;
        }
        self.selected_tags.push(tag.to_string());
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn tags(&self) -> &[String] {
        &self.selected_tags
    }

    /// True when there is nothing to embed
    pub fn is_empty(&self) -> bool {
        self.raw_text.trim().is_empty() && self.selected_tags.is_empty()
    }

    /// Text handed to the embedder
    ///
    /// `"<title> (<tag>, <tag>)"`, or just the trimmed title without tags.
    pub fn composed_text(&self) -> String {
        let mut text = self.raw_text.trim().to_string();
        if !self.selected_tags.is_empty() {
            text.push_str(" (");
            text.push_str(&self.selected_tags.join(", "));
            text.push(')');
        }
        text
    }
}
