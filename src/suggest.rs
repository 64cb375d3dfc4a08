//! Completion suggestions and the merge algorithm.
//!
//! A [`Suggestion`] proposes replacing a range of the input with new text.
//! Individual nodes produce [`Suggestions`] sets over differing ranges; the
//! engine merges them by expanding every entry to one enclosing range and
//! sorting case-insensitively.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::context::{CommandContext, StringRange};
use crate::diagnostics::CommandError;

/// A proposed completion: replace `range` of the input with `text`.
///
/// Integer-valued suggestions additionally carry a numeric sort key; two of
/// them compare numerically, while any other pairing falls back to
/// case-insensitive text order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Suggestion {
    range: StringRange,
    text: String,
    tooltip: Option<String>,
    sort_value: Option<i32>,
}

impl Suggestion {
    pub fn new(range: StringRange, text: impl Into<String>) -> Self {
        Self {
            range,
            text: text.into(),
            tooltip: None,
            sort_value: None,
        }
    }

    pub fn with_tooltip(range: StringRange, text: impl Into<String>, tooltip: impl Into<String>) -> Self {
        Self {
            range,
            text: text.into(),
            tooltip: Some(tooltip.into()),
            sort_value: None,
        }
    }

    /// An integer suggestion; the text is the decimal rendering.
    pub fn integer(range: StringRange, value: i32) -> Self {
        Self {
            range,
            text: value.to_string(),
            tooltip: None,
            sort_value: Some(value),
        }
    }

    pub fn integer_with_tooltip(range: StringRange, value: i32, tooltip: impl Into<String>) -> Self {
        Self {
            range,
            text: value.to_string(),
            tooltip: Some(tooltip.into()),
            sort_value: Some(value),
        }
    }

    pub fn range(&self) -> StringRange {
        self.range
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tooltip(&self) -> Option<&str> {
        self.tooltip.as_deref()
    }

    /// The numeric sort key, when this is an integer suggestion.
    pub fn sort_value(&self) -> Option<i32> {
        self.sort_value
    }

    /// Splices this suggestion into `input`.
    pub fn apply(&self, input: &str) -> String {
        if self.range.start == 0 && self.range.end == input.len() {
            return self.text.clone();
        }
        let mut result = String::new();
        result.push_str(&input[..self.range.start]);
        result.push_str(&self.text);
        if self.range.end < input.len() {
            result.push_str(&input[self.range.end..]);
        }
        result
    }

    /// Widens this suggestion to `range`, pulling the surrounding characters
    /// of `command` into the text.
    pub fn expand(&self, command: &str, range: StringRange) -> Suggestion {
        if range == self.range {
            return self.clone();
        }
        let mut text = String::new();
        if range.start < self.range.start {
            text.push_str(&command[range.start..self.range.start]);
        }
        text.push_str(&self.text);
        if range.end > self.range.end {
            text.push_str(&command[self.range.end..range.end]);
        }
        Suggestion {
            range,
            text,
            tooltip: self.tooltip.clone(),
            sort_value: self.sort_value,
        }
    }

    /// Numeric order between two integer suggestions, text order otherwise.
    pub fn compare(&self, other: &Suggestion) -> Ordering {
        match (self.sort_value, other.sort_value) {
            (Some(a), Some(b)) => a.cmp(&b),
            _ => self.compare_ignore_case(other),
        }
    }

    pub fn compare_ignore_case(&self, other: &Suggestion) -> Ordering {
        self.text.to_lowercase().cmp(&other.text.to_lowercase())
    }
}

/// A merged, sorted set of suggestions over one range of the input.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Suggestions {
    range: StringRange,
    list: Vec<Suggestion>,
}

impl Suggestions {
    pub fn new(range: StringRange, list: Vec<Suggestion>) -> Self {
        Self { range, list }
    }

    pub fn range(&self) -> StringRange {
        self.range
    }

    pub fn list(&self) -> &[Suggestion] {
        &self.list
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// The canonical empty set: range `[0, 0)`, no suggestions.
    pub fn empty() -> Suggestions {
        Suggestions {
            range: StringRange::at(0),
            list: Vec::new(),
        }
    }

    /// Merges several suggestion sets produced against the same `command`.
    pub fn merge(command: &str, input: Vec<Suggestions>) -> Suggestions {
        let mut all = Vec::new();
        for set in input {
            all.extend(set.list);
        }
        Self::create(command, all)
    }

    /// Builds a merged set: deduplicate, compute the enclosing range, expand
    /// every suggestion to it, then sort case-insensitively by text.
    pub fn create(command: &str, suggestions: Vec<Suggestion>) -> Suggestions {
        if suggestions.is_empty() {
            return Suggestions::empty();
        }

        let mut seen = HashSet::new();
        let mut unique = Vec::new();
        for suggestion in suggestions {
            if seen.insert(suggestion.clone()) {
                unique.push(suggestion);
            }
        }

        let start = unique.iter().map(|s| s.range.start).min().unwrap_or(0);
        let end = unique.iter().map(|s| s.range.end).max().unwrap_or(0);
        let range = StringRange::between(start, end);

        let mut expanded: Vec<Suggestion> =
            unique.iter().map(|s| s.expand(command, range)).collect();
        expanded.sort_by(|a, b| a.compare_ignore_case(b));

        Suggestions {
            range,
            list: expanded,
        }
    }
}

/// Collects suggestions while tracking the portion of the input they
/// complete.
#[derive(Debug, Clone)]
pub struct SuggestionsBuilder {
    input: Arc<str>,
    input_lowercase: Arc<str>,
    start: usize,
    result: Vec<Suggestion>,
}

impl SuggestionsBuilder {
    pub fn new(input: impl Into<Arc<str>>, start: usize) -> Self {
        let input = input.into();
        let input_lowercase = Arc::from(input.to_lowercase().as_str());
        Self::with_lowercase(input, input_lowercase, start)
    }

    /// Variant for callers that already hold a lowercased copy.
    pub fn with_lowercase(input: Arc<str>, input_lowercase: Arc<str>, start: usize) -> Self {
        Self {
            input,
            input_lowercase,
            start,
            result: Vec::new(),
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn start(&self) -> usize {
        self.start
    }

    /// The input from the start position to the cursor.
    pub fn remaining(&self) -> &str {
        &self.input[self.start..]
    }

    pub fn remaining_lowercase(&self) -> &str {
        &self.input_lowercase[self.start..]
    }

    /// Proposes `text` for the remaining input. A suggestion identical to
    /// what is already typed is dropped.
    pub fn suggest(&mut self, text: impl Into<String>) -> &mut Self {
        let text = text.into();
        if text != self.remaining() {
            self.result
                .push(Suggestion::new(self.suggested_range(), text));
        }
        self
    }

    pub fn suggest_with_tooltip(
        &mut self,
        text: impl Into<String>,
        tooltip: impl Into<String>,
    ) -> &mut Self {
        let text = text.into();
        if text != self.remaining() {
            self.result
                .push(Suggestion::with_tooltip(self.suggested_range(), text, tooltip));
        }
        self
    }

    pub fn suggest_integer(&mut self, value: i32) -> &mut Self {
        self.result
            .push(Suggestion::integer(self.suggested_range(), value));
        self
    }

    pub fn suggest_integer_with_tooltip(
        &mut self,
        value: i32,
        tooltip: impl Into<String>,
    ) -> &mut Self {
        self.result.push(Suggestion::integer_with_tooltip(
            self.suggested_range(),
            value,
            tooltip,
        ));
        self
    }

    /// Absorbs everything collected by another builder.
    pub fn add(&mut self, other: &SuggestionsBuilder) -> &mut Self {
        self.result.extend(other.result.iter().cloned());
        self
    }

    /// A fresh builder over the same input, anchored at `start`.
    pub fn create_offset(&self, start: usize) -> SuggestionsBuilder {
        SuggestionsBuilder::with_lowercase(
            Arc::clone(&self.input),
            Arc::clone(&self.input_lowercase),
            start,
        )
    }

    /// A fresh builder with the same anchor and no collected suggestions.
    pub fn restart(&self) -> SuggestionsBuilder {
        self.create_offset(self.start)
    }

    pub fn build(&self) -> Suggestions {
        Suggestions::create(&self.input, self.result.clone())
    }

    fn suggested_range(&self) -> StringRange {
        StringRange::between(self.start, self.input.len())
    }
}

/// Custom completion source attached to an argument node.
#[async_trait]
pub trait SuggestionProvider<S>: Send + Sync {
    async fn suggestions(
        &self,
        context: &CommandContext<S>,
        builder: SuggestionsBuilder,
    ) -> Result<Suggestions, CommandError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_replaces_the_range() {
        let suggestion = Suggestion::new(StringRange::between(0, 3), "bar");
        assert_eq!(suggestion.apply("foo baz"), "bar baz");
    }

    #[test]
    fn expand_pulls_in_surrounding_text() {
        let suggestion = Suggestion::new(StringRange::between(4, 7), "qux");
        let expanded = suggestion.expand("foo bar", StringRange::between(0, 7));
        assert_eq!(expanded.text(), "foo qux");
        assert_eq!(expanded.range(), StringRange::between(0, 7));
    }

    #[test]
    fn integer_suggestions_compare_numerically() {
        let a = Suggestion::integer(StringRange::at(0), 2);
        let b = Suggestion::integer(StringRange::at(0), 10);
        assert_eq!(a.compare(&b), Ordering::Less);
        // As text, "10" would sort before "2".
        assert_eq!(a.compare_ignore_case(&b), Ordering::Greater);
    }

    #[test]
    fn builder_drops_suggestion_equal_to_remaining() {
        let mut builder = SuggestionsBuilder::new("foo", 0);
        builder.suggest("foo");
        assert!(builder.build().is_empty());
    }
}
