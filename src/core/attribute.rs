//! Dotted, case-insensitive attribute storage for courses (C1).

use std::collections::BTreeSet;

/// Segments that impose no constraint when they appear in a template atom.
fn is_absent_segment(segment: &str) -> bool {
    matches!(segment.to_ascii_lowercase().as_str(), "na" | "any" | "-1")
}

/// A dotted attribute path, stored case-folded, e.g. `concentration.ai`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeSet {
    attrs: BTreeSet<String>,
}

impl AttributeSet {
    /// Creates an empty attribute set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn normalize(attr: &str) -> String {
        attr.to_ascii_lowercase()
    }

    fn segments(attr: &str) -> Vec<String> {
        attr.split('.').map(str::to_string).collect()
    }

    /// Inserts the attribute, storing the case-folded full string.
    pub fn add(&mut self, attr: &str) {
        self.attrs.insert(Self::normalize(attr));
    }

    /// Deletes every attribute whose segment sequence begins with `head`'s segments.
    pub fn remove_by_head(&mut self, head: &str) {
        let head_segments = Self::segments(&Self::normalize(head));
        self.attrs.retain(|attr| {
            let segments = Self::segments(attr);
            !Self::starts_with(&segments, &head_segments)
        });
    }

    /// Exact match (case-insensitive).
    #[must_use]
    pub fn has(&self, attr: &str) -> bool {
        self.attrs.contains(&Self::normalize(attr))
    }

    /// Whether any attribute extends the given prefix (presence test).
    #[must_use]
    pub fn has_head(&self, head: &str) -> bool {
        !self.get_by_head(head).is_empty()
    }

    /// List of attributes starting with `head`, in sorted order.
    #[must_use]
    pub fn get_by_head(&self, head: &str) -> Vec<String> {
        let head_segments = Self::segments(&Self::normalize(head));
        self.attrs
            .iter()
            .filter(|attr| Self::starts_with(&Self::segments(attr), &head_segments))
            .cloned()
            .collect()
    }

    /// The set of distinct segments immediately following `head` across all matching attributes.
    #[must_use]
    pub fn next(&self, head: &str) -> BTreeSet<String> {
        let head_segments = Self::segments(&Self::normalize(head));
        let mut result = BTreeSet::new();
        for attr in &self.attrs {
            let segments = Self::segments(attr);
            if Self::starts_with(&segments, &head_segments) && segments.len() > head_segments.len()
            {
                result.insert(segments[head_segments.len()].clone());
            }
        }
        result
    }

    /// Replace `attr` (or just add, if `before_wildcard(attr) + "." + value`): `remove(attr); add(before_wildcard(attr) + "." + v)`.
    pub fn replace_wildcard(&mut self, attr: &str, value: &str) {
        let prefix = Self::before_wildcard(attr);
        self.attrs.remove(&Self::normalize(attr));
        let replacement = if prefix.is_empty() {
            value.to_string()
        } else {
            format!("{prefix}.{value}")
        };
        self.add(&replacement);
    }

    /// The prefix of `attr` up to (but not including) the first `*` segment.
    #[must_use]
    pub fn before_wildcard(attr: &str) -> String {
        attr.split('.')
            .take_while(|seg| *seg != "*")
            .collect::<Vec<_>>()
            .join(".")
    }

    fn starts_with(segments: &[String], head_segments: &[String]) -> bool {
        if segments.len() < head_segments.len() {
            return false;
        }
        segments
            .iter()
            .zip(head_segments.iter())
            .all(|(a, b)| a == b || is_absent_segment(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_has_are_case_insensitive() {
        let mut attrs = AttributeSet::new();
        attrs.add("Concentration.AI");
        assert!(attrs.has("concentration.ai"));
    }

    #[test]
    fn get_by_head_matches_prefix() {
        let mut attrs = AttributeSet::new();
        attrs.add("concentration.ai");
        attrs.add("concentration.theory");
        attrs.add("subject.cs");
        let mut matches = attrs.get_by_head("concentration");
        matches.sort();
        assert_eq!(matches, vec!["concentration.ai", "concentration.theory"]);
    }

    #[test]
    fn next_returns_distinct_following_segments() {
        let mut attrs = AttributeSet::new();
        attrs.add("concentration.ai");
        attrs.add("concentration.theory");
        attrs.add("concentration.ai.advanced");
        let next = attrs.next("concentration");
        assert_eq!(next.len(), 2);
        assert!(next.contains("ai"));
        assert!(next.contains("theory"));
    }

    #[test]
    fn before_wildcard_stops_at_star() {
        assert_eq!(AttributeSet::before_wildcard("concentration.*"), "concentration");
        assert_eq!(AttributeSet::before_wildcard("a.b.*.c"), "a.b");
    }

    #[test]
    fn replace_wildcard_swaps_segment() {
        let mut attrs = AttributeSet::new();
        attrs.add("concentration.*");
        attrs.replace_wildcard("concentration.*", "ai");
        assert!(attrs.has("concentration.ai"));
        assert!(!attrs.has("concentration.*"));
    }

    #[test]
    fn remove_by_head_deletes_matching_subtree() {
        let mut attrs = AttributeSet::new();
        attrs.add("name.discrete structures");
        attrs.add("subject.cs");
        attrs.remove_by_head("name");
        assert!(!attrs.has_head("name"));
        assert!(attrs.has_head("subject"));
    }

    #[test]
    fn absent_sentinels_impose_no_constraint() {
        let attrs = AttributeSet::new();
        // "na"/"any"/"-1" heads match anything at that position.
        assert!(AttributeSet::starts_with(
            &["concentration".to_string(), "ai".to_string()],
            &["na".to_string()]
        ));
        let _ = attrs;
    }
}
