//! Template model (spec.md §3): a single requirement slot in a degree.

use crate::core::matcher::SpecExpr;

/// Whether a course assigned to a template may also be assigned to other
/// templates (`R`) or is consumed exclusively (`NR`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Replacement {
    /// Non-replacement: a course is consumed by at most one NR template.
    NonReplacement,
    /// Replacement: one course can satisfy several R templates at once.
    Replacement,
}

impl Replacement {
    /// Whether this is the replacement-allowed variant.
    #[must_use]
    pub fn is_replacement(self) -> bool {
        matches!(self, Self::Replacement)
    }
}

/// A single requirement slot. Immutable once constructed; deep-copied when
/// wildcard resolution produces concrete variants.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    specifications: Vec<SpecExpr>,
    replacement: Replacement,
    courses_required: u32,
    importance: i64,
}

impl Template {
    /// Creates a new template. `importance` is normally assigned by
    /// [`crate::core::models::degree::Degree::add_template`], not called directly.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        specifications: Vec<SpecExpr>,
        replacement: Replacement,
        courses_required: u32,
        importance: i64,
    ) -> Self {
        Self {
            name: name.into(),
            specifications,
            replacement,
            courses_required: courses_required.max(1),
            importance,
        }
    }

    /// Template name, unique within a degree.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The ordered, implicitly-conjoined boolean specifications.
    #[must_use]
    pub fn specifications(&self) -> &[SpecExpr] {
        &self.specifications
    }

    /// Mutable access to the specifications, used by wildcard expansion to
    /// produce a concrete variant.
    pub fn specifications_mut(&mut self) -> &mut Vec<SpecExpr> {
        &mut self.specifications
    }

    /// Whether this template is replacement-allowed or non-replacement.
    #[must_use]
    pub fn replacement(&self) -> Replacement {
        self.replacement
    }

    /// Number of courses required to fulfill this template.
    #[must_use]
    pub fn courses_required(&self) -> u32 {
        self.courses_required
    }

    /// Priority; strictly decreasing in degree insertion order.
    #[must_use]
    pub fn importance(&self) -> i64 {
        self.importance
    }
}

impl PartialEq for Template {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}
impl Eq for Template {}

impl std::hash::Hash for Template {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl std::fmt::Display for Template {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (requires {}, {})",
            self.name,
            self.courses_required,
            if self.replacement.is_replacement() { "R" } else { "NR" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_and_hash_are_by_name_only() {
        let a = Template::new("core.math", vec![], Replacement::NonReplacement, 1, 1000);
        let b = Template::new("core.math", vec![], Replacement::Replacement, 2, 999);
        assert_eq!(a, b);
    }

    #[test]
    fn courses_required_floors_at_one() {
        let t = Template::new("t", vec![], Replacement::NonReplacement, 0, 1000);
        assert_eq!(t.courses_required(), 1);
    }
}
