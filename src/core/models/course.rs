//! Course model (spec.md §3): identity triple plus a mutable attribute set.

use crate::core::attribute::AttributeSet;

/// A single course. Identity is the triple (subject, id, name); mutable only
/// during catalog construction, immutable once fulfillment runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    subject: String,
    course_id: String,
    name: String,
    attributes: AttributeSet,
}

impl Course {
    /// Creates a new course, auto-deriving `subject.*`, `id.*`, `level.*`, and `name.*`.
    #[must_use]
    pub fn new(subject: impl Into<String>, course_id: impl Into<String>, name: impl Into<String>) -> Self {
        let subject = subject.into();
        let course_id = course_id.into();
        let name = name.into();

        let mut attributes = AttributeSet::new();
        attributes.add(&format!("subject.{subject}"));
        attributes.add(&format!("id.{course_id}"));
        let level = course_id.chars().next().unwrap_or('0');
        attributes.add(&format!("level.{level}"));
        attributes.add(&format!("name.{name}"));

        Self {
            subject,
            course_id,
            name,
            attributes,
        }
    }

    /// The canonical unique name used as the catalog key:
    /// `"<subject casefolded> <id> <name casefolded>"`.
    #[must_use]
    pub fn unique_name(&self) -> String {
        format!(
            "{} {} {}",
            self.subject.to_ascii_lowercase(),
            self.course_id,
            self.name.to_ascii_lowercase()
        )
    }

    /// Course subject (e.g. `"CS"`).
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Course id (e.g. `"1800"`).
    #[must_use]
    pub fn course_id(&self) -> &str {
        &self.course_id
    }

    /// Course name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds an attribute, e.g. `"concentration.ai"`.
    pub fn add_attribute(&mut self, attr: &str) {
        self.attributes.add(attr);
    }

    /// Returns whether the course has the given attribute (exact, case-insensitive).
    #[must_use]
    pub fn has_attribute(&self, attr: &str) -> bool {
        self.attributes.has(attr)
    }

    /// Returns whether the course has any attribute under `head`.
    #[must_use]
    pub fn has_attribute_head(&self, head: &str) -> bool {
        self.attributes.has_head(head)
    }

    /// The underlying attribute set.
    #[must_use]
    pub fn attributes(&self) -> &AttributeSet {
        &self.attributes
    }
}

impl std::fmt::Display for Course {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} ({})", self.subject, self.course_id, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_course_auto_derives_attributes() {
        let c = Course::new("CS", "1800", "Discrete Structures");
        assert!(c.has_attribute("subject.cs"));
        assert!(c.has_attribute("id.1800"));
        assert!(c.has_attribute("level.1"));
        assert!(c.has_attribute("name.discrete structures"));
    }

    #[test]
    fn unique_name_is_casefolded() {
        let c = Course::new("CS", "1800", "Discrete Structures");
        assert_eq!(c.unique_name(), "cs 1800 discrete structures");
    }

    #[test]
    fn equality_is_structural() {
        let mut a = Course::new("CS", "1800", "Discrete Structures");
        let b = Course::new("CS", "1800", "Discrete Structures");
        assert_eq!(a, b);
        a.add_attribute("concentration.ai");
        assert_ne!(a, b);
    }
}
