//! Degree model (spec.md §3): an ordered list of templates.

use super::template::Template;

/// A degree program: an ordered list of templates. Order is semantically
/// significant — earlier templates have higher importance and receive
/// assignment priority.
#[derive(Debug, Clone, Default)]
pub struct Degree {
    name: String,
    templates: Vec<Template>,
}

/// Importance assigned to the first template added to a degree.
pub const FIRST_TEMPLATE_IMPORTANCE: i64 = 1000;

impl Degree {
    /// Creates an empty degree.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            templates: Vec::new(),
        }
    }

    /// Degree name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Appends a template, ignoring any importance set on it, and assigns
    /// `importance = last.importance - 1` (or [`FIRST_TEMPLATE_IMPORTANCE`]
    /// for the first template).
    pub fn add_template(&mut self, mut template: Template) {
        let importance = self
            .templates
            .last()
            .map_or(FIRST_TEMPLATE_IMPORTANCE, |last| last.importance() - 1);
        template = Template::new(
            template.name().to_string(),
            template.specifications().to_vec(),
            template.replacement(),
            template.courses_required(),
            importance,
        );
        logger::info!("degree '{}': added template '{}' (importance {importance})", self.name, template.name());
        self.templates.push(template);
    }

    /// Templates in insertion (importance) order.
    #[must_use]
    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    /// Looks up a template by name.
    #[must_use]
    pub fn template(&self, name: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.name() == name)
    }
}
