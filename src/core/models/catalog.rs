//! Catalog model (spec.md §3): owns the set of courses and the set of degrees.

use std::collections::HashMap;

use super::course::Course;
use super::degree::Degree;

/// Owns courses (keyed by canonical unique-name) and degrees (keyed by name).
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    courses: HashMap<String, Course>,
    degrees: HashMap<String, Degree>,
}

impl Catalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a course, keyed by its canonical unique-name. Replaces any
    /// existing course with the same key.
    pub fn add_course(&mut self, course: Course) {
        self.courses.insert(course.unique_name(), course);
    }

    /// Adds a degree, keyed by name. Replaces any existing degree with the same name.
    pub fn add_degree(&mut self, degree: Degree) {
        self.degrees.insert(degree.name().to_string(), degree);
    }

    /// Looks up a course by its canonical unique-name.
    #[must_use]
    pub fn course(&self, unique_name: &str) -> Option<&Course> {
        self.courses.get(&unique_name.to_ascii_lowercase())
    }

    /// Looks up a degree by name.
    #[must_use]
    pub fn degree(&self, name: &str) -> Option<&Degree> {
        self.degrees.get(name)
    }

    /// All courses, in an unspecified order.
    pub fn courses(&self) -> impl Iterator<Item = &Course> {
        self.courses.values()
    }

    /// All degree names.
    pub fn degree_names(&self) -> impl Iterator<Item = &str> {
        self.degrees.keys().map(String::as_str)
    }

    /// Number of courses.
    #[must_use]
    pub fn course_count(&self) -> usize {
        self.courses.len()
    }

    /// Finds courses whose name contains `query` (case-insensitive substring).
    /// Used by the CLI `find`/`details` commands; returns candidates for
    /// disambiguation when more than one matches.
    #[must_use]
    pub fn search_by_name(&self, query: &str) -> Vec<&Course> {
        let query = query.to_ascii_lowercase();
        let mut matches: Vec<&Course> = self
            .courses
            .values()
            .filter(|c| c.name().to_ascii_lowercase().contains(&query))
            .collect();
        matches.sort_by_key(|c| c.unique_name());
        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_lookup_course() {
        let mut catalog = Catalog::new();
        catalog.add_course(Course::new("CS", "1800", "Discrete Structures"));
        assert!(catalog.course("cs 1800 discrete structures").is_some());
        assert_eq!(catalog.course_count(), 1);
    }

    #[test]
    fn search_by_name_is_case_insensitive_substring() {
        let mut catalog = Catalog::new();
        catalog.add_course(Course::new("CS", "1800", "Discrete Structures"));
        catalog.add_course(Course::new("CS", "2500", "Fundamentals of CS"));
        let results = catalog.search_by_name("discrete");
        assert_eq!(results.len(), 1);
    }
}
