//! User schedule (spec.md §3): an ordered list of semester sets plus an
//! active-degree reference. Non-goals (spec.md §1) exclude scheduling
//! courses across semesters beyond this bookkeeping.

use super::course::Course;
use super::course_set::CourseSet;

/// An ordered list of semester course sets, plus which degree the user is
/// pursuing.
#[derive(Debug, Clone, Default)]
pub struct Schedule {
    semesters: Vec<CourseSet>,
    active_degree: Option<String>,
}

impl Schedule {
    /// Creates an empty schedule.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the active degree by name.
    pub fn set_active_degree(&mut self, degree_name: impl Into<String>) {
        self.active_degree = Some(degree_name.into());
    }

    /// The active degree name, if set.
    #[must_use]
    pub fn active_degree(&self) -> Option<&str> {
        self.active_degree.as_deref()
    }

    /// Ensures at least `index + 1` semesters exist, then adds `course` to
    /// semester `index`.
    pub fn add_course(&mut self, index: usize, course: Course) {
        if index >= self.semesters.len() {
            self.semesters.resize(index + 1, CourseSet::new());
        }
        self.semesters[index].insert(course);
    }

    /// Removes `course` from semester `index`, if present. Returns an error
    /// string if `index` is out of bounds (spec.md §7 input validation).
    pub fn remove_course(&mut self, index: usize, course: &Course) -> Result<bool, String> {
        self.semesters
            .get_mut(index)
            .map(|sem| sem.remove(course))
            .ok_or_else(|| format!("bad semester index: {index}"))
    }

    /// Number of semester buckets.
    #[must_use]
    pub fn semester_count(&self) -> usize {
        self.semesters.len()
    }

    /// The courses in a given semester.
    #[must_use]
    pub fn semester(&self, index: usize) -> Option<&CourseSet> {
        self.semesters.get(index)
    }

    /// The flat union of all taken courses across every semester, which is
    /// all the fulfillment engine consumes.
    #[must_use]
    pub fn taken_courses(&self) -> CourseSet {
        self.semesters.iter().flatten().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taken_courses_is_flat_union() {
        let mut schedule = Schedule::new();
        schedule.add_course(0, Course::new("CS", "1800", "Discrete Structures"));
        schedule.add_course(1, Course::new("CS", "2500", "Fundamentals of CS"));
        assert_eq!(schedule.taken_courses().len(), 2);
    }

    #[test]
    fn remove_course_reports_bad_index() {
        let mut schedule = Schedule::new();
        let course = Course::new("CS", "1800", "Discrete Structures");
        assert!(schedule.remove_course(3, &course).is_err());
    }
}
