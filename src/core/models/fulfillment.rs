//! FulfillmentStatus and AssignmentMap (spec.md §3).

use std::collections::HashMap;

use super::course::Course;
use super::course_set::CourseSet;
use super::template::Template;

/// The per-template assignment record.
#[derive(Debug, Clone)]
pub struct FulfillmentStatus {
    template: Template,
    required: u32,
    fulfillment_set: CourseSet,
}

impl FulfillmentStatus {
    /// Creates a new status.
    #[must_use]
    pub fn new(template: Template, required: u32, fulfillment_set: CourseSet) -> Self {
        Self {
            template,
            required,
            fulfillment_set,
        }
    }

    /// The template this status is for.
    #[must_use]
    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Required course count.
    #[must_use]
    pub fn required(&self) -> u32 {
        self.required
    }

    /// `|fulfillment_set|`.
    #[must_use]
    pub fn actual(&self) -> u32 {
        u32::try_from(self.fulfillment_set.len()).unwrap_or(u32::MAX)
    }

    /// `max(0, actual - required)`.
    #[must_use]
    pub fn excess(&self) -> u32 {
        self.actual().saturating_sub(self.required)
    }

    /// `max(0, required - actual)`.
    #[must_use]
    pub fn unfulfilled(&self) -> u32 {
        self.required.saturating_sub(self.actual())
    }

    /// `actual >= required`.
    #[must_use]
    pub fn fulfilled(&self) -> bool {
        self.actual() >= self.required
    }

    /// The currently assigned courses.
    #[must_use]
    pub fn fulfillment_set(&self) -> &CourseSet {
        &self.fulfillment_set
    }

    /// Adopts `course` into this template's fulfillment set.
    pub fn adopt(&mut self, course: Course) -> bool {
        self.fulfillment_set.insert(course)
    }

    /// Removes `course` from this template's fulfillment set.
    pub fn release(&mut self, course: &Course) -> bool {
        self.fulfillment_set.remove(course)
    }
}

/// A mapping template name -> FulfillmentStatus, plus the parallel,
/// never-mutated `max_fulfillments` upper-bound mapping.
#[derive(Debug, Clone, Default)]
pub struct AssignmentMap {
    assignment: HashMap<String, FulfillmentStatus>,
    max_fulfillments: HashMap<String, FulfillmentStatus>,
    /// Insertion order of template names, preserved for deterministic iteration.
    order: Vec<String>,
}

impl AssignmentMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the upper-bound ("max fulfillment") status for a template.
    pub fn set_max_fulfillment(&mut self, name: impl Into<String>, status: FulfillmentStatus) {
        let name = name.into();
        if !self.max_fulfillments.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.max_fulfillments.insert(name, status);
    }

    /// Sets the current assignment status for a template.
    pub fn set(&mut self, name: impl Into<String>, status: FulfillmentStatus) {
        let name = name.into();
        if !self.order.contains(&name) {
            self.order.push(name.clone());
        }
        self.assignment.insert(name, status);
    }

    /// The current status for a template, if assigned.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FulfillmentStatus> {
        self.assignment.get(name)
    }

    /// Mutable access to the current status for a template.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut FulfillmentStatus> {
        self.assignment.get_mut(name)
    }

    /// The max-fulfillment (upper bound) status for a template.
    #[must_use]
    pub fn max(&self, name: &str) -> Option<&FulfillmentStatus> {
        self.max_fulfillments.get(name)
    }

    /// Template names in insertion order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.order
    }

    /// Iterates over `(name, status)` pairs of the current assignment.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &FulfillmentStatus)> {
        self.assignment.iter()
    }

    /// Sum of `unfulfilled` across every assigned template.
    #[must_use]
    pub fn total_unfulfilled(&self) -> u64 {
        self.assignment.values().map(|s| u64::from(s.unfulfilled())).sum()
    }

    /// Sum of `actual` across every assigned template.
    #[must_use]
    pub fn total_actual(&self) -> u64 {
        self.assignment.values().map(|s| u64::from(s.actual())).sum()
    }

    /// Lexicographic score: `(total_unfulfilled, -total_actual)`, smaller is better.
    #[must_use]
    pub fn score(&self) -> (u64, i64) {
        (self.total_unfulfilled(), -(self.total_actual() as i64))
    }

    /// Drops a template entirely (used to remove the dummy donor/receiver
    /// nodes `trade` introduces, per spec.md §4.4.5).
    pub fn remove(&mut self, name: &str) {
        self.assignment.remove(name);
        self.max_fulfillments.remove(name);
        self.order.retain(|n| n != name);
    }

    /// Finds every template (other than `exclude`) whose fulfillment set
    /// currently contains `course`, in insertion order.
    #[must_use]
    pub fn holders_of(&self, course: &Course, exclude: &str) -> Vec<String> {
        self.order
            .iter()
            .filter(|name| name.as_str() != exclude)
            .filter(|name| {
                self.assignment
                    .get(*name)
                    .is_some_and(|s| s.fulfillment_set().contains(course))
            })
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::course::Course;
    use crate::core::models::template::Replacement;

    #[test]
    fn derived_queries() {
        let template = Template::new("t", vec![], Replacement::NonReplacement, 2, 1000);
        let mut set = CourseSet::new();
        set.insert(Course::new("CS", "1800", "Discrete Structures"));
        let status = FulfillmentStatus::new(template, 2, set);
        assert_eq!(status.actual(), 1);
        assert_eq!(status.unfulfilled(), 1);
        assert_eq!(status.excess(), 0);
        assert!(!status.fulfilled());
    }

    #[test]
    fn score_prefers_fewer_unfulfilled_then_more_actual() {
        let mut a = AssignmentMap::new();
        a.set(
            "t1",
            FulfillmentStatus::new(
                Template::new("t1", vec![], Replacement::NonReplacement, 1, 1000),
                1,
                CourseSet::new(),
            ),
        );
        let mut b = AssignmentMap::new();
        let mut set = CourseSet::new();
        set.insert(Course::new("CS", "1800", "Discrete Structures"));
        b.set(
            "t1",
            FulfillmentStatus::new(Template::new("t1", vec![], Replacement::NonReplacement, 1, 1000), 1, set),
        );
        assert!(b.score() < a.score());
    }
}
