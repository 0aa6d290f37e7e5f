//! Recommender facade (C5): turns a finished assignment into ranked
//! "what to take next" suggestions per template. Grounded on spec.md §4.5.

use crate::core::matcher;
use crate::core::models::catalog::Catalog;
use crate::core::models::course::Course;
use crate::core::models::course_set::CourseSet;
use crate::core::models::fulfillment::AssignmentMap;
use crate::core::models::template::Template;

/// An external, optional ranking delegate (spec.md §6.5). The engine treats
/// it as opaque; its absence simply disables semantic ranking.
pub trait Scorer {
    /// Returns a scalar rank for `candidate` with respect to `template`,
    /// given what the user has already taken and any caller-supplied tags.
    fn score(&self, template: &Template, candidate: &Course, taken_courses: &CourseSet, custom_tags: &[String]) -> f64;
}

/// `{ resolved_template_name -> ranked candidate courses }` (spec.md §4.5).
pub type Recommendations = Vec<(Template, Vec<Course>)>;

/// Builds recommendations for every template in `assignment`, against the
/// full `catalog` (not just taken courses).
#[must_use]
pub fn recommend(
    assignment: &AssignmentMap,
    catalog: &Catalog,
    taken_courses: &CourseSet,
    scorer: Option<&dyn Scorer>,
    custom_tags: &[String],
) -> Recommendations {
    let mut out = Recommendations::new();
    for name in assignment.names() {
        let Some(status) = assignment.get(name) else { continue };
        let template = status.template();

        let pool: CourseSet = catalog.courses().cloned().collect();
        let original_matches = matcher::candidates(template, &pool);
        let best_match = original_matches
            .iter()
            .max_by_key(|v| v.actual())
            .cloned()
            .unwrap_or_else(|| original_matches[0].clone());

        let mut remaining: Vec<Course> = best_match
            .fulfillment_set()
            .difference(status.fulfillment_set())
            .iter()
            .cloned()
            .collect();

        remaining.sort_by_key(|c| r_binding_count(c, assignment));
        if template.replacement().is_replacement() {
            remaining.reverse();
        }

        if let Some(scorer) = scorer {
            let mut scored: Vec<(f64, Course)> = remaining
                .into_iter()
                .map(|c| {
                    let s = scorer.score(template, &c, taken_courses, custom_tags);
                    (s, c)
                })
                .collect();
            scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
            remaining = scored.into_iter().map(|(_, c)| c).collect();
        }

        out.push((template.clone(), remaining));
    }
    out
}

fn r_binding_count(course: &Course, assignment: &AssignmentMap) -> usize {
    assignment
        .names()
        .iter()
        .filter(|name| {
            assignment
                .get(name)
                .is_some_and(|s| s.template().replacement().is_replacement() && s.fulfillment_set().contains(course))
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::matcher::SpecExpr;
    use crate::core::models::fulfillment::FulfillmentStatus;
    use crate::core::models::template::Replacement;

    fn course(id: &str, attr: &str) -> Course {
        let mut c = Course::new("CS", id, "Course");
        c.add_attribute(attr);
        c
    }

    #[test]
    fn recommends_unassigned_catalog_matches() {
        let mut catalog = Catalog::new();
        catalog.add_course(course("c1", "bin.1"));
        catalog.add_course(course("c2", "bin.1"));

        let template = Template::new("bin.1", vec![SpecExpr::parse("bin.1")], Replacement::NonReplacement, 2, 1000);
        let mut assignment = AssignmentMap::new();
        let mut held = CourseSet::new();
        held.insert(course("c1", "bin.1"));
        assignment.set_max_fulfillment(
            "bin.1",
            FulfillmentStatus::new(template.clone(), 2, held.clone()),
        );
        assignment.set("bin.1", FulfillmentStatus::new(template, 2, held));

        let recs = recommend(&assignment, &catalog, &CourseSet::new(), None, &[]);
        assert_eq!(recs.len(), 1);
        let (_, candidates) = &recs[0];
        assert!(candidates.iter().any(|c| c.course_id() == "c2"));
        assert!(!candidates.iter().any(|c| c.course_id() == "c1"));
    }
}
