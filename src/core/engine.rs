//! Fulfillment engine (C4): template enumeration, fill/steal/trade, and the
//! lexicographic best-assignment search. Grounded on spec.md §4.4; the
//! `fill`/`steal`/`trade` pseudocode there is authoritative — it is *not* a
//! port of `original_source/src/dp/degree.py`'s simpler bucket-sort, which
//! only supplies terminology (`Fulfillment_Status`, `Graph`).

use std::collections::HashSet;

use crate::core::graph::{AssignmentGraph, OverlapKind};
use crate::core::matcher;
use crate::core::models::course::Course;
use crate::core::models::course_set::CourseSet;
use crate::core::models::degree::Degree;
use crate::core::models::fulfillment::{AssignmentMap, FulfillmentStatus};
use crate::core::models::template::{Replacement, Template};

/// Runs the fulfillment algorithm for `degree` against `taken_courses`,
/// returning the best-scoring assignment across every wildcard-resolved
/// template combination (spec.md §4.4.1). An unfulfillable degree still
/// returns a well-formed map with empty fulfillment sets (spec.md §7).
#[must_use]
pub fn fulfillment(degree: &Degree, taken_courses: &CourseSet) -> AssignmentMap {
    let combos = enumerate_template_combinations(degree, taken_courses);
    let mut best: Option<AssignmentMap> = None;
    for combo in combos {
        let assignment = run_combination(&combo, taken_courses);
        let better = best.as_ref().is_none_or(|b| assignment.score() < b.score());
        if better {
            logger::debug!("fulfillment: new best score {:?}", assignment.score());
            best = Some(assignment);
        }
    }
    best.unwrap_or_default()
}

/// For each degree template, the cartesian product of its wildcard-resolved
/// variants (spec.md §4.4.2). Templates with no matching courses still
/// contribute one (empty) variant, so the product is always well-defined.
fn enumerate_template_combinations(degree: &Degree, taken_courses: &CourseSet) -> Vec<Vec<Template>> {
    let per_template: Vec<Vec<Template>> = degree
        .templates()
        .iter()
        .map(|t| {
            matcher::candidates(t, taken_courses)
                .into_iter()
                .map(|status| status.template().clone())
                .collect()
        })
        .collect();
    cartesian_product(&per_template)
}

fn cartesian_product(groups: &[Vec<Template>]) -> Vec<Vec<Template>> {
    groups.iter().fold(vec![Vec::new()], |acc, group| {
        let mut next = Vec::with_capacity(acc.len() * group.len().max(1));
        for prefix in &acc {
            for item in group {
                let mut combo = prefix.clone();
                combo.push(item.clone());
                next.push(combo);
            }
        }
        next
    })
}

/// Runs one full fill/steal/trade pipeline for a single concrete template
/// combination.
fn run_combination(combo: &[Template], taken_courses: &CourseSet) -> AssignmentMap {
    let mut assignment = AssignmentMap::new();
    for t in combo {
        let max_status = matcher::candidates(t, taken_courses)
            .into_iter()
            .next()
            .unwrap_or_else(|| FulfillmentStatus::new(t.clone(), t.courses_required(), CourseSet::new()));
        assignment.set_max_fulfillment(t.name(), max_status);
        assignment.set(t.name(), FulfillmentStatus::new(t.clone(), t.courses_required(), CourseSet::new()));
    }

    for t in combo.iter().filter(|t| !t.replacement().is_replacement()) {
        fill(t, &mut assignment, None);
    }

    let mut graph = build_graph(combo, &assignment);

    for t in combo {
        steal(t, &mut assignment, &mut graph, None);
    }

    for t in combo.iter().filter(|t| t.replacement().is_replacement()) {
        fill(t, &mut assignment, None);
    }

    for t in combo {
        trade(t, &mut assignment, &mut graph, None);
    }
    for t in combo {
        trade(t, &mut assignment, &mut graph, Some(t.importance()));
    }

    assignment
}

/// A holder is "weak" with respect to `importance_level` when it has
/// positive excess and (if a floor is given) importance at or above it.
/// `None` means no floor — spec.md §4.4.3/4.4.4's default `-1` sentinel,
/// translated to `Option` so it never collides with a real (possibly
/// negative) importance value.
fn is_weak(status: &FulfillmentStatus, importance_level: Option<i64>) -> bool {
    status.excess() > 0 && importance_level.is_none_or(|floor| status.template().importance() >= floor)
}

fn build_graph(combo: &[Template], assignment: &AssignmentMap) -> AssignmentGraph {
    let names: Vec<String> = combo.iter().map(|t| t.name().to_string()).collect();
    let mut graph = AssignmentGraph::new(names.clone());
    for u in &names {
        for v in &names {
            if u != v {
                graph.update_edge(u, v, assignment, OverlapKind::Backwards);
            }
        }
    }
    for name in &names {
        if assignment.get(name).is_some_and(|s| s.excess() > 0) {
            graph.add_root(name.clone());
        }
    }
    graph
}

/// Templates with positive excess, plus (if `importance_level` is given)
/// templates strictly less important than it — the BFS root set shared by
/// `steal` and `trade` (spec.md §4.4.4 step 1).
fn root_set(names: &[String], assignment: &AssignmentMap, importance_level: Option<i64>) -> HashSet<String> {
    names
        .iter()
        .filter(|name| {
            let excess = assignment.get(name).is_some_and(|s| s.excess() > 0);
            let less_important = importance_level
                .is_some_and(|floor| assignment.get(name).is_some_and(|s| s.template().importance() < floor));
            excess || less_important
        })
        .cloned()
        .collect()
}

/// Count of R templates (by `names`) currently holding `course` — used for
/// the "fewest R-bindings" tie-break (steal's last hop) and trade's
/// ascending-by-bind-count candidate order.
fn r_binding_count(course: &Course, names: &[String], assignment: &AssignmentMap) -> usize {
    names
        .iter()
        .filter(|name| {
            assignment.get(name).is_some_and(|s| {
                s.template().replacement().is_replacement() && s.fulfillment_set().contains(course)
            })
        })
        .count()
}

/// Count of still-unfulfilled R templates whose *max* fulfillment set
/// contains `course` — drives fill's descending pre-sort for R templates
/// (spec.md §4.4.3).
fn unfulfilled_r_overlap(course: &Course, assignment: &AssignmentMap) -> usize {
    assignment
        .names()
        .iter()
        .filter(|name| {
            assignment.max(name).is_some_and(|m| {
                m.template().replacement().is_replacement() && m.fulfillment_set().contains(course)
            }) && assignment.get(name).is_some_and(|s| !s.fulfilled())
        })
        .count()
}

/// spec.md §4.4.3.
fn fill(t: &Template, assignment: &mut AssignmentMap, importance_level: Option<i64>) {
    let Some(max_status) = assignment.max(t.name()).cloned() else { return };
    let mut candidates: Vec<Course> = max_status.fulfillment_set().iter().cloned().collect();
    if t.replacement().is_replacement() {
        candidates.sort_by_key(|c| std::cmp::Reverse(unfulfilled_r_overlap(c, assignment)));
    }

    for c in candidates {
        let holders = assignment.holders_of(&c, t.name());
        let bound_to_nr = holders
            .iter()
            .any(|h| assignment.get(h).is_some_and(|s| !s.template().replacement().is_replacement()));

        if holders.is_empty() || (t.replacement().is_replacement() && !bound_to_nr) {
            adopt_into(assignment, t.name(), c);
            continue;
        }

        let unfulfilled = assignment.get(t.name()).is_some_and(|s| !s.fulfilled());
        if unfulfilled && !t.replacement().is_replacement() {
            let all_weak = !holders.is_empty()
                && holders
                    .iter()
                    .all(|h| assignment.get(h).is_some_and(|s| is_weak(s, importance_level)));
            if all_weak {
                for h in &holders {
                    if let Some(s) = assignment.get_mut(h) {
                        s.release(&c);
                    }
                }
                adopt_into(assignment, t.name(), c);
            }
        }
    }
}

fn adopt_into(assignment: &mut AssignmentMap, name: &str, course: Course) {
    if let Some(status) = assignment.get_mut(name) {
        status.adopt(course);
    }
}

/// spec.md §4.4.4. Only meaningful for NR templates.
fn steal(t: &Template, assignment: &mut AssignmentMap, graph: &mut AssignmentGraph, importance_level: Option<i64>) {
    if t.replacement().is_replacement() {
        return;
    }
    let names: Vec<String> = assignment.names().to_vec();

    loop {
        if assignment.get(t.name()).is_some_and(FulfillmentStatus::fulfilled) {
            break;
        }
        let Some(max_status) = assignment.max(t.name()).cloned() else { break };
        let wanted: Vec<Course> = max_status
            .fulfillment_set()
            .iter()
            .filter(|c| !assignment.get(t.name()).is_some_and(|s| s.fulfillment_set().contains(c)))
            .cloned()
            .collect();

        let mut progressed = false;
        for c in wanted {
            if assignment.get(t.name()).is_some_and(FulfillmentStatus::fulfilled) {
                break;
            }
            let roots = root_set(&names, assignment, importance_level);
            let bfs = graph.bfs(&roots);

            let holders = assignment.holders_of(&c, t.name());
            let Some(holder) = holders.first() else { continue };
            if !bfs.contains_child(holder) {
                continue;
            }
            let Some(path) = bfs.path(holder) else { continue };
            let mut chain = path.clone();
            chain.push(t.name().to_string());

            let Some(moves) = plan_chain_moves(&chain, t.name(), graph, assignment, &names) else {
                continue;
            };
            for (giver, receiver, course) in moves {
                move_course(assignment, graph, &giver, &receiver, &course);
            }
            progressed = true;
        }
        if !progressed {
            break;
        }
    }
}

/// For each adjacent pair in `chain`, pick the course to transfer from
/// `edge_data(giver, receiver)`: any element for interior hops, the element
/// with fewest R-bindings for the final hop into `t` (spec.md §4.4.4 step 4).
fn plan_chain_moves(
    chain: &[String],
    t_name: &str,
    graph: &AssignmentGraph,
    assignment: &AssignmentMap,
    names: &[String],
) -> Option<Vec<(String, String, Course)>> {
    let mut moves = Vec::new();
    for pair in chain.windows(2) {
        let giver = &pair[0];
        let receiver = &pair[1];
        let edge = graph.edge_data(giver, receiver);
        if edge.is_empty() {
            return None;
        }
        let chosen = if receiver == t_name {
            edge.iter().min_by_key(|c| r_binding_count(c, names, assignment)).cloned()
        } else {
            edge.iter().next().cloned()
        }?;
        moves.push((giver.clone(), receiver.clone(), chosen));
    }
    Some(moves)
}

/// Moves `course` from `giver` to `receiver` and recomputes every edge
/// incident on either node, keeping `graph` consistent (spec.md §4.3).
fn move_course(assignment: &mut AssignmentMap, graph: &mut AssignmentGraph, giver: &str, receiver: &str, course: &Course) {
    if let Some(s) = assignment.get_mut(giver) {
        s.release(course);
    }
    if let Some(s) = assignment.get_mut(receiver) {
        s.adopt(course.clone());
    }
    let names: Vec<String> = assignment.names().to_vec();
    for name in &names {
        if name != giver {
            graph.update_edge(giver, name, assignment, OverlapKind::Backwards);
            graph.update_edge(name, giver, assignment, OverlapKind::Backwards);
        }
        if name != receiver {
            graph.update_edge(receiver, name, assignment, OverlapKind::Backwards);
            graph.update_edge(name, receiver, assignment, OverlapKind::Backwards);
        }
    }
}

/// spec.md §4.4.5. Only meaningful for R templates.
fn trade(t: &Template, assignment: &mut AssignmentMap, graph: &mut AssignmentGraph, importance_level: Option<i64>) {
    if !t.replacement().is_replacement() {
        return;
    }

    loop {
        if assignment.get(t.name()).is_some_and(FulfillmentStatus::fulfilled) {
            break;
        }
        let Some(max_status) = assignment.max(t.name()).cloned() else { break };
        let current = assignment
            .get(t.name())
            .cloned()
            .unwrap_or_else(|| FulfillmentStatus::new(t.clone(), t.courses_required(), CourseSet::new()));
        let names: Vec<String> = assignment.names().to_vec();

        let mut candidates: Vec<Course> = max_status
            .fulfillment_set()
            .difference(current.fulfillment_set())
            .iter()
            .cloned()
            .collect();
        candidates.sort_by_key(|c| r_binding_count(c, &names, assignment));

        let mut progressed = false;
        for c in candidates {
            if assignment.get(t.name()).is_some_and(FulfillmentStatus::fulfilled) {
                break;
            }
            if try_trade_one(t, &c, assignment, graph, importance_level) {
                progressed = true;
                break;
            }
        }
        if !progressed {
            break;
        }
    }
}

/// One iteration of trade's tentative-bind / dummy-BFS / steal protocol for
/// a single candidate course `c`. Returns whether the trade succeeded.
fn try_trade_one(
    t: &Template,
    c: &Course,
    assignment: &mut AssignmentMap,
    graph: &mut AssignmentGraph,
    importance_level: Option<i64>,
) -> bool {
    let names: Vec<String> = assignment.names().to_vec();

    // (a) tentatively bind c to every R template in whose max_map it appears.
    let r_targets: Vec<String> = names
        .iter()
        .filter(|name| {
            assignment.max(name).is_some_and(|m| {
                m.template().replacement().is_replacement() && m.fulfillment_set().contains(c)
            })
        })
        .cloned()
        .collect();
    let mut newly_bound = Vec::new();
    for name in &r_targets {
        if let Some(s) = assignment.get_mut(name) {
            if s.adopt(c.clone()) {
                newly_bound.push(name.clone());
            }
        }
    }

    // (b) weakly R-bound pool.
    let weak_pool: CourseSet = names
        .iter()
        .filter_map(|name| assignment.get(name))
        .filter(|s| s.template().replacement().is_replacement() && is_weak(s, None))
        .flat_map(|s| s.fulfillment_set().iter().cloned())
        .collect();

    // (c) dummy donor/receiver.
    let donor = format!("__donor__{}", t.name());
    let receiver = format!("__receiver__{}", t.name());
    let donor_template = Template::new(donor.clone(), Vec::new(), Replacement::Replacement, 0, i64::MIN);
    let receiver_template = Template::new(receiver.clone(), Vec::new(), Replacement::NonReplacement, 1, i64::MIN);

    assignment.set_max_fulfillment(&donor, FulfillmentStatus::new(donor_template.clone(), 0, weak_pool.clone()));
    assignment.set(&donor, FulfillmentStatus::new(donor_template, 0, weak_pool));
    let mut receiver_max_pool = CourseSet::new();
    receiver_max_pool.insert(c.clone());
    assignment.set_max_fulfillment(&receiver, FulfillmentStatus::new(receiver_template.clone(), 1, receiver_max_pool));
    assignment.set(&receiver, FulfillmentStatus::new(receiver_template, 1, CourseSet::new()));

    graph.add_node(donor.clone());
    graph.add_node(receiver.clone());
    let all_names: Vec<String> = assignment.names().to_vec();
    for u in &all_names {
        for v in &all_names {
            if u != v && (u == &donor || v == &donor || u == &receiver || v == &receiver) {
                graph.update_edge(u, v, assignment, OverlapKind::Forwards);
            }
        }
    }

    // (d) BFS check from `less_important ∪ excess`.
    let roots = root_set(&all_names, assignment, importance_level);
    let bfs = graph.bfs(&roots);
    let holder_of_c = assignment.holders_of(c, &receiver).into_iter().next();
    let reachable = holder_of_c.as_deref().is_some_and(|h| bfs.contains_node(h));

    let succeeded = if !reachable {
        false
    } else {
        let donor_before = assignment.get(&donor).map_or(0, FulfillmentStatus::actual);
        let receiver_template = receiver_template_ref(&receiver, assignment);
        steal(&receiver_template, assignment, graph, importance_level);
        let donor_after = assignment.get(&donor).map_or(0, FulfillmentStatus::actual);
        donor_after < donor_before
    };

    if succeeded {
        for name in &r_targets {
            if let Some(s) = assignment.get_mut(name) {
                s.release(c);
            }
        }
        adopt_into(assignment, t.name(), c.clone());
    } else {
        for name in &newly_bound {
            if let Some(s) = assignment.get_mut(name) {
                s.release(c);
            }
        }
    }

    assignment.remove(&donor);
    assignment.remove(&receiver);
    graph.remove_node(&donor);
    graph.remove_node(&receiver);

    succeeded
}

fn receiver_template_ref(receiver: &str, assignment: &AssignmentMap) -> Template {
    assignment
        .get(receiver)
        .map(FulfillmentStatus::template)
        .cloned()
        .unwrap_or_else(|| Template::new(receiver, Vec::new(), Replacement::NonReplacement, 1, i64::MIN))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::matcher::SpecExpr;

    fn course(id: &str, attrs: &[&str]) -> Course {
        let mut c = Course::new("CS", id, "Course");
        for a in attrs {
            c.add_attribute(a);
        }
        c
    }

    fn nr(name: &str, spec: &str, required: u32, importance: i64) -> Template {
        Template::new(name, vec![SpecExpr::parse(spec)], Replacement::NonReplacement, required, importance)
    }

    fn r(name: &str, spec: &str, required: u32, importance: i64) -> Template {
        Template::new(name, vec![SpecExpr::parse(spec)], Replacement::Replacement, required, importance)
    }

    #[test]
    fn s1_linear_overlap_all_five_fulfilled() {
        let mut degree = Degree::new("linear");
        degree.add_template(nr("bin.1", "bin.1", 1, 1000));
        degree.add_template(nr("bin.2", "bin.2", 1, 999));
        degree.add_template(nr("bin.3", "bin.3", 1, 998));
        degree.add_template(nr("bin.4", "bin.4", 1, 997));
        degree.add_template(nr("bin.5", "bin.5", 1, 996));

        let taken: CourseSet = vec![
            course("c1", &["bin.1", "bin.5"]),
            course("c2", &["bin.1", "bin.2"]),
            course("c3", &["bin.2", "bin.3"]),
            course("c4", &["bin.3", "bin.4"]),
            course("c5", &["bin.3", "bin.4"]),
        ]
        .into_iter()
        .collect();

        let assignment = fulfillment(&degree, &taken);
        for name in ["bin.1", "bin.2", "bin.3", "bin.4", "bin.5"] {
            let status = assignment.get(name).unwrap();
            assert!(status.fulfilled(), "{name} not fulfilled: {status:?}");
        }
    }

    #[test]
    fn s3_trade_rescues_r_templates_from_nr_monopoly() {
        let mut degree = Degree::new("trade");
        degree.add_template(nr("bin.1", "bin.1", 1, 1000));
        degree.add_template(r("bin.2", "bin.2", 1, 999));
        degree.add_template(r("bin.3", "bin.3", 1, 998));

        let taken: CourseSet = vec![
            course("c1", &["bin.1", "bin.2", "bin.3"]),
            course("c2", &["bin.1", "bin.2"]),
        ]
        .into_iter()
        .collect();

        let assignment = fulfillment(&degree, &taken);
        for name in ["bin.1", "bin.2", "bin.3"] {
            let status = assignment.get(name).unwrap();
            assert!(status.fulfilled(), "{name} not fulfilled: {status:?}");
        }
    }

    #[test]
    fn s4_unfulfillable_reports_partial_shortfall() {
        let mut degree = Degree::new("tiny");
        degree.add_template(nr("bin.1", "bin.1", 1, 1000));
        degree.add_template(nr("bin.2", "bin.2", 1, 999));
        let taken: CourseSet = vec![course("c1", &["bin.1"])].into_iter().collect();

        let assignment = fulfillment(&degree, &taken);
        assert_eq!(assignment.get("bin.1").unwrap().unfulfilled(), 0);
        assert_eq!(assignment.get("bin.2").unwrap().unfulfilled(), 1);
    }

    #[test]
    fn s2_r_sharing_allows_overlap() {
        let mut degree = Degree::new("shared");
        degree.add_template(r("bin.1", "bin.1", 1, 1000));
        degree.add_template(r("bin.2", "bin.2", 1, 999));
        let taken: CourseSet = vec![course("c1", &["bin.1", "bin.2"])].into_iter().collect();

        let assignment = fulfillment(&degree, &taken);
        assert!(assignment.get("bin.1").unwrap().fulfilled());
        assert!(assignment.get("bin.2").unwrap().fulfilled());
    }

    #[test]
    fn invariant_nr_disjointness_holds() {
        let mut degree = Degree::new("disjoint");
        degree.add_template(nr("bin.1", "bin.1", 1, 1000));
        degree.add_template(nr("bin.2", "bin.2", 1, 999));
        let taken: CourseSet = vec![course("c1", &["bin.1", "bin.2"])].into_iter().collect();

        let assignment = fulfillment(&degree, &taken);
        let a = assignment.get("bin.1").unwrap().fulfillment_set();
        let b = assignment.get("bin.2").unwrap().fulfillment_set();
        assert!(a.intersection(b).is_empty());
    }

    #[test]
    fn invariant_soundness_every_course_satisfies_its_template() {
        let mut degree = Degree::new("sound");
        degree.add_template(nr("bin.1", "bin.1", 1, 1000));
        let taken: CourseSet = vec![course("c1", &["bin.1"]), course("c2", &["bin.2"])].into_iter().collect();

        let assignment = fulfillment(&degree, &taken);
        let status = assignment.get("bin.1").unwrap();
        for c in status.fulfillment_set() {
            assert!(status.template().specifications().iter().all(|s| s.eval(c)));
        }
    }
}
