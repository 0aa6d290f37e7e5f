//! Template matcher (C2): the specification grammar, its AST, and wildcard
//! expansion. Grounded on spec.md §4.2 (grammar, atom semantics) and on the
//! recursive structure of `original_source/src/dp/course_template.py::get_course_match`.
//!
//! ```text
//! Spec  := Term
//! Term  := Factor
//!        | Factor '&' Term
//!        | Factor '|' Term
//! Factor := '(' Term ')' | Atom | 'True' | 'False'
//! Atom   := <dotted-attribute-path, possibly containing '*' or '#'>
//! ```
//!
//! There is no precedence difference between `&` and `|`: evaluation is
//! left-to-right by textual occurrence, short-circuiting.

use std::collections::BTreeSet;

use crate::core::models::course::Course;
use crate::core::models::course_set::CourseSet;
use crate::core::models::fulfillment::FulfillmentStatus;
use crate::core::models::template::Template;

/// A single atom in a specification expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Atom {
    /// Literal `True`/`False`; an empty atom string is treated as `True`.
    Literal(bool),
    /// `prefix#`: true iff the course has any attribute extending `prefix`. No binding.
    Presence(String),
    /// `prefix*`: true iff the course has any attribute extending `prefix`; records completions.
    Wildcard(String),
    /// An exact dotted attribute path.
    Exact(String),
}

/// One operator-joined step in a [`SpecExpr`]: `op` combines the running
/// result with the next factor's evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// Short-circuit AND.
    And,
    /// Short-circuit OR.
    Or,
}

/// A single factor: either an atom, or a parenthesized sub-expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Factor {
    /// A leaf atom.
    Atom(Atom),
    /// A parenthesized sub-expression.
    Group(Box<SpecExpr>),
}

/// A boolean specification expression: a first factor, then a left-to-right
/// chain of `(op, factor)` steps with no precedence between `&` and `|`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecExpr {
    first: Factor,
    rest: Vec<(Op, Factor)>,
}

/// Whether a segment is one of the "absent" sentinels (`NA`, `ANY`, `-1`),
/// which impose no constraint.
fn is_absent(segment: &str) -> bool {
    matches!(segment.to_ascii_lowercase().as_str(), "na" | "any" | "-1")
}

fn path_is_absent(path: &str) -> bool {
    path.split('.').any(is_absent)
}

impl Atom {
    fn eval(&self, course: &Course) -> bool {
        match self {
            Atom::Literal(b) => *b,
            Atom::Presence(prefix) => path_is_absent(prefix) || course.has_attribute_head(prefix),
            // For boolean evaluation a wildcard behaves like presence; the
            // binding itself is recorded separately during wildcard expansion.
            Atom::Wildcard(prefix) => path_is_absent(prefix) || course.has_attribute_head(prefix),
            Atom::Exact(path) => path_is_absent(path) || course.has_attribute(path),
        }
    }

    fn wildcard_prefix(&self) -> Option<&str> {
        match self {
            Atom::Wildcard(prefix) => Some(prefix),
            _ => None,
        }
    }
}

impl Factor {
    fn eval(&self, course: &Course) -> bool {
        match self {
            Factor::Atom(atom) => atom.eval(course),
            Factor::Group(expr) => expr.eval(course),
        }
    }

    fn collect_wildcards(&self, out: &mut Vec<String>) {
        match self {
            Factor::Atom(atom) => {
                if let Some(prefix) = atom.wildcard_prefix() {
                    if !out.iter().any(|p| p == prefix) {
                        out.push(prefix.to_string());
                    }
                }
            }
            Factor::Group(expr) => expr.collect_wildcards(out),
        }
    }

    fn replace_wildcard(&mut self, prefix: &str, value: &str) {
        match self {
            Factor::Atom(atom) => {
                if matches!(atom, Atom::Wildcard(p) if p == prefix) {
                    *atom = Atom::Exact(format!("{prefix}.{value}"));
                }
            }
            Factor::Group(expr) => expr.replace_wildcard(prefix, value),
        }
    }
}

impl SpecExpr {
    /// Evaluates the expression against a course, short-circuiting
    /// left-to-right with no precedence between `&` and `|`.
    #[must_use]
    pub fn eval(&self, course: &Course) -> bool {
        let mut result = self.first.eval(course);
        for (op, factor) in &self.rest {
            match op {
                Op::And => {
                    if !result {
                        continue; // already false; still need to walk the chain for parse fidelity
                    }
                    result = factor.eval(course);
                }
                Op::Or => {
                    if result {
                        continue;
                    }
                    result = factor.eval(course);
                }
            }
        }
        result
    }

    fn collect_wildcards(&self, out: &mut Vec<String>) {
        self.first.collect_wildcards(out);
        for (_, factor) in &self.rest {
            factor.collect_wildcards(out);
        }
    }

    fn replace_wildcard(&mut self, prefix: &str, value: &str) {
        self.first.replace_wildcard(prefix, value);
        for (_, factor) in &mut self.rest {
            factor.replace_wildcard(prefix, value);
        }
    }

    /// Parses a specification string per the grammar above. An unbalanced
    /// `(` is accepted and treated as closed at end-of-input (spec.md §7).
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let tokens = tokenize(input);
        let mut pos = 0;
        parse_term(&tokens, &mut pos)
    }
}

fn tokenize(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    for ch in input.chars() {
        match ch {
            '(' | ')' | '&' | '|' => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
                tokens.push(ch.to_string());
            }
            c if c.is_whitespace() => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

fn parse_term(tokens: &[String], pos: &mut usize) -> SpecExpr {
    let first = parse_factor(tokens, pos);
    let mut rest = Vec::new();
    while let Some(tok) = tokens.get(*pos) {
        let op = match tok.as_str() {
            "&" => Op::And,
            "|" => Op::Or,
            _ => break,
        };
        *pos += 1;
        let factor = parse_factor(tokens, pos);
        rest.push((op, factor));
    }
    SpecExpr { first, rest }
}

fn parse_factor(tokens: &[String], pos: &mut usize) -> Factor {
    match tokens.get(*pos).map(String::as_str) {
        Some("(") => {
            *pos += 1;
            let inner = parse_term(tokens, pos);
            if tokens.get(*pos).map(String::as_str) == Some(")") {
                *pos += 1;
            }
            // Unbalanced '(' with nothing before EOF: close implicitly.
            Factor::Group(Box::new(inner))
        }
        Some(tok) => {
            *pos += 1;
            Factor::Atom(parse_atom(tok))
        }
        None => Factor::Atom(Atom::Literal(true)),
    }
}

fn parse_atom(tok: &str) -> Atom {
    if tok.is_empty() {
        return Atom::Literal(true);
    }
    match tok {
        "True" => return Atom::Literal(true),
        "False" => return Atom::Literal(false),
        _ => {}
    }
    if let Some(prefix) = tok.strip_suffix('#') {
        return Atom::Presence(prefix.to_string());
    }
    if let Some(prefix) = tok.strip_suffix('*') {
        let prefix = prefix.strip_suffix('.').unwrap_or(prefix);
        return Atom::Wildcard(prefix.to_string());
    }
    Atom::Exact(tok.to_string())
}

/// Whether every specification of `template` satisfies a given course,
/// treating wildcard atoms as presence-only (used to build the pool that
/// feeds wildcard completion enumeration).
fn satisfies_non_wildcard(template: &Template, course: &Course) -> bool {
    template.specifications().iter().all(|spec| spec.eval(course))
}

fn collect_wildcard_prefixes(template: &Template) -> Vec<String> {
    let mut out = Vec::new();
    for spec in template.specifications() {
        spec.collect_wildcards(&mut out);
    }
    out
}

fn replace_wildcard_in_template(template: &Template, prefix: &str, value: &str) -> Template {
    let mut clone = template.clone();
    for spec in clone.specifications_mut() {
        spec.replace_wildcard(prefix, value);
    }
    clone
}

/// Produces the list of concrete (wildcard-free) fulfillment-status variants
/// for `template` against `pool`, per spec.md §4.2's wildcard expansion
/// algorithm. Never returns an empty list.
#[must_use]
pub fn candidates(template: &Template, pool: &CourseSet) -> Vec<FulfillmentStatus> {
    let results = candidates_inner(template, pool);
    if results.is_empty() {
        vec![FulfillmentStatus::new(template.clone(), template.courses_required(), CourseSet::new())]
    } else {
        results
    }
}

fn candidates_inner(template: &Template, pool: &CourseSet) -> Vec<FulfillmentStatus> {
    let satisfying: CourseSet = pool
        .iter()
        .filter(|c| satisfies_non_wildcard(template, c))
        .cloned()
        .collect();

    let wildcard_prefixes = collect_wildcard_prefixes(template);
    if wildcard_prefixes.is_empty() {
        return vec![FulfillmentStatus::new(template.clone(), template.courses_required(), satisfying)];
    }

    let prefix = &wildcard_prefixes[0];
    let mut completions: BTreeSet<String> = BTreeSet::new();
    for course in satisfying.iter() {
        completions.extend(course.attributes().next(prefix));
    }

    let mut results = Vec::new();
    for value in completions {
        let variant = replace_wildcard_in_template(template, prefix, &value);
        results.extend(candidates_inner(&variant, &satisfying));
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::template::Replacement;

    fn course_with(attrs: &[&str]) -> Course {
        let mut c = Course::new("CS", "1800", "Sample");
        for a in attrs {
            c.add_attribute(a);
        }
        c
    }

    #[test]
    fn s6_specification_parser() {
        // S6: (bin.1 & (bin.5 | bin.4))
        let spec = SpecExpr::parse("(bin.1 & (bin.5 | bin.4))");
        assert!(spec.eval(&course_with(&["bin.1", "bin.5"])));
        assert!(!spec.eval(&course_with(&["bin.1"])));
        assert!(!spec.eval(&course_with(&["bin.5", "bin.4"])));
    }

    #[test]
    fn unbalanced_paren_closes_at_eof() {
        let spec = SpecExpr::parse("(bin.1");
        assert!(spec.eval(&course_with(&["bin.1"])));
    }

    #[test]
    fn empty_atom_string_is_true() {
        let spec = SpecExpr::parse("");
        assert!(spec.eval(&course_with(&[])));
    }

    #[test]
    fn presence_atom_matches_any_extension_without_binding() {
        let spec = SpecExpr::parse("concentration#");
        assert!(spec.eval(&course_with(&["concentration.ai"])));
        assert!(!spec.eval(&course_with(&["subject.cs"])));
    }

    #[test]
    fn property_8_atom_only_roundtrip() {
        // For atom-only expressions, parse(a) evaluates course.has_attribute(a).
        let course = course_with(&["bin.3"]);
        assert_eq!(SpecExpr::parse("bin.3").eval(&course), course.has_attribute("bin.3"));
        assert_eq!(SpecExpr::parse("bin.4").eval(&course), course.has_attribute("bin.4"));
    }

    #[test]
    fn s5_wildcard_concentration_prefers_larger_completion() {
        let pool: CourseSet = vec![
            course_with(&["concentration.ai"]),
            course_with(&["concentration.ai"]),
            course_with(&["concentration.theory"]),
        ]
        .into_iter()
        .collect();

        let template = Template::new(
            "concentration",
            vec![SpecExpr::parse("concentration.*")],
            Replacement::NonReplacement,
            2,
            1000,
        );

        let variants = candidates(&template, &pool);
        let best = variants.iter().max_by_key(|v| v.actual()).unwrap();
        assert_eq!(best.actual(), 2);
        assert!(best.fulfillment_set().iter().all(|c| c.has_attribute("concentration.ai")));
    }

    #[test]
    fn wildcard_expansion_coverage() {
        // Property 7: at least n concrete variants for n possible completions.
        let pool: CourseSet = vec![course_with(&["concentration.ai"]), course_with(&["concentration.theory"])]
            .into_iter()
            .collect();
        let template = Template::new(
            "concentration",
            vec![SpecExpr::parse("concentration.*")],
            Replacement::NonReplacement,
            1,
            1000,
        );
        let variants = candidates(&template, &pool);
        assert!(variants.len() >= 2);
    }

    #[test]
    fn no_matches_yields_single_empty_status() {
        let pool: CourseSet = vec![course_with(&["bin.9"])].into_iter().collect();
        let template = Template::new("t", vec![SpecExpr::parse("bin.1")], Replacement::NonReplacement, 1, 1000);
        let variants = candidates(&template, &pool);
        assert_eq!(variants.len(), 1);
        assert!(variants[0].fulfillment_set().is_empty());
    }
}
