//! JSON import (A3): Course and Degree record formats (spec.md §6.2, §6.3).
//! Grounded on the teacher's `core/planner/csv_parser.rs` import-and-skip
//! pattern, adapted from CSV to `serde_json::Value` records.

use serde_json::Value;

use crate::core::matcher::SpecExpr;
use crate::core::models::catalog::Catalog;
use crate::core::models::course::Course;
use crate::core::models::degree::Degree;
use crate::core::models::template::{Replacement, Template};

/// Parses a top-level JSON array of course records into `catalog`. Records
/// missing the required identity triple (`name`, `subject`, `course_id`)
/// are logged and skipped, per spec.md §7.
pub fn import_courses(catalog: &mut Catalog, json: &str) -> Result<usize, String> {
    let value: Value = serde_json::from_str(json).map_err(|e| format!("invalid course JSON: {e}"))?;
    let Value::Array(records) = value else {
        return Err("course JSON must be a top-level array".to_string());
    };

    let mut imported = 0;
    for (i, record) in records.into_iter().enumerate() {
        match parse_course_record(&record) {
            Some(course) => {
                catalog.add_course(course);
                imported += 1;
            }
            None => {
                logger::warn!("import_courses: record {i} missing identity triple, skipped");
            }
        }
    }
    Ok(imported)
}

fn parse_course_record(record: &Value) -> Option<Course> {
    let Value::Object(map) = record else { return None };
    let name = map.get("name")?.as_str()?;
    let subject = map.get("subject")?.as_str()?;
    let course_id = map.get("course_id")?.as_str()?;

    let mut course = Course::new(subject, course_id, name);
    for (key, value) in map {
        if matches!(key.as_str(), "name" | "subject" | "course_id") {
            continue;
        }
        match value {
            Value::Array(items) => {
                for item in items {
                    if let Some(v) = scalar_to_string(item) {
                        course.add_attribute(&format!("{key}.{v}"));
                    }
                }
            }
            other => {
                if let Some(v) = scalar_to_string(other) {
                    course.add_attribute(&format!("{key}.{v}"));
                }
            }
        }
    }
    Some(course)
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Parses `{ degree_name: { template_name: { requires, replacement, attributes } } }`
/// into `catalog`. Template insertion order in the JSON object is the
/// importance order (spec.md §6.3); `serde_json`'s default map (a `BTreeMap`
/// unless the `preserve_order` feature is enabled) would silently reorder
/// templates alphabetically, so this parser walks `Value::Object`'s
/// `serde_json::Map`, which preserves insertion order whenever the crate's
/// `preserve_order` feature (enabled in `Cargo.toml`) is active.
pub fn import_degrees(catalog: &mut Catalog, json: &str) -> Result<usize, String> {
    let value: Value = serde_json::from_str(json).map_err(|e| format!("invalid degree JSON: {e}"))?;
    let Value::Object(degrees) = value else {
        return Err("degree JSON must be a top-level object".to_string());
    };

    let mut imported = 0;
    for (degree_name, templates) in degrees {
        let Value::Object(templates) = templates else {
            logger::warn!("import_degrees: degree '{degree_name}' is not an object, skipped");
            continue;
        };
        let mut degree = Degree::new(degree_name.clone());
        for (template_name, spec) in templates {
            match parse_template_record(&template_name, &spec) {
                Some(template) => degree.add_template(template),
                None => logger::warn!("import_degrees: template '{template_name}' in '{degree_name}' malformed, skipped"),
            }
        }
        catalog.add_degree(degree);
        imported += 1;
    }
    Ok(imported)
}

fn parse_template_record(name: &str, spec: &Value) -> Option<Template> {
    let Value::Object(map) = spec else { return None };
    let requires = map.get("requires")?.as_u64()?;
    let replacement = map.get("replacement").and_then(Value::as_bool).unwrap_or(false);
    let attributes = map
        .get("attributes")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).map(SpecExpr::parse).collect())
        .unwrap_or_default();

    Some(Template::new(
        name,
        attributes,
        if replacement { Replacement::Replacement } else { Replacement::NonReplacement },
        u32::try_from(requires).unwrap_or(1),
        // Importance is reassigned by Degree::add_template; this placeholder
        // is never observed.
        0,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn imports_course_with_scalar_and_list_attributes() {
        let mut catalog = Catalog::new();
        let json = r#"[
            {"name": "Discrete Structures", "subject": "CS", "course_id": "1800",
             "level": "undergrad", "concentration": ["ai", "theory"]}
        ]"#;
        let n = import_courses(&mut catalog, json).unwrap();
        assert_eq!(n, 1);
        let course = catalog.course("cs 1800 discrete structures").unwrap();
        assert!(course.has_attribute("level.undergrad"));
        assert!(course.has_attribute("concentration.ai"));
        assert!(course.has_attribute("concentration.theory"));
    }

    #[test]
    fn skips_record_missing_identity_triple() {
        let mut catalog = Catalog::new();
        let json = r#"[{"name": "No Subject"}]"#;
        let n = import_courses(&mut catalog, json).unwrap();
        assert_eq!(n, 0);
        assert_eq!(catalog.course_count(), 0);
    }

    #[test]
    fn imports_degree_with_template_order() {
        let mut catalog = Catalog::new();
        let json = r#"{
            "BSCS": {
                "core.math": {"requires": 1, "replacement": false, "attributes": ["bin.1"]},
                "elective": {"requires": 2, "replacement": true, "attributes": ["bin.2"]}
            }
        }"#;
        import_degrees(&mut catalog, json).unwrap();
        let degree = catalog.degree("BSCS").unwrap();
        let names: Vec<&str> = degree.templates().iter().map(Template::name).collect();
        assert_eq!(names, vec!["core.math", "elective"]);
        assert!(degree.templates()[0].importance() > degree.templates()[1].importance());
    }
}
