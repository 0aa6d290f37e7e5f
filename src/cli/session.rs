//! Interactive session state and command dispatch (spec.md §5/§6.4).
//!
//! Mirrors spec.md's "single lock per user" model within one process: a
//! [`Session`] holds the active catalog and schedule, plus at most one
//! paused command awaiting a disambiguation index. `dispatch` is the sole
//! entry point; while a command is paused, the next line is interpreted as
//! a 1-based selection rather than a new command.

use std::fs;

use degree_planner::config::Config;
use degree_planner::core::engine;
use degree_planner::core::error::EngineError;
use degree_planner::core::io;
use degree_planner::core::models::catalog::Catalog;
use degree_planner::core::models::course::Course;
use degree_planner::core::models::schedule::Schedule;

/// A command that matched more than one catalog course and is waiting on a
/// disambiguation index from the next input line.
enum PendingCommand {
    Add { semester: usize, candidates: Vec<Course> },
    Remove { semester: usize, candidates: Vec<Course> },
    Details { candidates: Vec<Course> },
}

/// Interactive degree-planning session: one catalog, one schedule, one
/// outstanding disambiguation at most.
pub struct Session {
    catalog: Catalog,
    schedule: Schedule,
    catalog_file: String,
    degree_file: String,
    pending: Option<PendingCommand>,
}

impl Session {
    /// Creates a new, empty session using the configured catalog/degree file
    /// paths (populated once `import` runs).
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            catalog: Catalog::new(),
            schedule: Schedule::new(),
            catalog_file: config.paths.catalog_file.clone(),
            degree_file: config.paths.degree_file.clone(),
            pending: None,
        }
    }

    /// Dispatches one REPL line: either resolves a pending disambiguation,
    /// or parses and runs a new command (spec.md §6.4's command table).
    ///
    /// # Errors
    /// Returns an [`EngineError`] describing why the line couldn't be
    /// executed; the session state is left unchanged.
    pub fn dispatch(&mut self, line: &str) -> Result<String, EngineError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(String::new());
        }

        if let Some(pending) = self.pending.take() {
            return self.resume(pending, line);
        }

        let (cmd, rest) = line.split_once(' ').unwrap_or((line, ""));
        let args: Vec<String> = if rest.trim().is_empty() {
            Vec::new()
        } else {
            rest.split(',').map(|s| s.trim().to_string()).collect()
        };

        match cmd {
            "add" => self.cmd_add(&args),
            "remove" => self.cmd_remove(&args),
            "schedule" => self.cmd_schedule(&args),
            "print" => Ok(self.cmd_print()),
            "fulfillment" => self.cmd_fulfillment(),
            "degree" => self.cmd_degree(&args),
            "find" => self.cmd_find(&args),
            "details" => self.cmd_details(&args),
            "import" => self.cmd_import(),
            other => Err(EngineError::UnknownCommand(other.to_string())),
        }
    }

    fn resume(&mut self, pending: PendingCommand, line: &str) -> Result<String, EngineError> {
        let selection: usize = line
            .parse()
            .map_err(|_| EngineError::InvalidSelection(line.to_string()))?;

        match pending {
            PendingCommand::Add { semester, candidates } => {
                let course = select(candidates, selection)?;
                let label = course.to_string();
                self.schedule.add_course(semester, course);
                Ok(format!("added {label} to semester {semester}"))
            }
            PendingCommand::Remove { semester, candidates } => {
                let course = select(candidates, selection)?;
                let label = course.to_string();
                self.schedule
                    .remove_course(semester, &course)
                    .map_err(EngineError::BadSemesterIndex)?;
                Ok(format!("removed {label} from semester {semester}"))
            }
            PendingCommand::Details { candidates } => {
                let course = select(candidates, selection)?;
                Ok(describe(&course))
            }
        }
    }

    fn cmd_add(&mut self, args: &[String]) -> Result<String, EngineError> {
        let (semester, name) = semester_and_name(args)?;
        match self.catalog.search_by_name(name).into_iter().cloned().collect::<Vec<_>>()[..] {
            [] => Ok(format!("no course matches '{name}'")),
            [ref only] => {
                let label = only.to_string();
                self.schedule.add_course(semester, only.clone());
                Ok(format!("added {label} to semester {semester}"))
            }
            ref many => {
                let prompt = candidate_prompt(many);
                self.pending = Some(PendingCommand::Add {
                    semester,
                    candidates: many.to_vec(),
                });
                Ok(prompt)
            }
        }
    }

    fn cmd_remove(&mut self, args: &[String]) -> Result<String, EngineError> {
        let (semester, name) = semester_and_name(args)?;
        match self.catalog.search_by_name(name).into_iter().cloned().collect::<Vec<_>>()[..] {
            [] => Ok(format!("no course matches '{name}'")),
            [ref only] => {
                let label = only.to_string();
                self.schedule
                    .remove_course(semester, only)
                    .map_err(EngineError::BadSemesterIndex)?;
                Ok(format!("removed {label} from semester {semester}"))
            }
            ref many => {
                let prompt = candidate_prompt(many);
                self.pending = Some(PendingCommand::Remove {
                    semester,
                    candidates: many.to_vec(),
                });
                Ok(prompt)
            }
        }
    }

    fn cmd_schedule(&mut self, args: &[String]) -> Result<String, EngineError> {
        let name = args.first().ok_or_else(|| EngineError::UnknownDegree(String::new()))?;
        if self.catalog.degree(name).is_none() {
            return Err(EngineError::UnknownDegree(name.clone()));
        }
        self.schedule.set_active_degree(name.clone());
        Ok(format!("active degree set to '{name}'"))
    }

    fn cmd_print(&self) -> String {
        let mut out = String::new();
        if self.schedule.semester_count() == 0 {
            out.push_str("(empty schedule)\n");
        }
        for i in 0..self.schedule.semester_count() {
            out.push_str(&format!("semester {i}:\n"));
            if let Some(set) = self.schedule.semester(i) {
                for course in set {
                    out.push_str(&format!("  {course}\n"));
                }
            }
        }
        if let Some(active) = self.schedule.active_degree() {
            out.push_str(&format!("active degree: {active}\n"));
        }
        out
    }

    fn cmd_fulfillment(&self) -> Result<String, EngineError> {
        let name = self
            .schedule
            .active_degree()
            .ok_or_else(|| EngineError::UnknownDegree(String::new()))?;
        let degree = self
            .catalog
            .degree(name)
            .ok_or_else(|| EngineError::UnknownDegree(name.to_string()))?;

        let assignment = engine::fulfillment(degree, &self.schedule.taken_courses());
        let mut out = String::new();
        for template_name in assignment.names() {
            if let Some(status) = assignment.get(template_name) {
                out.push_str(&format!(
                    "{template_name}: {}/{} fulfilled\n",
                    status.actual(),
                    status.required()
                ));
                for course in status.fulfillment_set() {
                    out.push_str(&format!("    {course}\n"));
                }
            }
        }
        Ok(out)
    }

    fn cmd_degree(&self, args: &[String]) -> Result<String, EngineError> {
        let name = args.first().ok_or_else(|| EngineError::UnknownDegree(String::new()))?;
        let degree = self
            .catalog
            .degree(name)
            .ok_or_else(|| EngineError::UnknownDegree(name.clone()))?;
        let mut out = format!("{name}:\n");
        for template in degree.templates() {
            out.push_str(&format!("  {template}\n"));
        }
        Ok(out)
    }

    fn cmd_find(&self, args: &[String]) -> Result<String, EngineError> {
        let query = args.first().ok_or_else(|| EngineError::UnknownCommand("find".to_string()))?;
        let matches = self.catalog.search_by_name(query);
        if matches.is_empty() {
            return Ok(format!("no course matches '{query}'"));
        }
        Ok(candidate_prompt(&matches.into_iter().cloned().collect::<Vec<_>>()))
    }

    fn cmd_details(&mut self, args: &[String]) -> Result<String, EngineError> {
        let query = args.first().ok_or_else(|| EngineError::UnknownCommand("details".to_string()))?;
        match self.catalog.search_by_name(query).into_iter().cloned().collect::<Vec<_>>()[..] {
            [] => Ok(format!("no course matches '{query}'")),
            [ref only] => Ok(describe(only)),
            ref many => {
                let prompt = candidate_prompt(many);
                self.pending = Some(PendingCommand::Details {
                    candidates: many.to_vec(),
                });
                Ok(prompt)
            }
        }
    }

    fn cmd_import(&mut self) -> Result<String, EngineError> {
        let mut imported_courses = 0;
        if !self.catalog_file.is_empty() {
            let content = fs::read_to_string(&self.catalog_file).map_err(|e| EngineError::Io(e.to_string()))?;
            imported_courses = io::import_courses(&mut self.catalog, &content).map_err(EngineError::Json)?;
        }

        let mut imported_degrees = 0;
        if !self.degree_file.is_empty() {
            let content = fs::read_to_string(&self.degree_file).map_err(|e| EngineError::Io(e.to_string()))?;
            imported_degrees = io::import_degrees(&mut self.catalog, &content).map_err(EngineError::Json)?;
        }

        Ok(format!(
            "imported {imported_courses} course(s) and {imported_degrees} degree(s)"
        ))
    }
}

fn semester_and_name(args: &[String]) -> Result<(usize, &str), EngineError> {
    let semester_raw = args.first().ok_or_else(|| EngineError::BadSemesterIndex(String::new()))?;
    let name = args
        .get(1)
        .ok_or_else(|| EngineError::UnknownCommand("missing course name argument".to_string()))?;
    let semester = semester_raw
        .parse::<usize>()
        .map_err(|_| EngineError::BadSemesterIndex(semester_raw.clone()))?;
    Ok((semester, name.as_str()))
}

fn select(candidates: Vec<Course>, selection: usize) -> Result<Course, EngineError> {
    selection
        .checked_sub(1)
        .and_then(|i| candidates.into_iter().nth(i))
        .ok_or_else(|| EngineError::InvalidSelection(selection.to_string()))
}

fn candidate_prompt(candidates: &[Course]) -> String {
    let mut out = String::from("ambiguous course name; choose one:\n");
    for (i, c) in candidates.iter().enumerate() {
        out.push_str(&format!("  {}) {c}\n", i + 1));
    }
    out
}

fn describe(course: &Course) -> String {
    format!(
        "{} {} — {}",
        course.subject(),
        course.course_id(),
        course.name()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use degree_planner::core::models::degree::Degree;
    use degree_planner::core::models::template::{Replacement, Template};

    fn test_session() -> Session {
        let config = Config::from_defaults();
        let mut session = Session::new(&config);
        session.catalog.add_course(Course::new("CS", "1800", "Discrete Structures"));
        let mut degree = Degree::new("BSCS");
        degree.add_template(Template::new("core.math", vec![], Replacement::NonReplacement, 1, 0));
        session.catalog.add_degree(degree);
        session
    }

    #[test]
    fn add_then_print_shows_course_in_semester() {
        let mut session = test_session();
        let result = session.dispatch("add 0,Discrete Structures").unwrap();
        assert!(result.contains("added"));
        let printed = session.dispatch("print").unwrap();
        assert!(printed.contains("Discrete Structures"));
    }

    #[test]
    fn unknown_command_is_rejected() {
        let mut session = test_session();
        assert!(matches!(session.dispatch("frobnicate"), Err(EngineError::UnknownCommand(_))));
    }

    #[test]
    fn schedule_rejects_unknown_degree() {
        let mut session = test_session();
        assert!(matches!(session.dispatch("schedule NotADegree"), Err(EngineError::UnknownDegree(_))));
    }

    #[test]
    fn fulfillment_without_active_degree_errors() {
        let mut session = test_session();
        assert!(matches!(session.dispatch("fulfillment"), Err(EngineError::UnknownDegree(_))));
    }

    #[test]
    fn fulfillment_reports_template_status() {
        let mut session = test_session();
        session.dispatch("add 0,Discrete Structures").unwrap();
        session.dispatch("schedule BSCS").unwrap();
        let result = session.dispatch("fulfillment").unwrap();
        assert!(result.contains("core.math"));
    }
}
