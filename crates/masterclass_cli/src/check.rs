//! Check command - validate course content
//!
//! Walks every exercise directory and every lesson and reports problems the
//! site would otherwise hit at request time.

use masterclass_exercise::{
    curriculum, validate_slug, ContentLoader, FsContentLoader, Locale, MODULES,
};
use tracing::{debug, warn};

// ANSI color codes
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const RED: &str = "\x1b[31m";
    pub const BOLD: &str = "\x1b[1m";
    pub const CYAN: &str = "\x1b[36m";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

/// Result of a single check
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
}

impl CheckResult {
    fn ok(name: &str, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.into(),
        }
    }

    fn warning(name: &str, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.into(),
        }
    }

    fn error(name: &str, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.into(),
        }
    }

    pub fn colored_icon(&self) -> String {
        match self.status {
            CheckStatus::Ok => format!("{}✓{}", colors::GREEN, colors::RESET),
            CheckStatus::Warning => format!("{}!{}", colors::YELLOW, colors::RESET),
            CheckStatus::Error => format!("{}✗{}", colors::RED, colors::RESET),
        }
    }
}

/// Category of checks
pub struct CheckCategory {
    pub name: String,
    pub checks: Vec<CheckResult>,
}

impl CheckCategory {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            checks: Vec::new(),
        }
    }

    fn add(&mut self, check: CheckResult) {
        match check.status {
            CheckStatus::Error => warn!(check = %check.name, "{}", check.message),
            _ => debug!(check = %check.name, "{}", check.message),
        }
        self.checks.push(check);
    }

    pub fn count(&self, status: CheckStatus) -> usize {
        self.checks.iter().filter(|c| c.status == status).count()
    }

    pub fn status(&self) -> CheckStatus {
        if self.count(CheckStatus::Error) > 0 {
            CheckStatus::Error
        } else if self.count(CheckStatus::Warning) > 0 {
            CheckStatus::Warning
        } else {
            CheckStatus::Ok
        }
    }
}

pub fn run_checks(loader: &FsContentLoader, locale: Locale) -> Vec<CheckCategory> {
    vec![check_exercises(loader, locale), check_lessons(loader)]
}

fn check_exercises(loader: &FsContentLoader, locale: Locale) -> CheckCategory {
    let mut category = CheckCategory::new("Exercises");

    let dirs = match loader.exercise_dirs() {
        Ok(dirs) => dirs,
        Err(e) => {
            category.add(CheckResult::error("exercises", e.to_string()));
            return category;
        }
    };
    if dirs.is_empty() {
        category.add(CheckResult::warning(
            "exercises",
            format!("no exercises in {}", loader.exercises_dir().display()),
        ));
    }

    for dir in &dirs {
        let problems = exercise_problems(loader, dir, locale);
        if problems.is_empty() {
            category.add(CheckResult::ok(dir, "ok"));
        }
        for problem in problems {
            category.add(problem);
        }
    }
    category
}

fn exercise_problems(loader: &FsContentLoader, dir: &str, locale: Locale) -> Vec<CheckResult> {
    let mut problems = Vec::new();

    if validate_slug(dir).is_err() {
        problems.push(CheckResult::error(
            dir,
            "directory name is not a valid id (lowercase words joined by '-')",
        ));
        return problems;
    }

    let meta = match loader.read_meta(dir) {
        Ok(meta) => meta,
        Err(e) => {
            problems.push(CheckResult::error(dir, e.to_string()));
            return problems;
        }
    };

    if meta.id != dir {
        problems.push(CheckResult::error(
            dir,
            format!("meta.json id {:?} does not match directory", meta.id),
        ));
    }

    if curriculum::module(&meta.module).is_none() {
        problems.push(CheckResult::error(
            dir,
            format!("unknown module {:?}", meta.module),
        ));
    } else {
        match loader.module_slugs(locale) {
            Ok(slugs) if !slugs.contains(&meta.module) => problems.push(CheckResult::error(
                dir,
                format!("module {:?} has no lesson directory for {locale}", meta.module),
            )),
            Ok(_) => {}
            Err(e) => problems.push(CheckResult::error(dir, e.to_string())),
        }
    }

    match loader.exercise(dir) {
        Ok(Some(exercise)) => {
            if exercise.files.solution.trim().is_empty() {
                problems.push(CheckResult::error(dir, "solution.tsx is missing or empty"));
            }
            if exercise.files.tests.trim().is_empty() {
                problems.push(CheckResult::error(dir, "tests.tsx is missing or empty"));
            }
            if exercise.files.initial.trim().is_empty() {
                problems.push(CheckResult::warning(dir, "initial.tsx is missing or empty"));
            }
        }
        Ok(None) => problems.push(CheckResult::error(dir, "meta.json disappeared")),
        Err(e) => problems.push(CheckResult::error(dir, e.to_string())),
    }

    if meta.hints.ja.is_none() || meta.title.ja.is_none() {
        problems.push(CheckResult::warning(dir, "missing Japanese title or hints"));
    }

    problems
}

fn check_lessons(loader: &FsContentLoader) -> CheckCategory {
    let mut category = CheckCategory::new("Lessons");

    for locale in Locale::ALL {
        match loader.module_slugs(locale) {
            Ok(slugs) => {
                for slug in slugs {
                    if curriculum::module(&slug).is_none() {
                        category.add(CheckResult::warning(
                            &format!("{locale}/{slug}"),
                            "directory is not a curriculum module",
                        ));
                    }
                }
            }
            Err(e) => category.add(CheckResult::error(locale.as_str(), e.to_string())),
        }

        for module in MODULES {
            let name = format!("{locale}/{}", module.slug);
            match loader.lessons_for_module(module.slug, locale) {
                Ok(lessons) if lessons.is_empty() => {
                    category.add(CheckResult::warning(&name, "no lessons"))
                }
                Ok(lessons) => {
                    category.add(CheckResult::ok(&name, format!("{} lessons", lessons.len())))
                }
                Err(e) => category.add(CheckResult::error(&name, e.to_string())),
            }
        }
    }
    category
}

pub fn print_check_results(categories: &[CheckCategory]) {
    println!(
        "{}{}Masterclass Content Check{}",
        colors::BOLD,
        colors::CYAN,
        colors::RESET
    );
    println!("=========================");
    println!();

    for category in categories {
        println!("{}{}{}", colors::BOLD, category.name, colors::RESET);
        for check in &category.checks {
            if check.status == CheckStatus::Ok {
                continue;
            }
            println!("    [{}] {}: {}", check.colored_icon(), check.name, check.message);
        }
        println!(
            "    {} ok, {} warnings, {} errors",
            category.count(CheckStatus::Ok),
            category.count(CheckStatus::Warning),
            category.count(CheckStatus::Error)
        );
        println!();
    }
}

pub fn error_count(categories: &[CheckCategory]) -> usize {
    categories
        .iter()
        .map(|c| c.count(CheckStatus::Error))
        .sum()
}
