//! Course content: exercises and lessons
//!
//! Exercises live in one directory each:
//!
//! ```text
//! exercises/
//!   button-basic/
//!     meta.json      required, the exercise does not exist without it
//!     initial.tsx    starting code
//!     solution.tsx   reference solution
//!     tests.tsx      test suite run against the student's code
//! ```
//!
//! Lessons are MDX files with a `---` frontmatter block, grouped by locale
//! and module: `modules/<locale>/<module>/<lesson>.mdx`.

use std::collections::BTreeMap;
use std::env;
use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use tracing::debug;

use crate::curriculum::MODULES;
use crate::error::{ContentError, Result};
use crate::locale::{Locale, Localized};

pub const EXERCISES_DIR_ENV: &str = "CONTENT_EXERCISES_DIR";
pub const MODULES_DIR_ENV: &str = "CONTENT_MODULES_DIR";

const META_FILE: &str = "meta.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }
}

/// Contents of `meta.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseMeta {
    pub id: String,
    pub title: Localized<String>,
    pub difficulty: Difficulty,
    /// Module slug, e.g. `01-primitives`
    pub module: String,
    pub order: u32,
    pub hints: Localized<Vec<String>>,
    /// Extra npm packages for the sandbox, name to version range
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseFiles {
    pub initial: String,
    pub solution: String,
    pub tests: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub meta: ExerciseMeta,
    pub files: ExerciseFiles,
}

impl Exercise {
    pub fn hints(&self, locale: Locale) -> &[String] {
        self.meta.hints.get(locale)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonMeta {
    pub slug: String,
    pub module_slug: String,
    pub title: String,
    pub description: String,
    pub order: u32,
    pub is_free: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    #[serde(flatten)]
    pub meta: LessonMeta,
    /// MDX body after the frontmatter block
    pub content: String,
}

/// Read access to course content
pub trait ContentLoader {
    /// `Ok(None)` when the exercise has no `meta.json`
    fn exercise(&self, id: &str) -> Result<Option<Exercise>>;

    /// Ids of every exercise, sorted by module then order
    fn exercise_ids(&self) -> Result<Vec<String>>;

    /// Exercises of one module, sorted by order
    fn exercises_for_module(&self, module: &str) -> Result<Vec<ExerciseMeta>>;

    fn lesson(&self, module: &str, lesson: &str, locale: Locale) -> Result<Option<Lesson>>;

    /// Lesson metadata of one module, sorted by order. Empty when the module
    /// has no lessons in this locale.
    fn lessons_for_module(&self, module: &str, locale: Locale) -> Result<Vec<LessonMeta>>;
}

fn slug_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("valid slug regex"))
}

/// Exercise ids, module slugs and lesson slugs are lowercase words joined by `-`
pub fn validate_slug(slug: &str) -> Result<()> {
    if slug_pattern().is_match(slug) {
        Ok(())
    } else {
        Err(ContentError::InvalidId(slug.to_string()))
    }
}

/// Loads content from the two content roots on disk
#[derive(Debug, Clone)]
pub struct FsContentLoader {
    exercises_dir: PathBuf,
    modules_dir: PathBuf,
}

impl FsContentLoader {
    pub fn new(exercises_dir: impl Into<PathBuf>, modules_dir: impl Into<PathBuf>) -> Self {
        Self {
            exercises_dir: exercises_dir.into(),
            modules_dir: modules_dir.into(),
        }
    }

    /// Like [`new`](Self::new), but `CONTENT_EXERCISES_DIR` and
    /// `CONTENT_MODULES_DIR` take precedence when set
    pub fn from_env_or(exercises_dir: impl Into<PathBuf>, modules_dir: impl Into<PathBuf>) -> Self {
        Self::new(
            resolve_dir(env::var_os(EXERCISES_DIR_ENV), exercises_dir.into()),
            resolve_dir(env::var_os(MODULES_DIR_ENV), modules_dir.into()),
        )
    }

    pub fn exercises_dir(&self) -> &Path {
        &self.exercises_dir
    }

    pub fn modules_dir(&self) -> &Path {
        &self.modules_dir
    }

    /// Names of exercise directories that contain a `meta.json`, sorted by name
    pub fn exercise_dirs(&self) -> Result<Vec<String>> {
        let mut dirs: Vec<String> = list_dir(&self.exercises_dir)?
            .into_iter()
            .filter(|(path, _)| path.join(META_FILE).is_file())
            .map(|(_, name)| name)
            .collect();
        dirs.sort();
        Ok(dirs)
    }

    /// Parse the `meta.json` of one exercise directory
    pub fn read_meta(&self, dir: &str) -> Result<ExerciseMeta> {
        let path = self.exercises_dir.join(dir).join(META_FILE);
        let raw = fs::read_to_string(&path).map_err(|e| ContentError::io(&path, e))?;
        serde_json::from_str(&raw).map_err(|source| ContentError::Json { path, source })
    }

    /// Module directories present for a locale, sorted by name
    pub fn module_slugs(&self, locale: Locale) -> Result<Vec<String>> {
        let mut slugs: Vec<String> = list_dir(&self.modules_dir.join(locale.as_str()))?
            .into_iter()
            .filter(|(path, _)| path.is_dir())
            .map(|(_, name)| name)
            .collect();
        slugs.sort();
        Ok(slugs)
    }

    /// `(module, lesson)` pairs for every curriculum module in a locale
    pub fn lesson_slugs(&self, locale: Locale) -> Result<Vec<(String, String)>> {
        let mut pairs = Vec::new();
        for module in MODULES {
            for lesson in self.lesson_files(module.slug, locale)? {
                pairs.push((module.slug.to_string(), lesson));
            }
        }
        Ok(pairs)
    }

    fn metas(&self) -> Result<Vec<(String, ExerciseMeta)>> {
        self.exercise_dirs()?
            .into_iter()
            .map(|dir| self.read_meta(&dir).map(|meta| (dir, meta)))
            .collect()
    }

    fn module_dir(&self, module: &str, locale: Locale) -> PathBuf {
        self.modules_dir.join(locale.as_str()).join(module)
    }

    /// Lesson slugs (file stems) of `.mdx` files in a module, sorted by name
    fn lesson_files(&self, module: &str, locale: Locale) -> Result<Vec<String>> {
        let mut slugs: Vec<String> = list_dir(&self.module_dir(module, locale))?
            .into_iter()
            .filter_map(|(_, name)| name.strip_suffix(".mdx").map(str::to_string))
            .collect();
        slugs.sort();
        Ok(slugs)
    }

    fn read_lesson(&self, module: &str, slug: &str, locale: Locale) -> Result<Option<Lesson>> {
        let path = self.module_dir(module, locale).join(format!("{slug}.mdx"));
        let Some(raw) = read_optional(&path)? else {
            return Ok(None);
        };
        let (frontmatter, content) = parse_frontmatter(&raw, &path)?;
        Ok(Some(Lesson {
            meta: LessonMeta {
                slug: slug.to_string(),
                module_slug: module.to_string(),
                title: frontmatter.title,
                description: frontmatter.description,
                order: frontmatter.order,
                is_free: frontmatter.is_free,
            },
            content: content.to_string(),
        }))
    }
}

impl ContentLoader for FsContentLoader {
    fn exercise(&self, id: &str) -> Result<Option<Exercise>> {
        validate_slug(id)?;
        let dir = self.exercises_dir.join(id);
        if !dir.join(META_FILE).is_file() {
            debug!(id, "exercise not found");
            return Ok(None);
        }

        let meta = self.read_meta(id)?;
        let read = |name: &str| -> Result<String> {
            Ok(read_optional(&dir.join(name))?.unwrap_or_default())
        };
        let files = ExerciseFiles {
            initial: read("initial.tsx")?,
            solution: read("solution.tsx")?,
            tests: read("tests.tsx")?,
        };
        Ok(Some(Exercise { meta, files }))
    }

    fn exercise_ids(&self) -> Result<Vec<String>> {
        let mut metas = self.metas()?;
        metas.sort_by(|(_, a), (_, b)| a.module.cmp(&b.module).then(a.order.cmp(&b.order)));
        Ok(metas.into_iter().map(|(dir, _)| dir).collect())
    }

    fn exercises_for_module(&self, module: &str) -> Result<Vec<ExerciseMeta>> {
        let mut metas: Vec<ExerciseMeta> = self
            .metas()?
            .into_iter()
            .map(|(_, meta)| meta)
            .filter(|meta| meta.module == module)
            .collect();
        metas.sort_by_key(|meta| meta.order);
        Ok(metas)
    }

    fn lesson(&self, module: &str, lesson: &str, locale: Locale) -> Result<Option<Lesson>> {
        validate_slug(module)?;
        validate_slug(lesson)?;
        self.read_lesson(module, lesson, locale)
    }

    fn lessons_for_module(&self, module: &str, locale: Locale) -> Result<Vec<LessonMeta>> {
        validate_slug(module)?;
        let mut lessons = Vec::new();
        for slug in self.lesson_files(module, locale)? {
            if let Some(lesson) = self.read_lesson(module, &slug, locale)? {
                lessons.push(lesson.meta);
            }
        }
        lessons.sort_by_key(|lesson| lesson.order);
        Ok(lessons)
    }
}

fn resolve_dir(override_value: Option<OsString>, fallback: PathBuf) -> PathBuf {
    match override_value {
        Some(value) if !value.is_empty() => PathBuf::from(value),
        _ => fallback,
    }
}

/// `(path, file name)` of each entry. A missing directory lists as empty.
fn list_dir(dir: &Path) -> Result<Vec<(PathBuf, String)>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(ContentError::io(dir, e)),
    };

    let mut out = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ContentError::io(dir, e))?;
        if let Ok(name) = entry.file_name().into_string() {
            out.push((entry.path(), name));
        }
    }
    Ok(out)
}

fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(raw) => Ok(Some(raw)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ContentError::io(path, e)),
    }
}

#[derive(Debug, Deserialize)]
struct LessonFrontmatter {
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    order: u32,
    #[serde(default, rename = "isFree")]
    is_free: bool,
}

fn frontmatter_line() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\s*:\s*(.*?)\s*$").expect("valid frontmatter regex")
    })
}

/// Split `---`-delimited frontmatter from the body and deserialize it
///
/// Only flat `key: value` pairs are supported. Values are strings (quoted or
/// bare), integers, floats or booleans.
fn parse_frontmatter<'a>(raw: &'a str, path: &Path) -> Result<(LessonFrontmatter, &'a str)> {
    let error = |message: String| ContentError::Frontmatter {
        path: path.to_path_buf(),
        message,
    };

    let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let rest = raw
        .strip_prefix("---\r\n")
        .or_else(|| raw.strip_prefix("---\n"))
        .ok_or_else(|| error("missing frontmatter block".into()))?;

    let mut map = Map::new();
    let mut body = None;
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        offset += line.len();
        let trimmed = line.trim();
        if trimmed == "---" {
            body = Some(&rest[offset..]);
            break;
        }
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let caps = frontmatter_line()
            .captures(trimmed)
            .ok_or_else(|| error(format!("unsupported line {trimmed:?}")))?;
        map.insert(caps[1].to_string(), scalar(&caps[2]));
    }

    let body = body.ok_or_else(|| error("unterminated frontmatter block".into()))?;
    let frontmatter =
        serde_json::from_value(Value::Object(map)).map_err(|e| error(e.to_string()))?;
    Ok((frontmatter, body))
}

fn scalar(value: &str) -> Value {
    let unquoted = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .map(|v| v.replace("\\\"", "\""))
        .or_else(|| {
            value
                .strip_prefix('\'')
                .and_then(|v| v.strip_suffix('\''))
                .map(|v| v.replace("''", "'"))
        });
    if let Some(text) = unquoted {
        return Value::String(text);
    }

    match value {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        "" | "null" | "~" => return Value::Null,
        _ => {}
    }
    if let Ok(n) = value.parse::<i64>() {
        return Value::Number(n.into());
    }
    if let Some(n) = value.parse::<f64>().ok().and_then(Number::from_f64) {
        return Value::Number(n);
    }
    Value::String(value.to_string())
}
