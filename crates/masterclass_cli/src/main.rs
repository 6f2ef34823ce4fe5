//! Masterclass CLI
//!
//! Inspect and validate course content, and summarize test-runner reports.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use masterclass_exercise::{ContentLoader, Locale, SummaryStatus, TestReport};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod check;
mod config;

use config::MasterclassConfig;

#[derive(Parser)]
#[command(name = "masterclass")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Base UI Masterclass content tooling", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory containing masterclass.toml
    #[arg(short, long, global = true, default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List exercises, sorted by module and order
    Exercises {
        /// Only exercises of this module (e.g. 01-primitives)
        #[arg(short, long)]
        module: Option<String>,

        /// Locale for titles (en, ja)
        #[arg(short, long)]
        locale: Option<String>,
    },

    /// Show one exercise
    Show {
        /// Exercise id (e.g. button-basic)
        id: String,

        /// Locale for title and hints (en, ja)
        #[arg(short, long)]
        locale: Option<String>,
    },

    /// List the lessons of a module
    Lessons {
        /// Module slug (e.g. 00-foundation)
        module: String,

        /// Lesson locale (en, ja)
        #[arg(short, long)]
        locale: Option<String>,
    },

    /// Validate all course content
    Check,

    /// Summarize a test-runner JSON report
    Report {
        /// Report file
        file: PathBuf,
    },

    /// Print the resolved configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let config = MasterclassConfig::load_from_dir(&cli.root)?;

    match cli.command {
        Commands::Exercises { module, locale } => {
            cmd_exercises(&cli.root, &config, module.as_deref(), locale.as_deref())
        }

        Commands::Show { id, locale } => cmd_show(&cli.root, &config, &id, locale.as_deref()),

        Commands::Lessons { module, locale } => {
            cmd_lessons(&cli.root, &config, &module, locale.as_deref())
        }

        Commands::Check => cmd_check(&cli.root, &config),

        Commands::Report { file } => cmd_report(&file),

        Commands::Config => cmd_config(&config),
    }
}

fn resolve_locale(config: &MasterclassConfig, locale: Option<&str>) -> Result<Locale> {
    match locale {
        Some(l) => Ok(l.parse()?),
        None => Ok(config.content.default_locale),
    }
}

fn cmd_exercises(
    root: &Path,
    config: &MasterclassConfig,
    module: Option<&str>,
    locale: Option<&str>,
) -> Result<()> {
    let locale = resolve_locale(config, locale)?;
    let loader = config.content_loader(root);

    let metas = match module {
        Some(module) => loader
            .exercises_for_module(module)
            .with_context(|| format!("Failed to list exercises of {module}"))?,
        None => {
            let mut metas = Vec::new();
            for id in loader.exercise_ids().context("Failed to list exercises")? {
                metas.push(loader.read_meta(&id)?);
            }
            metas
        }
    };

    info!("{} exercises in {}", metas.len(), loader.exercises_dir().display());

    let mut current_module = None;
    for meta in &metas {
        if current_module != Some(&meta.module) {
            println!("{}", meta.module);
            current_module = Some(&meta.module);
        }
        println!(
            "  {:<24} {:<13} {}",
            meta.id,
            meta.difficulty.as_str(),
            meta.title.get(locale)
        );
    }

    Ok(())
}

fn cmd_show(root: &Path, config: &MasterclassConfig, id: &str, locale: Option<&str>) -> Result<()> {
    let locale = resolve_locale(config, locale)?;
    let loader = config.content_loader(root);

    let Some(exercise) = loader
        .exercise(id)
        .with_context(|| format!("Failed to load exercise {id}"))?
    else {
        anyhow::bail!(
            "Exercise '{}' not found in {}",
            id,
            loader.exercises_dir().display()
        );
    };
    let meta = &exercise.meta;

    println!("{} ({})", meta.title.get(locale), meta.id);
    println!("  module:     {}", meta.module);
    println!("  order:      {}", meta.order);
    println!("  difficulty: {}", meta.difficulty.as_str());
    println!();

    let hints = exercise.hints(locale);
    println!("Hints ({}):", hints.len());
    for (i, hint) in hints.iter().enumerate() {
        println!("  {}. {}", i + 1, hint);
    }
    println!();

    if !meta.dependencies.is_empty() {
        println!("Dependencies:");
        for (name, version) in &meta.dependencies {
            println!("  {name} {version}");
        }
        println!();
    }

    println!("Files:");
    for (name, code) in [
        ("initial.tsx", &exercise.files.initial),
        ("solution.tsx", &exercise.files.solution),
        ("tests.tsx", &exercise.files.tests),
    ] {
        println!(
            "  {:<13} {:>6} bytes {:>4} lines",
            name,
            code.len(),
            code.lines().count()
        );
    }

    Ok(())
}

fn cmd_lessons(
    root: &Path,
    config: &MasterclassConfig,
    module: &str,
    locale: Option<&str>,
) -> Result<()> {
    let locale = resolve_locale(config, locale)?;
    let loader = config.content_loader(root);

    let lessons = loader
        .lessons_for_module(module, locale)
        .with_context(|| format!("Failed to read lessons of {module} ({locale})"))?;

    if lessons.is_empty() {
        anyhow::bail!(
            "No lessons for module '{}' in {}",
            module,
            loader.modules_dir().join(locale.as_str()).display()
        );
    }

    for lesson in &lessons {
        println!(
            "{:>3}  {:<28} {}{}",
            lesson.order,
            lesson.slug,
            lesson.title,
            if lesson.is_free { "  [free]" } else { "" }
        );
        if !lesson.description.is_empty() {
            println!("     {:<28} {}", "", lesson.description);
        }
    }

    Ok(())
}

fn cmd_check(root: &Path, config: &MasterclassConfig) -> Result<()> {
    let loader = config.content_loader(root);
    info!(
        "Checking {} and {}",
        loader.exercises_dir().display(),
        loader.modules_dir().display()
    );

    let categories = check::run_checks(&loader, config.content.default_locale);
    check::print_check_results(&categories);

    let errors = check::error_count(&categories);
    if errors > 0 {
        anyhow::bail!("{} content problem(s) found", errors);
    }

    Ok(())
}

fn cmd_report(file: &Path) -> Result<()> {
    let raw = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let report = TestReport::from_json(&raw)
        .with_context(|| format!("Failed to parse {}", file.display()))?;

    let summary = report.summary();
    for failure in report.failures() {
        println!("✗ {}", failure.title());
        for error in &failure.test.errors {
            println!("    {error}");
        }
    }

    println!(
        "{} passed, {} failed, {} skipped",
        summary.passed, summary.failed, summary.skipped
    );

    match summary.status {
        SummaryStatus::Pass => Ok(()),
        SummaryStatus::Fail => anyhow::bail!("{} test(s) failed", summary.failed),
        SummaryStatus::Idle => anyhow::bail!("No tests ran"),
    }
}

fn cmd_config(config: &MasterclassConfig) -> Result<()> {
    let rendered = toml::to_string_pretty(config).context("Failed to render configuration")?;
    print!("{rendered}");
    Ok(())
}
