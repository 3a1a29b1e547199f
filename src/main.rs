use clap::Parser;
use itertools::Itertools;
use java_clippy::Analyzer;
use java_clippy::checker::CheckerRegistry;
use java_clippy::cli::{Args, Command, LintArgs, OutputFormat};
use java_clippy::config;
use java_clippy::description::Description;
use java_clippy::fixer;
use java_clippy::level::Severity;
use java_clippy::suppression::AnnotationSuppressor;
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use walkdir::WalkDir;

fn main() -> ExitCode {
    let args = Args::parse();
    java_clippy::telemetry::init_tracing(args.verbose);
    match run(args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::from(2)
        }
    }
}

fn run(args: Args) -> anyhow::Result<ExitCode> {
    match args.command {
        Some(Command::ListChecks) => {
            list_checks();
            Ok(ExitCode::SUCCESS)
        }
        Some(Command::Explain { name }) => {
            explain_check(&name)?;
            Ok(ExitCode::SUCCESS)
        }
        Some(Command::Lint(lint)) => lint_command(lint),
        None => lint_command(args.lint),
    }
}

fn list_checks() {
    let registry = CheckerRegistry::all_checkers();
    for d in registry.descriptors().sorted_by_key(|d| d.name) {
        let fix_status = if d.fix.available {
            format!(" [fix: {}]", d.fix.safety.as_str())
        } else {
            String::new()
        };
        println!(
            "{}\t{}\t{}\t{}\t{}{}",
            d.name,
            d.category.as_str(),
            d.group.as_str(),
            d.severity.as_str(),
            d.summary,
            fix_status
        );
    }
}

fn explain_check(name: &str) -> anyhow::Result<()> {
    let Some(d) = CheckerRegistry::all_checkers().find_descriptor(name) else {
        anyhow::bail!("unknown checker: {name}");
    };

    println!("name: {}", d.name);
    if !d.alt_names.is_empty() {
        println!("also suppressed by: {}", d.alt_names.iter().join(", "));
    }
    println!("category: {}", d.category.as_str());
    println!("group: {}", d.group.as_str());
    println!("severity: {}", d.severity.as_str());
    println!("summary: {}", d.summary);
    if d.fix.available {
        println!("fix: available ({})", d.fix.safety.as_str());
        if !d.fix.description.is_empty() {
            println!("fix description: {}", d.fix.description);
        }
    } else {
        println!("fix: not available");
    }
    if !d.suppressible {
        println!("suppressible: no");
    }
    if let Some(link) = d.link {
        println!("link: {link}");
    }
    if !d.explanation.is_empty() {
        println!();
        println!("{}", d.explanation);
    }
    Ok(())
}

/// Load config and build an analyzer honoring `--only`, `--skip` and the
/// `[checks]`, `[flags]` and `[suppression]` tables.
fn build_analyzer(args: &LintArgs) -> anyhow::Result<Analyzer> {
    let start_dir = infer_start_dir(args)?;
    let cfg = config::load_config(args.config.as_deref(), &start_dir)?
        .map(|(_path, cfg)| cfg)
        .unwrap_or_default();

    let registry = CheckerRegistry::default_checkers_filtered(
        &args.only,
        &args.skip,
        &cfg.checks.disabled,
        // CLI flag takes precedence over config
        args.experimental || cfg.checks.experimental,
    )?;
    let suppressor = AnnotationSuppressor::from_config(&cfg.suppression)?;
    Ok(Analyzer::with_settings(registry, cfg.checker_settings()).with_suppressor(suppressor))
}

fn lint_command(args: LintArgs) -> anyhow::Result<ExitCode> {
    if args.fix {
        return fix_command(args);
    }

    let analyzer = build_analyzer(&args)?;
    let units = read_units(&args.paths)?;

    let mut total_diags = 0usize;
    let mut has_error = false;
    let mut json_out: Vec<JsonDiagnostic> = Vec::new();

    for (path, source) in &units {
        let diagnostics = analyze(&analyzer, path.as_deref(), source)?;
        let display = path
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<stdin>".to_string());

        total_diags += diagnostics.len();
        has_error |= diagnostics.iter().any(|d| d.severity == Severity::Error);

        match args.format {
            OutputFormat::Json => {
                json_out.extend(diagnostics.iter().map(|d| JsonDiagnostic {
                    file: display.clone(),
                    row: d.start.row,
                    column: d.start.column,
                    level: d.severity.as_str().to_string(),
                    check: d.check_name().to_string(),
                    message: d.message.clone(),
                    fixable: d.first_fix().is_some(),
                }));
            }
            OutputFormat::Pretty => {
                for d in &diagnostics {
                    println!(
                        "{}:{}:{}: {}: {}: {}",
                        display,
                        d.start.row,
                        d.start.column,
                        d.severity.as_str(),
                        d.check_name(),
                        d.message
                    );
                }
                println!("{} diagnostics for {}", diagnostics.len(), display);
            }
            OutputFormat::Github => {
                for d in &diagnostics {
                    let kind = if d.severity == Severity::Error
                        || (args.deny_warnings && d.severity == Severity::Warning)
                    {
                        "error"
                    } else {
                        "warning"
                    };
                    println!(
                        "::{} file={},line={},col={},title={}::{}",
                        kind,
                        github_escape(&display),
                        d.start.row,
                        d.start.column,
                        d.check_name(),
                        github_escape(&d.message)
                    );
                }
            }
        }
    }

    if args.format == OutputFormat::Json {
        json_out.sort_by(|a, b| {
            (a.file.as_str(), a.row, a.column, a.check.as_str())
                .cmp(&(b.file.as_str(), b.row, b.column, b.check.as_str()))
        });
        println!("{}", serde_json::to_string_pretty(&json_out)?);
    }

    if has_error || (args.deny_warnings && total_diags > 0) {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

#[derive(Debug, Serialize)]
struct JsonDiagnostic {
    file: String,
    row: usize,
    column: usize,
    level: String,
    check: String,
    message: String,
    fixable: bool,
}

/// Run the analyzer and report checker failures on stderr.
fn analyze(
    analyzer: &Analyzer,
    path: Option<&Path>,
    source: &str,
) -> anyhow::Result<Vec<Description>> {
    let outcome = analyzer
        .analyze_source(source, path)
        .map_err(|e| e.into_anyhow())?;
    for failure in &outcome.failures {
        eprintln!("{failure}");
    }
    Ok(outcome.descriptions)
}

/// Handle --fix mode: apply the first fix of each finding.
fn fix_command(args: LintArgs) -> anyhow::Result<ExitCode> {
    if args.paths.is_empty() {
        anyhow::bail!("--fix requires file paths (stdin not supported)");
    }

    let analyzer = build_analyzer(&args)?;
    let files = collect_java_files(&args.paths)?;
    let mut total_fixed = 0usize;
    let mut total_conflicting = 0usize;
    let mut total_unsafe = 0usize;
    let mut files_modified = 0usize;

    // Overlapping fixes are picked up by the next pass.
    const MAX_ITERATIONS: usize = 10;

    for path in &files {
        let original_source = std::fs::read_to_string(path)?;
        let mut current_source = original_source.clone();
        let mut file_fixes = 0usize;

        for iteration in 1..=MAX_ITERATIONS {
            let diagnostics = analyze(&analyzer, Some(path), &current_source)?;
            let result =
                fixer::apply_descriptions(&current_source, &diagnostics, args.unsafe_fixes)?;
            tracing::debug!(
                path = %path.display(),
                iteration,
                applied = result.fixes_applied,
                conflicting = result.fixes_conflicting,
                "fix pass"
            );

            if result.fixes_applied == 0 {
                total_unsafe += result.fixes_unsafe;
                total_conflicting += result.fixes_conflicting;
                break;
            }
            file_fixes += result.fixes_applied;
            current_source = result.fixed_source;

            if args.dry_run || result.fixes_conflicting == 0 {
                total_unsafe += result.fixes_unsafe;
                total_conflicting += result.fixes_conflicting;
                break;
            }
            if iteration == MAX_ITERATIONS {
                eprintln!(
                    "Warning: Max fix iterations ({}) reached for {}",
                    MAX_ITERATIONS,
                    path.display()
                );
            }
        }

        if file_fixes == 0 {
            continue;
        }
        if args.dry_run {
            let diff = fixer::format_diff(&original_source, &current_source, path);
            if !diff.is_empty() {
                println!("{diff}");
            }
        } else {
            std::fs::write(path, &current_source)?;
            files_modified += 1;
        }
        total_fixed += file_fixes;
    }

    if args.dry_run {
        println!(
            "\n{} fix(es) would be applied to {} file(s)",
            total_fixed,
            files.len()
        );
    } else {
        println!("Applied {total_fixed} fix(es) to {files_modified} file(s)");
    }
    if total_unsafe > 0 {
        println!("{total_unsafe} unsafe fix(es) skipped (use --unsafe-fixes to apply)");
    }
    if total_conflicting > 0 {
        println!("{total_conflicting} fix(es) skipped because they overlap another fix");
    }
    Ok(ExitCode::SUCCESS)
}

/// Sources to lint: every `.java` file under `paths`, or stdin when empty.
fn read_units(paths: &[PathBuf]) -> anyhow::Result<Vec<(Option<PathBuf>, String)>> {
    if paths.is_empty() {
        let mut source = String::new();
        std::io::stdin().read_to_string(&mut source)?;
        return Ok(vec![(None, source)]);
    }
    collect_java_files(paths)?
        .into_iter()
        .map(|p| {
            let source = std::fs::read_to_string(&p)?;
            Ok((Some(p), source))
        })
        .collect()
}

fn github_escape(s: &str) -> String {
    s.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn collect_java_files(paths: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for path in paths {
        if !path.is_dir() {
            std::fs::metadata(path)?;
            out.push(path.clone());
            continue;
        }
        let walker = WalkDir::new(path)
            .into_iter()
            .filter_entry(|e| !(e.file_type().is_dir() && should_skip_dir(e.path())));
        for entry in walker {
            let entry = entry?;
            if entry.file_type().is_file()
                && entry.path().extension().and_then(|e| e.to_str()) == Some("java")
            {
                out.push(entry.into_path());
            }
        }
    }

    out.sort();
    out.dedup();
    Ok(out)
}

fn should_skip_dir(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|s| s.to_str()) else {
        return false;
    };

    matches!(name, ".git" | "target" | "build" | "out")
}

fn infer_start_dir(args: &LintArgs) -> anyhow::Result<PathBuf> {
    let base = match args.paths.first() {
        Some(p) => p.clone(),
        None => std::env::current_dir()?,
    };

    let base = if base.is_file() {
        base.parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    } else {
        base
    };
    Ok(base)
}
