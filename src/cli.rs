use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Java Clippy CLI options.
#[derive(Debug, Parser)]
#[command(
    name = "java-clippy",
    version,
    about = "Find common bug patterns in Java source",
    args_conflicts_with_subcommands = true,
    subcommand_precedence_over_arg = true
)]
pub struct Args {
    /// Log at debug level unless `RUST_LOG` says otherwise.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub lint: LintArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check files or directories.
    Lint(LintArgs),

    /// List available checkers.
    ListChecks,

    /// Explain a checker.
    Explain {
        /// Checker name or alternative name.
        name: String,
    },
}

#[derive(Debug, Clone, ClapArgs)]
pub struct LintArgs {
    /// Files/directories to check. Defaults to stdin when absent.
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub format: OutputFormat,

    /// Only run these checkers (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<String>,

    /// Skip these checkers (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub skip: Vec<String>,

    /// Exit with code 1 if any findings are emitted.
    #[arg(long)]
    pub deny_warnings: bool,

    /// Apply the first suggested fix of each finding.
    #[arg(long)]
    pub fix: bool,

    /// With `--fix`, print a diff instead of writing files.
    #[arg(long, requires = "fix")]
    pub dry_run: bool,

    /// With `--fix`, also apply fixes that may change behavior.
    #[arg(long, requires = "fix")]
    pub unsafe_fixes: bool,

    /// Path to `java-clippy.toml`; discovered from the first PATH otherwise.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable experimental checkers.
    #[arg(long)]
    pub experimental: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Pretty,
    Json,
    Github,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_paths_mean_lint() {
        let args = Args::parse_from(["java-clippy", "src", "--only", "SelfEquals,AlreadyChecked"]);
        assert!(args.command.is_none());
        assert_eq!(args.lint.paths, vec![PathBuf::from("src")]);
        assert_eq!(args.lint.only, vec!["SelfEquals", "AlreadyChecked"]);
    }

    #[test]
    fn dry_run_requires_fix() {
        assert!(Args::try_parse_from(["java-clippy", "--dry-run", "A.java"]).is_err());
        let args = Args::try_parse_from(["java-clippy", "lint", "--fix", "--dry-run", "A.java"])
            .unwrap();
        let Some(Command::Lint(lint)) = args.command else {
            panic!("expected lint subcommand");
        };
        assert!(lint.fix && lint.dry_run);
    }

    #[test]
    fn explain_takes_a_name() {
        let args = Args::parse_from(["java-clippy", "explain", "MissingOverride"]);
        assert!(matches!(
            args.command,
            Some(Command::Explain { name }) if name == "MissingOverride"
        ));
    }
}
