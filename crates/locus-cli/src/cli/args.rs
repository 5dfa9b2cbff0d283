use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "locus",
    version,
    about = "Locate resource files through a memoizing resolver"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Locate a resource under one or more root directories
    Locate(LocateArgs),
    /// Print the effective cache policy
    Policy(PolicyArgs),
}

#[derive(Parser, Debug)]
pub struct LocateArgs {
    /// Resource path relative to the scope directory (absolute when it starts with '/')
    pub path: String,

    /// Root directory to search (repeatable, searched in order)
    #[arg(long = "root", required = true)]
    pub roots: Vec<PathBuf>,

    /// Scope the path is relative to, e.g. app::pages::Home
    #[arg(long)]
    pub scope: String,

    #[arg(long)]
    pub style: Option<String>,

    #[arg(long)]
    pub variation: Option<String>,

    /// Locale such as de_CH
    #[arg(long)]
    pub locale: Option<String>,

    /// Extension or comma-separated extensions (default: taken from PATH)
    #[arg(long)]
    pub extension: Option<String>,

    /// Do not fall back to less specific names
    #[arg(long)]
    pub strict: bool,

    /// Resolve the request this many times (later lookups hit the cache)
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub repeat: u32,

    #[command(flatten)]
    pub policy: PolicySource,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Parser, Debug)]
pub struct PolicyArgs {
    #[command(flatten)]
    pub policy: PolicySource,
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct PolicySource {
    /// YAML cache policy file (default: LOCUS_CACHE_* environment variables)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_locate() {
        let cli = Cli::try_parse_from([
            "locus",
            "locate",
            "Home.html",
            "--root",
            "a",
            "--root",
            "b",
            "--scope",
            "app::Home",
            "--locale",
            "de_CH",
            "--repeat",
            "3",
            "--format",
            "json",
        ])
        .unwrap();

        let Command::Locate(args) = cli.cmd else {
            panic!("expected locate");
        };
        assert_eq!(args.path, "Home.html");
        assert_eq!(args.roots, vec![PathBuf::from("a"), PathBuf::from("b")]);
        assert_eq!(args.locale.as_deref(), Some("de_CH"));
        assert_eq!(args.repeat, 3);
        assert_eq!(args.format, OutputFormat::Json);
        assert!(!args.strict);
    }

    #[test]
    fn test_locate_requires_root() {
        let result = Cli::try_parse_from(["locus", "locate", "Home.html", "--scope", "s"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_repeat_must_be_positive() {
        let result = Cli::try_parse_from([
            "locus", "locate", "x", "--root", "r", "--scope", "s", "--repeat", "0",
        ]);
        assert!(result.is_err());
    }
}
