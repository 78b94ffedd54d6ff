#![forbid(unsafe_code)]

//! Command-line argument parsing.
//!
//! Arguments are parsed by hand. `MARKLENS_*` environment variables are
//! applied first and explicit flags override them.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use marklens_core::{DEFAULT_DATA_PATH, DEFAULT_SEARCH_DEBOUNCE};

const VERSION: &str = env!("CARGO_PKG_VERSION");

const HELP_TEXT: &str = "\
marklens: browse a categorised bookmark export in the terminal

USAGE:
    marklens [OPTIONS]

OPTIONS:
    --data=PATH          Bookmark dataset (default: bookmarks_data.json)
    --view=VIEW          Start in 'cards' (default) or 'aggregate'
    --no-graph           Disable the force layout; the overview uses bars
    --no-links           Do not emit OSC 8 hyperlinks
    --debounce-ms=N      Search debounce window in ms (default: 300)
    --no-mouse           Disable mouse event capture
    --log-file=PATH      Write logs to PATH (filter with MARKLENS_LOG)
    --help, -h           Show this help message
    --version, -V        Show version

KEYBINDINGS:
    /               Focus search
    Esc             Leave search / close detail
    Tab             Toggle cards / category overview
    g               Toggle graph / bar overview
    j/k, Up/Down    Move in the category list
    Enter           Select highlighted category
    h/l             Move card focus
    i               Category detail
    y               Copy bookmark URL
    +/-, 0          Zoom / reset graph
    q / Ctrl+C      Quit

ENVIRONMENT VARIABLES:
    MARKLENS_DATA               Override --data
    MARKLENS_VIEW               Override --view
    MARKLENS_NO_GRAPH           Any value disables the force layout
    MARKLENS_NO_LINKS           Any value disables hyperlinks
    MARKLENS_DEBOUNCE_MS        Override --debounce-ms
    MARKLENS_LOG_FILE           Override --log-file
    MARKLENS_LOG                Log filter (default: info)
    MARKLENS_CLIPBOARD_BACKEND  osc52|macos|windows|wayland|x11|none";

/// Which main view is showing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StartView {
    #[default]
    Cards,
    Aggregate,
}

impl StartView {
    fn parse(val: &str) -> Option<Self> {
        match val {
            "cards" => Some(Self::Cards),
            "aggregate" => Some(Self::Aggregate),
            _ => None,
        }
    }
}

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opts {
    pub data: PathBuf,
    pub view: StartView,
    /// Force layout enabled.
    pub graph: bool,
    pub hyperlinks: bool,
    pub debounce: Duration,
    pub mouse: bool,
    pub log_file: Option<PathBuf>,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            data: PathBuf::from(DEFAULT_DATA_PATH),
            view: StartView::Cards,
            graph: true,
            hyperlinks: true,
            debounce: DEFAULT_SEARCH_DEBOUNCE,
            mouse: true,
            log_file: None,
        }
    }
}

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Run(Opts),
    Help,
    Version,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliError {
    InvalidValue { flag: &'static str, value: String },
    UnknownArgument(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidValue { flag, value } => write!(f, "Invalid {flag} value: {value}"),
            Self::UnknownArgument(arg) => write!(f, "Unknown argument: {arg}"),
        }
    }
}

impl std::error::Error for CliError {}

impl Opts {
    /// Parse the process arguments and environment, printing help or version
    /// and exiting when asked to, or on invalid input.
    pub fn parse() -> Self {
        let args: Vec<String> = env::args().skip(1).collect();
        match parse_from(&args, |key| env::var(key).ok()) {
            Ok(Outcome::Run(opts)) => opts,
            Ok(Outcome::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Ok(Outcome::Version) => {
                println!("marklens {VERSION}");
                process::exit(0);
            }
            Err(err) => {
                eprintln!("{err}");
                if matches!(err, CliError::UnknownArgument(_)) {
                    eprintln!("Run with --help for usage information.");
                }
                process::exit(1);
            }
        }
    }
}

/// Parse `args` (without the program name) with `env` as the environment.
///
/// Unparseable environment values are ignored; unparseable flag values are
/// errors.
pub fn parse_from(
    args: &[String],
    env: impl Fn(&str) -> Option<String>,
) -> Result<Outcome, CliError> {
    let mut opts = Opts::default();

    if let Some(val) = env("MARKLENS_DATA") {
        opts.data = PathBuf::from(val);
    }
    if let Some(val) = env("MARKLENS_VIEW")
        && let Some(view) = StartView::parse(&val)
    {
        opts.view = view;
    }
    if env("MARKLENS_NO_GRAPH").is_some() {
        opts.graph = false;
    }
    if env("MARKLENS_NO_LINKS").is_some() {
        opts.hyperlinks = false;
    }
    if let Some(val) = env("MARKLENS_DEBOUNCE_MS")
        && let Ok(ms) = val.parse()
    {
        opts.debounce = Duration::from_millis(ms);
    }
    if let Some(val) = env("MARKLENS_LOG_FILE") {
        opts.log_file = Some(PathBuf::from(val));
    }

    for arg in args {
        match arg.as_str() {
            "--help" | "-h" => return Ok(Outcome::Help),
            "--version" | "-V" => return Ok(Outcome::Version),
            "--no-graph" => opts.graph = false,
            "--no-links" => opts.hyperlinks = false,
            "--no-mouse" => opts.mouse = false,
            other => {
                if let Some(val) = other.strip_prefix("--data=") {
                    opts.data = PathBuf::from(val);
                } else if let Some(val) = other.strip_prefix("--view=") {
                    opts.view = StartView::parse(val).ok_or_else(|| CliError::InvalidValue {
                        flag: "--view",
                        value: val.to_string(),
                    })?;
                } else if let Some(val) = other.strip_prefix("--debounce-ms=") {
                    let ms = val.parse().map_err(|_| CliError::InvalidValue {
                        flag: "--debounce-ms",
                        value: val.to_string(),
                    })?;
                    opts.debounce = Duration::from_millis(ms);
                } else if let Some(val) = other.strip_prefix("--log-file=") {
                    opts.log_file = Some(PathBuf::from(val));
                } else {
                    return Err(CliError::UnknownArgument(other.to_string()));
                }
            }
        }
    }

    Ok(Outcome::Run(opts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn parse(args: &[&str], env: &[(&str, &str)]) -> Result<Outcome, CliError> {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        let env: HashMap<String, String> = env
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        parse_from(&args, |key| env.get(key).cloned())
    }

    fn run(args: &[&str], env: &[(&str, &str)]) -> Opts {
        match parse(args, env) {
            Ok(Outcome::Run(opts)) => opts,
            other => panic!("expected options, got {other:?}"),
        }
    }

    #[test]
    fn defaults() {
        let opts = run(&[], &[]);
        assert_eq!(opts, Opts::default());
        assert_eq!(opts.data, PathBuf::from("bookmarks_data.json"));
        assert_eq!(opts.debounce, Duration::from_millis(300));
        assert!(opts.graph && opts.mouse && opts.hyperlinks);
    }

    #[test]
    fn flags_override_env() {
        let opts = run(
            &["--data=cli.json", "--debounce-ms=50"],
            &[("MARKLENS_DATA", "env.json"), ("MARKLENS_DEBOUNCE_MS", "900")],
        );
        assert_eq!(opts.data, PathBuf::from("cli.json"));
        assert_eq!(opts.debounce, Duration::from_millis(50));
    }

    #[test]
    fn env_applies_without_flags() {
        let opts = run(
            &[],
            &[
                ("MARKLENS_NO_GRAPH", "1"),
                ("MARKLENS_VIEW", "aggregate"),
                ("MARKLENS_LOG_FILE", "/tmp/m.log"),
            ],
        );
        assert!(!opts.graph);
        assert_eq!(opts.view, StartView::Aggregate);
        assert_eq!(opts.log_file, Some(PathBuf::from("/tmp/m.log")));
    }

    #[test]
    fn bad_env_values_are_ignored() {
        let opts = run(&[], &[("MARKLENS_DEBOUNCE_MS", "soon"), ("MARKLENS_VIEW", "tiles")]);
        assert_eq!(opts.debounce, DEFAULT_SEARCH_DEBOUNCE);
        assert_eq!(opts.view, StartView::Cards);
    }

    #[test]
    fn switches() {
        let opts = run(&["--no-graph", "--no-mouse", "--no-links", "--view=aggregate"], &[]);
        assert!(!opts.graph && !opts.mouse && !opts.hyperlinks);
        assert_eq!(opts.view, StartView::Aggregate);
    }

    #[test]
    fn help_and_version_short_circuit() {
        assert_eq!(parse(&["--no-mouse", "-h"], &[]), Ok(Outcome::Help));
        assert_eq!(parse(&["--version"], &[]), Ok(Outcome::Version));
    }

    #[test]
    fn errors() {
        assert_eq!(
            parse(&["--debounce-ms=fast"], &[]),
            Err(CliError::InvalidValue {
                flag: "--debounce-ms",
                value: "fast".into()
            })
        );
        assert_eq!(
            parse(&["--bogus"], &[]),
            Err(CliError::UnknownArgument("--bogus".into()))
        );
        assert_eq!(
            CliError::UnknownArgument("--x".into()).to_string(),
            "Unknown argument: --x"
        );
    }

    #[test]
    fn help_text_mentions_every_env_var() {
        for var in [
            "MARKLENS_DATA",
            "MARKLENS_NO_GRAPH",
            "MARKLENS_DEBOUNCE_MS",
            "MARKLENS_LOG_FILE",
            "MARKLENS_CLIPBOARD_BACKEND",
        ] {
            assert!(HELP_TEXT.contains(var), "{var}");
        }
        assert!(!VERSION.is_empty());
    }
}
