//! CLI command definitions, routing, and tracing setup.

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use url::Url;

use novelfetch_core::{CrawlProgress, default_request, extract_json};
use novelfetch_crawler::ProfileRegistry;
use novelfetch_shared::{AppConfig, ChapterRecord, StopReason, init_config, load_config};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// novelfetch: crawl web novel chapters into a single clean document.
#[derive(Parser)]
#[command(
    name = "novelfetch",
    version,
    about = "Follow next-chapter links from a URL and save the cleaned chapters as one text.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Crawl chapters starting at a URL.
    Extract(ExtractArgs),

    /// Serve a JSON extract request read from a file or stdin.
    Request {
        /// Request file; `-` or nothing reads stdin.
        path: Option<PathBuf>,
    },

    /// List the known site profiles (built-in and configured).
    Profiles,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Arguments of `novelfetch extract`.
#[derive(clap::Args)]
pub(crate) struct ExtractArgs {
    /// URL of the first chapter to fetch.
    pub url: String,

    /// Maximum number of chapters (defaults to the config value).
    #[arg(short = 'n', long)]
    pub chapters: Option<usize>,

    /// Text removed from every chapter (repeatable).
    #[arg(short, long = "blacklist", value_name = "TEXT")]
    pub blacklist: Vec<String>,

    /// File with one blacklist entry per line (`#` starts a comment).
    #[arg(long, value_name = "PATH")]
    pub blacklist_file: Option<PathBuf>,

    /// Disable the built-in navigation/ad filters.
    #[arg(long)]
    pub no_auto_filters: bool,

    /// Skip the readability strategy.
    #[arg(long)]
    pub no_readability: bool,

    /// Pause between chapters in milliseconds (defaults to the config value).
    #[arg(long, value_name = "MS")]
    pub delay_ms: Option<u64>,

    /// Write the output to a file instead of stdout.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Emit the full crawl result as JSON instead of the combined text.
    #[arg(long)]
    pub json: bool,
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr so stdout stays
/// free for the extracted text.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "novelfetch=info",
        1 => "novelfetch=debug",
        _ => "novelfetch=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Extract(args) => cmd_extract(args).await,
        Command::Request { path } => cmd_request(path.as_deref()).await,
        Command::Profiles => cmd_profiles(),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// extract
// ---------------------------------------------------------------------------

async fn cmd_extract(args: ExtractArgs) -> Result<()> {
    let mut config = load_config()?;
    if let Some(delay) = args.delay_ms {
        config.fetch.delay_ms = delay;
    }
    if args.no_readability {
        config.extraction.readability = false;
    }

    let mut request = default_request(&config, &args.url)?;
    if let Some(n) = args.chapters {
        request = request.with_max_chapters(n)?;
    }
    if args.no_auto_filters {
        request = request.with_auto_filters(false);
    }

    let mut blacklist = request.user_blacklist.clone();
    blacklist.extend(args.blacklist);
    if let Some(path) = &args.blacklist_file {
        blacklist.extend(read_blacklist_file(path)?);
    }
    request = request.with_blacklist(blacklist);

    info!(
        url = %request.start_url,
        max_chapters = request.max_chapters,
        blacklist = request.user_blacklist.len(),
        "extracting chapters"
    );

    let reporter = CliProgress::new(request.max_chapters);
    let result = novelfetch_core::crawl(&config, &request, &reporter).await?;

    let rendered = if args.json {
        serde_json::to_string_pretty(&result)?
    } else {
        result.combined_text.clone()
    };

    match &args.output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .wrap_err_with(|| format!("failed to write {}", path.display()))?;
            println!();
            println!("  Chapters: {}", result.chapters.len());
            println!("  Filters:  {}", result.filters_applied_count);
            println!("  Stopped:  {}", result.stop_reason);
            println!("  Output:   {}", path.display());
            println!();
        }
        None => {
            println!("{rendered}");
            eprintln!(
                "{} chapter(s), {} filter(s), stopped: {}",
                result.chapters.len(),
                result.filters_applied_count,
                result.stop_reason
            );
        }
    }

    Ok(())
}

/// One entry per line; blank lines and `#` comments are skipped.
fn parse_blacklist(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}

fn read_blacklist_file(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read blacklist file {}", path.display()))?;
    Ok(parse_blacklist(&content))
}

// ---------------------------------------------------------------------------
// request
// ---------------------------------------------------------------------------

async fn cmd_request(path: Option<&Path>) -> Result<()> {
    let body = match path {
        Some(p) if p != Path::new("-") => std::fs::read_to_string(p)
            .wrap_err_with(|| format!("failed to read request {}", p.display()))?,
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .wrap_err("failed to read request from stdin")?;
            buf
        }
    };

    let config = load_config()?;
    let response = extract_json(&config, &body, &novelfetch_core::SilentProgress).await;
    println!("{}", serde_json::to_string_pretty(&response)?);

    if response.is_success() {
        Ok(())
    } else {
        Err(eyre!("extract request failed"))
    }
}

// ---------------------------------------------------------------------------
// profiles / config
// ---------------------------------------------------------------------------

fn cmd_profiles() -> Result<()> {
    let config = load_config()?;
    let registry = ProfileRegistry::new(config.profiles.clone())?;

    for profile in registry.iter() {
        println!("{}", profile.domain);
        println!("  content: {}", profile.content_selectors.join(", "));
        if !profile.title_selectors.is_empty() {
            println!("  title:   {}", profile.title_selectors.join(", "));
        }
        if !profile.removal_selectors.is_empty() {
            println!("  remove:  {}", profile.removal_selectors.join(", "));
        }
    }
    println!("{} profile(s)", registry.len());
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif bar.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new(max_chapters: usize) -> Self {
        let bar = ProgressBar::new(max_chapters as u64);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} [{pos}/{len}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        bar.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { bar }
    }
}

impl CrawlProgress for CliProgress {
    fn chapter_started(&self, sequence: usize, url: &Url) {
        self.bar.set_message(format!("Fetching chapter {sequence}: {url}"));
    }

    fn chapter_recorded(&self, chapter: &ChapterRecord, _max_chapters: usize) {
        self.bar.inc(1);
        self.bar.set_message(chapter.title.clone());
    }

    fn finished(&self, _chapters: usize, _reason: &StopReason) {
        self.bar.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blacklist_file_skips_comments_and_blanks() {
        let content = "# translator credits\nTranslator: Lin\n\n  Editor: Mo  \n";
        assert_eq!(parse_blacklist(content), vec!["Translator: Lin", "Editor: Mo"]);
    }

    #[test]
    fn extract_args_parse() {
        let cli = Cli::try_parse_from([
            "novelfetch",
            "-v",
            "extract",
            "https://novelfull.net/b/chapter-1.html",
            "-n",
            "3",
            "-b",
            "Translator: Lin",
            "-b",
            "Editor: Mo",
            "--no-auto-filters",
            "--json",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 1);
        let Command::Extract(args) = cli.command else {
            panic!("expected extract");
        };
        assert_eq!(args.chapters, Some(3));
        assert_eq!(args.blacklist.len(), 2);
        assert!(args.no_auto_filters);
        assert!(args.json);
        assert!(args.output.is_none());
    }

    #[test]
    fn request_path_is_optional() {
        let cli = Cli::try_parse_from(["novelfetch", "request"]).unwrap();
        assert!(matches!(cli.command, Command::Request { path: None }));
    }
}
