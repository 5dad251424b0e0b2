//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info};
use transcoder_classifier::AzureOpenAiClient;
use transcoder_core::pipeline::{
    CodeTranscriptConfig, CodeTranscriptResult, CodingOptions, ProgressReporter, code_transcript,
    default_output_path,
};
use transcoder_core::LEGEND_TITLE;
use transcoder_shared::{AppConfig, Category, init_config, load_config, resolve_service_config};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Transcoder: highlight interview transcripts by research category.
#[derive(Parser)]
#[command(
    name = "transcoder",
    version,
    about = "Code .docx interview transcripts into research categories with Azure OpenAI.",
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
    /// Code a transcript and save a highlighted copy.
    Code {
        /// Transcript to code (.docx).
        input: PathBuf,

        /// Destination (defaults to `<input stem>_coded.docx` beside the input).
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Character budget per classification request.
        #[arg(long)]
        max_chars: Option<usize>,
    },

    /// Print the category legend.
    Categories,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
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

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "transcoder=info",
        1 => "transcoder=debug",
        _ => "transcoder=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt().with_env_filter(env_filter).with_target(false).init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Code {
            input,
            out,
            max_chars,
        } => cmd_code(input, out, max_chars).await,
        Command::Categories => cmd_categories(),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_code(input: PathBuf, out: Option<PathBuf>, max_chars: Option<usize>) -> Result<()> {
    // Service settings are checked before the transcript is opened.
    let config = load_config()?;
    let service = resolve_service_config(&config)?;
    let client = AzureOpenAiClient::new(&service)?;

    let output = out.unwrap_or_else(|| default_output_path(&input, &config.defaults.output_suffix));
    let code_config = CodeTranscriptConfig {
        input,
        output,
        options: CodingOptions {
            max_chunk_chars: max_chars.unwrap_or(config.defaults.max_chunk_chars),
        },
    };

    info!(
        input = %code_config.input.display(),
        output = %code_config.output.display(),
        deployment = %service.deployment,
        "coding transcript"
    );

    let reporter = CliProgress::new();
    let result = match code_transcript(&code_config, &client, &reporter).await {
        Ok(result) => result,
        Err(e) => {
            reporter.abandon();
            error!(error = %e, "coding failed");
            return Err(e.into());
        }
    };

    println!();
    if result.summary.matches == 0 {
        println!("  No excerpts were returned by the model; only the legend was added.");
    }
    println!("  Applied {} highlight(s).", result.summary.applied);
    println!("  Chunks:  {}", result.summary.chunks);
    println!("  Matches: {}", result.summary.matches);
    println!("  Saved:   {}", result.output.display());
    println!("  Time:    {:.1}s", result.elapsed.as_secs_f64());
    println!();

    Ok(())
}

fn cmd_categories() -> Result<()> {
    println!("{LEGEND_TITLE}");
    for category in Category::ALL {
        println!("  {category} (#{})", category.color());
        println!("     {}", category.description());
    }
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

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(Duration::from_millis(80));
        Self { spinner }
    }

    fn abandon(&self) {
        self.spinner.finish_and_clear();
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn chunk_started(&self, current: usize, total: usize, chars: usize) {
        self.spinner
            .set_message(format!("Coding chunk [{current}/{total}] ({chars} characters)"));
    }

    fn chunk_coded(&self, current: usize, total: usize, matches: usize) {
        self.spinner
            .set_message(format!("Received {matches} match(es) for chunk [{current}/{total}]"));
    }

    fn done(&self, _result: &CodeTranscriptResult) {
        self.spinner.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn code_command_parses_flags() {
        let cli = Cli::parse_from([
            "transcoder",
            "-vv",
            "code",
            "interview.docx",
            "-o",
            "out.docx",
            "--max-chars",
            "1200",
        ]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Code {
                input,
                out,
                max_chars,
            } => {
                assert_eq!(input, PathBuf::from("interview.docx"));
                assert_eq!(out, Some(PathBuf::from("out.docx")));
                assert_eq!(max_chars, Some(1200));
            }
            _ => panic!("expected code command"),
        }
    }

    #[test]
    fn log_format_is_global() {
        let cli = Cli::parse_from(["transcoder", "categories", "--log-format", "json"]);
        assert!(matches!(cli.log_format, LogFormat::Json));
        assert!(matches!(cli.command, Command::Categories));
    }
}
