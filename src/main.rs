// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error};

use subtrans::app_config::{Config, LogLevel};
use subtrans::app_controller::Controller;

/// CLI wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate shell completions for subtrans
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// subtrans - AI subtitle translation for video files
///
/// Extracts embedded subtitle tracks from video files, translates them
/// through a chat-completion LLM endpoint, and embeds the translated tracks
/// back into the container.
#[derive(Parser, Debug)]
#[command(name = "subtrans")]
#[command(version)]
#[command(about = "AI-powered translation of embedded video subtitles")]
#[command(long_about = "subtrans extracts embedded subtitle tracks from video files, translates \
them with a chat-completion LLM, and embeds the result back into the container.

EXAMPLES:
    subtrans movie.mkv                      # Translate using conf.json defaults
    subtrans -s eng -t tha movie.mkv        # Pick source and target track languages
    subtrans --batch-size 1 movie.mkv       # One provider call per cue
    subtrans /movies/                       # Process a whole directory
    subtrans completions bash               # Generate bash completions

CONFIGURATION:
    Settings live in conf.json by default (see --config). Command-line flags
    override the config file.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input video file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    /// Source subtitle track language (e.g. 'eng')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target subtitle track language (e.g. 'tha')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Model identifier to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// API key (overrides the config file)
    #[arg(short, long, env = "SUBTRANS_API_KEY")]
    api_key: Option<String>,

    /// Number of cues per translation request
    #[arg(short, long)]
    batch_size: Option<usize>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color code for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S%.3f");
            let color = Self::color_for_level(record.level());
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} [{}] {}\x1B[0m",
                color,
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn level_filter(level: &LogLevel) -> LevelFilter {
    match level {
        LogLevel::Error => LevelFilter::Error,
        LogLevel::Warn => LevelFilter::Warn,
        LogLevel::Info => LevelFilter::Info,
        LogLevel::Debug => LevelFilter::Debug,
        LogLevel::Trace => LevelFilter::Trace,
    }
}

/// Layer the command-line flags over the loaded configuration
fn apply_cli_overrides(config: &mut Config, cli: &CommandLineOptions) {
    if let Some(source) = &cli.source_language {
        config.source_language = source.clone();
    }
    if let Some(target) = &cli.target_language {
        config.target_language = target.clone();
    }
    if let Some(model) = &cli.model {
        config.provider.model = model.clone();
    }
    if let Some(api_key) = &cli.api_key {
        config.provider.api_key = api_key.clone();
    }
    if let Some(batch_size) = &cli.batch_size {
        config.translation.batch_size = *batch_size;
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone().into();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Some(Commands::Completions { shell }) = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "subtrans", &mut std::io::stdout());
        return Ok(());
    }

    let Some(input_path) = cli.input_path.clone() else {
        return Err(anyhow::anyhow!(
            "INPUT_PATH is required when no subcommand is specified"
        ));
    };

    let mut config = Config::load_or_default(&cli.config_path)?;
    apply_cli_overrides(&mut config, &cli);
    log::set_max_level(level_filter(&config.log_level));

    let controller = Controller::with_config(config)?;
    if let Err(e) = controller.run(&input_path).await {
        error!("{}", e);
        std::process::exit(1);
    }

    Ok(())
}
