//! CLI entry and dispatch.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use mxc_core::{config, interrupt, logging};

mod commands;

pub const DEFAULT_LANGUAGE: &str = "python";

#[derive(Parser)]
#[command(name = "mxc")]
#[command(version = "0.1")]
#[command(about = "Session console for the matrix and session workers")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Start the interactive console (default)
    Console,
    /// Show the matrix worker API info
    Info,
    /// Show the session memory context
    Context,
    /// Clear the session memory and show the refreshed context
    Clear,
    /// Send a chat message
    Chat {
        /// The message to send
        #[arg(required = true, value_name = "MESSAGE")]
        message: Vec<String>,
    },
    /// Generate code from a prompt
    Code {
        /// Target language
        #[arg(short, long, default_value = DEFAULT_LANGUAGE)]
        language: String,

        /// What the code should do
        #[arg(required = true, value_name = "PROMPT")]
        prompt: Vec<String>,
    },
    /// Run a sandbox terminal command
    Run {
        /// The command line to run
        #[arg(
            required = true,
            trailing_var_arg = true,
            allow_hyphen_values = true,
            value_name = "COMMAND"
        )]
        command: Vec<String>,
    },
    /// Upload files into session memory
    Upload {
        /// Files to upload, in order
        #[arg(required = true, value_name = "PATH")]
        paths: Vec<PathBuf>,
    },
    /// Manage the persisted session identifier
    Session {
        #[command(subcommand)]
        command: SessionCommands,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum SessionCommands {
    /// Print the session identifier (created if missing)
    Show,
    /// Forget the session identifier; the next run starts a new session
    Reset,
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Show the effective worker URLs
    Show,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    interrupt::init()?;

    let config = config::Config::load().context("load config")?;
    let _log_guard = logging::init(&config);

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli, &config).await })
}

async fn dispatch(cli: Cli, config: &config::Config) -> Result<()> {
    // default to the interactive console
    let Some(command) = cli.command else {
        return commands::console::run(config).await;
    };

    match command {
        Commands::Console => commands::console::run(config).await,
        Commands::Info => commands::actions::info(config).await,
        Commands::Context => commands::actions::context(config).await,
        Commands::Clear => commands::actions::clear(config).await,
        Commands::Chat { message } => commands::actions::chat(config, &message.join(" ")).await,
        Commands::Code { language, prompt } => {
            commands::actions::code(config, &prompt.join(" "), &language).await
        }
        Commands::Run { command } => commands::actions::run(config, &command.join(" ")).await,
        Commands::Upload { paths } => commands::actions::upload(config, paths).await,

        Commands::Session { command } => match command {
            SessionCommands::Show => commands::session::show(),
            SessionCommands::Reset => commands::session::reset(),
        },

        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
            ConfigCommands::Show => commands::config::show(config),
        },
    }
}
