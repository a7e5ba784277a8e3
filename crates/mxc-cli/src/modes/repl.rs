//! Interactive console.
//!
//! Plain lines are chat messages. Lines starting with `:` pick another tab of
//! the console, and a line made only of dropped file paths is uploaded.

use std::io::{BufRead, Write};

use anyhow::Result;
use mxc_core::console::SessionConsole;
use mxc_core::events::Presenter;
use mxc_core::interrupt;
use mxc_core::upload::{FileSelection, split_path_words};

const QUIT_COMMAND: &str = ":q";
const PROMPT_PREFIX: &str = "mxc> ";

const HELP: &str = "\
Commands:
  <text>                    send a chat message
  :code <language> <prompt> generate code
  :run <command>            run a sandbox terminal command
  :upload <path>...         upload files into session memory
  :context                  show the session memory context
  :clear                    clear the session memory
  :info                     show the matrix worker API info
  :session                  show the session identifier
  :help                     show this help
  :q                        quit
Dropping files onto the terminal uploads them.";

/// One parsed input line.
#[derive(Debug, PartialEq)]
enum ReplCommand {
    Quit,
    Help,
    Info,
    Context,
    Clear,
    Session,
    Chat(String),
    Code { language: String, prompt: String },
    Run(String),
    Upload(FileSelection),
    Usage(&'static str),
    Unknown(String),
}

/// Parses a trimmed, non-empty line.
fn parse_line(line: &str) -> ReplCommand {
    if line == QUIT_COMMAND {
        return ReplCommand::Quit;
    }

    if let Some(rest) = line.strip_prefix(':') {
        let (name, args) = rest
            .split_once(char::is_whitespace)
            .map_or((rest, ""), |(n, a)| (n, a.trim()));
        return match name {
            "help" | "h" => ReplCommand::Help,
            "info" => ReplCommand::Info,
            "context" => ReplCommand::Context,
            "clear" => ReplCommand::Clear,
            "session" => ReplCommand::Session,
            "run" if !args.is_empty() => ReplCommand::Run(args.to_string()),
            "run" => ReplCommand::Usage(":run <command>"),
            "code" => match args.split_once(char::is_whitespace) {
                Some((language, prompt)) if !prompt.trim().is_empty() => ReplCommand::Code {
                    language: language.to_string(),
                    prompt: prompt.trim().to_string(),
                },
                _ => ReplCommand::Usage(":code <language> <prompt>"),
            },
            "upload" => {
                let selection = FileSelection::from_paths(split_path_words(args));
                if selection.is_empty() {
                    ReplCommand::Usage(":upload <path>...")
                } else {
                    ReplCommand::Upload(selection)
                }
            }
            _ => ReplCommand::Unknown(line.to_string()),
        };
    }

    match FileSelection::from_drop(line) {
        Some(selection) => ReplCommand::Upload(selection),
        None => ReplCommand::Chat(line.to_string()),
    }
}

/// Runs the console loop.
///
/// Reads user input from `input`, writes prompts and notices to `output`;
/// worker content goes through the console's presenter. Exits on `:q` or EOF.
///
/// Ctrl+C while an action is in flight cancels that action and returns to the
/// prompt. Ctrl+C while waiting for input ends the loop with
/// [`interrupt::InterruptedError`] before the pending line is dispatched.
pub async fn run_repl<R, W, P>(
    input: R,
    output: &mut W,
    console: &mut SessionConsole<P>,
) -> Result<()>
where
    R: BufRead,
    W: Write,
    P: Presenter,
{
    for line in input.lines() {
        let line = line?;
        interrupt::check()?;
        let trimmed = line.trim();

        if trimmed.is_empty() {
            write!(output, "{PROMPT_PREFIX}")?;
            output.flush()?;
            continue;
        }

        let command = parse_line(trimmed);
        if command == ReplCommand::Quit {
            writeln!(output, "Goodbye!")?;
            break;
        }

        match interrupt::run_until_interrupted(execute(command, output, console)).await {
            Ok(result) => result?,
            Err(e) if e.downcast_ref::<interrupt::InterruptedError>().is_some() => {
                interrupt::reset();
                writeln!(output, "Interrupted")?;
            }
            Err(e) => return Err(e),
        }

        write!(output, "{PROMPT_PREFIX}")?;
        output.flush()?;
    }

    Ok(())
}

async fn execute<W, P>(
    command: ReplCommand,
    output: &mut W,
    console: &mut SessionConsole<P>,
) -> Result<()>
where
    W: Write,
    P: Presenter,
{
    match command {
        ReplCommand::Quit => {}
        ReplCommand::Help => writeln!(output, "{HELP}")?,
        ReplCommand::Info => console.load_api_info().await,
        ReplCommand::Context => console.load_context().await,
        ReplCommand::Clear => console.clear_session().await,
        ReplCommand::Session => writeln!(output, "Session: {}", console.session_id())?,
        ReplCommand::Chat(message) => console.send_chat(&message).await,
        ReplCommand::Code { language, prompt } => {
            console.generate_code(&prompt, &language).await;
        }
        ReplCommand::Run(command) => console.run_command(&command).await,
        ReplCommand::Upload(selection) => {
            console.upload(&selection).await;
        }
        ReplCommand::Usage(usage) => writeln!(output, "Usage: {usage}")?,
        ReplCommand::Unknown(command) => {
            writeln!(output, "Unknown command: {command} (try :help)")?;
        }
    }
    Ok(())
}

/// Runs the console on stdin/stdout, loading the context first.
pub async fn run_interactive<P: Presenter>(console: &mut SessionConsole<P>) -> Result<()> {
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();

    writeln!(stdout, "mxc console (type :q to quit, :help for commands)")?;
    writeln!(stdout, "Session: {}", console.identity().badge())?;
    stdout.flush()?;

    if interrupt::run_until_interrupted(console.load_context())
        .await
        .is_err()
    {
        interrupt::reset();
        writeln!(stdout, "Interrupted")?;
    }

    write!(stdout, "{PROMPT_PREFIX}")?;
    stdout.flush()?;

    run_repl(stdin.lock(), &mut stdout, console).await
}
