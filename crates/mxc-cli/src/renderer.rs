//! CLI renderer for console events.
//!
//! Output contract:
//! - Worker content (api info, context, assistant replies, code, terminal) → stdout
//! - Upload progress → stderr
//!
//! User chat entries are not echoed; the user already typed them.

use std::io::{Stderr, Stdout, Write, stderr, stdout};

use mxc_core::events::{ConsoleEvent, Presenter, Role};

pub const ASSISTANT_PREFIX: &str = "assistant> ";

/// Writes console events to a pair of output streams.
pub struct CliRenderer<O = Stdout, E = Stderr> {
    out: O,
    err: E,
}

impl CliRenderer {
    pub fn new() -> Self {
        Self {
            out: stdout(),
            err: stderr(),
        }
    }
}

impl Default for CliRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: Write, E: Write> CliRenderer<O, E> {
    #[cfg(test)]
    fn with_writers(out: O, err: E) -> Self {
        Self { out, err }
    }

    #[cfg(test)]
    fn into_inner(self) -> (O, E) {
        (self.out, self.err)
    }

    fn handle_event(&mut self, event: &ConsoleEvent) {
        match event {
            ConsoleEvent::ApiInfo { text } => {
                let _ = writeln!(self.out, "{text}");
            }
            ConsoleEvent::ContextReplaced { snapshot } => {
                let pretty = serde_json::to_string_pretty(snapshot)
                    .unwrap_or_else(|_| snapshot.to_string());
                let _ = writeln!(self.out, "{pretty}");
            }
            ConsoleEvent::ChatAppended { entry } => {
                if entry.role == Role::Assistant {
                    let _ = writeln!(self.out, "{ASSISTANT_PREFIX}{}", entry.content);
                }
            }
            ConsoleEvent::CodeReplaced { code } => {
                let _ = writeln!(self.out, "{code}");
            }
            ConsoleEvent::TerminalAppended { line } => {
                let _ = writeln!(self.out, "{line}");
            }
            ConsoleEvent::UploadStatus { text } => {
                let _ = writeln!(self.err, "{text}");
                let _ = self.err.flush();
            }
        }
        let _ = self.out.flush();
    }
}

impl<O: Write, E: Write> Presenter for CliRenderer<O, E> {
    fn present(&mut self, event: &ConsoleEvent) {
        self.handle_event(event);
    }
}
