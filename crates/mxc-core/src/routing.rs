//! Endpoint table for the matrix and session workers.
//!
//! Every URL the console requests is assembled here, including the one
//! non-trivial decision: whether a terminal command is a generic sandbox run
//! or a direct file-action sub-path.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Literal substring that routes a terminal command to a worker sub-path.
pub const FILE_ACTION_MARKER: &str = "file?action=";

/// Query fragment whose first occurrence is removed from file-action URLs.
const CODE_PARAM: &str = "code=";

/// Characters left untouched by `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encodes a value for use inside a query parameter.
pub fn encode_uri_component(value: &str) -> String {
    utf8_percent_encode(value, URI_COMPONENT).to_string()
}

/// Base URLs of both workers, without trailing slashes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    matrix: String,
    session: String,
}

impl Endpoints {
    pub fn new(matrix: impl Into<String>, session: impl Into<String>) -> Self {
        Self {
            matrix: trim_base(matrix.into()),
            session: trim_base(session.into()),
        }
    }

    pub fn matrix_base(&self) -> &str {
        &self.matrix
    }

    pub fn session_base(&self) -> &str {
        &self.session
    }

    /// Matrix worker root (plain-text API info).
    pub fn api_info(&self) -> String {
        self.matrix.clone()
    }

    pub fn chat(&self) -> String {
        format!("{}/ai/chat", self.matrix)
    }

    pub fn code(&self) -> String {
        format!("{}/ai/code", self.matrix)
    }

    pub fn context(&self, session_id: &str) -> String {
        format!(
            "{}/session/context?sessionId={}",
            self.session,
            encode_uri_component(session_id)
        )
    }

    pub fn clear_session(&self) -> String {
        format!("{}/session/clear", self.session)
    }

    pub fn add_interaction(&self) -> String {
        format!("{}/session/add-interaction", self.session)
    }

    /// Routes a sandbox terminal command.
    pub fn terminal(&self, command: &str) -> TerminalRoute {
        TerminalRoute::for_command(&self.matrix, command)
    }
}

fn trim_base(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}

/// Where a terminal command is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalRoute {
    /// Command appended verbatim to the matrix root, first `code=` removed.
    FileAction { url: String },
    /// Generic sandbox run with the command in the `code` query parameter.
    Run { url: String },
}

impl TerminalRoute {
    /// Builds the route for a command.
    ///
    /// Only the first `code=` of the file-action URL is stripped, so a later
    /// `code=` inside a written payload survives. A generic run keeps its
    /// `code` parameter intact.
    pub fn for_command(matrix_base: &str, command: &str) -> Self {
        let command = command.trim();
        if command.contains(FILE_ACTION_MARKER) {
            let assembled = format!("{matrix_base}{command}");
            TerminalRoute::FileAction {
                url: assembled.replacen(CODE_PARAM, "", 1),
            }
        } else {
            TerminalRoute::Run {
                url: format!("{matrix_base}/run?code={}", encode_uri_component(command)),
            }
        }
    }

    pub fn url(&self) -> &str {
        match self {
            TerminalRoute::FileAction { url } | TerminalRoute::Run { url } => url,
        }
    }

    pub fn is_file_action(&self) -> bool {
        matches!(self, TerminalRoute::FileAction { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MATRIX: &str = "https://matrix.example.dev";

    fn endpoints() -> Endpoints {
        Endpoints::new(MATRIX, "https://session.example.dev/")
    }

    #[test]
    fn test_endpoint_paths() {
        let e = endpoints();
        assert_eq!(e.api_info(), MATRIX);
        assert_eq!(e.chat(), "https://matrix.example.dev/ai/chat");
        assert_eq!(e.code(), "https://matrix.example.dev/ai/code");
        assert_eq!(e.clear_session(), "https://session.example.dev/session/clear");
        assert_eq!(
            e.add_interaction(),
            "https://session.example.dev/session/add-interaction"
        );
        assert_eq!(
            e.context("session-1700000000000"),
            "https://session.example.dev/session/context?sessionId=session-1700000000000"
        );
    }

    #[test]
    fn test_plain_command_goes_through_run_endpoint() {
        let route = endpoints().terminal("  ls -la  ");
        assert!(!route.is_file_action());
        assert_eq!(route.url(), "https://matrix.example.dev/run?code=ls%20-la");
    }

    #[test]
    fn test_run_keeps_code_param() {
        let route = endpoints().terminal("print('code=1')");
        assert_eq!(
            route.url(),
            "https://matrix.example.dev/run?code=print('code%3D1')"
        );
    }

    #[test]
    fn test_file_action_is_appended_verbatim() {
        let route = endpoints().terminal("/file?action=list");
        assert_eq!(
            route,
            TerminalRoute::FileAction {
                url: "https://matrix.example.dev/file?action=list".to_string()
            }
        );
    }

    #[test]
    fn test_file_action_strips_code_fragment() {
        let route = endpoints().terminal("/file?action=write&name=a.py&code=print(1)");
        assert_eq!(
            route.url(),
            "https://matrix.example.dev/file?action=write&name=a.py&print(1)"
        );
    }

    #[test]
    fn test_file_action_strips_only_first_code_fragment() {
        let route = endpoints().terminal("/file?action=write&code=x='code=1'");
        assert_eq!(
            route.url(),
            "https://matrix.example.dev/file?action=write&x='code=1'"
        );
    }

    #[test]
    fn test_encode_uri_component_matches_browser_rules() {
        assert_eq!(encode_uri_component("a-b_c.d!e~f*g'h(i)j"), "a-b_c.d!e~f*g'h(i)j");
        assert_eq!(encode_uri_component("a&b=c d"), "a%26b%3Dc%20d");
        assert_eq!(encode_uri_component("/tmp?x#y"), "%2Ftmp%3Fx%23y");
        assert_eq!(encode_uri_component("é"), "%C3%A9");
    }
}
