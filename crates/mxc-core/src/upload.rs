//! File selection and context-wall payloads for session memory uploads.
//!
//! A `FileSelection` is the pending upload batch. It can be filled from an
//! explicit list of paths (`mxc upload`, `:upload`) or from a line that a
//! terminal pasted when files were dragged onto it. Both end up in the same
//! upload handler on the console.

use std::path::PathBuf;

use anyhow::{Context, Result};

pub const CONTEXT_WALL_PREFIX: &str = "CONTEXT WALL: ";
pub const CONTINUATION: &str = "...";
pub const DEFAULT_MAX_CHARS: usize = 50_000;

/// How uploaded file text is cut and marked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TruncationPolicy {
    pub max_chars: usize,
    /// Append [`CONTINUATION`] even when nothing was cut.
    pub always_append_ellipsis: bool,
}

impl Default for TruncationPolicy {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_CHARS,
            always_append_ellipsis: true,
        }
    }
}

/// Builds the `user` text for one add-interaction request.
pub fn context_wall(name: &str, text: &str, policy: TruncationPolicy) -> String {
    let (body, truncated) = truncate_chars(text, policy.max_chars);
    let mut wall = format!("{CONTEXT_WALL_PREFIX}{name}\n\n{body}");
    if truncated || policy.always_append_ellipsis {
        wall.push_str(CONTINUATION);
    }
    wall
}

/// Cuts `text` to at most `max` characters, reporting whether anything was cut.
fn truncate_chars(text: &str, max: usize) -> (&str, bool) {
    match text.char_indices().nth(max) {
        Some((idx, _)) => (&text[..idx], true),
        None => (text, false),
    }
}

/// One file of a pending upload batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub path: PathBuf,
}

impl SelectedFile {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.file_name().map_or_else(
            || path.display().to_string(),
            |n| n.to_string_lossy().into_owned(),
        );
        Self { name, path }
    }

    /// Reads the file as UTF-8, replacing invalid sequences.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read.
    pub async fn read_text(&self) -> Result<String> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("read {}", self.path.display()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// The pending upload batch, in selection order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSelection {
    files: Vec<SelectedFile>,
}

impl FileSelection {
    /// Selection from explicit paths (the manual picker).
    pub fn from_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            files: paths.into_iter().map(SelectedFile::from_path).collect(),
        }
    }

    /// Selection from a pasted drop, if the line is nothing but existing files.
    pub fn from_drop(line: &str) -> Option<Self> {
        parse_dropped_paths(line).map(Self::from_paths)
    }

    pub fn files(&self) -> &[SelectedFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Parses a line pasted by a terminal drag-and-drop.
///
/// Accepts quoted paths, backslash-escaped spaces and `file://` URLs. Returns
/// `None` unless every word is an absolute path to an existing regular file,
/// which is what terminals paste for a drop.
pub fn parse_dropped_paths(line: &str) -> Option<Vec<PathBuf>> {
    let words = split_path_words(line);
    if words.is_empty() {
        return None;
    }

    let mut paths = Vec::with_capacity(words.len());
    for word in words {
        let path = file_url_to_path(&word).unwrap_or_else(|| PathBuf::from(&word));
        if !path.is_absolute() || !path.is_file() {
            return None;
        }
        paths.push(path);
    }
    Some(paths)
}

fn file_url_to_path(word: &str) -> Option<PathBuf> {
    if !word.starts_with("file://") {
        return None;
    }
    url::Url::parse(word).ok()?.to_file_path().ok()
}

/// Splits a line into words the way a POSIX shell would quote paths.
///
/// Single quotes are literal, double quotes allow `\"` and `\\`, and a
/// backslash outside quotes escapes the next character.
pub fn split_path_words(line: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                in_word = true;
                for q in chars.by_ref() {
                    if q == '\'' {
                        break;
                    }
                    current.push(q);
                }
            }
            '"' => {
                in_word = true;
                while let Some(q) = chars.next() {
                    match q {
                        '"' => break,
                        '\\' => match chars.next() {
                            Some(e @ ('"' | '\\')) => current.push(e),
                            Some(other) => {
                                current.push('\\');
                                current.push(other);
                            }
                            None => current.push('\\'),
                        },
                        _ => current.push(q),
                    }
                }
            }
            '\\' => {
                in_word = true;
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            c if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            _ => {
                in_word = true;
                current.push(c);
            }
        }
    }
    if in_word {
        words.push(current);
    }
    words
}
