//! Fatal-error reporting with source excerpts.
//!
//! Every pipeline stage reports problems as a [`Diagnostic`]: a byte offset
//! into the source buffer plus a message. The driver renders diagnostics
//! through [`SourceFile::render`], which isolates the offending line and
//! places a caret under the offending column:
//!
//! ```text
//! foo.c:10: x = y + 1;
//!               ^ <error message here>
//! ```

use std::fmt::Display;

/// A single fatal finding, anchored to a byte offset in the source buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub offset: usize,
    pub message: String,
}

impl Diagnostic {
    pub fn new(offset: usize, message: impl ToString) -> Self {
        Self {
            offset,
            message: message.to_string(),
        }
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message.as_str())
    }
}

/// The source buffer, retained for the whole compilation so diagnostics can
/// index into it.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub contents: String,
}

impl SourceFile {
    /// Wrap raw file contents, appending the trailing newline the lexer
    /// relies on if the file lacks one.
    pub fn new(name: impl ToString, mut contents: String) -> Self {
        if !contents.ends_with('\n') {
            contents.push('\n');
        }
        Self {
            name: name.to_string(),
            contents,
        }
    }

    /// Render a diagnostic as the excerpt-plus-caret format.
    pub fn render(&self, diagnostic: &Diagnostic) -> String {
        let offset = diagnostic.offset.min(self.contents.len());
        let bytes = self.contents.as_bytes();

        let line_start = self.contents[..offset]
            .rfind('\n')
            .map(|at| at + 1)
            .unwrap_or(0);
        let line_end = bytes[offset..]
            .iter()
            .position(|&byte| byte == b'\n')
            .map(|at| offset + at)
            .unwrap_or(self.contents.len());

        let line_number = self.contents[..line_start]
            .bytes()
            .filter(|&byte| byte == b'\n')
            .count()
            + 1;

        let prefix = format!("{}:{}: ", self.name, line_number);
        let column = offset - line_start;
        let padding = " ".repeat(prefix.len() + column);

        format!(
            "{prefix}{line}\n{padding}^ {message}",
            line = &self.contents[line_start..line_end],
            message = diagnostic.message
        )
    }
}
