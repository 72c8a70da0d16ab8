use super::translators::Translation;
use crate::diag::DiagCategory;
use itertools::Itertools;
use std::fmt::Write;

/// Accumulates the generated script. Text is only ever appended, in the
/// order the calls are made.
#[derive(Debug, Clone, Default)]
pub struct CodeEmitter {
    buffer: String,
}

impl CodeEmitter {
    /// Starts a script with the import header followed by a blank line.
    pub fn new(imports: &[String]) -> Self {
        let mut buffer = String::new();
        for line in imports {
            buffer.push_str(line);
            buffer.push('\n');
        }
        buffer.push('\n');
        Self { buffer }
    }

    /// Appends one node's output. Unsupported-kind notices become a comment
    /// line ahead of the node's statements.
    pub fn node(&mut self, translation: &Translation) {
        for diagnostic in &translation.diagnostics {
            if diagnostic.category == DiagCategory::UnsupportedKind {
                self.comment(&diagnostic.message);
            }
        }
        for statement in &translation.statements {
            self.buffer.push_str(statement);
            self.buffer.push('\n');
        }
    }

    pub fn summary<'a>(&mut self, variables: impl IntoIterator<Item = &'a str>) {
        self.buffer.push('\n');
        self.comment(&format!("Available DataFrames: {}", variables.into_iter().join(", ")));
    }

    pub fn timeout(&mut self) {
        self.buffer.push('\n');
        self.comment(
            "Conversion timed out. Some nodes may not have been processed due to potential cycles.",
        );
    }

    pub fn unprocessed(&mut self, ids: &[String]) {
        if ids.is_empty() {
            return;
        }
        self.buffer.push('\n');
        self.comment(&format!(
            "The following nodes could not be processed (cyclic or missing dependencies): {}",
            ids.join(", ")
        ));
    }

    fn comment(&mut self, text: &str) {
        // Writing into a String cannot fail.
        let _ = writeln!(self.buffer, "# {}", text);
    }

    pub fn finish(self) -> String {
        self.buffer
    }
}
