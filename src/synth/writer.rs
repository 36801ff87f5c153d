//! Text assembly helpers for generated source.
//!
//! Generated files are built as a flat list of blocks joined by newlines;
//! nesting is expressed by indenting whole blocks rather than by tracking
//! a cursor.

/// Indent every non-empty line by `level` steps of four spaces.
pub fn indented(text: &str, level: usize) -> String {
    let pad = " ".repeat(level * 4);
    text.split('\n')
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{}{}", pad, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Ordered blocks of output text, rendered newline-joined.
#[derive(Debug, Default)]
pub struct Blocks {
    parts: Vec<String>,
}

impl Blocks {
    pub fn new() -> Self {
        Blocks::default()
    }

    pub fn push(&mut self, part: impl Into<String>) {
        self.parts.push(part.into());
    }

    pub fn extend<I>(&mut self, parts: I)
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        for part in parts {
            self.push(part);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn render(&self) -> String {
        self.parts.join("\n")
    }
}
