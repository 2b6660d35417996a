//! The three error kinds the pipeline driver can raise (§7), and the
//! diagnostic renderer every kind funnels through for display: file path,
//! the offending line, a caret underline spanning `[start, end)`, and the
//! message below it.

use std::fmt;

use roc_base::SpannedError;

/// Hand-rolled ANSI styling, no terminal-color crate required: small,
/// fixed palette used only by [`Diagnostic::render`].
struct Style;

impl Style {
    const RESET: &'static str = "\x1b[0m";
    const BOLD_RED: &'static str = "\x1b[1;31m";
    const BLUE: &'static str = "\x1b[34m";
    const RED: &'static str = "\x1b[31m";

    fn bold_red(s: &str) -> String {
        format!("{}{}{}", Self::BOLD_RED, s, Self::RESET)
    }
    fn blue(s: &str) -> String {
        format!("{}{}{}", Self::BLUE, s, Self::RESET)
    }
    fn red(s: &str) -> String {
        format!("{}{}{}", Self::RED, s, Self::RESET)
    }
}

/// One error ready to render against the source it came from.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub message: String,
    pub span: roc_base::Span,
}

impl From<SpannedError> for Diagnostic {
    fn from(err: SpannedError) -> Self {
        Diagnostic {
            message: err.message,
            span: err.span,
        }
    }
}

impl Diagnostic {
    /// Renders `file: error` followed by the offending source line and a
    /// caret underline, matching the shape every diagnostic in this
    /// compiler takes regardless of which pass raised it.
    pub fn render(&self, file: &str, source: &str) -> String {
        let (line_num, line_start, line_content) = find_context(source, self.span.start);
        let col = self.span.start.saturating_sub(line_start);
        let len = self.span.len().max(1);
        let underline = format!("{}{}", " ".repeat(col), "^".repeat(len));

        format!(
            "{}:{}: {}\n\n{} {} {}\n     {} {}",
            file,
            line_num,
            Style::bold_red("error"),
            Style::blue(&format!("{line_num:4}")),
            Style::blue("|"),
            line_content,
            Style::blue("|"),
            Style::red(&format!("{underline} {}", self.message)),
        )
    }
}

fn find_context(source: &str, offset: usize) -> (usize, usize, &str) {
    let mut line_num = 1;
    let mut line_start = 0;

    for (i, c) in source.char_indices() {
        if i >= offset {
            break;
        }
        if c == '\n' {
            line_num += 1;
            line_start = i + 1;
        }
    }

    let line_end = source[line_start..]
        .find('\n')
        .map(|off| line_start + off)
        .unwrap_or(source.len());

    (line_num, line_start, &source[line_start..line_end])
}

/// The three kinds of failure a module's compilation can end in (§7).
/// `Semantic` carries every error collected across the whole module — a
/// single bad function doesn't stop the rest of the module from being
/// checked. `Syntax` and `Internal` each carry exactly one, since the
/// parser aborts on its first error and an internal invariant violation
/// is by definition the first thing that went wrong.
#[derive(Debug, Clone)]
pub enum CompileError {
    Syntax(Diagnostic),
    Semantic(Vec<Diagnostic>),
    Internal(String),
}

impl CompileError {
    /// Renders every diagnostic this error carries against `file`/`source`,
    /// one per line-block, in the order they were raised.
    pub fn render(&self, file: &str, source: &str) -> String {
        match self {
            CompileError::Syntax(d) => d.render(file, source),
            CompileError::Semantic(ds) => ds
                .iter()
                .map(|d| d.render(file, source))
                .collect::<Vec<_>>()
                .join("\n\n"),
            CompileError::Internal(message) => {
                format!("{}: {message}", Style::bold_red("internal compiler error"))
            }
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Syntax(d) => write!(f, "syntax error: {}", d.message),
            CompileError::Semantic(ds) => write!(f, "{} semantic error(s)", ds.len()),
            CompileError::Internal(message) => write!(f, "internal error: {message}"),
        }
    }
}

impl std::error::Error for CompileError {}
