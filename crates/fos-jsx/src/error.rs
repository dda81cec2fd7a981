//! Compile errors
//!
//! Every error points at the JSX that caused it. [`CompileError::report`]
//! renders an ariadne code frame for the CLI.

use ariadne::{Config, IndexType, Label, Report, ReportKind, Source};

use crate::token::Span;

/// Result type for compilation
pub type CompileResult<T> = Result<T, CompileError>;

/// Compilation errors. Any of them aborts the file.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompileError {
    #[error("spread children are not supported")]
    SpreadChild { span: Span },

    #[error("<{child}> cannot be a child of <{parent}>")]
    InvalidNesting {
        parent: String,
        child: String,
        span: Span,
    },

    #[error("the HTML parser would restructure this markup: {message}")]
    MalformedHtml { message: String, span: Span },

    #[error("cannot resolve tag name `{name}`")]
    UnresolvedName { name: String, span: Span },

    #[error("syntax error: {message}")]
    Syntax { message: String, span: Span },
}

impl CompileError {
    pub fn syntax(message: impl Into<String>, span: Span) -> Self {
        CompileError::Syntax {
            message: message.into(),
            span,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            CompileError::SpreadChild { span }
            | CompileError::InvalidNesting { span, .. }
            | CompileError::MalformedHtml { span, .. }
            | CompileError::UnresolvedName { span, .. }
            | CompileError::Syntax { span, .. } => *span,
        }
    }

    /// 1-based line and column of the error in `source`
    pub fn line_column(&self, source: &str) -> (usize, usize) {
        let offset = (self.span().start as usize).min(source.len());
        let before = &source[..floor_char_boundary(source, offset)];
        let line = before.matches('\n').count() + 1;
        let column = before
            .rfind('\n')
            .map_or(before, |newline| &before[newline + 1..])
            .chars()
            .count()
            + 1;
        (line, column)
    }

    fn label(&self) -> String {
        match self {
            CompileError::SpreadChild { .. } => "spread used as a child".to_string(),
            CompileError::InvalidNesting { parent, .. } => {
                format!("not allowed inside <{}>", parent)
            }
            CompileError::MalformedHtml { .. } => "this element".to_string(),
            CompileError::UnresolvedName { .. } => "tag".to_string(),
            CompileError::Syntax { .. } => "here".to_string(),
        }
    }

    /// Code frame for `source` (named `file`)
    pub fn report(&self, source: &str, file: &str) -> String {
        let range = self.span().range();
        let mut out = Vec::new();
        let written = Report::build(ReportKind::Error, (file, range.clone()))
            .with_config(
                Config::default()
                    .with_color(false)
                    .with_index_type(IndexType::Byte),
            )
            .with_message(self.to_string())
            .with_label(Label::new((file, range)).with_message(self.label()))
            .finish()
            .write((file, Source::from(source)), &mut out);
        match written {
            Ok(()) => String::from_utf8_lossy(&out).into_owned(),
            Err(err) => {
                tracing::debug!("rendering code frame failed: {}", err);
                let (line, column) = self.line_column(source);
                format!("{}:{}:{}: {}", file, line, column, self)
            }
        }
    }
}

fn floor_char_boundary(s: &str, mut index: usize) -> usize {
    while index > 0 && !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}
