// Loader error types with helpful error messages
// Provides line/column info, a source excerpt, and suggestions for common mistakes

use thiserror::Error;

/// Detailed parse error with location and context
#[derive(Debug, Clone, Error)]
#[error("{}{}", .message, location_suffix(*.line, *.column))]
pub struct ParseError {
    /// Error message
    pub message: String,
    /// Line number (1-indexed, 0 when unknown)
    pub line: usize,
    /// Column number (1-indexed, 0 when unknown)
    pub column: usize,
    /// Surrounding source lines
    pub context: String,
    /// Optional suggestion for fixing the error
    pub suggestion: Option<String>,
    pub kind: ParseErrorKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Malformed JSON or YAML text
    Syntax,
    /// Well-formed text with the wrong shape (wrong types, missing fields)
    InvalidSchema,
    /// Stage relationships that cannot form one execution (e.g. duplicate ids)
    InvalidGraph,
    /// File could not be read
    Io,
}

impl ParseError {
    pub fn new(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            message: message.into(),
            line,
            column,
            context: String::new(),
            suggestion: None,
            kind: ParseErrorKind::InvalidSchema,
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(message, 0, 0).with_kind(ParseErrorKind::Io)
    }

    pub fn with_kind(mut self, kind: ParseErrorKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    fn with_suggestion_opt(mut self, suggestion: Option<String>) -> Self {
        self.suggestion = suggestion;
        self
    }

    /// Create context from source content
    pub fn with_source_context(mut self, source: &str, context_lines: usize) -> Self {
        if self.line == 0 {
            return self;
        }

        let lines: Vec<&str> = source.lines().collect();
        let start = self.line.saturating_sub(context_lines + 1);
        let end = (self.line + context_lines).min(lines.len());

        let mut context = String::new();
        for (i, line) in lines.iter().enumerate().take(end).skip(start) {
            let line_num = i + 1;
            let prefix = if line_num == self.line { ">" } else { " " };
            context.push_str(&format!("{} {:4} | {}\n", prefix, line_num, line));

            if line_num == self.line && self.column > 0 {
                let indicator = " ".repeat(self.column - 1) + "^";
                context.push_str(&format!("       | {}\n", indicator));
            }
        }

        self.context = context;
        self
    }

    /// Create from serde_json error
    pub fn from_json_error(err: &serde_json::Error, source: &str) -> Self {
        let kind = match err.classify() {
            serde_json::error::Category::Syntax | serde_json::error::Category::Eof => {
                ParseErrorKind::Syntax
            }
            serde_json::error::Category::Io => ParseErrorKind::Io,
            serde_json::error::Category::Data => classify_data_error(&err.to_string()),
        };

        let message = strip_location(&err.to_string());
        let suggestion = suggest_fix(&message);

        ParseError::new(message, err.line(), err.column())
            .with_kind(kind)
            .with_source_context(source, 2)
            .with_suggestion_opt(suggestion)
    }

    /// Create from serde_yaml error
    pub fn from_yaml_error(err: &serde_yaml::Error, source: &str) -> Self {
        let (line, column) = err
            .location()
            .map(|loc| (loc.line(), loc.column()))
            .unwrap_or((0, 0));

        let raw = err.to_string();
        let kind = if raw.contains("invalid type")
            || raw.contains("missing field")
            || raw.contains("unknown variant")
        {
            ParseErrorKind::InvalidSchema
        } else if raw.contains("graph error") {
            ParseErrorKind::InvalidGraph
        } else if line == 0 {
            ParseErrorKind::InvalidSchema
        } else {
            ParseErrorKind::Syntax
        };

        let message = strip_location(&raw);
        let suggestion = suggest_fix(&message);

        ParseError::new(message, line, column)
            .with_kind(kind)
            .with_source_context(source, 2)
            .with_suggestion_opt(suggestion)
    }

    /// Multi-line rendering with the source excerpt and suggestion
    pub fn report(&self) -> String {
        let mut out = format!("error: {}\n", self.message);
        if self.line > 0 {
            out.push_str(&format!("  --> line {}:{}\n", self.line, self.column));
        }
        if !self.context.is_empty() {
            out.push('\n');
            out.push_str(&self.context);
        }
        if let Some(suggestion) = &self.suggestion {
            out.push_str(&format!("\nhelp: {}\n", suggestion));
        }
        out
    }
}

fn location_suffix(line: usize, column: usize) -> String {
    if line == 0 {
        String::new()
    } else {
        format!(" (line {}:{})", line, column)
    }
}

fn classify_data_error(msg: &str) -> ParseErrorKind {
    if msg.contains("graph error") {
        ParseErrorKind::InvalidGraph
    } else {
        ParseErrorKind::InvalidSchema
    }
}

/// Drop the trailing " at line X column Y" both serde backends append
fn strip_location(msg: &str) -> String {
    match msg.rfind(" at line ") {
        Some(idx) => msg[..idx].to_string(),
        None => msg.to_string(),
    }
}

/// Suggest fixes for common mistakes in execution definitions
fn suggest_fix(msg: &str) -> Option<String> {
    if msg.contains("missing field `type`") {
        return Some("every stage needs a 'type' field".to_string());
    }

    if msg.contains("unknown variant") && msg.contains("STAGE_BEFORE") {
        return Some(
            "syntheticStageOwner must be STAGE_BEFORE, STAGE_AFTER, or omitted".to_string(),
        );
    }

    if msg.contains("requisiteStageRefIds") {
        return Some(
            "requisiteStageRefIds must be a refId string or a list of refId strings".to_string(),
        );
    }

    if msg.contains("already exists in execution") {
        return Some("stage ids must be unique within an execution".to_string());
    }

    None
}

/// Result type for loader operations
pub type ParseResult<T> = Result<T, ParseError>;
