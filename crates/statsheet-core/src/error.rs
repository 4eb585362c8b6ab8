use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad command line, config, or parameter mapping.
    Usage,
    /// Parameters that name the wrong columns, or data unfit for the requested test.
    Validation,
    /// Unreachable source, unsupported format, or an empty parse.
    Load,
    /// A fault in statsheet itself rather than in the request or the data.
    Internal,
}

impl ErrorKind {
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorKind::Usage => 2,
            ErrorKind::Validation => 3,
            ErrorKind::Load => 4,
            ErrorKind::Internal => 5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Usage => "usage",
            ErrorKind::Validation => "validation",
            ErrorKind::Load => "load",
            ErrorKind::Internal => "internal",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppError {
    kind: ErrorKind,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn exit_code(&self) -> i32 {
        self.kind.exit_code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Usage, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn load(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Load, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Text for an analysis failure record. Internal faults are not echoed to the caller.
    pub fn record_message(&self) -> String {
        match self.kind {
            ErrorKind::Internal => INTERNAL_FAILURE.to_string(),
            _ => self.message.clone(),
        }
    }

    /// One-line report for stderr, prefixed with the error kind.
    pub fn report_line(&self) -> String {
        format!("{} error: {}", self.kind.as_str(), self.message)
    }
}

pub const INTERNAL_FAILURE: &str = "the analysis failed because of an internal error";

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

pub type AppResult<T> = Result<T, AppError>;
