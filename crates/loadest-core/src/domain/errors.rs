use std::error::Error;
use std::fmt::{Display, Formatter};

pub type LoadestResult<T> = Result<T, LoadestError>;

/// Failure taxonomy for the translator. Every category maps to a stable
/// process exit status; `OutputConflict` keeps the historical status 10 so
/// existing batch scripts can distinguish it from table or schema failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadestErrorCategory {
    Success,
    SchemaError,
    IoSystemError,
    MalformedTable,
    InternalError,
    OutputConflict,
}

impl LoadestErrorCategory {
    pub const fn exit_status(self) -> ExitStatusContract {
        match self {
            Self::Success => ExitStatusContract {
                exit_code: 0,
                category_name: "Success",
            },
            Self::SchemaError => ExitStatusContract {
                exit_code: 2,
                category_name: "SchemaError",
            },
            Self::IoSystemError => ExitStatusContract {
                exit_code: 3,
                category_name: "IoSystemError",
            },
            Self::MalformedTable => ExitStatusContract {
                exit_code: 4,
                category_name: "MalformedTable",
            },
            Self::InternalError => ExitStatusContract {
                exit_code: 5,
                category_name: "InternalError",
            },
            Self::OutputConflict => ExitStatusContract {
                exit_code: 10,
                category_name: "OutputConflict",
            },
        }
    }

    pub const fn exit_code(self) -> i32 {
        self.exit_status().exit_code
    }

    pub const fn category_name(self) -> &'static str {
        self.exit_status().category_name
    }

    pub const fn is_fatal(self) -> bool {
        !matches!(self, Self::Success)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitStatusContract {
    pub exit_code: i32,
    pub category_name: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadestError {
    category: LoadestErrorCategory,
    code: &'static str,
    message: String,
}

impl LoadestError {
    pub fn new(
        category: LoadestErrorCategory,
        code: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            code,
            message: message.into(),
        }
    }

    pub fn schema(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(LoadestErrorCategory::SchemaError, code, message)
    }

    pub fn io_system(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(LoadestErrorCategory::IoSystemError, code, message)
    }

    pub fn malformed_table(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(LoadestErrorCategory::MalformedTable, code, message)
    }

    pub fn internal(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(LoadestErrorCategory::InternalError, code, message)
    }

    pub fn output_conflict(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(LoadestErrorCategory::OutputConflict, code, message)
    }

    pub const fn category(&self) -> LoadestErrorCategory {
        self.category
    }

    pub const fn code(&self) -> &'static str {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn exit_code(&self) -> i32 {
        self.category.exit_code()
    }

    pub fn diagnostic_line(&self) -> String {
        let severity = if self.category.is_fatal() {
            "ERROR"
        } else {
            "INFO"
        };
        format!("{}: [{}] {}", severity, self.code, self.message)
    }

    pub fn fatal_exit_line(&self) -> Option<String> {
        self.category
            .is_fatal()
            .then(|| format!("FATAL EXIT CODE: {}", self.exit_code()))
    }
}

impl Display for LoadestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.category.category_name(),
            self.code,
            self.message
        )
    }
}

impl Error for LoadestError {}
