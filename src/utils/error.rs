use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Upload request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Parse error: {message}")]
    ParseError { message: String },

    #[error("Upload rejected with status {status}")]
    UploadStatusError { status: u16 },

    #[error("Background task failed: {message}")]
    TaskError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Network,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AppError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AppError::ConfigValidationError { .. }
            | AppError::InvalidConfigValueError { .. }
            | AppError::MissingConfigError { .. } => ErrorCategory::Configuration,
            AppError::CsvError(_) | AppError::ParseError { .. } => ErrorCategory::Input,
            AppError::HttpError(_) | AppError::UploadStatusError { .. } => ErrorCategory::Network,
            AppError::IoError(_) | AppError::SerializationError(_) | AppError::TaskError { .. } => {
                ErrorCategory::System
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // upload failures only revert the session to the select state
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Input => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            AppError::ConfigValidationError { field, message } => {
                format!("Invalid configuration ({}): {}", field, message)
            }
            AppError::InvalidConfigValueError { field, value, reason } => {
                format!("'{}' is not a valid value for {}: {}", value, field, reason)
            }
            AppError::MissingConfigError { field } => {
                format!("Required setting '{}' is missing", field)
            }
            AppError::CsvError(_) | AppError::ParseError { .. } => {
                format!("The selected file could not be read as CSV: {}", self)
            }
            AppError::HttpError(_) | AppError::UploadStatusError { .. } => {
                format!("Upload did not complete: {}", self)
            }
            AppError::IoError(e) => format!("File access failed: {}", e),
            AppError::SerializationError(e) => format!("Could not serialize output: {}", e),
            AppError::TaskError { message } => format!("Internal task failed: {}", message),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => "Check the command-line flags and the TOML config file",
            ErrorCategory::Input => "Make sure the file is UTF-8 CSV with a header row",
            ErrorCategory::Network => "Check the upload endpoint and network connection, then resubmit",
            ErrorCategory::System => "Check file permissions and available resources",
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
