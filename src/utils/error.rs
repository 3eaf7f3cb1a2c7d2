use thiserror::Error;

#[derive(Error, Debug)]
pub enum TableError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid accessor '{path}': {reason}")]
    InvalidAccessor { path: String, reason: String },

    #[error("Unknown model '{model}'")]
    UnknownModel { model: String },

    #[error("Model '{model}' has no field '{field}'")]
    UnknownField { model: String, field: String },

    #[error("Template error in '{template}': {reason}")]
    TemplateError { template: String, reason: String },

    #[error("Unknown route '{route}'")]
    UnknownRoute { route: String },

    #[error("Route '{route}' expects {expected} argument(s), got {actual}")]
    RouteArity {
        route: String,
        expected: usize,
        actual: usize,
    },

    #[error("Table '{table}' defines column '{column}' more than once")]
    DuplicateColumn { table: String, column: String },

    #[error("Column '{column}' in table '{table}': {reason}")]
    ColumnConflict {
        table: String,
        column: String,
        reason: String,
    },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Data source error: {message}")]
    SourceError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    TableDefinition,
    Configuration,
    DataSource,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl TableError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            TableError::InvalidAccessor { .. }
            | TableError::UnknownModel { .. }
            | TableError::UnknownField { .. }
            | TableError::TemplateError { .. }
            | TableError::UnknownRoute { .. }
            | TableError::RouteArity { .. }
            | TableError::DuplicateColumn { .. }
            | TableError::ColumnConflict { .. } => ErrorCategory::TableDefinition,
            TableError::ConfigValidationError { .. }
            | TableError::InvalidConfigValueError { .. }
            | TableError::MissingConfigError { .. } => ErrorCategory::Configuration,
            TableError::ApiError(_)
            | TableError::SerializationError(_)
            | TableError::SourceError { .. } => ErrorCategory::DataSource,
            TableError::IoError(_) | TableError::CsvError(_) => ErrorCategory::Output,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::TableDefinition | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::DataSource => ErrorSeverity::Medium,
            ErrorCategory::Output => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::TableDefinition => format!("Table definition is invalid: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::DataSource => format!("Could not load records: {}", self),
            ErrorCategory::Output => format!("Could not write output: {}", self),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            TableError::InvalidAccessor { .. } | TableError::UnknownField { .. } => {
                "Check the column's field path against the model's fields"
            }
            TableError::UnknownModel { .. } => "Register the model in the schema before defining tables on it",
            TableError::TemplateError { .. } => "Check the template for unclosed tags or unsupported filters",
            TableError::UnknownRoute { .. } | TableError::RouteArity { .. } => {
                "Add the route to the [routes] section or fix the link arguments"
            }
            TableError::DuplicateColumn { .. } | TableError::ColumnConflict { .. } => {
                "Rename or remove the conflicting column"
            }
            TableError::ConfigValidationError { .. }
            | TableError::InvalidConfigValueError { .. }
            | TableError::MissingConfigError { .. } => "Fix the configuration file or command line flags",
            TableError::ApiError(_) => "Check the API endpoint and network connectivity",
            TableError::SerializationError(_) | TableError::SourceError { .. } => {
                "Make sure the input is a JSON array of records or a {\"results\": [...]} envelope"
            }
            TableError::IoError(_) | TableError::CsvError(_) => "Check that the output path exists and is writable",
        }
    }
}

pub type Result<T> = std::result::Result<T, TableError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_errors_are_high_severity() {
        let err = TableError::UnknownField {
            model: "site".to_string(),
            field: "colour".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::TableDefinition);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.user_friendly_message().contains("colour"));
    }

    #[test]
    fn test_source_errors_are_retryable() {
        let err = TableError::SourceError {
            message: "unexpected payload".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert!(!err.recovery_suggestion().is_empty());
    }
}
