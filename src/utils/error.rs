use thiserror::Error;

#[derive(Error, Debug)]
pub enum ComponentError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Completion service returned {status}: {message}")]
    ApiResponseError { status: u16, message: String },

    #[error("Completion output is not valid JSON: {message}")]
    DecodeError { message: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Missing required parameter: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("{message}")]
    UserError { message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

impl ComponentError {
    /// Exit code contract with the host platform: 1 means the user can fix
    /// it in the configuration, 2 means everything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::ConfigError { .. }
            | Self::UserError { .. } => 1,
            _ => 2,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::MissingConfigError { field } => {
                format!("Required parameter '{}' is missing from the configuration", field)
            }
            Self::InvalidConfigValueError { field, reason, .. } => {
                format!("Parameter '{}' is invalid: {}", field, reason)
            }
            Self::ConfigError { message } => format!("Configuration error: {}", message),
            Self::UserError { message } => message.clone(),
            Self::ApiError(_) | Self::ApiResponseError { .. } => {
                format!("The completion service request failed: {}", self)
            }
            Self::DecodeError { .. } => {
                "The completion service answered with output that is not valid JSON".to_string()
            }
            _ => self.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::MissingConfigError { .. } => {
                "Add the parameter to the 'parameters' section of config.json"
            }
            Self::InvalidConfigValueError { .. } => "Fix the parameter value in config.json",
            Self::ConfigError { .. } | Self::UserError { .. } => {
                "Check the component configuration"
            }
            Self::ApiError(_) => "Check network connectivity and the api_base setting",
            Self::ApiResponseError { .. } => "Check the API token and the service status page",
            Self::DecodeError { .. } => {
                "Adjust the base prompt so the model answers with JSON only"
            }
            Self::CsvError(_) => "Check that the input table is well-formed CSV",
            Self::IoError(_) => "Check the data directory layout and permissions",
            _ => "Re-run with --verbose for details",
        }
    }
}

pub type Result<T> = std::result::Result<T, ComponentError>;
