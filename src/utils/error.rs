use thiserror::Error;

/// 輸入或抽獎條件不合法；呼叫端同步收到，抽獎不會進行
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Entry cannot be empty or whitespace-only")]
    BlankEntry,

    #[error("Entry '{entry}' has already been added")]
    DuplicateEntry { entry: String },

    #[error("At least one entry is required for a draw")]
    EmptyPool,

    #[error("Winner count must be at least 1 (got {requested})")]
    WinnerCountTooSmall { requested: usize },

    #[error("Winner count {requested} exceeds the number of entries ({pool_size})")]
    WinnerCountExceedsPool { requested: usize, pool_size: usize },

    #[error("At least one team is required for a matching draw")]
    EmptyTeams,

    #[error("At least one candidate is required for a matching draw")]
    EmptyCandidates,

    #[error("Index {index} is out of range for a pool of {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("League '{name}' was not found in the catalog")]
    UnknownLeague { name: String },
}

#[derive(Error, Debug)]
pub enum RaffleError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Cannot start a draw or edit pools while the session is {phase}")]
    DrawNotReady { phase: String },

    #[error("The draw was cancelled")]
    Cancelled,

    #[error("Persistence error: {message}")]
    Persistence { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV export error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    DrawState,
    Persistence,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl RaffleError {
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation(_) => ErrorCategory::Validation,
            Self::DrawNotReady { .. } | Self::Cancelled => ErrorCategory::DrawState,
            Self::Persistence { .. }
            | Self::IoError(_)
            | Self::SerializationError(_)
            | Self::HttpError(_)
            | Self::CsvError(_) => ErrorCategory::Persistence,
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Validation => ErrorSeverity::High,
            ErrorCategory::DrawState => match self {
                Self::Cancelled => ErrorSeverity::Low,
                _ => ErrorSeverity::Medium,
            },
            ErrorCategory::Persistence => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// CLI 結束碼；取消使用 130（與 SIGINT 慣例相同）
    pub fn exit_code(&self) -> i32 {
        if let Self::Cancelled = self {
            return 130;
        }
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,   // 可重試
            ErrorSeverity::High => 1,     // 輸入錯誤
            ErrorSeverity::Critical => 3, // 設定錯誤
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::Validation(ValidationError::WinnerCountExceedsPool { .. })
            | Self::Validation(ValidationError::WinnerCountTooSmall { .. }) => {
                "Pick a winner count between 1 and the number of entries"
            }
            Self::Validation(ValidationError::DuplicateEntry { .. }) => {
                "Remove the repeated name; entries are matched exactly, including case"
            }
            Self::Validation(ValidationError::UnknownLeague { .. }) => {
                "Run the `leagues` command to list the available leagues"
            }
            Self::Validation(_) => "Add the missing entries and try the draw again",
            Self::DrawNotReady { .. } => "Wait for the current draw to finish or reset the session",
            Self::Cancelled => "Start a new draw when ready",
            Self::HttpError(_) => "Check that the history endpoint is reachable",
            Self::Persistence { .. } | Self::IoError(_) => {
                "Check that the history location exists and is writable"
            }
            Self::SerializationError(_) => "The history document is malformed; fix or move it aside",
            Self::CsvError(_) => "Check the export path and try again",
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => "Review the configuration file and command-line flags",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Validation => format!("Cannot start the draw: {}", self),
            ErrorCategory::DrawState => self.to_string(),
            ErrorCategory::Persistence => format!("Draw history could not be accessed: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, RaffleError>;
