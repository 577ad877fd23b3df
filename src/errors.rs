use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelError {
    InvalidAmount(String),
    UnsupportedCurrency(String),
    BelowMinimum(String),
    ExceedsBalance(String),
    MissingReason(String),
    EmptySelection(String),
    BatchTooLarge(String),
    Cancelled(String),
    AlreadySubmitting(String),
    UnsupportedAction(String),
    StaleSelection(String),
    Validation(String),
    Config(String),
    Client(String),
}

impl PanelError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            PanelError::InvalidAmount(_) => "E101",
            PanelError::UnsupportedCurrency(_) => "E102",
            PanelError::BelowMinimum(_) => "E103",
            PanelError::ExceedsBalance(_) => "E104",
            PanelError::MissingReason(_) => "E201",
            PanelError::EmptySelection(_) => "E202",
            PanelError::BatchTooLarge(_) => "E203",
            PanelError::Cancelled(_) => "E204",
            PanelError::AlreadySubmitting(_) => "E205",
            PanelError::UnsupportedAction(_) => "E206",
            PanelError::StaleSelection(_) => "E301",
            PanelError::Validation(_) => "E401",
            PanelError::Config(_) => "E402",
            PanelError::Client(_) => "E501",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            PanelError::InvalidAmount(_) => "Invalid Amount",
            PanelError::UnsupportedCurrency(_) => "Unsupported Currency",
            PanelError::BelowMinimum(_) => "Below Minimum",
            PanelError::ExceedsBalance(_) => "Exceeds Balance",
            PanelError::MissingReason(_) => "Missing Reason",
            PanelError::EmptySelection(_) => "Empty Selection",
            PanelError::BatchTooLarge(_) => "Batch Too Large",
            PanelError::Cancelled(_) => "Action Cancelled",
            PanelError::AlreadySubmitting(_) => "Already Submitting",
            PanelError::UnsupportedAction(_) => "Unsupported Action",
            PanelError::StaleSelection(_) => "Stale Selection",
            PanelError::Validation(_) => "Validation Error",
            PanelError::Config(_) => "Configuration Error",
            PanelError::Client(_) => "Client Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            PanelError::InvalidAmount(msg) => msg,
            PanelError::UnsupportedCurrency(msg) => msg,
            PanelError::BelowMinimum(msg) => msg,
            PanelError::ExceedsBalance(msg) => msg,
            PanelError::MissingReason(msg) => msg,
            PanelError::EmptySelection(msg) => msg,
            PanelError::BatchTooLarge(msg) => msg,
            PanelError::Cancelled(msg) => msg,
            PanelError::AlreadySubmitting(msg) => msg,
            PanelError::UnsupportedAction(msg) => msg,
            PanelError::StaleSelection(msg) => msg,
            PanelError::Validation(msg) => msg,
            PanelError::Config(msg) => msg,
            PanelError::Client(msg) => msg,
        }
    }

    /// Errors that are resolved where the input was made and never reach the network.
    pub fn is_local_validation(&self) -> bool {
        matches!(
            self,
            PanelError::InvalidAmount(_)
                | PanelError::UnsupportedCurrency(_)
                | PanelError::BelowMinimum(_)
                | PanelError::ExceedsBalance(_)
                | PanelError::MissingReason(_)
                | PanelError::EmptySelection(_)
                | PanelError::BatchTooLarge(_)
                | PanelError::Validation(_)
        )
    }

    /// 格式化为彩色输出（用于 CLI 模式）
    #[cfg(feature = "cli")]
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for PanelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for PanelError {}

// 便捷的构造函数
impl PanelError {
    pub fn invalid_amount<T: Into<String>>(msg: T) -> Self {
        PanelError::InvalidAmount(msg.into())
    }

    pub fn unsupported_currency<T: Into<String>>(msg: T) -> Self {
        PanelError::UnsupportedCurrency(msg.into())
    }

    pub fn below_minimum<T: Into<String>>(msg: T) -> Self {
        PanelError::BelowMinimum(msg.into())
    }

    pub fn exceeds_balance<T: Into<String>>(msg: T) -> Self {
        PanelError::ExceedsBalance(msg.into())
    }

    pub fn missing_reason<T: Into<String>>(msg: T) -> Self {
        PanelError::MissingReason(msg.into())
    }

    pub fn empty_selection<T: Into<String>>(msg: T) -> Self {
        PanelError::EmptySelection(msg.into())
    }

    pub fn batch_too_large<T: Into<String>>(msg: T) -> Self {
        PanelError::BatchTooLarge(msg.into())
    }

    pub fn cancelled<T: Into<String>>(msg: T) -> Self {
        PanelError::Cancelled(msg.into())
    }

    pub fn already_submitting<T: Into<String>>(msg: T) -> Self {
        PanelError::AlreadySubmitting(msg.into())
    }

    pub fn unsupported_action<T: Into<String>>(msg: T) -> Self {
        PanelError::UnsupportedAction(msg.into())
    }

    pub fn stale_selection<T: Into<String>>(msg: T) -> Self {
        PanelError::StaleSelection(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        PanelError::Validation(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        PanelError::Config(msg.into())
    }

    pub fn client<T: Into<String>>(msg: T) -> Self {
        PanelError::Client(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<std::io::Error> for PanelError {
    fn from(err: std::io::Error) -> Self {
        PanelError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for PanelError {
    fn from(err: serde_json::Error) -> Self {
        PanelError::Validation(err.to_string())
    }
}

impl From<rust_decimal::Error> for PanelError {
    fn from(err: rust_decimal::Error) -> Self {
        PanelError::InvalidAmount(err.to_string())
    }
}

impl From<crate::client::ClientError> for PanelError {
    fn from(err: crate::client::ClientError) -> Self {
        PanelError::Client(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PanelError>;
