//! Application error type.
//!
//! Every failure carries the process exit code it maps to:
//!
//! - `2`: configuration or local IO (history/chart files)
//! - `3`: malformed upstream payload
//! - `4`: upstream fetch failure (network, HTTP status, timeout, empty data)

pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_PARSE: u8 = 3;
pub const EXIT_UPSTREAM: u8 = 4;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(EXIT_CONFIG, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(EXIT_PARSE, message)
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::new(EXIT_UPSTREAM, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
