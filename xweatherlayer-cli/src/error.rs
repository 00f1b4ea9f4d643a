//! Error type for CLI commands.

/// Errors surfaced to the CLI user.
#[derive(Debug)]
pub enum CliError {
    /// An argument could not be interpreted.
    InvalidArgument(String),

    /// Setting up the runtime environment failed.
    Setup(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            Self::Setup(msg) => write!(f, "setup failed: {}", msg),
        }
    }
}

impl std::error::Error for CliError {}
