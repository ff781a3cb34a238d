//! Common error type for data source collaborators

/// Error raised by an updater, parser or data source factory.
///
/// Exporters never raise; they report a boolean instead.
#[derive(Debug)]
pub enum SourceError {
    /// Local filesystem failure.
    Io(std::io::Error),
    /// Upstream could not be reached or its version info could not be read.
    Upstream(String),
    /// Input files are missing or malformed.
    Data(String),
    /// The data source could not be constructed.
    Instantiate(String),
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO: {e}"),
            Self::Upstream(msg) => write!(f, "upstream unavailable: {msg}"),
            Self::Data(msg) => write!(f, "invalid data: {msg}"),
            Self::Instantiate(msg) => write!(f, "instantiation failed: {msg}"),
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SourceError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl SourceError {
    /// Whether the failure came from the upstream side rather than local state.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Upstream(_))
    }
}
