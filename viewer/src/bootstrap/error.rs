use std::fmt;

#[derive(Debug)]
pub(crate) enum BootstrapError {
    Fetch,
    FetchRequest,
    BadResponse,
    BadBody,
}

impl fmt::Display for BootstrapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BootstrapError::Fetch => write!(f, "Failed to create bootstrap client"),
            BootstrapError::FetchRequest => write!(f, "Failed to send bootstrap request"),
            BootstrapError::BadResponse => write!(f, "Bad response for bootstrap fetch"),
            BootstrapError::BadBody => write!(f, "Failed to deserialize fleet listing"),
        }
    }
}
