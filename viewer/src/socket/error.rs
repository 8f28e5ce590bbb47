use std::fmt;

#[derive(Debug)]
pub(crate) enum SocketError {
    BadEnvelope,
    BadSnapshot,
}

impl fmt::Display for SocketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SocketError::BadEnvelope => write!(f, "Could not decode feed envelope"),
            SocketError::BadSnapshot => write!(f, "Could not decode fleet snapshot"),
        }
    }
}
