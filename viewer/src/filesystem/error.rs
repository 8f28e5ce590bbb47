use std::fmt;

#[derive(Debug)]
pub(crate) enum FileSystemError {
    ReadFile,
    BadToml,
    CreateDirectory,
    LogFile,
}

impl fmt::Display for FileSystemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileSystemError::ReadFile => write!(f, "Could not read file"),
            FileSystemError::BadToml => write!(f, "Failed to parse TOML data"),
            FileSystemError::CreateDirectory => write!(f, "Could not create directory"),
            FileSystemError::LogFile => write!(f, "Could not create log file"),
        }
    }
}
