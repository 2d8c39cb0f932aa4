use std::fmt;
use std::io;

/// Boot-sector level failures: the volume cannot be interpreted at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatError {
    TooShort,
    ZeroClusterSize,
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::TooShort => write!(f, "boot sector shorter than 512 bytes"),
            FormatError::ZeroClusterSize => write!(f, "geometry yields a zero-size cluster"),
        }
    }
}

#[derive(Debug)]
pub enum FsError {
    Format(FormatError),
    Io(io::Error),
    OutOfSpace,
    DirectoryFull,
    NotFound,
    NameTooLong,
    TruncatedChain,
    CorruptChain,
}

impl fmt::Display for FsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FsError::Format(e) => write!(f, "bad volume format: {}", e),
            FsError::Io(e) => write!(f, "store i/o failed: {}", e),
            FsError::OutOfSpace => write!(f, "not enough free clusters"),
            FsError::DirectoryFull => write!(f, "no free root directory slot"),
            FsError::NotFound => write!(f, "file not found"),
            FsError::NameTooLong => write!(f, "name longer than 11 characters"),
            FsError::TruncatedChain => write!(f, "cluster chain ends before the recorded file size"),
            FsError::CorruptChain => write!(f, "cluster chain longer than the table itself"),
        }
    }
}

impl std::error::Error for FsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FsError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<FormatError> for FsError {
    fn from(e: FormatError) -> Self {
        FsError::Format(e)
    }
}

impl From<io::Error> for FsError {
    fn from(e: io::Error) -> Self {
        FsError::Io(e)
    }
}
