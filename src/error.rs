use thiserror::Error;

/// Everything that can end an upload attempt.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UploadError {
    #[error("no image selected")]
    NoFileSelected,
    #[error("unsupported file type `{0}`, expected an image")]
    UnsupportedType(String),
    #[error("file is {size} bytes, the limit is {limit} bytes")]
    TooLarge { size: u64, limit: u64 },
    #[error("could not read the selected file: {0}")]
    FileRead(String),
    #[error("{0}")]
    Transport(String),
    #[error("malformed server response: {0}")]
    MalformedResponse(String),
    /// Message reported by the server in the `error` field, shown verbatim.
    #[error("{0}")]
    Server(String),
    #[error("an analysis is already in progress")]
    Busy,
}

impl UploadError {
    /// `Busy` is only logged, every other kind ends up in front of the user.
    pub fn is_user_facing(&self) -> bool {
        !matches!(self, UploadError::Busy)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            UploadError::NoFileSelected => "no-file",
            UploadError::UnsupportedType(_) => "unsupported-type",
            UploadError::TooLarge { .. } => "too-large",
            UploadError::FileRead(_) => "file-read",
            UploadError::Transport(_) => "transport",
            UploadError::MalformedResponse(_) => "malformed-response",
            UploadError::Server(_) => "server",
            UploadError::Busy => "busy",
        }
    }
}
