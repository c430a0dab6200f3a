use thiserror::Error;

/// Errors raised by the notes controller. None of them leave the controller
/// in a partially applied state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotesError {
    /// An operation was attempted without the state it depends on.
    #[error("{0}")]
    Precondition(String),
    #[error("unknown view `{0}`")]
    InvalidView(String),
    #[error("unknown sheet `{0}`")]
    InvalidSheet(String),
    #[error("week {0} is outside 1..=52")]
    InvalidWeek(i64),
    #[error("{0}")]
    InvalidField(String),
    #[error("unknown command `{0}` (type `help`)")]
    UnknownCommand(String),
}

impl NotesError {
    pub fn precondition(message: impl Into<String>) -> Self {
        NotesError::Precondition(message.into())
    }

    pub fn invalid_field(message: impl Into<String>) -> Self {
        NotesError::InvalidField(message.into())
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Unavailable(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Unavailable(format!("corrupt store: {err}"))
    }
}

/// Raised by a `RichTextEditor` that cannot carry out a formatting request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("editor rejected `{0}`")]
pub struct FormatError(pub &'static str);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdminError {
    #[error("{0}")]
    Validation(&'static str),
}
