use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Poll {poll_id} has no title")]
    MissingTitle { poll_id: String },

    #[error("Poll {poll_id} lists option {option_id} more than once")]
    DuplicateOption { poll_id: String, option_id: String },

    #[error("Invalid color {0:?}, expected #rgb or #rrggbb")]
    InvalidColor(String),
}

pub type Result<T> = std::result::Result<T, Error>;
