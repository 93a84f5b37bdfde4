use reqwest::StatusCode;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The request never produced a response, or the body could not be read.
    #[error("Request error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected response {status}: {body}")]
    Response { status: StatusCode, body: String },

    #[error("Malformed response body: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Invalid url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl Error {
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }

    /// Whether the server answered but the answer was unusable.
    pub fn is_response(&self) -> bool {
        matches!(self, Error::Response { .. } | Error::Malformed(_))
    }
}
