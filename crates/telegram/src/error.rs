use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Telegram(#[from] teloxide::RequestError),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// The Bot API answered with `ok: false`.
    #[error("{method}: {description}")]
    Api { method: String, description: String },
}

impl Error {
    #[must_use]
    pub fn api(method: impl Into<String>, description: impl Into<String>) -> Self {
        Self::Api {
            method: method.into(),
            description: description.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
