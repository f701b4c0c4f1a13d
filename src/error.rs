use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("A network error occurred while fetching from the backend: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Backend returned unexpected status {0}")]
    UnexpectedStatus(reqwest::StatusCode),

    #[error("Could not decode snapshot payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Could not decode a live-feed frame: {0}")]
    FrameDecode(#[from] image::ImageError),
}
