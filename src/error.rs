use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PromoError {
    #[error("speech synthesis error: {0}")]
    Tts(String),

    #[error("script error: {0}")]
    Script(String),

    #[error("no usable slides: every screenshot in the script is missing")]
    EmptyTimeline,

    #[error("unknown music track '{0}'")]
    UnknownTrack(String),

    #[error("download failed for {url}: {reason}")]
    Download { url: String, reason: String },

    #[error("ffprobe failed for {}: {reason}", path.display())]
    Probe { path: PathBuf, reason: String },

    #[error("ffmpeg error: {0}")]
    Ffmpeg(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PromoError>;
