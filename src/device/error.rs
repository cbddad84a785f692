use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

/// A device command that did not go through.
#[derive(Error, Debug)]
pub enum CommandRejected {
    #[error("request error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unreadable device response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("device responded with {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("device reported failure: {message}")]
    Unsuccessful { message: String },
    #[error("no response within {0:?}")]
    TimedOut(Duration),
}
