//! Errors raised while requesting league analytics.

use thiserror::Error;

pub const EMPTY_LEAGUE_ID_MESSAGE: &str = "Please enter a valid League ID";
pub const ANALYZE_FAILED_MESSAGE: &str =
    "Failed to analyze league. Please check your League ID and try again.";

#[derive(Error, Debug)]
pub enum FetchError {
    /// Blank input; never reaches the network.
    #[error("league id is empty")]
    EmptyLeagueId,

    #[error("http client unavailable: {0}")]
    Client(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response. The body is not read.
    #[error("http status {0}")]
    Status(u16),

    #[error("malformed analytics payload: {0}")]
    Decode(String),
}

impl FetchError {
    /// Banner text. Network, status and decode failures share one message.
    pub fn user_message(&self) -> &'static str {
        match self {
            FetchError::EmptyLeagueId => EMPTY_LEAGUE_ID_MESSAGE,
            _ => ANALYZE_FAILED_MESSAGE,
        }
    }
}
