use std::time::Duration;

use once_cell::sync::OnceCell;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::payload::{LeagueAnalytics, parse_league_analytics_json};

const LEAGUE_ID_FIELD: &str = "league_id";

static CLIENT: OnceCell<Client> = OnceCell::new();

/// Anything that can turn a league id into an analytics document.
pub trait LeagueSource: Send {
    fn analyze(&mut self, league_id: &str) -> Result<LeagueAnalytics, FetchError>;

    fn label(&self) -> &'static str;
}

pub struct HttpSource {
    endpoint: String,
    timeout: Option<Duration>,
}

impl HttpSource {
    pub fn new(endpoint: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout,
        }
    }
}

impl LeagueSource for HttpSource {
    fn analyze(&mut self, league_id: &str) -> Result<LeagueAnalytics, FetchError> {
        let client = shared_client(self.timeout)?;
        submit_league_id(client, &self.endpoint, league_id)
    }

    fn label(&self) -> &'static str {
        "http"
    }
}

/// The timeout is fixed by whichever call builds the client first; `None`
/// waits indefinitely.
fn shared_client(timeout: Option<Duration>) -> Result<&'static Client, FetchError> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|err| FetchError::Client(err.to_string()))
    })
}

pub fn validate_league_id(raw: &str) -> Result<&str, FetchError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FetchError::EmptyLeagueId);
    }
    Ok(trimmed)
}

/// One form-encoded POST carrying the league id; the JSON body is decoded
/// only on a 2xx response.
pub fn submit_league_id(
    client: &Client,
    endpoint: &str,
    league_id: &str,
) -> Result<LeagueAnalytics, FetchError> {
    let league_id = validate_league_id(league_id)?;
    debug!(endpoint, league_id, "submitting analysis request");

    let resp = client
        .post(endpoint)
        .form(&[(LEAGUE_ID_FIELD, league_id)])
        .send()?;
    check_status(resp.status())?;

    let body = resp.text()?;
    parse_league_analytics_json(&body).map_err(|err| {
        warn!(league_id, error = %format!("{err:#}"), "analytics payload rejected");
        FetchError::Decode(format!("{err:#}"))
    })
}

pub fn check_status(status: StatusCode) -> Result<(), FetchError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(FetchError::Status(status.as_u16()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_success_status_is_an_error() {
        assert!(check_status(StatusCode::OK).is_ok());
        assert!(matches!(
            check_status(StatusCode::NOT_FOUND),
            Err(FetchError::Status(404))
        ));
        assert!(matches!(
            check_status(StatusCode::INTERNAL_SERVER_ERROR),
            Err(FetchError::Status(500))
        ));
    }

    #[test]
    fn blank_id_never_reaches_the_network() {
        let mut source = HttpSource::new("http://127.0.0.1:1/analyze", None);
        assert!(matches!(source.analyze("   "), Err(FetchError::EmptyLeagueId)));
        assert_eq!(validate_league_id(" 42 ").unwrap(), "42");
    }

    #[test]
    fn refused_connection_is_a_transport_error() {
        let mut source = HttpSource::new("http://127.0.0.1:1/analyze", Some(Duration::from_secs(5)));
        let err = source.analyze("123").unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
        assert_eq!(
            err.user_message(),
            "Failed to analyze league. Please check your League ID and try again."
        );
    }
}
