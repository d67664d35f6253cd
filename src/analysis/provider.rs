//! Boundary to the catalog's analysis endpoints.
//!
//! Transport and parse failures stop here: callers get `None` and the engine
//! runs in ambient mode.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::de::DeserializeOwned;
use thiserror::Error;

use super::features::{TrackAnalysis, TrackFeatures};

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("malformed analysis data: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Where analysis JSON comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnalysisSource {
    File(PathBuf),
    Url(String),
}

impl AnalysisSource {
    /// `http://` and `https://` locations are fetched, anything else is a path.
    pub fn parse(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            Self::Url(location.to_string())
        } else {
            Self::File(PathBuf::from(location))
        }
    }
}

impl fmt::Display for AnalysisSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
        }
    }
}

pub struct AnalysisProvider {
    client: reqwest::blocking::Client,
    token: Option<String>,
}

impl AnalysisProvider {
    pub fn new(token: Option<String>) -> Result<Self, AnalysisError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()?;
        Ok(Self { client, token })
    }

    pub fn fetch_analysis(&self, source: &AnalysisSource) -> Result<TrackAnalysis, AnalysisError> {
        let body = self.read(source)?;
        Ok(TrackAnalysis::from_json(&body)?)
    }

    pub fn fetch_features(&self, source: &AnalysisSource) -> Result<TrackFeatures, AnalysisError> {
        self.fetch_json(source)
    }

    fn fetch_json<T: DeserializeOwned>(&self, source: &AnalysisSource) -> Result<T, AnalysisError> {
        let body = self.read(source)?;
        Ok(serde_json::from_str(&body)?)
    }

    fn read(&self, source: &AnalysisSource) -> Result<String, AnalysisError> {
        match source {
            AnalysisSource::File(path) => std::fs::read_to_string(path).map_err(|source| AnalysisError::Io {
                path: path.clone(),
                source,
            }),
            AnalysisSource::Url(url) => {
                let mut request = self.client.get(url);
                if let Some(ref token) = self.token {
                    request = request.bearer_auth(token);
                }
                let response = request.send()?;
                let status = response.status();
                if !status.is_success() {
                    return Err(AnalysisError::Status {
                        url: url.clone(),
                        status: status.as_u16(),
                    });
                }
                Ok(response.text()?)
            }
        }
    }
}

/// Log and swallow a provider failure; absence means ambient mode.
pub fn load_or_ambient<T>(what: &str, result: Result<T, AnalysisError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            log::warn!("{} unavailable, using ambient mode: {}", what, err);
            None
        }
    }
}
