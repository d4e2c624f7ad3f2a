use domain::apple::AppleMusicError;
use domain::profile::ProfileError;
use domain::spotify::SpotifyTokenError;
use domain::value::ValueError;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Auth error: {0}")]
    AuthError(String),
    #[error("{0} not found: {1}")]
    NotFound(String, String),
    #[error("{0} request failed: {1}")]
    Upstream(String, String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Repository error: {0}")]
    Repository(String),
    #[error("Value error: {0}")]
    ValueError(#[from] ValueError),
    #[error("Spotify token error: {0}")]
    SpotifyTokenError(#[from] SpotifyTokenError),
    #[error("Apple Music error: {0}")]
    AppleMusicError(#[from] AppleMusicError),
    #[error("Profile error: {0}")]
    ProfileError(#[from] ProfileError),
    #[error("Unknown error: {0}")]
    UnknownError(String),
}

impl AppError {
    pub fn upstream(service: &str, err: impl std::fmt::Display) -> Self {
        AppError::Upstream(service.to_string(), err.to_string())
    }

    pub fn not_found(kind: &str, id: impl std::fmt::Display) -> Self {
        AppError::NotFound(kind.to_string(), id.to_string())
    }
}
