use std::sync::Arc;

use crate::auth::TokenService;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use domain::spotify::{SpotifyToken, SpotifyTokenRepository, TokenGrant, TokenStatus};
use domain::track::Track;
use domain::value::UserId;
use log::{error, info, warn};

/// Spotify Accounts service (`accounts.spotify.com`)
#[async_trait]
pub trait SpotifyAccounts: Send + Sync {
    fn authorize_url(&self, state: &str) -> Result<String, AppError>;
    async fn exchange_code(&self, code: &str) -> Result<TokenGrant, AppError>;
    async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant, AppError>;
}

/// Spotify Web API 的播放历史
#[async_trait]
pub trait SpotifyPlayer: Send + Sync {
    async fn recently_played(&self, access_token: &str) -> Result<Option<Track>, AppError>;
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

#[derive(Clone)]
pub struct SpotifyLinkService {
    token_repo: Arc<dyn SpotifyTokenRepository>,
    accounts: Arc<dyn SpotifyAccounts>,
    player: Arc<dyn SpotifyPlayer>,
    token_svc: Arc<dyn TokenService>,
}

impl SpotifyLinkService {
    pub fn new(
        token_repo: Arc<dyn SpotifyTokenRepository>,
        accounts: Arc<dyn SpotifyAccounts>,
        player: Arc<dyn SpotifyPlayer>,
        token_svc: Arc<dyn TokenService>,
    ) -> Self {
        Self {
            token_repo,
            accounts,
            player,
            token_svc,
        }
    }

    /// Authorization URL; the uid travels in a signed `state`
    pub fn login_url(&self, user_id: &UserId) -> Result<String, AppError> {
        let state = self.token_svc.issue_state(user_id)?;
        self.accounts.authorize_url(&state)
    }

    /// Handles the OAuth callback and stores the token pair
    pub async fn complete_link(
        &self,
        code: Option<&str>,
        state: Option<&str>,
    ) -> Result<UserId, AppError> {
        let (code, state) = match (code, state) {
            (Some(code), Some(state)) if !code.is_empty() && !state.is_empty() => (code, state),
            _ => {
                return Err(AppError::InvalidInput(
                    "code and state are required".to_string(),
                ))
            }
        };
        let user_id = self.token_svc.verify_state(state)?;

        let grant = self.accounts.exchange_code(code).await?;
        let token = SpotifyToken::issued(user_id.clone(), grant, now_ms())?;
        self.token_repo.save(&token).await?;

        info!("spotify token saved (uid: {})", user_id);
        Ok(user_id)
    }

    /// Current access token, refreshed first when expired.
    /// `None` when the user never linked or the refresh failed.
    pub async fn access_token(&self, user_id: &UserId) -> Result<Option<String>, AppError> {
        let Some(mut token) = self.token_repo.find(user_id).await? else {
            return Ok(None);
        };
        let now = now_ms();
        match token.status(now) {
            TokenStatus::Valid => Ok(Some(token.access_token)),
            TokenStatus::Missing => Ok(None),
            TokenStatus::Expired => {
                info!("refreshing spotify access token (uid: {})", user_id);
                if !token.is_refreshable() {
                    warn!("spotify token expired without refresh token (uid: {})", user_id);
                    return Ok(None);
                }
                let grant = match self.accounts.refresh(&token.refresh_token).await {
                    Ok(grant) => grant,
                    Err(e) => {
                        error!("spotify token refresh failed (uid: {}): {}", user_id, e);
                        return Ok(None);
                    }
                };
                token.apply_refresh(grant, now_ms())?;
                self.token_repo.save(&token).await?;
                info!("spotify access token refreshed (uid: {})", user_id);
                Ok(Some(token.access_token))
            }
        }
    }

    /// Most recently played track; errors are logged and swallowed
    pub async fn recent_track(&self, user_id: &UserId) -> Option<Track> {
        let access_token = match self.access_token(user_id).await {
            Ok(Some(token)) => token,
            Ok(None) => return None,
            Err(e) => {
                error!("failed to load spotify token (uid: {}): {}", user_id, e);
                return None;
            }
        };
        match self.player.recently_played(&access_token).await {
            Ok(track) => track,
            Err(e) => {
                error!("failed to fetch recently played (uid: {}): {}", user_id, e);
                None
            }
        }
    }

    pub async fn link_status(&self, user_id: &UserId) -> Result<bool, AppError> {
        let token = self.token_repo.find(user_id).await?;
        Ok(token.map(|t| t.is_linked(now_ms())).unwrap_or(false))
    }

    pub async fn unlink(&self, user_id: &UserId) -> Result<(), AppError> {
        self.token_repo.delete(user_id).await?;
        info!("spotify unlinked (uid: {})", user_id);
        Ok(())
    }
}
