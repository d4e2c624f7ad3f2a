use std::sync::Arc;

use crate::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use domain::apple::{AppleMusicToken, AppleMusicTokenRepository};
use domain::track::Track;
use domain::value::UserId;
use log::info;
use rand::seq::SliceRandom;

/// 签发 Apple Music developer token (ES256 JWT)
pub trait DeveloperTokenSigner: Send + Sync {
    fn sign(&self) -> Result<String, AppError>;
}

#[async_trait]
pub trait AppleMusicLibrary: Send + Sync {
    async fn recently_played(
        &self,
        developer_token: &str,
        user_token: &str,
    ) -> Result<Vec<Track>, AppError>;
}

#[derive(Clone)]
pub struct AppleMusicService {
    token_repo: Arc<dyn AppleMusicTokenRepository>,
    library: Arc<dyn AppleMusicLibrary>,
    signer: Arc<dyn DeveloperTokenSigner>,
    static_developer_token: Option<String>,
}

impl AppleMusicService {
    pub fn new(
        token_repo: Arc<dyn AppleMusicTokenRepository>,
        library: Arc<dyn AppleMusicLibrary>,
        signer: Arc<dyn DeveloperTokenSigner>,
        static_developer_token: Option<String>,
    ) -> Self {
        Self {
            token_repo,
            library,
            signer,
            static_developer_token: static_developer_token.filter(|t| !t.is_empty()),
        }
    }

    /// 优先使用配置中的 developer token，否则现场签发
    pub fn developer_token(&self) -> Result<String, AppError> {
        match &self.static_developer_token {
            Some(token) => Ok(token.clone()),
            None => self.signer.sign(),
        }
    }

    pub async fn link(&self, user_id: &UserId, music_user_token: &str) -> Result<(), AppError> {
        let token = AppleMusicToken::new(user_id.clone(), music_user_token, Utc::now().naive_utc())?;
        self.token_repo.save(&token).await?;
        info!("apple music linked (uid: {})", user_id);
        Ok(())
    }

    /// One track picked at random from the recently played list
    pub async fn recent_track(&self, user_id: &UserId) -> Result<Track, AppError> {
        let token = self
            .token_repo
            .find(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("music-user-token", user_id))?;

        let developer_token = self.developer_token()?;
        let tracks = self
            .library
            .recently_played(&developer_token, &token.user_token)
            .await?;

        tracks
            .choose(&mut rand::thread_rng())
            .cloned()
            .ok_or_else(|| AppError::not_found("recent tracks", user_id))
    }

    pub async fn link_status(&self, user_id: &UserId) -> Result<bool, AppError> {
        Ok(self.token_repo.find(user_id).await?.is_some())
    }

    pub async fn unlink(&self, user_id: &UserId) -> Result<(), AppError> {
        self.token_repo.delete(user_id).await?;
        info!("apple music unlinked (uid: {})", user_id);
        Ok(())
    }
}
