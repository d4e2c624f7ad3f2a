use std::sync::Arc;

use crate::error::AppError;
use domain::profile::{UserProfile, UserProfileRepository};
use domain::value::UserId;

#[derive(Clone)]
pub struct ProfileService {
    profile_repo: Arc<dyn UserProfileRepository>,
    public_base_url: String,
}

impl ProfileService {
    pub fn new(profile_repo: Arc<dyn UserProfileRepository>, public_base_url: &str) -> Self {
        Self {
            profile_repo,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// 未登录过的 uid 也返回一份空资料
    pub async fn profile(&self, user_id: &UserId) -> Result<UserProfile, AppError> {
        Ok(self
            .profile_repo
            .find(user_id)
            .await?
            .unwrap_or_else(|| UserProfile::new(user_id.clone(), None, None)))
    }

    pub async fn set_custom_name(&self, user_id: &UserId, name: &str) -> Result<UserProfile, AppError> {
        let mut profile = self.profile(user_id).await?;
        profile.set_custom_name(name)?;
        self.profile_repo.save(&profile).await?;
        Ok(profile)
    }

    pub fn share_url(&self, profile: &UserProfile) -> String {
        format!("{}/u/{}", self.public_base_url, profile.share_slug())
    }
}
