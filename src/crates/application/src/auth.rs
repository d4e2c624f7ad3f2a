use std::sync::Arc;

use crate::error::AppError;
use async_trait::async_trait;
use domain::profile::{UserProfile, UserProfileRepository};
use domain::value::UserId;
use log::info;

/// Firebase ID token 校验后的身份
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub uid: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionClaims {
    pub uid: String,   // firebase uid
    pub name: String,  // display name
    pub email: String, // email
}

impl SessionClaims {
    pub fn user_id(&self) -> Result<UserId, AppError> {
        Ok(UserId::new(&self.uid)?)
    }
}

impl From<&UserProfile> for SessionClaims {
    fn from(profile: &UserProfile) -> Self {
        Self {
            uid: profile.user_id.to_string(),
            name: profile.display_name.clone(),
            email: profile.email.clone(),
        }
    }
}

pub trait TokenService: Send + Sync {
    fn issue(&self, claims: &SessionClaims) -> Result<String, AppError>;
    fn verify(&self, token: &str) -> Result<SessionClaims, AppError>;

    /// OAuth `state` 参数：携带 uid 的短期签名令牌
    fn issue_state(&self, uid: &UserId) -> Result<String, AppError>;
    fn verify_state(&self, state: &str) -> Result<UserId, AppError>;
}

#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, id_token: &str) -> Result<Identity, AppError>;
}

#[derive(Clone)]
pub struct AuthService {
    profile_repo: Arc<dyn UserProfileRepository>,
    identity_verifier: Arc<dyn IdentityVerifier>,
    token_svc: Arc<dyn TokenService>,
}

impl AuthService {
    pub fn new(
        profile_repo: Arc<dyn UserProfileRepository>,
        identity_verifier: Arc<dyn IdentityVerifier>,
        token_svc: Arc<dyn TokenService>,
    ) -> Self {
        Self {
            profile_repo,
            identity_verifier,
            token_svc,
        }
    }

    /// Exchange a Firebase ID token for a session token
    pub async fn sign_in(&self, id_token: &str) -> Result<String, AppError> {
        if id_token.trim().is_empty() {
            return Err(AppError::InvalidInput("idToken is required".to_string()));
        }
        let identity = self.identity_verifier.verify(id_token).await?;
        let user_id = UserId::new(&identity.uid)?;

        let profile = match self.profile_repo.find(&user_id).await? {
            Some(mut profile) => {
                profile.update_identity(identity.name.as_deref(), identity.email.as_deref());
                profile
            }
            None => UserProfile::new(user_id, identity.name.as_deref(), identity.email.as_deref()),
        };
        self.profile_repo.save(&profile).await?;
        info!("signed in (uid: {})", profile.user_id);

        self.token_svc.issue(&SessionClaims::from(&profile))
    }

    pub fn authenticate(&self, session: &str) -> Result<SessionClaims, AppError> {
        self.token_svc.verify(session)
    }
}
