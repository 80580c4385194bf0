use log::{info, warn};
use serde_json::json;
use std::sync::Arc;

use crate::models::auth_user::{AuthSession, AuthUser};
use crate::services::docstore_service::DocStoreApi;
use crate::services::identity_service::{IdentityApi, TokenBundle};
use crate::services::{GatewayError, GatewayResult};

/// Wraps identity and profile-document operations. Backends are injected
/// so callers and tests decide what sits behind the traits.
pub struct AuthGateway {
    identity: Arc<dyn IdentityApi>,
    docstore: Arc<dyn DocStoreApi>,
}

impl AuthGateway {
    pub fn new(identity: Arc<dyn IdentityApi>, docstore: Arc<dyn DocStoreApi>) -> Self {
        AuthGateway { identity, docstore }
    }

    fn profile_path(uid: &str) -> String {
        format!("users/{}", uid)
    }

    /// Email/password sign-in. The account lookup supplies the verified
    /// flag; whether an unverified session may proceed is the caller's
    /// rule, not this gateway's.
    pub async fn login(&self, email: &str, password: &str) -> GatewayResult<AuthSession> {
        let tokens = self.identity.sign_in_with_password(email, password).await?;
        let account = self.identity.lookup(&tokens.id_token).await?;
        Ok(AuthSession {
            uid: tokens.local_id,
            email: if account.email.is_empty() { tokens.email } else { account.email },
            display_name: account.display_name,
            email_verified: account.email_verified,
            id_token: tokens.id_token,
            refresh_token: tokens.refresh_token,
        })
    }

    /// Completes a federated login with the Google credential obtained
    /// from the consent redirect, upserting the profile document.
    pub async fn google_login(&self, provider_token: &str) -> GatewayResult<AuthSession> {
        let tokens = self.identity.sign_in_with_idp(provider_token).await?;
        let profile = json!({
            "email": tokens.email,
            "userName": tokens.display_name,
        });
        self.docstore
            .set_document(&tokens.id_token, &Self::profile_path(&tokens.local_id), profile)
            .await?;
        // Federated identities arrive with a provider-verified email.
        Ok(Self::session_from_tokens(tokens, true))
    }

    /// Creates the identity, sends the verification mail, and writes the
    /// profile document.
    pub async fn signup(
        &self,
        user_name: &str,
        email: &str,
        password: &str,
    ) -> GatewayResult<AuthSession> {
        let tokens = self.identity.sign_up(email, password).await?;
        self.identity.send_verification_email(&tokens.id_token).await?;
        let profile = json!({
            "email": email,
            "userName": user_name,
        });
        self.docstore
            .set_document(&tokens.id_token, &Self::profile_path(&tokens.local_id), profile)
            .await?;
        Ok(AuthSession {
            uid: tokens.local_id,
            email: email.to_string(),
            display_name: user_name.to_string(),
            email_verified: false,
            id_token: tokens.id_token,
            refresh_token: tokens.refresh_token,
        })
    }

    /// Best-effort sign-out. The identity backend keeps no server-side
    /// session to revoke; dropping the local state is the whole job.
    pub fn logout(&self, session: &AuthSession) {
        info!("signed out {}", session.uid);
    }

    /// Changes the password after re-authenticating with the old
    /// credential; the backend rejects sensitive mutations on stale
    /// sessions.
    pub async fn change_password(
        &self,
        session: Option<&AuthSession>,
        email: &str,
        old_password: &str,
        new_password: &str,
    ) -> GatewayResult<AuthSession> {
        let Some(current) = session else {
            return Err(GatewayError::Validation("User not Authenticated".to_string()));
        };
        let reauthenticated = match self.identity.sign_in_with_password(email, old_password).await {
            Ok(tokens) => tokens,
            Err(e) => {
                warn!("re-authentication failed for {}: {}", current.uid, e);
                return Err(GatewayError::Validation(
                    "Incorrect current password".to_string(),
                ));
            }
        };
        match self
            .identity
            .update_password(&reauthenticated.id_token, new_password)
            .await
        {
            Ok(tokens) => Ok(AuthSession {
                uid: tokens.local_id,
                email: current.email.clone(),
                display_name: current.display_name.clone(),
                email_verified: current.email_verified,
                id_token: tokens.id_token,
                refresh_token: tokens.refresh_token,
            }),
            Err(e) => {
                warn!("password update failed for {}: {}", current.uid, e);
                Err(GatewayError::Validation(
                    "Incorrect current password".to_string(),
                ))
            }
        }
    }

    /// Patches the profile document's display name.
    pub async fn update_name(&self, session: &AuthSession, user_name: &str) -> GatewayResult<()> {
        self.docstore
            .update_fields(
                &session.id_token,
                &Self::profile_path(&session.uid),
                json!({ "userName": user_name }),
            )
            .await
    }

    /// Reads a profile document; an absent document is `None`, not an
    /// error.
    pub async fn get_user(
        &self,
        session: &AuthSession,
        uid: &str,
    ) -> GatewayResult<Option<AuthUser>> {
        let document = self
            .docstore
            .get_document(&session.id_token, &Self::profile_path(uid))
            .await?;
        Ok(document.map(|doc| AuthUser {
            id: uid.to_string(),
            email: doc.fields["email"].as_str().unwrap_or_default().to_string(),
            user_name: doc.fields["userName"].as_str().unwrap_or_default().to_string(),
        }))
    }

    fn session_from_tokens(tokens: TokenBundle, email_verified: bool) -> AuthSession {
        AuthSession {
            uid: tokens.local_id,
            email: tokens.email,
            display_name: tokens.display_name,
            email_verified,
            id_token: tokens.id_token,
            refresh_token: tokens.refresh_token,
        }
    }
}
