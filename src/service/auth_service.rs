//! Operator sign-in and token verification.

use std::sync::Arc;

use crate::auth::{Claims, JwtManager, OperatorAccount};
use crate::config::GatewayConfig;
use crate::domain::LogLevel;
use crate::error::GatewayError;
use crate::persistence::ActivityLog;

/// Checks operator credentials and issues bearer tokens.
#[derive(Debug)]
pub struct AuthService {
    operator: OperatorAccount,
    jwt: JwtManager,
    activity_log: Arc<ActivityLog>,
}

impl AuthService {
    /// Creates a service for the given operator.
    #[must_use]
    pub fn new(operator: OperatorAccount, jwt: JwtManager, activity_log: Arc<ActivityLog>) -> Self {
        Self {
            operator,
            jwt,
            activity_log,
        }
    }

    /// Builds the operator account and token manager from configuration.
    ///
    /// A configured PHC hash is used as-is; otherwise the plaintext
    /// password is hashed once here.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Internal`] if hashing the plaintext password
    /// fails.
    pub fn from_config(
        config: &GatewayConfig,
        activity_log: Arc<ActivityLog>,
    ) -> Result<Self, GatewayError> {
        let operator = match &config.operator_password_hash {
            Some(hash) => OperatorAccount::new(1, config.operator_username.clone(), hash.clone()),
            None => OperatorAccount::with_password(
                1,
                config.operator_username.clone(),
                &config.operator_password,
            )?,
        };
        if config.jwt_secret.is_none() {
            tracing::warn!("JWT_SECRET not set; signing tokens with the development key");
        }
        let jwt = JwtManager::new(config.jwt_secret_or_dev(), config.jwt_expiry_secs);
        Ok(Self::new(operator, jwt, activity_log))
    }

    /// Verifies credentials and returns a fresh bearer token.
    ///
    /// Both outcomes are written to the activity log.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidCredentials`] if the username or
    /// password is wrong, or [`GatewayError::Internal`] if the stored hash
    /// is unusable.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, GatewayError> {
        let operator = self.operator.clone();
        let (user, pass) = (username.to_string(), password.to_string());
        let verified = tokio::task::spawn_blocking(move || operator.verify(&user, &pass))
            .await
            .map_err(|e| GatewayError::Internal(format!("password check aborted: {e}")))??;

        if !verified {
            tracing::warn!(user = username, "failed sign-in attempt");
            self.activity_log
                .record(LogLevel::Warning, username, "failed sign-in attempt")
                .await;
            return Err(GatewayError::InvalidCredentials);
        }

        let token = self.jwt.issue(&self.operator)?;
        tracing::info!(user = username, "operator signed in");
        self.activity_log
            .record(LogLevel::Info, username, "signed in")
            .await;
        Ok(token)
    }

    /// Verifies a bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Unauthorized`] if the token is invalid or
    /// expired.
    pub fn verify_token(&self, token: &str) -> Result<Claims, GatewayError> {
        self.jwt.verify(token)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::persistence::ActivityLog;

    fn make_service(dir: &std::path::Path) -> (AuthService, Arc<ActivityLog>) {
        let activity_log = Arc::new(ActivityLog::new(dir.join("system_log.log")));
        let config = GatewayConfig {
            operator_password: "s3cret".to_string(),
            ..GatewayConfig::default()
        };
        let Ok(service) = AuthService::from_config(&config, Arc::clone(&activity_log)) else {
            panic!("service construction failed");
        };
        (service, activity_log)
    }

    #[tokio::test]
    async fn login_issues_verifiable_token() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir failed");
        };
        let (service, _) = make_service(dir.path());
        let Ok(token) = service.login("admin", "s3cret").await else {
            panic!("login failed");
        };
        let Ok(claims) = service.verify_token(&token) else {
            panic!("token rejected");
        };
        assert_eq!(claims.username, "admin");
    }

    #[tokio::test]
    async fn failed_login_is_audited() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir failed");
        };
        let (service, activity_log) = make_service(dir.path());
        let result = service.login("admin", "guess").await;
        assert!(matches!(result, Err(GatewayError::InvalidCredentials)));

        let guard = activity_log.lock().await;
        let Ok(parsed) = guard.read_entries().await else {
            panic!("read failed");
        };
        let Some(entry) = parsed.entries.last() else {
            panic!("no activity recorded");
        };
        assert_eq!(entry.level, LogLevel::Warning);
        assert_eq!(entry.user, "admin");
    }
}
