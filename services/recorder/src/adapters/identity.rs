//! services/recorder/src/adapters/identity.rs
//!
//! Identity provider backed by an auth-session token. The token is resolved
//! against the database on every request, so an expired session signs the
//! user out without a restart.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, warn};
use workout_recorder_core::domain::User;
use workout_recorder_core::ports::{IdentityProvider, PortError, PortResult, WorkoutDatabase};

pub struct TokenIdentity {
    db: Arc<dyn WorkoutDatabase>,
    token: Option<String>,
}

impl TokenIdentity {
    pub fn new(db: Arc<dyn WorkoutDatabase>, token: Option<String>) -> Self {
        Self { db, token }
    }
}

#[async_trait]
impl IdentityProvider for TokenIdentity {
    async fn current_user(&self) -> PortResult<Option<User>> {
        let Some(token) = self.token.as_deref() else {
            return Ok(None);
        };
        match self.db.validate_auth_session(token).await {
            Ok(user) => Ok(Some(user)),
            Err(PortError::Unauthorized) => {
                warn!("Auth session token is invalid or expired.");
                Ok(None)
            }
            Err(e) => {
                error!("Failed to validate auth session: {:?}", e);
                Err(e)
            }
        }
    }
}
