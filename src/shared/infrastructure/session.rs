// Session container: credentials and the signed-in principal.
//
// Purpose
// - Replace the ambient auth store with an explicitly constructed value that is
//   created in the composition root and handed to whoever needs it.
//
// Responsibilities
// - Persist the token pair through Preferences so it survives a reload.
// - Hold the current principal in memory.
// - Wipe both on logout or when the token refresh fails.

use crate::shared::core::access::Principal;
use crate::shared::infrastructure::preferences::{PreferenceError, Preferences};
use serde::{Deserialize, Serialize};
use std::sync::{PoisonError, RwLock};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

pub struct Session {
    preferences: Preferences,
    principal: RwLock<Option<Principal>>,
}

impl Session {
    pub fn new(preferences: Preferences) -> Self {
        Self {
            preferences,
            principal: RwLock::new(None),
        }
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn is_authenticated(&self) -> bool {
        self.preferences.access_token().is_some()
    }

    pub fn access_token(&self) -> Option<String> {
        self.preferences.access_token()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.preferences.refresh_token()
    }

    pub fn begin(&self, tokens: &TokenPair) -> Result<(), PreferenceError> {
        self.preferences.store_tokens(&tokens.access, &tokens.refresh)
    }

    pub fn replace_access_token(&self, access: &str) -> Result<(), PreferenceError> {
        self.preferences.set_access_token(access)
    }

    pub fn principal(&self) -> Option<Principal> {
        self.principal
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_principal(&self, principal: Principal) {
        *self.principal.write().unwrap_or_else(PoisonError::into_inner) = Some(principal);
    }

    /// Forgets credentials and the principal. The caller shows the login view.
    pub fn end(&self) {
        if let Err(err) = self.preferences.clear_tokens() {
            tracing::warn!(error = %err, "failed to wipe stored credentials");
        }
        self.principal
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        tracing::info!("session ended");
    }
}

#[cfg(test)]
mod session_tests {
    use super::*;
    use crate::shared::core::access::{Role, RoleName};
    use crate::shared::core::primitives::UserId;
    use crate::shared::infrastructure::preferences::in_memory::InMemoryPreferenceStore;
    use rstest::{fixture, rstest};
    use std::sync::Arc;

    #[fixture]
    fn session() -> Session {
        Session::new(Preferences::new(Arc::new(InMemoryPreferenceStore::new())))
    }

    #[rstest]
    fn it_should_start_unauthenticated(session: Session) {
        assert!(!session.is_authenticated());
        assert_eq!(session.principal(), None);
    }

    #[rstest]
    fn it_should_wipe_tokens_and_principal_on_end(session: Session) {
        session
            .begin(&TokenPair {
                access: "a".into(),
                refresh: "r".into(),
            })
            .unwrap();
        session.set_principal(Principal {
            id: UserId(1),
            email: "admin@example.net".into(),
            full_name: "Admin".into(),
            is_superuser: false,
            role: Some(Role::provisioned(RoleName::Admin)),
        });
        assert!(session.is_authenticated());

        session.end();
        assert!(!session.is_authenticated());
        assert_eq!(session.refresh_token(), None);
        assert_eq!(session.principal(), None);
    }

    #[rstest]
    fn it_should_keep_the_refresh_token_when_access_is_replaced(session: Session) {
        session
            .begin(&TokenPair {
                access: "a1".into(),
                refresh: "r1".into(),
            })
            .unwrap();
        session.replace_access_token("a2").unwrap();
        assert_eq!(session.access_token().as_deref(), Some("a2"));
        assert_eq!(session.refresh_token().as_deref(), Some("r1"));
    }
}
