//! Per-tenant client lookup.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::api::CloudApi;
use crate::error::ApiError;
use crate::http::HttpCloudClient;

/// Account credentials for the cloud API.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Resolves the API client to use for a set of credentials.
#[async_trait]
pub trait ClientProvider: Send + Sync {
    async fn client_for(&self, credentials: &Credentials) -> Result<Arc<dyn CloudApi>, ApiError>;
}

/// Client registry keyed by user name.
///
/// Clients registered with [`ClientRegistry::set`] are returned for their
/// user regardless of the password presented. Users without a registered
/// client get a fresh HTTP client per call.
pub struct ClientRegistry {
    base_url: String,
    timeout: Duration,
    clients: RwLock<HashMap<String, Arc<dyn CloudApi>>>,
}

impl ClientRegistry {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            timeout,
            clients: RwLock::new(HashMap::new()),
        }
    }

    /// Register a client for `user`, replacing any previous one.
    pub async fn set(&self, user: impl Into<String>, client: Arc<dyn CloudApi>) {
        let user = user.into();
        debug!(user = %user, "Registering cloud client");
        self.clients.write().await.insert(user, client);
    }

    /// Remove the client registered for `user`.
    pub async fn clear(&self, user: &str) {
        self.clients.write().await.remove(user);
    }
}

#[async_trait]
impl ClientProvider for ClientRegistry {
    async fn client_for(&self, credentials: &Credentials) -> Result<Arc<dyn CloudApi>, ApiError> {
        if let Some(client) = self.clients.read().await.get(&credentials.user) {
            return Ok(Arc::clone(client));
        }

        let client = HttpCloudClient::new(&self.base_url, credentials.clone(), self.timeout)?;
        Ok(Arc::new(client))
    }
}
