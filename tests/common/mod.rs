#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use authflight::auth::{MemoryTokenStore, Session, StoreError, TokenStore};
use authflight::{AuthClient, ClientConfig};
use wiremock::MockServer;

pub fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig::new(server.uri()).with_request_timeout(Duration::from_secs(5))
}

/// Client whose store already holds `access`/`refresh`.
pub fn client_with_session(
    server: &MockServer,
    access: &str,
    refresh: &str,
) -> (Arc<MemoryTokenStore>, AuthClient) {
    let store = Arc::new(MemoryTokenStore::with_session(Session::new(access, refresh)));
    let client = AuthClient::new(config_for(server), store.clone()).expect("client");
    (store, client)
}

pub fn logged_out_client(server: &MockServer) -> (Arc<MemoryTokenStore>, AuthClient) {
    let store = Arc::new(MemoryTokenStore::new());
    let client = AuthClient::new(config_for(server), store.clone()).expect("client");
    (store, client)
}

pub fn stored(store: &MemoryTokenStore) -> Option<Session> {
    store.read().expect("store read")
}

/// Store that reads fine but refuses every write.
pub struct ReadOnlyStore {
    pub session: Session,
}

impl TokenStore for ReadOnlyStore {
    fn read(&self) -> Result<Option<Session>, StoreError> {
        Ok(Some(self.session.clone()))
    }

    fn write(&self, _session: &Session) -> Result<(), StoreError> {
        Err(StoreError::Io("read-only filesystem".to_string()))
    }

    fn clear(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
