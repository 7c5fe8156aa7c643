//! Session storage, login/refresh endpoints, and refresh coordination.

pub mod coordinator;
pub mod endpoints;
pub mod error;
pub mod store;
pub mod token;

pub use coordinator::{RefreshCoordinator, RefreshDecision, RefreshState, RejectReason, SessionRefresher};
pub use endpoints::AuthEndpoints;
pub use error::StoreError;
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore, TokenStoreConfig};
pub use token::Session;
