//! The remote authority contract
//!
//! `RecordAuthority` is the narrow interface the client core depends on:
//! list, create, update and delete over the usuarios collection. The HTTP
//! implementation lives in [`crate::http`]; an in-memory fake for tests lives
//! in [`crate::fakes`].

use async_trait::async_trait;

use crate::error::AuthorityError;
use crate::record::{Record, RecordDraft, RecordId};

/// Result type for authority operations
pub type AuthorityResult<T> = std::result::Result<T, AuthorityError>;

/// The remote owner of the record collection.
///
/// Guarantees:
/// - `list` returns the full collection in authority order.
/// - `create` assigns `id` and `registered_at`; the client never sends them.
/// - `update` replaces `name` and `email` only.
/// - Any non-2xx answer is an error; success carries no payload the client
///   relies on (the collection is always re-listed afterwards).
#[async_trait]
pub trait RecordAuthority: Send + Sync {
    /// `GET /api/usuarios`
    async fn list(&self) -> AuthorityResult<Vec<Record>>;

    /// `POST /api/usuarios`
    async fn create(&self, draft: &RecordDraft) -> AuthorityResult<()>;

    /// `PUT /api/usuarios/{id}`
    async fn update(&self, id: RecordId, draft: &RecordDraft) -> AuthorityResult<()>;

    /// `DELETE /api/usuarios/{id}`
    async fn delete(&self, id: RecordId) -> AuthorityResult<()>;
}
