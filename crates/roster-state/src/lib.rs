//! Roster-State: record model and remote authority for Roster
//!
//! This crate owns everything that crosses the wire: the `Record` model and
//! its Spanish field mapping, the `RecordAuthority` contract, the reqwest
//! implementation of that contract, and an in-memory fake for tests.
//!
//! ## Layer 0 - Data/Transport
//!
//! Focus: exact request/response shapes and failure classification.
//!
//! ## Key Components
//!
//! - `RecordAuthority`: async list/create/update/delete contract
//! - `HttpAuthority`: `/api/usuarios` over HTTP
//! - `MemoryAuthority`: scripted in-memory authority

pub mod authority;
mod error;
pub mod fakes;
pub mod http;
pub mod record;

pub use authority::{AuthorityResult, RecordAuthority};
pub use error::AuthorityError;
pub use fakes::{Call, MemoryAuthority, Operation};
pub use http::{ClientConfig, HttpAuthority};
pub use record::{parse_registered_at, Record, RecordDraft, RecordId, RegisteredAt};
