//! Satchel Store — persistence seams for captures.
//!
//! Two backends with very different trust levels: a local JSON cache
//! that is always available and authoritative, and a remote
//! spreadsheet-backed store reached over HTTP that may be slow, stale,
//! or unreachable. The repository layer decides when each is written.

pub mod cache;
pub mod credential;
pub mod remote;

pub use cache::CaptureCache;
pub use credential::{CredentialProvider, EnvCredential, StaticCredential};
pub use remote::{HttpRemoteStore, RemoteStore};
