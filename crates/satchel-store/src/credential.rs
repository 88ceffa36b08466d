//! Credential provider seam.
//!
//! Auth/session management is an external collaborator: the store only
//! needs a bearer token, or the knowledge that none is available. A
//! missing credential degrades remote persistence to cache-only; it is
//! never a crash.

/// Supplies the bearer token attached to remote persistence calls.
pub trait CredentialProvider: Send + Sync {
    fn credential(&self) -> Option<String>;
}

/// Reads the token from an environment variable.
pub struct EnvCredential {
    var: String,
}

impl EnvCredential {
    pub const DEFAULT_VAR: &'static str = "SATCHEL_TOKEN";

    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvCredential {
    fn default() -> Self {
        Self::new(Self::DEFAULT_VAR)
    }
}

impl CredentialProvider for EnvCredential {
    fn credential(&self) -> Option<String> {
        std::env::var(&self.var).ok().filter(|v| !v.is_empty())
    }
}

/// Fixed token (or fixed absence of one) — for tests and embedding.
pub struct StaticCredential {
    token: Option<String>,
}

impl StaticCredential {
    pub fn new(token: Option<String>) -> Self {
        Self { token }
    }
}

impl CredentialProvider for StaticCredential {
    fn credential(&self) -> Option<String> {
        self.token.clone()
    }
}
