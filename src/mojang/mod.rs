//! Account and profile service clients.

pub mod client;
pub mod resolver;
pub mod skin;

pub use client::MojangClient;
pub use skin::fetch_skin;

use crate::core::{Identity, Result, TextureDescriptor};
use async_trait::async_trait;

/// The two remote lookups the restore pipeline depends on.
#[async_trait]
pub trait ProfileService: Send + Sync {
    /// Verified identity registered for `username`.
    ///
    /// `Ok(None)` when the service has no such account; `LookupFailed` when the
    /// service could not be asked or answered with garbage.
    async fn resolve(&self, username: &str) -> Result<Option<Identity>>;

    /// Signed `textures` property of a verified profile.
    ///
    /// `Ok(None)` when the profile or the property does not exist.
    async fn textures(&self, verified: &Identity) -> Result<Option<TextureDescriptor>>;
}
