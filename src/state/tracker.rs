use crate::core::Identity;
use dashmap::DashSet;

/// Unverified identities already restored during this process lifetime.
///
/// Membership is permanent: there is no way to unmark an identity.
#[derive(Debug, Default)]
pub struct RestorationTracker {
    restored: DashSet<Identity>,
}

impl RestorationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `identity` restored. Only the first caller for an identity gets `true`.
    pub fn mark_restored(&self, identity: Identity) -> bool {
        self.restored.insert(identity)
    }

    pub fn is_restored(&self, identity: &Identity) -> bool {
        self.restored.contains(identity)
    }

    pub fn len(&self) -> usize {
        self.restored.len()
    }

    pub fn is_empty(&self) -> bool {
        self.restored.is_empty()
    }
}
