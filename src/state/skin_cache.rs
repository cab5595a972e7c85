use crate::core::{Identity, TextureDescriptor};
use dashmap::DashMap;

/// Last fetched skin per unverified identity. Last write wins, nothing is evicted.
#[derive(Debug, Default)]
pub struct SkinCache {
    skins: DashMap<Identity, TextureDescriptor>,
}

impl SkinCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `descriptor`, returning the one it replaced.
    pub fn put(&self, identity: Identity, descriptor: TextureDescriptor) -> Option<TextureDescriptor> {
        self.skins.insert(identity, descriptor)
    }

    pub fn get(&self, identity: &Identity) -> Option<TextureDescriptor> {
        self.skins.get(identity).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.skins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skins.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_last_write_wins() {
        let cache = SkinCache::new();
        let id = Identity::offline("steve");
        assert!(cache.get(&id).is_none());

        assert!(cache.put(id, TextureDescriptor::new("v1", Some("s1".into()))).is_none());
        let replaced = cache.put(id, TextureDescriptor::new("v2", None)).unwrap();
        assert_eq!(replaced.value, "v1");

        let current = cache.get(&id).unwrap();
        assert_eq!(current.value, "v2");
        assert!(!current.is_signed());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_concurrent_writers() {
        let cache = Arc::new(SkinCache::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for j in 0..50 {
                        let id = Identity::offline(&format!("p{}", j));
                        cache.put(id, TextureDescriptor::new(format!("t{}", i), None));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), 50);
    }
}
