use std::sync::RwLock;

use crate::model::ManifestDigest;

/// The local store of unpacked implementations
pub trait ImplementationStore {
    /// Whether an implementation with this digest is already present
    fn contains(&self, digest: &ManifestDigest) -> bool;

    /// Digests of every implementation present
    fn list_all(&self) -> Vec<ManifestDigest>;
}

/// A store that only remembers digests
#[derive(Debug, Default)]
pub struct MemoryStore {
    digests: RwLock<Vec<ManifestDigest>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, digest: ManifestDigest) {
        if let Ok(mut digests) = self.digests.write() {
            digests.push(digest);
        }
    }

    pub fn remove(&self, digest: &ManifestDigest) {
        if let Ok(mut digests) = self.digests.write() {
            digests.retain(|d| !d.partial_eq(digest));
        }
    }
}

impl FromIterator<ManifestDigest> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = ManifestDigest>>(iter: I) -> Self {
        MemoryStore {
            digests: RwLock::new(iter.into_iter().collect()),
        }
    }
}

impl ImplementationStore for MemoryStore {
    fn contains(&self, digest: &ManifestDigest) -> bool {
        self.digests
            .read()
            .map(|digests| digests.iter().any(|d| d.partial_eq(digest)))
            .unwrap_or(false)
    }

    fn list_all(&self) -> Vec<ManifestDigest> {
        self.digests.read().map(|d| d.clone()).unwrap_or_default()
    }
}
