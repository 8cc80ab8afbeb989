use std::collections::HashMap;
use std::sync::Arc;

use collision_core::{Domain, DomainTier, Intensity};
use parking_lot::RwLock;

/// Immutable snapshot of the curated domain set.
///
/// Materialized once from persistent storage; the engine never mutates it.
/// Name lookup is case-insensitive and O(1).
#[derive(Debug, Default)]
pub struct DomainCatalog {
    domains: Vec<Domain>,
    by_name: HashMap<String, usize>,
}

impl DomainCatalog {
    pub fn new(domains: Vec<Domain>) -> Self {
        let by_name = domains
            .iter()
            .enumerate()
            .map(|(i, d)| (d.name.to_lowercase(), i))
            .collect();
        Self { domains, by_name }
    }

    pub fn get(&self, name: &str) -> Option<&Domain> {
        self.by_name
            .get(&name.to_lowercase())
            .map(|&i| &self.domains[i])
    }

    pub fn domains(&self) -> &[Domain] {
        &self.domains
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// Domains that admit the requested intensity.
    pub fn admissible(&self, intensity: Intensity) -> impl Iterator<Item = &Domain> + '_ {
        self.domains
            .iter()
            .filter(move |d| d.supports_intensity(intensity))
    }

    pub fn by_tier(&self, tier: DomainTier) -> impl Iterator<Item = &Domain> + '_ {
        self.domains.iter().filter(move |d| d.tier == tier)
    }
}

/// Atomically swappable pointer to the active catalog snapshot.
///
/// In-flight requests keep the `Arc` they captured; `swap` only affects
/// requests that take a snapshot afterwards.
#[derive(Debug)]
pub struct CatalogHandle {
    current: RwLock<Arc<DomainCatalog>>,
}

impl CatalogHandle {
    pub fn new(catalog: DomainCatalog) -> Self {
        Self {
            current: RwLock::new(Arc::new(catalog)),
        }
    }

    pub fn snapshot(&self) -> Arc<DomainCatalog> {
        self.current.read().clone()
    }

    pub fn swap(&self, catalog: DomainCatalog) {
        *self.current.write() = Arc::new(catalog);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn domain(name: &str, intensities: Vec<Intensity>) -> Domain {
        Domain {
            id: Uuid::new_v4(),
            name: name.into(),
            category: "Science".into(),
            description: String::new(),
            keywords: vec![],
            examples: vec![],
            intensities,
            tier: DomainTier::Basic,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let catalog = DomainCatalog::new(vec![domain("Biomimicry", vec![Intensity::Gentle])]);
        assert!(catalog.get("biomimicry").is_some());
        assert!(catalog.get("BIOMIMICRY").is_some());
        assert!(catalog.get("chaos theory").is_none());
    }

    #[test]
    fn admissible_filters_by_intensity() {
        let catalog = DomainCatalog::new(vec![
            domain("Biomimicry", vec![Intensity::Gentle, Intensity::Moderate]),
            domain("Quantum Physics", vec![Intensity::Radical]),
        ]);
        let radical: Vec<_> = catalog.admissible(Intensity::Radical).collect();
        assert_eq!(radical.len(), 1);
        assert_eq!(radical[0].name, "Quantum Physics");
    }

    #[test]
    fn swap_does_not_disturb_existing_snapshots() {
        let handle = CatalogHandle::new(DomainCatalog::new(vec![domain(
            "Origami",
            vec![Intensity::Gentle],
        )]));
        let before = handle.snapshot();
        handle.swap(DomainCatalog::new(vec![]));
        assert_eq!(before.len(), 1);
        assert!(handle.snapshot().is_empty());
    }
}
