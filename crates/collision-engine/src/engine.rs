use std::sync::Arc;

use chrono::Utc;
use collision_core::{CollisionRequest, CollisionResult, Domain, Result};
use sha2::{Digest, Sha256};
use tracing::debug;
use uuid::Uuid;

use crate::catalog::CatalogHandle;
use crate::{enricher, scorer, selector};

/// Generates idea collisions against the active catalog snapshot.
///
/// Stateless apart from the snapshot handle; safe to share across request
/// tasks.
pub struct CollisionEngine {
    catalog: Arc<CatalogHandle>,
}

/// A generated collision plus the domain it was drawn from, which the
/// premium enrichment pass needs.
#[derive(Debug, Clone)]
pub struct CollisionOutcome {
    pub result: CollisionResult,
    pub domain: Domain,
}

impl CollisionEngine {
    pub fn new(catalog: Arc<CatalogHandle>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Arc<CatalogHandle> {
        &self.catalog
    }

    /// Runs the full A→B→C→D pipeline: primary-domain selection, candidate
    /// scoring and ranking, weighted draw, quality assessment, deterministic
    /// enrichment. CPU-only; never suspends.
    pub fn generate(&self, request: &CollisionRequest) -> Result<CollisionOutcome> {
        let snapshot = self.catalog.snapshot();

        let primary_domain = selector::select_primary_domain(&snapshot, &request.interests);
        let ranked = selector::select_collision_domain(&snapshot, request, &primary_domain);

        let hash = connection_hash(request, &ranked.domain.name);
        debug!(
            collision_domain = %ranked.domain.name,
            composite = ranked.composite,
            hash = %hash,
            "collision domain selected"
        );

        let result = CollisionResult {
            id: Uuid::new_v4(),
            primary_domain,
            collision_domain: ranked.domain.name.clone(),
            connection: ranked.connection.clone(),
            spark_questions: enricher::spark_questions(request, &ranked.domain),
            examples: enricher::adapt_examples(request, &ranked.domain),
            next_steps: enricher::next_steps(request, &ranked.domain),
            quality_score: scorer::quality_score(request, &ranked.domain),
            generated_at: Utc::now(),
            rating: None,
            notes: None,
        };

        Ok(CollisionOutcome {
            result,
            domain: ranked.domain,
        })
    }
}

/// Deterministic hash over (request, chosen domain), reserved for the
/// `collision:result:{hash}` memoization key. First 16 hex chars of SHA-256.
pub fn connection_hash(request: &CollisionRequest, domain_name: &str) -> String {
    let content = format!(
        "{}|{}|{}|{}|{}",
        request.interests.join(","),
        request.project,
        request.project_type,
        request.intensity,
        domain_name
    );

    let digest = Sha256::digest(content.as_bytes());
    let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
    hex[..16].to_string()
}
