//! Engine-level properties over the full seed catalog.

use std::sync::Arc;

use collision_core::{CollisionRequest, Intensity, ProjectType};
use collision_engine::{scorer, CatalogHandle, CollisionEngine, DomainCatalog};
use collision_store::seeds::seed_domains;

fn seeded_engine() -> CollisionEngine {
    let catalog = DomainCatalog::new(seed_domains());
    CollisionEngine::new(Arc::new(CatalogHandle::new(catalog)))
}

fn request(intensity: Intensity) -> CollisionRequest {
    CollisionRequest {
        interests: vec!["machine learning".into(), "design".into()],
        project: "AI recommendation system".into(),
        project_type: ProjectType::Product,
        intensity,
    }
}

#[test]
fn collision_differs_from_primary_for_every_intensity() {
    let engine = seeded_engine();
    for intensity in [Intensity::Gentle, Intensity::Moderate, Intensity::Radical] {
        for _ in 0..50 {
            let outcome = engine.generate(&request(intensity)).unwrap();
            assert_ne!(
                outcome.result.collision_domain, outcome.result.primary_domain,
                "echo chamber at {}",
                intensity
            );
        }
    }
}

#[test]
fn chosen_domain_always_admits_the_requested_intensity() {
    let engine = seeded_engine();
    let catalog = DomainCatalog::new(seed_domains());
    for intensity in [Intensity::Gentle, Intensity::Moderate, Intensity::Radical] {
        for _ in 0..50 {
            let outcome = engine.generate(&request(intensity)).unwrap();
            let chosen = catalog
                .get(&outcome.result.collision_domain)
                .expect("chosen domain must come from the catalog");
            assert!(chosen.supports_intensity(intensity));
        }
    }
}

#[test]
fn scores_stay_in_bounds_across_the_catalog() {
    let req = request(Intensity::Moderate);
    for domain in seed_domains() {
        let r_i = scorer::interest_relevance(&req.interests, &domain);
        let n = scorer::novelty(&req.interests, &domain);
        assert!((0.0..=1.0).contains(&r_i), "{}: R_i={}", domain.name, r_i);
        assert!((0.0..=1.0).contains(&n), "{}: N={}", domain.name, n);
        for _ in 0..20 {
            let q = scorer::quality_score(&req, &domain);
            assert!((0.0..=100.0).contains(&q), "{}: Q={}", domain.name, q);
        }
    }
}

#[test]
fn result_shape_satisfies_the_response_contract() {
    let engine = seeded_engine();
    let outcome = engine.generate(&request(Intensity::Moderate)).unwrap();
    let result = outcome.result;

    assert!(!result.collision_domain.is_empty());
    assert!(result.spark_questions.len() >= 3);
    assert!(result.next_steps.len() >= 3);
    assert!((0.0..=100.0).contains(&result.quality_score));
    assert!(!result.connection.is_empty());
}

#[test]
fn radical_requests_never_land_on_gentle_only_domains() {
    let engine = seeded_engine();
    let gentle_only: Vec<String> = seed_domains()
        .into_iter()
        .filter(|d| !d.supports_intensity(Intensity::Radical))
        .map(|d| d.name)
        .collect();

    for _ in 0..100 {
        let outcome = engine.generate(&request(Intensity::Radical)).unwrap();
        assert!(!gentle_only.contains(&outcome.result.collision_domain));
    }
}
