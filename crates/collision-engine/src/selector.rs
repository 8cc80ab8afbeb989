//! Candidate filtering, ranking, and weighted-random selection.

use collision_core::{CollisionRequest, Domain, DomainTier, Intensity};
use rand::Rng;
use uuid::Uuid;

use crate::catalog::DomainCatalog;
use crate::scorer;

/// A candidate domain with its scores and connection rationale.
#[derive(Debug, Clone)]
pub struct RankedDomain {
    pub domain: Domain,
    pub relevance: f64,
    pub novelty: f64,
    pub composite: f64,
    pub connection: String,
}

/// The catalog domain best aligned with the user's interests. Falls back to
/// the first interest (title-cased) when nothing matches, and to the literal
/// "General Innovation" when interests are empty.
pub fn select_primary_domain(catalog: &DomainCatalog, interests: &[String]) -> String {
    if interests.is_empty() {
        return "General Innovation".to_string();
    }

    let mut best: Option<(&Domain, f64)> = None;
    for domain in catalog.domains() {
        let score = scorer::interest_relevance(interests, domain);
        if score > best.map_or(0.0, |(_, s)| s) {
            best = Some((domain, score));
        }
    }

    match best {
        Some((domain, _)) => domain.name.clone(),
        None => title_case(&interests[0]),
    }
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn pool_size(intensity: Intensity) -> usize {
    match intensity {
        Intensity::Gentle => 3,
        Intensity::Moderate => 5,
        Intensity::Radical => 8,
    }
}

/// Sentinel emitted when no catalog domain admits the requested intensity.
pub fn sentinel_domain() -> RankedDomain {
    let now = chrono::Utc::now();
    RankedDomain {
        domain: Domain {
            id: Uuid::new_v4(),
            name: "Innovation".into(),
            category: "General".into(),
            description: "General innovative thinking".into(),
            keywords: vec![],
            examples: vec![],
            intensities: vec![Intensity::Gentle, Intensity::Moderate, Intensity::Radical],
            tier: DomainTier::Basic,
            created_at: now,
            updated_at: now,
        },
        relevance: 0.0,
        novelty: 0.0,
        composite: 0.0,
        connection: "Fallback domain for creative exploration".into(),
    }
}

/// Anti-echo-chamber selection: rank admissible candidates by the
/// intensity-weighted composite, then draw one from the top pool with
/// exponentially decaying weights.
pub fn select_collision_domain(
    catalog: &DomainCatalog,
    request: &CollisionRequest,
    primary_domain: &str,
) -> RankedDomain {
    select_collision_domain_with(catalog, request, primary_domain, &mut rand::thread_rng())
}

pub fn select_collision_domain_with<R: Rng>(
    catalog: &DomainCatalog,
    request: &CollisionRequest,
    primary_domain: &str,
    rng: &mut R,
) -> RankedDomain {
    let mut matches: Vec<RankedDomain> = catalog
        .admissible(request.intensity)
        .filter(|d| d.name != primary_domain)
        .map(|domain| {
            let relevance = scorer::project_relevance(request, domain);
            let novelty = scorer::novelty(&request.interests, domain);
            let composite = scorer::composite_score(relevance, novelty, request.intensity);
            let connection = connection_rationale(&request.project, domain, relevance, novelty);
            RankedDomain {
                domain: domain.clone(),
                relevance,
                novelty,
                composite,
                connection,
            }
        })
        .collect();

    if matches.is_empty() {
        return sentinel_domain();
    }

    matches.sort_by(|a, b| {
        b.composite
            .partial_cmp(&a.composite)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let pool = pool_size(request.intensity).min(matches.len());

    let weights: Vec<f64> = (0..pool).map(|i| (-0.5 * i as f64).exp()).collect();
    let total: f64 = weights.iter().sum();
    let target = rng.gen::<f64>() * total;

    let mut cumulative = 0.0;
    for (i, weight) in weights.iter().enumerate() {
        cumulative += weight;
        if cumulative >= target {
            return matches.swap_remove(i);
        }
    }

    matches.swap_remove(0)
}

/// Deterministic rationale chosen from the (novelty, relevance) cell.
fn connection_rationale(project: &str, domain: &Domain, relevance: f64, novelty: f64) -> String {
    let category = domain.category.to_lowercase();
    if novelty > 0.7 {
        format!(
            "Exploring {} offers an unexpected lens for {}, challenging conventional approaches through {} principles.",
            domain.name, project, category
        )
    } else if relevance > 0.6 {
        format!(
            "The principles of {} can directly enhance {} by applying {} methodologies.",
            domain.name, project, category
        )
    } else {
        format!(
            "Drawing from {} creates novel opportunities for {} through cross-disciplinary insight.",
            domain.name, project
        )
    }
}
