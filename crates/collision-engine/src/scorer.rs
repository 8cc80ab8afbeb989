//! Scalar scoring functions over (request, domain) pairs.
//!
//! All comparisons are case-insensitive via locale-independent lowercasing.
//! Every score lies in [0,1] except `quality_score`, which is 0-100.

use collision_core::{CollisionRequest, Domain, DomainTier, Intensity, ProjectType};
use rand::Rng;

/// Vocabulary whose presence in the project text signals sophistication.
const COMPLEXITY_VOCABULARY: &[&str] = &[
    "system",
    "platform",
    "algorithm",
    "network",
    "framework",
    "architecture",
    "optimization",
    "intelligence",
    "automation",
    "integration",
    "scalable",
    "distributed",
    "analytics",
];

/// Markers of inherently unexpected domains; any hit boosts novelty by 1.2x.
const UNEXPECTED_MARKERS: &[&str] = &["quantum", "chaos", "mythology", "ancient", "radical"];

/// Per-interest contribution is capped here, and the total normalized by
/// `cap * |interests|`.
const INTEREST_CAP: f64 = 3.0;

/// How well a domain matches the user's stated interests. Returns 0 for an
/// empty interest list.
pub fn interest_relevance(interests: &[String], domain: &Domain) -> f64 {
    if interests.is_empty() {
        return 0.0;
    }

    let name = domain.name.to_lowercase();
    let category = domain.category.to_lowercase();
    let description = domain.description.to_lowercase();

    let mut score = 0.0;
    for interest in interests {
        let interest = interest.to_lowercase();
        let mut domain_score: f64 = 0.0;

        if name.contains(&interest) {
            domain_score += 3.0;
        }
        if category.contains(&interest) {
            domain_score += 2.0;
        }
        for keyword in &domain.keywords {
            let keyword = keyword.to_lowercase();
            if keyword.contains(&interest) || interest.contains(&keyword) {
                domain_score += 1.0;
            }
        }
        if description.contains(&interest) {
            domain_score += 0.5;
        }

        score += domain_score.min(INTEREST_CAP);
    }

    score / (INTEREST_CAP * interests.len() as f64)
}

fn category_affinities(project_type: ProjectType) -> &'static [&'static str] {
    match project_type {
        ProjectType::Product => &["design", "technology", "science", "crafts"],
        ProjectType::Content => &["arts", "media", "cultural", "entertainment"],
        ProjectType::Business => &["social systems", "economics", "human systems"],
        ProjectType::Research => &["science", "mathematics", "philosophy"],
    }
}

/// How well a domain fits the project context: category affinity, keyword
/// occurrences in the project text, and shared long words with examples.
pub fn project_relevance(request: &CollisionRequest, domain: &Domain) -> f64 {
    let project = request.project.to_lowercase();
    let category = domain.category.to_lowercase();

    let mut score: f64 = 0.0;

    if category_affinities(request.project_type)
        .iter()
        .any(|affinity| category.contains(affinity))
    {
        score += 0.3;
    }

    for keyword in &domain.keywords {
        if project.contains(&keyword.to_lowercase()) {
            score += 0.2;
        }
    }

    let project_words: Vec<&str> = project.split_whitespace().collect();
    for example in &domain.examples {
        let example = example.to_lowercase();
        if project_words
            .iter()
            .any(|w| w.len() > 3 && example.contains(w))
        {
            score += 0.1;
        }
    }

    score.min(1.0)
}

/// How unexpected a domain is relative to the user's interests. Inverts the
/// interest relevance with a 0.2 floor; unexpected categories get a boost.
pub fn novelty(interests: &[String], domain: &Domain) -> f64 {
    let relevance = interest_relevance(interests, domain);
    let mut novelty = (1.0 - relevance).max(0.2);

    let haystack = format!(
        "{} {} {}",
        domain.category, domain.name, domain.description
    )
    .to_lowercase();
    if UNEXPECTED_MARKERS.iter().any(|m| haystack.contains(m)) {
        novelty *= 1.2;
    }

    novelty.min(1.0)
}

/// Anti-echo-chamber composite weights `(w_relevance, w_novelty)` per
/// intensity. Novelty dominates as intensity grows.
pub fn composite_weights(intensity: Intensity) -> (f64, f64) {
    match intensity {
        Intensity::Gentle => (0.6, 0.4),
        Intensity::Moderate => (0.4, 0.6),
        Intensity::Radical => (0.2, 0.8),
    }
}

pub fn composite_score(relevance: f64, novelty: f64, intensity: Intensity) -> f64 {
    let (w_r, w_n) = composite_weights(intensity);
    relevance * w_r + novelty * w_n
}

fn project_complexity(project: &str) -> f64 {
    let project = project.to_lowercase();
    let matches = COMPLEXITY_VOCABULARY
        .iter()
        .filter(|v| project.contains(*v))
        .count();
    (matches as f64 / 5.0).min(1.0)
}

fn domain_depth(domain: &Domain) -> f64 {
    let mut score = 0.0;
    score += (domain.keywords.len() as f64 / 10.0).min(0.3);
    score += (domain.examples.len() as f64 / 5.0).min(0.3);
    score += (domain.description.len() as f64 / 200.0).min(0.2);
    if domain.tier == DomainTier::Premium {
        score += 0.2;
    }
    score.min(1.0)
}

/// Overall collision quality on a 0-100 scale, with bounded additive noise so
/// repeated collisions do not produce identical scores.
pub fn quality_score(request: &CollisionRequest, domain: &Domain) -> f64 {
    quality_score_with(request, domain, &mut rand::thread_rng())
}

pub fn quality_score_with<R: Rng>(request: &CollisionRequest, domain: &Domain, rng: &mut R) -> f64 {
    let relevance = project_relevance(request, domain);
    let nov = novelty(&request.interests, domain);
    let complexity = project_complexity(&request.project);
    let depth = domain_depth(domain);

    let mut score = (relevance * 0.3 + nov * 0.3 + complexity * 0.2 + depth * 0.2) * 100.0;
    score += (rng.gen::<f64>() - 0.5) * 5.0;

    score.clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn domain(name: &str, category: &str, keywords: &[&str], description: &str) -> Domain {
        Domain {
            id: Uuid::new_v4(),
            name: name.into(),
            category: category.into(),
            description: description.into(),
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
            examples: vec!["Termite mound airflow".into()],
            intensities: vec![Intensity::Moderate],
            tier: DomainTier::Basic,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn request(interests: &[&str], project: &str) -> CollisionRequest {
        CollisionRequest {
            interests: interests.iter().map(|s| s.to_string()).collect(),
            project: project.into(),
            project_type: ProjectType::Product,
            intensity: Intensity::Moderate,
        }
    }

    #[test]
    fn interest_relevance_empty_interests_is_zero() {
        let d = domain("Biomimicry", "Science", &["adaptation"], "");
        assert_eq!(interest_relevance(&[], &d), 0.0);
    }

    #[test]
    fn interest_relevance_caps_per_interest() {
        // Name, category, keyword and description all match, but a single
        // interest can contribute at most 3.0 of a possible 3.0.
        let d = domain(
            "Biology Lab",
            "biology",
            &["biology", "cell biology"],
            "all about biology",
        );
        let score = interest_relevance(&["biology".into()], &d);
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn interest_relevance_stays_in_unit_interval() {
        let d = domain("Quantum Physics", "Science", &["entanglement", "qubits"], "spooky");
        for interests in [
            vec!["physics".to_string()],
            vec!["physics".to_string(), "design".to_string()],
            vec!["x".to_string(); 7],
        ] {
            let score = interest_relevance(&interests, &d);
            assert!((0.0..=1.0).contains(&score), "score {} out of range", score);
        }
    }

    #[test]
    fn project_relevance_counts_affinity_and_keywords() {
        let d = domain(
            "Industrial Design",
            "Design",
            &["prototype", "iteration"],
            "",
        );
        let req = request(&[], "a prototype platform with fast iteration");
        // 0.3 affinity (product -> design) + 0.2 * 2 keywords, examples share no words.
        let score = project_relevance(&req, &d);
        assert!((score - 0.7).abs() < 1e-9);
    }

    #[test]
    fn project_relevance_is_clamped() {
        let keywords: Vec<String> = (0..10).map(|i| format!("word{}", i)).collect();
        let kw_refs: Vec<&str> = keywords.iter().map(|s| s.as_str()).collect();
        let project = keywords.join(" ");
        let d = domain("Dense", "design", &kw_refs, "");
        let req = request(&[], &project);
        assert!(project_relevance(&req, &d) <= 1.0);
    }

    #[test]
    fn novelty_has_floor_and_boost() {
        // Fully relevant domain still gets the 0.2 novelty floor.
        let relevant = domain("Biology", "biology", &["biology"], "biology everywhere");
        let n = novelty(&["biology".into()], &relevant);
        assert!((n - 0.2).abs() < 1e-9);

        // Unrelated quantum domain: novelty 1.0 boosted but clamped at 1.0.
        let quantum = domain("Quantum Physics", "Science", &[], "superposition");
        let n = novelty(&["cooking".into()], &quantum);
        assert!((n - 1.0).abs() < 1e-9);
    }

    #[test]
    fn weights_track_intensity() {
        let (r_gentle, n_gentle) = composite_weights(Intensity::Gentle);
        let (r_radical, n_radical) = composite_weights(Intensity::Radical);
        assert!(r_gentle > n_gentle);
        assert!(n_radical > r_radical);
        let (r_mod, n_mod) = composite_weights(Intensity::Moderate);
        assert!(n_mod > r_mod);
    }

    #[test]
    fn quality_score_bounded_over_many_draws() {
        let d = domain("Mycology", "Science", &["networks"], "fungal systems");
        let req = request(&["design"], "a distributed analytics platform");
        for _ in 0..200 {
            let q = quality_score(&req, &d);
            assert!((0.0..=100.0).contains(&q), "quality {} out of range", q);
        }
    }

    #[test]
    fn quality_noise_is_bounded() {
        let d = domain("Mycology", "Science", &[], "");
        let req = request(&["design"], "plain project");
        let samples: Vec<f64> = (0..100).map(|_| quality_score(&req, &d)).collect();
        let min = samples.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = samples.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        // Noise is uniform in [-2.5, 2.5], so the spread can never exceed 5.
        assert!(max - min <= 5.0 + 1e-9);
    }

    #[test]
    fn complexity_vocabulary_saturates() {
        assert_eq!(project_complexity("a plain idea"), 0.0);
        let loaded = "a scalable distributed analytics platform with automation \
                      and optimization on a network architecture";
        assert_eq!(project_complexity(loaded), 1.0);
    }

    #[test]
    fn domain_depth_rewards_premium() {
        let mut d = domain("X", "Y", &[], "");
        d.examples.clear();
        let basic = domain_depth(&d);
        d.tier = DomainTier::Premium;
        assert!((domain_depth(&d) - basic - 0.2).abs() < 1e-9);
    }
}
