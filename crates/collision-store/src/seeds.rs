//! Curated seed domains, inserted once when the domains table is empty.
//!
//! The catalog is append-only from the engine's view; all mutations go
//! through this seeding path at startup.

use chrono::Utc;
use collision_core::{Domain, DomainTier, Intensity, Result};
use tracing::info;
use uuid::Uuid;

use crate::postgres::PostgresStore;

fn domain(
    name: &str,
    category: &str,
    description: &str,
    keywords: &[&str],
    examples: &[&str],
    intensities: &[Intensity],
    tier: DomainTier,
) -> Domain {
    let now = Utc::now();
    Domain {
        id: Uuid::new_v4(),
        name: name.into(),
        category: category.into(),
        description: description.into(),
        keywords: keywords.iter().map(|s| s.to_string()).collect(),
        examples: examples.iter().map(|s| s.to_string()).collect(),
        intensities: intensities.to_vec(),
        tier,
        created_at: now,
        updated_at: now,
    }
}

pub fn seed_domains() -> Vec<Domain> {
    use Intensity::*;

    vec![
        domain(
            "Biomimicry",
            "Science",
            "Design inspired by strategies that organisms evolved over millions of years of selection pressure.",
            &["adaptation", "evolution", "natural selection", "ecosystems", "resilience"],
            &["Velcro modeled on burr hooks", "Kingfisher beak shaping bullet train noses", "Termite mound ventilation systems"],
            &[Gentle, Moderate],
            DomainTier::Basic,
        ),
        domain(
            "Quantum Physics",
            "Science",
            "Superposition, entanglement, and measurement at scales where classical intuition breaks down.",
            &["superposition", "entanglement", "uncertainty", "measurement", "duality"],
            &["Quantum annealing for optimization", "Interference patterns in double-slit setups", "Error correction across entangled qubits"],
            &[Moderate, Radical],
            DomainTier::Basic,
        ),
        domain(
            "Jazz Improvisation",
            "Arts",
            "Structured spontaneity: shared progressions and listening rituals that let ensembles invent together in real time.",
            &["improvisation", "call and response", "syncopation", "ensemble"],
            &["Trading fours between soloists", "Reharmonizing a standard mid-performance", "Comping patterns that leave space"],
            &[Gentle, Moderate],
            DomainTier::Basic,
        ),
        domain(
            "Ant Colony Behavior",
            "Social Systems",
            "Decentralized coordination where simple local rules and pheromone trails produce global problem solving.",
            &["stigmergy", "pheromones", "swarm", "emergence", "foraging"],
            &["Shortest-path trail system formation", "Dynamic task allocation without managers", "Traffic flow without congestion"],
            &[Moderate, Radical],
            DomainTier::Basic,
        ),
        domain(
            "Origami",
            "Crafts",
            "Folding a single sheet into complex forms; constraint as the generator of structure.",
            &["folding", "crease patterns", "tessellation", "deployable structures"],
            &["Miura fold for satellite solar panels", "Self-folding stent designs", "Crease pattern notation systems"],
            &[Gentle, Moderate],
            DomainTier::Basic,
        ),
        domain(
            "Mycology",
            "Science",
            "Fungal networks that route nutrients, share signals, and decompose the old to feed the new.",
            &["mycelium", "symbiosis", "decomposition", "networks"],
            &["Nutrient flow across mycorrhizal networks", "Mycelium-based packaging materials", "Forest-scale resource sharing"],
            &[Moderate, Radical],
            DomainTier::Basic,
        ),
        domain(
            "Stoic Philosophy",
            "Philosophy",
            "A practice of separating what you control from what you do not, and acting deliberately on the first.",
            &["dichotomy of control", "negative visualization", "virtue", "equanimity"],
            &["Premeditatio malorum as premortem ritual", "Journaling as daily review system", "Voluntary discomfort training"],
            &[Gentle, Moderate],
            DomainTier::Basic,
        ),
        domain(
            "Behavioral Economics",
            "Economics",
            "How real decisions deviate from rational-agent models, and how defaults and framing steer them.",
            &["nudge", "loss aversion", "anchoring", "framing", "defaults"],
            &["Opt-out defaults doubling enrollment", "Decoy pricing in subscription tiers", "Commitment devices for saving"],
            &[Gentle, Moderate],
            DomainTier::Basic,
        ),
        domain(
            "Chaos Theory",
            "Mathematics",
            "Deterministic systems whose sensitivity to initial conditions makes long-run prediction impossible.",
            &["butterfly effect", "attractors", "nonlinearity", "fractals", "bifurcation"],
            &["Lorenz attractor weather models", "Population dynamics flipping between stable and chaotic", "Fractal coastline measurement"],
            &[Radical],
            DomainTier::Premium,
        ),
        domain(
            "Norse Mythology",
            "Cultural",
            "Ancient narrative systems encoding risk, fate, and renewal, from Yggdrasil to Ragnarok.",
            &["fate", "archetypes", "world tree", "cycles", "sagas"],
            &["Ragnarok as creative-destruction narrative pattern", "Yggdrasil as interconnected world model", "Skaldic kennings as compression"],
            &[Moderate, Radical],
            DomainTier::Premium,
        ),
        domain(
            "Ancient Roman Engineering",
            "Design",
            "Ancient infrastructure built for centuries of service: aqueducts, roads, and concrete that cures underwater.",
            &["aqueducts", "arches", "redundancy", "standardization", "durability"],
            &["Gravity-fed water flow across valleys", "Road network standardization", "Self-healing seawater concrete"],
            &[Gentle, Moderate, Radical],
            DomainTier::Premium,
        ),
        domain(
            "Improv Theater",
            "Entertainment",
            "Yes-and collaboration: accepting offers and building on them without a script.",
            &["yes and", "offers", "status play", "group mind"],
            &["Scene building from a single suggestion", "Status transactions between characters", "Game of the scene discovery"],
            &[Gentle, Moderate],
            DomainTier::Basic,
        ),
    ]
}

/// Inserts the seed set when the table is empty. Returns how many domains
/// were inserted (zero when already seeded).
pub async fn ensure_seeded(store: &PostgresStore) -> Result<usize> {
    let existing = store.count_domains().await?;
    if existing > 0 {
        info!(domains = existing, "collision domains already seeded");
        return Ok(0);
    }

    let seeds = seed_domains();
    for domain in &seeds {
        store.insert_domain(domain).await?;
    }

    info!(domains = seeds.len(), "seeded collision domains");
    Ok(seeds.len())
}
