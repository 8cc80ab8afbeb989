//! Deterministic enrichment: spark questions, adapted examples, next steps.
//!
//! Always runs before any LLM pass; premium enrichment may overwrite these
//! fields but a failed LLM call leaves them intact.

use collision_core::{CollisionRequest, Domain, Intensity};
use rand::Rng;

pub fn spark_questions(request: &CollisionRequest, domain: &Domain) -> Vec<String> {
    spark_questions_with(request, domain, &mut rand::thread_rng())
}

pub fn spark_questions_with<R: Rng>(
    request: &CollisionRequest,
    domain: &Domain,
    rng: &mut R,
) -> Vec<String> {
    let mut questions = vec![
        format!(
            "How might {} principles reshape your approach to {}?",
            domain.name.to_lowercase(),
            request.project
        ),
        format!(
            "What would {} look like if designed using {} patterns?",
            request.project, domain.category
        ),
        format!(
            "Which aspects of {} could introduce unexpected benefits to your {} project?",
            domain.name, request.project_type
        ),
    ];

    if !domain.keywords.is_empty() {
        let keyword = &domain.keywords[rng.gen_range(0..domain.keywords.len())];
        questions.push(format!(
            "How could the concept of '{}' unlock new possibilities in your work?",
            keyword
        ));
    }

    questions
}

/// Contextualizes each catalog example for the project type.
pub fn adapt_examples(request: &CollisionRequest, domain: &Domain) -> Vec<String> {
    domain
        .examples
        .iter()
        .map(|example| {
            format!(
                "{} → Applied to {}: {}",
                example,
                request.project_type,
                contextualize(example)
            )
        })
        .collect()
}

fn contextualize(example: &str) -> &'static str {
    let example = example.to_lowercase();
    if example.contains("system") {
        "could inspire new system architectures"
    } else if example.contains("pattern") {
        "might reveal new design patterns"
    } else if example.contains("flow") {
        "could optimize process flows"
    } else {
        "offers fresh perspective on implementation"
    }
}

pub fn next_steps(request: &CollisionRequest, domain: &Domain) -> Vec<String> {
    let mut steps = vec![
        format!(
            "Research core {} principles and identify 3 that could apply to {}",
            domain.name, request.project
        ),
        format!(
            "Find experts or resources in {} to deepen understanding",
            domain.name
        ),
        format!(
            "Prototype one small aspect of {} using {}-inspired approaches",
            request.project, domain.name
        ),
        "Document insights and unexpected connections discovered".to_string(),
    ];

    if request.intensity == Intensity::Radical {
        steps.push(format!(
            "Challenge fundamental assumptions about {} using {} perspective",
            request.project_type, domain.name
        ));
    }

    steps
}
