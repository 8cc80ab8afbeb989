//! Premium enrichment pass over an already-complete collision result.
//!
//! Four sequential capability calls, each under its own deadline. Any
//! failure, timeout, empty response, or unparseable list leaves the
//! deterministic output for that capability untouched, so the client never
//! observes a partial or failed enrichment.

use std::sync::Arc;
use std::time::Duration;

use collision_core::{CollisionRequest, CollisionResult, Domain};
use tokio::time::timeout;
use tracing::warn;

use crate::provider::LlmProvider;

#[derive(Debug, Clone)]
pub struct EnhancerDeadlines {
    pub connection: Duration,
    pub questions: Duration,
    pub examples: Duration,
    pub next_steps: Duration,
}

impl Default for EnhancerDeadlines {
    fn default() -> Self {
        Self {
            connection: Duration::from_secs(10),
            questions: Duration::from_secs(8),
            examples: Duration::from_secs(8),
            next_steps: Duration::from_secs(8),
        }
    }
}

pub struct CollisionEnhancer {
    provider: Arc<dyn LlmProvider>,
    deadlines: EnhancerDeadlines,
}

impl CollisionEnhancer {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            provider,
            deadlines: EnhancerDeadlines::default(),
        }
    }

    pub fn with_deadlines(provider: Arc<dyn LlmProvider>, deadlines: EnhancerDeadlines) -> Self {
        Self {
            provider,
            deadlines,
        }
    }

    /// Upgrades connection, spark questions, examples, and next steps in
    /// place. Never fails; never affects HTTP status.
    pub async fn enhance(
        &self,
        result: &mut CollisionResult,
        request: &CollisionRequest,
        domain: &Domain,
    ) {
        if let Some(connection) = self
            .call(
                self.deadlines.connection,
                "connection",
                "You are an expert at finding meaningful connections between disparate fields. \
                 Create insightful, practical connections that spark innovation.",
                &connection_prompt(request, domain),
                200,
                0.7,
            )
            .await
        {
            if !connection.is_empty() {
                result.connection = connection;
            }
        }

        if let Some(content) = self
            .call(
                self.deadlines.questions,
                "spark_questions",
                "Generate thought-provoking questions that help people explore unexpected \
                 connections. Focus on actionable insights and creative breakthroughs.",
                &questions_prompt(request, domain),
                250,
                0.8,
            )
            .await
        {
            let questions = parse_numbered_list(&content, 4);
            if !questions.is_empty() {
                result.spark_questions = questions;
            }
        }

        if let Some(content) = self
            .call(
                self.deadlines.examples,
                "examples",
                "Create specific, actionable examples showing how principles from one domain \
                 can be applied to another. Focus on concrete applications.",
                &examples_prompt(request, domain),
                300,
                0.7,
            )
            .await
        {
            let examples = parse_numbered_list(&content, 3);
            if !examples.is_empty() {
                result.examples = examples;
            }
        }

        if let Some(content) = self
            .call(
                self.deadlines.next_steps,
                "next_steps",
                "Generate specific, actionable next steps that someone can take to explore \
                 and implement cross-domain insights. Be practical and concrete.",
                &next_steps_prompt(request, domain),
                250,
                0.6,
            )
            .await
        {
            let steps = parse_numbered_list(&content, 4);
            if !steps.is_empty() {
                result.next_steps = steps;
            }
        }
    }

    /// One deadline-bounded provider call. Single attempt; errors and
    /// timeouts degrade to `None`.
    async fn call(
        &self,
        deadline: Duration,
        capability: &str,
        system: &str,
        user: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Option<String> {
        match timeout(
            deadline,
            self.provider.complete(system, user, max_tokens, temperature),
        )
        .await
        {
            Ok(Ok(content)) => Some(content.trim().to_string()),
            Ok(Err(e)) => {
                warn!(capability, error = %e, "LLM enrichment failed, keeping deterministic output");
                None
            }
            Err(_) => {
                warn!(capability, "LLM enrichment timed out, keeping deterministic output");
                None
            }
        }
    }
}

/// Forgiving numbered-list extractor: trimmed lines starting `"N."` for
/// N in [1, expected]; everything else is ignored.
pub fn parse_numbered_list(content: &str, expected: usize) -> Vec<String> {
    let mut items = Vec::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        for n in 1..=expected {
            let prefix = format!("{}.", n);
            if let Some(rest) = line.strip_prefix(&prefix) {
                let item = rest.trim();
                if !item.is_empty() {
                    items.push(item.to_string());
                }
                break;
            }
        }
    }

    items
}

fn joined_keywords(domain: &Domain, cap: usize) -> String {
    domain.keywords[..domain.keywords.len().min(cap)].join(", ")
}

fn connection_prompt(request: &CollisionRequest, domain: &Domain) -> String {
    format!(
        "Create a meaningful connection between {} and \"{}\" (a {} project).\n\n\
         Domain: {}\nCategory: {}\nDescription: {}\nKey concepts: {}\n\n\
         User interests: {}\nCollision intensity: {}\n\n\
         Generate a 2-3 sentence explanation of how {} principles can enhance or transform \
         the \"{}\" project. Focus on specific, actionable insights rather than vague connections.",
        domain.name,
        request.project,
        request.project_type,
        domain.name,
        domain.category,
        domain.description,
        joined_keywords(domain, 5),
        request.interests.join(", "),
        request.intensity,
        domain.name,
        request.project,
    )
}

fn questions_prompt(request: &CollisionRequest, domain: &Domain) -> String {
    format!(
        "Generate 4 thought-provoking questions that help someone explore connections \
         between {} and their \"{}\" project.\n\n\
         Domain: {}\nDescription: {}\nProject type: {}\nUser interests: {}\n\n\
         Each question should:\n\
         - Encourage deep thinking about cross-domain applications\n\
         - Be specific and actionable\n\
         - Help identify concrete opportunities\n\
         - Spark creative breakthroughs\n\n\
         Format as a numbered list (1., 2., 3., 4.).",
        domain.name,
        request.project,
        domain.name,
        domain.description,
        request.project_type,
        request.interests.join(", "),
    )
}

fn examples_prompt(request: &CollisionRequest, domain: &Domain) -> String {
    format!(
        "Generate 3 specific examples showing how {} principles can be applied to a {} \
         project like \"{}\".\n\n\
         Domain: {}\nDescription: {}\nKey concepts: {}\n\n\
         Each example should:\n\
         - Show a specific principle or technique from {}\n\
         - Demonstrate concrete application to the {} project\n\
         - Be realistic and implementable\n\
         - Provide clear value\n\n\
         Format as a numbered list (1., 2., 3.).",
        domain.name,
        request.project_type,
        request.project,
        domain.name,
        domain.description,
        joined_keywords(domain, 3),
        domain.name,
        request.project,
    )
}

fn next_steps_prompt(request: &CollisionRequest, domain: &Domain) -> String {
    format!(
        "Generate 4 actionable next steps for someone wanting to apply {} insights to \
         their \"{}\" project.\n\n\
         Domain: {}\nProject type: {}\nUser interests: {}\n\n\
         Each step should:\n\
         - Be specific and actionable\n\
         - Build toward implementing the cross-domain connection\n\
         - Be achievable within 1-2 weeks\n\
         - Progress from research to implementation\n\n\
         Format as a numbered list (1., 2., 3., 4.).",
        domain.name,
        request.project,
        domain.name,
        request.project_type,
        request.interests.join(", "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use chrono::Utc;
    use collision_core::{DomainTier, Intensity, ProjectType};
    use uuid::Uuid;

    struct FailingProvider;

    #[async_trait]
    impl LlmProvider for FailingProvider {
        async fn complete(&self, _: &str, _: &str, _: u32, _: f32) -> crate::LlmResult<String> {
            Err(anyhow!("connection refused"))
        }

        fn provider_name(&self) -> &str {
            "failing"
        }
    }

    struct CannedProvider {
        responses: Vec<String>,
        cursor: std::sync::Mutex<usize>,
    }

    #[async_trait]
    impl LlmProvider for CannedProvider {
        async fn complete(&self, _: &str, _: &str, _: u32, _: f32) -> crate::LlmResult<String> {
            let mut cursor = self.cursor.lock().unwrap();
            let response = self.responses[*cursor % self.responses.len()].clone();
            *cursor += 1;
            Ok(response)
        }

        fn provider_name(&self) -> &str {
            "canned"
        }
    }

    struct SlowProvider;

    #[async_trait]
    impl LlmProvider for SlowProvider {
        async fn complete(&self, _: &str, _: &str, _: u32, _: f32) -> crate::LlmResult<String> {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok("1. too late".into())
        }

        fn provider_name(&self) -> &str {
            "slow"
        }
    }

    fn sample_domain() -> Domain {
        Domain {
            id: Uuid::new_v4(),
            name: "Mycology".into(),
            category: "Science".into(),
            description: "Fungal networks".into(),
            keywords: vec!["mycelium".into(), "symbiosis".into()],
            examples: vec!["Nutrient routing".into()],
            intensities: vec![Intensity::Moderate],
            tier: DomainTier::Premium,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn sample_request() -> CollisionRequest {
        CollisionRequest {
            interests: vec!["networking".into()],
            project: "mesh routing platform".into(),
            project_type: ProjectType::Product,
            intensity: Intensity::Moderate,
        }
    }

    fn deterministic_result() -> CollisionResult {
        CollisionResult {
            id: Uuid::new_v4(),
            primary_domain: "Networking".into(),
            collision_domain: "Mycology".into(),
            connection: "deterministic connection".into(),
            spark_questions: vec!["q1".into(), "q2".into(), "q3".into()],
            examples: vec!["e1".into()],
            next_steps: vec!["s1".into(), "s2".into(), "s3".into(), "s4".into()],
            quality_score: 61.0,
            generated_at: Utc::now(),
            rating: None,
            notes: None,
        }
    }

    #[test]
    fn parser_extracts_numbered_lines() {
        let content = "Here are some questions:\n\n1. First?\n2. Second?\nrandom noise\n3. Third?\n4. Fourth?\n5. Ignored";
        let items = parse_numbered_list(content, 4);
        assert_eq!(items, vec!["First?", "Second?", "Third?", "Fourth?"]);
    }

    #[test]
    fn parser_ignores_spurious_and_empty_lines() {
        assert!(parse_numbered_list("no list here at all", 4).is_empty());
        assert!(parse_numbered_list("", 3).is_empty());
        assert_eq!(parse_numbered_list("  2. indented item  ", 4), vec!["indented item"]);
        // An empty payload after the prefix is dropped.
        assert!(parse_numbered_list("1.", 4).is_empty());
    }

    #[tokio::test]
    async fn failing_provider_keeps_deterministic_output() {
        let enhancer = CollisionEnhancer::new(Arc::new(FailingProvider));
        let mut result = deterministic_result();
        let before = result.clone();

        enhancer
            .enhance(&mut result, &sample_request(), &sample_domain())
            .await;

        assert_eq!(result.connection, before.connection);
        assert_eq!(result.spark_questions, before.spark_questions);
        assert_eq!(result.examples, before.examples);
        assert_eq!(result.next_steps, before.next_steps);
    }

    #[tokio::test]
    async fn timed_out_provider_keeps_deterministic_output() {
        let deadlines = EnhancerDeadlines {
            connection: Duration::from_millis(10),
            questions: Duration::from_millis(10),
            examples: Duration::from_millis(10),
            next_steps: Duration::from_millis(10),
        };
        let enhancer = CollisionEnhancer::with_deadlines(Arc::new(SlowProvider), deadlines);
        let mut result = deterministic_result();
        let before = result.clone();

        enhancer
            .enhance(&mut result, &sample_request(), &sample_domain())
            .await;

        assert_eq!(result.connection, before.connection);
        assert_eq!(result.next_steps, before.next_steps);
    }

    #[tokio::test]
    async fn successful_provider_replaces_all_capabilities() {
        let provider = CannedProvider {
            responses: vec![
                "A sharper connection.".into(),
                "1. Q1\n2. Q2\n3. Q3\n4. Q4".into(),
                "1. E1\n2. E2\n3. E3".into(),
                "1. S1\n2. S2\n3. S3\n4. S4".into(),
            ],
            cursor: std::sync::Mutex::new(0),
        };
        let enhancer = CollisionEnhancer::new(Arc::new(provider));
        let mut result = deterministic_result();

        enhancer
            .enhance(&mut result, &sample_request(), &sample_domain())
            .await;

        assert_eq!(result.connection, "A sharper connection.");
        assert_eq!(result.spark_questions, vec!["Q1", "Q2", "Q3", "Q4"]);
        assert_eq!(result.examples, vec!["E1", "E2", "E3"]);
        assert_eq!(result.next_steps, vec!["S1", "S2", "S3", "S4"]);
    }

    #[tokio::test]
    async fn unparseable_list_retains_deterministic_list() {
        let provider = CannedProvider {
            responses: vec![
                "A sharper connection.".into(),
                "I would rather write prose than a list.".into(),
                "1. E1".into(),
                "no steps either".into(),
            ],
            cursor: std::sync::Mutex::new(0),
        };
        let enhancer = CollisionEnhancer::new(Arc::new(provider));
        let mut result = deterministic_result();
        let before = result.clone();

        enhancer
            .enhance(&mut result, &sample_request(), &sample_domain())
            .await;

        // Connection and examples upgraded, questions and steps retained.
        assert_eq!(result.connection, "A sharper connection.");
        assert_eq!(result.spark_questions, before.spark_questions);
        assert_eq!(result.examples, vec!["E1"]);
        assert_eq!(result.next_steps, before.next_steps);
    }
}
