use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub type PrincipalId = Uuid;
pub type SessionId = Uuid;

/// Subscription tier of an authenticated principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    Free,
    Pro,
    Team,
}

impl SubscriptionTier {
    /// Pro and team principals bypass usage metering and may bypass rate limiting.
    pub fn is_premium(&self) -> bool {
        matches!(self, SubscriptionTier::Pro | SubscriptionTier::Team)
    }

    /// Weekly collision allowance; `None` means unlimited.
    pub fn weekly_limit(&self, free_limit: i32) -> Option<i32> {
        match self {
            SubscriptionTier::Free => Some(free_limit),
            SubscriptionTier::Pro | SubscriptionTier::Team => None,
        }
    }
}

impl fmt::Display for SubscriptionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SubscriptionTier::Free => "free",
            SubscriptionTier::Pro => "pro",
            SubscriptionTier::Team => "team",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for SubscriptionTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "free" => Ok(SubscriptionTier::Free),
            "pro" => Ok(SubscriptionTier::Pro),
            "team" => Ok(SubscriptionTier::Team),
            other => Err(format!("unknown subscription tier: {}", other)),
        }
    }
}

/// Requested degree of conceptual distance for a collision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Gentle,
    Moderate,
    Radical,
}

impl fmt::Display for Intensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Intensity::Gentle => "gentle",
            Intensity::Moderate => "moderate",
            Intensity::Radical => "radical",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Intensity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gentle" => Ok(Intensity::Gentle),
            "moderate" => Ok(Intensity::Moderate),
            "radical" => Ok(Intensity::Radical),
            other => Err(format!("unknown intensity: {}", other)),
        }
    }
}

/// Kind of project the user is working on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectType {
    Product,
    Content,
    Business,
    Research,
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProjectType::Product => "product",
            ProjectType::Content => "content",
            ProjectType::Business => "business",
            ProjectType::Research => "research",
        };
        write!(f, "{}", s)
    }
}

/// Catalog tier of a curated domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainTier {
    Basic,
    Premium,
}

impl fmt::Display for DomainTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DomainTier::Basic => "basic",
            DomainTier::Premium => "premium",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for DomainTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "basic" => Ok(DomainTier::Basic),
            "premium" => Ok(DomainTier::Premium),
            other => Err(format!("unknown domain tier: {}", other)),
        }
    }
}

/// A curated foreign domain available for collision pairing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Domain {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub examples: Vec<String>,
    pub intensities: Vec<Intensity>,
    pub tier: DomainTier,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Domain {
    pub fn supports_intensity(&self, intensity: Intensity) -> bool {
        self.intensities.contains(&intensity)
    }
}

/// User input for a collision generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollisionRequest {
    pub interests: Vec<String>,
    pub project: String,
    pub project_type: ProjectType,
    pub intensity: Intensity,
}

impl CollisionRequest {
    /// Field-level validation beyond what deserialization enforces.
    pub fn validate(&self) -> crate::Result<()> {
        if self.interests.is_empty() || self.interests.iter().all(|i| i.trim().is_empty()) {
            return Err(crate::CollisionError::Validation(
                "interests must contain at least one non-empty entry".into(),
            ));
        }
        if self.project.trim().is_empty() {
            return Err(crate::CollisionError::Validation(
                "project description must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// The generated collision output returned to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollisionResult {
    pub id: Uuid,
    pub primary_domain: String,
    pub collision_domain: String,
    pub connection: String,
    pub spark_questions: Vec<String>,
    pub examples: Vec<String>,
    pub next_steps: Vec<String>,
    pub quality_score: f64,
    pub generated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// An authenticated identity as seen by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub id: PrincipalId,
    pub tier: SubscriptionTier,
}

/// A persisted collision generation session, owned by one principal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub principal_id: PrincipalId,
    pub request: CollisionRequest,
    pub result: CollisionResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Weekly usage row for a free principal; created lazily on first consult.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageCounter {
    pub id: Uuid,
    pub principal_id: PrincipalId,
    pub count: i32,
    pub window_start: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_serialize_lowercase() {
        assert_eq!(
            serde_json::to_string(&SubscriptionTier::Free).unwrap(),
            "\"free\""
        );
        assert_eq!(
            serde_json::to_string(&SubscriptionTier::Pro).unwrap(),
            "\"pro\""
        );
        let tier: SubscriptionTier = serde_json::from_str("\"team\"").unwrap();
        assert_eq!(tier, SubscriptionTier::Team);
    }

    #[test]
    fn premium_detection() {
        assert!(!SubscriptionTier::Free.is_premium());
        assert!(SubscriptionTier::Pro.is_premium());
        assert!(SubscriptionTier::Team.is_premium());
    }

    #[test]
    fn weekly_limit_by_tier() {
        assert_eq!(SubscriptionTier::Free.weekly_limit(5), Some(5));
        assert_eq!(SubscriptionTier::Pro.weekly_limit(5), None);
    }

    #[test]
    fn intensity_round_trips() {
        for (s, v) in [
            ("gentle", Intensity::Gentle),
            ("moderate", Intensity::Moderate),
            ("radical", Intensity::Radical),
        ] {
            assert_eq!(Intensity::from_str(s).unwrap(), v);
            assert_eq!(v.to_string(), s);
            let parsed: Intensity = serde_json::from_str(&format!("\"{}\"", s)).unwrap();
            assert_eq!(parsed, v);
        }
        assert!(Intensity::from_str("extreme").is_err());
    }

    #[test]
    fn request_validation_rejects_empty_fields() {
        let mut req = CollisionRequest {
            interests: vec!["biology".into()],
            project: "AI recommendation system".into(),
            project_type: ProjectType::Product,
            intensity: Intensity::Moderate,
        };
        assert!(req.validate().is_ok());

        req.interests.clear();
        assert!(req.validate().is_err());

        req.interests = vec!["   ".into()];
        assert!(req.validate().is_err());

        req.interests = vec!["design".into()];
        req.project = "".into();
        assert!(req.validate().is_err());
    }

    #[test]
    fn request_rejects_unknown_enums() {
        let body = r#"{
            "interests": ["x"],
            "project": "p",
            "project_type": "hobby",
            "intensity": "moderate"
        }"#;
        assert!(serde_json::from_str::<CollisionRequest>(body).is_err());
    }
}
