pub mod enhancer;
pub mod openai;
pub mod provider;

pub use enhancer::{CollisionEnhancer, EnhancerDeadlines};
pub use openai::{OpenAiConfig, OpenAiProvider};
pub use provider::{LlmProvider, LlmResult};
