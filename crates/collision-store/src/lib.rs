pub mod cache;
pub mod postgres;
pub mod rate_limit;
pub mod seeds;
pub mod usage;

pub use cache::RedisCache;
pub use postgres::PostgresStore;
pub use rate_limit::{RateDecision, SlidingWindowLimiter};
pub use usage::UsageMeter;
