// Score qualité 0..=100 en cinq métriques pondérées, plus un rating.

pub mod config;
pub mod metrics;
pub mod score;
pub mod scorer;

pub use config::QualityConfig;
pub use score::{Metric, MetricScore, QualityScore, Rating};
pub use scorer::QualityScorer;
