//! Emotional analysis of user messages and mood-aware response shaping.

mod analysis;
mod enhancer;
mod metrics;

pub use analysis::{Analysis, EmotionalTone, analyze};
pub use enhancer::{PersonalityEnhancer, enhance};
pub use metrics::{RelationshipMetrics, RelationshipStats};
