//! Relationship metrics and their update rule.

use super::analysis::{Analysis, EmotionalTone};

const INTIMACY_STEP: f64 = 0.1;
const DEPTH_STEP: f64 = 0.05;

/// Two scalars in `[0, 1]` that only grow during a run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RelationshipMetrics {
    pub intimacy_level: f64,
    pub relationship_depth: f64,
}

impl RelationshipMetrics {
    /// Build metrics from stored values, clamping into range.
    pub fn new(intimacy_level: f64, relationship_depth: f64) -> Self {
        Self {
            intimacy_level: clamp_unit(intimacy_level),
            relationship_depth: clamp_unit(relationship_depth),
        }
    }

    /// Metrics after one analyzed message.
    pub fn advance(self, analysis: &Analysis) -> Self {
        let intimacy = INTIMACY_STEP * analysis.intimacy_indicators.len() as f64;
        let depth = DEPTH_STEP * analysis.relationship_cues.len() as f64;
        Self {
            intimacy_level: clamp_unit(self.intimacy_level + intimacy),
            relationship_depth: clamp_unit(self.relationship_depth + depth),
        }
    }
}

/// Metrics plus interaction history for display.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipStats {
    pub metrics: RelationshipMetrics,
    /// Tone of the most recent analyzed message.
    pub emotional_state: EmotionalTone,
    /// Enhanced responses recorded in the relationship log.
    pub total_interactions: usize,
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
