//! Test helpers shared across Carmen crates.

pub mod context;
pub mod model;
pub mod speech;

pub use context::TestContext;
pub use model::{FailingModel, FixedModel, GatedModel, RecordingModel};
pub use speech::RecordingSpeech;
