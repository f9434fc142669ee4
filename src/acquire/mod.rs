//! The acquisition core: pacing, identities, classification and extraction
//! behind a single orchestrator

pub mod classifier;
pub mod extractor;
pub mod identity;
pub mod landmarks;
pub mod orchestrator;
pub mod pacing;

pub use classifier::{classify_failure, Classifier, Verdict};
pub use extractor::TableExtractor;
pub use identity::{builtin_pool, Identity, IdentityManager};
pub use landmarks::{LandmarkDetector, MarkerLandmarks};
pub use orchestrator::Orchestrator;
pub use pacing::{PacingController, PacingPlan};
