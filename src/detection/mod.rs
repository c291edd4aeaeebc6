//! Strip detection module
//!
//! Locates the dosimeter strip within an arbitrary photo: edge/contour
//! candidate extraction, multi-factor scoring, and winner selection with a
//! deterministic fallback region.

pub mod candidates;
pub mod geometry;
pub mod locator;
pub mod scoring;

pub use candidates::{RegionCandidate, RegionCandidateFinder};
pub use geometry::PixelBounds;
pub use locator::{
    DetectionOutcome, DetectionReport, FallbackReason, LocatorState, StripLocation, StripLocator,
};
pub use scoring::CandidateScorer;
