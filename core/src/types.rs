//! Shared primitive types used across the entire pipeline.

/// An operator's name exactly as it appears in the imported export.
pub type OperatorName = String;

/// An opaque call identifier carried through from the import step.
pub type CallId = String;

/// Call duration, in minutes (derived from the export's seconds column).
pub type Minutes = f64;

/// A per-call rating on the 0..=5 scale.
pub type Rating = f64;
