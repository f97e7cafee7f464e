//! Play normalization, classification and feature derivation
//!
//! Converts extracted play-by-play rows into model-ready features.

pub mod classify;
pub mod derive;
pub mod normalize;

pub use classify::{classify, classify_plays, ClassifiedPlay};
pub use derive::{derive_features, FeatureRow};
pub use normalize::{normalize_rows, NormalizedPlay, Possession};
