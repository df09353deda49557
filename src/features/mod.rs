//! Form inputs and their mapping onto the model's feature vector
//!
//! - `inputs`: the user-entered fields and their widget constraints
//! - `vector`: the fixed 13-column numeric row handed to the regressor

pub mod inputs;
pub mod vector;

pub use inputs::{Assortment, DayOfWeek, StoreInputs, StoreType};
pub use vector::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
