//! Flat numeric feature vector in the order the model was fitted on

use crate::errors::{Result, SalesError};
use crate::features::inputs::{Assortment, StoreInputs, StoreType};
use serde::Serialize;
use std::fmt;

/// Number of features the regressor consumes
pub const FEATURE_COUNT: usize = 13;

/// Column names, index-aligned with [`FeatureVector`]
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "DayOfWeek",
    "Customers",
    "Promo",
    "SchoolHoliday",
    "CompetitionDistance",
    "Promo2",
    "Month",
    "Day",
    "StoreType_b",
    "StoreType_c",
    "StoreType_d",
    "Assortment_b",
    "Assortment_c",
];

pub const DAY_OF_WEEK: usize = 0;
pub const CUSTOMERS: usize = 1;
pub const PROMO: usize = 2;
pub const SCHOOL_HOLIDAY: usize = 3;
pub const COMPETITION_DISTANCE: usize = 4;
pub const PROMO2: usize = 5;
pub const MONTH: usize = 6;
pub const DAY: usize = 7;
pub const STORE_TYPE_B: usize = 8;
pub const STORE_TYPE_C: usize = 9;
pub const STORE_TYPE_D: usize = 10;
pub const ASSORTMENT_B: usize = 11;
pub const ASSORTMENT_C: usize = 12;

/// Model input row
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

fn flag(on: bool) -> f64 {
    if on {
        1.0
    } else {
        0.0
    }
}

impl FeatureVector {
    pub const fn new(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    /// Map form inputs onto the fixed feature order
    pub fn from_inputs(inputs: &StoreInputs) -> Self {
        let mut values = [0.0; FEATURE_COUNT];
        values[DAY_OF_WEEK] = f64::from(inputs.day_of_week.number());
        values[CUSTOMERS] = f64::from(inputs.customers);
        values[PROMO] = f64::from(inputs.promo_percent) / 100.0;
        values[SCHOOL_HOLIDAY] = flag(inputs.school_holiday);
        values[COMPETITION_DISTANCE] = f64::from(inputs.competition_distance);
        values[PROMO2] = flag(inputs.promo2);
        values[MONTH] = f64::from(inputs.month);
        values[DAY] = f64::from(inputs.day);
        values[STORE_TYPE_B] = flag(inputs.store_type == StoreType::B);
        values[STORE_TYPE_C] = flag(inputs.store_type == StoreType::C);
        values[STORE_TYPE_D] = flag(inputs.store_type == StoreType::D);
        values[ASSORTMENT_B] = flag(inputs.assortment == Assortment::B);
        values[ASSORTMENT_C] = flag(inputs.assortment == Assortment::C);
        Self(values)
    }

    /// Build from a raw row; the length must be exactly [`FEATURE_COUNT`]
    pub fn from_slice(values: &[f64]) -> Result<Self> {
        let array: [f64; FEATURE_COUNT] =
            values.try_into().map_err(|_| SalesError::FeatureMismatch {
                expected: FEATURE_COUNT,
                actual: values.len(),
            })?;
        Ok(Self(array))
    }

    /// Copy of this vector with one entry replaced
    pub fn with(&self, index: usize, value: f64) -> Self {
        let mut values = self.0;
        values[index] = value;
        Self(values)
    }

    pub fn get(&self, index: usize) -> f64 {
        self.0[index]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// (name, value) pairs for debug display
    pub fn named(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURE_NAMES.iter().copied().zip(self.0.iter().copied())
    }
}

impl fmt::Display for FeatureVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", value)?;
        }
        write!(f, "]")
    }
}
