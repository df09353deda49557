//! One-field-at-a-time sweep over the reference row

use crate::diagnostics::scenarios::reference_vector;
use crate::errors::Result;
use crate::features::vector::{
    COMPETITION_DISTANCE, CUSTOMERS, DAY_OF_WEEK, PROMO, PROMO2, SCHOOL_HOLIDAY, STORE_TYPE_B,
    STORE_TYPE_C, STORE_TYPE_D,
};
use crate::features::{FeatureVector, StoreType};
use crate::models::Regressor;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct SweepPoint {
    pub label: String,
    pub prediction: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SweepSection {
    pub title: &'static str,
    pub points: Vec<SweepPoint>,
}

fn section<I>(model: &dyn Regressor, title: &'static str, rows: I) -> Result<SweepSection>
where
    I: IntoIterator<Item = (String, FeatureVector)>,
{
    let points = rows
        .into_iter()
        .map(|(label, row)| {
            model.predict(row.as_slice()).map(|prediction| SweepPoint { label, prediction })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(SweepSection { title, points })
}

fn store_type_row(base: &FeatureVector, store_type: StoreType) -> FeatureVector {
    let one_hot = |t: StoreType| if store_type == t { 1.0 } else { 0.0 };
    base.with(STORE_TYPE_B, one_hot(StoreType::B))
        .with(STORE_TYPE_C, one_hot(StoreType::C))
        .with(STORE_TYPE_D, one_hot(StoreType::D))
}

/// Vary customers, promo, weekday, store type, holidays and competition
pub fn run_sweep(model: &dyn Regressor) -> Result<Vec<SweepSection>> {
    let base = reference_vector();

    Ok(vec![
        section(
            model,
            "Testing different customer counts",
            [0u32, 100, 500, 1000, 2000]
                .iter()
                .map(|&c| (format!("Customers: {}", c), base.with(CUSTOMERS, f64::from(c)))),
        )?,
        section(
            model,
            "Testing different promo values",
            [0.0, 0.25, 0.5, 0.75, 1.0]
                .iter()
                .map(|&p| (format!("Promo: {}", p), base.with(PROMO, p))),
        )?,
        section(
            model,
            "Testing different days of week",
            (1u8..=7).map(|d| (format!("Day {}", d), base.with(DAY_OF_WEEK, f64::from(d)))),
        )?,
        section(
            model,
            "Testing different store types",
            StoreType::ALL
                .iter()
                .map(|&t| (format!("Store type {}", t.code()), store_type_row(&base, t))),
        )?,
        section(
            model,
            "Testing school holiday",
            [0u8, 1].iter().map(|&h| {
                (format!("School holiday: {}", h), base.with(SCHOOL_HOLIDAY, f64::from(h)))
            }),
        )?,
        section(
            model,
            "Testing promo2",
            [0u8, 1]
                .iter()
                .map(|&p| (format!("Promo2: {}", p), base.with(PROMO2, f64::from(p)))),
        )?,
        section(
            model,
            "Testing competition distance",
            [0u32, 100, 500, 1000, 5000].iter().map(|&d| {
                (
                    format!("Competition distance: {}", d),
                    base.with(COMPETITION_DISTANCE, f64::from(d)),
                )
            }),
        )?,
    ])
}
