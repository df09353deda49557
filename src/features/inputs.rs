//! User-entered store and promotion fields
//!
//! These mirror the form widgets one to one. Range checks here are the only
//! validation applied before a prediction; anything the widgets allow is
//! passed to the model as-is.

use crate::errors::{Result, SalesError};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Day of week, numbered the way the training data numbers it (Monday = 1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum DayOfWeek {
    Monday = 1,
    Tuesday = 2,
    Wednesday = 3,
    Thursday = 4,
    Friday = 5,
    Saturday = 6,
    Sunday = 7,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    /// Numeric code fed to the model
    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            DayOfWeek::Monday => "Monday",
            DayOfWeek::Tuesday => "Tuesday",
            DayOfWeek::Wednesday => "Wednesday",
            DayOfWeek::Thursday => "Thursday",
            DayOfWeek::Friday => "Friday",
            DayOfWeek::Saturday => "Saturday",
            DayOfWeek::Sunday => "Sunday",
        }
    }
}

impl TryFrom<u8> for DayOfWeek {
    type Error = SalesError;

    fn try_from(value: u8) -> Result<Self> {
        DayOfWeek::ALL
            .iter()
            .copied()
            .find(|d| d.number() == value)
            .ok_or_else(|| SalesError::invalid_input("day_of_week", format!("{} is not in 1-7", value)))
    }
}

impl From<DayOfWeek> for u8 {
    fn from(day: DayOfWeek) -> u8 {
        day.number()
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Store model category; `a` is the base level of the one-hot encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreType {
    #[default]
    A,
    B,
    C,
    D,
}

impl StoreType {
    pub const ALL: [StoreType; 4] = [StoreType::A, StoreType::B, StoreType::C, StoreType::D];

    pub fn code(self) -> &'static str {
        match self {
            StoreType::A => "a",
            StoreType::B => "b",
            StoreType::C => "c",
            StoreType::D => "d",
        }
    }

    pub fn parse(code: &str) -> Result<Self> {
        StoreType::ALL
            .iter()
            .copied()
            .find(|t| t.code() == code.trim())
            .ok_or_else(|| SalesError::invalid_input("store_type", format!("unknown store type '{}'", code)))
    }
}

/// Assortment level; `a` (basic) is the base level of the one-hot encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Assortment {
    #[default]
    A,
    B,
    C,
}

impl Assortment {
    pub const ALL: [Assortment; 3] = [Assortment::A, Assortment::B, Assortment::C];

    pub fn code(self) -> &'static str {
        match self {
            Assortment::A => "a",
            Assortment::B => "b",
            Assortment::C => "c",
        }
    }

    pub fn parse(code: &str) -> Result<Self> {
        Assortment::ALL
            .iter()
            .copied()
            .find(|a| a.code() == code.trim())
            .ok_or_else(|| SalesError::invalid_input("assortment", format!("unknown assortment '{}'", code)))
    }
}

/// Everything the prediction form collects
///
/// Missing JSON fields take the form defaults, so `{}` is Monday with no
/// customers on today's date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreInputs {
    pub day_of_week: DayOfWeek,
    pub customers: u32,
    pub store_type: StoreType,
    pub assortment: Assortment,
    /// Promotion intensity as a whole percentage (slider 0-100)
    pub promo_percent: u8,
    pub promo2: bool,
    pub school_holiday: bool,
    /// Distance to the nearest competitor as entered (unit as labelled in the UI)
    pub competition_distance: u32,
    pub month: u32,
    pub day: u32,
}

impl StoreInputs {
    /// Form defaults, with month and day taken from the given date
    pub fn defaults_for(date: chrono::NaiveDate) -> Self {
        Self {
            day_of_week: DayOfWeek::Monday,
            customers: 0,
            store_type: StoreType::A,
            assortment: Assortment::A,
            promo_percent: 0,
            promo2: false,
            school_holiday: false,
            competition_distance: 0,
            month: date.month(),
            day: date.day(),
        }
    }

    /// Form defaults for today's local date
    pub fn today() -> Self {
        Self::defaults_for(chrono::Local::now().date_naive())
    }

    /// Enforce the widget constraints
    pub fn validate(&self) -> Result<()> {
        if self.promo_percent > 100 {
            return Err(SalesError::invalid_input(
                "promo_percent",
                format!("{} is not in 0-100", self.promo_percent),
            ));
        }
        if !(1..=12).contains(&self.month) {
            return Err(SalesError::invalid_input(
                "month",
                format!("{} is not in 1-12", self.month),
            ));
        }
        if !(1..=31).contains(&self.day) {
            return Err(SalesError::invalid_input(
                "day",
                format!("{} is not in 1-31", self.day),
            ));
        }
        Ok(())
    }
}

impl Default for StoreInputs {
    fn default() -> Self {
        Self::today()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample() -> StoreInputs {
        StoreInputs::defaults_for(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())
    }

    #[test]
    fn test_defaults_take_month_and_day_from_date() {
        let inputs = sample();
        assert_eq!(inputs.month, 3);
        assert_eq!(inputs.day, 15);
        assert_eq!(inputs.day_of_week, DayOfWeek::Monday);
        assert_eq!(inputs.customers, 0);
        assert_eq!(inputs.store_type, StoreType::A);
        assert_eq!(inputs.assortment, Assortment::A);
    }

    #[test]
    fn test_day_of_week_numbering() {
        assert_eq!(DayOfWeek::Monday.number(), 1);
        assert_eq!(DayOfWeek::Sunday.number(), 7);
        assert_eq!(DayOfWeek::try_from(5).unwrap(), DayOfWeek::Friday);
        assert!(DayOfWeek::try_from(0).is_err());
        assert!(DayOfWeek::try_from(8).is_err());
    }

    #[test]
    fn test_store_type_and_assortment_parse() {
        assert_eq!(StoreType::parse("c").unwrap(), StoreType::C);
        assert!(StoreType::parse("e").is_err());
        assert_eq!(Assortment::parse(" b ").unwrap(), Assortment::B);
        assert!(Assortment::parse("d").is_err());
    }

    #[test]
    fn test_validate_ranges() {
        assert!(sample().validate().is_ok());

        let mut inputs = sample();
        inputs.promo_percent = 101;
        assert!(inputs.validate().is_err());

        let mut inputs = sample();
        inputs.month = 13;
        assert!(inputs.validate().is_err());

        let mut inputs = sample();
        inputs.day = 0;
        assert!(inputs.validate().is_err());
    }

    #[test]
    fn test_json_shape() {
        let json = r#"{"day_of_week": 6, "customers": 420, "store_type": "d",
            "assortment": "c", "promo_percent": 25, "promo2": true,
            "school_holiday": false, "competition_distance": 150,
            "month": 7, "day": 4}"#;
        let inputs: StoreInputs = serde_json::from_str(json).unwrap();
        assert_eq!(inputs.day_of_week, DayOfWeek::Saturday);
        assert_eq!(inputs.store_type, StoreType::D);
        assert_eq!(inputs.assortment, Assortment::C);
        assert!(inputs.promo2);

        let back = serde_json::to_value(&inputs).unwrap();
        assert_eq!(back["day_of_week"], 6);
        assert_eq!(back["store_type"], "d");
    }

    #[test]
    fn test_json_missing_fields_take_form_defaults() {
        let inputs: StoreInputs = serde_json::from_str(r#"{"customers": 300}"#).unwrap();
        let today = StoreInputs::today();
        assert_eq!(inputs.customers, 300);
        assert_eq!(inputs.day_of_week, DayOfWeek::Monday);
        assert_eq!((inputs.month, inputs.day), (today.month, today.day));
        assert!(inputs.validate().is_ok());
    }

    #[test]
    fn test_json_rejects_bad_day_of_week() {
        let json = r#"{"day_of_week": 9, "month": 1, "day": 1}"#;
        assert!(serde_json::from_str::<StoreInputs>(json).is_err());
    }
}
