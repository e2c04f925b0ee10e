// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Categories offered when entering an appliance. The engine itself accepts
/// any category string.
pub const CATEGORIES: [&str; 7] = [
    "Heating & Cooling",
    "Kitchen",
    "Lighting",
    "Electronics",
    "Laundry",
    "Water Heating",
    "Other",
];

pub const HEATING_AND_COOLING: &str = "Heating & Cooling";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appliance {
    pub id: String,
    pub name: String,
    pub category: String,
    pub wattage: f64,
    pub hours_per_day: f64,
    pub days_per_month: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HomeSize {
    Small,
    Medium,
    Large,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EfficiencyRating {
    Poor,
    Average,
    Good,
    Excellent,
}

macro_rules! str_enum {
    ($ty:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $ty {
            type Err = anyhow::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($text => Ok($ty::$variant),)+
                    other => Err(anyhow::anyhow!(
                        "Invalid {} '{}'",
                        stringify!($ty),
                        other
                    )),
                }
            }
        }
    };
}

str_enum!(Season { Spring => "spring", Summer => "summer", Fall => "fall", Winter => "winter" });
str_enum!(HomeSize { Small => "small", Medium => "medium", Large => "large" });
str_enum!(EfficiencyRating {
    Poor => "poor",
    Average => "average",
    Good => "good",
    Excellent => "excellent",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BillSettings {
    pub region: String,
    pub use_time_of_use: bool,
    pub season: Season,
    pub home_size: HomeSize, // not used by the calculation
    pub efficiency_rating: EfficiencyRating,
}

impl Default for BillSettings {
    fn default() -> Self {
        Self {
            region: crate::rates::NATIONAL_AVERAGE.to_string(),
            use_time_of_use: false,
            season: Season::Summer,
            home_size: HomeSize::Medium,
            efficiency_rating: EfficiencyRating::Average,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplianceUsage {
    pub appliance: Appliance,
    pub monthly_kwh: f64,
    pub monthly_cost: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryUsage {
    pub category: String,
    pub monthly_kwh: f64,
    pub monthly_cost: f64,
    pub percentage: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillCalculation {
    pub total_kwh: f64,
    pub monthly_bill: f64,
    pub yearly_bill: f64,
    pub daily_average: f64,
    pub appliance_breakdown: Vec<ApplianceUsage>,
    pub category_breakdown: Vec<CategoryUsage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedBill {
    pub id: String,
    pub name: String,
    pub month: String,
    pub year: i32,
    pub appliances: Vec<Appliance>,
    pub settings: BillSettings,
    pub calculation: BillCalculation,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    pub appliances: Vec<Appliance>,
    pub bill_settings: BillSettings,
    pub saved_bills: Vec<SavedBill>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_use_browser_field_names() {
        let v = serde_json::to_value(BillSettings::default()).unwrap();
        assert_eq!(
            v,
            serde_json::json!({
                "region": "National Average",
                "useTimeOfUse": false,
                "season": "summer",
                "homeSize": "medium",
                "efficiencyRating": "average"
            })
        );
    }

    #[test]
    fn enum_parsing_is_case_insensitive() {
        assert_eq!("Winter".parse::<Season>().unwrap(), Season::Winter);
        assert_eq!(
            " excellent ".parse::<EfficiencyRating>().unwrap(),
            EfficiencyRating::Excellent
        );
        assert!("tropical".parse::<Season>().is_err());
    }
}
