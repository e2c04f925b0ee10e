// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Fixed lookup tables used by the bill calculation.
//!
//! Every lookup goes through [`lookup`] so a missing key resolves to a
//! documented default instead of failing.

use crate::models::{EfficiencyRating, Season};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::hash::Hash;

pub const NATIONAL_AVERAGE: &str = "National Average";
pub const NATIONAL_AVERAGE_RATE: f64 = 0.16;

/// USD per kWh, in display order.
pub const REGIONS: [(&str, f64); 11] = [
    ("California", 0.23),
    ("New York", 0.20),
    ("Texas", 0.12),
    ("Florida", 0.13),
    ("Illinois", 0.13),
    ("Pennsylvania", 0.14),
    ("Ohio", 0.13),
    ("Georgia", 0.12),
    ("North Carolina", 0.12),
    ("Michigan", 0.16),
    (NATIONAL_AVERAGE, NATIONAL_AVERAGE_RATE),
];

pub const PEAK_MULTIPLIER: f64 = 1.5;
pub const STANDARD_MULTIPLIER: f64 = 1.0;
pub const OFF_PEAK_MULTIPLIER: f64 = 0.8;

/// Assumed usage mix: 30% peak, 40% standard, 30% off-peak.
pub const TIME_OF_USE_BLEND: f64 =
    0.3 * PEAK_MULTIPLIER + 0.4 * STANDARD_MULTIPLIER + 0.3 * OFF_PEAK_MULTIPLIER;

pub const DEFAULT_CATEGORY_COLOR: &str = "#6B7280";

static REGIONAL_RATES: Lazy<HashMap<&'static str, f64>> =
    Lazy::new(|| REGIONS.into_iter().collect());

static CATEGORY_COLORS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("Heating & Cooling", "#EF4444"),
        ("Kitchen", "#F97316"),
        ("Lighting", "#EAB308"),
        ("Electronics", "#3B82F6"),
        ("Laundry", "#8B5CF6"),
        ("Water Heating", "#06B6D4"),
        ("Other", DEFAULT_CATEGORY_COLOR),
    ])
});

static APPLIANCE_EFFICIENCY: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    HashMap::from([
        ("Refrigerator", 0.85),
        ("Air Conditioner", 1.2),
        ("Water Heater", 1.1),
        ("Washing Machine", 0.9),
        ("Dryer", 1.0),
        ("Dishwasher", 0.8),
        ("Television", 0.7),
        ("Computer", 0.9),
        ("Laptop", 0.6),
        ("LED Light Bulb", 0.2),
        ("Microwave", 1.0),
        ("Oven", 1.1),
    ])
});

static SEASONAL: Lazy<HashMap<Season, f64>> = Lazy::new(|| {
    HashMap::from([
        (Season::Summer, 1.3),
        (Season::Winter, 1.2),
        (Season::Spring, 0.9),
        (Season::Fall, 0.9),
    ])
});

static HOME_EFFICIENCY: Lazy<HashMap<EfficiencyRating, f64>> = Lazy::new(|| {
    HashMap::from([
        (EfficiencyRating::Poor, 1.3),
        (EfficiencyRating::Average, 1.0),
        (EfficiencyRating::Good, 0.85),
        (EfficiencyRating::Excellent, 0.7),
    ])
});

pub fn lookup<K, V, Q>(table: &HashMap<K, V>, key: &Q, default: V) -> V
where
    K: Eq + Hash + std::borrow::Borrow<Q>,
    Q: Eq + Hash + ?Sized,
    V: Copy,
{
    table.get(key).copied().unwrap_or(default)
}

pub fn regional_rate(region: &str) -> f64 {
    lookup(&*REGIONAL_RATES, region, NATIONAL_AVERAGE_RATE)
}

pub fn is_known_region(region: &str) -> bool {
    REGIONAL_RATES.contains_key(region)
}

/// Exact, case-sensitive match on the appliance name.
pub fn appliance_efficiency(name: &str) -> f64 {
    lookup(&*APPLIANCE_EFFICIENCY, name, 1.0)
}

pub fn seasonal_multiplier(season: Season) -> f64 {
    lookup(&*SEASONAL, &season, 1.0)
}

pub fn home_efficiency(rating: EfficiencyRating) -> f64 {
    lookup(&*HOME_EFFICIENCY, &rating, 1.0)
}

pub fn category_color(category: &str) -> &'static str {
    lookup(&*CATEGORY_COLORS, category, DEFAULT_CATEGORY_COLOR)
}

pub fn effective_rate(region: &str, use_time_of_use: bool) -> f64 {
    let base = regional_rate(region);
    if use_time_of_use {
        base * TIME_OF_USE_BLEND
    } else {
        base
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CommonAppliance {
    pub name: &'static str,
    pub category: &'static str,
    pub wattage: f64,
    pub hours_per_day: f64,
    pub days_per_month: f64,
}

/// Quick-add catalogue.
pub static COMMON_APPLIANCES: [CommonAppliance; 8] = [
    CommonAppliance {
        name: "Refrigerator",
        category: "Kitchen",
        wattage: 150.0,
        hours_per_day: 24.0,
        days_per_month: 30.0,
    },
    CommonAppliance {
        name: "Air Conditioner",
        category: "Heating & Cooling",
        wattage: 3500.0,
        hours_per_day: 8.0,
        days_per_month: 30.0,
    },
    CommonAppliance {
        name: "LED Light Bulb",
        category: "Lighting",
        wattage: 10.0,
        hours_per_day: 6.0,
        days_per_month: 30.0,
    },
    CommonAppliance {
        name: "Television (LED)",
        category: "Electronics",
        wattage: 100.0,
        hours_per_day: 5.0,
        days_per_month: 30.0,
    },
    CommonAppliance {
        name: "Laptop",
        category: "Electronics",
        wattage: 65.0,
        hours_per_day: 8.0,
        days_per_month: 30.0,
    },
    CommonAppliance {
        name: "Washing Machine",
        category: "Laundry",
        wattage: 1000.0,
        hours_per_day: 1.0,
        days_per_month: 10.0,
    },
    CommonAppliance {
        name: "Water Heater",
        category: "Water Heating",
        wattage: 4000.0,
        hours_per_day: 3.0,
        days_per_month: 30.0,
    },
    CommonAppliance {
        name: "Microwave",
        category: "Kitchen",
        wattage: 1200.0,
        hours_per_day: 0.5,
        days_per_month: 25.0,
    },
];

pub fn common_appliance(name: &str) -> Option<&'static CommonAppliance> {
    COMMON_APPLIANCES
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(name.trim()))
}

/// Typical (wattage, hours per day) for an appliance name; 100 W for 4 h
/// when the name is unknown.
pub fn average_usage(name: &str) -> (f64, f64) {
    match name {
        "Refrigerator" => (150.0, 24.0),
        "Air Conditioner" => (3500.0, 8.0),
        "Water Heater" => (4000.0, 3.0),
        "Washing Machine" => (1000.0, 1.0),
        "Dryer" => (3000.0, 1.0),
        "Dishwasher" => (1800.0, 1.0),
        "Television" => (100.0, 5.0),
        "Computer" => (300.0, 8.0),
        "Laptop" => (65.0, 8.0),
        "LED Light Bulb" => (10.0, 6.0),
        "Microwave" => (1200.0, 0.5),
        "Oven" => (2400.0, 1.0),
        _ => (100.0, 4.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_region_uses_national_average() {
        assert_eq!(regional_rate("Atlantis"), NATIONAL_AVERAGE_RATE);
        assert_eq!(regional_rate("Texas"), 0.12);
        assert!(!is_known_region("texas"));
    }

    #[test]
    fn time_of_use_blend_matches_usage_mix() {
        assert!((TIME_OF_USE_BLEND - 1.09).abs() < 1e-12);
        let flat = effective_rate("California", false);
        let tou = effective_rate("California", true);
        assert!((tou / flat - TIME_OF_USE_BLEND).abs() < 1e-12);
    }

    #[test]
    fn name_factor_is_exact_match() {
        assert_eq!(appliance_efficiency("Laptop"), 0.6);
        assert_eq!(appliance_efficiency("laptop"), 1.0);
        assert_eq!(appliance_efficiency("Television (LED)"), 1.0);
    }

    #[test]
    fn unknown_category_gets_other_color() {
        assert_eq!(category_color("Garage"), DEFAULT_CATEGORY_COLOR);
        assert_eq!(category_color("Kitchen"), "#F97316");
    }

    #[test]
    fn presets_and_typical_usage() {
        let fridge = common_appliance("refrigerator").unwrap();
        assert_eq!(fridge.category, "Kitchen");
        assert_eq!(average_usage("Oven"), (2400.0, 1.0));
        assert_eq!(average_usage("Hot Tub"), (100.0, 4.0));
    }
}
