// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::BillCalculation;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergyTip {
    pub title: &'static str,
    pub description: &'static str,
    pub potential_savings: &'static str,
    pub difficulty: Difficulty,
    pub category: &'static str,
}

pub static ENERGY_TIPS: [EnergyTip; 8] = [
    EnergyTip {
        title: "Switch to LED Light Bulbs",
        description: "Replace incandescent bulbs with LED bulbs to reduce lighting costs by up to 80%. LEDs last 25 times longer and use significantly less energy.",
        potential_savings: "$75-200/year",
        difficulty: Difficulty::Easy,
        category: "Lighting",
    },
    EnergyTip {
        title: "Unplug Electronics When Not in Use",
        description: "Electronics continue to draw power even when turned off. Unplug chargers, TVs, and other devices to eliminate phantom loads.",
        potential_savings: "$50-100/year",
        difficulty: Difficulty::Easy,
        category: "Electronics",
    },
    EnergyTip {
        title: "Use a Programmable Thermostat",
        description: "Set your thermostat to automatically adjust temperature when you're away. This can reduce heating and cooling costs by 10-15%.",
        potential_savings: "$180-300/year",
        difficulty: Difficulty::Medium,
        category: "Heating & Cooling",
    },
    EnergyTip {
        title: "Wash Clothes in Cold Water",
        description: "About 90% of washing machine energy goes to heating water. Use cold water settings to significantly reduce energy consumption.",
        potential_savings: "$60-120/year",
        difficulty: Difficulty::Easy,
        category: "Laundry",
    },
    EnergyTip {
        title: "Seal Air Leaks",
        description: "Use weatherstripping and caulk to seal gaps around windows and doors. This prevents conditioned air from escaping.",
        potential_savings: "$200-400/year",
        difficulty: Difficulty::Medium,
        category: "Heating & Cooling",
    },
    EnergyTip {
        title: "Use Energy-Efficient Appliances",
        description: "When replacing appliances, choose ENERGY STAR certified models. They use 10-50% less energy than standard models.",
        potential_savings: "$300-600/year",
        difficulty: Difficulty::Hard,
        category: "Kitchen",
    },
    EnergyTip {
        title: "Lower Water Heater Temperature",
        description: "Set your water heater to 120°F (49°C) instead of the default 140°F (60°C). You won't notice the difference but will save energy.",
        potential_savings: "$50-100/year",
        difficulty: Difficulty::Easy,
        category: "Water Heating",
    },
    EnergyTip {
        title: "Use Power Strips",
        description: "Connect multiple devices to power strips and turn them off when not in use. This makes it easy to eliminate standby power consumption.",
        potential_savings: "$25-75/year",
        difficulty: Difficulty::Easy,
        category: "Electronics",
    },
];

/// Tips for categories present in `bill` (plus Electronics, which applies to
/// every home) first, the rest after; catalogue order within each group.
pub fn relevant_tips(bill: Option<&BillCalculation>) -> Vec<&'static EnergyTip> {
    let Some(bill) = bill else {
        return ENERGY_TIPS.iter().collect();
    };
    let relevant = |tip: &EnergyTip| {
        tip.category == "Electronics"
            || bill
                .category_breakdown
                .iter()
                .any(|c| c.category == tip.category)
    };
    let (mut first, rest): (Vec<_>, Vec<_>) = ENERGY_TIPS.iter().partition(|t| relevant(*t));
    first.extend(rest);
    first
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calc::calculate;
    use crate::models::{Appliance, BillSettings};

    #[test]
    fn no_bill_keeps_catalogue_order() {
        let tips = relevant_tips(None);
        assert_eq!(tips.len(), ENERGY_TIPS.len());
        assert_eq!(tips[0].title, "Switch to LED Light Bulbs");
    }

    #[test]
    fn user_categories_come_first() {
        let washer = Appliance {
            id: "1".into(),
            name: "Washing Machine".into(),
            category: "Laundry".into(),
            wattage: 1000.0,
            hours_per_day: 1.0,
            days_per_month: 10.0,
        };
        let bill = calculate(&[washer], &BillSettings::default());
        let titles: Vec<&str> = relevant_tips(Some(&bill)).iter().map(|t| t.title).collect();
        assert_eq!(
            &titles[..3],
            [
                "Unplug Electronics When Not in Use",
                "Wash Clothes in Cold Water",
                "Use Power Strips"
            ]
        );
        assert_eq!(titles.len(), 8);
    }
}
