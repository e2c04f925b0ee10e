// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Bill calculation engine.
//!
//! [`calculate`] turns an appliance list and billing settings into a
//! [`BillCalculation`]. It performs no I/O and is total over non-negative
//! numeric inputs: unknown regions, categories and appliance names resolve to
//! the defaults in [`crate::rates`].

use crate::models::{
    Appliance, ApplianceUsage, BillCalculation, BillSettings, CategoryUsage, HEATING_AND_COOLING,
    SavedBill,
};
use crate::rates;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// Month length assumed by `daily_average`.
pub const DAYS_PER_BILLING_MONTH: f64 = 30.0;
pub const MONTHS_PER_YEAR: f64 = 12.0;

/// Monthly kWh for one appliance after the name, home and seasonal factors.
pub fn appliance_monthly_kwh(appliance: &Appliance, settings: &BillSettings) -> f64 {
    let mut kwh = appliance.wattage * appliance.hours_per_day * appliance.days_per_month / 1000.0;
    kwh *= rates::appliance_efficiency(&appliance.name);
    kwh *= rates::home_efficiency(settings.efficiency_rating);
    if appliance.category == HEATING_AND_COOLING {
        kwh *= rates::seasonal_multiplier(settings.season);
    }
    kwh
}

pub fn calculate(appliances: &[Appliance], settings: &BillSettings) -> BillCalculation {
    let rate = rates::effective_rate(&settings.region, settings.use_time_of_use);

    let mut appliance_breakdown: Vec<ApplianceUsage> = appliances
        .iter()
        .map(|appliance| {
            let monthly_kwh = appliance_monthly_kwh(appliance, settings);
            ApplianceUsage {
                appliance: appliance.clone(),
                monthly_kwh,
                monthly_cost: monthly_kwh * rate,
                percentage: 0.0,
            }
        })
        .collect();

    let total_kwh: f64 = appliance_breakdown.iter().map(|u| u.monthly_kwh).sum();
    let monthly_bill: f64 = appliance_breakdown.iter().map(|u| u.monthly_cost).sum();

    for usage in &mut appliance_breakdown {
        usage.percentage = share(usage.monthly_kwh, total_kwh);
    }

    let category_breakdown = rollup_categories(&appliance_breakdown, total_kwh);

    BillCalculation {
        total_kwh,
        monthly_bill,
        yearly_bill: monthly_bill * MONTHS_PER_YEAR,
        daily_average: total_kwh / DAYS_PER_BILLING_MONTH,
        appliance_breakdown,
        category_breakdown,
    }
}

fn share(part: f64, total: f64) -> f64 {
    if total > 0.0 {
        part / total * 100.0
    } else {
        0.0
    }
}

// Categories keep the order in which they first appear.
fn rollup_categories(usages: &[ApplianceUsage], total_kwh: f64) -> Vec<CategoryUsage> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut out: Vec<CategoryUsage> = Vec::new();
    for usage in usages {
        let category = usage.appliance.category.as_str();
        let idx = *index.entry(category).or_insert_with(|| {
            out.push(CategoryUsage {
                category: category.to_string(),
                monthly_kwh: 0.0,
                monthly_cost: 0.0,
                percentage: 0.0,
                color: rates::category_color(category).to_string(),
            });
            out.len() - 1
        });
        out[idx].monthly_kwh += usage.monthly_kwh;
        out[idx].monthly_cost += usage.monthly_cost;
    }
    for cat in &mut out {
        cat.percentage = share(cat.monthly_kwh, total_kwh);
    }
    out
}

/// Average several bill snapshots into one view.
///
/// Headline figures are plain means over all snapshots. Appliance rows are
/// merged by (name, wattage) and category rows by category name; their kWh
/// and cost are averaged over the snapshots that contain them. Both row kinds
/// express `percentage` as a share of the averaged monthly bill.
///
/// A single snapshot is returned unchanged.
pub fn aggregate(calculations: &[&BillCalculation]) -> BillCalculation {
    match calculations {
        [] => return BillCalculation::default(),
        [only] => return (*only).clone(),
        _ => {}
    }
    let n = calculations.len() as f64;
    let monthly_bill = calculations.iter().map(|c| c.monthly_bill).sum::<f64>() / n;
    let yearly_bill = calculations.iter().map(|c| c.yearly_bill).sum::<f64>() / n;
    let total_kwh = calculations.iter().map(|c| c.total_kwh).sum::<f64>() / n;
    let daily_average = calculations.iter().map(|c| c.daily_average).sum::<f64>() / n;

    struct Acc<T> {
        row: T,
        kwh: f64,
        cost: f64,
        seen: usize,
        last_snapshot: usize,
    }

    let mut appliance_index: HashMap<(String, u64), usize> = HashMap::new();
    let mut appliances: Vec<Acc<ApplianceUsage>> = Vec::new();
    let mut category_index: HashMap<String, usize> = HashMap::new();
    let mut categories: Vec<Acc<CategoryUsage>> = Vec::new();

    for (snapshot, calc) in calculations.iter().enumerate() {
        for usage in &calc.appliance_breakdown {
            let key = (usage.appliance.name.clone(), usage.appliance.wattage.to_bits());
            let idx = *appliance_index.entry(key).or_insert_with(|| {
                appliances.push(Acc {
                    row: usage.clone(),
                    kwh: 0.0,
                    cost: 0.0,
                    seen: 0,
                    last_snapshot: usize::MAX,
                });
                appliances.len() - 1
            });
            let acc = &mut appliances[idx];
            acc.kwh += usage.monthly_kwh;
            acc.cost += usage.monthly_cost;
            if acc.last_snapshot != snapshot {
                acc.seen += 1;
                acc.last_snapshot = snapshot;
            }
        }
        for cat in &calc.category_breakdown {
            let idx = *category_index.entry(cat.category.clone()).or_insert_with(|| {
                categories.push(Acc {
                    row: cat.clone(),
                    kwh: 0.0,
                    cost: 0.0,
                    seen: 0,
                    last_snapshot: usize::MAX,
                });
                categories.len() - 1
            });
            let acc = &mut categories[idx];
            acc.kwh += cat.monthly_kwh;
            acc.cost += cat.monthly_cost;
            if acc.last_snapshot != snapshot {
                acc.seen += 1;
                acc.last_snapshot = snapshot;
            }
        }
    }

    let appliance_breakdown = appliances
        .into_iter()
        .map(|acc| {
            let seen = acc.seen as f64;
            let monthly_cost = acc.cost / seen;
            ApplianceUsage {
                monthly_kwh: acc.kwh / seen,
                monthly_cost,
                percentage: share(monthly_cost, monthly_bill),
                ..acc.row
            }
        })
        .collect();

    let category_breakdown = categories
        .into_iter()
        .map(|acc| {
            let seen = acc.seen as f64;
            let monthly_cost = acc.cost / seen;
            CategoryUsage {
                monthly_kwh: acc.kwh / seen,
                monthly_cost,
                percentage: share(monthly_cost, monthly_bill),
                ..acc.row
            }
        })
        .collect();

    BillCalculation {
        total_kwh,
        monthly_bill,
        yearly_bill,
        daily_average,
        appliance_breakdown,
        category_breakdown,
    }
}

pub fn aggregate_saved(bills: &[SavedBill]) -> BillCalculation {
    let calcs: Vec<&BillCalculation> = bills.iter().map(|b| &b.calculation).collect();
    aggregate(&calcs)
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillStatistics {
    pub total_bills: usize,
    pub average_monthly: f64,
    pub average_kwh: f64,
    pub total_yearly: f64,
    pub highest_bill: SavedBill,
    pub lowest_bill: SavedBill,
    /// Change from the oldest to the newest bill, in percent.
    pub trend_percentage: f64,
}

pub fn statistics(bills: &[SavedBill]) -> Option<BillStatistics> {
    let first = bills.first()?;
    let n = bills.len() as f64;
    let average_monthly = bills.iter().map(|b| b.calculation.monthly_bill).sum::<f64>() / n;
    let average_kwh = bills.iter().map(|b| b.calculation.total_kwh).sum::<f64>() / n;

    // Ties keep the earliest entry.
    let mut highest = first;
    let mut lowest = first;
    for bill in &bills[1..] {
        if bill.calculation.monthly_bill > highest.calculation.monthly_bill {
            highest = bill;
        }
        if bill.calculation.monthly_bill < lowest.calculation.monthly_bill {
            lowest = bill;
        }
    }

    let mut by_date: Vec<&SavedBill> = bills.iter().collect();
    by_date.sort_by_key(|b| b.created_at);
    let oldest = by_date[0].calculation.monthly_bill;
    let newest = by_date[by_date.len() - 1].calculation.monthly_bill;
    let trend_percentage = if by_date.len() > 1 && oldest != 0.0 {
        (newest - oldest) / oldest * 100.0
    } else {
        0.0
    };

    Some(BillStatistics {
        total_bills: bills.len(),
        average_monthly,
        average_kwh,
        total_yearly: average_monthly * MONTHS_PER_YEAR,
        highest_bill: highest.clone(),
        lowest_bill: lowest.clone(),
        trend_percentage,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyComparison {
    pub month_year: String,
    pub total_bills: usize,
    pub total_cost: f64,
    pub total_kwh: f64,
    pub avg_cost: f64,
    pub avg_kwh: f64,
}

/// Groups bills by their "<month> <year>" label, in first-seen order.
pub fn monthly_comparison(bills: &[SavedBill]) -> Vec<MonthlyComparison> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<MonthlyComparison> = Vec::new();
    for bill in bills {
        let label = format!("{} {}", bill.month, bill.year);
        let idx = *index.entry(label.clone()).or_insert_with(|| {
            out.push(MonthlyComparison {
                month_year: label,
                total_bills: 0,
                total_cost: 0.0,
                total_kwh: 0.0,
                avg_cost: 0.0,
                avg_kwh: 0.0,
            });
            out.len() - 1
        });
        let row = &mut out[idx];
        row.total_bills += 1;
        row.total_cost += bill.calculation.monthly_bill;
        row.total_kwh += bill.calculation.total_kwh;
        row.avg_cost = row.total_cost / row.total_bills as f64;
        row.avg_kwh = row.total_kwh / row.total_bills as f64;
    }
    out
}

/// Bills ordered oldest first, for trend output.
pub fn trend_points(bills: &[SavedBill]) -> Vec<(DateTime<Utc>, &SavedBill)> {
    let mut points: Vec<(DateTime<Utc>, &SavedBill)> =
        bills.iter().map(|b| (b.created_at, b)).collect();
    points.sort_by_key(|(at, _)| *at);
    points
}
