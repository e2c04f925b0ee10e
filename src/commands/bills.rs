// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::calc::{self, BillStatistics};
use crate::models::{BillCalculation, SavedBill, User};
use crate::storage;
use crate::utils::{
    arg_str, fmt_kwh, fmt_money, maybe_print_json, new_id, opt_str, pretty_table, require_user,
};
use anyhow::{Context, Result, anyhow, bail};
use chrono::{Datelike, Utc};
use rusqlite::Connection;
use serde_json::json;

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("calc", sub)) => {
            let calc = current_calculation(conn)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &calc)? {
                print_calculation(&calc);
            }
        }
        Some(("save", sub)) => {
            let bill = save(conn, sub)?;
            println!(
                "Saved '{}' ({} {}) {} id={}",
                bill.name,
                bill.month,
                bill.year,
                fmt_money(bill.calculation.monthly_bill),
                bill.id
            );
        }
        Some(("list", sub)) => list(conn, sub)?,
        Some(("show", sub)) => {
            let user = require_user(conn)?;
            let bill = storage::find_user_bill(conn, &user.email, arg_str(sub, "id")?)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &bill)? {
                println!(
                    "{} ({} {}), {} region, saved {}",
                    bill.name,
                    bill.month,
                    bill.year,
                    bill.settings.region,
                    bill.created_at.format("%Y-%m-%d %H:%M")
                );
                print_calculation(&bill.calculation);
            }
        }
        Some(("load", sub)) => {
            let bill = load(conn, arg_str(sub, "id")?)?;
            println!(
                "Loaded {} appliances and settings from '{}'",
                bill.appliances.len(),
                bill.name
            );
        }
        Some(("rename", sub)) => {
            let bill = rename(conn, arg_str(sub, "id")?, arg_str(sub, "name")?)?;
            println!("Renamed bill {} to '{}'", bill.id, bill.name);
        }
        Some(("rm", sub)) => {
            let user = require_user(conn)?;
            let id = arg_str(sub, "id")?;
            if !storage::delete_user_bill(conn, &user.email, id)? {
                bail!("Saved bill '{}' not found", id);
            }
            println!("Deleted bill {}", id);
        }
        Some(("average", sub)) => {
            let (count, avg) = average(conn, opt_str(sub, "ids"))?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &avg)? {
                println!("Average of {} saved bills", count);
                print_calculation(&avg);
            }
        }
        Some(("stats", sub)) => stats(conn, sub)?,
        Some(("export", sub)) => export(conn, sub)?,
        _ => {}
    }
    Ok(())
}

/// Estimate for the signed-in user's current appliances and settings.
pub fn current_calculation(conn: &Connection) -> Result<BillCalculation> {
    let user = require_user(conn)?;
    let data = storage::get_user_data(conn, &user.email)?.unwrap_or_default();
    Ok(calc::calculate(&data.appliances, &data.bill_settings))
}

/// Accepts any capitalisation of an English month name or its first three
/// letters.
pub fn parse_month(s: &str) -> Result<&'static str> {
    let s = s.trim();
    MONTHS
        .iter()
        .find(|m| m.eq_ignore_ascii_case(s) || (s.len() == 3 && m[..3].eq_ignore_ascii_case(s)))
        .copied()
        .ok_or_else(|| anyhow!("Invalid month '{}'", s))
}

/// Snapshots the current appliances, settings and estimate under a name.
pub fn save(conn: &Connection, sub: &clap::ArgMatches) -> Result<SavedBill> {
    let user = require_user(conn)?;
    let name = arg_str(sub, "name")?;
    if name.is_empty() {
        bail!("Bill name cannot be empty");
    }
    let now = Utc::now();
    let month = match opt_str(sub, "month") {
        Some(m) => parse_month(m)?,
        None => MONTHS[now.month0() as usize],
    };
    let year = match opt_str(sub, "year") {
        Some(y) => y
            .parse::<i32>()
            .with_context(|| format!("Invalid year '{}'", y))?,
        None => now.year(),
    };

    let data = storage::get_user_data(conn, &user.email)?.unwrap_or_default();
    if data.appliances.is_empty() {
        bail!("No appliances to save. Add appliances first");
    }
    let calculation = calc::calculate(&data.appliances, &data.bill_settings);
    let bill = SavedBill {
        id: new_id(data.saved_bills.iter().map(|b| b.id.as_str())),
        name: name.to_string(),
        month: month.to_string(),
        year,
        appliances: data.appliances,
        settings: data.bill_settings,
        calculation,
        created_at: now,
        updated_at: now,
    };
    storage::save_user_bill(conn, &user.email, bill.clone())?;
    Ok(bill)
}

/// Saved bills in the requested order: `date` (newest first), `cost`
/// (highest first) or `name`.
pub fn query_bills(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<SavedBill>> {
    let user = require_user(conn)?;
    let mut bills = storage::get_user_bills(conn, &user.email)?;
    match opt_str(sub, "sort").unwrap_or("date") {
        "cost" => bills.sort_by(|a, b| {
            b.calculation
                .monthly_bill
                .total_cmp(&a.calculation.monthly_bill)
        }),
        "name" => bills.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase())),
        _ => bills.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
    }
    Ok(bills)
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let bills = query_bills(conn, sub)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &bills)? {
        return Ok(());
    }
    if bills.is_empty() {
        println!("No saved bills");
        return Ok(());
    }
    let rows = bills
        .iter()
        .map(|b| {
            vec![
                b.id.clone(),
                b.name.clone(),
                format!("{} {}", b.month, b.year),
                fmt_money(b.calculation.monthly_bill),
                fmt_kwh(b.calculation.total_kwh),
                b.appliances.len().to_string(),
                b.created_at.format("%Y-%m-%d").to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["ID", "Name", "Period", "Monthly", "Usage", "Appliances", "Saved"],
            rows
        )
    );
    Ok(())
}

pub fn load(conn: &Connection, id: &str) -> Result<SavedBill> {
    let user = require_user(conn)?;
    let bill = storage::find_user_bill(conn, &user.email, id)?;
    storage::save_user_appliances(conn, &user.email, &bill.appliances)?;
    storage::save_user_bill_settings(conn, &user.email, &bill.settings)?;
    Ok(bill)
}

pub fn rename(conn: &Connection, id: &str, name: &str) -> Result<SavedBill> {
    if name.is_empty() {
        bail!("Bill name cannot be empty");
    }
    let user = require_user(conn)?;
    let mut bill = storage::find_user_bill(conn, &user.email, id)?;
    bill.name = name.to_string();
    storage::update_user_bill(conn, &user.email, id, bill)?;
    Ok(storage::find_user_bill(conn, &user.email, id)?)
}

/// Averages the bills named in `ids` (comma separated), or all saved bills.
pub fn average(conn: &Connection, ids: Option<&str>) -> Result<(usize, BillCalculation)> {
    let user = require_user(conn)?;
    let bills = storage::get_user_bills(conn, &user.email)?;
    let selected: Vec<SavedBill> = match ids {
        Some(ids) => {
            let wanted: Vec<&str> = ids
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect();
            if let Some(missing) = wanted.iter().find(|id| !bills.iter().any(|b| b.id == **id)) {
                bail!("Saved bill '{}' not found", missing);
            }
            bills
                .into_iter()
                .filter(|b| wanted.contains(&b.id.as_str()))
                .collect()
        }
        None => bills,
    };
    if selected.is_empty() {
        bail!("No saved bills to average");
    }
    Ok((selected.len(), calc::aggregate_saved(&selected)))
}

fn stats(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user: User = require_user(conn)?;
    let bills = storage::get_user_bills(conn, &user.email)?;
    let Some(stats) = calc::statistics(&bills) else {
        println!("No saved bills");
        return Ok(());
    };
    let monthly = calc::monthly_comparison(&bills);
    if maybe_print_json(
        sub.get_flag("json"),
        sub.get_flag("jsonl"),
        &json!({ "statistics": stats, "monthly": monthly }),
    )? {
        return Ok(());
    }
    print_statistics(&stats);

    let rows = monthly
        .iter()
        .map(|m| {
            vec![
                m.month_year.clone(),
                m.total_bills.to_string(),
                fmt_money(m.avg_cost),
                fmt_kwh(m.avg_kwh),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Period", "Bills", "Avg cost", "Avg usage"], rows)
    );

    let rows = calc::trend_points(&bills)
        .into_iter()
        .map(|(at, b)| {
            vec![
                at.format("%Y-%m-%d").to_string(),
                b.name.clone(),
                fmt_money(b.calculation.monthly_bill),
            ]
        })
        .collect();
    println!("{}", pretty_table(&["Saved", "Bill", "Monthly"], rows));
    Ok(())
}

fn print_statistics(s: &BillStatistics) {
    let trend = if s.trend_percentage > 0.0 {
        format!("up {:.1}%", s.trend_percentage)
    } else if s.trend_percentage < 0.0 {
        format!("down {:.1}%", -s.trend_percentage)
    } else {
        "flat".to_string()
    };
    let rows = vec![
        vec!["Saved bills".to_string(), s.total_bills.to_string()],
        vec!["Average monthly".to_string(), fmt_money(s.average_monthly)],
        vec!["Average usage".to_string(), fmt_kwh(s.average_kwh)],
        vec!["Projected yearly".to_string(), fmt_money(s.total_yearly)],
        vec![
            "Highest".to_string(),
            format!(
                "{} ({})",
                fmt_money(s.highest_bill.calculation.monthly_bill),
                s.highest_bill.name
            ),
        ],
        vec![
            "Lowest".to_string(),
            format!(
                "{} ({})",
                fmt_money(s.lowest_bill.calculation.monthly_bill),
                s.lowest_bill.name
            ),
        ],
        vec!["Trend".to_string(), trend],
    ];
    println!("{}", pretty_table(&["Statistic", "Value"], rows));
}

pub fn print_calculation(c: &BillCalculation) {
    let summary = vec![
        vec!["Monthly bill".to_string(), fmt_money(c.monthly_bill)],
        vec!["Yearly bill".to_string(), fmt_money(c.yearly_bill)],
        vec!["Monthly usage".to_string(), fmt_kwh(c.total_kwh)],
        vec!["Daily average".to_string(), fmt_kwh(c.daily_average)],
    ];
    println!("{}", pretty_table(&["Estimate", "Value"], summary));
    if c.appliance_breakdown.is_empty() {
        println!("No appliances");
        return;
    }
    let rows = c
        .appliance_breakdown
        .iter()
        .map(|u| {
            vec![
                u.appliance.name.clone(),
                u.appliance.category.clone(),
                fmt_kwh(u.monthly_kwh),
                fmt_money(u.monthly_cost),
                format!("{:.1}%", u.percentage),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Appliance", "Category", "Usage", "Cost", "Share"], rows)
    );
    let rows = c
        .category_breakdown
        .iter()
        .map(|u| {
            vec![
                u.category.clone(),
                fmt_kwh(u.monthly_kwh),
                fmt_money(u.monthly_cost),
                format!("{:.1}%", u.percentage),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Category", "Usage", "Cost", "Share"], rows)
    );
}

fn export(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = arg_str(sub, "format")?.to_lowercase();
    let out = arg_str(sub, "out")?;
    let calc = match opt_str(sub, "id") {
        Some(id) => {
            let user = require_user(conn)?;
            storage::find_user_bill(conn, &user.email, id)?.calculation
        }
        None => current_calculation(conn)?,
    };
    match fmt.as_str() {
        "csv" => write_breakdown_csv(&calc, out)?,
        "json" => std::fs::write(out, serde_json::to_string_pretty(&calc)?)
            .with_context(|| format!("Failed to write {}", out))?,
        other => bail!("Unknown format: {} (use csv|json)", other),
    }
    println!("Exported bill breakdown to {}", out);
    Ok(())
}

/// One row per appliance, then one per category, tagged by `kind`.
pub fn write_breakdown_csv(calc: &BillCalculation, out: &str) -> Result<()> {
    let mut wtr =
        csv::Writer::from_path(out).with_context(|| format!("Failed to create {}", out))?;
    wtr.write_record([
        "kind",
        "name",
        "category",
        "monthly_kwh",
        "monthly_cost",
        "percentage",
    ])?;
    for u in &calc.appliance_breakdown {
        wtr.write_record([
            "appliance".to_string(),
            u.appliance.name.clone(),
            u.appliance.category.clone(),
            format!("{:.2}", u.monthly_kwh),
            format!("{:.2}", u.monthly_cost),
            format!("{:.2}", u.percentage),
        ])?;
    }
    for c in &calc.category_breakdown {
        wtr.write_record([
            "category".to_string(),
            c.category.clone(),
            c.category.clone(),
            format!("{:.2}", c.monthly_kwh),
            format!("{:.2}", c.monthly_cost),
            format!("{:.2}", c.percentage),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}
