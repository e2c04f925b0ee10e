// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Appliance;
use crate::rates::{COMMON_APPLIANCES, average_usage, common_appliance};
use crate::storage;
use crate::utils::{
    arg_str, fmt_kwh, maybe_print_json, new_id, opt_str, parse_non_negative, pretty_table,
    require_user, validate_usage,
};
use anyhow::{Result, anyhow, bail};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let a = add(conn, sub)?;
            println!(
                "Added {} ({} W, {} h/day, {} days) id={}",
                a.name, a.wattage, a.hours_per_day, a.days_per_month, a.id
            );
        }
        Some(("list", sub)) => list(conn, sub)?,
        Some(("update", sub)) => {
            let a = update(conn, sub)?;
            println!("Updated {} ({})", a.name, a.id);
        }
        Some(("rm", sub)) => {
            let id = arg_str(sub, "id")?;
            if remove(conn, id)? {
                println!("Removed appliance {}", id);
            } else {
                bail!("Appliance '{}' not found", id);
            }
        }
        Some(("presets", sub)) => presets(sub)?,
        _ => {}
    }
    Ok(())
}

fn opt_number(sub: &clap::ArgMatches, id: &str, what: &str) -> Result<Option<f64>> {
    opt_str(sub, id)
        .map(|s| parse_non_negative(s, what))
        .transpose()
}

/// Adds an appliance to the signed-in user's list. With `--preset`, the
/// common appliance supplies every field not given explicitly; otherwise
/// wattage and hours default to the typical usage for the name.
pub fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<Appliance> {
    let user = require_user(conn)?;
    let preset = match opt_str(sub, "preset") {
        Some(p) => Some(common_appliance(p).ok_or_else(|| {
            anyhow!("Unknown preset '{}'. See `powerpredict appliance presets`", p)
        })?),
        None => None,
    };
    let name = opt_str(sub, "name")
        .filter(|n| !n.is_empty())
        .or(preset.map(|p| p.name))
        .ok_or_else(|| anyhow!("--name is required unless --preset is given"))?
        .to_string();
    let category = opt_str(sub, "category")
        .or(preset.map(|p| p.category))
        .unwrap_or("Other")
        .to_string();
    let (typical_w, typical_h) = average_usage(&name);
    let wattage = opt_number(sub, "wattage", "wattage")?
        .or(preset.map(|p| p.wattage))
        .unwrap_or(typical_w);
    let hours_per_day = opt_number(sub, "hours", "hours per day")?
        .or(preset.map(|p| p.hours_per_day))
        .unwrap_or(typical_h);
    let days_per_month = opt_number(sub, "days", "days per month")?
        .or(preset.map(|p| p.days_per_month))
        .unwrap_or(30.0);
    validate_usage(wattage, hours_per_day, days_per_month)?;

    let mut appliances = storage::get_user_data(conn, &user.email)?
        .unwrap_or_default()
        .appliances;
    let appliance = Appliance {
        id: new_id(appliances.iter().map(|a| a.id.as_str())),
        name,
        category,
        wattage,
        hours_per_day,
        days_per_month,
    };
    appliances.push(appliance.clone());
    storage::save_user_appliances(conn, &user.email, &appliances)?;
    tracing::debug!(id = %appliance.id, "appliance added");
    Ok(appliance)
}

/// Overwrites only the fields that were passed.
pub fn update(conn: &Connection, sub: &clap::ArgMatches) -> Result<Appliance> {
    let user = require_user(conn)?;
    let id = arg_str(sub, "id")?;
    let mut appliances = storage::get_user_data(conn, &user.email)?
        .unwrap_or_default()
        .appliances;
    let target = appliances
        .iter_mut()
        .find(|a| a.id == id)
        .ok_or_else(|| anyhow!("Appliance '{}' not found", id))?;

    if let Some(name) = opt_str(sub, "name").filter(|n| !n.is_empty()) {
        target.name = name.to_string();
    }
    if let Some(category) = opt_str(sub, "category") {
        target.category = category.to_string();
    }
    if let Some(w) = opt_number(sub, "wattage", "wattage")? {
        target.wattage = w;
    }
    if let Some(h) = opt_number(sub, "hours", "hours per day")? {
        target.hours_per_day = h;
    }
    if let Some(d) = opt_number(sub, "days", "days per month")? {
        target.days_per_month = d;
    }
    validate_usage(target.wattage, target.hours_per_day, target.days_per_month)?;
    let updated = target.clone();
    storage::save_user_appliances(conn, &user.email, &appliances)?;
    Ok(updated)
}

pub fn remove(conn: &Connection, id: &str) -> Result<bool> {
    let user = require_user(conn)?;
    let mut appliances = storage::get_user_data(conn, &user.email)?
        .unwrap_or_default()
        .appliances;
    let before = appliances.len();
    appliances.retain(|a| a.id != id);
    if appliances.len() == before {
        return Ok(false);
    }
    storage::save_user_appliances(conn, &user.email, &appliances)?;
    Ok(true)
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = require_user(conn)?;
    let appliances = storage::get_user_data(conn, &user.email)?
        .unwrap_or_default()
        .appliances;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &appliances)? {
        return Ok(());
    }
    if appliances.is_empty() {
        println!("No appliances yet. Add one with `powerpredict appliance add`");
        return Ok(());
    }
    let rows = appliances
        .iter()
        .map(|a| {
            vec![
                a.id.clone(),
                a.name.clone(),
                a.category.clone(),
                format!("{}", a.wattage),
                format!("{}", a.hours_per_day),
                format!("{}", a.days_per_month),
                fmt_kwh(a.wattage * a.hours_per_day * a.days_per_month / 1000.0),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["ID", "Name", "Category", "Watts", "Hours/day", "Days/month", "Raw usage"],
            rows
        )
    );
    Ok(())
}

fn presets(sub: &clap::ArgMatches) -> Result<()> {
    if maybe_print_json(
        sub.get_flag("json"),
        sub.get_flag("jsonl"),
        &COMMON_APPLIANCES
            .iter()
            .map(|c| {
                serde_json::json!({
                    "name": c.name,
                    "category": c.category,
                    "wattage": c.wattage,
                    "hoursPerDay": c.hours_per_day,
                    "daysPerMonth": c.days_per_month,
                })
            })
            .collect::<Vec<_>>(),
    )? {
        return Ok(());
    }
    let rows = COMMON_APPLIANCES
        .iter()
        .map(|c| {
            vec![
                c.name.to_string(),
                c.category.to_string(),
                format!("{}", c.wattage),
                format!("{}", c.hours_per_day),
                format!("{}", c.days_per_month),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Preset", "Category", "Watts", "Hours/day", "Days/month"], rows)
    );
    Ok(())
}
