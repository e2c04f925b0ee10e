// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::BillSettings;
use crate::rates::{REGIONS, effective_rate, is_known_region};
use crate::storage;
use crate::utils::{maybe_print_json, opt_str, pretty_table, require_user};
use anyhow::{Result, bail};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => {
            let user = require_user(conn)?;
            let settings = current(conn, &user.email)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &settings)? {
                print_settings(&settings);
            }
        }
        Some(("set", sub)) => {
            let settings = set(conn, sub)?;
            print_settings(&settings);
        }
        Some(("regions", sub)) => regions(sub)?,
        _ => {}
    }
    Ok(())
}

pub fn current(conn: &Connection, email: &str) -> Result<BillSettings> {
    Ok(storage::get_user_data(conn, email)?
        .unwrap_or_default()
        .bill_settings)
}

/// Applies the given flags on top of the stored settings and saves the
/// result.
pub fn set(conn: &Connection, sub: &clap::ArgMatches) -> Result<BillSettings> {
    let user = require_user(conn)?;
    let mut settings = current(conn, &user.email)?;

    if let Some(region) = opt_str(sub, "region") {
        let Some((known, _)) = REGIONS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(region))
        else {
            bail!(
                "Unknown region '{}'. See `powerpredict settings regions`",
                region
            );
        };
        settings.region = known.to_string();
    }
    if let Some(tou) = sub.get_one::<bool>("time-of-use") {
        settings.use_time_of_use = *tou;
    }
    if let Some(season) = opt_str(sub, "season") {
        settings.season = season.parse()?;
    }
    if let Some(size) = opt_str(sub, "home-size") {
        settings.home_size = size.parse()?;
    }
    if let Some(rating) = opt_str(sub, "efficiency") {
        settings.efficiency_rating = rating.parse()?;
    }
    storage::save_user_bill_settings(conn, &user.email, &settings)?;
    Ok(settings)
}

fn print_settings(s: &BillSettings) {
    let mut region = s.region.clone();
    if !is_known_region(&s.region) {
        region.push_str(" (unknown, using National Average rate)");
    }
    let rows = vec![
        vec!["Region".to_string(), region],
        vec![
            "Rate".to_string(),
            format!("${:.4}/kWh", effective_rate(&s.region, s.use_time_of_use)),
        ],
        vec!["Time-of-use".to_string(), s.use_time_of_use.to_string()],
        vec!["Season".to_string(), s.season.to_string()],
        vec!["Home size".to_string(), s.home_size.to_string()],
        vec!["Efficiency".to_string(), s.efficiency_rating.to_string()],
    ];
    println!("{}", pretty_table(&["Setting", "Value"], rows));
}

fn regions(sub: &clap::ArgMatches) -> Result<()> {
    let items: Vec<_> = REGIONS
        .iter()
        .map(|(name, rate)| serde_json::json!({ "region": name, "rate": rate }))
        .collect();
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &items)? {
        return Ok(());
    }
    let rows = REGIONS
        .iter()
        .map(|(name, rate)| vec![name.to_string(), format!("${:.2}/kWh", rate)])
        .collect();
    println!("{}", pretty_table(&["Region", "Rate"], rows));
    Ok(())
}
