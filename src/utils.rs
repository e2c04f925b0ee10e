// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::User;
use crate::storage;
use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use clap::ArgMatches;
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::Connection;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use std::time::Duration;

const UA: &str = concat!(
    "powerpredict/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/alphavelocity/powerpredict)"
);

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

pub fn http_client(timeout: Duration) -> Result<reqwest::blocking::Client> {
    let c = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .user_agent(UA)
        .build()?;
    Ok(c)
}

pub fn user_agent() -> &'static str {
    UA
}

pub fn parse_non_negative(s: &str, what: &str) -> Result<f64> {
    let v: f64 = s
        .trim()
        .parse()
        .with_context(|| format!("Invalid {} '{}'", what, s))?;
    if !v.is_finite() || v < 0.0 {
        return Err(anyhow!("{} must be a non-negative number, got '{}'", what, s));
    }
    Ok(v)
}

/// Range checks the browser form used to enforce.
pub fn validate_usage(wattage: f64, hours_per_day: f64, days_per_month: f64) -> Result<()> {
    if wattage < 1.0 {
        return Err(anyhow!("Wattage must be at least 1 W, got {}", wattage));
    }
    if !(0.0..=24.0).contains(&hours_per_day) {
        return Err(anyhow!("Hours per day must be between 0 and 24, got {}", hours_per_day));
    }
    if !(1.0..=31.0).contains(&days_per_month) {
        return Err(anyhow!("Days per month must be between 1 and 31, got {}", days_per_month));
    }
    Ok(())
}

pub fn is_valid_email(s: &str) -> bool {
    EMAIL_RE.is_match(s)
}

/// Millisecond timestamp ids, bumped past any id already taken.
pub fn new_id<'a>(taken: impl IntoIterator<Item = &'a str>) -> String {
    let taken: Vec<&str> = taken.into_iter().collect();
    let mut n = Utc::now().timestamp_millis();
    loop {
        let id = n.to_string();
        if !taken.contains(&id.as_str()) {
            return id;
        }
        n += 1;
    }
}

/// `$1,234.57` with half-away-from-zero rounding.
pub fn fmt_money(amount: f64) -> String {
    let rounded = Decimal::from_f64(amount)
        .map(|d| d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
        .unwrap_or(Decimal::ZERO);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let abs = rounded.abs();
    let whole = abs.trunc().to_u128().unwrap_or(0);
    let cents = ((abs - abs.trunc()) * Decimal::ONE_HUNDRED)
        .round()
        .to_u32()
        .unwrap_or(0);
    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{}${}.{:02}", if negative { "-" } else { "" }, grouped, cents)
}

pub fn fmt_kwh(kwh: f64) -> String {
    format!("{:.1} kWh", kwh)
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

/// Trimmed value of an argument clap already requires.
pub fn arg_str<'a>(m: &'a ArgMatches, id: &str) -> Result<&'a str> {
    opt_str(m, id).ok_or_else(|| anyhow!("Missing required argument --{}", id))
}

pub fn opt_str<'a>(m: &'a ArgMatches, id: &str) -> Option<&'a str> {
    m.get_one::<String>(id).map(|s| s.trim())
}

/// The signed-in user, or an error telling how to sign in.
pub fn require_user(conn: &Connection) -> Result<User> {
    storage::get_current_user(conn)?
        .ok_or_else(|| anyhow!("Not signed in. Run `powerpredict signin --email <EMAIL>` first"))
}
