// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::{kv_get, kv_keys_with_prefix};
use crate::models::{CATEGORIES, User, UserData};
use crate::rates::is_known_region;
use crate::storage::{current_user_key, user_key};
use crate::utils::{pretty_table, validate_usage};
use anyhow::Result;
use rusqlite::Connection;

/// `(issue, detail)` pairs for everything suspicious in the store.
pub fn find_issues(conn: &Connection, gemini_configured: bool) -> Result<Vec<(String, String)>> {
    let mut issues = Vec::new();
    let prefix = user_key("");

    // 1) Stored bundles that no longer parse, or hold values the CLI would reject
    for key in kv_keys_with_prefix(conn, &prefix)? {
        let email = key[prefix.len()..].to_string();
        let Some(raw) = kv_get(conn, &key)? else {
            continue;
        };
        let data: UserData = match serde_json::from_str(&raw) {
            Ok(d) => d,
            Err(err) => {
                issues.push(("corrupt_user_data".into(), format!("{}: {}", email, err)));
                continue;
            }
        };
        if !is_known_region(&data.bill_settings.region) {
            issues.push((
                "unknown_region".into(),
                format!("{}: {}", email, data.bill_settings.region),
            ));
        }
        for a in &data.appliances {
            if !CATEGORIES.contains(&a.category.as_str()) {
                issues.push((
                    "unknown_category".into(),
                    format!("{}: {} ({})", email, a.name, a.category),
                ));
            }
            if let Err(err) = validate_usage(a.wattage, a.hours_per_day, a.days_per_month) {
                issues.push((
                    "appliance_out_of_range".into(),
                    format!("{}: {}: {}", email, a.name, err),
                ));
            }
        }
    }

    // 2) Session state
    if let Some(raw) = kv_get(conn, &current_user_key())? {
        match serde_json::from_str::<User>(&raw) {
            Ok(user) if kv_get(conn, &user_key(&user.email))?.is_none() => {
                issues.push(("session_without_data".into(), user.email));
            }
            Ok(_) => {}
            Err(err) => issues.push(("corrupt_session".into(), err.to_string())),
        }
    }

    // 3) Assistant
    if !gemini_configured {
        issues.push((
            "gemini_not_configured".into(),
            "serve will answer with fallback replies".into(),
        ));
    }
    Ok(issues)
}

pub fn handle(conn: &Connection, gemini_configured: bool) -> Result<()> {
    let issues = find_issues(conn, gemini_configured)?;
    if issues.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        let rows = issues.into_iter().map(|(i, d)| vec![i, d]).collect();
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
