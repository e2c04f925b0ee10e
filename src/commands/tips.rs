// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::tips::relevant_tips;
use crate::utils::{maybe_print_json, pretty_table};
use crate::{calc, storage};
use anyhow::Result;
use rusqlite::Connection;

/// Tips ordered for the signed-in user's appliances; catalogue order when
/// nobody is signed in or no appliances are entered.
pub fn handle(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let bill = match storage::get_current_user(conn)? {
        Some(user) => storage::get_user_data(conn, &user.email)?
            .filter(|d| !d.appliances.is_empty())
            .map(|d| calc::calculate(&d.appliances, &d.bill_settings)),
        None => None,
    };
    let tips = relevant_tips(bill.as_ref());
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &tips)? {
        return Ok(());
    }
    let rows = tips
        .iter()
        .map(|t| {
            vec![
                t.title.to_string(),
                t.category.to_string(),
                t.potential_savings.to_string(),
                format!("{:?}", t.difficulty),
                t.description.to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Tip", "Category", "Savings", "Difficulty", "Details"],
            rows
        )
    );
    Ok(())
}
