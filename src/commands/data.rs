// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::UserData;
use crate::storage;
use crate::utils::{arg_str, require_user};
use anyhow::{Context, Result, anyhow};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("export", sub)) => {
            let out = arg_str(sub, "out")?;
            export_to(conn, out)?;
            println!("Exported data to {}", out);
        }
        Some(("import", sub)) => {
            let path = arg_str(sub, "path")?;
            let data = import_from(conn, path)?;
            println!(
                "Imported {} appliances and {} saved bills",
                data.appliances.len(),
                data.saved_bills.len()
            );
        }
        _ => {}
    }
    Ok(())
}

pub fn export_to(conn: &Connection, out: &str) -> Result<()> {
    let user = require_user(conn)?;
    let json = storage::export_user_data(conn, &user.email)?
        .ok_or_else(|| anyhow!("Nothing to export for {}", user.email))?;
    std::fs::write(out, json).with_context(|| format!("Failed to write {}", out))?;
    Ok(())
}

/// Replaces the signed-in user's data with the contents of an export file.
pub fn import_from(conn: &Connection, path: &str) -> Result<UserData> {
    let user = require_user(conn)?;
    let raw = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?;
    let data = storage::import_user_data(conn, &user.email, &raw)
        .with_context(|| format!("Failed to import data from {}", path))?;
    Ok(data)
}
