// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::User;
use crate::storage;
use crate::utils::{arg_str, is_valid_email, maybe_print_json, opt_str, require_user};
use anyhow::{Result, bail};
use rusqlite::Connection;

/// Records `email` as the current user. No password; the name falls back to
/// the local part of the address.
pub fn signin(conn: &Connection, sub: &clap::ArgMatches) -> Result<User> {
    let email = arg_str(sub, "email")?;
    if !is_valid_email(email) {
        bail!("Invalid email '{}'", email);
    }
    let name = opt_str(sub, "name")
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| email.split('@').next().unwrap_or(email).to_string());
    let user = User {
        email: email.to_string(),
        name,
    };
    storage::set_current_user(conn, &user)?;
    tracing::info!(email = %user.email, "signed in");
    println!("Signed in as {} <{}>", user.name, user.email);
    Ok(user)
}

pub fn signout(conn: &Connection) -> Result<()> {
    storage::clear_current_user_session(conn)?;
    println!("Signed out");
    Ok(())
}

pub fn whoami(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = require_user(conn)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &user)? {
        return Ok(());
    }
    let data = storage::get_user_data(conn, &user.email)?.unwrap_or_default();
    println!("{} <{}>", user.name, user.email);
    println!(
        "{} appliances, {} saved bills, region {}",
        data.appliances.len(),
        data.saved_bills.len(),
        data.bill_settings.region
    );
    Ok(())
}
