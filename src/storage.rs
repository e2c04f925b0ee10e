// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Per-user data bundles kept in the key/value table.
//!
//! Each user owns one JSON document `{ appliances, billSettings, savedBills }`
//! under `powerpredict_user_<email>`. The signed-in user lives under
//! `powerpredict_current_user`.

use crate::db::{kv_get, kv_remove, kv_set};
use crate::error::StorageError;
use crate::models::{Appliance, BillSettings, SavedBill, User, UserData};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

pub const STORAGE_PREFIX: &str = "powerpredict_";
pub const EXPORT_VERSION: &str = "2.0";

pub type Result<T> = std::result::Result<T, StorageError>;

pub fn user_key(email: &str) -> String {
    format!("{}user_{}", STORAGE_PREFIX, email)
}

pub fn current_user_key() -> String {
    format!("{}current_user", STORAGE_PREFIX)
}

/// Stored bundle for `email`. Unreadable JSON is logged and treated as absent.
pub fn get_user_data(conn: &Connection, email: &str) -> Result<Option<UserData>> {
    let Some(raw) = kv_get(conn, &user_key(email))? else {
        return Ok(None);
    };
    match serde_json::from_str::<UserData>(&raw) {
        Ok(data) => Ok(Some(data)),
        Err(err) => {
            tracing::warn!(user = email, error = %err, "ignoring unreadable user data");
            Ok(None)
        }
    }
}

fn put_user_data(conn: &Connection, email: &str, data: &UserData) -> Result<()> {
    let json = serde_json::to_string(data)?;
    kv_set(conn, &user_key(email), &json)?;
    Ok(())
}

fn update_or_default<F>(conn: &Connection, email: &str, f: F) -> Result<UserData>
where
    F: FnOnce(&mut UserData),
{
    let mut data = get_user_data(conn, email)?.unwrap_or_default();
    f(&mut data);
    put_user_data(conn, email, &data)?;
    Ok(data)
}

pub fn save_user_appliances(conn: &Connection, email: &str, appliances: &[Appliance]) -> Result<()> {
    update_or_default(conn, email, |d| d.appliances = appliances.to_vec())?;
    Ok(())
}

pub fn save_user_bill_settings(
    conn: &Connection,
    email: &str,
    settings: &BillSettings,
) -> Result<()> {
    update_or_default(conn, email, |d| d.bill_settings = settings.clone())?;
    Ok(())
}

/// Newest bills come first.
pub fn save_user_bill(conn: &Connection, email: &str, bill: SavedBill) -> Result<()> {
    update_or_default(conn, email, |d| d.saved_bills.insert(0, bill))?;
    Ok(())
}

pub fn get_user_bills(conn: &Connection, email: &str) -> Result<Vec<SavedBill>> {
    Ok(get_user_data(conn, email)?
        .map(|d| d.saved_bills)
        .unwrap_or_default())
}

/// Removes the bill with `bill_id`; returns whether anything was removed.
pub fn delete_user_bill(conn: &Connection, email: &str, bill_id: &str) -> Result<bool> {
    let Some(mut data) = get_user_data(conn, email)? else {
        return Ok(false);
    };
    let before = data.saved_bills.len();
    data.saved_bills.retain(|b| b.id != bill_id);
    let removed = data.saved_bills.len() != before;
    if removed {
        put_user_data(conn, email, &data)?;
    }
    Ok(removed)
}

/// Replaces the bill with `bill_id`, stamping `updated_at` with the current
/// time. Returns whether a bill was replaced; a missing bundle or unknown id
/// leaves storage untouched.
pub fn update_user_bill(
    conn: &Connection,
    email: &str,
    bill_id: &str,
    mut updated: SavedBill,
) -> Result<bool> {
    let Some(mut data) = get_user_data(conn, email)? else {
        return Ok(false);
    };
    let Some(slot) = data.saved_bills.iter_mut().find(|b| b.id == bill_id) else {
        return Ok(false);
    };
    updated.updated_at = Utc::now();
    *slot = updated;
    put_user_data(conn, email, &data)?;
    Ok(true)
}

pub fn find_user_bill(conn: &Connection, email: &str, bill_id: &str) -> Result<SavedBill> {
    get_user_bills(conn, email)?
        .into_iter()
        .find(|b| b.id == bill_id)
        .ok_or_else(|| StorageError::BillNotFound(bill_id.to_string()))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportDocument<'a> {
    #[serde(flatten)]
    data: &'a UserData,
    export_date: DateTime<Utc>,
    version: &'a str,
}

/// Pretty JSON of the user's bundle with `exportDate` and `version`, or
/// `None` when the user has nothing stored.
pub fn export_user_data(conn: &Connection, email: &str) -> Result<Option<String>> {
    let Some(data) = get_user_data(conn, email)? else {
        return Ok(None);
    };
    let doc = ExportDocument {
        data: &data,
        export_date: Utc::now(),
        version: EXPORT_VERSION,
    };
    Ok(Some(serde_json::to_string_pretty(&doc)?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportDocument {
    appliances: Option<Vec<Appliance>>,
    bill_settings: Option<BillSettings>,
    saved_bills: Option<Vec<SavedBill>>,
}

/// Replaces the user's bundle with an exported document. `appliances` and
/// `billSettings` are required; `savedBills` defaults to empty. Extra fields
/// such as `exportDate` are ignored.
pub fn import_user_data(conn: &Connection, email: &str, json: &str) -> Result<UserData> {
    let doc: ImportDocument = serde_json::from_str(json)?;
    let appliances = doc.appliances.ok_or(StorageError::MissingField("appliances"))?;
    let bill_settings = doc
        .bill_settings
        .ok_or(StorageError::MissingField("billSettings"))?;
    let data = UserData {
        appliances,
        bill_settings,
        saved_bills: doc.saved_bills.unwrap_or_default(),
    };
    put_user_data(conn, email, &data)?;
    tracing::info!(
        user = email,
        appliances = data.appliances.len(),
        bills = data.saved_bills.len(),
        "imported user data"
    );
    Ok(data)
}

pub fn set_current_user(conn: &Connection, user: &User) -> Result<()> {
    kv_set(conn, &current_user_key(), &serde_json::to_string(user)?)?;
    Ok(())
}

pub fn get_current_user(conn: &Connection) -> Result<Option<User>> {
    let Some(raw) = kv_get(conn, &current_user_key())? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(user) => Ok(Some(user)),
        Err(err) => {
            tracing::warn!(error = %err, "ignoring unreadable session");
            Ok(None)
        }
    }
}

pub fn clear_current_user_session(conn: &Connection) -> Result<()> {
    kv_remove(conn, &current_user_key())?;
    Ok(())
}
