// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::chat::ChatRequest;
use crate::chat::client::{Answer, ChatContext, ask};
use crate::config::ChatConfig;
use crate::utils::{arg_str, http_client, opt_str};
use crate::{calc, storage};
use anyhow::{Result, bail};
use rusqlite::Connection;
use std::time::Duration;

/// Household context for the signed-in user, if any.
pub fn build_context(conn: &Connection) -> Result<Option<ChatContext>> {
    let Some(user) = storage::get_current_user(conn)? else {
        return Ok(None);
    };
    let data = storage::get_user_data(conn, &user.email)?.unwrap_or_default();
    let current = (!data.appliances.is_empty())
        .then(|| calc::calculate(&data.appliances, &data.bill_settings));
    Ok(Some(ChatContext::new(
        &user.name,
        current.as_ref(),
        &data.saved_bills,
    )))
}

pub fn handle(conn: &Connection, sub: &clap::ArgMatches, cfg: &ChatConfig) -> Result<Answer> {
    let message = arg_str(sub, "message")?;
    if message.is_empty() {
        bail!("Message cannot be empty");
    }
    let endpoint = opt_str(sub, "endpoint").unwrap_or(cfg.endpoint.as_str());
    let context = build_context(conn)?
        .map(serde_json::to_value)
        .transpose()?;
    let request = ChatRequest {
        message: message.to_string(),
        context,
    };
    let client = http_client(Duration::from_secs(cfg.timeout_seconds))?;
    let answer = ask(&client, endpoint, &request);
    match &answer {
        Answer::Remote { reply, model } => {
            println!("{}", reply);
            if let Some(model) = model {
                tracing::debug!(model = %model, "assistant replied");
            }
        }
        Answer::Fallback { notice, reply } => {
            eprintln!("{}", notice);
            println!("{}", reply);
        }
    }
    Ok(answer)
}
