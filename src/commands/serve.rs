// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::chat::server;
use crate::config::Config;
use crate::utils::opt_str;
use anyhow::{Context, Result};

/// Runs the chat proxy until Ctrl-C. The CLI stays synchronous; a runtime is
/// built only for this command.
pub fn handle(sub: &clap::ArgMatches, cfg: &Config) -> Result<()> {
    let mut cfg = cfg.clone();
    if let Some(host) = opt_str(sub, "host") {
        cfg.server.host = host.to_string();
    }
    if let Some(port) = sub.get_one::<u16>("port") {
        cfg.server.port = *port;
    }
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    runtime.block_on(server::run(&cfg))
}
