// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use std::path::Path;

use powerpredict::{cli, commands, config, db, init_tracing};

fn main() -> Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let serving = matches!(matches.subcommand(), Some(("serve", _)));
    init_tracing(if serving { "info" } else { "warn" });

    let cfg = config::load_config(matches.get_one::<String>("config").map(Path::new))?;
    let db_override = matches
        .get_one::<String>("db")
        .map(Path::new)
        .or(cfg.storage.database.as_deref());

    // The proxy keeps no local state.
    if let Some(("serve", sub)) = matches.subcommand() {
        return commands::serve::handle(sub, &cfg);
    }

    let conn = db::open_or_init(db_override)?;

    match matches.subcommand() {
        Some(("init", _)) => match db_override {
            Some(p) => println!("Database initialized at {}", p.display()),
            None => println!("Database initialized at {}", db::db_path()?.display()),
        },
        Some(("doctor", _)) => commands::doctor::handle(&conn, cfg.gemini.is_configured())?,
        Some(("signin", sub)) => {
            commands::session::signin(&conn, sub)?;
        }
        Some(("signout", _)) => commands::session::signout(&conn)?,
        Some(("whoami", sub)) => commands::session::whoami(&conn, sub)?,
        Some(("appliance", sub)) => commands::appliances::handle(&conn, sub)?,
        Some(("settings", sub)) => commands::settings::handle(&conn, sub)?,
        Some(("bill", sub)) => commands::bills::handle(&conn, sub)?,
        Some(("data", sub)) => commands::data::handle(&conn, sub)?,
        Some(("tips", sub)) => commands::tips::handle(&conn, sub)?,
        Some(("chat", sub)) => {
            commands::chat::handle(&conn, sub, &cfg.chat)?;
        }
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
