// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{CATEGORIES, EfficiencyRating, HomeSize, Season};
use clap::{Arg, ArgAction, Command, arg, builder::PossibleValuesParser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(arg!(--json "Print JSON").action(ArgAction::SetTrue))
        .arg(
            arg!(--jsonl "Print one JSON object per line")
                .action(ArgAction::SetTrue)
                .conflicts_with("json"),
        )
}

fn category_arg() -> Arg {
    arg!(--category <CATEGORY> "Appliance category").value_parser(PossibleValuesParser::new(CATEGORIES))
}

pub fn build_cli() -> Command {
    Command::new("powerpredict")
        .about("Household electricity bill estimator")
        .version(clap::crate_version!())
        .arg(arg!(--db <PATH> "SQLite database path").global(true))
        .arg(arg!(--config <PATH> "Configuration file").global(true))
        .subcommand(Command::new("init").about("Create the local database"))
        .subcommand(Command::new("doctor").about("Check stored data for problems"))
        .subcommand(
            Command::new("signin")
                .about("Sign in (local session, no password)")
                .arg(arg!(--email <EMAIL>).required(true))
                .arg(arg!(--name <NAME> "Display name")),
        )
        .subcommand(Command::new("signout").about("Clear the current session"))
        .subcommand(json_flags(Command::new("whoami").about("Show the signed-in user")))
        .subcommand(
            Command::new("appliance")
                .about("Manage appliances")
                .subcommand_required(true)
                .subcommand(
                    Command::new("add")
                        .arg(arg!(--name <NAME>))
                        .arg(category_arg())
                        .arg(arg!(--wattage <WATTS>))
                        .arg(arg!(--hours <HOURS> "Hours per day"))
                        .arg(arg!(--days <DAYS> "Days per month"))
                        .arg(arg!(--preset <PRESET> "Start from a common appliance")),
                )
                .subcommand(json_flags(Command::new("list")))
                .subcommand(
                    Command::new("update")
                        .arg(arg!(--id <ID>).required(true))
                        .arg(arg!(--name <NAME>))
                        .arg(category_arg())
                        .arg(arg!(--wattage <WATTS>))
                        .arg(arg!(--hours <HOURS>))
                        .arg(arg!(--days <DAYS>)),
                )
                .subcommand(Command::new("rm").arg(arg!(--id <ID>).required(true)))
                .subcommand(json_flags(
                    Command::new("presets").about("Common appliances for quick add"),
                )),
        )
        .subcommand(
            Command::new("settings")
                .about("Billing settings")
                .subcommand_required(true)
                .subcommand(json_flags(Command::new("show")))
                .subcommand(
                    Command::new("set")
                        .arg(arg!(--region <REGION>))
                        .arg(
                            arg!(--"time-of-use" <BOOL> "Use time-of-use pricing")
                                .value_parser(clap::value_parser!(bool)),
                        )
                        .arg(
                            arg!(--season <SEASON>)
                                .value_parser(PossibleValuesParser::new(Season::ALL.iter().map(Season::as_str))),
                        )
                        .arg(
                            arg!(--"home-size" <SIZE>)
                                .value_parser(PossibleValuesParser::new(HomeSize::ALL.iter().map(HomeSize::as_str))),
                        )
                        .arg(
                            arg!(--efficiency <RATING>).value_parser(PossibleValuesParser::new(
                                EfficiencyRating::ALL.iter().map(EfficiencyRating::as_str),
                            )),
                        ),
                )
                .subcommand(json_flags(Command::new("regions").about("Known regions and rates"))),
        )
        .subcommand(
            Command::new("bill")
                .about("Estimate, save and compare bills")
                .subcommand_required(true)
                .subcommand(json_flags(
                    Command::new("calc").about("Estimate the bill for the current appliances"),
                ))
                .subcommand(
                    Command::new("save")
                        .arg(arg!(--name <NAME>).required(true))
                        .arg(arg!(--month <MONTH> "English month name, default current"))
                        .arg(arg!(--year <YEAR> "Default current year")),
                )
                .subcommand(json_flags(
                    Command::new("list").arg(
                        arg!(--sort <KEY>)
                            .value_parser(["date", "cost", "name"])
                            .default_value("date"),
                    ),
                ))
                .subcommand(json_flags(
                    Command::new("show").arg(arg!(--id <ID>).required(true)),
                ))
                .subcommand(
                    Command::new("load")
                        .about("Replace current appliances and settings with a saved bill's")
                        .arg(arg!(--id <ID>).required(true)),
                )
                .subcommand(
                    Command::new("rename")
                        .arg(arg!(--id <ID>).required(true))
                        .arg(arg!(--name <NAME>).required(true)),
                )
                .subcommand(Command::new("rm").arg(arg!(--id <ID>).required(true)))
                .subcommand(json_flags(
                    Command::new("average")
                        .about("Average several saved bills")
                        .arg(arg!(--ids <IDS> "Comma-separated bill ids, default all")),
                ))
                .subcommand(json_flags(Command::new("stats").about("Statistics over saved bills")))
                .subcommand(
                    Command::new("export")
                        .about("Write a bill breakdown to a file")
                        .arg(
                            arg!(--format <FMT>)
                                .value_parser(["csv", "json"])
                                .default_value("csv"),
                        )
                        .arg(arg!(--out <FILE>).required(true))
                        .arg(arg!(--id <ID> "Saved bill, default current appliances")),
                ),
        )
        .subcommand(
            Command::new("data")
                .about("Backup and restore")
                .subcommand_required(true)
                .subcommand(Command::new("export").arg(arg!(--out <FILE>).required(true)))
                .subcommand(Command::new("import").arg(arg!(--path <FILE>).required(true))),
        )
        .subcommand(json_flags(Command::new("tips").about("Energy-saving tips")))
        .subcommand(
            Command::new("chat")
                .about("Ask the energy assistant")
                .arg(arg!(--message <TEXT>).required(true))
                .arg(arg!(--endpoint <URL> "Chat proxy URL")),
        )
        .subcommand(
            Command::new("serve")
                .about("Run the chat proxy server")
                .arg(arg!(--host <HOST>))
                .arg(arg!(--port <PORT>).value_parser(clap::value_parser!(u16))),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_consistent() {
        build_cli().debug_assert();
    }

    #[test]
    fn rejects_unknown_category() {
        let res = build_cli().try_get_matches_from([
            "powerpredict",
            "appliance",
            "add",
            "--name",
            "Fan",
            "--category",
            "Garage",
        ]);
        assert!(res.is_err());
    }
}
