// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use powerpredict::commands::{appliances, bills, data, doctor, session, settings};
use powerpredict::db::{init_schema, kv_set};
use powerpredict::models::{EfficiencyRating, Season};
use powerpredict::{cli, storage};
use rusqlite::Connection;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    init_schema(&conn).unwrap();
    conn
}

/// Runs `args` through the CLI and returns the matches of the leaf
/// subcommand.
fn leaf(args: &[&str]) -> clap::ArgMatches {
    let mut m = cli::build_cli().get_matches_from(std::iter::once("powerpredict").chain(args.iter().copied()));
    while let Some((_, sub)) = m.subcommand() {
        m = sub.clone();
    }
    m
}

fn signed_in() -> Connection {
    let conn = setup();
    session::signin(&conn, &leaf(&["signin", "--email", "sam@example.com"])).unwrap();
    conn
}

#[test]
fn signin_defaults_name_to_local_part() {
    let conn = setup();
    let user = session::signin(&conn, &leaf(&["signin", "--email", " sam@example.com "])).unwrap();
    assert_eq!(user.name, "sam");
    assert_eq!(user.email, "sam@example.com");
    assert_eq!(storage::get_current_user(&conn).unwrap(), Some(user));

    assert!(session::signin(&conn, &leaf(&["signin", "--email", "not-an-email"])).is_err());

    session::signout(&conn).unwrap();
    assert!(storage::get_current_user(&conn).unwrap().is_none());
}

#[test]
fn commands_require_signin() {
    let conn = setup();
    assert!(bills::current_calculation(&conn).is_err());
    assert!(appliances::add(&conn, &leaf(&["appliance", "add", "--preset", "Laptop"])).is_err());
}

#[test]
fn add_from_preset_and_typical_usage() {
    let conn = signed_in();
    let washer = appliances::add(
        &conn,
        &leaf(&["appliance", "add", "--preset", "washing machine", "--hours", "2"]),
    )
    .unwrap();
    assert_eq!(washer.name, "Washing Machine");
    assert_eq!(washer.category, "Laundry");
    assert_eq!(washer.wattage, 1000.0);
    assert_eq!(washer.hours_per_day, 2.0);
    assert_eq!(washer.days_per_month, 10.0);

    let oven = appliances::add(
        &conn,
        &leaf(&["appliance", "add", "--name", "Oven", "--category", "Kitchen"]),
    )
    .unwrap();
    assert_eq!((oven.wattage, oven.hours_per_day, oven.days_per_month), (2400.0, 1.0, 30.0));
    assert_ne!(oven.id, washer.id);

    let stored = storage::get_user_data(&conn, "sam@example.com")
        .unwrap()
        .unwrap();
    assert_eq!(stored.appliances.len(), 2);
}

#[test]
fn add_rejects_out_of_range_usage() {
    let conn = signed_in();
    let too_many_hours = leaf(&["appliance", "add", "--name", "Fan", "--wattage", "50", "--hours", "25"]);
    assert!(appliances::add(&conn, &too_many_hours).is_err());
    let no_days = leaf(&["appliance", "add", "--name", "Fan", "--wattage", "50", "--days", "0"]);
    assert!(appliances::add(&conn, &no_days).is_err());
    let unknown_preset = leaf(&["appliance", "add", "--preset", "Hot Tub"]);
    assert!(appliances::add(&conn, &unknown_preset).is_err());
}

#[test]
fn update_and_remove_appliance() {
    let conn = signed_in();
    let a = appliances::add(&conn, &leaf(&["appliance", "add", "--preset", "Laptop"])).unwrap();
    let updated = appliances::update(
        &conn,
        &leaf(&["appliance", "update", "--id", &a.id, "--hours", "4"]),
    )
    .unwrap();
    assert_eq!(updated.hours_per_day, 4.0);
    assert_eq!(updated.wattage, 65.0);

    assert!(appliances::remove(&conn, &a.id).unwrap());
    assert!(!appliances::remove(&conn, &a.id).unwrap());
}

#[test]
fn settings_set_merges_flags() {
    let conn = signed_in();
    let s = settings::set(
        &conn,
        &leaf(&["settings", "set", "--region", "texas", "--season", "winter"]),
    )
    .unwrap();
    assert_eq!(s.region, "Texas");
    assert_eq!(s.season, Season::Winter);
    assert!(!s.use_time_of_use);

    let s = settings::set(
        &conn,
        &leaf(&["settings", "set", "--time-of-use", "true", "--efficiency", "good"]),
    )
    .unwrap();
    assert_eq!(s.region, "Texas");
    assert!(s.use_time_of_use);
    assert_eq!(s.efficiency_rating, EfficiencyRating::Good);

    assert!(settings::set(&conn, &leaf(&["settings", "set", "--region", "Atlantis"])).is_err());
}

#[test]
fn calc_uses_stored_settings() {
    let conn = signed_in();
    settings::set(&conn, &leaf(&["settings", "set", "--region", "Texas"])).unwrap();
    appliances::add(
        &conn,
        &leaf(&[
            "appliance", "add", "--name", "Fan", "--category", "Other", "--wattage", "100",
            "--hours", "10", "--days", "30",
        ]),
    )
    .unwrap();
    let calc = bills::current_calculation(&conn).unwrap();
    assert!((calc.total_kwh - 30.0).abs() < 1e-9);
    assert!((calc.monthly_bill - 3.6).abs() < 1e-9);
}

#[test]
fn save_list_rename_and_average_bills() {
    let conn = signed_in();
    assert!(bills::save(&conn, &leaf(&["bill", "save", "--name", "Empty"])).is_err());

    appliances::add(&conn, &leaf(&["appliance", "add", "--preset", "Refrigerator"])).unwrap();
    let cheap = bills::save(
        &conn,
        &leaf(&["bill", "save", "--name", "b-cheap", "--month", "jan", "--year", "2025"]),
    )
    .unwrap();
    assert_eq!(cheap.month, "January");
    assert_eq!(cheap.year, 2025);

    appliances::add(&conn, &leaf(&["appliance", "add", "--preset", "Air Conditioner"])).unwrap();
    let pricey = bills::save(
        &conn,
        &leaf(&["bill", "save", "--name", "a-pricey", "--month", "July", "--year", "2025"]),
    )
    .unwrap();
    assert!(pricey.calculation.monthly_bill > cheap.calculation.monthly_bill);

    let by_cost = bills::query_bills(&conn, &leaf(&["bill", "list", "--sort", "cost"])).unwrap();
    assert_eq!(by_cost[0].id, pricey.id);
    let by_name = bills::query_bills(&conn, &leaf(&["bill", "list", "--sort", "name"])).unwrap();
    assert_eq!(by_name[0].name, "a-pricey");

    let renamed = bills::rename(&conn, &cheap.id, "Winter").unwrap();
    assert_eq!(renamed.name, "Winter");
    assert!(renamed.updated_at >= renamed.created_at);

    let (n, avg) = bills::average(&conn, None).unwrap();
    assert_eq!(n, 2);
    let expected = (cheap.calculation.monthly_bill + pricey.calculation.monthly_bill) / 2.0;
    assert!((avg.monthly_bill - expected).abs() < 1e-9);

    let (n, single) = bills::average(&conn, Some(&cheap.id)).unwrap();
    assert_eq!(n, 1);
    assert!((single.monthly_bill - cheap.calculation.monthly_bill).abs() < 1e-9);
    assert!(bills::average(&conn, Some("nope")).is_err());
}

#[test]
fn load_restores_snapshot() {
    let conn = signed_in();
    appliances::add(&conn, &leaf(&["appliance", "add", "--preset", "Laptop"])).unwrap();
    let saved = bills::save(&conn, &leaf(&["bill", "save", "--name", "Snapshot"])).unwrap();

    appliances::add(&conn, &leaf(&["appliance", "add", "--preset", "Microwave"])).unwrap();
    settings::set(&conn, &leaf(&["settings", "set", "--region", "Ohio"])).unwrap();

    bills::load(&conn, &saved.id).unwrap();
    let data = storage::get_user_data(&conn, "sam@example.com")
        .unwrap()
        .unwrap();
    assert_eq!(data.appliances, saved.appliances);
    assert_eq!(data.bill_settings, saved.settings);
}

#[test]
fn month_names_are_normalised() {
    assert_eq!(bills::parse_month("march").unwrap(), "March");
    assert_eq!(bills::parse_month("SEP").unwrap(), "September");
    assert!(bills::parse_month("Smarch").is_err());
}

#[test]
fn breakdown_csv_has_appliance_and_category_rows() {
    let conn = signed_in();
    appliances::add(&conn, &leaf(&["appliance", "add", "--preset", "Laptop"])).unwrap();
    appliances::add(&conn, &leaf(&["appliance", "add", "--preset", "Refrigerator"])).unwrap();
    let calc = bills::current_calculation(&conn).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("breakdown.csv");
    bills::write_breakdown_csv(&calc, out.to_str().unwrap()).unwrap();

    let mut rdr = csv::Reader::from_path(&out).unwrap();
    let kinds: Vec<String> = rdr
        .records()
        .map(|r| r.unwrap()[0].to_string())
        .collect();
    assert_eq!(kinds, ["appliance", "appliance", "category", "category"]);
}

#[test]
fn data_export_import_via_files() {
    let conn = signed_in();
    appliances::add(&conn, &leaf(&["appliance", "add", "--preset", "Laptop"])).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("backup.json");
    let path = path.to_str().unwrap();
    data::export_to(&conn, path).unwrap();

    let other = setup();
    session::signin(&other, &leaf(&["signin", "--email", "sam@example.com"])).unwrap();
    let imported = data::import_from(&other, path).unwrap();
    assert_eq!(imported.appliances.len(), 1);
    assert_eq!(imported.appliances[0].name, "Laptop");

    std::fs::write(dir.path().join("bad.json"), r#"{"appliances": []}"#).unwrap();
    assert!(data::import_from(&other, dir.path().join("bad.json").to_str().unwrap()).is_err());
}

#[test]
fn doctor_flags_bad_data() {
    let conn = setup();
    kv_set(&conn, &storage::user_key("broken@example.com"), "{oops").unwrap();
    kv_set(
        &conn,
        &storage::user_key("odd@example.com"),
        r#"{
            "appliances": [{"id": "1", "name": "Kiln", "category": "Garage",
                            "wattage": 0.5, "hoursPerDay": 2, "daysPerMonth": 4}],
            "billSettings": {"region": "Atlantis", "useTimeOfUse": false, "season": "summer",
                             "homeSize": "medium", "efficiencyRating": "average"},
            "savedBills": []
        }"#,
    )
    .unwrap();

    let issues: Vec<String> = doctor::find_issues(&conn, true)
        .unwrap()
        .into_iter()
        .map(|(i, _)| i)
        .collect();
    assert_eq!(
        issues,
        [
            "corrupt_user_data",
            "unknown_region",
            "unknown_category",
            "appliance_out_of_range"
        ]
    );

    let clean = setup();
    let issues = doctor::find_issues(&clean, false).unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].0, "gemini_not_configured");
}
