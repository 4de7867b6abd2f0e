//! Integration tests loading the shipped 2024 federal schedules end to end.

use ledgerline_core::calculations::BracketCalculator;
use ledgerline_core::{BracketTableSet, FilingStatus};
use ledgerline_data::ScheduleLoader;
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;

const TEST_CSV_2024: &str = include_str!("../test-data/federal_brackets_2024.csv");

#[test]
fn load_all_2024_schedules() {
    let records = ScheduleLoader::parse(TEST_CSV_2024.as_bytes()).expect("Failed to parse CSV");

    assert_eq!(records.len(), 28);

    let tables =
        ScheduleLoader::build_rate_tables(&records, 2024).expect("Failed to build tables");

    assert_eq!(tables.len(), 4);
    for (status, table) in &tables {
        assert_eq!(
            table.brackets().len(),
            7,
            "Expected 7 brackets for status {}",
            status
        );
    }
}

#[test]
fn loaded_tables_match_the_built_in_schedules() {
    let records = ScheduleLoader::parse(TEST_CSV_2024.as_bytes()).expect("Failed to parse CSV");
    let tables =
        ScheduleLoader::build_rate_tables(&records, 2024).expect("Failed to build tables");

    let built_in = BracketTableSet::default_2024();

    for status in [
        FilingStatus::Single,
        FilingStatus::MarriedJoint,
        FilingStatus::MarriedSeparate,
        FilingStatus::HeadOfHousehold,
    ] {
        let loaded = tables.get(&status).expect("Missing loaded table");
        let reference = built_in.table(status).expect("Missing built-in table");
        assert_eq!(loaded, reference, "Schedules differ for status {}", status);
    }
}

#[test]
fn loaded_tables_drive_the_bracket_calculator() {
    let records = ScheduleLoader::parse(TEST_CSV_2024.as_bytes()).expect("Failed to parse CSV");
    let tables =
        ScheduleLoader::build_rate_tables(&records, 2024).expect("Failed to build tables");

    let single = &tables[&FilingStatus::Single];
    let calc = BracketCalculator::new(single);

    // 5426 + 0.22 * (50000 - 47150)
    assert_eq!(calc.tax(dec!(50000)).expect("Failed to compute tax"), dec!(6053.00));
    assert_eq!(
        calc.marginal_rate(dec!(50000)).expect("Failed to compute rate"),
        dec!(0.22)
    );

    // A boundary income belongs to the upper bracket
    assert_eq!(calc.tax(dec!(11600)).expect("Failed to compute tax"), dec!(1160.00));
    assert_eq!(
        calc.marginal_rate(dec!(11600)).expect("Failed to compute rate"),
        dec!(0.12)
    );
}

#[test]
fn joint_and_single_schedules_diverge() {
    let records = ScheduleLoader::parse(TEST_CSV_2024.as_bytes()).expect("Failed to parse CSV");
    let tables =
        ScheduleLoader::build_rate_tables(&records, 2024).expect("Failed to build tables");

    let single = BracketCalculator::new(&tables[&FilingStatus::Single]);
    let joint = BracketCalculator::new(&tables[&FilingStatus::MarriedJoint]);

    // 2320 + 0.12 * (50000 - 23200)
    assert_eq!(joint.tax(dec!(50000)).expect("Failed to compute tax"), dec!(5536.00));
    assert_eq!(single.tax(dec!(50000)).expect("Failed to compute tax"), dec!(6053.00));
}
