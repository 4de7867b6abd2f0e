use std::collections::HashMap;
use std::io::Read;

use ledgerline_core::{Bracket, FilingStatus, RateTable, RateTableError};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading bracket schedule data.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Unknown filing status: {0}")]
    UnknownFilingStatus(String),

    #[error("No bracket records for tax year {0}")]
    NoRecordsForYear(i32),

    #[error("Invalid rate table for {status}: {source}")]
    InvalidTable {
        status: FilingStatus,
        source: RateTableError,
    },
}

impl From<csv::Error> for ScheduleLoaderError {
    fn from(err: csv::Error) -> Self {
        ScheduleLoaderError::CsvParse(err.to_string())
    }
}

/// A single record from the bracket schedules CSV file.
///
/// Expected columns:
/// - `tax_year`: The tax year (e.g., 2024)
/// - `filing_status`: single, married_joint, married_separate, or head_of_household
/// - `bracket_min`: The lower income bound for this bracket
/// - `bracket_max`: The upper income bound (empty for unlimited)
/// - `rate`: The marginal rate as a decimal (e.g., 0.10 for 10%)
/// - `base_tax`: The tax owed on all income below `bracket_min`
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BracketScheduleRecord {
    pub tax_year: i32,
    pub filing_status: String,
    pub bracket_min: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub bracket_max: Option<Decimal>,
    pub rate: Decimal,
    pub base_tax: Decimal,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Loader for bracket schedule data from CSV files.
///
/// The loader reads CSV rows and assembles them into validated [`RateTable`]s
/// keyed by filing status, ready to hand to the bracket calculator. Filing
/// status codes accept the same aliases as [`FilingStatus::parse`], so
/// `married` and `married_filing_jointly` both land on the joint schedule.
pub struct ScheduleLoader;

impl ScheduleLoader {
    /// Parse bracket schedule records from a CSV reader.
    ///
    /// Returns a vector of parsed records. The reader can be any type that
    /// implements `Read`, such as a file or a string slice.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<BracketScheduleRecord>, ScheduleLoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: BracketScheduleRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Build validated rate tables for one tax year.
    ///
    /// Records for other years are ignored. Rows may appear in any order;
    /// each status group is sorted by `bracket_min` before validation, which
    /// rejects gapped, overlapping, or bounded-last schedules.
    pub fn build_rate_tables(
        records: &[BracketScheduleRecord],
        tax_year: i32,
    ) -> Result<HashMap<FilingStatus, RateTable>, ScheduleLoaderError> {
        let mut grouped: HashMap<FilingStatus, Vec<Bracket>> = HashMap::new();

        for record in records.iter().filter(|r| r.tax_year == tax_year) {
            let status = FilingStatus::parse(&record.filing_status).ok_or_else(|| {
                ScheduleLoaderError::UnknownFilingStatus(record.filing_status.clone())
            })?;
            grouped.entry(status).or_default().push(Bracket {
                min: record.bracket_min,
                max: record.bracket_max,
                rate: record.rate,
                base: record.base_tax,
            });
        }

        if grouped.is_empty() {
            return Err(ScheduleLoaderError::NoRecordsForYear(tax_year));
        }

        let mut tables = HashMap::new();
        for (status, mut brackets) in grouped {
            brackets.sort_by(|a, b| a.min.cmp(&b.min));
            let table = RateTable::new(brackets)
                .map_err(|source| ScheduleLoaderError::InvalidTable { status, source })?;
            tables.insert(status, table);
        }

        Ok(tables)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    const TEST_CSV: &str = r#"tax_year,filing_status,bracket_min,bracket_max,rate,base_tax
2024,single,0,11600,0.10,0
2024,single,11600,47150,0.12,1160.00
2024,single,47150,100525,0.22,5426.00
2024,single,100525,191950,0.24,17168.50
2024,single,191950,243725,0.32,39110.50
2024,single,243725,609350,0.35,55678.50
2024,single,609350,,0.37,183647.25
2024,married_joint,0,23200,0.10,0
2024,married_joint,23200,94300,0.12,2320.00
2024,married_joint,94300,201050,0.22,10852.00
2024,married_joint,201050,383900,0.24,34337.00
2024,married_joint,383900,487450,0.32,78221.00
2024,married_joint,487450,731200,0.35,111357.00
2024,married_joint,731200,,0.37,196669.50
2024,married_separate,0,11600,0.10,0
2024,married_separate,11600,47150,0.12,1160.00
2024,married_separate,47150,100525,0.22,5426.00
2024,married_separate,100525,191950,0.24,17168.50
2024,married_separate,191950,243725,0.32,39110.50
2024,married_separate,243725,365600,0.35,55678.50
2024,married_separate,365600,,0.37,98334.75
2024,head_of_household,0,16550,0.10,0
2024,head_of_household,16550,63100,0.12,1655.00
2024,head_of_household,63100,100500,0.22,7241.00
2024,head_of_household,100500,191950,0.24,15469.00
2024,head_of_household,191950,243700,0.32,37417.00
2024,head_of_household,243700,609350,0.35,53977.00
2024,head_of_household,609350,,0.37,181954.50
"#;

    #[test]
    fn parse_csv_single_bracket() {
        let csv = "tax_year,filing_status,bracket_min,bracket_max,rate,base_tax\n2024,single,0,11600,0.10,0";

        let records = ScheduleLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0],
            BracketScheduleRecord {
                tax_year: 2024,
                filing_status: "single".to_string(),
                bracket_min: dec!(0),
                bracket_max: Some(dec!(11600)),
                rate: dec!(0.10),
                base_tax: dec!(0),
            }
        );
    }

    #[test]
    fn parse_csv_unlimited_bracket_max() {
        let csv = "tax_year,filing_status,bracket_min,bracket_max,rate,base_tax\n2024,single,609350,,0.37,183647.25";

        let records = ScheduleLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].bracket_max, None);
        assert_eq!(records[0].bracket_min, dec!(609350));
        assert_eq!(records[0].rate, dec!(0.37));
        assert_eq!(records[0].base_tax, dec!(183647.25));
    }

    #[test]
    fn parse_csv_all_statuses() {
        let records = ScheduleLoader::parse(TEST_CSV.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(records.len(), 28);

        let statuses: std::collections::HashSet<_> =
            records.iter().map(|r| r.filing_status.as_str()).collect();
        assert!(statuses.contains("single"));
        assert!(statuses.contains("married_joint"));
        assert!(statuses.contains("married_separate"));
        assert!(statuses.contains("head_of_household"));

        // Verify 7 brackets per status
        for status in ["single", "married_joint", "married_separate", "head_of_household"] {
            let count = records.iter().filter(|r| r.filing_status == status).count();
            assert_eq!(count, 7, "Expected 7 brackets for status {}", status);
        }
    }

    #[test]
    fn parse_invalid_csv_missing_column() {
        let csv = "tax_year,filing_status,bracket_min\n2024,single,0";

        let result = ScheduleLoader::parse(csv.as_bytes());

        let err = result.expect_err("Should fail for missing column");
        let ScheduleLoaderError::CsvParse(msg) = err else {
            panic!("Expected CsvParse error, got: {:?}", err);
        };
        assert!(
            msg.contains("missing field"),
            "Expected 'missing field' in error, got: {}",
            msg
        );
    }

    #[test]
    fn parse_invalid_csv_bad_decimal() {
        let csv =
            "tax_year,filing_status,bracket_min,bracket_max,rate,base_tax\n2024,single,abc,11600,0.10,0";

        let result = ScheduleLoader::parse(csv.as_bytes());

        let err = result.expect_err("Should fail for invalid decimal");
        let ScheduleLoaderError::CsvParse(msg) = err else {
            panic!("Expected CsvParse error, got: {:?}", err);
        };
        assert!(
            msg.contains("invalid"),
            "Expected 'invalid' in error, got: {}",
            msg
        );
    }

    #[test]
    fn parse_empty_csv() {
        let csv = "tax_year,filing_status,bracket_min,bracket_max,rate,base_tax\n";

        let records = ScheduleLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        assert!(records.is_empty());
    }

    #[test]
    fn build_tables_for_all_statuses() {
        let records = ScheduleLoader::parse(TEST_CSV.as_bytes()).expect("Failed to parse CSV");

        let tables =
            ScheduleLoader::build_rate_tables(&records, 2024).expect("Should build tables");

        assert_eq!(tables.len(), 4);

        let single = &tables[&FilingStatus::Single];
        assert_eq!(single.brackets().len(), 7);
        assert_eq!(single.brackets()[1].min, dec!(11600));
        assert_eq!(single.brackets()[1].max, Some(dec!(47150)));
        assert_eq!(single.brackets()[1].rate, dec!(0.12));
        assert_eq!(single.brackets()[1].base, dec!(1160.00));
        assert_eq!(single.brackets()[6].max, None);

        let joint = &tables[&FilingStatus::MarriedJoint];
        assert_eq!(joint.brackets()[6].min, dec!(731200));
        assert_eq!(joint.brackets()[6].base, dec!(196669.50));
    }

    #[test]
    fn build_tables_accepts_unordered_rows() {
        let csv = "tax_year,filing_status,bracket_min,bracket_max,rate,base_tax\n\
                   2024,single,10000,,0.20,1000\n\
                   2024,single,0,10000,0.10,0";
        let records = ScheduleLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        let tables =
            ScheduleLoader::build_rate_tables(&records, 2024).expect("Should build tables");

        let single = &tables[&FilingStatus::Single];
        assert_eq!(single.brackets()[0].min, dec!(0));
        assert_eq!(single.brackets()[1].min, dec!(10000));
    }

    #[test]
    fn build_tables_filters_by_year() {
        let csv = "tax_year,filing_status,bracket_min,bracket_max,rate,base_tax\n\
                   2023,single,0,11000,0.10,0\n\
                   2023,single,11000,,0.12,1100\n\
                   2024,single,0,11600,0.10,0\n\
                   2024,single,11600,,0.12,1160";
        let records = ScheduleLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        let tables =
            ScheduleLoader::build_rate_tables(&records, 2024).expect("Should build tables");

        let single = &tables[&FilingStatus::Single];
        assert_eq!(single.brackets().len(), 2);
        assert_eq!(single.brackets()[0].max, Some(dec!(11600)));
    }

    #[test]
    fn build_tables_accepts_filing_status_aliases() {
        let csv = "tax_year,filing_status,bracket_min,bracket_max,rate,base_tax\n\
                   2024,married_filing_jointly,0,23200,0.10,0\n\
                   2024,married,23200,,0.12,2320";
        let records = ScheduleLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        let tables =
            ScheduleLoader::build_rate_tables(&records, 2024).expect("Should build tables");

        assert_eq!(tables.len(), 1);
        assert_eq!(tables[&FilingStatus::MarriedJoint].brackets().len(), 2);
    }

    #[test]
    fn build_tables_rejects_unknown_status() {
        let csv = "tax_year,filing_status,bracket_min,bracket_max,rate,base_tax\n\
                   2024,qualifying_widow,0,,0.10,0";
        let records = ScheduleLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        let result = ScheduleLoader::build_rate_tables(&records, 2024);

        assert_eq!(
            result,
            Err(ScheduleLoaderError::UnknownFilingStatus(
                "qualifying_widow".to_string()
            ))
        );
    }

    #[test]
    fn build_tables_rejects_missing_year() {
        let records = ScheduleLoader::parse(TEST_CSV.as_bytes()).expect("Failed to parse CSV");

        let result = ScheduleLoader::build_rate_tables(&records, 2031);

        assert_eq!(result, Err(ScheduleLoaderError::NoRecordsForYear(2031)));
    }

    #[test]
    fn build_tables_rejects_gapped_schedule() {
        let csv = "tax_year,filing_status,bracket_min,bracket_max,rate,base_tax\n\
                   2024,single,0,10000,0.10,0\n\
                   2024,single,20000,,0.20,1000";
        let records = ScheduleLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        let result = ScheduleLoader::build_rate_tables(&records, 2024);

        assert_eq!(
            result,
            Err(ScheduleLoaderError::InvalidTable {
                status: FilingStatus::Single,
                source: RateTableError::NotContiguous {
                    index: 1,
                    expected: dec!(10000),
                    actual: dec!(20000),
                },
            })
        );
    }
}
