use ledgerline_core::RepositoryError;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use sqlx::{Row, TypeInfo, ValueRef};

/// Get a decimal value from a row, handling both INTEGER and REAL SQLite types.
pub fn get_decimal(
    row: &sqlx::sqlite::SqliteRow,
    column: &str,
) -> Result<Decimal, RepositoryError> {
    let value_ref = row
        .try_get_raw(column)
        .map_err(|e| RepositoryError::Database(format!("Column '{}' not found: {}", column, e)))?;

    let type_info = value_ref.type_info();
    let type_name = type_info.name();

    match type_name {
        "INTEGER" => {
            let val: i64 = row.try_get(column).map_err(|e| {
                RepositoryError::Database(format!(
                    "Failed to get INTEGER from '{}': {}",
                    column, e
                ))
            })?;
            Ok(Decimal::from(val))
        }
        "REAL" => {
            let val: f64 = row.try_get(column).map_err(|e| {
                RepositoryError::Database(format!("Failed to get REAL from '{}': {}", column, e))
            })?;
            Decimal::try_from(val).map_err(|e| {
                RepositoryError::Database(format!("Failed to convert {} to Decimal: {}", val, e))
            })
        }
        "NULL" => Ok(Decimal::ZERO),
        _ => Err(RepositoryError::Database(format!(
            "Unexpected type '{}' for column '{}'",
            type_name, column
        ))),
    }
}

/// Get an optional decimal value from a row, returning None for NULL values.
pub fn get_optional_decimal(
    row: &sqlx::sqlite::SqliteRow,
    column: &str,
) -> Result<Option<Decimal>, RepositoryError> {
    let value_ref = row
        .try_get_raw(column)
        .map_err(|e| RepositoryError::Database(format!("Column '{}' not found: {}", column, e)))?;

    if value_ref.is_null() {
        return Ok(None);
    }

    get_decimal(row, column).map(Some)
}

/// Convert a Decimal to f64 for SQLite storage.
pub fn decimal_to_f64(d: Decimal) -> f64 {
    d.to_f64().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use sqlx::sqlite::SqlitePoolOptions;

    use super::*;

    async fn setup_test_db() -> sqlx::sqlite::SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");
        sqlx::query(
            "CREATE TABLE test_decimals (
                id INTEGER PRIMARY KEY,
                int_value INTEGER,
                real_value REAL,
                null_value REAL,
                text_value TEXT
            )",
        )
        .execute(&pool)
        .await
        .expect("Failed to create test table");
        pool
    }

    async fn fetch_row(
        pool: &sqlx::sqlite::SqlitePool,
        column: &str,
    ) -> sqlx::sqlite::SqliteRow {
        sqlx::query(&format!("SELECT {column} FROM test_decimals WHERE id = 1"))
            .fetch_one(pool)
            .await
            .expect("Failed to fetch row")
    }

    // get_decimal tests

    #[tokio::test]
    async fn get_decimal_from_integer() {
        let pool = setup_test_db().await;
        sqlx::query("INSERT INTO test_decimals (id, int_value) VALUES (1, 12345)")
            .execute(&pool)
            .await
            .expect("Failed to insert test data");

        let row = fetch_row(&pool, "int_value").await;

        assert_eq!(get_decimal(&row, "int_value"), Ok(dec!(12345)));
    }

    #[tokio::test]
    async fn get_decimal_from_negative_integer() {
        let pool = setup_test_db().await;
        sqlx::query("INSERT INTO test_decimals (id, int_value) VALUES (1, -99999)")
            .execute(&pool)
            .await
            .expect("Failed to insert test data");

        let row = fetch_row(&pool, "int_value").await;

        assert_eq!(get_decimal(&row, "int_value"), Ok(dec!(-99999)));
    }

    #[tokio::test]
    async fn get_decimal_from_real() {
        let pool = setup_test_db().await;
        sqlx::query("INSERT INTO test_decimals (id, real_value) VALUES (1, 123.45)")
            .execute(&pool)
            .await
            .expect("Failed to insert test data");

        let row = fetch_row(&pool, "real_value").await;

        assert_eq!(get_decimal(&row, "real_value"), Ok(dec!(123.45)));
    }

    #[tokio::test]
    async fn get_decimal_treats_null_as_zero() {
        let pool = setup_test_db().await;
        sqlx::query("INSERT INTO test_decimals (id, null_value) VALUES (1, NULL)")
            .execute(&pool)
            .await
            .expect("Failed to insert test data");

        let row = fetch_row(&pool, "null_value").await;

        assert_eq!(get_decimal(&row, "null_value"), Ok(Decimal::ZERO));
    }

    #[tokio::test]
    async fn get_decimal_rejects_text() {
        let pool = setup_test_db().await;
        sqlx::query("INSERT INTO test_decimals (id, text_value) VALUES (1, 'abc')")
            .execute(&pool)
            .await
            .expect("Failed to insert test data");

        let row = fetch_row(&pool, "text_value").await;

        assert!(matches!(
            get_decimal(&row, "text_value"),
            Err(RepositoryError::Database(_))
        ));
    }

    // get_optional_decimal tests

    #[tokio::test]
    async fn get_optional_decimal_returns_none_for_null() {
        let pool = setup_test_db().await;
        sqlx::query("INSERT INTO test_decimals (id, null_value) VALUES (1, NULL)")
            .execute(&pool)
            .await
            .expect("Failed to insert test data");

        let row = fetch_row(&pool, "null_value").await;

        assert_eq!(get_optional_decimal(&row, "null_value"), Ok(None));
    }

    #[tokio::test]
    async fn get_optional_decimal_returns_some_for_real() {
        let pool = setup_test_db().await;
        sqlx::query("INSERT INTO test_decimals (id, real_value) VALUES (1, 0.0725)")
            .execute(&pool)
            .await
            .expect("Failed to insert test data");

        let row = fetch_row(&pool, "real_value").await;

        assert_eq!(
            get_optional_decimal(&row, "real_value"),
            Ok(Some(dec!(0.0725)))
        );
    }

    // decimal_to_f64 tests

    #[test]
    fn decimal_to_f64_round_trips_exact_values() {
        assert_eq!(decimal_to_f64(dec!(160200)), 160200.0);
        assert_eq!(decimal_to_f64(dec!(0.25)), 0.25);
        assert_eq!(decimal_to_f64(dec!(-42.5)), -42.5);
    }
}
