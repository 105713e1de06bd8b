//! Database operations for expenses.
//!
//! Each lookup, aggregate and mutation the dashboard needs is a function over
//! a [Connection]. [crate::backend::SqliteBackend] bundles them behind the
//! [crate::backend::ExpenseBackend] trait.

use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::Serialize;

use crate::{
    Error,
    amount::Amount,
    expense::{Expense, ExpenseId, ExpenseRow, Month, NewExpense},
    service::ServiceId,
};

const SELECT_EXPENSE: &str = "SELECT e.id, e.service_id, s.name, e.year, e.month, e.amount
    FROM expense e INNER JOIN service s ON s.id = e.service_id";

/// Code 787 occurs when a FOREIGN KEY constraint failed.
const SQLITE_CONSTRAINT_FOREIGNKEY: i32 = 787;

/// The total spent on one service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceTotal {
    #[serde(rename = "nombre_servicio")]
    pub service_name: String,
    pub total: Amount,
}

/// The total spent on one service in one year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnualServiceTotal {
    #[serde(rename = "año")]
    pub year: i32,
    #[serde(rename = "nombre_servicio")]
    pub service_name: String,
    pub total: Amount,
}

/// The total spent on all services in one year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearTotal {
    #[serde(rename = "año")]
    pub year: i32,
    pub total: Amount,
}

/// The total spent on one service in one month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyServiceTotal {
    #[serde(rename = "año")]
    pub year: i32,
    #[serde(rename = "mes")]
    pub month: Month,
    #[serde(rename = "nombre_servicio")]
    pub service_name: String,
    pub total: Amount,
}

/// Initialize the expense table and indexes.
///
/// The service table must be created first.
pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS expense (
            id INTEGER PRIMARY KEY,
            service_id INTEGER NOT NULL REFERENCES service(id),
            year INTEGER NOT NULL,
            month INTEGER NOT NULL CHECK (month BETWEEN 1 AND 12),
            amount INTEGER NOT NULL CHECK (amount >= 0)
        );

        CREATE INDEX IF NOT EXISTS idx_expense_service_year_month
            ON expense(service_id, year, month);
        CREATE INDEX IF NOT EXISTS idx_expense_year_month ON expense(year, month);",
    )?;

    Ok(())
}

/// Insert an expense and return it with its generated ID.
///
/// # Errors
/// Returns [Error::UnknownService] if the service does not exist.
pub fn insert_expense(expense: &NewExpense, connection: &Connection) -> Result<ExpenseRow, Error> {
    connection
        .prepare(
            "INSERT INTO expense (service_id, year, month, amount) VALUES (?1, ?2, ?3, ?4)
            RETURNING id, service_id, year, month, amount",
        )?
        .query_row(
            params![expense.service_id, expense.year, expense.month, expense.amount],
            map_expense_row,
        )
        .map_err(|error| map_foreign_key_error(error, expense.service_id))
}

/// Replace every field of an expense.
///
/// # Errors
/// Returns [Error::UpdateMissingExpense] if there is no expense with `id` and
/// [Error::UnknownService] if the new service does not exist.
pub fn update_expense(
    id: ExpenseId,
    expense: &NewExpense,
    connection: &Connection,
) -> Result<ExpenseRow, Error> {
    connection
        .prepare(
            "UPDATE expense SET service_id = ?1, year = ?2, month = ?3, amount = ?4 WHERE id = ?5
            RETURNING id, service_id, year, month, amount",
        )?
        .query_row(
            params![
                expense.service_id,
                expense.year,
                expense.month,
                expense.amount,
                id
            ],
            map_expense_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::UpdateMissingExpense,
            error => map_foreign_key_error(error, expense.service_id),
        })
}

/// Change only the amount of an expense.
///
/// # Errors
/// Returns [Error::UpdateMissingExpense] if there is no expense with `id`.
pub fn update_expense_amount(
    id: ExpenseId,
    amount: Amount,
    connection: &Connection,
) -> Result<ExpenseRow, Error> {
    connection
        .prepare(
            "UPDATE expense SET amount = ?1 WHERE id = ?2
            RETURNING id, service_id, year, month, amount",
        )?
        .query_row(params![amount, id], map_expense_row)
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::UpdateMissingExpense,
            error => error.into(),
        })
}

/// Delete an expense by ID.
///
/// # Errors
/// Returns [Error::DeleteMissingExpense] if there is no expense with `id`.
pub fn delete_expense(id: ExpenseId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM expense WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingExpense);
    }

    Ok(())
}

/// Find the first expense for a service in a given month, if there is one.
pub fn find_existing_expense(
    service_id: ServiceId,
    year: i32,
    month: Month,
    connection: &Connection,
) -> Result<Option<ExpenseRow>, Error> {
    connection
        .prepare(
            "SELECT id, service_id, year, month, amount FROM expense
            WHERE service_id = ?1 AND year = ?2 AND month = ?3
            ORDER BY id ASC LIMIT 1",
        )?
        .query_row(params![service_id, year, month], map_expense_row)
        .optional()
        .map_err(|error| error.into())
}

/// Retrieve a single expense by ID.
pub fn get_expense(id: ExpenseId, connection: &Connection) -> Result<Expense, Error> {
    connection
        .prepare(&format!("{SELECT_EXPENSE} WHERE e.id = ?1"))?
        .query_row([id], map_expense)
        .map_err(|error| error.into())
}

/// Retrieve every expense ordered by year, month and ID.
pub fn get_all_expenses(connection: &Connection) -> Result<Vec<Expense>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_EXPENSE} ORDER BY e.year ASC, e.month ASC, e.id ASC"
        ))?
        .query_map([], map_expense)?
        .map(|maybe_expense| maybe_expense.map_err(|error| error.into()))
        .collect()
}

/// Retrieve the expenses of one year ordered by month and ID.
pub fn get_expenses_for_year(year: i32, connection: &Connection) -> Result<Vec<Expense>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_EXPENSE} WHERE e.year = ?1 ORDER BY e.month ASC, e.id ASC"
        ))?
        .query_map([year], map_expense)?
        .map(|maybe_expense| maybe_expense.map_err(|error| error.into()))
        .collect()
}

/// Retrieve one page of expenses, optionally restricted to a year and month.
pub fn get_expense_page(
    year: Option<i32>,
    month: Option<Month>,
    limit: u64,
    offset: u64,
    connection: &Connection,
) -> Result<Vec<Expense>, Error> {
    let to_sql_int = |field: &'static str, value: u64| {
        i64::try_from(value).map_err(|_| Error::InvalidNumber {
            field,
            value: value.to_string(),
        })
    };
    let limit = to_sql_int("limit", limit)?;
    let offset = to_sql_int("offset", offset)?;

    connection
        .prepare(&format!(
            "{SELECT_EXPENSE}
            WHERE (:year IS NULL OR e.year = :year) AND (:month IS NULL OR e.month = :month)
            ORDER BY e.year ASC, e.month ASC, e.id ASC
            LIMIT :limit OFFSET :offset"
        ))?
        .query_map(
            rusqlite::named_params! {
                ":year": year,
                ":month": month,
                ":limit": limit,
                ":offset": offset,
            },
            map_expense,
        )?
        .map(|maybe_expense| maybe_expense.map_err(|error| error.into()))
        .collect()
}

/// The years that have at least one expense, most recent first.
pub fn get_expense_years(connection: &Connection) -> Result<Vec<i32>, Error> {
    connection
        .prepare("SELECT DISTINCT year FROM expense ORDER BY year DESC")?
        .query_map([], |row| row.get(0))?
        .map(|maybe_year| maybe_year.map_err(|error| error.into()))
        .collect()
}

/// The months of `year` that have at least one expense, in calendar order.
pub fn get_months_for_year(year: i32, connection: &Connection) -> Result<Vec<Month>, Error> {
    connection
        .prepare("SELECT DISTINCT month FROM expense WHERE year = ?1 ORDER BY month ASC")?
        .query_map([year], |row| row.get(0))?
        .map(|maybe_month| maybe_month.map_err(|error| error.into()))
        .collect()
}

/// The total per service for a year, or for one month of that year.
///
/// Services are listed in the order their first expense was recorded.
pub fn get_totals_by_service(
    year: i32,
    month: Option<Month>,
    connection: &Connection,
) -> Result<Vec<ServiceTotal>, Error> {
    connection
        .prepare(
            "SELECT s.name, SUM(e.amount) FROM expense e
            INNER JOIN service s ON s.id = e.service_id
            WHERE e.year = :year AND (:month IS NULL OR e.month = :month)
            GROUP BY s.id ORDER BY MIN(e.id) ASC",
        )?
        .query_map(
            rusqlite::named_params! { ":year": year, ":month": month },
            |row| {
                Ok(ServiceTotal {
                    service_name: row.get(0)?,
                    total: row.get(1)?,
                })
            },
        )?
        .map(|maybe_total| maybe_total.map_err(|error| error.into()))
        .collect()
}

/// The total per year and service.
pub fn get_annual_totals(connection: &Connection) -> Result<Vec<AnnualServiceTotal>, Error> {
    connection
        .prepare(
            "SELECT e.year, s.name, SUM(e.amount) FROM expense e
            INNER JOIN service s ON s.id = e.service_id
            GROUP BY e.year, s.id ORDER BY e.year ASC, MIN(e.id) ASC",
        )?
        .query_map([], |row| {
            Ok(AnnualServiceTotal {
                year: row.get(0)?,
                service_name: row.get(1)?,
                total: row.get(2)?,
            })
        })?
        .map(|maybe_total| maybe_total.map_err(|error| error.into()))
        .collect()
}

/// The total per year across all services.
pub fn get_global_annual_totals(connection: &Connection) -> Result<Vec<YearTotal>, Error> {
    connection
        .prepare("SELECT year, SUM(amount) FROM expense GROUP BY year ORDER BY year ASC")?
        .query_map([], |row| {
            Ok(YearTotal {
                year: row.get(0)?,
                total: row.get(1)?,
            })
        })?
        .map(|maybe_total| maybe_total.map_err(|error| error.into()))
        .collect()
}

/// The total per year, month and service.
pub fn get_monthly_totals(connection: &Connection) -> Result<Vec<MonthlyServiceTotal>, Error> {
    connection
        .prepare(
            "SELECT e.year, e.month, s.name, SUM(e.amount) FROM expense e
            INNER JOIN service s ON s.id = e.service_id
            GROUP BY e.year, e.month, s.id
            ORDER BY e.year ASC, e.month ASC, MIN(e.id) ASC",
        )?
        .query_map([], |row| {
            Ok(MonthlyServiceTotal {
                year: row.get(0)?,
                month: row.get(1)?,
                service_name: row.get(2)?,
                total: row.get(3)?,
            })
        })?
        .map(|maybe_total| maybe_total.map_err(|error| error.into()))
        .collect()
}

/// Copy the services used in `base_year` into the following `year_count` years.
///
/// For every service with at least one expense in `base_year`, a zero amount
/// expense is added to each month of the following years unless that service
/// already has an expense in that month. Returns the number of expenses added.
pub fn extend_years(
    base_year: i32,
    year_count: u32,
    connection: &Connection,
) -> Result<usize, Error> {
    let transaction = connection.unchecked_transaction()?;

    let service_ids = transaction
        .prepare("SELECT DISTINCT service_id FROM expense WHERE year = ?1 ORDER BY service_id")?
        .query_map([base_year], |row| row.get::<_, ServiceId>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    let mut inserted = 0;
    {
        let mut insert = transaction.prepare(
            "INSERT INTO expense (service_id, year, month, amount)
            SELECT ?1, ?2, ?3, 0
            WHERE NOT EXISTS (
                SELECT 1 FROM expense WHERE service_id = ?1 AND year = ?2 AND month = ?3
            )",
        )?;

        for year in (base_year + 1)..=(base_year + year_count as i32) {
            for month in Month::all() {
                for service_id in &service_ids {
                    inserted += insert.execute(params![service_id, year, month])?;
                }
            }
        }
    }

    transaction.commit()?;

    Ok(inserted)
}

fn map_expense_row(row: &Row) -> Result<ExpenseRow, rusqlite::Error> {
    Ok(ExpenseRow {
        id: row.get(0)?,
        service_id: row.get(1)?,
        year: row.get(2)?,
        month: row.get(3)?,
        amount: row.get(4)?,
    })
}

fn map_expense(row: &Row) -> Result<Expense, rusqlite::Error> {
    Ok(Expense {
        id: row.get(0)?,
        service_id: row.get(1)?,
        service_name: row.get(2)?,
        year: row.get(3)?,
        month: row.get(4)?,
        amount: row.get(5)?,
    })
}

fn map_foreign_key_error(error: rusqlite::Error, service_id: ServiceId) -> Error {
    match error {
        rusqlite::Error::SqliteFailure(sql_error, _)
            if sql_error.extended_code == SQLITE_CONSTRAINT_FOREIGNKEY =>
        {
            Error::UnknownService(service_id)
        }
        error => error.into(),
    }
}
