//! Core expense domain types.

use std::fmt::Display;

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    amount::Amount,
    config::YearBounds,
    service::{ServiceId, display_name},
};

/// Database identifier for an expense.
pub type ExpenseId = i64;

const MONTH_NAMES: [&str; 12] = [
    "Enero",
    "Febrero",
    "Marzo",
    "Abril",
    "Mayo",
    "Junio",
    "Julio",
    "Agosto",
    "Septiembre",
    "Octubre",
    "Noviembre",
    "Diciembre",
];

/// A month of the year, 1 (January) to 12 (December).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Month(u8);

impl Month {
    /// Create a month from its number.
    ///
    /// # Errors
    /// Returns [Error::InvalidMonth] if `number` is not in 1..=12.
    pub fn new(number: i64) -> Result<Self, Error> {
        if (1..=12).contains(&number) {
            Ok(Self(number as u8))
        } else {
            Err(Error::InvalidMonth(number))
        }
    }

    /// The month number, 1 to 12.
    pub fn number(&self) -> u8 {
        self.0
    }

    /// The Spanish name of the month, e.g. "Marzo".
    pub fn name(&self) -> &'static str {
        MONTH_NAMES[usize::from(self.0 - 1)]
    }

    /// The first three letters of the month name, e.g. "Mar".
    pub fn short_name(&self) -> &'static str {
        &self.name()[..3]
    }

    /// All twelve months in calendar order.
    pub fn all() -> impl Iterator<Item = Month> {
        (1..=12).map(Month)
    }
}

impl Display for Month {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl TryFrom<i64> for Month {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Month::new(value)
    }
}

impl From<Month> for u8 {
    fn from(month: Month) -> Self {
        month.0
    }
}

impl ToSql for Month {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(i64::from(self.0).into())
    }
}

impl FromSql for Month {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let number = i64::column_result(value)?;

        Month::new(number).map_err(|_| FromSqlError::OutOfRange(number))
    }
}

/// An expense that has not been saved yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExpense {
    /// The service the expense is attributed to.
    #[serde(rename = "servicio_id")]
    pub service_id: ServiceId,
    /// The year the expense belongs to.
    #[serde(rename = "año", alias = "anio")]
    pub year: i32,
    /// The month the expense belongs to.
    #[serde(rename = "mes")]
    pub month: Month,
    /// How much was spent.
    #[serde(rename = "importe")]
    pub amount: Amount,
}

impl NewExpense {
    /// Check the year and amount range rules.
    ///
    /// The service ID is checked separately against the known services.
    pub fn validate(&self, year_bounds: &YearBounds) -> Result<(), Error> {
        year_bounds.check(i64::from(self.year))?;

        if self.amount.is_negative() {
            return Err(Error::NegativeAmount(self.amount));
        }
        self.amount.within_limit()?;

        Ok(())
    }
}

/// An expense as stored, without the name of its service.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseRow {
    pub id: ExpenseId,
    pub service_id: ServiceId,
    pub year: i32,
    pub month: Month,
    pub amount: Amount,
}

impl ExpenseRow {
    /// Attach the name of the expense's service.
    pub fn with_service_name(self, service_name: String) -> Expense {
        Expense {
            id: self.id,
            service_id: self.service_id,
            service_name,
            year: self.year,
            month: self.month,
            amount: self.amount,
        }
    }
}

/// An expense joined with the name of its service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// The ID of the expense.
    pub id: ExpenseId,
    /// The service the expense is attributed to.
    #[serde(rename = "servicio_id")]
    pub service_id: ServiceId,
    /// The raw name of the service.
    #[serde(rename = "servicio_nombre")]
    pub service_name: String,
    /// The year the expense belongs to.
    #[serde(rename = "año")]
    pub year: i32,
    /// The month the expense belongs to.
    #[serde(rename = "mes")]
    pub month: Month,
    /// How much was spent.
    #[serde(rename = "importe")]
    pub amount: Amount,
}

impl Expense {
    /// The human readable name of the expense's service.
    pub fn service_display_name(&self) -> String {
        display_name(&self.service_name)
    }
}

/// The raw fields of the expense form.
///
/// All fields are text so that missing or malformed values can be reported
/// to the user instead of rejecting the request outright.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpenseForm {
    pub service_id: String,
    pub year: String,
    pub month: String,
    pub amount: String,
}

impl ExpenseForm {
    /// Parse and range check the form.
    ///
    /// # Errors
    /// Returns the first validation error found, checking the fields in the
    /// order they appear on the form.
    pub fn validate(&self, year_bounds: &YearBounds) -> Result<NewExpense, Error> {
        let service_id = parse_whole_number("servicio", &self.service_id)?;
        let year = year_bounds.check(parse_whole_number("año", &self.year)?)?;
        let month = Month::new(parse_whole_number("mes", &self.month)?)?;

        if self.amount.trim().is_empty() {
            return Err(Error::MissingField("importe"));
        }
        let amount = Amount::parse(&self.amount)?;

        let new_expense = NewExpense {
            service_id,
            year,
            month,
            amount,
        };
        new_expense.validate(year_bounds)?;

        Ok(new_expense)
    }
}

/// Parse a required whole number form field.
pub(crate) fn parse_whole_number(field: &'static str, value: &str) -> Result<i64, Error> {
    let value = value.trim();

    if value.is_empty() {
        return Err(Error::MissingField(field));
    }

    value.parse().map_err(|_| Error::InvalidNumber {
        field,
        value: value.to_owned(),
    })
}


#[cfg(test)]
mod expense_form_tests {
    use crate::{
        Error,
        amount::Amount,
        config::YearBounds,
        expense::{ExpenseForm, Month, NewExpense},
    };

    const BOUNDS: YearBounds = YearBounds {
        min: 2000,
        max: 2035,
    };

    fn form(service_id: &str, year: &str, month: &str, amount: &str) -> ExpenseForm {
        ExpenseForm {
            service_id: service_id.to_owned(),
            year: year.to_owned(),
            month: month.to_owned(),
            amount: amount.to_owned(),
        }
    }

    #[test]
    fn validates_complete_form() {
        let got = form("1", "2024", "3", "100.00").validate(&BOUNDS);

        assert_eq!(
            got,
            Ok(NewExpense {
                service_id: 1,
                year: 2024,
                month: Month::new(3).unwrap(),
                amount: Amount::from_cents(10_000),
            })
        );
    }

    #[test]
    fn reports_missing_fields() {
        assert_eq!(
            form("", "2024", "3", "1").validate(&BOUNDS),
            Err(Error::MissingField("servicio"))
        );
        assert_eq!(
            form("1", "2024", "3", " ").validate(&BOUNDS),
            Err(Error::MissingField("importe"))
        );
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert_eq!(
            form("1", "1999", "3", "1").validate(&BOUNDS),
            Err(Error::InvalidYear {
                year: 1999,
                min: 2000,
                max: 2035
            })
        );
        assert_eq!(
            form("1", "2024", "13", "1").validate(&BOUNDS),
            Err(Error::InvalidMonth(13))
        );
        assert_eq!(
            form("1", "2024", "3", "-5").validate(&BOUNDS),
            Err(Error::NegativeAmount(Amount::from_cents(-500)))
        );
    }

    #[test]
    fn rejects_amounts_too_large_to_total() {
        assert_eq!(
            form("1", "2024", "3", "50000000000000000").validate(&BOUNDS),
            Err(Error::AmountTooLarge(Amount::from_cents(
                5_000_000_000_000_000_000
            )))
        );

        let new_expense = NewExpense {
            service_id: 1,
            year: 2024,
            month: Month::new(3).unwrap(),
            amount: Amount::from_cents(i64::MAX),
        };
        assert_eq!(
            new_expense.validate(&BOUNDS),
            Err(Error::AmountTooLarge(Amount::from_cents(i64::MAX)))
        );
    }

    #[test]
    fn rejects_non_numeric_year() {
        assert_eq!(
            form("1", "dos mil", "3", "1").validate(&BOUNDS),
            Err(Error::InvalidNumber {
                field: "año",
                value: "dos mil".to_owned()
            })
        );
    }

    #[test]
    fn zero_amount_is_allowed() {
        let got = form("1", "2024", "3", "0").validate(&BOUNDS);

        assert_eq!(got.map(|expense| expense.amount), Ok(Amount::zero()));
    }
}
