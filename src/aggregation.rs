//! Expense aggregation for tables and charts.
//!
//! Every function here is a pure transformation of a list of [Expense]s.
//! Services are always listed in the order they first appear in the input
//! so that table columns and chart series stay put between renders.


use crate::{
    Error,
    amount::Amount,
    expense::{Expense, Month},
    service::display_name,
};

/// Totals per service name, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceTotals {
    entries: Vec<(String, Amount)>,
}

impl ServiceTotals {
    /// Totals of zero for each of `services`.
    pub fn zeroed(services: &[String]) -> Self {
        Self {
            entries: services
                .iter()
                .map(|name| (name.clone(), Amount::zero()))
                .collect(),
        }
    }

    /// Add `amount` to the total for `service`, appending it if it is new.
    pub fn add(&mut self, service: &str, amount: Amount) {
        match self.entries.iter_mut().find(|(name, _)| name == service) {
            Some((_, total)) => *total += amount,
            None => self.entries.push((service.to_owned(), amount)),
        }
    }

    /// The total for `service`, zero if it has no expenses.
    pub fn get(&self, service: &str) -> Amount {
        self.entries
            .iter()
            .find(|(name, _)| name == service)
            .map(|(_, total)| *total)
            .unwrap_or_default()
    }

    /// The sum over all services.
    pub fn total(&self) -> Amount {
        self.entries.iter().map(|(_, total)| total).sum()
    }

    /// Iterate over `(service, total)` pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Amount)> {
        self.entries.iter().map(|(name, total)| (name.as_str(), *total))
    }
}

/// The totals of one year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnualTotal {
    pub year: i32,
    pub totals: ServiceTotals,
}

/// Totals per year and service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearServiceMatrix {
    /// Every service in the input, in first-seen order.
    pub services: Vec<String>,
    /// One row per year with expenses, oldest first.
    pub years: Vec<AnnualTotal>,
}

/// The totals of one month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyTotal {
    pub year: i32,
    pub month: Month,
    pub totals: ServiceTotals,
}

impl MonthlyTotal {
    /// The sum over all services for the month.
    pub fn total_for_month(&self) -> Amount {
        self.totals.total()
    }
}

/// Totals per month and service for a single year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthServiceMatrix {
    pub year: i32,
    /// Every service in the input, in first-seen order.
    pub services: Vec<String>,
    /// Always twelve rows, January first.
    pub months: Vec<MonthlyTotal>,
}

impl MonthServiceMatrix {
    /// The yearly total for each service.
    pub fn service_totals(&self) -> ServiceTotals {
        let mut totals = ServiceTotals::zeroed(&self.services);

        for month in &self.months {
            for (service, amount) in month.totals.iter() {
                totals.add(service, amount);
            }
        }

        totals
    }

    /// The sum over all months and services.
    pub fn grand_total(&self) -> Amount {
        self.months.iter().map(MonthlyTotal::total_for_month).sum()
    }

    /// The month totals of one service, January first.
    pub fn series(&self, service: &str) -> Vec<Amount> {
        self.months
            .iter()
            .map(|month| month.totals.get(service))
            .collect()
    }
}

/// The distinct service names in `expenses`, in first-seen order.
pub fn services_in_order(expenses: &[Expense]) -> Vec<String> {
    let mut services: Vec<String> = Vec::new();

    for expense in expenses {
        if !services.contains(&expense.service_name) {
            services.push(expense.service_name.clone());
        }
    }

    services
}

/// Sum the expenses per year and service.
///
/// Every year row carries every service, with zero where the service has no
/// expenses in that year.
pub fn year_service_matrix(expenses: &[Expense]) -> YearServiceMatrix {
    let services = services_in_order(expenses);

    let mut years: Vec<i32> = expenses.iter().map(|expense| expense.year).collect();
    years.sort_unstable();
    years.dedup();

    let years = years
        .into_iter()
        .map(|year| {
            let mut totals = ServiceTotals::zeroed(&services);

            for expense in expenses.iter().filter(|expense| expense.year == year) {
                totals.add(&expense.service_name, expense.amount);
            }

            AnnualTotal { year, totals }
        })
        .collect();

    YearServiceMatrix { services, years }
}

/// Sum the expenses of `year` per month and service.
///
/// The result always has twelve rows. The columns are the services seen
/// anywhere in `expenses`, even those without expenses in `year`.
pub fn month_service_matrix(year: i32, expenses: &[Expense]) -> MonthServiceMatrix {
    let services = services_in_order(expenses);

    let months = Month::all()
        .map(|month| {
            let mut totals = ServiceTotals::zeroed(&services);

            for expense in expenses
                .iter()
                .filter(|expense| expense.year == year && expense.month == month)
            {
                totals.add(&expense.service_name, expense.amount);
            }

            MonthlyTotal {
                year,
                month,
                totals,
            }
        })
        .collect();

    MonthServiceMatrix {
        year,
        services,
        months,
    }
}

/// Filters for searching the expense list. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchCriteria {
    /// Part of the raw or human readable service name, ignoring case.
    pub service_name: Option<String>,
    pub year: Option<i32>,
    pub month: Option<Month>,
    /// Inclusive lower bound on the amount.
    pub min_amount: Option<Amount>,
    /// Inclusive upper bound on the amount.
    pub max_amount: Option<Amount>,
}

impl SearchCriteria {
    /// Create search criteria.
    ///
    /// # Errors
    /// Returns [Error::InvalidAmountRange] if `min_amount` is greater than `max_amount`.
    pub fn new(
        service_name: Option<String>,
        year: Option<i32>,
        month: Option<Month>,
        min_amount: Option<Amount>,
        max_amount: Option<Amount>,
    ) -> Result<Self, Error> {
        if let (Some(min), Some(max)) = (min_amount, max_amount)
            && min > max
        {
            return Err(Error::InvalidAmountRange { min, max });
        }

        let service_name = service_name
            .map(|name| name.trim().to_owned())
            .filter(|name| !name.is_empty());

        Ok(Self {
            service_name,
            year,
            month,
            min_amount,
            max_amount,
        })
    }

    /// Whether `expense` satisfies every filter.
    pub fn matches(&self, expense: &Expense) -> bool {
        let service_matches = self.service_name.as_ref().is_none_or(|needle| {
            let needle = needle.to_lowercase();

            expense.service_name.to_lowercase().contains(&needle)
                || display_name(&expense.service_name)
                    .to_lowercase()
                    .contains(&needle)
        });

        service_matches
            && self.year.is_none_or(|year| expense.year == year)
            && self.month.is_none_or(|month| expense.month == month)
            && self.min_amount.is_none_or(|min| expense.amount >= min)
            && self.max_amount.is_none_or(|max| expense.amount <= max)
    }
}

/// The expenses matching `criteria`, in input order.
pub fn search(expenses: &[Expense], criteria: &SearchCriteria) -> Vec<Expense> {
    expenses
        .iter()
        .filter(|expense| criteria.matches(expense))
        .cloned()
        .collect()
}
