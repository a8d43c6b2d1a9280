//! Application configuration: the category set offered to users and the
//! per-category monthly budgets that drive overspending alerts.
//!
//! The core treats this as a read-only mapping; it is populated once at
//! start-up from the server's command line arguments.

use std::collections::HashMap;

use crate::{Error, models::CategoryName, models::dollars_to_cents};

/// The categories offered when no others are configured.
const DEFAULT_CATEGORIES: [&str; 6] = [
    "groceries",
    "utilities",
    "transport",
    "entertainment",
    "housing",
    "other",
];

/// Monthly spending budgets per category, in integer cents.
///
/// Categories without a configured budget never produce alerts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryBudgets(HashMap<String, i64>);

impl CategoryBudgets {
    /// The configured monthly budget for `category` in cents, if any.
    pub fn budget_cents(&self, category: &CategoryName) -> Option<i64> {
        self.0.get(category.as_ref()).copied()
    }

    /// Set the monthly budget for a category, in cents.
    pub fn set(&mut self, category: CategoryName, budget_cents: i64) {
        self.0.insert(category.as_ref().to_string(), budget_cents);
    }
}

/// Parse a budget specification of the form `category=dollars`, e.g.
/// `groceries=500` or `transport=79.50`.
///
/// # Errors
/// Returns [Error::EmptyCategory] when the category part is empty and
/// [Error::NonPositiveAmount] when the amount is missing, malformed, zero or
/// negative.
pub fn parse_budget_spec(spec: &str) -> Result<(CategoryName, i64), Error> {
    let (category, amount) = spec.split_once('=').ok_or(Error::NonPositiveAmount(0))?;
    let category = CategoryName::new(category.trim())?;

    let dollars: f64 = amount
        .trim()
        .parse()
        .map_err(|_| Error::NonPositiveAmount(0))?;
    let budget_cents = dollars_to_cents(dollars);

    if budget_cents <= 0 {
        return Err(Error::NonPositiveAmount(budget_cents));
    }

    Ok((category, budget_cents))
}

/// The application's read-only configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// The fixed set of categories offered when recording an expense.
    pub categories: Vec<CategoryName>,
    /// The monthly budgets that drive overspending alerts.
    pub budgets: CategoryBudgets,
}

impl AppConfig {
    /// Create a config with the given budgets and the default category set.
    pub fn new(budgets: CategoryBudgets) -> Self {
        Self {
            categories: DEFAULT_CATEGORIES
                .iter()
                .map(|name| CategoryName::new_unchecked(name))
                .collect(),
            budgets,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new(CategoryBudgets::default())
    }
}
