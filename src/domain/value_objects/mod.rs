//! Value Objects for the storefront

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Money in integer minor units (cents) of a single currency.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    amount: i64,
    currency: String,
}

impl Money {
    pub fn new(amount: i64, currency: &str) -> Self {
        Self { amount, currency: currency.to_string() }
    }

    pub fn aud(amount: i64) -> Self {
        Self::new(amount, "AUD")
    }

    pub fn zero(currency: &str) -> Self {
        Self::new(0, currency)
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Major units with two decimals, e.g. `110.00`.
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.amount, 2)
    }

    /// Storefront display format: `$110.00`.
    pub fn display(&self) -> String {
        format!("${}", self.to_decimal())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.to_decimal(), self.currency)
    }
}

/// GST is included in every price at a flat 10%.
pub fn gst_rate() -> Decimal {
    Decimal::new(1, 1)
}

/// Breakdown of a tax-inclusive total.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OrderTotals {
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
}

impl OrderTotals {
    /// tax = total x 10% (rounded to the cent), subtotal = total - tax.
    pub fn from_tax_inclusive(total: Money) -> Self {
        let tax = (Decimal::from(total.amount()) * gst_rate())
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        let tax_amount = i64::try_from(tax).unwrap_or_default();
        let tax = Money::new(tax_amount, total.currency());
        let subtotal = Money::new(total.amount() - tax_amount, total.currency());
        Self { subtotal, tax, total }
    }
}

/// URL slug derived from a display name: lower case, spaces become `-`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slug(String);

impl Slug {
    pub fn from_name(name: &str) -> Self {
        Self(name.to_lowercase().replace(' ', "-"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive match against a slug taken from a request path.
    pub fn matches(&self, raw: &str) -> bool {
        self.0 == raw.to_lowercase()
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
