use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Currency of an account, auxiliary or voucher.
///
/// Every voucher line carries amounts in both currencies; the voucher currency
/// only tells which pair the user typed and which one reports show by default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Bs,
    Usd,
}

impl Currency {
    /// Canonical currency code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Bs => "BS",
            Currency::Usd => "USD",
        }
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "BS" | "BOB" => Ok(Currency::Bs),
            "USD" => Ok(Currency::Usd),
            other => Err(EngineError::InvalidField(format!(
                "unsupported currency: {other}"
            ))),
        }
    }
}

/// Exchange rate snapshot stored on a voucher. Always strictly positive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct ExchangeRate(Decimal);

impl ExchangeRate {
    pub const ONE: ExchangeRate = ExchangeRate(Decimal::ONE);

    pub fn new(value: Decimal) -> Result<Self, EngineError> {
        if value <= Decimal::ZERO {
            return Err(EngineError::InvalidField(
                "exchange_rate must be greater than zero".to_string(),
            ));
        }
        Ok(Self(value.normalize()))
    }

    #[must_use]
    pub const fn value(self) -> Decimal {
        self.0
    }
}

impl Default for ExchangeRate {
    fn default() -> Self {
        Self::ONE
    }
}

impl TryFrom<Decimal> for ExchangeRate {
    type Error = EngineError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ExchangeRate> for Decimal {
    fn from(value: ExchangeRate) -> Self {
        value.0
    }
}

impl FromStr for ExchangeRate {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s.trim()).map_err(|_| {
            EngineError::InvalidField(format!("exchange_rate is not a decimal: {s}"))
        })?;
        Self::new(value)
    }
}

impl core::fmt::Display for ExchangeRate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.0.fmt(f)
    }
}
