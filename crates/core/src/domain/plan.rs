use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;
use crate::taxonomy::Region;

/// Canonical plan identifier. Used for list keys and lookups, never for checkout.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlanId(pub String);

/// Token the payment processor expects in its checkout URL.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CheckoutPriceId(pub String);

impl fmt::Display for PlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl CheckoutPriceId {
    /// Trimmed token, or `None` when nothing usable remains.
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Uppercase ISO 3166-1 alpha-2 code.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CountryCode(String);

impl CountryCode {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        let valid = trimmed.len() == 2 && trimmed.chars().all(|ch| ch.is_ascii_alphabetic());
        if !valid {
            return Err(DomainError::InvalidCountryCode(raw.to_string()));
        }

        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CountryCode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CountryCode> for String {
    fn from(value: CountryCode) -> Self {
        value.0
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanType {
    Country,
    Regional,
    Global,
}

/// Where a plan came from. Serialized as `local` / `thirdParty`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlanOrigin {
    Local,
    ThirdParty,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Minor currency units, tax included.
    pub amount_with_tax: i64,
    pub currency: String,
    #[serde(
        default,
        deserialize_with = "deserialize_price_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub identifier: Option<CheckoutPriceId>,
}

fn deserialize_price_id<'de, D>(deserializer: D) -> Result<Option<CheckoutPriceId>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(CheckoutPriceId::new))
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub id: PlanId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub data_amount: Decimal,
    pub data_unit: String,
    pub data: String,
    pub validity_days: u32,
    pub validity: String,
    pub price: Price,
    pub covered_countries: Vec<CountryCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<Region>,
    #[serde(rename = "planType", default, skip_serializing_if = "Option::is_none")]
    pub plan_type: Option<PlanType>,
    #[serde(default)]
    pub is_unlimited: bool,
    pub source: PlanOrigin,
}

impl Plan {
    pub fn covers(&self, country: &CountryCode) -> bool {
        self.covered_countries.iter().any(|covered| covered == country)
    }

    pub fn is_single_country(&self) -> bool {
        self.covered_countries.len() == 1
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanCollection {
    pub items: Vec<Plan>,
}

impl PlanCollection {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

pub fn format_data(amount: Decimal, unit: &str) -> String {
    format!("{}{unit}", amount.normalize())
}

pub fn format_validity(days: u32) -> String {
    format!("{days} days")
}
