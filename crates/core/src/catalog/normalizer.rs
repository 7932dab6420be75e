use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::catalog::classify::ClassificationThresholds;
use crate::domain::plan::{
    format_data, format_validity, CheckoutPriceId, CountryCode, Plan, PlanId, PlanOrigin, Price,
};
use crate::errors::DomainError;

const DEFAULT_DATA_UNIT: &str = "GB";
const DEFAULT_CURRENCY: &str = "USD";
const PARTNER_ID_PREFIX: &str = "partner";
const IDENTIFIER_SUFFIX_LEN: usize = 8;

/// Partner feed record as delivered, before validation.
#[derive(Clone, Debug, Deserialize)]
pub struct PartnerPlanRecord {
    pub identifier: String,
    #[serde(default)]
    pub name: Option<String>,
    pub data_limit: PartnerDataLimit,
    #[serde(default)]
    pub duration: Option<PartnerDuration>,
    pub price: PartnerPrice,
    #[serde(default)]
    pub is_unlimited: Option<bool>,
    pub covered_countries: Vec<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PartnerDataLimit {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub is_unlimited: Option<bool>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PartnerDuration {
    #[serde(default)]
    pub amount: Option<u32>,
    #[serde(default)]
    pub unit: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PartnerPrice {
    pub amount_with_tax: i64,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub identifier: Option<String>,
}

/// A partner record that passed validation; normalizing it cannot fail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatedPartnerPlan {
    pub identifier: String,
    pub name: Option<String>,
    pub data_amount: Decimal,
    pub data_unit: String,
    pub validity_days: u32,
    pub amount_with_tax: i64,
    pub currency: String,
    pub price_identifier: Option<CheckoutPriceId>,
    pub is_unlimited: bool,
    pub covered_countries: Vec<CountryCode>,
}

impl PartnerPlanRecord {
    pub fn validate(self) -> Result<ValidatedPartnerPlan, DomainError> {
        let identifier = self.identifier.trim().to_string();
        if identifier.is_empty() {
            return Err(malformed("<missing>", "identifier is empty"));
        }

        if self.data_limit.amount.is_sign_negative() {
            return Err(malformed(&identifier, "data_limit.amount is negative"));
        }

        if self.price.amount_with_tax < 0 {
            return Err(malformed(&identifier, "price.amount_with_tax is negative"));
        }

        if self.covered_countries.is_empty() {
            return Err(malformed(&identifier, "covered_countries is empty"));
        }

        let mut covered_countries: Vec<CountryCode> =
            Vec::with_capacity(self.covered_countries.len());
        for raw in &self.covered_countries {
            let code = CountryCode::parse(raw)
                .map_err(|error| malformed(&identifier, &error.to_string()))?;
            if !covered_countries.contains(&code) {
                covered_countries.push(code);
            }
        }

        let data_unit = non_blank(self.data_limit.unit).unwrap_or_else(|| DEFAULT_DATA_UNIT.into());
        let currency = non_blank(self.price.currency).unwrap_or_else(|| DEFAULT_CURRENCY.into());
        let validity_days = self.duration.and_then(|duration| duration.amount).unwrap_or(0);
        let is_unlimited = self.is_unlimited.or(self.data_limit.is_unlimited).unwrap_or(false);

        Ok(ValidatedPartnerPlan {
            identifier,
            name: non_blank(self.name),
            data_amount: self.data_limit.amount,
            data_unit,
            validity_days,
            amount_with_tax: self.price.amount_with_tax,
            currency: currency.to_ascii_uppercase(),
            price_identifier: self.price.identifier.as_deref().and_then(CheckoutPriceId::new),
            is_unlimited,
            covered_countries,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

fn malformed(identifier: &str, reason: &str) -> DomainError {
    DomainError::MalformedRecord { identifier: identifier.to_string(), reason: reason.to_string() }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SkippedRecord {
    pub identifier: Option<String>,
    pub reason: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NormalizationReport {
    pub plans: Vec<Plan>,
    pub skipped: Vec<SkippedRecord>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct PlanNormalizer {
    thresholds: ClassificationThresholds,
}

impl PlanNormalizer {
    pub fn new(thresholds: ClassificationThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> ClassificationThresholds {
        self.thresholds
    }

    pub fn parse(&self, value: Value) -> Result<ValidatedPartnerPlan, DomainError> {
        let identifier = record_identifier(&value).unwrap_or_else(|| "<missing>".to_string());
        let record: PartnerPlanRecord = serde_json::from_value(value)
            .map_err(|error| malformed(&identifier, &error.to_string()))?;
        record.validate()
    }

    pub fn normalize(&self, record: &ValidatedPartnerPlan) -> Plan {
        let data = format_data(record.data_amount, &record.data_unit);
        let country_count = record.covered_countries.len();

        Plan {
            id: synthetic_plan_id(record),
            identifier: Some(record.identifier.clone()),
            name: record.name.clone().unwrap_or_else(|| {
                format!("{data} {}", format_validity(record.validity_days))
            }),
            data_amount: record.data_amount,
            data_unit: record.data_unit.clone(),
            data,
            validity_days: record.validity_days,
            validity: format_validity(record.validity_days),
            price: Price {
                amount_with_tax: record.amount_with_tax,
                currency: record.currency.clone(),
                identifier: record.price_identifier.clone(),
            },
            covered_countries: record.covered_countries.clone(),
            region: Some(self.thresholds.region(&record.covered_countries)),
            plan_type: self.thresholds.plan_type(country_count),
            is_unlimited: record.is_unlimited,
            source: PlanOrigin::ThirdParty,
        }
    }

    pub fn normalize_value(&self, value: Value) -> Result<Plan, DomainError> {
        self.parse(value).map(|record| self.normalize(&record))
    }

    /// Normalizes every record it can; malformed records are logged and
    /// reported, never fatal to the batch.
    pub fn normalize_batch(&self, items: Vec<Value>) -> NormalizationReport {
        let mut report = NormalizationReport::default();

        for item in items {
            let identifier = record_identifier(&item);
            match self.normalize_value(item) {
                Ok(plan) => report.plans.push(plan),
                Err(error) => {
                    warn!(
                        event_name = "catalog.normalize.skipped",
                        identifier = identifier.as_deref().unwrap_or("<missing>"),
                        error = %error,
                        "skipping malformed partner plan record"
                    );
                    report.skipped.push(SkippedRecord { identifier, reason: error.to_string() });
                }
            }
        }

        report
    }
}

fn record_identifier(value: &Value) -> Option<String> {
    value.get("identifier").and_then(Value::as_str).map(str::to_string)
}

/// `partner-{us|multi}-{amount}{unit}-{days}d-{last 8 chars of identifier}`.
pub fn synthetic_plan_id(record: &ValidatedPartnerPlan) -> PlanId {
    let marker = match record.covered_countries.as_slice() {
        [single] => single.as_str().to_ascii_lowercase(),
        _ => "multi".to_string(),
    };

    let chars: Vec<char> = record.identifier.chars().collect();
    let suffix: String =
        chars[chars.len().saturating_sub(IDENTIFIER_SUFFIX_LEN)..].iter().collect();

    PlanId(format!(
        "{PARTNER_ID_PREFIX}-{marker}-{}{}-{}d-{suffix}",
        record.data_amount.normalize(),
        record.data_unit.to_ascii_lowercase(),
        record.validity_days,
    ))
}
