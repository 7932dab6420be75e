use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::catalog::classify::ClassificationThresholds;
use crate::catalog::normalizer::SkippedRecord;
use crate::domain::plan::{
    format_data, format_validity, CountryCode, Plan, PlanId, PlanOrigin, PlanType, Price,
};
use crate::errors::DomainError;
use crate::taxonomy::Region;

/// Curated catalog entry. Already in canonical shape; display strings and
/// classification may be omitted by operators.
#[derive(Clone, Debug, Deserialize)]
pub struct LocalPlanRecord {
    pub id: PlanId,
    #[serde(default)]
    pub identifier: Option<String>,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub data_amount: Decimal,
    pub data_unit: String,
    #[serde(default)]
    pub data: Option<String>,
    pub validity_days: u32,
    #[serde(default)]
    pub validity: Option<String>,
    pub price: Price,
    pub covered_countries: Vec<CountryCode>,
    #[serde(default)]
    pub region: Option<Region>,
    #[serde(rename = "planType", default)]
    pub plan_type: Option<PlanType>,
    #[serde(default)]
    pub is_unlimited: bool,
}

impl LocalPlanRecord {
    /// Tags the record as `local`. Supplied classification is kept as given;
    /// only a missing plan type is derived from coverage.
    pub fn into_plan(self, thresholds: &ClassificationThresholds) -> Plan {
        let plan_type =
            self.plan_type.or_else(|| thresholds.plan_type(self.covered_countries.len()));

        Plan {
            data: self.data.unwrap_or_else(|| format_data(self.data_amount, &self.data_unit)),
            validity: self.validity.unwrap_or_else(|| format_validity(self.validity_days)),
            id: self.id,
            identifier: self.identifier,
            name: self.name,
            data_amount: self.data_amount,
            data_unit: self.data_unit,
            validity_days: self.validity_days,
            price: self.price,
            covered_countries: self.covered_countries,
            region: self.region,
            plan_type,
            is_unlimited: self.is_unlimited,
            source: PlanOrigin::Local,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LocalTaggingReport {
    pub plans: Vec<Plan>,
    pub skipped: Vec<SkippedRecord>,
}

pub fn tag_local_plans(
    items: Vec<Value>,
    thresholds: &ClassificationThresholds,
) -> LocalTaggingReport {
    let mut report = LocalTaggingReport::default();

    for item in items {
        let id = item.get("id").and_then(Value::as_str).map(str::to_string);
        match serde_json::from_value::<LocalPlanRecord>(item) {
            Ok(record) => report.plans.push(record.into_plan(thresholds)),
            Err(error) => {
                let error = DomainError::MalformedRecord {
                    identifier: id.clone().unwrap_or_else(|| "<missing>".to_string()),
                    reason: error.to_string(),
                };
                warn!(
                    event_name = "catalog.local.skipped",
                    plan_id = id.as_deref().unwrap_or("<missing>"),
                    error = %error,
                    "skipping malformed local plan record"
                );
                report.skipped.push(SkippedRecord { identifier: id, reason: error.to_string() });
            }
        }
    }

    report
}
