use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::plan::{CountryCode, Plan, PlanId};

/// Cheapest offer for a country, as quoted in FAQ and landing copy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LowestPrice {
    pub plan_id: PlanId,
    pub amount_with_tax: i64,
    pub currency: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub data_amount: Decimal,
    pub data_unit: String,
    pub display: String,
}

/// `None` when nothing covers the country; callers choose their own fallback
/// copy. Ties keep the first plan in catalog order.
pub fn lowest_price_for_country(plans: &[Plan], code: &str) -> Option<LowestPrice> {
    let country = CountryCode::parse(code).ok()?;

    let cheapest = plans
        .iter()
        .filter(|plan| plan.covers(&country))
        .reduce(|lowest, candidate| {
            if candidate.price.amount_with_tax < lowest.price.amount_with_tax {
                candidate
            } else {
                lowest
            }
        })?;

    Some(LowestPrice {
        plan_id: cheapest.id.clone(),
        amount_with_tax: cheapest.price.amount_with_tax,
        currency: cheapest.price.currency.clone(),
        data_amount: cheapest.data_amount,
        data_unit: cheapest.data_unit.clone(),
        display: format_minor_units(cheapest.price.amount_with_tax, &cheapest.price.currency),
    })
}

/// `$12.00` for USD, `12.00 EUR` for anything else.
pub fn format_minor_units(amount: i64, currency: &str) -> String {
    let major = Decimal::new(amount, 2);
    if currency.eq_ignore_ascii_case("USD") {
        format!("${major:.2}")
    } else {
        format!("{major:.2} {}", currency.to_ascii_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{format_minor_units, lowest_price_for_country};
    use crate::domain::plan::{CountryCode, Plan, PlanId, PlanOrigin, Price};

    fn plan(id: &str, countries: &[&str], price: i64, currency: &str) -> Plan {
        Plan {
            id: PlanId(id.to_string()),
            identifier: None,
            name: id.to_string(),
            data_amount: Decimal::new(5, 0),
            data_unit: "GB".to_string(),
            data: "5GB".to_string(),
            validity_days: 30,
            validity: "30 days".to_string(),
            price: Price {
                amount_with_tax: price,
                currency: currency.to_string(),
                identifier: None,
            },
            covered_countries: countries
                .iter()
                .map(|code| CountryCode::parse(code).expect("valid code"))
                .collect(),
            region: None,
            plan_type: None,
            is_unlimited: false,
            source: PlanOrigin::ThirdParty,
        }
    }

    #[test]
    fn picks_cheapest_covering_plan() {
        let plans = vec![
            plan("us-10", &["US"], 1500, "USD"),
            plan("na-5", &["US", "CA"], 1200, "USD"),
            plan("ca-1", &["CA"], 300, "USD"),
        ];

        let lowest = lowest_price_for_country(&plans, "us").expect("US is covered");
        assert_eq!(lowest.plan_id.0, "na-5");
        assert_eq!(lowest.amount_with_tax, 1200);
        assert_eq!(lowest.display, "$12.00");
        assert_eq!(lowest.data_unit, "GB");
    }

    #[test]
    fn uncovered_country_has_no_lowest_price() {
        let plans = vec![plan("us-10", &["US"], 1500, "USD")];
        assert_eq!(lowest_price_for_country(&plans, "BG"), None);
        assert_eq!(lowest_price_for_country(&[], "US"), None);
    }

    #[test]
    fn formats_minor_units_per_currency() {
        assert_eq!(format_minor_units(1200, "USD"), "$12.00");
        assert_eq!(format_minor_units(399, "eur"), "3.99 EUR");
        assert_eq!(format_minor_units(5, "USD"), "$0.05");
    }
}
