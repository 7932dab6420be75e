use std::collections::{BTreeSet, HashMap};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::domain::plan::{CountryCode, Plan, PlanOrigin, PlanType};
use crate::taxonomy::{region_for_country, Region};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanStatistics {
    pub total_plans: usize,
    pub local_plans: usize,
    pub third_party_plans: usize,
    pub countries_covered: usize,
    /// Major currency units, two decimal places.
    #[serde(with = "rust_decimal::serde::float")]
    pub average_price: Decimal,
}

/// Plans covering `code`, matched case-insensitively, in input order. An
/// unparseable code matches nothing.
pub fn filter_by_country(plans: &[Plan], code: &str) -> Vec<Plan> {
    let Ok(country) = CountryCode::parse(code) else {
        return Vec::new();
    };

    plans.iter().filter(|plan| plan.covers(&country)).cloned().collect()
}

/// One offer per (data amount, data unit, validity): the cheapest, or the
/// first seen when prices tie. Offers keep the order in which each
/// combination first appeared.
pub fn dedupe_cheapest(plans: &[Plan]) -> Vec<Plan> {
    let mut offers: Vec<Plan> = Vec::new();
    let mut slots: HashMap<(Decimal, String, u32), usize> = HashMap::new();

    for plan in plans {
        let key = (
            plan.data_amount.normalize(),
            plan.data_unit.to_ascii_uppercase(),
            plan.validity_days,
        );
        match slots.get(&key) {
            Some(&slot) => {
                if plan.price.amount_with_tax < offers[slot].price.amount_with_tax {
                    offers[slot] = plan.clone();
                }
            }
            None => {
                slots.insert(key, offers.len());
                offers.push(plan.clone());
            }
        }
    }

    offers
}

/// Resolves a region slug (`north-america`) or display name (`North America`).
/// The synthetic buckets resolve by name only (`Global`, `Other`).
pub fn resolve_region(region_id_or_name: &str) -> Option<Region> {
    let trimmed = region_id_or_name.trim();
    Region::from_slug(trimmed).or_else(|| Region::from_name(trimmed))
}

/// Union of plans labelled with the region, global plans, and plans covering
/// any country of the region.
pub fn filter_by_region(plans: &[Plan], region_id_or_name: &str) -> Vec<Plan> {
    let mapped = resolve_region(region_id_or_name);

    plans.iter().filter(|plan| matches_region(plan, mapped)).cloned().collect()
}

fn matches_region(plan: &Plan, mapped: Option<Region>) -> bool {
    if plan.plan_type == Some(PlanType::Global) {
        return true;
    }

    let Some(region) = mapped else {
        return false;
    };

    plan.region == Some(region)
        || plan.covered_countries.iter().any(|country| region_for_country(country) == Some(region))
}

pub fn compute_statistics(plans: &[Plan]) -> PlanStatistics {
    let local_plans = plans.iter().filter(|plan| plan.source == PlanOrigin::Local).count();
    let third_party_plans =
        plans.iter().filter(|plan| plan.source == PlanOrigin::ThirdParty).count();

    let countries: BTreeSet<&CountryCode> =
        plans.iter().flat_map(|plan| plan.covered_countries.iter()).collect();

    let average_price = if plans.is_empty() {
        Decimal::ZERO
    } else {
        let total: i64 = plans.iter().map(|plan| plan.price.amount_with_tax).sum();
        (Decimal::from(total) / Decimal::from(plans.len() as u64) / Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    };

    PlanStatistics {
        total_plans: plans.len(),
        local_plans,
        third_party_plans,
        countries_covered: countries.len(),
        average_price,
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{
        compute_statistics, dedupe_cheapest, filter_by_country, filter_by_region, resolve_region,
    };
    use crate::domain::plan::{CountryCode, Plan, PlanId, PlanOrigin, PlanType, Price};
    use crate::taxonomy::Region;

    fn plan(
        id: &str,
        countries: &[&str],
        region: Option<Region>,
        plan_type: Option<PlanType>,
        price: i64,
        source: PlanOrigin,
    ) -> Plan {
        Plan {
            id: PlanId(id.to_string()),
            identifier: None,
            name: id.to_string(),
            data_amount: Decimal::ONE,
            data_unit: "GB".to_string(),
            data: "1GB".to_string(),
            validity_days: 7,
            validity: "7 days".to_string(),
            price: Price { amount_with_tax: price, currency: "USD".to_string(), identifier: None },
            covered_countries: countries
                .iter()
                .map(|code| CountryCode::parse(code).expect("valid code"))
                .collect(),
            region,
            plan_type,
            is_unlimited: false,
            source,
        }
    }

    fn fixture() -> Vec<Plan> {
        vec![
            plan("bg", &["BG"], None, Some(PlanType::Country), 399, PlanOrigin::Local),
            plan(
                "jp",
                &["JP"],
                Some(Region::Asia),
                Some(PlanType::Country),
                799,
                PlanOrigin::ThirdParty,
            ),
            plan(
                "na",
                &["US", "CA", "MX"],
                Some(Region::NorthAmerica),
                Some(PlanType::Regional),
                1200,
                PlanOrigin::ThirdParty,
            ),
            plan(
                "world",
                &["US", "JP", "DE"],
                Some(Region::Global),
                Some(PlanType::Global),
                2500,
                PlanOrigin::ThirdParty,
            ),
        ]
    }

    fn ids(plans: &[Plan]) -> Vec<&str> {
        plans.iter().map(|plan| plan.id.0.as_str()).collect()
    }

    #[test]
    fn country_filter_is_case_insensitive() {
        let plans = fixture();
        assert_eq!(filter_by_country(&plans, "us"), filter_by_country(&plans, "US"));
        assert_eq!(ids(&filter_by_country(&plans, "us")), vec!["na", "world"]);
    }

    #[test]
    fn invalid_country_code_matches_nothing() {
        assert!(filter_by_country(&fixture(), "usa").is_empty());
    }

    #[test]
    fn region_filter_unions_label_global_and_country_membership() {
        let plans = fixture();

        assert_eq!(ids(&filter_by_region(&plans, "north-america")), vec!["na", "world"]);
        assert_eq!(ids(&filter_by_region(&plans, "Europe")), vec!["bg", "world"]);
        assert_eq!(ids(&filter_by_region(&plans, "asia")), vec!["jp", "world"]);
    }

    #[test]
    fn global_plans_appear_in_every_region() {
        let plans = fixture();
        for region in Region::GEOGRAPHIC {
            let slug = region.slug().expect("geographic regions have slugs");
            assert!(ids(&filter_by_region(&plans, slug)).contains(&"world"), "{slug}");
        }
        assert_eq!(ids(&filter_by_region(&plans, "atlantis")), vec!["world"]);
    }

    #[test]
    fn resolves_slugs_and_display_names() {
        assert_eq!(resolve_region("south-america"), Some(Region::SouthAmerica));
        assert_eq!(resolve_region("South America"), Some(Region::SouthAmerica));
        assert_eq!(resolve_region("global"), Some(Region::Global));
        assert_eq!(resolve_region("Other"), Some(Region::Other));
        assert_eq!(resolve_region("atlantis"), None);
    }

    #[test]
    fn synthetic_region_names_match_plans_labelled_with_them() {
        let mut plans = fixture();
        plans.push(plan(
            "multi",
            &["BR", "FR"],
            Some(Region::Global),
            Some(PlanType::Regional),
            900,
            PlanOrigin::Local,
        ));
        plans.push(plan(
            "xk",
            &["XK"],
            Some(Region::Other),
            Some(PlanType::Country),
            500,
            PlanOrigin::Local,
        ));

        assert_eq!(ids(&filter_by_region(&plans, "Global")), vec!["world", "multi"]);
        assert_eq!(ids(&filter_by_region(&plans, "other")), vec!["world", "xk"]);
    }

    fn offer(id: &str, amount: i64, unit: &str, days: u32, price: i64) -> Plan {
        let mut offer = plan(id, &["TR"], None, Some(PlanType::Country), price, PlanOrigin::Local);
        offer.data_amount = Decimal::from(amount);
        offer.data_unit = unit.to_string();
        offer.validity_days = days;
        offer
    }

    #[test]
    fn dedupe_keeps_cheapest_offer_per_data_and_validity() {
        let plans = vec![
            offer("a-1gb-7d", 1, "GB", 7, 500),
            offer("b-3gb-30d", 3, "GB", 30, 1200),
            offer("c-1gb-7d", 1, "gb", 7, 450),
            offer("d-1gb-30d", 1, "GB", 30, 700),
            offer("e-3gb-30d", 3, "GB", 30, 1300),
        ];

        assert_eq!(ids(&dedupe_cheapest(&plans)), vec!["c-1gb-7d", "b-3gb-30d", "d-1gb-30d"]);
    }

    #[test]
    fn dedupe_price_tie_keeps_first_seen() {
        let plans = vec![
            offer("first", 5, "GB", 30, 1000),
            offer("second", 5, "GB", 30, 1000),
        ];

        assert_eq!(ids(&dedupe_cheapest(&plans)), vec!["first"]);
        assert!(dedupe_cheapest(&[]).is_empty());
    }

    #[test]
    fn statistics_count_sources_countries_and_average_price() {
        let stats = compute_statistics(&fixture());

        assert_eq!(stats.total_plans, 4);
        assert_eq!(stats.local_plans, 1);
        assert_eq!(stats.third_party_plans, 3);
        assert_eq!(stats.countries_covered, 6);
        // (399 + 799 + 1200 + 2500) / 4 = 1224.5 minor units
        assert_eq!(stats.average_price, Decimal::new(1225, 2));
    }

    #[test]
    fn statistics_for_empty_catalog_are_zero() {
        let stats = compute_statistics(&[]);
        assert_eq!(stats.total_plans, 0);
        assert_eq!(stats.average_price, Decimal::ZERO);
    }

    #[test]
    fn statistics_serialize_with_presentation_keys() {
        let value = serde_json::to_value(compute_statistics(&fixture())).expect("serialize");
        assert_eq!(value["thirdPartyPlans"], 3);
        assert_eq!(value["averagePrice"], 12.25);
    }
}
