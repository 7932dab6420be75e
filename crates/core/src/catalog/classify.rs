use std::cmp::Reverse;

use crate::domain::plan::{CountryCode, PlanType};
use crate::taxonomy::{region_for_country, Region};

/// Coverage-count boundaries shared by every component that classifies plans.
///
/// `plan_type`: 1 country is `country`, up to `regional_max` is `regional`,
/// anything above is `global`. `region` is voted from the covered countries
/// only up to `region_vote_max`; broader plans are labelled `Global`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClassificationThresholds {
    pub regional_max: usize,
    pub region_vote_max: usize,
}

impl Default for ClassificationThresholds {
    fn default() -> Self {
        Self { regional_max: 50, region_vote_max: 10 }
    }
}

impl ClassificationThresholds {
    pub fn plan_type(&self, country_count: usize) -> Option<PlanType> {
        match country_count {
            0 => None,
            1 => Some(PlanType::Country),
            count if count <= self.regional_max => Some(PlanType::Regional),
            _ => Some(PlanType::Global),
        }
    }

    pub fn region(&self, countries: &[CountryCode]) -> Region {
        match countries {
            [] => Region::Global,
            [single] => region_for_country(single).unwrap_or(Region::Other),
            many if many.len() <= self.region_vote_max => {
                majority_region(many).unwrap_or(Region::Global)
            }
            _ => Region::Global,
        }
    }
}

/// Most frequent taxonomy region among `countries`. On a tie the region that
/// reached the winning count first, walking coverage order, wins.
pub fn majority_region(countries: &[CountryCode]) -> Option<Region> {
    // (region, count, position at which the count was last raised)
    let mut tally: Vec<(Region, usize, usize)> = Vec::new();

    for (position, region) in countries.iter().filter_map(region_for_country).enumerate() {
        match tally.iter_mut().find(|(seen, _, _)| *seen == region) {
            Some((_, count, reached_at)) => {
                *count += 1;
                *reached_at = position;
            }
            None => tally.push((region, 1, position)),
        }
    }

    tally
        .into_iter()
        .min_by_key(|(_, count, reached_at)| (Reverse(*count), *reached_at))
        .map(|(region, _, _)| region)
}
