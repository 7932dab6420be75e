use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::plan::CountryCode;

pub mod countries;

pub use countries::{find_country_by_code, find_country_by_slug, Country, COUNTRIES};

/// Geographic grouping used for classification and region landing pages.
///
/// `Global` and `Other` are synthetic buckets: `Global` for plans too broad to
/// attribute to one region, `Other` for single-country plans whose country is
/// missing from the reference table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    Europe,
    Asia,
    #[serde(rename = "North America")]
    NorthAmerica,
    #[serde(rename = "South America")]
    SouthAmerica,
    Africa,
    Oceania,
    Global,
    #[serde(other)]
    Other,
}

impl Region {
    pub const GEOGRAPHIC: [Region; 6] = [
        Region::Europe,
        Region::Asia,
        Region::NorthAmerica,
        Region::SouthAmerica,
        Region::Africa,
        Region::Oceania,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Europe => "Europe",
            Self::Asia => "Asia",
            Self::NorthAmerica => "North America",
            Self::SouthAmerica => "South America",
            Self::Africa => "Africa",
            Self::Oceania => "Oceania",
            Self::Global => "Global",
            Self::Other => "Other",
        }
    }

    pub fn slug(self) -> Option<&'static str> {
        match self {
            Self::Europe => Some("europe"),
            Self::Asia => Some("asia"),
            Self::NorthAmerica => Some("north-america"),
            Self::SouthAmerica => Some("south-america"),
            Self::Africa => Some("africa"),
            Self::Oceania => Some("oceania"),
            Self::Global | Self::Other => None,
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        let slug = slug.trim().to_ascii_lowercase();
        Self::GEOGRAPHIC.into_iter().find(|region| region.slug() == Some(slug.as_str()))
    }

    /// Display-name lookup, including the synthetic `Global` and `Other`.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::GEOGRAPHIC
            .into_iter()
            .chain([Self::Global, Self::Other])
            .find(|region| region.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct RegionInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub region: Region,
}

pub const REGIONS: [RegionInfo; 6] = [
    RegionInfo {
        id: "europe",
        name: "Europe",
        description: "Coverage across the continent.",
        region: Region::Europe,
    },
    RegionInfo {
        id: "asia",
        name: "Asia",
        description: "Connect in top Asian destinations.",
        region: Region::Asia,
    },
    RegionInfo {
        id: "north-america",
        name: "North America",
        description: "Data for USA, Canada & Mexico.",
        region: Region::NorthAmerica,
    },
    RegionInfo {
        id: "south-america",
        name: "South America",
        description: "Connect across South America.",
        region: Region::SouthAmerica,
    },
    RegionInfo {
        id: "africa",
        name: "Africa",
        description: "Stay connected in Africa.",
        region: Region::Africa,
    },
    RegionInfo {
        id: "oceania",
        name: "Oceania",
        description: "Connect in the Pacific region.",
        region: Region::Oceania,
    },
];

pub fn region_for_country(code: &CountryCode) -> Option<Region> {
    region_for_code(code.as_str())
}

/// Static country-to-region table. Expects an uppercase code; `UK` is accepted
/// as an alias for `GB` because partner data uses both.
#[rustfmt::skip]
pub fn region_for_code(code: &str) -> Option<Region> {
    match code {
        "AT" | "BE" | "BG" | "HR" | "CY" | "CZ" | "DK" | "EE" | "FI" | "FR" | "DE" | "GR" | "HU" | "IS"
        | "IE" | "IT" | "LV" | "LI" | "LT" | "LU" | "MT" | "NL" | "NO" | "PL" | "PT" | "RO" | "SK" | "SI"
        | "ES" | "SE" | "CH" | "GB" | "UK" | "VA" | "AD" | "MC" | "SM" | "ME" | "RS" | "BA" | "MK" | "AL"
        | "MD" | "UA" | "BY" | "RU" => Some(Region::Europe),
        "CN" | "JP" | "KR" | "IN" | "TH" | "VN" | "SG" | "MY" | "ID" | "PH" | "TW" | "HK" | "MO" | "KH"
        | "LA" | "MM" | "BD" | "LK" | "NP" | "BT" | "MV" | "AF" | "PK" | "UZ" | "KZ" | "KG" | "TJ" | "TM"
        | "MN" | "AM" | "AZ" | "GE" | "TR" | "IL" | "PS" | "JO" | "LB" | "SY" | "IQ" | "IR" | "SA" | "YE"
        | "OM" | "AE" | "QA" | "BH" | "KW" => Some(Region::Asia),
        "US" | "CA" | "MX" | "GT" | "BZ" | "SV" | "HN" | "NI" | "CR" | "PA" => Some(Region::NorthAmerica),
        "BR" | "AR" | "CL" | "PE" | "CO" | "VE" | "EC" | "BO" | "PY" | "UY" | "GY" | "SR" | "GF" => Some(Region::SouthAmerica),
        "ZA" | "EG" | "NG" | "KE" | "GH" | "ET" | "TZ" | "UG" | "MZ" | "MG" | "CM" | "CI" | "NE" | "BF"
        | "ML" | "MW" | "ZM" | "SN" | "SO" | "TD" | "GN" | "RW" | "BJ" | "TN" | "BI" | "TG" | "SL" | "LY"
        | "LR" | "CF" | "MR" | "ER" | "GM" | "BW" | "GA" | "LS" | "GW" | "GQ" | "MU" | "SZ" | "DJ" | "KM"
        | "CV" | "ST" | "SC" | "MA" | "DZ" | "SD" | "SS" | "AO" | "CD" | "CG" | "ZW" | "NA" => Some(Region::Africa),
        "AU" | "NZ" | "FJ" | "PG" | "NC" | "SB" | "VU" | "PF" | "WS" | "GU" | "TO" | "KI" | "PW" | "MH"
        | "FM" | "NR" | "TV" | "CK" | "NU" | "TK" | "WF" | "AS" | "MP" => Some(Region::Oceania),
        _ => None,
    }
}

pub fn country_name_to_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut in_whitespace = false;

    for ch in name.chars().flat_map(char::to_lowercase) {
        if ch.is_whitespace() {
            if !in_whitespace {
                slug.push('-');
            }
            in_whitespace = true;
            continue;
        }

        in_whitespace = false;
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-' {
            slug.push(ch);
        }
    }

    slug
}
