use serde::Serialize;

use super::Region;

/// Destination with a landing page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Country {
    pub code: &'static str,
    pub name: &'static str,
    pub slug: &'static str,
    pub region: Region,
}

const fn country(
    code: &'static str,
    name: &'static str,
    slug: &'static str,
    region: Region,
) -> Country {
    Country { code, name, slug, region }
}

pub fn find_country_by_slug(slug: &str) -> Option<&'static Country> {
    let slug = slug.trim();
    COUNTRIES.iter().find(|country| country.slug.eq_ignore_ascii_case(slug))
}

pub fn find_country_by_code(code: &str) -> Option<&'static Country> {
    let code = code.trim();
    COUNTRIES.iter().find(|country| country.code.eq_ignore_ascii_case(code))
}

pub static COUNTRIES: &[Country] = &[
    country("TR", "Turkey", "turkey", Region::Europe),
    country("TH", "Thailand", "thailand", Region::Asia),
    country("MY", "Malaysia", "malaysia", Region::Asia),
    country("AE", "United Arab Emirates", "united-arab-emirates", Region::Asia),
    country("IN", "India", "india", Region::Asia),
    country("NL", "Netherlands", "netherlands", Region::Europe),
    country("KR", "South Korea", "south-korea", Region::Asia),
    country("SG", "Singapore", "singapore", Region::Asia),
    country("CA", "Canada", "canada", Region::NorthAmerica),
    country("MX", "Mexico", "mexico", Region::NorthAmerica),
    country("AD", "Andorra", "andorra", Region::Europe),
    country("AF", "Afghanistan", "afghanistan", Region::Asia),
    country("AG", "Antigua and Barbuda", "antigua-and-barbuda", Region::NorthAmerica),
    country("AI", "Anguilla", "anguilla", Region::NorthAmerica),
    country("AL", "Albania", "albania", Region::Europe),
    country("AM", "Armenia", "armenia", Region::Asia),
    country("AR", "Argentina", "argentina", Region::SouthAmerica),
    country("AS", "American Samoa", "american-samoa", Region::Oceania),
    country("AT", "Austria", "austria", Region::Europe),
    country("AU", "Australia", "australia", Region::Oceania),
    country("AW", "Aruba", "aruba", Region::NorthAmerica),
    country("AZ", "Azerbaijan", "azerbaijan", Region::Asia),
    country("BA", "Bosnia and Herzegovina", "bosnia-and-herzegovina", Region::Europe),
    country("BB", "Barbados", "barbados", Region::NorthAmerica),
    country("BD", "Bangladesh", "bangladesh", Region::Asia),
    country("BE", "Belgium", "belgium", Region::Europe),
    country("BF", "Burkina Faso", "burkina-faso", Region::Africa),
    country("BG", "Bulgaria", "bulgaria", Region::Europe),
    country("BH", "Bahrain", "bahrain", Region::Asia),
    country("BJ", "Benin", "benin", Region::Africa),
    country("BL", "Saint Barthélemy", "saint-barthlemy", Region::NorthAmerica),
    country("BM", "Bermuda", "bermuda", Region::NorthAmerica),
    country("BN", "Brunei", "brunei", Region::Asia),
    country("BO", "Bolivia", "bolivia", Region::SouthAmerica),
    country("BQ", "Caribbean Netherlands", "caribbean-netherlands", Region::NorthAmerica),
    country("BR", "Brazil", "brazil", Region::SouthAmerica),
    country("BS", "Bahamas", "bahamas", Region::NorthAmerica),
    country("BW", "Botswana", "botswana", Region::Africa),
    country("BZ", "Belize", "belize", Region::NorthAmerica),
    country(
        "CD",
        "Democratic Republic of the Congo",
        "democratic-republic-of-the-congo",
        Region::Africa,
    ),
    country("CF", "Central African Republic", "central-african-republic", Region::Africa),
    country("CG", "Republic of the Congo", "republic-of-the-congo", Region::Africa),
    country("CH", "Switzerland", "switzerland", Region::Europe),
    country("CI", "Ivory Coast", "ivory-coast", Region::Africa),
    country("CL", "Chile", "chile", Region::SouthAmerica),
    country("CM", "Cameroon", "cameroon", Region::Africa),
    country("CN", "China", "china", Region::Asia),
    country("CO", "Colombia", "colombia", Region::SouthAmerica),
    country("CR", "Costa Rica", "costa-rica", Region::NorthAmerica),
    country("CV", "Cape Verde", "cape-verde", Region::Africa),
    country("CW", "Curaçao", "curaao", Region::NorthAmerica),
    country("CY", "Cyprus", "cyprus", Region::Europe),
    country("CZ", "Czech Republic", "czech-republic", Region::Europe),
    country("DE", "Germany", "germany", Region::Europe),
    country("DK", "Denmark", "denmark", Region::Europe),
    country("DM", "Dominica", "dominica", Region::NorthAmerica),
    country("DO", "Dominican Republic", "dominican-republic", Region::NorthAmerica),
    country("DZ", "Algeria", "algeria", Region::Africa),
    country("EC", "Ecuador", "ecuador", Region::SouthAmerica),
    country("EE", "Estonia", "estonia", Region::Europe),
    country("EG", "Egypt", "egypt", Region::Africa),
    country("ES", "Spain", "spain", Region::Europe),
    country("FI", "Finland", "finland", Region::Europe),
    country("FJ", "Fiji", "fiji", Region::Oceania),
    country("FO", "Faroe Islands", "faroe-islands", Region::Europe),
    country("FR", "France", "france", Region::Europe),
    country("GA", "Gabon", "gabon", Region::Africa),
    country("GB", "United Kingdom", "united-kingdom", Region::Europe),
    country("GD", "Grenada", "grenada", Region::NorthAmerica),
    country("GE", "Georgia", "georgia", Region::Asia),
    country("GF", "French Guiana", "french-guiana", Region::SouthAmerica),
    country("GG", "Guernsey", "guernsey", Region::Europe),
    country("GH", "Ghana", "ghana", Region::Africa),
    country("GI", "Gibraltar", "gibraltar", Region::Europe),
    country("GL", "Greenland", "greenland", Region::NorthAmerica),
    country("GM", "Gambia", "gambia", Region::Africa),
    country("GN", "Guinea", "guinea", Region::Africa),
    country("GP", "Guadeloupe", "guadeloupe", Region::NorthAmerica),
    country("GR", "Greece", "greece", Region::Europe),
    country("GT", "Guatemala", "guatemala", Region::NorthAmerica),
    country("GU", "Guam", "guam", Region::Oceania),
    country("GW", "Guinea-Bissau", "guinea-bissau", Region::Africa),
    country("GY", "Guyana", "guyana", Region::SouthAmerica),
    country("HK", "Hong Kong", "hong-kong", Region::Asia),
    country("HN", "Honduras", "honduras", Region::NorthAmerica),
    country("HR", "Croatia", "croatia", Region::Europe),
    country("HT", "Haiti", "haiti", Region::NorthAmerica),
    country("HU", "Hungary", "hungary", Region::Europe),
    country("ID", "Indonesia", "indonesia", Region::Asia),
    country("IE", "Ireland", "ireland", Region::Europe),
    country("IL", "Israel", "israel", Region::Asia),
    country("IM", "Isle of Man", "isle-of-man", Region::Europe),
    country("IQ", "Iraq", "iraq", Region::Asia),
    country("IS", "Iceland", "iceland", Region::Europe),
    country("IT", "Italy", "italy", Region::Europe),
    country("JE", "Jersey", "jersey", Region::Europe),
    country("JM", "Jamaica", "jamaica", Region::NorthAmerica),
    country("JO", "Jordan", "jordan", Region::Asia),
    country("JP", "Japan", "japan", Region::Asia),
    country("KE", "Kenya", "kenya", Region::Africa),
    country("KG", "Kyrgyzstan", "kyrgyzstan", Region::Asia),
    country("KH", "Cambodia", "cambodia", Region::Asia),
    country("KN", "Saint Kitts and Nevis", "saint-kitts-and-nevis", Region::NorthAmerica),
    country("KW", "Kuwait", "kuwait", Region::Asia),
    country("KY", "Cayman Islands", "cayman-islands", Region::NorthAmerica),
    country("KZ", "Kazakhstan", "kazakhstan", Region::Asia),
    country("LA", "Laos", "laos", Region::Asia),
    country("LC", "Saint Lucia", "saint-lucia", Region::NorthAmerica),
    country("LI", "Liechtenstein", "liechtenstein", Region::Europe),
    country("LK", "Sri Lanka", "sri-lanka", Region::Asia),
    country("LR", "Liberia", "liberia", Region::Africa),
    country("LS", "Lesotho", "lesotho", Region::Africa),
    country("LT", "Lithuania", "lithuania", Region::Europe),
    country("LU", "Luxembourg", "luxembourg", Region::Europe),
    country("LV", "Latvia", "latvia", Region::Europe),
    country("MA", "Morocco", "morocco", Region::Africa),
    country("MC", "Monaco", "monaco", Region::Europe),
    country("MD", "Moldova", "moldova", Region::Europe),
    country("ME", "Montenegro", "montenegro", Region::Europe),
    country("MF", "Saint Martin", "saint-martin", Region::NorthAmerica),
    country("MG", "Madagascar", "madagascar", Region::Africa),
    country("MK", "North Macedonia", "north-macedonia", Region::Europe),
    country("ML", "Mali", "mali", Region::Africa),
    country("MN", "Mongolia", "mongolia", Region::Asia),
    country("MO", "Macau", "macau", Region::Asia),
    country("MP", "Northern Mariana Islands", "northern-mariana-islands", Region::Oceania),
    country("MQ", "Martinique", "martinique", Region::NorthAmerica),
    country("MR", "Mauritania", "mauritania", Region::Africa),
    country("MS", "Montserrat", "montserrat", Region::NorthAmerica),
    country("MT", "Malta", "malta", Region::Europe),
    country("MU", "Mauritius", "mauritius", Region::Africa),
    country("MV", "Maldives", "maldives", Region::Asia),
    country("MW", "Malawi", "malawi", Region::Africa),
    country("MZ", "Mozambique", "mozambique", Region::Africa),
    country("NA", "Namibia", "namibia", Region::Africa),
    country("NE", "Niger", "niger", Region::Africa),
    country("NG", "Nigeria", "nigeria", Region::Africa),
    country("NI", "Nicaragua", "nicaragua", Region::NorthAmerica),
    country("NO", "Norway", "norway", Region::Europe),
    country("NP", "Nepal", "nepal", Region::Asia),
    country("NR", "Nauru", "nauru", Region::Oceania),
    country("NZ", "New Zealand", "new-zealand", Region::Oceania),
    country("OM", "Oman", "oman", Region::Asia),
    country("PA", "Panama", "panama", Region::NorthAmerica),
    country("PE", "Peru", "peru", Region::SouthAmerica),
    country("PF", "French Polynesia", "french-polynesia", Region::Oceania),
    country("PG", "Papua New Guinea", "papua-new-guinea", Region::Oceania),
    country("PH", "Philippines", "philippines", Region::Asia),
    country("PK", "Pakistan", "pakistan", Region::Asia),
    country("PL", "Poland", "poland", Region::Europe),
    country("PR", "Puerto Rico", "puerto-rico", Region::NorthAmerica),
    country("PT", "Portugal", "portugal", Region::Europe),
    country("PY", "Paraguay", "paraguay", Region::SouthAmerica),
    country("QA", "Qatar", "qatar", Region::Asia),
    country("RE", "Réunion", "runion", Region::Africa),
    country("RO", "Romania", "romania", Region::Europe),
    country("RS", "Serbia", "serbia", Region::Europe),
    country("RW", "Rwanda", "rwanda", Region::Africa),
    country("SA", "Saudi Arabia", "saudi-arabia", Region::Asia),
    country("SB", "Solomon Islands", "solomon-islands", Region::Oceania),
    country("SC", "Seychelles", "seychelles", Region::Africa),
    country("SD", "Sudan", "sudan", Region::Africa),
    country("SE", "Sweden", "sweden", Region::Europe),
    country("SI", "Slovenia", "slovenia", Region::Europe),
    country("SK", "Slovakia", "slovakia", Region::Europe),
    country("SL", "Sierra Leone", "sierra-leone", Region::Africa),
    country("SM", "San Marino", "san-marino", Region::Europe),
    country("SN", "Senegal", "senegal", Region::Africa),
    country("SR", "Suriname", "suriname", Region::SouthAmerica),
    country("SS", "South Sudan", "south-sudan", Region::Africa),
    country("SV", "El Salvador", "el-salvador", Region::NorthAmerica),
    country("SX", "Sint Maarten", "sint-maarten", Region::NorthAmerica),
    country("SZ", "Eswatini", "eswatini", Region::Africa),
    country("TC", "Turks and Caicos Islands", "turks-and-caicos-islands", Region::NorthAmerica),
    country("TD", "Chad", "chad", Region::Africa),
    country("TG", "Togo", "togo", Region::Africa),
    country("TJ", "Tajikistan", "tajikistan", Region::Asia),
    country("TL", "Timor-Leste", "timor-leste", Region::Asia),
    country("TN", "Tunisia", "tunisia", Region::Africa),
    country("TO", "Tonga", "tonga", Region::Oceania),
    country("TT", "Trinidad and Tobago", "trinidad-and-tobago", Region::NorthAmerica),
    country("TW", "Taiwan", "taiwan", Region::Asia),
    country("TZ", "Tanzania", "tanzania", Region::Africa),
    country("UA", "Ukraine", "ukraine", Region::Europe),
    country("UG", "Uganda", "uganda", Region::Africa),
    country("US", "United States", "united-states", Region::NorthAmerica),
    country("UY", "Uruguay", "uruguay", Region::SouthAmerica),
    country("UZ", "Uzbekistan", "uzbekistan", Region::Asia),
    country(
        "VC",
        "Saint Vincent and the Grenadines",
        "saint-vincent-and-the-grenadines",
        Region::NorthAmerica,
    ),
    country("VE", "Venezuela", "venezuela", Region::SouthAmerica),
    country("VG", "British Virgin Islands", "british-virgin-islands", Region::NorthAmerica),
    country("VI", "U.S. Virgin Islands", "us-virgin-islands", Region::NorthAmerica),
    country("VN", "Vietnam", "vietnam", Region::Asia),
    country("VU", "Vanuatu", "vanuatu", Region::Oceania),
    country("WS", "Samoa", "samoa", Region::Oceania),
    country("XK", "Kosovo", "kosovo", Region::Europe),
    country("YT", "Mayotte", "mayotte", Region::Africa),
    country("ZA", "South Africa", "south-africa", Region::Africa),
    country("ZM", "Zambia", "zambia", Region::Africa),
    country("ZW", "Zimbabwe", "zimbabwe", Region::Africa),
];

#[cfg(test)]
mod tests {
    use super::{find_country_by_code, find_country_by_slug};
    use crate::taxonomy::Region;

    #[test]
    fn finds_countries_by_slug_and_code() {
        let canada = find_country_by_slug("canada").expect("canada is listed");
        assert_eq!(canada.code, "CA");
        assert_eq!(canada.region, Region::NorthAmerica);

        let turkey = find_country_by_code("tr").expect("turkey is listed");
        assert_eq!(turkey.slug, "turkey");
        assert!(find_country_by_slug("atlantis").is_none());
    }
}
