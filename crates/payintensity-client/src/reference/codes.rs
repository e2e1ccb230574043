use std::collections::{HashMap, HashSet};

use tracing::warn;

use crate::{ClientError, ClientResult};

const EMBEDDED_COUNTRY_CODES: &[(&str, &str)] = &[
    ("Argentina", "ARG"),
    ("Armenia", "ARM"),
    ("Australia", "AUS"),
    ("Austria", "AUT"),
    ("Azerbaijan", "AZE"),
    ("Bahrain", "BHR"),
    ("Bangladesh", "BGD"),
    ("Belarus", "BLR"),
    ("Belgium", "BEL"),
    ("Belize", "BLZ"),
    ("Benin", "BEN"),
    ("Bhutan", "BTN"),
    ("Bolivia", "BOL"),
    ("Bosnia and Herzegovina", "BIH"),
    ("Botswana", "BWA"),
    ("Brazil", "BRA"),
    ("Brunei Darussalam", "BRN"),
    ("Bulgaria", "BGR"),
    ("Burkina Faso", "BFA"),
    ("Burundi", "BDI"),
    ("Cambodia", "KHM"),
    ("Cameroon", "CMR"),
    ("Canada", "CAN"),
    ("Chad", "TCD"),
    ("Chile", "CHL"),
    ("China", "CHN"),
    ("Costa Rica", "CRI"),
    ("Croatia", "HRV"),
    ("Cuba", "CUB"),
    ("Cyprus", "CYP"),
    ("Czechia", "CZE"),
    ("Denmark", "DNK"),
    ("Dominican Republic", "DOM"),
    ("Ecuador", "ECU"),
    ("Egypt", "EGY"),
    ("El Salvador", "SLV"),
    ("Equatorial Guinea", "GNQ"),
    ("Estonia", "EST"),
    ("Ethiopia", "ETH"),
    ("Fiji", "FJI"),
    ("Finland", "FIN"),
    ("France", "FRA"),
    ("Gabon", "GAB"),
    ("Gambia", "GMB"),
    ("Germany", "DEU"),
    ("Ghana", "GHA"),
    ("Greece", "GRC"),
    ("Guatemala", "GTM"),
    ("Guinea", "GIN"),
    ("Guyana", "GUY"),
    ("Haiti", "HTI"),
    ("Honduras", "HND"),
    ("Hungary", "HUN"),
    ("Iceland", "ISL"),
    ("India", "IND"),
    ("Indonesia", "IDN"),
    ("Iran", "IRN"),
    ("Iraq", "IRQ"),
    ("Ireland", "IRL"),
    ("Israel", "ISR"),
    ("Italy", "ITA"),
    ("Ivory Coast", "CIV"),
    ("Jamaica", "JAM"),
    ("Japan", "JPN"),
    ("Jordan", "JOR"),
    ("Kazakhstan", "KAZ"),
    ("Kenya", "KEN"),
    ("Kuwait", "KWT"),
    ("Kyrgyzstan", "KGZ"),
    ("Laos", "LAO"),
    ("Latvia", "LVA"),
    ("Lebanon", "LBN"),
    ("Lesotho", "LSO"),
    ("Lithuania", "LTU"),
    ("Luxembourg", "LUX"),
    ("Madagascar", "MDG"),
    ("Malawi", "MWI"),
    ("Malaysia", "MYS"),
    ("Malta", "MLT"),
    ("Mauritius", "MUS"),
    ("Mexico", "MEX"),
    ("Moldova", "MDA"),
    ("Mongolia", "MNG"),
    ("Montenegro", "MNE"),
    ("Morocco", "MAR"),
    ("Mozambique", "MOZ"),
    ("Myanmar", "MMR"),
    ("Namibia", "NAM"),
    ("Nepal", "NPL"),
    ("Netherlands", "NLD"),
    ("New Zealand", "NZL"),
    ("Nicaragua", "NIC"),
    ("Niger", "NER"),
    ("Nigeria", "NGA"),
    ("North Macedonia", "MKD"),
    ("Norway", "NOR"),
    ("Oman", "OMN"),
    ("Pakistan", "PAK"),
    ("Panama", "PAN"),
    ("Papua New Guinea", "PNG"),
    ("Paraguay", "PRY"),
    ("Philippines", "PHL"),
    ("Poland", "POL"),
    ("Portugal", "PRT"),
    ("Puerto Rico", "PRI"),
    ("Republic of the Congo", "COG"),
    ("Romania", "ROU"),
    ("Russia", "RUS"),
    ("Rwanda", "RWA"),
    ("Saudi Arabia", "SAU"),
    ("Senegal", "SEN"),
    ("Serbia", "SRB"),
    ("Seychelles", "SYC"),
    ("Sierra Leone", "SLE"),
    ("Singapore", "SGP"),
    ("Slovakia", "SVK"),
    ("Slovenia", "SVN"),
    ("South Africa", "ZAF"),
    ("South Korea", "KOR"),
    ("Spain", "ESP"),
    ("Sri Lanka", "LKA"),
    ("Sudan", "SDN"),
    ("Suriname", "SUR"),
    ("Sweden", "SWE"),
    ("Switzerland", "CHE"),
    ("Taiwan", "TWN"),
    ("Tajikistan", "TJK"),
    ("Tanzania", "TZA"),
    ("Thailand", "THA"),
    ("Timor-Leste", "TLS"),
    ("Togo", "TGO"),
    ("Tunisia", "TUN"),
    ("Turkey", "TUR"),
    ("Turkmenistan", "TKM"),
    ("Uganda", "UGA"),
    ("Ukraine", "UKR"),
    ("United Arab Emirates", "ARE"),
    ("United Kingdom", "GBR"),
    ("United States", "USA"),
    ("Uruguay", "URY"),
    ("Uzbekistan", "UZB"),
    ("Vietnam", "VNM"),
    ("Zambia", "ZMB"),
    ("Zimbabwe", "ZWE"),
];

#[derive(Debug, Clone)]
pub struct CountryCodes {
    code_by_name: HashMap<String, String>,
}

impl CountryCodes {
    pub fn embedded() -> ClientResult<Self> {
        Self::from_pairs(EMBEDDED_COUNTRY_CODES)
    }

    pub fn from_pairs(pairs: &[(&str, &str)]) -> ClientResult<Self> {
        let mut code_by_name = HashMap::with_capacity(pairs.len());
        let mut name_by_code = HashMap::<&str, &str>::with_capacity(pairs.len());

        for (name, code) in pairs {
            if code.len() != 3 || !code.bytes().all(|byte| byte.is_ascii_uppercase()) {
                return Err(ClientError::reference_table_invalid(&format!(
                    "Country code `{code}` for `{name}` is not a three-letter uppercase code."
                )));
            }
            if code_by_name
                .insert(name.to_string(), code.to_string())
                .is_some()
            {
                return Err(ClientError::reference_table_invalid(&format!(
                    "Country `{name}` is mapped more than once in the code table."
                )));
            }
            if let Some(previous) = name_by_code.insert(*code, *name) {
                return Err(ClientError::reference_table_invalid(&format!(
                    "Code `{code}` is shared by `{previous}` and `{name}`."
                )));
            }
        }

        Ok(Self { code_by_name })
    }

    pub fn code_for(&self, country: &str) -> Option<&str> {
        self.code_by_name.get(country).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.code_by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code_by_name.is_empty()
    }

    pub fn unmapped<'a>(&self, countries: &[&'a str]) -> Vec<&'a str> {
        let mut seen = HashSet::new();
        let missing = countries
            .iter()
            .copied()
            .filter(|country| !self.code_by_name.contains_key(*country))
            .filter(|country| seen.insert(*country))
            .collect::<Vec<&str>>();
        for country in &missing {
            warn!(country, "no country code mapping");
        }
        missing
    }
}
