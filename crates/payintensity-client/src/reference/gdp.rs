use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::reference::{ReferenceResolver, ReferenceValues, Resolution, UnresolvedEntry, UnresolvedReason};
use crate::{ClientError, ClientResult};

const EMBEDDED_GDP_2025: &[(&str, f64)] = &[
    ("United States", 30615.74),
    ("China", 19398.58),
    ("Japan", 4279.83),
    ("Germany", 5013.57),
    ("India", 4125.21),
    ("United Kingdom", 3958.78),
    ("France", 3361.56),
    ("Italy", 2543.68),
    ("Canada", 2283.60),
    ("Brazil", 2256.91),
    ("Russia", 2540.66),
    ("Mexico", 1862.74),
    ("South Korea", 1858.57),
    ("Australia", 1829.51),
    ("Spain", 1891.37),
    ("Indonesia", 1443.26),
    ("Turkey", 1565.47),
    ("Saudi Arabia", 1268.54),
    ("Netherlands", 1320.64),
    ("Poland", 1039.62),
    ("Switzerland", 1002.67),
    ("Taiwan", 884.39),
    ("Argentina", 683.37),
    ("Belgium", 716.98),
    ("Sweden", 662.32),
    ("Austria", 566.46),
    ("Singapore", 574.19),
    ("Israel", 610.75),
    ("Thailand", 558.57),
    ("United Arab Emirates", 569.10),
    ("Malaysia", 470.57),
    ("Philippines", 494.16),
    ("Vietnam", 484.73),
    ("Bangladesh", 475.01),
    ("Pakistan", 410.50),
    ("Romania", 422.51),
    ("Colombia", 438.12),
    ("Iran", 356.51),
    ("South Africa", 426.38),
    ("Egypt", 349.26),
    ("Peru", 318.48),
    ("Chile", 347.17),
    ("Greece", 282.02),
    ("Nigeria", 285.00),
    ("Iraq", 265.46),
    ("Kenya", 136.01),
    ("Ghana", 111.96),
    ("Ethiopia", 109.49),
    ("Algeria", 288.01),
    ("Kazakhstan", 300.05),
    ("Ukraine", 209.71),
    ("Uzbekistan", 137.48),
    ("Czechia", 383.38),
    ("Hungary", 247.76),
    ("Slovakia", 154.59),
    ("Bulgaria", 127.92),
    ("Lithuania", 95.27),
    ("Latvia", 47.88),
    ("Estonia", 46.76),
    ("Slovenia", 79.22),
    ("Croatia", 103.90),
    ("Serbia", 100.05),
    ("Bosnia and Herzegovina", 33.24),
    ("Montenegro", 9.35),
    ("North Macedonia", 18.78),
    ("Armenia", 27.86),
    ("Azerbaijan", 76.39),
    ("Tajikistan", 17.03),
    ("Kyrgyzstan", 20.16),
    ("Turkmenistan", 72.12),
    ("Belarus", 85.74),
    ("Moldova", 19.62),
    ("Norway", 517.10),
    ("Denmark", 459.61),
    ("Finland", 314.72),
    ("Iceland", 38.39),
    ("Ireland", 708.77),
    ("Portugal", 337.94),
    ("Luxembourg", 100.64),
    ("Costa Rica", 102.64),
    ("Panama", 90.41),
    ("Uruguay", 84.99),
    ("Paraguay", 47.40),
    ("Bolivia", 57.09),
    ("Ecuador", 130.53),
    ("Dominican Republic", 129.75),
    ("Guatemala", 120.85),
    ("Honduras", 39.45),
    ("El Salvador", 36.59),
    ("Nicaragua", 20.69),
    ("Jamaica", 23.14),
    ("Puerto Rico", 126.55),
    ("Haiti", 30.91),
    ("Morocco", 179.61),
    ("Tunisia", 59.07),
    ("Botswana", 19.19),
    ("Namibia", 14.69),
    ("Mozambique", 24.73),
    ("Tanzania", 87.44),
    ("Uganda", 64.99),
    ("Rwanda", 14.77),
    ("Zambia", 29.37),
    ("Zimbabwe", 53.31),
    ("Senegal", 36.84),
    ("Burkina Faso", 26.87),
    ("Niger", 22.97),
    ("Chad", 21.59),
    ("Benin", 24.40),
    ("Ivory Coast", 99.21),
    ("Guinea", 27.52),
    ("Togo", 10.95),
    ("Madagascar", 19.38),
    ("Cameroon", 60.58),
    ("Gabon", 21.46),
    ("Republic of the Congo", 15.70),
    ("Mauritius", 15.73),
    ("Seychelles", 2.23),
    ("Sudan", 35.90),
    ("Oman", 105.19),
    ("Bahrain", 47.39),
    ("Jordan", 56.16),
    ("Cyprus", 39.94),
    ("Lebanon", 28.28),
    ("Nepal", 45.51),
    ("Bhutan", 3.41),
    ("Sri Lanka", 98.96),
    ("Brunei Darussalam", 15.57),
    ("Cambodia", 48.80),
    ("Laos", 16.93),
    ("Myanmar", 60.56),
    ("Timor-Leste", 2.13),
    ("Papua New Guinea", 32.71),
    ("Fiji", 6.34),
    ("New Zealand", 280.45),
    ("Kuwait", 172.67),
    ("Malta", 21.77),
    ("Guyana", 25.06),
    ("Suriname", 4.50),
    ("Belize", 3.30),
    ("Cuba", 107.35),
    ("Malawi", 15.21),
    ("Burundi", 3.58),
    ("Lesotho", 2.48),
    ("Gambia", 2.55),
    ("Equatorial Guinea", 11.58),
    ("Sierra Leone", 5.77),
    ("Mongolia", 22.84),
];

#[derive(Debug, Deserialize)]
struct GdpTableFile {
    gdp: BTreeMap<String, f64>,
}

#[derive(Debug, Clone)]
pub struct StaticReference {
    label: String,
    values: HashMap<String, f64>,
}

impl StaticReference {
    pub fn embedded_gdp() -> ClientResult<Self> {
        Self::from_pairs("static_gdp", EMBEDDED_GDP_2025.iter().copied())
    }

    pub fn gdp_from_toml_file(path: &Path) -> ClientResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|error| ClientError::input_unreadable(path, &error.to_string()))?;
        let parsed = toml::from_str::<GdpTableFile>(&content).map_err(|error| {
            ClientError::reference_table_invalid(&format!(
                "GDP table `{}` is not valid: {error}",
                path.display()
            ))
        })?;
        let table = Self::from_pairs(
            "static_gdp:file",
            parsed.gdp.iter().map(|(name, value)| (name.as_str(), *value)),
        )?;
        info!(path = %path.display(), countries = table.len(), "loaded GDP table");
        Ok(table)
    }

    pub fn from_pairs<'a, I>(label: &str, pairs: I) -> ClientResult<Self>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut values = HashMap::new();
        for (name, value) in pairs {
            if !value.is_finite() || value < 0.0 {
                return Err(ClientError::reference_table_invalid(&format!(
                    "Reference value for `{name}` must be a non-negative number, got {value}."
                )));
            }
            if values.insert(name.to_string(), value).is_some() {
                return Err(ClientError::reference_table_invalid(&format!(
                    "Country `{name}` appears more than once in the reference table."
                )));
            }
        }
        Ok(Self {
            label: label.to_string(),
            values,
        })
    }

    pub fn get(&self, country: &str) -> Option<f64> {
        self.values.get(country).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ReferenceResolver for StaticReference {
    fn label(&self) -> String {
        self.label.clone()
    }

    fn resolve(&self, countries: &[&str], _years: &[i32]) -> ClientResult<Resolution> {
        let mut resolution = Resolution::default();
        for country in countries {
            match self.get(country) {
                Some(value) => {
                    resolution
                        .values
                        .insert(country.to_string(), ReferenceValues::Single(value));
                }
                None => {
                    warn!(country, "no reference value");
                    resolution.unresolved.push(UnresolvedEntry::country(
                        country,
                        UnresolvedReason::NoReferenceEntry,
                    ));
                }
            }
        }
        Ok(resolution)
    }
}
