use serde::{Deserialize, Serialize};

/// An indicator a provider knows how to serve.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorInfo {
    /// Canonical code
    pub id: String,

    /// Provider-native series / indicator / dataset code
    pub native_id: String,

    pub name: String,
}

impl IndicatorInfo {
    /// Build an entry from a mapping-table row, deriving a title-cased name.
    pub fn from_mapping(id: &str, native_id: &str) -> Self {
        Self {
            id: id.to_string(),
            native_id: native_id.to_string(),
            name: title_case(id),
        }
    }
}

/// A country a provider has data for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryInfo {
    /// ISO 3166-1 alpha-3
    pub code: String,

    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub income_level: Option<String>,
}

impl CountryInfo {
    pub fn new(code: &str, name: &str) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            region: None,
            income_level: None,
        }
    }
}

/// "GDP_PER_CAPITA" -> "Gdp Per Capita"
fn title_case(code: &str) -> String {
    code.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let lower = word.to_ascii_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
