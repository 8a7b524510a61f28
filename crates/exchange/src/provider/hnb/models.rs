use serde::Deserialize;

/// One row of the HNB exchange-rate list (`tecajn-eur/v3`).
///
/// Rates are strings with a decimal comma, e.g. `"1,085600"`, expressing units
/// of `valuta` per one euro.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct HnbRateDto {
    #[serde(default)]
    pub valuta: Option<String>,
    pub srednji_tecaj: String,
    #[serde(default)]
    #[allow(dead_code)]
    pub kupovni_tecaj: Option<String>,
    #[serde(default)]
    #[allow(dead_code)]
    pub prodajni_tecaj: Option<String>,
    #[serde(default)]
    pub datum_primjene: Option<String>,
}
