use std::{collections::BTreeMap, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Tariff and storage settings. Missing fields fall back to the house tariff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Simple annual interest rate on stockist and company loans (0.1375 = 13.75%).
    #[serde(default = "Config::default_interest_annual_rate")]
    pub interest_annual_rate: f64,
    #[serde(default = "Config::default_rental_per_ton_per_day")]
    pub rental_per_ton_per_day: f64,
    /// Entities charged a one-off rate per ton of net stock instead of daily rental.
    #[serde(default = "Config::default_flat_rate_entities")]
    pub flat_rate_entities: BTreeMap<String, f64>,
    #[serde(default = "Config::default_reduction_rate")]
    pub reduction_rate: f64,
    #[serde(default = "Config::default_reduction_commodities")]
    pub reduction_commodities: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Optional custom root directory for books. Defaults to `~/Documents/Godown`.
    pub data_root: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_book: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interest_annual_rate: Self::default_interest_annual_rate(),
            rental_per_ton_per_day: Self::default_rental_per_ton_per_day(),
            flat_rate_entities: Self::default_flat_rate_entities(),
            reduction_rate: Self::default_reduction_rate(),
            reduction_commodities: Self::default_reduction_commodities(),
            data_root: None,
            default_book: None,
        }
    }
}

impl Config {
    pub fn default_interest_annual_rate() -> f64 {
        0.1375
    }

    pub fn default_rental_per_ton_per_day() -> f64 {
        3.334
    }

    pub fn default_flat_rate_entities() -> BTreeMap<String, f64> {
        BTreeMap::from([("ANUNAY AGRO".to_string(), 800.0)])
    }

    pub fn default_reduction_rate() -> f64 {
        0.015
    }

    pub fn default_reduction_commodities() -> Vec<String> {
        vec!["Maize".into()]
    }

    pub fn resolve_data_root(&self) -> PathBuf {
        if let Some(path) = &self.data_root {
            return path.clone();
        }

        let base = dirs::document_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        base.join("Godown")
    }

    /// Rejects rates that would make every report meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("interest_annual_rate", self.interest_annual_rate)?;
        non_negative("rental_per_ton_per_day", self.rental_per_ton_per_day)?;
        non_negative("reduction_rate", self.reduction_rate)?;
        if self.reduction_rate >= 1.0 {
            return Err(ConfigError::Invalid(format!(
                "reduction_rate must be below 1, got {}",
                self.reduction_rate
            )));
        }
        for (entity, per_ton) in &self.flat_rate_entities {
            if entity.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "flat_rate_entities contains a blank entity name".into(),
                ));
            }
            non_negative(&format!("flat rate for {entity}"), *per_ton)?;
        }
        Ok(())
    }
}

fn non_negative(field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{field} must be a non-negative number, got {value}"
        )))
    }
}
