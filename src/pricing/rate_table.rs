//! Tabla de tarifas base
//!
//! Se carga una sola vez al arrancar desde un recurso JSON y es inmutable
//! a partir de ese momento. Formato:
//!
//! ```json
//! { "currency": "KRW", "ranges": { "KM_1_2": { "DAMAS": 32000, "LABO": 37000 } } }
//! ```

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::distance_range::{resolve_key, DistanceRangeKey};
use super::vehicle_class::VehicleClass;

/// Errores al cargar la tabla; todos son fatales en el arranque
#[derive(Error, Debug)]
pub enum RateTableError {
    #[error("cannot read rate table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed rate table: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid range key in rate table: {0}")]
    InvalidRangeKey(String),

    #[error("range key {0} does not match a distance band")]
    MisalignedRangeKey(String),

    #[error("unknown vehicle class {vehicle} in range {range}")]
    UnknownVehicleClass { range: String, vehicle: String },

    #[error("negative rate for {vehicle} in range {range}")]
    NegativeRate { range: String, vehicle: String },

    #[error("rate table has no ranges")]
    Empty,
}

#[derive(Debug, Deserialize)]
struct RateTableFile {
    #[serde(default)]
    currency: Option<String>,
    ranges: HashMap<String, HashMap<String, i64>>,
}

/// Tabla tramo de distancia → clase de vehículo → tarifa en won
#[derive(Debug, Clone, Default)]
pub struct RateTable {
    currency: String,
    rates: HashMap<DistanceRangeKey, HashMap<VehicleClass, i64>>,
}

impl RateTable {
    /// Cargar desde un fichero JSON
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, RateTableError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| RateTableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_json_str(&raw)?;
        tracing::info!(
            "💰 Tabla de tarifas cargada desde {}: {} tramos",
            path.display(),
            table.range_count()
        );
        Ok(table)
    }

    /// Cargar desde un texto JSON
    pub fn from_json_str(raw: &str) -> Result<Self, RateTableError> {
        let file: RateTableFile = serde_json::from_str(raw)?;
        if file.ranges.is_empty() {
            return Err(RateTableError::Empty);
        }

        let mut rates = HashMap::with_capacity(file.ranges.len());
        for (range, by_vehicle) in file.ranges {
            let key: DistanceRangeKey = range
                .parse()
                .map_err(|_| RateTableError::InvalidRangeKey(range.clone()))?;
            // Una clave desalineada nunca coincidiría con un tramo resuelto
            if resolve_key(key.min_km) != Some(key) {
                return Err(RateTableError::MisalignedRangeKey(range));
            }

            let mut entries = HashMap::with_capacity(by_vehicle.len());
            for (vehicle, rate) in by_vehicle {
                let unknown = || RateTableError::UnknownVehicleClass {
                    range: range.clone(),
                    vehicle: vehicle.clone(),
                };
                let class: VehicleClass = vehicle.parse().map_err(|_| unknown())?;
                if rate < 0 {
                    return Err(RateTableError::NegativeRate {
                        range: range.clone(),
                        vehicle,
                    });
                }
                entries.insert(class, rate);
            }
            rates.insert(key, entries);
        }

        Ok(Self {
            currency: file.currency.unwrap_or_else(|| "KRW".to_string()),
            rates,
        })
    }

    /// Tarifa base para una distancia y clase de vehículo
    pub fn rate(&self, distance_km: i32, vehicle: VehicleClass) -> Option<i64> {
        let key = resolve_key(distance_km)?;
        self.rate_for_key(&key, vehicle)
    }

    pub fn rate_for_key(&self, key: &DistanceRangeKey, vehicle: VehicleClass) -> Option<i64> {
        self.rates.get(key)?.get(&vehicle).copied()
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn range_count(&self) -> usize {
        self.rates.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::distance_range::MAX_SUPPORTED_KM;

    fn bundled_table() -> RateTable {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("resources/pricing_rate_table.json");
        RateTable::load_from_path(path).expect("bundled rate table")
    }

    #[test]
    fn test_lookup_resolves_band_first() {
        let table = RateTable::from_json_str(
            r#"{"ranges": {"KM_1_2": {"DAMAS": 32000}, "KM_51_55": {"TON_1": 90000}}}"#,
        )
        .unwrap();

        assert_eq!(table.rate(1, VehicleClass::Damas), Some(32_000));
        assert_eq!(table.rate(2, VehicleClass::Damas), Some(32_000));
        assert_eq!(table.rate(53, VehicleClass::Ton1), Some(90_000));
        // Tramo presente pero sin la clase
        assert_eq!(table.rate(1, VehicleClass::Labo), None);
        // Tramo ausente
        assert_eq!(table.rate(3, VehicleClass::Damas), None);
        // Distancia no soportada
        assert_eq!(table.rate(0, VehicleClass::Damas), None);
        assert_eq!(table.currency(), "KRW");
    }

    #[test]
    fn test_rejects_malformed_tables() {
        assert!(matches!(
            RateTable::from_json_str(r#"{"ranges": {"KM_X": {"DAMAS": 1}}}"#),
            Err(RateTableError::InvalidRangeKey(_))
        ));
        assert!(matches!(
            RateTable::from_json_str(r#"{"ranges": {"KM_1_3": {"DAMAS": 1}}}"#),
            Err(RateTableError::MisalignedRangeKey(key)) if key == "KM_1_3"
        ));
        assert!(matches!(
            RateTable::from_json_str(r#"{"ranges": {"KM_51_60": {"DAMAS": 1}}}"#),
            Err(RateTableError::MisalignedRangeKey(_))
        ));
        assert!(matches!(
            RateTable::from_json_str(r#"{"ranges": {"KM_501_510": {"DAMAS": 1}}}"#),
            Err(RateTableError::MisalignedRangeKey(_))
        ));
        assert!(matches!(
            RateTable::from_json_str(r#"{"ranges": {"KM_1_2": {"BUS": 1}}}"#),
            Err(RateTableError::UnknownVehicleClass { .. })
        ));
        assert!(matches!(
            RateTable::from_json_str(r#"{"ranges": {}}"#),
            Err(RateTableError::Empty)
        ));
        assert!(RateTable::from_json_str("not json").is_err());
        assert!(RateTable::load_from_path("/nonexistent/rates.json").is_err());
    }

    #[test]
    fn test_bundled_table_covers_every_band_and_class() {
        let table = bundled_table();
        for km in 1..=MAX_SUPPORTED_KM {
            for class in VehicleClass::ALL {
                assert!(table.rate(km, class).is_some(), "missing {} km {}", km, class);
            }
        }
    }

    #[test]
    fn test_bundled_table_is_monotone_in_distance() {
        let table = bundled_table();
        for class in VehicleClass::ALL {
            let rates: Vec<i64> = (1..=MAX_SUPPORTED_KM)
                .filter_map(|km| table.rate(km, class))
                .collect();
            assert!(rates.windows(2).all(|pair| pair[0] <= pair[1]), "{}", class);
        }
    }
}
