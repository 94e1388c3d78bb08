//! Resolución de tramos de distancia
//!
//! Divide el dominio [1, 500] km en tramos fijos para que la tabla de
//! tarifas solo necesite una entrada por tramo:
//! - 1..=50: ancho 2 (`KM_1_2`, `KM_3_4`, ...)
//! - 51..=100: ancho 5 (`KM_51_55`, ...)
//! - 101..=500: ancho 10 (`KM_101_110`, ..., `KM_491_500`)

use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Distancia máxima soportada
pub const MAX_SUPPORTED_KM: i32 = 500;

/// Clave de tramo, ambos extremos incluidos
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DistanceRangeKey {
    pub min_km: i32,
    pub max_km: i32,
}

impl DistanceRangeKey {
    /// Resolver el tramo de una distancia; None si no está soportada
    pub fn resolve(distance_km: i32) -> Option<Self> {
        let (min_km, width) = match distance_km {
            d if d <= 0 => return None,
            d @ 1..=50 => (((d - 1) / 2) * 2 + 1, 2),
            d @ 51..=100 => (((d - 51) / 5) * 5 + 51, 5),
            d @ 101..=MAX_SUPPORTED_KM => (((d - 101) / 10) * 10 + 101, 10),
            _ => return None,
        };
        Some(Self {
            min_km,
            max_km: min_km + width - 1,
        })
    }

    pub fn contains(&self, distance_km: i32) -> bool {
        (self.min_km..=self.max_km).contains(&distance_km)
    }
}

/// Atajo usado por la tabla de tarifas
pub fn resolve_key(distance_km: i32) -> Option<DistanceRangeKey> {
    DistanceRangeKey::resolve(distance_km)
}

impl fmt::Display for DistanceRangeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KM_{}_{}", self.min_km, self.max_km)
    }
}

impl Serialize for DistanceRangeKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl FromStr for DistanceRangeKey {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || format!("invalid distance range key: {}", value);
        let rest = value.strip_prefix("KM_").ok_or_else(invalid)?;
        let (min, max) = rest.split_once('_').ok_or_else(invalid)?;
        let min_km: i32 = min.parse().map_err(|_| invalid())?;
        let max_km: i32 = max.parse().map_err(|_| invalid())?;
        if min_km <= 0 || max_km < min_km {
            return Err(invalid());
        }
        Ok(Self { min_km, max_km })
    }
}
