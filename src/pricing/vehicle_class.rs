//! Clases de vehículo y método de carga/descarga
//!
//! El orden de declaración es significativo: la "clase superior" de un
//! vehículo es su sucesor en `VehicleClass::ALL`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::PricingError;

/// Clases de capacidad ordenadas de menor a mayor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VehicleClass {
    #[serde(rename = "DAMAS")]
    Damas,
    #[serde(rename = "LABO")]
    Labo,
    #[serde(rename = "TON_1")]
    Ton1,
    #[serde(rename = "TON_1_4")]
    Ton1_4,
    #[serde(rename = "TON_2_5")]
    Ton2_5,
    #[serde(rename = "TON_3_5")]
    Ton3_5,
    #[serde(rename = "TON_5")]
    Ton5,
    #[serde(rename = "TON_5_AXLE")]
    Ton5Axle,
    #[serde(rename = "TON_8")]
    Ton8,
    #[serde(rename = "TON_11")]
    Ton11,
    #[serde(rename = "TON_14")]
    Ton14,
    #[serde(rename = "TON_15")]
    Ton15,
    #[serde(rename = "TON_18")]
    Ton18,
    #[serde(rename = "TON_25")]
    Ton25,
}

impl VehicleClass {
    pub const ALL: [VehicleClass; 14] = [
        VehicleClass::Damas,
        VehicleClass::Labo,
        VehicleClass::Ton1,
        VehicleClass::Ton1_4,
        VehicleClass::Ton2_5,
        VehicleClass::Ton3_5,
        VehicleClass::Ton5,
        VehicleClass::Ton5Axle,
        VehicleClass::Ton8,
        VehicleClass::Ton11,
        VehicleClass::Ton14,
        VehicleClass::Ton15,
        VehicleClass::Ton18,
        VehicleClass::Ton25,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleClass::Damas => "DAMAS",
            VehicleClass::Labo => "LABO",
            VehicleClass::Ton1 => "TON_1",
            VehicleClass::Ton1_4 => "TON_1_4",
            VehicleClass::Ton2_5 => "TON_2_5",
            VehicleClass::Ton3_5 => "TON_3_5",
            VehicleClass::Ton5 => "TON_5",
            VehicleClass::Ton5Axle => "TON_5_AXLE",
            VehicleClass::Ton8 => "TON_8",
            VehicleClass::Ton11 => "TON_11",
            VehicleClass::Ton14 => "TON_14",
            VehicleClass::Ton15 => "TON_15",
            VehicleClass::Ton18 => "TON_18",
            VehicleClass::Ton25 => "TON_25",
        }
    }

    /// Carga máxima por defecto en kilogramos
    pub fn default_capacity_kg(&self) -> i32 {
        match self {
            VehicleClass::Damas => 350,
            VehicleClass::Labo => 500,
            VehicleClass::Ton1 => 1_000,
            VehicleClass::Ton1_4 => 1_400,
            VehicleClass::Ton2_5 => 2_500,
            VehicleClass::Ton3_5 => 3_500,
            VehicleClass::Ton5 => 5_000,
            VehicleClass::Ton5Axle => 5_500,
            VehicleClass::Ton8 => 8_000,
            VehicleClass::Ton11 => 11_000,
            VehicleClass::Ton14 => 14_000,
            VehicleClass::Ton15 => 15_000,
            VehicleClass::Ton18 => 18_000,
            VehicleClass::Ton25 => 25_000,
        }
    }

    /// Siguiente clase en orden de declaración (None para la mayor)
    pub fn next_higher(&self) -> Option<VehicleClass> {
        let index = Self::ALL.iter().position(|class| class == self)?;
        Self::ALL.get(index + 1).copied()
    }
}

impl fmt::Display for VehicleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleClass {
    type Err = PricingError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_uppercase();
        Self::ALL
            .iter()
            .copied()
            .find(|class| class.as_str() == normalized)
            .ok_or_else(|| PricingError::UnknownVehicleClass(value.to_string()))
    }
}

/// Quién realiza la carga o descarga
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoadHandlingMethod {
    Shipper,
    Driver,
}

impl LoadHandlingMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadHandlingMethod::Shipper => "SHIPPER",
            LoadHandlingMethod::Driver => "DRIVER",
        }
    }
}

impl fmt::Display for LoadHandlingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoadHandlingMethod {
    type Err = PricingError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "SHIPPER" => Ok(LoadHandlingMethod::Shipper),
            "DRIVER" => Ok(LoadHandlingMethod::Driver),
            _ => Err(PricingError::UnknownLoadMethod(value.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_higher_follows_declaration_order() {
        assert_eq!(VehicleClass::Damas.next_higher(), Some(VehicleClass::Labo));
        assert_eq!(VehicleClass::Ton5.next_higher(), Some(VehicleClass::Ton5Axle));
        assert_eq!(VehicleClass::Ton25.next_higher(), None);
    }

    #[test]
    fn test_capacities_grow_with_class() {
        let capacities: Vec<i32> = VehicleClass::ALL
            .iter()
            .map(|class| class.default_capacity_kg())
            .collect();
        assert!(capacities.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_parse_and_serialize_names() {
        assert_eq!("ton_1_4".parse::<VehicleClass>().unwrap(), VehicleClass::Ton1_4);
        assert!("TON_99".parse::<VehicleClass>().is_err());

        let json = serde_json::to_string(&VehicleClass::Ton5Axle).unwrap();
        assert_eq!(json, "\"TON_5_AXLE\"");
        let parsed: LoadHandlingMethod = serde_json::from_str("\"DRIVER\"").unwrap();
        assert_eq!(parsed, LoadHandlingMethod::Driver);
    }

    #[test]
    fn test_load_method_display_matches_wire_name() {
        assert_eq!(LoadHandlingMethod::Driver.to_string(), "DRIVER");
        assert_eq!(
            format!("{} / {}", LoadHandlingMethod::Shipper, LoadHandlingMethod::Driver),
            "SHIPPER / DRIVER"
        );
    }
}
