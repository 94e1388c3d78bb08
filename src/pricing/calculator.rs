//! Calculadora de precios
//!
//! Función pura sobre la tabla de tarifas inmutable:
//! tarifa base → recargos → tarifas de manipulación → mínimo/máximo →
//! estimación ponderada (min + 4·mid + max) / 6 → comisión de plataforma →
//! descuento por envío combinado.

use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;

use super::distance_range::resolve_key;
use super::money::{round_half_up, to_won};
use super::rate_table::RateTable;
use super::surcharge::{SurchargeKind, SurchargeRule};
use super::vehicle_class::{LoadHandlingMethod, VehicleClass};
use super::PricingError;

/// Tarifa por lado de carga o descarga realizado por el conductor
pub const DRIVER_HANDLING_FEE_WON: i64 = 10_000;

/// Comisión de plataforma (10%)
pub fn platform_fee_rate() -> Decimal {
    Decimal::new(10, 2)
}

/// Descuento por envío combinado (30%)
pub fn combine_discount_rate() -> Decimal {
    Decimal::new(30, 2)
}

/// Parámetros de una estimación
#[derive(Debug, Clone)]
pub struct PricingInput<'a> {
    pub distance_km: i32,
    pub vehicle_class: VehicleClass,
    pub surcharges: &'a [SurchargeRule],
    pub load_method: LoadHandlingMethod,
    pub unload_method: LoadHandlingMethod,
    pub combined_shipment: bool,
}

/// Resultado con todos los valores intermedios
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricingResult {
    pub vehicle_class: VehicleClass,
    pub distance_range_key: String,
    pub rate_won: Decimal,
    pub base_total_won: Decimal,
    pub extra_min_won: Decimal,
    pub extra_max_won: Decimal,
    pub multiplier_min: Decimal,
    pub multiplier_max: Decimal,
    pub total_min_won: Decimal,
    pub total_max_won: Decimal,
    pub total_mid_won: Decimal,
    pub weighted_won: Decimal,
    pub platform_fee_rate: Decimal,
    pub platform_fee_won: Decimal,
    pub final_charge_won: Decimal,
    pub combined_shipment: bool,
    pub combine_discount_rate: Decimal,
    pub combine_discount_won: Decimal,
    pub final_charge_after_discount_won: Decimal,
}

/// Calculadora compartida entre servicios
#[derive(Debug, Clone)]
pub struct PricingCalculator {
    rate_table: Arc<RateTable>,
}

impl PricingCalculator {
    pub fn new(rate_table: Arc<RateTable>) -> Self {
        Self { rate_table }
    }

    /// Calcular la estimación completa
    pub fn estimate(&self, input: &PricingInput<'_>) -> Result<PricingResult, PricingError> {
        let range = resolve_key(input.distance_km)
            .ok_or(PricingError::UnsupportedDistance(input.distance_km))?;
        let rate = self
            .rate_table
            .rate_for_key(&range, input.vehicle_class)
            .map(Decimal::from)
            .ok_or(PricingError::UnsupportedVehicleClass(input.vehicle_class))?;

        let base_total = rate;

        let mut extra_min = Decimal::ZERO;
        let mut extra_max = Decimal::ZERO;
        let mut multiplier: Option<(Decimal, Decimal)> = None;

        for rule in input.surcharges {
            match &rule.kind {
                SurchargeKind::Add { min, max } => {
                    extra_min = add(extra_min, *min)?;
                    extra_max = add(extra_max, *max)?;
                }
                SurchargeKind::Fixed { amount } => {
                    extra_min = add(extra_min, *amount)?;
                    extra_max = add(extra_max, *amount)?;
                }
                SurchargeKind::FixedByVehicle { amounts } => {
                    let amount = amounts.get(&input.vehicle_class).ok_or_else(|| {
                        PricingError::OptionUnavailableForVehicle {
                            code: rule.code.clone(),
                            vehicle: input.vehicle_class,
                        }
                    })?;
                    extra_min = add(extra_min, *amount)?;
                    extra_max = add(extra_max, *amount)?;
                }
                SurchargeKind::Mult { min, max } => {
                    if multiplier.is_some() {
                        return Err(PricingError::ConflictingMultipliers);
                    }
                    multiplier = Some((*min, *max));
                }
            }
        }

        let handling_fee = Decimal::from(DRIVER_HANDLING_FEE_WON);
        for method in [input.load_method, input.unload_method] {
            if method == LoadHandlingMethod::Driver {
                extra_min = add(extra_min, handling_fee)?;
                extra_max = add(extra_max, handling_fee)?;
            }
        }

        let (multiplier_min, multiplier_max) = multiplier.unwrap_or((Decimal::ONE, Decimal::ONE));

        let total_min = add(mul(base_total, multiplier_min)?, extra_min)?;
        let total_max = add(mul(base_total, multiplier_max)?, extra_max)?;
        let total_mid = round_half_up(add(total_min, total_max)? / Decimal::TWO);
        let weighted_sum = add(add(total_min, mul(Decimal::from(4), total_mid)?)?, total_max)?;
        let weighted = round_half_up(weighted_sum / Decimal::from(6));

        let fee_rate = platform_fee_rate();
        let platform_fee = round_half_up(mul(weighted, fee_rate)?);
        let final_charge = add(weighted, platform_fee)?;
        // El cargo final es el mayor importe y debe caber en won enteros
        to_won(final_charge)?;

        let discount_rate = if input.combined_shipment {
            combine_discount_rate()
        } else {
            Decimal::ZERO
        };
        let discount = if input.combined_shipment {
            round_half_up(final_charge * discount_rate)
        } else {
            Decimal::ZERO
        };

        Ok(PricingResult {
            vehicle_class: input.vehicle_class,
            distance_range_key: range.to_string(),
            rate_won: rate,
            base_total_won: base_total,
            extra_min_won: extra_min,
            extra_max_won: extra_max,
            multiplier_min,
            multiplier_max,
            total_min_won: total_min,
            total_max_won: total_max,
            total_mid_won: total_mid,
            weighted_won: weighted,
            platform_fee_rate: fee_rate,
            platform_fee_won: platform_fee,
            final_charge_won: final_charge,
            combined_shipment: input.combined_shipment,
            combine_discount_rate: discount_rate,
            combine_discount_won: discount,
            final_charge_after_discount_won: final_charge - discount,
        })
    }
}

fn add(left: Decimal, right: Decimal) -> Result<Decimal, PricingError> {
    left.checked_add(right).ok_or(PricingError::AmountOutOfRange)
}

fn mul(left: Decimal, right: Decimal) -> Result<Decimal, PricingError> {
    left.checked_mul(right).ok_or(PricingError::AmountOutOfRange)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::surcharge::built_in_rule;

    fn calculator() -> PricingCalculator {
        let table = RateTable::from_json_str(
            r#"{"ranges": {
                "KM_1_2": {"DAMAS": 32000, "TON_1": 100000},
                "KM_3_4": {"DAMAS": 33000, "TON_1": 101000}
            }}"#,
        )
        .unwrap();
        PricingCalculator::new(Arc::new(table))
    }

    fn input(distance_km: i32, vehicle_class: VehicleClass, surcharges: &[SurchargeRule]) -> PricingInput<'_> {
        PricingInput {
            distance_km,
            vehicle_class,
            surcharges,
            load_method: LoadHandlingMethod::Shipper,
            unload_method: LoadHandlingMethod::Shipper,
            combined_shipment: false,
        }
    }

    fn won(value: i64) -> Decimal {
        Decimal::from(value)
    }

    #[test]
    fn test_base_rate_only() {
        let result = calculator().estimate(&input(1, VehicleClass::Damas, &[])).unwrap();

        assert_eq!(result.distance_range_key, "KM_1_2");
        assert_eq!(result.total_min_won, won(32_000));
        assert_eq!(result.total_max_won, won(32_000));
        assert_eq!(result.weighted_won, won(32_000));
        assert_eq!(result.platform_fee_won, won(3_200));
        assert_eq!(result.final_charge_won, won(35_200));
        assert_eq!(result.final_charge_after_discount_won, won(35_200));
        assert_eq!(result.combine_discount_won, Decimal::ZERO);
    }

    #[test]
    fn test_weighted_estimate_fixture() {
        // min 100000, max 200000 → mid 150000 → ponderado 150000
        let rules = [SurchargeRule::add("WIDE", 0, 100_000).unwrap()];
        let mut request = input(2, VehicleClass::Ton1, &rules);
        request.combined_shipment = true;

        let result = calculator().estimate(&request).unwrap();

        assert_eq!(result.total_min_won, won(100_000));
        assert_eq!(result.total_max_won, won(200_000));
        assert_eq!(result.total_mid_won, won(150_000));
        assert_eq!(result.weighted_won, won(150_000));
        assert_eq!(result.platform_fee_won, won(15_000));
        assert_eq!(result.final_charge_won, won(165_000));
        assert_eq!(result.combine_discount_won, won(49_500));
        assert_eq!(result.final_charge_after_discount_won, won(115_500));
    }

    #[test]
    fn test_multiplier_applies_to_base_only() {
        let rules = [
            built_in_rule("ANTI_VIBRATION_WINGBODY").unwrap(),
            built_in_rule("WINGBODY_TOP").unwrap(),
        ];
        let result = calculator().estimate(&input(1, VehicleClass::Ton1, &rules)).unwrap();

        // 100000 × 2.0 + 30000 y 100000 × 2.5 + 30000
        assert_eq!(result.total_min_won, won(230_000));
        assert_eq!(result.total_max_won, won(280_000));
        assert_eq!(result.total_mid_won, won(255_000));
        assert_eq!(result.weighted_won, won(255_000));
    }

    #[test]
    fn test_driver_handling_fee_per_side() {
        let rules = [built_in_rule("COLD_CHAIN").unwrap()];
        let mut request = input(1, VehicleClass::Damas, &rules);
        request.load_method = LoadHandlingMethod::Driver;

        let one_side = calculator().estimate(&request).unwrap();
        assert_eq!(one_side.total_min_won, won(92_000));
        assert_eq!(one_side.total_max_won, won(142_000));
        assert_eq!(one_side.weighted_won, won(117_000));
        assert_eq!(one_side.final_charge_won, won(128_700));

        request.unload_method = LoadHandlingMethod::Driver;
        let both_sides = calculator().estimate(&request).unwrap();
        assert_eq!(both_sides.extra_min_won, won(70_000));
        assert_eq!(both_sides.extra_max_won, won(120_000));
    }

    #[test]
    fn test_half_up_rounding_of_mid_and_weighted() {
        let rules = [SurchargeRule::add("ODD", 1, 2).unwrap()];
        let result = calculator().estimate(&input(2, VehicleClass::Ton1, &rules)).unwrap();

        // mid = 100001.5 → 100002; ponderado = 600011 / 6 = 100001.83 → 100002
        assert_eq!(result.total_mid_won, won(100_002));
        assert_eq!(result.weighted_won, won(100_002));
        assert_eq!(result.platform_fee_won, won(10_000));
    }

    #[test]
    fn test_rejections() {
        let calc = calculator();

        assert_eq!(
            calc.estimate(&input(0, VehicleClass::Damas, &[])),
            Err(PricingError::UnsupportedDistance(0))
        );
        assert_eq!(
            calc.estimate(&input(501, VehicleClass::Damas, &[])),
            Err(PricingError::UnsupportedDistance(501))
        );
        assert_eq!(
            calc.estimate(&input(1, VehicleClass::Ton25, &[])),
            Err(PricingError::UnsupportedVehicleClass(VehicleClass::Ton25))
        );

        let two_multipliers = [
            built_in_rule("ANTI_VIBRATION_WINGBODY").unwrap(),
            SurchargeRule::mult("OTHER", Decimal::ONE, Decimal::TWO).unwrap(),
        ];
        assert_eq!(
            calc.estimate(&input(1, VehicleClass::Ton1, &two_multipliers)),
            Err(PricingError::ConflictingMultipliers)
        );

        let lift = [built_in_rule("LIFT").unwrap()];
        assert!(matches!(
            calc.estimate(&input(1, VehicleClass::Damas, &lift)),
            Err(PricingError::OptionUnavailableForVehicle { .. })
        ));
    }

    #[test]
    fn test_out_of_range_amounts_are_rejected() {
        let calc = calculator();

        // Reglas construidas a mano, sin pasar por las cotas de SurchargeRule::new
        let huge_multiplier = [SurchargeRule {
            code: "HUGE".to_string(),
            kind: SurchargeKind::Mult {
                min: Decimal::ONE,
                max: Decimal::MAX,
            },
        }];
        assert_eq!(
            calc.estimate(&input(1, VehicleClass::Ton1, &huge_multiplier)),
            Err(PricingError::AmountOutOfRange)
        );

        let huge_addition = [SurchargeRule {
            code: "HUGE".to_string(),
            kind: SurchargeKind::Add {
                min: Decimal::from(i64::MAX),
                max: Decimal::from(i64::MAX),
            },
        }];
        assert_eq!(
            calc.estimate(&input(1, VehicleClass::Ton1, &huge_addition)),
            Err(PricingError::AmountOutOfRange)
        );
    }

    #[test]
    fn test_outputs_never_decrease_with_distance() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/resources/pricing_rate_table.json");
        let calc = PricingCalculator::new(Arc::new(RateTable::load_from_path(path).unwrap()));
        let rules = [
            built_in_rule("COLD_CHAIN").unwrap(),
            built_in_rule("ANTI_VIBRATION_WINGBODY").unwrap(),
            built_in_rule("LIFT").unwrap(),
        ];

        for class in [VehicleClass::Ton1, VehicleClass::Ton5, VehicleClass::Ton25] {
            let mut previous: Option<PricingResult> = None;
            for km in 1..=crate::pricing::MAX_SUPPORTED_KM {
                let mut request = input(km, class, &rules);
                request.unload_method = LoadHandlingMethod::Driver;
                let current = calc.estimate(&request).unwrap();

                if let Some(prev) = &previous {
                    assert!(current.total_min_won >= prev.total_min_won, "{} {} km", class, km);
                    assert!(current.total_max_won >= prev.total_max_won, "{} {} km", class, km);
                    assert!(current.weighted_won >= prev.weighted_won, "{} {} km", class, km);
                    assert!(
                        current.final_charge_won >= prev.final_charge_won,
                        "{} {} km",
                        class,
                        km
                    );
                }
                previous = Some(current);
            }
        }
    }

    #[test]
    fn test_combined_discount_identity() {
        let calc = calculator();
        for km in [1, 3] {
            for class in [VehicleClass::Damas, VehicleClass::Ton1] {
                let mut request = input(km, class, &[]);
                request.combined_shipment = true;
                let result = calc.estimate(&request).unwrap();
                let expected_discount = round_half_up(result.final_charge_won * Decimal::new(30, 2));
                assert_eq!(result.combine_discount_won, expected_discount);
                assert_eq!(
                    result.final_charge_after_discount_won,
                    result.final_charge_won - expected_discount
                );
            }
        }
    }
}
