//! Utilidades monetarias
//!
//! Todos los importes se expresan en won sin decimales. El redondeo es
//! siempre "half-up" a cero decimales.

use num_traits::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use super::PricingError;

/// Redondeo half-up a cero decimales
pub fn round_half_up(value: Decimal) -> Decimal {
    // Los importes nunca son negativos, así que "away from zero" equivale a half-up
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Convierte un importe a won enteros (half-up); falla si no cabe en `i64`
pub fn to_won(value: Decimal) -> Result<i64, PricingError> {
    round_half_up(value)
        .to_i64()
        .ok_or(PricingError::AmountOutOfRange)
}

/// Importe entero en won a `Decimal`
pub fn won(amount: i64) -> Decimal {
    Decimal::from(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(Decimal::new(15, 1)), Decimal::from(2));
        assert_eq!(round_half_up(Decimal::new(25, 1)), Decimal::from(3));
        assert_eq!(round_half_up(Decimal::new(249, 2)), Decimal::from(2));
        assert_eq!(round_half_up(Decimal::from(7)), Decimal::from(7));
    }

    #[test]
    fn test_to_won() {
        assert_eq!(to_won(Decimal::new(100_015, 1)), Ok(10_002));
        assert_eq!(to_won(won(165_000)), Ok(165_000));
        assert_eq!(to_won(won(i64::MAX)), Ok(i64::MAX));
        assert_eq!(
            to_won(won(i64::MAX) + Decimal::ONE),
            Err(PricingError::AmountOutOfRange)
        );
    }
}
