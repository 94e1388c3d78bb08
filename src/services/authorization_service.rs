//! Reglas de autorización
//!
//! Cada operación recibe el `Principal` explícitamente; estas funciones
//! solo comparan identidades y roles.

use uuid::Uuid;

use crate::models::{Match, Principal, Quote, UserRole};
use crate::utils::errors::{forbidden_error, AppResult};

/// Exige un rol concreto
pub fn require_role(principal: &Principal, role: UserRole, operation: &str) -> AppResult<()> {
    if principal.role == role {
        Ok(())
    } else {
        Err(forbidden_error(operation, &format!("requires {} role", role)))
    }
}

/// El remitente dueño del presupuesto
pub fn ensure_quote_owner(principal: &Principal, quote: &Quote, operation: &str) -> AppResult<()> {
    require_role(principal, UserRole::Shipper, operation)?;
    if quote.shipper_id == principal.user_id {
        Ok(())
    } else {
        Err(forbidden_error(operation, "quote belongs to another shipper"))
    }
}

/// Dueño del presupuesto o conductor aceptado del match
pub fn is_match_party(principal: &Principal, record: &Match, quote_shipper_id: Uuid) -> bool {
    match principal.role {
        UserRole::Shipper => quote_shipper_id == principal.user_id,
        UserRole::Driver => record.is_accepted_by(principal.user_id),
        UserRole::Admin => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{QuoteDraft, QuotePrices};
    use crate::pricing::{LoadHandlingMethod, VehicleClass};
    use crate::utils::errors::AppError;

    fn quote(shipper_id: Uuid) -> Quote {
        let draft = QuoteDraft {
            origin_address: "A".into(),
            origin_lat: None,
            origin_lng: None,
            destination_address: "B".into(),
            destination_lat: None,
            destination_lng: None,
            distance_km: 10,
            weight_kg: None,
            volume_cbm: None,
            vehicle_class: VehicleClass::Ton1,
            vehicle_body_type: None,
            surcharge_codes: vec![],
            cargo_type: None,
            cargo_desc: None,
            desired_price: None,
            allow_combine: false,
            load_method: LoadHandlingMethod::Shipper,
            unload_method: LoadHandlingMethod::Shipper,
            stops: vec![],
            checklist: vec![],
        };
        let prices = QuotePrices {
            base_price: 1,
            extra_price: 0,
            final_price: 1,
            desired_price: 1,
        };
        Quote::new(shipper_id, &draft, prices)
    }

    #[test]
    fn test_quote_owner_rules() {
        let shipper = Uuid::new_v4();
        let quote = quote(shipper);

        assert!(ensure_quote_owner(&Principal::shipper(shipper), &quote, "read quote").is_ok());
        assert!(matches!(
            ensure_quote_owner(&Principal::shipper(Uuid::new_v4()), &quote, "read quote"),
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            ensure_quote_owner(&Principal::driver(shipper), &quote, "read quote"),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_unaccepted_match_has_no_driver_party() {
        let shipper = Uuid::new_v4();
        let driver = Uuid::new_v4();
        let mut record = Match::new(Uuid::new_v4());

        assert!(is_match_party(&Principal::shipper(shipper), &record, shipper));
        assert!(!is_match_party(&Principal::driver(driver), &record, shipper));

        record.accept(driver).unwrap();
        assert!(is_match_party(&Principal::driver(driver), &record, shipper));
        assert!(!is_match_party(&Principal::driver(Uuid::new_v4()), &record, shipper));
        assert!(!is_match_party(&Principal::admin(shipper), &record, shipper));
    }
}
