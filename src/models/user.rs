//! Modelo de User
//!
//! Cuentas de remitentes (con datos de empresa verificados) y conductores.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::auth::UserRole;
use crate::pricing::VehicleClass;

/// Datos de empresa de un remitente
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessInfo {
    pub company_name: String,
    pub business_number: String,
    pub representative_name: String,
    /// Fecha de apertura en formato YYYYMMDD
    pub opening_date: String,
}

/// Cuenta de usuario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub business: Option<BusinessInfo>,
    pub vehicle_class: Option<VehicleClass>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Crear nuevo usuario
    pub fn new(
        email: String,
        password_hash: String,
        name: String,
        phone: Option<String>,
        role: UserRole,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            password_hash,
            name,
            phone,
            role,
            business: None,
            vehicle_class: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_business(mut self, business: BusinessInfo) -> Self {
        self.business = Some(business);
        self
    }

    pub fn with_vehicle_class(mut self, vehicle_class: Option<VehicleClass>) -> Self {
        self.vehicle_class = vehicle_class;
        self
    }
}
