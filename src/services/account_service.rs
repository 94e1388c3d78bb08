//! Servicio de cuentas
//!
//! Alta de remitentes (con verificación en el registro mercantil) y de
//! conductores, e inicio de sesión con bcrypt + JWT.

use bcrypt::{hash, verify};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::clients::{BusinessRegistry, BusinessValidation, VALID_BUSINESS_CODE};
use crate::config::AdminAccount;
use crate::models::{BusinessInfo, User, UserRole};
use crate::pricing::VehicleClass;
use crate::repositories::UserRepository;
use crate::services::jwt_service::JwtService;
use crate::utils::errors::{conflict_error, invalid_input_error, AppError, AppResult};

/// Alta de un remitente
#[derive(Debug, Clone)]
pub struct ShipperSignup {
    pub email: String,
    pub password: String,
    pub name: String,
    pub phone: Option<String>,
    pub business: BusinessInfo,
    pub address: Option<String>,
}

/// Alta de un conductor
#[derive(Debug, Clone)]
pub struct DriverSignup {
    pub email: String,
    pub password: String,
    pub name: String,
    pub phone: Option<String>,
    pub vehicle_class: Option<VehicleClass>,
}

/// Datos públicos de la cuenta
#[derive(Debug, Clone, Serialize)]
pub struct AccountView {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub company_name: Option<String>,
    pub vehicle_class: Option<VehicleClass>,
}

impl From<&User> for AccountView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            phone: user.phone.clone(),
            role: user.role,
            company_name: user.business.as_ref().map(|b| b.company_name.clone()),
            vehicle_class: user.vehicle_class,
        }
    }
}

/// Sesión emitida al iniciar sesión
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: AccountView,
}

pub struct AccountService {
    users: Arc<dyn UserRepository>,
    registry: Arc<dyn BusinessRegistry>,
    jwt: Arc<JwtService>,
    bcrypt_cost: u32,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        registry: Arc<dyn BusinessRegistry>,
        jwt: Arc<JwtService>,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            users,
            registry,
            jwt,
            bcrypt_cost,
        }
    }

    pub async fn signup_shipper(&self, request: ShipperSignup) -> AppResult<AccountView> {
        let email = normalize_email(&request.email);
        self.ensure_email_available(&email).await?;

        let business = BusinessInfo {
            company_name: request.business.company_name.trim().to_string(),
            business_number: digits_only(&request.business.business_number),
            representative_name: request.business.representative_name.trim().to_string(),
            opening_date: digits_only(&request.business.opening_date),
        };
        self.verify_business(&business, request.address.as_deref()).await?;

        let user = User::new(
            email,
            self.hash_password(&request.password)?,
            request.name.trim().to_string(),
            request.phone,
            UserRole::Shipper,
        )
        .with_business(business);
        self.users.insert(&user).await?;

        tracing::info!("👤 Remitente {} registrado", user.id);
        Ok(AccountView::from(&user))
    }

    pub async fn signup_driver(&self, request: DriverSignup) -> AppResult<AccountView> {
        let email = normalize_email(&request.email);
        self.ensure_email_available(&email).await?;

        let user = User::new(
            email,
            self.hash_password(&request.password)?,
            request.name.trim().to_string(),
            request.phone,
            UserRole::Driver,
        )
        .with_vehicle_class(request.vehicle_class);
        self.users.insert(&user).await?;

        tracing::info!("👤 Conductor {} registrado", user.id);
        Ok(AccountView::from(&user))
    }

    pub async fn login(&self, email: &str, password: &str) -> AppResult<AuthSession> {
        let invalid = || AppError::Unauthorized("invalid email or password".to_string());

        let user = self
            .users
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or_else(invalid)?;
        let matches = verify(password, &user.password_hash).map_err(|e| AppError::Hash(e.to_string()))?;
        if !matches {
            tracing::debug!("🔐 Contraseña incorrecta para {}", user.id);
            return Err(invalid());
        }

        let access_token = self.jwt.generate_access_token(&user)?;
        tracing::info!("🔐 Sesión iniciada: {} ({})", user.id, user.role);
        Ok(AuthSession {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt.expires_in(),
            user: AccountView::from(&user),
        })
    }

    /// Crea la cuenta de administrador configurada si todavía no existe
    pub async fn ensure_admin(&self, account: &AdminAccount) -> AppResult<()> {
        let email = normalize_email(&account.email);
        if self.users.exists_by_email(&email).await? {
            return Ok(());
        }
        let admin = User::new(
            email,
            self.hash_password(&account.password)?,
            "관리자".to_string(),
            None,
            UserRole::Admin,
        );
        self.users.insert(&admin).await?;
        tracing::info!("🛡️ Cuenta de administrador {} creada", admin.email);
        Ok(())
    }

    async fn ensure_email_available(&self, email: &str) -> AppResult<()> {
        if self.users.exists_by_email(email).await? {
            return Err(conflict_error("email already registered"));
        }
        Ok(())
    }

    async fn verify_business(&self, business: &BusinessInfo, address: Option<&str>) -> AppResult<()> {
        let validation = BusinessValidation {
            business_number: business.business_number.clone(),
            opening_date: business.opening_date.clone(),
            representative_name: business.representative_name.clone(),
            company_name: Some(business.company_name.clone()).filter(|name| !name.is_empty()),
            address: address.map(str::trim).filter(|a| !a.is_empty()).map(str::to_string),
        };

        let code = self.registry.validate(&validation).await.map_err(|e| {
            tracing::warn!("⚠️ Registro mercantil no disponible: {}", e);
            AppError::ServiceUnavailable("business registry is unavailable".to_string())
        })?;

        match code.as_deref() {
            Some(VALID_BUSINESS_CODE) => Ok(()),
            other => {
                tracing::info!(
                    "🏢 Empresa {} rechazada por el registro (código {:?})",
                    business.business_number,
                    other
                );
                Err(invalid_input_error("business registration could not be verified"))
            }
        }
    }

    fn hash_password(&self, password: &str) -> AppResult<String> {
        hash(password, self.bcrypt_cost).map_err(|e| AppError::Hash(e.to_string()))
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn digits_only(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::memory::MemoryStore;
    use async_trait::async_trait;

    struct FixedRegistry(Option<&'static str>);

    #[async_trait]
    impl BusinessRegistry for FixedRegistry {
        async fn validate(&self, _business: &BusinessValidation) -> anyhow::Result<Option<String>> {
            Ok(self.0.map(str::to_string))
        }
    }

    struct BrokenRegistry;

    #[async_trait]
    impl BusinessRegistry for BrokenRegistry {
        async fn validate(&self, _business: &BusinessValidation) -> anyhow::Result<Option<String>> {
            Err(anyhow::anyhow!("connection refused"))
        }
    }

    fn service(registry: Arc<dyn BusinessRegistry>) -> AccountService {
        AccountService::new(
            Arc::new(MemoryStore::default()),
            registry,
            Arc::new(JwtService::new("test-secret", 3600)),
            4,
        )
    }

    fn shipper_signup(email: &str) -> ShipperSignup {
        ShipperSignup {
            email: email.to_string(),
            password: "password123".to_string(),
            name: "김화주".to_string(),
            phone: Some("010-1234-5678".to_string()),
            business: BusinessInfo {
                company_name: "화물상사".to_string(),
                business_number: "123-45-67890".to_string(),
                representative_name: "김대표".to_string(),
                opening_date: "20200101".to_string(),
            },
            address: None,
        }
    }

    #[tokio::test]
    async fn test_shipper_signup_and_login() {
        let service = service(Arc::new(FixedRegistry(Some("01"))));
        let account = service
            .signup_shipper(shipper_signup(" Owner@Example.com "))
            .await
            .unwrap();
        assert_eq!(account.email, "owner@example.com");
        assert_eq!(account.role, UserRole::Shipper);

        let session = service.login("owner@example.com", "password123").await.unwrap();
        assert_eq!(session.token_type, "Bearer");
        assert_eq!(session.user.id, account.id);

        let wrong = service.login("owner@example.com", "nope").await;
        assert!(matches!(wrong, Err(AppError::Unauthorized(_))));

        let duplicate = service.signup_shipper(shipper_signup("owner@example.com")).await;
        assert!(matches!(duplicate, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_registry_outcomes() {
        let rejected = service(Arc::new(FixedRegistry(Some("02"))))
            .signup_shipper(shipper_signup("a@example.com"))
            .await;
        assert!(matches!(rejected, Err(AppError::InvalidInput(_))));

        let unavailable = service(Arc::new(BrokenRegistry))
            .signup_shipper(shipper_signup("b@example.com"))
            .await;
        assert!(matches!(unavailable, Err(AppError::ServiceUnavailable(_))));
    }

    #[tokio::test]
    async fn test_driver_signup_and_admin_bootstrap() {
        let service = service(Arc::new(FixedRegistry(None)));
        let driver = service
            .signup_driver(DriverSignup {
                email: "driver@example.com".to_string(),
                password: "password123".to_string(),
                name: "박기사".to_string(),
                phone: None,
                vehicle_class: Some(VehicleClass::Ton1),
            })
            .await
            .unwrap();
        assert_eq!(driver.vehicle_class, Some(VehicleClass::Ton1));

        let admin = AdminAccount {
            email: "admin@example.com".to_string(),
            password: "admin-password".to_string(),
        };
        service.ensure_admin(&admin).await.unwrap();
        service.ensure_admin(&admin).await.unwrap();
        let session = service.login("admin@example.com", "admin-password").await.unwrap();
        assert_eq!(session.user.role, UserRole::Admin);
    }
}
