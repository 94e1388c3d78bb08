use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn, Level};

use freight_market::build_app;
use freight_market::clients::{
    build_http_client, AdvisoryGenerator, ChatAdvisoryClient, DisabledAdvisory, OdcloudClient,
    TossPaymentsClient,
};
use freight_market::config::{EnvironmentConfig, StorageBackend};
use freight_market::database::DatabaseConnection;
use freight_market::pricing::RateTable;
use freight_market::repositories::Repositories;
use freight_market::state::{AppState, Collaborators};

const HTTP_CLIENT_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    let config = EnvironmentConfig::from_env().context("invalid configuration")?;

    // Configurar logging
    let level = config.log_level.parse::<Level>().unwrap_or(Level::INFO);
    tracing_subscriber::fmt().with_max_level(level).init();

    info!("🚚 Freight Market API");
    info!("================================================");
    info!("🌍 Entorno: {}", config.environment);

    // La tabla de tarifas es obligatoria
    let rate_table = RateTable::load_from_path(&config.rate_table_path)
        .with_context(|| format!("cannot load rate table from {}", config.rate_table_path))?;
    info!("💰 Tabla de tarifas cargada desde {}", config.rate_table_path);

    let repositories = match config.storage {
        StorageBackend::Postgres => {
            let db_config = config
                .database()
                .context("DATABASE_URL must be set for the postgres backend")?;
            let connection = match DatabaseConnection::connect(&db_config).await {
                Ok(conn) => conn,
                Err(e) => {
                    error!("❌ Error conectando a la base de datos: {}", e);
                    return Err(anyhow::anyhow!("Error de base de datos: {}", e));
                }
            };
            Repositories::postgres(connection.pool().clone())
        }
        StorageBackend::Memory => {
            if config.is_production() {
                warn!("⚠️ Almacenamiento en memoria en producción");
            }
            warn!("⚠️ Almacenamiento en memoria: los datos se pierden al reiniciar");
            Repositories::in_memory()
        }
    };

    let http = build_http_client(HTTP_CLIENT_TIMEOUT)?;
    let advisory: Arc<dyn AdvisoryGenerator> = if config.advisory.enabled {
        info!("🤖 Generador de asesoramiento habilitado ({})", config.advisory.model);
        Arc::new(ChatAdvisoryClient::new(http.clone(), config.advisory.clone()))
    } else {
        Arc::new(DisabledAdvisory)
    };
    let collaborators = Collaborators {
        payment_processor: Arc::new(TossPaymentsClient::new(http.clone(), config.payment.clone())),
        business_registry: Arc::new(OdcloudClient::new(http, config.business_registry.clone())),
        advisory,
    };

    let addr: SocketAddr = config
        .server_url()
        .parse()
        .with_context(|| format!("invalid listen address {}", config.server_url()))?;
    let admin = config.admin.clone();

    let state = AppState::new(config, repositories, Arc::new(rate_table), collaborators);

    let seeded = state.checklist.seed_defaults().await?;
    if seeded > 0 {
        info!("📋 {} elementos de checklist por defecto", seeded);
    }
    if let Some(admin) = admin {
        state.accounts.ensure_admin(&admin).await?;
    }

    let app = build_app(state);

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health");
    info!("   POST /api/auth/signup/shipper | /api/auth/signup/driver | /api/auth/login");
    info!("   *    /api/quotes, /api/matches, /api/counter-offers");
    info!("   *    /api/notifications, /api/payments");
    info!("   GET  /api/announcements, /api/checklist-items");
    info!("   *    /api/admin/announcements, /api/admin/surcharge-options");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("❌ Error del servidor: {}", e);
            e
        })?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo escuchar Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el manejador de señales: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
