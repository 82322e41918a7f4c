//! Application setup and runtime.

use crate::{db, db::LeadStore, error::LeadError, http, smtp, smtp::SmtpAuth};
use std::net::SocketAddr;
use tracing::{error, info};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
  pub store: LeadStore,
}

/// Runtime configuration, resolved from the environment.
#[derive(Debug, Clone)]
pub struct Config {
  pub database_url: String,
  pub http_addr: String,
  pub smtp_addr: String,
  pub smtp_auth: Option<SmtpAuth>,
}

impl Config {
  pub fn from_env() -> Self {
    let var = |key: &str, default: &str| std::env::var(key).unwrap_or_else(|_| default.to_string());
    let smtp_auth = match (
      std::env::var("LEADSYNC_SMTP_USER").ok(),
      std::env::var("LEADSYNC_SMTP_PASS").ok(),
    ) {
      (Some(user), Some(pass)) => Some(SmtpAuth { user, pass }),
      _ => None,
    };
    Config {
      database_url: var("LEADSYNC_DATABASE", "sqlite://leadsync.db"),
      http_addr: var("LEADSYNC_ADDR", "127.0.0.1:8026"),
      smtp_addr: var("LEADSYNC_SMTP_ADDR", "127.0.0.1:1026"),
      smtp_auth,
    }
  }
}

/// Start the HTTP API and the SMTP intake.
pub async fn run(config: Config) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
  let pool = db::connect(&config.database_url).await?;
  let store = LeadStore::new(pool.clone());
  let state = AppState {
    store: store.clone(),
  };

  let addr: SocketAddr = config.http_addr.parse().map_err(|source| LeadError::Addr {
    addr: config.http_addr.clone(),
    source,
  })?;

  info!("lead API:          http://{}/leads", addr);
  info!("EML intake:        POST http://{}/ingest/raw", addr);

  let smtp_addr = config.smtp_addr.clone();
  let smtp_auth = config.smtp_auth.clone();
  tokio::spawn(async move {
    if let Err(e) = smtp::start_smtp(&smtp_addr, store, smtp_auth).await {
      error!("smtp intake error: {e}");
    }
  });

  let listener = tokio::net::TcpListener::bind(addr).await?;
  axum::serve(listener, http::build_router(state)).await?;
  pool.close().await;
  Ok(())
}
