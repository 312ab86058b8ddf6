// server/src/main.rs

mod config;
mod errors;
mod state;
mod web;

use crate::config::AppConfig;
use crate::state::AppState;

use actix_cors::Cors;
use actix_web::{web as actix_data, App, HttpServer};
use anyhow::Context;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

/// `LOG_FORMAT=json` switches to JSON lines; `RUST_LOG` overrides the level.
fn init_tracing() {
  let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
  let builder = tracing_subscriber::fmt()
    .with_max_level(Level::INFO)
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_span_events(FmtSpan::CLOSE);
  if json {
    builder.json().init();
  } else {
    builder.init();
  }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  dotenvy::dotenv().ok();
  init_tracing();

  tracing::info!("Starting checkout broker server...");

  let app_config = AppConfig::from_env().context("Failed to load application configuration")?;

  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  let app_state = AppState::from_config(app_config);
  tracing::info!("Checkout pipelines registered.");

  tracing::info!("Attempting to bind server to {}...", server_address);
  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(Cors::permissive())
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(web::configure_app_routes)
  })
  .bind(&server_address)
  .with_context(|| format!("Failed to bind {}", server_address))?
  .run()
  .await
  .context("Server terminated with an error")
}
