pub mod auth;
mod handlers;

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use async_trait::async_trait;
use axum::{
  Router,
  routing::{delete, get, post, put},
};
use tower::ServiceBuilder;
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};
use tower_http::{
  cors::{Any, CorsLayer},
  trace::TraceLayer,
};

use crate::{prelude::*, state::AppState};

pub struct Plugin;

pub fn routes(app: Arc<AppState>) -> Router {
  Router::new()
    .route("/health", get(handlers::health))
    .route("/auth/register", post(handlers::register))
    .route("/auth/login", post(handlers::login))
    .route("/auth/logout", post(handlers::logout))
    .route("/auth/me", get(handlers::me))
    .route("/users/reps", get(handlers::reps))
    .route(
      "/products",
      get(handlers::list_products).post(handlers::create_product),
    )
    .route("/products/low-stock", get(handlers::low_stock))
    .route("/products/expiring", get(handlers::expiring))
    .route(
      "/products/{id}",
      get(handlers::get_product)
        .put(handlers::update_product)
        .delete(handlers::delete_product),
    )
    .route(
      "/pharmacies",
      get(handlers::list_pharmacies).post(handlers::create_pharmacy),
    )
    .route("/pharmacies/{id}", get(handlers::get_pharmacy))
    .route("/cart/checkout", post(handlers::checkout))
    .route("/confirm-order", post(handlers::confirm_order))
    .route("/pending-orders", get(handlers::pending_orders))
    .route(
      "/pending-orders/{order_id}",
      get(handlers::pending_order).delete(handlers::cancel_order),
    )
    .route(
      "/pending-orders/confirm/{order_id}",
      put(handlers::confirm_pending),
    )
    .route("/confirmed-orders", get(handlers::confirmed_orders))
    .route("/achievements", get(handlers::achievements))
    .route("/achievements/target", put(handlers::set_target))
    .route(
      "/achievements/{rep_id}/{year}/{month}",
      get(handlers::achievement),
    )
    .route(
      "/routes",
      get(handlers::list_routes).post(handlers::plan_route),
    )
    .route("/routes/{id}", delete(handlers::delete_stop))
    .route("/routes/{id}/visited", put(handlers::mark_visited))
    .route("/reports/monthly-sales", get(handlers::monthly_sales))
    .route("/reports/rep-performance", get(handlers::rep_performance))
    .route("/reports/top-products", get(handlers::top_products))
    .route("/reports/summary", get(handlers::summary))
    .with_state(app)
}

#[async_trait]
impl super::Plugin for Plugin {
  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()> {
    let governor_conf = Arc::new(
      GovernorConfigBuilder::default()
        .per_second(2)
        .burst_size(100)
        .finish()
        .context("Failed to build rate limiter config")?,
    );

    let governor_limiter = governor_conf.limiter().clone();

    tokio::spawn(async move {
      loop {
        tokio::time::sleep(Duration::from_secs(60)).await;
        governor_limiter.retain_recent();
      }
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], app.config.port));

    let router = routes(app)
      .layer(
        ServiceBuilder::new()
          .layer(TraceLayer::new_for_http())
          .layer(GovernorLayer::new(governor_conf))
          .layer(
            CorsLayer::new()
              .allow_origin(Any)
              .allow_methods(Any)
              .allow_headers(Any),
          ),
      )
      .into_make_service_with_connect_info::<SocketAddr>();

    let listener = tokio::net::TcpListener::bind(addr)
      .await
      .with_context(|| format!("Failed to bind {addr}"))?;

    info!("HTTP Server listening on {addr}");

    axum::serve(listener, router).await.context("HTTP server failed")?;
    Ok(())
  }
}
