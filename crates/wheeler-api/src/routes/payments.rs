//! # Payment Routes
//!
//! - `GET /api/car/braintree/token` — client token for the drop-in UI.
//! - `POST /api/car/braintree/payment` — charge a cart for a signed-in buyer.
//!
//! Checkout records a `pending` order before the gateway is called, then
//! settles or fails it with the gateway's answer. An order that cannot be
//! recorded is never charged.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;
use wheeler_core::cart_total;
use wheeler_payments::{PaymentGateway, SaleRequest};

use crate::auth::CallerIdentity;
use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::{AppState, CartItem, OrderRecord, OrderStatus};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub success: bool,
    pub client_token: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PaymentRequest {
    /// Payment method nonce from the client SDK.
    pub nonce: String,
    pub cart: Vec<CartItem>,
}

impl Validate for PaymentRequest {
    fn validate(&self) -> Result<(), String> {
        if self.nonce.trim().is_empty() {
            return Err("nonce is required".into());
        }
        if self.cart.is_empty() {
            return Err("cart must not be empty".into());
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaymentResponse {
    pub ok: bool,
    pub order: OrderRecord,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/car/braintree/token", get(client_token))
        .route("/api/car/braintree/payment", post(pay))
}

fn gateway(state: &AppState) -> Result<Arc<dyn PaymentGateway>, AppError> {
    state
        .payments
        .clone()
        .ok_or_else(|| AppError::ServiceUnavailable("payment gateway is not configured".into()))
}

/// GET /api/car/braintree/token
#[utoipa::path(
    get,
    path = "/api/car/braintree/token",
    responses(
        (status = 200, description = "Client token issued", body = TokenResponse),
        (status = 500, description = "Gateway error", body = crate::error::ErrorBody),
        (status = 503, description = "Gateway not configured", body = crate::error::ErrorBody),
    ),
    tag = "payments"
)]
pub async fn client_token(State(state): State<AppState>) -> Result<Json<TokenResponse>, AppError> {
    let token = gateway(&state)?.client_token().await?;
    Ok(Json(TokenResponse {
        success: true,
        client_token: token.0,
    }))
}

/// POST /api/car/braintree/payment — Charge the cart total.
#[utoipa::path(
    post,
    path = "/api/car/braintree/payment",
    request_body = PaymentRequest,
    responses(
        (status = 200, description = "Payment settled", body = PaymentResponse),
        (status = 400, description = "Invalid cart or nonce", body = crate::error::ErrorBody),
        (status = 401, description = "Not signed in", body = crate::error::ErrorBody),
        (status = 500, description = "Gateway error or decline", body = crate::error::ErrorBody),
        (status = 503, description = "Gateway not configured", body = crate::error::ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "payments"
)]
pub async fn pay(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<PaymentRequest>, JsonRejection>,
) -> Result<Json<PaymentResponse>, AppError> {
    let gateway = gateway(&state)?;
    let req = extract_validated_json(body)?;
    let amount = cart_total(req.cart.iter().map(|item| item.price))?;

    let now = Utc::now();
    let mut order = OrderRecord {
        id: Uuid::new_v4(),
        products: req.cart,
        payment: json!({ "amount": amount }),
        buyer: caller.user_id,
        status: OrderStatus::Pending,
        created_at: now,
        updated_at: now,
    };

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::orders::insert(pool, &order).await {
            tracing::error!(order_id = %order.id, error = %e, "failed to persist pending order");
            return Err(AppError::Internal("order database persist failed".into()));
        }
    }
    state.orders.insert(order.clone());

    let sale = SaleRequest {
        nonce: req.nonce,
        amount,
    };
    let result = gateway.sale(&sale).await;

    let (status, payment) = match &result {
        Ok(outcome) => (
            OrderStatus::Settled,
            json!({
                "transactionId": outcome.transaction_id,
                "status": outcome.status,
                "amount": outcome.amount,
                "gateway": outcome.raw,
            }),
        ),
        Err(e) => (
            OrderStatus::Failed,
            json!({ "amount": amount, "error": e.to_string() }),
        ),
    };
    order.status = status;
    order.payment = payment;
    order.updated_at = Utc::now();
    record_outcome(&state, &order).await;

    match result {
        Ok(outcome) => {
            tracing::info!(
                order_id = %order.id,
                buyer = %order.buyer,
                %amount,
                transaction_id = %outcome.transaction_id,
                gateway = gateway.name(),
                "payment settled"
            );
            Ok(Json(PaymentResponse { ok: true, order }))
        }
        Err(e) => {
            tracing::warn!(order_id = %order.id, buyer = %order.buyer, %amount, "payment failed");
            Err(e.into())
        }
    }
}

/// Write the final status. The charge has already happened, so a failed
/// write is logged and does not fail the request.
async fn record_outcome(state: &AppState, order: &OrderRecord) {
    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::orders::update_status(
            pool,
            order.id,
            order.status,
            &order.payment,
            order.updated_at,
        )
        .await
        {
            tracing::error!(
                order_id = %order.id,
                status = %order.status,
                error = %e,
                "failed to persist order outcome"
            );
        }
    }
    state.orders.insert(order.clone());
}
