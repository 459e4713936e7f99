//! # Braintree GraphQL Client
//!
//! Real HTTP implementation of [`PaymentGateway`] against the Braintree
//! GraphQL API. Authenticates with HTTP Basic (public key / private key)
//! and pins the `Braintree-Version` header.
//!
//! ## Operations
//!
//! - `createClientToken` — token for the client-side drop-in.
//! - `chargePaymentMethod` — authorize and submit for settlement in one
//!   step, for a single-use nonce.
//!
//! A 200 response may still carry GraphQL `errors`; those map to
//! [`PaymentError::Gateway`]. A transaction that comes back in a
//! non-approved status maps to [`PaymentError::Declined`].

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::{ClientToken, PaymentError, PaymentGateway, SaleOutcome, SaleRequest};

/// API version pinned on every request.
pub const API_VERSION: &str = "2019-01-01";

const CLIENT_TOKEN_MUTATION: &str =
    "mutation ClientToken($input: CreateClientTokenInput) { createClientToken(input: $input) { clientToken } }";

const CHARGE_MUTATION: &str = "mutation Charge($input: ChargePaymentMethodInput!) { \
    chargePaymentMethod(input: $input) { \
    transaction { id status amount { value currencyCode } } } }";

/// Transaction statuses that count as a successful sale.
const APPROVED_STATUSES: &[&str] = &[
    "AUTHORIZED",
    "SUBMITTED_FOR_SETTLEMENT",
    "SETTLEMENT_PENDING",
    "SETTLING",
    "SETTLED",
];

/// Braintree environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BraintreeEnvironment {
    #[default]
    Sandbox,
    Production,
}

impl BraintreeEnvironment {
    pub fn graphql_url(self) -> &'static str {
        match self {
            Self::Sandbox => "https://payments.sandbox.braintree-api.com/graphql",
            Self::Production => "https://payments.braintree-api.com/graphql",
        }
    }
}

impl FromStr for BraintreeEnvironment {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sandbox" => Ok(Self::Sandbox),
            "production" => Ok(Self::Production),
            other => Err(PaymentError::Config(format!(
                "unknown Braintree environment '{other}'"
            ))),
        }
    }
}

/// Configuration for [`BraintreeGateway`].
#[derive(Clone)]
pub struct BraintreeConfig {
    pub environment: BraintreeEnvironment,
    pub public_key: String,
    pub private_key: String,
    /// Overrides the environment URL (tests, proxies).
    pub endpoint: Option<String>,
    /// Request timeout in seconds (default: 30).
    pub timeout_secs: u64,
}

impl BraintreeConfig {
    pub fn new(
        environment: BraintreeEnvironment,
        public_key: impl Into<String>,
        private_key: impl Into<String>,
    ) -> Self {
        Self {
            environment,
            public_key: public_key.into(),
            private_key: private_key.into(),
            endpoint: None,
            timeout_secs: 30,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }
}

impl fmt::Debug for BraintreeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BraintreeConfig")
            .field("environment", &self.environment)
            .field("public_key", &self.public_key)
            .field("private_key", &"[REDACTED]")
            .field("endpoint", &self.endpoint)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClientTokenData {
    create_client_token: Option<ClientTokenPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClientTokenPayload {
    client_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChargeData {
    charge_payment_method: Option<ChargePayload>,
}

#[derive(Debug, Deserialize)]
struct ChargePayload {
    transaction: TransactionNode,
}

#[derive(Debug, Deserialize)]
struct TransactionNode {
    id: String,
    status: String,
    amount: AmountNode,
}

#[derive(Debug, Deserialize)]
struct AmountNode {
    value: String,
}

/// Braintree GraphQL gateway client.
pub struct BraintreeGateway {
    client: reqwest::Client,
    endpoint: String,
    public_key: String,
    private_key: String,
}

impl fmt::Debug for BraintreeGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BraintreeGateway")
            .field("endpoint", &self.endpoint)
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

impl BraintreeGateway {
    pub fn new(config: BraintreeConfig) -> Result<Self, PaymentError> {
        if config.public_key.trim().is_empty() || config.private_key.trim().is_empty() {
            return Err(PaymentError::Config(
                "Braintree public and private keys are required".into(),
            ));
        }

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Braintree-Version",
            reqwest::header::HeaderValue::from_static(API_VERSION),
        );

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| PaymentError::Config(format!("failed to build HTTP client: {e}")))?;

        let endpoint = config
            .endpoint
            .unwrap_or_else(|| config.environment.graphql_url().to_string());

        Ok(Self {
            client,
            endpoint,
            public_key: config.public_key,
            private_key: config.private_key,
        })
    }

    /// POST a GraphQL document and return both the raw payload and its
    /// typed `data` section.
    async fn execute<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<(serde_json::Value, T), PaymentError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .basic_auth(&self.public_key, Some(&self.private_key))
            .json(&serde_json::json!({ "query": query, "variables": variables }))
            .send()
            .await
            .map_err(|source| PaymentError::Http { operation, source })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PaymentError::Api {
                operation,
                status: status.as_u16(),
                body,
            });
        }

        let raw: serde_json::Value = resp.json().await.map_err(|e| {
            PaymentError::Deserialization {
                operation,
                reason: e.to_string(),
            }
        })?;
        let parsed: GraphQlResponse<T> =
            serde_json::from_value(raw.clone()).map_err(|e| PaymentError::Deserialization {
                operation,
                reason: e.to_string(),
            })?;

        if !parsed.errors.is_empty() {
            let message = parsed
                .errors
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(PaymentError::Gateway { operation, message });
        }

        let data = parsed.data.ok_or_else(|| PaymentError::Deserialization {
            operation,
            reason: "response has neither data nor errors".into(),
        })?;
        Ok((raw, data))
    }
}

/// Render an amount the way the gateway expects: two decimal places.
///
/// Amounts that would need rounding are refused, so the charge is always
/// exactly the requested total.
pub fn format_amount(amount: Decimal) -> Result<String, PaymentError> {
    let mut exact = amount.normalize();
    if exact.scale() > 2 {
        return Err(PaymentError::InvalidAmount(amount));
    }
    exact.rescale(2);
    Ok(exact.to_string())
}

#[async_trait]
impl PaymentGateway for BraintreeGateway {
    fn name(&self) -> &'static str {
        "braintree"
    }

    async fn client_token(&self) -> Result<ClientToken, PaymentError> {
        let (_, data): (_, ClientTokenData) = self
            .execute(
                "createClientToken",
                CLIENT_TOKEN_MUTATION,
                serde_json::json!({ "input": {} }),
            )
            .await?;

        let payload = data
            .create_client_token
            .ok_or_else(|| PaymentError::Deserialization {
                operation: "createClientToken",
                reason: "missing createClientToken payload".into(),
            })?;
        Ok(ClientToken(payload.client_token))
    }

    async fn sale(&self, request: &SaleRequest) -> Result<SaleOutcome, PaymentError> {
        let amount = format_amount(request.amount)?;
        let variables = serde_json::json!({
            "input": {
                "paymentMethodId": request.nonce,
                "transaction": { "amount": amount },
            }
        });

        let (raw, data): (_, ChargeData) = self
            .execute("chargePaymentMethod", CHARGE_MUTATION, variables)
            .await?;

        let transaction = data
            .charge_payment_method
            .map(|p| p.transaction)
            .ok_or_else(|| PaymentError::Deserialization {
                operation: "chargePaymentMethod",
                reason: "missing transaction payload".into(),
            })?;

        if !APPROVED_STATUSES.contains(&transaction.status.as_str()) {
            tracing::warn!(
                transaction_id = %transaction.id,
                status = %transaction.status,
                "Braintree transaction not approved"
            );
            return Err(PaymentError::Declined {
                transaction_id: transaction.id,
                status: transaction.status,
            });
        }

        let charged = Decimal::from_str(&transaction.amount.value).map_err(|e| {
            PaymentError::Deserialization {
                operation: "chargePaymentMethod",
                reason: format!("invalid amount '{}': {e}", transaction.amount.value),
            }
        })?;

        tracing::info!(
            transaction_id = %transaction.id,
            status = %transaction.status,
            amount = %charged,
            "Braintree sale accepted"
        );

        Ok(SaleOutcome {
            transaction_id: transaction.id,
            status: transaction.status,
            amount: charged,
            raw,
        })
    }
}
