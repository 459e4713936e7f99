//! In-process gateway for tests and offline development.

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::{ClientToken, PaymentError, PaymentGateway, SaleOutcome, SaleRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Behavior {
    Approve,
    Decline,
    Fail,
}

/// Deterministic [`PaymentGateway`] that records every sale it sees.
#[derive(Debug)]
pub struct MockPaymentGateway {
    behavior: Behavior,
    sales: Mutex<Vec<SaleRequest>>,
}

impl MockPaymentGateway {
    /// Approves every sale.
    pub fn approving() -> Self {
        Self::with_behavior(Behavior::Approve)
    }

    /// Returns a declined transaction for every sale.
    pub fn declining() -> Self {
        Self::with_behavior(Behavior::Decline)
    }

    /// Fails every call as if the gateway were unreachable.
    pub fn failing() -> Self {
        Self::with_behavior(Behavior::Fail)
    }

    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            behavior,
            sales: Mutex::new(Vec::new()),
        }
    }

    /// Sales submitted so far, in order.
    pub fn sales(&self) -> Vec<SaleRequest> {
        self.sales.lock().clone()
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn client_token(&self) -> Result<ClientToken, PaymentError> {
        match self.behavior {
            Behavior::Fail => Err(PaymentError::Gateway {
                operation: "createClientToken",
                message: "mock gateway unavailable".into(),
            }),
            _ => Ok(ClientToken("mock-client-token".into())),
        }
    }

    async fn sale(&self, request: &SaleRequest) -> Result<SaleOutcome, PaymentError> {
        let sequence = {
            let mut sales = self.sales.lock();
            sales.push(request.clone());
            sales.len()
        };
        let transaction_id = format!("mock-txn-{sequence}");

        match self.behavior {
            Behavior::Approve => Ok(SaleOutcome {
                raw: serde_json::json!({
                    "transaction": {
                        "id": transaction_id,
                        "status": "SUBMITTED_FOR_SETTLEMENT",
                        "amount": { "value": request.amount.to_string() },
                    }
                }),
                transaction_id,
                status: "SUBMITTED_FOR_SETTLEMENT".into(),
                amount: request.amount,
            }),
            Behavior::Decline => Err(PaymentError::Declined {
                transaction_id,
                status: "PROCESSOR_DECLINED".into(),
            }),
            Behavior::Fail => Err(PaymentError::Gateway {
                operation: "chargePaymentMethod",
                message: "mock gateway unavailable".into(),
            }),
        }
    }
}
