//! Mock Payment Gateway
//!
//! For tests and demo flows. Sessions report a scripted outcome, or a
//! correctly signed completion for whatever order was launched.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{
    GatewayEvent, GatewayOrder, PaymentConfirmation, PaymentGateway, PaymentSession,
    sign_confirmation,
};
use crate::error::{PaymentError, Result};

enum Scripted {
    Event(GatewayEvent),
    /// Complete with a confirmation signed against this secret
    SignedCompletion { secret: String },
}

/// Scriptable gateway double
pub struct MockGateway {
    ready: AtomicBool,
    script: Mutex<VecDeque<Scripted>>,
    launched: Mutex<Vec<GatewayOrder>>,
    close_count: Arc<AtomicUsize>,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGateway {
    /// Ready gateway with no scripted outcomes
    pub fn new() -> Self {
        Self {
            ready: AtomicBool::new(true),
            script: Mutex::new(VecDeque::new()),
            launched: Mutex::new(Vec::new()),
            close_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Gateway whose widget never loads
    pub fn offline() -> Self {
        let gateway = Self::new();
        gateway.ready.store(false, Ordering::SeqCst);
        gateway
    }

    /// Script the next session to report `event`
    pub fn with_event(self, event: GatewayEvent) -> Self {
        self.script.lock().unwrap().push_back(Scripted::Event(event));
        self
    }

    /// Script the next session to complete with a confirmation signed
    /// against `secret` for whatever order it was launched with
    pub fn completing_with_secret(self, secret: impl Into<String>) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Scripted::SignedCompletion {
                secret: secret.into(),
            });
        self
    }

    /// Orders launched so far
    pub fn launched_orders(&self) -> Vec<GatewayOrder> {
        self.launched.lock().unwrap().clone()
    }

    /// Total `close()` invocations that actually closed a session
    pub fn close_count(&self) -> usize {
        self.close_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    async fn launch(&self, order: GatewayOrder) -> Result<Box<dyn PaymentSession>> {
        let scripted = self.script.lock().unwrap().pop_front();
        let event = match scripted {
            Some(Scripted::Event(event)) => Ok(event),
            Some(Scripted::SignedCompletion { secret }) => {
                let payment_id = format!("pay_{}", uuid::Uuid::new_v4().simple());
                let signature = sign_confirmation(&secret, &order.order_id, &payment_id);
                Ok(GatewayEvent::Completed(PaymentConfirmation {
                    order_id: order.order_id.clone(),
                    payment_id,
                    signature,
                }))
            }
            None => Err(PaymentError::Gateway("no scripted outcome".into())),
        };
        self.launched.lock().unwrap().push(order);
        Ok(Box::new(MockSession {
            event: Some(event),
            closed: false,
            close_count: Arc::clone(&self.close_count),
        }))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

struct MockSession {
    event: Option<Result<GatewayEvent>>,
    closed: bool,
    close_count: Arc<AtomicUsize>,
}

#[async_trait]
impl PaymentSession for MockSession {
    async fn wait(&mut self) -> Result<GatewayEvent> {
        self.event
            .take()
            .unwrap_or_else(|| Err(PaymentError::Gateway("session already consumed".into())))
    }

    async fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.close_count.fetch_add(1, Ordering::SeqCst);
        }
    }
}
