//! Checkout Drafts
//!
//! Durable records of in-flight checkout intent. An `Opened` draft is the
//! crash-recovery anchor written before the gateway widget launches; a
//! `Succeeded` or `Failed` draft is a terminal record consumed exactly once
//! by its result page. At most one draft of each kind exists at a time, and
//! writing a new draft of a kind overwrites the prior one.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::{PaymentError, Result};
use crate::plan::BillingCycle;

/// Gateway launched, awaiting its callback
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenedDraft {
    pub plan: String,
    pub cycle: BillingCycle,
    /// Amount being charged, in rupees
    pub amount: Decimal,
}

/// Terminal: payment verified by the backend
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SucceededDraft {
    pub plan: String,
    pub cycle: BillingCycle,
    pub amount: Decimal,
    pub order_id: String,
    /// New subscription end date, when the backend reports one
    pub subscription_end: Option<DateTime<Utc>>,
}

/// Terminal: payment failed, cancelled, or interrupted
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedDraft {
    pub plan: Option<String>,
    /// Human-readable reason shown on the failure page
    pub reason: String,
}

/// Durable side-channel for checkout state that must survive a reload
///
/// `take_*` methods read and delete in one step; the at-most-once
/// consumption contract result pages rely on.
pub trait DraftStore: Send + Sync {
    fn put_opened(&self, draft: &OpenedDraft) -> Result<()>;
    fn peek_opened(&self) -> Result<Option<OpenedDraft>>;
    fn take_opened(&self) -> Result<Option<OpenedDraft>>;

    fn put_succeeded(&self, draft: &SucceededDraft) -> Result<()>;
    fn take_succeeded(&self) -> Result<Option<SucceededDraft>>;

    fn put_failed(&self, draft: &FailedDraft) -> Result<()>;
    fn take_failed(&self) -> Result<Option<FailedDraft>>;
}

const KEY_OPENED: &str = "opened";
const KEY_SUCCEEDED: &str = "succeeded";
const KEY_FAILED: &str = "failed";

/// In-memory draft store (single-process sessions and tests)
pub struct MemoryDraftStore {
    slots: RwLock<HashMap<&'static str, serde_json::Value>>,
}

impl Default for MemoryDraftStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
        }
    }

    fn put<T: Serialize>(&self, key: &'static str, value: &T) -> Result<()> {
        let json = serde_json::to_value(value)
            .map_err(|e| PaymentError::Storage(e.to_string()))?;
        self.slots.write().unwrap().insert(key, json);
        Ok(())
    }

    fn peek<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        self.slots
            .read()
            .unwrap()
            .get(key)
            .cloned()
            .map(|v| serde_json::from_value(v).map_err(|e| PaymentError::Storage(e.to_string())))
            .transpose()
    }

    fn take<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        self.slots
            .write()
            .unwrap()
            .remove(key)
            .map(|v| serde_json::from_value(v).map_err(|e| PaymentError::Storage(e.to_string())))
            .transpose()
    }
}

impl DraftStore for MemoryDraftStore {
    fn put_opened(&self, draft: &OpenedDraft) -> Result<()> {
        self.put(KEY_OPENED, draft)
    }

    fn peek_opened(&self) -> Result<Option<OpenedDraft>> {
        self.peek(KEY_OPENED)
    }

    fn take_opened(&self) -> Result<Option<OpenedDraft>> {
        self.take(KEY_OPENED)
    }

    fn put_succeeded(&self, draft: &SucceededDraft) -> Result<()> {
        self.put(KEY_SUCCEEDED, draft)
    }

    fn take_succeeded(&self) -> Result<Option<SucceededDraft>> {
        self.take(KEY_SUCCEEDED)
    }

    fn put_failed(&self, draft: &FailedDraft) -> Result<()> {
        self.put(KEY_FAILED, draft)
    }

    fn take_failed(&self) -> Result<Option<FailedDraft>> {
        self.take(KEY_FAILED)
    }
}

/// File-backed draft store: one JSON file per draft kind under a session
/// directory, so an interrupted gateway session is detectable after a
/// process restart
pub struct FileDraftStore {
    dir: PathBuf,
    // Serializes writers within this process; cross-process races are out of
    // scope, same as two browser tabs sharing session storage.
    lock: RwLock<()>,
}

impl FileDraftStore {
    /// Open (creating if needed) a store rooted at `dir`
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir).map_err(|e| PaymentError::Storage(e.to_string()))?;
        Ok(Self {
            dir,
            lock: RwLock::new(()),
        })
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let _guard = self.lock.write().unwrap();
        let bytes =
            serde_json::to_vec_pretty(value).map_err(|e| PaymentError::Storage(e.to_string()))?;
        std::fs::write(self.path(key), bytes).map_err(|e| PaymentError::Storage(e.to_string()))
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match std::fs::read(self.path(key)) {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| PaymentError::Storage(e.to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PaymentError::Storage(e.to_string())),
        }
    }

    fn peek<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let _guard = self.lock.read().unwrap();
        self.read(key)
    }

    fn take<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let _guard = self.lock.write().unwrap();
        let value = self.read(key)?;
        if value.is_some() {
            std::fs::remove_file(self.path(key))
                .map_err(|e| PaymentError::Storage(e.to_string()))?;
        }
        Ok(value)
    }
}

impl DraftStore for FileDraftStore {
    fn put_opened(&self, draft: &OpenedDraft) -> Result<()> {
        self.put(KEY_OPENED, draft)
    }

    fn peek_opened(&self) -> Result<Option<OpenedDraft>> {
        self.peek(KEY_OPENED)
    }

    fn take_opened(&self) -> Result<Option<OpenedDraft>> {
        self.take(KEY_OPENED)
    }

    fn put_succeeded(&self, draft: &SucceededDraft) -> Result<()> {
        self.put(KEY_SUCCEEDED, draft)
    }

    fn take_succeeded(&self) -> Result<Option<SucceededDraft>> {
        self.take(KEY_SUCCEEDED)
    }

    fn put_failed(&self, draft: &FailedDraft) -> Result<()> {
        self.put(KEY_FAILED, draft)
    }

    fn take_failed(&self) -> Result<Option<FailedDraft>> {
        self.take(KEY_FAILED)
    }
}
