// Common test utilities for integration tests

use async_trait::async_trait;
use rosterdns::file_source::FileSource;
use rosterdns::healthiness::{HealthState, HealthWatcher};
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{sleep, Instant};

/// In-memory stand-in for the platform's registry file watcher.
///
/// Tests swap the payload (or an error) and raise change signals by hand.
pub struct FakeFileSource {
    payload: Mutex<Result<Vec<u8>, String>>,
    change_tx: Mutex<Option<mpsc::Sender<bool>>>,
}

impl FakeFileSource {
    pub fn with_payload(payload: &[u8]) -> Arc<Self> {
        Arc::new(Self {
            payload: Mutex::new(Ok(payload.to_vec())),
            change_tx: Mutex::new(None),
        })
    }

    /// Replace the payload the next `get()` returns.
    pub fn set_payload(&self, payload: &[u8]) {
        *self.payload.lock().unwrap() = Ok(payload.to_vec());
    }

    /// Make the next `get()` fail.
    pub fn set_error(&self, message: &str) {
        *self.payload.lock().unwrap() = Err(message.to_string());
    }

    /// Raise one change signal towards the refresh worker.
    pub async fn signal_change(&self) {
        let tx = self.change_tx.lock().unwrap().clone();
        tx.expect("no subscriber on the change feed")
            .send(true)
            .await
            .expect("change feed closed");
    }

    /// Close the change feed for good.
    pub fn close_changes(&self) {
        self.change_tx.lock().unwrap().take();
    }
}

#[async_trait]
impl FileSource for FakeFileSource {
    async fn get(&self) -> anyhow::Result<Vec<u8>> {
        match &*self.payload.lock().unwrap() {
            Ok(bytes) => Ok(bytes.clone()),
            Err(message) => Err(anyhow::anyhow!("{message}")),
        }
    }

    fn subscribe(&self) -> mpsc::Receiver<bool> {
        let (tx, rx) = mpsc::channel(1);
        *self.change_tx.lock().unwrap() = Some(tx);
        rx
    }
}

/// In-memory health oracle with settable verdicts.
pub struct FakeHealthWatcher {
    states: Mutex<BTreeMap<String, HealthState>>,
    tracked: Mutex<Vec<String>>,
}

impl FakeHealthWatcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            states: Mutex::new(BTreeMap::new()),
            tracked: Mutex::new(Vec::new()),
        })
    }

    pub fn set_state(&self, ip: &str, state: HealthState) {
        self.states.lock().unwrap().insert(ip.to_string(), state);
    }

    pub fn tracked(&self) -> Vec<String> {
        self.tracked.lock().unwrap().clone()
    }
}

impl HealthWatcher for FakeHealthWatcher {
    fn health_state(&self, ip: &str) -> HealthState {
        self.states
            .lock()
            .unwrap()
            .get(ip)
            .copied()
            .unwrap_or(HealthState::Unknown)
    }

    fn track(&self, ip: &str) {
        let mut tracked = self.tracked.lock().unwrap();
        if !tracked.iter().any(|t| t == ip) {
            tracked.push(ip.to_string());
        }
    }

    fn untrack(&self, ip: &str) {
        self.tracked.lock().unwrap().retain(|t| t != ip);
    }
}

/// Poll an async condition until it holds or two seconds pass.
pub async fn eventually<F, Fut>(mut check: F, what: &str)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = Instant::now() + Duration::from_secs(2);
    loop {
        if check().await {
            return;
        }
        assert!(Instant::now() < deadline, "timed out waiting for: {what}");
        sleep(Duration::from_millis(10)).await;
    }
}

/// Assert an async condition keeps holding for a quarter second.
pub async fn consistently<F, Fut>(mut check: F, what: &str)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = Instant::now() + Duration::from_millis(250);
    while Instant::now() < deadline {
        assert!(check().await, "condition stopped holding: {what}");
        sleep(Duration::from_millis(10)).await;
    }
}
