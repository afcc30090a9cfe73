//! In-memory stand-ins for the external collaborators, recording what happened and in which order.

use crate::error::{MonitorError, Result};
use crate::primitives::models::{AlertDefinition, AlertState};
use crate::reader::RemoteReader;
use crate::store::AlertStore;
use chrono::Utc;
use notifications::{Alert, Heartbeat, Notifier, NotifyError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Upsert(String, String),
    Notify(String),
    Close,
    Ping,
}

#[derive(Debug, Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<Event>>>);

impl EventLog {
    pub fn push(&self, event: Event) {
        self.0.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, event: &Event) -> usize {
        self.events().iter().filter(|e| *e == event).count()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }
}

pub fn definition(name: &str) -> AlertDefinition {
    AlertDefinition {
        name: name.to_string(),
        rpc_url: "http://localhost:8545".to_string(),
        contract_address: "0x0000000000000000000000000000000000000001".to_string(),
        function_abi_string: "function totalSupply() view returns (uint256)".to_string(),
        function_name: "totalSupply".to_string(),
        function_inputs: None,
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct FakeStoreError(pub String);

fn store_error(reason: &str) -> MonitorError {
    MonitorError::Store(Box::new(FakeStoreError(reason.to_string())))
}

pub struct FakeStore {
    log: EventLog,
    definitions: Vec<AlertDefinition>,
    states: Mutex<HashMap<String, AlertState>>,
    fail_load: bool,
    fail_upsert: bool,
}

impl FakeStore {
    pub fn new(log: &EventLog, definitions: Vec<AlertDefinition>) -> Self {
        Self {
            log: log.clone(),
            definitions,
            states: Mutex::new(HashMap::new()),
            fail_load: false,
            fail_upsert: false,
        }
    }

    pub fn with_state(self, name: &str, value: &str) -> Self {
        self.states.lock().unwrap().insert(
            name.to_string(),
            AlertState {
                name: name.to_string(),
                value: value.to_string(),
                timestamp: Utc::now(),
            },
        );
        self
    }

    pub fn failing_load(mut self) -> Self {
        self.fail_load = true;
        self
    }

    pub fn failing_upsert(mut self) -> Self {
        self.fail_upsert = true;
        self
    }

    pub fn value(&self, name: &str) -> Option<String> {
        self.state(name).map(|s| s.value)
    }

    pub fn state(&self, name: &str) -> Option<AlertState> {
        self.states.lock().unwrap().get(name).cloned()
    }
}

impl AlertStore for FakeStore {
    async fn load_definitions(&self) -> Result<Vec<AlertDefinition>> {
        if self.fail_load {
            return Err(store_error("connection refused"));
        }
        Ok(self.definitions.clone())
    }

    async fn find_state(&self, name: &str) -> Result<Option<AlertState>> {
        Ok(self.states.lock().unwrap().get(name).cloned())
    }

    async fn upsert_state(&self, state: &AlertState) -> Result<()> {
        if self.fail_upsert {
            return Err(store_error("write rejected"));
        }
        self.log
            .push(Event::Upsert(state.name.clone(), state.value.clone()));
        self.states
            .lock()
            .unwrap()
            .insert(state.name.clone(), state.clone());
        Ok(())
    }

    async fn close(&self) {
        self.log.push(Event::Close);
    }
}

/// Returns a fixed value (or an RPC failure) per alert name.
#[derive(Default)]
pub struct FakeReader {
    values: HashMap<String, Option<String>>,
}

impl FakeReader {
    pub fn returning(mut self, name: &str, value: &str) -> Self {
        self.values.insert(name.to_string(), Some(value.to_string()));
        self
    }

    pub fn failing(mut self, name: &str) -> Self {
        self.values.insert(name.to_string(), None);
        self
    }
}

impl RemoteReader for FakeReader {
    async fn read(&self, definition: &AlertDefinition) -> Result<String> {
        match self.values.get(&definition.name) {
            Some(Some(value)) => Ok(value.clone()),
            _ => Err(MonitorError::Rpc {
                url: definition.rpc_url.clone(),
                reason: "connection refused".to_string(),
            }),
        }
    }
}

pub struct FakeNotifier {
    log: EventLog,
    sent: Mutex<Vec<Alert>>,
    fail: bool,
}

impl FakeNotifier {
    pub fn new(log: &EventLog) -> Self {
        Self {
            log: log.clone(),
            sent: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn sent(&self) -> Vec<Alert> {
        self.sent.lock().unwrap().clone()
    }
}

impl Notifier for FakeNotifier {
    async fn send(&self, alert: &Alert) -> std::result::Result<(), NotifyError> {
        if self.fail {
            return Err(NotifyError::Publish("topic does not exist".to_string()));
        }
        self.log.push(Event::Notify(alert.subject.clone()));
        self.sent.lock().unwrap().push(alert.clone());
        Ok(())
    }
}

pub struct FakeHeartbeat {
    log: EventLog,
    fail: bool,
}

impl FakeHeartbeat {
    pub fn new(log: &EventLog) -> Self {
        Self {
            log: log.clone(),
            fail: false,
        }
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }
}

impl Heartbeat for FakeHeartbeat {
    async fn ping(&self) -> std::result::Result<(), NotifyError> {
        self.log.push(Event::Ping);
        if self.fail {
            return Err(NotifyError::Heartbeat {
                url: "https://hc-ping.com/test".to_string(),
                reason: "connection reset".to_string(),
            });
        }
        Ok(())
    }
}
