//! Scripted adapters for registry, selector and dispatch unit tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{ProviderAdapter, ProviderKind};
use crate::context::RequestContext;
use crate::error::AdapterError;
use crate::types::{Choice, UnifiedRequest, UnifiedResponse, Usage};

/// Shared, ordered record of which adapters were invoked.
pub(crate) type CallLog = Arc<Mutex<Vec<ProviderKind>>>;

#[derive(Debug, Clone)]
pub(crate) enum Script {
    Reply(&'static str),
    Status(u16),
    EmptyChoices,
    Hang,
}

#[derive(Debug)]
pub(crate) struct ScriptedAdapter {
    kind: ProviderKind,
    available: AtomicBool,
    script: Script,
    log: CallLog,
}

impl ScriptedAdapter {
    pub(crate) fn new(kind: ProviderKind, script: Script, log: &CallLog) -> Arc<dyn ProviderAdapter> {
        Arc::new(Self::build(kind, script, log))
    }

    pub(crate) fn unavailable(kind: ProviderKind, log: &CallLog) -> Arc<dyn ProviderAdapter> {
        let adapter = Self::build(kind, Script::Reply("never"), log);
        adapter.available.store(false, Ordering::SeqCst);
        Arc::new(adapter)
    }

    fn build(kind: ProviderKind, script: Script, log: &CallLog) -> Self {
        Self {
            kind,
            available: AtomicBool::new(true),
            script,
            log: Arc::clone(log),
        }
    }
}

pub(crate) fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub(crate) fn calls(log: &CallLog) -> Vec<ProviderKind> {
    log.lock().unwrap().clone()
}

#[async_trait]
impl ProviderAdapter for ScriptedAdapter {
    fn identity(&self) -> ProviderKind {
        self.kind
    }

    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    async fn generate(
        &self,
        _ctx: &RequestContext,
        _request: &UnifiedRequest,
    ) -> Result<UnifiedResponse, AdapterError> {
        self.log.lock().unwrap().push(self.kind);
        match &self.script {
            Script::Reply(text) => Ok(UnifiedResponse {
                id: format!("{}-1", self.kind),
                object: "chat.completion".into(),
                created: 0,
                model: "mock".into(),
                choices: vec![Choice::assistant(0, *text, "stop")],
                usage: Usage::default(),
            }),
            Script::Status(code) => Err(AdapterError::status(self.kind, *code, "scripted failure")),
            Script::EmptyChoices => Ok(UnifiedResponse {
                id: String::new(),
                object: String::new(),
                created: 0,
                model: String::new(),
                choices: Vec::new(),
                usage: Usage::default(),
            }),
            Script::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(AdapterError::status(self.kind, 504, "hang elapsed"))
            }
        }
    }
}
