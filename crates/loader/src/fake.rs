//! Recording collaborators.
//!
//! All fakes built from one [`CallLog`] append to the same list, so a test
//! can assert on the exact order of pipeline calls.

use crate::{bootstrap::ModuleBootstrap, codec::Decompressor, retrieve::Retriever, Loader};
use async_trait::async_trait;
use frame_core::{BootstrapStage, LoadError};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Retrieve(String),
    Decompress(Vec<u8>),
    Initialize(Vec<u8>),
    Setup,
    Run(String, u32, u32),
}

/// Shared, ordered record of collaborator calls.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Rc<RefCell<Vec<Call>>>);

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.borrow().clone()
    }

    fn push(&self, call: Call) {
        self.0.borrow_mut().push(call);
    }

    /// A loader whose retriever returns `payload`, whose decompressor returns
    /// `module`, and whose bootstrap accepts everything.
    pub fn loader(&self, payload: &[u8], module: &[u8]) -> Loader {
        Loader::new(
            FakeRetriever::ok(self, payload),
            FakeDecompressor::ok(self, module),
            FakeBootstrap::ok(self),
        )
    }
}

#[derive(Debug)]
pub struct FakeRetriever {
    log:    CallLog,
    result: Result<Vec<u8>, LoadError>,
}

impl FakeRetriever {
    pub fn ok(log: &CallLog, payload: &[u8]) -> Self {
        Self { log: log.clone(), result: Ok(payload.to_vec()) }
    }

    pub fn failing(log: &CallLog, reason: &str) -> Self {
        Self {
            log:    log.clone(),
            result: Err(LoadError::RetrievalFailed(reason.to_string())),
        }
    }
}

#[async_trait(?Send)]
impl Retriever for FakeRetriever {
    async fn retrieve(&self, source: &str) -> Result<Vec<u8>, LoadError> {
        self.log.push(Call::Retrieve(source.to_string()));
        self.result.clone()
    }
}

#[derive(Debug)]
pub struct FakeDecompressor {
    log:    CallLog,
    result: Result<Vec<u8>, LoadError>,
}

impl FakeDecompressor {
    pub fn ok(log: &CallLog, module: &[u8]) -> Self {
        Self { log: log.clone(), result: Ok(module.to_vec()) }
    }

    pub fn failing(log: &CallLog, reason: &str) -> Self {
        Self {
            log:    log.clone(),
            result: Err(LoadError::DecompressionFailed(reason.to_string())),
        }
    }
}

impl Decompressor for FakeDecompressor {
    fn decompress(&self, bytes: &[u8]) -> Result<Vec<u8>, LoadError> {
        self.log.push(Call::Decompress(bytes.to_vec()));
        self.result.clone()
    }
}

#[derive(Debug)]
pub struct FakeBootstrap {
    log:     CallLog,
    fail_at: Option<BootstrapStage>,
}

impl FakeBootstrap {
    pub fn ok(log: &CallLog) -> Self {
        Self { log: log.clone(), fail_at: None }
    }

    pub fn failing_at(log: &CallLog, stage: BootstrapStage) -> Self {
        Self { log: log.clone(), fail_at: Some(stage) }
    }

    fn outcome(&self, stage: BootstrapStage) -> Result<(), LoadError> {
        if self.fail_at == Some(stage) {
            return Err(LoadError::BootstrapFailed {
                stage,
                reason: "rejected".into(),
            });
        }
        Ok(())
    }
}

#[async_trait(?Send)]
impl ModuleBootstrap for FakeBootstrap {
    async fn initialize(&mut self, module: Vec<u8>) -> Result<(), LoadError> {
        self.log.push(Call::Initialize(module));
        self.outcome(BootstrapStage::Initialize)
    }

    async fn setup(&mut self) -> Result<(), LoadError> {
        self.log.push(Call::Setup);
        self.outcome(BootstrapStage::Setup)
    }

    async fn run(&mut self, selector: &str, width: u32, height: u32) -> Result<(), LoadError> {
        self.log.push(Call::Run(selector.to_string(), width, height));
        self.outcome(BootstrapStage::Run)
    }
}
