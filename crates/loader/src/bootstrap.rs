use crate::codec::WASM_MAGIC;
use async_trait::async_trait;
use std::cell::RefCell;
use std::rc::Rc;
use frame_core::{BootstrapStage, LoadError};
use tracing::{debug, info};

/// The module-initialization contract a hosted build must expose.
///
/// Calls arrive strictly in order: [`initialize`](Self::initialize) with the
/// decompressed bytes, then [`setup`](Self::setup), then [`run`](Self::run)
/// with the surface selector and size.  Each may suspend.
#[async_trait(?Send)]
pub trait ModuleBootstrap: std::fmt::Debug {
    async fn initialize(&mut self, module: Vec<u8>) -> Result<(), LoadError>;
    async fn setup(&mut self) -> Result<(), LoadError>;
    async fn run(&mut self, selector: &str, width: u32, height: u32) -> Result<(), LoadError>;
}

/// Shape of a WebAssembly binary: total size plus `(section id, byte length)`
/// for every top-level section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleSummary {
    pub size:     usize,
    pub version:  u32,
    pub sections: Vec<(u8, u32)>,
}

impl ModuleSummary {
    /// Walk the section headers of `bytes`.
    pub fn parse(bytes: &[u8]) -> Result<Self, String> {
        if bytes.len() < 8 || bytes[..4] != WASM_MAGIC {
            return Err("missing \\0asm magic".into());
        }
        let version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        if version != 1 {
            return Err(format!("unsupported binary version {version}"));
        }

        let mut sections = Vec::new();
        let mut pos = 8;
        while pos < bytes.len() {
            let id = bytes[pos];
            pos += 1;
            let (len, read) = read_leb128_u32(&bytes[pos..])
                .ok_or_else(|| format!("bad size of section {id} at offset {pos}"))?;
            pos += read;
            let end = pos
                .checked_add(len as usize)
                .filter(|end| *end <= bytes.len())
                .ok_or_else(|| format!("section {id} overruns the module"))?;
            sections.push((id, len));
            pos = end;
        }

        Ok(Self { size: bytes.len(), version, sections })
    }
}

/// Unsigned LEB128 → `(value, bytes consumed)`.
fn read_leb128_u32(bytes: &[u8]) -> Option<(u32, usize)> {
    let mut value: u32 = 0;
    for (i, byte) in bytes.iter().take(5).enumerate() {
        value |= u32::from(byte & 0x7f) << (7 * i);
        if byte & 0x80 == 0 {
            return Some((value, i + 1));
        }
    }
    None
}

/// What a [`ProbeBootstrap`] observed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub summary: Option<ModuleSummary>,
    pub ready:   bool,
    /// Selector and size passed to `run`, once it has been called.
    pub run_at:  Option<(String, u32, u32)>,
}

/// Headless stand-in for a real module host.
///
/// Validates the binary structure on `initialize` and records the run
/// request instead of executing anything; used by `frame probe` to check a
/// published payload end to end.  The outcome stays readable through
/// [`ProbeBootstrap::outcome`] after the bootstrap is handed to a `Loader`.
#[derive(Debug, Default)]
pub struct ProbeBootstrap {
    outcome: Rc<RefCell<ProbeOutcome>>,
}

impl ProbeBootstrap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outcome(&self) -> Rc<RefCell<ProbeOutcome>> {
        Rc::clone(&self.outcome)
    }
}

#[async_trait(?Send)]
impl ModuleBootstrap for ProbeBootstrap {
    async fn initialize(&mut self, module: Vec<u8>) -> Result<(), LoadError> {
        let summary = ModuleSummary::parse(&module).map_err(|reason| LoadError::BootstrapFailed {
            stage: BootstrapStage::Initialize,
            reason,
        })?;
        debug!(
            "module: {} bytes, {} sections",
            summary.size,
            summary.sections.len()
        );
        self.outcome.borrow_mut().summary = Some(summary);
        Ok(())
    }

    async fn setup(&mut self) -> Result<(), LoadError> {
        let mut outcome = self.outcome.borrow_mut();
        if outcome.summary.is_none() {
            return Err(LoadError::BootstrapFailed {
                stage:  BootstrapStage::Setup,
                reason: "setup before initialize".into(),
            });
        }
        outcome.ready = true;
        Ok(())
    }

    async fn run(&mut self, selector: &str, width: u32, height: u32) -> Result<(), LoadError> {
        let mut outcome = self.outcome.borrow_mut();
        if !outcome.ready {
            return Err(LoadError::BootstrapFailed {
                stage:  BootstrapStage::Run,
                reason: "run before setup".into(),
            });
        }
        info!("probe: module would run on {selector} at {width}x{height}");
        outcome.run_at = Some((selector.to_string(), width, height));
        Ok(())
    }
}
