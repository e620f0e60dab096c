//! Payload pipeline for loader widgets.
//!
//! Three collaborator contracts ([`Retriever`], [`Decompressor`],
//! [`ModuleBootstrap`]) and the [`Loader`] that drives them in order.
//! Native implementations live behind the default `native` feature so the
//! DOM host can reuse the contracts on `wasm32`.

pub mod bootstrap;
pub mod codec;
#[cfg(any(test, feature = "test-util"))]
pub mod fake;
pub mod pipeline;
pub mod retrieve;

pub use bootstrap::{ModuleBootstrap, ModuleSummary, ProbeBootstrap, ProbeOutcome};
pub use codec::{detect, Decompressor, WASM_MAGIC};
pub use pipeline::Loader;
pub use retrieve::Retriever;
#[cfg(feature = "native")]
pub use retrieve::{FileRetriever, HttpRetriever, SourceRetriever};
