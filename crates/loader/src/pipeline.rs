use crate::{bootstrap::ModuleBootstrap, codec::Decompressor, retrieve::Retriever};
use frame_core::{LoadError, LoadPlan};
use tracing::{debug, info};

/// The per-widget load sequence: retrieve → decompress → initialize → setup → run.
///
/// Each collaborator is invoked at most once per call to [`Loader::load`];
/// the first failure ends the sequence.
#[derive(Debug)]
pub struct Loader {
    retriever:    Box<dyn Retriever>,
    decompressor: Box<dyn Decompressor>,
    bootstrap:    Box<dyn ModuleBootstrap>,
}

impl Loader {
    pub fn new(
        retriever: impl Retriever + 'static,
        decompressor: impl Decompressor + 'static,
        bootstrap: impl ModuleBootstrap + 'static,
    ) -> Self {
        Self {
            retriever:    Box::new(retriever),
            decompressor: Box::new(decompressor),
            bootstrap:    Box::new(bootstrap),
        }
    }

    #[tracing::instrument(level = "debug", skip_all, fields(source = %plan.source))]
    pub async fn load(&mut self, plan: &LoadPlan) -> Result<(), LoadError> {
        let packed = self.retriever.retrieve(&plan.source).await?;
        debug!("retrieved {} bytes", packed.len());

        let module = self.decompressor.decompress(&packed)?;
        debug!("decompressed to {} bytes", module.len());

        self.bootstrap.initialize(module).await?;
        self.bootstrap.setup().await?;
        self.bootstrap
            .run(&plan.selector, plan.width, plan.height)
            .await?;

        info!("module running on {}", plan.selector);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{Call, CallLog, FakeBootstrap, FakeDecompressor, FakeRetriever};
    use frame_core::BootstrapStage;

    fn plan() -> LoadPlan {
        LoadPlan::new("/a.bin", "main-canvas", 800, 480)
    }

    #[tokio::test]
    async fn calls_every_collaborator_once_in_order() {
        let log = CallLog::new();
        let mut loader = log.loader(b"B", b"D");

        loader.load(&plan()).await.unwrap();

        assert_eq!(
            log.calls(),
            vec![
                Call::Retrieve("/a.bin".into()),
                Call::Decompress(b"B".to_vec()),
                Call::Initialize(b"D".to_vec()),
                Call::Setup,
                Call::Run("#main-canvas".into(), 800, 480),
            ]
        );
    }

    #[tokio::test]
    async fn setup_failure_skips_run() {
        let log = CallLog::new();
        let mut loader = Loader::new(
            FakeRetriever::ok(&log, b"B"),
            FakeDecompressor::ok(&log, b"D"),
            FakeBootstrap::failing_at(&log, BootstrapStage::Setup),
        );

        let err = loader.load(&plan()).await.unwrap_err();

        assert!(matches!(
            err,
            LoadError::BootstrapFailed { stage: BootstrapStage::Setup, .. }
        ));
        assert_eq!(log.calls().last(), Some(&Call::Setup));
    }
}
