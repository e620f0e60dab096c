use async_trait::async_trait;
use frame_core::LoadError;
use std::rc::Rc;

/// Fetches the raw (still compressed) payload for a source locator.
///
/// `?Send`: implementations may hold host objects (browser promises) that
/// never leave the page's event loop.
#[async_trait(?Send)]
pub trait Retriever: std::fmt::Debug {
    async fn retrieve(&self, source: &str) -> Result<Vec<u8>, LoadError>;
}

#[async_trait(?Send)]
impl<T: Retriever + ?Sized> Retriever for Rc<T> {
    async fn retrieve(&self, source: &str) -> Result<Vec<u8>, LoadError> {
        (**self).retrieve(source).await
    }
}

#[cfg(feature = "native")]
pub use native::{FileRetriever, HttpRetriever, SourceRetriever};

#[cfg(feature = "native")]
mod native {
    use super::*;
    use frame_config::LoaderConfig;
    use frame_core::{FrameError, Result};
    use std::path::PathBuf;
    use std::time::Duration;
    use tracing::debug;

    /// HTTP(S) retrieval through a shared `reqwest` client.
    #[derive(Debug, Clone)]
    pub struct HttpRetriever {
        client:   reqwest::Client,
        base_url: Option<String>,
    }

    impl HttpRetriever {
        pub fn new(config: &LoaderConfig) -> Result<Self> {
            let mut builder = reqwest::Client::builder()
                .user_agent(concat!("frame/", env!("CARGO_PKG_VERSION")));
            if let Some(secs) = config.timeout_secs {
                builder = builder.timeout(Duration::from_secs(secs));
            }
            let client = builder
                .build()
                .map_err(|e| FrameError::Config(format!("http client: {e}")))?;

            Ok(Self {
                client,
                base_url: config.base_url.clone(),
            })
        }

        /// Absolute URL for `source`, joining relative paths onto the base URL.
        pub fn resolve(&self, source: &str) -> String {
            if is_http(source) {
                return source.to_string();
            }
            match &self.base_url {
                Some(base) => format!(
                    "{}/{}",
                    base.trim_end_matches('/'),
                    source.trim_start_matches('/')
                ),
                None => source.to_string(),
            }
        }
    }

    #[async_trait(?Send)]
    impl Retriever for HttpRetriever {
        async fn retrieve(&self, source: &str) -> Result<Vec<u8>, LoadError> {
            let url = self.resolve(source);
            debug!("GET {url}");

            let fail = |e: reqwest::Error| LoadError::RetrievalFailed(format!("{url}: {e}"));

            let bytes = self
                .client
                .get(&url)
                .send()
                .await
                .and_then(reqwest::Response::error_for_status)
                .map_err(fail)?
                .bytes()
                .await
                .map_err(fail)?;

            Ok(bytes.to_vec())
        }
    }

    /// Local filesystem retrieval; absolute-looking sources (`/games/a.bin`)
    /// are resolved under `root` when one is set.
    #[derive(Debug, Clone, Default)]
    pub struct FileRetriever {
        root: Option<PathBuf>,
    }

    impl FileRetriever {
        pub fn new(root: Option<PathBuf>) -> Self {
            Self { root }
        }

        pub fn resolve(&self, source: &str) -> PathBuf {
            let source = source.strip_prefix("file://").unwrap_or(source);
            match &self.root {
                Some(root) => root.join(source.trim_start_matches('/')),
                None => PathBuf::from(source),
            }
        }
    }

    #[async_trait(?Send)]
    impl Retriever for FileRetriever {
        async fn retrieve(&self, source: &str) -> Result<Vec<u8>, LoadError> {
            let path = self.resolve(source);
            debug!("read {}", path.display());
            tokio::fs::read(&path)
                .await
                .map_err(|e| LoadError::RetrievalFailed(format!("{}: {e}", path.display())))
        }
    }

    /// Dispatches on the locator: `http(s)://` goes over the network, and so
    /// do relative sources when a base URL is configured; everything else is
    /// read from disk.
    #[derive(Debug, Clone)]
    pub struct SourceRetriever {
        http: HttpRetriever,
        file: FileRetriever,
    }

    impl SourceRetriever {
        pub fn new(config: &LoaderConfig, root: Option<PathBuf>) -> Result<Self> {
            Ok(Self {
                http: HttpRetriever::new(config)?,
                file: FileRetriever::new(root),
            })
        }

        fn uses_http(&self, source: &str) -> bool {
            is_http(source) || (self.http.base_url.is_some() && !source.starts_with("file://"))
        }
    }

    #[async_trait(?Send)]
    impl Retriever for SourceRetriever {
        async fn retrieve(&self, source: &str) -> Result<Vec<u8>, LoadError> {
            if self.uses_http(source) {
                self.http.retrieve(source).await
            } else {
                self.file.retrieve(source).await
            }
        }
    }

    fn is_http(source: &str) -> bool {
        source.starts_with("http://") || source.starts_with("https://")
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn file_retriever_reads_under_root() {
            let dir = tempfile::tempdir().unwrap();
            std::fs::create_dir(dir.path().join("games")).unwrap();
            std::fs::write(dir.path().join("games/a.bin"), b"payload").unwrap();

            let r = FileRetriever::new(Some(dir.path().to_path_buf()));
            assert_eq!(r.retrieve("/games/a.bin").await.unwrap(), b"payload");
        }

        #[tokio::test]
        async fn missing_file_is_a_retrieval_failure() {
            let dir = tempfile::tempdir().unwrap();
            let r = FileRetriever::new(Some(dir.path().to_path_buf()));
            let err = r.retrieve("/missing.bin").await.unwrap_err();
            assert!(matches!(err, LoadError::RetrievalFailed(_)));
        }

        #[test]
        fn http_resolves_relative_sources_against_base() {
            let cfg = LoaderConfig {
                timeout_secs: Some(5),
                base_url: Some("https://example.org/".into()),
            };
            let r = HttpRetriever::new(&cfg).unwrap();
            assert_eq!(r.resolve("/a.bin"), "https://example.org/a.bin");
            assert_eq!(r.resolve("http://cdn/x.bin"), "http://cdn/x.bin");
        }

        #[test]
        fn source_retriever_dispatch() {
            let local = SourceRetriever::new(&LoaderConfig::default(), None).unwrap();
            assert!(local.uses_http("https://cdn/a.bin"));
            assert!(!local.uses_http("/a.bin"));

            let cfg = LoaderConfig {
                base_url: Some("https://example.org".into()),
                ..LoaderConfig::default()
            };
            let remote = SourceRetriever::new(&cfg, None).unwrap();
            assert!(remote.uses_http("/a.bin"));
            assert!(!remote.uses_http("file:///tmp/a.bin"));
        }
    }
}
