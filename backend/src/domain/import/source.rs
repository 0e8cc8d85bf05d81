//! Where import data comes from: uploaded file bytes or a remote CSV URL.

use async_trait::async_trait;
use tracing::{debug, info};

use super::parser::{self, ParsedSheet};
use super::ImportError;

const USER_AGENT: &str = concat!("cadet-registry/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpreadsheetFormat {
    Csv,
    Xlsx,
    Xls,
}

impl SpreadsheetFormat {
    /// Accepts a bare extension ("xlsx") or a file name ("roll.XLSX")
    pub fn detect(value: &str) -> Option<Self> {
        let value = value.trim().to_lowercase();
        let extension = value.rsplit('.').next().unwrap_or(&value);
        match extension {
            "csv" => Some(SpreadsheetFormat::Csv),
            "xlsx" => Some(SpreadsheetFormat::Xlsx),
            "xls" => Some(SpreadsheetFormat::Xls),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            SpreadsheetFormat::Csv => "csv",
            SpreadsheetFormat::Xlsx => "xlsx",
            SpreadsheetFormat::Xls => "xls",
        }
    }
}

#[derive(Debug, Clone)]
pub enum ImportSource {
    File {
        format: SpreadsheetFormat,
        bytes: Vec<u8>,
    },
    /// Remotely hosted CSV
    Url(String),
}

/// Fetches the text of a remotely hosted CSV file
#[async_trait]
pub trait RemoteSource: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String, ImportError>;
}

/// `RemoteSource` over plain HTTP(S). No timeout or retry: a failed fetch
/// aborts the import and the user starts it again.
#[derive(Clone)]
pub struct HttpRemoteSource {
    client: reqwest::Client,
}

impl HttpRemoteSource {
    pub fn new() -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl RemoteSource for HttpRemoteSource {
    async fn fetch_text(&self, url: &str) -> Result<String, ImportError> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|e| ImportError::SourceAcquisition(format!("invalid URL {}: {}", url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ImportError::SourceAcquisition(format!(
                "unsupported URL scheme: {}",
                parsed.scheme()
            )));
        }

        debug!(url = %url, "Fetching remote CSV");
        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| ImportError::SourceAcquisition(format!("fetch failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImportError::SourceAcquisition(format!(
                "remote server answered {}",
                status
            )));
        }

        response
            .text()
            .await
            .map_err(|e| ImportError::SourceAcquisition(format!("could not read response body: {}", e)))
    }
}

/// Read the source and parse it into rows
pub async fn acquire(source: ImportSource, remote: &dyn RemoteSource) -> Result<ParsedSheet, ImportError> {
    match source {
        ImportSource::File { format, bytes } => {
            if bytes.is_empty() {
                return Err(ImportError::SourceAcquisition("uploaded file is empty".to_string()));
            }
            info!("📄 Reading {} upload ({} bytes)", format.extension(), bytes.len());
            parser::parse(format, &bytes)
        }
        ImportSource::Url(url) => {
            info!("🌐 Fetching import data from {}", url);
            let text = remote.fetch_text(&url).await?;
            parser::parse_csv(text.as_bytes())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::get, Router};

    #[test]
    fn test_detect_format() {
        assert_eq!(SpreadsheetFormat::detect("csv"), Some(SpreadsheetFormat::Csv));
        assert_eq!(SpreadsheetFormat::detect("Roll List.XLSX"), Some(SpreadsheetFormat::Xlsx));
        assert_eq!(SpreadsheetFormat::detect(".xls"), Some(SpreadsheetFormat::Xls));
        assert_eq!(SpreadsheetFormat::detect("ods"), None);
    }

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_fetch_remote_csv() {
        let base = serve(Router::new().route("/roll.csv", get(|| async { "regNo,name,batch\nR1,Arun,2021\n" }))).await;
        let remote = HttpRemoteSource::new().unwrap();

        let sheet = acquire(ImportSource::Url(format!("{}/roll.csv", base)), &remote)
            .await
            .unwrap();
        assert_eq!(sheet.headers, vec!["regNo", "name", "batch"]);
        assert_eq!(sheet.rows.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_a_source_error() {
        let base = serve(Router::new()).await;
        let remote = HttpRemoteSource::new().unwrap();

        let err = remote.fetch_text(&format!("{}/missing.csv", base)).await.unwrap_err();
        assert!(matches!(err, ImportError::SourceAcquisition(_)));

        let err = remote.fetch_text("ftp://example.com/roll.csv").await.unwrap_err();
        assert!(matches!(err, ImportError::SourceAcquisition(_)));

        let err = remote.fetch_text("not a url").await.unwrap_err();
        assert!(matches!(err, ImportError::SourceAcquisition(_)));
    }

    #[tokio::test]
    async fn test_empty_upload_is_rejected() {
        let remote = HttpRemoteSource::new().unwrap();
        let err = acquire(
            ImportSource::File {
                format: SpreadsheetFormat::Csv,
                bytes: Vec::new(),
            },
            &remote,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ImportError::SourceAcquisition(_)));
    }
}
