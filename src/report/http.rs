//! Blocking HTTP transport for the reading payload.
//!
//! One POST per wake cycle, no retry and no buffering of failed uploads;
//! a lost reading is simply replaced by the next cycle's. HTTPS uses the
//! ESP-IDF certificate bundle.

use embedded_svc::http::client::Client;
use embedded_svc::http::Method;
use embedded_svc::io::{Read, Write};
use esp_idf_svc::http::client::{Configuration, EspHttpConnection};
use esp_idf_svc::io::EspIOError;
use esp_idf_svc::sys::EspError;
use log::info;

use crate::config::HTTP_TIMEOUT;

/// Result of a completed POST.
///
/// Any transport-level success lands here, including non-2xx statuses; the
/// caller decides what to log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostOutcome {
    /// HTTP status code.
    pub status: u16,
    /// Response body, lossily decoded as UTF-8.
    pub body: String,
}

impl PostOutcome {
    /// Whether the endpoint accepted the payload.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// POST a JSON body to the ingest endpoint.
pub fn post_json(url: &str, body: &str) -> Result<PostOutcome, ReportError> {
    let config = Configuration {
        timeout: Some(HTTP_TIMEOUT),
        use_global_ca_store: true,
        crt_bundle_attach: Some(esp_idf_svc::sys::esp_crt_bundle_attach),
        ..Default::default()
    };

    let connection = EspHttpConnection::new(&config)?;
    let mut client = Client::wrap(connection);

    let content_length = body.len().to_string();
    let headers = [
        ("Content-Type", "application/json"),
        ("Content-Length", content_length.as_str()),
    ];

    let mut request = client.request(Method::Post, url, &headers)?;
    request.write_all(body.as_bytes())?;
    request.flush()?;

    let mut response = request.submit()?;
    let status = response.status();
    info!("POST {} -> status {}", url, status);

    let mut raw: Vec<u8> = Vec::new();
    let mut buf = [0u8; 256];
    loop {
        let n = response.read(&mut buf)?;
        if n == 0 {
            break;
        }
        raw.extend_from_slice(&buf[..n]);
    }

    Ok(PostOutcome {
        status,
        body: String::from_utf8_lossy(&raw).into_owned(),
    })
}

/// Errors that can occur while uploading a payload.
#[derive(Debug)]
pub enum ReportError {
    /// Failed to set up the HTTP connection.
    Connection(EspError),
    /// Request or response I/O failed.
    Io(EspIOError),
}

impl From<EspError> for ReportError {
    fn from(e: EspError) -> Self {
        Self::Connection(e)
    }
}

impl From<EspIOError> for ReportError {
    fn from(e: EspIOError) -> Self {
        Self::Io(e)
    }
}

impl std::fmt::Display for ReportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connection(e) => write!(f, "HTTP connection failed: {:?}", e),
            Self::Io(e) => write!(f, "HTTP I/O failed: {:?}", e),
        }
    }
}

impl std::error::Error for ReportError {}
