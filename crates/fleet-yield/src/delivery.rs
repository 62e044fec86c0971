//! Output channels for rendered reports
//!
//! Push delivery posts the plain-text report to an ntfy-style topic URL
//! with the notification title in a header.

use std::path::PathBuf;
use tracing::info;

use crate::config::PushConfig;
use crate::error::ReportError;
use crate::reports::RenderTarget;

#[derive(Debug, Clone)]
pub enum Channel {
    Console,
    File(PathBuf),
    Push(PushChannel),
}

impl Channel {
    /// Layout that suits the channel when none is requested
    pub fn default_target(&self) -> RenderTarget {
        match self {
            Channel::Push(_) => RenderTarget::Condensed,
            Channel::Console | Channel::File(_) => RenderTarget::Wide,
        }
    }

    pub async fn deliver(&self, text: &str) -> Result<(), ReportError> {
        match self {
            Channel::Console => {
                print!("{}", text);
                Ok(())
            }
            Channel::File(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    tokio::fs::create_dir_all(parent).await?;
                }
                tokio::fs::write(path, text).await?;
                info!("Report written to {}", path.display());
                Ok(())
            }
            Channel::Push(push) => push.send(&push.config.title, text).await,
        }
    }

    /// Tell the operator that no report could be produced. Only the push channel
    /// sends anything; console and file callers already see the error.
    pub async fn alert(&self, message: &str) -> Result<(), ReportError> {
        match self {
            Channel::Push(push) => {
                push.send(&format!("{} failed", push.config.title), message)
                    .await
            }
            Channel::Console | Channel::File(_) => Ok(()),
        }
    }
}

/// Push topic plus the HTTP client reused for every notification
#[derive(Debug, Clone)]
pub struct PushChannel {
    client: reqwest::Client,
    config: PushConfig,
}

impl PushChannel {
    pub fn new(config: PushConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    async fn send(&self, title: &str, body: &str) -> Result<(), ReportError> {
        let response = self
            .client
            .post(&self.config.url)
            .header("Title", title)
            .header("Content-Type", "text/plain; charset=utf-8")
            .body(body.to_string())
            .send()
            .await
            .map_err(|e| ReportError::Delivery(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ReportError::Delivery(format!(
                "Push endpoint returned status: {}",
                response.status()
            )));
        }

        info!("Report pushed to {}", self.config.url);
        Ok(())
    }
}
