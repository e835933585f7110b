use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, FixedOffset, Timelike, Utc};
use tokio::io::AsyncWriteExt;

use crate::common::consts;
use crate::model::XenditWebhook;

use super::i_wh_dump::IWebhookDumpService;

#[derive(Debug, Clone)]
pub struct FsDumpServiceImpl {
    data_dir: PathBuf,
}

impl FsDumpServiceImpl {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

/// Strict RFC 3339: chrono also takes a space or `t` separator, a `z` suffix and second 60,
/// none of which count here.
fn parse_paid_at(paid_at: &str) -> Option<DateTime<FixedOffset>> {
    if paid_at.as_bytes().get(10) != Some(&b'T') || paid_at.ends_with('z') {
        return None;
    }
    let paid = DateTime::parse_from_rfc3339(paid_at).ok()?;
    (paid.nanosecond() < 1_000_000_000).then_some(paid)
}

/// Calendar date of `paid_at` in the offset it was sent with, or today (UTC) if it isn't RFC 3339.
pub fn date_folder(paid_at: &str, now: DateTime<Utc>) -> String {
    match parse_paid_at(paid_at) {
        Some(paid) => paid.format(consts::DATE_FOLDER_FORMAT).to_string(),
        None => now.format(consts::DATE_FOLDER_FORMAT).to_string(),
    }
}

/// Keeps the id usable as a single path component.
pub fn sanitize_id(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn render(webhook: &XenditWebhook) -> anyhow::Result<Vec<u8>> {
    let mut buf = serde_json::to_vec_pretty(webhook)?;
    buf.push(b'\n');
    Ok(buf)
}

impl IWebhookDumpService for FsDumpServiceImpl {
    #[tracing::instrument(level = "debug", skip(self, webhook), fields(id = %webhook.id))]
    async fn dump_webhook(&self, webhook: XenditWebhook) -> anyhow::Result<PathBuf> {
        let dir_path = self
            .data_dir
            .join(date_folder(&webhook.paid_at, Utc::now()));
        tokio::fs::create_dir_all(&dir_path)
            .await
            .with_context(|| format!("failed to create directory {}", dir_path.display()))?;

        let filename = format!(
            "{}_{}.json",
            uuid::Uuid::new_v4(),
            sanitize_id(&webhook.id)
        );
        let file_path = dir_path.join(filename);
        let contents = render(&webhook)?;

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&file_path)
            .await
            .with_context(|| format!("failed to create file {}", file_path.display()))?;
        file.write_all(&contents)
            .await
            .with_context(|| format!("failed to write file {}", file_path.display()))?;
        file.flush().await?;
        tracing::debug!("wrote {} bytes", contents.len());

        Ok(file_path)
    }
}
