use std::path::PathBuf;

use crate::model::XenditWebhook;

pub trait IWebhookDumpService: Send + Sync + 'static {
    /// Persists one webhook and returns where it ended up.
    fn dump_webhook(
        &self,
        webhook: XenditWebhook,
    ) -> impl Future<Output = anyhow::Result<PathBuf>> + Send;
}
