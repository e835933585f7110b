use crate::app::AppEnv;
use crate::common::{consts, crypt};
use crate::model::error::AppError;
use crate::model::XenditWebhook;
use crate::services::i_wh_dump::IWebhookDumpService;
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use http::{HeaderMap, StatusCode};
use std::sync::Arc;

#[tracing::instrument(level = "debug", skip_all)]
pub async fn webhook_handler<S>(
    State(app): State<Arc<AppEnv<S>>>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, &'static str), AppError>
where
    S: IWebhookDumpService + Clone,
{
    if let Some(expected) = &app.callback_token {
        let provided = headers
            .get(consts::XENDIT_CALLBACK_TOKEN)
            .and_then(|h| h.to_str().ok())
            .unwrap_or("");
        if crypt::callback_token_verify(expected, provided).is_err() {
            tracing::warn!("rejected webhook with invalid callback token");
            return Err(AppError::InvalidCallbackToken);
        }
    }

    let body = body.inspect_err(|e| tracing::debug!("body rejected: {e:?}"))?;
    let webhook = XenditWebhook::from_payload(&body)
        .inspect_err(|e| tracing::debug!("bad payload: {e}"))?;

    match app.dump_svc.dump_webhook(webhook).await {
        Ok(path) => {
            tracing::info!("Webhook saved to {}", path.display());
            Ok((StatusCode::OK, "Webhook received and saved"))
        }
        Err(err) => {
            tracing::error!("error while saving webhook: {err:?}");
            Err(err.into())
        }
    }
}

pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
