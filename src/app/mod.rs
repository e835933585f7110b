use crate::services::i_wh_dump::IWebhookDumpService;
use crate::services::wh_dump::FsDumpServiceImpl;

#[derive(Debug, Clone)]
pub struct AppEnv<DumpService: IWebhookDumpService + Clone = FsDumpServiceImpl> {
    pub dump_svc: DumpService,
    pub callback_token: Option<String>,
}

impl<DumpService> AppEnv<DumpService>
where
    DumpService: IWebhookDumpService + Clone,
{
    pub fn new(dump_svc: DumpService) -> Self {
        Self {
            dump_svc,
            callback_token: None,
        }
    }

    pub fn with_callback_token(mut self, token: Option<String>) -> Self {
        // an empty token in the environment means "not configured"
        self.callback_token = token.filter(|t| !t.is_empty());
        self
    }
}
