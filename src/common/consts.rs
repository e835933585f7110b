pub const SERVICE_NAME: &str = "xendit-webhook-dumper";

pub const WEBHOOK_ROUTE: &str = "/xendit/webhook";

pub const XENDIT_CALLBACK_TOKEN: &str = "x-callback-token";

pub const DATE_FOLDER_FORMAT: &str = "%Y-%m-%d";
