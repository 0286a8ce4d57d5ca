#![deny(clippy::all, clippy::pedantic)]

use deptportal::PortalClient;
use deptportal::endpoints::email_logs::GET_EMAIL_LOGS;
use deptportal::endpoints::important_data::{UPLOAD_IMPORTANT_DATA, UploadImportantData};
use deptportal::endpoints::messenger::SEND_BROADCAST;
use deptportal_api_types::ListQuery;
use deptportal_api_types::records::BroadcastRequest;

use crate::args::RecordsCmd;
use crate::context::CliError;
use crate::io::{read_upload, read_value};
use crate::print::print_json;

pub async fn handle(client: &PortalClient, cmd: RecordsCmd) -> Result<(), CliError> {
    match cmd {
        RecordsCmd::EmailLogs { page } => {
            let query = ListQuery {
                page,
                ..ListQuery::default()
            };
            let logs = client.query(&GET_EMAIL_LOGS, query).await?;
            print_json(logs.as_ref())
        }
        RecordsCmd::Upload { title, file } => {
            let upload = UploadImportantData {
                title,
                file: read_upload(&file)?,
            };
            let stored = client.mutate(&UPLOAD_IMPORTANT_DATA, upload).await?;
            print_json(&stored)
        }
        RecordsCmd::Broadcast {
            subject,
            message,
            message_file,
            audience,
            post_as_notice,
        } => {
            let request = BroadcastRequest {
                subject,
                message: read_value(message, message_file)?,
                audience: audience.into(),
                post_as_notice,
            };
            let receipt = client.mutate(&SEND_BROADCAST, request).await?;
            print_json(&receipt)
        }
    }
}
