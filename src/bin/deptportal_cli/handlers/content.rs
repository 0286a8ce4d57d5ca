#![deny(clippy::all, clippy::pedantic)]

use deptportal::PortalClient;
use deptportal::endpoints::content::{CREATE_NOTICE, DELETE_NOTICE, GET_HOMEPAGE, GET_NOTICES};
use deptportal_api_types::content::{CreateNoticeRequest, NoticeQuery};
use deptportal_api_types::{IdArg, NoArgs};

use crate::args::NoticesCmd;
use crate::context::CliError;
use crate::io::read_value;
use crate::print::print_json;

pub async fn handle(client: &PortalClient, cmd: NoticesCmd) -> Result<(), CliError> {
    match cmd {
        NoticesCmd::List { category, limit } => {
            let notices = client
                .query(&GET_NOTICES, NoticeQuery { category, limit })
                .await?;
            print_json(notices.as_ref())
        }
        NoticesCmd::Create {
            title,
            content,
            content_file,
            category,
        } => {
            let content = read_value(content, content_file)?;
            let notice = client
                .mutate(
                    &CREATE_NOTICE,
                    CreateNoticeRequest {
                        title,
                        content,
                        category,
                    },
                )
                .await?;
            print_json(&notice)
        }
        NoticesCmd::Delete { id } => {
            client.mutate(&DELETE_NOTICE, IdArg::new(id)).await?;
            println!("deleted");
            Ok(())
        }
        NoticesCmd::Homepage => {
            let homepage = client.query(&GET_HOMEPAGE, NoArgs::default()).await?;
            print_json(homepage.as_ref())
        }
    }
}
