#![deny(clippy::all, clippy::pedantic)]

use deptportal::PortalClient;
use deptportal::endpoints::events::{GET_EVENTS, REGISTER_FOR_EVENT};
use deptportal_api_types::{IdArg, ListQuery};

use crate::args::EventsCmd;
use crate::context::CliError;
use crate::print::print_json;

pub async fn handle(client: &PortalClient, cmd: EventsCmd) -> Result<(), CliError> {
    match cmd {
        EventsCmd::List { search } => {
            let query = ListQuery {
                search,
                ..ListQuery::default()
            };
            let events = client.query(&GET_EVENTS, query).await?;
            print_json(events.as_ref())
        }
        EventsCmd::Register { id } => {
            let res = client.mutate(&REGISTER_FOR_EVENT, IdArg::new(id)).await?;
            print_json(&res)
        }
    }
}
