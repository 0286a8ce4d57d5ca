#![deny(clippy::all, clippy::pedantic)]

use deptportal::PortalClient;
use deptportal::endpoints::applications::{
    APPROVE_APPLICATION_STAGE, GET_APPLICATIONS, GET_MY_APPLICATIONS, SUBMIT_APPLICATION,
};
use deptportal_api_types::NoArgs;
use deptportal_api_types::applications::{
    ApplicationQuery, ApproveStageRequest, SubmitApplicationRequest,
};

use crate::args::ApplicationsCmd;
use crate::context::CliError;
use crate::io::read_value;
use crate::print::print_json;

pub async fn handle(client: &PortalClient, cmd: ApplicationsCmd) -> Result<(), CliError> {
    match cmd {
        ApplicationsCmd::List { stage } => {
            let query = ApplicationQuery {
                status: stage.map(Into::into),
            };
            let applications = client.query(&GET_APPLICATIONS, query).await?;
            print_json(applications.as_ref())
        }
        ApplicationsCmd::Mine => {
            let applications = client
                .query(&GET_MY_APPLICATIONS, NoArgs::default())
                .await?;
            print_json(applications.as_ref())
        }
        ApplicationsCmd::Submit {
            kind,
            subject,
            body,
            body_file,
        } => {
            let request = SubmitApplicationRequest {
                kind,
                subject,
                body: read_value(body, body_file)?,
            };
            let application = client.mutate(&SUBMIT_APPLICATION, request).await?;
            print_json(&application)
        }
        ApplicationsCmd::Decide {
            id,
            decision,
            remarks,
        } => {
            let application = client
                .mutate(
                    &APPROVE_APPLICATION_STAGE,
                    ApproveStageRequest {
                        id,
                        decision: decision.into(),
                        remarks,
                    },
                )
                .await?;
            println!("{}: {}", application.id, application.status);
            Ok(())
        }
    }
}
