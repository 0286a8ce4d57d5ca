#![deny(clippy::all, clippy::pedantic)]

use deptportal::PortalClient;
use deptportal::endpoints::alumni::GET_ALUMNI;
use deptportal::endpoints::societies::{
    ADD_SOCIETY_MEMBER, GET_SOCIETIES, GET_SOCIETY_MEMBERS, REMOVE_SOCIETY_MEMBER,
};
use deptportal_api_types::NoArgs;
use deptportal_api_types::community::{
    AddSocietyMemberRequest, AlumniQuery, RemoveSocietyMemberRequest, SocietyMembersArg,
};

use crate::args::{AlumniCmd, SocietiesCmd};
use crate::context::CliError;
use crate::print::print_json;

pub async fn alumni(client: &PortalClient, cmd: AlumniCmd) -> Result<(), CliError> {
    match cmd {
        AlumniCmd::List { year, search } => {
            let query = AlumniQuery {
                graduation_year: year,
                search,
            };
            let alumni = client.query(&GET_ALUMNI, query).await?;
            print_json(alumni.as_ref())
        }
    }
}

pub async fn societies(client: &PortalClient, cmd: SocietiesCmd) -> Result<(), CliError> {
    match cmd {
        SocietiesCmd::List => {
            let societies = client.query(&GET_SOCIETIES, NoArgs::default()).await?;
            print_json(societies.as_ref())
        }
        SocietiesCmd::Members { society_id } => {
            let members = client
                .query(&GET_SOCIETY_MEMBERS, SocietyMembersArg { society_id })
                .await?;
            print_json(members.as_ref())
        }
        SocietiesCmd::AddMember {
            society_id,
            user_id,
            position,
        } => {
            let member = client
                .mutate(
                    &ADD_SOCIETY_MEMBER,
                    AddSocietyMemberRequest {
                        society_id,
                        user_id,
                        position,
                    },
                )
                .await?;
            print_json(&member)
        }
        SocietiesCmd::RemoveMember {
            society_id,
            user_id,
        } => {
            client
                .mutate(
                    &REMOVE_SOCIETY_MEMBER,
                    RemoveSocietyMemberRequest {
                        society_id,
                        user_id,
                    },
                )
                .await?;
            println!("removed");
            Ok(())
        }
    }
}
