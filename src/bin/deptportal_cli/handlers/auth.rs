#![deny(clippy::all, clippy::pedantic)]

use deptportal::PortalClient;
use deptportal::endpoints::auth::GET_ME;
use deptportal_api_types::NoArgs;
use deptportal_api_types::auth::LoginRequest;

use crate::args::AuthCmd;
use crate::context::CliError;
use crate::io::read_secret;
use crate::print::print_json;

pub async fn handle(client: &PortalClient, cmd: AuthCmd) -> Result<(), CliError> {
    match cmd {
        AuthCmd::Login {
            email,
            password_file,
            password_env,
        } => {
            let password = read_secret(password_file, password_env)?;
            let response = client.login(LoginRequest { email, password }).await?;
            print_json(&response.user)
        }
        AuthCmd::Logout => {
            client.logout().await?;
            println!("signed out");
            Ok(())
        }
        AuthCmd::Me => {
            let me = client.query(&GET_ME, NoArgs::default()).await?;
            print_json(me.as_ref())
        }
    }
}
