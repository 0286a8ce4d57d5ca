//! Log of emails the portal has sent.
//!
//! Declared after every other module with [`RegistryBuilder::declare_override`]
//! so this module's definition of `getEmailLogs` is the one in effect, even if
//! a dashboard module declared its own copy first.

use deptportal_api_types::records::EmailLog;
use deptportal_api_types::{IdArg, ListQuery};

use crate::cache::{Tag, TagType};
use crate::endpoint::{MutationEndpoint, QueryEndpoint, RegistryBuilder, TagSpec};
use crate::transport::{ApiError, ApiRequest};

use super::{list_tags, segment};

pub const GET_EMAIL_LOGS: QueryEndpoint<ListQuery, Vec<EmailLog>> =
    QueryEndpoint::new("getEmailLogs", email_logs, TagSpec::Compute(email_log_tags));

pub const RESEND_EMAIL: MutationEndpoint<IdArg, EmailLog> =
    MutationEndpoint::new("resendEmail", resend_email, TagSpec::Compute(resent));

pub(crate) fn declare(registry: &mut RegistryBuilder) {
    registry.declare_override(GET_EMAIL_LOGS.definition());
    registry.declare_override(RESEND_EMAIL.definition());
}

fn email_logs(args: &ListQuery) -> Result<ApiRequest, ApiError> {
    ApiRequest::get("email-logs").query(args)
}

fn email_log_tags(_: &ListQuery, logs: Option<&Vec<EmailLog>>) -> Vec<Tag> {
    list_tags(TagType::EmailLog, logs, |log| log.id.as_str())
}

fn resend_email(args: &IdArg) -> Result<ApiRequest, ApiError> {
    Ok(ApiRequest::post(format!(
        "email-logs/{}/resend",
        segment(&args.id)?
    )))
}

fn resent(args: &IdArg, _: Option<&EmailLog>) -> Vec<Tag> {
    vec![Tag::id(TagType::EmailLog, args.id.clone())]
}
