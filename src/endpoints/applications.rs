//! Applications and their staged approval.
//!
//! An application climbs through the pending levels one decision at a time.
//! Which level comes next is up to the server. A decision moves the
//! application between stage-filtered listings, so it refreshes all of them.

use deptportal_api_types::applications::{
    Application, ApplicationQuery, ApproveStageRequest, Decision, SubmitApplicationRequest,
};
use deptportal_api_types::{IdArg, NoArgs};
use serde::Serialize;

use crate::cache::{Tag, TagType};
use crate::endpoint::{MutationEndpoint, QueryEndpoint, RegistryBuilder, TagSpec};
use crate::transport::{ApiError, ApiRequest};

use super::{list_tags, segment};

pub const SUBMIT_APPLICATION: MutationEndpoint<SubmitApplicationRequest, Application> =
    MutationEndpoint::new(
        "submitApplication",
        submit_application,
        TagSpec::Types(&[TagType::Application]),
    );

/// Applications submitted by the signed-in user.
pub const GET_MY_APPLICATIONS: QueryEndpoint<NoArgs, Vec<Application>> = QueryEndpoint::new(
    "getMyApplications",
    my_applications,
    TagSpec::Compute(my_application_tags),
);

/// Applications visible to a reviewer, optionally filtered by stage.
pub const GET_APPLICATIONS: QueryEndpoint<ApplicationQuery, Vec<Application>> =
    QueryEndpoint::new(
        "getApplications",
        applications,
        TagSpec::Compute(application_list_tags),
    );

pub const GET_APPLICATION: QueryEndpoint<IdArg, Application> =
    QueryEndpoint::new("getApplication", application, TagSpec::Compute(application_tags));

pub const APPROVE_APPLICATION_STAGE: MutationEndpoint<ApproveStageRequest, Application> =
    MutationEndpoint::new(
        "approveApplicationStage",
        approve_stage,
        TagSpec::Types(&[TagType::Application]),
    );

#[derive(Serialize)]
struct StageDecision<'a> {
    decision: Decision,
    #[serde(skip_serializing_if = "Option::is_none")]
    remarks: Option<&'a str>,
}

pub(crate) fn declare(registry: &mut RegistryBuilder) {
    registry.declare(SUBMIT_APPLICATION.definition());
    registry.declare(GET_MY_APPLICATIONS.definition());
    registry.declare(GET_APPLICATIONS.definition());
    registry.declare(GET_APPLICATION.definition());
    registry.declare(APPROVE_APPLICATION_STAGE.definition());
}

fn submit_application(args: &SubmitApplicationRequest) -> Result<ApiRequest, ApiError> {
    ApiRequest::post("applications").json(args)
}

fn my_applications(_: &NoArgs) -> Result<ApiRequest, ApiError> {
    Ok(ApiRequest::get("applications/my"))
}

fn my_application_tags(_: &NoArgs, applications: Option<&Vec<Application>>) -> Vec<Tag> {
    list_tags(TagType::Application, applications, |app| app.id.as_str())
}

fn applications(args: &ApplicationQuery) -> Result<ApiRequest, ApiError> {
    ApiRequest::get("applications").query(args)
}

fn application_list_tags(
    _: &ApplicationQuery,
    applications: Option<&Vec<Application>>,
) -> Vec<Tag> {
    list_tags(TagType::Application, applications, |app| app.id.as_str())
}

fn application(args: &IdArg) -> Result<ApiRequest, ApiError> {
    Ok(ApiRequest::get(format!(
        "applications/{}",
        segment(&args.id)?
    )))
}

fn application_tags(args: &IdArg, _: Option<&Application>) -> Vec<Tag> {
    vec![Tag::id(TagType::Application, args.id.clone())]
}

fn approve_stage(args: &ApproveStageRequest) -> Result<ApiRequest, ApiError> {
    ApiRequest::patch(format!("applications/{}/approve", segment(&args.id)?)).json(
        &StageDecision {
            decision: args.decision,
            remarks: args.remarks.as_deref(),
        },
    )
}

#[cfg(test)]
mod tests {
    use deptportal_api_types::applications::ApplicationStatus;
    use reqwest::Method;
    use serde_json::json;

    use super::*;
    use crate::transport::RequestBody;

    fn app(id: &str, status: ApplicationStatus) -> Application {
        Application {
            id: id.to_string(),
            kind: "leave".to_string(),
            subject: "Medical leave".to_string(),
            body: "...".to_string(),
            status,
            applicant_name: None,
            submitted_at: time::OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn stage_filter_is_sent_in_wire_form() {
        let request = GET_APPLICATIONS
            .request(&ApplicationQuery {
                status: Some(ApplicationStatus::PendingL1),
            })
            .expect("request");
        assert_eq!(
            request.query,
            vec![("status".to_string(), "PENDING_L1".to_string())]
        );
    }

    #[test]
    fn approval_refreshes_every_stage_listing() {
        let args = ApproveStageRequest {
            id: "a7".to_string(),
            decision: Decision::Approve,
            remarks: Some("ok".to_string()),
        };
        let request = APPROVE_APPLICATION_STAGE.request(&args).expect("request");
        assert_eq!(request.method, Method::PATCH);
        assert_eq!(request.path, "applications/a7/approve");
        assert_eq!(
            request.body,
            RequestBody::Json(json!({"decision": "APPROVE", "remarks": "ok"}))
        );

        let invalidated = APPROVE_APPLICATION_STAGE
            .invalidated_tags(&args, &app("a7", ApplicationStatus::PendingL2));
        let reaches = |provided: Vec<Tag>| {
            invalidated
                .iter()
                .any(|tag| provided.iter().any(|p| tag.invalidates(p)))
        };
        assert!(reaches(GET_APPLICATION.provided_tags(&IdArg::new("a7"), None)));
        assert!(reaches(GET_APPLICATIONS.provided_tags(
            &ApplicationQuery::default(),
            Some(&vec![app("a7", ApplicationStatus::PendingL1)])
        )));
        // The application moves into this listing, which never held it.
        assert!(reaches(GET_APPLICATIONS.provided_tags(
            &ApplicationQuery {
                status: Some(ApplicationStatus::PendingL2),
            },
            Some(&Vec::new())
        )));
    }
}
