//! Work handed out to staff and its progress.

use deptportal_api_types::ListQuery;
use deptportal_api_types::applications::{
    AssignWorkRequest, UpdateWorkStatusRequest, WorkAssignment, WorkStatus,
};
use serde::Serialize;

use crate::cache::{Tag, TagType};
use crate::endpoint::{MutationEndpoint, QueryEndpoint, RegistryBuilder, TagSpec};
use crate::transport::{ApiError, ApiRequest};

use super::{list_tags, segment};

pub const GET_WORK_ASSIGNMENTS: QueryEndpoint<ListQuery, Vec<WorkAssignment>> =
    QueryEndpoint::new(
        "getWorkAssignments",
        work_assignments,
        TagSpec::Compute(assignment_tags),
    );

pub const ASSIGN_WORK: MutationEndpoint<AssignWorkRequest, WorkAssignment> =
    MutationEndpoint::new(
        "assignWork",
        assign_work,
        TagSpec::Types(&[TagType::WorkAssignment]),
    );

pub const UPDATE_WORK_STATUS: MutationEndpoint<UpdateWorkStatusRequest, WorkAssignment> =
    MutationEndpoint::new(
        "updateWorkStatus",
        update_work_status,
        TagSpec::Compute(updated_assignment),
    );

#[derive(Serialize)]
struct StatusChange {
    status: WorkStatus,
}

pub(crate) fn declare(registry: &mut RegistryBuilder) {
    registry.declare(GET_WORK_ASSIGNMENTS.definition());
    registry.declare(ASSIGN_WORK.definition());
    registry.declare(UPDATE_WORK_STATUS.definition());
}

fn work_assignments(args: &ListQuery) -> Result<ApiRequest, ApiError> {
    ApiRequest::get("work-assignments").query(args)
}

fn assignment_tags(_: &ListQuery, assignments: Option<&Vec<WorkAssignment>>) -> Vec<Tag> {
    list_tags(TagType::WorkAssignment, assignments, |work| work.id.as_str())
}

fn assign_work(args: &AssignWorkRequest) -> Result<ApiRequest, ApiError> {
    if args.assignee_id.trim().is_empty() {
        return Err(ApiError::request("assignee must not be empty"));
    }
    ApiRequest::post("work-assignments").json(args)
}

fn update_work_status(args: &UpdateWorkStatusRequest) -> Result<ApiRequest, ApiError> {
    ApiRequest::patch(format!("work-assignments/{}/status", segment(&args.id)?))
        .json(&StatusChange {
            status: args.status,
        })
}

fn updated_assignment(args: &UpdateWorkStatusRequest, _: Option<&WorkAssignment>) -> Vec<Tag> {
    vec![Tag::id(TagType::WorkAssignment, args.id.clone())]
}

#[cfg(test)]
mod tests {
    use reqwest::Method;
    use serde_json::json;
    use time::macros::datetime;

    use super::*;
    use crate::transport::RequestBody;

    #[test]
    fn due_date_is_sent_as_rfc3339() {
        let request = ASSIGN_WORK
            .request(&AssignWorkRequest {
                title: "Grade lab reports".to_string(),
                assignee_id: "u9".to_string(),
                due_at: Some(datetime!(2026-11-01 17:00 UTC)),
            })
            .expect("request");
        assert_eq!(
            request.body,
            RequestBody::Json(json!({
                "title": "Grade lab reports",
                "assigneeId": "u9",
                "dueAt": "2026-11-01T17:00:00Z"
            }))
        );
    }

    #[test]
    fn status_update_patches_only_the_status() {
        let args = UpdateWorkStatusRequest {
            id: "w3".to_string(),
            status: WorkStatus::InProgress,
        };
        let request = UPDATE_WORK_STATUS.request(&args).expect("request");
        assert_eq!(request.method, Method::PATCH);
        assert_eq!(request.path, "work-assignments/w3/status");
        assert_eq!(
            request.body,
            RequestBody::Json(json!({"status": "IN_PROGRESS"}))
        );
    }
}
