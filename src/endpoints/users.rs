//! User administration and the faculty/student directories.

use deptportal_api_types::auth::Role;
use deptportal_api_types::community::{DirectoryEntry, UpdateUserRoleRequest};
use deptportal_api_types::{IdArg, ListQuery};
use serde::Serialize;
use serde_json::Value;

use crate::cache::{Tag, TagType};
use crate::endpoint::{MutationEndpoint, QueryEndpoint, RegistryBuilder, TagSpec};
use crate::transport::{ApiError, ApiRequest};

use super::{list_tags, segment};

/// Every directory listing a role or account change can affect.
const DIRECTORY: &[TagType] = &[TagType::User, TagType::Faculty, TagType::Student];

pub const GET_USERS: QueryEndpoint<ListQuery, Vec<DirectoryEntry>> =
    QueryEndpoint::new("getUsers", users, TagSpec::Compute(user_tags));

pub const GET_FACULTY: QueryEndpoint<ListQuery, Vec<DirectoryEntry>> =
    QueryEndpoint::new("getFaculty", faculty, TagSpec::Compute(faculty_tags));

pub const GET_STUDENTS: QueryEndpoint<ListQuery, Vec<DirectoryEntry>> =
    QueryEndpoint::new("getStudents", students, TagSpec::Compute(student_tags));

pub const UPDATE_USER_ROLE: MutationEndpoint<UpdateUserRoleRequest, DirectoryEntry> =
    MutationEndpoint::new("updateUserRole", update_user_role, TagSpec::Types(DIRECTORY));

pub const DELETE_USER: MutationEndpoint<IdArg, Value> =
    MutationEndpoint::new("deleteUser", delete_user, TagSpec::Types(DIRECTORY));

#[derive(Serialize)]
struct RoleChange<'a> {
    role: Role,
    permissions: &'a [String],
}

pub(crate) fn declare(registry: &mut RegistryBuilder) {
    registry.declare(GET_USERS.definition());
    registry.declare(GET_FACULTY.definition());
    registry.declare(GET_STUDENTS.definition());
    registry.declare(UPDATE_USER_ROLE.definition());
    registry.declare(DELETE_USER.definition());
}

fn users(args: &ListQuery) -> Result<ApiRequest, ApiError> {
    ApiRequest::get("users").query(args)
}

fn faculty(args: &ListQuery) -> Result<ApiRequest, ApiError> {
    ApiRequest::get("users/faculty").query(args)
}

fn students(args: &ListQuery) -> Result<ApiRequest, ApiError> {
    ApiRequest::get("users/students").query(args)
}

fn entry_id(entry: &DirectoryEntry) -> &str {
    entry.id.as_str()
}

fn user_tags(_: &ListQuery, entries: Option<&Vec<DirectoryEntry>>) -> Vec<Tag> {
    list_tags(TagType::User, entries, entry_id)
}

fn faculty_tags(_: &ListQuery, entries: Option<&Vec<DirectoryEntry>>) -> Vec<Tag> {
    list_tags(TagType::Faculty, entries, entry_id)
}

fn student_tags(_: &ListQuery, entries: Option<&Vec<DirectoryEntry>>) -> Vec<Tag> {
    list_tags(TagType::Student, entries, entry_id)
}

fn update_user_role(args: &UpdateUserRoleRequest) -> Result<ApiRequest, ApiError> {
    ApiRequest::patch(format!("users/{}/role", segment(&args.id)?)).json(&RoleChange {
        role: args.role,
        permissions: &args.permissions,
    })
}

fn delete_user(args: &IdArg) -> Result<ApiRequest, ApiError> {
    Ok(ApiRequest::delete(format!("users/{}", segment(&args.id)?)))
}

#[cfg(test)]
mod tests {
    use reqwest::Method;
    use serde_json::json;

    use super::*;
    use crate::transport::RequestBody;

    #[test]
    fn directories_have_their_own_paths() {
        let query = ListQuery::default();
        assert_eq!(GET_USERS.request(&query).expect("users").path, "users");
        assert_eq!(
            GET_FACULTY.request(&query).expect("faculty").path,
            "users/faculty"
        );
        assert_eq!(
            GET_STUDENTS.request(&query).expect("students").path,
            "users/students"
        );
    }

    #[test]
    fn role_change_refreshes_every_directory() {
        let request = UpdateUserRoleRequest {
            id: "u1".to_string(),
            role: Role::Faculty,
            permissions: vec!["notices:write".to_string()],
        };
        let entry = DirectoryEntry {
            id: "u1".to_string(),
            name: "Grace".to_string(),
            email: "grace@example.edu".to_string(),
            role: Role::Faculty,
            designation: None,
            roll_number: None,
        };
        let tags = UPDATE_USER_ROLE.invalidated_tags(&request, &entry);
        for tag_type in DIRECTORY {
            assert!(tags.contains(&Tag::of(*tag_type)));
        }

        let http = UPDATE_USER_ROLE.request(&request).expect("request");
        assert_eq!(http.method, Method::PATCH);
        assert_eq!(http.path, "users/u1/role");
        assert_eq!(
            http.body,
            RequestBody::Json(json!({"role": "FACULTY", "permissions": ["notices:write"]}))
        );
    }
}
