//! Student societies and their member rosters.

use deptportal_api_types::{IdArg, NoArgs};
use deptportal_api_types::community::{
    AddSocietyMemberRequest, RemoveSocietyMemberRequest, Society, SocietyMember, SocietyMembersArg,
};
use serde::Serialize;
use serde_json::Value;

use crate::cache::{Tag, TagType};
use crate::endpoint::{MutationEndpoint, QueryEndpoint, RegistryBuilder, TagSpec};
use crate::transport::{ApiError, ApiRequest, FileUpload, MultipartBody};

use super::{list_tags, segment};

pub const GET_SOCIETIES: QueryEndpoint<NoArgs, Vec<Society>> =
    QueryEndpoint::new("getSocieties", societies, TagSpec::Compute(society_list_tags));

pub const CREATE_SOCIETY: MutationEndpoint<CreateSociety, Society> = MutationEndpoint::new(
    "createSociety",
    create_society,
    TagSpec::Types(&[TagType::Society]),
);

pub const DELETE_SOCIETY: MutationEndpoint<IdArg, Value> =
    MutationEndpoint::new("deleteSociety", delete_society, TagSpec::Compute(deleted_society));

/// Members of one society; tagged by society id so membership changes stay
/// local to that roster.
pub const GET_SOCIETY_MEMBERS: QueryEndpoint<SocietyMembersArg, Vec<SocietyMember>> =
    QueryEndpoint::new(
        "getSocietyMembers",
        society_members,
        TagSpec::Compute(roster_tags),
    );

pub const ADD_SOCIETY_MEMBER: MutationEndpoint<AddSocietyMemberRequest, SocietyMember> =
    MutationEndpoint::new(
        "addSocietyMember",
        add_society_member,
        TagSpec::Compute(added_member),
    );

pub const REMOVE_SOCIETY_MEMBER: MutationEndpoint<RemoveSocietyMemberRequest, Value> =
    MutationEndpoint::new(
        "removeSocietyMember",
        remove_society_member,
        TagSpec::Compute(removed_member),
    );

/// Multipart payload for a new society.
#[derive(Debug, Clone)]
pub struct CreateSociety {
    pub name: String,
    pub description: Option<String>,
    pub logo: Option<FileUpload>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewMember<'a> {
    user_id: &'a str,
    position: &'a str,
}

pub(crate) fn declare(registry: &mut RegistryBuilder) {
    registry.declare(GET_SOCIETIES.definition());
    registry.declare(CREATE_SOCIETY.definition());
    registry.declare(DELETE_SOCIETY.definition());
    registry.declare(GET_SOCIETY_MEMBERS.definition());
    registry.declare(ADD_SOCIETY_MEMBER.definition());
    registry.declare(REMOVE_SOCIETY_MEMBER.definition());
}

fn societies(_: &NoArgs) -> Result<ApiRequest, ApiError> {
    Ok(ApiRequest::get("societies"))
}

fn society_list_tags(_: &NoArgs, societies: Option<&Vec<Society>>) -> Vec<Tag> {
    list_tags(TagType::Society, societies, |society| society.id.as_str())
}

fn create_society(args: &CreateSociety) -> Result<ApiRequest, ApiError> {
    let body = MultipartBody::new()
        .text("name", args.name.clone())
        .text_opt("description", args.description.clone())
        .file_opt("logo", args.logo.clone());
    Ok(ApiRequest::post("societies").multipart(body))
}

fn delete_society(args: &IdArg) -> Result<ApiRequest, ApiError> {
    Ok(ApiRequest::delete(format!("societies/{}", segment(&args.id)?)))
}

fn deleted_society(args: &IdArg, _: Option<&Value>) -> Vec<Tag> {
    vec![
        Tag::id(TagType::Society, args.id.clone()),
        Tag::id(TagType::SocietyMembers, args.id.clone()),
    ]
}

fn society_members(args: &SocietyMembersArg) -> Result<ApiRequest, ApiError> {
    Ok(ApiRequest::get(format!(
        "societies/{}/members",
        segment(&args.society_id)?
    )))
}

fn roster_tags(args: &SocietyMembersArg, _: Option<&Vec<SocietyMember>>) -> Vec<Tag> {
    vec![Tag::id(TagType::SocietyMembers, args.society_id.clone())]
}

fn add_society_member(args: &AddSocietyMemberRequest) -> Result<ApiRequest, ApiError> {
    ApiRequest::post(format!(
        "societies/{}/members",
        segment(&args.society_id)?
    ))
    .json(&NewMember {
        user_id: &args.user_id,
        position: &args.position,
    })
}

fn added_member(args: &AddSocietyMemberRequest, _: Option<&SocietyMember>) -> Vec<Tag> {
    vec![Tag::id(TagType::SocietyMembers, args.society_id.clone())]
}

fn remove_society_member(args: &RemoveSocietyMemberRequest) -> Result<ApiRequest, ApiError> {
    Ok(ApiRequest::delete(format!(
        "societies/{}/members/{}",
        segment(&args.society_id)?,
        segment(&args.user_id)?
    )))
}

fn removed_member(args: &RemoveSocietyMemberRequest, _: Option<&Value>) -> Vec<Tag> {
    vec![Tag::id(TagType::SocietyMembers, args.society_id.clone())]
}

#[cfg(test)]
mod tests {
    use reqwest::Method;
    use serde_json::json;

    use super::*;
    use crate::transport::RequestBody;

    fn roster(society: &str) -> Vec<Tag> {
        GET_SOCIETY_MEMBERS.provided_tags(
            &SocietyMembersArg {
                society_id: society.to_string(),
            },
            None,
        )
    }

    #[test]
    fn removing_a_member_touches_only_that_roster() {
        let tags = REMOVE_SOCIETY_MEMBER.invalidated_tags(
            &RemoveSocietyMemberRequest {
                society_id: "42".to_string(),
                user_id: "u1".to_string(),
            },
            &Value::Null,
        );
        let hits = |provided: Vec<Tag>| {
            tags.iter()
                .any(|tag| provided.iter().any(|p| tag.invalidates(p)))
        };
        assert!(hits(roster("42")));
        assert!(!hits(roster("7")));
    }

    #[test]
    fn member_paths_carry_both_ids() {
        let request = REMOVE_SOCIETY_MEMBER
            .request(&RemoveSocietyMemberRequest {
                society_id: "42".to_string(),
                user_id: "u1".to_string(),
            })
            .expect("request");
        assert_eq!(request.method, Method::DELETE);
        assert_eq!(request.path, "societies/42/members/u1");
    }

    #[test]
    fn add_member_sends_camel_case_body() {
        let request = ADD_SOCIETY_MEMBER
            .request(&AddSocietyMemberRequest {
                society_id: "42".to_string(),
                user_id: "u1".to_string(),
                position: "Treasurer".to_string(),
            })
            .expect("request");
        assert_eq!(request.path, "societies/42/members");
        assert_eq!(
            request.body,
            RequestBody::Json(json!({"userId": "u1", "position": "Treasurer"}))
        );
    }

    #[test]
    fn empty_society_id_is_rejected() {
        let err = GET_SOCIETY_MEMBERS
            .request(&SocietyMembersArg {
                society_id: " ".to_string(),
            })
            .expect_err("empty id");
        assert!(err.message().contains("must not be empty"));
    }
}
