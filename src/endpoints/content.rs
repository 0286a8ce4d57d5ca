//! Notices, achievements and the homepage.

use deptportal_api_types::content::{
    Achievement, CreateNoticeRequest, Homepage, Notice, NoticeQuery,
};
use deptportal_api_types::{IdArg, NoArgs};
use serde_json::Value;

use crate::cache::{Tag, TagType};
use crate::endpoint::{MutationEndpoint, QueryEndpoint, RegistryBuilder, TagSpec};
use crate::transport::{ApiError, ApiRequest, FileUpload, MultipartBody};

use super::{list_tags, segment};

pub const GET_NOTICES: QueryEndpoint<NoticeQuery, Vec<Notice>> =
    QueryEndpoint::new("getNotices", notices, TagSpec::Compute(notice_tags));

pub const CREATE_NOTICE: MutationEndpoint<CreateNoticeRequest, Notice> = MutationEndpoint::new(
    "createNotice",
    create_notice,
    TagSpec::Types(&[TagType::Notice, TagType::Homepage]),
);

pub const DELETE_NOTICE: MutationEndpoint<IdArg, Value> =
    MutationEndpoint::new("deleteNotice", delete_notice, TagSpec::Compute(deleted_notice));

pub const GET_ACHIEVEMENTS: QueryEndpoint<NoArgs, Vec<Achievement>> = QueryEndpoint::new(
    "getAchievements",
    achievements,
    TagSpec::Types(&[TagType::Achievement]),
);

pub const CREATE_ACHIEVEMENT: MutationEndpoint<CreateAchievement, Achievement> =
    MutationEndpoint::new(
        "createAchievement",
        create_achievement,
        TagSpec::Types(&[TagType::Achievement, TagType::Homepage]),
    );

pub const GET_HOMEPAGE: QueryEndpoint<NoArgs, Homepage> =
    QueryEndpoint::new("getHomepage", homepage, TagSpec::Types(&[TagType::Homepage]));

pub const UPDATE_HOMEPAGE: MutationEndpoint<Homepage, Homepage> = MutationEndpoint::new(
    "updateHomepage",
    update_homepage,
    TagSpec::Types(&[TagType::Homepage]),
);

/// Multipart payload for a new achievement.
#[derive(Debug, Clone)]
pub struct CreateAchievement {
    pub title: String,
    pub description: String,
    pub image: Option<FileUpload>,
}

pub(crate) fn declare(registry: &mut RegistryBuilder) {
    registry.declare(GET_NOTICES.definition());
    registry.declare(CREATE_NOTICE.definition());
    registry.declare(DELETE_NOTICE.definition());
    registry.declare(GET_ACHIEVEMENTS.definition());
    registry.declare(CREATE_ACHIEVEMENT.definition());
    registry.declare(GET_HOMEPAGE.definition());
    registry.declare(UPDATE_HOMEPAGE.definition());
}

fn notices(args: &NoticeQuery) -> Result<ApiRequest, ApiError> {
    ApiRequest::get("content/notices").query(args)
}

fn notice_tags(_: &NoticeQuery, notices: Option<&Vec<Notice>>) -> Vec<Tag> {
    list_tags(TagType::Notice, notices, |notice| notice.id.as_str())
}

fn create_notice(args: &CreateNoticeRequest) -> Result<ApiRequest, ApiError> {
    ApiRequest::post("content/notices").json(args)
}

fn delete_notice(args: &IdArg) -> Result<ApiRequest, ApiError> {
    Ok(ApiRequest::delete(format!(
        "content/notices/{}",
        segment(&args.id)?
    )))
}

fn deleted_notice(args: &IdArg, _: Option<&Value>) -> Vec<Tag> {
    vec![
        Tag::id(TagType::Notice, args.id.clone()),
        Tag::of(TagType::Homepage),
    ]
}

fn achievements(_: &NoArgs) -> Result<ApiRequest, ApiError> {
    Ok(ApiRequest::get("content/achievements"))
}

fn create_achievement(args: &CreateAchievement) -> Result<ApiRequest, ApiError> {
    let body = MultipartBody::new()
        .text("title", args.title.clone())
        .text("description", args.description.clone())
        .file_opt("image", args.image.clone());
    Ok(ApiRequest::post("content/achievements").multipart(body))
}

fn homepage(_: &NoArgs) -> Result<ApiRequest, ApiError> {
    Ok(ApiRequest::get("content/homepage"))
}

fn update_homepage(args: &Homepage) -> Result<ApiRequest, ApiError> {
    ApiRequest::put("content/homepage").json(args)
}
