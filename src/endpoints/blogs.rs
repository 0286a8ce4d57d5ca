//! Blog posts and their moderation queue.

use deptportal_api_types::content::{BlogPost, ModeratePostRequest, PostStatus};
use deptportal_api_types::{IdArg, ListQuery, NoArgs};
use serde::Serialize;
use serde_json::Value;

use crate::cache::{Tag, TagType};
use crate::endpoint::{MutationEndpoint, QueryEndpoint, RegistryBuilder, TagSpec};
use crate::transport::{ApiError, ApiRequest, FileUpload, MultipartBody};

use super::{list_tags, segment};

pub const GET_BLOGS: QueryEndpoint<ListQuery, Vec<BlogPost>> =
    QueryEndpoint::new("getBlogs", blogs, TagSpec::Compute(post_list_tags));

/// Posts written by the signed-in user, in any moderation state.
pub const GET_MY_BLOGS: QueryEndpoint<NoArgs, Vec<BlogPost>> =
    QueryEndpoint::new("getMyBlogs", my_blogs, TagSpec::Compute(post_list_tags));

pub const GET_BLOG: QueryEndpoint<IdArg, BlogPost> =
    QueryEndpoint::new("getBlog", blog, TagSpec::Compute(post_tags));

pub const CREATE_BLOG_POST: MutationEndpoint<CreateBlogPost, BlogPost> =
    MutationEndpoint::new("createBlogPost", create_blog_post, TagSpec::Types(&[TagType::Post]));

pub const DELETE_BLOG_POST: MutationEndpoint<IdArg, Value> =
    MutationEndpoint::new("deleteBlogPost", delete_blog_post, TagSpec::Types(&[TagType::Post]));

/// Posts awaiting moderation.
pub const GET_PENDING_POSTS: QueryEndpoint<NoArgs, Vec<BlogPost>> =
    QueryEndpoint::new("getPendingPosts", pending_posts, TagSpec::Compute(post_list_tags));

pub const MODERATE_POST: MutationEndpoint<ModeratePostRequest, BlogPost> =
    MutationEndpoint::new("moderatePost", moderate_post, TagSpec::Types(&[TagType::Post]));

/// Multipart payload for a new blog post.
#[derive(Debug, Clone)]
pub struct CreateBlogPost {
    pub title: String,
    pub content: String,
    pub category: String,
    pub image: Option<FileUpload>,
}

#[derive(Serialize)]
struct ModerationBody<'a> {
    status: &'a PostStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    remarks: Option<&'a str>,
}

pub(crate) fn declare(registry: &mut RegistryBuilder) {
    registry.declare(GET_BLOGS.definition());
    registry.declare(GET_MY_BLOGS.definition());
    registry.declare(GET_BLOG.definition());
    registry.declare(CREATE_BLOG_POST.definition());
    registry.declare(DELETE_BLOG_POST.definition());
    registry.declare(GET_PENDING_POSTS.definition());
    registry.declare(MODERATE_POST.definition());
}

fn blogs(args: &ListQuery) -> Result<ApiRequest, ApiError> {
    ApiRequest::get("blogs").query(args)
}

fn my_blogs(_: &NoArgs) -> Result<ApiRequest, ApiError> {
    Ok(ApiRequest::get("blogs/my"))
}

fn pending_posts(_: &NoArgs) -> Result<ApiRequest, ApiError> {
    Ok(ApiRequest::get("blogs/pending"))
}

fn post_list_tags<A>(_: &A, posts: Option<&Vec<BlogPost>>) -> Vec<Tag> {
    list_tags(TagType::Post, posts, |post| post.id.as_str())
}

fn blog(args: &IdArg) -> Result<ApiRequest, ApiError> {
    Ok(ApiRequest::get(format!("blogs/{}", segment(&args.id)?)))
}

fn post_tags(args: &IdArg, _: Option<&BlogPost>) -> Vec<Tag> {
    vec![Tag::id(TagType::Post, args.id.clone())]
}

fn create_blog_post(args: &CreateBlogPost) -> Result<ApiRequest, ApiError> {
    let body = MultipartBody::new()
        .text("title", args.title.clone())
        .text("content", args.content.clone())
        .text("category", args.category.clone())
        .file_opt("image", args.image.clone());
    Ok(ApiRequest::post("blogs").multipart(body))
}

fn delete_blog_post(args: &IdArg) -> Result<ApiRequest, ApiError> {
    Ok(ApiRequest::delete(format!("blogs/{}", segment(&args.id)?)))
}

fn moderate_post(args: &ModeratePostRequest) -> Result<ApiRequest, ApiError> {
    ApiRequest::patch(format!("blogs/{}/moderate", segment(&args.id)?)).json(&ModerationBody {
        status: &args.status,
        remarks: args.remarks.as_deref(),
    })
}

#[cfg(test)]
mod tests {
    use reqwest::Method;
    use serde_json::json;

    use super::*;
    use crate::transport::{FieldValue, RequestBody};

    #[test]
    fn create_posts_multipart_to_blogs() {
        let request = CREATE_BLOG_POST
            .request(&CreateBlogPost {
                title: "Rust at the department".to_string(),
                content: "...".to_string(),
                category: "tech".to_string(),
                image: Some(FileUpload::new("cover.jpg", b"jpg".to_vec())),
            })
            .expect("request");
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.path, "blogs");
        let RequestBody::Multipart(body) = request.body else {
            panic!("multipart expected");
        };
        let names: Vec<_> = body.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["title", "content", "category", "image"]);
        assert!(matches!(body.field("image"), Some(FieldValue::File(_))));
    }

    #[test]
    fn creating_a_post_invalidates_my_blogs() {
        let created = CREATE_BLOG_POST.invalidated_tags(
            &CreateBlogPost {
                title: "t".to_string(),
                content: "c".to_string(),
                category: "k".to_string(),
                image: None,
            },
            &BlogPost {
                id: "p9".to_string(),
                title: "t".to_string(),
                content: "c".to_string(),
                category: "k".to_string(),
                image_url: None,
                status: PostStatus::Pending,
                author_name: None,
            },
        );
        let provided = GET_MY_BLOGS.provided_tags(&NoArgs::default(), None);
        assert!(created.iter().any(|tag| provided.iter().any(|p| tag.invalidates(p))));
    }

    #[test]
    fn moderation_body_omits_the_id() {
        let request = MODERATE_POST
            .request(&ModeratePostRequest {
                id: "p1".to_string(),
                status: PostStatus::Approved,
                remarks: None,
            })
            .expect("request");
        assert_eq!(request.method, Method::PATCH);
        assert_eq!(request.path, "blogs/p1/moderate");
        assert_eq!(request.body, RequestBody::Json(json!({"status": "APPROVED"})));
    }
}
