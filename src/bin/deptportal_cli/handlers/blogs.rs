#![deny(clippy::all, clippy::pedantic)]

use deptportal::PortalClient;
use deptportal::endpoints::blogs::{
    CREATE_BLOG_POST, CreateBlogPost, GET_BLOGS, GET_MY_BLOGS, GET_PENDING_POSTS, MODERATE_POST,
};
use deptportal_api_types::content::ModeratePostRequest;
use deptportal_api_types::{ListQuery, NoArgs};

use crate::args::BlogsCmd;
use crate::context::CliError;
use crate::io::{read_upload_opt, read_value};
use crate::print::print_json;

pub async fn handle(client: &PortalClient, cmd: BlogsCmd) -> Result<(), CliError> {
    match cmd {
        BlogsCmd::List { search } => {
            let query = ListQuery {
                search,
                ..ListQuery::default()
            };
            let posts = client.query(&GET_BLOGS, query).await?;
            print_json(posts.as_ref())
        }
        BlogsCmd::Mine => {
            let posts = client.query(&GET_MY_BLOGS, NoArgs::default()).await?;
            print_json(posts.as_ref())
        }
        BlogsCmd::Create {
            title,
            content,
            content_file,
            category,
            image,
        } => {
            let post = CreateBlogPost {
                title,
                content: read_value(content, content_file)?,
                category,
                image: read_upload_opt(image.as_deref())?,
            };
            let created = client.mutate(&CREATE_BLOG_POST, post).await?;
            print_json(&created)
        }
        BlogsCmd::Pending => {
            let posts = client.query(&GET_PENDING_POSTS, NoArgs::default()).await?;
            print_json(posts.as_ref())
        }
        BlogsCmd::Moderate {
            id,
            status,
            remarks,
        } => {
            let post = client
                .mutate(
                    &MODERATE_POST,
                    ModeratePostRequest {
                        id,
                        status: status.into(),
                        remarks,
                    },
                )
                .await?;
            print_json(&post)
        }
    }
}
