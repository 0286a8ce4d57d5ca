//! Products and projects built in the department.

use deptportal_api_types::NoArgs;
use deptportal_api_types::academics::{CreateProjectRequest, Product, Project};

use crate::cache::{Tag, TagType};
use crate::endpoint::{MutationEndpoint, QueryEndpoint, RegistryBuilder, TagSpec};
use crate::transport::{ApiError, ApiRequest, FileUpload, MultipartBody};

use super::list_tags;

pub const GET_PRODUCTS: QueryEndpoint<NoArgs, Vec<Product>> =
    QueryEndpoint::new("getProducts", products, TagSpec::Compute(product_tags));

pub const CREATE_PRODUCT: MutationEndpoint<CreateProduct, Product> = MutationEndpoint::new(
    "createProduct",
    create_product,
    TagSpec::Types(&[TagType::Product]),
);

pub const GET_PROJECTS: QueryEndpoint<NoArgs, Vec<Project>> =
    QueryEndpoint::new("getProjects", projects, TagSpec::Compute(project_tags));

pub const CREATE_PROJECT: MutationEndpoint<CreateProjectRequest, Project> = MutationEndpoint::new(
    "createProject",
    create_project,
    TagSpec::Types(&[TagType::Project]),
);

/// Multipart payload for a new product.
#[derive(Debug, Clone)]
pub struct CreateProduct {
    pub name: String,
    pub description: String,
    pub url: Option<String>,
    pub image: Option<FileUpload>,
}

pub(crate) fn declare(registry: &mut RegistryBuilder) {
    registry.declare(GET_PRODUCTS.definition());
    registry.declare(CREATE_PRODUCT.definition());
    registry.declare(GET_PROJECTS.definition());
    registry.declare(CREATE_PROJECT.definition());
}

fn products(_: &NoArgs) -> Result<ApiRequest, ApiError> {
    Ok(ApiRequest::get("products"))
}

fn product_tags(_: &NoArgs, products: Option<&Vec<Product>>) -> Vec<Tag> {
    list_tags(TagType::Product, products, |product| product.id.as_str())
}

fn create_product(args: &CreateProduct) -> Result<ApiRequest, ApiError> {
    let body = MultipartBody::new()
        .text("name", args.name.clone())
        .text("description", args.description.clone())
        .text_opt("url", args.url.clone())
        .file_opt("image", args.image.clone());
    Ok(ApiRequest::post("products").multipart(body))
}

fn projects(_: &NoArgs) -> Result<ApiRequest, ApiError> {
    Ok(ApiRequest::get("projects"))
}

fn project_tags(_: &NoArgs, projects: Option<&Vec<Project>>) -> Vec<Tag> {
    list_tags(TagType::Project, projects, |project| project.id.as_str())
}

fn create_project(args: &CreateProjectRequest) -> Result<ApiRequest, ApiError> {
    ApiRequest::post("projects").json(args)
}
