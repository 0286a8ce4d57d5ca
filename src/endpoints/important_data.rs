//! Important documents uploaded by administrators.

use deptportal_api_types::records::ImportantData;
use deptportal_api_types::{IdArg, NoArgs};
use serde_json::Value;

use crate::cache::{Tag, TagType};
use crate::endpoint::{MutationEndpoint, QueryEndpoint, RegistryBuilder, TagSpec};
use crate::transport::{ApiError, ApiRequest, FileUpload, MultipartBody};

use super::{list_tags, segment};

pub const GET_IMPORTANT_DATA: QueryEndpoint<NoArgs, Vec<ImportantData>> = QueryEndpoint::new(
    "getImportantData",
    important_data,
    TagSpec::Compute(important_data_tags),
);

pub const UPLOAD_IMPORTANT_DATA: MutationEndpoint<UploadImportantData, ImportantData> =
    MutationEndpoint::new(
        "uploadImportantData",
        upload,
        TagSpec::Types(&[TagType::ImportantData]),
    );

pub const DELETE_IMPORTANT_DATA: MutationEndpoint<IdArg, Value> = MutationEndpoint::new(
    "deleteImportantData",
    delete,
    TagSpec::Compute(deleted),
);

/// A titled file; the server stores it and returns its public URL.
#[derive(Debug, Clone)]
pub struct UploadImportantData {
    pub title: String,
    pub file: FileUpload,
}

pub(crate) fn declare(registry: &mut RegistryBuilder) {
    registry.declare(GET_IMPORTANT_DATA.definition());
    registry.declare(UPLOAD_IMPORTANT_DATA.definition());
    registry.declare(DELETE_IMPORTANT_DATA.definition());
}

fn important_data(_: &NoArgs) -> Result<ApiRequest, ApiError> {
    Ok(ApiRequest::get("important-data"))
}

fn important_data_tags(_: &NoArgs, items: Option<&Vec<ImportantData>>) -> Vec<Tag> {
    list_tags(TagType::ImportantData, items, |item| item.id.as_str())
}

fn upload(args: &UploadImportantData) -> Result<ApiRequest, ApiError> {
    if args.file.bytes.is_empty() {
        return Err(ApiError::request("file must not be empty"));
    }
    let body = MultipartBody::new()
        .text("title", args.title.clone())
        .file("file", args.file.clone());
    Ok(ApiRequest::post("important-data").multipart(body))
}

fn delete(args: &IdArg) -> Result<ApiRequest, ApiError> {
    Ok(ApiRequest::delete(format!(
        "important-data/{}",
        segment(&args.id)?
    )))
}

fn deleted(args: &IdArg, _: Option<&Value>) -> Vec<Tag> {
    vec![Tag::id(TagType::ImportantData, args.id.clone())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{FieldValue, RequestBody};

    #[test]
    fn upload_sends_title_and_file() {
        let request = UPLOAD_IMPORTANT_DATA
            .request(&UploadImportantData {
                title: "Syllabus".to_string(),
                file: FileUpload::new("syllabus.pdf", b"%PDF".to_vec())
                    .with_content_type("application/pdf"),
            })
            .expect("request");
        assert_eq!(request.path, "important-data");
        let RequestBody::Multipart(body) = request.body else {
            panic!("multipart expected");
        };
        let Some(FieldValue::File(file)) = body.field("file") else {
            panic!("file field expected");
        };
        assert_eq!(file.file_name, "syllabus.pdf");
        assert_eq!(file.content_type.as_deref(), Some("application/pdf"));
    }

    #[test]
    fn empty_files_are_rejected() {
        let err = UPLOAD_IMPORTANT_DATA
            .request(&UploadImportantData {
                title: "Empty".to_string(),
                file: FileUpload::new("empty.txt", Vec::new()),
            })
            .expect_err("empty file");
        assert_eq!(err.message(), "file must not be empty");
    }
}
