//! Multipart bodies for file uploads.
//!
//! Bodies are kept as plain data until send time so a request can be cloned and
//! logged. The HTTP client sets the `Content-Type` header (with its boundary)
//! itself; nothing here overrides it.

use bytes::Bytes;
use reqwest::multipart::{Form, Part};

use super::error::ApiError;

/// A file attached to a multipart request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl FileUpload {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes: bytes.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    File(FileUpload),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartField {
    pub name: String,
    pub value: FieldValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MultipartBody {
    fields: Vec<MultipartField>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(MultipartField {
            name: name.into(),
            value: FieldValue::Text(value.into()),
        });
        self
    }

    /// Add a text field only when a value is present.
    pub fn text_opt(self, name: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.text(name, value),
            None => self,
        }
    }

    pub fn file(mut self, name: impl Into<String>, file: FileUpload) -> Self {
        self.fields.push(MultipartField {
            name: name.into(),
            value: FieldValue::File(file),
        });
        self
    }

    pub fn file_opt(self, name: impl Into<String>, file: Option<FileUpload>) -> Self {
        match file {
            Some(file) => self.file(name, file),
            None => self,
        }
    }

    pub fn fields(&self) -> &[MultipartField] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| &field.value)
    }

    pub(crate) fn into_form(self) -> Result<Form, ApiError> {
        let mut form = Form::new();
        for field in self.fields {
            form = match field.value {
                FieldValue::Text(value) => form.text(field.name, value),
                FieldValue::File(file) => {
                    let mut part = Part::bytes(file.bytes.to_vec()).file_name(file.file_name);
                    if let Some(content_type) = file.content_type.as_deref() {
                        part = part
                            .mime_str(content_type)
                            .map_err(|e| ApiError::request(e.to_string()))?;
                    }
                    form.part(field.name, part)
                }
            };
        }
        Ok(form)
    }
}
