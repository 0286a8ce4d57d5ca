#![deny(clippy::all, clippy::pedantic)]

use std::fs;
use std::path::{Path, PathBuf};

use deptportal::transport::FileUpload;

use crate::context::CliError;

pub fn read_value(val: Option<String>, file: Option<PathBuf>) -> Result<String, CliError> {
    if let Some(path) = file {
        read_text(&path)
    } else if let Some(v) = val {
        Ok(v)
    } else {
        Err(CliError::InvalidInput("value required".into()))
    }
}

pub fn read_secret(file: Option<PathBuf>, env: Option<String>) -> Result<String, CliError> {
    match (file, env) {
        (Some(path), _) => Ok(read_text(&path)?.trim().to_string()),
        (None, Some(value)) => Ok(value),
        (None, None) => Err(CliError::InvalidInput(
            "password is required (use --password-file or DEPTPORTAL_PASSWORD)".into(),
        )),
    }
}

pub fn read_upload(path: &Path) -> Result<FileUpload, CliError> {
    let bytes = fs::read(path).map_err(|source| input_error(path, source))?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("upload.bin")
        .to_string();
    let upload = FileUpload::new(file_name, bytes);
    Ok(match mime_guess::from_path(path).first() {
        Some(mime) => upload.with_content_type(mime.essence_str()),
        None => upload,
    })
}

pub fn read_upload_opt(path: Option<&Path>) -> Result<Option<FileUpload>, CliError> {
    path.map(read_upload).transpose()
}

fn read_text(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| input_error(path, source))
}

fn input_error(path: &Path, source: std::io::Error) -> CliError {
    CliError::InputFile {
        path: path.display().to_string(),
        source,
    }
}
