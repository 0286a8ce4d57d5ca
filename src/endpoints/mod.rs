//! Endpoint catalog of the portal API, one module per feature.
//!
//! Every module exposes its queries and mutations as constants plus a
//! `declare` function; [`registry`] assembles all of them once at startup.

pub mod academics;
pub mod alumni;
pub mod applications;
pub mod auth;
pub mod blogs;
pub mod content;
pub mod email_logs;
pub mod events;
pub mod finance;
pub mod important_data;
pub mod messenger;
pub mod payments;
pub mod societies;
pub mod users;
pub mod work_assignments;

use crate::cache::{Tag, TagType};
use crate::endpoint::{EndpointRegistry, RegistryBuilder};
use crate::transport::ApiError;

/// Build the registry holding every endpoint the client knows about.
pub fn registry() -> EndpointRegistry {
    let mut builder = RegistryBuilder::new();
    declare_all(&mut builder);
    builder.build()
}

/// Add every feature module's declarations to `builder`.
pub fn declare_all(builder: &mut RegistryBuilder) {
    auth::declare(builder);
    content::declare(builder);
    events::declare(builder);
    blogs::declare(builder);
    societies::declare(builder);
    alumni::declare(builder);
    users::declare(builder);
    finance::declare(builder);
    payments::declare(builder);
    applications::declare(builder);
    work_assignments::declare(builder);
    academics::declare(builder);
    important_data::declare(builder);
    messenger::declare(builder);
    // Lives outside the dashboard modules and replaces any earlier declaration.
    email_logs::declare(builder);
}

/// Validate an id used as a single path segment.
pub(crate) fn segment(id: &str) -> Result<&str, ApiError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ApiError::request("id must not be empty"));
    }
    if id.contains(['/', '?', '#']) || id.chars().all(|c| c == '.') {
        return Err(ApiError::request(format!(
            "id `{id}` is not a valid path segment"
        )));
    }
    Ok(id)
}

/// Type tag plus one id tag per listed item.
pub(crate) fn list_tags<T>(
    tag_type: TagType,
    items: Option<&Vec<T>>,
    id: impl Fn(&T) -> &str,
) -> Vec<Tag> {
    let mut tags = vec![Tag::of(tag_type)];
    if let Some(items) = items {
        tags.extend(items.iter().map(|item| Tag::id(tag_type, id(item))));
    }
    tags
}
