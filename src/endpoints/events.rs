//! Department events and registrations.

use deptportal_api_types::content::Event;
use deptportal_api_types::{IdArg, ListQuery};
use serde_json::Value;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::cache::{Tag, TagType};
use crate::endpoint::{MutationEndpoint, QueryEndpoint, RegistryBuilder, TagSpec};
use crate::transport::{ApiError, ApiRequest, FileUpload, MultipartBody};

use super::{list_tags, segment};

pub const GET_EVENTS: QueryEndpoint<ListQuery, Vec<Event>> =
    QueryEndpoint::new("getEvents", events, TagSpec::Compute(event_list_tags));

pub const GET_EVENT: QueryEndpoint<IdArg, Event> =
    QueryEndpoint::new("getEvent", event, TagSpec::Compute(event_tags));

pub const CREATE_EVENT: MutationEndpoint<CreateEvent, Event> =
    MutationEndpoint::new("createEvent", create_event, TagSpec::Types(&[TagType::Event]));

pub const REGISTER_FOR_EVENT: MutationEndpoint<IdArg, Value> = MutationEndpoint::new(
    "registerForEvent",
    register_for_event,
    TagSpec::Compute(touched_event),
);

pub const DELETE_EVENT: MutationEndpoint<IdArg, Value> =
    MutationEndpoint::new("deleteEvent", delete_event, TagSpec::Compute(touched_event));

/// Multipart payload for a new event.
#[derive(Debug, Clone)]
pub struct CreateEvent {
    pub title: String,
    pub description: String,
    pub venue: Option<String>,
    pub starts_at: OffsetDateTime,
    pub ends_at: Option<OffsetDateTime>,
    pub banner: Option<FileUpload>,
}

pub(crate) fn declare(registry: &mut RegistryBuilder) {
    registry.declare(GET_EVENTS.definition());
    registry.declare(GET_EVENT.definition());
    registry.declare(CREATE_EVENT.definition());
    registry.declare(REGISTER_FOR_EVENT.definition());
    registry.declare(DELETE_EVENT.definition());
}

fn events(args: &ListQuery) -> Result<ApiRequest, ApiError> {
    ApiRequest::get("events").query(args)
}

fn event_list_tags(_: &ListQuery, events: Option<&Vec<Event>>) -> Vec<Tag> {
    list_tags(TagType::Event, events, |event| event.id.as_str())
}

fn event(args: &IdArg) -> Result<ApiRequest, ApiError> {
    Ok(ApiRequest::get(format!("events/{}", segment(&args.id)?)))
}

fn event_tags(args: &IdArg, _: Option<&Event>) -> Vec<Tag> {
    vec![Tag::id(TagType::Event, args.id.clone())]
}

fn create_event(args: &CreateEvent) -> Result<ApiRequest, ApiError> {
    let body = MultipartBody::new()
        .text("title", args.title.clone())
        .text("description", args.description.clone())
        .text_opt("venue", args.venue.clone())
        .text("startsAt", rfc3339(args.starts_at)?)
        .text_opt("endsAt", args.ends_at.map(rfc3339).transpose()?)
        .file_opt("banner", args.banner.clone());
    Ok(ApiRequest::post("events").multipart(body))
}

fn register_for_event(args: &IdArg) -> Result<ApiRequest, ApiError> {
    Ok(ApiRequest::post(format!(
        "events/{}/register",
        segment(&args.id)?
    )))
}

fn delete_event(args: &IdArg) -> Result<ApiRequest, ApiError> {
    Ok(ApiRequest::delete(format!("events/{}", segment(&args.id)?)))
}

fn touched_event(args: &IdArg, _: Option<&Value>) -> Vec<Tag> {
    vec![Tag::id(TagType::Event, args.id.clone())]
}

fn rfc3339(value: OffsetDateTime) -> Result<String, ApiError> {
    value
        .format(&Rfc3339)
        .map_err(|e| ApiError::request(format!("invalid timestamp: {e}")))
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;
    use crate::transport::{FieldValue, RequestBody};

    #[test]
    fn event_form_carries_rfc3339_times() {
        let request = CREATE_EVENT
            .request(&CreateEvent {
                title: "Hackathon".to_string(),
                description: "24h".to_string(),
                venue: None,
                starts_at: datetime!(2024-05-01 10:00 UTC),
                ends_at: None,
                banner: None,
            })
            .expect("request");
        let RequestBody::Multipart(body) = request.body else {
            panic!("multipart expected");
        };
        assert_eq!(
            body.field("startsAt"),
            Some(&FieldValue::Text("2024-05-01T10:00:00Z".to_string()))
        );
        assert!(body.field("endsAt").is_none());
        assert!(body.field("venue").is_none());
    }

    #[test]
    fn registration_reaches_the_event_and_its_lists() {
        let tags = REGISTER_FOR_EVENT.invalidated_tags(&IdArg::new("e1"), &Value::Null);
        let detail = GET_EVENT.provided_tags(&IdArg::new("e1"), None);
        assert!(tags[0].invalidates(&detail[0]));
    }
}
