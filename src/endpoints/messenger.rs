//! Broadcast messages to a portal audience.

use deptportal_api_types::records::{BroadcastReceipt, BroadcastRequest};

use crate::cache::{Tag, TagType};
use crate::endpoint::{MutationEndpoint, RegistryBuilder, TagSpec};
use crate::transport::{ApiError, ApiRequest};

/// Queue an email to the audience and optionally publish it as a notice.
pub const SEND_BROADCAST: MutationEndpoint<BroadcastRequest, BroadcastReceipt> =
    MutationEndpoint::new("sendBroadcast", send_broadcast, TagSpec::Compute(broadcast_tags));

pub(crate) fn declare(registry: &mut RegistryBuilder) {
    registry.declare(SEND_BROADCAST.definition());
}

fn send_broadcast(args: &BroadcastRequest) -> Result<ApiRequest, ApiError> {
    if args.subject.trim().is_empty() || args.message.trim().is_empty() {
        return Err(ApiError::request("subject and message are required"));
    }
    ApiRequest::post("messenger/broadcast").json(args)
}

fn broadcast_tags(args: &BroadcastRequest, receipt: Option<&BroadcastReceipt>) -> Vec<Tag> {
    let mut tags = vec![Tag::of(TagType::EmailLog)];
    let published = receipt.is_some_and(|receipt| receipt.notice_id.is_some());
    if args.post_as_notice || published {
        tags.push(Tag::of(TagType::Notice));
        tags.push(Tag::of(TagType::Homepage));
    }
    tags
}

#[cfg(test)]
mod tests {
    use deptportal_api_types::records::Audience;

    use super::*;

    fn request(post_as_notice: bool) -> BroadcastRequest {
        BroadcastRequest {
            subject: "Exam schedule".to_string(),
            message: "See attached".to_string(),
            audience: Audience::Students,
            post_as_notice,
        }
    }

    #[test]
    fn plain_broadcast_only_touches_email_logs() {
        let tags = SEND_BROADCAST.invalidated_tags(
            &request(false),
            &BroadcastReceipt {
                queued: 120,
                notice_id: None,
            },
        );
        assert_eq!(tags, vec![Tag::of(TagType::EmailLog)]);
    }

    #[test]
    fn notice_broadcast_refreshes_notices() {
        let tags = SEND_BROADCAST.invalidated_tags(
            &request(true),
            &BroadcastReceipt {
                queued: 120,
                notice_id: Some("n5".to_string()),
            },
        );
        assert!(tags.contains(&Tag::of(TagType::Notice)));
        assert!(tags.contains(&Tag::of(TagType::Homepage)));
    }

    #[test]
    fn blank_subject_is_rejected() {
        let mut args = request(false);
        args.subject = "  ".to_string();
        assert!(SEND_BROADCAST.request(&args).is_err());
    }
}
