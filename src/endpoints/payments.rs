//! Fee payments made by the signed-in user.

use deptportal_api_types::NoArgs;
use deptportal_api_types::finance::{InitiatePaymentRequest, InitiatePaymentResponse, Payment};

use crate::cache::{Tag, TagType};
use crate::endpoint::{MutationEndpoint, QueryEndpoint, RegistryBuilder, TagSpec};
use crate::transport::{ApiError, ApiRequest};

use super::list_tags;

pub const GET_PAYMENT_HISTORY: QueryEndpoint<NoArgs, Vec<Payment>> =
    QueryEndpoint::new("getPaymentHistory", history, TagSpec::Compute(history_tags));

/// Starts a checkout; the returned URL is opened by the caller.
pub const INITIATE_PAYMENT: MutationEndpoint<InitiatePaymentRequest, InitiatePaymentResponse> =
    MutationEndpoint::new(
        "initiatePayment",
        initiate_payment,
        TagSpec::Types(&[TagType::Payment]),
    );

pub(crate) fn declare(registry: &mut RegistryBuilder) {
    registry.declare(GET_PAYMENT_HISTORY.definition());
    registry.declare(INITIATE_PAYMENT.definition());
}

fn history(_: &NoArgs) -> Result<ApiRequest, ApiError> {
    Ok(ApiRequest::get("payments/history"))
}

fn history_tags(_: &NoArgs, payments: Option<&Vec<Payment>>) -> Vec<Tag> {
    list_tags(TagType::Payment, payments, |payment| payment.id.as_str())
}

fn initiate_payment(args: &InitiatePaymentRequest) -> Result<ApiRequest, ApiError> {
    if args.amount <= 0 {
        return Err(ApiError::request("amount must be positive"));
    }
    ApiRequest::post("payments/initiate").json(args)
}
