//! Authentication: login, registration, verification, password reset and the
//! current user's profile.

use deptportal_api_types::NoArgs;
use deptportal_api_types::auth::{
    ForgotPasswordRequest, LoginRequest, LoginResponse, RegisterRequest, ResetPasswordRequest,
    UserProfile, VerifyEmailRequest,
};
use serde_json::Value;

use crate::cache::TagType;
use crate::endpoint::{MutationEndpoint, QueryEndpoint, RegistryBuilder, TagSpec};
use crate::transport::{ApiError, ApiRequest};

/// Profile of the signed-in user. Refetched whenever `Auth` is invalidated.
pub const GET_ME: QueryEndpoint<NoArgs, UserProfile> =
    QueryEndpoint::new("getMe", me, TagSpec::Types(&[TagType::Auth]));

/// Exchanges credentials for a token. The client stores the token before
/// invalidating `Auth`, so the mutation itself invalidates nothing.
pub const LOGIN: MutationEndpoint<LoginRequest, LoginResponse> =
    MutationEndpoint::new("login", login, TagSpec::None);

pub const REGISTER: MutationEndpoint<RegisterRequest, Value> =
    MutationEndpoint::new("register", register, TagSpec::None);

pub const VERIFY_EMAIL: MutationEndpoint<VerifyEmailRequest, Value> =
    MutationEndpoint::new("verifyEmail", verify_email, TagSpec::Types(&[TagType::Auth]));

pub const FORGOT_PASSWORD: MutationEndpoint<ForgotPasswordRequest, Value> =
    MutationEndpoint::new("forgotPassword", forgot_password, TagSpec::None);

pub const RESET_PASSWORD: MutationEndpoint<ResetPasswordRequest, Value> =
    MutationEndpoint::new("resetPassword", reset_password, TagSpec::None);

/// Server-side logout. The client clears the session and resets the cache
/// whatever the outcome.
pub const LOGOUT: MutationEndpoint<NoArgs, Value> =
    MutationEndpoint::new("logout", logout, TagSpec::None);

pub(crate) fn declare(registry: &mut RegistryBuilder) {
    registry.declare(GET_ME.definition());
    registry.declare(LOGIN.definition());
    registry.declare(REGISTER.definition());
    registry.declare(VERIFY_EMAIL.definition());
    registry.declare(FORGOT_PASSWORD.definition());
    registry.declare(RESET_PASSWORD.definition());
    registry.declare(LOGOUT.definition());
}

fn me(_: &NoArgs) -> Result<ApiRequest, ApiError> {
    Ok(ApiRequest::get("auth/me"))
}

fn login(args: &LoginRequest) -> Result<ApiRequest, ApiError> {
    ApiRequest::post("auth/login").json(args)
}

fn register(args: &RegisterRequest) -> Result<ApiRequest, ApiError> {
    ApiRequest::post("auth/register").json(args)
}

fn verify_email(args: &VerifyEmailRequest) -> Result<ApiRequest, ApiError> {
    ApiRequest::post("auth/verify-email").json(args)
}

fn forgot_password(args: &ForgotPasswordRequest) -> Result<ApiRequest, ApiError> {
    ApiRequest::post("auth/forgot-password").json(args)
}

fn reset_password(args: &ResetPasswordRequest) -> Result<ApiRequest, ApiError> {
    ApiRequest::post("auth/reset-password").json(args)
}

fn logout(_: &NoArgs) -> Result<ApiRequest, ApiError> {
    Ok(ApiRequest::post("auth/logout"))
}
