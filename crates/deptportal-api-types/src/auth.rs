//! Authentication and account payloads.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Student,
    Faculty,
    Alumni,
    Staff,
    Admin,
    SuperAdmin,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub is_verified: bool,
}

impl UserProfile {
    pub fn has_permission(&self, permission: &str) -> bool {
        matches!(self.role, Role::SuperAdmin) || self.permissions.iter().any(|p| p == permission)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roll_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyEmailRequest {
    pub email: String,
    pub otp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn super_admin_has_every_permission() {
        let user = UserProfile {
            id: "u1".into(),
            name: "Root".into(),
            email: "root@dept.edu".into(),
            role: Role::SuperAdmin,
            permissions: vec![],
            is_verified: true,
        };
        assert!(user.has_permission("finance:read"));
    }

    #[test]
    fn role_uses_screaming_case() {
        let json = serde_json::to_string(&Role::SuperAdmin).expect("json");
        assert_eq!(json, "\"SUPER_ADMIN\"");
    }
}
