use serde::{Deserialize, Serialize};
use validator::Validate;

use pp_core::domain::entities::UserProfile;
use pp_core::domain::value_objects::{LoginCompleted, RegistrationCompleted};

use super::validate_mobile;

/// Body of `POST /api/auth/complete-registration`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CompleteRegistrationRequest {
    #[validate(custom = "validate_mobile")]
    pub mobile: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompleteRegistrationResponse {
    pub token: String,
    pub user: UserProfile,
}

impl From<RegistrationCompleted> for CompleteRegistrationResponse {
    fn from(completed: RegistrationCompleted) -> Self {
        Self {
            token: completed.token,
            user: completed.user,
        }
    }
}

/// Body of `POST /api/auth/login`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PasswordLoginRequest {
    #[validate(custom = "validate_mobile")]
    pub mobile: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

impl From<LoginCompleted> for LoginResponse {
    fn from(login: LoginCompleted) -> Self {
        Self {
            token: login.token,
            user: login.user,
        }
    }
}

/// Body of `GET /api/auth/me`
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUserResponse {
    pub user: UserProfile,
}
