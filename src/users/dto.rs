use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::dto::is_valid_email;
use crate::error::FieldError;
use crate::users::repo::{Role, User};

/// Request body for creating a user through the directory endpoints.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl CreateUserRequest {
    /// Normalizes the email, then checks field contents.
    pub fn validate(&mut self) -> Result<(), Vec<FieldError>> {
        self.email = self.email.trim().to_lowercase();

        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push(FieldError::new("name", "Name is required"));
        }
        if !is_valid_email(&self.email) {
            errors.push(FieldError::new("email", "Email is not valid"));
        }
        if self.password.len() < 8 {
            errors.push(FieldError::new(
                "password",
                "Password must be at least 8 characters",
            ));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Partial update body. Absent and `null` fields both mean "keep the stored
/// value".
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

impl UpdateUserRequest {
    pub fn validate(&mut self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                errors.push(FieldError::new("name", "Name is required"));
            }
        }
        if let Some(email) = &mut self.email {
            *email = email.trim().to_lowercase();
            if !is_valid_email(email) {
                errors.push(FieldError::new("email", "Email is not valid"));
            }
        }
        if let Some(password) = &self.password {
            if password.len() < 8 {
                errors.push(FieldError::new(
                    "password",
                    "Password must be at least 8 characters",
                ));
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// User projection returned by the directory endpoints.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_collects_every_bad_field() {
        let mut req = CreateUserRequest {
            name: "  ".into(),
            email: "not-an-email".into(),
            password: "short".into(),
            role: Role::Client,
        };
        let errors = req.validate().unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["name", "email", "password"]);
    }

    #[test]
    fn create_request_normalizes_email() {
        let mut req = CreateUserRequest {
            name: "Ana".into(),
            email: "  Ana@X.Com ".into(),
            password: "12345678".into(),
            role: Role::Client,
        };
        assert!(req.validate().is_ok());
        assert_eq!(req.email, "ana@x.com");
    }

    #[test]
    fn empty_patch_validates_and_stays_empty() {
        let mut req: UpdateUserRequest = serde_json::from_str("{}").unwrap();
        assert!(req.validate().is_ok());
        assert!(req.name.is_none() && req.email.is_none());
        assert!(req.password.is_none() && req.role.is_none());
    }

    #[test]
    fn null_and_absent_patch_fields_are_equivalent() {
        let mut with_null: UpdateUserRequest =
            serde_json::from_str(r#"{"name": null, "role": "ADMIN"}"#).unwrap();
        assert!(with_null.validate().is_ok());
        assert!(with_null.name.is_none());
        assert_eq!(with_null.role, Some(Role::Admin));
    }

    #[test]
    fn patch_rejects_present_but_invalid_fields() {
        let mut req: UpdateUserRequest =
            serde_json::from_str(r#"{"email": "nope", "password": "123"}"#).unwrap();
        let errors = req.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
    }
}
