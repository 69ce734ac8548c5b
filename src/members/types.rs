use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::auth::dto::is_valid_email;
use crate::error::FieldError;

/// Display-oriented member role. Distinct from the account [`Role`] enum:
/// members are dashboard records, not login accounts.
///
/// [`Role`]: crate::users::repo::Role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Client,
    Trainer,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    Active,
    Inactive,
    Pending,
    Suspended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipPlan {
    Basic,
    Premium,
    Elite,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub name: String,
    pub phone: String,
    pub relationship: String,
}

/// Member record held by the member directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    /// National document id, 8 to 10 digits.
    pub document_id: String,
    pub email: String,
    pub phone: String,
    pub birth_date: Date,
    pub registration_date: Date,
    pub role: MemberRole,
    pub status: MemberStatus,
    pub membership_plan: MembershipPlan,
    /// Opaque check-in credential encoded into the member's QR code.
    pub qr_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_attendance: Option<OffsetDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_payment_date: Option<Date>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_contact: Option<EmergencyContact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
}

/// Member form data: everything the caller provides when registering or
/// updating a member. Id, registration date and QR code are store-assigned.
#[derive(Debug, Clone, Deserialize)]
pub struct MemberDraft {
    pub first_name: String,
    pub last_name: String,
    pub document_id: String,
    pub email: String,
    pub phone: String,
    pub birth_date: Date,
    pub role: MemberRole,
    pub status: MemberStatus,
    pub membership_plan: MembershipPlan,
    #[serde(default)]
    pub next_payment_date: Option<Date>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub emergency_contact: Option<EmergencyContact>,
    #[serde(default)]
    pub profile_picture: Option<String>,
}

impl MemberDraft {
    pub fn validate(&mut self) -> Result<(), Vec<FieldError>> {
        lazy_static! {
            static ref DOCUMENT_RE: Regex = Regex::new(r"^\d{8,10}$").unwrap();
        }
        self.email = self.email.trim().to_lowercase();

        let mut errors = Vec::new();
        if self.first_name.trim().is_empty() {
            errors.push(FieldError::new("first_name", "First name is required"));
        }
        if self.last_name.trim().is_empty() {
            errors.push(FieldError::new("last_name", "Last name is required"));
        }
        if !DOCUMENT_RE.is_match(&self.document_id) {
            errors.push(FieldError::new(
                "document_id",
                "Document ID must be 8 to 10 digits",
            ));
        }
        if !is_valid_email(&self.email) {
            errors.push(FieldError::new("email", "Email is not valid"));
        }
        if self.phone.trim().is_empty() {
            errors.push(FieldError::new("phone", "Phone is required"));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberSortField {
    FirstName,
    LastName,
    DocumentId,
    RegistrationDate,
    LastAttendance,
    NextPaymentDate,
    Status,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Listing options: substring search, per-field filters, sorting and
/// pagination. Pagination applies only when `page_size` is given.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemberQuery {
    pub search: Option<String>,
    pub role: Option<MemberRole>,
    pub status: Option<MemberStatus>,
    pub membership_plan: Option<MembershipPlan>,
    pub sort_by: Option<MemberSortField>,
    #[serde(default)]
    pub order: SortOrder,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

/// One page of members plus the total count before pagination.
#[derive(Debug, Serialize)]
pub struct MemberPage {
    pub members: Vec<Member>,
    pub total: usize,
}

/// Response returned when a member is registered.
#[derive(Debug, Serialize)]
pub struct RegisteredMember {
    pub member_id: Uuid,
    pub qr_code: String,
}

/// Response returned when a member's QR code is regenerated.
#[derive(Debug, Serialize)]
pub struct QrCode {
    pub qr_code: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn draft() -> MemberDraft {
        MemberDraft {
            first_name: "Juan".into(),
            last_name: "Pérez".into(),
            document_id: "12345678".into(),
            email: "juan.perez@example.com".into(),
            phone: "04121234567".into(),
            birth_date: date!(1990 - 05 - 15),
            role: MemberRole::Client,
            status: MemberStatus::Active,
            membership_plan: MembershipPlan::Premium,
            next_payment_date: None,
            address: None,
            emergency_contact: None,
            profile_picture: None,
        }
    }

    #[test]
    fn valid_draft_passes() {
        assert!(draft().validate().is_ok());
    }

    #[test]
    fn document_id_must_be_8_to_10_digits() {
        for bad in ["1234567", "12345678901", "12ab5678"] {
            let mut d = draft();
            d.document_id = bad.into();
            let errors = d.validate().unwrap_err();
            assert_eq!(errors[0].field, "document_id", "case: {bad}");
        }
        let mut d = draft();
        d.document_id = "1234567890".into();
        assert!(d.validate().is_ok());
    }

    #[test]
    fn enums_use_lowercase_wire_names() {
        assert_eq!(
            serde_json::to_string(&MemberStatus::Suspended).unwrap(),
            "\"suspended\""
        );
        assert_eq!(
            serde_json::to_string(&MembershipPlan::Elite).unwrap(),
            "\"elite\""
        );
        let role: MemberRole = serde_json::from_str("\"trainer\"").unwrap();
        assert_eq!(role, MemberRole::Trainer);
    }

    #[test]
    fn optional_member_fields_are_omitted_when_absent() {
        let member = Member {
            id: Uuid::new_v4(),
            first_name: "Juan".into(),
            last_name: "Pérez".into(),
            document_id: "12345678".into(),
            email: "juan.perez@example.com".into(),
            phone: "04121234567".into(),
            birth_date: date!(1990 - 05 - 15),
            registration_date: date!(2023 - 01 - 10),
            role: MemberRole::Client,
            status: MemberStatus::Active,
            membership_plan: MembershipPlan::Premium,
            qr_code: "member_1".into(),
            last_attendance: None,
            next_payment_date: None,
            address: None,
            emergency_contact: None,
            profile_picture: None,
        };
        let json = serde_json::to_string(&member).unwrap();
        assert!(!json.contains("last_attendance"));
        assert!(!json.contains("address"));
    }
}
