use sqlx::PgPool;
use tracing::{info, warn};

use crate::auth::dto::{AuthResponse, PublicUser, QrAuthResponse, RegisterRequest};
use crate::auth::jwt::JwtKeys;
use crate::auth::password::{hash_password, verify_password};
use crate::error::ApiError;
use crate::members::store::MemberStore;
use crate::users::repo::{is_unique_violation, Role, User};

/// Look up a user by email and check the password against the stored hash.
/// Returns `None` both for an unknown email and a wrong password.
pub async fn validate(db: &PgPool, email: &str, password: &str) -> anyhow::Result<Option<User>> {
    let Some(user) = User::find_by_email(db, email).await? else {
        return Ok(None);
    };
    if verify_password(password, &user.password_hash)? {
        Ok(Some(user))
    } else {
        Ok(None)
    }
}

/// Sign an access token for the user and pair it with the sanitized
/// projection. Stateless: nothing is stored server-side.
pub fn issue_token(keys: &JwtKeys, user: &User) -> anyhow::Result<AuthResponse> {
    let access_token = keys.sign(user.id, &user.email, user.role)?;
    Ok(AuthResponse {
        access_token,
        user: PublicUser::from(user),
    })
}

/// Create an account and log it in. The pre-insert existence check can race
/// with a concurrent registration; the unique constraint on `email` settles
/// it, and a unique violation surfaces as the same conflict.
pub async fn register(
    db: &PgPool,
    keys: &JwtKeys,
    req: &RegisterRequest,
) -> Result<AuthResponse, ApiError> {
    if User::find_by_email(db, &req.email)
        .await
        .map_err(ApiError::Internal)?
        .is_some()
    {
        warn!(email = %req.email, "email already registered");
        return Err(ApiError::conflict("Email already registered"));
    }

    let hash = hash_password(&req.password).map_err(ApiError::Internal)?;

    let user = match User::create(db, &req.name, &req.email, &hash, req.role).await {
        Ok(user) => user,
        Err(e) if is_unique_violation(&e) => {
            warn!(email = %req.email, "email already registered (insert race)");
            return Err(ApiError::conflict("Email already registered"));
        }
        Err(e) => return Err(ApiError::Internal(e.into())),
    };

    info!(user_id = %user.id, email = %user.email, role = %user.role, "user registered");
    issue_token(keys, &user).map_err(ApiError::Internal)
}

/// Check a member in by QR code: stamp the attendance and issue a
/// CLIENT-role token for the member.
pub async fn check_in_qr(
    members: &dyn MemberStore,
    keys: &JwtKeys,
    qr_code: &str,
) -> Result<QrAuthResponse, ApiError> {
    let Some(member) = members
        .find_by_qr(qr_code)
        .await
        .map_err(ApiError::Internal)?
    else {
        warn!("qr check-in with unknown code");
        return Err(ApiError::unauthorized("Invalid QR code"));
    };

    members
        .touch_attendance(member.id)
        .await
        .map_err(ApiError::Internal)?;

    let access_token = keys
        .sign(member.id, &member.email, Role::Client)
        .map_err(ApiError::Internal)?;

    info!(member_id = %member.id, "member checked in");
    Ok(QrAuthResponse {
        access_token,
        member_id: member.id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;
    use axum::extract::FromRef;
    use axum::http::StatusCode;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn sample_user(role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Ana".into(),
            email: "ana@x.com".into(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$abc$def".into(),
            role,
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    #[tokio::test]
    async fn issue_token_signs_the_user_identity() {
        let state = AppState::fake();
        let keys = JwtKeys::from_ref(&state);
        let user = sample_user(Role::Admin);

        let response = issue_token(&keys, &user).expect("issue token");
        assert_eq!(response.user.id, user.id);
        assert_eq!(response.user.email, "ana@x.com");

        let claims = keys.verify(&response.access_token).expect("verify");
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.role, Role::Admin);
    }

    #[tokio::test]
    async fn auth_response_never_serializes_a_password() {
        let state = AppState::fake();
        let keys = JwtKeys::from_ref(&state);
        let response = issue_token(&keys, &sample_user(Role::Client)).unwrap();
        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("argon2"));
    }

    #[tokio::test]
    async fn qr_check_in_issues_client_token_and_stamps_attendance() {
        let state = AppState::fake();
        let keys = JwtKeys::from_ref(&state);

        let response = check_in_qr(state.members.as_ref(), &keys, "member_1")
            .await
            .expect("seeded code checks in");

        let claims = keys.verify(&response.access_token).unwrap();
        assert_eq!(claims.sub, response.member_id);
        assert_eq!(claims.role, Role::Client);

        let member = state
            .members
            .get(response.member_id)
            .await
            .unwrap()
            .expect("member exists");
        assert!(member.last_attendance.is_some());
        // Seeded attendance is from 2023; the stamp must be fresh.
        assert!(member.last_attendance.unwrap().year() >= 2024);
    }

    #[tokio::test]
    async fn qr_check_in_rejects_unknown_code() {
        let state = AppState::fake();
        let keys = JwtKeys::from_ref(&state);
        let err = check_in_qr(state.members.as_ref(), &keys, "no-such-code")
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }
}
