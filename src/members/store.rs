use std::cmp::Ordering;

use axum::async_trait;
use rand::{distributions::Alphanumeric, Rng};
use time::macros::{date, datetime};
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::members::types::{
    Member, MemberDraft, MemberPage, MemberQuery, MemberRole, MemberSortField, MemberStatus,
    MembershipPlan, SortOrder,
};

#[async_trait]
pub trait MemberStore: Send + Sync {
    async fn list(&self, query: &MemberQuery) -> anyhow::Result<MemberPage>;
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Member>>;
    async fn create(&self, draft: MemberDraft) -> anyhow::Result<Member>;
    async fn update(&self, id: Uuid, draft: MemberDraft) -> anyhow::Result<Option<Member>>;
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
    async fn regenerate_qr(&self, id: Uuid) -> anyhow::Result<Option<String>>;
    async fn find_by_qr(&self, qr_code: &str) -> anyhow::Result<Option<Member>>;
    async fn touch_attendance(&self, id: Uuid) -> anyhow::Result<Option<OffsetDateTime>>;
}

/// Member directory backed by process memory. Seeded with demo members so
/// the dashboard has data to show without any provisioning step.
pub struct InMemoryMembers {
    inner: RwLock<Vec<Member>>,
}

fn new_qr_code() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(12)
        .map(char::from)
        .collect();
    format!("member_{suffix}")
}

impl InMemoryMembers {
    pub fn empty() -> Self {
        Self {
            inner: RwLock::new(Vec::new()),
        }
    }

    pub fn seeded() -> Self {
        Self {
            inner: RwLock::new(seed_members()),
        }
    }
}

fn matches(member: &Member, query: &MemberQuery) -> bool {
    if let Some(search) = &query.search {
        let needle = search.to_lowercase();
        let hit = member.first_name.to_lowercase().contains(&needle)
            || member.last_name.to_lowercase().contains(&needle)
            || member.document_id.contains(search.as_str())
            || member.email.to_lowercase().contains(&needle);
        if !hit {
            return false;
        }
    }
    if let Some(role) = query.role {
        if member.role != role {
            return false;
        }
    }
    if let Some(status) = query.status {
        if member.status != status {
            return false;
        }
    }
    if let Some(plan) = query.membership_plan {
        if member.membership_plan != plan {
            return false;
        }
    }
    true
}

fn compare(a: &Member, b: &Member, field: MemberSortField) -> Ordering {
    match field {
        MemberSortField::FirstName => a
            .first_name
            .to_lowercase()
            .cmp(&b.first_name.to_lowercase()),
        MemberSortField::LastName => a.last_name.to_lowercase().cmp(&b.last_name.to_lowercase()),
        MemberSortField::DocumentId => a.document_id.cmp(&b.document_id),
        MemberSortField::RegistrationDate => a.registration_date.cmp(&b.registration_date),
        MemberSortField::LastAttendance => a.last_attendance.cmp(&b.last_attendance),
        MemberSortField::NextPaymentDate => a.next_payment_date.cmp(&b.next_payment_date),
        MemberSortField::Status => a.status.cmp(&b.status),
    }
}

#[async_trait]
impl MemberStore for InMemoryMembers {
    async fn list(&self, query: &MemberQuery) -> anyhow::Result<MemberPage> {
        let members = self.inner.read().await;
        let mut filtered: Vec<Member> = members
            .iter()
            .filter(|m| matches(m, query))
            .cloned()
            .collect();

        if let Some(field) = query.sort_by {
            filtered.sort_by(|a, b| {
                let ord = compare(a, b, field);
                match query.order {
                    SortOrder::Asc => ord,
                    SortOrder::Desc => ord.reverse(),
                }
            });
        }

        let total = filtered.len();
        if let Some(page_size) = query.page_size {
            let page = query.page.unwrap_or(1).max(1);
            filtered = filtered
                .into_iter()
                .skip((page - 1) * page_size)
                .take(page_size)
                .collect();
        }

        Ok(MemberPage {
            members: filtered,
            total,
        })
    }

    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Member>> {
        let members = self.inner.read().await;
        Ok(members.iter().find(|m| m.id == id).cloned())
    }

    async fn create(&self, draft: MemberDraft) -> anyhow::Result<Member> {
        let member = Member {
            id: Uuid::new_v4(),
            first_name: draft.first_name,
            last_name: draft.last_name,
            document_id: draft.document_id,
            email: draft.email,
            phone: draft.phone,
            birth_date: draft.birth_date,
            registration_date: OffsetDateTime::now_utc().date(),
            role: draft.role,
            status: draft.status,
            membership_plan: draft.membership_plan,
            qr_code: new_qr_code(),
            last_attendance: None,
            next_payment_date: draft.next_payment_date,
            address: draft.address,
            emergency_contact: draft.emergency_contact,
            profile_picture: draft.profile_picture,
        };
        self.inner.write().await.push(member.clone());
        Ok(member)
    }

    async fn update(&self, id: Uuid, draft: MemberDraft) -> anyhow::Result<Option<Member>> {
        let mut members = self.inner.write().await;
        let Some(member) = members.iter_mut().find(|m| m.id == id) else {
            return Ok(None);
        };
        // Id, registration date, QR code and attendance are store-owned.
        member.first_name = draft.first_name;
        member.last_name = draft.last_name;
        member.document_id = draft.document_id;
        member.email = draft.email;
        member.phone = draft.phone;
        member.birth_date = draft.birth_date;
        member.role = draft.role;
        member.status = draft.status;
        member.membership_plan = draft.membership_plan;
        member.next_payment_date = draft.next_payment_date;
        member.address = draft.address;
        member.emergency_contact = draft.emergency_contact;
        member.profile_picture = draft.profile_picture;
        Ok(Some(member.clone()))
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut members = self.inner.write().await;
        let before = members.len();
        members.retain(|m| m.id != id);
        Ok(members.len() < before)
    }

    async fn regenerate_qr(&self, id: Uuid) -> anyhow::Result<Option<String>> {
        let mut members = self.inner.write().await;
        let Some(member) = members.iter_mut().find(|m| m.id == id) else {
            return Ok(None);
        };
        member.qr_code = new_qr_code();
        Ok(Some(member.qr_code.clone()))
    }

    async fn find_by_qr(&self, qr_code: &str) -> anyhow::Result<Option<Member>> {
        let members = self.inner.read().await;
        Ok(members.iter().find(|m| m.qr_code == qr_code).cloned())
    }

    async fn touch_attendance(&self, id: Uuid) -> anyhow::Result<Option<OffsetDateTime>> {
        let mut members = self.inner.write().await;
        let Some(member) = members.iter_mut().find(|m| m.id == id) else {
            return Ok(None);
        };
        let now = OffsetDateTime::now_utc();
        member.last_attendance = Some(now);
        Ok(Some(now))
    }
}

fn seed_members() -> Vec<Member> {
    vec![
        Member {
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
            last_attendance: Some(datetime!(2023 - 03 - 14 08:30 UTC)),
            next_payment_date: Some(date!(2023 - 04 - 10)),
            address: None,
            emergency_contact: None,
            profile_picture: Some("https://randomuser.me/api/portraits/men/1.jpg".into()),
        },
        Member {
            id: Uuid::new_v4(),
            first_name: "María".into(),
            last_name: "González".into(),
            document_id: "87654321".into(),
            email: "maria.gonzalez@example.com".into(),
            phone: "04167654321".into(),
            birth_date: date!(1988 - 11 - 23),
            registration_date: date!(2023 - 02 - 05),
            role: MemberRole::Client,
            status: MemberStatus::Active,
            membership_plan: MembershipPlan::Basic,
            qr_code: "member_2".into(),
            last_attendance: Some(datetime!(2023 - 03 - 13 17:15 UTC)),
            next_payment_date: Some(date!(2023 - 04 - 05)),
            address: None,
            emergency_contact: None,
            profile_picture: Some("https://randomuser.me/api/portraits/women/2.jpg".into()),
        },
        Member {
            id: Uuid::new_v4(),
            first_name: "Carlos".into(),
            last_name: "Rodríguez".into(),
            document_id: "23456789".into(),
            email: "carlos.rodriguez@example.com".into(),
            phone: "04245678901".into(),
            birth_date: date!(1985 - 07 - 30),
            registration_date: date!(2022 - 11 - 15),
            role: MemberRole::Trainer,
            status: MemberStatus::Active,
            membership_plan: MembershipPlan::Elite,
            qr_code: "member_3".into(),
            last_attendance: Some(datetime!(2023 - 03 - 14 14:00 UTC)),
            next_payment_date: None,
            address: None,
            emergency_contact: None,
            profile_picture: Some("https://randomuser.me/api/portraits/men/3.jpg".into()),
        },
        Member {
            id: Uuid::new_v4(),
            first_name: "Ana".into(),
            last_name: "Martínez".into(),
            document_id: "34567890".into(),
            email: "ana.martinez@example.com".into(),
            phone: "04121234567".into(),
            birth_date: date!(1992 - 03 - 12),
            registration_date: date!(2023 - 01 - 20),
            role: MemberRole::Admin,
            status: MemberStatus::Active,
            membership_plan: MembershipPlan::Elite,
            qr_code: "member_4".into(),
            last_attendance: Some(datetime!(2023 - 03 - 14 09:45 UTC)),
            next_payment_date: None,
            address: None,
            emergency_contact: None,
            profile_picture: Some("https://randomuser.me/api/portraits/women/4.jpg".into()),
        },
        Member {
            id: Uuid::new_v4(),
            first_name: "Pedro".into(),
            last_name: "Sánchez".into(),
            document_id: "45678901".into(),
            email: "pedro.sanchez@example.com".into(),
            phone: "04168765432".into(),
            birth_date: date!(1995 - 09 - 08),
            registration_date: date!(2023 - 02 - 15),
            role: MemberRole::Client,
            status: MemberStatus::Inactive,
            membership_plan: MembershipPlan::Basic,
            qr_code: "member_5".into(),
            last_attendance: Some(datetime!(2023 - 02 - 28 16:30 UTC)),
            next_payment_date: Some(date!(2023 - 03 - 15)),
            address: None,
            emergency_contact: None,
            profile_picture: Some("https://randomuser.me/api/portraits/men/5.jpg".into()),
        },
    ]
}
