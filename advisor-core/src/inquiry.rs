//! Inquiry board persisted as one JSON array under a single storage key.
//!
//! Every mutation reads the whole collection, changes it and writes it back. Concurrent
//! writers are not coordinated: the last write wins. Reads skip records that no longer
//! type-check; mutations refuse to run until the stored collection parses cleanly, so a
//! bad record never causes the rest to be overwritten.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{AdvisorError, Result};
use crate::profile::{AgeGroup, Category, Gender};
use crate::storage::KeyValueStore;

pub const INQUIRIES_KEY: &str = "inquiries";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InquiryStatus {
    Pending,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inquiry {
    pub id: Uuid,
    pub title: String,
    pub category: Category,
    pub author: String,
    pub contact: String,
    pub content: String,
    pub created_at: NaiveDate,
    pub status: InquiryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    pub age: AgeGroup,
    pub gender: Gender,
}

/// Fields an end user fills in to open an inquiry
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInquiry {
    pub title: String,
    pub category: Category,
    pub author: String,
    pub contact: String,
    pub content: String,
    pub age: AgeGroup,
    pub gender: Gender,
}

/// Shared-password check for the admin view. The password is compared in plain text.
#[derive(Debug, Clone)]
pub struct AdminGate {
    password: String,
}

impl AdminGate {
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: password.into(),
        }
    }

    pub fn verify(&self, input: &str) -> bool {
        input == self.password
    }
}

/// Admin authentication state of one client
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdminSession {
    authenticated: bool,
}

impl AdminSession {
    /// Attempts a login; a wrong password leaves the session unchanged.
    pub fn login(&mut self, gate: &AdminGate, input: &str) -> bool {
        if gate.verify(input) {
            self.authenticated = true;
        } else {
            warn!("Admin login rejected");
        }
        self.authenticated
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    fn require(&self) -> Result<()> {
        if self.authenticated {
            Ok(())
        } else {
            Err(AdvisorError::Unauthorized)
        }
    }
}

#[derive(Clone)]
pub struct InquiryBoard {
    store: Arc<dyn KeyValueStore>,
}

impl InquiryBoard {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// All inquiries, newest first
    pub async fn list(&self) -> Result<Vec<Inquiry>> {
        self.load_readable().await
    }

    pub async fn get(&self, id: Uuid) -> Result<Inquiry> {
        self.load_readable()
            .await?
            .into_iter()
            .find(|i| i.id == id)
            .ok_or(AdvisorError::InquiryNotFound(id))
    }

    /// Opens a new pending inquiry
    pub async fn submit(&self, new: NewInquiry) -> Result<Inquiry> {
        for (field, value) in [
            ("title", &new.title),
            ("author", &new.author),
            ("contact", &new.contact),
            ("content", &new.content),
        ] {
            if value.trim().is_empty() {
                return Err(AdvisorError::InvalidInput(format!("{field} must not be empty")));
            }
        }

        let inquiry = Inquiry {
            id: Uuid::new_v4(),
            title: new.title.trim().to_string(),
            category: new.category,
            author: new.author.trim().to_string(),
            contact: new.contact.trim().to_string(),
            content: new.content,
            created_at: Utc::now().date_naive(),
            status: InquiryStatus::Pending,
            answer: None,
            age: new.age,
            gender: new.gender,
        };

        let mut all = self.load().await?;
        all.insert(0, inquiry.clone());
        self.save(&all).await?;

        info!(inquiry_id = %inquiry.id, category = %inquiry.category, "Inquiry submitted");
        Ok(inquiry)
    }

    /// Records the admin answer and marks the inquiry completed
    pub async fn answer(&self, session: &AdminSession, id: Uuid, text: &str) -> Result<Inquiry> {
        session.require()?;
        if text.trim().is_empty() {
            return Err(AdvisorError::InvalidInput("answer must not be empty".to_string()));
        }

        let mut all = self.load().await?;
        let inquiry = all
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(AdvisorError::InquiryNotFound(id))?;
        if inquiry.status == InquiryStatus::Completed {
            return Err(AdvisorError::AlreadyCompleted(id));
        }

        inquiry.answer = Some(text.to_string());
        inquiry.status = InquiryStatus::Completed;
        let updated = inquiry.clone();
        self.save(&all).await?;

        info!(inquiry_id = %id, "Inquiry answered");
        Ok(updated)
    }

    /// Removes an inquiry once the admin has confirmed the deletion
    pub async fn delete(&self, session: &AdminSession, id: Uuid, confirmed: bool) -> Result<()> {
        session.require()?;
        if !confirmed {
            return Err(AdvisorError::DeleteNotConfirmed(id));
        }

        let mut all = self.load().await?;
        let before = all.len();
        all.retain(|i| i.id != id);
        if all.len() == before {
            return Err(AdvisorError::InquiryNotFound(id));
        }
        self.save(&all).await?;

        info!(inquiry_id = %id, "Inquiry deleted");
        Ok(())
    }

    /// Full collection for a read-modify-write cycle
    async fn load(&self) -> Result<Vec<Inquiry>> {
        match self.store.get(INQUIRIES_KEY).await? {
            None => Ok(Vec::new()),
            Some(raw) => serde_json::from_str(&raw).map_err(|e| {
                warn!(error = %e, "Stored inquiry collection is malformed, refusing to write");
                AdvisorError::StorageError(format!("inquiry collection is malformed: {e}"))
            }),
        }
    }

    /// Collection for display; records that fail to parse are skipped
    async fn load_readable(&self) -> Result<Vec<Inquiry>> {
        let Some(raw) = self.store.get(INQUIRIES_KEY).await? else {
            return Ok(Vec::new());
        };
        let records: Vec<serde_json::Value> = serde_json::from_str(&raw).map_err(|e| {
            AdvisorError::StorageError(format!("inquiry collection is malformed: {e}"))
        })?;

        Ok(records
            .into_iter()
            .filter_map(|record| match serde_json::from_value::<Inquiry>(record) {
                Ok(inquiry) => Some(inquiry),
                Err(e) => {
                    warn!(error = %e, "Skipping malformed inquiry record");
                    None
                }
            })
            .collect())
    }

    async fn save(&self, all: &[Inquiry]) -> Result<()> {
        let raw = serde_json::to_string(all)?;
        self.store.set(INQUIRIES_KEY, raw).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStore;

    fn board() -> (InquiryBoard, InMemoryStore) {
        let store = InMemoryStore::new();
        (InquiryBoard::new(Arc::new(store.clone())), store)
    }

    fn new_inquiry(title: &str) -> NewInquiry {
        NewInquiry {
            title: title.to_string(),
            category: Category::Health,
            author: "홍길동".to_string(),
            contact: "010-1234-5678".to_string(),
            content: "보험료가 궁금합니다".to_string(),
            age: AgeGroup::try_from(30).unwrap(),
            gender: Gender::Female,
        }
    }

    fn admin() -> AdminSession {
        let mut session = AdminSession::default();
        assert!(session.login(&AdminGate::new("secret"), "secret"));
        session
    }

    #[test]
    fn only_the_exact_password_authenticates() {
        let gate = AdminGate::new("secret");
        let mut session = AdminSession::default();
        assert!(!session.login(&gate, "Secret"));
        assert!(!session.login(&gate, "secret "));
        assert!(!session.login(&gate, ""));
        assert!(!session.is_authenticated());
        assert!(session.login(&gate, "secret"));
        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn answering_moves_pending_to_completed() {
        let (board, _) = board();
        let inquiry = board.submit(new_inquiry("보험료 문의")).await.unwrap();
        assert_eq!(inquiry.status, InquiryStatus::Pending);
        assert_eq!(board.list().await.unwrap().len(), 1);

        let answered = board.answer(&admin(), inquiry.id, "확인했습니다").await.unwrap();
        assert_eq!(answered.status, InquiryStatus::Completed);
        assert_eq!(answered.answer.as_deref(), Some("확인했습니다"));

        let stored = board.get(inquiry.id).await.unwrap();
        assert_eq!(stored, answered);

        let again = board.answer(&admin(), inquiry.id, "다시").await;
        assert!(matches!(again, Err(AdvisorError::AlreadyCompleted(_))));
    }

    #[tokio::test]
    async fn mutations_require_admin() {
        let (board, _) = board();
        let inquiry = board.submit(new_inquiry("보장 범위")).await.unwrap();
        let anonymous = AdminSession::default();

        let answer = board.answer(&anonymous, inquiry.id, "확인").await;
        assert!(matches!(answer, Err(AdvisorError::Unauthorized)));
        let delete = board.delete(&anonymous, inquiry.id, true).await;
        assert!(matches!(delete, Err(AdvisorError::Unauthorized)));
        assert_eq!(board.get(inquiry.id).await.unwrap().status, InquiryStatus::Pending);
    }

    #[tokio::test]
    async fn delete_needs_confirmation_and_removes_the_item() {
        let (board, store) = board();
        let keep = board.submit(new_inquiry("첫 문의")).await.unwrap();
        let gone = board.submit(new_inquiry("둘째 문의")).await.unwrap();

        let unconfirmed = board.delete(&admin(), gone.id, false).await;
        assert!(matches!(unconfirmed, Err(AdvisorError::DeleteNotConfirmed(_))));
        assert_eq!(board.list().await.unwrap().len(), 2);

        board.delete(&admin(), gone.id, true).await.unwrap();
        let remaining = board.list().await.unwrap();
        assert_eq!(remaining, vec![keep]);

        let raw = store.get(INQUIRIES_KEY).await.unwrap().unwrap();
        assert!(!raw.contains(&gone.id.to_string()));

        let missing = board.delete(&admin(), gone.id, true).await;
        assert!(matches!(missing, Err(AdvisorError::InquiryNotFound(_))));
    }

    #[tokio::test]
    async fn blank_fields_are_rejected() {
        let (board, _) = board();
        let mut blank = new_inquiry("  ");
        let err = board.submit(blank.clone()).await.unwrap_err();
        assert!(matches!(err, AdvisorError::InvalidInput(_)));

        blank.title = "문의".to_string();
        blank.contact = String::new();
        assert!(board.submit(blank).await.is_err());
        assert!(board.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn bad_record_does_not_erase_the_collection() {
        let (board, store) = board();
        let kept = board.submit(new_inquiry("첫 문의")).await.unwrap();

        let raw = store.get(INQUIRIES_KEY).await.unwrap().unwrap();
        let mut records: Vec<serde_json::Value> = serde_json::from_str(&raw).unwrap();
        let mut bad = records[0].clone();
        bad["id"] = serde_json::json!(Uuid::new_v4());
        bad["age"] = serde_json::json!(35);
        records.push(bad);
        let corrupted = serde_json::to_string(&records).unwrap();
        store.set(INQUIRIES_KEY, corrupted.clone()).await.unwrap();

        assert_eq!(board.list().await.unwrap(), vec![kept.clone()]);
        assert_eq!(board.get(kept.id).await.unwrap(), kept);

        let submit = board.submit(new_inquiry("새 문의")).await;
        assert!(matches!(submit, Err(AdvisorError::StorageError(_))));
        let answer = board.answer(&admin(), kept.id, "확인").await;
        assert!(matches!(answer, Err(AdvisorError::StorageError(_))));
        let delete = board.delete(&admin(), kept.id, true).await;
        assert!(matches!(delete, Err(AdvisorError::StorageError(_))));

        assert_eq!(store.get(INQUIRIES_KEY).await.unwrap(), Some(corrupted));
    }

    #[tokio::test]
    async fn newest_inquiry_is_listed_first() {
        let (board, _) = board();
        board.submit(new_inquiry("첫 문의")).await.unwrap();
        board.submit(new_inquiry("둘째 문의")).await.unwrap();
        let titles: Vec<String> = board.list().await.unwrap().into_iter().map(|i| i.title).collect();
        assert_eq!(titles, vec!["둘째 문의", "첫 문의"]);
    }
}
