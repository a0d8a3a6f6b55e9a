use advisor_core::{
    AgeGroup, Category, ContactForm, Gender, Inquiry, InquiryStatus, MarketTile, Product,
    UserProfile,
};
use chrono::NaiveDate;
use uuid::Uuid;
use serde::{Deserialize, Serialize};

/// Selector values carried in the query string of the read-only views
#[derive(Debug, Deserialize)]
pub struct ProfileQuery {
    pub age: AgeGroup,
    pub gender: Gender,
    pub category: Category,
}

impl From<ProfileQuery> for UserProfile {
    fn from(query: ProfileQuery) -> Self {
        UserProfile::from_selectors(query.age, query.gender, query.category)
    }
}

#[derive(Debug, Serialize)]
pub struct MarketResponse {
    pub tiles: Vec<MarketTile>,
    pub top: Vec<MarketTile>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationsResponse {
    pub products: Vec<Product>,
    pub cached: bool,
}

#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    pub profile: UserProfile,
    pub form: ContactForm,
}

/// Inquiry as shown on the board. The submitter's contact is only included for admins.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InquiryView {
    pub id: Uuid,
    pub title: String,
    pub category: Category,
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    pub content: String,
    pub created_at: NaiveDate,
    pub status: InquiryStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    pub age: AgeGroup,
    pub gender: Gender,
}

impl InquiryView {
    pub fn new(inquiry: Inquiry, reveal_contact: bool) -> Self {
        Self {
            id: inquiry.id,
            title: inquiry.title,
            category: inquiry.category,
            author: inquiry.author,
            contact: reveal_contact.then_some(inquiry.contact),
            content: inquiry.content,
            created_at: inquiry.created_at,
            status: inquiry.status,
            answer: inquiry.answer,
            age: inquiry.age,
            gender: inquiry.gender,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub authenticated: bool,
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub answer: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Serialize)]
pub struct SelectorOption {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsResponse {
    pub age_groups: Vec<SelectorOption>,
    pub genders: Vec<SelectorOption>,
    pub categories: Vec<SelectorOption>,
    pub inquiry_types: Vec<SelectorOption>,
}
