//! Domain core of the insurance advisor.
//!
//! The requester ([`InsuranceAdvisor`]) turns a [`UserProfile`] into product recommendations and
//! a premium analysis by prompting a [`CompletionBackend`] through the quota-aware
//! [`with_backoff`] wrapper. Whatever goes wrong remotely, callers always receive data: failures
//! degrade to the static tables in [`fallback`].

pub mod cache;
pub mod completion;
pub mod config;
pub mod contact;
pub mod content;
pub mod error;
pub mod fallback;
pub mod inquiry;
pub mod models;
pub mod profile;
pub mod ranking;
pub mod requester;
pub mod retry;
pub mod storage;

// Re-export commonly used types
pub use cache::{CachedRecommendations, RecommendationCache};
pub use completion::{CompletionBackend, CompletionRequest, OfflineBackend, RigBackend};
pub use config::AdvisorConfig;
pub use contact::{ContactForm, InquiryType, MailDraft};
pub use content::{InsuranceReview, NewsArticle, ReviewBoard, dynamic_news, synthetic_reviews};
pub use error::{AdvisorError, Result};
pub use inquiry::{AdminGate, AdminSession, Inquiry, InquiryBoard, InquiryStatus, NewInquiry};
pub use models::{AnalysisResult, Product, Source, market_catalog};
pub use profile::{AgeGroup, Category, Gender, UserProfile};
pub use ranking::{MarketTile, market_map, top_tiles};
pub use requester::InsuranceAdvisor;
pub use retry::{RetryPolicy, with_backoff};
pub use storage::{InMemoryStore, KeyValueStore, PostgresStore};
