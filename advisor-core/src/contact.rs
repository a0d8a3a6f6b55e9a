use serde::{Deserialize, Serialize};

use crate::error::{AdvisorError, Result};
use crate::profile::UserProfile;

pub const DEFAULT_RECIPIENTS: [&str; 2] = ["bossiniz@naver.com", "bossini@shinhan.com"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InquiryType {
    NewPolicy,
    PolicyReview,
    QuoteComparison,
    Coverage,
    ExpertAnalysis,
    Other,
}

impl InquiryType {
    pub const ALL: [InquiryType; 6] = [
        InquiryType::NewPolicy,
        InquiryType::PolicyReview,
        InquiryType::QuoteComparison,
        InquiryType::Coverage,
        InquiryType::ExpertAnalysis,
        InquiryType::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            InquiryType::NewPolicy => "신규 가입 상담",
            InquiryType::PolicyReview => "기존 보험 분석",
            InquiryType::QuoteComparison => "보험료 비교 견적",
            InquiryType::Coverage => "보장 범위 문의",
            InquiryType::ExpertAnalysis => "전문가 심층 분석",
            InquiryType::Other => "기타 문의",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactForm {
    pub inquiry_type: InquiryType,
    pub phone: String,
    pub message: String,
}

/// Pre-filled message handed to the user's mail client
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MailDraft {
    pub recipients: Vec<String>,
    pub subject: String,
    pub body: String,
    pub mailto: String,
}

impl MailDraft {
    pub fn compose(profile: &UserProfile, form: &ContactForm, recipients: &[String]) -> Result<Self> {
        if form.phone.trim().is_empty() {
            return Err(AdvisorError::InvalidInput("phone must not be empty".to_string()));
        }
        if form.message.trim().is_empty() {
            return Err(AdvisorError::InvalidInput("message must not be empty".to_string()));
        }
        if recipients.is_empty() {
            return Err(AdvisorError::ConfigError("no contact recipients configured".to_string()));
        }

        let subject = format!("[DS보험상담] 문의: {}", form.inquiry_type.label());
        let body = format!(
            "연령: {}대\n성별: {}\n관심상품: {}\n문의종류: {}\n연락처: {}\n\n상세내용:\n{}",
            profile.age,
            profile.gender,
            profile.insurance_type,
            form.inquiry_type.label(),
            form.phone,
            form.message
        );
        let mailto = format!(
            "mailto:{}?subject={}&body={}",
            recipients.join(","),
            urlencoding::encode(&subject),
            urlencoding::encode(&body)
        );

        Ok(Self {
            recipients: recipients.to_vec(),
            subject,
            body,
            mailto,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipients() -> Vec<String> {
        DEFAULT_RECIPIENTS.iter().map(|s| s.to_string()).collect()
    }

    fn form() -> ContactForm {
        ContactForm {
            inquiry_type: InquiryType::QuoteComparison,
            phone: "010-0000-0000".to_string(),
            message: "견적 부탁드립니다 & 감사합니다".to_string(),
        }
    }

    #[test]
    fn draft_encodes_profile_and_form() {
        let draft = MailDraft::compose(&UserProfile::default(), &form(), &recipients()).unwrap();

        assert_eq!(draft.subject, "[DS보험상담] 문의: 보험료 비교 견적");
        assert!(draft.body.starts_with("연령: 30대\n성별: 남성\n관심상품: 건강보험\n"));
        assert!(draft.body.ends_with("상세내용:\n견적 부탁드립니다 & 감사합니다"));
        assert!(
            draft
                .mailto
                .starts_with("mailto:bossiniz@naver.com,bossini@shinhan.com?subject=")
        );
        assert!(draft.mailto.contains("%26"));
        assert!(!draft.mailto.contains('\n'));
        assert_eq!(draft.mailto.matches('&').count(), 1);
    }

    #[test]
    fn blank_phone_or_message_is_rejected() {
        let mut blank = form();
        blank.phone = " ".to_string();
        assert!(MailDraft::compose(&UserProfile::default(), &blank, &recipients()).is_err());

        let mut blank = form();
        blank.message = String::new();
        assert!(MailDraft::compose(&UserProfile::default(), &blank, &recipients()).is_err());
    }

    #[test]
    fn inquiry_types_deserialize_from_snake_case() {
        let t: InquiryType = serde_json::from_str("\"expert_analysis\"").unwrap();
        assert_eq!(t.label(), "전문가 심층 분석");
        assert_eq!(InquiryType::ALL.len(), 6);
    }
}
