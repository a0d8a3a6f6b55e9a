use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::AdvisorError;

/// Insurance product categories offered by the comparison service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[serde(alias = "건강보험")]
    Health,
    #[serde(alias = "생명보험")]
    Life,
    #[serde(alias = "자동차보험")]
    Car,
    #[serde(alias = "여행자보험")]
    Travel,
    #[serde(alias = "연금보험")]
    Pension,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Health,
        Category::Life,
        Category::Car,
        Category::Travel,
        Category::Pension,
    ];

    /// Korean product label used in prompts, cache keys and mail bodies
    pub fn label(&self) -> &'static str {
        match self {
            Category::Health => "건강보험",
            Category::Life => "생명보험",
            Category::Car => "자동차보험",
            Category::Travel => "여행자보험",
            Category::Pension => "연금보험",
        }
    }

    /// Short selector label
    pub fn short_label(&self) -> &'static str {
        match self {
            Category::Health => "건강",
            Category::Life => "생명",
            Category::Car => "자동차",
            Category::Travel => "여행",
            Category::Pension => "연금",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[serde(alias = "남성")]
    Male,
    #[serde(alias = "여성")]
    Female,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

    pub fn label(&self) -> &'static str {
        match self {
            Gender::Male => "남성",
            Gender::Female => "여성",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Age bucket in decades. `60` stands for "60 and over".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct AgeGroup(u8);

impl AgeGroup {
    pub const ALL: [AgeGroup; 5] = [
        AgeGroup(20),
        AgeGroup(30),
        AgeGroup(40),
        AgeGroup(50),
        AgeGroup(60),
    ];

    pub fn years(&self) -> u8 {
        self.0
    }

    pub fn label(&self) -> String {
        if self.0 >= 60 {
            format!("{}대+", self.0)
        } else {
            format!("{}대", self.0)
        }
    }

    /// Demographic risk context folded into the analysis prompt
    pub fn risk_context(&self) -> &'static str {
        match self.0 {
            20 => "사회초년생 단계로 소득 대비 보장 공백과 상해 위험이 상대적으로 큼",
            30 => "결혼과 출산 등 가족 부양 책임이 시작되어 사망·질병 보장 수요가 증가함",
            40 => "3대 질병 발병률이 높아지기 시작하며 자녀 교육비 부담이 큼",
            50 => "만성질환과 암 발병 위험이 급증하고 은퇴 준비가 본격화됨",
            _ => "노후 의료비 지출이 커지고 신규 가입 심사가 까다로워짐",
        }
    }
}

impl TryFrom<u8> for AgeGroup {
    type Error = AdvisorError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            20 | 30 | 40 | 50 | 60 => Ok(AgeGroup(value)),
            other => Err(AdvisorError::InvalidInput(format!(
                "age group must be one of 20, 30, 40, 50, 60 (got {other})"
            ))),
        }
    }
}

impl From<AgeGroup> for u8 {
    fn from(age: AgeGroup) -> Self {
        age.0
    }
}

impl Default for AgeGroup {
    fn default() -> Self {
        AgeGroup(30)
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Demographic profile the user builds with the selectors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub age: AgeGroup,
    pub gender: Gender,
    #[serde(default)]
    pub is_smoker: bool,
    #[serde(default = "default_occupation")]
    pub occupation: String,
    #[serde(default = "default_income")]
    pub annual_income: u64,
    pub insurance_type: Category,
}

fn default_occupation() -> String {
    "사무직".to_string()
}

fn default_income() -> u64 {
    50_000_000
}

impl UserProfile {
    /// Profile reduced to the three selector fields
    pub fn from_selectors(age: AgeGroup, gender: Gender, insurance_type: Category) -> Self {
        Self {
            age,
            gender,
            insurance_type,
            ..Self::default()
        }
    }
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            age: AgeGroup::default(),
            gender: Gender::Male,
            is_smoker: false,
            occupation: default_occupation(),
            annual_income: default_income(),
            insurance_type: Category::Health,
        }
    }
}

/// Formats a won amount with thousands separators, e.g. `50,000,000`.
pub fn format_won(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
