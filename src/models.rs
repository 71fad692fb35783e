use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::RosterError;

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

/// Stage of the college-application funnel a student is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum ApplicationStatus {
    #[default]
    Exploring,
    Shortlisting,
    Applying,
    Submitted,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 4] = [
        ApplicationStatus::Exploring,
        ApplicationStatus::Shortlisting,
        ApplicationStatus::Applying,
        ApplicationStatus::Submitted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Exploring => "Exploring",
            ApplicationStatus::Shortlisting => "Shortlisting",
            ApplicationStatus::Applying => "Applying",
            ApplicationStatus::Submitted => "Submitted",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = RosterError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "exploring" => Ok(Self::Exploring),
            "shortlisting" => Ok(Self::Shortlisting),
            "applying" => Ok(Self::Applying),
            "submitted" => Ok(Self::Submitted),
            _ => Err(RosterError::UnknownStatus(value.to_string())),
        }
    }
}

impl TryFrom<String> for ApplicationStatus {
    type Error = RosterError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Direction of a student's recent engagement. Unrecognized values read as stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum EngagementTrend {
    Increasing,
    #[default]
    Stable,
    Declining,
}

impl EngagementTrend {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngagementTrend::Increasing => "increasing",
            EngagementTrend::Stable => "stable",
            EngagementTrend::Declining => "declining",
        }
    }
}

impl From<&str> for EngagementTrend {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "increasing" => Self::Increasing,
            "declining" => Self::Declining,
            _ => Self::Stable,
        }
    }
}

impl From<String> for EngagementTrend {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

/// Activity record for one prospective student.
///
/// Counters are already-computed upstream facts; scoring reads them and never
/// mutates the record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentActivity {
    #[serde(default)]
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub country: String,
    pub grade: i32,
    pub application_status: ApplicationStatus,
    #[serde(default)]
    pub gpa: Option<f64>,
    #[serde(default)]
    pub login_count_30_days: i32,
    #[serde(default)]
    pub days_since_last_login: i32,
    #[serde(default)]
    pub ai_questions_asked: i32,
    #[serde(default)]
    pub documents_uploaded: i32,
    #[serde(default)]
    pub avg_session_duration: f64,
    #[serde(default)]
    pub sections_visited: i32,
    #[serde(default)]
    pub communication_response_rate: f64,
    #[serde(default)]
    pub engagement_trend: EngagementTrend,
    #[serde(default)]
    pub days_in_current_stage: i32,
    #[serde(default)]
    pub days_since_last_contact: i32,
    #[serde(default)]
    pub interested_majors: Vec<String>,
    #[serde(default)]
    pub university_shortlist: Vec<String>,
    #[serde(default)]
    pub questions_asked: Vec<String>,
}

impl StudentActivity {
    pub fn primary_major(&self) -> Option<&str> {
        self.interested_majors.first().map(String::as_str)
    }

    /// True when any free-text question contains one of `needles` (case-insensitive).
    pub fn asked_about(&self, needles: &[&str]) -> bool {
        self.questions_asked.iter().any(|question| {
            let lowered = question.to_lowercase();
            needles.iter().any(|needle| lowered.contains(needle))
        })
    }
}

/// Input for creating a roster entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStudent {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub country: String,
    pub grade: i32,
    pub application_status: ApplicationStatus,
    #[serde(default)]
    pub gpa: Option<f64>,
    #[serde(default)]
    pub interested_majors: Vec<String>,
}

impl NewStudent {
    pub fn validate(&self) -> Result<(), RosterError> {
        for (field, value) in [
            ("name", &self.name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("country", &self.country),
        ] {
            if value.trim().is_empty() {
                return Err(RosterError::MissingField(field));
            }
        }

        if !is_valid_email(&self.email) {
            return Err(RosterError::InvalidEmail(self.email.clone()));
        }

        Ok(())
    }
}

pub fn is_valid_email(email: &str) -> bool {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(EMAIL_PATTERN).ok())
        .as_ref()
        .is_some_and(|re| re.is_match(email.trim()))
}

/// Shared low/medium/high scale for priorities, urgencies and severities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = RosterError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(RosterError::UnknownPriority(value.to_string())),
        }
    }
}

/// Outreach channel used for communications and recommended actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Phone,
    Call,
    Email,
    Sms,
    Meeting,
    Whatsapp,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Phone => "phone",
            Channel::Call => "call",
            Channel::Email => "email",
            Channel::Sms => "sms",
            Channel::Meeting => "meeting",
            Channel::Whatsapp => "whatsapp",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = RosterError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "phone" => Ok(Self::Phone),
            "call" => Ok(Self::Call),
            "email" => Ok(Self::Email),
            "sms" => Ok(Self::Sms),
            "meeting" => Ok(Self::Meeting),
            "whatsapp" => Ok(Self::Whatsapp),
            _ => Err(RosterError::UnknownChannel(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Communication {
    pub id: Uuid,
    pub student_id: Uuid,
    pub channel: Channel,
    pub content: String,
    pub date: NaiveDate,
    pub status: String,
    pub duration: Option<String>,
    pub outcome: Option<String>,
    pub logged_by: String,
    pub logged_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: Uuid,
    pub student_id: Uuid,
    pub content: String,
    pub author: String,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Reminder,
    Call,
    Email,
    Meeting,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Reminder => "reminder",
            TaskKind::Call => "call",
            TaskKind::Email => "email",
            TaskKind::Meeting => "meeting",
        }
    }
}

impl FromStr for TaskKind {
    type Err = RosterError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "reminder" => Ok(Self::Reminder),
            "call" => Ok(Self::Call),
            "email" => Ok(Self::Email),
            "meeting" => Ok(Self::Meeting),
            _ => Err(RosterError::UnknownTaskKind(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Completed => "completed",
        }
    }

}

impl FromStr for TaskStatus {
    type Err = RosterError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            _ => Err(RosterError::UnknownTaskStatus(value.to_string())),
        }
    }
}

/// Follow-up task or reminder scheduled against a student.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpTask {
    pub id: Uuid,
    pub student_id: Uuid,
    pub title: String,
    pub description: String,
    pub due_date: NaiveDate,
    pub priority: Priority,
    pub kind: TaskKind,
    pub assigned_to: String,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}
