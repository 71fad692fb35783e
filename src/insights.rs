use serde::{Deserialize, Serialize};

use crate::models::{ApplicationStatus, Priority, StudentActivity};

const MAX_KEY_INSIGHTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightCategory {
    Academic,
    Engagement,
    Demographic,
    Timing,
    Financial,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyInsight {
    pub category: InsightCategory,
    pub text: String,
    pub icon: String,
    pub priority: Priority,
}

impl KeyInsight {
    fn new(category: InsightCategory, text: &str, icon: &str, priority: Priority) -> Self {
        Self {
            category,
            text: text.to_string(),
            icon: icon.to_string(),
            priority,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagCategory {
    Inactive,
    Stagnant,
    MissingDocs,
    Unresponsive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrgencyFlag {
    pub category: FlagCategory,
    pub message: String,
    pub severity: Priority,
}

/// Up to three insights, kept in rule order so later rules drop first.
pub fn extract_key_insights(student: &StudentActivity) -> Vec<KeyInsight> {
    let mut insights = Vec::new();

    if student.gpa.is_some_and(|gpa| gpa > 3.7) {
        insights.push(KeyInsight::new(
            InsightCategory::Academic,
            "Strong academic performance",
            "📚",
            Priority::Medium,
        ));
    }

    if student.ai_questions_asked > 15 {
        insights.push(KeyInsight::new(
            InsightCategory::Engagement,
            "Highly curious - asks detailed questions",
            "🤔",
            Priority::High,
        ));
    }

    if student.country == "India"
        && student
            .interested_majors
            .iter()
            .any(|major| major == "Engineering")
    {
        insights.push(KeyInsight::new(
            InsightCategory::Demographic,
            "Part of high-volume India engineering segment",
            "🇮🇳",
            Priority::Medium,
        ));
    }

    if student.days_in_current_stage > 21 {
        insights.push(KeyInsight::new(
            InsightCategory::Timing,
            "Stagnant in current stage - needs push",
            "⏰",
            Priority::High,
        ));
    }

    if student.asked_about(&["financial"]) {
        insights.push(KeyInsight::new(
            InsightCategory::Financial,
            "Has concerns about college financing",
            "💰",
            Priority::High,
        ));
    }

    insights.truncate(MAX_KEY_INSIGHTS);
    insights
}

pub fn urgency_flags(student: &StudentActivity) -> Vec<UrgencyFlag> {
    let mut flags = Vec::new();

    if student.days_since_last_login > 14 {
        flags.push(UrgencyFlag {
            category: FlagCategory::Inactive,
            message: "No activity for 2+ weeks".to_string(),
            severity: Priority::High,
        });
    }

    if student.days_in_current_stage > 28 {
        flags.push(UrgencyFlag {
            category: FlagCategory::Stagnant,
            message: "Stuck in current stage for 4+ weeks".to_string(),
            severity: Priority::Medium,
        });
    }

    if student.application_status == ApplicationStatus::Applying && student.documents_uploaded == 0
    {
        flags.push(UrgencyFlag {
            category: FlagCategory::MissingDocs,
            message: "In applying stage but no documents uploaded".to_string(),
            severity: Priority::High,
        });
    }

    if student.communication_response_rate < 0.3 {
        flags.push(UrgencyFlag {
            category: FlagCategory::Unresponsive,
            message: "Low response rate to communications".to_string(),
            severity: Priority::Medium,
        });
    }

    flags
}
