use serde::{Deserialize, Serialize};

use crate::models::{ApplicationStatus, Channel, Priority, StudentActivity};
use crate::scoring::{calculate_engagement_level, calculate_risk_score};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionCode {
    UrgentReengagement,
    GuidedExploration,
    ShortlistAssistance,
    DocumentSupport,
    StatusCheck,
    MaintainMomentum,
    BoostEngagement,
}

impl ActionCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionCode::UrgentReengagement => "urgent_reengagement",
            ActionCode::GuidedExploration => "guided_exploration",
            ActionCode::ShortlistAssistance => "shortlist_assistance",
            ActionCode::DocumentSupport => "document_support",
            ActionCode::StatusCheck => "status_check",
            ActionCode::MaintainMomentum => "maintain_momentum",
            ActionCode::BoostEngagement => "boost_engagement",
        }
    }
}

/// Single recommended outreach step for a counselor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextBestAction {
    pub action: ActionCode,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub timeframe: String,
    pub channel: Channel,
}

impl NextBestAction {
    fn new(
        action: ActionCode,
        title: &str,
        description: String,
        priority: Priority,
        timeframe: &str,
        channel: Channel,
    ) -> Self {
        Self {
            action,
            title: title.to_string(),
            description,
            priority,
            timeframe: timeframe.to_string(),
            channel,
        }
    }
}

/// First matching rule wins: urgent re-engagement, then the status rule, then
/// an engagement-based default.
pub fn next_best_action(student: &StudentActivity) -> NextBestAction {
    let risk_score = calculate_risk_score(student);

    if risk_score > 60 && student.days_since_last_login > 14 {
        return NextBestAction::new(
            ActionCode::UrgentReengagement,
            "Urgent Re-engagement Call",
            format!(
                "Call {} immediately. They haven't logged in for {} days.",
                student.name, student.days_since_last_login
            ),
            Priority::High,
            "Today",
            Channel::Call,
        );
    }

    if let Some(action) = status_action(student) {
        return action;
    }

    if calculate_engagement_level(student) > 70 {
        NextBestAction::new(
            ActionCode::MaintainMomentum,
            "Maintain Momentum",
            "Student is engaged. Send encouraging update and additional resources.".to_string(),
            Priority::Low,
            "3-5 days",
            Channel::Email,
        )
    } else {
        NextBestAction::new(
            ActionCode::BoostEngagement,
            "Boost Engagement",
            "Send personalized content to increase platform engagement.".to_string(),
            Priority::Medium,
            "1-2 days",
            Channel::Email,
        )
    }
}

fn status_action(student: &StudentActivity) -> Option<NextBestAction> {
    match student.application_status {
        ApplicationStatus::Exploring if student.ai_questions_asked < 3 => {
            Some(NextBestAction::new(
                ActionCode::GuidedExploration,
                "Send Exploration Guide",
                "Share personalized major exploration resources and schedule discovery call."
                    .to_string(),
                Priority::Medium,
                "2-3 days",
                Channel::Email,
            ))
        }
        ApplicationStatus::Shortlisting if student.university_shortlist.len() < 5 => {
            Some(NextBestAction::new(
                ActionCode::ShortlistAssistance,
                "University Shortlisting Support",
                "Provide personalized university recommendations and shortlisting workshop."
                    .to_string(),
                Priority::High,
                "1-2 days",
                Channel::Email,
            ))
        }
        ApplicationStatus::Applying if student.documents_uploaded == 0 => {
            Some(NextBestAction::new(
                ActionCode::DocumentSupport,
                "Document Upload Assistance",
                "Guide through document requirements and provide upload support.".to_string(),
                Priority::High,
                "Today",
                Channel::Call,
            ))
        }
        ApplicationStatus::Submitted => Some(NextBestAction::new(
            ActionCode::StatusCheck,
            "Application Status Follow-up",
            "Check in on application status and provide next steps guidance.".to_string(),
            Priority::Low,
            "1 week",
            Channel::Email,
        )),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    Reengagement,
    ProgressSupport,
}

/// Draft outreach message a counselor can personalize and send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunicationSuggestion {
    pub kind: SuggestionKind,
    pub subject: String,
    pub preview: String,
    pub tone: String,
    pub urgency: Priority,
}

pub fn communication_suggestions(student: &StudentActivity) -> Vec<CommunicationSuggestion> {
    let mut suggestions = Vec::new();
    let name = &student.name;
    let major = student.primary_major().unwrap_or("your intended major");

    if student.days_since_last_login > 7 {
        suggestions.push(CommunicationSuggestion {
            kind: SuggestionKind::Reengagement,
            subject: format!("{name}, we miss you! Let's get back on track 🚀"),
            preview: format!(
                "Hi {name}, I noticed you haven't been active lately. As someone interested in {major}, I have some exciting updates to share..."
            ),
            tone: "friendly".to_string(),
            urgency: Priority::Medium,
        });
    }

    if student.application_status == ApplicationStatus::Shortlisting
        && student.ai_questions_asked > 5
    {
        suggestions.push(CommunicationSuggestion {
            kind: SuggestionKind::ProgressSupport,
            subject: format!("Ready for the next step in your {major} journey?"),
            preview: format!(
                "{name}, you've been asking great questions about {major}. I think you're ready to start building your university shortlist..."
            ),
            tone: "encouraging".to_string(),
            urgency: Priority::Low,
        });
    }

    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EngagementTrend;

    fn student(status: ApplicationStatus) -> StudentActivity {
        StudentActivity {
            name: "Hana Kim".to_string(),
            country: "South Korea".to_string(),
            grade: 11,
            application_status: status,
            ai_questions_asked: 8,
            ..Default::default()
        }
    }

    #[test]
    fn inactive_high_risk_student_gets_urgent_call() {
        let record = StudentActivity {
            days_since_last_login: 20,
            days_in_current_stage: 25,
            ..student(ApplicationStatus::Applying)
        };

        let action = next_best_action(&record);
        assert_eq!(action.action, ActionCode::UrgentReengagement);
        assert_eq!(action.timeframe, "Today");
        assert_eq!(
            action.description,
            "Call Hana Kim immediately. They haven't logged in for 20 days."
        );
    }

    #[test]
    fn high_risk_alone_does_not_trigger_urgent_call() {
        let record = StudentActivity {
            days_since_last_login: 10,
            days_in_current_stage: 30,
            engagement_trend: EngagementTrend::Declining,
            days_since_last_contact: 15,
            ..student(ApplicationStatus::Applying)
        };
        assert!(calculate_risk_score(&record) > 60);
        assert_eq!(next_best_action(&record).action, ActionCode::DocumentSupport);
    }

    #[test]
    fn applying_without_documents_needs_document_support() {
        let record = StudentActivity {
            login_count_30_days: 30,
            avg_session_duration: 40.0,
            communication_response_rate: 1.0,
            ..student(ApplicationStatus::Applying)
        };
        let action = next_best_action(&record);
        assert_eq!(action.action, ActionCode::DocumentSupport);
        assert_eq!(action.action.as_str(), "document_support");
        assert_eq!(action.channel, Channel::Call);
        assert_eq!(action.priority, Priority::High);
    }

    #[test]
    fn status_rules_pick_stage_specific_actions() {
        let explorer = StudentActivity {
            ai_questions_asked: 2,
            ..student(ApplicationStatus::Exploring)
        };
        assert_eq!(
            next_best_action(&explorer).action,
            ActionCode::GuidedExploration
        );

        let shortlister = student(ApplicationStatus::Shortlisting);
        assert_eq!(
            next_best_action(&shortlister).action,
            ActionCode::ShortlistAssistance
        );

        let submitted = student(ApplicationStatus::Submitted);
        let action = next_best_action(&submitted);
        assert_eq!(action.action, ActionCode::StatusCheck);
        assert_eq!(action.priority, Priority::Low);
    }

    #[test]
    fn unmatched_status_falls_back_on_engagement() {
        let busy = StudentActivity {
            login_count_30_days: 40,
            ai_questions_asked: 25,
            documents_uploaded: 3,
            avg_session_duration: 60.0,
            sections_visited: 12,
            communication_response_rate: 0.9,
            ..student(ApplicationStatus::Applying)
        };
        assert_eq!(next_best_action(&busy).action, ActionCode::MaintainMomentum);

        let curious_explorer = student(ApplicationStatus::Exploring);
        let action = next_best_action(&curious_explorer);
        assert_eq!(action.action, ActionCode::BoostEngagement);
        assert_eq!(action.priority, Priority::Medium);
    }

    #[test]
    fn suggestions_follow_inactivity_and_stage() {
        let record = StudentActivity {
            days_since_last_login: 9,
            interested_majors: vec!["Biology".to_string()],
            ..student(ApplicationStatus::Shortlisting)
        };

        let suggestions = communication_suggestions(&record);
        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0].kind, SuggestionKind::Reengagement);
        assert_eq!(
            suggestions[0].subject,
            "Hana Kim, we miss you! Let's get back on track 🚀"
        );
        assert_eq!(
            suggestions[1].subject,
            "Ready for the next step in your Biology journey?"
        );
    }

    #[test]
    fn suggestions_default_major_token() {
        let record = StudentActivity {
            days_since_last_login: 8,
            ..student(ApplicationStatus::Exploring)
        };
        let suggestions = communication_suggestions(&record);
        assert_eq!(suggestions.len(), 1);
        assert!(suggestions[0].preview.contains("interested in your intended major"));
    }
}
