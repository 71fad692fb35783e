use rand::Rng;

use crate::intent::Intent;
use crate::models::StudentActivity;

/// Template family chosen from the engagement level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NarrativeCategory {
    HighEngagement,
    MediumEngagement,
    LowEngagement,
}

impl NarrativeCategory {
    pub fn for_engagement(engagement_level: u8) -> Self {
        if engagement_level > 70 {
            Self::HighEngagement
        } else if engagement_level > 40 {
            Self::MediumEngagement
        } else {
            Self::LowEngagement
        }
    }
}

/// Every rendered template for the category, in a fixed order.
pub fn narrative_templates(
    category: NarrativeCategory,
    student: &StudentActivity,
    intent: Intent,
) -> Vec<String> {
    let name = &student.name;
    let country = &student.country;
    let grade = student.grade;
    let stage = student.application_status.as_str().to_lowercase();
    let questions = student.ai_questions_asked;
    let logins = student.login_count_30_days;
    let documents = student.documents_uploaded;

    match category {
        NarrativeCategory::HighEngagement => vec![
            format!(
                "{name} is a highly engaged {grade}th grader from {country} showing strong interest in {}. With {questions} AI interactions and {logins} logins this month, they're actively exploring options.",
                student.primary_major().unwrap_or("undecided major")
            ),
            format!(
                "Active student from {country} in the {stage} stage. Has asked {questions} thoughtful questions and uploaded {documents} documents. Shows high commitment to the application process."
            ),
            format!(
                "{name} demonstrates excellent engagement with {logins} recent logins and {}min average sessions. Currently focused on {stage} and shows {} intent to proceed.",
                student.avg_session_duration,
                intent.as_str().to_lowercase()
            ),
        ],
        NarrativeCategory::MediumEngagement => vec![
            format!(
                "{name} from {country} shows moderate engagement. In the {stage} stage with {questions} AI questions asked. May need additional guidance to maintain momentum."
            ),
            format!(
                "Steady progress from this {grade}th grader. {logins} logins this month with focus on {}. Good candidate for targeted follow-up.",
                student.primary_major().unwrap_or("exploring options")
            ),
            format!(
                "{name} is making consistent progress in their college journey. {documents} documents uploaded, showing commitment but could benefit from more personalized support."
            ),
        ],
        NarrativeCategory::LowEngagement => {
            let idle_days = student.days_since_last_login;
            vec![
                format!(
                    "{name} from {country} needs attention. Only {logins} logins this month and {idle_days} days since last activity. High risk of dropping off."
                ),
                format!(
                    "{grade}th grader showing minimal engagement. Last active {idle_days} days ago. Immediate intervention recommended to re-engage."
                ),
                format!(
                    "At-risk student in {stage} stage. Low activity with only {questions} questions asked. Requires urgent outreach."
                ),
            ]
        }
    }
}

/// Picks one template of the engagement category uniformly at random.
pub fn create_narrative_summary<R: Rng>(
    rng: &mut R,
    student: &StudentActivity,
    engagement_level: u8,
    intent: Intent,
) -> String {
    let category = NarrativeCategory::for_engagement(engagement_level);
    let mut templates = narrative_templates(category, student, intent);
    let index = rng.random_range(0..templates.len());
    templates.swap_remove(index)
}
