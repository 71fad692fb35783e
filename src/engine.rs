//! Heuristic scoring engine for prospective students.
//!
//! Every operation is a pure function of the student record except narrative
//! selection, which draws from the engine's injected random generator.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::actions::{self, CommunicationSuggestion, NextBestAction};
use crate::filters::{self, SmartFilterCounts};
use crate::insights::{self, KeyInsight, UrgencyFlag};
use crate::intent::{self, Intent};
use crate::models::StudentActivity;
use crate::narrative;
use crate::scoring;
use crate::trends::{self, TrendReport};

/// Derived metrics and recommendations for one student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSummary {
    pub summary: String,
    pub engagement_level: u8,
    pub risk_score: u8,
    pub intent: Intent,
    pub next_best_action: NextBestAction,
    pub key_insights: Vec<KeyInsight>,
    pub urgency_flags: Vec<UrgencyFlag>,
}

pub struct AiEngine<R = StdRng> {
    rng: R,
}

impl AiEngine<StdRng> {
    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Pins narrative selection so repeated runs produce the same text.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> AiEngine<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    pub fn generate_student_summary(&mut self, student: &StudentActivity) -> StudentSummary {
        let engagement_level = scoring::calculate_engagement_level(student);
        let risk_score = scoring::calculate_risk_score(student);
        let intent = intent::analyze_intent(student);
        let next_best_action = actions::next_best_action(student);
        let summary =
            narrative::create_narrative_summary(&mut self.rng, student, engagement_level, intent);

        debug!(
            student = %student.name,
            engagement_level,
            risk_score,
            intent = %intent,
            action = next_best_action.action.as_str(),
            "generated student summary"
        );

        StudentSummary {
            summary,
            engagement_level,
            risk_score,
            intent,
            next_best_action,
            key_insights: insights::extract_key_insights(student),
            urgency_flags: insights::urgency_flags(student),
        }
    }

    pub fn calculate_engagement_level(&self, student: &StudentActivity) -> u8 {
        scoring::calculate_engagement_level(student)
    }

    pub fn calculate_risk_score(&self, student: &StudentActivity) -> u8 {
        scoring::calculate_risk_score(student)
    }

    pub fn analyze_intent(&self, student: &StudentActivity) -> Intent {
        intent::analyze_intent(student)
    }

    pub fn next_best_action(&self, student: &StudentActivity) -> NextBestAction {
        actions::next_best_action(student)
    }

    pub fn communication_suggestions(
        &self,
        student: &StudentActivity,
    ) -> Vec<CommunicationSuggestion> {
        actions::communication_suggestions(student)
    }

    pub fn analyze_trends(&self, students: &[StudentActivity]) -> TrendReport {
        trends::analyze_trends(students)
    }

    pub fn smart_filters(&self, students: &[StudentActivity]) -> SmartFilterCounts {
        filters::smart_filters(students)
    }

    pub fn smart_search<'a>(
        &self,
        students: &'a [StudentActivity],
        query: &str,
    ) -> Vec<&'a StudentActivity> {
        filters::smart_search(students, query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::ActionCode;
    use crate::models::ApplicationStatus;
    use crate::narrative::{narrative_templates, NarrativeCategory};

    fn applicant() -> StudentActivity {
        StudentActivity {
            name: "Diego Alvarez".to_string(),
            country: "Mexico".to_string(),
            grade: 12,
            application_status: ApplicationStatus::Applying,
            login_count_30_days: 12,
            ai_questions_asked: 6,
            avg_session_duration: 10.0,
            sections_visited: 3,
            communication_response_rate: 0.2,
            days_since_last_login: 5,
            ..Default::default()
        }
    }

    #[test]
    fn summary_combines_all_derived_outputs() {
        let student = applicant();
        let mut engine = AiEngine::seeded(11);
        let summary = engine.generate_student_summary(&student);

        assert_eq!(
            summary.engagement_level,
            scoring::calculate_engagement_level(&student)
        );
        assert_eq!(summary.risk_score, 10);
        assert_eq!(summary.intent, Intent::High);
        assert_eq!(summary.next_best_action.action, ActionCode::DocumentSupport);
        assert!(summary.key_insights.is_empty());
        assert_eq!(summary.urgency_flags.len(), 2);

        let category = NarrativeCategory::for_engagement(summary.engagement_level);
        let candidates = narrative_templates(category, &student, summary.intent);
        assert!(candidates.contains(&summary.summary));
    }

    #[test]
    fn seeded_engines_agree() {
        let student = applicant();
        let first = AiEngine::seeded(3).generate_student_summary(&student);
        let second = AiEngine::seeded(3).generate_student_summary(&student);
        assert_eq!(first, second);
    }

    #[test]
    fn roster_operations_delegate_to_analytics() {
        let engine = AiEngine::seeded(5);
        let roster = vec![
            applicant(),
            StudentActivity {
                name: "Ines Duarte".to_string(),
                country: "Portugal".to_string(),
                application_status: ApplicationStatus::Exploring,
                ..applicant()
            },
        ];

        assert_eq!(engine.smart_filters(&roster), filters::smart_filters(&roster));
        assert_eq!(engine.analyze_trends(&roster), trends::analyze_trends(&roster));
        let found = engine.smart_search(&roster, "portugal");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Ines Duarte");
        assert_eq!(engine.analyze_intent(&roster[0]), Intent::High);
        assert!(engine.communication_suggestions(&roster[0]).is_empty());
    }

    #[test]
    fn summary_serializes_with_camel_case_keys() {
        let summary = AiEngine::seeded(1).generate_student_summary(&applicant());
        let value = serde_json::to_value(&summary).unwrap();
        assert!(value.get("engagementLevel").is_some());
        assert_eq!(value["nextBestAction"]["action"], "document_support");
        assert_eq!(value["intent"], "High");
    }
}
