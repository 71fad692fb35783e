use serde::{Deserialize, Serialize};

use crate::intent::{analyze_intent, Intent};
use crate::models::{ApplicationStatus, StudentActivity};
use crate::scoring::{calculate_engagement_level, calculate_risk_score};

/// Roster counts behind the dashboard's quick filters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmartFilterCounts {
    #[serde(rename = "high-intent")]
    pub high_intent: usize,
    #[serde(rename = "needs-attention")]
    pub needs_attention: usize,
    #[serde(rename = "ready-to-apply")]
    pub ready_to_apply: usize,
    #[serde(rename = "essay-help")]
    pub essay_help: usize,
    #[serde(rename = "financial-concerns")]
    pub financial_concerns: usize,
}

impl SmartFilterCounts {
    /// Label and count pairs in display order.
    pub fn entries(&self) -> [(&'static str, usize); 5] {
        [
            ("high-intent", self.high_intent),
            ("needs-attention", self.needs_attention),
            ("ready-to-apply", self.ready_to_apply),
            ("essay-help", self.essay_help),
            ("financial-concerns", self.financial_concerns),
        ]
    }
}

pub fn is_high_intent(student: &StudentActivity) -> bool {
    analyze_intent(student) == Intent::High
}

pub fn needs_attention(student: &StudentActivity) -> bool {
    calculate_risk_score(student) > 50
}

pub fn is_ready_to_apply(student: &StudentActivity) -> bool {
    student.application_status == ApplicationStatus::Shortlisting
        && calculate_engagement_level(student) > 60
        && student.documents_uploaded > 0
}

pub fn wants_essay_help(student: &StudentActivity) -> bool {
    student.asked_about(&["essay"])
}

pub fn has_financial_concerns(student: &StudentActivity) -> bool {
    student.asked_about(&["financial", "scholarship", "aid"])
}

pub fn smart_filters(students: &[StudentActivity]) -> SmartFilterCounts {
    let count = |predicate: fn(&StudentActivity) -> bool| {
        students.iter().filter(|student| predicate(student)).count()
    };

    SmartFilterCounts {
        high_intent: count(is_high_intent),
        needs_attention: count(needs_attention),
        ready_to_apply: count(is_ready_to_apply),
        essay_help: count(wants_essay_help),
        financial_concerns: count(has_financial_concerns),
    }
}

/// Text a search term is matched against: name, country, status, majors and
/// intent label, lowercased.
pub fn search_text(student: &StudentActivity) -> String {
    format!(
        "{} {} {} {} {}",
        student.name,
        student.country,
        student.application_status,
        student.interested_majors.join(" "),
        analyze_intent(student)
    )
    .to_lowercase()
}

/// Students whose search text contains any whitespace-separated query term.
/// A query without terms returns the whole roster.
pub fn smart_search<'a>(students: &'a [StudentActivity], query: &str) -> Vec<&'a StudentActivity> {
    let terms: Vec<String> = query
        .split_whitespace()
        .map(|term| term.to_lowercase())
        .collect();

    if terms.is_empty() {
        return students.iter().collect();
    }

    students
        .iter()
        .filter(|student| {
            let text = search_text(student);
            terms.iter().any(|term| text.contains(term.as_str()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EngagementTrend;

    fn roster() -> Vec<StudentActivity> {
        vec![
            StudentActivity {
                name: "Ananya Iyer".to_string(),
                country: "India".to_string(),
                grade: 12,
                application_status: ApplicationStatus::Shortlisting,
                login_count_30_days: 25,
                ai_questions_asked: 18,
                documents_uploaded: 2,
                avg_session_duration: 30.0,
                sections_visited: 8,
                communication_response_rate: 0.9,
                interested_majors: vec!["Computer Science".to_string()],
                questions_asked: vec!["How should I start my ESSAY?".to_string()],
                ..Default::default()
            },
            StudentActivity {
                name: "Tom Becker".to_string(),
                country: "Germany".to_string(),
                grade: 11,
                application_status: ApplicationStatus::Exploring,
                days_since_last_login: 18,
                days_in_current_stage: 24,
                engagement_trend: EngagementTrend::Declining,
                questions_asked: vec!["Are there scholarships for Indians abroad?".to_string()],
                ..Default::default()
            },
            StudentActivity {
                name: "Layla Haddad".to_string(),
                country: "Jordan".to_string(),
                grade: 12,
                application_status: ApplicationStatus::Submitted,
                documents_uploaded: 5,
                ai_questions_asked: 14,
                communication_response_rate: 0.6,
                interested_majors: vec!["Medicine".to_string(), "Biology".to_string()],
                ..Default::default()
            },
        ]
    }

    #[test]
    fn filter_counts_match_each_predicate() {
        let students = roster();
        let counts = smart_filters(&students);
        assert_eq!(
            counts,
            SmartFilterCounts {
                high_intent: 1,
                needs_attention: 1,
                ready_to_apply: 1,
                essay_help: 1,
                financial_concerns: 1,
            }
        );
    }

    #[test]
    fn filter_counts_never_exceed_roster() {
        let students = roster();
        let counts = smart_filters(&students);
        for (_, count) in counts.entries() {
            assert!(count <= students.len());
        }
        let independent = students
            .iter()
            .filter(|student| calculate_risk_score(student) > 50)
            .count();
        assert_eq!(counts.needs_attention, independent);
    }

    #[test]
    fn aid_matches_as_a_plain_substring() {
        let student = StudentActivity {
            questions_asked: vec!["My counselor said to apply early".to_string()],
            ..Default::default()
        };
        assert!(has_financial_concerns(&student));
    }

    #[test]
    fn search_matches_any_term_case_insensitively() {
        let students = roster();
        let names: Vec<&str> = smart_search(&students, "INDIA")
            .into_iter()
            .map(|student| student.name.as_str())
            .collect();
        assert_eq!(names, vec!["Ananya Iyer"]);

        let names: Vec<&str> = smart_search(&students, "germany  medicine")
            .into_iter()
            .map(|student| student.name.as_str())
            .collect();
        assert_eq!(names, vec!["Tom Becker", "Layla Haddad"]);
    }

    #[test]
    fn trailing_spaces_do_not_widen_search() {
        let students = roster();
        let names: Vec<&str> = smart_search(&students, " india ")
            .into_iter()
            .map(|student| student.name.as_str())
            .collect();
        assert_eq!(names, vec!["Ananya Iyer"]);
    }

    #[test]
    fn search_covers_status_and_intent_labels() {
        let students = roster();
        assert_eq!(smart_search(&students, "submitted").len(), 1);
        let low: Vec<&str> = smart_search(&students, "low")
            .into_iter()
            .map(|student| student.name.as_str())
            .collect();
        assert_eq!(low, vec!["Tom Becker"]);
    }

    #[test]
    fn empty_query_returns_everyone() {
        let students = roster();
        assert_eq!(smart_search(&students, "").len(), 3);
        assert_eq!(smart_search(&students, "   ").len(), 3);
    }

    #[test]
    fn search_text_joins_fields() {
        let students = roster();
        assert_eq!(
            search_text(&students[2]),
            "layla haddad jordan submitted medicine biology high"
        );
    }
}
