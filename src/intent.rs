use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::{ApplicationStatus, StudentActivity};

/// Coarse likelihood that a student proceeds with an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Intent {
    Low,
    Medium,
    High,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Low => "Low",
            Intent::Medium => "Medium",
            Intent::High => "High",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Points accumulated per intent bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntentIndicators {
    pub high: u32,
    pub medium: u32,
    pub low: u32,
}

impl IntentIndicators {
    pub fn collect(student: &StudentActivity) -> Self {
        let mut indicators = Self::default();
        let status = student.application_status;

        if student.documents_uploaded > 2 {
            indicators.high += 2;
        }
        if student.ai_questions_asked > 10 {
            indicators.high += 2;
        }
        if matches!(
            status,
            ApplicationStatus::Applying | ApplicationStatus::Submitted
        ) {
            indicators.high += 3;
        }
        if student.avg_session_duration > 15.0 {
            indicators.high += 1;
        }
        if student.university_shortlist.len() > 5 {
            indicators.high += 2;
        }

        if status == ApplicationStatus::Shortlisting {
            indicators.medium += 2;
        }
        if student.ai_questions_asked > 5 {
            indicators.medium += 1;
        }
        if student.sections_visited > 5 {
            indicators.medium += 1;
        }

        if status == ApplicationStatus::Exploring {
            indicators.low += 1;
        }
        if student.days_since_last_login > 7 {
            indicators.low += 2;
        }

        indicators
    }

    pub fn total(&self) -> u32 {
        self.high + self.medium + self.low
    }

    /// A record with no indicators at all classifies as `Low`.
    pub fn classify(&self) -> Intent {
        let total = self.total();
        if total == 0 {
            return Intent::Low;
        }

        let total = total as f64;
        if self.high as f64 / total > 0.6 {
            Intent::High
        } else if self.medium as f64 / total > 0.5 {
            Intent::Medium
        } else {
            Intent::Low
        }
    }
}

pub fn analyze_intent(student: &StudentActivity) -> Intent {
    IntentIndicators::collect(student).classify()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(status: ApplicationStatus) -> StudentActivity {
        StudentActivity {
            name: "Amara Okafor".to_string(),
            country: "Nigeria".to_string(),
            grade: 12,
            application_status: status,
            ..Default::default()
        }
    }

    #[test]
    fn zero_indicators_fall_back_to_low() {
        // every status adds points, so an empty tally never comes from a record
        let indicators = IntentIndicators::default();
        assert_eq!(indicators.total(), 0);
        assert_eq!(indicators.classify(), Intent::Low);
    }

    #[test]
    fn committed_applicant_is_high_intent() {
        let record = StudentActivity {
            documents_uploaded: 4,
            ai_questions_asked: 12,
            avg_session_duration: 25.0,
            ..student(ApplicationStatus::Applying)
        };
        let indicators = IntentIndicators::collect(&record);
        assert_eq!(
            indicators,
            IntentIndicators {
                high: 8,
                medium: 1,
                low: 0
            }
        );
        assert_eq!(analyze_intent(&record), Intent::High);
    }

    #[test]
    fn shortlisting_student_is_medium_intent() {
        let record = StudentActivity {
            ai_questions_asked: 6,
            sections_visited: 7,
            ..student(ApplicationStatus::Shortlisting)
        };
        assert_eq!(analyze_intent(&record), Intent::Medium);
    }

    #[test]
    fn idle_explorer_is_low_intent() {
        let record = StudentActivity {
            days_since_last_login: 12,
            ..student(ApplicationStatus::Exploring)
        };
        assert_eq!(analyze_intent(&record), Intent::Low);
    }

    #[test]
    fn ratio_must_exceed_threshold() {
        // high 3 of total 5 is exactly 0.6, which is not enough for High
        let indicators = IntentIndicators {
            high: 3,
            medium: 0,
            low: 2,
        };
        assert_eq!(indicators.classify(), Intent::Low);
    }

    #[test]
    fn large_shortlist_counts_toward_high() {
        let record = StudentActivity {
            university_shortlist: (0..6).map(|i| format!("University {i}")).collect(),
            ..student(ApplicationStatus::Submitted)
        };
        let indicators = IntentIndicators::collect(&record);
        assert_eq!(indicators.high, 5);
        assert_eq!(analyze_intent(&record), Intent::High);
    }
}
