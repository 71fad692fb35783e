use crate::models::{EngagementTrend, StudentActivity};

const LOGIN_WEIGHT: f64 = 25.0;
const QUESTION_WEIGHT: f64 = 20.0;
const DOCUMENT_WEIGHT: f64 = 20.0;
const SESSION_WEIGHT: f64 = 15.0;
const EXPLORATION_WEIGHT: f64 = 10.0;
const RESPONSE_WEIGHT: f64 = 10.0;

/// Engagement level on a 0-100 scale from six weighted activity signals.
///
/// Documents and exploration are capped at their point allotment rather than
/// scaled as a percentage, so both saturate early (docs at 0.8 uploads).
pub fn calculate_engagement_level(student: &StudentActivity) -> u8 {
    let login = percentage(student.login_count_30_days as f64 * 3.0) * LOGIN_WEIGHT / 100.0;
    let questions = percentage(student.ai_questions_asked as f64 * 5.0) * QUESTION_WEIGHT / 100.0;
    let documents = (student.documents_uploaded as f64 * 25.0).min(DOCUMENT_WEIGHT);
    let session = percentage(student.avg_session_duration * 2.0) * SESSION_WEIGHT / 100.0;
    let exploration =
        (student.sections_visited as f64 / 10.0 * 100.0).min(EXPLORATION_WEIGHT);
    let response = student.communication_response_rate * 100.0 * RESPONSE_WEIGHT / 100.0;

    let total = login + questions + documents + session + exploration + response;
    clamp_score(total)
}

/// Risk of dropping out of the funnel on a 0-100 scale. Higher is riskier.
pub fn calculate_risk_score(student: &StudentActivity) -> u8 {
    let mut risk = inactivity_points(student.days_since_last_login);
    risk += stagnation_points(student.days_in_current_stage);

    if student.engagement_trend == EngagementTrend::Declining {
        risk += 20;
    }

    if student.days_since_last_contact > 10 {
        risk += 10;
    }

    risk.min(100) as u8
}

pub fn inactivity_points(days_since_last_login: i32) -> u32 {
    match days_since_last_login {
        d if d > 14 => 40,
        d if d > 7 => 20,
        d if d > 3 => 10,
        _ => 0,
    }
}

pub fn stagnation_points(days_in_current_stage: i32) -> u32 {
    match days_in_current_stage {
        d if d > 21 => 30,
        d if d > 14 => 15,
        _ => 0,
    }
}

fn percentage(value: f64) -> f64 {
    value.min(100.0)
}

fn clamp_score(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_student() -> StudentActivity {
        StudentActivity {
            name: "Mei Chen".to_string(),
            country: "China".to_string(),
            grade: 11,
            ..Default::default()
        }
    }

    #[test]
    fn inactivity_follows_expected_tiers() {
        assert_eq!(inactivity_points(15), 40);
        assert_eq!(inactivity_points(14), 20);
        assert_eq!(inactivity_points(8), 20);
        assert_eq!(inactivity_points(7), 10);
        assert_eq!(inactivity_points(4), 10);
        assert_eq!(inactivity_points(3), 0);
    }

    #[test]
    fn stagnation_follows_expected_tiers() {
        assert_eq!(stagnation_points(22), 30);
        assert_eq!(stagnation_points(21), 15);
        assert_eq!(stagnation_points(15), 15);
        assert_eq!(stagnation_points(14), 0);
    }

    #[test]
    fn risk_accumulates_all_signals() {
        let student = StudentActivity {
            days_since_last_login: 20,
            days_in_current_stage: 30,
            engagement_trend: EngagementTrend::Declining,
            days_since_last_contact: 11,
            ..quiet_student()
        };
        assert_eq!(calculate_risk_score(&student), 100);

        let partial = StudentActivity {
            days_since_last_login: 8,
            days_in_current_stage: 16,
            ..quiet_student()
        };
        assert_eq!(calculate_risk_score(&partial), 35);
    }

    #[test]
    fn engagement_sums_weighted_signals() {
        let student = StudentActivity {
            login_count_30_days: 10,
            ai_questions_asked: 8,
            documents_uploaded: 1,
            avg_session_duration: 20.0,
            sections_visited: 4,
            communication_response_rate: 0.5,
            ..quiet_student()
        };
        // 30*0.25 + 40*0.20 + 20 + 40*0.15 + 10 + 50*0.10 = 56.5
        assert_eq!(calculate_engagement_level(&student), 57);
    }

    #[test]
    fn document_signal_saturates_after_first_upload() {
        let one = StudentActivity {
            documents_uploaded: 1,
            ..quiet_student()
        };
        let five = StudentActivity {
            documents_uploaded: 5,
            ..quiet_student()
        };
        assert_eq!(calculate_engagement_level(&one), 20);
        assert_eq!(calculate_engagement_level(&five), 20);
    }

    #[test]
    fn engagement_is_capped_at_one_hundred() {
        let student = StudentActivity {
            login_count_30_days: 90,
            ai_questions_asked: 90,
            documents_uploaded: 9,
            avg_session_duration: 120.0,
            sections_visited: 40,
            communication_response_rate: 1.0,
            ..quiet_student()
        };
        assert_eq!(calculate_engagement_level(&student), 100);
    }

    #[test]
    fn malformed_counts_stay_in_range() {
        let student = StudentActivity {
            login_count_30_days: -50,
            ai_questions_asked: -10,
            documents_uploaded: -3,
            avg_session_duration: -5.0,
            sections_visited: -2,
            communication_response_rate: -1.0,
            days_since_last_login: -4,
            ..quiet_student()
        };
        assert_eq!(calculate_engagement_level(&student), 0);
        assert_eq!(calculate_risk_score(&student), 0);
    }

    #[test]
    fn scores_are_deterministic() {
        let student = StudentActivity {
            login_count_30_days: 7,
            ai_questions_asked: 3,
            days_since_last_login: 9,
            ..quiet_student()
        };
        let first = (
            calculate_engagement_level(&student),
            calculate_risk_score(&student),
        );
        for _ in 0..5 {
            assert_eq!(
                first,
                (
                    calculate_engagement_level(&student),
                    calculate_risk_score(&student)
                )
            );
        }
    }

    #[test]
    fn more_logins_never_lower_engagement() {
        let mut previous = 0;
        for logins in 0..60 {
            let student = StudentActivity {
                login_count_30_days: logins,
                ai_questions_asked: 4,
                avg_session_duration: 12.0,
                ..quiet_student()
            };
            let level = calculate_engagement_level(&student);
            assert!(level >= previous, "logins {logins} dropped engagement");
            previous = level;
        }
    }
}
