use serde::{Deserialize, Serialize};

use crate::models::{ApplicationStatus, Priority, StudentActivity};
use crate::scoring::{calculate_engagement_level, calculate_risk_score};

const TOP_N: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementTrends {
    pub engaged_students: usize,
    pub at_risk_students: usize,
    /// Percentage of engaged students, rounded to one decimal place.
    pub engagement_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryCount {
    pub country: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MajorCount {
    pub major: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageCount {
    pub status: ApplicationStatus,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendInsightKind {
    Warning,
    Opportunity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendInsight {
    pub kind: TrendInsightKind,
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub impact: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendReport {
    pub engagement: EngagementTrends,
    pub geographic: Vec<CountryCount>,
    pub academic: Vec<MajorCount>,
    pub timing: Vec<StageCount>,
    pub key_insights: Vec<TrendInsight>,
    pub recommendations: Vec<Recommendation>,
}

pub fn analyze_trends(students: &[StudentActivity]) -> TrendReport {
    let engagement = analyze_engagement(students);
    let geographic = top_countries(students);
    let academic = top_majors(students);
    let timing = stage_counts(students);
    let key_insights = trend_insights(&engagement, &geographic);
    let recommendations = trend_recommendations(&geographic);

    TrendReport {
        engagement,
        geographic,
        academic,
        timing,
        key_insights,
        recommendations,
    }
}

pub fn analyze_engagement(students: &[StudentActivity]) -> EngagementTrends {
    let engaged = students
        .iter()
        .filter(|student| calculate_engagement_level(student) > 60)
        .count();
    let at_risk = students
        .iter()
        .filter(|student| calculate_risk_score(student) > 50)
        .count();

    let engagement_rate = if students.is_empty() {
        0.0
    } else {
        (engaged as f64 / students.len() as f64 * 1000.0).round() / 10.0
    };

    EngagementTrends {
        engaged_students: engaged,
        at_risk_students: at_risk,
        engagement_rate,
    }
}

pub fn top_countries(students: &[StudentActivity]) -> Vec<CountryCount> {
    rank_by_frequency(students.iter().map(|student| student.country.as_str()))
        .into_iter()
        .take(TOP_N)
        .map(|(country, count)| CountryCount { country, count })
        .collect()
}

pub fn top_majors(students: &[StudentActivity]) -> Vec<MajorCount> {
    rank_by_frequency(
        students
            .iter()
            .flat_map(|student| student.interested_majors.iter().map(String::as_str)),
    )
    .into_iter()
    .take(TOP_N)
    .map(|(major, count)| MajorCount { major, count })
    .collect()
}

/// Students per application stage, in order of first appearance.
pub fn stage_counts(students: &[StudentActivity]) -> Vec<StageCount> {
    let mut counts: Vec<StageCount> = Vec::new();

    for student in students {
        match counts
            .iter_mut()
            .find(|entry| entry.status == student.application_status)
        {
            Some(entry) => entry.count += 1,
            None => counts.push(StageCount {
                status: student.application_status,
                count: 1,
            }),
        }
    }

    counts
}

/// Counts values and sorts by descending count; ties keep first-seen order.
fn rank_by_frequency<'a>(values: impl Iterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut index: std::collections::HashMap<&'a str, usize> = std::collections::HashMap::new();
    let mut ranked: Vec<(String, usize)> = Vec::new();

    for value in values {
        let next = ranked.len();
        let position = *index.entry(value).or_insert(next);
        if position == next {
            ranked.push((value.to_string(), 0));
        }
        ranked[position].1 += 1;
    }

    // sort_by is stable, which preserves first-seen order among equal counts
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

pub fn trend_insights(
    engagement: &EngagementTrends,
    geographic: &[CountryCount],
) -> Vec<TrendInsight> {
    let mut insights = Vec::new();

    if engagement.at_risk_students as f64 > engagement.engaged_students as f64 * 0.3 {
        insights.push(TrendInsight {
            kind: TrendInsightKind::Warning,
            title: "High At-Risk Population".to_string(),
            message: format!(
                "{} students are at risk of dropping off. Consider launching a re-engagement campaign.",
                engagement.at_risk_students
            ),
        });
    }

    if let [first, second, ..] = geographic {
        if first.count > second.count * 2 {
            insights.push(TrendInsight {
                kind: TrendInsightKind::Opportunity,
                title: "Geographic Concentration".to_string(),
                message: format!(
                    "{} represents a large portion of students. Consider localized content and support.",
                    first.country
                ),
            });
        }
    }

    insights
}

pub fn trend_recommendations(geographic: &[CountryCount]) -> Vec<Recommendation> {
    let top_markets = geographic
        .iter()
        .take(3)
        .map(|entry| entry.country.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    vec![
        Recommendation {
            title: "Weekly At-Risk Review".to_string(),
            description: "Implement weekly review of at-risk students for proactive intervention."
                .to_string(),
            priority: Priority::High,
            impact: "Reduce dropout rate by 25%".to_string(),
        },
        Recommendation {
            title: "Geographic Content Strategy".to_string(),
            description: format!(
                "Create region-specific content for top markets: {top_markets}."
            ),
            priority: Priority::Medium,
            impact: "Increase engagement by 15%".to_string(),
        },
    ]
}
