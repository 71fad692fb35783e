use std::fmt::Write;

use chrono::NaiveDate;

use crate::actions::next_best_action;
use crate::filters::smart_filters;
use crate::models::{FollowUpTask, StudentActivity};
use crate::scoring::{calculate_engagement_level, calculate_risk_score};
use crate::tasks::upcoming_tasks;
use crate::trends::analyze_trends;

const HIGHEST_RISK_LIMIT: usize = 10;

/// Students ordered by descending risk score; ties keep roster order.
pub fn rank_by_risk(students: &[StudentActivity]) -> Vec<(&StudentActivity, u8)> {
    let mut ranked: Vec<(&StudentActivity, u8)> = students
        .iter()
        .map(|student| (student, calculate_risk_score(student)))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

pub fn build_report(
    scope: Option<&str>,
    generated_on: NaiveDate,
    students: &[StudentActivity],
    tasks: &[FollowUpTask],
) -> String {
    let trends = analyze_trends(students);
    let filters = smart_filters(students);

    let mut output = String::new();
    let scope_label = scope.unwrap_or("all stages");

    let _ = writeln!(output, "# Applicant Funnel Report");
    let _ = writeln!(
        output,
        "Generated for {} on {} ({} students)",
        scope_label,
        generated_on,
        students.len()
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Engagement Overview");
    let _ = writeln!(
        output,
        "- Engaged students: {} ({:.1}% of roster)",
        trends.engagement.engaged_students, trends.engagement.engagement_rate
    );
    let _ = writeln!(
        output,
        "- At-risk students: {}",
        trends.engagement.at_risk_students
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Stage Mix");
    if trends.timing.is_empty() {
        let _ = writeln!(output, "No students on the roster.");
    } else {
        for stage in &trends.timing {
            let _ = writeln!(output, "- {}: {}", stage.status, stage.count);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Top Countries");
    if trends.geographic.is_empty() {
        let _ = writeln!(output, "No countries recorded.");
    } else {
        for entry in &trends.geographic {
            let _ = writeln!(output, "- {}: {}", entry.country, entry.count);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Top Majors");
    if trends.academic.is_empty() {
        let _ = writeln!(output, "No majors recorded.");
    } else {
        for entry in &trends.academic {
            let _ = writeln!(output, "- {}: {}", entry.major, entry.count);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Smart Filters");
    for (label, count) in filters.entries() {
        let _ = writeln!(output, "- {label}: {count}");
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Highest Risk Students");
    let at_risk: Vec<_> = rank_by_risk(students)
        .into_iter()
        .filter(|(_, risk)| *risk > 0)
        .take(HIGHEST_RISK_LIMIT)
        .collect();
    if at_risk.is_empty() {
        let _ = writeln!(output, "No students show risk signals.");
    } else {
        for (student, risk) in at_risk {
            let action = next_best_action(student);
            let _ = writeln!(
                output,
                "- {} ({}, {}) risk {} / engagement {}: {} ({}, {})",
                student.name,
                student.country,
                student.application_status,
                risk,
                calculate_engagement_level(student),
                action.title,
                action.priority,
                action.timeframe
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Trend Insights");
    if trends.key_insights.is_empty() {
        let _ = writeln!(output, "No roster-wide warnings.");
    } else {
        for insight in &trends.key_insights {
            let _ = writeln!(output, "- **{}**: {}", insight.title, insight.message);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recommendations");
    for recommendation in &trends.recommendations {
        let _ = writeln!(
            output,
            "- **{}** ({} priority): {} Impact: {}.",
            recommendation.title,
            recommendation.priority,
            recommendation.description,
            recommendation.impact
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Upcoming Tasks");
    let upcoming: Vec<(&FollowUpTask, &str)> = upcoming_tasks(tasks, generated_on)
        .into_iter()
        .filter_map(|task| {
            students
                .iter()
                .find(|student| student.id == task.student_id)
                .map(|student| (task, student.name.as_str()))
        })
        .collect();
    if upcoming.is_empty() {
        let _ = writeln!(output, "No pending tasks due this week.");
    } else {
        for (task, student_name) in upcoming {
            let _ = writeln!(
                output,
                "- {} for {} due {} ({} priority)",
                task.title, student_name, task.due_date, task.priority
            );
        }
    }

    output
}
