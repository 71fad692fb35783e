use chrono::{Duration, NaiveDate};
use uuid::Uuid;

use crate::models::{FollowUpTask, TaskStatus};

const UPCOMING_WINDOW_DAYS: i64 = 7;

pub fn open_tasks_for_student(tasks: &[FollowUpTask], student_id: Uuid) -> Vec<&FollowUpTask> {
    tasks
        .iter()
        .filter(|task| task.student_id == student_id && task.status != TaskStatus::Completed)
        .collect()
}

/// Pending tasks due within the next week (overdue included), soonest first.
pub fn upcoming_tasks(tasks: &[FollowUpTask], today: NaiveDate) -> Vec<&FollowUpTask> {
    let horizon = today + Duration::days(UPCOMING_WINDOW_DAYS);
    let mut upcoming: Vec<&FollowUpTask> = tasks
        .iter()
        .filter(|task| task.status == TaskStatus::Pending && task.due_date <= horizon)
        .collect();
    upcoming.sort_by_key(|task| task.due_date);
    upcoming
}
