use anyhow::Context;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{
    ApplicationStatus, Channel, Communication, EngagementTrend, FollowUpTask, NewStudent, Note,
    Priority, StudentActivity, TaskKind, TaskStatus,
};

const STUDENT_COLUMNS: &str = "id, full_name, email, phone, country, grade, application_status, \
     gpa, login_count_30_days, days_since_last_login, ai_questions_asked, documents_uploaded, \
     avg_session_duration, sections_visited, communication_response_rate, engagement_trend, \
     days_in_current_stage, days_since_last_contact, interested_majors, university_shortlist, \
     questions_asked";

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("roster schema migrated");
    Ok(())
}

pub async fn seed(pool: &PgPool, operator: &str) -> anyhow::Result<()> {
    let students = demo_roster()?;

    let mut stored_ids = Vec::with_capacity(students.len());
    for student in &students {
        stored_ids.push(upsert_student(pool, student, operator).await?);
    }

    // An existing row with the same email keeps its own id.
    let emma = stored_ids
        .get(1)
        .copied()
        .context("demo roster is missing its shortlisting student")?;
    let (communication, note, task) = demo_follow_ups(emma, Utc::now(), operator)?;

    sqlx::query(
        r#"
        INSERT INTO funnel.communications
        (id, student_id, channel, content, occurred_on, status, duration, outcome, logged_by,
         logged_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(communication.id)
    .bind(communication.student_id)
    .bind(communication.channel.as_str())
    .bind(&communication.content)
    .bind(communication.date)
    .bind(&communication.status)
    .bind(&communication.duration)
    .bind(&communication.outcome)
    .bind(&communication.logged_by)
    .bind(communication.logged_at)
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO funnel.notes (id, student_id, content, author, noted_on, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(note.id)
    .bind(note.student_id)
    .bind(&note.content)
    .bind(&note.author)
    .bind(note.date)
    .bind(note.created_at)
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO funnel.tasks
        (id, student_id, title, description, due_date, priority, kind, assigned_to, status,
         created_at, completed_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(task.id)
    .bind(task.student_id)
    .bind(&task.title)
    .bind(&task.description)
    .bind(task.due_date)
    .bind(task.priority.as_str())
    .bind(task.kind.as_str())
    .bind(&task.assigned_to)
    .bind(task.status.as_str())
    .bind(task.created_at)
    .bind(task.completed_at)
    .execute(pool)
    .await?;

    info!(students = students.len(), %emma, "seeded demo roster");
    Ok(())
}

fn demo_roster() -> anyhow::Result<Vec<StudentActivity>> {
    Ok(vec![
        StudentActivity {
            id: Uuid::parse_str("218ada60-ee6c-41dd-9e62-1e12e465dcf4")?,
            name: "Aarav Sharma".to_string(),
            email: "aarav.sharma@example.com".to_string(),
            phone: Some("+91 98200 11111".to_string()),
            country: "India".to_string(),
            grade: 12,
            application_status: ApplicationStatus::Applying,
            gpa: Some(3.85),
            login_count_30_days: 22,
            days_since_last_login: 1,
            ai_questions_asked: 19,
            documents_uploaded: 3,
            avg_session_duration: 24.0,
            sections_visited: 9,
            communication_response_rate: 0.85,
            engagement_trend: EngagementTrend::Increasing,
            days_in_current_stage: 12,
            days_since_last_contact: 3,
            interested_majors: vec!["Engineering".to_string(), "Computer Science".to_string()],
            university_shortlist: vec![
                "MIT".to_string(),
                "Stanford".to_string(),
                "Georgia Tech".to_string(),
                "UIUC".to_string(),
                "Purdue".to_string(),
                "CMU".to_string(),
            ],
            questions_asked: vec![
                "What financial aid do US universities offer internationals?".to_string(),
                "How long should my supplemental essay be?".to_string(),
            ],
        },
        StudentActivity {
            id: Uuid::parse_str("19de6b82-c8ca-4905-9861-f286c5b67d21")?,
            name: "Emma Müller".to_string(),
            email: "emma.mueller@example.com".to_string(),
            phone: Some("+49 151 2222222".to_string()),
            country: "Germany".to_string(),
            grade: 11,
            application_status: ApplicationStatus::Shortlisting,
            gpa: Some(3.4),
            login_count_30_days: 3,
            days_since_last_login: 17,
            ai_questions_asked: 4,
            documents_uploaded: 0,
            avg_session_duration: 6.0,
            sections_visited: 3,
            communication_response_rate: 0.2,
            engagement_trend: EngagementTrend::Declining,
            days_in_current_stage: 30,
            days_since_last_contact: 14,
            interested_majors: vec!["Economics".to_string()],
            university_shortlist: vec!["LSE".to_string()],
            questions_asked: vec!["Do I need the SAT?".to_string()],
        },
        StudentActivity {
            id: Uuid::parse_str("9c69dac2-60b2-4d66-824b-68aa676f660a")?,
            name: "Lucas Oliveira".to_string(),
            email: "lucas.oliveira@example.com".to_string(),
            phone: Some("+55 11 93333 3333".to_string()),
            country: "Brazil".to_string(),
            grade: 11,
            application_status: ApplicationStatus::Exploring,
            gpa: None,
            login_count_30_days: 8,
            days_since_last_login: 5,
            ai_questions_asked: 2,
            documents_uploaded: 0,
            avg_session_duration: 11.0,
            sections_visited: 6,
            communication_response_rate: 0.5,
            engagement_trend: EngagementTrend::Stable,
            days_in_current_stage: 9,
            days_since_last_contact: 6,
            interested_majors: vec!["Biology".to_string()],
            university_shortlist: Vec::new(),
            questions_asked: vec!["Are there scholarships for premed?".to_string()],
        },
    ])
}

/// Outreach history for the seeded shortlisting student, attached to `student_id`.
fn demo_follow_ups(
    student_id: Uuid,
    now: DateTime<Utc>,
    operator: &str,
) -> anyhow::Result<(Communication, Note, FollowUpTask)> {
    let today = now.date_naive();

    let communication = Communication {
        id: Uuid::parse_str("4e7909ba-85bd-4c0d-8bc3-050115c8604f")?,
        student_id,
        channel: Channel::Email,
        content: "Sent shortlisting workshop invite".to_string(),
        date: today - Duration::days(14),
        status: "sent".to_string(),
        duration: None,
        outcome: None,
        logged_by: operator.to_string(),
        logged_at: now,
    };
    let note = Note {
        id: Uuid::parse_str("16281734-d872-4b07-b280-54db0b2dafd4")?,
        student_id,
        content: "Parents prefer universities in Europe.".to_string(),
        author: operator.to_string(),
        date: today - Duration::days(10),
        created_at: now,
    };
    let task = FollowUpTask {
        id: Uuid::parse_str("ca2742bc-8415-4a89-89b5-e2a36a3d91b4")?,
        student_id,
        title: "Re-engagement call".to_string(),
        description: "Walk through shortlist options".to_string(),
        due_date: today + Duration::days(1),
        priority: Priority::High,
        kind: TaskKind::Call,
        assigned_to: operator.to_string(),
        status: TaskStatus::Pending,
        created_at: now,
        completed_at: None,
    };

    Ok((communication, note, task))
}

/// Inserts or refreshes a student keyed by email. Returns the stored id.
async fn upsert_student(
    pool: &PgPool,
    student: &StudentActivity,
    operator: &str,
) -> anyhow::Result<Uuid> {
    let id: Uuid = sqlx::query(
        r#"
        INSERT INTO funnel.students
        (id, full_name, email, phone, country, grade, application_status, gpa,
         login_count_30_days, days_since_last_login, ai_questions_asked, documents_uploaded,
         avg_session_duration, sections_visited, communication_response_rate, engagement_trend,
         days_in_current_stage, days_since_last_contact, interested_majors,
         university_shortlist, questions_asked, created_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17,
                $18, $19, $20, $21, $22)
        ON CONFLICT (email) DO UPDATE
        SET full_name = EXCLUDED.full_name,
            phone = EXCLUDED.phone,
            country = EXCLUDED.country,
            grade = EXCLUDED.grade,
            application_status = EXCLUDED.application_status,
            gpa = EXCLUDED.gpa,
            login_count_30_days = EXCLUDED.login_count_30_days,
            days_since_last_login = EXCLUDED.days_since_last_login,
            ai_questions_asked = EXCLUDED.ai_questions_asked,
            documents_uploaded = EXCLUDED.documents_uploaded,
            avg_session_duration = EXCLUDED.avg_session_duration,
            sections_visited = EXCLUDED.sections_visited,
            communication_response_rate = EXCLUDED.communication_response_rate,
            engagement_trend = EXCLUDED.engagement_trend,
            days_in_current_stage = EXCLUDED.days_in_current_stage,
            days_since_last_contact = EXCLUDED.days_since_last_contact,
            interested_majors = EXCLUDED.interested_majors,
            university_shortlist = EXCLUDED.university_shortlist,
            questions_asked = EXCLUDED.questions_asked,
            updated_at = now()
        RETURNING id
        "#,
    )
    .bind(student.id)
    .bind(&student.name)
    .bind(&student.email)
    .bind(&student.phone)
    .bind(&student.country)
    .bind(student.grade)
    .bind(student.application_status.as_str())
    .bind(student.gpa)
    .bind(student.login_count_30_days)
    .bind(student.days_since_last_login)
    .bind(student.ai_questions_asked)
    .bind(student.documents_uploaded)
    .bind(student.avg_session_duration)
    .bind(student.sections_visited)
    .bind(student.communication_response_rate)
    .bind(student.engagement_trend.as_str())
    .bind(student.days_in_current_stage)
    .bind(student.days_since_last_contact)
    .bind(&student.interested_majors)
    .bind(&student.university_shortlist)
    .bind(&student.questions_asked)
    .bind(operator)
    .fetch_one(pool)
    .await?
    .get("id");

    Ok(id)
}

pub async fn insert_student(
    pool: &PgPool,
    student: &NewStudent,
    operator: &str,
) -> anyhow::Result<Uuid> {
    student.validate()?;

    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO funnel.students
        (id, full_name, email, phone, country, grade, application_status, gpa,
         interested_majors, created_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(id)
    .bind(student.name.trim())
    .bind(student.email.trim())
    .bind(student.phone.trim())
    .bind(student.country.trim())
    .bind(student.grade)
    .bind(student.application_status.as_str())
    .bind(student.gpa)
    .bind(&student.interested_majors)
    .bind(operator)
    .execute(pool)
    .await
    .with_context(|| format!("failed to create student {}", student.email))?;

    info!(%id, email = %student.email, created_by = operator, "student created");
    Ok(id)
}

pub async fn fetch_student(pool: &PgPool, id: Uuid) -> anyhow::Result<Option<StudentActivity>> {
    let query = format!("SELECT {STUDENT_COLUMNS} FROM funnel.students WHERE id = $1");
    let row = sqlx::query(&query).bind(id).fetch_optional(pool).await?;
    row.as_ref().map(student_from_row).transpose()
}

pub async fn fetch_students(
    pool: &PgPool,
    status: Option<ApplicationStatus>,
) -> anyhow::Result<Vec<StudentActivity>> {
    let mut query = format!("SELECT {STUDENT_COLUMNS} FROM funnel.students");
    if status.is_some() {
        query.push_str(" WHERE application_status = $1");
    }
    query.push_str(" ORDER BY created_at, full_name");

    let mut rows = sqlx::query(&query);
    if let Some(value) = status {
        rows = rows.bind(value.as_str());
    }

    let records = rows.fetch_all(pool).await?;
    let mut students = Vec::with_capacity(records.len());
    for row in &records {
        students.push(student_from_row(row)?);
    }

    debug!(count = students.len(), "fetched roster");
    Ok(students)
}

/// Overwrites the activity counters of an existing student.
pub async fn update_activity(pool: &PgPool, student: &StudentActivity) -> anyhow::Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE funnel.students
        SET application_status = $2,
            login_count_30_days = $3,
            days_since_last_login = $4,
            ai_questions_asked = $5,
            documents_uploaded = $6,
            avg_session_duration = $7,
            sections_visited = $8,
            communication_response_rate = $9,
            engagement_trend = $10,
            days_in_current_stage = $11,
            days_since_last_contact = $12,
            interested_majors = $13,
            university_shortlist = $14,
            questions_asked = $15,
            updated_at = now()
        WHERE id = $1
        "#,
    )
    .bind(student.id)
    .bind(student.application_status.as_str())
    .bind(student.login_count_30_days)
    .bind(student.days_since_last_login)
    .bind(student.ai_questions_asked)
    .bind(student.documents_uploaded)
    .bind(student.avg_session_duration)
    .bind(student.sections_visited)
    .bind(student.communication_response_rate)
    .bind(student.engagement_trend.as_str())
    .bind(student.days_in_current_stage)
    .bind(student.days_since_last_contact)
    .bind(&student.interested_majors)
    .bind(&student.university_shortlist)
    .bind(&student.questions_asked)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn delete_student(pool: &PgPool, id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM funnel.students WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() > 0 {
        info!(%id, "student deleted");
    }
    Ok(result.rows_affected() > 0)
}

fn student_from_row(row: &PgRow) -> anyhow::Result<StudentActivity> {
    let status: String = row.get("application_status");
    let trend: String = row.get("engagement_trend");

    Ok(StudentActivity {
        id: row.get("id"),
        name: row.get("full_name"),
        email: row.get("email"),
        phone: row.get("phone"),
        country: row.get("country"),
        grade: row.get("grade"),
        application_status: status
            .parse()
            .with_context(|| format!("stored status '{status}' is not recognized"))?,
        gpa: row.get("gpa"),
        login_count_30_days: row.get("login_count_30_days"),
        days_since_last_login: row.get("days_since_last_login"),
        ai_questions_asked: row.get("ai_questions_asked"),
        documents_uploaded: row.get("documents_uploaded"),
        avg_session_duration: row.get("avg_session_duration"),
        sections_visited: row.get("sections_visited"),
        communication_response_rate: row.get("communication_response_rate"),
        engagement_trend: EngagementTrend::from(trend),
        days_in_current_stage: row.get("days_in_current_stage"),
        days_since_last_contact: row.get("days_since_last_contact"),
        interested_majors: row.get("interested_majors"),
        university_shortlist: row.get("university_shortlist"),
        questions_asked: row.get("questions_asked"),
    })
}

pub async fn import_csv(
    pool: &PgPool,
    csv_path: &std::path::Path,
    operator: &str,
) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        full_name: String,
        email: String,
        phone: Option<String>,
        country: String,
        grade: i32,
        application_status: String,
        gpa: Option<f64>,
        login_count_30_days: i32,
        days_since_last_login: i32,
        ai_questions_asked: i32,
        documents_uploaded: i32,
        avg_session_duration: f64,
        sections_visited: i32,
        communication_response_rate: f64,
        engagement_trend: Option<String>,
        days_in_current_stage: i32,
        days_since_last_contact: i32,
        interested_majors: Option<String>,
        university_shortlist: Option<String>,
        questions_asked: Option<String>,
    }

    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let mut written = 0usize;

    for (line, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result.with_context(|| format!("malformed roster row {}", line + 1))?;
        let student = StudentActivity {
            id: Uuid::new_v4(),
            application_status: row
                .application_status
                .parse()
                .with_context(|| format!("roster row {}", line + 1))?,
            name: row.full_name,
            email: row.email,
            phone: row.phone.filter(|phone| !phone.trim().is_empty()),
            country: row.country,
            grade: row.grade,
            gpa: row.gpa,
            login_count_30_days: row.login_count_30_days,
            days_since_last_login: row.days_since_last_login,
            ai_questions_asked: row.ai_questions_asked,
            documents_uploaded: row.documents_uploaded,
            avg_session_duration: row.avg_session_duration,
            sections_visited: row.sections_visited,
            communication_response_rate: row.communication_response_rate,
            engagement_trend: row
                .engagement_trend
                .as_deref()
                .map(EngagementTrend::from)
                .unwrap_or_default(),
            days_in_current_stage: row.days_in_current_stage,
            days_since_last_contact: row.days_since_last_contact,
            interested_majors: split_list(row.interested_majors.as_deref()),
            university_shortlist: split_list(row.university_shortlist.as_deref()),
            questions_asked: split_list(row.questions_asked.as_deref()),
        };

        upsert_student(pool, &student, operator).await?;
        written += 1;
    }

    info!(rows = written, path = %csv_path.display(), "imported roster csv");
    Ok(written)
}

/// Splits a `;`-separated CSV cell into trimmed, non-empty entries.
pub fn split_list(cell: Option<&str>) -> Vec<String> {
    cell.map(|value| {
        value
            .split(';')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

pub async fn log_communication(pool: &PgPool, entry: &Communication) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO funnel.communications
        (id, student_id, channel, content, occurred_on, status, duration, outcome, logged_by,
         logged_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(entry.id)
    .bind(entry.student_id)
    .bind(entry.channel.as_str())
    .bind(&entry.content)
    .bind(entry.date)
    .bind(&entry.status)
    .bind(&entry.duration)
    .bind(&entry.outcome)
    .bind(&entry.logged_by)
    .bind(entry.logged_at)
    .execute(pool)
    .await
    .with_context(|| format!("failed to log communication for {}", entry.student_id))?;

    info!(student_id = %entry.student_id, channel = %entry.channel, "communication logged");
    Ok(())
}

pub async fn fetch_communications(
    pool: &PgPool,
    student_id: Uuid,
) -> anyhow::Result<Vec<Communication>> {
    let records = sqlx::query(
        r#"
        SELECT id, student_id, channel, content, occurred_on, status, duration, outcome,
               logged_by, logged_at
        FROM funnel.communications
        WHERE student_id = $1
        ORDER BY occurred_on, logged_at
        "#,
    )
    .bind(student_id)
    .fetch_all(pool)
    .await?;

    let mut communications = Vec::with_capacity(records.len());
    for row in records {
        let channel: String = row.get("channel");
        communications.push(Communication {
            id: row.get("id"),
            student_id: row.get("student_id"),
            channel: channel.parse()?,
            content: row.get("content"),
            date: row.get("occurred_on"),
            status: row.get("status"),
            duration: row.get("duration"),
            outcome: row.get("outcome"),
            logged_by: row.get("logged_by"),
            logged_at: row.get("logged_at"),
        });
    }

    Ok(communications)
}

pub async fn add_note(pool: &PgPool, note: &Note) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO funnel.notes (id, student_id, content, author, noted_on, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(note.id)
    .bind(note.student_id)
    .bind(&note.content)
    .bind(&note.author)
    .bind(note.date)
    .bind(note.created_at)
    .execute(pool)
    .await
    .with_context(|| format!("failed to add note for {}", note.student_id))?;

    info!(student_id = %note.student_id, author = %note.author, "note added");
    Ok(())
}

pub async fn fetch_notes(pool: &PgPool, student_id: Uuid) -> anyhow::Result<Vec<Note>> {
    let records = sqlx::query(
        r#"
        SELECT id, student_id, content, author, noted_on, created_at
        FROM funnel.notes
        WHERE student_id = $1
        ORDER BY noted_on, created_at
        "#,
    )
    .bind(student_id)
    .fetch_all(pool)
    .await?;

    Ok(records
        .into_iter()
        .map(|row| Note {
            id: row.get("id"),
            student_id: row.get("student_id"),
            content: row.get("content"),
            author: row.get("author"),
            date: row.get("noted_on"),
            created_at: row.get("created_at"),
        })
        .collect())
}

pub async fn create_task(pool: &PgPool, task: &FollowUpTask) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO funnel.tasks
        (id, student_id, title, description, due_date, priority, kind, assigned_to, status,
         created_at, completed_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        "#,
    )
    .bind(task.id)
    .bind(task.student_id)
    .bind(&task.title)
    .bind(&task.description)
    .bind(task.due_date)
    .bind(task.priority.as_str())
    .bind(task.kind.as_str())
    .bind(&task.assigned_to)
    .bind(task.status.as_str())
    .bind(task.created_at)
    .bind(task.completed_at)
    .execute(pool)
    .await
    .with_context(|| format!("failed to create task '{}'", task.title))?;

    info!(task_id = %task.id, student_id = %task.student_id, due = %task.due_date, "task created");
    Ok(())
}

/// Marks a pending task completed. Returns false when no pending task matched.
pub async fn complete_task(pool: &PgPool, task_id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE funnel.tasks
        SET status = 'completed', completed_at = now()
        WHERE id = $1 AND status = 'pending'
        "#,
    )
    .bind(task_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn fetch_tasks(
    pool: &PgPool,
    student_id: Option<Uuid>,
) -> anyhow::Result<Vec<FollowUpTask>> {
    let mut query = String::from(
        "SELECT id, student_id, title, description, due_date, priority, kind, assigned_to, \
         status, created_at, completed_at FROM funnel.tasks",
    );
    if student_id.is_some() {
        query.push_str(" WHERE student_id = $1");
    }
    query.push_str(" ORDER BY due_date, created_at");

    let mut rows = sqlx::query(&query);
    if let Some(value) = student_id {
        rows = rows.bind(value);
    }

    let records = rows.fetch_all(pool).await?;
    let mut tasks = Vec::with_capacity(records.len());
    for row in records {
        let priority: String = row.get("priority");
        let kind: String = row.get("kind");
        let status: String = row.get("status");
        let due_date: NaiveDate = row.get("due_date");
        tasks.push(FollowUpTask {
            id: row.get("id"),
            student_id: row.get("student_id"),
            title: row.get("title"),
            description: row.get("description"),
            due_date,
            priority: priority.parse()?,
            kind: kind.parse()?,
            assigned_to: row.get("assigned_to"),
            status: status.parse()?,
            created_at: row.get("created_at"),
            completed_at: row.get("completed_at"),
        });
    }

    Ok(tasks)
}
