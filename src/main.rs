use std::path::PathBuf;

use anyhow::Context;
use applicant_funnel_insights::config::AppConfig;
use applicant_funnel_insights::models::{
    ApplicationStatus, Channel, Communication, FollowUpTask, NewStudent, Note, Priority,
    StudentActivity, TaskKind, TaskStatus,
};
use applicant_funnel_insights::{
    actions, db, filters, intent, report, scoring, tasks, telemetry, trends,
};
use applicant_funnel_insights::{AiEngine, StudentSummary};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "funnel-insights")]
#[command(about = "Applicant funnel tracker with heuristic engagement and risk scoring", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load a small demo roster
    Seed,
    /// Import or refresh students from a CSV roster
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Add a student to the roster
    AddStudent {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        country: String,
        #[arg(long, default_value_t = 11)]
        grade: i32,
        #[arg(long, default_value = "Exploring")]
        status: ApplicationStatus,
        #[arg(long)]
        gpa: Option<f64>,
        /// Interested major (repeatable)
        #[arg(long = "major")]
        majors: Vec<String>,
    },
    /// Replace a student's activity counters from a JSON record
    UpdateActivity {
        #[arg(long)]
        file: PathBuf,
    },
    /// Remove a student with their communications, notes and tasks
    Delete { id: Uuid },
    /// List the roster with scores
    List {
        #[arg(long)]
        status: Option<ApplicationStatus>,
    },
    /// Search by name, country, stage, major or intent (any term matches)
    Search {
        #[arg(default_value = "")]
        query: String,
    },
    /// Show the AI summary for one student
    Summary {
        id: Uuid,
        /// Pin the narrative template choice
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        json: bool,
    },
    /// Roster-wide engagement, geographic and stage trends
    Trends {
        #[arg(long)]
        json: bool,
    },
    /// Counts behind the smart filters
    Filters {
        #[arg(long)]
        json: bool,
    },
    /// Generate a markdown report
    Report {
        #[arg(long)]
        status: Option<ApplicationStatus>,
        #[arg(long, default_value = "funnel-report.md")]
        out: PathBuf,
    },
    /// Record an outreach to a student
    LogCommunication {
        #[arg(long)]
        student: Uuid,
        #[arg(long, default_value = "phone")]
        channel: Channel,
        #[arg(long)]
        content: String,
        /// Date of the outreach (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long, default_value = "completed")]
        status: String,
        #[arg(long)]
        duration: Option<String>,
        #[arg(long)]
        outcome: Option<String>,
    },
    /// Attach a note to a student
    AddNote {
        #[arg(long)]
        student: Uuid,
        #[arg(long)]
        content: String,
    },
    /// Schedule a follow-up task or reminder
    AddTask {
        #[arg(long)]
        student: Uuid,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        due: NaiveDate,
        #[arg(long, default_value = "medium")]
        priority: Priority,
        #[arg(long, default_value = "reminder")]
        kind: TaskKind,
        #[arg(long)]
        assigned_to: Option<String>,
    },
    /// Mark a pending task completed
    CompleteTask { id: Uuid },
    /// Show tasks due this week, or a student's open tasks
    Tasks {
        #[arg(long)]
        student: Option<Uuid>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config)?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .context("failed to connect to Postgres")?;
    info!(max_connections = config.max_connections, "connected to roster database");

    let operator = config.operator.as_str();

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(&pool, operator).await?;
            println!("Seed data inserted.");
        }
        Commands::Import { csv } => {
            let written = db::import_csv(&pool, &csv, operator).await?;
            println!("Imported {written} students from {}.", csv.display());
        }
        Commands::AddStudent {
            name,
            email,
            phone,
            country,
            grade,
            status,
            gpa,
            majors,
        } => {
            let student = NewStudent {
                name,
                email,
                phone,
                country,
                grade,
                application_status: status,
                gpa,
                interested_majors: majors,
            };
            let id = db::insert_student(&pool, &student, operator).await?;
            println!("Student created with id {id}.");
        }
        Commands::UpdateActivity { file } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let student: StudentActivity =
                serde_json::from_str(&raw).context("activity file is not a valid student record")?;
            if db::update_activity(&pool, &student).await? {
                println!("Activity updated for {}.", student.name);
            } else {
                warn!(id = %student.id, "activity update matched no student");
                println!("No student with id {}.", student.id);
            }
        }
        Commands::Delete { id } => {
            if db::delete_student(&pool, id).await? {
                println!("Student {id} deleted.");
            } else {
                println!("No student with id {id}.");
            }
        }
        Commands::List { status } => {
            let students = db::fetch_students(&pool, status).await?;
            print_roster(&students);
        }
        Commands::Search { query } => {
            let students = db::fetch_students(&pool, None).await?;
            let matches: Vec<StudentActivity> = filters::smart_search(&students, &query)
                .into_iter()
                .cloned()
                .collect();
            print_roster(&matches);
        }
        Commands::Summary { id, seed, json } => {
            show_summary(&pool, id, seed, json).await?;
        }
        Commands::Trends { json } => {
            let students = db::fetch_students(&pool, None).await?;
            let report = trends::analyze_trends(&students);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
                return Ok(());
            }

            println!(
                "Engaged: {} | At risk: {} | Engagement rate: {:.1}%",
                report.engagement.engaged_students,
                report.engagement.at_risk_students,
                report.engagement.engagement_rate
            );
            println!("Top countries:");
            for entry in &report.geographic {
                println!("- {}: {}", entry.country, entry.count);
            }
            println!("Top majors:");
            for entry in &report.academic {
                println!("- {}: {}", entry.major, entry.count);
            }
            println!("Stages:");
            for entry in &report.timing {
                println!("- {}: {}", entry.status, entry.count);
            }
            for insight in &report.key_insights {
                println!("! {}: {}", insight.title, insight.message);
            }
            for recommendation in &report.recommendations {
                println!(
                    "> {} ({}): {}",
                    recommendation.title, recommendation.priority, recommendation.description
                );
            }
        }
        Commands::Filters { json } => {
            let students = db::fetch_students(&pool, None).await?;
            let counts = filters::smart_filters(&students);
            if json {
                println!("{}", serde_json::to_string_pretty(&counts)?);
            } else {
                for (label, count) in counts.entries() {
                    println!("{label}: {count}");
                }
            }
        }
        Commands::Report { status, out } => {
            let students = db::fetch_students(&pool, status).await?;
            let all_tasks = db::fetch_tasks(&pool, None).await?;
            let scope = status.map(|value| value.as_str());
            let markdown =
                report::build_report(scope, Utc::now().date_naive(), &students, &all_tasks);
            std::fs::write(&out, markdown)?;
            println!("Report written to {}.", out.display());
        }
        Commands::LogCommunication {
            student,
            channel,
            content,
            date,
            status,
            duration,
            outcome,
        } => {
            require_student(&pool, student).await?;
            let entry = Communication {
                id: Uuid::new_v4(),
                student_id: student,
                channel,
                content,
                date: date.unwrap_or_else(|| Utc::now().date_naive()),
                status,
                duration,
                outcome,
                logged_by: operator.to_string(),
                logged_at: Utc::now(),
            };
            db::log_communication(&pool, &entry).await?;
            println!("Communication logged.");
        }
        Commands::AddNote { student, content } => {
            require_student(&pool, student).await?;
            let now = Utc::now();
            let note = Note {
                id: Uuid::new_v4(),
                student_id: student,
                content,
                author: operator.to_string(),
                date: now.date_naive(),
                created_at: now,
            };
            db::add_note(&pool, &note).await?;
            println!("Note added.");
        }
        Commands::AddTask {
            student,
            title,
            description,
            due,
            priority,
            kind,
            assigned_to,
        } => {
            require_student(&pool, student).await?;
            let task = FollowUpTask {
                id: Uuid::new_v4(),
                student_id: student,
                title,
                description,
                due_date: due,
                priority,
                kind,
                assigned_to: assigned_to.unwrap_or_else(|| operator.to_string()),
                status: TaskStatus::Pending,
                created_at: Utc::now(),
                completed_at: None,
            };
            db::create_task(&pool, &task).await?;
            println!("Task {} created, due {}.", task.id, task.due_date);
        }
        Commands::CompleteTask { id } => {
            if db::complete_task(&pool, id).await? {
                println!("Task {id} completed.");
            } else {
                println!("No pending task with id {id}.");
            }
        }
        Commands::Tasks { student } => {
            let all_tasks = db::fetch_tasks(&pool, student).await?;
            let listed = match student {
                Some(student_id) => tasks::open_tasks_for_student(&all_tasks, student_id),
                None => tasks::upcoming_tasks(&all_tasks, Utc::now().date_naive()),
            };

            if listed.is_empty() {
                println!("No pending tasks or reminders.");
                return Ok(());
            }

            for task in listed {
                println!(
                    "- [{}] {} due {} ({} priority, {}) id {}",
                    task.kind.as_str(),
                    task.title,
                    task.due_date,
                    task.priority,
                    task.assigned_to,
                    task.id
                );
            }
        }
    }

    Ok(())
}

async fn require_student(pool: &PgPool, id: Uuid) -> anyhow::Result<StudentActivity> {
    db::fetch_student(pool, id)
        .await?
        .with_context(|| format!("student {id} not found"))
}

fn print_roster(students: &[StudentActivity]) {
    if students.is_empty() {
        println!("No students found.");
        return;
    }

    for student in students {
        println!(
            "- {} ({}, {}) engagement {} risk {} intent {} id {}",
            student.name,
            student.country,
            student.application_status,
            scoring::calculate_engagement_level(student),
            scoring::calculate_risk_score(student),
            intent::analyze_intent(student),
            student.id
        );
    }
}

async fn show_summary(
    pool: &PgPool,
    id: Uuid,
    seed: Option<u64>,
    json: bool,
) -> anyhow::Result<()> {
    let student = require_student(pool, id).await?;
    let mut engine = match seed {
        Some(value) => AiEngine::seeded(value),
        None => AiEngine::from_entropy(),
    };
    let summary = engine.generate_student_summary(&student);
    let suggestions = actions::communication_suggestions(&student);
    let communications = db::fetch_communications(pool, id).await?;
    let notes = db::fetch_notes(pool, id).await?;
    let student_tasks = db::fetch_tasks(pool, Some(id)).await?;
    let open_tasks = tasks::open_tasks_for_student(&student_tasks, id);

    if json {
        let payload = serde_json::json!({
            "student": student,
            "summary": summary,
            "communicationSuggestions": suggestions,
            "communications": communications,
            "notes": notes,
            "openTasks": open_tasks,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    print_summary(&student, &summary);

    if !suggestions.is_empty() {
        println!("Suggested messages:");
        for suggestion in &suggestions {
            println!("- [{}] {}", suggestion.urgency, suggestion.subject);
        }
    }

    println!("Communications: {}", communications.len());
    for entry in communications.iter().rev().take(5) {
        println!(
            "- {} {} ({}): {}",
            entry.date, entry.channel, entry.status, entry.content
        );
    }

    println!("Notes: {}", notes.len());
    for note in notes.iter().rev().take(5) {
        println!("- {} by {}: {}", note.date, note.author, note.content);
    }

    if open_tasks.is_empty() {
        println!("No pending tasks or reminders.");
    } else {
        println!("Open tasks:");
        for task in open_tasks {
            println!("- {} due {} ({} priority)", task.title, task.due_date, task.priority);
        }
    }

    Ok(())
}

fn print_summary(student: &StudentActivity, summary: &StudentSummary) {
    println!(
        "{} ({}, grade {}, {})",
        student.name, student.country, student.grade, student.application_status
    );
    println!(
        "Engagement {} | Risk {} | Intent {}",
        summary.engagement_level, summary.risk_score, summary.intent
    );
    println!("{}", summary.summary);
    println!(
        "Next best action: {} [{} priority, {}, via {}]",
        summary.next_best_action.title,
        summary.next_best_action.priority,
        summary.next_best_action.timeframe,
        summary.next_best_action.channel
    );
    println!("  {}", summary.next_best_action.description);

    for insight in &summary.key_insights {
        println!("{} {}", insight.icon, insight.text);
    }
    for flag in &summary.urgency_flags {
        println!("! [{}] {}", flag.severity, flag.message);
    }
}
