//! Task API example
//!
//! Serves one seeded `tasks` collection:
//! - `PATCH /tasks` with a JSON body
//! - `GET /tasks?page=1&limit=10&sort=due_date:asc&filter={"status":"open"}`
//!
//! Set `PAGEQUERY_CONFIG` to a YAML file to override limits and the filter
//! policy.

use anyhow::Result;
use chrono::Duration;
use pagequery::prelude::*;
use tracing_subscriber::EnvFilter;

sort_fields! {
    pub enum TaskSort {
        CreatedAt => "created_at",
        DueDate => "due_date",
        Title => "title",
        Priority => "priority",
    }
    default CreatedAt
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: i64,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl_record!(Task, id, {
    "title" => title,
    "description" => description,
    "status" => status,
    "priority" => priority,
    "due_date" => due_date,
    "created_at" => created_at,
});

pub struct Tasks;

impl Collection for Tasks {
    type Record = Task;
    type Sort = TaskSort;

    fn resource_name() -> &'static str {
        "tasks"
    }

    fn filterable_fields() -> &'static [FieldSpec] {
        const { &[
            FieldSpec::new("status", FieldKind::String),
            FieldSpec::new("priority", FieldKind::Integer),
            FieldSpec::new("due_date", FieldKind::DateTime),
            FieldSpec::new("title", FieldKind::String),
        ] }
    }

    fn search_fields() -> &'static [&'static str] {
        &["title", "description"]
    }
}

fn seed(store: &InMemoryRecordStore<Task>) -> Result<()> {
    let now = Utc::now();
    let statuses = ["open", "in_progress", "blocked", "done"];

    let tasks = (0..120).map(|i: i64| Task {
        id: Uuid::new_v4(),
        title: format!("Task #{}", i + 1),
        description: (i % 3 == 0).then(|| format!("Follow-up for batch {}", i / 10)),
        status: statuses[(i % 4) as usize].to_string(),
        priority: i % 5,
        due_date: (i % 7 != 0).then(|| now + Duration::days(i % 30)),
        created_at: now - Duration::hours(i),
    });

    store.insert_many(tasks)?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,pagequery=debug")),
        )
        .init();

    let config = match std::env::var("PAGEQUERY_CONFIG") {
        Ok(path) => QueryConfig::from_yaml_file(&path)?,
        Err(_) => QueryConfig::default(),
    };

    let store = InMemoryRecordStore::new();
    seed(&store)?;
    tracing::info!(records = store.len()?, "seeded tasks");

    ServerBuilder::new()
        .with_config(config)
        .register_collection::<Tasks, _>(store)?
        .serve("127.0.0.1:3000")
        .await
}
