use clap::{Args, Subcommand};

use taskdesk_shared::roles::{Role, TaskStatus};
use taskdesk_shared::schemas::Task;

use super::{fail, not_available, note_source, open_context};
use crate::api::ApiClient;
use crate::navigation::Route;
use crate::reconcile::load_cached;
use crate::workflows::tasks::{TaskForm, TaskManager};

#[derive(Subcommand, Debug)]
pub enum TasksAction {
    /// List all tasks
    List,
    /// Show one task
    Show { id: i64 },
    /// Create a task
    Create(TaskFields),
    /// Update a task; omitted fields keep their current value
    Update {
        id: i64,
        #[command(flatten)]
        fields: TaskFields,
    },
    /// Delete a task
    Delete { id: i64 },
    /// List the employees a task can be assigned to
    Assignees,
}

#[derive(Args, Debug, Default)]
pub struct TaskFields {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// Pending, In-Process or Completed
    #[arg(long)]
    pub status: Option<String>,
    /// Id of the employee the task is assigned to
    #[arg(long)]
    pub assigned_to: Option<i64>,
    #[arg(long)]
    pub comment: Option<String>,
}

impl TaskFields {
    fn apply(self, form: &mut TaskForm) {
        if let Some(title) = self.title {
            form.title = title;
        }
        if let Some(description) = self.description {
            form.description = description;
        }
        if let Some(status) = self.status {
            form.status = TaskStatus::from(status);
        }
        if self.assigned_to.is_some() {
            form.assigned_to = self.assigned_to;
        }
        if self.comment.is_some() {
            form.comment = self.comment;
        }
    }
}

pub async fn run(action: TasksAction) -> anyhow::Result<()> {
    let ctx = open_context()?;
    let Route::Admin(route) = ctx.route() else {
        not_available("Manage Tasks");
        return Ok(());
    };
    let manager = TaskManager::open(route, &ctx.api);

    match action {
        TasksAction::List => {
            let listed = manager.list().await;
            note_source(&listed);
            print_tasks(&listed.items);
        }
        TasksAction::Show { id } => {
            let task = manager.show(id).await.map_err(fail)?;
            print_task_detail(&task);
        }
        TasksAction::Create(fields) => {
            let mut form = TaskForm::default();
            fields.apply(&mut form);
            let saved = manager.create(&form).await.map_err(fail)?;
            println!("Created task {}", saved.record.id);
            print_tasks(&saved.refreshed.items);
        }
        TasksAction::Update { id, fields } => {
            let existing = find_task(&manager, id).await?;
            let mut form = TaskForm::from_task(&existing);
            fields.apply(&mut form);
            let saved = manager.update(id, &form).await.map_err(fail)?;
            println!("Updated task {}", saved.record.id);
            print_tasks(&saved.refreshed.items);
        }
        TasksAction::Delete { id } => {
            let refreshed = manager.delete(id).await.map_err(fail)?;
            println!("Deleted task {id}");
            print_tasks(&refreshed.items);
        }
        TasksAction::Assignees => {
            let assignees = manager.assignees().await;
            note_source(&assignees);
            for user in assignees.items.iter().filter(|u| u.role == Role::Employee) {
                println!("{:>5}  {:<24} {}", user.id, user.name, user.email);
            }
        }
    }
    Ok(())
}

async fn find_task(manager: &TaskManager<'_, ApiClient>, id: i64) -> anyhow::Result<Task> {
    let cached: Vec<Task> = load_cached(manager.storage(), manager.cache_key());
    if let Some(task) = cached.into_iter().find(|t| t.id == id) {
        return Ok(task);
    }
    manager.show(id).await.map_err(fail)
}

pub(crate) fn print_tasks(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("No tasks.");
        return;
    }
    for task in tasks {
        let assignee = task
            .assigned_to
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".into());
        let lock = if task.locked { " [locked]" } else { "" };
        println!(
            "{:>5}  {:<32} {:<12} assignee {}{}",
            task.id, task.title, task.status, assignee, lock
        );
    }
}

pub(crate) fn print_task_detail(task: &Task) {
    println!("Task {}", task.id);
    println!("  Title: {}", task.title);
    println!("  Description: {}", task.description);
    println!("  Status: {}", task.status);
    match task.assigned_to {
        Some(id) => println!("  Assigned to: {id}"),
        None => println!("  Assigned to: nobody"),
    }
    if let Some(comment) = &task.comment {
        println!("  Comment: {comment}");
    }
    if task.locked {
        println!("  Locked: completed tasks keep their status");
    }
}
