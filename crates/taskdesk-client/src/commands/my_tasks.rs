use clap::Subcommand;

use taskdesk_shared::schemas::Task;

use super::tasks::{print_task_detail, print_tasks};
use super::{fail, not_available, note_source, open_context};
use crate::api::ApiClient;
use crate::navigation::Route;
use crate::workflows::dashboard::EmployeeDashboard;

#[derive(Subcommand, Debug)]
pub enum MyTasksAction {
    /// List the tasks assigned to you
    List,
    /// Leave a comment on a task
    Comment { id: i64, text: String },
    /// Mark a task as completed
    Complete { id: i64 },
}

pub async fn run(action: MyTasksAction) -> anyhow::Result<()> {
    let ctx = open_context()?;
    let Route::Employee(route) = ctx.route() else {
        not_available("Employee Dashboard");
        return Ok(());
    };
    let dashboard = EmployeeDashboard::open(route, &ctx.api);

    match action {
        MyTasksAction::List => {
            let listed = dashboard.tasks().await;
            note_source(&listed);
            print_tasks(&listed.items);
        }
        MyTasksAction::Comment { id, text } => {
            let task = find_task(&dashboard, id).await?;
            let saved = dashboard.submit_comment(&task, &text).await.map_err(fail)?;
            println!("Comment saved.");
            print_task_detail(&saved.record);
        }
        MyTasksAction::Complete { id } => {
            let task = find_task(&dashboard, id).await?;
            let saved = dashboard.mark_complete(&task).await.map_err(fail)?;
            println!("Task {} completed.", saved.record.id);
            print_tasks(&saved.refreshed.items);
        }
    }
    Ok(())
}

async fn find_task(dashboard: &EmployeeDashboard<'_, ApiClient>, id: i64) -> anyhow::Result<Task> {
    let listed = dashboard.tasks().await;
    listed
        .items
        .into_iter()
        .find(|t| t.id == id)
        .ok_or_else(|| anyhow::anyhow!("no task {id} is assigned to you"))
}
