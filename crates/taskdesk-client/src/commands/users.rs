use clap::Subcommand;

use taskdesk_shared::roles::Role;
use taskdesk_shared::schemas::User;

use super::{fail, not_available, note_source, open_context, read_line};
use crate::api::ApiClient;
use crate::navigation::Route;
use crate::persistence::KEY_USERS;
use crate::reconcile::load_cached;
use crate::workflows::users::{EmployeeManager, UserForm};

#[derive(Subcommand, Debug)]
pub enum UsersAction {
    /// List employees
    List,
    /// Show one employee
    Show { id: i64 },
    /// Create an employee; the password is read from stdin
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "employee")]
        role: Role,
    },
    /// Update an employee
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        role: Option<Role>,
        /// Read a new password from stdin
        #[arg(long)]
        set_password: bool,
    },
    /// Delete an employee
    Delete { id: i64 },
}

pub async fn run(action: UsersAction) -> anyhow::Result<()> {
    let ctx = open_context()?;
    let Route::Admin(route) = ctx.route() else {
        not_available("Manage Employees");
        return Ok(());
    };
    let manager = EmployeeManager::open(route, &ctx.api);

    match action {
        UsersAction::List => {
            let listed = manager.list().await;
            note_source(&listed);
            print_users(&listed.items);
        }
        UsersAction::Show { id } => {
            let user = manager.show(id).await.map_err(fail)?;
            print_users(std::slice::from_ref(&user));
        }
        UsersAction::Create { name, email, role } => {
            let password = read_line("Password: ")?;
            let form = UserForm {
                name,
                email,
                password: Some(password),
                role,
            };
            let saved = manager.create(&form).await.map_err(fail)?;
            println!("Created employee {}", saved.record.id);
            print_users(&saved.refreshed.items);
        }
        UsersAction::Update {
            id,
            name,
            email,
            role,
            set_password,
        } => {
            let existing = find_user(&manager, id).await?;
            let mut form = UserForm::from_user(&existing);
            if let Some(name) = name {
                form.name = name;
            }
            if let Some(email) = email {
                form.email = email;
            }
            if let Some(role) = role {
                form.role = role;
            }
            if set_password {
                form.password = Some(read_line("New password: ")?);
            }
            let saved = manager.update(id, &form).await.map_err(fail)?;
            println!("Updated employee {}", saved.record.id);
            print_users(&saved.refreshed.items);
        }
        UsersAction::Delete { id } => {
            let target = find_user(&manager, id).await?;
            let refreshed = manager.delete(&target).await.map_err(fail)?;
            println!("Deleted employee {id}");
            print_users(&refreshed.items);
        }
    }
    Ok(())
}

/// Cached record first, server otherwise.
async fn find_user(manager: &EmployeeManager<'_, ApiClient>, id: i64) -> anyhow::Result<User> {
    let cached: Vec<User> = load_cached(manager.storage(), KEY_USERS);
    if let Some(user) = cached.into_iter().find(|u| u.id == id) {
        return Ok(user);
    }
    manager.show(id).await.map_err(fail)
}

fn print_users(users: &[User]) {
    if users.is_empty() {
        println!("No employees.");
        return;
    }
    for user in users {
        println!("{:>5}  {:<24} {:<32} {}", user.id, user.name, user.email, user.role);
    }
}
