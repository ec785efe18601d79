use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use taskdesk_core::domain::{
    LoginForm, NewTask, RegistrationForm, TaskForm, TaskId, TaskListSnapshot, TaskStatus,
};
use taskdesk_core::{Client, ClientBuilder, Settings, TaskListMachine};

#[derive(Debug, Parser)]
#[command(name = "taskdesk", version, about = "Sign in and manage your tasks")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sign in and remember the token
    Login { email: String, password: String },
    /// Create an account (does not sign in)
    Register {
        email: String,
        password: String,
        /// Defaults to the password
        #[arg(long)]
        confirm: Option<String>,
    },
    /// Forget the stored token
    Logout,
    /// Show the signed-in user
    Whoami,
    /// List tasks in server order
    List {
        #[arg(long)]
        json: bool,
    },
    /// Create a task
    Add {
        title: String,
        #[arg(long, short)]
        description: Option<String>,
        #[arg(long, short, default_value_t = TaskStatus::Pending)]
        status: TaskStatus,
    },
    /// Change a task (unspecified fields keep their current value)
    Edit {
        id: i64,
        #[arg(long, short)]
        title: Option<String>,
        #[arg(long, short)]
        description: Option<String>,
        #[arg(long, short)]
        status: Option<TaskStatus>,
    },
    /// Delete a task
    Rm { id: i64 },
}

/// `RUST_LOG` が無ければ warn 以上だけを出す
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn render(snapshot: &TaskListSnapshot) {
    if snapshot.tasks.is_empty() {
        println!("no tasks");
    }
    for task in &snapshot.tasks {
        println!("{:>4}  {:<11}  {}", task.id.get(), task.status, task.title);
        if let Some(description) = &task.description {
            println!("      {description}");
        }
    }
    let counts = snapshot.counts();
    println!(
        "-- {} total: {} pending, {} in progress, {} completed",
        counts.total(),
        counts.pending,
        counts.in_progress,
        counts.completed
    );
}

/// 一覧画面のマウント相当: 読み込みまで済ませた状態機械を返す
async fn mount(client: &Client) -> anyhow::Result<TaskListMachine> {
    let Some(session) = client.session().session() else {
        bail!("not signed in; run `taskdesk login <email> <password>` first");
    };
    debug!(user = %session.email, "mounting task list");

    let list = client.task_list();
    list.load().await?;
    Ok(list)
}

async fn run(cli: Cli, client: Client) -> anyhow::Result<()> {
    match cli.command {
        Command::Login { email, password } => {
            let session = client
                .auth()
                .submit_login(&LoginForm::new(email, password))
                .await?;
            println!("signed in as {} ({})", session.email, session.user_id);
        }
        Command::Register {
            email,
            password,
            confirm,
        } => {
            let confirm = confirm.unwrap_or_else(|| password.clone());
            let response = client
                .auth()
                .submit_registration(&RegistrationForm::new(email, password, confirm))
                .await?;
            println!(
                "registered user {}; sign in with `taskdesk login`",
                response.user_id
            );
        }
        Command::Logout => {
            client.logout()?;
            println!("signed out");
        }
        Command::Whoami => match client.session().session() {
            Some(session) => println!("{} ({})", session.email, session.user_id),
            None => println!("not signed in"),
        },
        Command::List { json } => {
            let list = mount(&client).await?;
            let snapshot = list.snapshot();
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                render(&snapshot);
            }
        }
        Command::Add {
            title,
            description,
            status,
        } => {
            let list = mount(&client).await?;
            let form = TaskForm {
                title,
                description: description.unwrap_or_default(),
                status,
            };
            let fields: NewTask = form.to_new_task()?;
            list.add_task(fields).await?;
            render(&list.snapshot());
        }
        Command::Edit {
            id,
            title,
            description,
            status,
        } => {
            let id = TaskId::new(id);
            let list = mount(&client).await?;
            let current = list
                .snapshot()
                .get(id)
                .cloned()
                .with_context(|| format!("no task with id {}", id.get()))?;

            // 編集フォームは現在値で埋めてから上書きする
            let form = TaskForm {
                title: title.unwrap_or(current.title),
                description: description.or(current.description).unwrap_or_default(),
                status: status.unwrap_or(current.status),
            };
            list.edit_task(id, form.to_patch()?).await?;
            render(&list.snapshot());
        }
        Command::Rm { id } => {
            let list = mount(&client).await?;
            list.remove_task(TaskId::new(id)).await?;
            render(&list.snapshot());
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let settings = Settings::load().context("failed to load settings")?;
    debug!(
        auth = %settings.auth.base_url,
        token_path = %settings.storage.token_path.display(),
        "settings loaded"
    );
    let client = ClientBuilder::from_settings(&settings).build()?;

    run(cli, client).await
}
