use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde::Serialize;

use mailmind::commands;
use mailmind::models::{Dashboard, Settings};
use mailmind::utils::config;
use mailmind::{AppContext, Store};

const USAGE: &str = "usage:
  mailmind sync <email>               fetch new mail, extract tasks, print dashboard
  mailmind dashboard <email>          print dashboard without syncing
  mailmind complete <email> <task-id> mark a task done
  mailmind reopen <email> <task-id>   mark a task not done
  mailmind clear <email>              delete the tasks you completed
  mailmind init                       write a default settings file";

#[tokio::main]
async fn main() -> Result<()> {
    config::load_dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let path = config::config_path();
    if args == ["init"] {
        return config::init_settings(&path);
    }
    let settings = config::read_settings(&path)?;

    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["sync", email] => {
            let ctx = AppContext::from_settings(settings).context("failed to set up sync")?;
            let report = commands::sync::sync_user(&ctx, email).await?;
            if !report.is_complete() {
                log::warn!("{} message(s) could not be analyzed", report.failures.len());
            }
            print_dashboard(&commands::dashboard::build_dashboard(&ctx.store, email)?)
        }
        ["dashboard", email] => {
            let store = open_store(&settings)?;
            print_dashboard(&commands::dashboard::build_dashboard(&store, email)?)
        }
        ["complete", email, task_id] => {
            let store = open_store(&settings)?;
            print_json(&commands::tasks::set_completion(&store, email, task_id, true)?)
        }
        ["reopen", email, task_id] => {
            let store = open_store(&settings)?;
            print_json(&commands::tasks::set_completion(&store, email, task_id, false)?)
        }
        ["clear", email] => {
            let store = open_store(&settings)?;
            print_json(&commands::tasks::clear_completed(&store, email)?)
        }
        _ => {
            eprintln!("{}", USAGE);
            bail!("unrecognized arguments: {:?}", args)
        }
    }
}

fn open_store(settings: &Settings) -> Result<Arc<Store>> {
    let path = Path::new(&settings.storage.database_path);
    let store = Store::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    Ok(Arc::new(store))
}

fn print_dashboard(dashboard: &Dashboard) -> Result<()> {
    log::info!("last sync: {}", dashboard.last_sync_display());
    print_json(dashboard)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
