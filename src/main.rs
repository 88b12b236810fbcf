use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use stories::{
    demo::seed_demo,
    snapshot::{load_snapshot, write_snapshot_file},
    Clock, Config, StoriesStore, SystemClock,
};

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("stories={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

/// Loads any saved stories into the store.
fn restore_snapshot(store: &StoriesStore, config: &Config) -> anyhow::Result<()> {
    let Some(path) = config.snapshot_path() else {
        return Ok(());
    };
    if path.exists() {
        let restored = load_snapshot(store, &path)?;
        info!(count = restored, path = %path.display(), "restored stories");
    } else {
        warn!(path = %path.display(), "snapshot file doesn't exist");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_args(std::env::args().skip(1))?;
    init_tracing(&config.log_level);

    let store = StoriesStore::new(&config);
    restore_snapshot(&store, &config)?;
    if config.seed_demo {
        seed_demo(&store, SystemClock.now_millis());
    }

    println!("{}", serde_json::to_string_pretty(&*store.list())?);

    let mut changes = store.subscribe();
    loop {
        tokio::select! {
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
                let count = changes.borrow_and_update().len();
                info!(count, "stories changed");
            }
            _ = tokio::signal::ctrl_c() => {
                info!("received Ctrl+C, shutting down");
                break;
            }
        }
    }

    if let Some(path) = config.snapshot_path() {
        write_snapshot_file(&path, &store.list())?;
        info!(path = %path.display(), "saved stories");
    }
    store.shutdown();
    Ok(())
}
