//! Optional config-file hot reload (spec §9 design note, ambient addition).
//! Watches the config file with `notify` and swaps a shared `ScanConfig`
//! between cycles; a cycle already in flight finishes with the config it
//! started with because the controller snapshots `ScanConfig` once at the
//! start of each cycle rather than reading through the watcher live.

use std::path::PathBuf;
use std::sync::Arc;

use notify::{Event, RecursiveMode, Watcher};
use parking_lot::RwLock;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::config::Config;

pub struct ConfigWatcher {
    current: Arc<RwLock<Config>>,
    _watcher: notify::RecommendedWatcher,
}

impl ConfigWatcher {
    pub async fn start(path: PathBuf) -> crate::error::Result<Self> {
        let initial = Config::load(&path).await?;
        let current = Arc::new(RwLock::new(initial));

        let (tx, mut rx) = mpsc::unbounded_channel::<notify::Result<Event>>();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })
        .map_err(|e| crate::error::WardenError::Config(e.to_string()))?;
        watcher
            .watch(&path, RecursiveMode::NonRecursive)
            .map_err(|e| crate::error::WardenError::Config(e.to_string()))?;

        let reload_current = current.clone();
        let reload_path = path.clone();
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                match event {
                    Ok(event) if event.kind.is_modify() => {
                        match Config::load(&reload_path).await {
                            Ok(new_config) => {
                                info!("reloaded configuration from {}", reload_path.display());
                                *reload_current.write() = new_config;
                            }
                            Err(e) => {
                                warn!("config reload failed, keeping previous config: {}", e);
                            }
                        }
                    }
                    Ok(_) => {}
                    Err(e) => error!("config watch error: {}", e),
                }
            }
        });

        Ok(ConfigWatcher {
            current,
            _watcher: watcher,
        })
    }

    /// Snapshots the config currently in effect. The scan controller calls
    /// this once per cycle, so an in-flight cycle is unaffected by a reload
    /// that lands mid-scan.
    pub fn snapshot(&self) -> Config {
        self.current.read().clone()
    }
}
