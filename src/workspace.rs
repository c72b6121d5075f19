use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::storage::{Config, StorageError, load_config};
use crate::stores::{CalendarEventStore, CategoryStore, TaskStore, TimeBlockStore};

// File names double as the storage keys; the camelCase ones stay as-is
// so existing data files keep loading.
pub const CATEGORIES_FILE: &str = "categories.json";
pub const TASKS_FILE: &str = "tasks.json";
pub const TIME_BLOCKS_FILE: &str = "timeBlocks.json";
pub const CALENDAR_EVENTS_FILE: &str = "calendarEvents.json";
pub const CONFIG_FILE: &str = "config.toml";

pub fn resolve_data_dir(cli_dir: Option<PathBuf>) -> PathBuf {
    if let Some(path) = cli_dir {
        return absolutize(path);
    }

    if let Some(path) = env::var_os("TEMPO_DATA_DIR") {
        let path = PathBuf::from(path);
        if !path.as_os_str().is_empty() {
            return absolutize(path);
        }
    }

    if let Some(path) = env::var_os("XDG_DATA_HOME") {
        return PathBuf::from(path).join("tempo_dayplanner");
    }

    if let Some(path) = env::var_os("HOME") {
        return PathBuf::from(path)
            .join(".local")
            .join("share")
            .join("tempo_dayplanner");
    }

    PathBuf::from(".tempo_dayplanner")
}

fn absolutize(path: PathBuf) -> PathBuf {
    let path = if path.is_absolute() {
        path
    } else if let Ok(cwd) = env::current_dir() {
        cwd.join(path)
    } else {
        path
    };

    if path.exists() {
        fs::canonicalize(&path).unwrap_or(path)
    } else {
        path
    }
}

pub struct Workspace {
    pub config: Config,
    pub categories: CategoryStore,
    pub tasks: TaskStore,
    pub time_blocks: TimeBlockStore,
    pub calendar_events: CalendarEventStore,
}

impl Workspace {
    pub fn load(dir: &Path) -> Self {
        Self {
            config: load_config(&dir.join(CONFIG_FILE)),
            categories: CategoryStore::load(dir.join(CATEGORIES_FILE)),
            tasks: TaskStore::load(dir.join(TASKS_FILE)),
            time_blocks: TimeBlockStore::load(dir.join(TIME_BLOCKS_FILE)),
            calendar_events: CalendarEventStore::load(dir.join(CALENDAR_EVENTS_FILE)),
        }
    }

    pub fn flush(&self) -> Result<(), StorageError> {
        self.categories.persist_now()?;
        self.tasks.persist_now()?;
        self.time_blocks.persist_now()?;
        self.calendar_events.persist_now()?;
        Ok(())
    }
}
