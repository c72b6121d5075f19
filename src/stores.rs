use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};

use crate::domain::{
    Category, CalendarEvent, Task, TaskDraft, TimeBlock, UNCATEGORIZED_COLOR, UNCATEGORIZED_LABEL,
    generate_id, parse_clock_time, validate_clock_range, validate_hex_color,
};
use crate::storage::{StorageError, load_or_empty, save_collection};

fn warn_persist_failure(path: &PathBuf, err: &StorageError) {
    eprintln!("warning: failed to persist {}: {err}", path.display());
}

#[derive(Debug)]
pub struct CategoryStore {
    path: PathBuf,
    items: Vec<Category>,
}

impl CategoryStore {
    pub fn load(path: PathBuf) -> Self {
        let items = load_or_empty(&path);
        Self { path, items }
    }

    pub fn list(&self) -> &[Category] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&Category> {
        self.items.iter().find(|category| category.id == id)
    }

    pub fn label_for(&self, id: &str) -> &str {
        self.get(id)
            .map(|category| category.label.as_str())
            .unwrap_or(UNCATEGORIZED_LABEL)
    }

    pub fn color_for(&self, id: &str) -> &str {
        self.get(id)
            .map(|category| category.color.as_str())
            .unwrap_or(UNCATEGORIZED_COLOR)
    }

    pub fn create(&mut self, label: &str, color: &str) -> Result<String, String> {
        let label = label.trim();
        if label.is_empty() {
            return Err("category label is required".to_string());
        }
        validate_hex_color(color)?;

        let id = generate_id();
        self.items.push(Category {
            id: id.clone(),
            label: label.to_string(),
            color: color.to_string(),
        });
        self.persist();
        Ok(id)
    }

    pub fn update(&mut self, category: Category) -> Result<(), String> {
        if category.label.trim().is_empty() {
            return Err("category label is required".to_string());
        }
        validate_hex_color(&category.color)?;

        if let Some(slot) = self.items.iter_mut().find(|item| item.id == category.id) {
            *slot = category;
            self.persist();
        }
        Ok(())
    }

    pub fn delete(&mut self, id: &str) {
        let before = self.items.len();
        self.items.retain(|category| category.id != id);
        if self.items.len() != before {
            self.persist();
        }
    }

    pub fn persist_now(&self) -> Result<(), StorageError> {
        save_collection(&self.path, &self.items)
    }

    fn persist(&self) {
        if let Err(err) = self.persist_now() {
            warn_persist_failure(&self.path, &err);
        }
    }
}

#[derive(Debug)]
pub struct TaskStore {
    path: PathBuf,
    items: Vec<Task>,
}

impl TaskStore {
    pub fn load(path: PathBuf) -> Self {
        let items = load_or_empty(&path);
        Self { path, items }
    }

    pub fn list(&self) -> &[Task] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.items.iter().find(|task| task.id == id)
    }

    pub fn create(&mut self, draft: TaskDraft) -> Result<String, String> {
        let title = draft.title.trim();
        if title.is_empty() {
            return Err("task title is required".to_string());
        }
        if draft.category_id.is_empty() {
            return Err("task category is required".to_string());
        }
        validate_task_times(draft.start_time.as_deref(), draft.end_time.as_deref())?;

        let id = generate_id();
        self.items.push(Task {
            id: id.clone(),
            title: title.to_string(),
            category_id: draft.category_id,
            priority: draft.priority,
            completed: false,
            due_date: draft.due_date,
            start_time: draft.start_time,
            end_time: draft.end_time,
            duration: draft.duration,
        });
        self.persist();
        Ok(id)
    }

    pub fn update(&mut self, task: Task) -> Result<(), String> {
        if task.title.trim().is_empty() {
            return Err("task title is required".to_string());
        }
        validate_task_times(task.start_time.as_deref(), task.end_time.as_deref())?;

        if let Some(slot) = self.items.iter_mut().find(|item| item.id == task.id) {
            *slot = task;
            self.persist();
        }
        Ok(())
    }

    pub fn toggle_completion(&mut self, id: &str) {
        if let Some(task) = self.items.iter_mut().find(|task| task.id == id) {
            task.completed = !task.completed;
            self.persist();
        }
    }

    pub fn delete(&mut self, id: &str) {
        let before = self.items.len();
        self.items.retain(|task| task.id != id);
        if self.items.len() != before {
            self.persist();
        }
    }

    pub fn tasks_for_date(&self, date: NaiveDate) -> Vec<&Task> {
        let mut tasks = self
            .items
            .iter()
            .filter(|task| task.due_date == date)
            .collect::<Vec<_>>();
        tasks.sort_by(|left, right| left.start_sort_key().cmp(right.start_sort_key()));
        tasks
    }

    pub fn persist_now(&self) -> Result<(), StorageError> {
        save_collection(&self.path, &self.items)
    }

    fn persist(&self) {
        if let Err(err) = self.persist_now() {
            warn_persist_failure(&self.path, &err);
        }
    }
}

fn validate_task_times(start: Option<&str>, end: Option<&str>) -> Result<(), String> {
    if let Some(start) = start {
        parse_clock_time(start)?;
    }
    if let Some(end) = end {
        parse_clock_time(end)?;
    }
    if let (Some(start), Some(end)) = (start, end) {
        validate_clock_range(start, end)?;
    }
    Ok(())
}

#[derive(Debug)]
pub struct TimeBlockStore {
    path: PathBuf,
    items: Vec<TimeBlock>,
}

impl TimeBlockStore {
    pub fn load(path: PathBuf) -> Self {
        let items = load_or_empty(&path);
        Self { path, items }
    }

    pub fn list(&self) -> &[TimeBlock] {
        &self.items
    }

    pub fn create(
        &mut self,
        category_id: &str,
        start_time: &str,
        end_time: &str,
        days_of_week: Vec<u8>,
    ) -> Result<String, String> {
        if category_id.is_empty() {
            return Err("time block category is required".to_string());
        }
        validate_clock_range(start_time, end_time)?;
        let days_of_week = normalize_days(days_of_week)?;

        let id = generate_id();
        self.items.push(TimeBlock {
            id: id.clone(),
            category_id: category_id.to_string(),
            start_time: start_time.to_string(),
            end_time: end_time.to_string(),
            days_of_week,
        });
        self.persist();
        Ok(id)
    }

    pub fn update(&mut self, block: TimeBlock) -> Result<(), String> {
        validate_clock_range(&block.start_time, &block.end_time)?;
        let block = TimeBlock {
            days_of_week: normalize_days(block.days_of_week)?,
            ..block
        };

        if let Some(slot) = self.items.iter_mut().find(|item| item.id == block.id) {
            *slot = block;
            self.persist();
        }
        Ok(())
    }

    pub fn delete(&mut self, id: &str) {
        let before = self.items.len();
        self.items.retain(|block| block.id != id);
        if self.items.len() != before {
            self.persist();
        }
    }

    // First match in insertion order wins; later blocks for the same
    // weekday are never consulted.
    pub fn resolve_for_category_and_date(
        &self,
        category_id: &str,
        date: NaiveDate,
    ) -> Option<&TimeBlock> {
        self.items
            .iter()
            .find(|block| block.category_id == category_id && block.applies_on(date))
    }

    // Fills both times from the first applicable block, but only when the
    // caller supplied neither.
    pub fn default_times_for(
        &self,
        category_id: &str,
        date: NaiveDate,
        start_time: Option<String>,
        end_time: Option<String>,
    ) -> (Option<String>, Option<String>) {
        if start_time.is_none() && end_time.is_none() {
            if let Some(block) = self.resolve_for_category_and_date(category_id, date) {
                return (Some(block.start_time.clone()), Some(block.end_time.clone()));
            }
        }
        (start_time, end_time)
    }

    pub fn persist_now(&self) -> Result<(), StorageError> {
        save_collection(&self.path, &self.items)
    }

    fn persist(&self) {
        if let Err(err) = self.persist_now() {
            warn_persist_failure(&self.path, &err);
        }
    }
}

fn normalize_days(mut days: Vec<u8>) -> Result<Vec<u8>, String> {
    if days.iter().any(|day| *day > 6) {
        return Err("days of week must be in 0..=6 (0 = Sunday)".to_string());
    }
    days.sort_unstable();
    days.dedup();
    Ok(days)
}

#[derive(Debug)]
pub struct CalendarEventStore {
    path: PathBuf,
    items: Vec<CalendarEvent>,
}

impl CalendarEventStore {
    pub fn load(path: PathBuf) -> Self {
        let items = load_or_empty(&path);
        Self { path, items }
    }

    pub fn list(&self) -> &[CalendarEvent] {
        &self.items
    }

    pub fn create(
        &mut self,
        category_id: &str,
        start_time: NaiveDateTime,
        end_time: NaiveDateTime,
    ) -> Result<String, String> {
        if category_id.is_empty() {
            return Err("event category is required".to_string());
        }
        if end_time <= start_time {
            return Err("event end must be after its start".to_string());
        }

        let id = generate_id();
        self.items.push(CalendarEvent {
            id: id.clone(),
            category_id: category_id.to_string(),
            start_time,
            end_time,
        });
        self.persist();
        Ok(id)
    }

    pub fn update(&mut self, event: CalendarEvent) -> Result<(), String> {
        if event.end_time <= event.start_time {
            return Err("event end must be after its start".to_string());
        }

        if let Some(slot) = self.items.iter_mut().find(|item| item.id == event.id) {
            *slot = event;
            self.persist();
        }
        Ok(())
    }

    pub fn delete(&mut self, id: &str) {
        let before = self.items.len();
        self.items.retain(|event| event.id != id);
        if self.items.len() != before {
            self.persist();
        }
    }

    pub fn persist_now(&self) -> Result<(), StorageError> {
        save_collection(&self.path, &self.items)
    }

    fn persist(&self) {
        if let Err(err) = self.persist_now() {
            warn_persist_failure(&self.path, &err);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use chrono::NaiveDate;

    use crate::domain::{Priority, TaskDraft};

    use super::{CategoryStore, TaskStore, TimeBlockStore};

    fn temp_file(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("{}_{}", name, std::process::id()));
        path
    }

    fn draft(title: &str, category_id: &str, due: NaiveDate) -> TaskDraft {
        TaskDraft {
            title: title.to_string(),
            category_id: category_id.to_string(),
            priority: Priority::Medium,
            due_date: due,
            start_time: None,
            end_time: None,
            duration: 30,
        }
    }

    #[test]
    fn create_appends_incomplete_task_with_fresh_id() {
        let path = temp_file("tempo_tasks_create.json");
        let _ = fs::remove_file(&path);
        let mut store = TaskStore::load(path.clone());
        let due = NaiveDate::from_ymd_opt(2026, 3, 4).expect("date should be valid");

        let first = store.create(draft("Review proposal", "c1", due)).expect("create should work");
        let second = store.create(draft("Call mom", "c1", due)).expect("create should work");

        assert_eq!(store.list().len(), 2);
        assert_ne!(first, second);
        assert!(store.list().iter().all(|task| !task.completed));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn create_rejects_blank_title_and_bad_times() {
        let path = temp_file("tempo_tasks_invalid.json");
        let _ = fs::remove_file(&path);
        let mut store = TaskStore::load(path.clone());
        let due = NaiveDate::from_ymd_opt(2026, 3, 4).expect("date should be valid");

        assert!(store.create(draft("   ", "c1", due)).is_err());

        let mut timed = draft("Standup", "c1", due);
        timed.start_time = Some("10:00".to_string());
        timed.end_time = Some("09:00".to_string());
        assert!(store.create(timed).is_err());
        assert!(store.list().is_empty());
        let _ = fs::remove_file(path);
    }

    #[test]
    fn toggle_completion_is_an_involution() {
        let path = temp_file("tempo_tasks_toggle.json");
        let _ = fs::remove_file(&path);
        let mut store = TaskStore::load(path.clone());
        let due = NaiveDate::from_ymd_opt(2026, 3, 4).expect("date should be valid");
        let id = store.create(draft("Meditate", "c1", due)).expect("create should work");

        store.toggle_completion(&id);
        assert!(store.get(&id).expect("task should exist").completed);
        store.toggle_completion(&id);
        assert!(!store.get(&id).expect("task should exist").completed);

        // Unknown ids are a silent no-op.
        store.toggle_completion("missing");
        assert_eq!(store.list().len(), 1);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn tasks_for_date_puts_untimed_tasks_first() {
        let path = temp_file("tempo_tasks_order.json");
        let _ = fs::remove_file(&path);
        let mut store = TaskStore::load(path.clone());
        let due = NaiveDate::from_ymd_opt(2026, 3, 4).expect("date should be valid");

        let mut timed = draft("Timed", "c1", due);
        timed.start_time = Some("09:00".to_string());
        store.create(timed).expect("create should work");
        store.create(draft("Untimed", "c1", due)).expect("create should work");
        store
            .create(draft("Other day", "c1", due.succ_opt().expect("next day should exist")))
            .expect("create should work");

        let ordered = store.tasks_for_date(due);
        assert_eq!(ordered.len(), 2);
        assert_eq!(ordered[0].title, "Untimed");
        assert_eq!(ordered[1].title, "Timed");
        let _ = fs::remove_file(path);
    }

    #[test]
    fn survives_a_simulated_restart() {
        let path = temp_file("tempo_tasks_restart.json");
        let _ = fs::remove_file(&path);
        let due = NaiveDate::from_ymd_opt(2026, 3, 4).expect("date should be valid");

        let id = {
            let mut store = TaskStore::load(path.clone());
            let mut timed = draft("Persisted", "c1", due);
            timed.start_time = Some("09:00".to_string());
            timed.end_time = Some("10:00".to_string());
            store.create(timed).expect("create should work")
        };

        let reloaded = TaskStore::load(path.clone());
        let task = reloaded.get(&id).expect("task should survive reload");
        assert_eq!(task.due_date, due);
        assert_eq!(task.start_time.as_deref(), Some("09:00"));
        assert_eq!(task.end_time.as_deref(), Some("10:00"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn deleting_a_category_leaves_referencing_tasks_intact() {
        let categories_path = temp_file("tempo_categories_orphan.json");
        let tasks_path = temp_file("tempo_tasks_orphan.json");
        let _ = fs::remove_file(&categories_path);
        let _ = fs::remove_file(&tasks_path);

        let mut categories = CategoryStore::load(categories_path.clone());
        let mut tasks = TaskStore::load(tasks_path.clone());
        let due = NaiveDate::from_ymd_opt(2026, 3, 4).expect("date should be valid");

        let category_id = categories.create("Work", "#3b82f6").expect("create should work");
        let task_id = tasks
            .create(draft("Review proposal", &category_id, due))
            .expect("create should work");

        categories.delete(&category_id);

        let task = tasks.get(&task_id).expect("task should survive category deletion");
        assert_eq!(task.category_id, category_id);
        assert_eq!(categories.label_for(&task.category_id), "Uncategorized");
        assert_eq!(categories.color_for(&task.category_id), "#9ca3af");

        let _ = fs::remove_file(categories_path);
        let _ = fs::remove_file(tasks_path);
    }

    #[test]
    fn category_create_validates_label_and_color() {
        let path = temp_file("tempo_categories_validate.json");
        let _ = fs::remove_file(&path);
        let mut store = CategoryStore::load(path.clone());

        assert!(store.create("", "#3b82f6").is_err());
        assert!(store.create("Work", "blue").is_err());
        assert!(store.create("Work", "#3b82f6").is_ok());
        assert_eq!(store.list().len(), 1);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn resolves_first_matching_block_for_weekday() {
        let path = temp_file("tempo_blocks_resolve.json");
        let _ = fs::remove_file(&path);
        let mut store = TimeBlockStore::load(path.clone());

        store
            .create("c1", "09:00", "17:00", vec![1, 2, 3, 4, 5])
            .expect("create should work");
        store
            .create("c1", "10:00", "12:00", vec![3])
            .expect("create should work");

        // 2026-03-04 is a Wednesday, 2026-03-07 a Saturday.
        let wednesday = NaiveDate::from_ymd_opt(2026, 3, 4).expect("date should be valid");
        let saturday = NaiveDate::from_ymd_opt(2026, 3, 7).expect("date should be valid");

        let block = store
            .resolve_for_category_and_date("c1", wednesday)
            .expect("weekday block should apply");
        assert_eq!(block.start_time, "09:00");
        assert_eq!(block.end_time, "17:00");

        assert!(store.resolve_for_category_and_date("c1", saturday).is_none());
        assert!(store.resolve_for_category_and_date("c2", wednesday).is_none());

        // Same inputs, same answer.
        let again = store
            .resolve_for_category_and_date("c1", wednesday)
            .expect("resolution should be deterministic");
        assert_eq!(again.id, block.id);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn task_times_autofill_from_weekday_block() {
        let blocks_path = temp_file("tempo_blocks_autofill.json");
        let tasks_path = temp_file("tempo_tasks_autofill.json");
        let _ = fs::remove_file(&blocks_path);
        let _ = fs::remove_file(&tasks_path);

        let mut blocks = TimeBlockStore::load(blocks_path.clone());
        let mut tasks = TaskStore::load(tasks_path.clone());
        blocks
            .create("c1", "09:00", "17:00", vec![1, 2, 3, 4, 5])
            .expect("create should work");

        // 2026-03-04 is a Wednesday, 2026-03-07 a Saturday.
        let wednesday = NaiveDate::from_ymd_opt(2026, 3, 4).expect("date should be valid");
        let saturday = NaiveDate::from_ymd_opt(2026, 3, 7).expect("date should be valid");

        let (start, end) = blocks.default_times_for("c1", wednesday, None, None);
        let mut weekday_draft = draft("Deep work", "c1", wednesday);
        weekday_draft.start_time = start;
        weekday_draft.end_time = end;
        let id = tasks.create(weekday_draft).expect("create should work");
        let task = tasks.get(&id).expect("task should exist");
        assert_eq!(task.start_time.as_deref(), Some("09:00"));
        assert_eq!(task.end_time.as_deref(), Some("17:00"));

        let (start, end) = blocks.default_times_for("c1", saturday, None, None);
        let mut weekend_draft = draft("Weekend errand", "c1", saturday);
        weekend_draft.start_time = start;
        weekend_draft.end_time = end;
        let id = tasks.create(weekend_draft).expect("create should work");
        let task = tasks.get(&id).expect("task should exist");
        assert!(task.start_time.is_none());
        assert!(task.end_time.is_none());

        // Explicit times are never overridden, not even partially.
        let (start, end) =
            blocks.default_times_for("c1", wednesday, Some("10:00".to_string()), None);
        assert_eq!(start.as_deref(), Some("10:00"));
        assert!(end.is_none());

        let _ = fs::remove_file(blocks_path);
        let _ = fs::remove_file(tasks_path);
    }

    #[test]
    fn update_can_clear_times_back_to_unscheduled() {
        let path = temp_file("tempo_tasks_clear_times.json");
        let _ = fs::remove_file(&path);
        let mut store = TaskStore::load(path.clone());
        let due = NaiveDate::from_ymd_opt(2026, 3, 4).expect("date should be valid");

        let mut timed = draft("Timed", "c1", due);
        timed.start_time = Some("09:00".to_string());
        timed.end_time = Some("10:00".to_string());
        let id = store.create(timed).expect("create should work");

        let mut task = store.get(&id).expect("task should exist").clone();
        task.start_time = None;
        task.end_time = None;
        store.update(task).expect("update should work");

        let task = store.get(&id).expect("task should exist");
        assert!(task.start_time.is_none());
        assert!(task.end_time.is_none());
        let _ = fs::remove_file(path);
    }

    #[test]
    fn rejects_out_of_range_weekdays() {
        let path = temp_file("tempo_blocks_days.json");
        let _ = fs::remove_file(&path);
        let mut store = TimeBlockStore::load(path.clone());
        assert!(store.create("c1", "09:00", "10:00", vec![7]).is_err());
        assert!(store.list().is_empty());
        let _ = fs::remove_file(path);
    }
}
