use chrono::{Duration, NaiveDate};

use crate::domain::{Category, Task, UNCATEGORIZED_COLOR, UNCATEGORIZED_LABEL};

#[derive(Debug, Clone)]
pub struct CategoryStats {
    pub category_id: Option<String>,
    pub label: String,
    pub color: String,
    pub completed: usize,
    pub total: usize,
    pub rate: f64,
}

fn rate(completed: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        completed as f64 / total as f64
    }
}

pub fn completion_stats(tasks: &[Task], categories: &[Category]) -> Vec<CategoryStats> {
    let mut stats = categories
        .iter()
        .map(|category| {
            let total = tasks
                .iter()
                .filter(|task| task.category_id == category.id)
                .count();
            let completed = tasks
                .iter()
                .filter(|task| task.category_id == category.id && task.completed)
                .count();
            CategoryStats {
                category_id: Some(category.id.clone()),
                label: category.label.clone(),
                color: category.color.clone(),
                completed,
                total,
                rate: rate(completed, total),
            }
        })
        .collect::<Vec<_>>();

    let dangling = tasks
        .iter()
        .filter(|task| !categories.iter().any(|category| category.id == task.category_id))
        .collect::<Vec<_>>();
    if !dangling.is_empty() {
        let total = dangling.len();
        let completed = dangling.iter().filter(|task| task.completed).count();
        stats.push(CategoryStats {
            category_id: None,
            label: UNCATEGORIZED_LABEL.to_string(),
            color: UNCATEGORIZED_COLOR.to_string(),
            completed,
            total,
            rate: rate(completed, total),
        });
    }

    stats
}

#[derive(Debug, Clone, Copy)]
pub struct DayCount {
    pub day: NaiveDate,
    pub completed: usize,
    pub total: usize,
}

pub fn daily_distribution(tasks: &[Task], end_day: NaiveDate, window_days: u32) -> Vec<DayCount> {
    let window_days = window_days.max(1) as i64;
    (0..window_days)
        .map(|offset| {
            let day = end_day - Duration::days(window_days - 1 - offset);
            let total = tasks.iter().filter(|task| task.due_date == day).count();
            let completed = tasks
                .iter()
                .filter(|task| task.due_date == day && task.completed)
                .count();
            DayCount { day, completed, total }
        })
        .collect()
}

pub fn total_time_spent(tasks: &[Task]) -> u32 {
    tasks
        .iter()
        .filter(|task| task.completed)
        .map(|task| task.duration)
        .sum()
}

#[derive(Debug, Clone, Copy)]
pub struct DayProgress {
    pub completed: usize,
    pub total: usize,
    pub rate: f64,
}

pub fn today_progress(tasks: &[Task], day: NaiveDate) -> DayProgress {
    let total = tasks.iter().filter(|task| task.due_date == day).count();
    let completed = tasks
        .iter()
        .filter(|task| task.due_date == day && task.completed)
        .count();
    DayProgress {
        completed,
        total,
        rate: rate(completed, total),
    }
}

pub fn completion_streak(tasks: &[Task], today: NaiveDate) -> u32 {
    let mut streak = 0;
    let mut day = today;
    loop {
        let progress = today_progress(tasks, day);
        if progress.total == 0 || progress.completed < progress.total {
            break;
        }
        streak += 1;
        let Some(previous) = day.pred_opt() else {
            break;
        };
        day = previous;
    }
    streak
}
