use chrono::{Datelike, Duration, NaiveDate, Timelike};

use crate::domain::{CalendarEvent, Task, minutes_since_midnight};

#[derive(Debug, Clone, Copy)]
pub enum DayEntry<'a> {
    Task(&'a Task),
    Event(&'a CalendarEvent),
}

impl<'a> DayEntry<'a> {
    pub fn category_id(&self) -> &str {
        match self {
            DayEntry::Task(task) => &task.category_id,
            DayEntry::Event(event) => &event.category_id,
        }
    }

    pub fn start_minutes(&self) -> Option<u32> {
        match self {
            DayEntry::Task(task) => task.start_time.as_deref().and_then(minutes_since_midnight),
            DayEntry::Event(event) => {
                Some(event.start_time.hour() * 60 + event.start_time.minute())
            }
        }
    }

    pub fn end_minutes(&self) -> Option<u32> {
        match self {
            DayEntry::Task(task) => task.end_time.as_deref().and_then(minutes_since_midnight),
            DayEntry::Event(event) => Some(event.end_time.hour() * 60 + event.end_time.minute()),
        }
    }

    pub fn duration_minutes(&self) -> u32 {
        match self {
            DayEntry::Task(task) => task.duration,
            DayEntry::Event(event) => {
                (event.end_time - event.start_time).num_minutes().max(0) as u32
            }
        }
    }

    fn start_sort_key(&self) -> String {
        match self {
            DayEntry::Task(task) => task.start_sort_key().to_string(),
            DayEntry::Event(event) => event.start_time.format("%H:%M").to_string(),
        }
    }
}

pub fn entries_for_date<'a>(
    tasks: &'a [Task],
    events: &'a [CalendarEvent],
    date: NaiveDate,
) -> Vec<DayEntry<'a>> {
    let mut entries = tasks
        .iter()
        .filter(|task| task.due_date == date)
        .map(DayEntry::Task)
        .chain(
            events
                .iter()
                .filter(|event| event.start_time.date() == date)
                .map(DayEntry::Event),
        )
        .collect::<Vec<_>>();

    entries.sort_by_key(|entry| entry.start_sort_key());
    entries
}

pub fn month_grid(year: i32, month: u32) -> Vec<NaiveDate> {
    let first = NaiveDate::from_ymd_opt(year, month, 1).expect("first of month must be valid");
    let leading = first.weekday().num_days_from_sunday() as i64;
    let grid_start = first - Duration::days(leading);

    let covered = leading as u32 + days_in_month(year, month);
    let weeks = covered.div_ceil(7);

    (0..weeks as i64 * 7)
        .map(|offset| grid_start + Duration::days(offset))
        .collect()
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1).expect("next year date should be valid")
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1).expect("next month date should be valid")
    };
    (first_of_next - Duration::days(1)).day()
}

pub fn first_day_of_month(day: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(day.year(), day.month(), 1).expect("first day of month must be valid")
}

pub fn shift_month(day: NaiveDate, delta: i32) -> NaiveDate {
    let mut year = day.year();
    let mut month = day.month() as i32 + delta;
    while month > 12 {
        year += 1;
        month -= 12;
    }
    while month < 1 {
        year -= 1;
        month += 12;
    }
    let month_u32 = month as u32;
    let max_day = days_in_month(year, month_u32);
    let target_day = day.day().min(max_day);
    NaiveDate::from_ymd_opt(year, month_u32, target_day).expect("shifted month date must be valid")
}

pub fn day_view_offset(start_minutes: u32, hour_height: u32) -> f64 {
    start_minutes as f64 / 60.0 * hour_height as f64
}

pub fn day_view_height(duration_minutes: u32, hour_height: u32) -> f64 {
    duration_minutes as f64 / 60.0 * hour_height as f64
}

#[derive(Debug)]
pub enum ScheduleSlot<'a> {
    Free { start_minutes: u32, minutes: u32 },
    Entry { start_minutes: Option<u32>, entry: DayEntry<'a> },
}

pub fn day_schedule<'a>(
    entries: Vec<DayEntry<'a>>,
    day_start_hour: u32,
    day_end_hour: u32,
) -> Vec<ScheduleSlot<'a>> {
    let mut slots = Vec::new();
    let mut cursor = day_start_hour * 60;

    for entry in entries {
        let start = entry.start_minutes();
        if let Some(start) = start {
            if start > cursor {
                slots.push(ScheduleSlot::Free {
                    start_minutes: cursor,
                    minutes: start - cursor,
                });
            }
        }

        let end = entry.end_minutes();
        slots.push(ScheduleSlot::Entry { start_minutes: start, entry });

        if let Some(end) = end {
            cursor = cursor.max(end);
        }
    }

    let day_end = day_end_hour * 60;
    if day_end > cursor {
        slots.push(ScheduleSlot::Free {
            start_minutes: cursor,
            minutes: day_end - cursor,
        });
    }

    slots
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, NaiveDate, Weekday};

    use crate::domain::{CalendarEvent, Priority, Task};

    use super::{
        ScheduleSlot, day_schedule, day_view_height, day_view_offset, entries_for_date,
        month_grid, shift_month,
    };

    fn task(title: &str, due: NaiveDate, start: Option<&str>, end: Option<&str>) -> Task {
        Task {
            id: title.to_string(),
            title: title.to_string(),
            category_id: "c1".to_string(),
            priority: Priority::Medium,
            completed: false,
            due_date: due,
            start_time: start.map(str::to_string),
            end_time: end.map(str::to_string),
            duration: 30,
        }
    }

    #[test]
    fn month_grid_is_whole_sunday_started_weeks() {
        // March 2026 starts on a Sunday and has 31 days: five weeks exactly.
        let grid = month_grid(2026, 3);
        assert_eq!(grid.len() % 7, 0);
        assert_eq!(grid.len(), 35);
        assert_eq!(grid[0].weekday(), Weekday::Sun);
        assert_eq!(grid[0], NaiveDate::from_ymd_opt(2026, 3, 1).expect("date should be valid"));

        // May 2026 starts on a Friday: leading April days pad the grid.
        let grid = month_grid(2026, 5);
        assert_eq!(grid.len() % 7, 0);
        assert_eq!(grid[0].weekday(), Weekday::Sun);
        assert_eq!(grid[0].month(), 4);
        assert!(grid.contains(&NaiveDate::from_ymd_opt(2026, 5, 31).expect("date should be valid")));
    }

    #[test]
    fn entries_merge_tasks_and_events_in_start_order() {
        let due = NaiveDate::from_ymd_opt(2026, 3, 4).expect("date should be valid");
        let tasks = vec![
            task("Timed", due, Some("09:00"), Some("10:00")),
            task("Untimed", due, None, None),
            task("Elsewhere", due.succ_opt().expect("next day should exist"), None, None),
        ];
        let events = vec![CalendarEvent {
            id: "e1".to_string(),
            category_id: "c1".to_string(),
            start_time: due.and_hms_opt(8, 30, 0).expect("time should be valid"),
            end_time: due.and_hms_opt(9, 0, 0).expect("time should be valid"),
        }];

        let entries = entries_for_date(&tasks, &events, due);
        assert_eq!(entries.len(), 3);
        assert!(entries[0].start_minutes().is_none());
        assert_eq!(entries[1].start_minutes(), Some(8 * 60 + 30));
        assert_eq!(entries[2].start_minutes(), Some(9 * 60));
    }

    #[test]
    fn day_view_mapping_is_linear() {
        assert_eq!(day_view_offset(9 * 60, 60), 540.0);
        assert_eq!(day_view_offset(90, 60), 90.0);
        assert_eq!(day_view_height(60, 60), 60.0);
        assert_eq!(day_view_height(45, 60), 45.0);
        assert_eq!(day_view_offset(0, 60), 0.0);
    }

    #[test]
    fn day_schedule_inserts_free_gaps() {
        let due = NaiveDate::from_ymd_opt(2026, 3, 4).expect("date should be valid");
        let tasks = vec![
            task("Morning", due, Some("09:00"), Some("10:00")),
            task("Afternoon", due, Some("14:00"), Some("15:00")),
        ];
        let entries = entries_for_date(&tasks, &[], due);
        let slots = day_schedule(entries, 8, 22);

        // free 08:00-09:00, task, free 10:00-14:00, task, free 15:00-22:00
        assert_eq!(slots.len(), 5);
        match &slots[0] {
            ScheduleSlot::Free { start_minutes, minutes } => {
                assert_eq!(*start_minutes, 8 * 60);
                assert_eq!(*minutes, 60);
            }
            other => panic!("expected leading free slot, got {other:?}"),
        }
        match &slots[2] {
            ScheduleSlot::Free { minutes, .. } => assert_eq!(*minutes, 4 * 60),
            other => panic!("expected midday free slot, got {other:?}"),
        }
        match &slots[4] {
            ScheduleSlot::Free { minutes, .. } => assert_eq!(*minutes, 7 * 60),
            other => panic!("expected trailing free slot, got {other:?}"),
        }
    }

    #[test]
    fn shift_month_clamps_to_month_end() {
        let end_of_january = NaiveDate::from_ymd_opt(2026, 1, 31).expect("date should be valid");
        let shifted = shift_month(end_of_january, 1);
        assert_eq!(shifted, NaiveDate::from_ymd_opt(2026, 2, 28).expect("date should be valid"));
        assert_eq!(shift_month(shifted, -1), NaiveDate::from_ymd_opt(2026, 1, 28).expect("date should be valid"));
    }
}
