mod analytics;
mod domain;
mod schedule;
mod storage;
mod stores;
mod ui;
mod workspace;

use std::error::Error;
use std::fs;
use std::path::PathBuf;

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};

use crate::analytics::{completion_stats, completion_streak, daily_distribution, today_progress, total_time_spent};
use crate::domain::{Priority, TaskDraft, format_minutes, optional_text, weekday_name};
use crate::schedule::{ScheduleSlot, day_schedule, entries_for_date, first_day_of_month, month_grid, DayEntry};
use crate::ui::run_dashboard;
use crate::workspace::{Workspace, resolve_data_dir};

#[derive(Debug, Parser)]
#[command(name = "tempo-dayplanner", about = "Terminal-first task and calendar planner")]
struct Cli {
	#[arg(long)]
	data_dir: Option<PathBuf>,
	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
	Init,
	Dashboard,
	AddCategory {
		#[arg(long)]
		label: String,
		#[arg(long)]
		color: String,
	},
	EditCategory {
		#[arg(long)]
		id: String,
		#[arg(long)]
		label: Option<String>,
		#[arg(long)]
		color: Option<String>,
	},
	DeleteCategory {
		#[arg(long)]
		id: String,
	},
	ListCategories,
	AddTask {
		#[arg(long)]
		title: String,
		#[arg(long)]
		category: String,
		#[arg(long, default_value = "medium")]
		priority: String,
		#[arg(long)]
		due: Option<String>,
		#[arg(long)]
		start: Option<String>,
		#[arg(long)]
		end: Option<String>,
		#[arg(long, default_value_t = 30)]
		duration: u32,
	},
	EditTask {
		#[arg(long)]
		id: String,
		#[arg(long)]
		title: Option<String>,
		#[arg(long)]
		category: Option<String>,
		#[arg(long)]
		priority: Option<String>,
		#[arg(long)]
		due: Option<String>,
		#[arg(long)]
		start: Option<String>,
		#[arg(long)]
		end: Option<String>,
		#[arg(long)]
		duration: Option<u32>,
	},
	Toggle {
		#[arg(long)]
		id: String,
	},
	DeleteTask {
		#[arg(long)]
		id: String,
	},
	ListTasks,
	Agenda {
		#[arg(long)]
		day: Option<String>,
	},
	Month {
		#[arg(long)]
		month: Option<String>,
	},
	AddBlock {
		#[arg(long)]
		category: String,
		#[arg(long)]
		start: String,
		#[arg(long)]
		end: String,
		#[arg(long, value_delimiter = ',')]
		days: Vec<u8>,
	},
	DeleteBlock {
		#[arg(long)]
		id: String,
	},
	ListBlocks,
	AddEvent {
		#[arg(long)]
		category: String,
		#[arg(long)]
		start: String,
		#[arg(long)]
		end: String,
	},
	DeleteEvent {
		#[arg(long)]
		id: String,
	},
	ListEvents,
	Stats {
		#[arg(long)]
		day: Option<String>,
		#[arg(long)]
		window: Option<u32>,
	},
}

fn main() {
	if let Err(err) = run() {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn run() -> Result<(), Box<dyn Error>> {
	let cli = Cli::parse();

	let data_dir = resolve_data_dir(cli.data_dir);
	let mut workspace = Workspace::load(&data_dir);

	match cli.command.unwrap_or(Command::Dashboard) {
		Command::Init => {
			fs::create_dir_all(&data_dir)?;
			workspace.flush()?;
			println!("initialized planner data at {}", data_dir.display());
		}
		Command::Dashboard => {
			run_dashboard(&mut workspace)?;
		}
		Command::AddCategory { label, color } => {
			let id = workspace.categories.create(&label, &color)?;
			println!("created category {id}");
		}
		Command::EditCategory { id, label, color } => {
			let Some(existing) = workspace.categories.get(&id).cloned() else {
				println!("category {id} not found; nothing to update");
				return Ok(());
			};
			let mut next = existing;
			if let Some(label) = label {
				next.label = label;
			}
			if let Some(color) = color {
				next.color = color;
			}
			workspace.categories.update(next)?;
			println!("updated category {id}");
		}
		Command::DeleteCategory { id } => {
			workspace.categories.delete(&id);
			println!("deleted category {id} (referencing tasks and blocks are kept)");
		}
		Command::ListCategories => {
			print_categories(&workspace);
		}
		Command::AddTask {
			title,
			category,
			priority,
			due,
			start,
			end,
			duration,
		} => {
			let priority = Priority::parse(&priority)?;
			let due_date = parse_day(due.as_deref())?;

			let had_explicit_times = start.is_some() || end.is_some();
			let (start_time, end_time) =
				workspace.time_blocks.default_times_for(&category, due_date, start, end);
			let autofilled = !had_explicit_times && start_time.is_some();

			let id = workspace.tasks.create(TaskDraft {
				title,
				category_id: category,
				priority,
				due_date,
				start_time: start_time.clone(),
				end_time: end_time.clone(),
				duration,
			})?;

			if autofilled {
				println!(
					"created task {id} ({}-{} from time block)",
					start_time.as_deref().unwrap_or(""),
					end_time.as_deref().unwrap_or("")
				);
			} else {
				println!("created task {id}");
			}
		}
		Command::EditTask {
			id,
			title,
			category,
			priority,
			due,
			start,
			end,
			duration,
		} => {
			let Some(existing) = workspace.tasks.get(&id).cloned() else {
				println!("task {id} not found; nothing to update");
				return Ok(());
			};
			let mut next = existing;
			if let Some(title) = title {
				next.title = title;
			}
			if let Some(category) = category {
				next.category_id = category;
			}
			if let Some(priority) = priority {
				next.priority = Priority::parse(&priority)?;
			}
			if let Some(due) = due {
				next.due_date = parse_day(Some(&due))?;
			}
			// An empty string clears the time back to unscheduled.
			if let Some(start) = start {
				next.start_time = optional_text(&start);
			}
			if let Some(end) = end {
				next.end_time = optional_text(&end);
			}
			if let Some(duration) = duration {
				next.duration = duration;
			}
			workspace.tasks.update(next)?;
			println!("updated task {id}");
		}
		Command::Toggle { id } => {
			workspace.tasks.toggle_completion(&id);
			match workspace.tasks.get(&id) {
				Some(task) if task.completed => println!("completed: {}", task.title),
				Some(task) => println!("reopened: {}", task.title),
				None => println!("task {id} not found; nothing to toggle"),
			}
		}
		Command::DeleteTask { id } => {
			workspace.tasks.delete(&id);
			println!("deleted task {id}");
		}
		Command::ListTasks => {
			print_tasks(&workspace);
		}
		Command::Agenda { day } => {
			let day = parse_day(day.as_deref())?;
			print_agenda(&workspace, day);
		}
		Command::Month { month } => {
			let first = parse_month(month.as_deref())?;
			print_month(&workspace, first);
		}
		Command::AddBlock {
			category,
			start,
			end,
			days,
		} => {
			let id = workspace.time_blocks.create(&category, &start, &end, days)?;
			println!("created time block {id}");
		}
		Command::DeleteBlock { id } => {
			workspace.time_blocks.delete(&id);
			println!("deleted time block {id}");
		}
		Command::ListBlocks => {
			print_blocks(&workspace);
		}
		Command::AddEvent { category, start, end } => {
			let start = parse_datetime(&start)?;
			let end = parse_datetime(&end)?;
			let id = workspace.calendar_events.create(&category, start, end)?;
			println!("created calendar event {id}");
		}
		Command::DeleteEvent { id } => {
			workspace.calendar_events.delete(&id);
			println!("deleted calendar event {id}");
		}
		Command::ListEvents => {
			print_events(&workspace);
		}
		Command::Stats { day, window } => {
			let day = parse_day(day.as_deref())?;
			let window = window.unwrap_or(workspace.config.stats_window_days);
			print_stats(&workspace, day, window);
		}
	}

	workspace.flush()?;
	Ok(())
}

fn parse_datetime(input: &str) -> Result<NaiveDateTime, Box<dyn Error>> {
	Ok(NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M")?)
}

fn parse_day(input: Option<&str>) -> Result<NaiveDate, Box<dyn Error>> {
	if let Some(raw) = input {
		Ok(NaiveDate::parse_from_str(raw, "%Y-%m-%d")?)
	} else {
		Ok(Local::now().date_naive())
	}
}

fn parse_month(input: Option<&str>) -> Result<NaiveDate, Box<dyn Error>> {
	if let Some(raw) = input {
		let first = NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d")?;
		Ok(first)
	} else {
		Ok(first_day_of_month(Local::now().date_naive()))
	}
}

fn print_categories(workspace: &Workspace) {
	if workspace.categories.list().is_empty() {
		println!("no categories yet");
		return;
	}

	for category in workspace.categories.list() {
		println!("{} | {} | {}", category.id, category.color, category.label);
	}
}

fn print_tasks(workspace: &Workspace) {
	if workspace.tasks.list().is_empty() {
		println!("no tasks yet");
		return;
	}

	for task in workspace.tasks.list() {
		let marker = if task.completed { "[x]" } else { "[ ]" };
		let times = match (&task.start_time, &task.end_time) {
			(Some(start), Some(end)) => format!("{start}-{end}"),
			(Some(start), None) => format!("{start}-"),
			_ => "unscheduled".to_string(),
		};
		println!(
			"{} {} | {} | {} | {} | {} | {} | {}",
			marker,
			task.id,
			task.due_date.format("%Y-%m-%d"),
			times,
			format_minutes(task.duration),
			task.priority.label(),
			workspace.categories.label_for(&task.category_id),
			task.title
		);
	}
}

fn print_blocks(workspace: &Workspace) {
	if workspace.time_blocks.list().is_empty() {
		println!("no time blocks yet");
		return;
	}

	for block in workspace.time_blocks.list() {
		let days = if block.days_of_week.is_empty() {
			"every day".to_string()
		} else {
			block
				.days_of_week
				.iter()
				.map(|day| weekday_name(*day))
				.collect::<Vec<_>>()
				.join(",")
		};
		println!(
			"{} | {}-{} | {} | {}",
			block.id,
			block.start_time,
			block.end_time,
			days,
			workspace.categories.label_for(&block.category_id)
		);
	}
}

fn print_events(workspace: &Workspace) {
	if workspace.calendar_events.list().is_empty() {
		println!("no calendar events yet");
		return;
	}

	for event in workspace.calendar_events.list() {
		println!(
			"{} | {} -> {} | {}",
			event.id,
			event.start_time.format("%Y-%m-%d %H:%M"),
			event.end_time.format("%Y-%m-%d %H:%M"),
			workspace.categories.label_for(&event.category_id)
		);
	}
}

fn print_agenda(workspace: &Workspace, day: NaiveDate) {
	println!("agenda for {}", day.format("%A, %d %B %Y"));

	let entries = entries_for_date(workspace.tasks.list(), workspace.calendar_events.list(), day);
	if entries.is_empty() {
		println!("nothing scheduled for this day");
		return;
	}

	let slots = day_schedule(
		entries,
		workspace.config.day_start_hour,
		workspace.config.day_end_hour,
	);
	for slot in slots {
		match slot {
			ScheduleSlot::Free { start_minutes, minutes } => {
				println!(
					"{:02}:{:02} free time ({})",
					start_minutes / 60,
					start_minutes % 60,
					format_minutes(minutes)
				);
			}
			ScheduleSlot::Entry { start_minutes, entry } => {
				let clock = match start_minutes {
					Some(start) => format!("{:02}:{:02}", start / 60, start % 60),
					None => "--:--".to_string(),
				};
				match entry {
					DayEntry::Task(task) => {
						let marker = if task.completed { "[x]" } else { "[ ]" };
						println!(
							"{clock} {marker} {} | {} | {}",
							task.title,
							format_minutes(task.duration),
							workspace.categories.label_for(&task.category_id)
						);
					}
					DayEntry::Event(event) => {
						println!(
							"{clock} --- {} ({})",
							workspace.categories.label_for(&event.category_id),
							format_minutes(entry.duration_minutes())
						);
					}
				}
			}
		}
	}
}

fn print_month(workspace: &Workspace, first: NaiveDate) {
	println!("{} {}", first.format("%B"), first.year());
	println!(" Su  Mo  Tu  We  Th  Fr  Sa");

	let grid = month_grid(first.year(), first.month());
	for week in grid.chunks(7) {
		let mut row = String::new();
		for day in week {
			let count = workspace.tasks.tasks_for_date(*day).len();
			let marker = if count > 0 { '*' } else { ' ' };
			if day.month() == first.month() {
				row.push_str(&format!("{:>3}{marker}", day.day()));
			} else {
				row.push_str(&format!("  .{marker}"));
			}
		}
		println!("{row}");
	}
	println!("(* = day with tasks, . = adjacent month)");
}

fn print_stats(workspace: &Workspace, day: NaiveDate, window: u32) {
	let tasks = workspace.tasks.list();

	let progress = today_progress(tasks, day);
	println!(
		"{}: {}/{} done",
		day.format("%Y-%m-%d"),
		progress.completed,
		progress.total
	);
	println!("streak: {} days", completion_streak(tasks, day));
	println!("time on completed tasks: {}", format_minutes(total_time_spent(tasks)));

	println!("\nby category:");
	let stats = completion_stats(tasks, workspace.categories.list());
	if stats.is_empty() {
		println!("(no categories)");
	}
	for row in &stats {
		println!(
			"{:>3}% | {}/{} | {}",
			(row.rate * 100.0).round() as u32,
			row.completed,
			row.total,
			row.label
		);
	}

	println!("\nlast {window} days:");
	for count in daily_distribution(tasks, day, window) {
		let width = if count.total == 0 {
			0
		} else {
			(count.completed as f64 / count.total as f64 * 16.0).round() as usize
		};
		println!(
			"{} {:>2}/{:<2} {}",
			count.day.format("%a"),
			count.completed,
			count.total,
			"=".repeat(width)
		);
	}
}
