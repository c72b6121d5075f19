use std::collections::HashSet;
use std::error::Error;
use std::io;
use std::time::Duration as StdDuration;

use chrono::{Datelike, Duration, Local, NaiveDate};
use crossterm::event::{self, Event as CEvent, KeyCode, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, ExecutableCommand};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph};
use ratatui::{Frame, Terminal};

use crate::analytics::{completion_stats, completion_streak, daily_distribution, today_progress, total_time_spent};
use crate::domain::{Priority, TaskDraft, format_minutes, optional_text, parse_clock_time};
use crate::schedule::{
	DayEntry, ScheduleSlot, day_schedule, day_view_height, day_view_offset, entries_for_date,
	first_day_of_month, month_grid, shift_month,
};
use crate::workspace::Workspace;

const FOCUSED_PANEL_BORDER_COLOR: Color = Color::Yellow;
const INACTIVE_PANEL_BORDER_COLOR: Color = Color::DarkGray;
const HIGHLIGHT_BACKGROUND_COLOR: Color = Color::Rgb(42, 45, 52);
const STATS_BAR_WIDTH: f64 = 14.0;

pub fn run_dashboard(workspace: &mut Workspace) -> Result<(), Box<dyn Error>> {
	enable_raw_mode()?;
	let mut stdout = io::stdout();
	stdout.execute(EnterAlternateScreen)?;
	let backend = CrosstermBackend::new(stdout);
	let mut terminal = Terminal::new(backend)?;

	let result = run_event_loop(&mut terminal, workspace);

	disable_raw_mode()?;
	execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
	terminal.show_cursor()?;

	result
}

fn run_event_loop(
	terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
	workspace: &mut Workspace,
) -> Result<(), Box<dyn Error>> {
	let mut app = App::default();

	loop {
		let view = build_view(&app, workspace);
		app.clamp_selection(&view);
		terminal.draw(|frame| draw_dashboard(frame, &app, &view))?;

		if event::poll(StdDuration::from_millis(250))? {
			if let CEvent::Key(key) = event::read()? {
				if key.kind != KeyEventKind::Press {
					continue;
				}

				let should_quit = match &app.mode {
					InputMode::Prompt(_) => handle_prompt_key(&mut app, key.code, workspace),
					InputMode::Select(_) => handle_select_key(&mut app, key.code, workspace),
					InputMode::Normal => handle_normal_key(&mut app, key.code, workspace, &view),
				};

				if should_quit {
					break;
				}
			}
		}
	}

	Ok(())
}

fn draw_dashboard(frame: &mut Frame, app: &App, view: &ViewModel) {
	let layout = Layout::default()
		.direction(Direction::Vertical)
		.constraints([Constraint::Min(12), Constraint::Length(4)])
		.split(frame.area());

	let body = Layout::default()
		.direction(Direction::Horizontal)
		.constraints([
			Constraint::Percentage(26),
			Constraint::Percentage(44),
			Constraint::Percentage(30),
		])
		.split(layout[0]);

	let left = Layout::default()
		.direction(Direction::Vertical)
		.constraints([Constraint::Length(10), Constraint::Min(8)])
		.split(body[0]);

	render_calendar_panel(frame, left[0], app, &view.busy_days);
	render_timeline_panel(frame, left[1], view);
	render_day_panel(frame, body[1], app, view);
	render_stats_panel(frame, body[2], view);
	render_footer(frame, layout[1], app);

	if let InputMode::Select(select) = &app.mode {
		render_select_popup(frame, select);
	}
}

fn render_calendar_panel(frame: &mut Frame, area: Rect, app: &App, busy_days: &HashSet<NaiveDate>) {
	let month = app.calendar_month;
	let mut lines = Vec::new();
	lines.push(Line::from(format!("{} {}", month.format("%B"), month.year())));
	lines.push(Line::from("Su Mo Tu We Th Fr Sa"));

	for week in month_grid(month.year(), month.month()).chunks(7) {
		let mut spans = Vec::new();
		for day in week {
			let mut style = Style::default();
			if day.month() != month.month() {
				style = style.fg(Color::DarkGray);
			}
			if busy_days.contains(day) {
				style = style.fg(Color::LightYellow).add_modifier(Modifier::BOLD);
			}
			if *day == app.selected_day {
				style = Style::default()
					.fg(Color::Black)
					.bg(Color::Yellow)
					.add_modifier(Modifier::BOLD);
			}
			spans.push(Span::styled(format!("{:>2} ", day.day()), style));
		}
		lines.push(Line::from(spans));
	}

	let block = Block::default()
		.borders(Borders::ALL)
		.title("Calendar")
		.border_style(border_style(app.focus == FocusPane::Calendar));
	frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_timeline_panel(frame: &mut Frame, area: Rect, view: &ViewModel) {
	let panel = Paragraph::new(view.timeline.clone())
		.block(Block::default().borders(Borders::ALL).title("Timeline"));
	frame.render_widget(panel, area);
}

fn render_day_panel(frame: &mut Frame, area: Rect, app: &App, view: &ViewModel) {
	let items = if view.day_rows.is_empty() {
		vec![ListItem::new("(nothing scheduled)")]
	} else {
		view.day_rows
			.iter()
			.map(|row| ListItem::new(row.line.clone()))
			.collect::<Vec<_>>()
	};

	let mut state = ListState::default();
	if !view.day_rows.is_empty() {
		state.select(Some(app.day_index.min(view.day_rows.len() - 1)));
	}

	let title = app.selected_day.format("%A, %d %B %Y").to_string();
	let list = List::new(items)
		.block(
			Block::default()
				.borders(Borders::ALL)
				.title(title)
				.border_style(border_style(app.focus == FocusPane::Day)),
		)
		.highlight_style(Style::default().bg(HIGHLIGHT_BACKGROUND_COLOR).add_modifier(Modifier::BOLD));

	frame.render_stateful_widget(list, area, &mut state);
}

fn render_stats_panel(frame: &mut Frame, area: Rect, view: &ViewModel) {
	let panel = Paragraph::new(view.stats_lines.clone())
		.block(Block::default().borders(Borders::ALL).title("Progress"));
	frame.render_widget(panel, area);
}

fn render_footer(frame: &mut Frame, area: Rect, app: &App) {
	let footer_lines = match &app.mode {
		InputMode::Normal => vec![
			Line::from("Tab pane | arrows/hjkl navigate | n/N month | g today | q quit"),
			Line::from("space toggle done | d delete | t task | c category | b time block | e event"),
			Line::from(app.status.clone()),
		],
		InputMode::Prompt(prompt) => vec![
			Line::from(prompt.title.clone()),
			Line::from(format!("> {}", prompt.input)),
			Line::from("Enter submit | Esc cancel"),
		],
		InputMode::Select(select) => vec![
			Line::from(select.title.clone()),
			Line::from(format!(
				"Selected: {}",
				select
					.selected_option()
					.map(|option| option.label.as_str())
					.unwrap_or("(none)")
			)),
			Line::from("j/k or arrows move | Enter choose | Esc cancel"),
		],
	};

	let footer = Paragraph::new(footer_lines).block(Block::default().borders(Borders::ALL).title("Shortcuts"));
	frame.render_widget(footer, area);
}

fn render_select_popup(frame: &mut Frame, select: &SelectState) {
	let area = centered_rect(62, 55, frame.area());
	frame.render_widget(Clear, area);

	let items = if select.options.is_empty() {
		vec![ListItem::new("(no choices)")]
	} else {
		select
			.options
			.iter()
			.map(|option| ListItem::new(option.label.clone()).style(option.style))
			.collect::<Vec<_>>()
	};

	let current = if select.options.is_empty() {
		0
	} else {
		select.selected.saturating_add(1)
	};
	let total = select.options.len();
	let list = List::new(items)
		.block(
			Block::default()
				.borders(Borders::ALL)
				.title(format!("{} ({current}/{total})", select.title)),
		)
		.highlight_symbol(">> ")
		.highlight_style(Style::default().bg(HIGHLIGHT_BACKGROUND_COLOR));

	let mut state = ListState::default();
	if !select.options.is_empty() {
		state.select(Some(select.selected.min(select.options.len().saturating_sub(1))));
	}
	frame.render_stateful_widget(list, area, &mut state);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
	let popup_layout = Layout::default()
		.direction(Direction::Vertical)
		.constraints([
			Constraint::Percentage((100 - percent_y) / 2),
			Constraint::Percentage(percent_y),
			Constraint::Percentage((100 - percent_y) / 2),
		])
		.split(area);
	Layout::default()
		.direction(Direction::Horizontal)
		.constraints([
			Constraint::Percentage((100 - percent_x) / 2),
			Constraint::Percentage(percent_x),
			Constraint::Percentage((100 - percent_x) / 2),
		])
		.split(popup_layout[1])[1]
}

fn handle_normal_key(
	app: &mut App,
	code: KeyCode,
	workspace: &mut Workspace,
	view: &ViewModel,
) -> bool {
	match code {
		KeyCode::Char('q') | KeyCode::Esc => true,
		KeyCode::Tab | KeyCode::BackTab => {
			app.focus = app.focus.other();
			false
		}
		KeyCode::Up | KeyCode::Char('k') => {
			match app.focus {
				FocusPane::Calendar => app.shift_selected_day(-7),
				FocusPane::Day => app.move_day_selection(-1, view),
			}
			false
		}
		KeyCode::Down | KeyCode::Char('j') => {
			match app.focus {
				FocusPane::Calendar => app.shift_selected_day(7),
				FocusPane::Day => app.move_day_selection(1, view),
			}
			false
		}
		KeyCode::Left | KeyCode::Char('h') => {
			if app.focus == FocusPane::Calendar {
				app.shift_selected_day(-1);
			}
			false
		}
		KeyCode::Right | KeyCode::Char('l') => {
			if app.focus == FocusPane::Calendar {
				app.shift_selected_day(1);
			}
			false
		}
		KeyCode::Char('n') => {
			app.shift_selected_month(1);
			false
		}
		KeyCode::Char('N') => {
			app.shift_selected_month(-1);
			false
		}
		KeyCode::Char('g') => {
			app.selected_day = Local::now().date_naive();
			app.calendar_month = first_day_of_month(app.selected_day);
			app.day_index = 0;
			false
		}
		KeyCode::Char(' ') => {
			match app.selected_row(view) {
				Some(DayRowKind::Task { task_id, .. }) => {
					let task_id = task_id.clone();
					workspace.tasks.toggle_completion(&task_id);
					app.status = match workspace.tasks.get(&task_id) {
						Some(task) if task.completed => format!("completed: {}", task.title),
						Some(task) => format!("reopened: {}", task.title),
						None => "task no longer exists".to_string(),
					};
				}
				Some(DayRowKind::Event { .. }) => {
					app.status = "events have no completion state".to_string();
				}
				_ => {
					app.status = "select a task in the day panel first".to_string();
				}
			}
			false
		}
		KeyCode::Char('d') => {
			match app.selected_row(view) {
				Some(DayRowKind::Task { task_id, title, .. }) => {
					app.mode = InputMode::Select(build_delete_confirm(
						DeleteKind::Task,
						task_id.clone(),
						title.clone(),
					));
				}
				Some(DayRowKind::Event { event_id, label }) => {
					app.mode = InputMode::Select(build_delete_confirm(
						DeleteKind::Event,
						event_id.clone(),
						label.clone(),
					));
				}
				_ => {
					app.status = "select a task or event in the day panel first".to_string();
				}
			}
			false
		}
		KeyCode::Char('c') => {
			app.mode = InputMode::Prompt(PromptState::new("Category label", PromptKind::CategoryLabel));
			false
		}
		KeyCode::Char('t') => {
			if workspace.categories.list().is_empty() {
				app.status = "create a category first (press c)".to_string();
			} else {
				app.mode = InputMode::Prompt(PromptState::new("Task title", PromptKind::TaskTitle));
			}
			false
		}
		KeyCode::Char('b') => {
			match build_category_select(workspace, CategoryPick::Block) {
				Ok(select) => app.mode = InputMode::Select(select),
				Err(err) => app.status = err,
			}
			false
		}
		KeyCode::Char('e') => {
			match build_category_select(workspace, CategoryPick::Event) {
				Ok(select) => app.mode = InputMode::Select(select),
				Err(err) => app.status = err,
			}
			false
		}
		_ => false,
	}
}

fn handle_prompt_key(app: &mut App, code: KeyCode, workspace: &mut Workspace) -> bool {
	match code {
		KeyCode::Esc => {
			app.mode = InputMode::Normal;
			app.status = "Input cancelled".to_string();
		}
		KeyCode::Backspace => {
			if let InputMode::Prompt(prompt) = &mut app.mode {
				prompt.input.pop();
			}
		}
		KeyCode::Char(value) => {
			if let InputMode::Prompt(prompt) = &mut app.mode {
				prompt.input.push(value);
			}
		}
		KeyCode::Enter => {
			let prompt = match std::mem::replace(&mut app.mode, InputMode::Normal) {
				InputMode::Prompt(prompt) => prompt,
				InputMode::Normal | InputMode::Select(_) => return false,
			};

			match submit_prompt(prompt.clone(), workspace, app.selected_day) {
				Ok(PromptOutcome::NextPrompt(next_prompt)) => app.mode = InputMode::Prompt(next_prompt),
				Ok(PromptOutcome::Select(select)) => app.mode = InputMode::Select(select),
				Ok(PromptOutcome::Done(message)) => {
					app.mode = InputMode::Normal;
					app.status = message;
				}
				Err(err) => {
					app.mode = InputMode::Prompt(prompt);
					app.status = format!("error: {err}");
				}
			}
		}
		_ => {}
	}

	false
}

fn handle_select_key(app: &mut App, code: KeyCode, workspace: &mut Workspace) -> bool {
	match code {
		KeyCode::Esc => {
			app.mode = InputMode::Normal;
			app.status = "Selection cancelled".to_string();
		}
		KeyCode::Up | KeyCode::Char('k') => {
			if let InputMode::Select(select) = &mut app.mode {
				select.move_selection(-1);
			}
		}
		KeyCode::Down | KeyCode::Char('j') => {
			if let InputMode::Select(select) = &mut app.mode {
				select.move_selection(1);
			}
		}
		KeyCode::Enter => {
			let select = match std::mem::replace(&mut app.mode, InputMode::Normal) {
				InputMode::Select(select) => select,
				_ => return false,
			};

			match submit_select(select.clone(), workspace) {
				Ok(SelectOutcome::NextPrompt(prompt)) => app.mode = InputMode::Prompt(prompt),
				Ok(SelectOutcome::NextSelect(next_select)) => app.mode = InputMode::Select(next_select),
				Ok(SelectOutcome::Done(message)) => {
					app.mode = InputMode::Normal;
					app.status = message;
				}
				Err(err) => {
					app.mode = InputMode::Select(select);
					app.status = format!("error: {err}");
				}
			}
		}
		_ => {}
	}

	false
}

fn submit_prompt(
	prompt: PromptState,
	workspace: &mut Workspace,
	selected_day: NaiveDate,
) -> Result<PromptOutcome, String> {
	match prompt.kind {
		PromptKind::CategoryLabel => {
			let label = required_text(&prompt.input, "category label")?;
			Ok(PromptOutcome::NextPrompt(PromptState::new(
				"Category color (#RRGGBB)",
				PromptKind::CategoryColor { label },
			)))
		}
		PromptKind::CategoryColor { label } => {
			let color = required_text(&prompt.input, "category color")?;
			let created_label = label.clone();
			workspace.categories.create(&label, &color)?;
			Ok(PromptOutcome::Done(format!("created category: {created_label}")))
		}
		PromptKind::TaskTitle => {
			let title = required_text(&prompt.input, "task title")?;
			Ok(PromptOutcome::Select(build_task_category_select(workspace, title)?))
		}
		PromptKind::TaskDuration {
			title,
			category_id,
			priority,
		} => {
			let duration = if prompt.input.trim().is_empty() {
				30
			} else {
				prompt
					.input
					.trim()
					.parse::<u32>()
					.map_err(|_| format!("invalid duration '{}'", prompt.input.trim()))?
			};

			let mut next = PromptState::new(
				"Start time (HH:MM, empty to skip)",
				PromptKind::TaskStart {
					title,
					category_id: category_id.clone(),
					priority,
					duration,
				},
			);
			let (default_start, _) = workspace
				.time_blocks
				.default_times_for(&category_id, selected_day, None, None);
			if let Some(start) = default_start {
				next.input = start;
			}
			Ok(PromptOutcome::NextPrompt(next))
		}
		PromptKind::TaskStart {
			title,
			category_id,
			priority,
			duration,
		} => {
			let start_time = optional_text(&prompt.input);
			if let Some(start) = &start_time {
				parse_clock_time(start)?;
			}

			let mut next = PromptState::new(
				"End time (HH:MM, empty to skip)",
				PromptKind::TaskEnd {
					title,
					category_id: category_id.clone(),
					priority,
					duration,
					start_time,
				},
			);
			let (_, default_end) = workspace
				.time_blocks
				.default_times_for(&category_id, selected_day, None, None);
			if let Some(end) = default_end {
				next.input = end;
			}
			Ok(PromptOutcome::NextPrompt(next))
		}
		PromptKind::TaskEnd {
			title,
			category_id,
			priority,
			duration,
			start_time,
		} => {
			let end_time = optional_text(&prompt.input);
			let created_title = title.clone();
			workspace.tasks.create(TaskDraft {
				title,
				category_id,
				priority,
				due_date: selected_day,
				start_time,
				end_time,
				duration,
			})?;
			Ok(PromptOutcome::Done(format!("created task: {created_title}")))
		}
		PromptKind::BlockStart { category_id } => {
			let start = required_text(&prompt.input, "start time")?;
			parse_clock_time(&start)?;
			Ok(PromptOutcome::NextPrompt(PromptState::new(
				"End time (HH:MM)",
				PromptKind::BlockEnd { category_id, start },
			)))
		}
		PromptKind::BlockEnd { category_id, start } => {
			let end = required_text(&prompt.input, "end time")?;
			parse_clock_time(&end)?;
			Ok(PromptOutcome::NextPrompt(PromptState::new(
				"Days of week (0-6, comma separated, empty = every day)",
				PromptKind::BlockDays {
					category_id,
					start,
					end,
				},
			)))
		}
		PromptKind::BlockDays {
			category_id,
			start,
			end,
		} => {
			let days = parse_days_input(&prompt.input)?;
			workspace.time_blocks.create(&category_id, &start, &end, days)?;
			Ok(PromptOutcome::Done("created time block".to_string()))
		}
		PromptKind::EventStart { category_id } => {
			let start = required_text(&prompt.input, "start time")?;
			let start_minutes = parse_clock_time(&start)?;
			let start_time = selected_day
				.and_hms_opt(start_minutes / 60, start_minutes % 60, 0)
				.ok_or_else(|| "invalid start time".to_string())?;
			Ok(PromptOutcome::NextPrompt(PromptState::new(
				"End time (HH:MM)",
				PromptKind::EventEnd {
					category_id,
					start_time,
				},
			)))
		}
		PromptKind::EventEnd {
			category_id,
			start_time,
		} => {
			let end = required_text(&prompt.input, "end time")?;
			let end_minutes = parse_clock_time(&end)?;
			let end_time = selected_day
				.and_hms_opt(end_minutes / 60, end_minutes % 60, 0)
				.ok_or_else(|| "invalid end time".to_string())?;
			workspace.calendar_events.create(&category_id, start_time, end_time)?;
			Ok(PromptOutcome::Done("created calendar event".to_string()))
		}
	}
}

fn submit_select(select: SelectState, workspace: &mut Workspace) -> Result<SelectOutcome, String> {
	let selected_value = select
		.selected_option()
		.map(|option| option.value.clone())
		.ok_or_else(|| "no option selected".to_string())?;

	match select.kind {
		SelectKind::TaskCategory { title } => {
			let category_id = selected_value.ok_or_else(|| "selected category is missing".to_string())?;
			Ok(SelectOutcome::NextSelect(build_priority_select(title, category_id)))
		}
		SelectKind::TaskPriority { title, category_id } => {
			let priority = selected_value
				.as_deref()
				.map(Priority::parse)
				.transpose()?
				.unwrap_or(Priority::Medium);
			Ok(SelectOutcome::NextPrompt(PromptState::new(
				"Duration in minutes (default 30)",
				PromptKind::TaskDuration {
					title,
					category_id,
					priority,
				},
			)))
		}
		SelectKind::BlockCategory => {
			let category_id = selected_value.ok_or_else(|| "selected category is missing".to_string())?;
			Ok(SelectOutcome::NextPrompt(PromptState::new(
				"Start time (HH:MM)",
				PromptKind::BlockStart { category_id },
			)))
		}
		SelectKind::EventCategory => {
			let category_id = selected_value.ok_or_else(|| "selected category is missing".to_string())?;
			Ok(SelectOutcome::NextPrompt(PromptState::new(
				"Start time (HH:MM)",
				PromptKind::EventStart { category_id },
			)))
		}
		SelectKind::DeleteConfirm { kind, id, label } => {
			let action = selected_value
				.as_deref()
				.ok_or_else(|| "selected action is missing".to_string())?;
			if action != "delete" {
				return Ok(SelectOutcome::Done("Delete cancelled".to_string()));
			}

			match kind {
				DeleteKind::Task => workspace.tasks.delete(&id),
				DeleteKind::Event => workspace.calendar_events.delete(&id),
			}
			Ok(SelectOutcome::Done(format!("deleted: {label}")))
		}
	}
}

enum CategoryPick {
	Block,
	Event,
}

fn build_category_select(workspace: &Workspace, pick: CategoryPick) -> Result<SelectState, String> {
	if workspace.categories.list().is_empty() {
		return Err("no categories found. Press 'c' to create one first".to_string());
	}

	let options = workspace
		.categories
		.list()
		.iter()
		.map(|category| {
			SelectOption::new(
				category.label.clone(),
				Some(category.id.clone()),
				Style::default().fg(color_from_hex(&category.color)),
			)
		})
		.collect::<Vec<_>>();

	let kind = match pick {
		CategoryPick::Block => SelectKind::BlockCategory,
		CategoryPick::Event => SelectKind::EventCategory,
	};
	Ok(SelectState::new("Select category", kind, options))
}

fn build_task_category_select(workspace: &Workspace, title: String) -> Result<SelectState, String> {
	if workspace.categories.list().is_empty() {
		return Err("no categories found. Press 'c' to create one first".to_string());
	}

	let options = workspace
		.categories
		.list()
		.iter()
		.map(|category| {
			SelectOption::new(
				category.label.clone(),
				Some(category.id.clone()),
				Style::default().fg(color_from_hex(&category.color)),
			)
		})
		.collect::<Vec<_>>();

	Ok(SelectState::new(
		"Select category",
		SelectKind::TaskCategory { title },
		options,
	))
}

fn build_priority_select(title: String, category_id: String) -> SelectState {
	let options = vec![
		SelectOption::new("low", Some("low".to_string()), Style::default().fg(Color::Gray)),
		SelectOption::new("medium", Some("medium".to_string()), Style::default()),
		SelectOption::new(
			"high",
			Some("high".to_string()),
			Style::default().fg(Color::LightRed),
		),
	];

	let mut select = SelectState::new(
		"Select priority",
		SelectKind::TaskPriority { title, category_id },
		options,
	);
	select.selected = 1;
	select
}

fn build_delete_confirm(kind: DeleteKind, id: String, label: String) -> SelectState {
	let title = format!("Delete '{label}'?");
	let options = vec![
		SelectOption::new(
			"Delete",
			Some("delete".to_string()),
			Style::default().fg(Color::LightRed).add_modifier(Modifier::BOLD),
		),
		SelectOption::new("Cancel", Some("cancel".to_string()), Style::default()),
	];

	let mut select = SelectState::new(title, SelectKind::DeleteConfirm { kind, id, label }, options);
	// Default to cancel to prevent accidental deletions.
	select.selected = 1;
	select
}

fn build_view(app: &App, workspace: &Workspace) -> ViewModel {
	let busy_days = workspace
		.tasks
		.list()
		.iter()
		.map(|task| task.due_date)
		.collect::<HashSet<_>>();

	let entries = entries_for_date(
		workspace.tasks.list(),
		workspace.calendar_events.list(),
		app.selected_day,
	);
	let slots = day_schedule(
		entries,
		workspace.config.day_start_hour,
		workspace.config.day_end_hour,
	);

	let day_rows = slots
		.into_iter()
		.map(|slot| build_day_row(workspace, slot))
		.collect::<Vec<_>>();

	ViewModel {
		busy_days,
		day_rows,
		timeline: build_timeline(workspace, app.selected_day),
		stats_lines: build_stats_lines(workspace),
	}
}

fn build_day_row(workspace: &Workspace, slot: ScheduleSlot<'_>) -> DayRow {
	match slot {
		ScheduleSlot::Free { start_minutes, minutes } => DayRow {
			line: Line::from(Span::styled(
				format!(
					"{:02}:{:02}      free ({})",
					start_minutes / 60,
					start_minutes % 60,
					format_minutes(minutes)
				),
				Style::default().fg(Color::DarkGray),
			)),
			kind: DayRowKind::Free,
		},
		ScheduleSlot::Entry { start_minutes, entry } => {
			let clock = match start_minutes {
				Some(start) => format!("{:02}:{:02}", start / 60, start % 60),
				None => "--:--".to_string(),
			};
			let category_style =
				Style::default().fg(color_from_hex(workspace.categories.color_for(entry.category_id())));
			let category_label = workspace.categories.label_for(entry.category_id()).to_string();

			match entry {
				DayEntry::Task(task) => {
					let marker = if task.completed { "[x]" } else { "[ ]" };
					let mut title_style = Style::default();
					if task.completed {
						title_style = title_style.fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT);
					}
					DayRow {
						line: Line::from(vec![
							Span::raw(format!("{clock} {marker} ")),
							Span::styled(task.title.clone(), title_style),
							Span::raw(format!(" ({}, {}) ", format_minutes(task.duration), task.priority.label())),
							Span::styled(category_label, category_style),
						]),
						kind: DayRowKind::Task {
							task_id: task.id.clone(),
							title: task.title.clone(),
						},
					}
				}
				DayEntry::Event(event) => DayRow {
					line: Line::from(vec![
						Span::raw(format!("{clock} --- ")),
						Span::styled(category_label.clone(), category_style),
						Span::raw(format!(" ({})", format_minutes(entry.duration_minutes()))),
					]),
					kind: DayRowKind::Event {
						event_id: event.id.clone(),
						label: category_label,
					},
				},
			}
		}
	}
}

fn build_timeline(workspace: &Workspace, day: NaiveDate) -> Vec<Line<'static>> {
	let config = &workspace.config;
	let hour_height = config.hour_height.max(1);
	let day_start = config.day_start_hour * 60;
	let hours = config.day_end_hour.saturating_sub(config.day_start_hour);
	let total_rows = (hours * hour_height) as usize;

	let mut contents: Vec<Option<(String, Style)>> = vec![None; total_rows];
	let entries = entries_for_date(workspace.tasks.list(), workspace.calendar_events.list(), day);
	for entry in entries {
		let Some(start) = entry.start_minutes() else {
			continue;
		};
		if start < day_start {
			continue;
		}

		let offset = day_view_offset(start - day_start, hour_height).round() as usize;
		let height = day_view_height(entry.duration_minutes(), hour_height)
			.round()
			.max(1.0) as usize;
		let style = Style::default().fg(color_from_hex(workspace.categories.color_for(entry.category_id())));
		let label = match entry {
			DayEntry::Task(task) => task.title.clone(),
			DayEntry::Event(_) => workspace.categories.label_for(entry.category_id()).to_string(),
		};

		// Overlapping entries draw over each other.
		for row in offset..(offset + height).min(total_rows) {
			let text = if row == offset {
				format!("# {label}")
			} else {
				"#".to_string()
			};
			contents[row] = Some((text, style));
		}
	}

	contents
		.into_iter()
		.enumerate()
		.map(|(row, content)| {
			let gutter = if row as u32 % hour_height == 0 {
				format!("{:02}:00 |", config.day_start_hour + row as u32 / hour_height)
			} else {
				"      |".to_string()
			};
			let mut spans = vec![Span::styled(gutter, Style::default().fg(Color::DarkGray))];
			if let Some((text, style)) = content {
				spans.push(Span::styled(format!(" {text}"), style));
			}
			Line::from(spans)
		})
		.collect()
}

fn build_stats_lines(workspace: &Workspace) -> Vec<Line<'static>> {
	let tasks = workspace.tasks.list();
	let today = Local::now().date_naive();

	let progress = today_progress(tasks, today);
	let mut lines = Vec::new();
	lines.push(Line::from(format!(
		"Today: {}/{} done",
		progress.completed, progress.total
	)));
	lines.push(Line::from(format!(
		"Streak: {} days",
		completion_streak(tasks, today)
	)));
	lines.push(Line::from(format!(
		"Time on completed: {}",
		format_minutes(total_time_spent(tasks))
	)));
	lines.push(Line::from(""));
	lines.push(Line::from("By Category"));

	let stats = completion_stats(tasks, workspace.categories.list());
	if stats.is_empty() {
		lines.push(Line::from("(no categories)"));
	}
	for row in &stats {
		let width = (row.rate * STATS_BAR_WIDTH).round() as usize;
		lines.push(Line::from(vec![
			Span::styled(
				format!("{:>3}% ", (row.rate * 100.0).round() as u32),
				Style::default(),
			),
			Span::styled(row.label.clone(), Style::default().fg(color_from_hex(&row.color))),
			Span::raw(format!(" {}/{} {}", row.completed, row.total, "=".repeat(width))),
		]));
	}

	lines.push(Line::from(""));
	lines.push(Line::from(format!(
		"Last {} Days",
		workspace.config.stats_window_days
	)));
	for count in daily_distribution(tasks, today, workspace.config.stats_window_days) {
		let width = if count.total == 0 {
			0
		} else {
			((count.completed as f64 / count.total as f64) * STATS_BAR_WIDTH).round() as usize
		};
		lines.push(Line::from(format!(
			"{} {:>2}/{:<2} {}",
			count.day.format("%a"),
			count.completed,
			count.total,
			"=".repeat(width)
		)));
	}

	lines
}

fn required_text(input: &str, field_name: &str) -> Result<String, String> {
	let value = input.trim();
	if value.is_empty() {
		Err(format!("{field_name} is required"))
	} else {
		Ok(value.to_string())
	}
}

fn parse_days_input(input: &str) -> Result<Vec<u8>, String> {
	let trimmed = input.trim();
	if trimmed.is_empty() {
		return Ok(Vec::new());
	}

	trimmed
		.split(',')
		.map(|part| {
			part.trim()
				.parse::<u8>()
				.map_err(|_| format!("invalid weekday '{}', expected 0-6", part.trim()))
		})
		.collect()
}

fn color_from_hex(color: &str) -> Color {
	let bytes = color.as_bytes();
	if bytes.len() != 7 || bytes[0] != b'#' {
		return Color::Gray;
	}

	let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&color[range], 16);
	match (channel(1..3), channel(3..5), channel(5..7)) {
		(Ok(red), Ok(green), Ok(blue)) => Color::Rgb(red, green, blue),
		_ => Color::Gray,
	}
}

fn border_style(focused: bool) -> Style {
	if focused {
		Style::default()
			.fg(FOCUSED_PANEL_BORDER_COLOR)
			.add_modifier(Modifier::BOLD)
	} else {
		Style::default().fg(INACTIVE_PANEL_BORDER_COLOR)
	}
}

#[derive(Debug, Clone)]
enum PromptOutcome {
	NextPrompt(PromptState),
	Select(SelectState),
	Done(String),
}

#[derive(Debug, Clone)]
enum SelectOutcome {
	NextPrompt(PromptState),
	NextSelect(SelectState),
	Done(String),
}

#[derive(Debug, Clone)]
struct PromptState {
	title: String,
	input: String,
	kind: PromptKind,
}

impl PromptState {
	fn new(title: impl Into<String>, kind: PromptKind) -> Self {
		Self {
			title: title.into(),
			input: String::new(),
			kind,
		}
	}
}

#[derive(Debug, Clone)]
enum PromptKind {
	CategoryLabel,
	CategoryColor {
		label: String,
	},
	TaskTitle,
	TaskDuration {
		title: String,
		category_id: String,
		priority: Priority,
	},
	TaskStart {
		title: String,
		category_id: String,
		priority: Priority,
		duration: u32,
	},
	TaskEnd {
		title: String,
		category_id: String,
		priority: Priority,
		duration: u32,
		start_time: Option<String>,
	},
	BlockStart {
		category_id: String,
	},
	BlockEnd {
		category_id: String,
		start: String,
	},
	BlockDays {
		category_id: String,
		start: String,
		end: String,
	},
	EventStart {
		category_id: String,
	},
	EventEnd {
		category_id: String,
		start_time: chrono::NaiveDateTime,
	},
}

#[derive(Debug, Clone)]
struct SelectState {
	title: String,
	options: Vec<SelectOption>,
	selected: usize,
	kind: SelectKind,
}

impl SelectState {
	fn new(title: impl Into<String>, kind: SelectKind, options: Vec<SelectOption>) -> Self {
		Self {
			title: title.into(),
			options,
			selected: 0,
			kind,
		}
	}

	fn move_selection(&mut self, delta: i32) {
		if self.options.is_empty() {
			self.selected = 0;
			return;
		}

		if delta > 0 {
			self.selected = (self.selected + delta as usize).min(self.options.len() - 1);
		} else {
			self.selected = self.selected.saturating_sub(delta.unsigned_abs() as usize);
		}
	}

	fn selected_option(&self) -> Option<&SelectOption> {
		self.options.get(self.selected)
	}
}

#[derive(Debug, Clone)]
struct SelectOption {
	label: String,
	value: Option<String>,
	style: Style,
}

impl SelectOption {
	fn new(label: impl Into<String>, value: Option<String>, style: Style) -> Self {
		Self {
			label: label.into(),
			value,
			style,
		}
	}
}

#[derive(Debug, Clone)]
enum SelectKind {
	TaskCategory {
		title: String,
	},
	TaskPriority {
		title: String,
		category_id: String,
	},
	BlockCategory,
	EventCategory,
	DeleteConfirm {
		kind: DeleteKind,
		id: String,
		label: String,
	},
}

#[derive(Debug, Clone, Copy)]
enum DeleteKind {
	Task,
	Event,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FocusPane {
	Calendar,
	Day,
}

impl FocusPane {
	fn other(self) -> Self {
		match self {
			FocusPane::Calendar => FocusPane::Day,
			FocusPane::Day => FocusPane::Calendar,
		}
	}
}

#[derive(Debug, Clone)]
enum InputMode {
	Normal,
	Prompt(PromptState),
	Select(SelectState),
}

#[derive(Debug, Clone)]
struct App {
	focus: FocusPane,
	selected_day: NaiveDate,
	calendar_month: NaiveDate,
	day_index: usize,
	mode: InputMode,
	status: String,
}

impl Default for App {
	fn default() -> Self {
		let today = Local::now().date_naive();
		Self {
			focus: FocusPane::Day,
			selected_day: today,
			calendar_month: first_day_of_month(today),
			day_index: 0,
			mode: InputMode::Normal,
			status: "Ready".to_string(),
		}
	}
}

impl App {
	fn clamp_selection(&mut self, view: &ViewModel) {
		if view.day_rows.is_empty() {
			self.day_index = 0;
		} else {
			self.day_index = self.day_index.min(view.day_rows.len() - 1);
		}
	}

	fn shift_selected_day(&mut self, delta_days: i64) {
		self.selected_day = self.selected_day + Duration::days(delta_days);
		self.calendar_month = first_day_of_month(self.selected_day);
		self.day_index = 0;
	}

	fn shift_selected_month(&mut self, delta_months: i32) {
		self.selected_day = shift_month(self.selected_day, delta_months);
		self.calendar_month = first_day_of_month(self.selected_day);
		self.day_index = 0;
	}

	fn move_day_selection(&mut self, delta: i32, view: &ViewModel) {
		if view.day_rows.is_empty() {
			self.day_index = 0;
			return;
		}

		if delta > 0 {
			self.day_index = (self.day_index + delta as usize).min(view.day_rows.len() - 1);
		} else {
			self.day_index = self.day_index.saturating_sub(delta.unsigned_abs() as usize);
		}
	}

	fn selected_row<'a>(&self, view: &'a ViewModel) -> Option<&'a DayRowKind> {
		view.day_rows.get(self.day_index).map(|row| &row.kind)
	}
}

struct ViewModel {
	busy_days: HashSet<NaiveDate>,
	day_rows: Vec<DayRow>,
	timeline: Vec<Line<'static>>,
	stats_lines: Vec<Line<'static>>,
}

struct DayRow {
	line: Line<'static>,
	kind: DayRowKind,
}

#[derive(Debug, Clone)]
enum DayRowKind {
	Free,
	Task {
		task_id: String,
		title: String,
	},
	Event {
		event_id: String,
		label: String,
	},
}
