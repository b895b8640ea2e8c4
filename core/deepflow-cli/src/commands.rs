//! Subcommand handlers.
//!
//! Each handler builds what it needs from [`App`], does one thing and prints
//! a short human-readable result to stdout.

use std::time::Duration;

use chrono::{Local, TimeZone};
use deepflow_core::notes;
use deepflow_core::timer::TARGET_PRESETS;
use deepflow_core::{
    daily_totals, format_clock, format_duration, FocusError, Note, Result, Session, SessionStats,
    TargetDuration, Theme, Tick, TimerPhase, Tracker,
};
use tokio::time::{interval, MissedTickBehavior};
use tracing::info;

use crate::app::App;

// ─────────────────────────────────────────────────────────────────────────────
// Rendering
// ─────────────────────────────────────────────────────────────────────────────

const BAR_WIDTH: usize = 20;

fn phase_label(phase: TimerPhase) -> &'static str {
    match phase {
        TimerPhase::Idle => "Idle",
        TimerPhase::Running => "Running",
        TimerPhase::Paused => "Paused",
    }
}

fn progress_bar(elapsed: u64, target: TargetDuration) -> String {
    let filled = ((elapsed.min(target.seconds()) * BAR_WIDTH as u64) / target.seconds()) as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

pub fn status_line(phase: TimerPhase, elapsed: u64, target: TargetDuration) -> String {
    format!(
        "{:<8} {} / {} {}",
        phase_label(phase),
        format_clock(elapsed),
        format_clock(target.seconds()),
        progress_bar(elapsed, target)
    )
}

fn local_time(millis: i64) -> String {
    Local
        .timestamp_millis_opt(millis)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn report_recorded(recorded: Option<&Session>, elapsed: u64) {
    match recorded {
        Some(session) => println!("Recorded {} session.", format_duration(session.duration)),
        None => println!("Discarded {}s cycle (too short to record).", elapsed),
    }
}

fn short_id(id: &str) -> &str {
    id.get(..10).unwrap_or(id)
}

// ─────────────────────────────────────────────────────────────────────────────
// Timer
// ─────────────────────────────────────────────────────────────────────────────

/// Catches up a completion that happened while no process was ticking.
async fn settle(tracker: &mut Tracker) {
    if let (Tick::Completed { elapsed }, recorded) = tracker.tick().await {
        println!("Target reached.");
        report_recorded(recorded.as_ref(), elapsed);
    }
}

pub async fn start(app: &App) -> Result<()> {
    let mut tracker = app.tracker().await;
    settle(&mut tracker).await;
    tracker.timer_mut().start();
    let timer = tracker.timer();
    println!("{}", status_line(timer.phase(), timer.elapsed(), timer.target()));
    Ok(())
}

pub async fn pause(app: &App) -> Result<()> {
    let mut tracker = app.tracker().await;
    settle(&mut tracker).await;
    tracker.timer_mut().pause();
    let timer = tracker.timer();
    println!("{}", status_line(timer.phase(), timer.elapsed(), timer.target()));
    Ok(())
}

pub async fn stop(app: &App) -> Result<()> {
    let mut tracker = app.tracker().await;
    settle(&mut tracker).await;
    if tracker.timer().phase() == TimerPhase::Idle {
        println!("Timer is idle.");
        return Ok(());
    }
    let (elapsed, recorded) = tracker.finish().await;
    report_recorded(recorded.as_ref(), elapsed);
    Ok(())
}

pub async fn reset(app: &App) -> Result<()> {
    let mut tracker = app.tracker().await;
    tracker.timer_mut().reset();
    println!("Timer reset.");
    Ok(())
}

pub async fn status(app: &App) -> Result<()> {
    let mut tracker = app.tracker().await;
    settle(&mut tracker).await;
    let timer = tracker.timer();
    println!("{}", status_line(timer.phase(), timer.elapsed(), timer.target()));
    Ok(())
}

/// Foreground loop: starts the timer and redraws every second until the
/// target is reached. Ctrl-C pauses and exits.
pub async fn run(app: &App) -> Result<()> {
    let mut tracker = app.tracker().await;
    settle(&mut tracker).await;
    tracker.timer_mut().start();

    let mut ticker = interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let target = tracker.timer().target();
                match tracker.tick().await {
                    (Tick::Running { elapsed }, _) => {
                        print!("\r{}", status_line(TimerPhase::Running, elapsed, target));
                        flush_stdout();
                    }
                    (Tick::Completed { elapsed }, recorded) => {
                        println!("\r{}", status_line(TimerPhase::Idle, elapsed, target));
                        println!("Target reached.");
                        report_recorded(recorded.as_ref(), elapsed);
                        return Ok(());
                    }
                    // Changed by another invocation; nothing left to drive.
                    (Tick::Paused { .. } | Tick::Idle, _) => {
                        println!();
                        return Ok(());
                    }
                }
            }
            _ = &mut ctrl_c => {
                tracker.timer_mut().pause();
                let timer = tracker.timer();
                println!("\r{}", status_line(timer.phase(), timer.elapsed(), timer.target()));
                info!("Interrupted, timer paused");
                return Ok(());
            }
        }
    }
}

fn flush_stdout() {
    use std::io::Write;
    let _ = std::io::stdout().flush();
}

// ─────────────────────────────────────────────────────────────────────────────
// Target
// ─────────────────────────────────────────────────────────────────────────────

fn target_line(target: TargetDuration) -> String {
    let presets: Vec<String> = TARGET_PRESETS
        .iter()
        .map(|&m| {
            if m == target.minutes() {
                format!("[{}]", m)
            } else {
                m.to_string()
            }
        })
        .collect();
    format!(
        "Target: {} minutes (presets: {})",
        target.minutes(),
        presets.join(" ")
    )
}

pub fn target(app: &mut App, minutes: Option<u32>) -> Result<()> {
    let Some(minutes) = minutes else {
        println!("{}", target_line(app.config.target()));
        return Ok(());
    };

    let target = TargetDuration::new(minutes)?;
    app.config.target_minutes = target.minutes();
    app.config.save(&app.storage)?;
    println!("Target set to {} minutes.", target.minutes());
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// History
// ─────────────────────────────────────────────────────────────────────────────

pub async fn sessions(app: &App, limit: usize) -> Result<()> {
    let sessions = app.coordinator().fetch_sessions().await;
    if sessions.is_empty() {
        println!("No sessions yet.");
        return Ok(());
    }
    for session in sessions.iter().take(limit) {
        println!(
            "{}  {:>8}  {}",
            local_time(session.timestamp),
            format_duration(session.duration),
            short_id(&session.id)
        );
    }
    if sessions.len() > limit {
        println!("... {} more", sessions.len() - limit);
    }
    Ok(())
}

pub async fn stats(app: &App) -> Result<()> {
    let sessions = app.coordinator().fetch_sessions().await;
    let now = Local::now();
    let stats = SessionStats::compute(&sessions, &now);

    println!("Total focus:     {:.1}h", stats.total_hours);
    println!("Today:           {:.1}h", stats.today_hours);
    println!("Current streak:  {} days", stats.current_streak);
    println!("Longest streak:  {} days", stats.longest_streak);
    println!();
    println!("Last 7 days:");
    for day in daily_totals(&sessions, &now, 7) {
        println!(
            "  {}  {:>8}",
            day.date.format("%a %m-%d"),
            format_duration(day.seconds)
        );
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Notes
// ─────────────────────────────────────────────────────────────────────────────

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn missing_note(id: &str) -> FocusError {
    FocusError::invalid_note(format!("no note matches {:?}", id))
}

pub async fn notes_list(app: &App) -> Result<()> {
    let notes = app.coordinator().fetch_notes().await;
    if notes.is_empty() {
        println!("No notes yet.");
        return Ok(());
    }
    for note in &notes {
        println!(
            "{}  {}  {}",
            short_id(&note.id),
            local_time(note.updated_at),
            note.title
        );
    }
    Ok(())
}

pub async fn notes_add(app: &App, title: Option<String>, content: String) -> Result<()> {
    let note = Note::new(title.as_deref().unwrap_or(""), &content, now_millis())?;
    let added = note.clone();
    app.coordinator()
        .update_notes(|list| Ok(notes::upsert(list, added)))
        .await?;
    println!("Added note {} ({}).", short_id(&note.id), note.title);
    Ok(())
}

pub async fn notes_edit(
    app: &App,
    id: &str,
    title: Option<String>,
    content: Option<String>,
) -> Result<()> {
    let mut edited = String::new();
    app.coordinator()
        .update_notes(|list| {
            let mut note = notes::find(&list, id).cloned().ok_or_else(|| missing_note(id))?;
            let title = title.unwrap_or_else(|| note.title.clone());
            let content = content.unwrap_or_else(|| note.content.clone());
            note.edit(&title, &content, now_millis())?;
            edited = note.id.clone();
            Ok(notes::upsert(list, note))
        })
        .await?;
    println!("Updated note {}.", short_id(&edited));
    Ok(())
}

pub async fn notes_delete(app: &App, id: &str) -> Result<()> {
    let sync = app.coordinator();
    let list = sync.fetch_notes().await;
    let note = notes::find(&list, id).ok_or_else(|| missing_note(id))?;
    sync.delete_note(&note.id).await;
    println!("Deleted note {} ({}).", short_id(&note.id), note.title);
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Theme
// ─────────────────────────────────────────────────────────────────────────────

pub enum ThemeChange {
    Show,
    Set(Theme),
    Toggle,
}

pub fn theme(app: &App, change: ThemeChange) -> Result<()> {
    let current = app.store.theme();
    let next = match change {
        ThemeChange::Show => {
            println!("{}", current.as_str());
            return Ok(());
        }
        ThemeChange::Set(theme) => theme,
        ThemeChange::Toggle => current.toggle(),
    };
    app.store.save_theme(next)?;
    println!("Theme: {}", next.as_str());
    Ok(())
}
