//! Driver commands
//!
//! One command per input line. Parsing is strict: unknown verbs and bad
//! arguments are `InvalidInput` errors and never reach the session.

use std::io::Write;

use chrono::{DateTime, Utc};
use idletally_common::time::format::{format_elapsed, format_stopwatch};
use idletally_core::TimerSession;
use idletally_domain::{IdleTallyError, Result};
use idletally_infra::SignalInbox;

/// A parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Add,
    Name(String),
    Select(i64),
    Segment(i64),
    AddSegment,
    Delete,
    DeleteSegment,
    StartStop,
    Idle,
    Include,
    Exclude,
    SetStart(String),
    SetEnd(String),
    Save,
    Load,
    Segments,
    /// Push a reading into the feed inbox; `None` means now
    Signal(Option<DateTime<Utc>>),
    Status,
    Help,
    Quit,
}

/// Whether the input loop keeps reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub const HELP: &str = "\
commands:
  list                  activities with totals
  add                   add and select a new activity
  name <text>           rename the selected activity
  select <i>            select activity by index (-1 clears)
  segment <i>           select time segment by index (-1 clears)
  add-segment           add a segment to the selected activity
  delete                delete the selected activity
  delete-segment        delete the selected segment
  start | stop          toggle timing on the selected activity
  idle                  check the feed for idle time
  include | exclude     resolve pending idle time
  set-start <text>      edit the selected segment's start
  set-end <text>        edit the selected segment's end
  save                  save the selected activity
  load                  reload all activities
  segments              reload and list the selected activity's segments
  signal [<rfc3339>]    record user input (default now)
  status                show the session state
  quit";

impl Command {
    /// Parse one trimmed input line
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let command = match verb.to_ascii_lowercase().as_str() {
            "list" | "ls" => Self::List,
            "add" => Self::Add,
            "name" | "rename" => Self::Name(rest.to_string()),
            "select" => Self::Select(parse_index(verb, rest)?),
            "segment" => Self::Segment(parse_index(verb, rest)?),
            "add-segment" => Self::AddSegment,
            "delete" => Self::Delete,
            "delete-segment" => Self::DeleteSegment,
            "start" | "stop" => Self::StartStop,
            "idle" => Self::Idle,
            "include" => Self::Include,
            "exclude" => Self::Exclude,
            "set-start" => Self::SetStart(required(verb, rest)?.to_string()),
            "set-end" => Self::SetEnd(required(verb, rest)?.to_string()),
            "save" => Self::Save,
            "load" => Self::Load,
            "segments" => Self::Segments,
            "signal" => Self::Signal(parse_signal(rest)?),
            "status" => Self::Status,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            "" => return Err(IdleTallyError::InvalidInput("empty command".to_string())),
            other => {
                return Err(IdleTallyError::InvalidInput(format!(
                    "unknown command '{other}' (try 'help')"
                )))
            }
        };

        if rest.is_empty() || command.takes_argument() {
            Ok(command)
        } else {
            Err(IdleTallyError::InvalidInput(format!("'{verb}' takes no arguments")))
        }
    }

    const fn takes_argument(&self) -> bool {
        matches!(
            self,
            Self::Name(_)
                | Self::Select(_)
                | Self::Segment(_)
                | Self::SetStart(_)
                | Self::SetEnd(_)
                | Self::Signal(_)
        )
    }

    /// Run against the session, writing any listing to `out`
    pub fn execute(
        self,
        session: &mut TimerSession,
        inbox: &SignalInbox,
        out: &mut impl Write,
    ) -> anyhow::Result<Flow> {
        match self {
            Self::List => write_activities(session, out)?,
            Self::Add => session.add_activity(),
            Self::Name(name) => session.set_selected_activity_name(name),
            Self::Select(index) => session.set_selected_activity_index(index),
            Self::Segment(index) => session.set_selected_time_segment_index(index),
            Self::AddSegment => session.add_time_segment()?,
            Self::Delete => session.delete_activity()?,
            Self::DeleteSegment => session.delete_time_segment()?,
            Self::StartStop => session.start_stop()?,
            Self::Idle => {
                let idle = session.check_idle_time();
                writeln!(out, "idle: {idle}")?;
            }
            Self::Include => session.include_idle_time()?,
            Self::Exclude => session.exclude_idle_time()?,
            Self::SetStart(text) => session.set_selected_time_segment_start_time(&text),
            Self::SetEnd(text) => session.set_selected_time_segment_end_time(&text),
            Self::Save => session.save()?,
            Self::Load => session.load_activities()?,
            Self::Segments => {
                session.load_time_segments()?;
                write_segments(session, out)?;
            }
            Self::Signal(at) => inbox.push(at.unwrap_or_else(|| session.now())),
            Self::Status => {}
            Self::Help => writeln!(out, "{HELP}")?,
            Self::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }
}

fn parse_index(verb: &str, raw: &str) -> Result<i64> {
    required(verb, raw)?.parse::<i64>().map_err(|e| {
        IdleTallyError::InvalidInput(format!("'{verb}' expects an index, got '{raw}': {e}"))
    })
}

fn required<'a>(verb: &str, raw: &'a str) -> Result<&'a str> {
    if raw.is_empty() {
        Err(IdleTallyError::InvalidInput(format!("'{verb}' needs an argument")))
    } else {
        Ok(raw)
    }
}

fn parse_signal(raw: &str) -> Result<Option<DateTime<Utc>>> {
    if raw.is_empty() {
        return Ok(None);
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|instant| Some(instant.with_timezone(&Utc)))
        .map_err(|e| IdleTallyError::InvalidInput(format!("invalid signal time '{raw}': {e}")))
}

fn write_activities(session: &TimerSession, out: &mut impl Write) -> std::io::Result<()> {
    let now = session.now();
    let selected = session.selected_activity().map(|stored| stored.key);
    let started = session.started_activity().map(|stored| stored.key);
    if session.activities().is_empty() {
        return writeln!(out, "no activities");
    }
    for (index, stored) in session.activities().iter().enumerate() {
        let marker = if Some(stored.key) == selected { '>' } else { ' ' };
        let running = if Some(stored.key) == started { " (running)" } else { "" };
        writeln!(
            out,
            "{marker} {index:>3}  {:<24} {}{running}",
            display_name(&stored.name),
            format_stopwatch(stored.total_elapsed(now)),
        )?;
    }
    Ok(())
}

fn write_segments(session: &TimerSession, out: &mut impl Write) -> std::io::Result<()> {
    let Some(activity) = session.selected_activity() else {
        return writeln!(out, "no activity selected");
    };
    let now = session.now();
    for (index, stored) in activity.segments.iter().enumerate() {
        let segment = &stored.segment;
        let end = if segment.is_open { "open".to_string() } else { segment.end_time.to_rfc3339() };
        writeln!(
            out,
            "  {index:>3}  {} .. {end}  {}",
            segment.start_time.to_rfc3339(),
            format_elapsed(segment.elapsed(now)),
        )?;
    }
    Ok(())
}

fn display_name(name: &str) -> &str {
    if name.is_empty() {
        "(unnamed)"
    } else {
        name
    }
}

/// One-line summary printed after every command
pub fn status_line(session: &TimerSession) -> String {
    let now = session.now();
    let mut line = format!("[{:?}] next: {}", session.timing_state(), session.start_stop_text());

    match session.selected_activity() {
        Some(activity) => {
            line.push_str(&format!(
                " | selected #{} '{}' {}",
                session.selected_activity_index(),
                display_name(&activity.name),
                format_stopwatch(activity.total_elapsed(now)),
            ));
        }
        None => line.push_str(" | nothing selected"),
    }
    if let Some(segment) = session.selected_time_segment() {
        line.push_str(&format!(
            " | segment #{} {} -> {}",
            session.selected_time_segment_index(),
            session.selected_time_segment_start_time(),
            if segment.segment.is_open {
                "now".to_string()
            } else {
                session.selected_time_segment_end_time()
            },
        ));
    }
    if let Some(window) = session.idle_window() {
        line.push_str(&format!(" | idle {} (include/exclude)", format_elapsed(window.idle_duration())));
    }
    let messages = session.validation_messages();
    if !messages.is_empty() {
        line.push_str(&format!(" | invalid: {}", messages.replace('\n', "; ")));
    }
    line
}
