//! Interactive console over a running [`CommandPipeline`].
//!
//! Plain lines are submitted as commands. Lines starting with `:` drive the
//! dashboard directly (undo, confirmation, cancellation). A background task
//! watches the store and prints what changed.

use palette_action::{CommandPipeline, DashboardState, IntentKind, SubmitOutcome};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::JoinHandle;
use uuid::Uuid;

const HELP: &str = "\
Commands:
  <text>            classify and run a command
  :state            print the dashboard state as JSON
  :undo             revert the last action
  :dismiss          forget the last action without reverting it
  :confirm          approve the pending confirmation
  :cancel-modal     dismiss the pending confirmation
  :clear-filters    reset dashboard filters
  :clear-overlays   remove chart overlays
  :active           list running effects
  :cancel [id|KIND] cancel one effect, every effect of a kind, or all
  :help             show this help
  :quit             exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Empty,
    Submit(String),
    State,
    Undo,
    Dismiss,
    Confirm,
    CancelModal,
    ClearFilters,
    ClearOverlays,
    Active,
    Cancel(Option<Uuid>),
    CancelKind(IntentKind),
    Help,
    Quit,
    Invalid(String),
}

pub fn parse_line(line: &str) -> ConsoleCommand {
    let line = line.trim();
    if line.is_empty() {
        return ConsoleCommand::Empty;
    }
    let Some(meta) = line.strip_prefix(':') else {
        return ConsoleCommand::Submit(line.to_string());
    };

    let mut words = meta.split_whitespace();
    let name = words.next().unwrap_or_default();
    let arg = words.next();
    match (name, arg) {
        ("state", None) => ConsoleCommand::State,
        ("undo", None) => ConsoleCommand::Undo,
        ("dismiss", None) => ConsoleCommand::Dismiss,
        ("confirm", None) => ConsoleCommand::Confirm,
        ("cancel-modal", None) => ConsoleCommand::CancelModal,
        ("clear-filters", None) => ConsoleCommand::ClearFilters,
        ("clear-overlays", None) => ConsoleCommand::ClearOverlays,
        ("active", None) => ConsoleCommand::Active,
        ("cancel", None) => ConsoleCommand::Cancel(None),
        ("cancel", Some(target)) => {
            if let Ok(id) = Uuid::parse_str(target) {
                ConsoleCommand::Cancel(Some(id))
            } else if let Ok(kind) = target.parse::<IntentKind>() {
                ConsoleCommand::CancelKind(kind)
            } else {
                ConsoleCommand::Invalid(format!("not an effect id or kind: {target}"))
            }
        }
        ("help", None) | ("?", None) => ConsoleCommand::Help,
        ("quit", None) | ("q", None) | ("exit", None) => ConsoleCommand::Quit,
        _ => ConsoleCommand::Invalid(format!("unknown command :{meta} (try :help)")),
    }
}

/// Run one console command and return the lines to print.
pub async fn execute(pipeline: &CommandPipeline, command: ConsoleCommand) -> Vec<String> {
    let store = pipeline.store();
    let dispatcher = pipeline.dispatcher();
    match command {
        ConsoleCommand::Empty | ConsoleCommand::Quit => Vec::new(),
        ConsoleCommand::Submit(text) => match pipeline.submit_and_wait(&text).await {
            SubmitOutcome::Published(id) => vec![format!("action {id}")],
            SubmitOutcome::Ignored => vec!["still working on the previous command".to_string()],
            SubmitOutcome::RateLimited | SubmitOutcome::Failed => Vec::new(),
        },
        ConsoleCommand::State => match serde_json::to_string_pretty(&store.snapshot()) {
            Ok(json) => vec![json],
            Err(e) => vec![format!("could not render state: {e}")],
        },
        ConsoleCommand::Undo => match store.undo_last_action() {
            Some(kind) => vec![format!("undid {kind}")],
            None => vec!["nothing to undo".to_string()],
        },
        ConsoleCommand::Dismiss => {
            let line = if store.dismiss_last_action() {
                "last action dismissed"
            } else {
                "no last action"
            };
            vec![line.to_string()]
        }
        ConsoleCommand::Confirm => {
            if store.confirm() {
                Vec::new()
            } else {
                vec!["nothing to confirm".to_string()]
            }
        }
        ConsoleCommand::CancelModal => {
            let line = if store.dismiss_confirmation() {
                "cancelled"
            } else {
                "nothing to cancel"
            };
            vec![line.to_string()]
        }
        ConsoleCommand::ClearFilters => {
            store.clear_filters();
            vec!["filters cleared".to_string()]
        }
        ConsoleCommand::ClearOverlays => {
            store.clear_overlays();
            vec!["overlays cleared".to_string()]
        }
        ConsoleCommand::Active => {
            let active = dispatcher.active();
            if active.is_empty() {
                return vec!["no running effects".to_string()];
            }
            active
                .into_iter()
                .map(|(id, kind)| format!("{id}  {kind}"))
                .collect()
        }
        ConsoleCommand::Cancel(Some(id)) => {
            let line = if dispatcher.cancel(id) {
                format!("cancelled {id}")
            } else {
                format!("nothing running under {id}")
            };
            vec![line]
        }
        ConsoleCommand::CancelKind(kind) => {
            vec![format!("cancelled {} {kind} effect(s)", dispatcher.cancel_kind(kind))]
        }
        ConsoleCommand::Cancel(None) => {
            vec![format!("cancelled {} effect(s)", dispatcher.cancel_all())]
        }
        ConsoleCommand::Help => vec![HELP.to_string()],
        ConsoleCommand::Invalid(reason) => vec![reason],
    }
}

/// Describe what changed between two states, one line per change.
pub fn render_changes(prev: &DashboardState, next: &DashboardState) -> Vec<String> {
    let mut lines = Vec::new();

    for toast in next.toasts.iter() {
        if prev.toasts.iter().any(|t| t.id == toast.id) {
            continue;
        }
        match &toast.message {
            Some(message) => lines.push(format!("[{}] {}: {}", toast.severity, toast.title, message)),
            None => lines.push(format!("[{}] {}", toast.severity, toast.title)),
        }
    }

    if next.filters != prev.filters && !next.filters.is_empty() {
        let f = &next.filters;
        let parts: Vec<String> = [
            f.segment.as_ref().map(|s| format!("segment={s}")),
            f.location.as_ref().map(|l| format!("location={l}")),
            f.time_range.as_ref().map(|t| format!("time_range={t}")),
        ]
        .into_iter()
        .flatten()
        .collect();
        lines.push(format!("filters: {}", parts.join(" ")));
    }

    for overlay in next.overlays.iter() {
        if prev.overlays.get(&overlay.id).is_none() {
            lines.push(format!("overlay: {}", overlay.label));
        }
    }

    if let Some(tagging) = next.progress.tagging {
        if prev.progress.tagging != Some(tagging) {
            lines.push(format!("tagging {}/{}", tagging.current, tagging.total));
        }
    }
    if let Some(merge) = next.progress.merge {
        if prev.progress.merge != Some(merge) {
            lines.push(format!("merging {}/{}", merge.merged, merge.found));
        }
    }
    if let Some(field) = &next.progress.transforming_field {
        if prev.progress.transforming_field.as_ref() != Some(field) {
            lines.push(format!("transforming {field}..."));
        }
    }

    if next.scan.scanning && !prev.scan.scanning {
        lines.push("scanning logs...".to_string());
    }
    if let Some(results) = &next.scan.results {
        if prev.scan.results.is_none() {
            for finding in results {
                lines.push(format!(
                    "  {:<28} {:>4}  {}",
                    finding.category, finding.count, finding.severity
                ));
            }
        }
    }

    if let Some(view) = &next.confirmation {
        if prev.confirmation.as_ref() != Some(view) {
            lines.push(format!(
                "{}: {} (:confirm or :cancel-modal)",
                view.title, view.message
            ));
        }
    }

    lines
}

/// Print state changes until the task is aborted or the store goes away.
pub fn spawn_echo(pipeline: &CommandPipeline) -> JoinHandle<()> {
    let mut rx = pipeline.store().subscribe();
    tokio::spawn(async move {
        let mut prev = rx.borrow_and_update().clone();
        while rx.changed().await.is_ok() {
            let next = rx.borrow_and_update().clone();
            for line in render_changes(&prev, &next) {
                println!("{line}");
            }
            prev = next;
        }
    })
}

/// Read commands from `input` until EOF or `:quit`.
pub async fn run<R>(pipeline: &CommandPipeline, input: R) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let echo = spawn_echo(pipeline);
    println!("Type a command, or :help.");

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let command = parse_line(&line);
        if command == ConsoleCommand::Quit {
            break;
        }
        for out in execute(pipeline, command).await {
            println!("{out}");
        }
    }

    echo.abort();
    Ok(())
}
