//! Line-oriented view binding.
//!
//! Each stdin line is either a JSON message from the host (starts with `{`)
//! or a UI command. The view is rendered as plain text on stderr.

use std::fmt::Write as _;

use orderdesk_core::{DeskViewModel, Msg, Notice, NoticeKind, ScrollMetrics, Site, Tab};

#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleInput {
    /// Raw JSON posted by the host page.
    Host(String),
    /// Keystroke-level search input; debounced before it reaches the core.
    SearchTyped(String),
    Ui(Msg),
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("unknown command '{0}' (try: tab, search, refresh, scroll, more, select, urgency, transfer, cancel, confirm, quit)")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error(transparent)]
    Value(#[from] orderdesk_core::ParseError),
}

pub fn parse_line(line: &str) -> Result<Option<ConsoleInput>, CommandError> {
    let line = line.trim_end_matches(['\r', '\n']);
    let trimmed = line.trim_start();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.starts_with('{') {
        return Ok(Some(ConsoleInput::Host(trimmed.to_string())));
    }

    let (command, rest) = trimmed.split_once(' ').unwrap_or((trimmed, ""));
    let args: Vec<&str> = rest.split_whitespace().collect();
    let input = match command {
        "tab" => match args.as_slice() {
            [tab] => ConsoleInput::Ui(Msg::TabSelected(tab.parse::<Tab>()?)),
            _ => return Err(CommandError::Usage("tab <SITE_A|SITE_B|ADMIN>")),
        },
        // Everything after the command, spaces included, is the input value.
        "search" => ConsoleInput::SearchTyped(rest.to_string()),
        "refresh" => ConsoleInput::Ui(Msg::RefreshClicked),
        "scroll" => match args.as_slice() {
            [top, viewport, content] => ConsoleInput::Ui(Msg::Scrolled(ScrollMetrics {
                scroll_top: number(top)?,
                viewport_height: number(viewport)?,
                content_height: number(content)?,
            })),
            _ => return Err(CommandError::Usage("scroll <top> <viewport> <content>")),
        },
        "more" => ConsoleInput::Ui(Msg::Scrolled(ScrollMetrics::default())),
        "select" => match args.as_slice() {
            [id] => ConsoleInput::Ui(Msg::RowSelected { id: id.to_string() }),
            _ => return Err(CommandError::Usage("select <id>")),
        },
        "urgency" => match args.as_slice() {
            [id] => ConsoleInput::Ui(Msg::UrgencyPicked {
                id: id.to_string(),
                value: String::new(),
            }),
            [id, value] => ConsoleInput::Ui(Msg::UrgencyPicked {
                id: id.to_string(),
                value: value.to_string(),
            }),
            _ => return Err(CommandError::Usage("urgency <id> [LOW|NORMAL|HIGH|URGENT]")),
        },
        "transfer" => ConsoleInput::Ui(Msg::TransferOpened),
        "cancel" => ConsoleInput::Ui(Msg::TransferCancelled),
        "confirm" => match args.split_first() {
            Some((site, note)) => ConsoleInput::Ui(Msg::TransferConfirmed {
                to_site: Site::from_label(site),
                note: note.join(" "),
            }),
            None => return Err(CommandError::Usage("confirm <site> [note...]")),
        },
        "quit" | "exit" => ConsoleInput::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(input))
}

fn number(raw: &str) -> Result<u32, CommandError> {
    raw.parse()
        .map_err(|_| CommandError::Usage("scroll <top> <viewport> <content>"))
}

pub fn render(view: &DeskViewModel) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "[{}] search={:?} | {}",
        view.tab, view.search, view.meta
    );
    for row in &view.rows {
        let marker = match (row.selected, row.pending) {
            (true, _) => '>',
            (false, true) => '~',
            (false, false) => ' ',
        };
        let _ = writeln!(
            out,
            "{marker} {:<10} {:<12} {:<20} {:<8} {:<8} {:<8} {}",
            row.id,
            row.order_number,
            row.customer_name,
            row.handling_site,
            display_or_dash(&row.urgency),
            display_or_dash(&row.payment_status),
            row.total
        );
    }
    let _ = writeln!(
        out,
        "{}{}",
        view.selection_text,
        if view.transfer_enabled {
            " [transfer]"
        } else {
            ""
        }
    );
    if let Some(dialog) = &view.dialog {
        let _ = writeln!(
            out,
            "Transfer {} -> {} (confirm <site> [note] / cancel)",
            dialog.order_label, dialog.suggested_site
        );
    }
    out
}

pub fn render_notice(notice: &Notice) -> String {
    let tag = match notice.kind {
        NoticeKind::Ok => "ok",
        NoticeKind::Info => "info",
        NoticeKind::Err => "error",
    };
    format!("({tag}) {}", notice.text)
}

fn display_or_dash(text: &str) -> &str {
    if text.is_empty() {
        "-"
    } else {
        text
    }
}
