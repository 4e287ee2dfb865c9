use desk_logging::{desk_debug, desk_info};

use crate::state::TransferDialog;
use crate::{
    AppState, Effect, ErrorOutcome, InboundMessage, Msg, Mutation, MutationKind, Notice,
    NoticeKind, PageOutcome, PendingAction, PushOutcome, Selection, Urgency,
};

const TRANSFERRING_MS: u32 = 1200;
const TRANSFER_DONE_MS: u32 = 1800;
const URGENCY_DONE_MS: u32 = 1400;
const ERROR_MS: u32 = 2600;

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::Started => {
            state.mark_dirty();
            post(state.coordinator.request_page())
        }
        Msg::TabSelected(tab) => {
            state.forget_rows();
            post(state.coordinator.on_tab_changed(tab))
        }
        Msg::SearchSettled(raw) => {
            state.forget_rows();
            post(state.coordinator.on_search_input_changed(&raw))
        }
        Msg::RefreshClicked => {
            state.forget_rows();
            state.coordinator.reset_filter(None, None);
            post(state.coordinator.request_page())
        }
        Msg::Scrolled(metrics) => {
            if metrics.is_near_end(state.settings.scroll_threshold_px) {
                let request = state.coordinator.on_scroll_near_threshold();
                if request.is_some() {
                    state.mark_dirty();
                }
                post(request)
            } else {
                Vec::new()
            }
        }
        Msg::RowSelected { id } => {
            if let Some(record) = state.coordinator.row(&id) {
                state.selection = Some(Selection::of(record));
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::UrgencyPicked { id, value } => match value.parse::<Urgency>() {
            Ok(value) => request_mutation(&mut state, Mutation::Urgency { id, value }),
            Err(err) => vec![error_notice(err.to_string())],
        },
        Msg::TransferOpened => {
            if state.selection.is_some() {
                state.dialog = Some(TransferDialog {
                    suggested: state.suggested_destination(),
                });
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::TransferCancelled => {
            if state.dialog.take().is_some() {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::TransferConfirmed { to_site, note } => {
            let Some(selection) = state.selection.clone() else {
                return (state, Vec::new());
            };
            state.dialog = None;
            state.mark_dirty();
            let mutation = Mutation::Transfer {
                id: selection.id,
                to_site,
                note: note.trim().to_string(),
            };
            let mut effects = request_mutation(&mut state, mutation);
            if matches!(effects.as_slice(), [Effect::Post(_)]) {
                state.selection = None;
                effects.insert(
                    0,
                    Effect::Notify(Notice::new("Transferring…", NoticeKind::Info, TRANSFERRING_MS)),
                );
            }
            effects
        }
        Msg::Host(inbound) => apply_host_message(&mut state, inbound),
    };

    (state, effects)
}

fn post(request: Option<crate::OutboundMessage>) -> Vec<Effect> {
    request.map(Effect::Post).into_iter().collect()
}

fn error_notice(text: impl Into<String>) -> Effect {
    Effect::Notify(Notice::new(text, NoticeKind::Err, ERROR_MS))
}

fn request_mutation(state: &mut AppState, mutation: Mutation) -> Vec<Effect> {
    let pending = PendingAction {
        kind: mutation.kind(),
        target_id: mutation.target_id().to_string(),
    };
    match state.coordinator.on_mutation_requested(mutation) {
        Ok(message) => {
            desk_debug!("{} for order {}", message.kind(), pending.target_id);
            state.pending = Some(pending);
            state.mark_dirty();
            vec![Effect::Post(message)]
        }
        Err(rejected) => vec![error_notice(rejected.to_string())],
    }
}

fn apply_host_message(state: &mut AppState, inbound: InboundMessage) -> Vec<Effect> {
    match inbound {
        InboundMessage::OrdersResult {
            items,
            next_cursor,
            has_more,
            ticket,
        } => match state
            .coordinator
            .on_result_received(ticket, items, next_cursor, has_more)
        {
            PageOutcome::Applied { appended } => {
                desk_debug!("applied page of {} orders", appended);
                state.last_error = None;
                state.mark_dirty();
                Vec::new()
            }
            PageOutcome::Stale => Vec::new(),
        },
        InboundMessage::OrderUpdated { item, ticket } => {
            let id = item.id.clone();
            let outcome = state.coordinator.on_push_update(ticket, item);
            let is_selected = state.selection.as_ref().is_some_and(|s| s.id == id);
            match outcome {
                PushOutcome::Stale => return Vec::new(),
                PushOutcome::Replaced => {
                    if is_selected {
                        state.selection = state.coordinator.row(&id).map(Selection::of);
                    }
                    state.mark_dirty();
                }
                PushOutcome::Removed => {
                    if is_selected {
                        state.selection = None;
                        state.dialog = None;
                    }
                    state.mark_dirty();
                }
                PushOutcome::NotShown => {}
            }
            complete_pending(state, &id)
        }
        InboundMessage::Error { message, ticket } => {
            let outcome = state.coordinator.on_error_received(ticket, message);
            let (text, mutation_failed) = match outcome {
                ErrorOutcome::PageFailed(text) => (text, false),
                ErrorOutcome::MutationFailed(text) => (text, true),
                ErrorOutcome::Stale => return Vec::new(),
            };
            let text = if text.trim().is_empty() {
                "Error".to_string()
            } else {
                text
            };
            desk_info!("host reported error: {}", text);
            if mutation_failed && state.pending.take().is_some() {
                desk_debug!("pending mutation abandoned after host error");
            }
            state.last_error = Some(text.clone());
            state.mark_dirty();
            vec![error_notice(text)]
        }
    }
}

fn complete_pending(state: &mut AppState, id: &str) -> Vec<Effect> {
    let Some(pending) = state.pending.take_if(|p| p.target_id == id) else {
        return Vec::new();
    };
    state.mark_dirty();
    let notice = match pending.kind {
        MutationKind::SiteTransfer => {
            Notice::new("Transfer completed ✅", NoticeKind::Ok, TRANSFER_DONE_MS)
        }
        MutationKind::UrgencyChange => {
            Notice::new("Urgency updated ✅", NoticeKind::Ok, URGENCY_DONE_MS)
        }
    };
    vec![Effect::Notify(notice)]
}
