//! Orderdesk core: request coordinator, pure widget state machine and view-model helpers.
mod coordinator;
mod debounce;
mod effect;
mod msg;
mod protocol;
mod scroll;
mod state;
mod types;
mod update;
mod view_model;

pub use coordinator::{
    CoordinatorSettings, ErrorOutcome, Mutation, MutationKind, MutationRejected, PageOutcome,
    PushOutcome, QueryState, RequestCoordinator, DEFAULT_PAGE_SIZE,
};
pub use debounce::{SearchDebouncer, DEFAULT_DEBOUNCE};
pub use effect::{Effect, Notice, NoticeKind};
pub use msg::Msg;
pub use protocol::{InboundMessage, OutboundMessage};
pub use scroll::ScrollMetrics;
pub use state::{AppState, DeskSettings, PendingAction, Selection, DEFAULT_SCROLL_THRESHOLD_PX};
pub use types::{Cursor, OrderRecord, ParseError, Site, Tab, Ticket, Urgency};
pub use update::update;
pub use view_model::{DeskViewModel, OrderRowView, TransferDialogView};
