use crate::{InboundMessage, ScrollMetrics, Site, Tab};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Widget mounted; issue the first page request.
    Started,
    /// User clicked a tab.
    TabSelected(Tab),
    /// Search input after the debounce delay elapsed.
    SearchSettled(String),
    /// User clicked Refresh.
    RefreshClicked,
    /// The table was scrolled.
    Scrolled(ScrollMetrics),
    /// User clicked a row.
    RowSelected { id: String },
    /// User picked a value in a row's urgency control.
    UrgencyPicked { id: String, value: String },
    /// User clicked Transfer.
    TransferOpened,
    TransferCancelled,
    TransferConfirmed { to_site: Site, note: String },
    /// Validated message from the host page.
    Host(InboundMessage),
}
