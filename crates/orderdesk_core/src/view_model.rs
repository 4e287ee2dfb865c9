use crate::{Site, Tab};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeskViewModel {
    pub tab: Tab,
    pub search: String,
    pub rows: Vec<OrderRowView>,
    pub row_count: usize,
    /// Count line shown under the table.
    pub meta: String,
    pub loading: bool,
    pub has_more: bool,
    pub selection_text: String,
    pub transfer_enabled: bool,
    pub dialog: Option<TransferDialogView>,
    pub last_error: Option<String>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRowView {
    pub id: String,
    pub order_number: String,
    pub customer_name: String,
    pub handling_site: String,
    pub urgency: String,
    pub payment_status: String,
    pub status: String,
    pub total: String,
    pub selected: bool,
    /// A mutation for this row is awaiting its push update.
    pub pending: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferDialogView {
    pub order_label: String,
    pub suggested_site: Site,
}
