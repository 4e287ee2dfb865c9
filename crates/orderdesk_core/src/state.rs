use crate::view_model::{DeskViewModel, OrderRowView, TransferDialogView};
use crate::{CoordinatorSettings, MutationKind, OrderRecord, RequestCoordinator, Site, Tab};

pub const DEFAULT_SCROLL_THRESHOLD_PX: u32 = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeskSettings {
    pub coordinator: CoordinatorSettings,
    pub initial_tab: Tab,
    pub scroll_threshold_px: u32,
}

impl Default for DeskSettings {
    fn default() -> Self {
        Self {
            coordinator: CoordinatorSettings::default(),
            initial_tab: Tab::SiteA,
            scroll_threshold_px: DEFAULT_SCROLL_THRESHOLD_PX,
        }
    }
}

/// The selected row, with the fields the selection bar and transfer dialog show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub id: String,
    pub order_number: String,
    pub customer_name: String,
    pub handling_site: Option<Site>,
}

impl Selection {
    pub fn of(record: &OrderRecord) -> Self {
        Self {
            id: record.id.clone(),
            order_number: record.order_number(),
            customer_name: record.customer_name(),
            handling_site: record.handling_site.clone(),
        }
    }

    /// `#<order number or id>[ · <customer>]`
    pub fn label(&self) -> String {
        let number = if self.order_number.is_empty() {
            &self.id
        } else {
            &self.order_number
        };
        if self.customer_name.is_empty() {
            format!("#{number}")
        } else {
            format!("#{number} · {}", self.customer_name)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAction {
    pub kind: MutationKind,
    pub target_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TransferDialog {
    pub(crate) suggested: Site,
}

/// Widget state: the request coordinator plus what only the view layer needs.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub(crate) settings: DeskSettings,
    pub(crate) coordinator: RequestCoordinator,
    pub(crate) selection: Option<Selection>,
    pub(crate) dialog: Option<TransferDialog>,
    pub(crate) pending: Option<PendingAction>,
    pub(crate) last_error: Option<String>,
    dirty: bool,
}

impl AppState {
    pub fn new(settings: DeskSettings) -> Self {
        let coordinator =
            RequestCoordinator::new(settings.coordinator.clone(), settings.initial_tab);
        Self {
            settings,
            coordinator,
            selection: None,
            dialog: None,
            pending: None,
            last_error: None,
            dirty: false,
        }
    }

    pub fn coordinator(&self) -> &RequestCoordinator {
        &self.coordinator
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn pending(&self) -> Option<&PendingAction> {
        self.pending.as_ref()
    }

    pub fn view(&self) -> DeskViewModel {
        let coordinator = &self.coordinator;
        let selected_id = self.selection.as_ref().map(|s| s.id.as_str());
        let pending_id = self.pending.as_ref().map(|p| p.target_id.as_str());
        let rows = coordinator
            .rows()
            .iter()
            .map(|record| OrderRowView {
                id: record.id.clone(),
                order_number: record.order_number(),
                customer_name: record.customer_name(),
                handling_site: record
                    .handling_site
                    .as_ref()
                    .map(|site| site.to_string())
                    .unwrap_or_default(),
                urgency: record.urgency(),
                payment_status: record.text("paymentStatus"),
                status: record.text("orderStatusFinal"),
                total: record.text("total"),
                selected: selected_id == Some(record.id.as_str()),
                pending: pending_id == Some(record.id.as_str()),
            })
            .collect::<Vec<_>>();

        let mut meta = format!("{} orders", rows.len());
        if coordinator.is_loading() {
            meta.push_str(" · loading…");
        } else if coordinator.has_more() {
            meta.push_str(" · more available");
        }

        let selection_text = match &self.selection {
            Some(selection) => format!("Selected: {}", selection.label()),
            None => "No order selected".to_string(),
        };

        let dialog = match (&self.dialog, &self.selection) {
            (Some(dialog), Some(selection)) => Some(TransferDialogView {
                order_label: selection.label(),
                suggested_site: dialog.suggested.clone(),
            }),
            _ => None,
        };

        DeskViewModel {
            tab: coordinator.query().tab,
            search: coordinator.query().search.clone(),
            row_count: rows.len(),
            rows,
            meta,
            loading: coordinator.is_loading(),
            has_more: coordinator.has_more(),
            selection_text,
            transfer_enabled: self.selection.is_some(),
            dialog,
            last_error: self.last_error.clone(),
            dirty: self.dirty,
        }
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Drops everything that refers to the current rows. Call before a filter reset.
    pub(crate) fn forget_rows(&mut self) {
        self.selection = None;
        self.dialog = None;
        // Its push update would carry the old generation and be dropped.
        self.pending = None;
        self.mark_dirty();
    }

    /// Destination offered when the transfer dialog opens.
    pub(crate) fn suggested_destination(&self) -> Site {
        self.selection
            .as_ref()
            .and_then(|s| s.handling_site.as_ref())
            .and_then(Site::opposite)
            .or_else(|| self.coordinator.query().tab.site().and_then(|s| s.opposite()))
            .unwrap_or(Site::SiteB)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DeskSettings::default())
    }
}
