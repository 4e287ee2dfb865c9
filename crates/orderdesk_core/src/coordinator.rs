//! Request/response reconciliation for the paginated order table.
//!
//! The coordinator owns the query, the pagination cursor, the current ticket
//! and the accumulated rows. Replies from the host arrive in no particular
//! order; only those carrying the current ticket are applied.

use std::collections::BTreeSet;

use desk_logging::{desk_debug, desk_warn};

use crate::{Cursor, OrderRecord, OutboundMessage, Site, Tab, Ticket, Urgency};

pub const DEFAULT_PAGE_SIZE: u32 = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorSettings {
    pub page_size: u32,
    /// Treat replies without a ticket as current. Legacy hosts only.
    pub accept_untracked: bool,
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            accept_untracked: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    pub tab: Tab,
    pub search: String,
    pub cursor: Cursor,
    pub page_size: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    UrgencyChange,
    SiteTransfer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Urgency { id: String, value: Urgency },
    Transfer { id: String, to_site: Site, note: String },
}

impl Mutation {
    pub fn kind(&self) -> MutationKind {
        match self {
            Mutation::Urgency { .. } => MutationKind::UrgencyChange,
            Mutation::Transfer { .. } => MutationKind::SiteTransfer,
        }
    }

    pub fn target_id(&self) -> &str {
        match self {
            Mutation::Urgency { id, .. } | Mutation::Transfer { id, .. } => id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MutationRejected {
    #[error("order {0} is not in the table")]
    UnknownOrder(String),
    #[error("order {id} is already handled by {site}")]
    SameSite { id: String, site: Site },
}

/// What happened to an `ORDERS_RESULT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    Applied { appended: usize },
    Stale,
}

/// What happened to an `ERROR`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorOutcome {
    /// The outstanding page request failed; loading is cleared.
    PageFailed(String),
    /// A failure under the current filter that does not belong to a page request.
    MutationFailed(String),
    Stale,
}

/// What happened to an `ORDER_UPDATED`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    Replaced,
    /// The record no longer belongs under the active tab.
    Removed,
    /// The record is not displayed; nothing changed.
    NotShown,
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Freshness {
    /// Exactly the current ticket.
    Current,
    /// Same filter generation, different request.
    SameGeneration { seq: u64 },
    Stale,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequestCoordinator {
    settings: CoordinatorSettings,
    query: QueryState,
    current: Ticket,
    last_seq: u64,
    /// Seqs of mutations under the current generation still awaiting a reply.
    mutations: BTreeSet<u64>,
    loading: bool,
    has_more: bool,
    rows: Vec<OrderRecord>,
}

impl RequestCoordinator {
    pub fn new(settings: CoordinatorSettings, tab: Tab) -> Self {
        let page_size = settings.page_size.max(1);
        Self {
            settings,
            query: QueryState {
                tab,
                search: String::new(),
                cursor: Cursor::INITIAL,
                page_size,
            },
            current: Ticket {
                generation: 0,
                seq: 0,
            },
            last_seq: 0,
            mutations: BTreeSet::new(),
            loading: false,
            has_more: true,
            rows: Vec::new(),
        }
    }

    pub fn query(&self) -> &QueryState {
        &self.query
    }

    pub fn current_ticket(&self) -> Ticket {
        self.current
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn rows(&self) -> &[OrderRecord] {
        &self.rows
    }

    pub fn row(&self, id: &str) -> Option<&OrderRecord> {
        self.rows.iter().find(|row| row.id == id)
    }

    /// Replaces tab and/or search, rewinds pagination and clears the rows.
    ///
    /// Any reply still in flight becomes stale. No request is emitted.
    pub fn reset_filter(&mut self, tab: Option<Tab>, search: Option<String>) {
        if let Some(tab) = tab {
            self.query.tab = tab;
        }
        if let Some(search) = search {
            self.query.search = search;
        }
        self.query.cursor = Cursor::INITIAL;
        self.has_more = true;
        self.loading = false;
        self.rows.clear();
        self.mutations.clear();
        self.current = Ticket {
            generation: self.current.generation + 1,
            seq: self.next_seq(),
        };
        desk_debug!(
            "reset filter tab={} search={:?} ticket={}",
            self.query.tab,
            self.query.search,
            self.current
        );
    }

    /// Emits `GET_ORDERS` for the next page unless a page is already
    /// outstanding or the result set is exhausted.
    pub fn request_page(&mut self) -> Option<OutboundMessage> {
        if self.loading || !self.has_more {
            desk_debug!(
                "request_page skipped loading={} has_more={}",
                self.loading,
                self.has_more
            );
            return None;
        }
        self.current = Ticket {
            generation: self.current.generation,
            seq: self.next_seq(),
        };
        self.loading = true;
        Some(OutboundMessage::GetOrders {
            cursor: self.query.cursor.clone(),
            page_size: self.query.page_size,
            tab: self.query.tab,
            search: self.query.search.clone(),
            ticket: self.current,
        })
    }

    pub fn on_result_received(
        &mut self,
        ticket: Option<Ticket>,
        items: Vec<OrderRecord>,
        next_cursor: Option<Cursor>,
        has_more: Option<bool>,
    ) -> PageOutcome {
        if self.freshness(ticket) != Freshness::Current || !self.loading {
            desk_debug!("dropping stale ORDERS_RESULT ticket={:?}", ticket);
            return PageOutcome::Stale;
        }
        let appended = items.len();
        let inferred_more = appended >= self.query.page_size as usize;
        let successor = next_cursor.or_else(|| self.query.cursor.advanced_by(appended));
        self.has_more = match successor {
            Some(_) => has_more.unwrap_or(inferred_more),
            None => false,
        };
        if let Some(cursor) = successor {
            self.query.cursor = cursor;
        }
        self.rows.extend(items);
        self.loading = false;
        PageOutcome::Applied { appended }
    }

    pub fn on_error_received(&mut self, ticket: Option<Ticket>, message: String) -> ErrorOutcome {
        match self.freshness(ticket) {
            Freshness::Current if self.loading => {
                self.loading = false;
                ErrorOutcome::PageFailed(message)
            }
            Freshness::SameGeneration { seq } if self.mutations.remove(&seq) => {
                ErrorOutcome::MutationFailed(message)
            }
            // Untracked legacy error with no page outstanding.
            Freshness::Current if ticket.is_none() => ErrorOutcome::MutationFailed(message),
            Freshness::Current | Freshness::SameGeneration { .. } | Freshness::Stale => {
                desk_debug!("dropping stale ERROR ticket={:?}", ticket);
                ErrorOutcome::Stale
            }
        }
    }

    /// Sole pagination trigger besides refresh.
    pub fn on_scroll_near_threshold(&mut self) -> Option<OutboundMessage> {
        self.request_page()
    }

    /// Call only once the search input has been quiet for the debounce delay.
    pub fn on_search_input_changed(&mut self, raw: &str) -> Option<OutboundMessage> {
        self.reset_filter(None, Some(raw.trim().to_string()));
        self.request_page()
    }

    pub fn on_tab_changed(&mut self, tab: Tab) -> Option<OutboundMessage> {
        self.reset_filter(Some(tab), None);
        self.request_page()
    }

    /// Emits exactly one mutation message for a displayed row.
    ///
    /// The mutation gets its own ticket under the current generation; the
    /// current ticket, loading flag and cursor are untouched.
    pub fn on_mutation_requested(
        &mut self,
        mutation: Mutation,
    ) -> Result<OutboundMessage, MutationRejected> {
        let row = self
            .row(mutation.target_id())
            .ok_or_else(|| MutationRejected::UnknownOrder(mutation.target_id().to_string()))?;
        if let Mutation::Transfer { id, to_site, .. } = &mutation {
            if row.handling_site.as_ref() == Some(to_site) {
                return Err(MutationRejected::SameSite {
                    id: id.clone(),
                    site: to_site.clone(),
                });
            }
        }
        let ticket = Ticket {
            generation: self.current.generation,
            seq: self.next_seq(),
        };
        self.mutations.insert(ticket.seq);
        Ok(match mutation {
            Mutation::Urgency { id, value } => OutboundMessage::SetUrgency { id, value, ticket },
            Mutation::Transfer { id, to_site, note } => OutboundMessage::TransferOrder {
                id,
                to_site,
                note,
                ticket,
            },
        })
    }

    /// Mutations sent under the current filter that have had no reply yet.
    pub fn outstanding_mutations(&self) -> usize {
        self.mutations.len()
    }

    pub fn on_push_update(&mut self, ticket: Option<Ticket>, record: OrderRecord) -> PushOutcome {
        match self.freshness(ticket) {
            Freshness::Stale => {
                desk_debug!("dropping stale ORDER_UPDATED id={} ticket={:?}", record.id, ticket);
                return PushOutcome::Stale;
            }
            Freshness::SameGeneration { seq } => {
                self.mutations.remove(&seq);
            }
            Freshness::Current => {}
        }
        let Some(index) = self.rows.iter().position(|row| row.id == record.id) else {
            desk_debug!("ORDER_UPDATED for undisplayed order {}", record.id);
            return PushOutcome::NotShown;
        };
        if self.query.tab.admits(record.handling_site.as_ref()) {
            self.rows[index] = record;
            PushOutcome::Replaced
        } else {
            self.rows.remove(index);
            PushOutcome::Removed
        }
    }

    fn next_seq(&mut self) -> u64 {
        self.last_seq += 1;
        self.last_seq
    }

    fn freshness(&self, ticket: Option<Ticket>) -> Freshness {
        match ticket {
            Some(ticket) if ticket == self.current => Freshness::Current,
            Some(ticket) if ticket.generation == self.current.generation => {
                Freshness::SameGeneration { seq: ticket.seq }
            }
            Some(_) => Freshness::Stale,
            None if self.settings.accept_untracked => Freshness::Current,
            None => {
                desk_warn!("reply without ticket dropped; host must echo the request ticket");
                Freshness::Stale
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coordinator() -> RequestCoordinator {
        RequestCoordinator::new(CoordinatorSettings::default(), Tab::SiteA)
    }

    #[test]
    fn reset_always_mints_a_fresh_ticket() {
        let mut c = coordinator();
        let before = c.current_ticket();
        c.reset_filter(None, None);
        let after = c.current_ticket();
        assert_ne!(before, after);
        assert_eq!(after.generation, before.generation + 1);
    }

    #[test]
    fn page_ticket_keeps_generation() {
        let mut c = coordinator();
        c.reset_filter(None, None);
        let generation = c.current_ticket().generation;
        c.request_page().unwrap();
        assert_eq!(c.current_ticket().generation, generation);
    }

    #[test]
    fn untracked_reply_accepted_only_when_enabled() {
        let mut strict = coordinator();
        strict.request_page().unwrap();
        assert_eq!(
            strict.on_result_received(None, Vec::new(), None, Some(false)),
            PageOutcome::Stale
        );

        let mut legacy = RequestCoordinator::new(
            CoordinatorSettings {
                accept_untracked: true,
                ..CoordinatorSettings::default()
            },
            Tab::SiteA,
        );
        legacy.request_page().unwrap();
        assert_eq!(
            legacy.on_result_received(None, Vec::new(), None, Some(false)),
            PageOutcome::Applied { appended: 0 }
        );
    }

    #[test]
    fn zero_page_size_is_clamped() {
        let c = RequestCoordinator::new(
            CoordinatorSettings {
                page_size: 0,
                accept_untracked: false,
            },
            Tab::Admin,
        );
        assert_eq!(c.query().page_size, 1);
    }
}
