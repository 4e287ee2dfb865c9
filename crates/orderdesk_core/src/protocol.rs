//! Messages exchanged with the host page.
//!
//! Every message is a JSON object tagged by `type`. The host must echo the
//! `ticket` it received on the request a reply belongs to.

use serde::{Deserialize, Serialize};

use crate::{Cursor, OrderRecord, Site, Tab, Ticket, Urgency};

/// Widget -> host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutboundMessage {
    /// Request the next page under the current filter.
    #[serde(rename_all = "camelCase")]
    GetOrders {
        cursor: Cursor,
        page_size: u32,
        tab: Tab,
        search: String,
        ticket: Ticket,
    },
    SetUrgency {
        id: String,
        value: Urgency,
        ticket: Ticket,
    },
    #[serde(rename_all = "camelCase")]
    TransferOrder {
        id: String,
        to_site: Site,
        note: String,
        ticket: Ticket,
    },
}

impl OutboundMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            OutboundMessage::GetOrders { .. } => "GET_ORDERS",
            OutboundMessage::SetUrgency { .. } => "SET_URGENCY",
            OutboundMessage::TransferOrder { .. } => "TRANSFER_ORDER",
        }
    }

    pub fn ticket(&self) -> Ticket {
        match self {
            OutboundMessage::GetOrders { ticket, .. }
            | OutboundMessage::SetUrgency { ticket, .. }
            | OutboundMessage::TransferOrder { ticket, .. } => *ticket,
        }
    }
}

/// Host -> widget.
///
/// `ticket` is optional on the wire only so that untracked legacy replies can
/// be recognised; whether they are honoured is a coordinator setting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InboundMessage {
    #[serde(rename_all = "camelCase")]
    OrdersResult {
        #[serde(default)]
        items: Vec<OrderRecord>,
        #[serde(default)]
        next_cursor: Option<Cursor>,
        #[serde(default)]
        has_more: Option<bool>,
        #[serde(default)]
        ticket: Option<Ticket>,
    },
    OrderUpdated {
        item: OrderRecord,
        #[serde(default)]
        ticket: Option<Ticket>,
    },
    Error {
        #[serde(default)]
        message: String,
        #[serde(default)]
        ticket: Option<Ticket>,
    },
}

impl InboundMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            InboundMessage::OrdersResult { .. } => "ORDERS_RESULT",
            InboundMessage::OrderUpdated { .. } => "ORDER_UPDATED",
            InboundMessage::Error { .. } => "ERROR",
        }
    }

    pub fn ticket(&self) -> Option<Ticket> {
        match self {
            InboundMessage::OrdersResult { ticket, .. }
            | InboundMessage::OrderUpdated { ticket, .. }
            | InboundMessage::Error { ticket, .. } => *ticket,
        }
    }
}
