//! Orderdesk bridge: boundary codec and the channel link to the host page.
mod codec;
mod link;

pub use codec::{decode_inbound, encode_outbound, DecodeError, INBOUND_KINDS};
pub use link::{ChannelHostLink, HostEnd, HostLink, LinkError};
