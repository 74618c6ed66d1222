//! OpenFlow 1.0 wire codec.
//!
//! Messages are decoded from, and encoded into, complete byte buffers with
//! `ofp_message::OfpMessage` implemented by `openflow0x01::message::Message`.
//! `ofp_match::Match::from_packet` turns a raw Ethernet frame into the match
//! key a controller would install for it. Transport, framing and session
//! handling are left to the caller.

#![crate_name = "rust_ofp"]
#![crate_type = "lib"]

mod bits;
pub mod codec;
pub mod error;
pub mod list;
pub mod ofp_header;
pub mod ofp_match;
pub mod ofp_message;
pub mod openflow0x01;
pub mod packet;
pub mod registry;

pub use error::{OfpError, Result};
