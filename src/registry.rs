//! Discriminant dispatch for the open-ended vendor families.
//!
//! Message types, stats types, action types and queue properties form closed
//! sets and are dispatched with a `match` in `openflow0x01`. Only vendor ids
//! are open: vendor messages, vendor stats requests and replies, and vendor
//! actions each look their body decoder up in a process-global `Registry`.
//!
//! Registries start empty. Decoders are installed with the `register_*`
//! functions during start-up, before messages are decoded. Registration takes
//! a write lock, so installing late is memory-safe, but a decode racing a
//! registration may or may not see the new entry.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use log::{trace, warn};

use crate::error::{OfpError, Result};

/// The polymorphic families a discriminant can be looked up in.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Family {
    Message,
    StatsRequest,
    StatsReply,
    VendorStatsRequest,
    VendorStatsReply,
    Action,
    ActionVendor,
    QueueProperty,
    Vendor,
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            Family::Message => "message",
            Family::StatsRequest => "stats request",
            Family::StatsReply => "stats reply",
            Family::VendorStatsRequest => "vendor stats request",
            Family::VendorStatsReply => "vendor stats reply",
            Family::Action => "action",
            Family::ActionVendor => "vendor action",
            Family::QueueProperty => "queue property",
            Family::Vendor => "vendor",
        };
        f.write_str(name)
    }
}

/// A decoded vendor body.
///
/// Implementations own everything after the 32-bit vendor id. `marshal` must
/// write exactly `size_of` bytes, and must not write the vendor id itself.
pub trait VendorData: fmt::Debug + Send + Sync {
    fn vendor(&self) -> u32;
    fn size_of(&self) -> usize;
    fn marshal(&self, bytes: &mut Vec<u8>);
    /// Downcasting hook for callers that know the concrete vendor type.
    fn as_any(&self) -> &dyn Any;
}

/// Shared handle to a vendor body, as stored inside messages and actions.
#[derive(Clone, Debug)]
pub struct Vendor(Arc<dyn VendorData>);

impl Vendor {
    pub fn new<T: VendorData + 'static>(data: T) -> Vendor {
        Vendor(Arc::new(data))
    }

    pub fn vendor(&self) -> u32 {
        self.0.vendor()
    }

    pub fn size_of(&self) -> usize {
        self.0.size_of()
    }

    pub fn marshal(&self, bytes: &mut Vec<u8>) {
        self.0.marshal(bytes)
    }

    /// Borrow the body as its concrete type, if it is one.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }
}

impl PartialEq for Vendor {
    fn eq(&self, other: &Vendor) -> bool {
        if self.vendor() != other.vendor() {
            return false;
        }
        let mut a = vec![];
        let mut b = vec![];
        self.marshal(&mut a);
        other.marshal(&mut b);
        a == b
    }
}

/// Builds a vendor body from the bytes that follow the vendor id.
pub type DecodeFn = Arc<dyn Fn(&[u8]) -> Result<Vendor> + Send + Sync>;

/// A mapping from vendor id to body decoder for one family.
pub struct Registry {
    family: Family,
    entries: RwLock<HashMap<u32, DecodeFn>>,
}

impl Registry {
    pub fn new(family: Family) -> Registry {
        Registry {
            family: family,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn family(&self) -> Family {
        self.family
    }

    /// Install `decode` for `discriminant`, replacing any earlier entry.
    pub fn register<F>(&self, discriminant: u32, decode: F)
        where F: Fn(&[u8]) -> Result<Vendor> + Send + Sync + 'static
    {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.insert(discriminant, Arc::new(decode)).is_some() {
            warn!("replaced {} decoder for {:#x}", self.family, discriminant);
        } else {
            trace!("registered {} decoder for {:#x}", self.family, discriminant);
        }
    }

    pub fn contains(&self, discriminant: u32) -> bool {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.contains_key(&discriminant)
    }

    /// Decode `buf` with the entry for `discriminant`.
    ///
    /// The entry is cloned out of the map first, so the decoder runs without
    /// holding the lock and may itself dispatch through a registry.
    pub fn dispatch(&self, discriminant: u32, buf: &[u8]) -> Result<Vendor> {
        let decode = {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            entries.get(&discriminant).cloned()
        };
        match decode {
            Some(decode) => decode(buf),
            None => {
                Err(OfpError::UnknownVariant {
                    family: self.family,
                    discriminant: discriminant,
                })
            }
        }
    }
}

static VENDOR: OnceLock<Registry> = OnceLock::new();
static VENDOR_STATS_REQUEST: OnceLock<Registry> = OnceLock::new();
static VENDOR_STATS_REPLY: OnceLock<Registry> = OnceLock::new();
static ACTION_VENDOR: OnceLock<Registry> = OnceLock::new();

/// The global registry for a vendor family. Closed families have none.
pub fn registry(family: Family) -> Option<&'static Registry> {
    let cell = match family {
        Family::Vendor => &VENDOR,
        Family::VendorStatsRequest => &VENDOR_STATS_REQUEST,
        Family::VendorStatsReply => &VENDOR_STATS_REPLY,
        Family::ActionVendor => &ACTION_VENDOR,
        _ => return None,
    };
    Some(cell.get_or_init(|| Registry::new(family)))
}

fn vendor_registry(family: Family) -> Result<&'static Registry> {
    registry(family).ok_or(OfpError::UnknownVariant {
        family: family,
        discriminant: 0,
    })
}

fn register_in<F>(family: Family, vendor: u32, decode: F)
    where F: Fn(&[u8]) -> Result<Vendor> + Send + Sync + 'static
{
    if let Some(reg) = registry(family) {
        reg.register(vendor, decode)
    }
}

/// Register a decoder for the body of `OFPT_VENDOR` messages from `vendor`.
pub fn register_vendor<F>(vendor: u32, decode: F)
    where F: Fn(&[u8]) -> Result<Vendor> + Send + Sync + 'static
{
    register_in(Family::Vendor, vendor, decode)
}

/// Register a decoder for `OFPST_VENDOR` stats request bodies from `vendor`.
pub fn register_vendor_stats_request<F>(vendor: u32, decode: F)
    where F: Fn(&[u8]) -> Result<Vendor> + Send + Sync + 'static
{
    register_in(Family::VendorStatsRequest, vendor, decode)
}

/// Register a decoder for `OFPST_VENDOR` stats reply bodies from `vendor`.
pub fn register_vendor_stats_reply<F>(vendor: u32, decode: F)
    where F: Fn(&[u8]) -> Result<Vendor> + Send + Sync + 'static
{
    register_in(Family::VendorStatsReply, vendor, decode)
}

/// Register a decoder for `OFPAT_VENDOR` action bodies from `vendor`.
pub fn register_vendor_action<F>(vendor: u32, decode: F)
    where F: Fn(&[u8]) -> Result<Vendor> + Send + Sync + 'static
{
    register_in(Family::ActionVendor, vendor, decode)
}

/// Decode a vendor body through the global registry of `family`.
pub fn dispatch_vendor(family: Family, vendor: u32, buf: &[u8]) -> Result<Vendor> {
    vendor_registry(family)?.dispatch(vendor, buf)
}
