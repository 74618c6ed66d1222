use std::sync::atomic::{AtomicU32, Ordering};

use crate::codec::{check_min_len, put_u16, put_u32, put_u8, Reader};
use crate::error::{OfpError, Result};
use crate::openflow0x01::{MsgCode, OFP_MAX_XID, OFP_VERSION};

/// OpenFlow Header
///
/// The first fields of every OpenFlow message, no matter the protocol version.
/// This is parsed to determine version and length of the remaining message, so that
/// it can be properly handled.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct OfpHeader {
    version: u8,
    typ: u8,
    length: u16,
    xid: u32,
}

impl OfpHeader {
    /// Create an `OfpHeader` out of the arguments.
    pub fn new(version: u8, typ: u8, length: u16, xid: u32) -> OfpHeader {
        OfpHeader {
            version: version,
            typ: typ,
            length: length,
            xid: xid,
        }
    }

    /// Return the byte-size of an `OfpHeader`.
    pub fn size() -> usize {
        8
    }

    /// Fills a message buffer with the header fields of an `OfpHeader`.
    pub fn marshal(bytes: &mut Vec<u8>, header: OfpHeader) {
        put_u8(bytes, header.version);
        put_u8(bytes, header.typ);
        put_u16(bytes, header.length);
        put_u32(bytes, header.xid);
    }

    /// Read and validate the header at the front of `buf`.
    ///
    /// The version must be 0x01, except on a HELLO, which is accepted at any
    /// version so negotiation can proceed. The type must be known and the
    /// length must cover that type's fixed part. The length is not compared
    /// with `buf`; that is up to the caller, which knows how the buffer was
    /// framed.
    pub fn parse(buf: &[u8]) -> Result<OfpHeader> {
        let mut bytes = Reader::new(buf);
        let header = OfpHeader {
            version: bytes.read_u8()?,
            typ: bytes.read_u8()?,
            length: bytes.read_u16()?,
            xid: bytes.read_u32()?,
        };
        let code = header.type_code()?;
        if header.version != OFP_VERSION && code != MsgCode::Hello {
            return Err(OfpError::UnsupportedVersion(header.version));
        }
        check_min_len(code.name(), header.length(), code.min_bytes())?;
        Ok(header)
    }

    /// Return the `version` field of a header.
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Return the OpenFlow message type code of a header.
    pub fn type_code(&self) -> Result<MsgCode> {
        MsgCode::of_int(self.typ)
    }

    /// Return the `length` field of a header. Includes the length of the header itself.
    pub fn length(&self) -> usize {
        self.length as usize
    }

    /// Return the `xid` field of a header, the transaction id associated with this packet.
    ///  Replies use the same id to facilitate pairing.
    pub fn xid(&self) -> u32 {
        self.xid
    }
}

static LAST_XID: AtomicU32 = AtomicU32::new(0);

/// A fresh transaction id for a request originated by this process.
///
/// Ids run from 1 to `OFP_MAX_XID` and then wrap back to 1.
pub fn next_xid() -> u32 {
    let step = |x: u32| if x >= OFP_MAX_XID { 1 } else { x + 1 };
    let prev = LAST_XID.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |x| Some(step(x)))
        .unwrap_or_else(|x| x);
    step(prev)
}
