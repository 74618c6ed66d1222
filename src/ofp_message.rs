use crate::error::{OfpError, Result};
use crate::ofp_header::OfpHeader;

/// OpenFlow Message
///
/// Version-agnostic API for handling OpenFlow messages at the byte-buffer level.
pub trait OfpMessage: Sized {
    /// Return the byte-size of an `OfpMessage`, header included.
    fn size_of(msg: &Self) -> usize;
    /// Create an `OfpHeader` for the given transaction id and OpenFlow message.
    /// Fails when the message does not fit the 16-bit length field.
    fn header_of(xid: u32, msg: &Self) -> Result<OfpHeader>;
    /// Return a marshaled buffer containing an OpenFlow header and the message `msg`.
    fn marshal(xid: u32, msg: &Self) -> Result<Vec<u8>>;
    /// Returns a pair `(u32, OfpMessage)` of the transaction id and OpenFlow message parsed from
    /// the given OpenFlow header `header`, and buffer `buf` holding the rest of the message.
    fn parse(header: &OfpHeader, buf: &[u8]) -> Result<(u32, Self)>;

    /// Decode one complete message, header included.
    ///
    /// `buf` must hold exactly the bytes the header's `length` announces.
    fn decode(buf: &[u8]) -> Result<(u32, Self)> {
        let header = OfpHeader::parse(buf)?;
        if header.length() != buf.len() {
            return Err(OfpError::MalformedLength {
                what: header.type_code()?.name(),
                length: header.length(),
            });
        }
        Self::parse(&header, &buf[OfpHeader::size()..])
    }
}
