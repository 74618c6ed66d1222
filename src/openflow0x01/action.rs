use crate::codec::{put_u16, put_u32, put_u8, write_padding_bytes, MacAddr, Reader};
use crate::error::{OfpError, Result};
use crate::list::ListElement;
use crate::registry::{dispatch_vendor, Family, Vendor};

use super::PseudoPort;

#[repr(u16)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OfpActionType {
    OFPATOutput,
    OFPATSetVlanVId,
    OFPATSetVlanPCP,
    OFPATStripVlan,
    OFPATSetDlSrc,
    OFPATSetDlDst,
    OFPATSetNwSrc,
    OFPATSetNwDst,
    OFPATSetNwTos,
    OFPATSetTpSrc,
    OFPATSetTpDst,
    OFPATEnqueue,
    OFPATVendor = 0xffff,
}

/// Actions associated with flows and packets.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    /// Send out `port`. `max_len` caps the bytes sent when `port` is the controller.
    Output { port: PseudoPort, max_len: u16 },
    /// Set the 802.1Q VLAN id, or strip the tag with `None`.
    SetDlVlan(Option<u16>),
    SetDlVlanPcp(u8),
    SetDlSrc(MacAddr),
    SetDlDst(MacAddr),
    SetNwSrc(u32),
    SetNwDst(u32),
    SetNwTos(u8),
    SetTpSrc(u16),
    SetTpDst(u16),
    /// Output to a queue attached to a port.
    Enqueue { port: PseudoPort, queue_id: u32 },
    Vendor(Vendor),
}

impl Action {
    pub fn type_code(&self) -> OfpActionType {
        match *self {
            Action::Output { .. } => OfpActionType::OFPATOutput,
            Action::SetDlVlan(None) => OfpActionType::OFPATStripVlan,
            Action::SetDlVlan(Some(_)) => OfpActionType::OFPATSetVlanVId,
            Action::SetDlVlanPcp(_) => OfpActionType::OFPATSetVlanPCP,
            Action::SetDlSrc(_) => OfpActionType::OFPATSetDlSrc,
            Action::SetDlDst(_) => OfpActionType::OFPATSetDlDst,
            Action::SetNwSrc(_) => OfpActionType::OFPATSetNwSrc,
            Action::SetNwDst(_) => OfpActionType::OFPATSetNwDst,
            Action::SetNwTos(_) => OfpActionType::OFPATSetNwTos,
            Action::SetTpSrc(_) => OfpActionType::OFPATSetTpSrc,
            Action::SetTpDst(_) => OfpActionType::OFPATSetTpDst,
            Action::Enqueue { .. } => OfpActionType::OFPATEnqueue,
            Action::Vendor(_) => OfpActionType::OFPATVendor,
        }
    }

    /// Wire size of the action, including its type/length header.
    pub fn size_of(&self) -> usize {
        match *self {
            Action::SetDlSrc(_) |
            Action::SetDlDst(_) |
            Action::Enqueue { .. } => 16,
            Action::Vendor(ref v) => 8 + v.size_of(),
            _ => 8,
        }
    }

    /// Decode one action from exactly the bytes its header says it spans.
    pub fn parse(buf: &[u8]) -> Result<Action> {
        let mut bytes = Reader::new(buf);
        let typ = bytes.read_u16()?;
        bytes.skip(2)?;
        let action = match typ {
            t if t == OfpActionType::OFPATOutput as u16 => {
                let port = PseudoPort::make(bytes.read_u16()?);
                Action::Output {
                    port: port,
                    max_len: bytes.read_u16()?,
                }
            }
            t if t == OfpActionType::OFPATSetVlanVId as u16 => {
                Action::SetDlVlan(Some(bytes.read_u16()?))
            }
            t if t == OfpActionType::OFPATSetVlanPCP as u16 => {
                Action::SetDlVlanPcp(bytes.read_u8()?)
            }
            t if t == OfpActionType::OFPATStripVlan as u16 => Action::SetDlVlan(None),
            t if t == OfpActionType::OFPATSetDlSrc as u16 => Action::SetDlSrc(bytes.read_mac()?),
            t if t == OfpActionType::OFPATSetDlDst as u16 => Action::SetDlDst(bytes.read_mac()?),
            t if t == OfpActionType::OFPATSetNwSrc as u16 => Action::SetNwSrc(bytes.read_u32()?),
            t if t == OfpActionType::OFPATSetNwDst as u16 => Action::SetNwDst(bytes.read_u32()?),
            t if t == OfpActionType::OFPATSetNwTos as u16 => Action::SetNwTos(bytes.read_u8()?),
            t if t == OfpActionType::OFPATSetTpSrc as u16 => Action::SetTpSrc(bytes.read_u16()?),
            t if t == OfpActionType::OFPATSetTpDst as u16 => Action::SetTpDst(bytes.read_u16()?),
            t if t == OfpActionType::OFPATEnqueue as u16 => {
                let port = PseudoPort::make(bytes.read_u16()?);
                bytes.skip(6)?;
                Action::Enqueue {
                    port: port,
                    queue_id: bytes.read_u32()?,
                }
            }
            t if t == OfpActionType::OFPATVendor as u16 => {
                let vendor = bytes.read_u32()?;
                Action::Vendor(dispatch_vendor(Family::ActionVendor, vendor, bytes.rest())?)
            }
            t => {
                return Err(OfpError::UnknownVariant {
                    family: Family::Action,
                    discriminant: t as u32,
                })
            }
        };
        Ok(action)
    }

    pub fn marshal(&self, bytes: &mut Vec<u8>) {
        put_u16(bytes, self.type_code() as u16);
        put_u16(bytes, self.size_of() as u16);
        match *self {
            Action::Output { port, max_len } => {
                port.marshal(bytes);
                put_u16(bytes, max_len);
            }
            Action::SetDlVlan(None) => write_padding_bytes(bytes, 4),
            Action::SetDlVlan(Some(vid)) => {
                put_u16(bytes, vid);
                write_padding_bytes(bytes, 2);
            }
            Action::SetDlVlanPcp(pcp) => {
                put_u8(bytes, pcp);
                write_padding_bytes(bytes, 3);
            }
            Action::SetDlSrc(mac) |
            Action::SetDlDst(mac) => {
                bytes.extend_from_slice(&mac);
                write_padding_bytes(bytes, 6);
            }
            Action::SetNwSrc(addr) |
            Action::SetNwDst(addr) => put_u32(bytes, addr),
            Action::SetNwTos(tos) => {
                put_u8(bytes, tos);
                write_padding_bytes(bytes, 3);
            }
            Action::SetTpSrc(pt) |
            Action::SetTpDst(pt) => {
                put_u16(bytes, pt);
                write_padding_bytes(bytes, 2);
            }
            Action::Enqueue { port, queue_id } => {
                port.marshal(bytes);
                write_padding_bytes(bytes, 6);
                put_u32(bytes, queue_id);
            }
            Action::Vendor(ref v) => {
                put_u32(bytes, v.vendor());
                v.marshal(bytes);
            }
        }
    }
}

impl ListElement for Action {
    const FAMILY: Family = Family::Action;
    const MIN_SIZE: usize = 8;

    fn element_len(head: &[u8]) -> Result<usize> {
        let mut bytes = Reader::new(head);
        bytes.skip(2)?;
        Ok(bytes.read_u16()? as usize)
    }

    fn parse(buf: &[u8]) -> Result<Action> {
        Action::parse(buf)
    }

    fn size_of(&self) -> usize {
        Action::size_of(self)
    }

    fn marshal(&self, bytes: &mut Vec<u8>) {
        Action::marshal(self, bytes)
    }
}
