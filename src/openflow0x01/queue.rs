//! Queue descriptors for QUEUE_GET_CONFIG.

use crate::codec::{put_u16, put_u32, write_padding_bytes, Reader};
use crate::error::{OfpError, Result};
use crate::list::{marshal_list, parse_list, size_of_list, ListElement, SkippedElements};
use crate::registry::Family;

use super::MessageType;

#[repr(u16)]
enum OfpQueueProperties {
    OFPQTNone,
    OFPQTMinRate,
}

/// A property of a packet queue.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum QueueProp {
    /// No property defined for the queue.
    None,
    /// Minimum rate in tenths of a percent. Values above 1000 mean disabled.
    MinRate(u16),
}

impl QueueProp {
    fn type_code(&self) -> u16 {
        match *self {
            QueueProp::None => OfpQueueProperties::OFPQTNone as u16,
            QueueProp::MinRate(_) => OfpQueueProperties::OFPQTMinRate as u16,
        }
    }
}

impl ListElement for QueueProp {
    const FAMILY: Family = Family::QueueProperty;
    const MIN_SIZE: usize = 8;

    fn element_len(head: &[u8]) -> Result<usize> {
        let mut bytes = Reader::new(head);
        bytes.skip(2)?;
        Ok(bytes.read_u16()? as usize)
    }

    fn parse(buf: &[u8]) -> Result<QueueProp> {
        let mut bytes = Reader::new(buf);
        let property = bytes.read_u16()?;
        bytes.skip(6)?;
        match property {
            p if p == OfpQueueProperties::OFPQTNone as u16 => Ok(QueueProp::None),
            p if p == OfpQueueProperties::OFPQTMinRate as u16 => {
                let rate = bytes.read_u16()?;
                bytes.skip(6)?;
                Ok(QueueProp::MinRate(rate))
            }
            p => {
                Err(OfpError::UnknownVariant {
                    family: Family::QueueProperty,
                    discriminant: p as u32,
                })
            }
        }
    }

    fn size_of(&self) -> usize {
        match *self {
            QueueProp::None => 8,
            QueueProp::MinRate(_) => 16,
        }
    }

    fn marshal(&self, bytes: &mut Vec<u8>) {
        put_u16(bytes, self.type_code());
        put_u16(bytes, ListElement::size_of(self) as u16);
        write_padding_bytes(bytes, 4);
        if let QueueProp::MinRate(rate) = *self {
            put_u16(bytes, rate);
            write_padding_bytes(bytes, 6);
        }
    }
}

/// A queue attached to a port, with its properties.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PacketQueue {
    pub queue_id: u32,
    pub properties: Vec<QueueProp>,
    /// Properties of unknown type dropped while decoding.
    pub skipped: SkippedElements,
}

/// Queue descriptors report their length at offset 4, after the queue id.
/// They share the queue property family for list errors.
impl ListElement for PacketQueue {
    const FAMILY: Family = Family::QueueProperty;
    const MIN_SIZE: usize = 8;

    fn element_len(head: &[u8]) -> Result<usize> {
        let mut bytes = Reader::new(head);
        bytes.skip(4)?;
        Ok(bytes.read_u16()? as usize)
    }

    fn parse(buf: &[u8]) -> Result<PacketQueue> {
        let mut bytes = Reader::new(buf);
        let queue_id = bytes.read_u32()?;
        bytes.skip(4)?;
        let (properties, skipped) = parse_list::<QueueProp>(bytes.rest())?.into_parts();
        Ok(PacketQueue {
            queue_id: queue_id,
            properties: properties,
            skipped: skipped,
        })
    }

    fn size_of(&self) -> usize {
        8 + size_of_list(&self.properties)
    }

    fn marshal(&self, bytes: &mut Vec<u8>) {
        put_u32(bytes, self.queue_id);
        put_u16(bytes, ListElement::size_of(self) as u16);
        write_padding_bytes(bytes, 2);
        marshal_list(&self.properties, bytes);
    }
}

/// Query the queues configured on a port.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct QueueGetConfigRequest {
    pub port: u16,
}

impl MessageType for QueueGetConfigRequest {
    fn size_of(&self) -> usize {
        4
    }

    fn parse(buf: &[u8]) -> Result<QueueGetConfigRequest> {
        let mut bytes = Reader::new(buf);
        let port = bytes.read_u16()?;
        bytes.skip(2)?;
        Ok(QueueGetConfigRequest { port: port })
    }

    fn marshal(&self, bytes: &mut Vec<u8>) {
        put_u16(bytes, self.port);
        write_padding_bytes(bytes, 2);
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueueGetConfigReply {
    pub port: u16,
    pub queues: Vec<PacketQueue>,
    pub skipped: SkippedElements,
}

impl MessageType for QueueGetConfigReply {
    fn size_of(&self) -> usize {
        8 + size_of_list(&self.queues)
    }

    fn parse(buf: &[u8]) -> Result<QueueGetConfigReply> {
        let mut bytes = Reader::new(buf);
        let port = bytes.read_u16()?;
        bytes.skip(6)?;
        let (queues, skipped) = parse_list::<PacketQueue>(bytes.rest())?.into_parts();
        Ok(QueueGetConfigReply {
            port: port,
            queues: queues,
            skipped: skipped,
        })
    }

    fn marshal(&self, bytes: &mut Vec<u8>) {
        put_u16(bytes, self.port);
        write_padding_bytes(bytes, 6);
        marshal_list(&self.queues, bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_with_nested_property_lists() {
        let reply = QueueGetConfigReply {
            port: 1,
            queues: vec![PacketQueue {
                             queue_id: 0,
                             properties: vec![QueueProp::MinRate(500)],
                             skipped: SkippedElements::default(),
                         },
                         PacketQueue {
                             queue_id: 1,
                             properties: vec![],
                             skipped: SkippedElements::default(),
                         },
                         PacketQueue {
                             queue_id: 2,
                             properties: vec![QueueProp::None, QueueProp::MinRate(1001)],
                             skipped: SkippedElements::default(),
                         }],
            skipped: SkippedElements::default(),
        };
        let mut bytes = vec![];
        reply.marshal(&mut bytes);
        assert_eq!(bytes.len(), reply.size_of());
        assert_eq!(bytes.len(), 8 + 24 + 8 + 32);
        assert_eq!(QueueGetConfigReply::parse(&bytes).unwrap(), reply);
    }

    #[test]
    fn unknown_property_is_skipped() {
        let mut bytes = vec![];
        PacketQueue {
                queue_id: 9,
                properties: vec![QueueProp::MinRate(10)],
                skipped: SkippedElements::default(),
            }
            .marshal(&mut bytes);
        // Grow the queue by one 8-byte property of type 0x7f.
        bytes[5] += 8;
        bytes.extend_from_slice(&[0x00, 0x7f, 0x00, 0x08, 0, 0, 0, 0]);
        let q = <PacketQueue as ListElement>::parse(&bytes).unwrap();
        assert_eq!(q.properties, vec![QueueProp::MinRate(10)]);
        assert_eq!(q.skipped.len(), 1);
        assert_eq!(q.skipped[0].len, 8);
        assert_eq!(q.skipped[0].error,
                   OfpError::UnknownVariant {
                       family: Family::QueueProperty,
                       discriminant: 0x7f,
                   });
    }

    #[test]
    fn queue_length_past_budget_is_malformed() {
        let mut bytes = vec![0, 1, 0, 0, 0, 0, 0, 0];
        bytes.extend_from_slice(&[0, 0, 0, 1, 0, 0x40, 0, 0]);
        assert!(matches!(QueueGetConfigReply::parse(&bytes),
                         Err(OfpError::MalformedListLength { .. })));
    }

    #[test]
    fn request_round_trip() {
        let req = QueueGetConfigRequest { port: 0xfffe };
        let mut bytes = vec![];
        req.marshal(&mut bytes);
        assert_eq!(bytes, vec![0xff, 0xfe, 0, 0]);
        assert_eq!(QueueGetConfigRequest::parse(&bytes).unwrap(), req);
    }
}
