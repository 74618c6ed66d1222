use crate::codec::{put_u32, Reader};
use crate::error::{OfpError, Result};
use crate::list::SkippedElements;
use crate::ofp_header::OfpHeader;
use crate::ofp_message::OfpMessage;
use crate::registry::{dispatch_vendor, Family, Vendor};

use super::action::Action;
use super::queue::{QueueGetConfigReply, QueueGetConfigRequest};
use super::stats::{StatsReq, StatsResp};
use super::*;

/// Abstractions of OpenFlow messages mapping to message codes.
#[derive(Clone, Debug, PartialEq)]
pub enum Message {
    Hello,
    Error(ErrorMsg),
    EchoRequest(Vec<u8>),
    EchoReply(Vec<u8>),
    Vendor(Vendor),
    FeaturesReq,
    FeaturesReply(SwitchFeatures),
    GetConfigRequest,
    GetConfigReply(SwitchConfig),
    SetConfig(SwitchConfig),
    PacketIn(PacketIn),
    FlowRemoved(FlowRemoved),
    PortStatus(PortStatus),
    PacketOut(PacketOut),
    FlowMod(FlowMod),
    PortMod(PortMod),
    StatsRequest(StatsReq),
    StatsReply(StatsResp),
    BarrierRequest,
    BarrierReply,
    QueueGetConfigRequest(QueueGetConfigRequest),
    QueueGetConfigReply(QueueGetConfigReply),
}

impl Message {
    /// Map `Message` to associated OpenFlow message type code `MsgCode`.
    pub fn msg_code_of_message(msg: &Message) -> MsgCode {
        match *msg {
            Message::Hello => MsgCode::Hello,
            Message::Error(_) => MsgCode::Error,
            Message::EchoRequest(_) => MsgCode::EchoReq,
            Message::EchoReply(_) => MsgCode::EchoResp,
            Message::Vendor(_) => MsgCode::Vendor,
            Message::FeaturesReq => MsgCode::FeaturesReq,
            Message::FeaturesReply(_) => MsgCode::FeaturesResp,
            Message::GetConfigRequest => MsgCode::GetConfigReq,
            Message::GetConfigReply(_) => MsgCode::GetConfigResp,
            Message::SetConfig(_) => MsgCode::SetConfig,
            Message::PacketIn(_) => MsgCode::PacketIn,
            Message::FlowRemoved(_) => MsgCode::FlowRemoved,
            Message::PortStatus(_) => MsgCode::PortStatus,
            Message::PacketOut(_) => MsgCode::PacketOut,
            Message::FlowMod(_) => MsgCode::FlowMod,
            Message::PortMod(_) => MsgCode::PortMod,
            Message::StatsRequest(_) => MsgCode::StatsReq,
            Message::StatsReply(_) => MsgCode::StatsResp,
            Message::BarrierRequest => MsgCode::BarrierReq,
            Message::BarrierReply => MsgCode::BarrierResp,
            Message::QueueGetConfigRequest(_) => MsgCode::QueueGetConfigReq,
            Message::QueueGetConfigReply(_) => MsgCode::QueueGetConfigResp,
        }
    }

    fn size_of_body(msg: &Message) -> usize {
        match *msg {
            Message::Hello |
            Message::FeaturesReq |
            Message::GetConfigRequest |
            Message::BarrierRequest |
            Message::BarrierReply => 0,
            Message::Error(ref err) => err.size_of(),
            Message::EchoRequest(ref buf) |
            Message::EchoReply(ref buf) => buf.len(),
            Message::Vendor(ref v) => 4 + v.size_of(),
            Message::FeaturesReply(ref feats) => feats.size_of(),
            Message::GetConfigReply(ref cfg) |
            Message::SetConfig(ref cfg) => cfg.size_of(),
            Message::PacketIn(ref packet_in) => packet_in.size_of(),
            Message::FlowRemoved(ref fr) => fr.size_of(),
            Message::PortStatus(ref ps) => ps.size_of(),
            Message::PacketOut(ref po) => po.size_of(),
            Message::FlowMod(ref flow_mod) => flow_mod.size_of(),
            Message::PortMod(ref pm) => pm.size_of(),
            Message::StatsRequest(ref req) => req.size_of(),
            Message::StatsReply(ref resp) => resp.size_of(),
            Message::QueueGetConfigRequest(ref req) => req.size_of(),
            Message::QueueGetConfigReply(ref reply) => reply.size_of(),
        }
    }

    /// Marshal the body of the OpenFlow message `msg`.
    fn marshal_body(msg: &Message, bytes: &mut Vec<u8>) {
        match *msg {
            Message::Hello |
            Message::FeaturesReq |
            Message::GetConfigRequest |
            Message::BarrierRequest |
            Message::BarrierReply => (),
            Message::Error(ref err) => err.marshal(bytes),
            Message::EchoRequest(ref buf) |
            Message::EchoReply(ref buf) => bytes.extend_from_slice(buf),
            Message::Vendor(ref v) => {
                put_u32(bytes, v.vendor());
                v.marshal(bytes);
            }
            Message::FeaturesReply(ref feats) => feats.marshal(bytes),
            Message::GetConfigReply(ref cfg) |
            Message::SetConfig(ref cfg) => cfg.marshal(bytes),
            Message::PacketIn(ref packet_in) => packet_in.marshal(bytes),
            Message::FlowRemoved(ref fr) => fr.marshal(bytes),
            Message::PortStatus(ref sts) => sts.marshal(bytes),
            Message::PacketOut(ref po) => po.marshal(bytes),
            Message::FlowMod(ref flow_mod) => flow_mod.marshal(bytes),
            Message::PortMod(ref pm) => pm.marshal(bytes),
            Message::StatsRequest(ref req) => req.marshal(bytes),
            Message::StatsReply(ref resp) => resp.marshal(bytes),
            Message::QueueGetConfigRequest(ref req) => req.marshal(bytes),
            Message::QueueGetConfigReply(ref reply) => reply.marshal(bytes),
        }
    }

    /// The reply to an echo request, carrying the same payload.
    pub fn echo_reply(&self) -> Option<Message> {
        match *self {
            Message::EchoRequest(ref buf) => Some(Message::EchoReply(buf.clone())),
            _ => None,
        }
    }
}

impl OfpMessage for Message {
    fn size_of(msg: &Message) -> usize {
        OfpHeader::size() + Message::size_of_body(msg)
    }

    fn header_of(xid: u32, msg: &Message) -> Result<OfpHeader> {
        let code = Message::msg_code_of_message(msg);
        let sizeof_buf = Self::size_of(msg);
        if sizeof_buf > u16::MAX as usize {
            return Err(OfpError::MalformedLength {
                what: code.name(),
                length: sizeof_buf,
            });
        }
        Ok(OfpHeader::new(OFP_VERSION, code as u8, sizeof_buf as u16, xid))
    }

    fn marshal(xid: u32, msg: &Message) -> Result<Vec<u8>> {
        let hdr = Self::header_of(xid, msg)?;
        let mut bytes = Vec::with_capacity(hdr.length());
        OfpHeader::marshal(&mut bytes, hdr);
        Message::marshal_body(msg, &mut bytes);
        Ok(bytes)
    }

    fn parse(header: &OfpHeader, buf: &[u8]) -> Result<(u32, Message)> {
        let msg = match header.type_code()? {
            MsgCode::Hello => Message::Hello,
            MsgCode::Error => Message::Error(ErrorMsg::parse(buf)?),
            MsgCode::EchoReq => Message::EchoRequest(buf.to_vec()),
            MsgCode::EchoResp => Message::EchoReply(buf.to_vec()),
            MsgCode::Vendor => {
                let mut bytes = Reader::new(buf);
                let vendor = bytes.read_u32()?;
                Message::Vendor(dispatch_vendor(Family::Vendor, vendor, bytes.rest())?)
            }
            MsgCode::FeaturesReq => Message::FeaturesReq,
            MsgCode::FeaturesResp => Message::FeaturesReply(SwitchFeatures::parse(buf)?),
            MsgCode::GetConfigReq => Message::GetConfigRequest,
            MsgCode::GetConfigResp => Message::GetConfigReply(SwitchConfig::parse(buf)?),
            MsgCode::SetConfig => Message::SetConfig(SwitchConfig::parse(buf)?),
            MsgCode::PacketIn => Message::PacketIn(PacketIn::parse(buf)?),
            MsgCode::FlowRemoved => Message::FlowRemoved(FlowRemoved::parse(buf)?),
            MsgCode::PortStatus => Message::PortStatus(PortStatus::parse(buf)?),
            MsgCode::PacketOut => Message::PacketOut(PacketOut::parse(buf)?),
            MsgCode::FlowMod => Message::FlowMod(FlowMod::parse(buf)?),
            MsgCode::PortMod => Message::PortMod(PortMod::parse(buf)?),
            MsgCode::StatsReq => Message::StatsRequest(StatsReq::parse(buf)?),
            MsgCode::StatsResp => Message::StatsReply(StatsResp::parse(buf)?),
            MsgCode::BarrierReq => Message::BarrierRequest,
            MsgCode::BarrierResp => Message::BarrierReply,
            MsgCode::QueueGetConfigReq => {
                Message::QueueGetConfigRequest(QueueGetConfigRequest::parse(buf)?)
            }
            MsgCode::QueueGetConfigResp => {
                Message::QueueGetConfigReply(QueueGetConfigReply::parse(buf)?)
            }
        };
        Ok((header.xid(), msg))
    }
}

/// Return a `FlowMod` adding a flow parameterized by the given `priority`, `pattern`,
/// and `actions`.
pub fn add_flow(prio: u16, pattern: Match, actions: Vec<Action>) -> FlowMod {
    FlowMod {
        command: FlowModCmd::AddFlow,
        pattern: pattern,
        priority: prio,
        actions: actions,
        cookie: 0,
        idle_timeout: Timeout::Permanent,
        hard_timeout: Timeout::Permanent,
        notify_when_removed: false,
        out_port: None,
        apply_to_packet: None,
        check_overlap: false,
        emergency: false,
        skipped: SkippedElements::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echo_request_gets_matching_reply() {
        let req = Message::EchoRequest(vec![1, 2, 3]);
        assert_eq!(req.echo_reply(), Some(Message::EchoReply(vec![1, 2, 3])));
        assert_eq!(Message::Hello.echo_reply(), None);
    }

    #[test]
    fn header_carries_total_length() {
        let msg = Message::EchoRequest(vec![0; 5]);
        let bytes = Message::marshal(7, &msg).unwrap();
        assert_eq!(bytes.len(), 13);
        assert_eq!(&bytes[..8], &[0x01, 0x02, 0x00, 0x0d, 0, 0, 0, 7]);
        assert_eq!(Message::decode(&bytes).unwrap(), (7, msg));
    }

    #[test]
    fn oversized_message_cannot_be_encoded() {
        let msg = Message::EchoReply(vec![0; 0x10000]);
        assert_eq!(Message::marshal(1, &msg),
                   Err(OfpError::MalformedLength {
                       what: "echo reply",
                       length: 0x10008,
                   }));
    }

    #[test]
    fn length_must_match_the_buffer() {
        let mut bytes = Message::marshal(1, &Message::BarrierRequest).unwrap();
        bytes.push(0);
        assert_eq!(Message::decode(&bytes),
                   Err(OfpError::MalformedLength {
                       what: "barrier request",
                       length: 8,
                   }));
    }

    #[test]
    fn unregistered_vendor_message_is_unknown() {
        let bytes = [0x01, 0x04, 0x00, 0x0c, 0, 0, 0, 1, 0x00, 0xab, 0xcd, 0xef];
        assert_eq!(Message::decode(&bytes),
                   Err(OfpError::UnknownVariant {
                       family: Family::Vendor,
                       discriminant: 0x00ab_cdef,
                   }));
    }
}
