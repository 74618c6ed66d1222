//! OpenFlow 1.0 wire records.
//!
//! Every top-level message body implements `MessageType` and is decoded from
//! exactly the bytes that follow its header. Nested families live in their
//! own modules: actions, queue descriptors, and statistics. `message` ties
//! them together into the `Message` sum type.

use crate::bits::{bit, get_field, set_field, test_bit};
use crate::codec::{element_count, put_u16, put_u32, put_u64, put_u8, write_padding_bytes,
                   write_fixed_size_string, MacAddr, Reader};
use crate::error::{OfpError, Result};
use crate::list::{marshal_list, parse_list, size_of_list, SkippedElements};
use crate::registry::Family;

pub use crate::ofp_match::Match;

pub mod action;
pub mod message;
pub mod queue;
pub mod stats;

use self::action::Action;

pub const OFP_VERSION: u8 = 0x01;
/// Largest transaction id handed out by `ofp_header::next_xid`.
pub const OFP_MAX_XID: u32 = 0x7fff_ffff;
/// `dl_vlan` value of a frame without an 802.1Q tag.
pub const OFP_VLAN_NONE: u16 = 0xffff;
/// Type-or-length values at or above this are ethertypes.
pub const OFP_DL_TYPE_ETH2_CUTOFF: u16 = 0x0600;
/// `dl_type` of an 802.2 frame that does not carry an ethertype.
pub const OFP_DL_TYPE_NOT_ETH_TYPE: u16 = 0x05ff;
pub const OFP_DEFAULT_MISS_SEND_LEN: u16 = 128;
pub const OFP_DEFAULT_PRIORITY: u16 = 0x8000;
/// `buffer_id` meaning the packet is not buffered on the switch.
pub const OFP_NO_BUFFER: u32 = 0xffff_ffff;
/// Queue id selecting every queue of a port.
pub const OFPQ_ALL: u32 = 0xffff_ffff;
pub const OFP_MAX_PORT_NAME_LEN: usize = 16;
pub const OFP_MAX_TABLE_NAME_LEN: usize = 32;
pub const DESC_STR_LEN: usize = 256;
pub const SERIAL_NUM_LEN: usize = 32;

/// OpenFlow 1.0 message type codes, used by headers to identify meaning of the rest of a message.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MsgCode {
    Hello,
    Error,
    EchoReq,
    EchoResp,
    Vendor,
    FeaturesReq,
    FeaturesResp,
    GetConfigReq,
    GetConfigResp,
    SetConfig,
    PacketIn,
    FlowRemoved,
    PortStatus,
    PacketOut,
    FlowMod,
    PortMod,
    StatsReq,
    StatsResp,
    BarrierReq,
    BarrierResp,
    QueueGetConfigReq,
    QueueGetConfigResp,
}

impl MsgCode {
    pub fn of_int(typ: u8) -> Result<MsgCode> {
        let code = match typ {
            0 => MsgCode::Hello,
            1 => MsgCode::Error,
            2 => MsgCode::EchoReq,
            3 => MsgCode::EchoResp,
            4 => MsgCode::Vendor,
            5 => MsgCode::FeaturesReq,
            6 => MsgCode::FeaturesResp,
            7 => MsgCode::GetConfigReq,
            8 => MsgCode::GetConfigResp,
            9 => MsgCode::SetConfig,
            10 => MsgCode::PacketIn,
            11 => MsgCode::FlowRemoved,
            12 => MsgCode::PortStatus,
            13 => MsgCode::PacketOut,
            14 => MsgCode::FlowMod,
            15 => MsgCode::PortMod,
            16 => MsgCode::StatsReq,
            17 => MsgCode::StatsResp,
            18 => MsgCode::BarrierReq,
            19 => MsgCode::BarrierResp,
            20 => MsgCode::QueueGetConfigReq,
            21 => MsgCode::QueueGetConfigResp,
            t => {
                return Err(OfpError::UnknownVariant {
                    family: Family::Message,
                    discriminant: t as u32,
                })
            }
        };
        Ok(code)
    }

    /// Size of the fixed part of a message of this type, header included.
    pub fn min_bytes(self) -> usize {
        match self {
            MsgCode::Hello | MsgCode::EchoReq | MsgCode::EchoResp | MsgCode::FeaturesReq |
            MsgCode::GetConfigReq | MsgCode::BarrierReq | MsgCode::BarrierResp => 8,
            MsgCode::Error | MsgCode::Vendor | MsgCode::GetConfigResp | MsgCode::SetConfig |
            MsgCode::StatsReq | MsgCode::StatsResp | MsgCode::QueueGetConfigReq => 12,
            MsgCode::PacketOut | MsgCode::QueueGetConfigResp => 16,
            MsgCode::PacketIn => 18,
            MsgCode::FeaturesResp | MsgCode::PortMod => 32,
            MsgCode::PortStatus => 64,
            MsgCode::FlowMod => 72,
            MsgCode::FlowRemoved => 88,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            MsgCode::Hello => "hello",
            MsgCode::Error => "error",
            MsgCode::EchoReq => "echo request",
            MsgCode::EchoResp => "echo reply",
            MsgCode::Vendor => "vendor",
            MsgCode::FeaturesReq => "features request",
            MsgCode::FeaturesResp => "features reply",
            MsgCode::GetConfigReq => "get config request",
            MsgCode::GetConfigResp => "get config reply",
            MsgCode::SetConfig => "set config",
            MsgCode::PacketIn => "packet in",
            MsgCode::FlowRemoved => "flow removed",
            MsgCode::PortStatus => "port status",
            MsgCode::PacketOut => "packet out",
            MsgCode::FlowMod => "flow mod",
            MsgCode::PortMod => "port mod",
            MsgCode::StatsReq => "stats request",
            MsgCode::StatsResp => "stats reply",
            MsgCode::BarrierReq => "barrier request",
            MsgCode::BarrierResp => "barrier reply",
            MsgCode::QueueGetConfigReq => "queue get config request",
            MsgCode::QueueGetConfigResp => "queue get config reply",
        }
    }
}

/// Common API for message types implementing OpenFlow Message Codes (see `MsgCode` enum).
///
/// `parse` receives exactly the bytes after the header, as sized by the
/// header's `length`. `size_of` and `marshal` cover the same span.
pub trait MessageType: Sized {
    /// Return the byte-size of a message body.
    fn size_of(&self) -> usize;
    /// Parse a buffer into a message.
    fn parse(buf: &[u8]) -> Result<Self>;
    /// Marshal a message into a `u8` buffer.
    fn marshal(&self, bytes: &mut Vec<u8>);
}

/// Port behavior.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PseudoPort {
    PhysicalPort(u16),
    InPort,
    Table,
    Normal,
    Flood,
    AllPorts,
    Controller,
    Local,
}

#[repr(u16)]
enum OfpPort {
    OFPPInPort = 0xfff8,
    OFPPTable = 0xfff9,
    OFPPNormal = 0xfffa,
    OFPPFlood = 0xfffb,
    OFPPAll = 0xfffc,
    OFPPController = 0xfffd,
    OFPPLocal = 0xfffe,
    OFPPNone = 0xffff,
}

/// Highest number a physical port may have.
pub const OFPP_MAX: u16 = 0xff00;
/// Port number meaning "no port".
pub const OFPP_NONE: u16 = OfpPort::OFPPNone as u16;

impl PseudoPort {
    /// `None` for `OFPP_NONE`, the port otherwise.
    pub fn of_int(p: u16) -> Option<PseudoPort> {
        if OFPP_NONE == p {
            None
        } else {
            Some(PseudoPort::make(p))
        }
    }

    /// Numbers between `OFPP_MAX` and the reserved ports are kept as physical
    /// ports so they survive a decode/encode cycle.
    pub fn make(p: u16) -> PseudoPort {
        match p {
            p if p == (OfpPort::OFPPInPort as u16) => PseudoPort::InPort,
            p if p == (OfpPort::OFPPTable as u16) => PseudoPort::Table,
            p if p == (OfpPort::OFPPNormal as u16) => PseudoPort::Normal,
            p if p == (OfpPort::OFPPFlood as u16) => PseudoPort::Flood,
            p if p == (OfpPort::OFPPAll as u16) => PseudoPort::AllPorts,
            p if p == (OfpPort::OFPPController as u16) => PseudoPort::Controller,
            p if p == (OfpPort::OFPPLocal as u16) => PseudoPort::Local,
            p => PseudoPort::PhysicalPort(p),
        }
    }

    pub fn to_int(&self) -> u16 {
        match *self {
            PseudoPort::PhysicalPort(p) => p,
            PseudoPort::InPort => OfpPort::OFPPInPort as u16,
            PseudoPort::Table => OfpPort::OFPPTable as u16,
            PseudoPort::Normal => OfpPort::OFPPNormal as u16,
            PseudoPort::Flood => OfpPort::OFPPFlood as u16,
            PseudoPort::AllPorts => OfpPort::OFPPAll as u16,
            PseudoPort::Controller => OfpPort::OFPPController as u16,
            PseudoPort::Local => OfpPort::OFPPLocal as u16,
        }
    }

    pub fn marshal(&self, bytes: &mut Vec<u8>) {
        put_u16(bytes, self.to_int())
    }

    fn marshal_opt(pp: Option<PseudoPort>, bytes: &mut Vec<u8>) {
        match pp {
            None => put_u16(bytes, OFPP_NONE),
            Some(p) => p.marshal(bytes),
        }
    }
}

/// How long before a flow entry expires.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Timeout {
    Permanent,
    ExpiresAfter(u16),
}

impl Timeout {
    pub fn of_int(tm: u16) -> Timeout {
        match tm {
            0 => Timeout::Permanent,
            d => Timeout::ExpiresAfter(d),
        }
    }

    pub fn to_int(&self) -> u16 {
        match *self {
            Timeout::Permanent => 0,
            Timeout::ExpiresAfter(d) => d,
        }
    }
}

/// Capabilities supported by the datapath.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub flow_stats: bool,
    pub table_stats: bool,
    pub port_stats: bool,
    pub stp: bool,
    pub ip_reasm: bool,
    pub queue_stats: bool,
    pub arp_match_ip: bool,
}

impl Capabilities {
    pub fn of_int(d: u32) -> Capabilities {
        Capabilities {
            flow_stats: test_bit(0, d),
            table_stats: test_bit(1, d),
            port_stats: test_bit(2, d),
            stp: test_bit(3, d),
            ip_reasm: test_bit(5, d),
            queue_stats: test_bit(6, d),
            arp_match_ip: test_bit(7, d),
        }
    }

    pub fn to_int(&self) -> u32 {
        let mut d = 0;
        d = bit(0, d, self.flow_stats);
        d = bit(1, d, self.table_stats);
        d = bit(2, d, self.port_stats);
        d = bit(3, d, self.stp);
        d = bit(5, d, self.ip_reasm);
        d = bit(6, d, self.queue_stats);
        bit(7, d, self.arp_match_ip)
    }
}

/// Actions supported by the datapath, one bit per action type.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SupportedActions {
    pub output: bool,
    pub set_vlan_id: bool,
    pub set_vlan_pcp: bool,
    pub strip_vlan: bool,
    pub set_dl_src: bool,
    pub set_dl_dst: bool,
    pub set_nw_src: bool,
    pub set_nw_dst: bool,
    pub set_nw_tos: bool,
    pub set_tp_src: bool,
    pub set_tp_dst: bool,
    pub enqueue: bool,
}

impl SupportedActions {
    pub fn of_int(d: u32) -> SupportedActions {
        SupportedActions {
            output: test_bit(0, d),
            set_vlan_id: test_bit(1, d),
            set_vlan_pcp: test_bit(2, d),
            strip_vlan: test_bit(3, d),
            set_dl_src: test_bit(4, d),
            set_dl_dst: test_bit(5, d),
            set_nw_src: test_bit(6, d),
            set_nw_dst: test_bit(7, d),
            set_nw_tos: test_bit(8, d),
            set_tp_src: test_bit(9, d),
            set_tp_dst: test_bit(10, d),
            enqueue: test_bit(11, d),
        }
    }

    pub fn to_int(&self) -> u32 {
        let flags = [self.output,
                     self.set_vlan_id,
                     self.set_vlan_pcp,
                     self.strip_vlan,
                     self.set_dl_src,
                     self.set_dl_dst,
                     self.set_nw_src,
                     self.set_nw_dst,
                     self.set_nw_tos,
                     self.set_tp_src,
                     self.set_tp_dst,
                     self.enqueue];
        flags.iter().enumerate().fold(0, |d, (i, &on)| bit(i as u32, d, on))
    }
}

/// Switch features.
#[derive(Clone, Debug, PartialEq)]
pub struct SwitchFeatures {
    pub datapath_id: u64,
    pub num_buffers: u32,
    pub num_tables: u8,
    pub supported_capabilities: Capabilities,
    pub supported_actions: SupportedActions,
    pub ports: Vec<PortDesc>,
}

impl MessageType for SwitchFeatures {
    fn size_of(&self) -> usize {
        24 + self.ports.len() * PortDesc::size_of()
    }

    fn parse(buf: &[u8]) -> Result<SwitchFeatures> {
        let mut bytes = Reader::new(buf);
        let datapath_id = bytes.read_u64()?;
        let num_buffers = bytes.read_u32()?;
        let num_tables = bytes.read_u8()?;
        bytes.skip(3)?;
        let supported_capabilities = Capabilities::of_int(bytes.read_u32()?);
        let supported_actions = SupportedActions::of_int(bytes.read_u32()?);
        let num_ports = element_count("features reply ports", bytes.remaining(), PortDesc::size_of())?;
        let ports = bytes.read_counted(num_ports, PortDesc::parse)?;
        Ok(SwitchFeatures {
            datapath_id: datapath_id,
            num_buffers: num_buffers,
            num_tables: num_tables,
            supported_capabilities: supported_capabilities,
            supported_actions: supported_actions,
            ports: ports,
        })
    }

    fn marshal(&self, bytes: &mut Vec<u8>) {
        put_u64(bytes, self.datapath_id);
        put_u32(bytes, self.num_buffers);
        put_u8(bytes, self.num_tables);
        write_padding_bytes(bytes, 3);
        put_u32(bytes, self.supported_capabilities.to_int());
        put_u32(bytes, self.supported_actions.to_int());
        for port in &self.ports {
            port.marshal(bytes)
        }
    }
}

/// IP fragment handling policy of a switch.
#[repr(u16)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FragHandling {
    Normal,
    Drop,
    Reasm,
}

/// Switch configuration, as read by GET_CONFIG and written by SET_CONFIG.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SwitchConfig {
    pub frag: FragHandling,
    /// Bytes of each table-miss packet sent to the controller.
    pub miss_send_len: u16,
}

impl Default for SwitchConfig {
    fn default() -> SwitchConfig {
        SwitchConfig {
            frag: FragHandling::Normal,
            miss_send_len: OFP_DEFAULT_MISS_SEND_LEN,
        }
    }
}

impl MessageType for SwitchConfig {
    fn size_of(&self) -> usize {
        4
    }

    fn parse(buf: &[u8]) -> Result<SwitchConfig> {
        let mut bytes = Reader::new(buf);
        let flags = bytes.read_u16()?;
        let frag = match get_field(flags as u32, 0, 2) {
            0 => FragHandling::Normal,
            1 => FragHandling::Drop,
            2 => FragHandling::Reasm,
            v => {
                return Err(OfpError::UnexpectedValue {
                    field: "switch config flags",
                    value: v,
                })
            }
        };
        Ok(SwitchConfig {
            frag: frag,
            miss_send_len: bytes.read_u16()?,
        })
    }

    fn marshal(&self, bytes: &mut Vec<u8>) {
        put_u16(bytes, self.frag as u16);
        put_u16(bytes, self.miss_send_len);
    }
}

/// Type of modification to perform on a flow table.
#[repr(u16)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FlowModCmd {
    AddFlow,
    ModFlow,
    ModStrictFlow,
    DeleteFlow,
    DeleteStrictFlow,
}

impl FlowModCmd {
    pub fn of_int(cmd: u16) -> Result<FlowModCmd> {
        match cmd {
            0 => Ok(FlowModCmd::AddFlow),
            1 => Ok(FlowModCmd::ModFlow),
            2 => Ok(FlowModCmd::ModStrictFlow),
            3 => Ok(FlowModCmd::DeleteFlow),
            4 => Ok(FlowModCmd::DeleteStrictFlow),
            v => {
                Err(OfpError::UnexpectedValue {
                    field: "flow mod command",
                    value: v as u32,
                })
            }
        }
    }
}

/// Represents modifications to a flow table from the controller.
#[derive(Clone, Debug, PartialEq)]
pub struct FlowMod {
    pub command: FlowModCmd,
    pub pattern: Match,
    pub priority: u16,
    pub actions: Vec<Action>,
    pub cookie: u64,
    pub idle_timeout: Timeout,
    pub hard_timeout: Timeout,
    pub notify_when_removed: bool,
    pub apply_to_packet: Option<u32>,
    pub out_port: Option<PseudoPort>,
    pub check_overlap: bool,
    /// Install into the emergency flow cache.
    pub emergency: bool,
    /// Actions dropped while decoding because their type was not known.
    pub skipped: SkippedElements,
}

impl FlowMod {
    fn flags_to_int(&self) -> u16 {
        let mut d = 0;
        d = bit(0, d, self.notify_when_removed);
        d = bit(1, d, self.check_overlap);
        bit(2, d, self.emergency) as u16
    }
}

fn buffer_id_of_int(id: u32) -> Option<u32> {
    if id == OFP_NO_BUFFER { None } else { Some(id) }
}

impl MessageType for FlowMod {
    fn size_of(&self) -> usize {
        Match::size_of() + 24 + size_of_list(&self.actions)
    }

    fn parse(buf: &[u8]) -> Result<FlowMod> {
        let mut bytes = Reader::new(buf);
        let pattern = Match::parse(&mut bytes)?;
        let cookie = bytes.read_u64()?;
        let command = FlowModCmd::of_int(bytes.read_u16()?)?;
        let idle = Timeout::of_int(bytes.read_u16()?);
        let hard = Timeout::of_int(bytes.read_u16()?);
        let prio = bytes.read_u16()?;
        let buffer_id = bytes.read_u32()?;
        let out_port = PseudoPort::of_int(bytes.read_u16()?);
        let flags = bytes.read_u16()? as u32;
        let (actions, skipped) = parse_list::<Action>(bytes.rest())?.into_parts();
        Ok(FlowMod {
            command: command,
            pattern: pattern,
            priority: prio,
            actions: actions,
            cookie: cookie,
            idle_timeout: idle,
            hard_timeout: hard,
            notify_when_removed: test_bit(0, flags),
            apply_to_packet: buffer_id_of_int(buffer_id),
            out_port: out_port,
            check_overlap: test_bit(1, flags),
            emergency: test_bit(2, flags),
            skipped: skipped,
        })
    }

    fn marshal(&self, bytes: &mut Vec<u8>) {
        self.pattern.marshal(bytes);
        put_u64(bytes, self.cookie);
        put_u16(bytes, self.command as u16);
        put_u16(bytes, self.idle_timeout.to_int());
        put_u16(bytes, self.hard_timeout.to_int());
        put_u16(bytes, self.priority);
        put_u32(bytes, self.apply_to_packet.unwrap_or(OFP_NO_BUFFER));
        PseudoPort::marshal_opt(self.out_port, bytes);
        put_u16(bytes, self.flags_to_int());
        marshal_list(&self.actions, bytes);
    }
}

/// The data associated with a packet received by the controller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Payload {
    Buffered(u32, Vec<u8>),
    NotBuffered(Vec<u8>),
}

impl Payload {
    pub fn size_of(&self) -> usize {
        self.data().len()
    }

    pub fn data(&self) -> &[u8] {
        match *self {
            Payload::Buffered(_, ref buf) |
            Payload::NotBuffered(ref buf) => buf,
        }
    }

    fn buffer_id(&self) -> u32 {
        match *self {
            Payload::Buffered(id, _) => id,
            Payload::NotBuffered(_) => OFP_NO_BUFFER,
        }
    }

    fn of_buffer_id(id: u32, data: &[u8]) -> Payload {
        match buffer_id_of_int(id) {
            Some(n) => Payload::Buffered(n, data.to_vec()),
            None => Payload::NotBuffered(data.to_vec()),
        }
    }
}

/// The reason a packet arrives at the controller.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PacketInReason {
    NoMatch,
    ExplicitSend,
}

/// Represents packets received by the datapath and sent to the controller.
#[derive(Clone, Debug, PartialEq)]
pub struct PacketIn {
    pub input_payload: Payload,
    pub total_len: u16,
    pub port: u16,
    pub reason: PacketInReason,
}

impl PacketIn {
    /// Match key for the carried frame, as seen on the ingress port.
    pub fn to_match(&self) -> Match {
        Match::from_packet(self.port, self.input_payload.data())
    }
}

impl MessageType for PacketIn {
    fn size_of(&self) -> usize {
        10 + self.input_payload.size_of()
    }

    fn parse(buf: &[u8]) -> Result<PacketIn> {
        let mut bytes = Reader::new(buf);
        let buf_id = bytes.read_u32()?;
        let total_len = bytes.read_u16()?;
        let port = bytes.read_u16()?;
        let reason = match bytes.read_u8()? {
            0 => PacketInReason::NoMatch,
            1 => PacketInReason::ExplicitSend,
            v => {
                return Err(OfpError::UnexpectedValue {
                    field: "packet in reason",
                    value: v as u32,
                })
            }
        };
        bytes.skip(1)?;
        Ok(PacketIn {
            input_payload: Payload::of_buffer_id(buf_id, bytes.rest()),
            total_len: total_len,
            port: port,
            reason: reason,
        })
    }

    fn marshal(&self, bytes: &mut Vec<u8>) {
        put_u32(bytes, self.input_payload.buffer_id());
        put_u16(bytes, self.total_len);
        put_u16(bytes, self.port);
        put_u8(bytes, self.reason as u8);
        write_padding_bytes(bytes, 1);
        bytes.extend_from_slice(self.input_payload.data());
    }
}

/// Why a flow was removed from a table.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FlowRemovedReason {
    IdleTimeout,
    HardTimeout,
    Delete,
}

/// Sent when a flow installed with `notify_when_removed` leaves the table.
#[derive(Clone, Debug, PartialEq)]
pub struct FlowRemoved {
    pub pattern: Match,
    pub cookie: u64,
    pub priority: u16,
    pub reason: FlowRemovedReason,
    pub duration_sec: u32,
    pub duration_nsec: u32,
    pub idle_timeout: Timeout,
    pub packet_count: u64,
    pub byte_count: u64,
}

impl MessageType for FlowRemoved {
    fn size_of(&self) -> usize {
        Match::size_of() + 40
    }

    fn parse(buf: &[u8]) -> Result<FlowRemoved> {
        let mut bytes = Reader::new(buf);
        let pattern = Match::parse(&mut bytes)?;
        let cookie = bytes.read_u64()?;
        let priority = bytes.read_u16()?;
        let reason = match bytes.read_u8()? {
            0 => FlowRemovedReason::IdleTimeout,
            1 => FlowRemovedReason::HardTimeout,
            2 => FlowRemovedReason::Delete,
            v => {
                return Err(OfpError::UnexpectedValue {
                    field: "flow removed reason",
                    value: v as u32,
                })
            }
        };
        bytes.skip(1)?;
        let duration_sec = bytes.read_u32()?;
        let duration_nsec = bytes.read_u32()?;
        let idle_timeout = Timeout::of_int(bytes.read_u16()?);
        bytes.skip(2)?;
        let packet_count = bytes.read_u64()?;
        let byte_count = bytes.read_u64()?;
        Ok(FlowRemoved {
            pattern: pattern,
            cookie: cookie,
            priority: priority,
            reason: reason,
            duration_sec: duration_sec,
            duration_nsec: duration_nsec,
            idle_timeout: idle_timeout,
            packet_count: packet_count,
            byte_count: byte_count,
        })
    }

    fn marshal(&self, bytes: &mut Vec<u8>) {
        self.pattern.marshal(bytes);
        put_u64(bytes, self.cookie);
        put_u16(bytes, self.priority);
        put_u8(bytes, self.reason as u8);
        write_padding_bytes(bytes, 1);
        put_u32(bytes, self.duration_sec);
        put_u32(bytes, self.duration_nsec);
        put_u16(bytes, self.idle_timeout.to_int());
        write_padding_bytes(bytes, 2);
        put_u64(bytes, self.packet_count);
        put_u64(bytes, self.byte_count);
    }
}

/// STP state of a port.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StpState {
    Listen,
    Learn,
    Forward,
    Block,
}

/// Current state of a physical port. Not configurable by the controller.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PortState {
    pub down: bool,
    pub stp_state: StpState,
}

impl PortState {
    pub fn of_int(d: u32) -> PortState {
        PortState {
            down: test_bit(0, d),
            stp_state: match get_field(d, 8, 2) {
                0 => StpState::Listen,
                1 => StpState::Learn,
                2 => StpState::Forward,
                _ => StpState::Block,
            },
        }
    }

    pub fn to_int(&self) -> u32 {
        set_field(bit(0, 0, self.down), 8, 2, self.stp_state as u32)
    }
}

/// Features of physical ports available in a datapath.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PortFeatures {
    pub f_10mbhd: bool,
    pub f_10mbfd: bool,
    pub f_100mbhd: bool,
    pub f_100mbfd: bool,
    pub f_1gbhd: bool,
    pub f_1gbfd: bool,
    pub f_10gbfd: bool,
    pub copper: bool,
    pub fiber: bool,
    pub autoneg: bool,
    pub pause: bool,
    pub pause_asym: bool,
}

impl PortFeatures {
    pub fn of_int(d: u32) -> PortFeatures {
        PortFeatures {
            f_10mbhd: test_bit(0, d),
            f_10mbfd: test_bit(1, d),
            f_100mbhd: test_bit(2, d),
            f_100mbfd: test_bit(3, d),
            f_1gbhd: test_bit(4, d),
            f_1gbfd: test_bit(5, d),
            f_10gbfd: test_bit(6, d),
            copper: test_bit(7, d),
            fiber: test_bit(8, d),
            autoneg: test_bit(9, d),
            pause: test_bit(10, d),
            pause_asym: test_bit(11, d),
        }
    }

    pub fn to_int(&self) -> u32 {
        let flags = [self.f_10mbhd,
                     self.f_10mbfd,
                     self.f_100mbhd,
                     self.f_100mbfd,
                     self.f_1gbhd,
                     self.f_1gbfd,
                     self.f_10gbfd,
                     self.copper,
                     self.fiber,
                     self.autoneg,
                     self.pause,
                     self.pause_asym];
        flags.iter().enumerate().fold(0, |d, (i, &on)| bit(i as u32, d, on))
    }
}

/// Flags to indicate behavior of the physical port.
///
/// These flags are used both to describe the current configuration of a physical port,
/// and to configure a port's behavior.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PortConfig {
    pub down: bool,
    pub no_stp: bool,
    pub no_recv: bool,
    pub no_recv_stp: bool,
    pub no_flood: bool,
    pub no_fwd: bool,
    pub no_packet_in: bool,
}

impl PortConfig {
    pub fn of_int(d: u32) -> PortConfig {
        PortConfig {
            down: test_bit(0, d),
            no_stp: test_bit(1, d),
            no_recv: test_bit(2, d),
            no_recv_stp: test_bit(3, d),
            no_flood: test_bit(4, d),
            no_fwd: test_bit(5, d),
            no_packet_in: test_bit(6, d),
        }
    }

    pub fn to_int(&self) -> u32 {
        let flags = [self.down,
                     self.no_stp,
                     self.no_recv,
                     self.no_recv_stp,
                     self.no_flood,
                     self.no_fwd,
                     self.no_packet_in];
        flags.iter().enumerate().fold(0, |d, (i, &on)| bit(i as u32, d, on))
    }
}

/// Description of a physical port.
#[derive(Clone, Debug, PartialEq)]
pub struct PortDesc {
    pub port_no: u16,
    pub hw_addr: MacAddr,
    pub name: String,
    pub config: PortConfig,
    pub state: PortState,
    pub curr: PortFeatures,
    pub advertised: PortFeatures,
    pub supported: PortFeatures,
    pub peer: PortFeatures,
}

impl PortDesc {
    pub fn size_of() -> usize {
        48
    }

    /// Current link speed in Mb/s, or 0 when the port reports none.
    pub fn speed(&self) -> u32 {
        if self.curr.f_10gbfd {
            10000
        } else if self.curr.f_1gbhd || self.curr.f_1gbfd {
            1000
        } else if self.curr.f_100mbhd || self.curr.f_100mbfd {
            100
        } else if self.curr.f_10mbhd || self.curr.f_10mbfd {
            10
        } else {
            0
        }
    }

    pub fn parse(bytes: &mut Reader) -> Result<PortDesc> {
        let port_no = bytes.read_u16()?;
        let hw_addr = bytes.read_mac()?;
        let name = bytes.read_fixed_size_string(OFP_MAX_PORT_NAME_LEN)?;
        let config = PortConfig::of_int(bytes.read_u32()?);
        let state = PortState::of_int(bytes.read_u32()?);
        let curr = PortFeatures::of_int(bytes.read_u32()?);
        let advertised = PortFeatures::of_int(bytes.read_u32()?);
        let supported = PortFeatures::of_int(bytes.read_u32()?);
        let peer = PortFeatures::of_int(bytes.read_u32()?);
        Ok(PortDesc {
            port_no: port_no,
            hw_addr: hw_addr,
            name: name,
            config: config,
            state: state,
            curr: curr,
            advertised: advertised,
            supported: supported,
            peer: peer,
        })
    }

    pub fn marshal(&self, bytes: &mut Vec<u8>) {
        put_u16(bytes, self.port_no);
        bytes.extend_from_slice(&self.hw_addr);
        write_fixed_size_string(bytes, &self.name, OFP_MAX_PORT_NAME_LEN);
        put_u32(bytes, self.config.to_int());
        put_u32(bytes, self.state.to_int());
        put_u32(bytes, self.curr.to_int());
        put_u32(bytes, self.advertised.to_int());
        put_u32(bytes, self.supported.to_int());
        put_u32(bytes, self.peer.to_int());
    }
}

/// What changed about a physical port.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PortReason {
    PortAdd,
    PortDelete,
    PortModify,
}

/// A physical port has changed in the datapath.
#[derive(Clone, Debug, PartialEq)]
pub struct PortStatus {
    pub reason: PortReason,
    pub desc: PortDesc,
}

impl MessageType for PortStatus {
    fn size_of(&self) -> usize {
        8 + PortDesc::size_of()
    }

    fn parse(buf: &[u8]) -> Result<PortStatus> {
        let mut bytes = Reader::new(buf);
        let reason = match bytes.read_u8()? {
            0 => PortReason::PortAdd,
            1 => PortReason::PortDelete,
            2 => PortReason::PortModify,
            v => {
                return Err(OfpError::UnexpectedValue {
                    field: "port status reason",
                    value: v as u32,
                })
            }
        };
        bytes.skip(7)?;
        let desc = PortDesc::parse(&mut bytes)?;
        Ok(PortStatus {
            reason: reason,
            desc: desc,
        })
    }

    fn marshal(&self, bytes: &mut Vec<u8>) {
        put_u8(bytes, self.reason as u8);
        write_padding_bytes(bytes, 7);
        self.desc.marshal(bytes);
    }
}

/// Send packet (controller -> datapath).
#[derive(Clone, Debug, PartialEq)]
pub struct PacketOut {
    pub output_payload: Payload,
    /// Ingress port the packet is treated as arriving on, `None` for `OFPP_NONE`.
    pub port_id: Option<PseudoPort>,
    pub apply_actions: Vec<Action>,
    pub skipped: SkippedElements,
}

impl MessageType for PacketOut {
    fn size_of(&self) -> usize {
        8 + size_of_list(&self.apply_actions) + self.output_payload.size_of()
    }

    fn parse(buf: &[u8]) -> Result<PacketOut> {
        let mut bytes = Reader::new(buf);
        let buf_id = bytes.read_u32()?;
        let in_port = PseudoPort::of_int(bytes.read_u16()?);
        let actions_len = bytes.read_u16()? as usize;
        if actions_len > bytes.remaining() {
            return Err(OfpError::MalformedLength {
                what: "packet out actions",
                length: actions_len,
            });
        }
        let (actions, skipped) = parse_list::<Action>(bytes.take(actions_len)?)?.into_parts();
        Ok(PacketOut {
            output_payload: Payload::of_buffer_id(buf_id, bytes.rest()),
            port_id: in_port,
            apply_actions: actions,
            skipped: skipped,
        })
    }

    fn marshal(&self, bytes: &mut Vec<u8>) {
        put_u32(bytes, self.output_payload.buffer_id());
        PseudoPort::marshal_opt(self.port_id, bytes);
        put_u16(bytes, size_of_list(&self.apply_actions) as u16);
        marshal_list(&self.apply_actions, bytes);
        bytes.extend_from_slice(self.output_payload.data());
    }
}

/// Modify the behavior of a physical port.
#[derive(Clone, Debug, PartialEq)]
pub struct PortMod {
    pub port_no: u16,
    /// Must match the port's current address.
    pub hw_addr: MacAddr,
    pub config: PortConfig,
    /// Which `config` flags to change.
    pub mask: PortConfig,
    /// Features to advertise, all zero to leave them unchanged.
    pub advertise: PortFeatures,
}

impl MessageType for PortMod {
    fn size_of(&self) -> usize {
        24
    }

    fn parse(buf: &[u8]) -> Result<PortMod> {
        let mut bytes = Reader::new(buf);
        let port_no = bytes.read_u16()?;
        let hw_addr = bytes.read_mac()?;
        let config = PortConfig::of_int(bytes.read_u32()?);
        let mask = PortConfig::of_int(bytes.read_u32()?);
        let advertise = PortFeatures::of_int(bytes.read_u32()?);
        bytes.skip(4)?;
        Ok(PortMod {
            port_no: port_no,
            hw_addr: hw_addr,
            config: config,
            mask: mask,
            advertise: advertise,
        })
    }

    fn marshal(&self, bytes: &mut Vec<u8>) {
        put_u16(bytes, self.port_no);
        bytes.extend_from_slice(&self.hw_addr);
        put_u32(bytes, self.config.to_int());
        put_u32(bytes, self.mask.to_int());
        put_u32(bytes, self.advertise.to_int());
        write_padding_bytes(bytes, 4);
    }
}

/// Error reported by the datapath.
///
/// `data` usually holds at least the first 64 bytes of the offending request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorMsg {
    pub typ: u16,
    pub code: u16,
    pub data: Vec<u8>,
}

impl MessageType for ErrorMsg {
    fn size_of(&self) -> usize {
        4 + self.data.len()
    }

    fn parse(buf: &[u8]) -> Result<ErrorMsg> {
        let mut bytes = Reader::new(buf);
        Ok(ErrorMsg {
            typ: bytes.read_u16()?,
            code: bytes.read_u16()?,
            data: bytes.rest().to_vec(),
        })
    }

    fn marshal(&self, bytes: &mut Vec<u8>) {
        put_u16(bytes, self.typ);
        put_u16(bytes, self.code);
        bytes.extend_from_slice(&self.data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn port(no: u16) -> PortDesc {
        PortDesc {
            port_no: no,
            hw_addr: [0x00, 0x16, 0x3e, 0x00, 0x00, no as u8],
            name: format!("eth{}", no),
            config: PortConfig { no_flood: true, ..PortConfig::default() },
            state: PortState {
                down: false,
                stp_state: StpState::Forward,
            },
            curr: PortFeatures {
                f_1gbfd: true,
                copper: true,
                ..PortFeatures::default()
            },
            advertised: PortFeatures::default(),
            supported: PortFeatures::of_int(0xfff),
            peer: PortFeatures::default(),
        }
    }

    fn round_trip<T: MessageType + PartialEq + std::fmt::Debug>(msg: &T) -> T {
        let mut bytes = vec![];
        msg.marshal(&mut bytes);
        assert_eq!(bytes.len(), msg.size_of());
        T::parse(&bytes).unwrap()
    }

    #[test]
    fn message_codes_cover_zero_to_twenty_one() {
        for t in 0..22u8 {
            assert_eq!(MsgCode::of_int(t).map(|c| c as u8), Ok(t));
        }
        assert!(MsgCode::of_int(22).is_err());
    }

    #[test]
    fn pseudo_ports() {
        assert_eq!(PseudoPort::of_int(0xffff), None);
        assert_eq!(PseudoPort::of_int(0xfffd), Some(PseudoPort::Controller));
        assert_eq!(PseudoPort::make(3), PseudoPort::PhysicalPort(3));
        // Reserved but unnamed numbers are kept verbatim.
        assert_eq!(PseudoPort::make(0xff10).to_int(), 0xff10);
        assert_eq!(PseudoPort::Flood.to_int(), 0xfffb);
    }

    #[test]
    fn flag_words_round_trip() {
        assert_eq!(Capabilities::of_int(0xef).to_int(), 0xef);
        assert_eq!(SupportedActions::of_int(0xfff).to_int(), 0xfff);
        assert_eq!(PortConfig::of_int(0x7f).to_int(), 0x7f);
        assert_eq!(PortFeatures::of_int(0x0a5).to_int(), 0x0a5);
        assert_eq!(PortState::of_int(0x301).stp_state, StpState::Block);
        assert_eq!(PortState::of_int(0x201).to_int(), 0x201);
    }

    #[test]
    fn port_speed_from_current_features() {
        assert_eq!(port(1).speed(), 1000);
        let mut p = port(2);
        p.curr = PortFeatures::of_int(1 << 6);
        assert_eq!(p.speed(), 10000);
        p.curr = PortFeatures::default();
        assert_eq!(p.speed(), 0);
    }

    #[test]
    fn switch_features_with_ports() {
        let sf = SwitchFeatures {
            datapath_id: 0x0000_0016_3e00_0001,
            num_buffers: 256,
            num_tables: 2,
            supported_capabilities: Capabilities::of_int(0xc7),
            supported_actions: SupportedActions::of_int(0x7ff),
            ports: vec![port(1), port(2)],
        };
        assert_eq!(sf.size_of(), 24 + 96);
        assert_eq!(round_trip(&sf), sf);
    }

    #[test]
    fn switch_features_with_partial_port_is_malformed() {
        let mut bytes = vec![];
        SwitchFeatures {
                datapath_id: 1,
                num_buffers: 0,
                num_tables: 1,
                supported_capabilities: Capabilities::default(),
                supported_actions: SupportedActions::default(),
                ports: vec![port(1)],
            }
            .marshal(&mut bytes);
        bytes.truncate(bytes.len() - 1);
        assert!(matches!(SwitchFeatures::parse(&bytes),
                         Err(OfpError::MalformedLength { .. })));
    }

    #[test]
    fn switch_config_rejects_unknown_frag_mode() {
        assert_eq!(round_trip(&SwitchConfig::default()), SwitchConfig::default());
        assert!(matches!(SwitchConfig::parse(&[0, 3, 0, 128]),
                         Err(OfpError::UnexpectedValue { value: 3, .. })));
    }

    #[test]
    fn flow_mod_with_actions() {
        let fm = message::add_flow(OFP_DEFAULT_PRIORITY,
                                   Match::match_all(),
                                   vec![Action::Output {
                                            port: PseudoPort::PhysicalPort(2),
                                            max_len: 0,
                                        },
                                        Action::SetNwTos(0x20)]);
        let back = round_trip(&fm);
        assert_eq!(back, fm);
        assert_eq!(back.pattern.wildcards, Match::match_all().wildcards);
    }

    #[test]
    fn flow_mod_flags_and_buffer() {
        let fm = FlowMod {
            notify_when_removed: true,
            check_overlap: true,
            emergency: true,
            apply_to_packet: Some(77),
            out_port: Some(PseudoPort::Local),
            idle_timeout: Timeout::ExpiresAfter(30),
            command: FlowModCmd::DeleteStrictFlow,
            ..message::add_flow(1, Match::default(), vec![])
        };
        let mut bytes = vec![];
        fm.marshal(&mut bytes);
        assert_eq!(&bytes[62..64], &[0, 7]);
        assert_eq!(FlowMod::parse(&bytes).unwrap(), fm);
    }

    #[test]
    fn flow_mod_unknown_command() {
        let mut bytes = vec![];
        message::add_flow(1, Match::default(), vec![]).marshal(&mut bytes);
        bytes[49] = 9;
        assert_eq!(FlowMod::parse(&bytes),
                   Err(OfpError::UnexpectedValue {
                       field: "flow mod command",
                       value: 9,
                   }));
    }

    #[test]
    fn packet_in_buffered_and_not() {
        let buffered = PacketIn {
            input_payload: Payload::Buffered(12, vec![1, 2, 3]),
            total_len: 60,
            port: 4,
            reason: PacketInReason::NoMatch,
        };
        assert_eq!(round_trip(&buffered), buffered);
        let raw = PacketIn {
            input_payload: Payload::NotBuffered(vec![]),
            total_len: 0,
            port: 1,
            reason: PacketInReason::ExplicitSend,
        };
        assert_eq!(round_trip(&raw), raw);
    }

    #[test]
    fn packet_out_actions_len_past_end_is_malformed() {
        let po = PacketOut {
            output_payload: Payload::NotBuffered(vec![0xaa; 14]),
            port_id: None,
            apply_actions: vec![Action::Output {
                                    port: PseudoPort::Flood,
                                    max_len: 0,
                                }],
            skipped: SkippedElements::default(),
        };
        assert_eq!(round_trip(&po), po);
        let mut bytes = vec![];
        po.marshal(&mut bytes);
        bytes[6] = 0x01;
        assert_eq!(PacketOut::parse(&bytes),
                   Err(OfpError::MalformedLength {
                       what: "packet out actions",
                       length: 0x108,
                   }));
    }

    #[test]
    fn fixed_size_bodies() {
        let fr = FlowRemoved {
            pattern: Match::default(),
            cookie: 9,
            priority: 100,
            reason: FlowRemovedReason::HardTimeout,
            duration_sec: 5,
            duration_nsec: 6,
            idle_timeout: Timeout::Permanent,
            packet_count: 7,
            byte_count: 8,
        };
        assert_eq!(fr.size_of() + 8, MsgCode::FlowRemoved.min_bytes());
        assert_eq!(round_trip(&fr), fr);

        let ps = PortStatus {
            reason: PortReason::PortModify,
            desc: port(3),
        };
        assert_eq!(ps.size_of() + 8, MsgCode::PortStatus.min_bytes());
        assert_eq!(round_trip(&ps), ps);

        let pm = PortMod {
            port_no: 3,
            hw_addr: [1, 2, 3, 4, 5, 6],
            config: PortConfig { down: true, ..PortConfig::default() },
            mask: PortConfig { down: true, ..PortConfig::default() },
            advertise: PortFeatures::default(),
        };
        assert_eq!(pm.size_of() + 8, MsgCode::PortMod.min_bytes());
        assert_eq!(round_trip(&pm), pm);
    }
}
