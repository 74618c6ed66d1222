//! Statistics requests and replies.
//!
//! The STATS_REQUEST and STATS_REPLY envelopes carry a stats type and flags,
//! and the body layout depends on the type. Bodies can be read two ways:
//! `StatsReq::parse` / `StatsResp::parse` read the type and flags themselves,
//! while `StatsReqBody::parse_body` / `StatsRespBody::parse_body` decode only
//! the body for a caller that has already read the type.

use crate::codec::{element_count, put_u16, put_u32, put_u64, put_u8, write_fixed_size_string,
                   write_padding_bytes, Reader};
use crate::error::{OfpError, Result};
use crate::list::{marshal_list, parse_list, size_of_list, ListElement, SkippedElements};
use crate::registry::{dispatch_vendor, Family, Vendor};

use super::action::Action;
use super::{Match, MessageType, PseudoPort, Timeout, DESC_STR_LEN, OFP_MAX_TABLE_NAME_LEN,
            SERIAL_NUM_LEN};

/// Set in reply flags when more replies to the same request follow.
pub const OFPSF_REPLY_MORE: u16 = 1 << 0;

/// Type of stats request.
#[repr(u16)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StatsReqType {
    Desc,
    Flow,
    Aggregate,
    Table,
    Port,
    Queue,
    Vendor = 0xffff,
}

impl StatsReqType {
    pub fn of_int(typ: u16, family: Family) -> Result<StatsReqType> {
        match typ {
            0 => Ok(StatsReqType::Desc),
            1 => Ok(StatsReqType::Flow),
            2 => Ok(StatsReqType::Aggregate),
            3 => Ok(StatsReqType::Table),
            4 => Ok(StatsReqType::Port),
            5 => Ok(StatsReqType::Queue),
            0xffff => Ok(StatsReqType::Vendor),
            t => {
                Err(OfpError::UnknownVariant {
                    family: family,
                    discriminant: t as u32,
                })
            }
        }
    }
}

fn parse_vendor_body(family: Family, bytes: &mut Reader) -> Result<Vendor> {
    let vendor = bytes.read_u32()?;
    dispatch_vendor(family, vendor, bytes.rest())
}

fn marshal_vendor_body(v: &Vendor, bytes: &mut Vec<u8>) {
    put_u32(bytes, v.vendor());
    v.marshal(bytes);
}

/// Type of Body for Stats Requests
#[derive(Clone, Debug, PartialEq)]
pub enum StatsReqBody {
    DescBody,
    FlowStatsBody {
        pattern: Match,
        /// 0xff for all tables.
        table_id: u8,
        out_port: Option<PseudoPort>,
    },
    AggregateStatsBody {
        pattern: Match,
        table_id: u8,
        out_port: Option<PseudoPort>,
    },
    TableBody,
    PortBody {
        /// `OFPP_NONE` for all ports.
        port_no: u16,
    },
    QueueBody {
        port_no: u16,
        queue_id: u32,
    },
    VendorBody(Vendor),
}

impl StatsReqBody {
    pub fn type_code(&self) -> StatsReqType {
        match *self {
            StatsReqBody::DescBody => StatsReqType::Desc,
            StatsReqBody::FlowStatsBody { .. } => StatsReqType::Flow,
            StatsReqBody::AggregateStatsBody { .. } => StatsReqType::Aggregate,
            StatsReqBody::TableBody => StatsReqType::Table,
            StatsReqBody::PortBody { .. } => StatsReqType::Port,
            StatsReqBody::QueueBody { .. } => StatsReqType::Queue,
            StatsReqBody::VendorBody(_) => StatsReqType::Vendor,
        }
    }

    pub fn size_of(&self) -> usize {
        match *self {
            StatsReqBody::DescBody |
            StatsReqBody::TableBody => 0,
            StatsReqBody::FlowStatsBody { .. } |
            StatsReqBody::AggregateStatsBody { .. } => Match::size_of() + 4,
            StatsReqBody::PortBody { .. } |
            StatsReqBody::QueueBody { .. } => 8,
            StatsReqBody::VendorBody(ref v) => 4 + v.size_of(),
        }
    }

    /// Decode a body whose stats type was read by the caller.
    pub fn parse_body(typ: StatsReqType, buf: &[u8]) -> Result<StatsReqBody> {
        let mut bytes = Reader::new(buf);
        let body = match typ {
            StatsReqType::Desc => StatsReqBody::DescBody,
            StatsReqType::Flow | StatsReqType::Aggregate => {
                let pattern = Match::parse(&mut bytes)?;
                let table_id = bytes.read_u8()?;
                bytes.skip(1)?;
                let out_port = PseudoPort::of_int(bytes.read_u16()?);
                if typ == StatsReqType::Flow {
                    StatsReqBody::FlowStatsBody {
                        pattern: pattern,
                        table_id: table_id,
                        out_port: out_port,
                    }
                } else {
                    StatsReqBody::AggregateStatsBody {
                        pattern: pattern,
                        table_id: table_id,
                        out_port: out_port,
                    }
                }
            }
            StatsReqType::Table => StatsReqBody::TableBody,
            StatsReqType::Port => {
                let port_no = bytes.read_u16()?;
                bytes.skip(6)?;
                StatsReqBody::PortBody { port_no: port_no }
            }
            StatsReqType::Queue => {
                let port_no = bytes.read_u16()?;
                bytes.skip(2)?;
                StatsReqBody::QueueBody {
                    port_no: port_no,
                    queue_id: bytes.read_u32()?,
                }
            }
            StatsReqType::Vendor => {
                StatsReqBody::VendorBody(parse_vendor_body(Family::VendorStatsRequest, &mut bytes)?)
            }
        };
        Ok(body)
    }

    /// Encode the body alone, without the type and flags.
    pub fn marshal_body(&self, bytes: &mut Vec<u8>) {
        match *self {
            StatsReqBody::DescBody |
            StatsReqBody::TableBody => (),
            StatsReqBody::FlowStatsBody { ref pattern, table_id, out_port } |
            StatsReqBody::AggregateStatsBody { ref pattern, table_id, out_port } => {
                pattern.marshal(bytes);
                put_u8(bytes, table_id);
                write_padding_bytes(bytes, 1);
                PseudoPort::marshal_opt(out_port, bytes);
            }
            StatsReqBody::PortBody { port_no } => {
                put_u16(bytes, port_no);
                write_padding_bytes(bytes, 6);
            }
            StatsReqBody::QueueBody { port_no, queue_id } => {
                put_u16(bytes, port_no);
                write_padding_bytes(bytes, 2);
                put_u32(bytes, queue_id);
            }
            StatsReqBody::VendorBody(ref v) => marshal_vendor_body(v, bytes),
        }
    }
}

/// Represents stats request from the controller.
#[derive(Clone, Debug, PartialEq)]
pub struct StatsReq {
    pub flags: u16,
    pub body: StatsReqBody,
}

impl MessageType for StatsReq {
    fn size_of(&self) -> usize {
        4 + self.body.size_of()
    }

    fn parse(buf: &[u8]) -> Result<StatsReq> {
        let mut bytes = Reader::new(buf);
        let typ = StatsReqType::of_int(bytes.read_u16()?, Family::StatsRequest)?;
        let flags = bytes.read_u16()?;
        Ok(StatsReq {
            flags: flags,
            body: StatsReqBody::parse_body(typ, bytes.rest())?,
        })
    }

    fn marshal(&self, bytes: &mut Vec<u8>) {
        put_u16(bytes, self.body.type_code() as u16);
        put_u16(bytes, self.flags);
        self.body.marshal_body(bytes);
    }
}

/// Switch description strings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DescStats {
    pub manufacturer_desc: String,
    pub hardware_desc: String,
    pub software_desc: String,
    pub serial_number: String,
    pub datapath_desc: String,
}

impl DescStats {
    pub fn size_of() -> usize {
        4 * DESC_STR_LEN + SERIAL_NUM_LEN
    }

    fn parse(bytes: &mut Reader) -> Result<DescStats> {
        Ok(DescStats {
            manufacturer_desc: bytes.read_fixed_size_string(DESC_STR_LEN)?,
            hardware_desc: bytes.read_fixed_size_string(DESC_STR_LEN)?,
            software_desc: bytes.read_fixed_size_string(DESC_STR_LEN)?,
            serial_number: bytes.read_fixed_size_string(SERIAL_NUM_LEN)?,
            datapath_desc: bytes.read_fixed_size_string(DESC_STR_LEN)?,
        })
    }

    fn marshal(&self, bytes: &mut Vec<u8>) {
        write_fixed_size_string(bytes, &self.manufacturer_desc, DESC_STR_LEN);
        write_fixed_size_string(bytes, &self.hardware_desc, DESC_STR_LEN);
        write_fixed_size_string(bytes, &self.software_desc, DESC_STR_LEN);
        write_fixed_size_string(bytes, &self.serial_number, SERIAL_NUM_LEN);
        write_fixed_size_string(bytes, &self.datapath_desc, DESC_STR_LEN);
    }
}

/// Statistics of one flow entry.
#[derive(Clone, Debug, PartialEq)]
pub struct FlowStats {
    pub table_id: u8,
    pub pattern: Match,
    pub duration_sec: u32,
    pub duration_nsec: u32,
    pub priority: u16,
    pub idle_timeout: Timeout,
    pub hard_timeout: Timeout,
    pub cookie: u64,
    pub packet_count: u64,
    pub byte_count: u64,
    pub actions: Vec<Action>,
    pub skipped: SkippedElements,
}

/// Flow stats entries lead with their own length and vary in size with
/// their action lists.
impl ListElement for FlowStats {
    const FAMILY: Family = Family::StatsReply;
    const MIN_SIZE: usize = 88;

    fn element_len(head: &[u8]) -> Result<usize> {
        Ok(Reader::new(head).read_u16()? as usize)
    }

    fn parse(buf: &[u8]) -> Result<FlowStats> {
        let mut bytes = Reader::new(buf);
        bytes.skip(2)?;
        let table_id = bytes.read_u8()?;
        bytes.skip(1)?;
        let pattern = Match::parse(&mut bytes)?;
        let duration_sec = bytes.read_u32()?;
        let duration_nsec = bytes.read_u32()?;
        let priority = bytes.read_u16()?;
        let idle_timeout = Timeout::of_int(bytes.read_u16()?);
        let hard_timeout = Timeout::of_int(bytes.read_u16()?);
        bytes.skip(6)?;
        let cookie = bytes.read_u64()?;
        let packet_count = bytes.read_u64()?;
        let byte_count = bytes.read_u64()?;
        let (actions, skipped) = parse_list::<Action>(bytes.rest())?.into_parts();
        Ok(FlowStats {
            table_id: table_id,
            pattern: pattern,
            duration_sec: duration_sec,
            duration_nsec: duration_nsec,
            priority: priority,
            idle_timeout: idle_timeout,
            hard_timeout: hard_timeout,
            cookie: cookie,
            packet_count: packet_count,
            byte_count: byte_count,
            actions: actions,
            skipped: skipped,
        })
    }

    fn size_of(&self) -> usize {
        Self::MIN_SIZE + size_of_list(&self.actions)
    }

    fn marshal(&self, bytes: &mut Vec<u8>) {
        put_u16(bytes, ListElement::size_of(self) as u16);
        put_u8(bytes, self.table_id);
        write_padding_bytes(bytes, 1);
        self.pattern.marshal(bytes);
        put_u32(bytes, self.duration_sec);
        put_u32(bytes, self.duration_nsec);
        put_u16(bytes, self.priority);
        put_u16(bytes, self.idle_timeout.to_int());
        put_u16(bytes, self.hard_timeout.to_int());
        write_padding_bytes(bytes, 6);
        put_u64(bytes, self.cookie);
        put_u64(bytes, self.packet_count);
        put_u64(bytes, self.byte_count);
        marshal_list(&self.actions, bytes);
    }
}

/// Totals over the flows selected by an aggregate request.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AggregateStats {
    pub packet_count: u64,
    pub byte_count: u64,
    pub flow_count: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableStats {
    pub table_id: u8,
    pub name: String,
    /// Wildcards the table supports.
    pub wildcards: u32,
    pub max_entries: u32,
    pub active_count: u32,
    pub lookup_count: u64,
    pub matched_count: u64,
}

impl TableStats {
    pub fn size_of() -> usize {
        64
    }

    fn parse(bytes: &mut Reader) -> Result<TableStats> {
        let table_id = bytes.read_u8()?;
        bytes.skip(3)?;
        Ok(TableStats {
            table_id: table_id,
            name: bytes.read_fixed_size_string(OFP_MAX_TABLE_NAME_LEN)?,
            wildcards: bytes.read_u32()?,
            max_entries: bytes.read_u32()?,
            active_count: bytes.read_u32()?,
            lookup_count: bytes.read_u64()?,
            matched_count: bytes.read_u64()?,
        })
    }

    fn marshal(&self, bytes: &mut Vec<u8>) {
        put_u8(bytes, self.table_id);
        write_padding_bytes(bytes, 3);
        write_fixed_size_string(bytes, &self.name, OFP_MAX_TABLE_NAME_LEN);
        put_u32(bytes, self.wildcards);
        put_u32(bytes, self.max_entries);
        put_u32(bytes, self.active_count);
        put_u64(bytes, self.lookup_count);
        put_u64(bytes, self.matched_count);
    }
}

/// A receive/transmit counter pair.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TransmissionCounter {
    pub rx: u64,
    pub tx: u64,
}

impl TransmissionCounter {
    fn parse(bytes: &mut Reader) -> Result<TransmissionCounter> {
        Ok(TransmissionCounter {
            rx: bytes.read_u64()?,
            tx: bytes.read_u64()?,
        })
    }

    fn marshal(&self, bytes: &mut Vec<u8>) {
        put_u64(bytes, self.rx);
        put_u64(bytes, self.tx);
    }
}

/// Counters of one port. All ones means the switch does not keep that counter.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PortStats {
    pub port_no: u16,
    pub packets: TransmissionCounter,
    pub bytes: TransmissionCounter,
    pub dropped: TransmissionCounter,
    pub errors: TransmissionCounter,
    pub rx_frame_errors: u64,
    pub rx_over_errors: u64,
    pub rx_crc_errors: u64,
    pub collisions: u64,
}

impl PortStats {
    pub fn size_of() -> usize {
        104
    }

    fn parse(bytes: &mut Reader) -> Result<PortStats> {
        let port_no = bytes.read_u16()?;
        bytes.skip(6)?;
        Ok(PortStats {
            port_no: port_no,
            packets: TransmissionCounter::parse(bytes)?,
            bytes: TransmissionCounter::parse(bytes)?,
            dropped: TransmissionCounter::parse(bytes)?,
            errors: TransmissionCounter::parse(bytes)?,
            rx_frame_errors: bytes.read_u64()?,
            rx_over_errors: bytes.read_u64()?,
            rx_crc_errors: bytes.read_u64()?,
            collisions: bytes.read_u64()?,
        })
    }

    fn marshal(&self, bytes: &mut Vec<u8>) {
        put_u16(bytes, self.port_no);
        write_padding_bytes(bytes, 6);
        self.packets.marshal(bytes);
        self.bytes.marshal(bytes);
        self.dropped.marshal(bytes);
        self.errors.marshal(bytes);
        put_u64(bytes, self.rx_frame_errors);
        put_u64(bytes, self.rx_over_errors);
        put_u64(bytes, self.rx_crc_errors);
        put_u64(bytes, self.collisions);
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct QueueStats {
    pub port_no: u16,
    pub queue_id: u32,
    pub tx_bytes: u64,
    pub tx_packets: u64,
    pub tx_errors: u64,
}

impl QueueStats {
    pub fn size_of() -> usize {
        32
    }

    fn parse(bytes: &mut Reader) -> Result<QueueStats> {
        let port_no = bytes.read_u16()?;
        bytes.skip(2)?;
        Ok(QueueStats {
            port_no: port_no,
            queue_id: bytes.read_u32()?,
            tx_bytes: bytes.read_u64()?,
            tx_packets: bytes.read_u64()?,
            tx_errors: bytes.read_u64()?,
        })
    }

    fn marshal(&self, bytes: &mut Vec<u8>) {
        put_u16(bytes, self.port_no);
        write_padding_bytes(bytes, 2);
        put_u32(bytes, self.queue_id);
        put_u64(bytes, self.tx_bytes);
        put_u64(bytes, self.tx_packets);
        put_u64(bytes, self.tx_errors);
    }
}

/// Type of Body for Stats Response
#[derive(Clone, Debug, PartialEq)]
pub enum StatsRespBody {
    DescBody(DescStats),
    FlowStatsBody(Vec<FlowStats>),
    AggregateStatsBody(AggregateStats),
    TableBody(Vec<TableStats>),
    PortBody(Vec<PortStats>),
    QueueBody(Vec<QueueStats>),
    VendorBody(Vendor),
}

impl StatsRespBody {
    pub fn type_code(&self) -> StatsReqType {
        match *self {
            StatsRespBody::DescBody(_) => StatsReqType::Desc,
            StatsRespBody::FlowStatsBody(_) => StatsReqType::Flow,
            StatsRespBody::AggregateStatsBody(_) => StatsReqType::Aggregate,
            StatsRespBody::TableBody(_) => StatsReqType::Table,
            StatsRespBody::PortBody(_) => StatsReqType::Port,
            StatsRespBody::QueueBody(_) => StatsReqType::Queue,
            StatsRespBody::VendorBody(_) => StatsReqType::Vendor,
        }
    }

    pub fn size_of(&self) -> usize {
        match *self {
            StatsRespBody::DescBody(_) => DescStats::size_of(),
            StatsRespBody::FlowStatsBody(ref flows) => size_of_list(flows),
            StatsRespBody::AggregateStatsBody(_) => 24,
            StatsRespBody::TableBody(ref tables) => tables.len() * TableStats::size_of(),
            StatsRespBody::PortBody(ref ports) => ports.len() * PortStats::size_of(),
            StatsRespBody::QueueBody(ref queues) => queues.len() * QueueStats::size_of(),
            StatsRespBody::VendorBody(ref v) => 4 + v.size_of(),
        }
    }

    /// Decode a body whose stats type was read by the caller.
    pub fn parse_body(typ: StatsReqType, buf: &[u8]) -> Result<StatsRespBody> {
        let mut bytes = Reader::new(buf);
        let body = match typ {
            StatsReqType::Desc => StatsRespBody::DescBody(DescStats::parse(&mut bytes)?),
            StatsReqType::Flow => StatsRespBody::FlowStatsBody(parse_list::<FlowStats>(buf)?.items),
            StatsReqType::Aggregate => {
                let packet_count = bytes.read_u64()?;
                let byte_count = bytes.read_u64()?;
                let flow_count = bytes.read_u32()?;
                bytes.skip(4)?;
                StatsRespBody::AggregateStatsBody(AggregateStats {
                    packet_count: packet_count,
                    byte_count: byte_count,
                    flow_count: flow_count,
                })
            }
            StatsReqType::Table => {
                let n = element_count("table stats", buf.len(), TableStats::size_of())?;
                StatsRespBody::TableBody(bytes.read_counted(n, TableStats::parse)?)
            }
            StatsReqType::Port => {
                let n = element_count("port stats", buf.len(), PortStats::size_of())?;
                StatsRespBody::PortBody(bytes.read_counted(n, PortStats::parse)?)
            }
            StatsReqType::Queue => {
                let n = element_count("queue stats", buf.len(), QueueStats::size_of())?;
                StatsRespBody::QueueBody(bytes.read_counted(n, QueueStats::parse)?)
            }
            StatsReqType::Vendor => {
                StatsRespBody::VendorBody(parse_vendor_body(Family::VendorStatsReply, &mut bytes)?)
            }
        };
        Ok(body)
    }

    /// Encode the body alone, without the type and flags.
    pub fn marshal_body(&self, bytes: &mut Vec<u8>) {
        match *self {
            StatsRespBody::DescBody(ref desc) => desc.marshal(bytes),
            StatsRespBody::FlowStatsBody(ref flows) => marshal_list(flows, bytes),
            StatsRespBody::AggregateStatsBody(ref agg) => {
                put_u64(bytes, agg.packet_count);
                put_u64(bytes, agg.byte_count);
                put_u32(bytes, agg.flow_count);
                write_padding_bytes(bytes, 4);
            }
            StatsRespBody::TableBody(ref tables) => {
                for t in tables {
                    t.marshal(bytes)
                }
            }
            StatsRespBody::PortBody(ref ports) => {
                for p in ports {
                    p.marshal(bytes)
                }
            }
            StatsRespBody::QueueBody(ref queues) => {
                for q in queues {
                    q.marshal(bytes)
                }
            }
            StatsRespBody::VendorBody(ref v) => marshal_vendor_body(v, bytes),
        }
    }
}

/// Represents stats reply from the datapath.
#[derive(Clone, Debug, PartialEq)]
pub struct StatsResp {
    pub flags: u16,
    pub body: StatsRespBody,
}

impl StatsResp {
    /// Whether further replies to the same request follow this one.
    pub fn more(&self) -> bool {
        self.flags & OFPSF_REPLY_MORE != 0
    }
}

impl MessageType for StatsResp {
    fn size_of(&self) -> usize {
        4 + self.body.size_of()
    }

    fn parse(buf: &[u8]) -> Result<StatsResp> {
        let mut bytes = Reader::new(buf);
        let typ = StatsReqType::of_int(bytes.read_u16()?, Family::StatsReply)?;
        let flags = bytes.read_u16()?;
        Ok(StatsResp {
            flags: flags,
            body: StatsRespBody::parse_body(typ, bytes.rest())?,
        })
    }

    fn marshal(&self, bytes: &mut Vec<u8>) {
        put_u16(bytes, self.body.type_code() as u16);
        put_u16(bytes, self.flags);
        self.body.marshal_body(bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip_resp(resp: &StatsResp) -> StatsResp {
        let mut bytes = vec![];
        resp.marshal(&mut bytes);
        assert_eq!(bytes.len(), resp.size_of());
        StatsResp::parse(&bytes).unwrap()
    }

    fn flow_stats(cookie: u64, actions: Vec<Action>) -> FlowStats {
        FlowStats {
            table_id: 0,
            pattern: Match::match_all(),
            duration_sec: 10,
            duration_nsec: 500,
            priority: 0x8000,
            idle_timeout: Timeout::ExpiresAfter(60),
            hard_timeout: Timeout::Permanent,
            cookie: cookie,
            packet_count: 42,
            byte_count: 4200,
            actions: actions,
            skipped: SkippedElements::default(),
        }
    }

    #[test]
    fn requests_round_trip_in_both_forms() {
        let bodies = vec![StatsReqBody::DescBody,
                          StatsReqBody::FlowStatsBody {
                              pattern: Match::match_all(),
                              table_id: 0xff,
                              out_port: None,
                          },
                          StatsReqBody::AggregateStatsBody {
                              pattern: Match::default(),
                              table_id: 1,
                              out_port: Some(PseudoPort::PhysicalPort(2)),
                          },
                          StatsReqBody::TableBody,
                          StatsReqBody::PortBody { port_no: 0xffff },
                          StatsReqBody::QueueBody {
                              port_no: 1,
                              queue_id: super::super::OFPQ_ALL,
                          }];
        for body in bodies {
            let req = StatsReq {
                flags: 0,
                body: body.clone(),
            };
            let mut bytes = vec![];
            req.marshal(&mut bytes);
            assert_eq!(bytes.len(), req.size_of());
            assert_eq!(StatsReq::parse(&bytes).unwrap(), req);

            let mut nested = vec![];
            body.marshal_body(&mut nested);
            assert_eq!(&nested[..], &bytes[4..]);
            assert_eq!(StatsReqBody::parse_body(body.type_code(), &nested).unwrap(), body);
        }
    }

    #[test]
    fn flow_request_is_44_bytes() {
        let body = StatsReqBody::FlowStatsBody {
            pattern: Match::match_all(),
            table_id: 0xff,
            out_port: None,
        };
        assert_eq!(body.size_of(), 44);
    }

    #[test]
    fn desc_reply() {
        let resp = StatsResp {
            flags: 0,
            body: StatsRespBody::DescBody(DescStats {
                manufacturer_desc: "Nicira, Inc.".to_string(),
                hardware_desc: "Open vSwitch".to_string(),
                software_desc: "1.0.0".to_string(),
                serial_number: "None".to_string(),
                datapath_desc: "None".to_string(),
            }),
        };
        assert_eq!(resp.size_of(), 4 + 1056);
        assert_eq!(round_trip_resp(&resp), resp);
    }

    #[test]
    fn flow_reply_entries_carry_action_lists() {
        let resp = StatsResp {
            flags: OFPSF_REPLY_MORE,
            body: StatsRespBody::FlowStatsBody(vec![flow_stats(1, vec![]),
                                                    flow_stats(2,
                                                               vec![Action::SetDlVlan(Some(5)),
                                                                    Action::Output {
                                                                        port: PseudoPort::Normal,
                                                                        max_len: 0,
                                                                    }])]),
        };
        let back = round_trip_resp(&resp);
        assert!(back.more());
        assert_eq!(back, resp);
    }

    #[test]
    fn counted_replies() {
        let tables = StatsResp {
            flags: 0,
            body: StatsRespBody::TableBody(vec![TableStats {
                                                    table_id: 0,
                                                    name: "classifier".to_string(),
                                                    wildcards: 0x3fffff,
                                                    max_entries: 1 << 20,
                                                    active_count: 3,
                                                    lookup_count: 100,
                                                    matched_count: 97,
                                                }]),
        };
        assert_eq!(round_trip_resp(&tables), tables);

        let counter = TransmissionCounter { rx: 1, tx: 2 };
        let ports = StatsResp {
            flags: 0,
            body: StatsRespBody::PortBody(vec![PortStats {
                                                   port_no: 1,
                                                   packets: counter,
                                                   bytes: counter,
                                                   dropped: TransmissionCounter::default(),
                                                   errors: TransmissionCounter::default(),
                                                   rx_frame_errors: 0,
                                                   rx_over_errors: 0,
                                                   rx_crc_errors: 0,
                                                   collisions: u64::MAX,
                                               };
                                               2]),
        };
        assert_eq!(ports.size_of(), 4 + 208);
        assert_eq!(round_trip_resp(&ports), ports);

        let queues = StatsResp {
            flags: 0,
            body: StatsRespBody::QueueBody(vec![QueueStats {
                                                    port_no: 1,
                                                    queue_id: 2,
                                                    tx_bytes: 3,
                                                    tx_packets: 4,
                                                    tx_errors: 5,
                                                }]),
        };
        assert_eq!(round_trip_resp(&queues), queues);

        let agg = StatsResp {
            flags: 0,
            body: StatsRespBody::AggregateStatsBody(AggregateStats {
                packet_count: 1,
                byte_count: 2,
                flow_count: 3,
            }),
        };
        assert_eq!(round_trip_resp(&agg), agg);
    }

    #[test]
    fn partial_table_entry_is_malformed() {
        let mut bytes = vec![0, 3, 0, 0];
        bytes.extend_from_slice(&[0; 65]);
        assert!(matches!(StatsResp::parse(&bytes),
                         Err(OfpError::MalformedLength { what: "table stats", .. })));
    }

    #[test]
    fn unknown_stats_type() {
        assert_eq!(StatsReq::parse(&[0, 9, 0, 0]),
                   Err(OfpError::UnknownVariant {
                       family: Family::StatsRequest,
                       discriminant: 9,
                   }));
        assert!(matches!(StatsResp::parse(&[0xff, 0xff, 0, 0, 0, 0, 0x12, 0x34]),
                         Err(OfpError::UnknownVariant { family: Family::VendorStatsReply, .. })));
    }
}
