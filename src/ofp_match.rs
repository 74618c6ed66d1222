use std::hash::{Hash, Hasher};

use crate::bits::{get_field, set_field};
use crate::codec::{put_u16, put_u32, put_u8, write_padding_bytes, MacAddr, Reader};
use crate::error::Result;
use crate::openflow0x01::{OFP_DL_TYPE_ETH2_CUTOFF, OFP_DL_TYPE_NOT_ETH_TYPE, OFP_VLAN_NONE};
use crate::packet::{Arp, EthTyp, Ethernet, Icmp, Ip, IpProto, LlcSnap, Tcp, Udp, Vlan};

/// Flow wildcard bits (`ofp_flow_wildcards`).
pub mod wildcards {
    pub const OFPFW_IN_PORT: u32 = 1 << 0;
    pub const OFPFW_DL_VLAN: u32 = 1 << 1;
    pub const OFPFW_DL_SRC: u32 = 1 << 2;
    pub const OFPFW_DL_DST: u32 = 1 << 3;
    pub const OFPFW_DL_TYPE: u32 = 1 << 4;
    pub const OFPFW_NW_PROTO: u32 = 1 << 5;
    pub const OFPFW_TP_SRC: u32 = 1 << 6;
    pub const OFPFW_TP_DST: u32 = 1 << 7;

    /// The network source wildcard is a 6-bit count of low address bits to ignore.
    /// Counts of 32 and above wildcard the whole address.
    pub const OFPFW_NW_SRC_SHIFT: u32 = 8;
    pub const OFPFW_NW_SRC_BITS: u32 = 6;
    pub const OFPFW_NW_SRC_MASK: u32 = ((1 << OFPFW_NW_SRC_BITS) - 1) << OFPFW_NW_SRC_SHIFT;
    pub const OFPFW_NW_SRC_ALL: u32 = 32 << OFPFW_NW_SRC_SHIFT;

    pub const OFPFW_NW_DST_SHIFT: u32 = 14;
    pub const OFPFW_NW_DST_BITS: u32 = 6;
    pub const OFPFW_NW_DST_MASK: u32 = ((1 << OFPFW_NW_DST_BITS) - 1) << OFPFW_NW_DST_SHIFT;
    pub const OFPFW_NW_DST_ALL: u32 = 32 << OFPFW_NW_DST_SHIFT;

    pub const OFPFW_DL_VLAN_PCP: u32 = 1 << 20;
    pub const OFPFW_NW_TOS: u32 = 1 << 21;

    pub const OFPFW_ALL: u32 = (1 << 22) - 1;
}

use self::wildcards::*;

/// Fields to match against flows (`ofp_match`).
///
/// Doubles as the key extracted from a packet by `from_packet`. Equality
/// ignores `wildcards`, but hashing includes it, so two matches that differ
/// only in their wildcards are equal yet usually hash apart. Keyed
/// collections should only mix matches that share a wildcard mask.
#[derive(Copy, Clone, Debug)]
pub struct Match {
    pub wildcards: u32,
    pub in_port: u16,
    pub dl_src: MacAddr,
    pub dl_dst: MacAddr,
    pub dl_vlan: u16,
    pub dl_vlan_pcp: u8,
    pub dl_type: u16,
    /// IP ToS, DSCP bits only.
    pub nw_tos: u8,
    /// IP protocol, or the low byte of the ARP opcode.
    pub nw_proto: u8,
    pub nw_src: u32,
    pub nw_dst: u32,
    /// Transport source port, or ICMP type.
    pub tp_src: u16,
    /// Transport destination port, or ICMP code.
    pub tp_dst: u16,
}

impl Default for Match {
    fn default() -> Match {
        Match {
            wildcards: 0,
            in_port: 0,
            dl_src: [0; 6],
            dl_dst: [0; 6],
            dl_vlan: OFP_VLAN_NONE,
            dl_vlan_pcp: 0,
            dl_type: 0,
            nw_tos: 0,
            nw_proto: 0,
            nw_src: 0,
            nw_dst: 0,
            tp_src: 0,
            tp_dst: 0,
        }
    }
}

impl PartialEq for Match {
    fn eq(&self, other: &Match) -> bool {
        self.in_port == other.in_port && self.dl_vlan == other.dl_vlan &&
        self.dl_vlan_pcp == other.dl_vlan_pcp && self.dl_src == other.dl_src &&
        self.dl_dst == other.dl_dst && self.dl_type == other.dl_type &&
        self.nw_src == other.nw_src && self.nw_dst == other.nw_dst &&
        self.nw_proto == other.nw_proto && self.nw_tos == other.nw_tos &&
        self.tp_src == other.tp_src && self.tp_dst == other.tp_dst
    }
}

impl Eq for Match {}

impl Hash for Match {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.wildcards.hash(state);
        self.in_port.hash(state);
        self.dl_vlan.hash(state);
        self.dl_vlan_pcp.hash(state);
        self.dl_src.hash(state);
        self.dl_dst.hash(state);
        self.dl_type.hash(state);
        self.nw_src.hash(state);
        self.nw_dst.hash(state);
        self.nw_proto.hash(state);
        self.nw_tos.hash(state);
        self.tp_src.hash(state);
        self.tp_dst.hash(state);
    }
}

impl Match {
    /// Wire size of an `ofp_match`.
    pub fn size_of() -> usize {
        40
    }

    /// A match with every field wildcarded.
    pub fn match_all() -> Match {
        Match { wildcards: OFPFW_ALL, ..Match::default() }
    }

    /// Whether every bit of `flag` is set in the wildcards.
    pub fn is_wildcarded(&self, flag: u32) -> bool {
        self.wildcards & flag == flag
    }

    pub fn set_wildcard(&mut self, flag: u32, on: bool) {
        if on {
            self.wildcards |= flag
        } else {
            self.wildcards &= !flag
        }
    }

    /// Number of low-order network source bits ignored, capped at 32.
    pub fn nw_src_wildcard_bits(&self) -> u32 {
        get_field(self.wildcards, OFPFW_NW_SRC_SHIFT, OFPFW_NW_SRC_BITS).min(32)
    }

    pub fn set_nw_src_wildcard_bits(&mut self, n: u32) {
        self.wildcards = set_field(self.wildcards, OFPFW_NW_SRC_SHIFT, OFPFW_NW_SRC_BITS, n.min(32))
    }

    pub fn nw_dst_wildcard_bits(&self) -> u32 {
        get_field(self.wildcards, OFPFW_NW_DST_SHIFT, OFPFW_NW_DST_BITS).min(32)
    }

    pub fn set_nw_dst_wildcard_bits(&mut self, n: u32) {
        self.wildcards = set_field(self.wildcards, OFPFW_NW_DST_SHIFT, OFPFW_NW_DST_BITS, n.min(32))
    }

    /// Netmask of the network source bits that take part in matching.
    pub fn nw_src_mask(&self) -> u32 {
        prefix_mask(self.nw_src_wildcard_bits())
    }

    pub fn nw_dst_mask(&self) -> u32 {
        prefix_mask(self.nw_dst_wildcard_bits())
    }

    pub fn parse(bytes: &mut Reader) -> Result<Match> {
        let wildcards = bytes.read_u32()?;
        let in_port = bytes.read_u16()?;
        let dl_src = bytes.read_mac()?;
        let dl_dst = bytes.read_mac()?;
        let dl_vlan = bytes.read_u16()?;
        let dl_vlan_pcp = bytes.read_u8()?;
        bytes.skip(1)?;
        let dl_type = bytes.read_u16()?;
        let nw_tos = bytes.read_u8()?;
        let nw_proto = bytes.read_u8()?;
        bytes.skip(2)?;
        let nw_src = bytes.read_u32()?;
        let nw_dst = bytes.read_u32()?;
        let tp_src = bytes.read_u16()?;
        let tp_dst = bytes.read_u16()?;
        Ok(Match {
            wildcards: wildcards,
            in_port: in_port,
            dl_src: dl_src,
            dl_dst: dl_dst,
            dl_vlan: dl_vlan,
            dl_vlan_pcp: dl_vlan_pcp,
            dl_type: dl_type,
            nw_tos: nw_tos,
            nw_proto: nw_proto,
            nw_src: nw_src,
            nw_dst: nw_dst,
            tp_src: tp_src,
            tp_dst: tp_dst,
        })
    }

    pub fn marshal(&self, bytes: &mut Vec<u8>) {
        put_u32(bytes, self.wildcards);
        put_u16(bytes, self.in_port);
        bytes.extend_from_slice(&self.dl_src);
        bytes.extend_from_slice(&self.dl_dst);
        put_u16(bytes, self.dl_vlan);
        put_u8(bytes, self.dl_vlan_pcp);
        write_padding_bytes(bytes, 1);
        put_u16(bytes, self.dl_type);
        put_u8(bytes, self.nw_tos);
        put_u8(bytes, self.nw_proto);
        write_padding_bytes(bytes, 2);
        put_u32(bytes, self.nw_src);
        put_u32(bytes, self.nw_dst);
        put_u16(bytes, self.tp_src);
        put_u16(bytes, self.tp_dst);
    }

    /// Extract an exact-match key from a frame received on `in_port`.
    ///
    /// Best effort: extraction stops at the first header the frame is too
    /// short to hold, and every field not reached keeps its default. The
    /// ingress port is always set and the VLAN id starts out as `OFP_VLAN_NONE`.
    /// `nw_tos` is never filled in from the IPv4 header.
    pub fn from_packet(in_port: u16, frame: &[u8]) -> Match {
        let mut m = Match {
            in_port: in_port,
            dl_vlan: OFP_VLAN_NONE,
            ..Match::default()
        };
        let _ = m.extract(frame);
        m
    }

    fn extract(&mut self, frame: &[u8]) -> Option<()> {
        let eth = Ethernet::parse(frame)?;
        let mut rest = frame.get(Ethernet::size_of()..)?;

        if eth.typ >= OFP_DL_TYPE_ETH2_CUTOFF {
            self.dl_type = eth.typ;
        } else {
            let llc = LlcSnap::parse(rest)?;
            if llc.is_snap_ethernet() {
                self.dl_type = llc.typ;
                rest = rest.get(LlcSnap::size_of()..)?;
            } else {
                self.dl_type = OFP_DL_TYPE_NOT_ETH_TYPE;
                rest = rest.get(LlcSnap::llc_size_of()..)?;
            }
        }

        // One tag only. An inner 802.1Q tag is left as the ethertype.
        if self.dl_type == EthTyp::EthTypVLAN as u16 {
            let vlan = Vlan::parse(rest)?;
            rest = rest.get(Vlan::size_of()..)?;
            self.dl_type = vlan.typ;
            self.dl_vlan = vlan.vid();
            self.dl_vlan_pcp = vlan.pcp();
        }

        self.dl_src = eth.dl_src;
        self.dl_dst = eth.dl_dst;

        if self.dl_type == EthTyp::EthTypIP as u16 {
            let ip = Ip::parse(rest)?;
            self.nw_src = ip.src;
            self.nw_dst = ip.dst;
            self.nw_proto = ip.proto;
            if ip.is_fragment() || ip.header_len() < Ip::size_of() {
                return Some(());
            }
            let tp = rest.get(ip.header_len()..)?;
            match ip.proto {
                p if p == IpProto::IpTCP as u8 => {
                    let tcp = Tcp::parse(tp)?;
                    self.tp_src = tcp.src;
                    self.tp_dst = tcp.dst;
                }
                p if p == IpProto::IpUDP as u8 => {
                    let udp = Udp::parse(tp)?;
                    self.tp_src = udp.src;
                    self.tp_dst = udp.dst;
                }
                p if p == IpProto::IpICMP as u8 => {
                    let icmp = Icmp::parse(tp)?;
                    self.tp_src = icmp.typ as u16;
                    self.tp_dst = icmp.code as u16;
                }
                _ => (),
            }
        } else if self.dl_type == EthTyp::EthTypARP as u16 {
            let arp = Arp::parse(rest)?;
            if arp.has_ip_addrs() {
                self.nw_src = arp.spa;
                self.nw_dst = arp.tpa;
            }
            self.nw_proto = (arp.op & 0xff) as u8;
        }
        Some(())
    }
}

fn prefix_mask(wildcard_bits: u32) -> u32 {
    if wildcard_bits >= 32 {
        0
    } else {
        !0u32 << wildcard_bits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(m: &Match) -> u64 {
        let mut h = DefaultHasher::new();
        m.hash(&mut h);
        h.finish()
    }

    fn sample() -> Match {
        Match {
            wildcards: 0,
            in_port: 3,
            dl_src: [0, 1, 2, 3, 4, 5],
            dl_dst: [6, 7, 8, 9, 10, 11],
            dl_vlan: 10,
            dl_vlan_pcp: 3,
            dl_type: 0x0800,
            nw_tos: 0x10,
            nw_proto: 6,
            nw_src: 0x0a000001,
            nw_dst: 0x0a000002,
            tp_src: 1234,
            tp_dst: 80,
        }
    }

    #[test]
    fn wire_layout_is_forty_bytes_with_zero_padding() {
        let mut bytes = vec![];
        sample().marshal(&mut bytes);
        assert_eq!(bytes.len(), Match::size_of());
        assert_eq!(bytes[21], 0);
        assert_eq!(&bytes[22..24], &[0x08, 0x00]);
        assert_eq!(&bytes[26..28], &[0, 0]);
        let mut r = Reader::new(&bytes);
        let back = Match::parse(&mut r).unwrap();
        assert_eq!(back, sample());
        assert_eq!(back.wildcards, 0);
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn equality_ignores_wildcards_but_hash_does_not() {
        let a = sample();
        let b = Match { wildcards: OFPFW_TP_SRC | OFPFW_NW_TOS, ..sample() };
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&a));
        assert!(hash_of(&a) != hash_of(&b));
    }

    #[test]
    fn any_other_field_breaks_equality() {
        assert!(sample() != Match { tp_dst: 81, ..sample() });
        assert!(sample() != Match { dl_vlan_pcp: 0, ..sample() });
        assert!(sample() != Match { nw_tos: 0, ..sample() });
    }

    #[test]
    fn nw_wildcard_counts() {
        let mut m = Match::default();
        m.set_nw_src_wildcard_bits(8);
        m.set_nw_dst_wildcard_bits(40);
        assert_eq!(m.nw_src_wildcard_bits(), 8);
        assert_eq!(m.nw_src_mask(), 0xffffff00);
        assert_eq!(m.nw_dst_wildcard_bits(), 32);
        assert_eq!(m.nw_dst_mask(), 0);
        assert!(m.is_wildcarded(OFPFW_NW_DST_ALL));
        assert!(!m.is_wildcarded(OFPFW_IN_PORT));
        m.set_wildcard(OFPFW_IN_PORT, true);
        assert!(m.is_wildcarded(OFPFW_IN_PORT));
    }

    #[test]
    fn match_all_wildcards_everything() {
        let m = Match::match_all();
        assert_eq!(m.wildcards, OFPFW_ALL);
        assert_eq!(m.nw_src_mask(), 0);
        assert_eq!(m.nw_dst_mask(), 0);
        assert!(m.is_wildcarded(OFPFW_DL_VLAN_PCP | OFPFW_NW_TOS));
    }

    #[test]
    fn llc_frame_without_snap_gets_sentinel_type() {
        let mut frame = vec![0xff; 12];
        frame.extend_from_slice(&[0x00, 0x26]);
        frame.extend_from_slice(&[0x42, 0x42, 0x03, 0, 0, 0, 0, 0]);
        let m = Match::from_packet(1, &frame);
        assert_eq!(m.dl_type, OFP_DL_TYPE_NOT_ETH_TYPE);
        assert_eq!(m.dl_src, [0xff; 6]);
    }

    #[test]
    fn llc_frame_too_short_for_snap_stops_early() {
        let mut frame = vec![0x11; 12];
        frame.extend_from_slice(&[0x00, 0x26, 0x42, 0x42, 0x03]);
        let m = Match::from_packet(1, &frame);
        assert_eq!(m.dl_type, 0);
        assert_eq!(m.dl_src, [0; 6]);
        assert_eq!(m.dl_vlan, OFP_VLAN_NONE);
    }
}
