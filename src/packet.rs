//! Header views over raw link-layer frames.
//!
//! Each view reads one protocol header from the front of a byte slice and
//! returns `None` when the slice is too short to hold it. Nothing here fails
//! with an error: truncated frames are normal input and callers stop looking
//! as soon as a header is missing.

use crate::bits::test_bit;
use crate::codec::{MacAddr, Reader};

/// Ethernet types understood by match extraction.
#[repr(u16)]
pub enum EthTyp {
    EthTypIP = 0x0800,
    EthTypARP = 0x0806,
    EthTypVLAN = 0x8100,
}

/// IPv4 protocol numbers whose headers carry transport ports.
#[repr(u8)]
pub enum IpProto {
    IpICMP = 0x01,
    IpTCP = 0x06,
    IpUDP = 0x11,
}

/// Ethernet header: destination, source, then type-or-length.
pub struct Ethernet {
    pub dl_dst: MacAddr,
    pub dl_src: MacAddr,
    pub typ: u16,
}

impl Ethernet {
    pub fn size_of() -> usize {
        14
    }

    pub fn parse(buf: &[u8]) -> Option<Ethernet> {
        let mut bytes = Reader::new(buf);
        let dl_dst = bytes.read_mac().ok()?;
        let dl_src = bytes.read_mac().ok()?;
        let typ = bytes.read_u16().ok()?;
        Some(Ethernet {
            dl_dst: dl_dst,
            dl_src: dl_src,
            typ: typ,
        })
    }
}

const LLC_DSAP_SNAP: u8 = 0xaa;
const LLC_SSAP_SNAP: u8 = 0xaa;
const LLC_CNTL_SNAP: u8 = 3;
const SNAP_ORG_ETHERNET: [u8; 3] = [0, 0, 0];

/// 802.2 LLC header followed by a SNAP header.
pub struct LlcSnap {
    pub dsap: u8,
    pub ssap: u8,
    pub cntl: u8,
    pub org: [u8; 3],
    pub typ: u16,
}

impl LlcSnap {
    pub fn size_of() -> usize {
        8
    }

    /// Size of the LLC part alone.
    pub fn llc_size_of() -> usize {
        3
    }

    pub fn parse(buf: &[u8]) -> Option<LlcSnap> {
        let mut bytes = Reader::new(buf);
        let dsap = bytes.read_u8().ok()?;
        let ssap = bytes.read_u8().ok()?;
        let cntl = bytes.read_u8().ok()?;
        let org = bytes.read_array::<3>().ok()?;
        let typ = bytes.read_u16().ok()?;
        Some(LlcSnap {
            dsap: dsap,
            ssap: ssap,
            cntl: cntl,
            org: org,
            typ: typ,
        })
    }

    /// Whether this is an Ethernet frame carried in SNAP, so `typ` is an ethertype.
    pub fn is_snap_ethernet(&self) -> bool {
        self.dsap == LLC_DSAP_SNAP && self.ssap == LLC_SSAP_SNAP && self.cntl == LLC_CNTL_SNAP &&
        self.org == SNAP_ORG_ETHERNET
    }
}

/// 802.1Q tag: tag control information and the encapsulated ethertype.
pub struct Vlan {
    pub tci: u16,
    pub typ: u16,
}

impl Vlan {
    pub fn size_of() -> usize {
        4
    }

    pub fn parse(buf: &[u8]) -> Option<Vlan> {
        let mut bytes = Reader::new(buf);
        let tci = bytes.read_u16().ok()?;
        let typ = bytes.read_u16().ok()?;
        Some(Vlan {
            tci: tci,
            typ: typ,
        })
    }

    pub fn vid(&self) -> u16 {
        self.tci & 0x0fff
    }

    pub fn pcp(&self) -> u8 {
        ((self.tci & 0xe000) >> 13) as u8
    }

    pub fn dei(&self) -> bool {
        test_bit(12, self.tci as u32)
    }
}

/// Fixed part of an IPv4 header.
pub struct Ip {
    pub ihl: u8,
    pub tos: u8,
    pub frag: u16,
    pub ttl: u8,
    pub proto: u8,
    pub src: u32,
    pub dst: u32,
}

impl Ip {
    pub fn size_of() -> usize {
        20
    }

    pub fn parse(buf: &[u8]) -> Option<Ip> {
        let mut bytes = Reader::new(buf);
        if bytes.remaining() < Self::size_of() {
            return None;
        }
        let vhl = bytes.read_u8().ok()?;
        let tos = bytes.read_u8().ok()?;
        bytes.skip(4).ok()?;
        let frag = bytes.read_u16().ok()?;
        let ttl = bytes.read_u8().ok()?;
        let proto = bytes.read_u8().ok()?;
        bytes.skip(2).ok()?;
        let src = bytes.read_u32().ok()?;
        let dst = bytes.read_u32().ok()?;
        Some(Ip {
            ihl: vhl & 0x0f,
            tos: tos,
            frag: frag,
            ttl: ttl,
            proto: proto,
            src: src,
            dst: dst,
        })
    }

    /// Header length in bytes, options included.
    pub fn header_len(&self) -> usize {
        self.ihl as usize * 4
    }

    /// True for any fragment but a whole datagram: more-fragments set or a non-zero offset.
    pub fn is_fragment(&self) -> bool {
        self.frag & 0x3fff != 0
    }
}

/// Source and destination ports of a TCP header.
pub struct Tcp {
    pub src: u16,
    pub dst: u16,
}

impl Tcp {
    pub fn size_of() -> usize {
        20
    }

    pub fn parse(buf: &[u8]) -> Option<Tcp> {
        if buf.len() < Self::size_of() {
            return None;
        }
        let mut bytes = Reader::new(buf);
        let src = bytes.read_u16().ok()?;
        let dst = bytes.read_u16().ok()?;
        Some(Tcp {
            src: src,
            dst: dst,
        })
    }
}

/// Source and destination ports of a UDP header.
pub struct Udp {
    pub src: u16,
    pub dst: u16,
}

impl Udp {
    pub fn size_of() -> usize {
        8
    }

    pub fn parse(buf: &[u8]) -> Option<Udp> {
        if buf.len() < Self::size_of() {
            return None;
        }
        let mut bytes = Reader::new(buf);
        let src = bytes.read_u16().ok()?;
        let dst = bytes.read_u16().ok()?;
        Some(Udp {
            src: src,
            dst: dst,
        })
    }
}

pub struct Icmp {
    pub typ: u8,
    pub code: u8,
}

impl Icmp {
    pub fn size_of() -> usize {
        4
    }

    pub fn parse(buf: &[u8]) -> Option<Icmp> {
        if buf.len() < Self::size_of() {
            return None;
        }
        let mut bytes = Reader::new(buf);
        let typ = bytes.read_u8().ok()?;
        let code = bytes.read_u8().ok()?;
        Some(Icmp {
            typ: typ,
            code: code,
        })
    }
}

/// ARP over Ethernet.
pub struct Arp {
    pub hrd: u16,
    pub pro: u16,
    pub hln: u8,
    pub pln: u8,
    pub op: u16,
    pub sha: MacAddr,
    pub spa: u32,
    pub tha: MacAddr,
    pub tpa: u32,
}

impl Arp {
    pub fn size_of() -> usize {
        28
    }

    pub fn parse(buf: &[u8]) -> Option<Arp> {
        let mut bytes = Reader::new(buf);
        let hrd = bytes.read_u16().ok()?;
        let pro = bytes.read_u16().ok()?;
        let hln = bytes.read_u8().ok()?;
        let pln = bytes.read_u8().ok()?;
        let op = bytes.read_u16().ok()?;
        let sha = bytes.read_mac().ok()?;
        let spa = bytes.read_u32().ok()?;
        let tha = bytes.read_mac().ok()?;
        let tpa = bytes.read_u32().ok()?;
        Some(Arp {
            hrd: hrd,
            pro: pro,
            hln: hln,
            pln: pln,
            op: op,
            sha: sha,
            spa: spa,
            tha: tha,
            tpa: tpa,
        })
    }

    /// Whether the protocol addresses are IPv4 addresses.
    pub fn has_ip_addrs(&self) -> bool {
        self.pro == EthTyp::EthTypIP as u16 && self.pln == 4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_buffers_yield_nothing() {
        assert!(Ethernet::parse(&[0; 13]).is_none());
        assert!(LlcSnap::parse(&[0; 7]).is_none());
        assert!(Vlan::parse(&[0; 3]).is_none());
        assert!(Ip::parse(&[0x45; 19]).is_none());
        assert!(Tcp::parse(&[0; 19]).is_none());
        assert!(Udp::parse(&[0; 7]).is_none());
        assert!(Icmp::parse(&[0; 3]).is_none());
        assert!(Arp::parse(&[0; 27]).is_none());
    }

    #[test]
    fn vlan_tci_fields() {
        let v = Vlan::parse(&[0x70, 0x0a, 0x08, 0x00]).unwrap();
        assert_eq!(v.vid(), 10);
        assert_eq!(v.pcp(), 3);
        assert!(v.dei());
        assert_eq!(v.typ, EthTyp::EthTypIP as u16);
    }

    #[test]
    fn fragment_detection() {
        let mut hdr = [0u8; 20];
        hdr[0] = 0x45;
        assert!(!Ip::parse(&hdr).unwrap().is_fragment());
        // Don't-fragment alone is not a fragment.
        hdr[6] = 0x40;
        assert!(!Ip::parse(&hdr).unwrap().is_fragment());
        hdr[6] = 0x20;
        assert!(Ip::parse(&hdr).unwrap().is_fragment());
        hdr[6] = 0x00;
        hdr[7] = 0x01;
        assert!(Ip::parse(&hdr).unwrap().is_fragment());
    }

    #[test]
    fn snap_ethernet_recognised() {
        let snap = LlcSnap::parse(&[0xaa, 0xaa, 0x03, 0, 0, 0, 0x08, 0x06]).unwrap();
        assert!(snap.is_snap_ethernet());
        assert_eq!(snap.typ, EthTyp::EthTypARP as u16);
        let llc = LlcSnap::parse(&[0x42, 0x42, 0x03, 0, 0, 0, 0, 0]).unwrap();
        assert!(!llc.is_snap_ethernet());
    }
}
