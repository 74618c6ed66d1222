//! Length-bounded lists of self-describing records.
//!
//! Action lists, queue property lists, packet queue lists and flow stats
//! arrays carry no element count. The enclosing record only says how many
//! bytes the list spans, and every element reports its own length in a small
//! header. Decoding walks that byte budget until it is exactly used up.

use log::debug;

use crate::error::{OfpError, Result};
use crate::registry::Family;

/// A record that can appear in a length-bounded list.
pub trait ListElement: Sized {
    /// Family used to report list errors.
    const FAMILY: Family;
    /// Size of the smallest valid element, which includes its length field.
    const MIN_SIZE: usize;

    /// Length the element at the front of `head` reports for itself.
    /// `head` holds at least `MIN_SIZE` bytes.
    fn element_len(head: &[u8]) -> Result<usize>;
    /// Decode one element from exactly its own bytes.
    fn parse(buf: &[u8]) -> Result<Self>;
    fn size_of(&self) -> usize;
    fn marshal(&self, bytes: &mut Vec<u8>);
}

/// An element passed over because its discriminant is not known.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Skipped {
    pub error: OfpError,
    /// Bytes the element occupied.
    pub len: usize,
}

/// Result of decoding a list: the elements that decoded and those that were skipped.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedList<T> {
    pub items: Vec<T>,
    pub skipped: Vec<Skipped>,
}

impl<T> DecodedList<T> {
    /// Split into the decoded elements and the record of what was skipped.
    pub fn into_parts(self) -> (Vec<T>, SkippedElements) {
        (self.items, SkippedElements(self.skipped))
    }
}

/// Elements a decoded record passed over inside one of its lists.
///
/// Kept on the record so callers can tell a lossy decode from a clean one.
/// It is never encoded, and two records that differ only here compare equal.
#[derive(Clone, Debug, Default)]
pub struct SkippedElements(Vec<Skipped>);

impl SkippedElements {
    pub fn as_slice(&self) -> &[Skipped] {
        &self.0
    }
}

impl std::ops::Deref for SkippedElements {
    type Target = [Skipped];

    fn deref(&self) -> &[Skipped] {
        &self.0
    }
}

impl From<Vec<Skipped>> for SkippedElements {
    fn from(skipped: Vec<Skipped>) -> SkippedElements {
        SkippedElements(skipped)
    }
}

impl PartialEq for SkippedElements {
    fn eq(&self, _other: &SkippedElements) -> bool {
        true
    }
}

impl Eq for SkippedElements {}

/// Decode every element of `buf`.
///
/// Elements with an unknown discriminant are skipped using their reported
/// length. A remainder too small for an element header, or an element whose
/// length is below the minimum or runs past the budget, is
/// `MalformedListLength`. Any other element error aborts the list.
pub fn parse_list<T: ListElement>(buf: &[u8]) -> Result<DecodedList<T>> {
    let mut items = Vec::with_capacity(buf.len() / T::MIN_SIZE);
    let mut skipped = vec![];
    let mut rest = buf;
    while !rest.is_empty() {
        let malformed = OfpError::MalformedListLength {
            family: T::FAMILY,
            remaining: rest.len(),
        };
        if rest.len() < T::MIN_SIZE {
            return Err(malformed);
        }
        let len = T::element_len(rest)?;
        if len < T::MIN_SIZE || len > rest.len() {
            return Err(malformed);
        }
        let (elem, tail) = rest.split_at(len);
        match T::parse(elem) {
            Ok(item) => items.push(item),
            Err(e) => {
                if !e.is_skippable() {
                    return Err(e);
                }
                debug!("skipping {} byte {} list element: {}", len, T::FAMILY, e);
                skipped.push(Skipped {
                    error: e,
                    len: len,
                });
            }
        }
        rest = tail;
    }
    Ok(DecodedList {
        items: items,
        skipped: skipped,
    })
}

/// Encoded size of a list, which is the sum of its element sizes.
pub fn size_of_list<T: ListElement>(items: &[T]) -> usize {
    items.iter().map(|item| item.size_of()).sum()
}

pub fn marshal_list<T: ListElement>(items: &[T], bytes: &mut Vec<u8>) {
    for item in items {
        item.marshal(bytes)
    }
}
