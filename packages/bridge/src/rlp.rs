//! Borrowing RLP item walker over `alloy_rlp::Header`.
//!
//! Trie nodes and receipts are inspected item by item without copying; each
//! item keeps its raw encoding so inline child nodes can be walked directly.

use alloy_rlp::Header;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RlpItem<'a> {
    pub list: bool,
    /// Item content without its header
    pub payload: &'a [u8],
    /// Full encoding including the header
    pub raw: &'a [u8],
}

/// Read the next item from `buf`, advancing past it.
pub(crate) fn next_item<'a>(buf: &mut &'a [u8]) -> Result<RlpItem<'a>, alloy_rlp::Error> {
    let start: &'a [u8] = buf;
    let header = Header::decode(buf)?;
    if buf.len() < header.payload_length {
        return Err(alloy_rlp::Error::InputTooShort);
    }
    let (payload, rest) = buf.split_at(header.payload_length);
    *buf = rest;
    let raw = &start[..start.len() - rest.len()];
    Ok(RlpItem {
        list: header.list,
        payload,
        raw,
    })
}

/// Decode `raw` as exactly one list and return its items.
pub(crate) fn decode_list(raw: &[u8]) -> Result<Vec<RlpItem<'_>>, alloy_rlp::Error> {
    let mut buf = raw;
    let outer = next_item(&mut buf)?;
    if !outer.list {
        return Err(alloy_rlp::Error::UnexpectedString);
    }
    if !buf.is_empty() {
        return Err(alloy_rlp::Error::Custom("trailing bytes after list"));
    }

    let mut payload = outer.payload;
    let mut items = Vec::new();
    while !payload.is_empty() {
        items.push(next_item(&mut payload)?);
    }
    Ok(items)
}

/// Decode the items of an item already known to be a list.
pub(crate) fn list_items<'a>(item: &RlpItem<'a>) -> Result<Vec<RlpItem<'a>>, alloy_rlp::Error> {
    if !item.list {
        return Err(alloy_rlp::Error::UnexpectedString);
    }
    let mut payload = item.payload;
    let mut items = Vec::new();
    while !payload.is_empty() {
        items.push(next_item(&mut payload)?);
    }
    Ok(items)
}
