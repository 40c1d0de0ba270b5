//! Receipt log extraction
//!
//! A receipt is `rlp([status, cumulativeGasUsed, logsBloom, logs])`, optionally
//! preceded by a single transaction-type byte. Each log is
//! `rlp([address, [topic0, ...], data])`. Only structure is checked here; what
//! a log means is up to the predicate that consumes it.

use alloy_primitives::{Address, Bytes, B256, LogData};
use serde::{Deserialize, Serialize};

use crate::error::BridgeError;
use crate::rlp::{decode_list, list_items, RlpItem};

const LOGS_POSITION: usize = 3;

/// One event log recovered from a verified receipt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Contract that emitted the log
    pub emitter: Address,
    /// `topics[0]` is the event signature hash
    pub topics: Vec<B256>,
    pub data: Bytes,
}

impl LogEntry {
    pub fn new(emitter: Address, log: LogData) -> Self {
        let (topics, data) = log.split();
        Self {
            emitter,
            topics,
            data,
        }
    }

    pub fn topic(&self, index: usize) -> Option<&B256> {
        self.topics.get(index)
    }
}

/// Strip the EIP-2718 type byte if present.
fn receipt_body(receipt: &[u8]) -> &[u8] {
    match receipt.first() {
        Some(&first) if first < 0x80 => &receipt[1..],
        _ => receipt,
    }
}

fn malformed(reason: impl std::fmt::Display) -> BridgeError {
    BridgeError::invalid_proof(format!("malformed receipt: {reason}"))
}

fn decode_log(item: &RlpItem<'_>) -> Result<LogEntry, BridgeError> {
    let fields = list_items(item).map_err(malformed)?;
    let [address, topics, data] = fields.as_slice() else {
        return Err(malformed(format!("log has {} fields", fields.len())));
    };

    if address.list || address.payload.len() != 20 {
        return Err(malformed("log address is not 20 bytes"));
    }
    let topics = list_items(topics)
        .map_err(malformed)?
        .iter()
        .map(|topic| {
            if topic.list || topic.payload.len() != 32 {
                Err(malformed("log topic is not 32 bytes"))
            } else {
                Ok(B256::from_slice(topic.payload))
            }
        })
        .collect::<Result<Vec<_>, _>>()?;
    if data.list {
        return Err(malformed("log data is a list"));
    }

    Ok(LogEntry {
        emitter: Address::from_slice(address.payload),
        topics,
        data: Bytes::copy_from_slice(data.payload),
    })
}

fn log_items(receipt: &[u8]) -> Result<Vec<RlpItem<'_>>, BridgeError> {
    let fields = decode_list(receipt_body(receipt)).map_err(malformed)?;
    let logs = fields
        .get(LOGS_POSITION)
        .ok_or_else(|| malformed(format!("receipt has {} fields", fields.len())))?;
    list_items(logs).map_err(malformed)
}

/// Decode every log of `receipt`.
pub fn decode_logs(receipt: &[u8]) -> Result<Vec<LogEntry>, BridgeError> {
    log_items(receipt)?.iter().map(decode_log).collect()
}

/// Decode the log at `log_index` of `receipt`.
pub fn extract_log(receipt: &[u8], log_index: u64) -> Result<LogEntry, BridgeError> {
    let logs = log_items(receipt)?;
    let item = usize::try_from(log_index)
        .ok()
        .and_then(|i| logs.get(i))
        .ok_or(BridgeError::IndexOutOfRange {
            index: log_index,
            len: logs.len(),
        })?;
    decode_log(item)
}
