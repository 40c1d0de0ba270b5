//! Offline exit verification
//!
//! Mirrors the root manager's checks up to (but not including) settlement:
//! header lookup, proof verification and predicate validation of the
//! extracted log.

use std::fs;
use std::path::Path;

use alloy_primitives::{Address, B256};
use bridge::{
    AssetTypeTag, BridgeError, CheckpointHeader, CheckpointStore, ExitProof, LogEntry, Predicate,
    TokenPredicate,
};
use eyre::{eyre, Result, WrapErr};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Load checkpoint headers exported as a JSON array.
///
/// Headers may appear in any order; they are stored by ascending id.
pub fn load_checkpoints(path: &Path) -> Result<CheckpointStore> {
    let raw = fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read checkpoints from {}", path.display()))?;
    parse_checkpoints(&raw)
}

pub fn parse_checkpoints(raw: &str) -> Result<CheckpointStore> {
    let mut headers: Vec<CheckpointHeader> =
        serde_json::from_str(raw).wrap_err("Invalid checkpoints JSON")?;
    headers.sort_by_key(|h| h.header_id);

    let mut store = CheckpointStore::new();
    for header in headers {
        store
            .submit(header)
            .wrap_err_with(|| format!("Rejected checkpoint {}", header.header_id))?;
    }
    debug!(count = store.len(), "checkpoints loaded");
    Ok(store)
}

/// Decode a hex wire-format exit proof (with or without `0x`).
pub fn parse_proof(hex_proof: &str) -> Result<ExitProof> {
    let trimmed = hex_proof.trim();
    let stripped = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    let raw = hex::decode(stripped).map_err(|e| eyre!("Invalid proof hex: {e}"))?;
    ExitProof::decode(&raw).map_err(|e| eyre!("{e}"))
}

/// Outcome of checking one exit proof
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExitReport {
    pub exit_id: B256,
    pub header_id: u64,
    pub block_number: u64,
    pub log_index: u64,
    pub withdrawer: Address,
    pub asset_type: AssetTypeTag,
    /// Proven log, present once inclusion verification succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log: Option<LogEntry>,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Check `proof` as an exit of `asset_type` by `withdrawer`.
pub fn check_exit(
    checkpoints: &CheckpointStore,
    proof: &ExitProof,
    withdrawer: Address,
    asset_type: AssetTypeTag,
) -> ExitReport {
    let mut report = ExitReport {
        exit_id: proof.exit_id(),
        header_id: proof.header_id,
        block_number: proof.block_number,
        log_index: proof.log_index,
        withdrawer,
        asset_type,
        log: None,
        valid: false,
        error: None,
    };

    let verified = match checkpoints
        .get(proof.header_id)
        .and_then(|header| proof.verify(header))
    {
        Ok(verified) => verified,
        Err(err) => {
            warn!(exit_id = %report.exit_id, error = %err, "proof verification failed");
            report.error = Some(err.to_string());
            return report;
        }
    };

    // Predicates validate without touching custody, so the address is irrelevant
    let predicate = Predicate::new(asset_type, Address::ZERO);
    let outcome: Result<(), BridgeError> = predicate.validate_exit_log(withdrawer, &verified.log);
    report.log = Some(verified.log);
    match outcome {
        Ok(()) => {
            info!(exit_id = %report.exit_id, %withdrawer, %asset_type, "exit is valid");
            report.valid = true;
        }
        Err(err) => {
            warn!(exit_id = %report.exit_id, error = %err, "burn log rejected");
            report.error = Some(err.to_string());
        }
    }
    report
}

impl ExitReport {
    /// One line per field for terminal output
    pub fn to_text(&self) -> String {
        let mut lines = vec![
            format!("exit id:      {}", self.exit_id),
            format!("header id:    {}", self.header_id),
            format!("block:        {}", self.block_number),
            format!("log index:    {}", self.log_index),
            format!("withdrawer:   {}", self.withdrawer),
            format!("asset type:   {}", self.asset_type),
        ];
        if let Some(log) = &self.log {
            lines.push(format!("emitter:      {}", log.emitter));
        }
        lines.push(format!(
            "result:       {}",
            if self.valid { "VALID" } else { "INVALID" }
        ));
        if let Some(error) = &self.error {
            lines.push(format!("error:        {error}"));
        }
        lines.join("\n")
    }
}
