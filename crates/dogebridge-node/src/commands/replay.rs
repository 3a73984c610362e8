use anyhow::Context;
use dogebridge_codec::{PowHash, parse_header, scrypt_hash};
use dogebridge_primitives::{AccountId, BridgeConfig};
use dogebridge_relay::{AcceptAllChecker, HeaderRelay, HeaderStatus, LocalScryptChecker};
use serde::Serialize;
use std::path::PathBuf;

/// Replay headers through the relay.
///
/// The headers file holds one hex-encoded header per line, optionally followed by the
/// scrypt hash claimed for it in display order. Without a claim the actual scrypt hash is
/// submitted. Blank lines and lines starting with `#` are skipped.
#[derive(Debug, clap::Args)]
pub struct Replay {
    /// Path to the JSON bridge configuration.
    #[arg(long, short)]
    config: PathBuf,

    /// Path to the headers file.
    #[arg(long)]
    headers: PathBuf,

    /// Verify every claimed hash without computing scrypt.
    ///
    /// Only meaningful on development networks.
    #[arg(long)]
    accept_all: bool,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaySummary {
    /// Headers that passed the submission checks.
    pub submitted: usize,
    /// Headers refused at submission.
    pub refused: usize,
    /// Submitted headers accepted by the scrypt check.
    pub accepted: usize,
    /// Submitted headers rejected by the scrypt check.
    pub rejected: usize,
    pub best_height: u32,
    pub best_hash: String,
    pub chain_work: String,
}

impl Replay {
    pub fn run(&self) -> anyhow::Result<ReplaySummary> {
        let config = BridgeConfig::from_json_file(&self.config)
            .with_context(|| format!("Failed to load {}", self.config.display()))?;
        let headers = std::fs::read_to_string(&self.headers)
            .with_context(|| format!("Failed to read {}", self.headers.display()))?;

        let mut relay = HeaderRelay::new(&config)?;

        replay(&mut relay, config.scrypt_checker, &headers, self.accept_all)
    }
}

/// Submits every header of `headers` and settles its scrypt check right away, so that the
/// next line may build on it.
fn replay(
    relay: &mut HeaderRelay,
    scrypt_checker: AccountId,
    headers: &str,
    accept_all: bool,
) -> anyhow::Result<ReplaySummary> {
    let mut summary = ReplaySummary::default();

    for (index, line) in headers.lines().enumerate() {
        let line_number = index + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut fields = line.split_whitespace();
        let raw_header = fields
            .next()
            .map(hex::decode)
            .transpose()
            .with_context(|| format!("Line {line_number}: invalid header hex"))?
            .unwrap_or_default();

        let claimed_pow_hash = match fields.next() {
            Some(claimed) => PowHash::from_display_hex(claimed)
                .with_context(|| format!("Line {line_number}: invalid claimed hash"))?,
            None => match parse_header(&raw_header) {
                Ok(header) => scrypt_hash(&header.pow_header_bytes()),
                Err(err) => {
                    tracing::warn!("Line {line_number}: {err}");
                    summary.refused += 1;
                    continue;
                }
            },
        };

        let block_hash = match relay.submit_header(&raw_header, claimed_pow_hash) {
            Ok(block_hash) => block_hash,
            Err(err) => {
                tracing::warn!("Line {line_number}: header refused: {err}");
                summary.refused += 1;
                continue;
            }
        };
        summary.submitted += 1;

        if accept_all {
            relay.run_scrypt_checks(scrypt_checker, &AcceptAllChecker)?;
        } else {
            relay.run_scrypt_checks(scrypt_checker, &LocalScryptChecker)?;
        }

        match relay.status(&block_hash) {
            Some(HeaderStatus::Accepted) => summary.accepted += 1,
            Some(HeaderStatus::Rejected) | None => summary.rejected += 1,
            status => tracing::warn!(?block_hash, ?status, "Header left unresolved"),
        }
    }

    let tip = relay.best_tip();
    summary.best_height = tip.height;
    summary.best_hash = tip.hash.to_string();
    summary.chain_work = tip.chain_work.to_string();

    tracing::info!(
        "Replayed {} headers, best tip {tip}",
        summary.submitted + summary.refused
    );

    Ok(summary)
}
