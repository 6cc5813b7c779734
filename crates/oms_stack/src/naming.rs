//! Deterministic logical ids and generated physical names.
//!
//! Nothing here reads the clock or a random source, so synthesizing the same
//! context twice yields byte-identical templates.

use sha2::{Digest, Sha256};

pub const MAX_LOGICAL_ID_LEN: usize = 255;
pub const LOGICAL_ID_HASH_LEN: usize = 8;
pub const PHYSICAL_NAME_HASH_LEN: usize = 12;
pub const MAX_BUCKET_NAME_LEN: usize = 63;
pub const MAX_TABLE_NAME_LEN: usize = 255;

fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Logical id for a construct path, e.g. `["AgenticOmsDataBucket"]` becomes
/// `AgenticOmsDataBucket` followed by an 8-digit uppercase hash of the path.
pub fn logical_id(path: &[&str]) -> String {
    let human: String = path
        .iter()
        .flat_map(|segment| segment.chars())
        .filter(char::is_ascii_alphanumeric)
        .take(MAX_LOGICAL_ID_LEN - LOGICAL_ID_HASH_LEN)
        .collect();
    let hash = sha256_hex(&path.join("/")).to_ascii_uppercase();
    format!("{human}{}", &hash[..LOGICAL_ID_HASH_LEN])
}

/// Generated name for resources whose physical name is not pinned.
///
/// Layout is `<stack>-<construct>-<hash>`; the human part is truncated so the
/// result never exceeds `max_len`.
pub fn physical_name(
    stack_id: &str,
    construct_id: &str,
    account: &str,
    region: Option<&str>,
    max_len: usize,
    lowercase: bool,
) -> String {
    let hash = sha256_hex(&format!(
        "{stack_id}/{construct_id}/{account}/{}",
        region.unwrap_or_default()
    ));
    let hash = &hash[..PHYSICAL_NAME_HASH_LEN];

    let budget = max_len.saturating_sub(PHYSICAL_NAME_HASH_LEN + 1);
    let mut human: String = format!("{stack_id}-{construct_id}")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .take(budget)
        .collect();
    if lowercase {
        human.make_ascii_lowercase();
    }
    let human = human.trim_matches('-');

    if human.is_empty() {
        hash.to_string()
    } else {
        format!("{human}-{hash}")
    }
}
