//! Storage key generation.
//!
//! Original keys: `{yyyy}/{mm}/{token}-{sanitized-name}`. The token is 28 hex
//! characters: 16 from the nanosecond clock, 4 from a process-wide sequence and
//! 8 random. Two calls in the same process never yield the same token because
//! the sequence advances on every call and the clock only moves forward.

use chrono::{Datelike, Utc};
use std::sync::atomic::{AtomicU64, Ordering};

/// Extension used for every rendition.
pub const VARIANT_EXTENSION: &str = "webp";

const MAX_NAME_LEN: usize = 100;

static SEQUENCE: AtomicU64 = AtomicU64::new(0);
static LAST_NANOS: AtomicU64 = AtomicU64::new(0);

/// Strictly increasing nanosecond stamp for this process.
fn monotonic_nanos() -> u64 {
    let now = Utc::now()
        .timestamp_nanos_opt()
        .map(|n| n as u64)
        .unwrap_or_default();
    let mut last = LAST_NANOS.load(Ordering::Relaxed);
    loop {
        let next = now.max(last + 1);
        match LAST_NANOS.compare_exchange_weak(last, next, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return next,
            Err(actual) => last = actual,
        }
    }
}

/// Generate a fresh storage key for an uploaded file.
pub fn new_key(original_name: &str) -> String {
    let now = Utc::now();
    let nanos = monotonic_nanos();
    let seq = (SEQUENCE.fetch_add(1, Ordering::Relaxed) & 0xffff) as u16;
    let random: u32 = rand::random();

    format!(
        "{:04}/{:02}/{:016x}{:04x}{:08x}-{}",
        now.year(),
        now.month(),
        nanos,
        seq,
        random,
        sanitize_filename(original_name)
    )
}

/// Key of a named rendition of `storage_key`: `{dir}/{stem}_{variant}.webp`.
pub fn variant_key(storage_key: &str, variant_name: &str) -> String {
    let (dir, file) = match storage_key.rfind('/') {
        Some(idx) => (&storage_key[..=idx], &storage_key[idx + 1..]),
        None => ("", storage_key),
    };
    let stem = match file.rfind('.') {
        Some(idx) if idx > 0 => &file[..idx],
        _ => file,
    };
    format!("{}{}_{}.{}", dir, stem, variant_name, VARIANT_EXTENSION)
}

/// Reduce a client-supplied filename to a safe key segment.
///
/// Directory components are dropped, the name is lower-cased, anything outside
/// `[a-z0-9._-]` becomes `-`, dash and dot runs collapse, leading/trailing `-`
/// and `.` are trimmed. Falls back to `file` when nothing is left.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename)
        .to_lowercase();

    let mut out = String::with_capacity(base.len());
    for c in base.chars() {
        let mapped = if c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-' {
            c
        } else {
            '-'
        };
        if (mapped == '-' || mapped == '.') && out.ends_with(mapped) {
            continue;
        }
        out.push(mapped);
    }

    let trimmed: String = out
        .trim_matches(|c| c == '-' || c == '.')
        .chars()
        .take(MAX_NAME_LEN)
        .collect();
    let trimmed = trimmed.trim_end_matches(['-', '.']);

    if trimmed.is_empty() {
        "file".to_string()
    } else {
        trimmed.to_string()
    }
}
