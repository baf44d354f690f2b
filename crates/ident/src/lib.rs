//! Resource identifier utilities for CBC Bridge.
//!
//! Bundle resources need a fresh unique identifier on every build, and
//! externally captured sample identifiers need sanitizing before they can be
//! used as resource-local ids. Both concerns live here so the bundle builder
//! can take identifier generation as an injected capability instead of
//! calling a global generator — tests substitute a deterministic generator
//! and get reproducible bundles.
//!
//! ## Identifier form
//! Generated identifiers are `<prefix>-<8 lowercase hex>`, where the hex
//! suffix is the head of a freshly drawn v4 UUID in simple form. Example:
//! `obs-1a2b3c4d`.

use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Characters beyond alphanumerics that survive identifier sanitization.
const ID_EXTRA_CHARS: &str = "-._";

/// Length of the random hex suffix on generated identifiers.
const SUFFIX_LEN: usize = 8;

/// Capability for minting fresh resource identifiers.
///
/// The bundle builder calls this once per resource it emits. Identifiers
/// must be unique within one process; they are never persisted or looked up
/// externally.
pub trait IdGenerator {
    /// Returns a new identifier of the form `<prefix>-<suffix>`.
    fn generate(&self, prefix: &str) -> String;
}

/// Production generator backed by random v4 UUIDs.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn generate(&self, prefix: &str) -> String {
        let hex = Uuid::new_v4().simple().to_string();
        format!("{prefix}-{}", &hex[..SUFFIX_LEN])
    }
}

/// Deterministic generator for tests and reproducible output.
///
/// Emits `<prefix>-1`, `<prefix>-2`, ... across all prefixes, in call order.
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    next: AtomicU64,
}

impl SequentialIdGenerator {
    /// Creates a generator whose first identifier carries suffix `1`.
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn generate(&self, prefix: &str) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{prefix}-{n}")
    }
}

/// Strips an externally supplied identifier down to `[A-Za-z0-9-._]`.
///
/// Sample identifiers come off OCR text and routinely carry `/` or `,`
/// separators that are not valid in a resource id. Disallowed characters are
/// dropped, not replaced, so `AB/1234,X` becomes `AB1234X`.
pub fn sanitize_identifier(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_alphanumeric() || ID_EXTRA_CHARS.contains(*c))
        .collect()
}
