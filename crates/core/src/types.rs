//! Identifier and time types
//!
//! This module defines the foundational identifiers:
//! - ProductId / UserId: opaque string identifiers owned by the caller
//! - TransactionId: UUID v4 identifying a completed purchase transaction
//! - Timestamp: microseconds since the Unix epoch
//! - RecoKind: discriminates the recommendation kinds
//! - EmbeddingSpace: which vector sub-space a product text embeds into

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Opaque product identifier
///
/// Products are owned externally; the engine only ever sees their ids plus
/// optional catalog metadata. The id's total order (lexicographic) is the
/// deterministic tie-break used by every ranking path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Create a product id from any string-like value
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// View the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ProductId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ProductId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Opaque user identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Create a user id from any string-like value
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// View the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Unique identifier for a purchase transaction
///
/// A TransactionId is a wrapper around a UUID v4. The co-purchase graph does
/// not deduplicate by transaction; the id exists so an upstream event
/// consumer can deduplicate redelivered events before calling in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId(Uuid);

impl TransactionId {
    /// Create a new random TransactionId using UUID v4
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a TransactionId from a string representation
    ///
    /// Accepts standard UUID format (with or without hyphens).
    /// Returns None if the string is not a valid UUID.
    pub fn from_string(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Timestamp
// ============================================================================

/// Microseconds since the Unix epoch
///
/// Used for activity recency ordering and sales window derivation.
/// Microsecond resolution keeps event ordering stable without depending on
/// wall-clock formatting.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Unix epoch (1970-01-01 00:00:00 UTC)
    pub const EPOCH: Timestamp = Timestamp(0);

    /// Create a timestamp for the current moment
    ///
    /// Uses system time. Returns epoch (0) if the system clock is before the
    /// Unix epoch (e.g. clock went backwards due to NTP adjustment).
    pub fn now() -> Self {
        let duration = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Timestamp(duration.as_micros() as u64)
    }

    /// Create a timestamp from microseconds since epoch
    #[inline]
    pub const fn from_micros(micros: u64) -> Self {
        Timestamp(micros)
    }

    /// Create a timestamp from milliseconds since epoch
    #[inline]
    pub const fn from_millis(millis: u64) -> Self {
        Timestamp(millis.saturating_mul(1_000))
    }

    /// Create a timestamp from seconds since epoch
    #[inline]
    pub const fn from_secs(secs: u64) -> Self {
        Timestamp(secs.saturating_mul(1_000_000))
    }

    /// Create a timestamp from a chrono UTC datetime
    ///
    /// Datetimes before the epoch clamp to `EPOCH`.
    pub fn from_datetime(dt: chrono::DateTime<chrono::Utc>) -> Self {
        Timestamp(dt.timestamp_micros().max(0) as u64)
    }

    /// Microseconds since epoch
    #[inline]
    pub const fn as_micros(&self) -> u64 {
        self.0
    }

    /// Whole seconds since epoch
    #[inline]
    pub const fn as_secs(&self) -> u64 {
        self.0 / 1_000_000
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}us", self.0)
    }
}

// ============================================================================
// Recommendation kinds
// ============================================================================

/// The supported recommendation kinds
///
/// Each kind maps to one compute path in the engine; the string forms are
/// used in cache keys and must stay stable across releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecoKind {
    /// Substitutable products (vector similarity)
    Similar,
    /// Used-together products (complementary vectors, cross-sell fallback)
    Complementary,
    /// Products most often purchased together (co-purchase graph)
    CrossSell,
    /// Best sellers over the active sales window
    TopSales,
    /// Per-user recently viewed products (recency order, never reranked)
    LastSeen,
}

impl RecoKind {
    /// Stable string form used in cache keys and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            RecoKind::Similar => "similar",
            RecoKind::Complementary => "complementary",
            RecoKind::CrossSell => "x-sell",
            RecoKind::TopSales => "top-sales",
            RecoKind::LastSeen => "last-seen",
        }
    }
}

impl fmt::Display for RecoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecoKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "similar" => Ok(RecoKind::Similar),
            "complementary" => Ok(RecoKind::Complementary),
            "x-sell" | "xsell" => Ok(RecoKind::CrossSell),
            "top-sales" => Ok(RecoKind::TopSales),
            "last-seen" => Ok(RecoKind::LastSeen),
            other => Err(format!("unknown recommendation kind: {}", other)),
        }
    }
}

/// Vector sub-space a product embeds into
///
/// Similar and complementary recommendations use differently-phrased
/// embedding texts, so each product may hold one vector per space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmbeddingSpace {
    /// Substitutability representation
    Similar,
    /// Co-usage representation
    Complementary,
}

impl EmbeddingSpace {
    /// Stable string form used in logs and store naming
    pub fn as_str(&self) -> &'static str {
        match self {
            EmbeddingSpace::Similar => "similar",
            EmbeddingSpace::Complementary => "complementary",
        }
    }
}

impl fmt::Display for EmbeddingSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_id_ordering_is_lexicographic() {
        let a = ProductId::from("P1");
        let b = ProductId::from("P2");
        assert!(a < b);
    }

    #[test]
    fn test_transaction_id_roundtrip() {
        let id = TransactionId::new();
        let parsed = TransactionId::from_string(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_transaction_id_rejects_garbage() {
        assert!(TransactionId::from_string("not-a-uuid").is_none());
    }

    #[test]
    fn test_timestamp_conversions() {
        assert_eq!(Timestamp::from_secs(2).as_micros(), 2_000_000);
        assert_eq!(Timestamp::from_millis(5).as_micros(), 5_000);
        assert_eq!(Timestamp::from_micros(42).as_secs(), 0);
    }

    #[test]
    fn test_timestamp_now_is_after_epoch() {
        assert!(Timestamp::now() > Timestamp::EPOCH);
    }

    #[test]
    fn test_kind_string_roundtrip() {
        for kind in [
            RecoKind::Similar,
            RecoKind::Complementary,
            RecoKind::CrossSell,
            RecoKind::TopSales,
            RecoKind::LastSeen,
        ] {
            assert_eq!(kind.as_str().parse::<RecoKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_kind_parse_rejects_unknown() {
        assert!("upsell-ish".parse::<RecoKind>().is_err());
    }

    #[test]
    fn test_serde_transparent_ids() {
        let id = ProductId::from("P42");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"P42\"");
    }
}
