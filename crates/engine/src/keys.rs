//! Cache key composition
//!
//! Keys are colon-joined: `reco:{version}:{kind}:{subject}:{limit}` plus
//! trailing segments for anything else that changes the result (filters,
//! rerank flag). Invalidation works on prefixes, so segment order goes from
//! most stable to most specific.

use crate::request::RecoRequest;
use reco_core::RecoKind;

/// Escape a caller-supplied segment so it cannot introduce delimiters
///
/// Ids and filter values are free-form strings; a literal `:` would let one
/// subject's key alias another's, or let `subject_prefix` sweep a stranger's
/// entries. Percent-encodes `%` and `:` only.
fn escape(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for c in segment.chars() {
        match c {
            '%' => out.push_str("%25"),
            ':' => out.push_str("%3a"),
            other => out.push(other),
        }
    }
    out
}

/// Build the full cache key for a request
pub fn reco_key(version: &str, request: &RecoRequest) -> String {
    let mut key = format!(
        "reco:{}:{}:{}:{}",
        version,
        request.kind.as_str(),
        escape(&request.subject),
        request.limit
    );
    if let Some(brand) = &request.brand {
        key.push_str(":brand=");
        key.push_str(&escape(brand));
    }
    if let Some(category) = &request.category_id {
        key.push_str(":cat=");
        key.push_str(&escape(category));
    }
    if request.rerank {
        key.push_str(":rr");
    }
    key
}

/// Prefix covering every key for one (kind, subject) pair
///
/// Used to drop all cached variants (any limit, filters, rerank flag) of a
/// product's recommendations after a purchase touches it.
pub fn subject_prefix(version: &str, kind: RecoKind, subject: &str) -> String {
    format!("reco:{}:{}:{}:", version, kind.as_str(), escape(subject))
}

/// Prefix covering every key of one kind, regardless of subject
pub fn kind_prefix(version: &str, kind: RecoKind) -> String {
    format!("reco:{}:{}:", version, kind.as_str())
}
