//! Per-entity feature extraction.
//!
//! Two independent representations are built for every entity:
//!
//! - **Candidate keys**: whole normalized field values plus their tokens
//!   (length >= 3). Used only for exact and substring checks.
//! - **Token set**: tokens (length >= 2) expanded with `0x`/`zerox` alternate
//!   forms and adjacent-pair concatenations. Used only for Jaccard similarity.

use std::collections::HashSet;

use crate::core::applicant::ApplicantRecord;
use crate::matching::normalize::{clean_handle, normalize};

/// Minimum length of a candidate key or candidate-key token
pub const MIN_KEY_LEN: usize = 3;

/// Minimum length of a token produced by [`extract_tokens`]
pub const MIN_TOKEN_LEN: usize = 2;

/// Precomputed features for one eligible applicant
#[derive(Debug, Clone)]
pub struct ApplicantFeatures {
    /// Position of the record in the applicant list it was built from
    pub index: usize,

    /// The source record
    pub record: ApplicantRecord,

    /// Cleaned handle, as stored in assignments
    pub handle: String,

    /// Lowercased handle used for claiming and lookup
    pub handle_key: String,

    /// Normalized identity fields and their tokens, for exact and substring hits
    pub keys: HashSet<String>,

    /// Expanded token set, for Jaccard similarity
    pub tokens: HashSet<String>,
}

impl ApplicantFeatures {
    /// Build features for a record, or `None` if it exposes no usable handle.
    #[must_use]
    pub fn build(index: usize, record: &ApplicantRecord) -> Option<Self> {
        let handle = record.handle()?;
        let fields = identity_fields(record);
        Some(Self {
            index,
            handle_key: crate::core::applicant::handle_key(&handle),
            handle,
            keys: build_candidate_keys(&fields),
            tokens: build_token_set(&fields),
            record: record.clone(),
        })
    }
}

/// Precomputed features for one roster member
#[derive(Debug, Clone)]
pub struct MemberFeatures {
    pub name: String,

    /// `normalize(name)`
    pub key: String,

    /// Expanded token set of the display name
    pub tokens: HashSet<String>,
}

impl MemberFeatures {
    #[must_use]
    pub fn build(name: &str) -> Self {
        Self {
            name: name.to_string(),
            key: normalize(name),
            tokens: build_token_set(&[name.to_string()]),
        }
    }
}

/// The raw field values that identify an applicant, after per-field cleanup.
///
/// Discord discriminators (`name#1234`), leading `@` on telegram and twitch,
/// and the email domain are removed; twitter and x are reduced to bare handles.
#[must_use]
pub fn identity_fields(record: &ApplicantRecord) -> Vec<String> {
    let strip_at = |s: &str| s.trim().trim_start_matches('@').to_string();

    let candidates = [
        record.full_name.clone(),
        record.name.clone(),
        record.username.clone(),
        record.handle.clone(),
        record
            .discord
            .as_deref()
            .map(|d| d.split('#').next().unwrap_or_default().to_string()),
        record.telegram.as_deref().map(strip_at),
        record.twitter.as_deref().map(clean_handle),
        record.x.as_deref().map(clean_handle),
        record
            .email
            .as_deref()
            .map(|e| e.split('@').next().unwrap_or_default().to_string()),
        record.twitch.as_deref().map(strip_at),
        record.wallet_address.clone(),
    ];

    candidates
        .into_iter()
        .flatten()
        .filter(|s| !s.trim().is_empty())
        .collect()
}

/// Split free text into normalized tokens.
///
/// `#`, `@` and URLs are blanked out, the remainder is split on runs of
/// whitespace, `.`, `_` and `-`, and each piece is normalized. Tokens shorter
/// than [`MIN_TOKEN_LEN`] are dropped. Order of first appearance is kept.
#[must_use]
pub fn extract_tokens(raw: &str) -> Vec<String> {
    let without_urls: Vec<&str> = raw
        .split_whitespace()
        .filter(|word| !is_url(word))
        .collect();
    let text = without_urls.join(" ").replace(['#', '@'], " ");

    text.split(|c: char| c.is_whitespace() || matches!(c, '.' | '_' | '-'))
        .map(normalize)
        .filter(|t| t.len() >= MIN_TOKEN_LEN)
        .collect()
}

fn is_url(word: &str) -> bool {
    let lower = word.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("www.")
}

/// Insert `token` and its `0x` / `zerox` alternate spellings.
pub fn expand_alt_forms(set: &mut TokenList, token: &str) {
    set.insert(token);
    if let Some(rest) = token.strip_prefix("0x") {
        if !rest.is_empty() {
            set.insert(rest);
            set.insert(&format!("zerox{rest}"));
        }
    } else if let Some(rest) = token.strip_prefix("zerox") {
        if !rest.is_empty() {
            set.insert(rest);
            set.insert(&format!("0x{rest}"));
        }
    }
}

/// Candidate keys for a set of field values. Not alt-form expanded.
#[must_use]
pub fn build_candidate_keys(fields: &[String]) -> HashSet<String> {
    let mut keys = HashSet::new();
    for field in fields {
        let whole = normalize(field);
        if whole.len() >= MIN_KEY_LEN {
            keys.insert(whole);
        }
        keys.extend(
            extract_tokens(field)
                .into_iter()
                .filter(|t| t.len() >= MIN_KEY_LEN),
        );
    }
    keys
}

/// Token set for a set of field values, with alternate forms and joins.
///
/// After every field's tokens are expanded, each adjacent pair in insertion
/// order also contributes its (expanded) concatenation, so `"juan perez"`
/// and `"juanperez"` share a token.
#[must_use]
pub fn build_token_set(fields: &[String]) -> HashSet<String> {
    let mut list = TokenList::default();
    for field in fields {
        for token in extract_tokens(field) {
            expand_alt_forms(&mut list, &token);
        }
    }

    let ordered = list.items.clone();
    for pair in ordered.windows(2) {
        expand_alt_forms(&mut list, &format!("{}{}", pair[0], pair[1]));
    }

    list.seen
}

/// Insertion-ordered set of tokens
#[derive(Debug, Default)]
pub struct TokenList {
    items: Vec<String>,
    seen: HashSet<String>,
}

impl TokenList {
    pub fn insert(&mut self, token: &str) {
        if self.seen.insert(token.to_string()) {
            self.items.push(token.to_string());
        }
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.items
    }
}
