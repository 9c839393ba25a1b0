//! Pattern codec: canonical on-disk JSON and content fingerprints.
//!
//! The disk representation is pretty-printed JSON with a stable key order
//! (slug, title, content, modified_at) so that re-encoding the same logical
//! pattern yields byte-identical output apart from `modified_at`. Equality
//! between stores is decided by a SHA-256 fingerprint of the trimmed
//! content, never by byte comparison, so trailing-whitespace drift does not
//! count as divergence.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::model::slugify;

/// Canonical on-disk form of a pattern.
///
/// Field order here is the key order in the encoded file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternFile {
    /// URL-safe identifier; also the file stem.
    pub slug: String,
    /// Human-readable title.
    pub title: String,
    /// Opaque markup payload.
    pub content: String,
    /// Set on every real disk write; never part of any comparison.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<String>,
}

/// A validated pattern draft decoded from an upload or a disk file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternDraft {
    pub slug: String,
    pub title: String,
    pub content: String,
}

/// Raw draft as it appears in an upload.
///
/// Key names vary by integration layer: the original export format uses
/// `post_name`/`post_title`/`post_content`, newer files use the bare names.
/// Both are accepted; everything is canonicalized here at the boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDraft {
    #[serde(default, alias = "post_name")]
    pub slug: Option<String>,
    #[serde(default, alias = "post_title")]
    pub title: Option<String>,
    #[serde(default, alias = "post_content")]
    pub content: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum UploadPayload {
    Many(Vec<RawDraft>),
    One(RawDraft),
}

impl RawDraft {
    /// Validate required fields and canonicalize into a `PatternDraft`.
    ///
    /// `slug` and `content` are required; `title` defaults to the slug.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidPattern` naming the missing field.
    pub fn validate(self) -> Result<PatternDraft> {
        let raw_slug = self.slug.ok_or_else(|| Error::InvalidPattern {
            slug: None,
            message: "missing required field `slug`".to_string(),
        })?;
        let slug = slugify(&raw_slug);
        if slug.is_empty() {
            return Err(Error::InvalidPattern {
                slug: Some(raw_slug),
                message: "slug is empty after normalization".to_string(),
            });
        }
        let content = self.content.ok_or_else(|| Error::InvalidPattern {
            slug: Some(slug.clone()),
            message: "missing required field `content`".to_string(),
        })?;
        let title = match self.title {
            Some(t) if !t.trim().is_empty() => t,
            _ => slug.clone(),
        };
        Ok(PatternDraft { slug, title, content })
    }
}

/// Encode a pattern to its canonical on-disk bytes.
///
/// Pretty-printed, stable key order, slashes unescaped, trailing newline.
///
/// # Errors
///
/// Returns an error if serialization fails (it does not for these types).
pub fn encode(file: &PatternFile) -> Result<String> {
    let mut out = serde_json::to_string_pretty(file)?;
    out.push('\n');
    Ok(out)
}

/// Decode an upload payload into raw drafts.
///
/// Accepts a JSON array of pattern objects or a single object, which
/// auto-wraps into a one-element batch, an ergonomic affordance for
/// hand-made files. Draft-level validation is separate (`RawDraft::validate`)
/// so one bad record in a batch does not reject the rest.
///
/// # Errors
///
/// Returns `Error::Decode` if the bytes are not JSON of either shape.
pub fn decode(bytes: &[u8]) -> Result<Vec<RawDraft>> {
    let payload: UploadPayload =
        serde_json::from_slice(bytes).map_err(|e| Error::Decode(e.to_string()))?;
    Ok(match payload {
        UploadPayload::Many(drafts) => drafts,
        UploadPayload::One(draft) => vec![draft],
    })
}

/// Decode and validate a single pattern file read from disk.
///
/// # Errors
///
/// Returns `Error::InvalidPattern` for malformed JSON or missing fields.
pub fn decode_file(bytes: &[u8]) -> Result<PatternDraft> {
    let raw: RawDraft = serde_json::from_slice(bytes).map_err(|e| Error::InvalidPattern {
        slug: None,
        message: e.to_string(),
    })?;
    raw.validate()
}

/// Compute the content fingerprint: SHA-256 hex of the trimmed content.
///
/// A change-detection checksum, not a security primitive. Trimming first
/// keeps trivial leading/trailing whitespace from reading as divergence.
#[must_use]
pub fn fingerprint(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.trim().as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_stable_key_order() {
        let file = PatternFile {
            slug: "hero".into(),
            title: "Hero".into(),
            content: "<p>a/b</p>".into(),
            modified_at: Some("2025-01-20T10:00:00+00:00".into()),
        };
        let encoded = encode(&file).unwrap();

        let slug_pos = encoded.find("\"slug\"").unwrap();
        let title_pos = encoded.find("\"title\"").unwrap();
        let content_pos = encoded.find("\"content\"").unwrap();
        let modified_pos = encoded.find("\"modified_at\"").unwrap();
        assert!(slug_pos < title_pos && title_pos < content_pos && content_pos < modified_pos);

        // Slashes stay unescaped, output ends with a newline
        assert!(encoded.contains("<p>a/b</p>"));
        assert!(encoded.ends_with('\n'));
    }

    #[test]
    fn test_encode_deterministic_modulo_modified_at() {
        let make = |modified: &str| PatternFile {
            slug: "hero".into(),
            title: "Hero".into(),
            content: "<p>Hi</p>".into(),
            modified_at: Some(modified.into()),
        };
        let a = encode(&make("2025-01-01T00:00:00+00:00")).unwrap();
        let b = encode(&make("2025-01-01T00:00:00+00:00")).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_decode_single_object_auto_wraps() {
        let drafts = decode(br#"{"slug":"hero","title":"Hero","content":"<p>Hi</p>"}"#).unwrap();
        assert_eq!(drafts.len(), 1);

        let drafts = decode(br#"[{"slug":"a","content":"x"},{"slug":"b","content":"y"}]"#).unwrap();
        assert_eq!(drafts.len(), 2);
    }

    #[test]
    fn test_decode_rejects_non_json() {
        assert!(matches!(decode(b"not json at all"), Err(Error::Decode(_))));
    }

    #[test]
    fn test_decode_accepts_legacy_post_keys() {
        let drafts = decode(
            br#"{"post_name":"hero","post_title":"Hero","post_content":"<p>Hi</p>"}"#,
        )
        .unwrap();
        let draft = drafts.into_iter().next().unwrap().validate().unwrap();
        assert_eq!(draft.slug, "hero");
        assert_eq!(draft.title, "Hero");
        assert_eq!(draft.content, "<p>Hi</p>");
    }

    #[test]
    fn test_validate_title_defaults_to_slug() {
        let raw = RawDraft {
            slug: Some("hero-banner".into()),
            title: None,
            content: Some("<p>Hi</p>".into()),
        };
        let draft = raw.validate().unwrap();
        assert_eq!(draft.title, "hero-banner");
    }

    #[test]
    fn test_validate_missing_content_fails() {
        let raw = RawDraft {
            slug: Some("x".into()),
            title: None,
            content: None,
        };
        let err = raw.validate().unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { .. }));
        assert!(err.to_string().contains("content"));
    }

    #[test]
    fn test_validate_normalizes_slug() {
        let raw = RawDraft {
            slug: Some("Hero Banner".into()),
            title: Some("Hero".into()),
            content: Some("x".into()),
        };
        assert_eq!(raw.validate().unwrap().slug, "hero-banner");
    }

    #[test]
    fn test_fingerprint_trims_before_hashing() {
        assert_eq!(fingerprint("<p>Hi</p>"), fingerprint("  <p>Hi</p>\n\n"));
        assert_ne!(fingerprint("<p>Hi</p>"), fingerprint("<p>Bye</p>"));
        assert_eq!(fingerprint("x").len(), 64);
    }

    #[test]
    fn test_decode_file_round_trip() {
        let file = PatternFile {
            slug: "hero".into(),
            title: "Hero".into(),
            content: "<p>Hi</p>".into(),
            modified_at: Some("2025-01-20T10:00:00+00:00".into()),
        };
        let encoded = encode(&file).unwrap();
        let draft = decode_file(encoded.as_bytes()).unwrap();
        assert_eq!(draft.slug, "hero");
        assert_eq!(draft.title, "Hero");
        assert_eq!(draft.content, "<p>Hi</p>");
    }
}
