//! Canonical layout byte format.
//!
//! # Responsibility
//! - Convert [`ReportLayout`] objects to the bytes stored in and served
//!   from both catalogs, and back.
//!
//! # Invariants
//! - Persisted and predefined reads share this one encoding.
//! - Decoding rejects foreign format tags and newer format versions instead
//!   of guessing.

use crate::model::layout::ReportLayout;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Format tag written into every layout document.
pub const LAYOUT_FORMAT: &str = "report-layout";
/// Current layout document version.
pub const LAYOUT_FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct LayoutDocumentRef<'a> {
    format: &'a str,
    version: u32,
    report: &'a ReportLayout,
}

#[derive(Deserialize)]
struct LayoutDocument<'a> {
    #[serde(borrow)]
    format: Cow<'a, str>,
    version: u32,
    report: ReportLayout,
}

#[derive(Debug)]
pub enum LayoutError {
    Json(serde_json::Error),
    UnsupportedFormat(String),
    UnsupportedVersion { found: u32, latest_supported: u32 },
}

impl Display for LayoutError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "malformed layout document: {err}"),
            Self::UnsupportedFormat(format) => {
                write!(f, "unsupported layout format `{format}`")
            }
            Self::UnsupportedVersion {
                found,
                latest_supported,
            } => write!(
                f,
                "layout format version {found} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for LayoutError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for LayoutError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Serializes a layout to canonical bytes.
pub fn serialize_layout(report: &ReportLayout) -> Result<Vec<u8>, LayoutError> {
    let document = LayoutDocumentRef {
        format: LAYOUT_FORMAT,
        version: LAYOUT_FORMAT_VERSION,
        report,
    };
    Ok(serde_json::to_vec(&document)?)
}

/// Decodes canonical bytes back into a layout.
pub fn deserialize_layout(bytes: &[u8]) -> Result<ReportLayout, LayoutError> {
    let document: LayoutDocument<'_> = serde_json::from_slice(bytes)?;
    if document.format != LAYOUT_FORMAT {
        return Err(LayoutError::UnsupportedFormat(document.format.into_owned()));
    }
    if document.version > LAYOUT_FORMAT_VERSION {
        return Err(LayoutError::UnsupportedVersion {
            found: document.version,
            latest_supported: LAYOUT_FORMAT_VERSION,
        });
    }
    Ok(document.report)
}

#[cfg(test)]
mod tests {
    use super::{deserialize_layout, serialize_layout, LayoutError};
    use crate::model::layout::{Band, BandKind, Bounds, Control, PaperKind, ReportLayout};

    fn sample_layout() -> ReportLayout {
        let mut layout = ReportLayout::new("Quarterly")
            .with_band(Band::new(BandKind::ReportHeader, 80).with_control(Control::label(
                "title",
                "Quarterly \"numbers\"",
                Bounds::new(0, 0, 650, 40),
            )))
            .with_band(Band::new(BandKind::Detail, 25).with_control(Control::field(
                "amount",
                "[Amount]",
                Bounds::new(0, 0, 120, 25),
            )));
        layout.page.paper = PaperKind::Custom {
            width: 900,
            height: 1200,
        };
        layout.data_source = Some("sales".to_string());
        layout
    }

    #[test]
    fn decode_restores_encoded_layout() {
        let layout = sample_layout();
        let bytes = serialize_layout(&layout).expect("layout should encode");
        let decoded = deserialize_layout(&bytes).expect("layout should decode");
        assert_eq!(decoded, layout);
    }

    #[test]
    fn encoding_is_deterministic() {
        let layout = sample_layout();
        assert_eq!(
            serialize_layout(&layout).expect("first encode"),
            serialize_layout(&layout).expect("second encode")
        );
    }

    #[test]
    fn encoded_document_carries_format_header() {
        let bytes = serialize_layout(&ReportLayout::new("Empty")).expect("layout should encode");
        let value: serde_json::Value = serde_json::from_slice(&bytes).expect("valid json");
        assert_eq!(value["format"], "report-layout");
        assert_eq!(value["version"], 1);
        assert_eq!(value["report"]["title"], "Empty");
    }

    #[test]
    fn rejects_foreign_format_tag() {
        let err = deserialize_layout(br#"{"format":"repx","version":1,"report":{"title":"x"}}"#)
            .expect_err("foreign format must be rejected");
        assert!(matches!(err, LayoutError::UnsupportedFormat(format) if format == "repx"));
    }

    #[test]
    fn rejects_newer_format_version() {
        let err = deserialize_layout(
            br#"{"format":"report-layout","version":7,"report":{"title":"x"}}"#,
        )
        .expect_err("newer version must be rejected");
        assert!(matches!(
            err,
            LayoutError::UnsupportedVersion {
                found: 7,
                latest_supported: 1
            }
        ));
    }

    #[test]
    fn rejects_non_json_bytes() {
        let err = deserialize_layout(b"<XtraReportsLayoutSerializer/>")
            .expect_err("xml must be rejected");
        assert!(matches!(err, LayoutError::Json(_)));
    }
}
