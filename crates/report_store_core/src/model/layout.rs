//! Report layout object model.
//!
//! A [`ReportLayout`] describes a document's structure (page setup, bands,
//! controls, parameters) independent of rendered content. The store never
//! interprets it; it only round-trips it through the layout codec.

use serde::{Deserialize, Serialize};

/// Canonical in-process report object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportLayout {
    pub title: String,
    #[serde(default)]
    pub page: PageSettings,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ReportParameter>,
    /// Name of the data source the designer binds fields against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source: Option<String>,
    #[serde(default)]
    pub bands: Vec<Band>,
}

impl ReportLayout {
    /// Creates an empty layout with default page settings and no bands.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            page: PageSettings::default(),
            parameters: Vec::new(),
            data_source: None,
            bands: Vec::new(),
        }
    }

    /// Appends a band and returns the layout for chaining.
    pub fn with_band(mut self, band: Band) -> Self {
        self.bands.push(band);
        self
    }

    /// Returns the first band of the given kind.
    pub fn band(&self, kind: BandKind) -> Option<&Band> {
        self.bands.iter().find(|band| band.kind == kind)
    }
}

/// Page geometry. Lengths are in hundredths of an inch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSettings {
    pub paper: PaperKind,
    pub landscape: bool,
    pub margins: Margins,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            paper: PaperKind::Letter,
            landscape: false,
            margins: Margins::uniform(100),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaperKind {
    Letter,
    Legal,
    A4,
    Custom { width: u32, height: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Margins {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

impl Margins {
    pub fn uniform(value: u32) -> Self {
        Self {
            left: value,
            right: value,
            top: value,
            bottom: value,
        }
    }
}

/// Named input the report asks for before rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportParameter {
    pub name: String,
    pub kind: ParameterKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKind {
    Text,
    Integer,
    Decimal,
    Date,
    Boolean,
}

/// Horizontal section of a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Band {
    pub kind: BandKind,
    pub height: u32,
    #[serde(default)]
    pub controls: Vec<Control>,
}

impl Band {
    pub fn new(kind: BandKind, height: u32) -> Self {
        Self {
            kind,
            height,
            controls: Vec::new(),
        }
    }

    pub fn with_control(mut self, control: Control) -> Self {
        self.controls.push(control);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BandKind {
    ReportHeader,
    PageHeader,
    GroupHeader,
    Detail,
    GroupFooter,
    PageFooter,
    ReportFooter,
}

/// Positioned element inside a band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Control {
    pub name: String,
    pub kind: ControlKind,
    pub bounds: Bounds,
}

impl Control {
    pub fn label(name: impl Into<String>, text: impl Into<String>, bounds: Bounds) -> Self {
        Self {
            name: name.into(),
            kind: ControlKind::Label { text: text.into() },
            bounds,
        }
    }

    pub fn field(name: impl Into<String>, expression: impl Into<String>, bounds: Bounds) -> Self {
        Self {
            name: name.into(),
            kind: ControlKind::Field {
                expression: expression.into(),
            },
            bounds,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlKind {
    /// Static text.
    Label { text: String },
    /// Data-bound value, e.g. `[Customer.Name]`.
    Field { expression: String },
    Line,
    Picture { source: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Bounds {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}
