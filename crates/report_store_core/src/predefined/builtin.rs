//! Built-in report templates shipped with the store.

use crate::model::layout::{
    Band, BandKind, Bounds, Control, ControlKind, Margins, PaperKind, ParameterKind, ReportLayout,
    ReportParameter,
};
use crate::predefined::catalog::{PredefinedCatalog, PredefinedCatalogError, ReportTemplate};

/// Built-in templates, addressable by their catalog name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinReport {
    InvoiceSummary,
    CustomerDirectory,
    SalesByRegion,
}

impl BuiltinReport {
    pub const ALL: [Self; 3] = [
        Self::InvoiceSummary,
        Self::CustomerDirectory,
        Self::SalesByRegion,
    ];

    /// Stable catalog name.
    pub fn name(self) -> &'static str {
        match self {
            Self::InvoiceSummary => "InvoiceSummary",
            Self::CustomerDirectory => "CustomerDirectory",
            Self::SalesByRegion => "SalesByRegion",
        }
    }
}

impl ReportTemplate for BuiltinReport {
    fn produce(&self) -> ReportLayout {
        match self {
            Self::InvoiceSummary => invoice_summary(),
            Self::CustomerDirectory => customer_directory(),
            Self::SalesByRegion => sales_by_region(),
        }
    }
}

/// Returns a catalog holding every [`BuiltinReport`].
pub fn builtin_catalog() -> Result<PredefinedCatalog, PredefinedCatalogError> {
    let mut catalog = PredefinedCatalog::new();
    for report in BuiltinReport::ALL {
        catalog.register(report.name(), report)?;
    }
    Ok(catalog)
}

fn title_band(title: &str) -> Band {
    Band::new(BandKind::ReportHeader, 60).with_control(Control::label(
        "title",
        title,
        Bounds::new(0, 0, 650, 40),
    ))
}

fn page_number_footer() -> Band {
    Band::new(BandKind::PageFooter, 30).with_control(Control::field(
        "page_number",
        "[PageNumber]",
        Bounds::new(550, 5, 100, 20),
    ))
}

fn invoice_summary() -> ReportLayout {
    let mut layout = ReportLayout::new("Invoice Summary")
        .with_band(title_band("Invoice Summary"))
        .with_band(
            Band::new(BandKind::Detail, 25)
                .with_control(Control::field("number", "[InvoiceNumber]", Bounds::new(0, 0, 150, 25)))
                .with_control(Control::field("customer", "[CustomerName]", Bounds::new(150, 0, 300, 25)))
                .with_control(Control::field("total", "[Total]", Bounds::new(450, 0, 200, 25))),
        )
        .with_band(
            Band::new(BandKind::ReportFooter, 40).with_control(Control::field(
                "grand_total",
                "sumSum([Total])",
                Bounds::new(450, 5, 200, 25),
            )),
        )
        .with_band(page_number_footer());
    layout.data_source = Some("invoices".to_string());
    layout.parameters.push(ReportParameter {
        name: "issued_after".to_string(),
        kind: ParameterKind::Date,
        default_value: None,
    });
    layout
}

fn customer_directory() -> ReportLayout {
    let mut layout = ReportLayout::new("Customer Directory")
        .with_band(title_band("Customer Directory"))
        .with_band(
            Band::new(BandKind::GroupHeader, 30).with_control(Control::field(
                "initial",
                "Substring([CompanyName], 0, 1)",
                Bounds::new(0, 0, 60, 30),
            )),
        )
        .with_band(
            Band::new(BandKind::Detail, 25)
                .with_control(Control::field("company", "[CompanyName]", Bounds::new(0, 0, 300, 25)))
                .with_control(Control::field("phone", "[Phone]", Bounds::new(300, 0, 150, 25))),
        )
        .with_band(page_number_footer());
    layout.data_source = Some("customers".to_string());
    layout
}

fn sales_by_region() -> ReportLayout {
    let mut layout = ReportLayout::new("Sales by Region")
        .with_band(title_band("Sales by Region"))
        .with_band(
            Band::new(BandKind::PageHeader, 10).with_control(Control {
                name: "rule".to_string(),
                kind: ControlKind::Line,
                bounds: Bounds::new(0, 5, 1000, 2),
            }),
        )
        .with_band(
            Band::new(BandKind::Detail, 25)
                .with_control(Control::field("region", "[Region]", Bounds::new(0, 0, 400, 25)))
                .with_control(Control::field("revenue", "[Revenue]", Bounds::new(400, 0, 300, 25))),
        );
    layout.page.paper = PaperKind::A4;
    layout.page.landscape = true;
    layout.page.margins = Margins::uniform(50);
    layout.data_source = Some("sales".to_string());
    layout.parameters.push(ReportParameter {
        name: "year".to_string(),
        kind: ParameterKind::Integer,
        default_value: Some("2024".to_string()),
    });
    layout
}
