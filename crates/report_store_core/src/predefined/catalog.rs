//! Predefined report catalog.

use crate::model::layout::ReportLayout;
use crate::name::is_valid_report_name;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Capability to construct a fresh report layout.
pub trait ReportTemplate: Send + Sync {
    fn produce(&self) -> ReportLayout;
}

impl<F> ReportTemplate for F
where
    F: Fn() -> ReportLayout + Send + Sync,
{
    fn produce(&self) -> ReportLayout {
        self()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredefinedCatalogError {
    InvalidName(String),
    DuplicateName(String),
}

impl Display for PredefinedCatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName(name) => write!(f, "predefined report name is invalid: {name:?}"),
            Self::DuplicateName(name) => {
                write!(f, "predefined report already registered: {name}")
            }
        }
    }
}

impl Error for PredefinedCatalogError {}

/// Name → template mapping built once at startup and shared read-only.
#[derive(Default)]
pub struct PredefinedCatalog {
    templates: BTreeMap<String, Box<dyn ReportTemplate>>,
}

impl PredefinedCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one template under `name`.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        template: impl ReportTemplate + 'static,
    ) -> Result<(), PredefinedCatalogError> {
        let name = name.into();
        if !is_valid_report_name(&name) {
            return Err(PredefinedCatalogError::InvalidName(name));
        }
        if self.templates.contains_key(&name) {
            return Err(PredefinedCatalogError::DuplicateName(name));
        }
        self.templates.insert(name, Box::new(template));
        Ok(())
    }

    /// Builder-style [`register`](Self::register).
    pub fn with_template(
        mut self,
        name: impl Into<String>,
        template: impl ReportTemplate + 'static,
    ) -> Result<Self, PredefinedCatalogError> {
        self.register(name, template)?;
        Ok(self)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Returns registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    /// Builds a fresh layout for `name`.
    pub fn produce(&self, name: &str) -> Option<ReportLayout> {
        self.templates.get(name).map(|template| template.produce())
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{PredefinedCatalog, PredefinedCatalogError};
    use crate::model::layout::ReportLayout;

    #[test]
    fn registers_closures_and_produces_fresh_layouts() {
        let catalog = PredefinedCatalog::new()
            .with_template("Blank", || ReportLayout::new("Blank"))
            .expect("register Blank");

        let mut first = catalog.produce("Blank").expect("Blank is registered");
        first.title.push_str(" (edited)");
        let second = catalog.produce("Blank").expect("Blank is registered");
        assert_eq!(second.title, "Blank");
        assert!(catalog.produce("Missing").is_none());
    }

    #[test]
    fn rejects_invalid_and_duplicate_names() {
        let mut catalog = PredefinedCatalog::new();
        assert_eq!(
            catalog.register("../Blank", || ReportLayout::new("x")),
            Err(PredefinedCatalogError::InvalidName("../Blank".to_string()))
        );
        catalog
            .register("Blank", || ReportLayout::new("x"))
            .expect("first registration");
        assert_eq!(
            catalog.register("Blank", || ReportLayout::new("y")),
            Err(PredefinedCatalogError::DuplicateName("Blank".to_string()))
        );
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn names_are_sorted() {
        let catalog = PredefinedCatalog::new()
            .with_template("b", || ReportLayout::new("b"))
            .and_then(|c| c.with_template("a", || ReportLayout::new("a")))
            .expect("register templates");
        assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
