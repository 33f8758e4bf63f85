//! Descriptive fields for the production run under study.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Free-form descriptive fields for the process being studied.
///
/// All fields are opaque text. Numeric-looking fields (packaging ratios) are
/// deliberately not parsed or validated; they pass through to the export
/// verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessMetadata {
    pub process_name: String,
    pub product_description: String,
    pub line: String,
    pub units_per_bag: String,
    pub bags_per_case: String,
    pub cases_per_pallet: String,
}

impl ProcessMetadata {
    /// Sets a field by name.
    pub fn set(&mut self, field: MetadataField, value: impl Into<String>) {
        *self.field_mut(field) = value.into();
    }

    /// Reads a field by name.
    #[must_use]
    pub fn get(&self, field: MetadataField) -> &str {
        match field {
            MetadataField::ProcessName => &self.process_name,
            MetadataField::ProductDescription => &self.product_description,
            MetadataField::Line => &self.line,
            MetadataField::UnitsPerBag => &self.units_per_bag,
            MetadataField::BagsPerCase => &self.bags_per_case,
            MetadataField::CasesPerPallet => &self.cases_per_pallet,
        }
    }

    fn field_mut(&mut self, field: MetadataField) -> &mut String {
        match field {
            MetadataField::ProcessName => &mut self.process_name,
            MetadataField::ProductDescription => &mut self.product_description,
            MetadataField::Line => &mut self.line,
            MetadataField::UnitsPerBag => &mut self.units_per_bag,
            MetadataField::BagsPerCase => &mut self.bags_per_case,
            MetadataField::CasesPerPallet => &mut self.cases_per_pallet,
        }
    }
}

/// Names of the editable metadata fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataField {
    ProcessName,
    ProductDescription,
    Line,
    UnitsPerBag,
    BagsPerCase,
    CasesPerPallet,
}

impl MetadataField {
    /// All fields, in form order.
    pub const ALL: [Self; 6] = [
        Self::ProcessName,
        Self::ProductDescription,
        Self::Line,
        Self::UnitsPerBag,
        Self::BagsPerCase,
        Self::CasesPerPallet,
    ];

    /// The key used on the command line and in the `set` action.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ProcessName => "process-name",
            Self::ProductDescription => "product-description",
            Self::Line => "line",
            Self::UnitsPerBag => "units-per-bag",
            Self::BagsPerCase => "bags-per-case",
            Self::CasesPerPallet => "cases-per-pallet",
        }
    }

    /// The column heading used in the export.
    #[must_use]
    pub const fn heading(self) -> &'static str {
        match self {
            Self::ProcessName => "Process Name",
            Self::ProductDescription => "Product Description",
            Self::Line => "Line",
            Self::UnitsPerBag => "Units per Bag",
            Self::BagsPerCase => "Bags per Case",
            Self::CasesPerPallet => "Cases per Pallet",
        }
    }
}

impl fmt::Display for MetadataField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetadataField {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "process-name" => Ok(Self::ProcessName),
            "product-description" => Ok(Self::ProductDescription),
            "line" => Ok(Self::Line),
            "units-per-bag" => Ok(Self::UnitsPerBag),
            "bags-per-case" => Ok(Self::BagsPerCase),
            "cases-per-pallet" => Ok(Self::CasesPerPallet),
            _ => Err(UnknownField(s.to_string())),
        }
    }
}

/// Error type for unrecognized metadata field names.
#[derive(Debug, Clone)]
pub struct UnknownField(String);

impl fmt::Display for UnknownField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown metadata field: {}", self.0)
    }
}

impl std::error::Error for UnknownField {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_all_fields() {
        for field in MetadataField::ALL {
            let parsed: MetadataField = field.as_str().parse().expect("should parse");
            assert_eq!(parsed, field, "roundtrip failed for {field:?}");
        }
    }

    #[test]
    fn unknown_field_errors() {
        let result: Result<MetadataField, _> = "shift-supervisor".parse();
        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "unknown metadata field: shift-supervisor");
    }

    #[test]
    fn set_and_get_by_field() {
        let mut metadata = ProcessMetadata::default();
        metadata.set(MetadataField::Line, "Line 4");
        metadata.set(MetadataField::UnitsPerBag, "24");

        assert_eq!(metadata.get(MetadataField::Line), "Line 4");
        assert_eq!(metadata.line, "Line 4");
        assert_eq!(metadata.get(MetadataField::UnitsPerBag), "24");
        assert_eq!(metadata.get(MetadataField::ProcessName), "");
    }

    #[test]
    fn non_numeric_ratio_text_is_accepted() {
        let mut metadata = ProcessMetadata::default();
        metadata.set(MetadataField::BagsPerCase, "ten-ish");
        assert_eq!(metadata.bags_per_case, "ten-ish");
    }
}
