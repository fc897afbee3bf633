//! Mapping overrides loaded from configuration, e.g. a JSON file shipped
//! next to the documents it describes.

use serde::{Deserialize, Serialize};

use crate::error::MapperError;
use crate::mapper::Mapper;
use crate::schema::XmlRecord;
use crate::source::XmlInput;

/// One `source -> field` mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapOverride {
    pub source: String,
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

/// Runtime adjustments applied on top of a record's declared mappings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingOverrides {
    /// Replaces the target element name.
    pub element_name: Option<String>,
    pub attributes: Vec<MapOverride>,
    pub elements: Vec<MapOverride>,
}

impl<R: XmlRecord> Mapper<R> {
    /// Apply attribute overrides, then element overrides, in listed order.
    ///
    /// Each entry goes through the regular mapping calls, so a later entry
    /// for a field evicts every earlier source of that field. A new element
    /// name takes effect on the next [`set_xml`](Mapper::set_xml).
    pub fn apply_overrides(&mut self, overrides: &MappingOverrides) -> &mut Self {
        if let Some(name) = &overrides.element_name {
            self.set_element_name(name);
        }
        for entry in &overrides.attributes {
            self.set_attribute_map(&entry.source, entry.field.as_str(), entry.format.as_deref());
        }
        for entry in &overrides.elements {
            self.set_element_map(&entry.source, entry.field.as_str(), entry.format.as_deref());
        }
        self
    }

    /// Mapper with `overrides` applied, reading from `input`.
    pub fn load_with<I: XmlInput>(
        input: I,
        overrides: &MappingOverrides,
    ) -> Result<Self, MapperError> {
        let mut mapper = Self::new();
        mapper.apply_overrides(overrides);
        mapper.set_xml(input)?;
        Ok(mapper)
    }
}
