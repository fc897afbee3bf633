//! Source-name → field-name tables and per-source parse hints.

use std::collections::HashMap;

use tracing::debug;

use crate::schema::FieldDescriptor;

/// Which of the two tables a mapping lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SourceKind {
    Attribute,
    Element,
}

/// Attribute and element mapping tables of one mapper.
///
/// Built once from record metadata, where the first declaration of a
/// source name wins, then freely overridden with
/// [`set_attribute_map`](MappingTable::set_attribute_map) and
/// [`set_element_map`](MappingTable::set_element_map), where the last call
/// wins and every older mapping onto the same field is dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingTable {
    attributes: HashMap<String, String>,
    elements: HashMap<String, String>,
    /// Shared by both tables, keyed by source name.
    parse_options: HashMap<String, String>,
}

impl MappingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the default tables from field declarations.
    pub fn from_descriptors(fields: &[FieldDescriptor]) -> Self {
        let mut table = MappingTable::new();
        for field in fields.iter().filter(|field| !field.excluded) {
            if let Some(source) = field.element {
                table.declare(SourceKind::Element, source.name, field.name, source.format);
            }
            if let Some(source) = field.attribute {
                table.declare(SourceKind::Attribute, source.name, field.name, source.format);
            }
        }
        for field in fields.iter().filter(|field| field.uses_default_source()) {
            table.declare(SourceKind::Attribute, field.default_source(), field.name, None);
        }
        debug!(
            attributes = table.attributes.len(),
            elements = table.elements.len(),
            hints = table.parse_options.len(),
            "built default mapping tables"
        );
        table
    }

    /// Map attribute `source` onto `field`, replacing every existing
    /// mapping onto `field`.
    pub fn set_attribute_map(&mut self, source: &str, field: &str, format: Option<&str>) {
        self.set_map(SourceKind::Attribute, source, field, format);
    }

    /// Map child element `source` onto `field`, replacing every existing
    /// mapping onto `field`.
    pub fn set_element_map(&mut self, source: &str, field: &str, format: Option<&str>) {
        self.set_map(SourceKind::Element, source, field, format);
    }

    pub fn set_map(&mut self, kind: SourceKind, source: &str, field: &str, format: Option<&str>) {
        let evicted = self.evict_field(field);
        self.table_mut(kind)
            .insert(source.to_string(), field.to_string());
        if let Some(format) = format.filter(|format| !format.is_empty()) {
            self.parse_options
                .insert(source.to_string(), format.to_string());
        }
        debug!(?kind, source, field, evicted, "set mapping");
    }

    pub fn attribute_field(&self, source: &str) -> Option<&str> {
        self.attributes.get(source).map(String::as_str)
    }

    pub fn element_field(&self, source: &str) -> Option<&str> {
        self.elements.get(source).map(String::as_str)
    }

    /// Parse hint recorded for a source name, whichever table maps it.
    pub fn format_hint(&self, source: &str) -> Option<&str> {
        self.parse_options.get(source).map(String::as_str)
    }

    /// `(source, field)` pairs of the attribute table, in no particular order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.attributes
            .iter()
            .map(|(source, field)| (source.as_str(), field.as_str()))
    }

    /// `(source, field)` pairs of the element table, in no particular order.
    pub fn elements(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.elements
            .iter()
            .map(|(source, field)| (source.as_str(), field.as_str()))
    }

    /// Every source currently feeding `field`.
    pub fn sources_for(&self, field: &str) -> Vec<(SourceKind, &str)> {
        let mut sources: Vec<_> = self
            .attributes()
            .filter(|(_, target)| *target == field)
            .map(|(source, _)| (SourceKind::Attribute, source))
            .chain(
                self.elements()
                    .filter(|(_, target)| *target == field)
                    .map(|(source, _)| (SourceKind::Element, source)),
            )
            .collect();
        sources.sort();
        sources
    }

    fn declare(&mut self, kind: SourceKind, source: &str, field: &str, format: Option<&str>) {
        let table = self.table_mut(kind);
        if table.contains_key(source) {
            return;
        }
        table.insert(source.to_string(), field.to_string());
        if let Some(format) = format.filter(|format| !format.is_empty()) {
            self.parse_options
                .entry(source.to_string())
                .or_insert_with(|| format.to_string());
        }
    }

    fn evict_field(&mut self, field: &str) -> usize {
        let before = self.attributes.len() + self.elements.len();
        self.attributes.retain(|_, target| target != field);
        self.elements.retain(|_, target| target != field);
        before - self.attributes.len() - self.elements.len()
    }

    fn table_mut(&mut self, kind: SourceKind) -> &mut HashMap<String, String> {
        match kind {
            SourceKind::Attribute => &mut self.attributes,
            SourceKind::Element => &mut self.elements,
        }
    }
}
