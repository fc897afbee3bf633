//! Static per-record metadata: which fields exist, what kind of value
//! each holds, and where in a document each is declared to come from.

use std::marker::PhantomData;

use crate::value::{FieldKind, FieldSlot, XmlValue};

/// Attribute or element name a field is declared to read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceDecl {
    pub name: &'static str,
    /// Parse pattern used for this source, e.g. an exact date format.
    pub format: Option<&'static str>,
}

/// Declaration of one record field.
///
/// A field with neither an attribute nor an element declaration is read
/// from the attribute named after it (or after its conventional name).
/// Excluded fields are never written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    /// `None` for excluded fields.
    pub kind: Option<FieldKind>,
    pub attribute: Option<SourceDecl>,
    pub element: Option<SourceDecl>,
    /// Default attribute name when it differs from `name`, e.g. after a
    /// `rename_all` convention.
    pub conventional: Option<&'static str>,
    pub excluded: bool,
}

impl FieldDescriptor {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        FieldDescriptor {
            name,
            kind: Some(kind),
            attribute: None,
            element: None,
            conventional: None,
            excluded: false,
        }
    }

    /// Descriptor whose kind follows the Rust type of the field.
    pub const fn of<T: XmlValue>(name: &'static str) -> Self {
        Self::new(name, T::KIND)
    }

    pub const fn excluded(name: &'static str) -> Self {
        FieldDescriptor {
            name,
            kind: None,
            attribute: None,
            element: None,
            conventional: None,
            excluded: true,
        }
    }

    pub fn attribute(self, source: &'static str) -> Self {
        self.with_attribute(source, None)
    }

    pub fn attribute_with_format(self, source: &'static str, format: &'static str) -> Self {
        self.with_attribute(source, Some(format))
    }

    pub fn element(self, source: &'static str) -> Self {
        self.with_element(source, None)
    }

    pub fn element_with_format(self, source: &'static str, format: &'static str) -> Self {
        self.with_element(source, Some(format))
    }

    pub fn conventional_name(self, name: &'static str) -> Self {
        FieldDescriptor {
            conventional: Some(name),
            ..self
        }
    }

    /// Attribute name used when nothing explicit is declared.
    pub fn default_source(&self) -> &'static str {
        self.conventional.unwrap_or(self.name)
    }

    /// True when the field falls back to the default attribute convention.
    pub fn uses_default_source(&self) -> bool {
        !self.excluded && self.attribute.is_none() && self.element.is_none()
    }

    fn with_attribute(self, name: &'static str, format: Option<&'static str>) -> Self {
        FieldDescriptor {
            attribute: Some(SourceDecl { name, format }),
            ..self
        }
    }

    fn with_element(self, name: &'static str, format: Option<&'static str>) -> Self {
        FieldDescriptor {
            element: Some(SourceDecl { name, format }),
            ..self
        }
    }
}

/// Metadata for one record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSchema {
    /// Name of the Rust type.
    pub type_name: &'static str,
    /// Element name override; the type name is used when absent.
    pub element_name: Option<&'static str>,
    pub fields: Vec<FieldDescriptor>,
}

impl RecordSchema {
    pub fn new(type_name: &'static str) -> Self {
        RecordSchema {
            type_name,
            element_name: None,
            fields: Vec::new(),
        }
    }

    pub fn element_name(mut self, name: &'static str) -> Self {
        self.element_name = Some(name);
        self
    }

    pub fn fields(mut self, fields: Vec<FieldDescriptor>) -> Self {
        self.fields = fields;
        self
    }

    /// Name of the elements this record is read from by default.
    pub fn target_element(&self) -> &'static str {
        self.element_name.unwrap_or(self.type_name)
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }
}

/// A record type that can be populated from XML elements.
///
/// Usually derived with `#[derive(XmlRecord)]`; a hand-written impl lists
/// the fields in [`schema`](XmlRecord::schema) and hands out a slot for
/// each writable one in [`field_mut`](XmlRecord::field_mut).
pub trait XmlRecord: Default {
    fn schema() -> RecordSchema;

    /// Writable view of the named field. `None` for unknown and excluded
    /// fields, which makes any mapping onto them inert.
    fn field_mut(&mut self, field: &str) -> Option<&mut dyn FieldSlot>;
}

/// Typed handle to a field of record `R`, usable wherever a field name is
/// accepted.
pub struct FieldKey<R> {
    name: &'static str,
    _record: PhantomData<fn() -> R>,
}

impl<R> FieldKey<R> {
    pub const fn new(name: &'static str) -> Self {
        FieldKey {
            name,
            _record: PhantomData,
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<R> Clone for FieldKey<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for FieldKey<R> {}

impl<R> std::fmt::Debug for FieldKey<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("FieldKey").field(&self.name).finish()
    }
}

/// Anything that names a field of record `R`: a plain string or a
/// [`FieldKey<R>`].
pub trait FieldName<R> {
    fn field_name(&self) -> &str;
}

impl<R> FieldName<R> for &str {
    fn field_name(&self) -> &str {
        self
    }
}

impl<R> FieldName<R> for String {
    fn field_name(&self) -> &str {
        self
    }
}

impl<R> FieldName<R> for FieldKey<R> {
    fn field_name(&self) -> &str {
        self.name
    }
}
