#![cfg_attr(docsrs, feature(doc_cfg))]
//! Declarative mapping of XML elements onto typed records.
//!
//! A record type describes its fields through [`XmlRecord`]; a [`Mapper`]
//! turns that description into attribute and element mapping tables,
//! selects candidate elements from its input, and builds one record per
//! element. Values that do not convert to a field's kind are skipped and
//! leave the field at its default.
//!
//! ```rust
//! use xmlmap_core::{FieldDescriptor, FieldSlot, Mapper, RecordSchema, XmlRecord};
//!
//! #[derive(Default)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! impl XmlRecord for Point {
//!     fn schema() -> RecordSchema {
//!         RecordSchema::new("Point").fields(vec![
//!             FieldDescriptor::of::<i32>("x"),
//!             FieldDescriptor::of::<i32>("y").element("Y"),
//!         ])
//!     }
//!
//!     fn field_mut(&mut self, field: &str) -> Option<&mut dyn FieldSlot> {
//!         match field {
//!             "x" => Some(&mut self.x as &mut dyn FieldSlot),
//!             "y" => Some(&mut self.y as &mut dyn FieldSlot),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! let mapper = Mapper::<Point>::load(r#"<Path><Point x="1"><Y>2</Y></Point></Path>"#)?;
//! let point = mapper.parse_one()?;
//! assert_eq!((point.x, point.y), (1, 2));
//! # Ok::<(), xmlmap_core::MapperError>(())
//! ```

mod coerce;
#[cfg(feature = "serde")]
mod config;
mod datetime;
mod error;
mod mapper;
mod mapping;
mod schema;
mod source;
mod value;

pub use coerce::{coerce, Skip};
#[cfg(feature = "serde")]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
pub use config::{MapOverride, MappingOverrides};
pub use error::MapperError;
pub use mapper::Mapper;
pub use mapping::{MappingTable, SourceKind};
pub use schema::{FieldDescriptor, FieldKey, FieldName, RecordSchema, SourceDecl, XmlRecord};
pub use source::{select_candidates, XmlInput};
pub use value::{FieldKind, FieldSlot, Value, ValueKind, XmlValue};
