#![cfg_attr(docsrs, feature(doc_cfg))]
//! Declarative mapping of XML elements onto typed Rust records.
//!
//! Derive [`XmlRecord`] on a struct, then let a [`Mapper`] read one record
//! per matching element. By default every field is read from the
//! attribute of the same name on elements named after the struct; the
//! `#[xml(...)]` attributes and the mapper's runtime calls change where
//! each field comes from.
//!
//! ```rust
//! use xmlmap::{Mapper, XmlRecord};
//!
//! #[derive(Debug, Default, XmlRecord)]
//! #[xml(element = "Quote", rename_all = "PascalCase")]
//! struct Quote {
//!     symbol: String,
//!     price: f64,
//!     #[xml(element = "Date", format = "yyyy-MM-dd")]
//!     date: Option<xmlmap::chrono::NaiveDateTime>,
//! }
//!
//! let xml = r#"<Quotes>
//!     <Quote Symbol="ABC" Price="12.5"><Date>2024-03-01</Date></Quote>
//!     <Quote Symbol="XYZ" Price="n/a"/>
//! </Quotes>"#;
//!
//! let mut mapper = Mapper::<Quote>::load(xml)?;
//! let first = mapper.parse_next()?.expect("first quote");
//! assert_eq!(first.symbol, "ABC");
//! assert_eq!(first.price, 12.5);
//! assert!(first.date.is_some());
//!
//! // Unparsable values leave the field at its default.
//! let second = mapper.parse_next()?.expect("second quote");
//! assert_eq!(second.price, 0.0);
//! assert!(mapper.parse_next()?.is_none());
//!
//! // Read the price from a child element instead.
//! mapper.set_element_map("Last", Quote::PRICE, None);
//! mapper.set_xml(r#"<Quote Symbol="ABC" Price="1"><Last>13</Last></Quote>"#)?;
//! assert_eq!(mapper.parse_one()?.price, 13.0);
//! # Ok::<(), xmlmap::MapperError>(())
//! ```

extern crate self as xmlmap;

pub use xmlmap_core::{
    coerce, select_candidates, FieldDescriptor, FieldKey, FieldKind, FieldName, FieldSlot,
    Mapper, MapperError, MappingTable, RecordSchema, Skip, SourceDecl, SourceKind, Value,
    ValueKind, XmlInput, XmlRecord, XmlValue,
};
#[cfg(feature = "serde")]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
pub use xmlmap_core::{MapOverride, MappingOverrides};
pub use xmlmap_derive::XmlRecord;
pub use xmlmap_dom as dom;
pub use xmlmap_dom::{Document, Element, XmlError};

pub use chrono;
pub use rust_decimal;
