use std::fmt;
use std::marker::PhantomData;

use tracing::{debug, trace};
use xmlmap_dom::Element;

use crate::coerce::{coerce, Skip};
use crate::error::MapperError;
use crate::mapping::MappingTable;
use crate::schema::{FieldName, XmlRecord};
use crate::source::XmlInput;

/// Reads records of type `R` out of XML elements.
///
/// The mapping tables start out from `R`'s declared metadata and can be
/// adjusted at any time with [`set_attribute_map`](Mapper::set_attribute_map)
/// and [`set_element_map`](Mapper::set_element_map). Records are read from
/// the candidate elements selected by the last [`set_xml`](Mapper::set_xml).
pub struct Mapper<R> {
    table: MappingTable,
    element_name: String,
    candidates: Option<Vec<Element>>,
    cursor: usize,
    _record: PhantomData<fn() -> R>,
}

impl<R: XmlRecord> Mapper<R> {
    /// Mapper with default tables and no input.
    pub fn new() -> Self {
        let schema = R::schema();
        Mapper {
            table: MappingTable::from_descriptors(&schema.fields),
            element_name: schema.target_element().to_string(),
            candidates: None,
            cursor: 0,
            _record: PhantomData,
        }
    }

    /// Mapper reading from elements named `element_name` instead of the
    /// record's default.
    pub fn with_element_name(element_name: impl Into<String>) -> Self {
        let mut mapper = Self::new();
        mapper.element_name = element_name.into();
        mapper
    }

    pub fn load<I: XmlInput>(input: I) -> Result<Self, MapperError> {
        let mut mapper = Self::new();
        mapper.set_xml(input)?;
        Ok(mapper)
    }

    pub fn load_as<I: XmlInput>(
        input: I,
        element_name: impl Into<String>,
    ) -> Result<Self, MapperError> {
        let mut mapper = Self::with_element_name(element_name);
        mapper.set_xml(input)?;
        Ok(mapper)
    }

    /// Map attribute `source` onto `field`.
    ///
    /// Every other mapping onto `field`, in either table, is dropped. A
    /// non-empty `format` becomes the parse hint for `source`; an absent
    /// or empty one keeps any existing hint.
    pub fn set_attribute_map<F: FieldName<R>>(
        &mut self,
        source: &str,
        field: F,
        format: Option<&str>,
    ) -> &mut Self {
        self.table
            .set_attribute_map(source, field.field_name(), format);
        self
    }

    /// Map the first direct child element named `source` onto `field`.
    /// Same replacement rules as [`set_attribute_map`](Mapper::set_attribute_map).
    pub fn set_element_map<F: FieldName<R>>(
        &mut self,
        source: &str,
        field: F,
        format: Option<&str>,
    ) -> &mut Self {
        self.table.set_element_map(source, field.field_name(), format);
        self
    }

    /// Replace the input and rewind the cursor.
    ///
    /// On error the previous input and cursor are kept.
    pub fn set_xml<I: XmlInput>(&mut self, input: I) -> Result<(), MapperError> {
        let candidates = input.select(&self.element_name)?;
        debug!(
            element = %self.element_name,
            candidates = candidates.len(),
            "selected input elements"
        );
        self.candidates = Some(candidates);
        self.cursor = 0;
        Ok(())
    }

    /// Record from the first candidate element.
    pub fn parse_one(&self) -> Result<R, MapperError> {
        let element = self
            .candidates()?
            .first()
            .ok_or_else(|| MapperError::NoMatch(self.element_name.clone()))?;
        Ok(self.extract(element))
    }

    /// One record per candidate element, in order.
    pub fn parse_all(&self) -> Result<Vec<R>, MapperError> {
        Ok(self
            .candidates()?
            .iter()
            .map(|element| self.extract(element))
            .collect())
    }

    /// Record from the candidate under the cursor, advancing it.
    ///
    /// Returns `Ok(None)` once every candidate has been read, and keeps
    /// doing so until [`set_xml`](Mapper::set_xml) supplies new input.
    pub fn parse_next(&mut self) -> Result<Option<R>, MapperError> {
        let Some(element) = self.candidates()?.get(self.cursor) else {
            return Ok(None);
        };
        let record = self.extract(element);
        self.cursor += 1;
        Ok(Some(record))
    }

    /// Build a record from a single element.
    ///
    /// Attribute mappings are applied first, then element mappings, so an
    /// element-sourced value wins over an attribute feeding the same field.
    /// Values that fail to convert leave the field at its current value.
    pub fn extract(&self, element: &Element) -> R {
        let mut record = R::default();
        for (name, raw) in element.attributes() {
            if let Some(field) = self.table.attribute_field(name) {
                apply(&mut record, field, raw, self.table.format_hint(name));
            }
        }
        for (source, field) in self.table.elements() {
            if let Some(child) = element.child(source) {
                let text = child.text();
                apply(&mut record, field, &text, self.table.format_hint(source));
            }
        }
        record
    }

    pub fn table(&self) -> &MappingTable {
        &self.table
    }

    /// Name of the elements selected from text and document input.
    pub fn element_name(&self) -> &str {
        &self.element_name
    }

    /// Candidates not yet returned by [`parse_next`](Mapper::parse_next).
    pub fn remaining(&self) -> usize {
        self.candidates
            .as_ref()
            .map_or(0, |candidates| candidates.len().saturating_sub(self.cursor))
    }

    #[cfg(feature = "serde")]
    pub(crate) fn set_element_name(&mut self, element_name: &str) {
        self.element_name = element_name.to_string();
    }

    fn candidates(&self) -> Result<&[Element], MapperError> {
        self.candidates
            .as_deref()
            .ok_or(MapperError::NoInputSource)
    }
}

fn apply<R: XmlRecord>(record: &mut R, field: &str, raw: &str, format: Option<&str>) {
    let Some(slot) = record.field_mut(field) else {
        trace!(field, "no writable field, value dropped");
        return;
    };
    let kind = slot.field_kind().value;
    match coerce(raw, kind, format) {
        Ok(value) => {
            if !slot.assign(value) {
                trace!(field, ?kind, "slot rejected value");
            }
        }
        Err(Skip) => trace!(field, raw, ?kind, hint = ?format, "value skipped"),
    }
}

impl<R: XmlRecord> Default for Mapper<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Clone for Mapper<R> {
    fn clone(&self) -> Self {
        Mapper {
            table: self.table.clone(),
            element_name: self.element_name.clone(),
            candidates: self.candidates.clone(),
            cursor: self.cursor,
            _record: PhantomData,
        }
    }
}

impl<R> fmt::Debug for Mapper<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mapper")
            .field("record", &std::any::type_name::<R>())
            .field("element_name", &self.element_name)
            .field("table", &self.table)
            .field("candidates", &self.candidates.as_ref().map(Vec::len))
            .field("cursor", &self.cursor)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldDescriptor, FieldKey, RecordSchema};
    use crate::value::FieldSlot;
    use chrono::{NaiveDate, NaiveDateTime};
    use rust_decimal::Decimal;
    use xmlmap_dom::Document;

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Sample {
        double_prop: f64,
        int_prop: i32,
        decimal_prop: Decimal,
        flag: bool,
        name: String,
        stamp: Option<NaiveDateTime>,
        both: i32,
        a: i32,
        b: i32,
        not_mapped: i32,
    }

    impl Sample {
        const A: FieldKey<Sample> = FieldKey::new("a");
        const B: FieldKey<Sample> = FieldKey::new("b");
    }

    impl XmlRecord for Sample {
        fn schema() -> RecordSchema {
            RecordSchema::new("Sample")
                .element_name("SampleXml")
                .fields(vec![
                    FieldDescriptor::of::<f64>("double_prop").conventional_name("DoubleProp"),
                    FieldDescriptor::of::<i32>("int_prop").conventional_name("IntProp"),
                    FieldDescriptor::of::<Decimal>("decimal_prop")
                        .conventional_name("DecimalProp"),
                    FieldDescriptor::of::<bool>("flag").attribute("Flag"),
                    FieldDescriptor::of::<String>("name").element("Name"),
                    FieldDescriptor::of::<Option<NaiveDateTime>>("stamp")
                        .attribute_with_format("Stamp", "yyyy-MM;dd"),
                    FieldDescriptor::of::<i32>("both").attribute("Both").element("Both"),
                    FieldDescriptor::of::<i32>("a"),
                    FieldDescriptor::of::<i32>("b"),
                    FieldDescriptor::excluded("not_mapped"),
                ])
        }

        fn field_mut(&mut self, field: &str) -> Option<&mut dyn FieldSlot> {
            let slot: &mut dyn FieldSlot = match field {
                "double_prop" => &mut self.double_prop,
                "int_prop" => &mut self.int_prop,
                "decimal_prop" => &mut self.decimal_prop,
                "flag" => &mut self.flag,
                "name" => &mut self.name,
                "stamp" => &mut self.stamp,
                "both" => &mut self.both,
                "a" => &mut self.a,
                "b" => &mut self.b,
                _ => return None,
            };
            Some(slot)
        }
    }

    const XML: &str = r#"<Root>
  <SampleXml DoubleProp="5.0" IntProp=" 42 " DecimalProp="1.23456789" Flag="True"
             Stamp="2001-05;17" not_mapped="9">
    <Name>fi<b>rs</b>t</Name>
  </SampleXml>
  <Group>
    <SampleXml DoubleProp="asdf" IntProp="4" Flag="0" Stamp="2001-05-17">
      <Wrapper><Name>nested</Name></Wrapper>
    </SampleXml>
  </Group>
</Root>"#;

    fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .expect("valid date")
    }

    #[test]
    fn default_tables_follow_metadata() {
        let mapper = Mapper::<Sample>::load(XML).expect("load");
        assert_eq!(mapper.element_name(), "SampleXml");
        let first = mapper.parse_one().expect("first record");
        assert_eq!(
            first,
            Sample {
                double_prop: 5.0,
                int_prop: 42,
                decimal_prop: Decimal::new(123456789, 8),
                flag: true,
                name: "first".into(),
                stamp: Some(date(2001, 5, 17)),
                ..Sample::default()
            }
        );
    }

    #[test]
    fn failed_conversions_leave_defaults() {
        let records = Mapper::<Sample>::load(XML)
            .and_then(|mapper| mapper.parse_all())
            .expect("records");
        assert_eq!(records.len(), 2);
        let second = &records[1];
        assert_eq!(second.double_prop, 0.0);
        assert_eq!(second.int_prop, 4);
        assert!(!second.flag);
        assert_eq!(second.stamp, None);
        assert_eq!(second.name, "");
    }

    #[test]
    fn excluded_field_is_never_written() {
        let mut mapper = Mapper::<Sample>::load(XML).expect("load");
        assert_eq!(mapper.parse_one().expect("record").not_mapped, 0);
        mapper.set_attribute_map("not_mapped", "not_mapped", None);
        assert_eq!(mapper.parse_one().expect("record").not_mapped, 0);
    }

    #[test]
    fn attribute_and_element_of_same_name_are_independent() {
        let mut mapper = Mapper::<Sample>::new();
        mapper
            .set_attribute_map("TestElement", Sample::A, None)
            .set_element_map("TestElement", Sample::B, None);
        mapper
            .set_xml(r#"<SampleXml TestElement="1"><TestElement>2</TestElement></SampleXml>"#)
            .expect("input");
        let record = mapper.parse_one().expect("record");
        assert_eq!((record.a, record.b), (1, 2));
    }

    #[test]
    fn remapping_a_field_evicts_its_other_sources() {
        let mut mapper = Mapper::<Sample>::new();
        mapper.set_attribute_map("X", "a", None);
        mapper.set_element_map("Y", "a", None);
        assert_eq!(mapper.table().attribute_field("X"), None);
        assert_eq!(mapper.table().attribute_field("a"), None);

        mapper
            .set_xml(r#"<R><SampleXml X="5" a="6"><Y>7</Y></SampleXml><SampleXml X="5"/></R>"#)
            .expect("input");
        let values: Vec<i32> = mapper
            .parse_all()
            .expect("records")
            .iter()
            .map(|record| record.a)
            .collect();
        assert_eq!(values, vec![7, 0]);
    }

    #[test]
    fn element_values_win_over_attributes() {
        let mapper =
            Mapper::<Sample>::load(r#"<SampleXml Both="1"><Both>2</Both></SampleXml>"#)
                .expect("load");
        assert_eq!(mapper.parse_one().expect("record").both, 2);

        let mapper = Mapper::<Sample>::load(r#"<SampleXml Both="1"/>"#).expect("load");
        assert_eq!(mapper.parse_one().expect("record").both, 1);
    }

    #[test]
    fn retrieval_requires_input() {
        let mut mapper = Mapper::<Sample>::new();
        assert!(matches!(mapper.parse_one(), Err(MapperError::NoInputSource)));
        assert!(matches!(mapper.parse_all(), Err(MapperError::NoInputSource)));
        assert!(matches!(mapper.parse_next(), Err(MapperError::NoInputSource)));
        assert_eq!(mapper.remaining(), 0);
    }

    #[test]
    fn empty_selection() {
        let mut mapper = Mapper::<Sample>::load("<Root><Other/></Root>").expect("load");
        match mapper.parse_one() {
            Err(MapperError::NoMatch(name)) => assert_eq!(name, "SampleXml"),
            other => panic!("expected NoMatch, got {other:?}"),
        }
        assert!(mapper.parse_all().expect("records").is_empty());
        assert_eq!(mapper.parse_next().expect("next"), None);
    }

    #[test]
    fn parse_next_walks_candidates_in_order() {
        let xml = r#"<Root>
            <SampleXml IntProp="0"/><SampleXml IntProp="1"/>
            <SampleXml IntProp="2"/><SampleXml IntProp="3"/>
        </Root>"#;
        let mut mapper = Mapper::<Sample>::load(xml).expect("load");
        assert_eq!(mapper.remaining(), 4);
        for expected in 0..4 {
            let record = mapper.parse_next().expect("next").expect("record");
            assert_eq!(record.int_prop, expected);
        }
        for _ in 0..3 {
            assert_eq!(mapper.parse_next().expect("next"), None);
        }
        assert_eq!(mapper.remaining(), 0);

        mapper.set_xml(xml).expect("reload");
        assert_eq!(mapper.parse_next().expect("next").map(|r| r.int_prop), Some(0));
    }

    #[test]
    fn failed_input_keeps_previous_source() {
        let mut mapper =
            Mapper::<Sample>::load(r#"<R><SampleXml IntProp="1"/><SampleXml IntProp="2"/></R>"#)
                .expect("load");
        mapper.parse_next().expect("next");
        let err = mapper.set_xml("<R><SampleXml></R>").expect_err("malformed");
        assert!(matches!(err, MapperError::MalformedInput(_)));
        assert_eq!(mapper.remaining(), 1);
        assert_eq!(mapper.parse_next().expect("next").map(|r| r.int_prop), Some(2));
    }

    #[test]
    fn format_hints_apply_to_attributes_and_elements() {
        let mut mapper = Mapper::<Sample>::new();
        mapper.set_element_map("When", "stamp", Some("dd.MM.yyyy"));
        mapper
            .set_xml("<SampleXml><When>17.05.2001</When></SampleXml>")
            .expect("input");
        assert_eq!(mapper.parse_one().expect("record").stamp, Some(date(2001, 5, 17)));

        mapper.set_attribute_map("Stamp", "stamp", None);
        assert_eq!(mapper.table().format_hint("Stamp"), Some("yyyy-MM;dd"));
        mapper
            .set_xml(r#"<SampleXml Stamp="2001-05;17"/>"#)
            .expect("input");
        assert_eq!(mapper.parse_one().expect("record").stamp, Some(date(2001, 5, 17)));
    }

    #[test]
    fn element_sequences_bypass_name_selection() {
        let doc = Document::parse(r#"<Root><Row IntProp="8"/><Row IntProp="9"/></Root>"#)
            .expect("parse");
        let rows: Vec<Element> = doc.root().children().collect();
        let mapper = Mapper::<Sample>::load(rows).expect("load");
        let values: Vec<i32> = mapper
            .parse_all()
            .expect("records")
            .into_iter()
            .map(|record| record.int_prop)
            .collect();
        assert_eq!(values, vec![8, 9]);

        let by_name = Mapper::<Sample>::load_as(&doc, "Row").expect("load");
        assert_eq!(by_name.element_name(), "Row");
        assert_eq!(by_name.parse_all().expect("records").len(), 2);
    }

    #[test]
    fn extract_reads_a_single_element() {
        let doc = Document::parse(r#"<SampleXml DoubleProp="-1,250.5"/>"#).expect("parse");
        let record = Mapper::<Sample>::new().extract(&doc.root());
        assert_eq!(record.double_prop, -1250.5);
    }
}
