//! Normalizes the accepted input shapes into a candidate element sequence.

use xmlmap_dom::{Document, Element, XmlError};

/// Input a mapper can read records from.
///
/// Text is parsed first; text and documents are then searched for every
/// element with the target name, in document order. A sequence of
/// elements is taken as already selected and used verbatim.
pub trait XmlInput {
    fn select(self, element_name: &str) -> Result<Vec<Element>, XmlError>;
}

impl XmlInput for &str {
    fn select(self, element_name: &str) -> Result<Vec<Element>, XmlError> {
        Document::parse(self)?.select(element_name)
    }
}

impl XmlInput for &String {
    fn select(self, element_name: &str) -> Result<Vec<Element>, XmlError> {
        self.as_str().select(element_name)
    }
}

impl XmlInput for String {
    fn select(self, element_name: &str) -> Result<Vec<Element>, XmlError> {
        self.as_str().select(element_name)
    }
}

impl XmlInput for &Document {
    fn select(self, element_name: &str) -> Result<Vec<Element>, XmlError> {
        Ok(self.descendants(element_name).collect())
    }
}

impl XmlInput for Document {
    fn select(self, element_name: &str) -> Result<Vec<Element>, XmlError> {
        (&self).select(element_name)
    }
}

impl XmlInput for Vec<Element> {
    fn select(self, _element_name: &str) -> Result<Vec<Element>, XmlError> {
        Ok(self)
    }
}

impl XmlInput for &[Element] {
    fn select(self, _element_name: &str) -> Result<Vec<Element>, XmlError> {
        Ok(self.to_vec())
    }
}

/// Resolve `input` into the elements records are read from.
pub fn select_candidates<I: XmlInput>(
    input: I,
    element_name: &str,
) -> Result<Vec<Element>, XmlError> {
    input.select(element_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    const XML: &str = r#"<Root><Row n="0"/><Other><Row n="1"/></Other><Row n="2"/></Root>"#;

    fn numbers(elements: &[Element]) -> Vec<&str> {
        elements
            .iter()
            .filter_map(|element| element.attribute("n"))
            .collect()
    }

    #[test]
    fn text_and_documents_select_by_name() {
        let from_text = select_candidates(XML, "Row").expect("text input");
        assert_eq!(numbers(&from_text), vec!["0", "1", "2"]);

        let doc = Document::parse(XML).expect("parse");
        let from_doc = select_candidates(&doc, "Row").expect("document input");
        assert_eq!(from_doc, doc.descendants("Row").collect::<Vec<_>>());
        assert_eq!(numbers(&from_doc), vec!["0", "1", "2"]);
        assert!(select_candidates(doc, "Missing").expect("document input").is_empty());
    }

    #[test]
    fn element_sequences_are_used_verbatim() {
        let doc = Document::parse(XML).expect("parse");
        let picked: Vec<Element> = doc.root().children().collect();
        let selected = select_candidates(picked.clone(), "Row").expect("sequence input");
        assert_eq!(selected, picked);
        assert_eq!(selected[1].name(), "Other");
        let from_slice = select_candidates(&picked[..1], "Ignored").expect("slice input");
        assert_eq!(numbers(&from_slice), vec!["0"]);
    }

    #[test]
    fn malformed_text_is_reported() {
        assert!(select_candidates("<Root><Row></Root>", "Row").is_err());
    }
}
