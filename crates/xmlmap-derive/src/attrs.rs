//! Parsing of `#[xml(...)]` attributes.

use syn::{Attribute, LitStr};

use crate::case::RenameRule;

#[derive(Default)]
pub(crate) struct RecordAttrs {
    pub element: Option<LitStr>,
    pub rename_all: Option<RenameRule>,
}

impl RecordAttrs {
    pub(crate) fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = RecordAttrs::default();
        for attr in attrs.iter().filter(|attr| attr.path().is_ident("xml")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("element") {
                    set_once(&mut out.element, meta.value()?.parse()?, &meta)
                } else if meta.path.is_ident("rename_all") {
                    let lit: LitStr = meta.value()?.parse()?;
                    let rule = RenameRule::from_lit(&lit)?;
                    set_once(&mut out.rename_all, rule, &meta)
                } else {
                    Err(meta.error("expected `element` or `rename_all`"))
                }
            })?;
        }
        Ok(out)
    }
}

/// A declared attribute or element source of one field.
pub(crate) struct SourceAttr {
    pub name: LitStr,
    pub format: Option<LitStr>,
}

#[derive(Default)]
pub(crate) struct FieldAttrs {
    pub attribute: Option<SourceAttr>,
    pub element: Option<SourceAttr>,
    pub skip: bool,
}

impl FieldAttrs {
    /// Each `#[xml(...)]` declares at most one source; `format` belongs to
    /// the source declared next to it.
    pub(crate) fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = FieldAttrs::default();
        for attr in attrs.iter().filter(|attr| attr.path().is_ident("xml")) {
            let mut attribute: Option<LitStr> = None;
            let mut element: Option<LitStr> = None;
            let mut format: Option<LitStr> = None;
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("attribute") {
                    set_once(&mut attribute, meta.value()?.parse()?, &meta)
                } else if meta.path.is_ident("element") {
                    set_once(&mut element, meta.value()?.parse()?, &meta)
                } else if meta.path.is_ident("format") {
                    set_once(&mut format, meta.value()?.parse()?, &meta)
                } else if meta.path.is_ident("skip") {
                    out.skip = true;
                    Ok(())
                } else {
                    Err(meta.error("expected `attribute`, `element`, `format` or `skip`"))
                }
            })?;

            let source = match (attribute, element) {
                (Some(name), None) => Some((&mut out.attribute, name)),
                (None, Some(name)) => Some((&mut out.element, name)),
                (Some(_), Some(name)) => {
                    return Err(syn::Error::new(
                        name.span(),
                        "declare `attribute` and `element` in separate #[xml(...)] attributes",
                    ))
                }
                (None, None) => None,
            };
            match (source, format) {
                (Some((slot, name)), format) => {
                    if slot.is_some() {
                        return Err(syn::Error::new(name.span(), "source declared twice"));
                    }
                    *slot = Some(SourceAttr { name, format });
                }
                (None, Some(format)) => {
                    return Err(syn::Error::new(
                        format.span(),
                        "`format` needs an `attribute` or `element` in the same #[xml(...)]",
                    ))
                }
                (None, None) => {}
            }
        }
        if out.skip && (out.attribute.is_some() || out.element.is_some()) {
            let span = out
                .attribute
                .as_ref()
                .or(out.element.as_ref())
                .map(|source| source.name.span())
                .unwrap_or_else(proc_macro2::Span::call_site);
            return Err(syn::Error::new(span, "skipped fields cannot declare sources"));
        }
        Ok(out)
    }
}

fn set_once<T>(slot: &mut Option<T>, value: T, meta: &syn::meta::ParseNestedMeta) -> syn::Result<()> {
    if slot.is_some() {
        return Err(meta.error("duplicate key"));
    }
    *slot = Some(value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn field_attrs(field: syn::Field) -> syn::Result<FieldAttrs> {
        FieldAttrs::parse(&field.attrs)
    }

    #[test]
    fn parses_record_attributes() {
        let input: syn::DeriveInput = parse_quote! {
            #[derive(Default)]
            #[xml(element = "SampleXml", rename_all = "PascalCase")]
            struct Sample {}
        };
        let attrs = RecordAttrs::parse(&input.attrs).expect("record attrs");
        assert_eq!(attrs.element.map(|lit| lit.value()).as_deref(), Some("SampleXml"));
        assert_eq!(attrs.rename_all, Some(RenameRule::PascalCase));
    }

    #[test]
    fn parses_field_sources_with_formats() {
        let attrs = field_attrs(parse_quote! {
            #[xml(attribute = "At", format = "yyyy-MM-dd")]
            #[xml(element = "When")]
            stamp: Option<NaiveDateTime>
        })
        .expect("field attrs");
        let attribute = attrs.attribute.expect("attribute source");
        assert_eq!(attribute.name.value(), "At");
        assert_eq!(attribute.format.map(|lit| lit.value()).as_deref(), Some("yyyy-MM-dd"));
        let element = attrs.element.expect("element source");
        assert_eq!(element.name.value(), "When");
        assert!(element.format.is_none());
        assert!(!attrs.skip);
    }

    #[test]
    fn rejects_invalid_field_attributes() {
        let cases: Vec<syn::Field> = vec![
            parse_quote! { #[xml(attribute = "A", element = "B")] a: i32 },
            parse_quote! { #[xml(format = "yyyy")] a: i32 },
            parse_quote! { #[xml(attribute = "A")] #[xml(attribute = "B")] a: i32 },
            parse_quote! { #[xml(skip, attribute = "A")] a: i32 },
            parse_quote! { #[xml(rename = "A")] a: i32 },
            parse_quote! { #[xml(attribute = "A", attribute = "B")] a: i32 },
        ];
        for field in cases {
            assert!(field_attrs(field).is_err());
        }
    }
}
