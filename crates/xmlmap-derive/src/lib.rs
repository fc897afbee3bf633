//! `#[derive(XmlRecord)]` for xmlmap.
//!
//! The derive reads `#[xml(...)]` attributes and generates the record
//! schema, the writable field lookup, and one `FieldKey` constant per
//! mapped field. Use it through the `xmlmap` crate, which re-exports it.

mod attrs;
mod case;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote, quote_spanned};
use syn::ext::IdentExt;
use syn::spanned::Spanned;
use syn::{parse_macro_input, Data, DeriveInput, Fields};

use attrs::{FieldAttrs, RecordAttrs};
use case::const_name;

/// Derive `xmlmap::XmlRecord` for a struct with named fields.
///
/// The struct must implement `Default`; records start from the default
/// value and mapped fields are overwritten as values are read.
///
/// Struct attributes:
/// - `#[xml(element = "Name")]` reads from `<Name>` elements instead of
///   elements named after the type.
/// - `#[xml(rename_all = "PascalCase")]` derives default attribute names
///   from field names (`camelCase`, `snake_case`, `kebab-case` and
///   `SCREAMING_SNAKE_CASE` are also accepted).
///
/// Field attributes:
/// - `#[xml(attribute = "Foo")]` or `#[xml(element = "Bar")]`, optionally
///   with `format = "yyyy-MM-dd"`. A field may carry one of each.
/// - `#[xml(skip)]` leaves the field untouched.
#[proc_macro_derive(XmlRecord, attributes(xml))]
pub fn derive_xml_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new(
                    input.ident.span(),
                    "XmlRecord requires a struct with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new(
                input.ident.span(),
                "XmlRecord can only be derived for structs",
            ))
        }
    };

    let record = RecordAttrs::parse(&input.attrs)?;
    let ident = &input.ident;
    let type_name = ident.unraw().to_string();
    let element_name = record
        .element
        .as_ref()
        .map(|name| quote!(.element_name(#name)));

    let mut descriptors = Vec::new();
    let mut slots = Vec::new();
    let mut keys = Vec::new();
    for field in fields {
        let attrs = FieldAttrs::parse(&field.attrs)?;
        let Some(member) = field.ident.as_ref() else {
            continue;
        };
        let name = member.unraw().to_string();
        if attrs.skip {
            descriptors.push(quote!(::xmlmap::FieldDescriptor::excluded(#name)));
            continue;
        }

        let ty = &field.ty;
        let mut descriptor = quote_spanned! {ty.span()=>
            ::xmlmap::FieldDescriptor::of::<#ty>(#name)
        };
        if let Some(source) = &attrs.attribute {
            let source_name = &source.name;
            descriptor.extend(match &source.format {
                Some(format) => quote!(.attribute_with_format(#source_name, #format)),
                None => quote!(.attribute(#source_name)),
            });
        }
        if let Some(source) = &attrs.element {
            let source_name = &source.name;
            descriptor.extend(match &source.format {
                Some(format) => quote!(.element_with_format(#source_name, #format)),
                None => quote!(.element(#source_name)),
            });
        }
        if let Some(rule) = record.rename_all {
            let conventional = rule.apply(&name);
            if conventional != name {
                descriptor.extend(quote!(.conventional_name(#conventional)));
            }
        }
        descriptors.push(descriptor);

        slots.push(quote! {
            #name => ::core::option::Option::Some(&mut self.#member as &mut dyn ::xmlmap::FieldSlot),
        });

        let key = format_ident!("{}", const_name(&name), span = member.span());
        keys.push(quote! {
            pub const #key: ::xmlmap::FieldKey<Self> = ::xmlmap::FieldKey::new(#name);
        });
    }

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    Ok(quote! {
        impl #impl_generics ::xmlmap::XmlRecord for #ident #ty_generics #where_clause {
            fn schema() -> ::xmlmap::RecordSchema {
                ::xmlmap::RecordSchema::new(#type_name)
                    #element_name
                    .fields(::std::vec![#(#descriptors),*])
            }

            fn field_mut(
                &mut self,
                field: &str,
            ) -> ::core::option::Option<&mut dyn ::xmlmap::FieldSlot> {
                match field {
                    #(#slots)*
                    _ => ::core::option::Option::None,
                }
            }
        }

        #[allow(dead_code)]
        impl #impl_generics #ident #ty_generics #where_clause {
            #(#keys)*
        }
    })
}
