mod as_fields_trait;
mod decode_field;
mod from_row_trait;

use as_fields_trait::as_fields_trait;
use decode_field::decode_field;
use from_row_trait::from_row_trait;
use proc_macro::TokenStream;
use quote::quote;
use syn::{Fields, ItemStruct, parse_macro_input};

/// Implements `Entity` and `AsFields` for a struct with named fields.
///
/// Field attributes:
/// - `#[postgrape(name = "column")]` maps the field to a differently named column.
/// - `#[postgrape(ignore)]` skips the field, it is initialized with `Default::default()`.
///
/// `Option` fields holding `None` are not written by inserts and updates.
#[proc_macro_derive(Entity, attributes(postgrape))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let item = parse_macro_input!(input as ItemStruct);
    if !matches!(item.fields, Fields::Named(..)) {
        return syn::Error::new_spanned(
            &item.ident,
            "Entity can only be derived on structs with named fields",
        )
        .to_compile_error()
        .into();
    }
    let fields = match item.fields.iter().map(decode_field).collect::<syn::Result<Vec<_>>>() {
        Ok(v) => v,
        Err(e) => return e.to_compile_error().into(),
    };
    let from_row = from_row_trait(&item, &fields);
    let as_fields = as_fields_trait(&item, &fields);
    quote! {
        #from_row
        #as_fields
    }
    .into()
}
