use crate::decode_field::FieldMetadata;
use proc_macro2::TokenStream;
use quote::quote;
use syn::ItemStruct;

pub(crate) fn as_fields_trait(item: &ItemStruct, fields: &[FieldMetadata]) -> TokenStream {
    let struct_name = &item.ident;
    let (impl_generics, ty_generics, where_clause) = item.generics.split_for_impl();
    let pushes = fields.iter().filter(|f| !f.ignore).map(|f| {
        let ident = &f.ident;
        let name = &f.name;
        if f.optional {
            quote! {
                if let Some(v) = &self.#ident {
                    fields.0.push((
                        ::std::borrow::Cow::Borrowed(#name),
                        ::postgrape::AsValue::as_value(::std::clone::Clone::clone(v)),
                    ));
                }
            }
        } else {
            quote! {
                fields.0.push((
                    ::std::borrow::Cow::Borrowed(#name),
                    ::postgrape::AsValue::as_value(::std::clone::Clone::clone(&self.#ident)),
                ));
            }
        }
    });
    quote! {
        impl #impl_generics ::postgrape::AsFields for #struct_name #ty_generics #where_clause {
            fn as_fields(&self) -> Option<::postgrape::Fields> {
                let mut fields = ::postgrape::Fields::new();
                #(#pushes)*
                Some(fields)
            }
        }
    }
}
