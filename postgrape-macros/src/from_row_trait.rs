use crate::decode_field::FieldMetadata;
use proc_macro2::TokenStream;
use quote::quote;
use syn::ItemStruct;

pub(crate) fn from_row_trait(item: &ItemStruct, fields: &[FieldMetadata]) -> TokenStream {
    let struct_name = &item.ident;
    let (impl_generics, ty_generics, where_clause) = item.generics.split_for_impl();
    let assignments = fields.iter().map(|f| {
        let ident = &f.ident;
        if f.ignore {
            return quote!(#ident: ::std::default::Default::default());
        }
        let ty = &f.ty;
        let name = &f.name;
        quote! {
            #ident: ::postgrape::Context::with_context(
                <#ty as ::postgrape::AsValue>::try_from_value(
                    row.take_column(#name).unwrap_or_default(),
                ),
                || format!(
                    "While decoding column `{}` into `{}`",
                    #name,
                    stringify!(#struct_name),
                ),
            )?
        }
    });
    let id = match fields.iter().find(|f| !f.ignore && f.name == "id") {
        Some(f) => {
            let ident = &f.ident;
            quote! {
                ::postgrape::AsValue::as_value(::std::clone::Clone::clone(&self.#ident)).as_i64()
            }
        }
        None => quote!(None),
    };
    quote! {
        impl #impl_generics ::postgrape::Entity for #struct_name #ty_generics #where_clause {
            fn from_row(mut row: ::postgrape::RowLabeled) -> ::postgrape::Result<Self> {
                Ok(Self {
                    #(#assignments,)*
                })
            }
            fn id(&self) -> Option<i64> {
                #id
            }
        }
    }
}
