use syn::{Field, Ident, LitStr, Type};

pub(crate) struct FieldMetadata {
    pub(crate) ident: Ident,
    pub(crate) ty: Type,
    /// Column name, the field name unless renamed.
    pub(crate) name: String,
    pub(crate) ignore: bool,
    /// `Option<T>` field, left out of the written fields when `None`.
    pub(crate) optional: bool,
}

pub(crate) fn decode_field(field: &Field) -> syn::Result<FieldMetadata> {
    let Some(ident) = field.ident.clone() else {
        return Err(syn::Error::new_spanned(
            field,
            "Entity can only be derived on structs with named fields",
        ));
    };
    let mut metadata = FieldMetadata {
        name: ident.to_string(),
        ident,
        ty: field.ty.clone(),
        ignore: false,
        optional: is_option(&field.ty),
    };
    for attr in field.attrs.iter().filter(|a| a.path().is_ident("postgrape")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                metadata.name = meta.value()?.parse::<LitStr>()?.value();
                Ok(())
            } else if meta.path.is_ident("ignore") {
                metadata.ignore = true;
                Ok(())
            } else {
                Err(meta.error("unsupported postgrape attribute, use `name = \"...\"` or `ignore`"))
            }
        })?;
    }
    Ok(metadata)
}

fn is_option(ty: &Type) -> bool {
    let Type::Path(path) = ty else {
        return false;
    };
    path.qself.is_none()
        && path
            .path
            .segments
            .last()
            .is_some_and(|v| v.ident == "Option")
}
