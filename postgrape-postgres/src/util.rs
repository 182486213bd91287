use crate::{RawValue, ValueCodec};
use postgrape_core::{Context, Error, Result, Value};
use std::{env, path::Path};
use url::Url;

pub(crate) fn decode_row(codec: &dyn ValueCodec, row: &tokio_postgres::Row) -> Result<Box<[Value]>> {
    (0..row.len())
        .map(|i| {
            let context = || {
                let column = &row.columns()[i];
                format!(
                    "Could not decode column {} `{}` of type {}",
                    i,
                    column.name(),
                    column.type_()
                )
            };
            let value = row
                .try_get::<_, RawValue>(i)
                .map_err(Error::new)
                .with_context(context)?;
            codec.decode(&value.ty, value.raw).with_context(context)
        })
        .collect()
}

/// Remove a query parameter from the url, falling back to the environment variable.
pub(crate) fn take_url_param(url: &mut Url, key: &str, env_var: &str) -> Option<String> {
    let mut value = None;
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into(), v.into()))
        .collect();
    if let Some(pos) = pairs.iter().position(|(k, _)| k == key) {
        let (_, v) = pairs.remove(pos);
        value = Some(v);
    }
    if pairs.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut()
            .clear()
            .extend_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    }
    value.or_else(|| env::var(env_var).ok())
}

pub(crate) fn existing_path(value: Option<String>) -> Option<String> {
    value.filter(|v| Path::new(v).exists())
}
