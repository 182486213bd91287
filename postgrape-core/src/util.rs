pub fn separated_by<T, F>(
    out: &mut String,
    values: impl IntoIterator<Item = T>,
    mut f: F,
    separator: &str,
) where
    F: FnMut(&mut String, T),
{
    let mut len = out.len();
    for v in values {
        if out.len() > len {
            out.push_str(separator);
        }
        len = out.len();
        f(out, v);
    }
}

/// Split a search query into words on runs of whitespace and commas.
pub fn split_words(query: &str) -> Vec<&str> {
    query
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|v| !v.is_empty())
        .collect()
}

#[macro_export]
macro_rules! possibly_parenthesized {
    ($buff:ident, $cond:expr, $v:expr) => {
        if $cond {
            $buff.push('(');
            $v;
            $buff.push(')');
        } else {
            $v;
        }
    };
}

#[macro_export]
macro_rules! truncate_long {
    ($query:expr) => {{
        let end = $query
            .char_indices()
            .nth(497)
            .map(|(i, _)| i)
            .unwrap_or($query.len());
        format!(
            "{}{}\n",
            &$query[..end].trim_end(),
            if end < $query.len() { "..." } else { "" },
        )
    }};
}
