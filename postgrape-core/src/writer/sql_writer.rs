use crate::{
    Column, Condition, Fields, Fragment, Operator, Order, QueryOptions, SearchPass, TableRef, Value,
    Where, possibly_parenthesized, separated_by, writer::Context,
};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use std::fmt::Write;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

macro_rules! write_integer {
    ($out:ident, $value:expr) => {{
        let mut buffer = itoa::Buffer::new();
        $out.push_str(buffer.format($value));
    }};
}
macro_rules! write_float {
    ($this:ident, $context:ident, $out:ident, $value:expr) => {{
        if $value.is_infinite() {
            $this.write_value_infinity($context, $out, $value.is_sign_negative());
        } else if $value.is_nan() {
            $this.write_value_nan($context, $out);
        } else {
            let mut buffer = ryu::Buffer::new();
            $out.push_str(buffer.format($value));
        }
    }};
}

/// Everything but the characters `encodeURI` leaves untouched, `-` and `'` stay encoded.
const URI_ESCAPED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b';')
    .remove(b',')
    .remove(b'/')
    .remove(b'?')
    .remove(b':')
    .remove(b'@')
    .remove(b'&')
    .remove(b'=')
    .remove(b'+')
    .remove(b'$')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'(')
    .remove(b')')
    .remove(b'#');

/// Dialect printer converting filters, options and transaction commands into SQL.
///
/// Table names are quoted and schemas are not. Columns are quoted in `SET`, `ORDER BY` and
/// `INSERT` lists, and left bare in `WHERE`, select and `RETURNING` lists.
pub trait SqlWriter {
    /// Escape occurrences of `search` char with `replace` while copying into buffer.
    fn write_escaped(
        &self,
        _context: &mut Context,
        out: &mut String,
        value: &str,
        search: char,
        replace: &str,
    ) {
        let mut position = 0;
        for (i, c) in value.char_indices() {
            if c == search {
                out.push_str(&value[position..i]);
                out.push_str(replace);
                position = i + 1;
            }
        }
        out.push_str(&value[position..]);
    }

    /// Percent encode like `encodeURI`, additionally escaping `'` and `-`.
    fn write_uri_escaped(&self, _context: &mut Context, out: &mut String, value: &str) {
        out.extend(utf8_percent_encode(value, URI_ESCAPED));
    }

    /// Quote identifiers ("name") doubling inner quotes.
    fn write_identifier_quoted(&self, context: &mut Context, out: &mut String, value: &str) {
        out.push('"');
        self.write_escaped(context, out, value, '"', "\"\"");
        out.push('"');
    }

    /// `schema."table"`
    fn write_table_ref(&self, context: &mut Context, out: &mut String, value: &TableRef) {
        out.push_str(&value.schema);
        out.push('.');
        self.write_identifier_quoted(context, out, &value.name);
    }

    /// `schema.table`, used by search statements.
    fn write_table_ref_unquoted(&self, _context: &mut Context, out: &mut String, value: &TableRef) {
        out.push_str(&value.schema);
        out.push('.');
        out.push_str(&value.name);
    }

    fn write_column_name(&self, context: &mut Context, out: &mut String, value: &str) {
        match context.fragment {
            Fragment::SqlSelectOrderBy | Fragment::SqlInsertInto | Fragment::SqlUpdateSet => {
                self.write_identifier_quoted(context, out, value)
            }
            _ => out.push_str(value),
        }
    }

    /// Comma separated columns, `*` when absent or empty.
    fn write_column_list(&self, context: &mut Context, out: &mut String, columns: Option<&[Column]>) {
        match columns {
            Some(columns) if !columns.is_empty() => separated_by(
                out,
                columns,
                |out, v| self.write_column_name(context, out, v),
                ", ",
            ),
            _ => out.push('*'),
        }
    }

    /// Value handed to the driver as a parameter. Durations travel as `hh:mm:ss` text.
    fn serialize_parameter(&self, value: Value) -> Value {
        match value {
            Value::Interval(Some(v)) => Value::Varchar(Some(v.to_string())),
            Value::List(Some(v), ty) => Value::List(
                Some(v.into_iter().map(|v| self.serialize_parameter(v)).collect()),
                match *ty {
                    Value::Interval(..) => Box::new(Value::Varchar(None)),
                    ty => Box::new(ty),
                },
            ),
            v => v,
        }
    }

    /// Bind the value as the next positional parameter.
    fn write_parameter(&self, context: &mut Context, out: &mut String, value: &Value) {
        let position = context.push_parameter(self.serialize_parameter(value.clone()));
        out.push('$');
        write_integer!(out, position);
    }

    /// Value as a parameter or as a literal depending on the context. An unsupported literal
    /// writes nothing.
    fn write_value(&self, context: &mut Context, out: &mut String, value: &Value) {
        if context.parameterized && !value.is_null() {
            self.write_parameter(context, out, value);
        } else {
            self.write_value_inline(context, out, value);
        }
    }

    fn write_value_inline(&self, context: &mut Context, out: &mut String, value: &Value) {
        match value {
            v if v.is_null() => self.write_value_none(context, out),
            Value::Boolean(Some(v)) => self.write_value_bool(context, out, *v),
            Value::Int16(Some(v)) => write_integer!(out, *v),
            Value::Int32(Some(v)) => write_integer!(out, *v),
            Value::Int64(Some(v)) => write_integer!(out, *v),
            Value::Float32(Some(v)) => write_float!(self, context, out, *v),
            Value::Float64(Some(v)) => write_float!(self, context, out, *v),
            Value::Decimal(Some(v)) => {
                let _ = write!(out, "{}", v);
            }
            Value::Varchar(Some(v)) => self.write_value_string(context, out, v),
            Value::Blob(Some(v)) => self.write_value_blob(context, out, v),
            Value::Date(Some(v)) => {
                let mut text = String::new();
                write_date(&mut text, v);
                self.write_value_string(context, out, &text);
            }
            Value::Time(Some(v)) => {
                let mut text = String::new();
                write_time(&mut text, v);
                self.write_value_string(context, out, &text);
            }
            Value::Timestamp(Some(v)) => {
                self.write_value_string(context, out, &iso_timestamp(v, ""))
            }
            Value::TimestampWithTimezone(Some(v)) => {
                self.write_value_timestamptz(context, out, v)
            }
            Value::Interval(Some(v)) => self.write_value_string(context, out, &v.to_string()),
            Value::TimeTz(Some(v)) => self.write_value_string(context, out, &v.to_string()),
            Value::Uuid(Some(v)) => self.write_value_string(context, out, &v.to_string()),
            Value::List(Some(v), ..) => self.write_value_list(context, out, v),
            _ => log::error!("Cannot write {:?} as a literal", value),
        }
    }

    fn write_value_none(&self, _context: &mut Context, out: &mut String) {
        out.push_str("null");
    }

    fn write_value_bool(&self, _context: &mut Context, out: &mut String, value: bool) {
        out.push_str(["false", "true"][value as usize]);
    }

    fn write_value_infinity(&self, _context: &mut Context, out: &mut String, negative: bool) {
        out.push_str(if negative { "'-Infinity'" } else { "'Infinity'" });
    }

    fn write_value_nan(&self, _context: &mut Context, out: &mut String) {
        out.push_str("'NaN'");
    }

    /// Quoted literal with its content percent encoded.
    fn write_value_string(&self, context: &mut Context, out: &mut String, value: &str) {
        out.push('\'');
        self.write_uri_escaped(context, out, value);
        out.push('\'');
    }

    /// Blobs have no portable literal, nothing is written and the predicate is dropped.
    fn write_value_blob(&self, _context: &mut Context, _out: &mut String, _value: &[u8]) {}

    /// Lists have no literal form, nothing is written and the predicate is dropped.
    fn write_value_list(&self, _context: &mut Context, _out: &mut String, _value: &[Value]) {}

    /// ISO 8601 instant in UTC with millisecond precision.
    fn write_value_timestamptz(&self, context: &mut Context, out: &mut String, value: &OffsetDateTime) {
        let utc = value.to_offset(UtcOffset::UTC);
        self.write_value_string(
            context,
            out,
            &iso_timestamp(&PrimitiveDateTime::new(utc.date(), utc.time()), "Z"),
        );
    }

    /// Compile a filter tree on its own, returning the fragment and the parameters it produced.
    fn compile_where(&self, filter: &Where, parameterized: bool) -> (String, Vec<Value>) {
        let mut context = Context::new(Fragment::SqlSelectWhere, parameterized);
        let mut out = String::new();
        self.write_where(&mut context, &mut out, filter);
        (out, context.parameters)
    }

    /// Write the predicate of a filter tree, returns false when no predicate is live.
    fn write_where(&self, context: &mut Context, out: &mut String, filter: &Where) -> bool {
        let mut fragments = Vec::with_capacity(filter.len());
        for (column, condition) in &filter.columns {
            let Some(condition) = condition else {
                continue;
            };
            let mut fragment = String::new();
            if self.write_condition(context, &mut fragment, column, condition) {
                fragments.push(fragment);
            }
        }
        for (operator, filters) in &filter.groups {
            let mut fragment = String::new();
            if self.write_where_group(context, &mut fragment, *operator, filters) {
                fragments.push(fragment);
            }
        }
        possibly_parenthesized!(
            out,
            fragments.len() > 1,
            separated_by(out, &fragments, |out, v| out.push_str(v), " AND ")
        );
        !fragments.is_empty()
    }

    /// Nested trees joined by the group operator, always parenthesized.
    fn write_where_group(
        &self,
        context: &mut Context,
        out: &mut String,
        operator: Operator,
        filters: &[Where],
    ) -> bool {
        let fragments = filters
            .iter()
            .filter_map(|filter| {
                let mut fragment = String::new();
                self.write_where(context, &mut fragment, filter)
                    .then_some(fragment)
            })
            .collect::<Vec<_>>();
        if fragments.is_empty() {
            return false;
        }
        let separator = format!(" {} ", operator.token());
        out.push('(');
        separated_by(out, &fragments, |out, v| out.push_str(v), &separator);
        out.push(')');
        true
    }

    fn write_condition(
        &self,
        context: &mut Context,
        out: &mut String,
        column: &str,
        condition: &Condition,
    ) -> bool {
        match condition {
            Condition::Value(Value::List(Some(values), ..)) | Condition::AnyOf(values) => {
                self.write_condition_any_of(context, out, column, values)
            }
            Condition::Value(value) if value.is_null() => {
                self.write_column_name(context, out, column);
                out.push_str(" IS ");
                self.write_value_none(context, out);
                true
            }
            Condition::Value(value) => {
                self.write_comparison(context, out, column, Operator::Equals, value)
            }
            Condition::Compare(operator, value) => {
                self.write_comparison(context, out, column, *operator, value)
            }
        }
    }

    /// `column <op> value`, dropped when the value writes nothing.
    fn write_comparison(
        &self,
        context: &mut Context,
        out: &mut String,
        column: &str,
        operator: Operator,
        value: &Value,
    ) -> bool {
        let mut literal = String::new();
        self.write_value(context, &mut literal, value);
        if literal.is_empty() {
            return false;
        }
        self.write_column_name(context, out, column);
        let _ = write!(out, " {} ", operator.token());
        out.push_str(&literal);
        true
    }

    /// `(column = a OR column = b)`, parenthesized even with a single value.
    fn write_condition_any_of(
        &self,
        context: &mut Context,
        out: &mut String,
        column: &str,
        values: &[Value],
    ) -> bool {
        let fragments = values
            .iter()
            .filter_map(|value| {
                let mut fragment = String::new();
                if value.is_null() {
                    self.write_column_name(context, &mut fragment, column);
                    fragment.push_str(" IS ");
                    self.write_value_none(context, &mut fragment);
                    return Some(fragment);
                }
                self.write_comparison(context, &mut fragment, column, Operator::Equals, value)
                    .then_some(fragment)
            })
            .collect::<Vec<_>>();
        if fragments.is_empty() {
            return false;
        }
        out.push('(');
        separated_by(out, &fragments, |out, v| out.push_str(v), " OR ");
        out.push(')');
        true
    }

    /// ` WHERE <predicate>` when the filter has a live predicate.
    fn write_where_clause(&self, context: &mut Context, out: &mut String, filter: Option<&Where>) -> bool {
        let Some(filter) = filter else {
            return false;
        };
        let len = out.len();
        out.push_str(" WHERE ");
        let mut context = context.switch_fragment(Fragment::SqlSelectWhere);
        if !self.write_where(&mut context, out, filter) {
            out.truncate(len);
            return false;
        }
        true
    }

    /// Ordering list, `"id" ASC` when absent. Returns false when nothing was written.
    fn write_order_list(
        &self,
        context: &mut Context,
        out: &mut String,
        order: Option<&[(Column, Order)]>,
    ) -> bool {
        let mut context = context.switch_fragment(Fragment::SqlSelectOrderBy);
        match order {
            None => {
                self.write_column_name(&mut context, out, "id");
                out.push_str(" ASC");
                true
            }
            Some(order) => {
                separated_by(
                    out,
                    order,
                    |out, (column, order)| {
                        self.write_column_name(&mut context, out, column);
                        out.push(' ');
                        out.push_str(order.token());
                    },
                    ", ",
                );
                !order.is_empty()
            }
        }
    }

    fn write_order_by_clause(
        &self,
        context: &mut Context,
        out: &mut String,
        order: Option<&[(Column, Order)]>,
    ) {
        let len = out.len();
        out.push_str(" ORDER BY ");
        if !self.write_order_list(context, out, order) {
            out.truncate(len);
        }
    }

    /// OFFSET and LIMIT, each only when non zero.
    fn write_offset_limit(
        &self,
        _context: &mut Context,
        out: &mut String,
        offset: Option<u64>,
        limit: Option<u64>,
    ) {
        if let Some(offset) = offset.filter(|v| *v > 0) {
            out.push_str(" OFFSET ");
            write_integer!(out, offset);
        }
        if let Some(limit) = limit.filter(|v| *v > 0) {
            out.push_str(" LIMIT ");
            write_integer!(out, limit);
        }
    }

    fn write_returning(&self, context: &mut Context, out: &mut String, columns: Option<&[Column]>) {
        out.push_str(" RETURNING ");
        let mut context = context.switch_fragment(Fragment::SqlReturning);
        self.write_column_list(&mut context, out, columns);
    }

    fn write_select(
        &self,
        context: &mut Context,
        out: &mut String,
        table: &TableRef,
        options: &QueryOptions,
    ) {
        out.push_str("SELECT ");
        {
            let mut context = context.switch_fragment(Fragment::SqlSelect);
            self.write_column_list(&mut context, out, options.select.as_deref());
        }
        out.push_str(" FROM ");
        self.write_table_ref(context, out, table);
        self.write_where_clause(context, out, options.filter.as_ref());
        self.write_order_by_clause(context, out, options.order.as_deref());
        self.write_offset_limit(context, out, options.offset, options.limit);
    }

    fn write_insert(
        &self,
        context: &mut Context,
        out: &mut String,
        table: &TableRef,
        fields: &Fields,
        options: &QueryOptions,
    ) {
        out.push_str("INSERT INTO ");
        self.write_table_ref(context, out, table);
        out.push_str(" (");
        {
            let mut context = context.switch_fragment(Fragment::SqlInsertInto);
            separated_by(
                out,
                fields.iter(),
                |out, (column, _)| self.write_column_name(&mut context, out, column),
                ", ",
            );
        }
        out.push_str(") VALUES (");
        {
            let mut context = context.switch_fragment(Fragment::SqlInsertIntoValues);
            separated_by(
                out,
                fields.iter(),
                |out, (_, value)| self.write_parameter(&mut context, out, value),
                ", ",
            );
        }
        out.push(')');
        self.write_returning(context, out, options.returning.as_deref());
    }

    fn write_update(
        &self,
        context: &mut Context,
        out: &mut String,
        table: &TableRef,
        fields: &Fields,
        options: &QueryOptions,
    ) {
        out.push_str("UPDATE ");
        self.write_table_ref(context, out, table);
        out.push_str(" SET ");
        {
            let mut context = context.switch_fragment(Fragment::SqlUpdateSet);
            separated_by(
                out,
                fields.iter(),
                |out, (column, value)| {
                    self.write_column_name(&mut context, out, column);
                    out.push('=');
                    self.write_parameter(&mut context, out, value);
                },
                ", ",
            );
        }
        self.write_where_clause(context, out, options.filter.as_ref());
        self.write_returning(context, out, options.returning.as_deref());
    }

    /// Search statement of the given pass over `schema.table`.
    ///
    /// The words become the parameters, `$i` always refers to the i-th word.
    fn write_search(
        &self,
        context: &mut Context,
        out: &mut String,
        table: &TableRef,
        words: &[&str],
        columns: &[Column],
        options: &QueryOptions,
        pass: &SearchPass,
    ) {
        out.push_str("SELECT * FROM ");
        self.write_table_ref_unquoted(context, out, table);
        let placeholders = if matches!(pass, SearchPass::Listing) {
            Vec::new()
        } else {
            words
                .iter()
                .map(|w| context.push_parameter(Value::Varchar(Some((*w).into()))))
                .collect::<Vec<_>>()
        };
        let len = out.len();
        out.push_str(" WHERE ");
        let mut has_where = {
            let mut context = context.switch_fragment(Fragment::SqlSelectWhere);
            options
                .filter
                .as_ref()
                .map(|f| self.write_where(&mut context, out, f))
                .unwrap_or(false)
        };
        if matches!(
            pass,
            SearchPass::Ranked | SearchPass::Prefix | SearchPass::Substring
        ) {
            if has_where {
                out.push_str(" AND ");
            }
            let prefix = matches!(pass, SearchPass::Prefix);
            let mut context = context.switch_fragment(Fragment::SqlSelectWhere);
            self.write_search_match(&mut context, out, columns, &placeholders, prefix);
            has_where = true;
        }
        if !has_where {
            out.truncate(len);
        }
        let len = out.len();
        out.push_str(" ORDER BY ");
        let mut has_order = {
            let mut context = context.switch_fragment(Fragment::SqlSearchRank);
            match pass {
                SearchPass::Ranked => {
                    self.write_search_rank(&mut context, out, columns, &placeholders);
                    true
                }
                SearchPass::Fuzzy(function) => {
                    self.write_search_distance(&mut context, out, columns, &placeholders, function);
                    true
                }
                _ => false,
            }
        };
        let mark = out.len();
        if has_order {
            out.push_str(", ");
        }
        if self.write_order_list(context, out, options.order.as_deref()) {
            has_order = true;
        } else {
            out.truncate(mark);
        }
        if !has_order {
            out.truncate(len);
        }
        self.write_offset_limit(context, out, options.offset, options.limit);
    }

    /// `(c ILIKE '%' || $1 || '%' OR ...)`, or the prefix form `c ILIKE $1 || '%'`.
    fn write_search_match(
        &self,
        context: &mut Context,
        out: &mut String,
        columns: &[Column],
        placeholders: &[usize],
        prefix: bool,
    ) {
        out.push('(');
        separated_by(
            out,
            columns
                .iter()
                .flat_map(|c| placeholders.iter().map(move |p| (c, p))),
            |out, (column, placeholder)| {
                self.write_column_name(context, out, column);
                out.push_str(if prefix { " ILIKE $" } else { " ILIKE '%' || $" });
                write_integer!(out, *placeholder);
                out.push_str(" || '%'");
            },
            " OR ",
        );
        out.push(')');
    }

    /// Prefix matches first: `c ILIKE $1 || '%' DESC NULLS LAST, ...`.
    fn write_search_rank(
        &self,
        context: &mut Context,
        out: &mut String,
        columns: &[Column],
        placeholders: &[usize],
    ) {
        separated_by(
            out,
            columns
                .iter()
                .flat_map(|c| placeholders.iter().map(move |p| (c, p))),
            |out, (column, placeholder)| {
                self.write_column_name(context, out, column);
                out.push_str(" ILIKE $");
                write_integer!(out, *placeholder);
                out.push_str(" || '%' DESC NULLS LAST");
            },
            ", ",
        );
    }

    /// Closest first: `function(LOWER(c::text), LOWER($1)) ASC, ...`.
    fn write_search_distance(
        &self,
        context: &mut Context,
        out: &mut String,
        columns: &[Column],
        placeholders: &[usize],
        function: &str,
    ) {
        separated_by(
            out,
            columns
                .iter()
                .flat_map(|c| placeholders.iter().map(move |p| (c, p))),
            |out, (column, placeholder)| {
                out.push_str(function);
                out.push_str("(LOWER(");
                self.write_column_name(context, out, column);
                out.push_str("::text), LOWER($");
                write_integer!(out, *placeholder);
                out.push_str(")) ASC");
            },
            ", ",
        );
    }

    /// `SELECT * FROM schema.insert_multiple_table(<literals>, <count>)`.
    fn write_create_multiple(
        &self,
        context: &mut Context,
        out: &mut String,
        table: &TableRef,
        arguments: &[Value],
        count: u64,
        select: Option<&[Column]>,
    ) {
        out.push_str("SELECT ");
        {
            let mut context = context.switch_fragment(Fragment::SqlSelect);
            self.write_column_list(&mut context, out, select);
        }
        out.push_str(" FROM ");
        out.push_str(&table.schema);
        out.push('.');
        out.push_str(&self.create_multiple_function(table));
        out.push('(');
        let mut context = context.switch_fragment(Fragment::SqlCall);
        for argument in arguments {
            let len = out.len();
            self.write_value_inline(&mut context, out, argument);
            if out.len() == len {
                self.write_value_none(&mut context, out);
            }
            out.push_str(", ");
        }
        write_integer!(out, count);
        out.push(')');
    }

    /// Name of the stored procedure inserting many rows, also the label of its result column.
    fn create_multiple_function(&self, table: &TableRef) -> String {
        format!("insert_multiple_{}", table.name)
    }

    fn write_transaction_begin(&self, out: &mut String) {
        out.push_str("BEGIN");
    }

    fn write_transaction_commit(&self, out: &mut String) {
        out.push_str("COMMIT");
    }

    fn write_transaction_rollback(&self, out: &mut String) {
        out.push_str("ROLLBACK");
    }

    fn write_savepoint(&self, out: &mut String, name: &str) {
        out.push_str("SAVEPOINT ");
        out.push_str(name);
    }

    fn write_rollback_to_savepoint(&self, out: &mut String, name: &str) {
        out.push_str("ROLLBACK TO SAVEPOINT ");
        out.push_str(name);
    }
}

fn write_date(out: &mut String, value: &Date) {
    let _ = write!(
        out,
        "{:04}-{:02}-{:02}",
        value.year(),
        value.month() as u8,
        value.day()
    );
}

fn write_time(out: &mut String, value: &Time) {
    let _ = write!(
        out,
        "{:02}:{:02}:{:02}",
        value.hour(),
        value.minute(),
        value.second()
    );
    let micros = value.microsecond();
    if micros != 0 {
        let _ = write!(out, ".{:06}", micros);
    }
}

fn iso_timestamp(value: &PrimitiveDateTime, suffix: &str) -> String {
    let mut out = String::with_capacity(24 + suffix.len());
    write_date(&mut out, &value.date());
    let _ = write!(
        out,
        "T{:02}:{:02}:{:02}.{:03}{}",
        value.hour(),
        value.minute(),
        value.second(),
        value.millisecond(),
        suffix
    );
    out
}

/// Fallback SQL writer, Postgres flavoured.
#[derive(Default, Debug, Clone, Copy)]
pub struct GenericSqlWriter;

impl GenericSqlWriter {
    pub const fn new() -> Self {
        Self {}
    }
}

impl SqlWriter for GenericSqlWriter {}
