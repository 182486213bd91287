use crate::Value;
use std::borrow::Cow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    And,
    Or,
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
    GreaterOrEqual,
    LessOrEqual,
    Is,
    IsNot,
}

impl Operator {
    pub const fn token(&self) -> &'static str {
        match self {
            Operator::And => "AND",
            Operator::Or => "OR",
            Operator::Equals => "=",
            Operator::NotEquals => "!=",
            Operator::GreaterThan => ">",
            Operator::LessThan => "<",
            Operator::GreaterOrEqual => ">=",
            Operator::LessOrEqual => "<=",
            Operator::Is => "IS",
            Operator::IsNot => "IS NOT",
        }
    }
}

/// Predicate applied to a single column.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Equality, `IS null` when the value is null. A list behaves like `AnyOf`.
    Value(Value),
    /// Equality with any of the values, joined by `OR`.
    AnyOf(Vec<Value>),
    Compare(Operator, Value),
}

impl From<Value> for Condition {
    fn from(value: Value) -> Self {
        Condition::Value(value)
    }
}

/// Filter tree: column predicates joined by `AND` followed by boolean groups of nested trees.
///
/// Entries keep their insertion order, which is the order of the generated SQL.
///
/// ```rust
/// use postgrape_core::Where;
/// let filter = Where::new()
///     .eq("bar", 6)
///     .any_of("foo", ["test", "strings"])
///     .gt("id", 2)
///     .or([Where::new().eq("id", 5), Where::new().eq("id", 9)]);
/// assert_eq!(filter.len(), 4);
/// ```
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Where {
    /// Column predicates, `None` marks an absent predicate that is skipped.
    pub columns: Vec<(Cow<'static, str>, Option<Condition>)>,
    /// Boolean groups, the operator is either `And` or `Or`.
    pub groups: Vec<(Operator, Vec<Where>)>,
}

impl Where {
    pub fn new() -> Self {
        Self::default()
    }

    /// `id = <id>` filter.
    pub fn with_id(id: i64) -> Self {
        Self::new().eq("id", id)
    }

    /// Number of entries (columns and groups), regardless of whether they are live.
    pub fn len(&self) -> usize {
        self.columns.len() + self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() && self.groups.is_empty()
    }

    pub fn condition(
        mut self,
        column: impl Into<Cow<'static, str>>,
        condition: impl Into<Condition>,
    ) -> Self {
        self.columns.push((column.into(), Some(condition.into())));
        self
    }

    /// Possibly absent predicate, a `None` contributes nothing to the statement.
    pub fn maybe(mut self, column: impl Into<Cow<'static, str>>, condition: Option<Condition>) -> Self {
        self.columns.push((column.into(), condition));
        self
    }

    pub fn eq(self, column: impl Into<Cow<'static, str>>, value: impl Into<Value>) -> Self {
        self.condition(column, Condition::Value(value.into()))
    }

    pub fn any_of<V: Into<Value>>(
        self,
        column: impl Into<Cow<'static, str>>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.condition(
            column,
            Condition::AnyOf(values.into_iter().map(Into::into).collect()),
        )
    }

    pub fn compare(
        self,
        column: impl Into<Cow<'static, str>>,
        operator: Operator,
        value: impl Into<Value>,
    ) -> Self {
        self.condition(column, Condition::Compare(operator, value.into()))
    }

    pub fn ne(self, column: impl Into<Cow<'static, str>>, value: impl Into<Value>) -> Self {
        self.compare(column, Operator::NotEquals, value)
    }

    pub fn gt(self, column: impl Into<Cow<'static, str>>, value: impl Into<Value>) -> Self {
        self.compare(column, Operator::GreaterThan, value)
    }

    pub fn lt(self, column: impl Into<Cow<'static, str>>, value: impl Into<Value>) -> Self {
        self.compare(column, Operator::LessThan, value)
    }

    pub fn ge(self, column: impl Into<Cow<'static, str>>, value: impl Into<Value>) -> Self {
        self.compare(column, Operator::GreaterOrEqual, value)
    }

    pub fn le(self, column: impl Into<Cow<'static, str>>, value: impl Into<Value>) -> Self {
        self.compare(column, Operator::LessOrEqual, value)
    }

    pub fn is(self, column: impl Into<Cow<'static, str>>, value: impl Into<Value>) -> Self {
        self.compare(column, Operator::Is, value)
    }

    pub fn is_not(self, column: impl Into<Cow<'static, str>>, value: impl Into<Value>) -> Self {
        self.compare(column, Operator::IsNot, value)
    }

    pub fn and(mut self, filters: impl IntoIterator<Item = Where>) -> Self {
        self.groups
            .push((Operator::And, filters.into_iter().collect()));
        self
    }

    pub fn or(mut self, filters: impl IntoIterator<Item = Where>) -> Self {
        self.groups.push((Operator::Or, filters.into_iter().collect()));
        self
    }
}
