use crate::Where;
use std::borrow::Cow;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Order {
    #[default]
    Asc,
    Desc,
}

impl Order {
    pub const fn token(&self) -> &'static str {
        match self {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        }
    }
}

pub type Column = Cow<'static, str>;

/// Ordering columns, in priority order.
pub type OrderBy = Vec<(Column, Order)>;

/// Every clause a statement can carry, composed from the per-operation options.
///
/// An absent `order` sorts by `"id" ASC`, an empty one emits no `ORDER BY`.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct QueryOptions {
    pub select: Option<Vec<Column>>,
    pub filter: Option<Where>,
    pub order: Option<OrderBy>,
    pub offset: Option<u64>,
    pub limit: Option<u64>,
    pub returning: Option<Vec<Column>>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct FindOptions {
    pub select: Option<Vec<Column>>,
    pub filter: Option<Where>,
    pub order: Option<OrderBy>,
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct FindOneOptions {
    pub select: Option<Vec<Column>>,
    pub filter: Option<Where>,
    pub order: Option<OrderBy>,
    pub offset: Option<u64>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct FindByIdOptions {
    pub select: Option<Vec<Column>>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct CreateOptions {
    pub returning: Option<Vec<Column>>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct UpdateOptions {
    pub filter: Option<Where>,
    pub returning: Option<Vec<Column>>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct UpdateByIdOptions {
    pub returning: Option<Vec<Column>>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct SearchOptions {
    /// Overrides the columns configured on the repository.
    pub columns_for_search: Option<Vec<Column>>,
    pub filter: Option<Where>,
    pub order: Option<OrderBy>,
    pub offset: Option<u64>,
    /// Zero or absent falls back to the default limit of 10.
    pub limit: Option<u64>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct CreateMultipleOptions {
    pub select: Option<Vec<Column>>,
}

impl From<FindOptions> for QueryOptions {
    fn from(value: FindOptions) -> Self {
        Self {
            select: value.select,
            filter: value.filter,
            order: value.order,
            offset: value.offset,
            limit: value.limit,
            returning: None,
        }
    }
}

impl From<FindOneOptions> for QueryOptions {
    fn from(value: FindOneOptions) -> Self {
        Self {
            select: value.select,
            filter: value.filter,
            order: value.order,
            offset: value.offset,
            limit: Some(1),
            returning: None,
        }
    }
}

impl From<CreateOptions> for QueryOptions {
    fn from(value: CreateOptions) -> Self {
        Self {
            returning: value.returning,
            ..Default::default()
        }
    }
}

impl From<UpdateOptions> for QueryOptions {
    fn from(value: UpdateOptions) -> Self {
        Self {
            filter: value.filter,
            returning: value.returning,
            ..Default::default()
        }
    }
}

impl From<SearchOptions> for QueryOptions {
    fn from(value: SearchOptions) -> Self {
        Self {
            select: None,
            filter: value.filter,
            order: value.order,
            offset: value.offset,
            limit: value.limit,
            returning: None,
        }
    }
}

impl FindByIdOptions {
    pub fn into_query_options(self, id: i64) -> QueryOptions {
        QueryOptions {
            select: self.select,
            filter: Some(Where::with_id(id)),
            limit: Some(1),
            ..Default::default()
        }
    }
}

impl UpdateByIdOptions {
    pub fn into_query_options(self, id: i64) -> QueryOptions {
        QueryOptions {
            filter: Some(Where::with_id(id)),
            returning: self.returning,
            ..Default::default()
        }
    }
}

/// Shorthand to build column lists: `columns(["id", "name"])`.
pub fn columns<C: Into<Column>>(values: impl IntoIterator<Item = C>) -> Vec<Column> {
    values.into_iter().map(Into::into).collect()
}
