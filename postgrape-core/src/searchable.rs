use crate::{
    Column, Entity, Executor, QueryOptions, Repository, RepositoryConfig, RepositoryOptions,
    Result, SearchOptions, SqlWriter,
    repository::{build_query, fetch_entities, missing_argument},
    split_words,
};
use std::{borrow::Cow, collections::HashSet, ops::Deref};

pub const DEFAULT_SEARCH_LIMIT: u64 = 10;

/// Shape of one search statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchPass {
    /// No words: filter, order and paging only.
    Listing,
    /// Substring filter ordered by prefix matches first.
    Ranked,
    /// Rows where a column starts with one of the words.
    Prefix,
    /// Rows where a column contains one of the words.
    Substring,
    /// Every filtered row, closest first according to the distance function.
    Fuzzy(Cow<'static, str>),
}

/// Distance function ranking the last pass of [`SearchStrategy::MultiPass`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuzzyRanking {
    pub function: Cow<'static, str>,
}

impl Default for FuzzyRanking {
    fn default() -> Self {
        Self {
            function: "levenshtein".into(),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum SearchStrategy {
    /// One statement, prefix matches ranked above substring matches.
    #[default]
    Ranked,
    /// Prefix pass, then substring pass, then the optional fuzzy pass. Rows are deduplicated
    /// by id, earlier passes win.
    MultiPass { fuzzy: Option<FuzzyRanking> },
}

/// Repository with a free text search over some of its columns.
#[derive(Debug, Clone)]
pub struct SearchableRepository<E> {
    repository: Repository<E>,
    pub columns_for_search: Vec<Column>,
    /// Reject empty queries instead of listing the table.
    pub strict: bool,
    pub strategy: SearchStrategy,
}

impl<E: Entity> SearchableRepository<E> {
    pub fn new<C: Into<Column>>(
        options: impl Into<RepositoryOptions>,
        config: &RepositoryConfig,
        columns_for_search: impl IntoIterator<Item = C>,
    ) -> Self {
        Self {
            repository: Repository::new(options, config),
            columns_for_search: columns_for_search.into_iter().map(Into::into).collect(),
            strict: false,
            strategy: Default::default(),
        }
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_strategy(mut self, strategy: SearchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Rows matching any word of `query` in any search column, at most `limit` (10 by default).
    pub async fn search(
        &self,
        executor: &mut impl Executor,
        query: &str,
        options: SearchOptions,
    ) -> Result<Vec<E>> {
        let words = split_words(query);
        let columns = options
            .columns_for_search
            .clone()
            .unwrap_or_else(|| self.columns_for_search.clone());
        let mut options: QueryOptions = options.into();
        options.limit = Some(
            options
                .limit
                .filter(|v| *v > 0)
                .unwrap_or(DEFAULT_SEARCH_LIMIT),
        );
        if words.is_empty() {
            if self.strict {
                return Err(missing_argument("the search query is empty"));
            }
            return self
                .search_pass(executor, &[], &columns, &options, &SearchPass::Listing)
                .await;
        }
        if columns.is_empty() {
            return Err(missing_argument("there are no columns to search"));
        }
        match &self.strategy {
            SearchStrategy::Ranked => {
                self.search_pass(executor, &words, &columns, &options, &SearchPass::Ranked)
                    .await
            }
            SearchStrategy::MultiPass { fuzzy } => {
                let passes = [SearchPass::Prefix, SearchPass::Substring]
                    .into_iter()
                    .chain(fuzzy.iter().map(|v| SearchPass::Fuzzy(v.function.clone())));
                self.search_passes(executor, &words, &columns, options, passes)
                    .await
            }
        }
    }

    async fn search_pass(
        &self,
        executor: &mut impl Executor,
        words: &[&str],
        columns: &[Column],
        options: &QueryOptions,
        pass: &SearchPass,
    ) -> Result<Vec<E>> {
        let query = build_query(&*executor, |writer, context, out| {
            writer.write_search(context, out, self.table(), words, columns, options, pass)
        });
        fetch_entities(executor, query).await
    }

    async fn search_passes(
        &self,
        executor: &mut impl Executor,
        words: &[&str],
        columns: &[Column],
        options: QueryOptions,
        passes: impl Iterator<Item = SearchPass>,
    ) -> Result<Vec<E>> {
        let offset = options.offset.unwrap_or(0);
        let limit = options.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
        let pass_options = QueryOptions {
            offset: None,
            limit: Some(offset.saturating_add(limit)),
            ..options
        };
        let to_usize = |v: u64| usize::try_from(v).unwrap_or(usize::MAX);
        let (offset, limit) = (to_usize(offset), to_usize(limit));
        let wanted = offset.saturating_add(limit);
        let mut seen = HashSet::new();
        let mut result = Vec::new();
        for pass in passes {
            if result.len() >= wanted {
                break;
            }
            let rows: Vec<E> = self
                .search_pass(executor, words, columns, &pass_options, &pass)
                .await?;
            for row in rows {
                if result.len() >= wanted {
                    break;
                }
                match row.id() {
                    Some(id) if !seen.insert(id) => continue,
                    _ => result.push(row),
                }
            }
        }
        Ok(result.into_iter().skip(offset).take(limit).collect())
    }
}

impl<E> Deref for SearchableRepository<E> {
    type Target = Repository<E>;

    fn deref(&self) -> &Self::Target {
        &self.repository
    }
}
