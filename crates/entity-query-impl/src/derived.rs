// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Queries derived from method names.
//!
//! A [`PartTreeQuery`] is built once per repository method. Construction
//! parses the method name and validates the declared parameters, so broken
//! methods fail early. Every invocation then turns the arguments into a
//! [`PreparedQuery`]: rendered text, binder, and result bounds.
//!
//! # Result bounds
//!
//! | Source | Effect |
//! |--------|--------|
//! | page request | first result = offset, max results = page size |
//! | offset scroll position | first result = offset + 1 |
//! | `Limit` argument | max results |
//! | `First3`/`Top3` | max results capped to 3, first result shifted back |
//! | `exists` | max results = 1 |
//! | scroll query | one extra row to detect a following window |

use std::{fmt, sync::Arc};

use entity_query_core::{
    KeysetScrollPosition, ManagedType, Metamodel, MethodParameters, ParameterAccessor, Query,
    QueryFactory, ReturnedType, ScrollPosition, Sort, Value, Window
};
use tracing::debug;

use crate::{
    binder::ErrorHandling,
    binding::ParameterBinding,
    cache::{CacheKey, CachedQuery, DEFAULT_CACHE_CAPACITY, PartTreeQueryCache},
    creator::{CreatorOptions, JpqlQueryCreator, PartTreeQueryCreator, validate},
    error::{QueryError, QueryResult},
    keyset::{KeysetScrollQueryCreator, ScrollDelegate},
    part_tree::PartTree
};

/// Query of one invocation, ready to be created and bound.
#[derive(Debug, Clone)]
pub struct PreparedQuery {
    cached:       Arc<CachedQuery>,
    first_result: Option<usize>,
    max_results:  Option<usize>,
    window:       Option<usize>,
    sort:         Sort
}

impl PreparedQuery {
    fn new(cached: Arc<CachedQuery>) -> Self {
        Self {
            cached,
            first_result: None,
            max_results: None,
            window: None,
            sort: Sort::unsorted()
        }
    }

    /// Rendered query.
    pub fn query_string(&self) -> &str {
        self.cached.query()
    }

    /// Bindings of the rendered query.
    pub fn bindings(&self) -> &[ParameterBinding] {
        self.cached.bindings()
    }

    /// Rows to skip, if set.
    pub const fn first_result(&self) -> Option<usize> {
        self.first_result
    }

    /// Rows to read, if bounded.
    pub const fn max_results(&self) -> Option<usize> {
        self.max_results
    }

    /// Window size of a scroll query.
    pub const fn window_size(&self) -> Option<usize> {
        self.window
    }

    /// Sort the query ran with; the completed keyset sort for keyset scrolls.
    pub const fn sort(&self) -> &Sort {
        &self.sort
    }

    /// Check if rows are read as tuples.
    pub fn use_tuple_query(&self) -> bool {
        self.cached.use_tuple_query()
    }

    /// Create the provider query, bind `accessor` and apply the bounds.
    ///
    /// # Errors
    ///
    /// Provider errors and binding failures.
    pub fn create<F>(&self, factory: &F, accessor: &dyn ParameterAccessor) -> QueryResult<F::Query>
    where
        F: QueryFactory
    {
        let mut query = factory
            .create_query(self.query_string(), false, self.use_tuple_query())
            .map_err(QueryError::provider)?;
        self.cached.binder().bind(&mut query, accessor, ErrorHandling::Strict)?;
        if let Some(first) = self.first_result {
            query.set_first_result(first);
        }
        if let Some(max) = self.max_results {
            query.set_max_results(max);
        }
        Ok(query)
    }
}

/// Query derived from a repository method name.
///
/// # Example
///
/// ```rust,ignore
/// let query = PartTreeQuery::new("findByLastnameOrderByAgeDesc", "app.User", metamodel, parameters)?;
/// let prepared = query.prepare(&Arguments::new().with("lastname", "Matthews"))?;
///
/// assert_eq!(
///     prepared.query_string(),
///     "SELECT u FROM User u WHERE u.lastname = ?1 ORDER BY u.age desc"
/// );
/// ```
pub struct PartTreeQuery {
    tree:          PartTree,
    entity:        ManagedType,
    metamodel:     Arc<dyn Metamodel>,
    parameters:    MethodParameters,
    returned_type: ReturnedType,
    options:       CreatorOptions,
    queries:       PartTreeQueryCache,
    counts:        PartTreeQueryCache
}

impl fmt::Debug for PartTreeQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartTreeQuery")
            .field("method", &self.parameters.method_name())
            .field("entity", &self.entity.entity_name())
            .field("returned_type", &self.returned_type)
            .finish_non_exhaustive()
    }
}

impl PartTreeQuery {
    /// Derive the query of `method_name` on the repository of `entity_name`.
    ///
    /// # Arguments
    ///
    /// * `method_name` — Repository method, e.g. `findByLastnameIn`
    /// * `entity_name` — Fully qualified name of the domain type
    /// * `metamodel` — Entity lookup
    /// * `parameters` — Declared method parameters
    ///
    /// # Errors
    ///
    /// - [`QueryError::InvalidQuery`] for an unknown entity or an
    ///   unsupported keyword
    /// - [`QueryError::PropertyNotFound`] for unknown properties
    /// - [`QueryError::InvalidArgument`] when parameters do not fit the
    ///   method name
    pub fn new(
        method_name: &str,
        entity_name: &str,
        metamodel: Arc<dyn Metamodel>,
        parameters: MethodParameters
    ) -> QueryResult<Self> {
        let entity = metamodel
            .entity(entity_name)
            .cloned()
            .ok_or_else(|| QueryError::InvalidQuery(format!("Not a managed entity: {entity_name}")))?;
        let tree = PartTree::parse(method_name, &entity, metamodel.as_ref())?;
        validate(&tree, &parameters)?;

        let query = Self {
            tree,
            entity,
            metamodel,
            parameters,
            returned_type: ReturnedType::Domain,
            options: CreatorOptions::default(),
            queries: PartTreeQueryCache::default(),
            counts: PartTreeQueryCache::default()
        };
        query.check()?;
        debug!(method = method_name, entity = entity_name, "created part tree query");
        Ok(query)
    }

    /// Result shape requested by the method.
    ///
    /// # Errors
    ///
    /// [`QueryError::PropertyNotFound`] when a projected property does not
    /// exist.
    pub fn returning(mut self, returned_type: ReturnedType) -> QueryResult<Self> {
        self.returned_type = returned_type;
        self.check()?;
        Ok(self)
    }

    /// Rendering options.
    ///
    /// # Errors
    ///
    /// See [`PartTreeQuery::returning`].
    pub fn with_options(mut self, options: CreatorOptions) -> QueryResult<Self> {
        self.options = options;
        self.queries = PartTreeQueryCache::new(DEFAULT_CACHE_CAPACITY);
        self.counts = PartTreeQueryCache::new(DEFAULT_CACHE_CAPACITY);
        self.check()?;
        Ok(self)
    }

    /// Cache at most `capacity` rendered queries per shape.
    #[must_use]
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.queries = PartTreeQueryCache::new(capacity);
        self.counts = PartTreeQueryCache::new(capacity);
        self
    }

    /// Parsed method name.
    pub const fn tree(&self) -> &PartTree {
        &self.tree
    }

    /// Number of cached select queries.
    pub fn cached_queries(&self) -> usize {
        self.queries.len()
    }

    /// Render once without arguments so creation errors surface early.
    fn check(&self) -> QueryResult<()> {
        self.creator(None).create_query(&Sort::unsorted()).map(|_| ())
    }

    fn creator<'a>(&'a self, values: Option<&'a dyn ParameterAccessor>) -> PartTreeQueryCreator<'a> {
        let creator =
            PartTreeQueryCreator::new(&self.tree, &self.entity, self.metamodel.as_ref(), &self.parameters)
                .returning(self.returned_type.clone())
                .with_options(self.options);
        match values {
            Some(values) => creator.with_values(values),
            None => creator
        }
    }

    fn render(&self, sort: &Sort, accessor: &dyn ParameterAccessor, counting: bool) -> QueryResult<CachedQuery> {
        let mut creator = self.creator(Some(accessor));
        if counting {
            creator = creator.counting();
        }
        let query = creator.create_query(sort)?;
        Ok(CachedQuery::new(
            query,
            creator.bindings().to_vec(),
            creator.binder()?,
            creator.use_tuple_query()
        ))
    }

    fn cached(
        &self,
        cache: &PartTreeQueryCache,
        sort: &Sort,
        accessor: &dyn ParameterAccessor,
        counting: bool
    ) -> QueryResult<Arc<CachedQuery>> {
        if accessor.has_bindable_null_value() {
            return Ok(Arc::new(self.render(sort, accessor, counting)?));
        }
        let key = CacheKey::of(sort, accessor);
        if let Some(hit) = cache.get(&key) {
            return Ok(hit);
        }
        Ok(cache.put(key, self.render(sort, accessor, counting)?))
    }

    fn keyset(
        &self,
        position: &KeysetScrollPosition,
        sort: &Sort,
        accessor: &dyn ParameterAccessor
    ) -> QueryResult<(CachedQuery, Sort)> {
        let mut creator = KeysetScrollQueryCreator::new(self.creator(Some(accessor)), position);
        let query = creator.create_query(sort)?;
        let cached = CachedQuery::new(
            query,
            creator.bindings().to_vec(),
            creator.binder()?,
            creator.use_tuple_query()
        );
        Ok((cached, creator.keyset_sort().clone()))
    }

    /// Select query for one invocation.
    ///
    /// # Errors
    ///
    /// Unsafe or unresolvable sort properties, incomplete keyset positions
    /// and ignore-case on non-string properties.
    pub fn prepare(&self, accessor: &dyn ParameterAccessor) -> QueryResult<PreparedQuery> {
        let sort = accessor.sort();
        let position = accessor.scroll_position();

        let mut prepared = match position {
            Some(ScrollPosition::Keyset(keyset)) => {
                let (cached, keyset_sort) = self.keyset(keyset, &sort, accessor)?;
                let mut prepared = PreparedQuery::new(Arc::new(cached));
                prepared.sort = keyset_sort;
                prepared
            }
            Some(ScrollPosition::Offset(_)) | None => {
                let mut prepared = PreparedQuery::new(self.cached(&self.queries, &sort, accessor, false)?);
                prepared.sort = self.tree.sort().and(&sort);
                prepared
            }
        };

        let pageable = accessor.pageable();
        prepared.first_result = pageable.offset().map(to_usize);
        prepared.max_results = pageable.page_size().map(to_usize);
        if let Some(ScrollPosition::Offset(offset)) = position
            && !offset.is_initial()
        {
            prepared.first_result = Some(to_usize(offset.start()));
        }
        if let Some(limit) = accessor.limit().max() {
            prepared.max_results = Some(limit);
        }
        self.restrict(&mut prepared);

        if position.is_some() {
            prepared.window = prepared.max_results;
            prepared.max_results = prepared.max_results.map(|max| max.saturating_add(1));
        }
        Ok(prepared)
    }

    /// Count query for one invocation. Sorting and bounds do not apply.
    ///
    /// # Errors
    ///
    /// See [`PartTreeQuery::prepare`].
    pub fn prepare_count(&self, accessor: &dyn ParameterAccessor) -> QueryResult<PreparedQuery> {
        let cached = self.cached(&self.counts, &Sort::unsorted(), accessor, true)?;
        Ok(PreparedQuery::new(cached))
    }

    fn restrict(&self, prepared: &mut PreparedQuery) {
        if let Some(tree_max) = self.tree.max_results() {
            if let Some(max) = prepared.max_results
                && max > tree_max
                && let Some(first) = prepared.first_result
                && first > 0
            {
                prepared.first_result = Some(first.saturating_sub(max - tree_max));
            }
            prepared.max_results = Some(tree_max);
        }
        if self.tree.is_exists_projection() {
            prepared.max_results = Some(1);
        }
    }

    /// Run the select query.
    ///
    /// # Errors
    ///
    /// Creation, binding and provider errors.
    pub fn execute<F>(
        &self,
        factory: &F,
        accessor: &dyn ParameterAccessor
    ) -> QueryResult<Vec<<F::Query as Query>::Row>>
    where
        F: QueryFactory
    {
        let mut query = self.prepare(accessor)?.create(factory, accessor)?;
        query.result_list().map_err(QueryError::provider)
    }

    /// Run a scroll query and assemble the window.
    ///
    /// # Arguments
    ///
    /// * `factory` — Creates provider queries
    /// * `accessor` — Invocation arguments, carrying the scroll position
    /// * `key_of` — Value of a sort property of a row
    ///
    /// # Errors
    ///
    /// [`QueryError::InvalidArgument`] without a scroll position, plus the
    /// errors of [`PartTreeQuery::execute`].
    pub fn scroll<F, K>(
        &self,
        factory: &F,
        accessor: &dyn ParameterAccessor,
        key_of: K
    ) -> QueryResult<Window<<F::Query as Query>::Row>>
    where
        F: QueryFactory,
        K: Fn(&<F::Query as Query>::Row, &str) -> Value
    {
        let position = accessor.scroll_position().ok_or_else(|| {
            QueryError::InvalidArgument(format!(
                "Method {} requires a scroll position",
                self.parameters.method_name()
            ))
        })?;
        let prepared = self.prepare(accessor)?;
        let mut query = prepared.create(factory, accessor)?;
        let rows = query.result_list().map_err(QueryError::provider)?;
        let limit = prepared.window_size().unwrap_or(usize::MAX);
        Ok(ScrollDelegate::create_window(rows, limit, position, prepared.sort(), key_of))
    }
}

fn to_usize(value: u64) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}
