//! Typed collection proxy.
//!
//! A `ContentSet` is an immutable query under construction: every chaining
//! call returns a new set carrying the extended expression chain and all
//! accumulated settings. Terminal calls compile the chain and issue exactly
//! one retrieval.

mod reduce;

#[cfg(test)]
mod tests;

use crate::{
    content::ContentType,
    error::QueryError,
    expr::{Expr, IntoExpr, constant, lambda, project, source},
    logging::repo_log,
    query::{
        CompiledQuery, ExecutionMode, FilterStatus, QueryOptions, compile,
        compile::operator::{Terminal, is_disallowed},
    },
    retrieve::{RetrieveRequest, RetrieveResponse, Retriever},
    value::Value,
};
use log::Level;
use reduce::{reduce_count, reduce_selection};
use std::{fmt, marker::PhantomData, sync::Arc};

///
/// ContentSet
///

pub struct ContentSet<T: ContentType> {
    retriever: Arc<dyn Retriever>,
    chain: Expr,
    options: QueryOptions,
    _marker: PhantomData<fn() -> T>,
}

impl<T: ContentType> ContentSet<T> {
    /// Start a query over every item of type `T`.
    #[must_use]
    pub fn new(retriever: Arc<dyn Retriever>) -> Self {
        Self::with_options(retriever, QueryOptions::default())
    }

    #[must_use]
    pub fn with_options(retriever: Arc<dyn Retriever>, options: QueryOptions) -> Self {
        Self {
            retriever,
            chain: source(T::TYPE_NAME),
            options,
            _marker: PhantomData,
        }
    }

    /// The expression chain accumulated so far.
    #[must_use]
    pub const fn expression(&self) -> &Expr {
        &self.chain
    }

    #[must_use]
    pub const fn options(&self) -> &QueryOptions {
        &self.options
    }

    // ------------------------------------------------------------------
    // Chaining
    // ------------------------------------------------------------------

    #[must_use]
    pub fn filter(&self, predicate: impl IntoExpr) -> Self {
        self.chained("Where", vec![as_lambda(predicate.into_expr())])
    }

    #[must_use]
    pub fn order_by(&self, key: Expr) -> Self {
        self.chained("OrderBy", vec![as_lambda(key)])
    }

    #[must_use]
    pub fn order_by_descending(&self, key: Expr) -> Self {
        self.chained("OrderByDescending", vec![as_lambda(key)])
    }

    #[must_use]
    pub fn then_by(&self, key: Expr) -> Self {
        self.chained("ThenBy", vec![as_lambda(key)])
    }

    #[must_use]
    pub fn then_by_descending(&self, key: Expr) -> Self {
        self.chained("ThenByDescending", vec![as_lambda(key)])
    }

    #[must_use]
    pub fn take(&self, count: u32) -> Self {
        self.chained("Take", vec![constant(count)])
    }

    #[must_use]
    pub fn skip(&self, count: u32) -> Self {
        self.chained("Skip", vec![constant(count)])
    }

    /// Restrict the returned fields to the given member chains.
    #[must_use]
    pub fn project<I>(&self, fields: I) -> Self
    where
        I: IntoIterator<Item = Expr>,
    {
        self.chained("Select", vec![lambda(project(fields))])
    }

    /// Narrow the set to items of type `U`.
    #[must_use]
    pub fn of_type<U: ContentType>(&self) -> ContentSet<U> {
        ContentSet {
            retriever: Arc::clone(&self.retriever),
            chain: self.chain_call("OfType", vec![constant(Value::type_name(U::TYPE_NAME))]),
            options: self.options.clone(),
            _marker: PhantomData,
        }
    }

    /// Append an operator by name.
    ///
    /// Collection-only operators are refused here, before anything is
    /// compiled; other unknown names fail at compile time.
    pub fn apply(&self, operator: &str, args: Vec<Expr>) -> Result<Self, QueryError> {
        if is_disallowed(operator) {
            return Err(QueryError::disallowed(operator));
        }

        Ok(self.chained(operator, args))
    }

    // ------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------

    #[must_use]
    pub fn autofilters(&self, status: FilterStatus) -> Self {
        self.configured(|options| options.autofilters = status)
    }

    #[must_use]
    pub fn lifespan(&self, status: FilterStatus) -> Self {
        self.configured(|options| options.lifespan = status)
    }

    #[must_use]
    pub fn execution_mode(&self, mode: ExecutionMode) -> Self {
        self.configured(|options| options.execution_mode = mode)
    }

    #[must_use]
    pub fn all_versions(&self, enabled: bool) -> Self {
        self.configured(|options| options.all_versions = enabled)
    }

    /// Explicit expand list; wins over the one derived from `project`.
    #[must_use]
    pub fn expand<I, S>(&self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields = fields.into_iter().map(Into::into).collect();
        self.configured(|options| options.expand = Some(fields))
    }

    /// Explicit select list; wins over the one derived from `project`.
    #[must_use]
    pub fn select<I, S>(&self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields = fields.into_iter().map(Into::into).collect();
        self.configured(|options| options.select = Some(fields))
    }

    // ------------------------------------------------------------------
    // Compilation
    // ------------------------------------------------------------------

    pub fn compile(&self) -> Result<CompiledQuery, QueryError> {
        compile(&self.chain, &self.options)
    }

    pub fn query_text(&self) -> Result<String, QueryError> {
        Ok(self.compile()?.to_text())
    }

    // ------------------------------------------------------------------
    // Terminals
    // ------------------------------------------------------------------

    pub async fn to_vec(&self) -> Result<Vec<T>, QueryError> {
        let (_, response) = self.execute(&self.chain).await?;

        response
            .items
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(QueryError::from))
            .collect()
    }

    pub async fn count(&self) -> Result<u64, QueryError> {
        self.count_terminal("Count", None).await
    }

    pub async fn count_where(&self, predicate: impl IntoExpr) -> Result<u64, QueryError> {
        self.count_terminal("Count", Some(predicate.into_expr())).await
    }

    pub async fn long_count(&self) -> Result<u64, QueryError> {
        self.count_terminal("LongCount", None).await
    }

    pub async fn any(&self) -> Result<bool, QueryError> {
        self.any_terminal(None).await
    }

    pub async fn any_where(&self, predicate: impl IntoExpr) -> Result<bool, QueryError> {
        self.any_terminal(Some(predicate.into_expr())).await
    }

    pub async fn first(&self) -> Result<T, QueryError> {
        let first = Terminal::First { or_default: false };
        required(self.select_one(first, None).await?)
    }

    pub async fn first_where(&self, predicate: impl IntoExpr) -> Result<T, QueryError> {
        let first = Terminal::First { or_default: false };
        required(self.select_one(first, Some(predicate.into_expr())).await?)
    }

    pub async fn first_or_default(&self) -> Result<Option<T>, QueryError> {
        self.select_one(Terminal::First { or_default: true }, None).await
    }

    pub async fn first_or_default_where(
        &self,
        predicate: impl IntoExpr,
    ) -> Result<Option<T>, QueryError> {
        let first = Terminal::First { or_default: true };
        self.select_one(first, Some(predicate.into_expr())).await
    }

    pub async fn single(&self) -> Result<T, QueryError> {
        let single = Terminal::Single { or_default: false };
        required(self.select_one(single, None).await?)
    }

    pub async fn single_where(&self, predicate: impl IntoExpr) -> Result<T, QueryError> {
        let single = Terminal::Single { or_default: false };
        required(self.select_one(single, Some(predicate.into_expr())).await?)
    }

    pub async fn single_or_default(&self) -> Result<Option<T>, QueryError> {
        self.select_one(Terminal::Single { or_default: true }, None).await
    }

    pub async fn single_or_default_where(
        &self,
        predicate: impl IntoExpr,
    ) -> Result<Option<T>, QueryError> {
        let single = Terminal::Single { or_default: true };
        self.select_one(single, Some(predicate.into_expr())).await
    }

    pub async fn last(&self) -> Result<T, QueryError> {
        let last = Terminal::Last { or_default: false };
        required(self.select_one(last, None).await?)
    }

    pub async fn last_where(&self, predicate: impl IntoExpr) -> Result<T, QueryError> {
        let last = Terminal::Last { or_default: false };
        required(self.select_one(last, Some(predicate.into_expr())).await?)
    }

    pub async fn last_or_default(&self) -> Result<Option<T>, QueryError> {
        self.select_one(Terminal::Last { or_default: true }, None).await
    }

    pub async fn last_or_default_where(
        &self,
        predicate: impl IntoExpr,
    ) -> Result<Option<T>, QueryError> {
        let last = Terminal::Last { or_default: true };
        self.select_one(last, Some(predicate.into_expr())).await
    }

    pub async fn element_at(&self, index: u32) -> Result<T, QueryError> {
        let element_at = Terminal::ElementAt { or_default: false };
        required(self.element_at_terminal(element_at, index).await?)
    }

    pub async fn element_at_or_default(&self, index: u32) -> Result<Option<T>, QueryError> {
        self.element_at_terminal(Terminal::ElementAt { or_default: true }, index).await
    }

    // ------------------------------------------------------------------
    // Execution
    // ------------------------------------------------------------------

    async fn count_terminal(
        &self,
        method: &str,
        predicate: Option<Expr>,
    ) -> Result<u64, QueryError> {
        let args = predicate.map(as_lambda).into_iter().collect();
        let (compiled, response) = self.execute(&self.chain_call(method, args)).await?;

        Ok(reduce_count(&compiled, response.total_count, &response.items))
    }

    async fn any_terminal(&self, predicate: Option<Expr>) -> Result<bool, QueryError> {
        let args = predicate.map(as_lambda).into_iter().collect();
        let (compiled, response) = self.execute(&self.chain_call("Any", args)).await?;

        Ok(reduce_count(&compiled, response.total_count, &response.items) > 0)
    }

    async fn select_one(
        &self,
        terminal: Terminal,
        predicate: Option<Expr>,
    ) -> Result<Option<T>, QueryError> {
        let args = predicate.map(as_lambda).into_iter().collect();
        let expr = self.chain_call(terminal.name(), args);

        self.reduce_one(&expr).await
    }

    async fn element_at_terminal(
        &self,
        terminal: Terminal,
        index: u32,
    ) -> Result<Option<T>, QueryError> {
        let expr = self.chain_call(terminal.name(), vec![constant(index)]);

        self.reduce_one(&expr).await
    }

    async fn reduce_one(&self, expr: &Expr) -> Result<Option<T>, QueryError> {
        let (compiled, response) = self.execute(expr).await?;

        reduce_selection(&compiled, response.items)?
            .map(|item| serde_json::from_value(item).map_err(QueryError::from))
            .transpose()
    }

    // Compile, then make the one retrieval call.
    async fn execute(&self, expr: &Expr) -> Result<(CompiledQuery, RetrieveResponse), QueryError> {
        let compiled = compile(expr, &self.options)?;
        let request = RetrieveRequest::from_compiled(&compiled);

        repo_log!(
            Level::Debug,
            "retrieve",
            "type={} text={}",
            T::TYPE_NAME,
            request.query_text
        );

        let response = match self.retriever.retrieve(request).await {
            Ok(response) => response,
            Err(err) => {
                repo_log!(
                    Level::Warn,
                    "retrieve_failed",
                    "type={} error={}",
                    T::TYPE_NAME,
                    err
                );
                return Err(err.into());
            }
        };

        Ok((compiled, response))
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn chain_call(&self, method: &str, args: Vec<Expr>) -> Expr {
        Expr::Call {
            method: method.to_string(),
            receiver: Some(Box::new(self.chain.clone())),
            args,
        }
    }

    fn chained(&self, method: &str, args: Vec<Expr>) -> Self {
        Self {
            retriever: Arc::clone(&self.retriever),
            chain: self.chain_call(method, args),
            options: self.options.clone(),
            _marker: PhantomData,
        }
    }

    fn configured(&self, update: impl FnOnce(&mut QueryOptions)) -> Self {
        let mut next = self.clone();
        update(&mut next.options);

        next
    }
}

impl<T: ContentType> Clone for ContentSet<T> {
    fn clone(&self) -> Self {
        Self {
            retriever: Arc::clone(&self.retriever),
            chain: self.chain.clone(),
            options: self.options.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: ContentType> fmt::Debug for ContentSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentSet")
            .field("type", &T::TYPE_NAME)
            .field("chain", &self.chain.to_string())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

fn as_lambda(expr: Expr) -> Expr {
    match expr {
        Expr::Lambda(_) => expr,
        other => lambda(other),
    }
}

fn required<T>(item: Option<T>) -> Result<T, QueryError> {
    item.ok_or(QueryError::NoElements)
}
