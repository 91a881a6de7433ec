// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::errors::{EvalError, ParseError};
use crate::feed::FeedItem;
use crate::fisp::context::FilterContext;
use crate::fisp::expr::Expr;
use crate::fisp::parser::parse;
use crate::fisp::registry::FunctionRegistry;

/// A parsed predicate bound to a registry and, optionally, a source owner.
#[derive(Debug, Clone)]
pub struct CompiledFilter {
    expr: Expr,
    registry: Arc<FunctionRegistry>,
    owner: Option<String>,
}

impl CompiledFilter {
    pub fn new(expr: Expr, registry: Arc<FunctionRegistry>, owner: Option<String>) -> Self {
        Self {
            expr,
            registry,
            owner,
        }
    }

    /// Parses `source` and binds it.
    pub fn compile(
        source: &str,
        registry: Arc<FunctionRegistry>,
        owner: Option<String>,
    ) -> Result<Self, ParseError> {
        Ok(Self::new(parse(source)?, registry, owner))
    }

    /// A filter accepting every item.
    pub fn accept_all(registry: Arc<FunctionRegistry>) -> Self {
        Self::new(Expr::call("all_of", []), registry, None)
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub fn matches(&self, item: &FeedItem) -> Result<bool, EvalError> {
        let ctx = FilterContext {
            item,
            owner: self.owner.as_deref(),
        };
        self.registry.evaluator().evaluate_truthy(&self.expr, &ctx)
    }
}

/// Assembles a source's predicate from its flags and optional user filter.
///
/// Every clause must hold; with no clauses the result is `(all_of)`, which
/// accepts everything.
///
/// ```
/// use feedsift::fisp::FilterBuilder;
///
/// let expr = FilterBuilder::new()
///     .exclude_reposts()
///     .require_embed()
///     .build_expr();
/// assert_eq!(expr.to_string(), "(all_of (not (is_retweet)) (has_embed))");
/// ```
#[derive(Debug, Clone, Default)]
pub struct FilterBuilder {
    clauses: Vec<Expr>,
}

impl FilterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exclude_reposts(mut self) -> Self {
        self.clauses
            .push(Expr::call("not", [Expr::call("is_retweet", [])]));
        self
    }

    pub fn require_embed(mut self) -> Self {
        self.clauses.push(Expr::call("has_embed", []));
        self
    }

    /// Adds a user-authored filter clause.
    pub fn clause_source(mut self, source: &str) -> Result<Self, ParseError> {
        self.clauses.push(parse(source)?);
        Ok(self)
    }

    pub fn clause(mut self, expr: Expr) -> Self {
        self.clauses.push(expr);
        self
    }

    pub fn build_expr(self) -> Expr {
        Expr::call("all_of", self.clauses)
    }

    pub fn build(self, registry: Arc<FunctionRegistry>, owner: Option<String>) -> CompiledFilter {
        CompiledFilter::new(self.build_expr(), registry, owner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::REPOST_REASON;
    use crate::fisp::test_support::item;

    fn registry() -> Arc<FunctionRegistry> {
        Arc::new(FunctionRegistry::with_builtins())
    }

    #[test]
    fn test_no_clauses_accepts_everything() {
        let expr = FilterBuilder::new().build_expr();
        assert_eq!(expr.to_string(), "(all_of)");

        let filter = FilterBuilder::new().build(registry(), None);
        assert!(filter.matches(&item()).unwrap());
    }

    #[test]
    fn test_flags_and_user_clause_combine() {
        let filter = FilterBuilder::new()
            .exclude_reposts()
            .require_embed()
            .clause_source("(contains_regex world)")
            .unwrap()
            .build(registry(), Some("did:plc:author".into()));

        let mut post = item();
        assert!(!filter.matches(&post).unwrap());

        post.has_embed = true;
        assert!(filter.matches(&post).unwrap());

        post.reason = Some(REPOST_REASON.into());
        assert!(!filter.matches(&post).unwrap());
    }

    #[test]
    fn test_compile_reports_parse_errors() {
        let err = CompiledFilter::compile("(all_of", registry(), None).unwrap_err();
        assert_eq!(err, ParseError::UnclosedOpen { position: 0 });
    }

    #[test]
    fn test_owner_flows_into_context() {
        let filter =
            CompiledFilter::compile("(is_authored_by_self)", registry(), Some("did:plc:author".into()))
                .unwrap();
        assert!(filter.matches(&item()).unwrap());
        assert_eq!(filter.owner(), Some("did:plc:author"));
    }

    #[test]
    fn test_evaluation_errors_surface() {
        let filter = CompiledFilter::compile("(unknown thing here)", registry(), None).unwrap();
        assert!(matches!(
            filter.matches(&item()),
            Err(EvalError::UnresolvableHead { .. })
        ));
    }
}
