// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Functions every [`FunctionRegistry`](crate::fisp::FunctionRegistry) built
//! with `with_builtins` starts with.

mod extract;
mod item;
mod logic;

pub use extract::selectors_for_token;

use crate::fisp::registry::FunctionRegistry;

pub(crate) fn register_builtins(registry: &mut FunctionRegistry) {
    registry.register("all_of", logic::all_of, &["all", "and"]);
    registry.register("any_of", logic::any_of, &["any", "or", "either"]);
    registry.register("not", logic::not, &["!"]);

    registry.register("has_embed", item::has_embed, &[]);
    registry.register("reason_is", item::reason_is, &[]);
    registry.register("is_retweet", item::is_retweet, &[]);
    registry.register("author_is", item::author_is, &[]);
    registry.register("is_authored_by_self", item::is_authored_by_self, &[]);
    registry.register("is_self_retweet", item::is_self_retweet, &[]);
    registry.register("labels_contains", item::labels_contains, &[]);
    registry.register("contains_regex", item::ContainsRegex::default(), &[]);

    registry.register("extract", extract::extract, &[]);
}
