// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! A subset of RFC 9535 JSONPath over `serde_json` values.
//!
//! Supported: child and descendant segments with name, wildcard, index and
//! slice selectors. Filter selectors are not supported. Selection is lazy:
//! [`JsonPath::select`] returns an iterator that walks the document as it is
//! consumed.
//!
//! ```
//! use feedsift::jsonpath::{JsonPath, Segment, Selector};
//! use serde_json::json;
//!
//! let doc = json!({"store": {"book": [{"author": "Rees"}, {"author": "Waugh"}]}});
//! let path = JsonPath::new(vec![Segment::descendant([Selector::name("author")])]);
//! let authors: Vec<_> = path.select(&doc).collect();
//! assert_eq!(authors, vec![&json!("Rees"), &json!("Waugh")]);
//! ```

mod path;
mod selector;

pub use path::{JsonPath, Segment};
pub use selector::{slice_indices, Selector};

use serde_json::Value;

/// Boxed lazy node sequence borrowed from the document.
pub type Nodes<'a> = Box<dyn Iterator<Item = &'a Value> + 'a>;
