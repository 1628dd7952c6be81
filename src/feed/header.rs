// src/feed/header.rs

//! Feed header controls. Each one writes straight into the search state.

use crate::models::{SortOrder, TagFilter, param};
use crate::utils::params::SearchParams;

/// Change direction and jump back to the first page.
pub fn set_sort_order(params: &mut SearchParams, order: SortOrder) {
    params.set(param::SORT, order.as_str());
    params.set(param::PAGE, "1");
}

pub fn set_order_by(params: &mut SearchParams, field: &str) {
    params.set(param::ORDER_BY, field);
}

pub fn set_tag(params: &mut SearchParams, tag: &TagFilter) {
    params.set(param::TAGS, tag.as_str());
}
