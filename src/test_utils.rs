//! Shared proptest strategies for unit tests.

use proptest::prelude::*;

/// Arbitrary printable text of at most `max` characters, multibyte included.
pub fn arb_text(max: usize) -> impl Strategy<Value = String> {
    prop::collection::vec(any::<char>().prop_filter("printable", |c| !c.is_control()), 0..=max)
        .prop_map(|chars| chars.into_iter().collect())
}

/// Arbitrary text that never parses as an integer.
pub fn arb_non_numeric(max: usize) -> impl Strategy<Value = String> {
    arb_text(max).prop_filter("not an integer", |s| s.parse::<i64>().is_err())
}
