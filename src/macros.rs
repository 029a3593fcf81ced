//! Assertion macros for `#[test]` functions.

/// The [`TestLocation`](crate::TestLocation) of the calling test: its source
/// file and the libtest name of the current thread.
#[macro_export]
macro_rules! test_location {
    () => {
        $crate::TestLocation::current(::std::file!())
    };
}

/// Asserts that a value matches its golden snapshot, recording it on first
/// run or when `UPDATE_GOLDEN` is set.
///
/// ```rust,no_run
/// use goldsnap::{assert_golden, with_description, JsonSerializer};
/// use goldsnap::matcher::with_serializer;
///
/// assert_golden!(vec![1, 2, 3]);
/// assert_golden!("rendered", with_description("page"));
/// assert_golden!(
///     serde_json::json!({"id": 7}),
///     with_serializer(JsonSerializer::default()),
/// );
/// ```
#[macro_export]
macro_rules! assert_golden {
    ($actual:expr $(, $option:expr)* $(,)?) => {{
        let options: ::std::vec::Vec<$crate::MatchOption> = ::std::vec![$($option),*];
        match $crate::golden($crate::test_location!(), options) {
            ::std::result::Result::Ok(matcher) => matcher.assert(&$actual),
            ::std::result::Result::Err(err) => ::std::panic!("{}", err),
        }
    }};
}

/// Asserts that a value does *not* match its golden snapshot. A missing
/// snapshot is recorded and then counts as a match, so this fails.
#[macro_export]
macro_rules! assert_not_golden {
    ($actual:expr $(, $option:expr)* $(,)?) => {{
        let options: ::std::vec::Vec<$crate::MatchOption> = ::std::vec![$($option),*];
        match $crate::golden($crate::test_location!(), options) {
            ::std::result::Result::Ok(matcher) => matcher.assert_not(&$actual),
            ::std::result::Result::Err(err) => ::std::panic!("{}", err),
        }
    }};
}
