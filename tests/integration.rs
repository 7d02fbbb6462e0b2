//! Integration test harness; see `integration/api_tests.rs`.

mod integration {
    mod api_tests;
}
