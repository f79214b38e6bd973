pub mod common;
pub mod ledger_tests;
pub mod updates_tests;
