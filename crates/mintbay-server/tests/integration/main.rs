mod common;

mod admin_tests;
mod auth_tests;
mod collection_tests;
