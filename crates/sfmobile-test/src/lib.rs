#![doc = include_str!("../README.md")]

mod api;
mod fixtures;

pub use api::start_api_mock;
pub use fixtures::{identity_response_json, token_response_json, TEST_ID_PATH};
