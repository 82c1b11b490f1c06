#![doc = include_str!("../README.md")]

pub mod account;
pub mod flow;
pub mod identity;
pub mod oauth2;
pub mod scope;

mod settings;

pub use flow::{AuthFlowCollaborators, AuthFlowCoordinator, AuthFlowOutcome, AuthFlowRequest};
pub use scope::ScopeParser;
pub use settings::{OAuthSettings, RuntimeConfig, StaticRuntimeConfig};
