//! The authentication completion flow.
//!
//! Once the token endpoint has answered (authorization code exchange, refresh or front door
//! bridge), [`AuthFlowCoordinator`] resolves the user's identity, applies local policy, stores
//! and activates the account and hands control back to the host through
//! [`AuthFlowCollaborators`].

mod collaborators;
mod coordinator;
mod outcome;
#[cfg(test)]
mod test_utils;

pub use collaborators::{AuthFlowCollaborators, CollaboratorError};
pub use coordinator::{AuthFlowCoordinator, AuthFlowRequest};
pub use outcome::{
    AuthFlowError, AuthFlowOutcome, AuthFlowRejection, AuthFlowStep, AUTH_FLOW_ERROR_KIND,
};
