// SPDX-License-Identifier: MIT

//! Services module - external collaborator clients and business logic.

pub mod identity;
pub mod onboarding;
pub mod profiles;

pub use identity::{
    IdentityClient, IdentityError, IdentityProvider, ProviderUser, Session, SignInOutcome,
};
pub use onboarding::{CompleteOutcome, OnboardingService};
pub use profiles::{ProfileStore, RestProfileStore, StoreError};
