// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod profile;

pub use profile::{CvRecord, FiveQSubmission, NewProfile, OnboardingStatus, Profile};
