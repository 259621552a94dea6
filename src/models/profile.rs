//! Profile and onboarding records as stored by the profile store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Application profile extending a provider identity.
///
/// `registered_at == None` means onboarding is incomplete; once set it is
/// never re-stamped ("member since" semantics).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Provider user id (unique per profile)
    pub user_id: String,
    pub email: String,
    pub full_name: String,
    #[serde(default)]
    pub is_admin: bool,
    /// Set by onboarding completion; None while onboarding
    pub registered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for a placeholder profile created during OAuth registration.
#[derive(Debug, Clone, Serialize)]
pub struct NewProfile {
    pub user_id: String,
    pub email: String,
    pub full_name: String,
}

/// A user's 5-question verification submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FiveQSubmission {
    pub user_id: String,
    /// Whether the answers satisfy the commitment predicate
    pub committed: bool,
    pub submitted_at: DateTime<Utc>,
}

/// The CV fields relevant to onboarding.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CvRecord {
    pub user_id: String,
    pub province: Option<String>,
    pub education: Option<String>,
    pub age: Option<u32>,
}

impl CvRecord {
    /// A CV is minimal when province, education and age are all present.
    pub fn is_minimal(&self) -> bool {
        let filled = |field: &Option<String>| {
            field.as_deref().is_some_and(|v| !v.trim().is_empty())
        };
        filled(&self.province) && filled(&self.education) && self.age.is_some()
    }
}

/// Derived onboarding completion flags. Computed on demand, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OnboardingStatus {
    #[serde(rename = "fiveQ")]
    pub five_q: bool,
    #[serde(rename = "cvMinimal")]
    pub cv_minimal: bool,
}

impl OnboardingStatus {
    /// Both sub-steps done; completion may be requested.
    pub fn ready_to_complete(&self) -> bool {
        self.five_q && self.cv_minimal
    }
}
