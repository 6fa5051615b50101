use crate::model::college::CollegeState;
use crate::model::profile::{UserProfile, UserType};
use crate::model::school::SchoolState;

/// Where the profile is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Uninitialized,
    Active(UserType),
}

/// Everything the app knows. Both mode trees always exist; only the one
/// matching the profile's user type is exercised.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    pub profile: Option<UserProfile>,
    pub school: SchoolState,
    pub college: CollegeState,
}

impl AppState {
    pub fn lifecycle(&self) -> Lifecycle {
        match &self.profile {
            Some(profile) => Lifecycle::Active(profile.user_type),
            None => Lifecycle::Uninitialized,
        }
    }

    pub fn is_onboarded(&self) -> bool {
        self.profile.is_some()
    }
}
