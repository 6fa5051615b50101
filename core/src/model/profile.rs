use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    School,
    College,
}

impl UserType {
    /// What the class/semester field is called for this kind of user.
    pub fn class_label(self) -> &'static str {
        match self {
            UserType::School => "Class",
            UserType::College => "Semester",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserType::School => write!(f, "school"),
            UserType::College => write!(f, "college"),
        }
    }
}

impl FromStr for UserType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "school" | "s" => Ok(UserType::School),
            "college" | "c" => Ok(UserType::College),
            _ => Err(ValidationError::UnknownUserType {
                input: s.to_string(),
            }),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", try_from = "StoredProfile")]
pub struct UserProfile {
    pub full_name: String,
    pub class_or_semester: String,
    pub user_type: UserType,
}

/// Shape accepted from storage; it goes through the same checks as onboarding.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredProfile {
    full_name: String,
    class_or_semester: String,
    user_type: UserType,
}

impl TryFrom<StoredProfile> for UserProfile {
    type Error = ValidationError;

    fn try_from(stored: StoredProfile) -> Result<Self, Self::Error> {
        UserProfile::new(&stored.full_name, &stored.class_or_semester, stored.user_type)
    }
}

impl UserProfile {
    /// Builds a profile from onboarding input. All three fields are mandatory.
    pub fn new(
        full_name: &str,
        class_or_semester: &str,
        user_type: UserType,
    ) -> Result<Self, ValidationError> {
        let full_name = full_name.trim();
        if full_name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        let class_or_semester = class_or_semester.trim();
        if class_or_semester.is_empty() {
            return Err(ValidationError::empty_class_label(user_type.class_label()));
        }

        Ok(Self {
            full_name: full_name.to_string(),
            class_or_semester: class_or_semester.to_string(),
            user_type,
        })
    }

    pub fn class_label(&self) -> &'static str {
        self.user_type.class_label()
    }

    pub fn headline(&self) -> String {
        format!(
            "{} • {}: {}",
            self.full_name,
            self.class_label(),
            self.class_or_semester
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_requires_name_and_label() {
        assert_eq!(
            UserProfile::new("  ", "10-B", UserType::School),
            Err(ValidationError::EmptyName)
        );
        assert_eq!(
            UserProfile::new("Asha", "", UserType::College),
            Err(ValidationError::empty_class_label("Semester"))
        );
    }

    #[test]
    fn test_headline_uses_mode_label() {
        let school = UserProfile::new("Asha Rao", "10-B", UserType::School).unwrap();
        assert_eq!(school.headline(), "Asha Rao • Class: 10-B");

        let college = UserProfile::new("Asha Rao", "5th", UserType::College).unwrap();
        assert_eq!(college.headline(), "Asha Rao • Semester: 5th");
    }

    #[test]
    fn test_serializes_camel_case() {
        let profile = UserProfile::new("Asha", "10-B", UserType::School).unwrap();
        let json = serde_json::to_string(&profile).unwrap();
        assert_eq!(
            json,
            r#"{"fullName":"Asha","classOrSemester":"10-B","userType":"school"}"#
        );
    }

    #[test]
    fn test_stored_profile_is_validated() {
        let blank = r#"{"fullName":"","classOrSemester":"  ","userType":"school"}"#;
        assert!(serde_json::from_str::<UserProfile>(blank).is_err());

        let padded = r#"{"fullName":" Asha ","classOrSemester":"10-B","userType":"school"}"#;
        let profile: UserProfile = serde_json::from_str(padded).unwrap();
        assert_eq!(profile.full_name, "Asha");
    }

    #[test]
    fn test_user_type_parse() {
        assert_eq!("College".parse::<UserType>(), Ok(UserType::College));
        assert!("university".parse::<UserType>().is_err());
    }
}
