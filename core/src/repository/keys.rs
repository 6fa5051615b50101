use std::fmt;

/// One key per persisted entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    UserProfile,
    SchoolWeeks,
    SchoolCurrentWeek,
    SchoolPreviousAttended,
    SchoolPreviousTotal,
    CollegeData,
    EcaCount,
}

impl StorageKey {
    pub const ALL: [StorageKey; 7] = [
        StorageKey::UserProfile,
        StorageKey::SchoolWeeks,
        StorageKey::SchoolCurrentWeek,
        StorageKey::SchoolPreviousAttended,
        StorageKey::SchoolPreviousTotal,
        StorageKey::CollegeData,
        StorageKey::EcaCount,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StorageKey::UserProfile => "user_profile",
            StorageKey::SchoolWeeks => "school_weeks",
            StorageKey::SchoolCurrentWeek => "school_current_week",
            StorageKey::SchoolPreviousAttended => "school_previous_attended",
            StorageKey::SchoolPreviousTotal => "school_previous_total",
            StorageKey::CollegeData => "college_data",
            StorageKey::EcaCount => "eca_count",
        }
    }

    /// Scalars are stored as plain decimal text rather than JSON documents.
    pub fn is_scalar(self) -> bool {
        matches!(
            self,
            StorageKey::SchoolCurrentWeek
                | StorageKey::SchoolPreviousAttended
                | StorageKey::SchoolPreviousTotal
                | StorageKey::EcaCount
        )
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
