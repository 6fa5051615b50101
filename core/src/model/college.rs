use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::input::{clamp_count, parse_count};
use crate::model::percentage::Percentage;

pub const DEFAULT_MINIMUM_GOAL: u8 = 75;

/// Opaque subject identifier. Stored as text so ids written by older
/// builds (timestamps) still load.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct SubjectId(String);

impl SubjectId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SubjectId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CollegeSubject {
    pub id: SubjectId,
    pub name: String,
    pub total_classes: u32,
    pub attended_classes: u32,
}

impl CollegeSubject {
    pub fn new(name: String, total_classes: u32, attended_classes: u32) -> Self {
        Self {
            id: SubjectId::generate(),
            name,
            total_classes,
            attended_classes,
        }
    }

    pub fn mark_present(&mut self) {
        self.total_classes = self.total_classes.saturating_add(1);
        self.attended_classes = self.attended_classes.saturating_add(1);
    }

    pub fn mark_absent(&mut self) {
        self.total_classes = self.total_classes.saturating_add(1);
    }

    pub fn missed_classes(&self) -> u32 {
        self.total_classes.saturating_sub(self.attended_classes)
    }

    /// Never includes bonus credit.
    pub fn percentage(&self) -> Percentage {
        Percentage::from_ratio(self.attended_classes.into(), self.total_classes.into())
    }
}

/// Validated input for a new subject.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSubject {
    pub name: String,
    pub total_classes: u32,
    pub attended_classes: u32,
}

impl NewSubject {
    /// Parses the add-subject form. The name must be non-blank and both counts
    /// must be non-negative whole numbers.
    pub fn parse(name: &str, total: &str, attended: &str) -> Result<Self, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        Ok(Self {
            name: name.to_string(),
            total_classes: parse_count("total classes", total)?,
            attended_classes: parse_count("attended classes", attended)?,
        })
    }

    pub fn check_counts(&self) -> Result<(), ValidationError> {
        if self.attended_classes > self.total_classes {
            return Err(ValidationError::AttendedExceedsTotal {
                attended: self.attended_classes,
                total: self.total_classes,
            });
        }
        Ok(())
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CollegeData {
    pub subjects: Vec<CollegeSubject>,
    pub minimum_goal: u8,
}

impl Default for CollegeData {
    fn default() -> Self {
        Self {
            subjects: Vec::new(),
            minimum_goal: DEFAULT_MINIMUM_GOAL,
        }
    }
}

/// Shape accepted from storage before repair.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredCollegeData {
    #[serde(default)]
    subjects: Vec<CollegeSubject>,
    #[serde(default = "default_goal")]
    minimum_goal: i64,
}

fn default_goal() -> i64 {
    i64::from(DEFAULT_MINIMUM_GOAL)
}

impl From<StoredCollegeData> for CollegeData {
    fn from(stored: StoredCollegeData) -> Self {
        let minimum_goal = match u8::try_from(stored.minimum_goal) {
            Ok(goal) if goal <= 100 => goal,
            _ => {
                tracing::warn!(stored = stored.minimum_goal, "stored goal out of range, using default");
                DEFAULT_MINIMUM_GOAL
            }
        };

        let mut seen = HashSet::new();
        let before = stored.subjects.len();
        let subjects: Vec<CollegeSubject> = stored
            .subjects
            .into_iter()
            .filter(|s| seen.insert(s.id.clone()))
            .collect();
        if subjects.len() != before {
            tracing::warn!(dropped = before - subjects.len(), "dropped subjects with duplicate ids");
        }

        Self {
            subjects,
            minimum_goal,
        }
    }
}

impl<'de> Deserialize<'de> for CollegeData {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        StoredCollegeData::deserialize(deserializer).map(CollegeData::from)
    }
}

/// Guidance toward the minimum goal, counting bonus credit as attended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoalGuidance {
    pub required_classes: u64,
    pub achieved_classes: u64,
    pub can_skip: u64,
    pub need_to_attend: u64,
}

/// College-mode state: subjects and goal, plus the bonus-credit counter.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CollegeState {
    data: CollegeData,
    eca_count: u32,
}

impl CollegeState {
    pub fn from_parts(data: CollegeData, eca_count: u32) -> Self {
        Self { data, eca_count }
    }

    // --- operations ---

    pub fn add_subject(&mut self, new: NewSubject) -> &CollegeSubject {
        let subject = CollegeSubject::new(new.name, new.total_classes, new.attended_classes);
        self.data.subjects.push(subject);
        &self.data.subjects[self.data.subjects.len() - 1]
    }

    pub fn mark_present(&mut self, id: &SubjectId) -> bool {
        match self.subject_mut(id) {
            Some(subject) => {
                subject.mark_present();
                true
            }
            None => false,
        }
    }

    pub fn mark_absent(&mut self, id: &SubjectId) -> bool {
        match self.subject_mut(id) {
            Some(subject) => {
                subject.mark_absent();
                true
            }
            None => false,
        }
    }

    pub fn delete_subject(&mut self, id: &SubjectId) -> bool {
        let initial_len = self.data.subjects.len();
        self.data.subjects.retain(|s| s.id != *id);
        self.data.subjects.len() != initial_len
    }

    /// Accepts only `0..=100`; anything else leaves the goal untouched.
    pub fn set_minimum_goal(&mut self, value: i64) -> Result<(), ValidationError> {
        match u8::try_from(value) {
            Ok(goal) if goal <= 100 => {
                self.data.minimum_goal = goal;
                Ok(())
            }
            _ => Err(ValidationError::GoalOutOfRange { value }),
        }
    }

    pub fn set_eca_count(&mut self, n: i64) {
        self.eca_count = clamp_count(n);
    }

    fn subject_mut(&mut self, id: &SubjectId) -> Option<&mut CollegeSubject> {
        self.data.subjects.iter_mut().find(|s| s.id == *id)
    }

    // --- queries ---

    pub fn data(&self) -> &CollegeData {
        &self.data
    }

    pub fn subjects(&self) -> &[CollegeSubject] {
        &self.data.subjects
    }

    pub fn subject(&self, id: &SubjectId) -> Option<&CollegeSubject> {
        self.data.subjects.iter().find(|s| s.id == *id)
    }

    pub fn minimum_goal(&self) -> u8 {
        self.data.minimum_goal
    }

    pub fn eca_count(&self) -> u32 {
        self.eca_count
    }

    pub fn total_classes(&self) -> u64 {
        self.data.subjects.iter().map(|s| u64::from(s.total_classes)).sum()
    }

    pub fn attended_classes(&self) -> u64 {
        self.data.subjects.iter().map(|s| u64::from(s.attended_classes)).sum()
    }

    /// Attended plus bonus credit.
    pub fn attended_with_eca(&self) -> u64 {
        self.attended_classes() + u64::from(self.eca_count)
    }

    /// Aggregate percentage; bonus credit counts in the numerator only.
    pub fn overall_percentage(&self) -> Percentage {
        Percentage::from_ratio(self.attended_with_eca(), self.total_classes())
    }

    /// Aggregate percentage without bonus credit.
    pub fn base_percentage(&self) -> Percentage {
        Percentage::from_ratio(self.attended_classes(), self.total_classes())
    }

    /// `ceil(goal * total / 100)`, in integers.
    pub fn required_classes(&self) -> u64 {
        let scaled = u64::from(self.data.minimum_goal) * self.total_classes();
        scaled.div_ceil(100)
    }

    pub fn can_skip(&self) -> u64 {
        self.attended_with_eca().saturating_sub(self.required_classes())
    }

    pub fn need_to_attend(&self) -> u64 {
        self.required_classes().saturating_sub(self.attended_with_eca())
    }

    pub fn guidance(&self) -> GoalGuidance {
        GoalGuidance {
            required_classes: self.required_classes(),
            achieved_classes: self.attended_with_eca(),
            can_skip: self.can_skip(),
            need_to_attend: self.need_to_attend(),
        }
    }
}
