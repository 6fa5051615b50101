use serde::Serialize;

use crate::model::college::{CollegeSubject, SubjectId};
use crate::model::percentage::Percentage;
use crate::model::profile::UserType;
use crate::model::school::{Day, Week};

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct WeekBreakdown {
    pub week_number: u32,
    pub days_present: u32,
    pub days_total: u32,
    pub percentage: Percentage,
    pub present_days: Vec<Day>,
}

impl WeekBreakdown {
    pub fn from_entity(week: &Week) -> Self {
        Self {
            week_number: week.week_number,
            days_present: week.days_present(),
            days_total: week.days_total(),
            percentage: week.percentage(),
            present_days: week
                .attendance
                .iter()
                .filter(|(_, present)| *present)
                .map(|(day, _)| day)
                .collect(),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SubjectBreakdown {
    pub id: SubjectId,
    pub name: String,
    pub attended: u32,
    pub total: u32,
    pub missed: u32,
    pub percentage: Percentage,
    /// The subject's own percentage is at or above the minimum goal.
    pub meets_goal: bool,
}

impl SubjectBreakdown {
    pub fn from_entity(subject: &CollegeSubject, goal: u8) -> Self {
        let percentage = subject.percentage();
        Self {
            id: subject.id.clone(),
            name: subject.name.clone(),
            attended: subject.attended_classes,
            total: subject.total_classes,
            missed: subject.missed_classes(),
            percentage,
            meets_goal: percentage.value() >= f64::from(goal),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "mode", content = "items", rename_all = "lowercase")]
pub enum Breakdown {
    Weeks(Vec<WeekBreakdown>),
    Subjects(Vec<SubjectBreakdown>),
}

/// Mode-independent summary shown by the stats and dashboard screens.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct StatsSummary {
    pub user_type: UserType,
    /// Weeks tracked (school) or subjects (college).
    pub tracked_items: usize,
    pub total_units: u64,
    /// Excludes bonus credit.
    pub attended_units: u64,
    /// `total - attended`, bonus credit not counted.
    pub missed_units: u64,
    pub bonus_units: u64,
    /// Includes bonus credit in college mode.
    pub percentage: Percentage,
    pub goal: Option<u8>,
    /// `percentage - goal`, signed.
    pub goal_delta: Option<f64>,
    pub breakdown: Breakdown,
}

impl StatsSummary {
    /// The "classes attended" figure, which counts bonus credit.
    pub fn attended_with_bonus(&self) -> u64 {
        self.attended_units + self.bonus_units
    }

    /// Week rows with the latest week first, as history lists show them.
    pub fn weeks_newest_first(&self) -> Vec<&WeekBreakdown> {
        match &self.breakdown {
            Breakdown::Weeks(weeks) => weeks.iter().rev().collect(),
            Breakdown::Subjects(_) => Vec::new(),
        }
    }
}
