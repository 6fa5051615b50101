use crate::model::college::CollegeState;
use crate::model::profile::UserType;
use crate::model::school::SchoolState;
use crate::model::state::AppState;
use crate::service::dto::{Breakdown, StatsSummary, SubjectBreakdown, WeekBreakdown};

// Pure reducers over engine state; nothing here is stored.

pub fn school_summary(school: &SchoolState) -> StatsSummary {
    let total = school.total_days();
    let attended = school.days_present();

    StatsSummary {
        user_type: UserType::School,
        tracked_items: school.weeks().len(),
        total_units: total,
        attended_units: attended,
        missed_units: total.saturating_sub(attended),
        bonus_units: 0,
        percentage: school.attendance_percentage(),
        goal: None,
        goal_delta: None,
        breakdown: Breakdown::Weeks(school.weeks().iter().map(WeekBreakdown::from_entity).collect()),
    }
}

pub fn college_summary(college: &CollegeState) -> StatsSummary {
    let total = college.total_classes();
    let attended = college.attended_classes();
    let percentage = college.overall_percentage();
    let goal = college.minimum_goal();

    StatsSummary {
        user_type: UserType::College,
        tracked_items: college.subjects().len(),
        total_units: total,
        attended_units: attended,
        missed_units: total.saturating_sub(attended),
        bonus_units: college.eca_count().into(),
        percentage,
        goal: Some(goal),
        goal_delta: Some(percentage.delta_from(goal)),
        breakdown: Breakdown::Subjects(
            college
                .subjects()
                .iter()
                .map(|subject| SubjectBreakdown::from_entity(subject, goal))
                .collect(),
        ),
    }
}

pub fn summarize(state: &AppState, user_type: UserType) -> StatsSummary {
    match user_type {
        UserType::School => school_summary(&state.school),
        UserType::College => college_summary(&state.college),
    }
}
