use crate::error::AttendanceResult;
use crate::model::college::GoalGuidance;
use crate::model::percentage::Percentage;
use crate::model::profile::UserType;
use crate::repository::KeyValueStore;
use crate::service::attendance_service::AttendanceService;

/// What the bonus credit is worth right now.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EcaImpact {
    pub eca_count: u32,
    pub base_percentage: Percentage,
    pub boosted_percentage: Percentage,
    /// Difference of the two rounded percentages.
    pub improvement: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GoalStanding {
    /// Points above the goal.
    Above(f64),
    Met,
    /// Points still missing.
    Below(f64),
}

impl GoalStanding {
    pub fn from_delta(delta: f64) -> Self {
        if delta > 0.0 {
            GoalStanding::Above(delta)
        } else if delta < 0.0 {
            GoalStanding::Below(-delta)
        } else {
            GoalStanding::Met
        }
    }

    pub fn message(&self) -> String {
        match self {
            GoalStanding::Above(d) => format!("You're {:.1}% above your goal", d),
            GoalStanding::Met => "You're exactly on your goal".to_string(),
            GoalStanding::Below(d) => format!("You need {:.1}% more to reach your goal", d),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollegeGuidance {
    pub goal: u8,
    pub percentage: Percentage,
    pub standing: GoalStanding,
    pub plan: GoalGuidance,
    pub eca: EcaImpact,
}

pub struct GuidanceUseCase<'a, S: KeyValueStore> {
    service: &'a AttendanceService<S>,
}

impl<'a, S: KeyValueStore> GuidanceUseCase<'a, S> {
    pub fn new(service: &'a AttendanceService<S>) -> Self {
        Self { service }
    }

    pub fn eca_impact(&self) -> AttendanceResult<EcaImpact> {
        self.service.require_mode(UserType::College)?;
        let college = self.service.college();

        let base_percentage = college.base_percentage();
        let boosted_percentage = college.overall_percentage();
        Ok(EcaImpact {
            eca_count: college.eca_count(),
            base_percentage,
            boosted_percentage,
            improvement: boosted_percentage.delta_to(base_percentage),
        })
    }

    pub fn goal_standing(&self) -> AttendanceResult<GoalStanding> {
        self.service.require_mode(UserType::College)?;
        let college = self.service.college();
        let delta = college.overall_percentage().delta_from(college.minimum_goal());
        Ok(GoalStanding::from_delta(delta))
    }

    pub fn college_guidance(&self) -> AttendanceResult<CollegeGuidance> {
        let college = self.service.college();
        Ok(CollegeGuidance {
            goal: college.minimum_goal(),
            percentage: college.overall_percentage(),
            standing: self.goal_standing()?,
            plan: college.guidance(),
            eca: self.eca_impact()?,
        })
    }
}
