pub mod config;
pub mod error;
pub mod input;
pub mod model;
pub mod repository;
pub mod service;
pub mod usecase;

pub use config::Config;
pub use error::{AttendanceError, AttendanceResult, ValidationError};
pub use input::{expand_key, parse_count, parse_count_or_zero, parse_goal};
pub use model::college::{CollegeData, CollegeState, CollegeSubject, GoalGuidance, SubjectId};
pub use model::percentage::Percentage;
pub use model::profile::{UserProfile, UserType};
pub use model::school::{Day, SchoolState, Week, WeekAttendance};
pub use model::state::{AppState, Lifecycle};
pub use repository::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore, PersistenceGateway, StorageKey};
pub use service::attendance_service::{AttendanceService, ServiceOptions};
pub use service::dto::{Breakdown, StatsSummary, SubjectBreakdown, WeekBreakdown};
pub use usecase::guidance::{CollegeGuidance, EcaImpact, GoalStanding, GuidanceUseCase};
