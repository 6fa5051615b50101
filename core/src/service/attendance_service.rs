use crate::error::{AttendanceError, AttendanceResult, ValidationError};
use crate::input::{parse_count_or_zero, parse_goal};
use crate::model::college::{CollegeState, NewSubject, SubjectId};
use crate::model::profile::{UserProfile, UserType};
use crate::model::school::{Day, SchoolState};
use crate::model::state::{AppState, Lifecycle};
use crate::repository::{KeyValueStore, PersistenceGateway, StorageKey};
use crate::service::dto::StatsSummary;
use crate::service::stats_service;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceOptions {
    /// Reject attended counts above their totals.
    pub enforce_count_invariants: bool,
}

/// Root controller: owns the application state, applies every mutation and
/// mirrors the touched entities to the store.
///
/// Mutations complete in memory before anything is written; a failed write
/// is logged and never undoes the change.
pub struct AttendanceService<S: KeyValueStore> {
    gateway: PersistenceGateway<S>,
    state: AppState,
    options: ServiceOptions,
}

impl<S: KeyValueStore> AttendanceService<S> {
    /// Loads every persisted entity and starts the session.
    pub fn open(store: S) -> Self {
        Self::with_options(store, ServiceOptions::default())
    }

    pub fn with_options(store: S, options: ServiceOptions) -> Self {
        let gateway = PersistenceGateway::new(store);
        let state = gateway.load();
        tracing::debug!(lifecycle = ?state.lifecycle(), "state loaded");
        Self {
            gateway,
            state,
            options,
        }
    }

    pub fn store(&self) -> &S {
        self.gateway.store()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.state.lifecycle()
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.state.profile.as_ref()
    }

    pub fn school(&self) -> &SchoolState {
        &self.state.school
    }

    pub fn college(&self) -> &CollegeState {
        &self.state.college
    }

    // --- lifecycle ---

    pub fn complete_onboarding(
        &mut self,
        full_name: &str,
        class_or_semester: &str,
        user_type: UserType,
    ) -> AttendanceResult<&UserProfile> {
        if let Some(existing) = &self.state.profile {
            return Err(AttendanceError::AlreadyOnboarded {
                name: existing.full_name.clone(),
            });
        }
        let profile = UserProfile::new(full_name, class_or_semester, user_type)?;
        tracing::info!(user_type = %profile.user_type, "onboarding complete");

        self.state.profile = Some(profile);
        self.persist(&[StorageKey::UserProfile]);
        self.state.profile.as_ref().ok_or(AttendanceError::NotOnboarded)
    }

    /// Clears every stored key and returns to the uninitialized state.
    pub fn reset(&mut self) {
        let failures = self.gateway.clear_all();
        self.state = AppState::default();
        tracing::info!(failures, "all data reset");
    }

    // --- school ---

    pub fn toggle_day(&mut self, week_number: u32, day: Day) -> AttendanceResult<bool> {
        self.require_mode(UserType::School)?;
        let applied = self.state.school.toggle_day(week_number, day);
        if applied {
            self.persist(&[StorageKey::SchoolWeeks]);
        } else {
            tracing::debug!(week_number, "toggle on unknown week ignored");
        }
        Ok(applied)
    }

    /// Like [`toggle_day`](Self::toggle_day), parsing the day from user text.
    pub fn toggle_day_key(&mut self, week_number: u32, day: &str) -> AttendanceResult<bool> {
        self.require_mode(UserType::School)?;
        let day: Day = day.parse()?;
        self.toggle_day(week_number, day)
    }

    pub fn add_week(&mut self) -> AttendanceResult<u32> {
        self.require_mode(UserType::School)?;
        let number = self.state.school.add_week();
        self.persist(&[StorageKey::SchoolWeeks, StorageKey::SchoolCurrentWeek]);
        Ok(number)
    }

    pub fn set_current_week(&mut self, week_number: u32) -> AttendanceResult<()> {
        self.require_mode(UserType::School)?;
        self.state.school.set_current_week(week_number)?;
        self.persist(&[StorageKey::SchoolCurrentWeek]);
        Ok(())
    }

    pub fn next_week(&mut self) -> AttendanceResult<bool> {
        self.require_mode(UserType::School)?;
        let moved = self.state.school.next_week();
        if moved {
            self.persist(&[StorageKey::SchoolCurrentWeek]);
        }
        Ok(moved)
    }

    pub fn previous_week(&mut self) -> AttendanceResult<bool> {
        self.require_mode(UserType::School)?;
        let moved = self.state.school.previous_week();
        if moved {
            self.persist(&[StorageKey::SchoolCurrentWeek]);
        }
        Ok(moved)
    }

    /// Negative values clamp to 0.
    pub fn set_previous_attended(&mut self, n: i64) -> AttendanceResult<u32> {
        self.require_mode(UserType::School)?;
        let mut candidate = self.state.school.clone();
        candidate.set_previous_attended(n);
        self.check_carry_over(&candidate)?;

        self.state.school = candidate;
        self.persist(&[StorageKey::SchoolPreviousAttended]);
        Ok(self.state.school.previous_attended())
    }

    /// Negative values clamp to 0.
    pub fn set_previous_total(&mut self, n: i64) -> AttendanceResult<u32> {
        self.require_mode(UserType::School)?;
        let mut candidate = self.state.school.clone();
        candidate.set_previous_total(n);
        self.check_carry_over(&candidate)?;

        self.state.school = candidate;
        self.persist(&[StorageKey::SchoolPreviousTotal]);
        Ok(self.state.school.previous_total())
    }

    /// Free-form entry: malformed text reads as 0, negatives clamp to 0.
    pub fn set_previous_attended_text(&mut self, input: &str) -> AttendanceResult<u32> {
        self.set_previous_attended(parse_count_or_zero(input).into())
    }

    /// Free-form entry: malformed text reads as 0, negatives clamp to 0.
    pub fn set_previous_total_text(&mut self, input: &str) -> AttendanceResult<u32> {
        self.set_previous_total(parse_count_or_zero(input).into())
    }

    // --- college ---

    pub fn add_subject(
        &mut self,
        name: &str,
        total_classes: &str,
        attended_classes: &str,
    ) -> AttendanceResult<SubjectId> {
        self.require_mode(UserType::College)?;
        let new = NewSubject::parse(name, total_classes, attended_classes)?;
        if self.options.enforce_count_invariants {
            new.check_counts()?;
        }

        let id = self.state.college.add_subject(new).id.clone();
        self.persist(&[StorageKey::CollegeData]);
        Ok(id)
    }

    pub fn mark_present(&mut self, id: &SubjectId) -> AttendanceResult<bool> {
        self.require_mode(UserType::College)?;
        let applied = self.state.college.mark_present(id);
        self.after_subject_change(id, applied);
        Ok(applied)
    }

    pub fn mark_absent(&mut self, id: &SubjectId) -> AttendanceResult<bool> {
        self.require_mode(UserType::College)?;
        let applied = self.state.college.mark_absent(id);
        self.after_subject_change(id, applied);
        Ok(applied)
    }

    pub fn delete_subject(&mut self, id: &SubjectId) -> AttendanceResult<bool> {
        self.require_mode(UserType::College)?;
        let applied = self.state.college.delete_subject(id);
        self.after_subject_change(id, applied);
        Ok(applied)
    }

    /// Only whole numbers in `0..=100` are accepted; otherwise the goal is kept.
    pub fn set_minimum_goal(&mut self, input: &str) -> AttendanceResult<u8> {
        self.require_mode(UserType::College)?;
        let value = parse_goal(input)?;
        self.state.college.set_minimum_goal(value)?;
        self.persist(&[StorageKey::CollegeData]);
        Ok(self.state.college.minimum_goal())
    }

    /// Negative values clamp to 0.
    pub fn set_eca_count(&mut self, n: i64) -> AttendanceResult<u32> {
        self.require_mode(UserType::College)?;
        self.state.college.set_eca_count(n);
        self.persist(&[StorageKey::EcaCount]);
        Ok(self.state.college.eca_count())
    }

    /// Free-form entry: malformed text reads as 0, negatives clamp to 0.
    pub fn set_eca_count_text(&mut self, input: &str) -> AttendanceResult<u32> {
        self.set_eca_count(parse_count_or_zero(input).into())
    }

    // --- statistics ---

    /// Summary for the active mode.
    pub fn summary(&self) -> AttendanceResult<StatsSummary> {
        let user_type = self.active_mode()?;
        Ok(stats_service::summarize(&self.state, user_type))
    }

    // --- helpers ---

    pub(crate) fn active_mode(&self) -> AttendanceResult<UserType> {
        match self.state.lifecycle() {
            Lifecycle::Active(user_type) => Ok(user_type),
            Lifecycle::Uninitialized => Err(AttendanceError::NotOnboarded),
        }
    }

    pub(crate) fn require_mode(&self, expected: UserType) -> AttendanceResult<()> {
        let actual = self.active_mode()?;
        if actual != expected {
            return Err(AttendanceError::WrongMode { expected, actual });
        }
        Ok(())
    }

    fn check_carry_over(&self, candidate: &SchoolState) -> Result<(), ValidationError> {
        if self.options.enforce_count_invariants
            && candidate.previous_attended() > candidate.previous_total()
        {
            return Err(ValidationError::AttendedExceedsTotal {
                attended: candidate.previous_attended(),
                total: candidate.previous_total(),
            });
        }
        Ok(())
    }

    fn after_subject_change(&self, id: &SubjectId, applied: bool) {
        if applied {
            self.persist(&[StorageKey::CollegeData]);
        } else {
            tracing::debug!(%id, "no subject with this id");
        }
    }

    fn persist(&self, keys: &[StorageKey]) {
        self.gateway.save_all(keys, &self.state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryKeyValueStore;
    use anyhow::{anyhow, Result};
    use std::cell::Cell;

    /// Rejects every write.
    #[derive(Default)]
    struct ReadOnlyStore {
        writes: Cell<usize>,
    }

    impl KeyValueStore for ReadOnlyStore {
        fn load(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }
        fn save(&self, _key: &str, _value: &str) -> Result<()> {
            self.writes.set(self.writes.get() + 1);
            Err(anyhow!("read-only"))
        }
        fn clear(&self, _key: &str) -> Result<()> {
            Err(anyhow!("read-only"))
        }
    }

    fn school_service() -> AttendanceService<MemoryKeyValueStore> {
        let mut service = AttendanceService::open(MemoryKeyValueStore::new());
        service
            .complete_onboarding("Asha Rao", "10-B", UserType::School)
            .unwrap();
        service
    }

    fn college_service() -> AttendanceService<MemoryKeyValueStore> {
        let mut service = AttendanceService::open(MemoryKeyValueStore::new());
        service
            .complete_onboarding("Asha Rao", "5th", UserType::College)
            .unwrap();
        service
    }

    #[test]
    fn test_operations_need_a_profile() {
        let mut service = AttendanceService::open(MemoryKeyValueStore::new());
        assert_eq!(service.lifecycle(), Lifecycle::Uninitialized);
        assert_eq!(service.add_week(), Err(AttendanceError::NotOnboarded));
        assert_eq!(service.summary(), Err(AttendanceError::NotOnboarded));
        assert!(service.store().is_empty());
    }

    #[test]
    fn test_onboarding_is_validated_and_once_only() {
        let mut service = AttendanceService::open(MemoryKeyValueStore::new());
        assert!(matches!(
            service.complete_onboarding("", "10-B", UserType::School),
            Err(AttendanceError::Validation(ValidationError::EmptyName))
        ));
        assert_eq!(service.lifecycle(), Lifecycle::Uninitialized);

        service
            .complete_onboarding("Asha", "10-B", UserType::School)
            .unwrap();
        assert_eq!(service.lifecycle(), Lifecycle::Active(UserType::School));
        assert!(service.store().contains("user_profile"));

        assert!(matches!(
            service.complete_onboarding("Other", "9-A", UserType::College),
            Err(AttendanceError::AlreadyOnboarded { .. })
        ));
    }

    #[test]
    fn test_mode_is_enforced() {
        let mut service = school_service();
        assert_eq!(
            service.set_eca_count(3),
            Err(AttendanceError::WrongMode {
                expected: UserType::College,
                actual: UserType::School,
            })
        );
        assert_eq!(service.college().eca_count(), 0);
    }

    #[test]
    fn test_school_changes_are_persisted() {
        let mut service = school_service();
        assert_eq!(service.toggle_day_key(1, "mon"), Ok(true));
        assert_eq!(service.add_week(), Ok(2));
        assert_eq!(
            service.store().load("school_current_week").unwrap().as_deref(),
            Some("2")
        );

        let weeks = service.store().load("school_weeks").unwrap().unwrap();
        assert!(weeks.contains("\"monday\":true"));

        assert_eq!(service.previous_week(), Ok(true));
        assert_eq!(
            service.store().load("school_current_week").unwrap().as_deref(),
            Some("1")
        );
    }

    #[test]
    fn test_unknown_day_is_rejected_without_change() {
        let mut service = school_service();
        let before = service.state().clone();
        assert!(matches!(
            service.toggle_day_key(1, "sunday"),
            Err(AttendanceError::Validation(ValidationError::UnknownDay { .. }))
        ));
        assert!(service.toggle_day_key(1, "t").is_err());
        assert_eq!(service.state(), &before);
    }

    #[test]
    fn test_unknown_week_is_a_quiet_miss() {
        let mut service = school_service();
        assert_eq!(service.toggle_day(9, Day::Monday), Ok(false));
        assert!(!service.store().contains("school_weeks"));
    }

    #[test]
    fn test_carry_over_is_permissive_by_default() {
        let mut service = school_service();
        assert_eq!(service.set_previous_attended(12), Ok(12));
        assert_eq!(service.set_previous_total(-5), Ok(0));
    }

    #[test]
    fn test_text_counters_are_lenient() {
        let mut service = school_service();
        assert_eq!(service.set_previous_total_text(" 12 "), Ok(12));
        assert_eq!(service.set_previous_attended_text("abc"), Ok(0));
        assert_eq!(service.set_previous_total_text("-4"), Ok(0));
        assert_eq!(
            service.store().load("school_previous_total").unwrap().as_deref(),
            Some("0")
        );

        let mut college = college_service();
        assert_eq!(college.set_eca_count_text("3"), Ok(3));
        assert_eq!(college.set_eca_count_text("lots"), Ok(0));
        assert_eq!(college.college().eca_count(), 0);
    }

    #[test]
    fn test_strict_carry_over() {
        let mut service = AttendanceService::with_options(
            MemoryKeyValueStore::new(),
            ServiceOptions {
                enforce_count_invariants: true,
            },
        );
        service
            .complete_onboarding("Asha", "10-B", UserType::School)
            .unwrap();
        assert!(service.set_previous_attended(3).is_err());
        assert_eq!(service.set_previous_total(10), Ok(10));
        assert_eq!(service.set_previous_attended(3), Ok(3));
        assert!(service.set_previous_total(2).is_err());
        assert_eq!(service.school().previous_total(), 10);
    }

    #[test]
    fn test_college_flow() {
        let mut service = college_service();
        let id = service.add_subject("Maths", "10", "7").unwrap();
        assert_eq!(service.mark_present(&id), Ok(true));
        assert_eq!(service.mark_absent(&id), Ok(true));

        let subject = service.college().subject(&id).unwrap();
        assert_eq!((subject.total_classes, subject.attended_classes), (12, 8));
        assert!(service
            .store()
            .load("college_data")
            .unwrap()
            .unwrap()
            .contains("\"totalClasses\":12"));

        assert_eq!(service.delete_subject(&id), Ok(true));
        assert_eq!(service.delete_subject(&id), Ok(false));
    }

    #[test]
    fn test_add_subject_rejections() {
        let mut service = college_service();
        assert!(service.add_subject("  ", "10", "7").is_err());
        assert!(service.add_subject("Maths", "x", "7").is_err());
        assert!(service.add_subject("Maths", "10", "-7").is_err());
        assert!(service.college().subjects().is_empty());
        assert!(!service.store().contains("college_data"));

        // permissive by default
        assert!(service.add_subject("Maths", "3", "7").is_ok());
    }

    #[test]
    fn test_goal_rejects_and_keeps_previous() {
        let mut service = college_service();
        assert_eq!(service.set_minimum_goal("80"), Ok(80));
        assert!(service.set_minimum_goal("abc").is_err());
        assert!(service.set_minimum_goal("101").is_err());
        assert!(service.set_minimum_goal("-1").is_err());
        assert_eq!(service.college().minimum_goal(), 80);
    }

    #[test]
    fn test_write_failure_keeps_memory_state() {
        let store = ReadOnlyStore::default();
        let mut service = AttendanceService::open(&store);
        service
            .complete_onboarding("Asha", "5th", UserType::College)
            .unwrap();
        let id = service.add_subject("Maths", "4", "3").unwrap();
        service.mark_present(&id).unwrap();

        assert_eq!(service.college().subject(&id).unwrap().total_classes, 5);
        assert_eq!(store.writes.get(), 3);
    }

    #[test]
    fn test_reset_clears_store_and_state() {
        let mut service = college_service();
        let id = service.add_subject("Maths", "4", "3").unwrap();
        service.set_eca_count(2).unwrap();
        assert!(service.store().contains("college_data"));

        service.reset();
        assert_eq!(service.lifecycle(), Lifecycle::Uninitialized);
        assert!(service.store().is_empty());
        assert!(service.college().subject(&id).is_none());
        assert_eq!(service.college().eca_count(), 0);
    }
}
