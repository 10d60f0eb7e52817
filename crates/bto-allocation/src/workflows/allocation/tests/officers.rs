use super::common::*;
use crate::workflows::allocation::{
    AllocationError, ApplicationStatus, ProjectApplication, ReviewStatus,
};

const JANUARY: &str = "Jasmine Court";
const MIDWINTER: &str = "Kembangan Vista";

fn overlapping_projects() -> crate::workflows::allocation::AllocationLedger {
    let mut ledger = people();
    ledger
        .projects()
        .create(&nric(MANAGER), draft(JANUARY, date(1, 1), date(1, 31), 2, 2))
        .expect("january project");
    ledger
        .projects()
        .create(
            &nric(SECOND_MANAGER),
            draft(MIDWINTER, date(1, 15), date(2, 15), 2, 2),
        )
        .expect("overlapping project");
    ledger
}

#[test]
fn approving_one_registration_rejects_overlapping_pending_ones() {
    let mut ledger = overlapping_projects();
    let officer = nric(DANIEL);

    for project in [JANUARY, MIDWINTER] {
        let registration = ledger
            .officers()
            .register(&officer, &project_name(project), date(1, 2))
            .expect("registration filed");
        assert_eq!(registration.status, ReviewStatus::Pending);
    }

    let approval = ledger
        .officers()
        .approve(&reg_key(DANIEL, JANUARY))
        .expect("approved");
    assert_eq!(approval.registration.status, ReviewStatus::Approved);
    assert_eq!(approval.auto_rejected, vec![project_name(MIDWINTER)]);

    assert_eq!(
        ledger
            .registration(&reg_key(DANIEL, MIDWINTER))
            .map(|registration| registration.status),
        Some(ReviewStatus::Rejected)
    );
    let project = ledger.project(&project_name(JANUARY)).expect("project");
    assert_eq!(project.officer_slots.available, 2);
    assert!(ledger
        .officer(&officer)
        .expect("officer")
        .assigned_projects
        .contains(&project_name(JANUARY)));
}

#[test]
fn registration_is_refused_once_the_schedule_is_taken() {
    let mut ledger = overlapping_projects();
    assign_officer(&mut ledger, DANIEL, JANUARY);

    let error = ledger
        .officers()
        .register(&nric(DANIEL), &project_name(MIDWINTER), date(1, 3))
        .expect_err("overlaps assigned project");
    assert_eq!(
        error,
        AllocationError::DateRangeConflict {
            project: project_name(MIDWINTER),
            conflicting: project_name(JANUARY),
        }
    );
}

#[test]
fn slots_run_out() {
    let mut ledger = people();
    let mut single_slot = draft(ACACIA, date(2, 15), date(3, 31), 2, 2);
    single_slot.officer_slots = 1;
    ledger
        .projects()
        .create(&nric(MANAGER), single_slot)
        .expect("project");
    assign_officer(&mut ledger, DANIEL, ACACIA);

    let error = ledger
        .officers()
        .register(&nric(EMILY), &project_name(ACACIA), date(2, 2))
        .expect_err("no slots left");
    assert_eq!(error, AllocationError::NoOfficerSlots(project_name(ACACIA)));
}

#[test]
fn slots_are_checked_again_at_approval() {
    let mut ledger = people();
    let mut single_slot = draft(ACACIA, date(2, 15), date(3, 31), 2, 2);
    single_slot.officer_slots = 1;
    ledger
        .projects()
        .create(&nric(MANAGER), single_slot)
        .expect("project");

    for officer in [DANIEL, EMILY] {
        ledger
            .officers()
            .register(&nric(officer), &project_name(ACACIA), date(2, 1))
            .expect("both fit while pending");
    }
    ledger
        .officers()
        .approve(&reg_key(DANIEL, ACACIA))
        .expect("first approval");

    let error = ledger
        .officers()
        .approve(&reg_key(EMILY, ACACIA))
        .expect_err("slot taken");
    assert_eq!(error, AllocationError::NoOfficerSlots(project_name(ACACIA)));
    assert_eq!(
        ledger
            .registration(&reg_key(EMILY, ACACIA))
            .map(|registration| registration.status),
        Some(ReviewStatus::Pending)
    );
}

#[test]
fn duplicate_and_repeated_registrations() {
    let mut ledger = ledger_with_project(2, 2);
    let officer = nric(EMILY);
    let project = project_name(ACACIA);

    ledger
        .officers()
        .register(&officer, &project, date(2, 1))
        .expect("first registration");
    let duplicate = ledger
        .officers()
        .register(&officer, &project, date(2, 2))
        .expect_err("already pending");
    assert!(matches!(duplicate, AllocationError::AlreadyRegistered { .. }));

    ledger
        .officers()
        .reject(&reg_key(EMILY, ACACIA))
        .expect("rejected");
    let again = ledger
        .officers()
        .reject(&reg_key(EMILY, ACACIA))
        .expect_err("rejecting twice");
    assert!(matches!(
        again,
        AllocationError::InvalidStateForTransition { state: "rejected", .. }
    ));

    let renewed = ledger
        .officers()
        .register(&officer, &project, date(2, 3))
        .expect("a rejected registration may be filed again");
    assert_eq!(renewed.status, ReviewStatus::Pending);
    assert_eq!(renewed.requested_on, date(2, 3));
}

#[test]
fn applicants_of_a_project_cannot_staff_it() {
    let mut ledger = ledger_with_project(2, 2);
    ledger
        .applications()
        .submit(&nric(DANIEL), &project_name(ACACIA), date(3, 1))
        .expect("officer applies as an applicant");

    let error = ledger
        .officers()
        .register(&nric(DANIEL), &project_name(ACACIA), date(3, 2))
        .expect_err("conflict of interest");
    assert!(matches!(error, AllocationError::DateRangeConflict { .. }));
}

#[test]
fn registration_is_refused_for_a_project_overlapping_an_application() {
    let mut ledger = overlapping_projects();
    ledger
        .applications()
        .submit(&nric(DANIEL), &project_name(JANUARY), date(1, 20))
        .expect("officer applies as an applicant");

    let error = ledger
        .officers()
        .register(&nric(DANIEL), &project_name(MIDWINTER), date(1, 20))
        .expect_err("windows overlap");
    assert_eq!(
        error,
        AllocationError::DateRangeConflict {
            project: project_name(MIDWINTER),
            conflicting: project_name(JANUARY),
        }
    );
}

#[test]
fn applications_are_refused_near_a_pending_registration() {
    let mut ledger = overlapping_projects();
    ledger
        .officers()
        .register(&nric(DANIEL), &project_name(MIDWINTER), date(1, 2))
        .expect("registration filed");

    let error = ledger
        .applications()
        .submit(&nric(DANIEL), &project_name(JANUARY), date(1, 20))
        .expect_err("pending registration overlaps");
    assert_eq!(
        error,
        AllocationError::DateRangeConflict {
            project: project_name(JANUARY),
            conflicting: project_name(MIDWINTER),
        }
    );
    assert!(ledger.active_application(&nric(DANIEL)).is_none());
}

#[test]
fn approval_rechecks_applications_filed_after_registration() {
    let mut ledger = overlapping_projects();
    ledger
        .officers()
        .register(&nric(DANIEL), &project_name(MIDWINTER), date(1, 2))
        .expect("registration filed");
    // Loaded from a file written before applications were checked against registrations.
    let application = ProjectApplication {
        applicant: nric(DANIEL),
        project: project_name(JANUARY),
        status: ApplicationStatus::Pending,
        selected_flat_type: None,
        withdrawal_status: None,
        submitted_on: date(1, 3),
    };
    ledger.applications.insert(application.key(), application);

    let error = ledger
        .officers()
        .approve(&reg_key(DANIEL, MIDWINTER))
        .expect_err("applied to an overlapping project");
    assert_eq!(
        error,
        AllocationError::DateRangeConflict {
            project: project_name(MIDWINTER),
            conflicting: project_name(JANUARY),
        }
    );
    let project = ledger.project(&project_name(MIDWINTER)).expect("project");
    assert_eq!(project.officer_slots.available, 2);
    assert_eq!(
        ledger
            .registration(&reg_key(DANIEL, MIDWINTER))
            .map(|registration| registration.status),
        Some(ReviewStatus::Pending)
    );
}

#[test]
fn unknown_officers_and_projects_are_not_found() {
    let mut ledger = ledger_with_project(2, 2);

    let applicant = ledger
        .officers()
        .register(&nric(JOHN), &project_name(ACACIA), date(2, 1))
        .expect_err("john is not an officer");
    assert!(matches!(applicant, AllocationError::NotFound { entity: "officer", .. }));

    let project = ledger
        .officers()
        .register(&nric(DANIEL), &project_name("Nowhere"), date(2, 1))
        .expect_err("no such project");
    assert!(matches!(project, AllocationError::NotFound { entity: "project", .. }));
}

#[test]
fn officers_see_the_projects_they_handle() {
    let mut ledger = overlapping_projects();
    ledger.projects().set_visibility(&project_name(JANUARY), false).expect("hidden");
    assign_officer(&mut ledger, DANIEL, JANUARY);

    let handled = ledger.projects().handled_by(&nric(DANIEL));
    assert_eq!(handled.len(), 1);
    assert_eq!(handled[0].name, project_name(JANUARY));
    assert!(!handled[0].visible);

    let pending = ledger.officers().pending_for_project(&project_name(JANUARY));
    assert!(pending.is_empty());
}
