use super::common::*;
use crate::workflows::allocation::{
    AllocationError, AllocationServiceError, ApprovalOutcome, BookingOutcome, FlatType,
    ProjectFilter, SessionError,
};

#[test]
fn every_command_is_persisted() {
    let mut ledger = ledger_with_project(1, 1);
    assign_officer(&mut ledger, DANIEL, ACACIA);
    let (service, store) = memory_service(&ledger);
    let key = app_key(SARAH, ACACIA);

    service
        .submit_application(&key.applicant, &key.project, date(3, 1))
        .expect("submitted");
    assert_eq!(store.contents().expect("contents").applications.len(), 1);

    assert_eq!(
        service.approve_application(&key).expect("approved"),
        ApprovalOutcome::Approved
    );
    service
        .select_flat_type(&key, FlatType::ThreeRoom)
        .expect("selected");
    let outcome = service
        .process_booking(&key, &nric(DANIEL))
        .expect("processed");
    assert!(matches!(outcome, BookingOutcome::Booked { .. }));

    let saved = store.contents().expect("contents");
    assert_eq!(saved.bookings.len(), 1);
    assert_eq!(saved.projects[0].three_room_available, 0);
    assert_eq!(
        service
            .inventory(&project_name(ACACIA))
            .expect("inventory")
            .iter()
            .map(|line| line.available)
            .collect::<Vec<_>>(),
        vec![1, 0]
    );
}

#[test]
fn a_failed_save_rolls_the_command_back() {
    let ledger = ledger_with_project(2, 2);
    let service = read_only_service(&ledger);

    let error = service
        .submit_application(&nric(JOHN), &project_name(ACACIA), date(3, 1))
        .expect_err("store refuses writes");
    assert!(matches!(
        error,
        AllocationServiceError::Session(SessionError::Save(_))
    ));

    let missing = service
        .application(&app_key(JOHN, ACACIA))
        .expect_err("nothing was kept");
    assert!(matches!(
        missing,
        AllocationServiceError::Allocation(AllocationError::NotFound { .. })
    ));
}

#[test]
fn rule_violations_skip_the_store() {
    let ledger = ledger_with_project(2, 2);
    let service = read_only_service(&ledger);

    let error = service
        .submit_application(&nric(KEVIN), &project_name(ACACIA), date(3, 1))
        .expect_err("ineligible");
    assert!(matches!(
        error,
        AllocationServiceError::Allocation(AllocationError::NotEligible { .. })
    ));

    let listing = service
        .visible_projects(&nric(JOHN), &ProjectFilter::default())
        .expect("read-only queries work");
    assert_eq!(listing.len(), 1);
}

#[test]
fn withdrawal_and_registration_queues() {
    let ledger = ledger_with_project(2, 2);
    let (service, _) = memory_service(&ledger);
    let key = app_key(JOHN, ACACIA);

    service
        .submit_application(&key.applicant, &key.project, date(3, 1))
        .expect("submitted");
    assert_eq!(
        service
            .pending_applications(&project_name(ACACIA))
            .expect("queue")
            .len(),
        1
    );
    service
        .request_withdrawal(&key.applicant, date(3, 2))
        .expect("requested");
    assert_eq!(service.pending_withdrawals().expect("queue").len(), 1);
    service.approve_withdrawal(&key).expect("approved");
    assert!(service.pending_withdrawals().expect("queue").is_empty());

    service
        .register_officer(&nric(EMILY), &project_name(ACACIA), date(2, 1))
        .expect("registered");
    assert_eq!(
        service
            .pending_registrations(&project_name(ACACIA))
            .expect("queue")
            .len(),
        1
    );
    let approval = service
        .approve_registration(&reg_key(EMILY, ACACIA))
        .expect("approved");
    assert!(approval.auto_rejected.is_empty());
    assert_eq!(
        service
            .project(&project_name(ACACIA))
            .expect("project")
            .officer_slots_available,
        2
    );
}
