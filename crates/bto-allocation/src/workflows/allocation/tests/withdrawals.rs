use super::common::*;
use crate::workflows::allocation::{
    AllocationError, AllocationLedger, ApplicationKey, ApplicationStatus, FlatType, ReviewStatus,
};

fn booked_three_room(ledger: &mut AllocationLedger, applicant: &str) -> ApplicationKey {
    let key = successful_application(ledger, applicant);
    ledger
        .applications()
        .select_flat_type(&key, FlatType::ThreeRoom)
        .expect("selected");
    ledger
        .applications()
        .process_booking(&key, &nric(DANIEL))
        .expect("booked");
    key
}

#[test]
fn withdrawing_a_booked_application_returns_the_unit() {
    let mut ledger = ledger_with_project(0, 4);
    assign_officer(&mut ledger, DANIEL, ACACIA);
    let key = booked_three_room(&mut ledger, SARAH);
    assert_eq!(available(&ledger, ACACIA, FlatType::ThreeRoom), 3);

    let withdrawal = ledger
        .withdrawals()
        .request(&key.applicant, date(3, 10))
        .expect("requested");
    assert_eq!(withdrawal.status, ReviewStatus::Pending);
    assert_eq!(
        ledger.application(&key).and_then(|app| app.withdrawal_status),
        Some(ReviewStatus::Pending)
    );

    let approved = ledger.withdrawals().approve(&key).expect("approved");
    assert_eq!(approved.status, ReviewStatus::Approved);
    assert_eq!(available(&ledger, ACACIA, FlatType::ThreeRoom), 4);
    assert!(ledger.active_application(&key.applicant).is_none());
    assert!(ledger.booking(&key.applicant).is_none());
    assert_eq!(
        ledger.application(&key).map(|app| app.status),
        Some(ApplicationStatus::Booked)
    );
}

#[test]
fn withdrawal_requires_an_active_application() {
    let mut ledger = ledger_with_project(2, 2);
    let error = ledger
        .withdrawals()
        .request(&nric(JOHN), date(3, 1))
        .expect_err("nothing to withdraw");
    assert!(matches!(error, AllocationError::NotFound { .. }));
}

#[test]
fn only_one_withdrawal_per_application() {
    let mut ledger = ledger_with_project(2, 2);
    let key = successful_application(&mut ledger, JOHN);

    ledger
        .withdrawals()
        .request(&key.applicant, date(3, 5))
        .expect("first request");
    let pending = ledger
        .withdrawals()
        .request(&key.applicant, date(3, 6))
        .expect_err("still pending");
    assert_eq!(pending, AllocationError::DuplicateWithdrawal(key.to_string()));

    ledger.withdrawals().reject(&key).expect("rejected");
    let after_rejection = ledger
        .withdrawals()
        .request(&key.applicant, date(3, 7))
        .expect_err("a rejected withdrawal is final");
    assert!(matches!(after_rejection, AllocationError::DuplicateWithdrawal(_)));

    let application = ledger.application(&key).expect("application kept");
    assert_eq!(application.status, ApplicationStatus::Successful);
    assert_eq!(application.withdrawal_status, Some(ReviewStatus::Rejected));
    assert!(ledger.active_application(&key.applicant).is_some());
}

#[test]
fn settled_withdrawals_cannot_be_reviewed_again() {
    let mut ledger = ledger_with_project(2, 2);
    let key = successful_application(&mut ledger, JOHN);
    ledger
        .withdrawals()
        .request(&key.applicant, date(3, 5))
        .expect("requested");
    ledger.withdrawals().approve(&key).expect("approved");
    let before = ledger.clone();

    let error = ledger.withdrawals().approve(&key).expect_err("already approved");
    assert!(matches!(
        error,
        AllocationError::InvalidStateForTransition { state: "approved", .. }
    ));
    assert_eq!(
        ledger.withdrawal(&key),
        before.withdrawal(&key),
        "a refused transition leaves the record untouched"
    );
    assert_eq!(ledger.application(&key), before.application(&key));
}

#[test]
fn an_applicant_may_reapply_after_withdrawing() {
    let mut ledger = ledger_with_project(2, 2);
    let key = successful_application(&mut ledger, JOHN);
    ledger
        .withdrawals()
        .request(&key.applicant, date(3, 5))
        .expect("requested");
    ledger.withdrawals().approve(&key).expect("approved");

    let resubmitted = ledger
        .applications()
        .submit(&key.applicant, &key.project, date(3, 8))
        .expect("resubmission");
    assert_eq!(resubmitted.status, ApplicationStatus::Pending);
    assert_eq!(resubmitted.withdrawal_status, None);
    assert_eq!(resubmitted.submitted_on, date(3, 8));
    assert!(ledger.withdrawal(&key).is_none());
    assert_eq!(
        ledger.active_application(&key.applicant).map(|app| app.key()),
        Some(key)
    );
}

#[test]
fn withdrawn_applications_cannot_progress() {
    let mut ledger = ledger_with_project(2, 2);
    let key = successful_application(&mut ledger, SARAH);
    ledger
        .withdrawals()
        .request(&key.applicant, date(3, 5))
        .expect("requested");
    ledger.withdrawals().approve(&key).expect("approved");

    let error = ledger
        .applications()
        .select_flat_type(&key, FlatType::TwoRoom)
        .expect_err("withdrawn");
    assert!(matches!(
        error,
        AllocationError::InvalidStateForTransition { state: "withdrawn", .. }
    ));
    assert_eq!(ledger.pending_withdrawals().count(), 0);
}
