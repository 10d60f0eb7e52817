use chrono::NaiveDate;

use super::domain::{ApplicationKey, ApplicationStatus, Nric, ReviewStatus, Withdrawal};
use super::error::AllocationError;
use super::ledger::AllocationLedger;

/// Secondary approval workflow that unwinds an application once approved.
pub struct WithdrawalDesk<'a> {
    ledger: &'a mut AllocationLedger,
}

impl<'a> WithdrawalDesk<'a> {
    pub(crate) fn new(ledger: &'a mut AllocationLedger) -> Self {
        Self { ledger }
    }

    /// File a withdrawal against the applicant's active application.
    pub fn request(&mut self, applicant: &Nric, today: NaiveDate) -> Result<Withdrawal, AllocationError> {
        self.ledger.applicant_ref(applicant)?;
        let application = self
            .ledger
            .active_application(applicant)
            .ok_or_else(|| AllocationError::not_found("application for applicant", applicant))?;
        let key = application.key();
        if application.withdrawal_status.is_some() {
            return Err(AllocationError::DuplicateWithdrawal(key.to_string()));
        }

        self.ledger.application_mut(&key)?.withdrawal_status = Some(ReviewStatus::Pending);
        let withdrawal = Withdrawal {
            applicant: key.applicant.clone(),
            project: key.project.clone(),
            status: ReviewStatus::Pending,
            requested_on: today,
        };
        self.ledger.withdrawals.insert(key, withdrawal.clone());
        Ok(withdrawal)
    }

    /// Approve a pending withdrawal, releasing any unit the application had booked.
    pub fn approve(&mut self, key: &ApplicationKey) -> Result<Withdrawal, AllocationError> {
        self.pending(key)?;
        let status = self.ledger.application_ref(key)?.status;

        if status == ApplicationStatus::Booked {
            let held = self
                .ledger
                .bookings
                .get(&key.applicant)
                .filter(|booking| booking.project == key.project)
                .and_then(|booking| booking.held_unit().cloned());
            if let Some(unit_id) = held {
                self.ledger
                    .project_mut(&key.project)?
                    .inventory
                    .release(&unit_id)
                    .map_err(|_| AllocationError::not_found("unit", &unit_id))?;
            }
            self.ledger.bookings.remove(&key.applicant);
        }

        self.ledger.application_mut(key)?.withdrawal_status = Some(ReviewStatus::Approved);
        if let Some(applicant) = self.ledger.applicants.get_mut(&key.applicant) {
            if applicant.active_application.as_ref() == Some(&key.project) {
                applicant.active_application = None;
            }
        }
        self.settle(key, ReviewStatus::Approved)
    }

    /// Reject a pending withdrawal; the application stays exactly as it was.
    pub fn reject(&mut self, key: &ApplicationKey) -> Result<Withdrawal, AllocationError> {
        self.pending(key)?;
        self.ledger.application_mut(key)?.withdrawal_status = Some(ReviewStatus::Rejected);
        self.settle(key, ReviewStatus::Rejected)
    }

    fn settle(&mut self, key: &ApplicationKey, status: ReviewStatus) -> Result<Withdrawal, AllocationError> {
        let withdrawal = self
            .ledger
            .withdrawals
            .get_mut(key)
            .ok_or_else(|| AllocationError::not_found("withdrawal", key))?;
        withdrawal.status = status;
        Ok(withdrawal.clone())
    }

    fn pending(&self, key: &ApplicationKey) -> Result<(), AllocationError> {
        let withdrawal = self
            .ledger
            .withdrawals
            .get(key)
            .ok_or_else(|| AllocationError::not_found("withdrawal", key))?;
        if withdrawal.status != ReviewStatus::Pending {
            return Err(AllocationError::invalid_state(
                "withdrawal",
                key,
                withdrawal.status.label(),
            ));
        }
        Ok(())
    }
}
