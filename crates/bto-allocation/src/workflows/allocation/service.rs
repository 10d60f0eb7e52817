use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;
use tracing::{info, warn};

use super::applications::{ApprovalOutcome, BookingOutcome};
use super::domain::{
    ApplicationKey, FlatType, Nric, OfficerRegistration, ProjectApplication, ProjectName,
    RegistrationKey, Withdrawal,
};
use super::error::AllocationError;
use super::inventory::InventoryLine;
use super::ledger::AllocationLedger;
use super::officers::RegistrationApproval;
use super::persistence::AllocationStore;
use super::projects::{ProjectDraft, ProjectFilter, ProjectListing};
use super::reconcile::ReconcileReport;
use super::session::{AllocationSession, SessionError};

/// Service serializing every command through one session and persisting after each change.
pub struct AllocationService<S> {
    session: Mutex<AllocationSession<S>>,
}

impl<S> AllocationService<S>
where
    S: AllocationStore + 'static,
{
    pub fn new(session: AllocationSession<S>) -> Self {
        Self {
            session: Mutex::new(session),
        }
    }

    /// Open a session over `store` and wrap it.
    pub fn open(store: S) -> Result<Self, AllocationServiceError> {
        Ok(Self::new(AllocationSession::open(store)?))
    }

    pub fn reconcile_report(&self) -> Result<ReconcileReport, AllocationServiceError> {
        Ok(self.lock()?.report().clone())
    }

    pub fn create_project(
        &self,
        manager: &Nric,
        draft: ProjectDraft,
    ) -> Result<ProjectListing, AllocationServiceError> {
        let listing = self.mutate(|ledger| {
            ledger
                .projects()
                .create(manager, draft)
                .map(|project| project.listing())
        })?;
        info!(project = %listing.name, manager = %manager, "project created");
        Ok(listing)
    }

    pub fn set_visibility(
        &self,
        project: &ProjectName,
        visible: bool,
    ) -> Result<ProjectListing, AllocationServiceError> {
        let listing = self.mutate(|ledger| {
            ledger.projects().set_visibility(project, visible)?;
            ledger
                .project_ref(project)
                .map(|project| project.listing())
        })?;
        info!(project = %project, visible, "project visibility changed");
        Ok(listing)
    }

    pub fn delete_project(&self, project: &ProjectName) -> Result<(), AllocationServiceError> {
        self.mutate(|ledger| ledger.projects().delete(project).map(|_| ()))?;
        info!(project = %project, "project deleted");
        Ok(())
    }

    pub fn project(&self, project: &ProjectName) -> Result<ProjectListing, AllocationServiceError> {
        let session = self.lock()?;
        let listing = session.ledger().project_ref(project)?.listing();
        Ok(listing)
    }

    pub fn visible_projects(
        &self,
        applicant: &Nric,
        filter: &ProjectFilter,
    ) -> Result<Vec<ProjectListing>, AllocationServiceError> {
        let mut session = self.lock()?;
        Ok(session.ledger_mut().projects().visible_for(applicant, filter)?)
    }

    pub fn inventory(
        &self,
        project: &ProjectName,
    ) -> Result<Vec<InventoryLine>, AllocationServiceError> {
        let session = self.lock()?;
        let lines = session.ledger().project_ref(project)?.inventory.summary();
        Ok(lines)
    }

    pub fn submit_application(
        &self,
        applicant: &Nric,
        project: &ProjectName,
        today: NaiveDate,
    ) -> Result<ProjectApplication, AllocationServiceError> {
        let application = self.mutate(|ledger| {
            ledger.applications().submit(applicant, project, today)
        })?;
        info!(applicant = %applicant, project = %project, "application submitted");
        Ok(application)
    }

    pub fn application(
        &self,
        key: &ApplicationKey,
    ) -> Result<ProjectApplication, AllocationServiceError> {
        let session = self.lock()?;
        let application = session.ledger().application_ref(key)?.clone();
        Ok(application)
    }

    pub fn pending_applications(
        &self,
        project: &ProjectName,
    ) -> Result<Vec<ProjectApplication>, AllocationServiceError> {
        let mut session = self.lock()?;
        session.ledger().project_ref(project)?;
        Ok(session.ledger_mut().applications().pending_for_project(project))
    }

    pub fn approve_application(
        &self,
        key: &ApplicationKey,
    ) -> Result<ApprovalOutcome, AllocationServiceError> {
        let outcome = self.mutate(|ledger| ledger.applications().approve(key))?;
        match outcome {
            ApprovalOutcome::Approved => info!(application = %key, "application approved"),
            ApprovalOutcome::OutOfStock => {
                warn!(application = %key, "application unsuccessful, no eligible stock left")
            }
        }
        Ok(outcome)
    }

    pub fn reject_application(&self, key: &ApplicationKey) -> Result<(), AllocationServiceError> {
        self.mutate(|ledger| ledger.applications().reject(key))?;
        info!(application = %key, "application rejected");
        Ok(())
    }

    pub fn select_flat_type(
        &self,
        key: &ApplicationKey,
        flat_type: FlatType,
    ) -> Result<ProjectApplication, AllocationServiceError> {
        let application = self.mutate(|ledger| {
            ledger.applications().select_flat_type(key, flat_type)
        })?;
        info!(application = %key, flat_type = flat_type.label(), "flat type selected");
        Ok(application)
    }

    pub fn process_booking(
        &self,
        key: &ApplicationKey,
        officer: &Nric,
    ) -> Result<BookingOutcome, AllocationServiceError> {
        let outcome = self.mutate(|ledger| ledger.applications().process_booking(key, officer))?;
        match &outcome {
            BookingOutcome::Booked { booking } => info!(
                application = %key,
                officer = %officer,
                unit = booking.unit_id.as_ref().map(|unit| unit.as_str()).unwrap_or_default(),
                "flat booked"
            ),
            BookingOutcome::Rejected { reason } => {
                warn!(application = %key, officer = %officer, reason = %reason, "booking rejected")
            }
        }
        Ok(outcome)
    }

    pub fn request_withdrawal(
        &self,
        applicant: &Nric,
        today: NaiveDate,
    ) -> Result<Withdrawal, AllocationServiceError> {
        let withdrawal = self.mutate(|ledger| ledger.withdrawals().request(applicant, today))?;
        info!(applicant = %applicant, project = %withdrawal.project, "withdrawal requested");
        Ok(withdrawal)
    }

    pub fn pending_withdrawals(&self) -> Result<Vec<Withdrawal>, AllocationServiceError> {
        let session = self.lock()?;
        Ok(session.ledger().pending_withdrawals().cloned().collect())
    }

    pub fn approve_withdrawal(
        &self,
        key: &ApplicationKey,
    ) -> Result<Withdrawal, AllocationServiceError> {
        let withdrawal = self.mutate(|ledger| ledger.withdrawals().approve(key))?;
        info!(application = %key, "withdrawal approved");
        Ok(withdrawal)
    }

    pub fn reject_withdrawal(
        &self,
        key: &ApplicationKey,
    ) -> Result<Withdrawal, AllocationServiceError> {
        let withdrawal = self.mutate(|ledger| ledger.withdrawals().reject(key))?;
        info!(application = %key, "withdrawal rejected");
        Ok(withdrawal)
    }

    pub fn register_officer(
        &self,
        officer: &Nric,
        project: &ProjectName,
        today: NaiveDate,
    ) -> Result<OfficerRegistration, AllocationServiceError> {
        let registration = self.mutate(|ledger| {
            ledger.officers().register(officer, project, today)
        })?;
        info!(officer = %officer, project = %project, "officer registration requested");
        Ok(registration)
    }

    pub fn pending_registrations(
        &self,
        project: &ProjectName,
    ) -> Result<Vec<OfficerRegistration>, AllocationServiceError> {
        let mut session = self.lock()?;
        session.ledger().project_ref(project)?;
        Ok(session.ledger_mut().officers().pending_for_project(project))
    }

    pub fn approve_registration(
        &self,
        key: &RegistrationKey,
    ) -> Result<RegistrationApproval, AllocationServiceError> {
        let approval = self.mutate(|ledger| ledger.officers().approve(key))?;
        info!(
            registration = %key,
            auto_rejected = approval.auto_rejected.len(),
            "officer registration approved"
        );
        Ok(approval)
    }

    pub fn reject_registration(
        &self,
        key: &RegistrationKey,
    ) -> Result<OfficerRegistration, AllocationServiceError> {
        let registration = self.mutate(|ledger| ledger.officers().reject(key))?;
        info!(registration = %key, "officer registration rejected");
        Ok(registration)
    }

    /// Run `command` against the ledger and persist the result.
    ///
    /// A failed command or a failed save restores the ledger to its state before the command.
    fn mutate<T>(
        &self,
        command: impl FnOnce(&mut AllocationLedger) -> Result<T, AllocationError>,
    ) -> Result<T, AllocationServiceError> {
        let mut session = self.lock()?;
        let before = session.ledger().clone();
        let value = match command(session.ledger_mut()) {
            Ok(value) => value,
            Err(error) => {
                *session.ledger_mut() = before;
                return Err(error.into());
            }
        };
        if let Err(error) = session.save() {
            *session.ledger_mut() = before;
            return Err(error.into());
        }
        Ok(value)
    }

    fn lock(&self) -> Result<MutexGuard<'_, AllocationSession<S>>, AllocationServiceError> {
        self.session
            .lock()
            .map_err(|_| AllocationServiceError::Poisoned)
    }
}

/// Error raised by the allocation service.
#[derive(Debug, thiserror::Error)]
pub enum AllocationServiceError {
    #[error(transparent)]
    Allocation(#[from] AllocationError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("allocation session lock poisoned")]
    Poisoned,
}
