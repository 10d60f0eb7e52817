use chrono::NaiveDate;
use serde::Serialize;

use super::domain::{
    ApplicationKey, ApplicationStatus, FlatBooking, FlatType, Nric, ProjectApplication,
    ProjectName, ReviewStatus, UnitId,
};
use super::eligibility::{eligible_flat_types, is_eligible_for};
use super::error::AllocationError;
use super::ledger::AllocationLedger;

/// Result of approving a pending application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalOutcome {
    /// Stock remained for an eligible type; the application is now successful.
    Approved,
    /// Approval was attempted but every eligible type had sold out; the application is now
    /// unsuccessful.
    OutOfStock,
}

/// Result of an officer processing a flat selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum BookingOutcome {
    Booked { booking: FlatBooking },
    Rejected { reason: String },
}

/// Drives a single application through submission, review, flat selection and booking.
pub struct ApplicationLifecycle<'a> {
    ledger: &'a mut AllocationLedger,
}

impl<'a> ApplicationLifecycle<'a> {
    pub(crate) fn new(ledger: &'a mut AllocationLedger) -> Self {
        Self { ledger }
    }

    pub fn submit(
        &mut self,
        applicant: &Nric,
        project: &ProjectName,
        today: NaiveDate,
    ) -> Result<ProjectApplication, AllocationError> {
        let profile = &self.ledger.applicant_ref(applicant)?.profile;
        if let Some(active) = self.ledger.active_application(applicant) {
            return Err(AllocationError::AlreadyHasActiveApplication {
                applicant: applicant.clone(),
                project: active.project.clone(),
            });
        }

        let target = self.ledger.project_ref(project)?;
        if !target.is_open_on(today) {
            return Err(AllocationError::ProjectNotOpenOrNotVisible(project.clone()));
        }
        if eligible_flat_types(profile).is_empty() {
            return Err(AllocationError::NotEligible {
                applicant: applicant.clone(),
                detail: "any flat type".to_string(),
            });
        }
        self.check_officer_conflicts(applicant, project)?;
        if target.stocked_types_for(profile).is_empty() {
            return Err(AllocationError::NoUnitsAvailable {
                project: project.clone(),
                flat_type: None,
            });
        }

        let application = ProjectApplication {
            applicant: applicant.clone(),
            project: project.clone(),
            status: ApplicationStatus::Pending,
            selected_flat_type: None,
            withdrawal_status: None,
            submitted_on: today,
        };
        let key = application.key();

        // A resubmission after an approved withdrawal replaces the withdrawn record.
        self.ledger.withdrawals.remove(&key);
        if let Some(applicant) = self.ledger.applicants.get_mut(applicant) {
            applicant.active_application = Some(project.clone());
        }
        self.ledger.applications.insert(key, application.clone());
        Ok(application)
    }

    /// An officer may not apply where they serve or have asked to serve, nor where the window
    /// overlaps either.
    fn check_officer_conflicts(
        &self,
        officer: &Nric,
        project: &ProjectName,
    ) -> Result<(), AllocationError> {
        let Some(officer) = self.ledger.officers.get(officer) else {
            return Ok(());
        };
        let target = self.ledger.project_ref(project)?;

        for served in &officer.assigned_projects {
            let Some(served_project) = self.ledger.projects.get(served) else {
                continue;
            };
            if served == project || served_project.window.overlaps(&target.window) {
                return Err(AllocationError::DateRangeConflict {
                    project: project.clone(),
                    conflicting: served.clone(),
                });
            }
        }

        let pending = self
            .ledger
            .registrations_for_officer(officer.nric())
            .filter(|registration| registration.status == ReviewStatus::Pending);
        for registration in pending {
            if &registration.project == project {
                return Err(AllocationError::AlreadyRegistered {
                    officer: officer.nric().clone(),
                    project: project.clone(),
                });
            }
            let overlaps = self
                .ledger
                .projects
                .get(&registration.project)
                .is_some_and(|registered| registered.window.overlaps(&target.window));
            if overlaps {
                return Err(AllocationError::DateRangeConflict {
                    project: project.clone(),
                    conflicting: registration.project.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn approve(&mut self, key: &ApplicationKey) -> Result<ApprovalOutcome, AllocationError> {
        let application = self.pending(key)?;
        let profile = &self.ledger.applicant_ref(&application.applicant)?.profile;
        let stocked = !self
            .ledger
            .project_ref(&application.project)?
            .stocked_types_for(profile)
            .is_empty();

        let application = self.ledger.application_mut(key)?;
        if stocked {
            application.status = ApplicationStatus::Successful;
            Ok(ApprovalOutcome::Approved)
        } else {
            application.status = ApplicationStatus::Unsuccessful;
            Ok(ApprovalOutcome::OutOfStock)
        }
    }

    pub fn reject(&mut self, key: &ApplicationKey) -> Result<(), AllocationError> {
        self.pending(key)?;
        self.ledger.application_mut(key)?.status = ApplicationStatus::Unsuccessful;
        Ok(())
    }

    /// Record the applicant's flat type choice; no unit is reserved until booking.
    pub fn select_flat_type(
        &mut self,
        key: &ApplicationKey,
        flat_type: FlatType,
    ) -> Result<ProjectApplication, AllocationError> {
        let application = self.active(key)?;
        if application.status != ApplicationStatus::Successful {
            return Err(AllocationError::invalid_state(
                "application",
                key,
                application.status.label(),
            ));
        }
        if application.selected_flat_type.is_some() {
            return Err(AllocationError::invalid_state(
                "application",
                key,
                "awaiting booking of an earlier selection",
            ));
        }
        let profile = &self.ledger.applicant_ref(&key.applicant)?.profile;
        if !is_eligible_for(profile, flat_type) {
            return Err(AllocationError::NotEligible {
                applicant: key.applicant.clone(),
                detail: flat_type.label().to_string(),
            });
        }

        let application = self.ledger.application_mut(key)?;
        application.selected_flat_type = Some(flat_type);
        Ok(application.clone())
    }

    /// Turn a selection into a concrete unit, or reject the booking when the type sold out.
    pub fn process_booking(
        &mut self,
        key: &ApplicationKey,
        officer: &Nric,
    ) -> Result<BookingOutcome, AllocationError> {
        let application = self.active(key)?;
        let flat_type = match (application.status, application.selected_flat_type) {
            (ApplicationStatus::Successful, Some(flat_type)) => flat_type,
            (ApplicationStatus::Successful, None) => {
                return Err(AllocationError::invalid_state(
                    "application",
                    key,
                    "without a selected flat type",
                ))
            }
            (status, _) => {
                return Err(AllocationError::invalid_state(
                    "application",
                    key,
                    status.label(),
                ))
            }
        };

        let serves_project = self
            .ledger
            .officers
            .get(officer)
            .ok_or_else(|| AllocationError::not_found("officer", officer))?
            .assigned_projects
            .contains(&key.project);
        if !serves_project {
            return Err(AllocationError::OfficerNotAssigned {
                officer: officer.clone(),
                project: key.project.clone(),
            });
        }

        let reserved = self
            .ledger
            .project_mut(&key.project)?
            .inventory
            .reserve(flat_type);
        let unit_id = match reserved {
            Ok(unit_id) => unit_id,
            Err(_) => return self.reject_booking(key, officer, flat_type),
        };

        match self.commit_booking(key, officer, flat_type, unit_id.clone()) {
            Ok(booking) => Ok(BookingOutcome::Booked { booking }),
            Err(error) => {
                self.ledger
                    .project_mut(&key.project)?
                    .inventory
                    .release(&unit_id)
                    .map_err(|_| AllocationError::not_found("unit", &unit_id))?;
                Err(error)
            }
        }
    }

    fn commit_booking(
        &mut self,
        key: &ApplicationKey,
        officer: &Nric,
        flat_type: FlatType,
        unit_id: UnitId,
    ) -> Result<FlatBooking, AllocationError> {
        if let Some(existing) = self.ledger.bookings.get(&key.applicant) {
            if existing.held_unit().is_some() {
                return Err(AllocationError::invalid_state(
                    "booking",
                    &key.applicant,
                    "already holding a unit",
                ));
            }
        }

        let booking = FlatBooking {
            applicant: key.applicant.clone(),
            project: key.project.clone(),
            flat_type,
            unit_id: Some(unit_id),
            status: ReviewStatus::Approved,
            rejection_reason: None,
            processed_by: Some(officer.clone()),
        };
        self.ledger.application_mut(key)?.status = ApplicationStatus::Booked;
        self.ledger
            .bookings
            .insert(key.applicant.clone(), booking.clone());
        Ok(booking)
    }

    fn reject_booking(
        &mut self,
        key: &ApplicationKey,
        officer: &Nric,
        flat_type: FlatType,
    ) -> Result<BookingOutcome, AllocationError> {
        let reason = format!(
            "no {} units remaining in {}",
            flat_type.label(),
            key.project
        );
        self.ledger.application_mut(key)?.selected_flat_type = None;
        self.ledger.bookings.insert(
            key.applicant.clone(),
            FlatBooking {
                applicant: key.applicant.clone(),
                project: key.project.clone(),
                flat_type,
                unit_id: None,
                status: ReviewStatus::Rejected,
                rejection_reason: Some(reason.clone()),
                processed_by: Some(officer.clone()),
            },
        );
        Ok(BookingOutcome::Rejected { reason })
    }

    /// Applications pending review in a project, for manager review queues.
    pub fn pending_for_project(&self, project: &ProjectName) -> Vec<ProjectApplication> {
        self.ledger
            .applications_for_project(project)
            .filter(|application| {
                application.is_active() && application.status == ApplicationStatus::Pending
            })
            .cloned()
            .collect()
    }

    fn active(&self, key: &ApplicationKey) -> Result<ProjectApplication, AllocationError> {
        let application = self.ledger.application_ref(key)?;
        if !application.is_active() {
            return Err(AllocationError::invalid_state(
                "application",
                key,
                "withdrawn",
            ));
        }
        Ok(application.clone())
    }

    fn pending(&self, key: &ApplicationKey) -> Result<ProjectApplication, AllocationError> {
        let application = self.active(key)?;
        if application.status != ApplicationStatus::Pending {
            return Err(AllocationError::invalid_state(
                "application",
                key,
                application.status.label(),
            ));
        }
        Ok(application)
    }
}
