use chrono::NaiveDate;
use serde::Serialize;

use super::domain::{Nric, OfficerRegistration, ProjectName, RegistrationKey, ReviewStatus};
use super::error::AllocationError;
use super::ledger::AllocationLedger;

/// Approved registration plus the pending registrations it displaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationApproval {
    pub registration: OfficerRegistration,
    pub auto_rejected: Vec<ProjectName>,
}

/// Officer registrations against project slot capacity and schedule conflicts.
pub struct OfficerAssignment<'a> {
    ledger: &'a mut AllocationLedger,
}

impl<'a> OfficerAssignment<'a> {
    pub(crate) fn new(ledger: &'a mut AllocationLedger) -> Self {
        Self { ledger }
    }

    pub fn register(
        &mut self,
        officer: &Nric,
        project: &ProjectName,
        today: NaiveDate,
    ) -> Result<OfficerRegistration, AllocationError> {
        if !self.ledger.officers.contains_key(officer) {
            return Err(AllocationError::not_found("officer", officer));
        }
        let target = self.ledger.project_ref(project)?;
        let key = RegistrationKey::new(officer.clone(), project.clone());

        if let Some(existing) = self.ledger.registrations.get(&key) {
            if existing.status != ReviewStatus::Rejected {
                return Err(AllocationError::AlreadyRegistered {
                    officer: officer.clone(),
                    project: project.clone(),
                });
            }
        }

        self.check_application_overlap(officer, project)?;
        self.check_assignment_overlap(officer, project)?;

        if target.officer_slots.available == 0 {
            return Err(AllocationError::NoOfficerSlots(project.clone()));
        }

        let registration = OfficerRegistration {
            officer: officer.clone(),
            project: project.clone(),
            status: ReviewStatus::Pending,
            requested_on: today,
        };
        self.ledger.registrations.insert(key, registration.clone());
        Ok(registration)
    }

    pub fn approve(&mut self, key: &RegistrationKey) -> Result<RegistrationApproval, AllocationError> {
        self.pending(key)?;
        let target = self.ledger.project_ref(&key.project)?;
        if target.officer_slots.available == 0 {
            return Err(AllocationError::NoOfficerSlots(key.project.clone()));
        }
        self.check_application_overlap(&key.officer, &key.project)?;
        self.check_assignment_overlap(&key.officer, &key.project)?;
        let window = target.window;

        let displaced: Vec<RegistrationKey> = self
            .ledger
            .registrations_for_officer(&key.officer)
            .filter(|registration| registration.status == ReviewStatus::Pending)
            .filter(|registration| registration.project != key.project)
            .filter(|registration| {
                self.ledger
                    .projects
                    .get(&registration.project)
                    .is_some_and(|project| project.window.overlaps(&window))
            })
            .map(OfficerRegistration::key)
            .collect();

        self.ledger.project_mut(&key.project)?.officer_slots.available -= 1;
        if let Some(officer) = self.ledger.officers.get_mut(&key.officer) {
            officer.assigned_projects.insert(key.project.clone());
        }

        let mut auto_rejected = Vec::with_capacity(displaced.len());
        for other in displaced {
            if let Some(registration) = self.ledger.registrations.get_mut(&other) {
                registration.status = ReviewStatus::Rejected;
                auto_rejected.push(other.project);
            }
        }

        let registration = self
            .ledger
            .registrations
            .get_mut(key)
            .ok_or_else(|| AllocationError::not_found("registration", key))?;
        registration.status = ReviewStatus::Approved;

        Ok(RegistrationApproval {
            registration: registration.clone(),
            auto_rejected,
        })
    }

    pub fn reject(&mut self, key: &RegistrationKey) -> Result<OfficerRegistration, AllocationError> {
        self.pending(key)?;
        if let Some(registration) = self.ledger.registrations.get_mut(key) {
            registration.status = ReviewStatus::Rejected;
        }
        self.registration(key).cloned()
    }

    /// Registrations awaiting a decision for one project.
    pub fn pending_for_project(&self, project: &ProjectName) -> Vec<OfficerRegistration> {
        self.ledger
            .registrations_for_project(project)
            .filter(|registration| registration.status == ReviewStatus::Pending)
            .cloned()
            .collect()
    }

    /// An officer may not serve a project they applied to, nor one overlapping it.
    fn check_application_overlap(
        &self,
        officer: &Nric,
        project: &ProjectName,
    ) -> Result<(), AllocationError> {
        let target = self.ledger.project_ref(project)?;
        let Some(application) = self.ledger.active_application(officer) else {
            return Ok(());
        };
        let applied = self.ledger.project_ref(&application.project)?;
        if &application.project == project || applied.window.overlaps(&target.window) {
            return Err(AllocationError::DateRangeConflict {
                project: project.clone(),
                conflicting: application.project.clone(),
            });
        }
        Ok(())
    }

    fn check_assignment_overlap(
        &self,
        officer: &Nric,
        project: &ProjectName,
    ) -> Result<(), AllocationError> {
        let target = self.ledger.project_ref(project)?;
        let Some(officer) = self.ledger.officers.get(officer) else {
            return Err(AllocationError::not_found("officer", officer));
        };

        let conflicting = officer
            .assigned_projects
            .iter()
            .filter(|assigned| *assigned != project)
            .find(|assigned| {
                self.ledger
                    .projects
                    .get(*assigned)
                    .is_some_and(|served| served.window.overlaps(&target.window))
            });
        match conflicting {
            Some(conflicting) => Err(AllocationError::DateRangeConflict {
                project: project.clone(),
                conflicting: conflicting.clone(),
            }),
            None => Ok(()),
        }
    }

    fn registration(&self, key: &RegistrationKey) -> Result<&OfficerRegistration, AllocationError> {
        self.ledger
            .registrations
            .get(key)
            .ok_or_else(|| AllocationError::not_found("registration", key))
    }

    fn pending(&self, key: &RegistrationKey) -> Result<&OfficerRegistration, AllocationError> {
        let registration = self.registration(key)?;
        if registration.status != ReviewStatus::Pending {
            return Err(AllocationError::invalid_state(
                "registration",
                key,
                registration.status.label(),
            ));
        }
        Ok(registration)
    }
}
