use std::collections::BTreeMap;

use super::applications::ApplicationLifecycle;
use super::domain::{
    Applicant, ApplicantProfile, ApplicationKey, FlatBooking, Manager, Nric, Officer,
    OfficerRegistration, ProjectApplication, ProjectName, RegistrationKey, ReviewStatus,
    Withdrawal,
};
use super::error::AllocationError;
use super::officers::OfficerAssignment;
use super::projects::{Project, ProjectCatalog};
use super::withdrawals::WithdrawalDesk;

/// Unit of work holding every entity of one session, keyed by natural identity.
///
/// The lifecycle components borrow the ledger mutably for the duration of one command, so
/// each command runs to completion before the next one can observe the state.
#[derive(Debug, Clone, Default)]
pub struct AllocationLedger {
    pub(crate) managers: BTreeMap<Nric, Manager>,
    pub(crate) applicants: BTreeMap<Nric, Applicant>,
    pub(crate) officers: BTreeMap<Nric, Officer>,
    pub(crate) projects: BTreeMap<ProjectName, Project>,
    pub(crate) applications: BTreeMap<ApplicationKey, ProjectApplication>,
    pub(crate) bookings: BTreeMap<Nric, FlatBooking>,
    pub(crate) registrations: BTreeMap<RegistrationKey, OfficerRegistration>,
    pub(crate) withdrawals: BTreeMap<ApplicationKey, Withdrawal>,
}

impl AllocationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enroll_manager(&mut self, manager: Manager) {
        self.managers.insert(manager.nric.clone(), manager);
    }

    pub fn enroll_applicant(&mut self, profile: ApplicantProfile) {
        let nric = profile.nric.clone();
        match self.applicants.get_mut(&nric) {
            Some(applicant) => applicant.profile = profile,
            None => {
                self.applicants.insert(nric, Applicant::new(profile));
            }
        }
    }

    /// Officers also act as applicants under the same identity.
    pub fn enroll_officer(&mut self, profile: ApplicantProfile) {
        self.enroll_applicant(profile.clone());
        match self.officers.get_mut(&profile.nric) {
            Some(officer) => officer.profile = profile,
            None => {
                self.officers
                    .insert(profile.nric.clone(), Officer::new(profile));
            }
        }
    }

    pub fn projects(&mut self) -> ProjectCatalog<'_> {
        ProjectCatalog::new(self)
    }

    pub fn applications(&mut self) -> ApplicationLifecycle<'_> {
        ApplicationLifecycle::new(self)
    }

    pub fn officers(&mut self) -> OfficerAssignment<'_> {
        OfficerAssignment::new(self)
    }

    pub fn withdrawals(&mut self) -> WithdrawalDesk<'_> {
        WithdrawalDesk::new(self)
    }

    pub fn manager(&self, nric: &Nric) -> Option<&Manager> {
        self.managers.get(nric)
    }

    pub fn applicant(&self, nric: &Nric) -> Option<&Applicant> {
        self.applicants.get(nric)
    }

    pub fn officer(&self, nric: &Nric) -> Option<&Officer> {
        self.officers.get(nric)
    }

    pub fn project(&self, name: &ProjectName) -> Option<&Project> {
        self.projects.get(name)
    }

    pub fn all_projects(&self) -> impl Iterator<Item = &Project> {
        self.projects.values()
    }

    pub fn application(&self, key: &ApplicationKey) -> Option<&ProjectApplication> {
        self.applications.get(key)
    }

    /// The application an applicant currently holds, if any.
    pub fn active_application(&self, applicant: &Nric) -> Option<&ProjectApplication> {
        let applicant = self.applicants.get(applicant)?;
        let project = applicant.active_application.as_ref()?;
        self.applications
            .get(&ApplicationKey::new(applicant.profile.nric.clone(), project.clone()))
    }

    pub fn applications_for_project<'a>(
        &'a self,
        project: &'a ProjectName,
    ) -> impl Iterator<Item = &'a ProjectApplication> + 'a {
        self.applications
            .values()
            .filter(move |application| &application.project == project)
    }

    pub fn booking(&self, applicant: &Nric) -> Option<&FlatBooking> {
        self.bookings.get(applicant)
    }

    pub fn registration(&self, key: &RegistrationKey) -> Option<&OfficerRegistration> {
        self.registrations.get(key)
    }

    pub fn registrations_for_project<'a>(
        &'a self,
        project: &'a ProjectName,
    ) -> impl Iterator<Item = &'a OfficerRegistration> + 'a {
        self.registrations
            .values()
            .filter(move |registration| &registration.project == project)
    }

    pub fn registrations_for_officer<'a>(
        &'a self,
        officer: &'a Nric,
    ) -> impl Iterator<Item = &'a OfficerRegistration> + 'a {
        self.registrations
            .values()
            .filter(move |registration| &registration.officer == officer)
    }

    pub fn withdrawal(&self, key: &ApplicationKey) -> Option<&Withdrawal> {
        self.withdrawals.get(key)
    }

    pub fn pending_withdrawals(&self) -> impl Iterator<Item = &Withdrawal> {
        self.withdrawals
            .values()
            .filter(|withdrawal| withdrawal.status == ReviewStatus::Pending)
    }

    pub(crate) fn project_ref(&self, name: &ProjectName) -> Result<&Project, AllocationError> {
        self.projects
            .get(name)
            .ok_or_else(|| AllocationError::not_found("project", name))
    }

    pub(crate) fn project_mut(
        &mut self,
        name: &ProjectName,
    ) -> Result<&mut Project, AllocationError> {
        self.projects
            .get_mut(name)
            .ok_or_else(|| AllocationError::not_found("project", name))
    }

    pub(crate) fn applicant_ref(&self, nric: &Nric) -> Result<&Applicant, AllocationError> {
        self.applicants
            .get(nric)
            .ok_or_else(|| AllocationError::not_found("applicant", nric))
    }

    pub(crate) fn application_mut(
        &mut self,
        key: &ApplicationKey,
    ) -> Result<&mut ProjectApplication, AllocationError> {
        self.applications
            .get_mut(key)
            .ok_or_else(|| AllocationError::not_found("application", key))
    }

    pub(crate) fn application_ref(
        &self,
        key: &ApplicationKey,
    ) -> Result<&ProjectApplication, AllocationError> {
        self.applications
            .get(key)
            .ok_or_else(|| AllocationError::not_found("application", key))
    }
}
