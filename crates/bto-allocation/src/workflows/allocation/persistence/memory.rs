use std::sync::{Arc, Mutex, MutexGuard};

use super::{AllocationStore, LedgerSnapshot, ProjectRecord, StoreError};
use crate::workflows::allocation::domain::{
    ApplicantProfile, FlatBooking, Manager, OfficerRegistration, ProjectApplication, Withdrawal,
};

/// In-process store for demos and tests; clones share the same data.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    snapshot: Arc<Mutex<LedgerSnapshot>>,
}

impl MemoryStore {
    pub fn new(snapshot: LedgerSnapshot) -> Self {
        Self {
            snapshot: Arc::new(Mutex::new(snapshot)),
        }
    }

    /// Copy of everything saved so far.
    pub fn contents(&self) -> Result<LedgerSnapshot, StoreError> {
        Ok(self.guard()?.clone())
    }

    fn guard(&self) -> Result<MutexGuard<'_, LedgerSnapshot>, StoreError> {
        self.snapshot
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store mutex poisoned".to_string()))
    }
}

impl AllocationStore for MemoryStore {
    fn load_managers(&self) -> Result<Vec<Manager>, StoreError> {
        Ok(self.guard()?.managers.clone())
    }

    fn load_applicants(&self) -> Result<Vec<ApplicantProfile>, StoreError> {
        Ok(self.guard()?.applicants.clone())
    }

    fn load_officers(&self) -> Result<Vec<ApplicantProfile>, StoreError> {
        Ok(self.guard()?.officers.clone())
    }

    fn load_projects(&self) -> Result<Vec<ProjectRecord>, StoreError> {
        Ok(self.guard()?.projects.clone())
    }

    fn load_applications(&self) -> Result<Vec<ProjectApplication>, StoreError> {
        Ok(self.guard()?.applications.clone())
    }

    fn load_registrations(&self) -> Result<Vec<OfficerRegistration>, StoreError> {
        Ok(self.guard()?.registrations.clone())
    }

    fn load_withdrawals(&self) -> Result<Vec<Withdrawal>, StoreError> {
        Ok(self.guard()?.withdrawals.clone())
    }

    fn load_bookings(&self) -> Result<Vec<FlatBooking>, StoreError> {
        Ok(self.guard()?.bookings.clone())
    }

    fn save_managers(&self, managers: &[Manager]) -> Result<(), StoreError> {
        self.guard()?.managers = managers.to_vec();
        Ok(())
    }

    fn save_applicants(&self, applicants: &[ApplicantProfile]) -> Result<(), StoreError> {
        self.guard()?.applicants = applicants.to_vec();
        Ok(())
    }

    fn save_officers(&self, officers: &[ApplicantProfile]) -> Result<(), StoreError> {
        self.guard()?.officers = officers.to_vec();
        Ok(())
    }

    fn save_projects(&self, projects: &[ProjectRecord]) -> Result<(), StoreError> {
        self.guard()?.projects = projects.to_vec();
        Ok(())
    }

    fn save_applications(&self, applications: &[ProjectApplication]) -> Result<(), StoreError> {
        self.guard()?.applications = applications.to_vec();
        Ok(())
    }

    fn save_registrations(
        &self,
        registrations: &[OfficerRegistration],
    ) -> Result<(), StoreError> {
        self.guard()?.registrations = registrations.to_vec();
        Ok(())
    }

    fn save_withdrawals(&self, withdrawals: &[Withdrawal]) -> Result<(), StoreError> {
        self.guard()?.withdrawals = withdrawals.to_vec();
        Ok(())
    }

    fn save_bookings(&self, bookings: &[FlatBooking]) -> Result<(), StoreError> {
        self.guard()?.bookings = bookings.to_vec();
        Ok(())
    }
}
