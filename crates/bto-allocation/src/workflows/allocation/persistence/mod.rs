//! Persistence boundary for the allocation ledger.
//!
//! Stores only move flat records in and out; linking them back into a consistent ledger is the
//! job of [`crate::workflows::allocation::reconcile`].

mod csv_store;
mod memory;

pub use csv_store::CsvStore;
pub use memory::MemoryStore;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{
    ApplicantProfile, FlatBooking, FlatType, Manager, Nric, OfficerRegistration,
    ProjectApplication, ProjectName, Withdrawal,
};
use super::ledger::AllocationLedger;
use super::projects::Project;

/// Flat, file-friendly representation of a project and its counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub name: ProjectName,
    pub neighborhood: String,
    pub opens_on: NaiveDate,
    pub closes_on: NaiveDate,
    pub two_room_total: u32,
    pub two_room_available: u32,
    pub three_room_total: u32,
    pub three_room_available: u32,
    pub visible: bool,
    pub officer_slots_total: u8,
    pub officer_slots_available: u8,
    pub manager: Nric,
}

impl ProjectRecord {
    pub fn total(&self, flat_type: FlatType) -> u32 {
        match flat_type {
            FlatType::TwoRoom => self.two_room_total,
            FlatType::ThreeRoom => self.three_room_total,
        }
    }

    pub fn available(&self, flat_type: FlatType) -> u32 {
        match flat_type {
            FlatType::TwoRoom => self.two_room_available,
            FlatType::ThreeRoom => self.three_room_available,
        }
    }
}

impl From<&Project> for ProjectRecord {
    fn from(project: &Project) -> Self {
        Self {
            name: project.name.clone(),
            neighborhood: project.neighborhood.clone(),
            opens_on: project.window.opens_on,
            closes_on: project.window.closes_on,
            two_room_total: project.inventory.total(FlatType::TwoRoom),
            two_room_available: project.inventory.available(FlatType::TwoRoom),
            three_room_total: project.inventory.total(FlatType::ThreeRoom),
            three_room_available: project.inventory.available(FlatType::ThreeRoom),
            visible: project.visible,
            officer_slots_total: project.officer_slots.total,
            officer_slots_available: project.officer_slots.available,
            manager: project.manager.clone(),
        }
    }
}

/// Every persisted collection, as loaded from or written to a store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerSnapshot {
    pub managers: Vec<Manager>,
    pub applicants: Vec<ApplicantProfile>,
    pub officers: Vec<ApplicantProfile>,
    pub projects: Vec<ProjectRecord>,
    pub applications: Vec<ProjectApplication>,
    pub registrations: Vec<OfficerRegistration>,
    pub withdrawals: Vec<Withdrawal>,
    pub bookings: Vec<FlatBooking>,
}

impl From<&AllocationLedger> for LedgerSnapshot {
    fn from(ledger: &AllocationLedger) -> Self {
        Self {
            managers: ledger.managers.values().cloned().collect(),
            applicants: ledger
                .applicants
                .values()
                .filter(|applicant| !ledger.officers.contains_key(&applicant.profile.nric))
                .map(|applicant| applicant.profile.clone())
                .collect(),
            officers: ledger
                .officers
                .values()
                .map(|officer| officer.profile.clone())
                .collect(),
            projects: ledger.projects.values().map(ProjectRecord::from).collect(),
            applications: ledger.applications.values().cloned().collect(),
            registrations: ledger.registrations.values().cloned().collect(),
            withdrawals: ledger.withdrawals.values().cloned().collect(),
            bookings: ledger.bookings.values().cloned().collect(),
        }
    }
}

/// Storage abstraction so sessions can run against files or memory alike.
pub trait AllocationStore: Send + Sync {
    fn load_managers(&self) -> Result<Vec<Manager>, StoreError>;
    fn load_applicants(&self) -> Result<Vec<ApplicantProfile>, StoreError>;
    fn load_officers(&self) -> Result<Vec<ApplicantProfile>, StoreError>;
    fn load_projects(&self) -> Result<Vec<ProjectRecord>, StoreError>;
    fn load_applications(&self) -> Result<Vec<ProjectApplication>, StoreError>;
    fn load_registrations(&self) -> Result<Vec<OfficerRegistration>, StoreError>;
    fn load_withdrawals(&self) -> Result<Vec<Withdrawal>, StoreError>;
    fn load_bookings(&self) -> Result<Vec<FlatBooking>, StoreError>;

    fn save_managers(&self, managers: &[Manager]) -> Result<(), StoreError>;
    fn save_applicants(&self, applicants: &[ApplicantProfile]) -> Result<(), StoreError>;
    fn save_officers(&self, officers: &[ApplicantProfile]) -> Result<(), StoreError>;
    fn save_projects(&self, projects: &[ProjectRecord]) -> Result<(), StoreError>;
    fn save_applications(&self, applications: &[ProjectApplication]) -> Result<(), StoreError>;
    fn save_registrations(&self, registrations: &[OfficerRegistration])
        -> Result<(), StoreError>;
    fn save_withdrawals(&self, withdrawals: &[Withdrawal]) -> Result<(), StoreError>;
    fn save_bookings(&self, bookings: &[FlatBooking]) -> Result<(), StoreError>;

    fn load_snapshot(&self) -> Result<LedgerSnapshot, StoreError> {
        Ok(LedgerSnapshot {
            managers: self.load_managers()?,
            applicants: self.load_applicants()?,
            officers: self.load_officers()?,
            projects: self.load_projects()?,
            applications: self.load_applications()?,
            registrations: self.load_registrations()?,
            withdrawals: self.load_withdrawals()?,
            bookings: self.load_bookings()?,
        })
    }

    fn save_snapshot(&self, snapshot: &LedgerSnapshot) -> Result<(), StoreError> {
        self.save_managers(&snapshot.managers)?;
        self.save_applicants(&snapshot.applicants)?;
        self.save_officers(&snapshot.officers)?;
        self.save_projects(&snapshot.projects)?;
        self.save_applications(&snapshot.applications)?;
        self.save_registrations(&snapshot.registrations)?;
        self.save_withdrawals(&snapshot.withdrawals)?;
        self.save_bookings(&snapshot.bookings)
    }
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid data in {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
