//! Build-to-order flat allocation: projects, applications, officer duty, withdrawals and
//! bookings against per-type inventory.
//!
//! The lifecycle components borrow an [`AllocationLedger`] and never log or touch storage.
//! [`AllocationSession`] loads and reconciles a ledger from an [`AllocationStore`], and
//! [`AllocationService`] serializes commands over one session and persists after each.

pub mod applications;
pub mod domain;
pub mod eligibility;
pub mod error;
pub mod inventory;
pub mod ledger;
pub mod officers;
pub mod persistence;
pub mod projects;
pub mod reconcile;
pub mod router;
pub mod service;
pub mod session;
pub mod withdrawals;

#[cfg(test)]
mod tests;

pub use applications::{ApplicationLifecycle, ApprovalOutcome, BookingOutcome};
pub use domain::{
    Applicant, ApplicantProfile, ApplicationKey, ApplicationStatus, ApplicationWindow,
    FlatBooking, FlatType, Manager, MaritalStatus, Nric, Officer, OfficerRegistration,
    ProjectApplication, ProjectName, RegistrationKey, ReviewStatus, UnitId, Withdrawal,
};
pub use eligibility::{eligible_flat_types, is_eligible_for};
pub use error::AllocationError;
pub use inventory::{FlatInventory, InventoryError, InventoryLine};
pub use ledger::AllocationLedger;
pub use officers::{OfficerAssignment, RegistrationApproval};
pub use persistence::{
    AllocationStore, CsvStore, LedgerSnapshot, MemoryStore, ProjectRecord, StoreError,
};
pub use projects::{
    OfficerSlots, Project, ProjectCatalog, ProjectDraft, ProjectFilter, ProjectListing,
    MAX_OFFICER_SLOTS,
};
pub use reconcile::{reconcile, InventoryAdjustment, ReconcileReport, SlotAdjustment};
pub use router::allocation_router;
pub use service::{AllocationService, AllocationServiceError};
pub use session::{AllocationSession, SessionError};
pub use withdrawals::WithdrawalDesk;
