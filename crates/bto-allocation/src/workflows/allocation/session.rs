use tracing::{debug, info, warn};

use super::ledger::AllocationLedger;
use super::persistence::{AllocationStore, LedgerSnapshot, StoreError};
use super::reconcile::{reconcile, ReconcileReport};

/// Error raised while opening or saving a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("failed to load allocation data: {0}")]
    Load(#[source] StoreError),
    #[error("failed to save allocation data: {0}")]
    Save(#[source] StoreError),
}

/// Load, reconcile, mutate and save as explicit phases around one ledger.
pub struct AllocationSession<S> {
    store: S,
    ledger: AllocationLedger,
    report: ReconcileReport,
}

impl<S> AllocationSession<S>
where
    S: AllocationStore,
{
    pub fn open(store: S) -> Result<Self, SessionError> {
        let snapshot = store.load_snapshot().map_err(SessionError::Load)?;
        debug!(
            projects = snapshot.projects.len(),
            applications = snapshot.applications.len(),
            "allocation snapshot loaded"
        );

        let (ledger, report) = reconcile(snapshot);
        if report.is_clean() {
            info!(projects = ledger.projects.len(), "allocation ledger reconciled");
        } else {
            for (collection, count) in &report.skipped {
                warn!(collection, count, "skipped invalid records during reconciliation");
            }
            for adjustment in &report.inventory_adjustments {
                warn!(
                    project = %adjustment.project,
                    flat_type = adjustment.flat_type.label(),
                    persisted = adjustment.persisted_available,
                    derived = adjustment.derived_available,
                    reconciled = adjustment.reconciled_available,
                    "flat availability disagrees with bookings"
                );
            }
            for key in &report.restored_withdrawals {
                warn!(application = %key, "withdrawal request rebuilt from application status");
            }
            for adjustment in &report.slot_adjustments {
                warn!(
                    project = %adjustment.project,
                    persisted = adjustment.persisted_available,
                    derived = adjustment.derived_available,
                    "officer slots re-derived from registrations"
                );
            }
        }

        Ok(Self {
            store,
            ledger,
            report,
        })
    }

    pub fn ledger(&self) -> &AllocationLedger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut AllocationLedger {
        &mut self.ledger
    }

    pub fn report(&self) -> &ReconcileReport {
        &self.report
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn save(&self) -> Result<(), SessionError> {
        let snapshot = LedgerSnapshot::from(&self.ledger);
        self.store
            .save_snapshot(&snapshot)
            .map_err(SessionError::Save)?;
        debug!(
            applications = snapshot.applications.len(),
            bookings = snapshot.bookings.len(),
            "allocation snapshot saved"
        );
        Ok(())
    }
}
