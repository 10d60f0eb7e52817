use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::domain::{
    ApplicationKey, ApplicationWindow, FlatBooking, FlatType, Nric, OfficerRegistration,
    ProjectApplication, ProjectName, RegistrationKey, ReviewStatus, Withdrawal,
};
use super::inventory::FlatInventory;
use super::ledger::AllocationLedger;
use super::persistence::{LedgerSnapshot, ProjectRecord};
use super::projects::{OfficerSlots, Project};

/// Persisted availability that disagreed with the availability derived from bookings.
///
/// The lower of the two figures is kept, so a reload never puts units back on sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryAdjustment {
    pub project: ProjectName,
    pub flat_type: FlatType,
    pub persisted_available: u32,
    pub derived_available: u32,
    pub reconciled_available: u32,
}

/// Persisted officer slot availability that disagreed with approved registrations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotAdjustment {
    pub project: ProjectName,
    pub persisted_available: u8,
    pub derived_available: u8,
}

/// What reconciliation dropped or repaired while linking a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub skipped: BTreeMap<&'static str, usize>,
    pub inventory_adjustments: Vec<InventoryAdjustment>,
    pub slot_adjustments: Vec<SlotAdjustment>,
    /// Applications flagged as withdrawing whose request record was missing and rebuilt.
    pub restored_withdrawals: Vec<ApplicationKey>,
}

impl ReconcileReport {
    pub fn skipped_total(&self) -> usize {
        self.skipped.values().sum()
    }

    pub fn is_clean(&self) -> bool {
        self.skipped_total() == 0
            && self.inventory_adjustments.is_empty()
            && self.slot_adjustments.is_empty()
            && self.restored_withdrawals.is_empty()
    }

    fn skip(&mut self, collection: &'static str) {
        *self.skipped.entry(collection).or_default() += 1;
    }
}

/// Link a loaded snapshot into a consistent ledger.
///
/// Structurally invalid records are dropped and counted instead of failing the load.
pub fn reconcile(snapshot: LedgerSnapshot) -> (AllocationLedger, ReconcileReport) {
    let LedgerSnapshot {
        managers,
        applicants,
        officers,
        projects,
        applications,
        registrations,
        withdrawals,
        bookings,
    } = snapshot;

    let mut ledger = AllocationLedger::new();
    let mut report = ReconcileReport::default();

    for manager in managers {
        if ledger.managers.contains_key(&manager.nric) {
            report.skip("managers");
            continue;
        }
        ledger.enroll_manager(manager);
    }

    for officer in officers {
        if ledger.officers.contains_key(&officer.nric) {
            report.skip("officers");
            continue;
        }
        ledger.enroll_officer(officer);
    }

    for applicant in applicants {
        if ledger.applicants.contains_key(&applicant.nric) {
            report.skip("applicants");
            continue;
        }
        ledger.enroll_applicant(applicant);
    }

    let mut persisted: BTreeMap<ProjectName, ProjectRecord> = BTreeMap::new();
    for record in projects {
        let window = ApplicationWindow::new(record.opens_on, record.closes_on);
        let (Some(window), true, false) = (
            window,
            ledger.managers.contains_key(&record.manager),
            ledger.projects.contains_key(&record.name),
        ) else {
            report.skip("projects");
            continue;
        };

        let inventory = FlatInventory::new(
            FlatType::ordered().map(|flat_type| (flat_type, record.total(flat_type))),
        );
        let project = Project {
            name: record.name.clone(),
            neighborhood: record.neighborhood.clone(),
            window,
            inventory,
            visible: record.visible,
            officer_slots: OfficerSlots::new(record.officer_slots_total),
            manager: record.manager.clone(),
        };
        ledger.projects.insert(record.name.clone(), project);
        persisted.insert(record.name.clone(), record);
    }

    link_registrations(&mut ledger, &mut report, registrations);
    link_applications(&mut ledger, &mut report, applications, withdrawals);
    link_bookings(&mut ledger, &mut report, bookings);

    for (name, record) in &persisted {
        let Some(project) = ledger.projects.get_mut(name) else {
            continue;
        };
        for flat_type in FlatType::ordered() {
            let derived = project.inventory.available(flat_type);
            let recorded = record.available(flat_type);
            if derived == recorded {
                continue;
            }
            if derived > recorded {
                project.inventory.withhold(flat_type, derived - recorded);
            }
            report.inventory_adjustments.push(InventoryAdjustment {
                project: name.clone(),
                flat_type,
                persisted_available: recorded,
                derived_available: derived,
                reconciled_available: project.inventory.available(flat_type),
            });
        }
        if project.officer_slots.available != record.officer_slots_available {
            report.slot_adjustments.push(SlotAdjustment {
                project: name.clone(),
                persisted_available: record.officer_slots_available,
                derived_available: project.officer_slots.available,
            });
        }
    }

    (ledger, report)
}

fn link_registrations(
    ledger: &mut AllocationLedger,
    report: &mut ReconcileReport,
    registrations: Vec<OfficerRegistration>,
) {
    for registration in registrations {
        let key = RegistrationKey::new(registration.officer.clone(), registration.project.clone());
        if !ledger.officers.contains_key(&registration.officer)
            || ledger.registrations.contains_key(&key)
        {
            report.skip("registrations");
            continue;
        }
        let Some(project) = ledger.projects.get_mut(&registration.project) else {
            report.skip("registrations");
            continue;
        };

        if registration.status == ReviewStatus::Approved {
            if project.officer_slots.available == 0 {
                report.skip("registrations");
                continue;
            }
            project.officer_slots.available -= 1;
            if let Some(officer) = ledger.officers.get_mut(&registration.officer) {
                officer
                    .assigned_projects
                    .insert(registration.project.clone());
            }
        }
        ledger.registrations.insert(key, registration);
    }
}

fn link_applications(
    ledger: &mut AllocationLedger,
    report: &mut ReconcileReport,
    applications: Vec<ProjectApplication>,
    withdrawals: Vec<Withdrawal>,
) {
    for application in applications {
        let key = application.key();
        if !ledger.applicants.contains_key(&application.applicant)
            || !ledger.projects.contains_key(&application.project)
            || ledger.applications.contains_key(&key)
        {
            report.skip("applications");
            continue;
        }
        ledger.applications.insert(key, application);
    }

    for withdrawal in withdrawals {
        let key = withdrawal.key();
        let Some(application) = ledger.applications.get_mut(&key) else {
            report.skip("withdrawals");
            continue;
        };
        if ledger.withdrawals.contains_key(&key) {
            report.skip("withdrawals");
            continue;
        }
        application.withdrawal_status = Some(withdrawal.status);
        ledger.withdrawals.insert(key, withdrawal);
    }

    let unrecorded: Vec<Withdrawal> = ledger
        .applications
        .iter()
        .filter(|(key, _)| !ledger.withdrawals.contains_key(*key))
        .filter_map(|(_, application)| {
            application.withdrawal_status.map(|status| Withdrawal {
                applicant: application.applicant.clone(),
                project: application.project.clone(),
                status,
                requested_on: application.submitted_on,
            })
        })
        .collect();
    for withdrawal in unrecorded {
        let key = withdrawal.key();
        report.restored_withdrawals.push(key.clone());
        ledger.withdrawals.insert(key, withdrawal);
    }

    // Latest submission wins when the file holds several active applications for one person.
    let mut active: BTreeMap<Nric, ApplicationKey> = BTreeMap::new();
    let mut superseded: BTreeSet<ApplicationKey> = BTreeSet::new();
    for application in ledger.applications.values().filter(|app| app.is_active()) {
        let key = application.key();
        match active.get(&application.applicant) {
            Some(current) => {
                let current_date = ledger.applications[current].submitted_on;
                if application.submitted_on > current_date {
                    superseded.insert(current.clone());
                    active.insert(application.applicant.clone(), key);
                } else {
                    superseded.insert(key);
                }
            }
            None => {
                active.insert(application.applicant.clone(), key);
            }
        }
    }

    for key in superseded {
        ledger.applications.remove(&key);
        ledger.withdrawals.remove(&key);
        report.skip("applications");
    }
    for (applicant, key) in active {
        if let Some(applicant) = ledger.applicants.get_mut(&applicant) {
            applicant.active_application = Some(key.project);
        }
    }
}

fn link_bookings(
    ledger: &mut AllocationLedger,
    report: &mut ReconcileReport,
    bookings: Vec<FlatBooking>,
) {
    for booking in bookings {
        let key = ApplicationKey::new(booking.applicant.clone(), booking.project.clone());
        let linked = ledger
            .applications
            .get(&key)
            .is_some_and(|application| application.is_active());
        if !linked || ledger.bookings.contains_key(&booking.applicant) {
            report.skip("bookings");
            continue;
        }

        if booking.status == ReviewStatus::Approved {
            let Some(unit_id) = booking.unit_id.clone() else {
                report.skip("bookings");
                continue;
            };
            let adopted = ledger
                .projects
                .get_mut(&booking.project)
                .map(|project| project.inventory.adopt(booking.flat_type, unit_id));
            if !matches!(adopted, Some(Ok(()))) {
                report.skip("bookings");
                continue;
            }
        }
        ledger.bookings.insert(booking.applicant.clone(), booking);
    }
}
