use std::collections::BTreeMap;
use std::sync::Arc;

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::workflows::allocation::persistence::{
    AllocationStore, LedgerSnapshot, MemoryStore, ProjectRecord, StoreError,
};
use crate::workflows::allocation::{
    allocation_router, AllocationLedger, AllocationService, AllocationSession, ApplicantProfile,
    ApplicationKey, FlatBooking, FlatType, Manager, MaritalStatus, Nric, OfficerRegistration,
    ProjectApplication, ProjectDraft, ProjectName, RegistrationKey, Withdrawal,
};

pub(super) const MANAGER: &str = "S5800001A";
pub(super) const SECOND_MANAGER: &str = "T8800002B";
pub(super) const JOHN: &str = "S1234567A";
pub(super) const SARAH: &str = "T7654321B";
pub(super) const GRACE: &str = "S9876543C";
pub(super) const KEVIN: &str = "T1234500D";
pub(super) const DANIEL: &str = "T2109876H";
pub(super) const EMILY: &str = "S6543210I";
pub(super) const ACACIA: &str = "Acacia Breeze";
pub(super) const BEGONIA: &str = "Begonia Heights";

pub(super) fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, month, day).expect("valid date")
}

pub(super) fn nric(value: &str) -> Nric {
    Nric::new(value)
}

pub(super) fn project_name(value: &str) -> ProjectName {
    ProjectName::new(value)
}

pub(super) fn app_key(applicant: &str, project: &str) -> ApplicationKey {
    ApplicationKey::new(nric(applicant), project_name(project))
}

pub(super) fn reg_key(officer: &str, project: &str) -> RegistrationKey {
    RegistrationKey::new(nric(officer), project_name(project))
}

pub(super) fn profile(id: &str, name: &str, age: u8, status: MaritalStatus) -> ApplicantProfile {
    ApplicantProfile {
        nric: nric(id),
        name: name.to_string(),
        age,
        marital_status: status,
    }
}

/// Managers, applicants of every eligibility band and two officers, without projects.
pub(super) fn people() -> AllocationLedger {
    let mut ledger = AllocationLedger::new();
    ledger.enroll_manager(Manager {
        nric: nric(MANAGER),
        name: "Michael".to_string(),
    });
    ledger.enroll_manager(Manager {
        nric: nric(SECOND_MANAGER),
        name: "Jessica".to_string(),
    });
    ledger.enroll_applicant(profile(JOHN, "John", 40, MaritalStatus::Single));
    ledger.enroll_applicant(profile(SARAH, "Sarah", 40, MaritalStatus::Married));
    ledger.enroll_applicant(profile(GRACE, "Grace", 37, MaritalStatus::Married));
    ledger.enroll_applicant(profile(KEVIN, "Kevin", 30, MaritalStatus::Single));
    ledger.enroll_officer(profile(DANIEL, "Daniel", 36, MaritalStatus::Married));
    ledger.enroll_officer(profile(EMILY, "Emily", 28, MaritalStatus::Single));
    ledger
}

pub(super) fn draft(
    name: &str,
    opens_on: NaiveDate,
    closes_on: NaiveDate,
    two_room: u32,
    three_room: u32,
) -> ProjectDraft {
    ProjectDraft {
        name: project_name(name),
        neighborhood: "Yishun".to_string(),
        opens_on,
        closes_on,
        units: BTreeMap::from([(FlatType::TwoRoom, two_room), (FlatType::ThreeRoom, three_room)]),
        officer_slots: 3,
        visible: true,
    }
}

/// People plus Acacia Breeze, open through March with the given stock.
pub(super) fn ledger_with_project(two_room: u32, three_room: u32) -> AllocationLedger {
    let mut ledger = people();
    ledger
        .projects()
        .create(
            &nric(MANAGER),
            draft(ACACIA, date(2, 15), date(3, 31), two_room, three_room),
        )
        .expect("project created");
    ledger
}

pub(super) fn assign_officer(ledger: &mut AllocationLedger, officer: &str, project: &str) {
    ledger
        .officers()
        .register(&nric(officer), &project_name(project), date(2, 1))
        .expect("registration filed");
    ledger
        .officers()
        .approve(&reg_key(officer, project))
        .expect("registration approved");
}

/// Submit and approve an application, leaving it SUCCESSFUL.
pub(super) fn successful_application(ledger: &mut AllocationLedger, applicant: &str) -> ApplicationKey {
    let key = app_key(applicant, ACACIA);
    ledger
        .applications()
        .submit(&key.applicant, &key.project, date(3, 1))
        .expect("application submitted");
    ledger
        .applications()
        .approve(&key)
        .expect("application approved");
    key
}

pub(super) fn available(ledger: &AllocationLedger, project: &str, flat_type: FlatType) -> u32 {
    ledger
        .project(&project_name(project))
        .expect("project exists")
        .inventory
        .available(flat_type)
}

pub(super) fn memory_service(ledger: &AllocationLedger) -> (AllocationService<MemoryStore>, MemoryStore) {
    let store = MemoryStore::new(LedgerSnapshot::from(ledger));
    let service = AllocationService::open(store.clone()).expect("service opens");
    (service, store)
}

pub(super) fn router_for(ledger: &AllocationLedger) -> (axum::Router, MemoryStore) {
    let (service, store) = memory_service(ledger);
    (allocation_router(Arc::new(service)), store)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// Store that loads a fixed snapshot and refuses every save.
pub(super) struct ReadOnlyStore {
    snapshot: LedgerSnapshot,
}

impl ReadOnlyStore {
    pub(super) fn new(snapshot: LedgerSnapshot) -> Self {
        Self { snapshot }
    }

    fn refuse(&self) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("read only".to_string()))
    }
}

impl AllocationStore for ReadOnlyStore {
    fn load_managers(&self) -> Result<Vec<Manager>, StoreError> {
        Ok(self.snapshot.managers.clone())
    }

    fn load_applicants(&self) -> Result<Vec<ApplicantProfile>, StoreError> {
        Ok(self.snapshot.applicants.clone())
    }

    fn load_officers(&self) -> Result<Vec<ApplicantProfile>, StoreError> {
        Ok(self.snapshot.officers.clone())
    }

    fn load_projects(&self) -> Result<Vec<ProjectRecord>, StoreError> {
        Ok(self.snapshot.projects.clone())
    }

    fn load_applications(&self) -> Result<Vec<ProjectApplication>, StoreError> {
        Ok(self.snapshot.applications.clone())
    }

    fn load_registrations(&self) -> Result<Vec<OfficerRegistration>, StoreError> {
        Ok(self.snapshot.registrations.clone())
    }

    fn load_withdrawals(&self) -> Result<Vec<Withdrawal>, StoreError> {
        Ok(self.snapshot.withdrawals.clone())
    }

    fn load_bookings(&self) -> Result<Vec<FlatBooking>, StoreError> {
        Ok(self.snapshot.bookings.clone())
    }

    fn save_managers(&self, _managers: &[Manager]) -> Result<(), StoreError> {
        self.refuse()
    }

    fn save_applicants(&self, _applicants: &[ApplicantProfile]) -> Result<(), StoreError> {
        self.refuse()
    }

    fn save_officers(&self, _officers: &[ApplicantProfile]) -> Result<(), StoreError> {
        self.refuse()
    }

    fn save_projects(&self, _projects: &[ProjectRecord]) -> Result<(), StoreError> {
        self.refuse()
    }

    fn save_applications(&self, _applications: &[ProjectApplication]) -> Result<(), StoreError> {
        self.refuse()
    }

    fn save_registrations(
        &self,
        _registrations: &[OfficerRegistration],
    ) -> Result<(), StoreError> {
        self.refuse()
    }

    fn save_withdrawals(&self, _withdrawals: &[Withdrawal]) -> Result<(), StoreError> {
        self.refuse()
    }

    fn save_bookings(&self, _bookings: &[FlatBooking]) -> Result<(), StoreError> {
        self.refuse()
    }
}

pub(super) fn read_only_service(ledger: &AllocationLedger) -> AllocationService<ReadOnlyStore> {
    let session = AllocationSession::open(ReadOnlyStore::new(LedgerSnapshot::from(ledger)))
        .expect("session opens");
    AllocationService::new(session)
}
