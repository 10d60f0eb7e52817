use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// National registration identity used as the natural key for every person.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Nric(pub String);

impl Nric {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Nric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique project name; projects are never renamed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectName(pub String);

impl ProjectName {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque identifier handed out when a unit is reserved.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(pub String);

impl UnitId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Category of flat with its own inventory per project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlatType {
    TwoRoom,
    ThreeRoom,
}

impl FlatType {
    pub const fn ordered() -> [Self; 2] {
        [Self::TwoRoom, Self::ThreeRoom]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::TwoRoom => "2-Room",
            Self::ThreeRoom => "3-Room",
        }
    }

    pub(crate) const fn unit_prefix(self) -> &'static str {
        match self {
            Self::TwoRoom => "2R",
            Self::ThreeRoom => "3R",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaritalStatus {
    Single,
    Married,
}

impl MaritalStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Single => "Single",
            Self::Married => "Married",
        }
    }
}

/// Primary status of a project application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    Pending,
    Successful,
    Unsuccessful,
    Booked,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Successful => "successful",
            Self::Unsuccessful => "unsuccessful",
            Self::Booked => "booked",
        }
    }
}

/// Review state shared by withdrawals, officer registrations and bookings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
}

impl ReviewStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

/// Inclusive application window of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationWindow {
    pub opens_on: NaiveDate,
    pub closes_on: NaiveDate,
}

impl ApplicationWindow {
    /// Returns `None` when the window would close before it opens.
    pub fn new(opens_on: NaiveDate, closes_on: NaiveDate) -> Option<Self> {
        (opens_on <= closes_on).then_some(Self {
            opens_on,
            closes_on,
        })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.opens_on <= date && date <= self.closes_on
    }

    /// Windows that merely touch on a shared boundary day still overlap.
    pub fn overlaps(&self, other: &ApplicationWindow) -> bool {
        self.opens_on <= other.closes_on && other.opens_on <= self.closes_on
    }
}

/// Personal attributes consulted by eligibility; shared by applicants and officers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantProfile {
    pub nric: Nric,
    pub name: String,
    pub age: u8,
    pub marital_status: MaritalStatus,
}

/// Applicant aggregate: the profile plus its single active application reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applicant {
    pub profile: ApplicantProfile,
    pub active_application: Option<ProjectName>,
}

impl Applicant {
    pub fn new(profile: ApplicantProfile) -> Self {
        Self {
            profile,
            active_application: None,
        }
    }
}

/// Officer aggregate composed around an applicant profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Officer {
    pub profile: ApplicantProfile,
    pub assigned_projects: std::collections::BTreeSet<ProjectName>,
}

impl Officer {
    pub fn new(profile: ApplicantProfile) -> Self {
        Self {
            profile,
            assigned_projects: Default::default(),
        }
    }

    pub fn nric(&self) -> &Nric {
        &self.profile.nric
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manager {
    pub nric: Nric,
    pub name: String,
}

/// Natural key of an application: one applicant against one project.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ApplicationKey {
    pub applicant: Nric,
    pub project: ProjectName,
}

impl ApplicationKey {
    pub fn new(applicant: Nric, project: ProjectName) -> Self {
        Self { applicant, project }
    }
}

impl fmt::Display for ApplicationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.applicant, self.project)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectApplication {
    pub applicant: Nric,
    pub project: ProjectName,
    pub status: ApplicationStatus,
    pub selected_flat_type: Option<FlatType>,
    pub withdrawal_status: Option<ReviewStatus>,
    pub submitted_on: NaiveDate,
}

impl ProjectApplication {
    pub fn key(&self) -> ApplicationKey {
        ApplicationKey::new(self.applicant.clone(), self.project.clone())
    }

    /// Anything short of an approved withdrawal keeps the application active.
    pub fn is_active(&self) -> bool {
        self.withdrawal_status != Some(ReviewStatus::Approved)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatBooking {
    pub applicant: Nric,
    pub project: ProjectName,
    pub flat_type: FlatType,
    pub unit_id: Option<UnitId>,
    pub status: ReviewStatus,
    pub rejection_reason: Option<String>,
    pub processed_by: Option<Nric>,
}

impl FlatBooking {
    /// The unit this booking currently holds in inventory, if any.
    pub fn held_unit(&self) -> Option<&UnitId> {
        match self.status {
            ReviewStatus::Approved => self.unit_id.as_ref(),
            _ => None,
        }
    }
}

/// Natural key of an officer registration.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RegistrationKey {
    pub officer: Nric,
    pub project: ProjectName,
}

impl RegistrationKey {
    pub fn new(officer: Nric, project: ProjectName) -> Self {
        Self { officer, project }
    }
}

impl fmt::Display for RegistrationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.officer, self.project)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficerRegistration {
    pub officer: Nric,
    pub project: ProjectName,
    pub status: ReviewStatus,
    pub requested_on: NaiveDate,
}

impl OfficerRegistration {
    pub fn key(&self) -> RegistrationKey {
        RegistrationKey::new(self.officer.clone(), self.project.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withdrawal {
    pub applicant: Nric,
    pub project: ProjectName,
    pub status: ReviewStatus,
    pub requested_on: NaiveDate,
}

impl Withdrawal {
    pub fn key(&self) -> ApplicationKey {
        ApplicationKey::new(self.applicant.clone(), self.project.clone())
    }
}
