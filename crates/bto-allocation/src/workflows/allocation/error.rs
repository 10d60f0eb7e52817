use super::domain::{FlatType, Nric, ProjectName};

/// Typed failure reasons for every fallible allocation operation.
///
/// Each variant is locally recoverable: the caller picks different input and tries again.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AllocationError {
    #[error("applicant {applicant} already holds an active application for {project}")]
    AlreadyHasActiveApplication {
        applicant: Nric,
        project: ProjectName,
    },
    #[error("project {0} is not open for applications or not visible")]
    ProjectNotOpenOrNotVisible(ProjectName),
    #[error("applicant {applicant} is not eligible for {detail}")]
    NotEligible { applicant: Nric, detail: String },
    #[error("no units available in {project}{}", flat_type_suffix(.flat_type))]
    NoUnitsAvailable {
        project: ProjectName,
        flat_type: Option<FlatType>,
    },
    #[error("project {0} has no officer slots left")]
    NoOfficerSlots(ProjectName),
    #[error("application window of {project} overlaps {conflicting}")]
    DateRangeConflict {
        project: ProjectName,
        conflicting: ProjectName,
    },
    #[error("{entity} {key} cannot transition while {state}")]
    InvalidStateForTransition {
        entity: &'static str,
        key: String,
        state: &'static str,
    },
    #[error("application {0} already carries a withdrawal request")]
    DuplicateWithdrawal(String),
    #[error("{entity} {key} not found")]
    NotFound { entity: &'static str, key: String },
    #[error("officer {officer} already registered for {project}")]
    AlreadyRegistered { officer: Nric, project: ProjectName },
    #[error("officer {officer} is not assigned to {project}")]
    OfficerNotAssigned { officer: Nric, project: ProjectName },
    #[error("project {0} already exists")]
    DuplicateProject(ProjectName),
    #[error("invalid project definition: {0}")]
    InvalidProject(String),
}

impl AllocationError {
    pub(crate) fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub(crate) fn invalid_state(
        entity: &'static str,
        key: impl ToString,
        state: &'static str,
    ) -> Self {
        Self::InvalidStateForTransition {
            entity,
            key: key.to_string(),
            state,
        }
    }
}

fn flat_type_suffix(flat_type: &Option<FlatType>) -> String {
    match flat_type {
        Some(flat_type) => format!(" for {}", flat_type.label()),
        None => String::new(),
    }
}
