use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{
    ApplicantProfile, ApplicationWindow, FlatType, Nric, ProjectName, ReviewStatus,
};
use super::eligibility::eligible_flat_types;
use super::error::AllocationError;
use super::inventory::{FlatInventory, InventoryLine};
use super::ledger::AllocationLedger;

/// Hard cap on officers per project.
pub const MAX_OFFICER_SLOTS: u8 = 10;

/// Officer capacity of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficerSlots {
    pub total: u8,
    pub available: u8,
}

impl OfficerSlots {
    pub fn new(total: u8) -> Self {
        Self {
            total,
            available: total,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub name: ProjectName,
    pub neighborhood: String,
    pub window: ApplicationWindow,
    pub inventory: FlatInventory,
    pub visible: bool,
    pub officer_slots: OfficerSlots,
    pub manager: Nric,
}

impl Project {
    pub fn is_open_on(&self, date: NaiveDate) -> bool {
        self.visible && self.window.contains(date)
    }

    /// Eligible flat types for `profile` that still have stock in this project.
    pub fn stocked_types_for(&self, profile: &ApplicantProfile) -> Vec<FlatType> {
        eligible_flat_types(profile)
            .into_iter()
            .filter(|flat_type| self.inventory.has_available(*flat_type))
            .collect()
    }

    pub fn listing(&self) -> ProjectListing {
        ProjectListing {
            name: self.name.clone(),
            neighborhood: self.neighborhood.clone(),
            opens_on: self.window.opens_on,
            closes_on: self.window.closes_on,
            visible: self.visible,
            manager: self.manager.clone(),
            officer_slots_available: self.officer_slots.available,
            inventory: self.inventory.summary(),
        }
    }
}

/// Manager input for a new project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDraft {
    pub name: ProjectName,
    pub neighborhood: String,
    pub opens_on: NaiveDate,
    pub closes_on: NaiveDate,
    pub units: BTreeMap<FlatType, u32>,
    pub officer_slots: u8,
    #[serde(default)]
    pub visible: bool,
}

/// Optional narrowing applied to the applicant-facing listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFilter {
    pub neighborhood: Option<String>,
    pub flat_type: Option<FlatType>,
}

impl ProjectFilter {
    fn accepts(&self, project: &Project, eligible: &[FlatType]) -> bool {
        let neighborhood_ok = self.neighborhood.as_deref().map_or(true, |wanted| {
            project.neighborhood.eq_ignore_ascii_case(wanted.trim())
        });
        let flat_type_ok = self.flat_type.map_or(true, |wanted| {
            eligible.contains(&wanted) && project.inventory.total(wanted) > 0
        });
        neighborhood_ok && flat_type_ok
    }
}

/// Serializable snapshot of a project for listings and API responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectListing {
    pub name: ProjectName,
    pub neighborhood: String,
    pub opens_on: NaiveDate,
    pub closes_on: NaiveDate,
    pub visible: bool,
    pub manager: Nric,
    pub officer_slots_available: u8,
    pub inventory: Vec<InventoryLine>,
}

/// Manager-facing project operations and the applicant-facing listing.
pub struct ProjectCatalog<'a> {
    ledger: &'a mut AllocationLedger,
}

impl<'a> ProjectCatalog<'a> {
    pub(crate) fn new(ledger: &'a mut AllocationLedger) -> Self {
        Self { ledger }
    }

    pub fn create(&mut self, manager: &Nric, draft: ProjectDraft) -> Result<Project, AllocationError> {
        if !self.ledger.managers.contains_key(manager) {
            return Err(AllocationError::not_found("manager", manager));
        }
        if self.ledger.projects.contains_key(&draft.name) {
            return Err(AllocationError::DuplicateProject(draft.name));
        }
        if draft.name.as_str().is_empty() {
            return Err(AllocationError::InvalidProject(
                "project name must not be empty".to_string(),
            ));
        }
        let window = ApplicationWindow::new(draft.opens_on, draft.closes_on).ok_or_else(|| {
            AllocationError::InvalidProject(format!(
                "opening date {} falls after closing date {}",
                draft.opens_on, draft.closes_on
            ))
        })?;
        if draft.officer_slots == 0 || draft.officer_slots > MAX_OFFICER_SLOTS {
            return Err(AllocationError::InvalidProject(format!(
                "officer slots must be between 1 and {MAX_OFFICER_SLOTS}, got {}",
                draft.officer_slots
            )));
        }

        if let Some(conflicting) = self
            .ledger
            .projects
            .values()
            .find(|project| &project.manager == manager && project.window.overlaps(&window))
        {
            return Err(AllocationError::DateRangeConflict {
                project: draft.name,
                conflicting: conflicting.name.clone(),
            });
        }

        let project = Project {
            name: draft.name.clone(),
            neighborhood: draft.neighborhood.trim().to_string(),
            window,
            inventory: FlatInventory::new(draft.units),
            visible: draft.visible,
            officer_slots: OfficerSlots::new(draft.officer_slots),
            manager: manager.clone(),
        };
        self.ledger.projects.insert(draft.name, project.clone());
        Ok(project)
    }

    pub fn set_visibility(&mut self, name: &ProjectName, visible: bool) -> Result<(), AllocationError> {
        self.ledger.project_mut(name)?.visible = visible;
        Ok(())
    }

    /// Remove a project and every record hanging off it.
    pub fn delete(&mut self, name: &ProjectName) -> Result<Project, AllocationError> {
        let project = self
            .ledger
            .projects
            .remove(name)
            .ok_or_else(|| AllocationError::not_found("project", name))?;

        self.ledger
            .applications
            .retain(|key, _| &key.project != name);
        self.ledger
            .withdrawals
            .retain(|key, _| &key.project != name);
        self.ledger
            .bookings
            .retain(|_, booking| &booking.project != name);
        self.ledger
            .registrations
            .retain(|key, _| &key.project != name);

        for applicant in self.ledger.applicants.values_mut() {
            if applicant.active_application.as_ref() == Some(name) {
                applicant.active_application = None;
            }
        }
        for officer in self.ledger.officers.values_mut() {
            officer.assigned_projects.remove(name);
        }

        Ok(project)
    }

    /// Visible projects the applicant is eligible for, sorted by name.
    pub fn visible_for(
        &self,
        applicant: &Nric,
        filter: &ProjectFilter,
    ) -> Result<Vec<ProjectListing>, AllocationError> {
        let profile = &self.ledger.applicant_ref(applicant)?.profile;
        let eligible: Vec<FlatType> = eligible_flat_types(profile).into_iter().collect();
        if eligible.is_empty() {
            return Ok(Vec::new());
        }

        Ok(self
            .ledger
            .projects
            .values()
            .filter(|project| project.visible)
            .filter(|project| filter.accepts(project, &eligible))
            .map(Project::listing)
            .collect())
    }

    /// Projects owned by a manager, including hidden ones.
    pub fn managed_by(&self, manager: &Nric) -> Vec<ProjectListing> {
        self.ledger
            .projects
            .values()
            .filter(|project| &project.manager == manager)
            .map(Project::listing)
            .collect()
    }

    /// Projects an officer serves, whether or not they are visible.
    pub fn handled_by(&self, officer: &Nric) -> Vec<ProjectListing> {
        self.ledger
            .registrations_for_officer(officer)
            .filter(|registration| registration.status == ReviewStatus::Approved)
            .filter_map(|registration| self.ledger.projects.get(&registration.project))
            .map(Project::listing)
            .collect()
    }
}
