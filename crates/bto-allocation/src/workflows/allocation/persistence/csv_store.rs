use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;

use super::{AllocationStore, LedgerSnapshot, ProjectRecord, StoreError};
use crate::workflows::allocation::domain::{
    ApplicantProfile, FlatBooking, Manager, OfficerRegistration, ProjectApplication, Withdrawal,
};

const MANAGERS_FILE: &str = "managers.csv";
const APPLICANTS_FILE: &str = "applicants.csv";
const OFFICERS_FILE: &str = "officers.csv";
const PROJECTS_FILE: &str = "projects.csv";
const APPLICATIONS_FILE: &str = "applications.csv";
const REGISTRATIONS_FILE: &str = "registrations.csv";
const WITHDRAWALS_FILE: &str = "withdrawals.csv";
const BOOKINGS_FILE: &str = "bookings.csv";

/// One CSV file per collection inside a data directory.
///
/// A missing file reads as an empty collection. Saving writes a temporary file next to the
/// target and renames it into place, so readers never see a half-written file.
#[derive(Debug, Clone)]
pub struct CsvStore {
    root: PathBuf,
}

impl CsvStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read<T: DeserializeOwned>(&self, file: &str) -> Result<Vec<T>, StoreError> {
        let path = self.root.join(file);
        let handle = match fs::File::open(&path) {
            Ok(handle) => handle,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.display().to_string(),
                    source,
                })
            }
        };

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(handle);
        reader
            .deserialize::<T>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| StoreError::Csv {
                path: path.display().to_string(),
                source,
            })
    }

    fn io_error(path: &Path) -> impl Fn(std::io::Error) -> StoreError + '_ {
        move |source| StoreError::Io {
            path: path.display().to_string(),
            source,
        }
    }

    /// Serialize `rows` into a temporary file inside the data directory.
    fn stage<T: Serialize>(&self, file: &str, rows: &[T]) -> Result<Staged, StoreError> {
        fs::create_dir_all(&self.root).map_err(Self::io_error(&self.root))?;

        let path = self.root.join(file);
        let mut staged = NamedTempFile::new_in(&self.root).map_err(Self::io_error(&path))?;
        {
            let mut writer = csv::Writer::from_writer(&mut staged);
            for row in rows {
                writer.serialize(row).map_err(|source| StoreError::Csv {
                    path: path.display().to_string(),
                    source,
                })?;
            }
            writer.flush().map_err(Self::io_error(&path))?;
        }
        Ok(Staged { file: staged, path })
    }

    fn write<T: Serialize>(&self, file: &str, rows: &[T]) -> Result<(), StoreError> {
        self.stage(file, rows)?.commit()
    }
}

/// A fully written temporary file waiting to replace its target.
struct Staged {
    file: NamedTempFile,
    path: PathBuf,
}

impl Staged {
    fn commit(self) -> Result<(), StoreError> {
        let Staged { file, path } = self;
        file.persist(&path).map_err(|err| StoreError::Io {
            path: path.display().to_string(),
            source: err.error,
        })?;
        Ok(())
    }
}

impl AllocationStore for CsvStore {
    fn load_managers(&self) -> Result<Vec<Manager>, StoreError> {
        self.read(MANAGERS_FILE)
    }

    fn load_applicants(&self) -> Result<Vec<ApplicantProfile>, StoreError> {
        self.read(APPLICANTS_FILE)
    }

    fn load_officers(&self) -> Result<Vec<ApplicantProfile>, StoreError> {
        self.read(OFFICERS_FILE)
    }

    fn load_projects(&self) -> Result<Vec<ProjectRecord>, StoreError> {
        self.read(PROJECTS_FILE)
    }

    fn load_applications(&self) -> Result<Vec<ProjectApplication>, StoreError> {
        self.read(APPLICATIONS_FILE)
    }

    fn load_registrations(&self) -> Result<Vec<OfficerRegistration>, StoreError> {
        self.read(REGISTRATIONS_FILE)
    }

    fn load_withdrawals(&self) -> Result<Vec<Withdrawal>, StoreError> {
        self.read(WITHDRAWALS_FILE)
    }

    fn load_bookings(&self) -> Result<Vec<FlatBooking>, StoreError> {
        self.read(BOOKINGS_FILE)
    }

    fn save_managers(&self, managers: &[Manager]) -> Result<(), StoreError> {
        self.write(MANAGERS_FILE, managers)
    }

    fn save_applicants(&self, applicants: &[ApplicantProfile]) -> Result<(), StoreError> {
        self.write(APPLICANTS_FILE, applicants)
    }

    fn save_officers(&self, officers: &[ApplicantProfile]) -> Result<(), StoreError> {
        self.write(OFFICERS_FILE, officers)
    }

    fn save_projects(&self, projects: &[ProjectRecord]) -> Result<(), StoreError> {
        self.write(PROJECTS_FILE, projects)
    }

    fn save_applications(&self, applications: &[ProjectApplication]) -> Result<(), StoreError> {
        self.write(APPLICATIONS_FILE, applications)
    }

    fn save_registrations(
        &self,
        registrations: &[OfficerRegistration],
    ) -> Result<(), StoreError> {
        self.write(REGISTRATIONS_FILE, registrations)
    }

    fn save_withdrawals(&self, withdrawals: &[Withdrawal]) -> Result<(), StoreError> {
        self.write(WITHDRAWALS_FILE, withdrawals)
    }

    fn save_bookings(&self, bookings: &[FlatBooking]) -> Result<(), StoreError> {
        self.write(BOOKINGS_FILE, bookings)
    }

    /// Stage every collection before replacing any file, so a serialization or disk-full
    /// failure leaves the previous snapshot in place.
    fn save_snapshot(&self, snapshot: &LedgerSnapshot) -> Result<(), StoreError> {
        let staged = [
            self.stage(MANAGERS_FILE, &snapshot.managers)?,
            self.stage(APPLICANTS_FILE, &snapshot.applicants)?,
            self.stage(OFFICERS_FILE, &snapshot.officers)?,
            self.stage(PROJECTS_FILE, &snapshot.projects)?,
            self.stage(APPLICATIONS_FILE, &snapshot.applications)?,
            self.stage(REGISTRATIONS_FILE, &snapshot.registrations)?,
            self.stage(WITHDRAWALS_FILE, &snapshot.withdrawals)?,
            self.stage(BOOKINGS_FILE, &snapshot.bookings)?,
        ];
        for file in staged {
            file.commit()?;
        }
        Ok(())
    }
}
