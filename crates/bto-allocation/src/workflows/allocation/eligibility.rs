use std::collections::BTreeSet;

use super::domain::{ApplicantProfile, FlatType, MaritalStatus};

pub const SINGLE_MINIMUM_AGE: u8 = 35;
pub const MARRIED_MINIMUM_AGE: u8 = 21;

/// Flat types a person may apply for, derived from age and marital status alone.
///
/// Both the applicant-facing listing and submission acceptance consult this function, so an
/// empty set means the person cannot apply anywhere.
pub fn eligible_flat_types(profile: &ApplicantProfile) -> BTreeSet<FlatType> {
    match profile.marital_status {
        MaritalStatus::Single if profile.age >= SINGLE_MINIMUM_AGE => {
            BTreeSet::from([FlatType::TwoRoom])
        }
        MaritalStatus::Married if profile.age >= MARRIED_MINIMUM_AGE => {
            BTreeSet::from([FlatType::TwoRoom, FlatType::ThreeRoom])
        }
        _ => BTreeSet::new(),
    }
}

pub fn is_eligible_for(profile: &ApplicantProfile, flat_type: FlatType) -> bool {
    eligible_flat_types(profile).contains(&flat_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::allocation::domain::Nric;

    fn person(age: u8, marital_status: MaritalStatus) -> ApplicantProfile {
        ApplicantProfile {
            nric: Nric::new("S1234567A"),
            name: "Test Person".to_string(),
            age,
            marital_status,
        }
    }

    #[test]
    fn single_applicants_qualify_for_two_room_from_thirty_five() {
        assert!(eligible_flat_types(&person(34, MaritalStatus::Single)).is_empty());
        assert_eq!(
            eligible_flat_types(&person(35, MaritalStatus::Single)),
            BTreeSet::from([FlatType::TwoRoom])
        );
    }

    #[test]
    fn married_applicants_qualify_for_both_types_from_twenty_one() {
        assert!(eligible_flat_types(&person(20, MaritalStatus::Married)).is_empty());
        assert_eq!(
            eligible_flat_types(&person(21, MaritalStatus::Married)),
            BTreeSet::from([FlatType::TwoRoom, FlatType::ThreeRoom])
        );
    }

    #[test]
    fn single_applicants_never_qualify_for_three_room() {
        assert!(!is_eligible_for(
            &person(60, MaritalStatus::Single),
            FlatType::ThreeRoom
        ));
        assert!(is_eligible_for(
            &person(60, MaritalStatus::Single),
            FlatType::TwoRoom
        ));
    }
}
