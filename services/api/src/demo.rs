use bto_allocation::error::AppError;
use bto_allocation::workflows::allocation::{
    AllocationLedger, AllocationService, ApplicantProfile, ApplicationKey, ApprovalOutcome,
    BookingOutcome, FlatType, InventoryLine, LedgerSnapshot, Manager, MaritalStatus, MemoryStore,
    Nric, ProjectDraft, ProjectFilter, ProjectName, RegistrationKey,
};
use chrono::{Duration, Local, NaiveDate};
use clap::Args;
use std::collections::BTreeMap;

const MANAGER: &str = "S5800001A";
const SINGLE_APPLICANT: &str = "S1234567A";
const MARRIED_APPLICANT: &str = "T7654321B";
const OFFICER: &str = "T2109876H";
const PROJECT: &str = "Acacia Breeze";

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Business date for the walkthrough (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Two-room units offered by the demo project.
    #[arg(long, default_value_t = 1)]
    pub(crate) two_room: u32,
    /// Three-room units offered by the demo project.
    #[arg(long, default_value_t = 2)]
    pub(crate) three_room: u32,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let service = AllocationService::open(MemoryStore::new(demo_people()))?;
    let project = ProjectName::new(PROJECT);
    let officer = Nric::new(OFFICER);

    println!("BTO allocation walkthrough for {today}");
    let listing = service.create_project(
        &Nric::new(MANAGER),
        ProjectDraft {
            name: project.clone(),
            neighborhood: "Yishun".to_string(),
            opens_on: today - Duration::days(14),
            closes_on: today + Duration::days(30),
            units: BTreeMap::from([
                (FlatType::TwoRoom, args.two_room),
                (FlatType::ThreeRoom, args.three_room),
            ]),
            officer_slots: 2,
            visible: true,
        },
    )?;
    println!(
        "- Project {} in {} open {} to {}",
        listing.name, listing.neighborhood, listing.opens_on, listing.closes_on
    );
    print_inventory(&listing.inventory);

    println!("\nOfficer assignment");
    service.register_officer(&officer, &project, today)?;
    let approval =
        service.approve_registration(&RegistrationKey::new(officer.clone(), project.clone()))?;
    println!(
        "- {} approved for {} ({} slot(s) left, {} overlapping registration(s) auto-rejected)",
        approval.registration.officer,
        approval.registration.project,
        service.project(&project)?.officer_slots_available,
        approval.auto_rejected.len()
    );

    println!("\nApplications");
    for (applicant, flat_type) in [
        (SINGLE_APPLICANT, FlatType::TwoRoom),
        (MARRIED_APPLICANT, FlatType::ThreeRoom),
    ] {
        let key = ApplicationKey::new(Nric::new(applicant), project.clone());
        let filter = ProjectFilter {
            flat_type: Some(flat_type),
            ..ProjectFilter::default()
        };
        let visible = service.visible_projects(&key.applicant, &filter)?;
        println!(
            "- {} sees {} project(s) offering {}",
            key.applicant,
            visible.len(),
            flat_type.label()
        );

        if let Err(err) = service.submit_application(&key.applicant, &key.project, today) {
            println!("  submission refused: {err}");
            continue;
        }
        match service.approve_application(&key)? {
            ApprovalOutcome::Approved => println!("  application approved"),
            ApprovalOutcome::OutOfStock => {
                println!("  application unsuccessful, eligible stock sold out");
                continue;
            }
        }
        service.select_flat_type(&key, flat_type)?;
        match service.process_booking(&key, &officer)? {
            BookingOutcome::Booked { booking } => println!(
                "  booked {} unit {}",
                booking.flat_type.label(),
                booking
                    .unit_id
                    .as_ref()
                    .map(|unit| unit.to_string())
                    .unwrap_or_else(|| "(unassigned)".to_string())
            ),
            BookingOutcome::Rejected { reason } => println!("  booking rejected: {reason}"),
        }
    }
    print_inventory(&service.inventory(&project)?);

    println!("\nWithdrawal");
    let key = ApplicationKey::new(Nric::new(MARRIED_APPLICANT), project.clone());
    if let Err(err) = service.request_withdrawal(&key.applicant, today) {
        println!("- withdrawal unavailable: {err}");
        return Ok(());
    }
    println!("- {} pending withdrawal(s)", service.pending_withdrawals()?.len());
    let withdrawal = service.approve_withdrawal(&key)?;
    println!(
        "- withdrawal for {} approved, application now {:?}",
        withdrawal.applicant,
        service.application(&key)?.status
    );
    print_inventory(&service.inventory(&project)?);

    Ok(())
}

fn print_inventory(lines: &[InventoryLine]) {
    for line in lines {
        println!(
            "  {}: {} of {} available",
            line.flat_type_label, line.available, line.total
        );
    }
}

fn demo_people() -> LedgerSnapshot {
    let mut ledger = AllocationLedger::new();
    ledger.enroll_manager(Manager {
        nric: Nric::new(MANAGER),
        name: "Michael".to_string(),
    });
    ledger.enroll_applicant(person(SINGLE_APPLICANT, "John", 40, MaritalStatus::Single));
    ledger.enroll_applicant(person(MARRIED_APPLICANT, "Sarah", 40, MaritalStatus::Married));
    ledger.enroll_officer(person(OFFICER, "Daniel", 36, MaritalStatus::Married));
    LedgerSnapshot::from(&ledger)
}

fn person(nric: &str, name: &str, age: u8, marital_status: MaritalStatus) -> ApplicantProfile {
    ApplicantProfile {
        nric: Nric::new(nric),
        name: name.to_string(),
        age,
        marital_status,
    }
}
