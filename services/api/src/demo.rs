use chrono::{Local, NaiveDate};
use clap::Args;
use std::collections::BTreeMap;
use std::sync::Arc;
use bto_core::allocation::{
    AllocationEngine, ApplicantPost, Catalog, DiscardSnapshots, FlatCategory, ManagerPost,
    MaritalStatus, OfficerPost, ProjectDraft, ProjectId, ReviewOutcome, Role, SnapshotSink, User,
    UserId, UserProfile,
};
use bto_core::error::AppError;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Application window opening date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) opens_on: Option<NaiveDate>,
    /// Application window closing date (YYYY-MM-DD). Defaults to opens_on + 30 days.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) closes_on: Option<NaiveDate>,
    /// Skip the enquiry portion of the demo.
    #[arg(long)]
    pub(crate) skip_enquiries: bool,
    /// Print the full catalog as JSON at the end of the run.
    #[arg(long)]
    pub(crate) show_catalog: bool,
}

const MANAGER: &str = "S6543210F";
const OFFICER: &str = "T8765432A";
const FIRST_SINGLE: &str = "S7812345D";
const MARRIED: &str = "S9134567H";
const SECOND_SINGLE: &str = "S6012345J";
const YOUNG_SINGLE: &str = "S9876501B";

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        opens_on,
        closes_on,
        skip_enquiries,
        show_catalog,
    } = args;

    let opens_on = opens_on.unwrap_or_else(|| Local::now().date_naive());
    let closes_on = closes_on.unwrap_or_else(|| opens_on + chrono::Duration::days(30));

    println!("BTO allocation demo");
    println!("Application window: {} -> {}", opens_on, closes_on);

    let mut engine = AllocationEngine::new(demo_catalog(), Arc::new(DiscardSnapshots));
    let manager = UserId(MANAGER.to_string());
    let officer = UserId(OFFICER.to_string());

    println!("\nProject setup");
    let mut units = BTreeMap::new();
    units.insert(FlatCategory::TwoRoom, 1);
    units.insert(FlatCategory::ThreeRoom, 2);
    let draft = ProjectDraft {
        name: "Tampines GreenCrest".to_string(),
        neighborhood: "Tampines".to_string(),
        opens_on,
        closes_on,
        units,
        max_officer_slots: 5,
    };
    let project = match engine.create_project(&manager, draft) {
        Ok(project) => project,
        Err(err) => {
            println!("  Project creation rejected: {}", err);
            return Ok(());
        }
    };
    println!(
        "- {} opened {} in {} ({} officer slots)",
        manager, project.name, project.neighborhood, project.max_officer_slots
    );
    print_remaining_units(&engine, &project.project_id);

    if let Err(err) = engine.register_officer(&officer, &project.project_id) {
        println!("  Officer registration rejected: {}", err);
        return Ok(());
    }
    match engine.approve_officer(&manager, &project.project_id, &officer) {
        Ok(_) => println!("- Officer {} registered and approved for the project", officer),
        Err(err) => {
            println!("  Officer approval rejected: {}", err);
            return Ok(());
        }
    }

    println!("\nEligibility-filtered listings");
    for id in [FIRST_SINGLE, MARRIED, YOUNG_SINGLE] {
        let viewer = UserId(id.to_string());
        let listings = match engine.visible_projects(&viewer) {
            Ok(listings) => listings,
            Err(err) => {
                println!("  Listing unavailable for {}: {}", viewer, err);
                return Ok(());
            }
        };
        match listings.first() {
            Some(summary) => {
                let categories: Vec<&str> = summary
                    .eligible_categories
                    .iter()
                    .map(|category| category.label())
                    .collect();
                println!("- {} sees {} [{}]", viewer, summary.name, categories.join(", "));
            }
            None => println!("- {} sees no open projects", viewer),
        }
    }

    println!("\nApplications");
    let young = UserId(YOUNG_SINGLE.to_string());
    match engine.apply(&young, &project.project_id, FlatCategory::TwoRoom) {
        Ok(_) => println!("- {} unexpectedly admitted", young),
        Err(err) => println!("- {} rejected: {}", young, err),
    }

    let rounds = [
        (FIRST_SINGLE, FlatCategory::TwoRoom),
        (MARRIED, FlatCategory::ThreeRoom),
        (SECOND_SINGLE, FlatCategory::TwoRoom),
    ];
    let mut submitted = Vec::new();
    for (id, category) in rounds {
        let applicant = UserId(id.to_string());
        match engine.apply(&applicant, &project.project_id, category) {
            Ok(application) => {
                println!(
                    "- {} applied for a {} flat -> {} ({})",
                    applicant, category, application.application_id, application.status
                );
                submitted.push(application.application_id);
            }
            Err(err) => println!("- {} rejected: {}", applicant, err),
        }
    }

    println!("\nOfficer review");
    for application in &submitted {
        match engine.review_application(&officer, application, ReviewOutcome::Successful) {
            Ok(reviewed) => println!("- {} -> {}", reviewed.application_id, reviewed.status),
            Err(err) => println!("- Review of {} failed: {}", application, err),
        }
    }

    println!("\nBooking appointments");
    for (application, category) in submitted.iter().zip([
        FlatCategory::TwoRoom,
        FlatCategory::ThreeRoom,
        FlatCategory::TwoRoom,
    ]) {
        match engine.book(&officer, application, category) {
            Ok(booked) => println!(
                "- {} booked a {} flat -> {}",
                booked.applicant, category, booked.status
            ),
            Err(err) => println!("- Booking for {} declined: {}", application, err),
        }
    }
    print_remaining_units(&engine, &project.project_id);

    println!("\nWithdrawal");
    if let Some(application) = submitted.last() {
        let applicant = UserId(SECOND_SINGLE.to_string());
        match engine.request_withdrawal(&applicant, application) {
            Ok(_) => println!("- {} requested withdrawal of {}", applicant, application),
            Err(err) => println!("- Withdrawal request failed: {}", err),
        }
        match engine.approve_withdrawal(&manager, application) {
            Ok(removed) => println!(
                "- {} approved; {} may apply again next round",
                removed.application_id, removed.applicant
            ),
            Err(err) => println!("- Withdrawal approval failed: {}", err),
        }
    }

    if !skip_enquiries {
        println!("\nEnquiries");
        let author = UserId(MARRIED.to_string());
        let enquiry = match engine.create_enquiry(
            &author,
            &project.project_id,
            "When will the keys be ready for collection?".to_string(),
        ) {
            Ok(enquiry) => enquiry,
            Err(err) => {
                println!("  Enquiry creation failed: {}", err);
                return Ok(());
            }
        };
        println!("- {} asked: {}", enquiry.author, enquiry.content);

        match engine.reply_enquiry(
            &officer,
            &enquiry.enquiry_id,
            "Estimated key collection is four years after the window closes.".to_string(),
        ) {
            Ok(replied) => {
                if let Some(reply) = replied.reply {
                    println!("- {} replied: {}", reply.author, reply.content);
                }
            }
            Err(err) => println!("- Reply failed: {}", err),
        }

        match engine.edit_enquiry(&author, &enquiry.enquiry_id, "Edited".to_string()) {
            Ok(_) => println!("- Edit unexpectedly allowed after reply"),
            Err(err) => println!("- Edit after reply rejected: {}", err),
        }
    }

    println!("\nFinal project state");
    print_remaining_units(&engine, &project.project_id);
    let listings = match engine.visible_projects(&manager) {
        Ok(listings) => listings,
        Err(err) => {
            println!("  Listing unavailable: {}", err);
            return Ok(());
        }
    };
    if let Some(summary) = listings.first() {
        match serde_json::to_string_pretty(summary) {
            Ok(json) => println!("Manager view payload:\n{}", json),
            Err(err) => println!("Manager view payload unavailable: {}", err),
        }
    }

    if show_catalog {
        match serde_json::to_string_pretty(engine.catalog()) {
            Ok(json) => println!("\nCatalog snapshot:\n{}", json),
            Err(err) => println!("\nCatalog snapshot unavailable: {}", err),
        }
    }

    Ok(())
}

fn print_remaining_units<P: SnapshotSink>(engine: &AllocationEngine<P>, project: &ProjectId) {
    match engine.remaining_units(project) {
        Ok(rows) => {
            for row in rows {
                println!(
                    "  {} flats: {} of {} remaining",
                    row.category_label, row.remaining, row.total
                );
            }
        }
        Err(err) => println!("  Unit counts unavailable: {}", err),
    }
}

fn demo_catalog() -> Catalog {
    let mut catalog = Catalog::new();
    let cast = [
        (
            MANAGER,
            "Tan Wei Ling",
            45,
            MaritalStatus::Married,
            Role::Manager(ManagerPost::default()),
        ),
        (
            OFFICER,
            "Lim Jun Jie",
            32,
            MaritalStatus::Single,
            Role::Officer(OfficerPost::default()),
        ),
        (
            FIRST_SINGLE,
            "Nur Aisyah",
            37,
            MaritalStatus::Single,
            Role::Applicant(ApplicantPost::default()),
        ),
        (
            MARRIED,
            "Marcus Ong",
            29,
            MaritalStatus::Married,
            Role::Applicant(ApplicantPost::default()),
        ),
        (
            SECOND_SINGLE,
            "Priya Raman",
            40,
            MaritalStatus::Single,
            Role::Applicant(ApplicantPost::default()),
        ),
        (
            YOUNG_SINGLE,
            "Ethan Koh",
            28,
            MaritalStatus::Single,
            Role::Applicant(ApplicantPost::default()),
        ),
    ];

    for (id, name, age, marital_status, role) in cast {
        let profile = UserProfile {
            user_id: UserId(id.to_string()),
            name: name.to_string(),
            age,
            marital_status,
        };
        catalog.insert_user(User::new(profile, role));
    }

    catalog
}
