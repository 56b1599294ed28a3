use clap::Args;
use std::path::PathBuf;
use bto_core::allocation::Role;
use bto_core::catalog::{write_catalog, CatalogSeeds};
use bto_core::config::AppConfig;
use bto_core::error::AppError;

#[derive(Args, Debug, Default)]
pub(crate) struct SeedArgs {
    /// Users CSV to inspect (defaults to the configured path)
    #[arg(long)]
    pub(crate) users: Option<PathBuf>,
    /// Projects CSV to inspect (defaults to the configured path)
    #[arg(long)]
    pub(crate) projects: Option<PathBuf>,
    /// Write the validated catalog to the snapshot path
    #[arg(long)]
    pub(crate) write_snapshot: bool,
    /// Override the snapshot destination
    #[arg(long)]
    pub(crate) snapshot: Option<PathBuf>,
}

/// Validate the seed CSVs and print what the service would start with.
pub(crate) fn run_seed(args: SeedArgs) -> Result<(), AppError> {
    let SeedArgs {
        users,
        projects,
        write_snapshot,
        snapshot,
    } = args;

    let config = AppConfig::load()?;
    let users = users.unwrap_or(config.catalog.users_csv);
    let projects = projects.unwrap_or(config.catalog.projects_csv);
    let snapshot = snapshot.unwrap_or(config.catalog.snapshot_path);

    println!("Seed inspection");
    println!("Users CSV: {}", users.display());
    println!("Projects CSV: {}", projects.display());

    let catalog = CatalogSeeds::from_paths(&users, &projects)?;

    let mut applicants = 0usize;
    let mut officers = 0usize;
    let mut managers = 0usize;
    for user in catalog.users() {
        match user.role {
            Role::Applicant(_) => applicants += 1,
            Role::Officer(_) => officers += 1,
            Role::Manager(_) => managers += 1,
        }
    }
    println!(
        "\nUsers: {} applicants, {} officers, {} managers",
        applicants, officers, managers
    );

    println!("\nProjects");
    for project in catalog.projects() {
        let hidden = if project.visible { "" } else { " [hidden]" };
        println!(
            "- {} ({}) window {} -> {}{}",
            project.name,
            project.neighborhood,
            project.window.opens_on,
            project.window.closes_on,
            hidden
        );
        for row in project.inventory.snapshot() {
            println!(
                "    {} flats: {} of {} remaining",
                row.category_label, row.remaining, row.total
            );
        }
        println!(
            "    roster {}/{} (manager {})",
            project.officers.len(),
            project.max_officer_slots,
            project.manager
        );
    }

    if write_snapshot {
        write_catalog(&snapshot, &catalog)?;
        println!("\nSnapshot written to {}", snapshot.display());
    }

    Ok(())
}
