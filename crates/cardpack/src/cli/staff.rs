use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;
use tabled::Tabled;

use cardpack_client::{CardKind, EntityRef, PortalClient, StaffMember, departments};

use crate::cli::export::{build_selection, out_dir, run_export, run_fetch};
use crate::config::Config;
use crate::ui::table::Formatter;

#[derive(Debug, Subcommand)]
pub enum StaffCmd {
    /// List the staff roster
    List(ListArgs),
    /// Download one staff ID card as a PDF
    Fetch(FetchArgs),
    /// Export selected staff ID cards into a dated ZIP
    Export(ExportArgs),
}

#[derive(Debug, clap::Args)]
pub struct ListArgs {
    /// Only staff of this department
    #[arg(long)]
    pub department: Option<String>,

    /// Free-text filter over name, designation, employee id and department
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(Debug, clap::Args)]
pub struct FetchArgs {
    /// Roster id of the staff member
    #[arg(long)]
    pub id: String,

    /// Output directory (default: configured output_dir)
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, clap::Args)]
pub struct ExportArgs {
    /// Export every member of the (filtered) roster
    #[arg(long, conflicts_with = "ids")]
    pub all: bool,

    /// Roster ids to export, in order; repeatable
    #[arg(long = "id")]
    pub ids: Vec<String>,

    /// Only staff of this department
    #[arg(long)]
    pub department: Option<String>,

    /// Free-text filter over name, designation, employee id and department
    #[arg(long)]
    pub search: Option<String>,

    /// Output directory (default: configured output_dir)
    #[arg(long)]
    pub out: Option<PathBuf>,
}

impl StaffCmd {
    pub async fn run(self, config: &Config) -> Result<()> {
        let client = PortalClient::new(&config.base_url, config.token.as_str())?;
        match self {
            StaffCmd::List(args) => list(&client, args).await,
            StaffCmd::Fetch(args) => fetch(&client, config, args).await,
            StaffCmd::Export(args) => export(&client, config, args).await,
        }
    }
}

fn apply_filters(
    staff: Vec<StaffMember>,
    department: Option<&str>,
    search: Option<&str>,
) -> Vec<StaffMember> {
    staff
        .into_iter()
        .filter(|m| department.is_none_or(|d| m.department.as_deref() == Some(d)))
        .filter(|m| search.is_none_or(|s| m.matches_search(s)))
        .collect()
}

#[derive(Tabled)]
struct StaffRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Designation")]
    designation: String,
    #[tabled(rename = "Employee ID")]
    employee_id: String,
    #[tabled(rename = "Department")]
    department: String,
}

impl From<&StaffMember> for StaffRow {
    fn from(member: &StaffMember) -> Self {
        let field = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
        Self {
            id: member.id.clone(),
            name: member.name.clone(),
            designation: field(&member.designation),
            employee_id: field(&member.employee_id),
            department: field(&member.department),
        }
    }
}

async fn list(client: &PortalClient, args: ListArgs) -> Result<()> {
    let staff = client.list_staff().await?;
    let all_departments = departments(&staff);
    let staff = apply_filters(staff, args.department.as_deref(), args.search.as_deref());

    let rows: Vec<StaffRow> = staff.iter().map(StaffRow::from).collect();
    let count = rows.len();
    let table = Formatter::default()
        .header("Staff roster")
        .footer(format!("{count} member(s)"))
        .build(rows);
    println!("{table}");

    if !all_departments.is_empty() {
        println!("departments: {}", all_departments.join(", "));
    }
    Ok(())
}

async fn fetch(client: &PortalClient, config: &Config, args: FetchArgs) -> Result<()> {
    let staff = client.list_staff().await?;
    let member = staff
        .iter()
        .find(|m| m.id == args.id)
        .with_context(|| format!("no staff member with id '{}' in the roster", args.id))?;

    run_fetch(
        client,
        CardKind::Staff,
        EntityRef::from(member),
        out_dir(&args.out, config),
    )
    .await
}

async fn export(client: &PortalClient, config: &Config, args: ExportArgs) -> Result<()> {
    let staff = client.list_staff().await?;
    let staff = apply_filters(staff, args.department.as_deref(), args.search.as_deref());
    let roster: Vec<EntityRef> = staff.iter().map(EntityRef::from).collect();

    let selection = build_selection(&args.ids, args.all, &roster)?;
    run_export(
        client,
        CardKind::Staff,
        &roster,
        selection,
        out_dir(&args.out, config),
    )
    .await
}
