use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;
use tabled::Tabled;

use cardpack_client::{CardKind, EntityRef, PortalClient, Student, StudentFilter};

use crate::cli::export::{build_selection, out_dir, run_export, run_fetch};
use crate::config::Config;
use crate::ui::table::Formatter;

#[derive(Debug, Subcommand)]
pub enum StudentsCmd {
    /// List students eligible for ID cards
    List(ListArgs),
    /// Download one student ID card as a PDF
    Fetch(FetchArgs),
    /// Export selected student ID cards into a dated ZIP
    Export(ExportArgs),
}

#[derive(Debug, clap::Args)]
pub struct ListArgs {
    /// Only students of this class
    #[arg(long)]
    pub class_id: Option<String>,

    /// Only students of this section
    #[arg(long)]
    pub section_id: Option<String>,

    /// Free-text filter over name, father's name, roll and admission numbers
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(Debug, clap::Args)]
pub struct FetchArgs {
    /// Roster id of the student
    #[arg(long)]
    pub id: String,

    /// Output directory (default: configured output_dir)
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, clap::Args)]
pub struct ExportArgs {
    /// Export every student of the (filtered) roster
    #[arg(long, conflicts_with = "ids")]
    pub all: bool,

    /// Roster ids to export, in order; repeatable
    #[arg(long = "id")]
    pub ids: Vec<String>,

    /// Only students of this class
    #[arg(long)]
    pub class_id: Option<String>,

    /// Only students of this section
    #[arg(long)]
    pub section_id: Option<String>,

    /// Free-text filter over name, father's name, roll and admission numbers
    #[arg(long)]
    pub search: Option<String>,

    /// Output directory (default: configured output_dir)
    #[arg(long)]
    pub out: Option<PathBuf>,
}

impl StudentsCmd {
    pub async fn run(self, config: &Config) -> Result<()> {
        let client = PortalClient::new(&config.base_url, config.token.as_str())?;
        match self {
            StudentsCmd::List(args) => list(&client, args).await,
            StudentsCmd::Fetch(args) => fetch(&client, config, args).await,
            StudentsCmd::Export(args) => export(&client, config, args).await,
        }
    }
}

fn roster_filter(class_id: &Option<String>, section_id: &Option<String>) -> StudentFilter {
    StudentFilter {
        class_id: class_id.clone(),
        section_id: section_id.clone(),
    }
}

fn apply_search(students: Vec<Student>, search: Option<&str>) -> Vec<Student> {
    students
        .into_iter()
        .filter(|s| search.is_none_or(|term| s.matches_search(term)))
        .collect()
}

#[derive(Tabled)]
struct StudentRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Father")]
    father: String,
    #[tabled(rename = "Class")]
    class: String,
    #[tabled(rename = "Section")]
    section: String,
    #[tabled(rename = "Roll")]
    roll: String,
}

impl From<&Student> for StudentRow {
    fn from(student: &Student) -> Self {
        let field = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
        Self {
            id: student.id.clone(),
            name: student.name.clone(),
            father: field(&student.father_name),
            class: field(&student.class_name),
            section: field(&student.section_name),
            // roll number, falling back to the admission number
            roll: student
                .roll_no
                .clone()
                .or_else(|| student.admission_no.clone())
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

async fn list(client: &PortalClient, args: ListArgs) -> Result<()> {
    let students = client
        .list_students(&roster_filter(&args.class_id, &args.section_id))
        .await?;
    let students = apply_search(students, args.search.as_deref());

    let rows: Vec<StudentRow> = students.iter().map(StudentRow::from).collect();
    let count = rows.len();
    let table = Formatter::default()
        .header("Student roster")
        .footer(format!("{count} student(s)"))
        .build(rows);
    println!("{table}");
    Ok(())
}

async fn fetch(client: &PortalClient, config: &Config, args: FetchArgs) -> Result<()> {
    let students = client.list_students(&StudentFilter::default()).await?;
    let student = students
        .iter()
        .find(|s| s.id == args.id)
        .with_context(|| format!("no student with id '{}' in the roster", args.id))?;

    run_fetch(
        client,
        CardKind::Student,
        EntityRef::from(student),
        out_dir(&args.out, config),
    )
    .await
}

async fn export(client: &PortalClient, config: &Config, args: ExportArgs) -> Result<()> {
    let students = client
        .list_students(&roster_filter(&args.class_id, &args.section_id))
        .await?;
    let students = apply_search(students, args.search.as_deref());
    let roster: Vec<EntityRef> = students.iter().map(EntityRef::from).collect();

    let selection = build_selection(&args.ids, args.all, &roster)?;
    run_export(
        client,
        CardKind::Student,
        &roster,
        selection,
        out_dir(&args.out, config),
    )
    .await
}
