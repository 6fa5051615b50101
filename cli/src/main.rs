mod render;

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use attendify_core::{
    AttendanceService, Breakdown, Config, FileKeyValueStore, GuidanceUseCase, ServiceOptions,
    SubjectId, UserType,
};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

type Service = AttendanceService<FileKeyValueStore>;

#[derive(Parser)]
#[command(name = "attendify")]
#[command(about = "Attendance tracker for school and college students", long_about = None)]
struct Cli {
    /// Directory holding the stored data (default: ~/.attendify)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Configuration file (default: ~/.attendify/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create your profile (usage: onboard "Full Name" 10-B --type school)
    Onboard {
        full_name: String,
        /// Class (school) or semester (college)
        class_or_semester: String,
        /// school or college
        #[arg(long = "type", short = 't')]
        user_type: String,
    },
    /// Show the profile and the current position
    Status,
    /// Show attendance statistics
    Stats,
    /// Delete all stored data
    Reset {
        /// Skip the confirmation
        #[arg(long)]
        yes: bool,
    },
    /// School mode: weekly Monday-Saturday attendance
    #[command(subcommand)]
    School(SchoolCommand),
    /// College mode: per-subject class counts
    #[command(subcommand)]
    College(CollegeCommand),
}

#[derive(Subcommand)]
enum SchoolCommand {
    /// Toggle a day (prefixes work: mon, w, sa)
    Toggle {
        day: String,
        /// Week to edit (default: current week)
        #[arg(long, short = 'w')]
        week: Option<u32>,
    },
    /// Start a new week and move to it
    AddWeek,
    /// Jump to a week
    Goto { week: u32 },
    /// Move to the next week
    Next,
    /// Move to the previous week
    Prev,
    /// Days attended before tracking started
    PreviousAttended {
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Working days before tracking started
    PreviousTotal {
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// List all weeks, latest first
    History,
}

#[derive(Subcommand)]
enum CollegeCommand {
    /// Add a subject with its current counts
    Add {
        name: String,
        #[arg(allow_hyphen_values = true)]
        total: String,
        #[arg(allow_hyphen_values = true)]
        attended: String,
    },
    /// Record an attended class (ID or unique ID prefix)
    Present { id: String },
    /// Record a missed class
    Absent { id: String },
    /// Remove a subject
    Delete { id: String },
    /// Set the minimum attendance goal (0-100)
    Goal {
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Set the number of extracurricular activities
    Eca {
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// List subjects
    Subjects,
    /// Classes you can skip or still need to attend
    Guidance,
}

fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_service(cli: &Cli, config: &Config) -> Result<Service> {
    let data_dir = match &cli.data_dir {
        Some(dir) => dir.clone(),
        None => config.data_dir()?,
    };
    let store = FileKeyValueStore::new(Some(data_dir))?;
    tracing::debug!(dir = %store.base_dir().display(), "using data directory");

    let options = ServiceOptions {
        enforce_count_invariants: config.enforce_count_invariants,
    };
    Ok(AttendanceService::with_options(store, options))
}

/// Accepts a full ID or a prefix matching exactly one subject.
fn resolve_subject(service: &Service, input: &str) -> Result<SubjectId> {
    let input = input.trim();
    let subjects = service.college().subjects();
    if let Some(exact) = subjects.iter().find(|s| s.id.as_str() == input) {
        return Ok(exact.id.clone());
    }

    let matches: Vec<&SubjectId> = subjects
        .iter()
        .filter(|s| !input.is_empty() && s.id.as_str().starts_with(input))
        .map(|s| &s.id)
        .collect();
    match matches.as_slice() {
        [id] => Ok((*id).clone()),
        [] => Err(anyhow!("No subject with ID '{}'", input)),
        _ => Err(anyhow!("ID prefix '{}' matches {} subjects", input, matches.len())),
    }
}

fn subject_name(service: &Service, id: &SubjectId) -> String {
    service
        .college()
        .subject(id)
        .map(|s| s.name.clone())
        .unwrap_or_else(|| id.to_string())
}

fn print_status(service: &Service) -> Result<()> {
    let Some(profile) = service.profile() else {
        println!("Not set up yet. Run `attendify onboard` to get started.");
        return Ok(());
    };
    render::print_profile(profile);

    match profile.user_type {
        UserType::School => {
            let school = service.school();
            render::print_week(school.current_week(), school.weeks().len());
            println!(
                "Overall: {}/{} days ({}%)",
                school.days_present(),
                school.total_days(),
                school.attendance_percentage()
            );
        }
        UserType::College => {
            let guidance = GuidanceUseCase::new(service).college_guidance()?;
            println!(
                "{} subject(s), {}% overall. {}",
                service.college().subjects().len(),
                guidance.percentage,
                guidance.standing.message()
            );
        }
    }
    Ok(())
}

fn run_school(service: &mut Service, command: SchoolCommand) -> Result<()> {
    match command {
        SchoolCommand::Toggle { day, week } => {
            let week_number = week.unwrap_or_else(|| service.school().current_week_number());
            if service.toggle_day_key(week_number, &day)? {
                if let Some(week) = service.school().week(week_number) {
                    render::print_week(week, service.school().weeks().len());
                }
            } else {
                println!("Week {} does not exist.", week_number);
            }
        }
        SchoolCommand::AddWeek => {
            let number = service.add_week()?;
            println!("Started week {}.", number);
        }
        SchoolCommand::Goto { week } => {
            service.set_current_week(week)?;
            render::print_week(service.school().current_week(), service.school().weeks().len());
        }
        SchoolCommand::Next => {
            if !service.next_week()? {
                println!("Already at the latest week.");
            }
            render::print_week(service.school().current_week(), service.school().weeks().len());
        }
        SchoolCommand::Prev => {
            if !service.previous_week()? {
                println!("Already at the first week.");
            }
            render::print_week(service.school().current_week(), service.school().weeks().len());
        }
        SchoolCommand::PreviousAttended { value } => {
            let n = service.set_previous_attended_text(&value)?;
            println!("Previously attended days: {}", n);
        }
        SchoolCommand::PreviousTotal { value } => {
            let n = service.set_previous_total_text(&value)?;
            println!("Previous working days: {}", n);
        }
        SchoolCommand::History => {
            render::print_history(&service.summary()?);
        }
    }
    Ok(())
}

fn run_college(service: &mut Service, command: CollegeCommand) -> Result<()> {
    match command {
        CollegeCommand::Add {
            name,
            total,
            attended,
        } => {
            let id = service.add_subject(&name, &total, &attended)?;
            println!("Subject added: {} (ID: {})", subject_name(service, &id), id);
        }
        CollegeCommand::Present { id } => {
            let id = resolve_subject(service, &id)?;
            service.mark_present(&id)?;
            if let Some(subject) = service.college().subject(&id) {
                println!(
                    "{}: {}/{} ({}%)",
                    subject.name,
                    subject.attended_classes,
                    subject.total_classes,
                    subject.percentage()
                );
            }
        }
        CollegeCommand::Absent { id } => {
            let id = resolve_subject(service, &id)?;
            service.mark_absent(&id)?;
            if let Some(subject) = service.college().subject(&id) {
                println!(
                    "{}: {}/{} ({}%)",
                    subject.name,
                    subject.attended_classes,
                    subject.total_classes,
                    subject.percentage()
                );
            }
        }
        CollegeCommand::Delete { id } => {
            let id = resolve_subject(service, &id)?;
            let name = subject_name(service, &id);
            if service.delete_subject(&id)? {
                println!("Deleted {}.", name);
            }
        }
        CollegeCommand::Goal { value } => {
            let goal = service.set_minimum_goal(&value)?;
            println!("Minimum goal set to {}%.", goal);
        }
        CollegeCommand::Eca { value } => {
            let n = service.set_eca_count_text(&value)?;
            println!("Extracurricular activities: {}", n);
        }
        CollegeCommand::Subjects => {
            let summary = service.summary()?;
            if let Breakdown::Subjects(subjects) = &summary.breakdown {
                render::print_subjects(subjects);
            }
        }
        CollegeCommand::Guidance => {
            let guidance = GuidanceUseCase::new(service).college_guidance()?;
            render::print_guidance(&guidance);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    init_logging(&config);

    let mut service = open_service(&cli, &config)?;

    match cli.command {
        Some(Commands::Onboard {
            full_name,
            class_or_semester,
            user_type,
        }) => {
            let user_type: UserType = user_type.parse()?;
            let profile = service.complete_onboarding(&full_name, &class_or_semester, user_type)?;
            println!("Welcome, {}!", profile.headline());
        }
        Some(Commands::Status) | None => print_status(&service)?,
        Some(Commands::Stats) => {
            if let Some(profile) = service.profile() {
                render::print_profile(profile);
            }
            render::print_summary(&service.summary()?);
        }
        Some(Commands::Reset { yes }) => {
            if !yes {
                println!("This deletes all attendance data. Re-run with --yes to confirm.");
                return Ok(());
            }
            service.reset();
            println!("All data cleared.");
        }
        Some(Commands::School(command)) => run_school(&mut service, command)?,
        Some(Commands::College(command)) => run_college(&mut service, command)?,
    }
    Ok(())
}
