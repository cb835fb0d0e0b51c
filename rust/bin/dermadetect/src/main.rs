//! `dermadetect`: the DermaDetect command-line client.
//!
//! Accounts, scans, reports, clinic search and the admin views, all against
//! a local data directory.

mod commands;
mod config;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use dermadetect::model::Role;
use dermadetect::DermaError;
use dermadetect_core::ServiceError;

use crate::commands::App;
use crate::config::CliConfig;

/// DermaDetect CLI tool.
#[derive(Parser, Debug)]
#[command(name = "dermadetect", about = "DermaDetect skin analysis demo")]
struct Cli {
    /// Path to config file (default: ~/.dermadetect/config.toml).
    #[arg(long = "config", global = true)]
    config: Option<String>,

    /// Data directory, overriding [storage] data_dir.
    #[arg(long = "data-dir", global = true)]
    data_dir: Option<String>,

    /// Output format: table or json.
    #[arg(long = "output", short = 'o', global = true, default_value = "table")]
    output: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a patient or student account and log in.
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// Password (not recommended; prompts when omitted).
        #[arg(long)]
        password: Option<String>,
        /// patient or student.
        #[arg(long, default_value = "patient")]
        role: Role,
        #[arg(long)]
        age: Option<u32>,
        #[arg(long)]
        gender: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        /// Relevant medical history.
        #[arg(long)]
        history: Option<String>,
    },

    /// Log in.
    Login {
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },

    /// Log out.
    Logout,

    /// Show the logged-in account.
    Whoami,

    /// Analyze a skin image and store the report.
    Scan {
        /// Path to a JPEG or PNG image.
        image: String,
    },

    /// List your reports, or export one as text.
    Reports {
        /// Report id to export.
        #[arg(long)]
        export: Option<u64>,
        /// Directory for the exported file (default: current directory).
        #[arg(long, default_value = ".")]
        out_dir: String,
    },

    /// Show the audit log (main admin only).
    Logs,

    /// Sub-admin management (main admin only).
    Staff {
        #[command(subcommand)]
        action: StaffAction,
    },

    /// List patients and students (admins only).
    Users,

    /// Browse anonymized case studies.
    Cases {
        /// Filter by condition, symptom, treatment or id.
        #[arg(long)]
        search: Option<String>,
    },

    /// Find dermatology clinics near a place or coordinate.
    Clinics {
        /// City or address.
        #[arg(long, conflicts_with_all = ["lat", "lon"])]
        query: Option<String>,
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
    },

    /// Book an appointment at a clinic.
    Book {
        #[arg(long)]
        clinic_id: String,
        #[arg(long)]
        clinic_name: String,
        /// YYYY-MM-DD.
        #[arg(long)]
        date: String,
        /// HH:MM.
        #[arg(long)]
        time: String,
    },

    /// List your appointments.
    Appointments,

    /// Show version.
    Version,
}

#[derive(Subcommand, Debug)]
enum StaffAction {
    /// Create a sub-admin.
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: Option<String>,
    },
    /// Delete a sub-admin by uid.
    Delete {
        uid: String,
    },
    /// List sub-admins.
    List,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let json = cli.output == "json";

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(e, json);
            ExitCode::FAILURE
        }
    }
}

/// Print a failure. Service errors carry a stable code, shown as
/// `{"code", "message"}` under `-o json`.
fn report_error(err: anyhow::Error, json: bool) {
    match err.downcast::<DermaError>() {
        Ok(e) => {
            let e = ServiceError::from(e);
            if json {
                println!("{}", e.to_json());
            } else {
                eprintln!("Error: {}", e);
            }
        }
        Err(other) => eprintln!("Error: {:#}", other),
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Commands::Version = cli.command {
        println!("dermadetect cli v{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config_path = cli
        .config
        .map(std::path::PathBuf::from)
        .unwrap_or_else(CliConfig::default_path);
    let config = CliConfig::load(&config_path)?;
    let app = App::open(&config, cli.data_dir.as_deref(), cli.output == "json")?;

    match cli.command {
        Commands::Register {
            name,
            email,
            password,
            role,
            age,
            gender,
            phone,
            history,
        } => {
            let password = commands::password(password, true)?;
            let profile = dermadetect::model::Profile {
                age,
                gender,
                phone,
                medical_history: history,
            };
            commands::account::register(&app, name, email, password, role, profile).await?;
        }

        Commands::Login { email, password } => {
            let email = match email {
                Some(e) => e,
                None => commands::prompt("Email: ")?,
            };
            let password = commands::password(password, false)?;
            commands::account::login(&app, &email, &password).await?;
        }

        Commands::Logout => commands::account::logout(&app)?,

        Commands::Whoami => commands::account::whoami(&app)?,

        Commands::Scan { image } => commands::scan::scan(&app, &image).await?,

        Commands::Reports { export, out_dir } => match export {
            Some(id) => commands::scan::export(&app, id, &out_dir).await?,
            None => commands::scan::reports(&app).await?,
        },

        Commands::Logs => commands::admin::logs(&app)?,

        Commands::Staff { action } => match action {
            StaffAction::Create {
                name,
                email,
                password,
            } => {
                let password = commands::password(password, true)?;
                commands::admin::create_staff(&app, name, email, password)?;
            }
            StaffAction::Delete { uid } => commands::admin::delete_staff(&app, &uid)?,
            StaffAction::List => commands::admin::list_staff(&app)?,
        },

        Commands::Users => commands::admin::users(&app)?,

        Commands::Cases { search } => commands::admin::cases(&app, search.as_deref()).await?,

        Commands::Clinics { query, lat, lon } => match (query, lat, lon) {
            (Some(q), _, _) => commands::clinic::by_query(&app, &q).await?,
            (None, Some(lat), Some(lon)) => commands::clinic::near(&app, lat, lon).await?,
            _ => anyhow::bail!("Provide --query <place> or --lat <lat> --lon <lon>."),
        },

        Commands::Book {
            clinic_id,
            clinic_name,
            date,
            time,
        } => commands::clinic::book(&app, &clinic_id, &clinic_name, &date, &time)?,

        Commands::Appointments => commands::clinic::appointments(&app)?,

        Commands::Version => {}
    }

    Ok(())
}
