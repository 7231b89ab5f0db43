//! CLI entry and dispatch.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use lms_core::config;
use lms_core::http::AuthClient;
use lms_types::{
    CourseDraft, CourseFilters, CourseLevel, CourseStatus, NewUser, PriceFilter, RegisterData,
    TimeRange, UserQuery,
};

mod commands;
mod effects;

use effects::TerminalEffects;

#[derive(Parser)]
#[command(name = "lms")]
#[command(version)]
#[command(about = "Learning platform client: courses, enrollments and certificates")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Print raw JSON instead of formatted output
    #[arg(long, global = true)]
    json: bool,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Log in and store the session
    Login {
        /// Use the admin login endpoint (refuses non-admin accounts)
        #[arg(long)]
        admin: bool,
        #[arg(short, long)]
        username: String,
        #[arg(short, long, env = "LMS_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account and store the session
    Register {
        /// Create an admin account
        #[arg(long)]
        admin: bool,
        #[command(flatten)]
        account: RegisterArgs,
    },

    /// End the session (server-side and local)
    Logout {
        /// Revoke every session of this account, not just this one
        #[arg(long)]
        all: bool,
    },

    /// Show the signed-in user
    Whoami,

    /// Browse and manage the course catalog
    Courses {
        #[command(subcommand)]
        command: CourseCommands,
    },

    /// Manage your enrollments
    Enrollments {
        #[command(subcommand)]
        command: EnrollmentCommands,
    },

    /// List, verify and generate certificates
    Certificates {
        #[command(subcommand)]
        command: CertificateCommands,
    },

    /// Admin dashboards, maintenance and user accounts
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Args, Debug, Clone)]
struct RegisterArgs {
    #[arg(short, long)]
    username: String,
    #[arg(short, long)]
    email: String,
    #[arg(short, long, env = "LMS_PASSWORD", hide_env_values = true)]
    password: String,
    /// Defaults to the password
    #[arg(long)]
    confirm_password: Option<String>,
    #[arg(long, default_value = "")]
    first_name: String,
    #[arg(long, default_value = "")]
    last_name: String,
    #[arg(long, default_value = "")]
    phone: String,
    #[arg(long, default_value = "")]
    department: String,
}

/// Catalog filters; unset flags are not sent.
#[derive(clap::Args, Debug, Clone, Default)]
struct CourseFilterArgs {
    /// Category id or slug
    #[arg(long)]
    category: Option<String>,
    /// beginner, intermediate or advanced
    #[arg(long)]
    level: Option<CourseLevel>,
    /// free or paid
    #[arg(long)]
    price: Option<PriceFilter>,
    #[arg(long, value_name = "RATING")]
    min_rating: Option<f64>,
    #[arg(short, long)]
    search: Option<String>,
    /// Sort field, e.g. `-average_rating` or `price`
    #[arg(long)]
    ordering: Option<String>,
    #[arg(long)]
    page: Option<u32>,
    #[arg(long)]
    page_size: Option<u32>,
}

impl From<CourseFilterArgs> for CourseFilters {
    fn from(args: CourseFilterArgs) -> Self {
        CourseFilters {
            category: args.category,
            level: args.level,
            price: args.price,
            min_rating: args.min_rating,
            search: args.search,
            ordering: args.ordering,
            page: args.page,
            page_size: args.page_size,
        }
    }
}

#[derive(clap::Subcommand)]
enum CourseCommands {
    /// List courses
    List {
        #[command(flatten)]
        filters: CourseFilterArgs,
    },
    /// Show a course with its modules
    Show {
        /// Course id or slug
        #[arg(value_name = "ID_OR_SLUG")]
        course: String,
    },
    /// List course categories
    Categories,
    /// Create a course
    Create {
        #[arg(long)]
        title: String,
        #[command(flatten)]
        fields: CourseFieldArgs,
    },
    /// Change fields of a course; unset flags are left as they are
    Update {
        #[arg(value_name = "COURSE_ID")]
        id: u64,
        #[arg(long)]
        title: Option<String>,
        #[command(flatten)]
        fields: CourseFieldArgs,
    },
    /// Delete a course
    Delete {
        #[arg(value_name = "COURSE_ID")]
        id: u64,
    },
}

/// Course fields shared by create and update.
#[derive(clap::Args, Debug, Clone, Default)]
struct CourseFieldArgs {
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    short_description: Option<String>,
    /// Category id
    #[arg(long)]
    category: Option<u64>,
    /// beginner, intermediate or advanced
    #[arg(long)]
    level: Option<CourseLevel>,
    /// draft, published or archived
    #[arg(long)]
    status: Option<CourseStatus>,
    /// Decimal price, e.g. 49.00
    #[arg(long)]
    price: Option<String>,
    #[arg(long)]
    free: Option<bool>,
    #[arg(long)]
    duration_hours: Option<f64>,
    #[arg(long)]
    language: Option<String>,
    #[arg(long)]
    cpd_points: Option<u32>,
}

impl CourseFieldArgs {
    fn into_draft(self, title: Option<String>) -> CourseDraft {
        CourseDraft {
            title,
            description: self.description,
            short_description: self.short_description,
            category: self.category,
            level: self.level,
            status: self.status,
            price: self.price,
            is_free: self.free,
            duration_hours: self.duration_hours,
            language: self.language,
            is_cpd_accredited: self.cpd_points.map(|points| points > 0),
            cpd_points: self.cpd_points,
        }
    }
}

#[derive(clap::Subcommand)]
enum EnrollmentCommands {
    /// List your enrollments
    List,
    /// Enroll in a course
    Enroll {
        #[arg(value_name = "COURSE_ID")]
        course: u64,
    },
    /// Mark a lesson completed
    Complete {
        #[arg(value_name = "ENROLLMENT_ID")]
        enrollment: u64,
        #[arg(value_name = "LESSON_ID")]
        lesson: u64,
    },
    /// List your attempts at a quiz
    QuizAttempts {
        #[arg(value_name = "QUIZ_ID")]
        quiz: u64,
    },
}

#[derive(clap::Subcommand)]
enum CertificateCommands {
    /// List your certificates
    List,
    /// Show a certificate and its download link
    Show {
        #[arg(value_name = "CERTIFICATE_ID")]
        id: u64,
    },
    /// Check that a certificate is valid
    Verify {
        #[arg(value_name = "CERTIFICATE_ID")]
        id: u64,
    },
    /// Issue the certificate for a completed enrollment
    Generate {
        #[arg(value_name = "ENROLLMENT_ID")]
        enrollment: u64,
    },
}

#[derive(clap::Subcommand)]
enum AdminCommands {
    /// Platform and user statistics
    Stats,
    /// Server health counters
    Metrics,
    /// Recent audit log entries
    Activity {
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        offset: Option<u32>,
    },
    /// Sign-up trend and course popularity
    Analytics {
        /// today, week, month or year
        #[arg(long, default_value = "week")]
        range: TimeRange,
    },
    /// Start a database backup
    Backup,
    /// Clear the server cache
    ClearCache,
    /// Manage user accounts
    Users {
        #[command(subcommand)]
        command: UserCommands,
    },
}

#[derive(clap::Subcommand)]
enum UserCommands {
    /// List accounts
    List {
        #[arg(short, long)]
        search: Option<String>,
        /// Only admin accounts
        #[arg(long)]
        admins: bool,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        page_size: Option<u32>,
    },
    /// Show an account
    Show {
        #[arg(value_name = "USER_ID")]
        id: u64,
    },
    /// Create an account
    Create {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long, env = "LMS_NEW_USER_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
        #[arg(long)]
        department: Option<String>,
        /// Grant admin privileges
        #[arg(long)]
        admin: bool,
    },
    /// Delete an account
    Delete {
        #[arg(value_name = "USER_ID")]
        id: u64,
    },
    /// Allow an account to log in again
    Activate {
        #[arg(value_name = "USER_ID")]
        id: u64,
    },
    /// Block an account from logging in
    Deactivate {
        #[arg(value_name = "USER_ID")]
        id: u64,
    },
    /// Change an account's password
    Password {
        #[arg(value_name = "USER_ID")]
        id: u64,
        #[arg(long, env = "LMS_CURRENT_PASSWORD", hide_env_values = true)]
        current: String,
        #[arg(long = "new", env = "LMS_NEW_PASSWORD", hide_env_values = true)]
        new_password: String,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Set the API base URL
    SetUrl {
        #[arg(value_name = "URL")]
        url: String,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = config::Config::load().context("load config")?;
    let _log_guard = crate::logging::init(&config);

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
    rt.block_on(async move { dispatch(cli, &config).await })
}

async fn dispatch(cli: Cli, config: &config::Config) -> Result<()> {
    let Cli { command, json } = cli;

    match command {
        Commands::Config { command } => config_command(command),
        command => {
            let client = AuthClient::from_config(config, Arc::new(TerminalEffects))
                .context("initialize API client")?;
            api_command(&client, commands::Output { json }, command).await
        }
    }
}

fn config_command(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Path => {
            commands::config::path();
            Ok(())
        }
        ConfigCommands::Init => commands::config::init(),
        ConfigCommands::SetUrl { url } => commands::config::set_url(&url),
    }
}

async fn api_command(client: &AuthClient, out: commands::Output, command: Commands) -> Result<()> {
    match command {
        Commands::Login {
            admin,
            username,
            password,
        } => commands::auth::login(client, out, admin, username, password).await,
        Commands::Register { admin, account } => {
            commands::auth::register(client, out, admin, account.into()).await
        }
        Commands::Logout { all } => commands::auth::logout(client, all).await,
        Commands::Whoami => commands::auth::whoami(client, out).await,

        Commands::Courses { command } => match command {
            CourseCommands::List { filters } => {
                commands::courses::list(client, out, &filters.into()).await
            }
            CourseCommands::Show { course } => commands::courses::show(client, out, &course).await,
            CourseCommands::Categories => commands::courses::categories(client, out).await,
            CourseCommands::Create { title, fields } => {
                commands::courses::create(client, out, &fields.into_draft(Some(title))).await
            }
            CourseCommands::Update { id, title, fields } => {
                commands::courses::update(client, out, id, &fields.into_draft(title)).await
            }
            CourseCommands::Delete { id } => commands::courses::delete(client, id).await,
        },

        Commands::Enrollments { command } => match command {
            EnrollmentCommands::List => commands::enrollments::list(client, out).await,
            EnrollmentCommands::Enroll { course } => {
                commands::enrollments::enroll(client, out, course).await
            }
            EnrollmentCommands::Complete { enrollment, lesson } => {
                commands::enrollments::complete(client, out, enrollment, lesson).await
            }
            EnrollmentCommands::QuizAttempts { quiz } => {
                commands::enrollments::quiz_attempts(client, out, quiz).await
            }
        },

        Commands::Certificates { command } => match command {
            CertificateCommands::List => commands::certificates::list(client, out).await,
            CertificateCommands::Show { id } => commands::certificates::show(client, out, id).await,
            CertificateCommands::Verify { id } => {
                commands::certificates::verify(client, out, id).await
            }
            CertificateCommands::Generate { enrollment } => {
                commands::certificates::generate(client, out, enrollment).await
            }
        },

        Commands::Admin { command } => match command {
            AdminCommands::Stats => commands::admin::stats(client, out).await,
            AdminCommands::Metrics => commands::admin::metrics(client, out).await,
            AdminCommands::Activity { limit, offset } => {
                commands::admin::activity(client, out, limit, offset).await
            }
            AdminCommands::Analytics { range } => {
                commands::admin::analytics(client, out, range).await
            }
            AdminCommands::Backup => commands::admin::backup(client, out).await,
            AdminCommands::ClearCache => commands::admin::clear_cache(client, out).await,
            AdminCommands::Users { command } => user_command(client, out, command).await,
        },

        Commands::Config { command } => config_command(command),
    }
}

async fn user_command(client: &AuthClient, out: commands::Output, command: UserCommands) -> Result<()> {
    match command {
        UserCommands::List {
            search,
            admins,
            page,
            page_size,
        } => {
            let query = UserQuery {
                search,
                is_admin: admins.then_some(true),
                page,
                page_size,
            };
            commands::users::list(client, out, &query).await
        }
        UserCommands::Show { id } => commands::users::show(client, out, id).await,
        UserCommands::Create {
            username,
            email,
            password,
            first_name,
            last_name,
            department,
            admin,
        } => {
            let user = NewUser {
                username,
                email,
                password,
                first_name,
                last_name,
                department,
                is_admin: admin,
            };
            commands::users::create(client, out, &user).await
        }
        UserCommands::Delete { id } => commands::users::delete(client, id).await,
        UserCommands::Activate { id } => commands::users::set_active(client, out, id, true).await,
        UserCommands::Deactivate { id } => {
            commands::users::set_active(client, out, id, false).await
        }
        UserCommands::Password {
            id,
            current,
            new_password,
        } => commands::users::change_password(client, id, current, new_password).await,
    }
}

impl From<RegisterArgs> for RegisterData {
    fn from(args: RegisterArgs) -> Self {
        let confirm_password = args
            .confirm_password
            .unwrap_or_else(|| args.password.clone());
        RegisterData {
            username: args.username,
            email: args.email,
            password: args.password,
            confirm_password,
            first_name: args.first_name,
            last_name: args.last_name,
            phone: args.phone,
            department: args.department,
        }
    }
}
