//! CLI commands

use anyhow::{Context as _, Result};
use carelink_core::{
    AppointmentSlot, BookingConfirmation, BookingStatus, CareTipsRequest, CredentialStore,
    IntakeDraft, IntakeWizard, LoginForm, ProviderMatchQuery, RegistrationForm, UserProfile,
};
use carelink_http::{CareClient, ClientConfig};
use clap::Subcommand;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};

/// Everything a command needs once flags and config are resolved
pub struct Context {
    pub client: CareClient,
    pub config: ClientConfig,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and store the session locally
    Login {
        #[arg(long)]
        email: String,

        #[arg(long, env = "CARELINK_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the stored session
    Logout,

    /// Create an account
    Register {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long, env = "CARELINK_PASSWORD", hide_env_values = true)]
        password: String,

        /// Defaults to --password
        #[arg(long)]
        confirm_password: Option<String>,

        /// 10-digit phone number
        #[arg(long)]
        phone: Option<String>,
    },

    /// Show the logged-in user
    Me {
        /// Print the profile cached at login instead of asking the server
        #[arg(long)]
        cached: bool,
    },

    /// Symptom intake
    Intake {
        #[command(subcommand)]
        command: IntakeCommands,
    },

    /// Provider lookup
    Providers {
        #[command(subcommand)]
        command: ProviderCommands,
    },

    /// Ask for an AI care summary about a provider
    CareSummary {
        #[arg(long)]
        provider_name: String,

        #[arg(long)]
        specialty: String,

        /// Symptoms or concern to address
        #[arg(long)]
        question: String,
    },

    /// Appointment bookings
    Bookings {
        #[command(subcommand)]
        command: BookingCommands,
    },

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum IntakeCommands {
    /// Validate and submit an intake form stored as JSON
    Submit {
        /// Form fields in camelCase, as the web form names them
        #[arg(long)]
        file: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum ProviderCommands {
    /// Providers matching symptoms and filters
    Match {
        /// Repeat for each symptom
        #[arg(long = "symptom", required = true)]
        symptoms: Vec<String>,

        #[arg(long)]
        insurance: Option<String>,

        #[arg(long)]
        location: Option<String>,

        #[arg(long)]
        urgency: Option<String>,

        #[arg(long, default_value = "3")]
        limit: u32,
    },

    /// Every provider
    List,

    /// One provider by id
    Show { id: String },
}

#[derive(Subcommand)]
pub enum BookingCommands {
    /// Confirm an appointment with a provider
    Confirm {
        #[arg(long)]
        provider_id: String,

        /// YYYY-MM-DD
        #[arg(long)]
        date: String,

        /// HH:MM, 24-hour
        #[arg(long)]
        time: String,

        #[arg(long)]
        out_of_pocket_cost: Option<f64>,
    },

    /// Bookings of the logged-in user
    List,

    /// Every booking
    All,

    Cancel { id: String },

    Reschedule {
        id: String,

        /// YYYY-MM-DD
        #[arg(long)]
        date: String,

        /// HH:MM, 24-hour
        #[arg(long)]
        time: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective client configuration
    Show,
}

impl Commands {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        match self {
            Commands::Login { email, password } => {
                let request = LoginForm { email, password }.validate()?;
                let user = ctx.client.login(&request).await?;
                info!(email = %user.email, "login successful");
                print_json(&user)
            }
            Commands::Logout => ctx.client.logout().await.map_err(Into::into),
            Commands::Register {
                name,
                email,
                password,
                confirm_password,
                phone,
            } => {
                let form = RegistrationForm {
                    name,
                    email,
                    phone: phone.unwrap_or_default(),
                    confirm_password: confirm_password.unwrap_or_else(|| password.clone()),
                    password,
                };
                let request = form.validate()?;
                let user = ctx.client.register(&request).await?;
                info!(email = %user.email, "registration successful, log in to continue");
                print_json(&user)
            }
            Commands::Me { cached } => {
                let user = if cached {
                    ctx.client
                        .current_user()
                        .await?
                        .context("no cached profile, run `carelink login`")?
                } else {
                    ctx.client.me().await?
                };
                print_json(&user)
            }
            Commands::Intake { command } => command.execute(ctx).await,
            Commands::Providers { command } => command.execute(ctx).await,
            Commands::CareSummary {
                provider_name,
                specialty,
                question,
            } => {
                let summary = ctx
                    .client
                    .care_tips(&CareTipsRequest {
                        provider_name,
                        specialty,
                        question,
                    })
                    .await?;
                print_json(&serde_json::json!({
                    "why": summary.why(),
                    "expect": summary.expect(),
                    "sections": summary.sections,
                }))
            }
            Commands::Bookings { command } => command.execute(ctx).await,
            Commands::Config { command } => command.execute(ctx),
        }
    }
}

impl IntakeCommands {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        match self {
            IntakeCommands::Submit { file } => {
                let raw = tokio::fs::read_to_string(&file)
                    .await
                    .with_context(|| format!("failed to read {}", file.display()))?;
                let draft: IntakeDraft = serde_json::from_str(&raw)
                    .with_context(|| format!("{} is not a valid intake form", file.display()))?;

                let mut wizard = IntakeWizard::new(draft);
                while !wizard.is_last_step() {
                    let step = wizard.step();
                    wizard
                        .next()
                        .with_context(|| format!("step '{step}' is incomplete"))?;
                    debug!(step = %step, "intake step valid");
                }

                let user = current_user(ctx).await?;
                let submission = wizard.finish(&user.id)?;
                let record = ctx.client.submit_intake(&submission).await?;
                info!(user_id = %user.id, "intake submitted");
                print_json(&record)
            }
        }
    }
}

impl ProviderCommands {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        match self {
            ProviderCommands::Match {
                symptoms,
                insurance,
                location,
                urgency,
                limit,
            } => {
                let query = ProviderMatchQuery {
                    symptoms,
                    insurance,
                    location,
                    urgency,
                    limit,
                };
                let mut providers = ctx.client.match_providers(&query).await?;
                if providers.is_empty() {
                    info!("no matches, falling back to the full provider list");
                    providers = ctx.client.list_providers().await?;
                    providers.truncate(limit as usize);
                }
                print_json(&providers)
            }
            ProviderCommands::List => print_json(&ctx.client.list_providers().await?),
            ProviderCommands::Show { id } => print_json(&ctx.client.provider(&id).await?),
        }
    }
}

impl BookingCommands {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        match self {
            BookingCommands::Confirm {
                provider_id,
                date,
                time,
                out_of_pocket_cost,
            } => {
                let slot = AppointmentSlot::parse(&date, &time)?;
                let user = current_user(ctx).await?;
                let ack = ctx
                    .client
                    .confirm_booking(&BookingConfirmation {
                        user_id: user.id,
                        provider_id,
                        appointment_time: slot.to_wire(),
                        status: BookingStatus::Confirmed,
                        out_of_pocket_cost,
                    })
                    .await?;
                print_json(&ack)
            }
            BookingCommands::List => {
                let user = current_user(ctx).await?;
                print_json(&ctx.client.user_bookings(&user.id).await?)
            }
            BookingCommands::All => print_json(&ctx.client.all_bookings().await?),
            BookingCommands::Cancel { id } => print_json(&ctx.client.cancel_booking(&id).await?),
            BookingCommands::Reschedule { id, date, time } => {
                let slot = AppointmentSlot::parse(&date, &time)?;
                print_json(&ctx.client.reschedule_booking(&id, &slot).await?)
            }
        }
    }
}

impl ConfigCommands {
    pub fn execute(self, ctx: &Context) -> Result<()> {
        match self {
            ConfigCommands::Show => print_json(&ctx.config),
        }
    }
}

/// Cached profile, falling back to the server when login predates the cache
async fn current_user(ctx: &Context) -> Result<UserProfile> {
    if let Some(user) = ctx.client.current_user().await? {
        return Ok(user);
    }
    let user = ctx.client.me().await?;
    ctx.client.store().save_user(&user).await?;
    Ok(user)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
