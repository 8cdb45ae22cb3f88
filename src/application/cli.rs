use std::io;
use std::path;
use std::sync::Arc;

use anyhow::bail;
use anyhow::Result;
use clap::builder::PossibleValuesParser;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
use clap::ArgMatches;
use clap::Command;
use clap_complete::generate;
use clap_complete::Generator;
use clap_complete::Shell;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Password;
use strum::VariantNames;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use yansi::Paint;

use crate::application::pages::PageLoader;
use crate::application::pages::Pages;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Actor;
use crate::domain::models::AuthState;
use crate::domain::models::BackendName;
use crate::domain::models::FieldType;
use crate::domain::models::Identity;
use crate::domain::models::WorkflowRun;
use crate::domain::models::WorkflowStatus;
use crate::domain::models::WorkflowType;
use crate::domain::services::ActorService;
use crate::domain::services::Catalog;
use crate::domain::services::ChatService;
use crate::domain::services::ImageGenerationService;
use crate::domain::services::KeyService;
use crate::domain::services::Navigator;
use crate::domain::services::Profiles;
use crate::domain::services::ProviderMetadataService;
use crate::domain::services::QueryCache;
use crate::domain::services::WorkflowService;

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
    std::process::exit(0);
}

/// Caller identity taken from config. Blank means anonymous.
pub fn identity() -> Identity {
    return Identity::new(&Config::get(ConfigKey::Identity));
}

struct Context {
    identity: Identity,
    actor: Actor,
    cache: Arc<QueryCache>,
}

async fn connect() -> Result<Context> {
    let identity = identity();
    let actor = ActorService::default().connect(&identity).await?;

    return Ok(Context {
        identity,
        actor,
        cache: Arc::new(QueryCache::default()),
    });
}

fn require_provider(provider_id: &str) -> Result<()> {
    if Catalog::by_id(provider_id).is_none() {
        bail!(format!("Provider not found: {provider_id}"));
    }

    return Ok(());
}

fn status_paint(status: &WorkflowStatus) -> Paint<String> {
    let label = status.label().to_string();
    match status {
        WorkflowStatus::Success => return Paint::green(label),
        WorkflowStatus::Failed(_) => return Paint::red(label),
        _ => return Paint::yellow(label),
    }
}

fn print_runs(runs: &[WorkflowRun]) {
    if runs.is_empty() {
        println!("No runs yet.");
        return;
    }

    for run in runs {
        println!("{} {}", status_paint(&run.status), run.id);
        println!("{}", Pages::run_line(run));
    }
}

/// Parses `key=value` pairs on top of the provider's defaults. Values for
/// number fields are sent as JSON numbers.
fn build_inputs(
    provider_id: &str,
    pairs: Vec<&String>,
) -> Result<serde_json::Map<String, serde_json::Value>> {
    let provider = match Catalog::by_id(provider_id) {
        Some(provider) => provider,
        None => bail!(format!("Provider not found: {provider_id}")),
    };

    let mut inputs = Catalog::default_inputs(provider);
    for pair in pairs {
        let (key, val) = match pair.split_once('=') {
            Some((key, val)) => (key.trim(), val.trim()),
            None => bail!(format!("Input {pair} must be formatted as key=value")),
        };

        let is_number = provider.option_fields.iter().any(|field| {
            return field.id == key && field.field_type == FieldType::Number;
        });

        if is_number {
            if let Ok(num) = val.parse::<f64>() {
                inputs.insert(key.to_string(), serde_json::json!(num));
                continue;
            }
        }

        inputs.insert(key.to_string(), serde_json::Value::String(val.to_string()));
    }

    return Ok(inputs);
}

async fn create_config_file() -> Result<()> {
    let config_file_path_str = Config::default(ConfigKey::ConfigFile);
    let config_file_path = path::PathBuf::from(&config_file_path_str);
    if config_file_path.exists() {
        bail!(format!(
            "Config file already exists at {config_file_path_str}"
        ));
    }

    if let Some(parent) = config_file_path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    let mut file = fs::File::create(config_file_path.clone()).await?;
    file.write_all(Config::serialize_default(build()).as_bytes())
        .await?;

    println!("Created default config file at {config_file_path_str}");
    return Ok(());
}

fn arg_provider() -> Arg {
    return Arg::new("provider")
        .help("Provider ID, as listed by `empire providers list`.")
        .required(true);
}

fn subcommand_completions() -> Command {
    return Command::new("completions")
        .about("Generates shell completions.")
        .arg(
            clap::Arg::new("shell")
                .short('s')
                .long("shell")
                .help("Which shell to generate completions for.")
                .action(ArgAction::Set)
                .value_parser(value_parser!(Shell))
                .required(true),
        );
}

fn subcommand_config() -> Command {
    return Command::new("config")
        .about("Configuration file options.")
        .subcommand(
            Command::new("create").about("Saves the default config file to the configuration file path. This command will fail if the file exists already.")
        )
        .subcommand(
            Command::new("default").about("Outputs the default configuration file to stdout.")
        )
        .subcommand(
            Command::new("path").about("Returns the default path for the configuration file.")
        );
}

fn subcommand_providers() -> Command {
    return Command::new("providers")
        .about("Browse the provider catalog and its backend registry.")
        .arg_required_else_help(true)
        .subcommand(Command::new("list").about("List every provider in the catalog."))
        .subcommand(
            Command::new("show")
                .about("Show a provider's capabilities, options, and default inputs.")
                .arg(
                    Arg::new("provider")
                        .help("Provider ID or name.")
                        .required(true),
                ),
        )
        .subcommand(Command::new("sync").about("Register the catalog with the backend."))
        .subcommand(Command::new("registered").about("List providers registered with the backend."));
}

fn subcommand_keys() -> Command {
    return Command::new("keys")
        .about("Manage provider API keys.")
        .arg_required_else_help(true)
        .subcommand(
            Command::new("set")
                .about("Save or replace the API key for a provider. Prompts for the key when --key is omitted.")
                .arg(arg_provider())
                .arg(
                    Arg::new("key")
                        .short('k')
                        .long("key")
                        .num_args(1)
                        .help("API key value."),
                ),
        )
        .subcommand(
            Command::new("status")
                .about("Show which providers have a key configured.")
                .arg(Arg::new("provider").help("Only check this provider.")),
        );
}

fn subcommand_chat() -> Command {
    return Command::new("chat")
        .about("Provider chat logs.")
        .arg_required_else_help(true)
        .subcommand(
            Command::new("send")
                .about("Append a message to a provider's chat log.")
                .arg(arg_provider())
                .arg(Arg::new("message").help("Message content.").required(true)),
        )
        .subcommand(
            Command::new("history")
                .about("Print the latest messages of a provider's chat log.")
                .arg(arg_provider()),
        );
}

fn subcommand_run() -> Command {
    return Command::new("run")
        .about("Execute a workflow for a provider and wait for it to finish.")
        .arg(arg_provider())
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .action(ArgAction::Append)
                .help("Workflow input as key=value, e.g. -i prompt=\"a red fox\". Can be repeated."),
        )
        .arg(
            Arg::new("workflow-type")
                .short('w')
                .long("workflow-type")
                .num_args(1)
                .help("Workflow to run. Defaults to the provider's own workflow type.")
                .value_parser(PossibleValuesParser::new(WorkflowType::VARIANTS)),
        );
}

fn subcommand_runs() -> Command {
    let arg_run_id = Arg::new("run-id").help("Workflow run ID.").required(true);

    return Command::new("runs")
        .about("Inspect and manage workflow runs.")
        .arg_required_else_help(true)
        .subcommand(
            Command::new("list")
                .about("List runs for a provider, newest first.")
                .arg(arg_provider()),
        )
        .subcommand(
            Command::new("watch")
                .about("Poll a provider's runs until none are pending or running.")
                .arg(arg_provider()),
        )
        .subcommand(
            Command::new("cancel")
                .about("Cancel a pending or running run.")
                .arg(arg_provider())
                .arg(arg_run_id),
        )
        .subcommand(
            Command::new("clear-pending")
                .about("Cancel every pending run for a provider.")
                .arg(arg_provider()),
        );
}

fn subcommand_slots() -> Command {
    return Command::new("slots")
        .about("Custom provider slots.")
        .arg_required_else_help(true)
        .subcommand(Command::new("list").about("List custom slots with their display names."))
        .subcommand(
            Command::new("rename")
                .about("Set the display name of a custom slot.")
                .arg(Arg::new("slot").help("Slot ID, e.g. custom-slot-1.").required(true))
                .arg(Arg::new("name").help("New display name.").required(true)),
        );
}

fn subcommand_profile() -> Command {
    return Command::new("profile")
        .about("Caller profile.")
        .arg_required_else_help(true)
        .subcommand(Command::new("show").about("Show the current identity, role, and display name."))
        .subcommand(
            Command::new("set-name")
                .about("Set a local display name, used when the backend has no profile.")
                .arg(Arg::new("name").help("Display name.").required(true)),
        )
        .subcommand(Command::new("clear-name").about("Remove the local display name."));
}

pub fn build() -> Command {
    let about = format!(
        "{}\n\nVersion: {}\nCommit: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
        env!("VERGEN_GIT_DESCRIBE")
    );

    return Command::new("empire")
        .about(about)
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .arg_required_else_help(true)
        .subcommand(subcommand_providers())
        .subcommand(
            Command::new("open")
                .about("Render a page of the command center, e.g. /, /vault, /providers/fal-ai.")
                .arg(Arg::new("path").help("Page path.").default_value("/")),
        )
        .subcommand(subcommand_keys())
        .subcommand(subcommand_chat())
        .subcommand(subcommand_run())
        .subcommand(subcommand_runs())
        .subcommand(subcommand_slots())
        .subcommand(subcommand_profile())
        .subcommand(subcommand_config())
        .subcommand(subcommand_completions())
        .subcommand(Command::new("manpages").about("Generates manpages and outputs to stdout."))
        .arg(
            Arg::new(ConfigKey::Backend.to_string())
                .short('b')
                .long(ConfigKey::Backend.to_string())
                .env("EMPIRE_BACKEND")
                .num_args(1)
                .help(format!(
                    "Backend implementation to talk to. The memory backend keeps its data for a single invocation only and grants admin to the admin token. [default: {}]",
                    Config::default(ConfigKey::Backend)
                ))
                .value_parser(PossibleValuesParser::new(BackendName::VARIANTS))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::BackendURL.to_string())
                .long(ConfigKey::BackendURL.to_string())
                .env("EMPIRE_BACKEND_URL")
                .num_args(1)
                .help(format!("Backend gateway URL when using the http backend. [default: {}]", Config::default(ConfigKey::BackendURL)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::BackendTimeout.to_string())
                .long(ConfigKey::BackendTimeout.to_string())
                .env("EMPIRE_BACKEND_TIMEOUT")
                .num_args(1)
                .help(format!("Time to wait in milliseconds before timing out when health checking the backend. [default: {}]", Config::default(ConfigKey::BackendTimeout)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::ConnectRetries.to_string())
                .long(ConfigKey::ConnectRetries.to_string())
                .env("EMPIRE_CONNECT_RETRIES")
                .num_args(1)
                .help(format!("Extra attempts when the backend cannot be reached. [default: {}]", Config::default(ConfigKey::ConnectRetries)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::ConnectRetryDelay.to_string())
                .long(ConfigKey::ConnectRetryDelay.to_string())
                .env("EMPIRE_CONNECT_RETRY_DELAY")
                .num_args(1)
                .help(format!("Milliseconds between backend connection attempts. [default: {}]", Config::default(ConfigKey::ConnectRetryDelay)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::Identity.to_string())
                .short('u')
                .long(ConfigKey::Identity.to_string())
                .env("EMPIRE_IDENTITY")
                .num_args(1)
                .help("Principal issued by your identity provider. Leave empty to act anonymously.")
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::AdminToken.to_string())
                .long(ConfigKey::AdminToken.to_string())
                .env("EMPIRE_ADMIN_TOKEN")
                .num_args(1)
                .hide_env_values(true)
                .help("Admin secret, consumed once when connecting to the backend.")
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::OutputDir.to_string())
                .short('o')
                .long(ConfigKey::OutputDir.to_string())
                .env("EMPIRE_OUTPUT_DIR")
                .num_args(1)
                .help(format!("Directory generated artifacts are saved to. [default: {}]", Config::default(ConfigKey::OutputDir)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::PollInterval.to_string())
                .long(ConfigKey::PollInterval.to_string())
                .env("EMPIRE_POLL_INTERVAL")
                .num_args(1)
                .help(format!("Milliseconds between refreshes while runs are pending or running. [default: {}]", Config::default(ConfigKey::PollInterval)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::ConfigFile.to_string())
                .short('c')
                .long(ConfigKey::ConfigFile.to_string())
                .env("EMPIRE_CONFIG_FILE")
                .num_args(1)
                .help(format!("Path to configuration file [default: {}]", Config::default(ConfigKey::ConfigFile)))
                .global(true)
        );
}

async fn handle_providers(matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("list", _)) => {
            for provider in Catalog::list() {
                let workflow = provider
                    .workflow_type
                    .map(|workflow_type| return workflow_type.label())
                    .unwrap_or("None");
                println!(
                    "{:<20} {:<20} {}",
                    provider.id, provider.display_name, workflow
                );
            }
        }
        Some(("show", show_matches)) => {
            let provider_id = show_matches.get_one::<String>("provider").map(String::as_str).unwrap_or_default();
            let provider = match Catalog::by_id(provider_id)
                .or_else(|| return Catalog::by_name(provider_id))
            {
                Some(provider) => provider,
                None => bail!(Pages::provider_not_found(provider_id)),
            };

            println!("{}", Paint::new(provider.display_name).bold());
            println!("{}", provider.description);
            println!("Route: {}", provider.route);
            println!("Capabilities: {}", provider.capabilities.join(", "));
            println!("Credential: {}", provider.credential_label());
            println!(
                "Default inputs: {}",
                serde_json::to_string(&Catalog::default_inputs(provider))?
            );
            for field in provider.option_fields.iter() {
                println!("- {} ({}, {})", field.label, field.id, field.field_type);
            }
        }
        Some(("sync", _)) => {
            let ctx = connect().await?;
            let count = ProviderMetadataService::new(ctx.actor, ctx.cache)
                .sync_catalog()
                .await?;
            println!("Registered {count} providers");
        }
        Some(("registered", _)) => {
            let ctx = connect().await?;
            let providers = ProviderMetadataService::new(ctx.actor, ctx.cache)
                .registered()
                .await?;
            if providers.is_empty() {
                println!("No providers registered yet. Run `empire providers sync` first.");
            }
            for provider in providers {
                println!("{} {} ({})", provider.name, provider.version, provider.api_endpoint);
            }
        }
        _ => {
            subcommand_providers().print_long_help()?;
        }
    }

    return Ok(());
}

async fn handle_keys(matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("set", set_matches)) => {
            let provider_id = set_matches.get_one::<String>("provider").map(String::as_str).unwrap_or_default();
            let provider = match Catalog::by_id(provider_id) {
                Some(provider) => provider,
                None => bail!(format!("Provider not found: {provider_id}")),
            };

            let key = match set_matches.get_one::<String>("key") {
                Some(key) => key.to_string(),
                None => Password::with_theme(&ColorfulTheme::default())
                    .with_prompt(format!(
                        "{} for {}",
                        provider.credential_label(),
                        provider.display_name
                    ))
                    .interact()?,
            };

            let ctx = connect().await?;
            KeyService::new(ctx.actor, ctx.cache)
                .save(provider_id, &key)
                .await?;
            println!("{} saved for {}", provider.credential_label(), provider.display_name);
        }
        Some(("status", status_matches)) => {
            let ctx = connect().await?;
            let keys = KeyService::new(ctx.actor, ctx.cache);

            let providers = match status_matches.get_one::<String>("provider") {
                Some(provider_id) => match Catalog::by_id(provider_id) {
                    Some(provider) => vec![provider],
                    None => bail!(format!("Provider not found: {provider_id}")),
                },
                None => Catalog::list().iter().collect(),
            };

            for provider in providers {
                let status = if keys.exists(provider.id).await? {
                    Paint::green("configured".to_string())
                } else {
                    Paint::red("missing".to_string())
                };
                println!("{:<20} {status}", provider.id);
            }
        }
        _ => {
            subcommand_keys().print_long_help()?;
        }
    }

    return Ok(());
}

async fn handle_chat(matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("send", send_matches)) => {
            let provider_id = send_matches.get_one::<String>("provider").map(String::as_str).unwrap_or_default();
            let message = send_matches.get_one::<String>("message").map(String::as_str).unwrap_or_default();
            require_provider(provider_id)?;

            let ctx = connect().await?;
            ChatService::new(ctx.actor, ctx.cache)
                .send(provider_id, message)
                .await?;
            println!("Message sent");
        }
        Some(("history", history_matches)) => {
            let provider_id = history_matches.get_one::<String>("provider").map(String::as_str).unwrap_or_default();
            require_provider(provider_id)?;

            let ctx = connect().await?;
            let messages = ChatService::new(ctx.actor, ctx.cache)
                .messages(provider_id)
                .await?;
            if messages.is_empty() {
                println!("No messages yet.");
            }
            for message in messages {
                println!("{}: {}", Paint::new(message.author()).bold(), message.content);
            }
        }
        _ => {
            subcommand_chat().print_long_help()?;
        }
    }

    return Ok(());
}

async fn handle_run(matches: &ArgMatches) -> Result<()> {
    let provider_id = matches.get_one::<String>("provider").map(String::as_str).unwrap_or_default();
    let provider = match Catalog::by_id(provider_id) {
        Some(provider) => provider,
        None => bail!(format!("Provider not found: {provider_id}")),
    };

    let workflow_type = match matches.get_one::<String>("workflow-type") {
        Some(workflow_type) => workflow_type.parse::<WorkflowType>()?,
        None => match provider.workflow_type {
            Some(workflow_type) => workflow_type,
            None => bail!(format!("{} has no workflow to run", provider.display_name)),
        },
    };

    let pairs = matches
        .get_many::<String>("input")
        .map(|vals| return vals.collect::<Vec<&String>>())
        .unwrap_or_default();
    let inputs = build_inputs(provider_id, pairs)?;

    let ctx = connect().await?;
    if workflow_type != WorkflowType::ImageGeneration {
        // Refused before a run is created.
        WorkflowService::new(ctx.actor, ctx.cache)
            .execute(provider_id, workflow_type, &inputs)
            .await?;
        return Ok(());
    }

    let run = ImageGenerationService::new(ctx.actor, ctx.cache)
        .generate(provider_id, &inputs)
        .await?;
    print_runs(&[run]);

    return Ok(());
}

async fn handle_runs(matches: &ArgMatches) -> Result<()> {
    let (name, sub_matches) = match matches.subcommand() {
        Some(subcommand) => subcommand,
        None => {
            subcommand_runs().print_long_help()?;
            return Ok(());
        }
    };

    let provider_id = sub_matches.get_one::<String>("provider").map(String::as_str).unwrap_or_default();
    require_provider(provider_id)?;

    let ctx = connect().await?;
    let workflows = WorkflowService::new(ctx.actor, ctx.cache);

    match name {
        "list" => {
            print_runs(&workflows.list(provider_id).await?);
        }
        "watch" => {
            let mut last: Vec<WorkflowRun> = vec![];
            workflows
                .watch(provider_id, |runs| {
                    if runs != last.as_slice() {
                        println!("{}", Paint::new(chrono::Local::now().format("%H:%M:%S").to_string()).dimmed());
                        print_runs(runs);
                        last = runs.to_vec();
                    }
                })
                .await?;
        }
        "cancel" => {
            let run_id = sub_matches.get_one::<String>("run-id").map(String::as_str).unwrap_or_default();
            workflows.cancel(run_id, provider_id).await?;
            println!("Cancelled run {run_id}");
        }
        "clear-pending" => {
            workflows.clear_pending(provider_id).await?;
            println!("Cleared pending runs for {provider_id}");
        }
        _ => {
            subcommand_runs().print_long_help()?;
        }
    }

    return Ok(());
}

async fn handle_profile(matches: &ArgMatches) -> Result<()> {
    let profiles = Profiles::default();

    match matches.subcommand() {
        Some(("show", _)) => {
            let ctx = connect().await?;
            if !ctx.identity.is_authenticated() {
                println!("{}", Pages::authentication_required());
                return Ok(());
            }

            let backend_profile = ctx.actor.get_caller_user_profile().await?;
            let role = ctx.actor.get_caller_user_role().await?;
            let name = profiles
                .display_name(&ctx.identity, backend_profile.as_ref())
                .await?;

            println!("Principal: {}", ctx.identity.cache_key());
            println!("Role: {role}");
            println!("Name: {}", name.unwrap_or_else(|| return "(not set)".to_string()));
        }
        Some(("set-name", set_matches)) => {
            let identity = identity();
            if !identity.is_authenticated() {
                bail!("Unauthorized: Only users can save profiles");
            }

            let name = set_matches.get_one::<String>("name").map(String::as_str).unwrap_or_default();
            let profile = profiles.set_name(&identity, name).await?;
            println!("Display name set to {}", profile.name);
        }
        Some(("clear-name", _)) => {
            profiles.delete(&identity()).await?;
            println!("Local display name cleared");
        }
        _ => {
            subcommand_profile().print_long_help()?;
        }
    }

    return Ok(());
}

pub async fn parse() -> Result<()> {
    let matches = build().get_matches();

    match matches.subcommand() {
        Some(("completions", subcmd_matches)) => {
            if let Some(completions) = subcmd_matches.get_one::<Shell>("shell").copied() {
                let mut app = build();
                print_completions(completions, &mut app);
            }
            return Ok(());
        }
        Some(("config", subcmd_matches)) => {
            match subcmd_matches.subcommand() {
                Some(("create", _)) => {
                    create_config_file().await?;
                }
                Some(("default", _)) => {
                    println!("{}", Config::serialize_default(build()));
                }
                Some(("path", _)) => {
                    println!("{}", Config::default(ConfigKey::ConfigFile));
                }
                _ => {
                    subcommand_config().print_long_help()?;
                }
            }
            return Ok(());
        }
        Some(("manpages", _)) => {
            clap_mangen::Man::new(build()).render(&mut io::stdout())?;
            return Ok(());
        }
        _ => {}
    }

    Config::load(build(), vec![&matches]).await?;

    match matches.subcommand() {
        Some(("providers", subcmd_matches)) => handle_providers(subcmd_matches).await?,
        Some(("open", subcmd_matches)) => {
            let path = subcmd_matches.get_one::<String>("path").map(String::as_str).unwrap_or("/");
            let auth = AuthState::from_identity(Some(&identity()));
            let navigation = Navigator::navigate(path, auth);

            let res = match Pages::without_backend(&navigation) {
                Some(res) => res,
                None => {
                    let ctx = connect().await?;
                    PageLoader::new(ctx.actor, ctx.cache)
                        .render(&navigation)
                        .await?
                }
            };
            println!("{res}");
        }
        Some(("keys", subcmd_matches)) => handle_keys(subcmd_matches).await?,
        Some(("chat", subcmd_matches)) => handle_chat(subcmd_matches).await?,
        Some(("run", subcmd_matches)) => handle_run(subcmd_matches).await?,
        Some(("runs", subcmd_matches)) => handle_runs(subcmd_matches).await?,
        Some(("slots", subcmd_matches)) => match subcmd_matches.subcommand() {
            Some(("list", _)) => {
                let ctx = connect().await?;
                let metadata = ProviderMetadataService::new(ctx.actor, ctx.cache);
                for slot in Catalog::custom_slots() {
                    let name = metadata.resolve_display_name(slot.id).await?;
                    println!("{:<20} {name}", slot.id);
                }
            }
            Some(("rename", rename_matches)) => {
                let slot = rename_matches.get_one::<String>("slot").map(String::as_str).unwrap_or_default();
                let name = rename_matches.get_one::<String>("name").map(String::as_str).unwrap_or_default();

                let ctx = connect().await?;
                ProviderMetadataService::new(ctx.actor, ctx.cache)
                    .rename_slot(slot, name)
                    .await?;
                println!("Renamed {slot} to {}", name.trim());
            }
            _ => {
                subcommand_slots().print_long_help()?;
            }
        },
        Some(("profile", subcmd_matches)) => handle_profile(subcmd_matches).await?,
        _ => {
            build().print_long_help()?;
        }
    }

    return Ok(());
}
