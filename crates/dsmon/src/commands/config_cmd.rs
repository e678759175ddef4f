//! Config subcommand handlers.

use tabled::Tabled;

use dsmon_config::{Config, Profile, TokenBackend, config_path, profile_to_client_config};

use crate::cli::{BackendArg, ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config;
use crate::error::CliError;
use crate::output;

impl From<BackendArg> for TokenBackend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Memory => Self::Memory,
            BackendArg::File => Self::File,
            BackendArg::Keyring => Self::Keyring,
        }
    }
}

#[derive(Tabled)]
struct ProfileRow {
    #[tabled(rename = "")]
    marker: &'static str,
    #[tabled(rename = "Profile")]
    name: String,
    #[tabled(rename = "Server")]
    server: String,
    #[tabled(rename = "Token Store")]
    backend: String,
}

fn save(cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let path = dsmon_config::save_config(cfg)?;
    if !global.quiet {
        eprintln!("Config written to {}", path.display());
    }
    Ok(())
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init {
            server,
            token_backend,
            force,
        } => {
            let mut cfg = config::load()?;
            let name = config::active_profile_name(global, &cfg);

            if cfg.profiles.contains_key(&name) && !force {
                return Err(CliError::Validation {
                    field: "profile".into(),
                    reason: format!("'{name}' already exists (use --force to replace it)"),
                });
            }

            let mut profile = Profile::new(server);
            profile.token_backend = token_backend.map(Into::into);
            // Reject bad URLs before anything is written.
            profile_to_client_config(&profile, &cfg.defaults)?;

            cfg.profiles.insert(name.clone(), profile);
            if cfg.default_profile.is_none() {
                cfg.default_profile = Some(name.clone());
            }
            save(&cfg, global)?;
            if !global.quiet {
                eprintln!("Profile '{name}' ready. Next: dsmon login --username <name>");
            }
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::load()?;
            let out = match global.output() {
                OutputFormat::Table | OutputFormat::Plain => toml::to_string_pretty(&cfg)
                    .map_err(|e| CliError::Config(Box::new(e.into())))?,
                OutputFormat::Json => output::render_json(&cfg, false)?,
                OutputFormat::JsonCompact => output::render_json(&cfg, true)?,
                OutputFormat::Yaml => output::render_yaml(&cfg)?,
            };
            output::print_output(out.trim_end(), global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = config::load()?;
            let active = config::active_profile_name(global, &cfg);
            let mut names: Vec<String> = cfg.profiles.keys().cloned().collect();
            names.sort();

            let out = output::render_list(
                global.output(),
                &names,
                |n| {
                    let p = &cfg.profiles[n];
                    ProfileRow {
                        marker: if *n == active { "*" } else { "" },
                        name: n.clone(),
                        server: p.server.clone(),
                        backend: p.token_backend(&cfg.defaults).to_string(),
                    }
                },
                Clone::clone,
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = config::load()?;
            if !cfg.profiles.contains_key(&name) {
                let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
                available.sort();
                return Err(CliError::ProfileNotFound {
                    name,
                    available: available.join(", "),
                });
            }
            cfg.default_profile = Some(name.clone());
            save(&cfg, global)?;
            if !global.quiet {
                eprintln!("Default profile set to '{name}'");
            }
            Ok(())
        }
    }
}
