//! Config subcommand handlers.

use dialoguer::Input;

use switchboard_core::DeviceEndpoint;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::commands::util;
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let path = config::config_path(global);

    match args.command {
        // ── Init: guided setup ──────────────────────────────────────
        ConfigCommand::Init { host, port, force } => {
            if path.exists()
                && !force
                && !util::confirm(
                    &format!("{} already exists. Overwrite?", path.display()),
                    global.yes,
                )?
            {
                eprintln!("Left {} unchanged", path.display());
                return Ok(());
            }

            let host = match host {
                Some(host) => host,
                None => Input::new()
                    .with_prompt("Device address")
                    .default(DeviceEndpoint::default().host().to_owned())
                    .interact_text()
                    .map_err(util::prompt_err)?,
            };

            let profile_name = global.profile.clone().unwrap_or_else(|| "default".into());
            let mut cfg = Config {
                default_profile: Some(profile_name.clone()),
                ..Config::default()
            };
            cfg.set_host(&profile_name, &host, port)?;
            config::save_config_to(&cfg, &path)?;

            eprintln!("✓ Configuration written to {}", path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Test it: switchboard probe");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load(global)?;
            let format = global.output.unwrap_or(OutputFormat::Table);
            let text = match format {
                OutputFormat::Table | OutputFormat::Plain => toml::to_string_pretty(&cfg)?,
                OutputFormat::Json => output::render_json(&cfg, false)?,
                OutputFormat::JsonCompact => output::render_json(&cfg, true)?,
            };
            output::print_output(text.trim_end(), global.quiet);
            Ok(())
        }

        // ── SetHost <host> ──────────────────────────────────────────
        ConfigCommand::SetHost { host, port } => {
            let mut cfg = config::load(global)?;
            let profile_name = config::active_profile_name(global, &cfg);

            cfg.set_host(&profile_name, &host, port)?;
            config::save_config_to(&cfg, &path)?;

            let profile = cfg.profile(&profile_name)?;
            let shown = match profile.port {
                Some(p) => format!("{}:{p}", profile.host),
                None => profile.host.clone(),
            };
            eprintln!("✓ Set host {shown} on profile '{profile_name}'");
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            output::print_output(&path.display().to_string(), global.quiet);
            Ok(())
        }
    }
}
