//! RADIUS profile command handlers.

use apiradius_core::{ProfileReconciler, ProfileState};

use crate::cli::{GlobalOpts, ProfileArgs, ProfileCommand};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(args: ProfileArgs, global: &GlobalOpts) -> Result<(), CliError> {
    // Profile files are validated before the config is even loaded, so a
    // malformed definition never reaches the network.
    let pending = match &args.command {
        ProfileCommand::Create { file } | ProfileCommand::Update { file, .. } => {
            Some(util::read_profile_file(file)?)
        }
        _ => None,
    };

    let provider = config::provider_config(global)?;
    let client = provider.connect().await?;
    let profiles = ProfileReconciler::from_config(client, &provider);

    match (args.command, pending) {
        (ProfileCommand::Create { .. }, Some(profile)) => {
            let state = profiles.create(&profile).await?;
            render(&state, global)
        }

        (ProfileCommand::Update { id, .. }, Some(mut profile)) => {
            if profile.id.is_empty() {
                profile.id.clone_from(&id);
            } else if profile.id != id {
                return Err(CliError::Validation {
                    field: "id".into(),
                    reason: format!("file describes '{}' but '{id}' was requested", profile.id),
                });
            }
            let state = profiles.update(&profile).await?;
            render(&state, global)
        }

        (ProfileCommand::Get { id }, _) => {
            let address = profiles.address(&id)?;
            let state = profiles
                .read(&address)
                .await?
                .ok_or_else(|| CliError::NotFound {
                    resource_type: "profile".into(),
                    identifier: address.to_string(),
                })?;
            render(&state, global)
        }

        (ProfileCommand::Delete { id }, _) => {
            let address = profiles.address(&id)?;
            profiles.delete(&address).await?;
            if !global.quiet {
                eprintln!("Deleted profile {address}");
            }
            Ok(())
        }

        (ProfileCommand::Exists { id }, _) => {
            let address = profiles.address(&id)?;
            let exists = profiles.exists(&address).await?;
            output::print_output(&exists.to_string(), global.quiet);
            Ok(())
        }

        (ProfileCommand::Import { address }, _) => {
            let state = profiles.import(&address).await?;
            render(&state, global)
        }

        (ProfileCommand::Create { .. } | ProfileCommand::Update { .. }, None) => {
            Err(CliError::Validation {
                field: "file".into(),
                reason: "no profile definition was read".into(),
            })
        }
    }
}

fn render(state: &ProfileState, global: &GlobalOpts) -> Result<(), CliError> {
    let out = output::render_single(&global.output, state, output::profile_detail)?;
    output::print_output(&out, global.quiet);
    Ok(())
}
