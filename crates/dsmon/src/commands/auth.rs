//! Login and token handlers.

use std::fmt::Write;

use secrecy::SecretString;
use serde::Serialize;

use dsmon_api::TokenStore;

use crate::cli::{GlobalOpts, LoginArgs, TokenArgs, TokenCommand};
use crate::config::{self, Session};
use crate::error::CliError;
use crate::output;

use super::util;

/// Exchange username/password for a token and persist it.
pub async fn login(session: &Session, args: LoginArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let password = match args.password {
        Some(p) => util::non_empty(p, "password")?,
        None => util::prompt_secret("Password: ", "password")?,
    };

    let client = session.cell.get_instance().await?;
    let token = client
        .authorize(&args.username, &SecretString::from(password))
        .await?;
    session.token_store.save(&token)?;

    if !global.quiet {
        eprintln!(
            "Logged in as {}; token saved to the {} store for profile '{}'",
            args.username, session.backend, session.profile_name
        );
    }
    Ok(())
}

#[derive(Serialize)]
struct TokenStatus {
    profile: String,
    backend: String,
    persisted: bool,
    #[serde(rename = "override")]
    overridden: bool,
}

/// Token commands only touch the token store; no backend request is made.
pub fn handle_token(args: TokenArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let (profile_name, backend, store) = config::profile_token_store(global)?;

    match args.command {
        TokenCommand::Set { token } => {
            let token = match token {
                Some(t) => util::non_empty(t, "token")?,
                None => util::prompt_secret("Token: ", "token")?,
            };
            store.save(&SecretString::from(token))?;
            if !global.quiet {
                eprintln!("Token saved to the {backend} store for profile '{profile_name}'");
            }
            Ok(())
        }

        TokenCommand::Unset => {
            store.remove()?;
            if !global.quiet {
                eprintln!("Token removed from the {backend} store for profile '{profile_name}'");
            }
            Ok(())
        }

        TokenCommand::Status => {
            let status = TokenStatus {
                persisted: store.load()?.is_some(),
                overridden: global.token.is_some(),
                profile: profile_name,
                backend: backend.to_string(),
            };
            let out = output::render_single(
                global.output(),
                &status,
                |s| {
                    let mut out = String::new();
                    let _ = writeln!(out, "Profile:   {}", s.profile);
                    let _ = writeln!(out, "Backend:   {}", s.backend);
                    let _ = write!(
                        out,
                        "Persisted: {}",
                        if s.persisted { "yes" } else { "no" }
                    );
                    if s.overridden {
                        let _ = write!(out, "\nOverride:  --token / DSMON_TOKEN");
                    }
                    out
                },
                |s| if s.persisted { "stored".into() } else { "absent".into() },
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
