use std::sync::Arc;

use findusers::config::{load_config, print_schema};
use findusers::providers::Credentials;
use findusers::startup::build_state;
use findusers::utils::logger::init_logging;
use tracing::error;

const USAGE: &str = "usage: find-users <schema | status | sign-in <email> <password> | sign-in --anonymous | logout>";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    if args.first() == Some(&"schema") {
        print_schema()?;
        return Ok(());
    }

    let config = Arc::new(load_config()?);
    init_logging(&config.logging)?;

    let mut state = build_state(config)?;
    state.restore();

    match args.as_slice() {
        ["status"] => {
            println!("{}", serde_json::to_string_pretty(&state.status())?);
        }
        ["sign-in", "--anonymous"] => {
            let signed_in = state.sign_in(&Credentials::Anonymous).await?;
            println!("{}", serde_json::to_string_pretty(&signed_in.user)?);
        }
        ["sign-in", email, password] => {
            let credentials = Credentials::email_password(*email, *password);
            match state.sign_in(&credentials).await {
                Ok(signed_in) => println!("{}", serde_json::to_string_pretty(&signed_in.user)?),
                Err(e) => {
                    error!(error = %e, "sign-in failed");
                    return Err(e.into());
                }
            }
        }
        ["logout"] => {
            state.logout();
            println!("logged out");
        }
        _ => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    }

    Ok(())
}
