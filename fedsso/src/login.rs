use anyhow::{Context, Result};
use tracing::info;
use url::Url;

use crate::aws::CredentialExchange;
use crate::commands::LoginCommand;
use crate::common::AppConfig;
use crate::credentials::{self, CredentialStore};
use crate::error::AuthError;
use crate::idp::{self, AdfsClient};
use crate::prompt::{self, Prompt, StdPrompt};

/// Runs one federated login end to end
pub async fn run(args: LoginCommand) -> Result<()> {
    let config = AppConfig::default();
    let prompt = StdPrompt;

    let domain = prompt::select_endpoint(&config, args.adfs_endpoint.as_deref(), &prompt)?;
    let sso_url = Url::parse(&AppConfig::sso_url(&domain))
        .with_context(|| format!("invalid ADFS endpoint \"{domain}\""))?;
    info!("using ADFS endpoint {}", domain);

    let username = match args.username {
        Some(username) => username,
        None => prompt.read_line("Enter CLMGMT Username in format <shortname>@clmgmt.entsvcs.com")?,
    };
    let password = prompt.read_password("Password")?;

    println!();
    println!("Processing web request...");
    println!();

    let http = idp::build_http_client()?;
    let adfs = AdfsClient {
        http: &http,
        prompt: &prompt,
    };
    let assertion = adfs.authenticate(&sso_url, &username, &password).await?;

    let catalog = idp::assertion::parse_role_catalog(&assertion)?;
    if catalog.is_empty() {
        return Err(AuthError::NoRolesGranted.into());
    }

    let grant = prompt::select_role(&catalog, &prompt)?;
    let duration = config.session_duration_for(&grant.role_arn);

    let exchange = CredentialExchange::new().await;
    let credential = match exchange.exchange(&assertion, grant, duration).await {
        Ok(credential) => credential,
        Err(e @ AuthError::ExchangeRejected { .. }) => {
            println!("Requested session duration: {duration}s. Set a lower value and try again.");
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };

    let mut store = CredentialStore::open_default()?;
    let profile =
        credentials::persist_credentials(&mut store, &prompt, &grant.role_arn, &credential)?;

    println!();
    println!(
        "Updated credentials file, invoke the AWS CLI with the --profile {profile} and --region options."
    );

    Ok(())
}
