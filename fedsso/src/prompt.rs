use std::io::{self, BufRead, Write};

use crate::common::{AppConfig, RoleGrant};
use crate::error::{AuthError, AuthResult};

/// Blocking input provider for the interactive steps of the flow.
///
/// The handshake depends on this trait instead of stdin directly so the
/// state machine can run against scripted input in tests.
pub trait Prompt: Send + Sync {
    /// Reads one line of input after showing `prompt`
    fn read_line(&self, prompt: &str) -> io::Result<String>;

    /// Reads a secret without echoing it
    fn read_password(&self, prompt: &str) -> io::Result<String>;
}

/// Terminal-backed prompt provider
pub struct StdPrompt;

impl Prompt for StdPrompt {
    fn read_line(&self, prompt: &str) -> io::Result<String> {
        print!("{prompt}: ");
        io::stdout().flush()?;

        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(line.trim().to_string())
    }

    fn read_password(&self, prompt: &str) -> io::Result<String> {
        rpassword::prompt_password(format!("{prompt}: "))
    }
}

/// Resolves one grant from the catalog.
///
/// A single grant is taken without any prompt. Otherwise the roles are
/// listed with zero-based indices and the choice is read exactly once;
/// input that does not parse to an in-range index aborts the run instead
/// of re-prompting.
pub fn select_role<'a>(catalog: &'a [RoleGrant], prompt: &dyn Prompt) -> AuthResult<&'a RoleGrant> {
    if catalog.len() == 1 {
        return Ok(&catalog[0]);
    }

    println!("Please choose the role you would like to assume:");
    for (index, grant) in catalog.iter().enumerate() {
        println!("[ {index} ]: {}", grant.role_arn);
    }

    let input = prompt.read_line("Selection")?;
    let index: usize = input
        .parse()
        .map_err(|_| AuthError::invalid_selection(input.clone()))?;
    catalog
        .get(index)
        .ok_or_else(|| AuthError::invalid_selection(input))
}

/// Resolves the ADFS domain to authenticate against.
///
/// An explicit domain (flag or environment variable) wins; otherwise the
/// configured endpoints are offered as a menu defaulting to the first.
pub fn select_endpoint(
    config: &AppConfig,
    explicit: Option<&str>,
    prompt: &dyn Prompt,
) -> AuthResult<String> {
    if let Some(domain) = explicit {
        return Ok(domain.to_string());
    }

    println!("Available ADFS Endpoints:");
    for (index, endpoint) in config.endpoints.iter().enumerate() {
        println!(
            "\t{}: Region: {} ADFS Endpoint: {}",
            index + 1,
            endpoint.region,
            endpoint.domain
        );
    }

    let input = prompt.read_line("Select an ADFS Endpoint to connect [1]")?;
    let choice = if input.is_empty() {
        1
    } else {
        input
            .parse::<usize>()
            .map_err(|_| AuthError::invalid_selection(input.clone()))?
    };

    let endpoint = config
        .endpoints
        .get(choice.wrapping_sub(1))
        .ok_or_else(|| AuthError::invalid_selection(input))?;
    Ok(endpoint.domain.clone())
}
