//! Sign-in commands.
//!
//! # Usage
//!
//! ```bash
//! booksearch register reader@example.com
//! booksearch login reader@example.com
//! booksearch whoami
//! booksearch logout
//! ```
//!
//! The password is read from `--password`, `BOOKSEARCH_PASSWORD`, or a line on
//! stdin, in that order.

use std::io::{BufRead, Write};

use booksearch_core::SessionGate;
use secrecy::SecretString;

use super::{CommandError, Context};

/// Create an account and sign in.
///
/// # Errors
///
/// Returns the server's message on rejection, or a storage error if the
/// session cannot be saved.
pub async fn register(
    ctx: &Context,
    email: &str,
    password: Option<SecretString>,
) -> Result<(), CommandError> {
    let password = password_or_prompt(password)?;
    let session = ctx.api.register(email, &password).await?;
    SessionGate::new(&ctx.store).establish(&session)?;

    #[allow(clippy::print_stdout)]
    {
        println!("Account created. Signed in as {}.", session.email);
    }
    Ok(())
}

/// Sign in to an existing account.
///
/// # Errors
///
/// Returns the server's message on rejection, or a storage error if the
/// session cannot be saved.
pub async fn login(
    ctx: &Context,
    email: &str,
    password: Option<SecretString>,
) -> Result<(), CommandError> {
    let password = password_or_prompt(password)?;
    let session = ctx.api.login(email, &password).await?;
    SessionGate::new(&ctx.store).establish(&session)?;

    #[allow(clippy::print_stdout)]
    {
        println!("Signed in as {}.", session.email);
    }
    Ok(())
}

/// Forget the saved session. The cart is kept.
///
/// # Errors
///
/// Returns a storage error if the session files cannot be removed.
pub fn logout(ctx: &Context) -> Result<(), CommandError> {
    SessionGate::new(&ctx.store).logout()?;

    #[allow(clippy::print_stdout)]
    {
        println!("Signed out.");
    }
    Ok(())
}

/// Show who is signed in.
pub fn whoami(ctx: &Context) {
    let status = match SessionGate::new(&ctx.store).current() {
        Some(session) if session.email.is_empty() => "Signed in.".to_owned(),
        Some(session) => format!("Signed in as {}.", session.email),
        None => "Not signed in.".to_owned(),
    };

    #[allow(clippy::print_stdout)]
    {
        println!("{status}");
    }
}

fn password_or_prompt(password: Option<SecretString>) -> Result<SecretString, CommandError> {
    if let Some(password) = password {
        return Ok(password);
    }

    #[allow(clippy::print_stderr)]
    {
        eprint!("Password: ");
    }
    std::io::stderr().flush()?;

    read_password(&mut std::io::stdin().lock())
}

fn read_password(input: &mut impl BufRead) -> Result<SecretString, CommandError> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_owned();
    Ok(SecretString::from(password))
}
