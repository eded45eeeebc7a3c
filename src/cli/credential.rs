use crate::cli::CliContext;
use crate::core::store::{LookupResult, UpsertOutcome};
use anyhow::{bail, Context, Result};
use clap::Args;
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Table};
use dialoguer::{Input, Password};
use serde::Serialize;
use std::io::{Read, Write};
use tracing::{debug, info};
use zeroize::Zeroizing;

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Site the login belongs to
    pub site: String,

    /// Username or email (prompted if omitted)
    #[arg(long, short)]
    pub username: Option<String>,

    /// Read the password from stdin instead of interactive prompt
    #[arg(long, conflicts_with = "generate")]
    pub password_stdin: bool,

    /// Generate a random password and print it
    #[arg(long)]
    pub generate: bool,
}

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Site to look up
    pub site: String,

    /// Print only the password (for piping)
    #[arg(long)]
    pub password_only: bool,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Output format: table|json
    #[arg(long, default_value = "table")]
    pub format: String,
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Substring of the site name (case-insensitive)
    pub query: String,
}

#[derive(Serialize)]
struct ListItem {
    site: String,
    username: String,
}

pub fn run_add(ctx: &CliContext, args: AddArgs) -> Result<()> {
    if args.site.is_empty() {
        bail!("site cannot be empty");
    }

    if ctx.non_interactive && args.username.is_none() {
        bail!("--non-interactive requires --username for add");
    }
    if ctx.non_interactive && !args.password_stdin && !args.generate {
        bail!("--non-interactive requires --password-stdin or --generate for add");
    }

    let username = match args.username {
        Some(u) => u,
        None => Input::<String>::new()
            .with_prompt(format!("Username for {}", args.site))
            .interact_text()
            .context("read username from prompt")?,
    };
    if username.is_empty() {
        bail!("username cannot be empty");
    }

    let password: Zeroizing<String> = if args.generate {
        Zeroizing::new(ctx.generator()?.generate()?)
    } else {
        read_password(args.password_stdin, &args.site)?
    };
    if password.is_empty() {
        bail!("password cannot be empty");
    }

    let store = ctx.store();
    let outcome = store
        .upsert(&args.site, &username, &password)
        .with_context(|| format!("save login for {}", args.site))?;
    info!(site = %args.site, created = outcome.is_created(), "login saved");

    match outcome {
        UpsertOutcome::Created => {
            println!("Created {} with login for {}", store.path().display(), args.site)
        }
        UpsertOutcome::Updated => println!("Saved login for {}", args.site),
    }
    if args.generate {
        println!("Password: {}", password.as_str());
    }
    Ok(())
}

pub fn run_get(ctx: &CliContext, args: GetArgs) -> Result<()> {
    let store = ctx.store();
    let result = store
        .lookup(&args.site)
        .with_context(|| format!("look up {}", args.site))?;
    debug!(site = %args.site, found = matches!(result, LookupResult::Match(_)), "lookup");

    match result {
        LookupResult::StoreMissing => {
            bail!("no store found at {}", store.path().display());
        }
        LookupResult::NoMatch(site) => {
            if args.password_only {
                bail!("no data for {}", site);
            }
            println!("No data for {}", site);
        }
        LookupResult::Match(record) => {
            let password = Zeroizing::new(record.password);
            let mut stdout = std::io::stdout();
            if args.password_only {
                stdout
                    .write_all(password.as_bytes())
                    .context("write to stdout")?;
            } else {
                writeln!(stdout, "Username: {}", record.username).context("write to stdout")?;
                write!(stdout, "Password: {}", password.as_str()).context("write to stdout")?;
            }
            writeln!(stdout).context("write to stdout")?;
            stdout.flush().context("flush stdout")?;
        }
    }
    Ok(())
}

pub fn run_list(ctx: &CliContext, args: ListArgs) -> Result<()> {
    if args.format != "table" && args.format != "json" {
        bail!("invalid format: {} (use table|json)", args.format);
    }

    let store = ctx.store();
    let Some(sites) = store.sites().context("list sites")? else {
        if args.format == "json" {
            println!("[]");
        } else {
            println!("No store found at {}", store.path().display());
        }
        return Ok(());
    };

    let items: Vec<ListItem> = sites
        .into_iter()
        .map(|(site, username)| ListItem { site, username })
        .collect();

    if args.format == "json" {
        let json = serde_json::to_string_pretty(&items).context("serialize list")?;
        println!("{}", json);
        return Ok(());
    }

    if items.is_empty() {
        println!("No logins stored");
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        Cell::new("Site").add_attribute(Attribute::Bold),
        Cell::new("Username").add_attribute(Attribute::Bold),
    ]);
    for item in items {
        table.add_row(vec![item.site, display_or_dash(item.username)]);
    }

    println!("{}", table);
    Ok(())
}

pub fn run_search(ctx: &CliContext, args: SearchArgs) -> Result<()> {
    let store = ctx.store();
    let Some(matches) = store.search(&args.query).context("search sites")? else {
        bail!("no store found at {}", store.path().display());
    };

    if matches.is_empty() {
        println!("No matches for '{}'.", args.query);
        return Ok(());
    }
    for site in matches {
        println!("{}", site);
    }
    Ok(())
}

fn read_password(from_stdin: bool, site: &str) -> Result<Zeroizing<String>> {
    if from_stdin {
        let mut buf = Zeroizing::new(String::new());
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("read password from stdin")?;
        return Ok(Zeroizing::new(
            buf.trim_end_matches(['\r', '\n']).to_string(),
        ));
    }
    Ok(Zeroizing::new(
        Password::new()
            .with_prompt(format!("Password for {}", site))
            .with_confirmation("Repeat password", "Passwords do not match")
            .allow_empty_password(false)
            .interact()
            .context("read password from prompt")?,
    ))
}

fn display_or_dash(value: String) -> String {
    if value.is_empty() {
        "-".to_string()
    } else {
        value
    }
}
