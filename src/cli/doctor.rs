//! Diagnostics for store and config health.

use crate::cli::CliContext;
use crate::constants;
use crate::core::file_lock::FileLock;
use crate::core::generator::PasswordGenerator;
use crate::util::fs as vault_fs;
use anyhow::Result;
use chrono::{DateTime, Local};
use clap::Args;
use std::fs;

#[derive(Args, Debug)]
pub struct DoctorArgs {}

#[derive(Debug, Default, PartialEq, Eq)]
struct Tally {
    ok: u32,
    warn: u32,
    fail: u32,
}

impl Tally {
    fn pass(&mut self, msg: impl AsRef<str>) {
        println!("  [PASS] {}", msg.as_ref());
        self.ok += 1;
    }

    fn warn(&mut self, msg: impl AsRef<str>) {
        println!("  [WARN] {}", msg.as_ref());
        self.warn += 1;
    }

    fn fail(&mut self, msg: impl AsRef<str>) {
        println!("  [FAIL] {}", msg.as_ref());
        self.fail += 1;
    }

    fn info(&self, msg: impl AsRef<str>) {
        println!("  [INFO] {}", msg.as_ref());
    }
}

pub fn run(ctx: &CliContext, _args: DoctorArgs) -> Result<()> {
    println!("Doctor: {}", ctx.paths);
    let tally = check(ctx);

    println!();
    println!(
        "Doctor summary: {} pass, {} warn, {} fail",
        tally.ok, tally.warn, tally.fail
    );
    if tally.fail > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn check(ctx: &CliContext) -> Tally {
    let paths = &ctx.paths;
    let mut t = Tally::default();

    // Config
    if let Some(w) = &ctx.config_load_warning {
        t.fail(format!("config unreadable: {}", w));
    } else if paths.config.exists() {
        t.pass(format!("config loaded: {}", paths.config.display()));
    } else {
        t.info(format!(
            "no config at {} (defaults in use)",
            paths.config.display()
        ));
    }

    match PasswordGenerator::new(&ctx.config.generator) {
        Ok(_) => t.pass("generator policy valid"),
        Err(e) => t.fail(format!("generator policy: {}", e)),
    }

    // Store
    t.info(format!(
        "store path ({}): {}",
        paths.store_source,
        paths.store.display()
    ));
    let store = ctx.store();
    match store.load() {
        Ok(Some(records)) => t.pass(format!("store parses: {} logins", records.len())),
        Ok(None) => {
            t.warn(format!(
                "store missing: {} (created on first add)",
                store.path().display()
            ));
            return t;
        }
        Err(e) => t.fail(format!("{}", e)),
    }
    if !store.exists() {
        return t;
    }

    if let Some(mode) = vault_fs::mode(store.path()) {
        if mode & 0o077 == 0 {
            t.pass(format!("store mode ok: {:04o}", mode));
        } else {
            t.warn(format!(
                "store mode: {:04o} (expected {:04o})",
                mode,
                constants::STORE_FILE_MODE
            ));
        }
    }

    if let Ok(modified) = fs::metadata(store.path()).and_then(|m| m.modified()) {
        let local: DateTime<Local> = modified.into();
        t.info(format!("last modified: {}", local.format("%Y-%m-%d %H:%M:%S")));
    }

    // Only probe an existing lock file; never create one here.
    let lock_path = store.lock_path();
    if lock_path.exists() {
        match FileLock::try_exclusive(&lock_path) {
            Ok(Some(_)) => t.pass("no writer holds the store lock"),
            Ok(None) => t.warn(format!("store lock held: {}", lock_path.display())),
            Err(e) => t.warn(format!("cannot probe lock {}: {}", lock_path.display(), e)),
        }
    }

    t
}
