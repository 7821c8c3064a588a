#![forbid(unsafe_code)]

use std::env;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use dlms_contracts::access::{Role, UserRecord, Username};
use dlms_core::service::DlmsService;
use dlms_storage::dataset::DatasetStore;
use dlms_tools::shell_cli::{default_data_dir, execute_command};

const USAGE: &str = "usage: dlms [--data-dir <path>] | dlms users add <username> <Store|Department|Admin> [--data-dir <path>]";

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

fn run() -> Result<(), String> {
    let args: Vec<String> = env::args().skip(1).collect();
    if args.first().map(String::as_str) == Some("users") {
        return run_users(&args[1..]);
    }
    let data_dir = data_dir_from_args(&args)?;
    let mut service = DlmsService::open(data_dir).map_err(|e| e.to_string())?;

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    println!("Digital Ledger Management System (DLMS)");
    let session = loop {
        prompt("Username: ")?;
        let Some(line) = lines.next() else {
            return Ok(());
        };
        let line = line.map_err(|e| e.to_string())?;
        let username = line.trim();
        if username.is_empty() {
            continue;
        }
        match service.resolve_session(username) {
            Ok(session) => break session,
            Err(err) => println!("{err}"),
        }
    };
    println!("Role: {}", session.role.as_str());
    println!("Type 'help' for the menu.");

    loop {
        prompt("dlms> ")?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line.map_err(|e| e.to_string())?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" || line == "exit" {
            break;
        }
        match execute_command(&mut service, &session, line) {
            Ok(output) => println!("{output}"),
            Err(message) => println!("{message}"),
        }
    }
    Ok(())
}

fn prompt(text: &str) -> Result<(), String> {
    print!("{text}");
    io::stdout().flush().map_err(|e| e.to_string())
}

fn run_users(args: &[String]) -> Result<(), String> {
    match args.first().map(String::as_str) {
        Some("add") => {
            let username_raw = args.get(1).ok_or_else(|| USAGE.to_string())?;
            let role_raw = args.get(2).ok_or_else(|| USAGE.to_string())?;
            let data_dir = data_dir_from_args(&args[3..])?;
            let role = Role::parse(role_raw).ok_or_else(|| {
                format!("unknown role '{role_raw}'. expected Store, Department or Admin")
            })?;
            let username = Username::new(username_raw.as_str()).map_err(|e| e.to_string())?;
            let record = UserRecord::v1(username, role).map_err(|e| e.to_string())?;
            DatasetStore::for_dir(data_dir)
                .append_user(&record)
                .map_err(|e| e.to_string())?;
            println!("OK");
            Ok(())
        }
        _ => Err(USAGE.to_string()),
    }
}

fn data_dir_from_args(args: &[String]) -> Result<PathBuf, String> {
    let mut data_dir = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--data-dir" => {
                let value = iter
                    .next()
                    .ok_or_else(|| "missing value for --data-dir".to_string())?;
                data_dir = Some(PathBuf::from(value));
            }
            other => return Err(format!("unknown argument: {other}. {USAGE}")),
        }
    }
    Ok(data_dir.unwrap_or_else(default_data_dir))
}
