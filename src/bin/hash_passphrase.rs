//! Argon2id hashing utility for the access passphrase.
//!
//! Prints the PHC string to put in `TAVI_LOS_ACCESS_HASH` (or in the file
//! named by `TAVI_LOS_ACCESS_HASH_FILE`).
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin hash_passphrase -- --passphrase-file <path>
//! printf '%s' "$PASSPHRASE" | cargo run --bin hash_passphrase
//! ```
//!
//! The passphrase is never taken from argv, where it would show up in process
//! listings and shell history.

use std::io::Read;

use zeroize::Zeroizing;

const USAGE: &str = "Usage: hash_passphrase [--passphrase-file <path>]\n\nReads the passphrase from <path>, or from stdin when no file is given, and prints its Argon2id PHC string.";

fn main() {
    let mut args = std::env::args().skip(1);
    let mut passphrase_file: Option<std::path::PathBuf> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--passphrase-file" => {
                let p = args.next().unwrap_or_default();
                if p.is_empty() {
                    eprintln!("{USAGE}");
                    std::process::exit(2);
                }
                passphrase_file = Some(std::path::PathBuf::from(p));
            }
            "-h" | "--help" => {
                println!("{USAGE}");
                return;
            }
            _ => {
                eprintln!("Unknown arg: {arg}\n{USAGE}");
                std::process::exit(2);
            }
        }
    }

    let mut raw = Zeroizing::new(String::new());
    let read = match &passphrase_file {
        Some(path) => std::fs::File::open(path).and_then(|mut f| f.read_to_string(&mut raw)),
        None => std::io::stdin().read_to_string(&mut raw),
    };
    if let Err(e) = read {
        eprintln!("Failed to read passphrase: {e}");
        std::process::exit(1);
    }

    // A trailing newline from `echo` or an editor is not part of the passphrase.
    let passphrase = raw.trim_end_matches(['\r', '\n']);

    match tavi_los::application::hash_passphrase(passphrase) {
        Ok(hash) => println!("{hash}"),
        Err(e) => {
            eprintln!("Failed to hash passphrase: {e}");
            std::process::exit(1);
        }
    }
}
