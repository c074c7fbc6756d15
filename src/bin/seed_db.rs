use std::error::Error;
use std::fs;
use std::time::Duration;

use clap::Parser;
use rusqlite::Connection;

use salesboard_rs::{
    DEFAULT_SEED_URL, build_http_client, fetch_seed_transactions, initialize_db,
    parse_seed_transactions, replace_all_transactions,
};

/// A utility for replacing the transactions in a salesboard_rs database with a seed document.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the SQLite database, created if it does not exist.
    #[arg(long, env = "DATABASE_PATH")]
    db_path: String,

    /// The URL of the seed document. Ignored if `--file` is given.
    #[arg(long, default_value = DEFAULT_SEED_URL)]
    url: String,

    /// A local JSON file to seed the database from instead of downloading it.
    #[arg(long, short)]
    file: Option<String>,

    /// How long to wait for the seed document before giving up, in seconds.
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let transactions = match &args.file {
        Some(path) => {
            println!("Reading seed data from {path}");
            parse_seed_transactions(&fs::read(path)?)?
        }
        None => {
            println!("Downloading seed data from {}", args.url);
            let client = build_http_client(Duration::from_secs(args.timeout_secs))?;
            fetch_seed_transactions(&client, &args.url).await?
        }
    };

    println!("Seeding database at {:?}", args.db_path);
    let conn = Connection::open(&args.db_path)?;
    initialize_db(&conn)?;

    let count = replace_all_transactions(&transactions, &conn)?;

    println!("Success! The database now holds {count} transactions.");

    Ok(())
}
