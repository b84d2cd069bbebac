use heapdb::common::Result;
use heapdb::config::config::pool_capacity_from_env;
use heapdb::execution::{OpIterator, SeqScan};
use heapdb::storage::catalog::load_schema;
use heapdb::transaction::Transaction;
use heapdb::Database;
use itertools::Itertools;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::Path;
use std::process::exit;

/// Inspection shell: loads a catalog description file and lets you look at
/// the tables behind it. Not a SQL shell; just the storage engine.
fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 2 {
        eprintln!("usage: {} <catalog-file>", args[0]);
        exit(1);
    }

    let catalog_path = Path::new(&args[1]);
    let db = match open_database(catalog_path) {
        Ok(db) => db,
        Err(err) => {
            eprintln!("error: {err}");
            exit(1);
        }
    };

    if let Err(err) = repl(&db) {
        eprintln!("error: {err}");
        exit(1);
    }
}

fn open_database(catalog_path: &Path) -> Result<Database> {
    let base_dir = catalog_path.parent().unwrap_or_else(|| Path::new("."));
    let db = Database::with_capacity(&base_dir.join("heapdb.log"), pool_capacity_from_env())?;
    let loaded = load_schema(db.catalog(), catalog_path)?;
    println!("loaded {} table(s): {}", loaded.len(), loaded.iter().join(", "));
    Ok(db)
}

fn repl(db: &Database) -> Result<()> {
    let mut editor = DefaultEditor::new().map_err(readline_error)?;
    loop {
        match editor.readline("heapdb> ") {
            Ok(line) => {
                let line = line.trim().to_string();
                if line.is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(&line);
                if line == "quit" || line == "exit" {
                    return Ok(());
                }
                execute(db, &line).unwrap_or_else(|err| println!("oops, {err}"));
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => return Ok(()),
            Err(err) => return Err(readline_error(err)),
        }
    }
}

fn execute(db: &Database, line: &str) -> Result<()> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    match tokens.as_slice() {
        ["help"] => {
            println!("commands: tables | describe <table> | scan <table> | count <table> | quit");
        }
        ["tables"] => {
            for table_id in db.catalog().table_ids() {
                println!("  {} (id {})", db.catalog().table_name(table_id)?, table_id);
            }
        }
        ["describe", name] => {
            let table_id = db.catalog().table_id(*name)?;
            let schema = db.catalog().schema(table_id)?;
            let pkey = db.catalog().primary_key(table_id)?;
            match pkey.is_empty() {
                true => println!("  {name}{schema}"),
                false => println!("  {name}{schema} pk={pkey}"),
            }
        }
        ["scan", name] => {
            let count = scan_table(db, *name, true)?;
            println!("  {count} tuple(s)");
        }
        ["count", name] => {
            let count = scan_table(db, *name, false)?;
            println!("  {count} tuple(s)");
        }
        _ => println!("unrecognized command; try 'help'"),
    }
    Ok(())
}

/// Scans a table under a fresh read-only transaction, optionally printing
/// every tuple, and commits to drop the page locks.
fn scan_table(db: &Database, name: &str, print: bool) -> Result<usize> {
    let table_id = db.catalog().table_id(name)?;
    let txn = Transaction::new();

    let mut scan = SeqScan::new(db, txn.id(), table_id)?;
    scan.open()?;
    let mut count = 0;
    while scan.has_next()? {
        let tuple = scan.next()?;
        if print {
            println!("  {tuple}");
        }
        count += 1;
    }
    scan.close();

    txn.commit(db)?;
    Ok(count)
}

fn readline_error(err: ReadlineError) -> heapdb::common::Error {
    heapdb::common::Error::Io(err.to_string())
}
