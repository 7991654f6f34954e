#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use chrono::NaiveDate;
use std::env;
use std::fs;
use std::path::PathBuf;
use toil_ledger::config::Config;
use toil_ledger::core::toil::ToilService;
use toil_ledger::db::initialize::init_db;
use toil_ledger::db::pool::DbPool;
use toil_ledger::db::toil::upsert_entry;
use toil_ledger::models::actor::Actor;
use toil_ledger::models::status::EntryStatus;
use toil_ledger::models::toil_entry::{EntryDraft, ToilEntry};
use toil_ledger::utils::date::week_start;

pub const ANN: &str = "ann@example.com";
pub const BOB: &str = "bob@example.com";
pub const BOSS: &str = "boss@example.com";

pub fn tl() -> Command {
    cargo_bin_cmd!("toil-ledger")
}

/// Create a unique test DB path inside the system temp dir and remove any existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_toil_ledger.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    db_path
}

/// Create a temporary output file path inside tempdir and ensure it's removed
pub fn temp_out(name: &str, ext: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_toil_ledger_out.{}", name, ext));
    let p = path.to_string_lossy().to_string();
    fs::remove_file(&p).ok();
    p
}

/// Initialize a CLI database with one administrator and two users.
pub fn init_db_with_users(db_path: &str) {
    tl().args(["--db", db_path, "--test", "init"])
        .assert()
        .success();

    tl().args(["--db", db_path, "user", "add", BOSS, "--name", "Boss", "--admin"])
        .assert()
        .success();

    for user in [ANN, BOB] {
        tl().args(["--db", db_path, "--as", BOSS, "user", "add", user])
            .assert()
            .success();
    }
}

pub fn memory_pool() -> DbPool {
    let pool = DbPool::in_memory().expect("open in-memory db");
    init_db(&pool).expect("run migrations");
    pool
}

pub fn service() -> ToilService {
    ToilService::new(memory_pool(), &Config::default())
}

pub fn ann() -> Actor {
    Actor::user(ANN)
}

pub fn bob() -> Actor {
    Actor::user(BOB)
}

pub fn boss() -> Actor {
    Actor::admin(BOSS)
}

pub fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid date")
}

/// In-memory entry for the pure calculators.
pub fn entry(date: &str, requested: &str, used: &str, status: EntryStatus) -> ToilEntry {
    let date = d(date);
    ToilEntry {
        id: 0,
        user_id: ANN.to_string(),
        date,
        requested_hours: requested.to_string(),
        used_hours: used.to_string(),
        status,
        comments: None,
        admin_comments: None,
        week_start: week_start(date),
        created_at: String::new(),
        updated_at: String::new(),
    }
}

/// Write an entry straight into the database, bypassing policy checks.
pub fn seed_entry(
    pool: &DbPool,
    user: &str,
    date: &str,
    requested: &str,
    used: &str,
    status: EntryStatus,
) -> ToilEntry {
    let date = d(date);
    let draft = EntryDraft {
        user_id: user.to_string(),
        date,
        requested_hours: requested.to_string(),
        used_hours: used.to_string(),
        comments: None,
        week_start: week_start(date),
        initial_status: status,
    };
    pool.run(|conn| upsert_entry(conn, &draft)).expect("seed entry")
}
