use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;

mod common;
use common::{rp, rp_in, seed_session, setup_home, setup_test_db};

fn init(home: &str, db: &str) {
    rp_in(home, db).args(["--test", "init"]).assert().success();
}

#[test]
fn init_creates_the_database() {
    let db = setup_test_db("cli_init");
    let home = setup_home("cli_init", &db);

    rp_in(&home, &db)
        .args(["--test", "init"])
        .assert()
        .success()
        .stdout(contains("Database initialized"));

    rp_in(&home, &db)
        .args(["db", "--info", "--check"])
        .assert()
        .success()
        .stdout(contains("20250301_0001_create_kv").and(contains("Integrity check passed")));
}

#[test]
fn config_check_reports_defaults_in_use() {
    let db = setup_test_db("cli_config");
    let home = setup_home("cli_config", &db);

    rp_in(&home, &db)
        .args(["config", "--check"])
        .assert()
        .success()
        .stdout(contains("sync_checkpoints"));

    rp_in(&home, &db)
        .args(["config", "--print"])
        .assert()
        .success()
        .stdout(contains("api_base_url").and(contains("09:50")));
}

#[test]
fn punch_requires_a_session() {
    let db = setup_test_db("cli_no_session");
    let home = setup_home("cli_no_session", &db);
    init(&home, &db);

    rp_in(&home, &db)
        .args(["punch", "in"])
        .assert()
        .failure()
        .stderr(contains("Not signed in"));
}

#[test]
fn punch_rejects_unknown_direction() {
    let db = setup_test_db("cli_bad_direction");
    let home = setup_home("cli_bad_direction", &db);
    init(&home, &db);
    seed_session(&db, "alice");

    rp_in(&home, &db)
        .args(["punch", "sideways"])
        .assert()
        .failure()
        .stderr(contains("Invalid punch type"));
}

#[test]
fn punch_in_then_today_shows_it() {
    let db = setup_test_db("cli_punch_today");
    let home = setup_home("cli_punch_today", &db);
    init(&home, &db);
    seed_session(&db, "alice");

    rp_in(&home, &db)
        .args(["punch", "in"])
        .assert()
        .success()
        .stdout(contains("You punched IN at"));

    rp_in(&home, &db)
        .args(["punch", "in"])
        .assert()
        .success()
        .stdout(contains("Already punched IN"));

    rp_in(&home, &db)
        .arg("today")
        .assert()
        .success()
        .stdout(
            contains("Punched IN")
                .and(contains("unknown"))
                .and(contains("1 punch(es) waiting")),
        );
}

#[test]
fn tick_forces_punch_out_when_location_is_off() {
    let db = setup_test_db("cli_tick_forced");
    let home = setup_home("cli_tick_forced", &db);
    init(&home, &db);
    seed_session(&db, "alice");

    rp_in(&home, &db).args(["punch", "in"]).assert().success();
    rp_in(&home, &db)
        .args(["device", "location", "off"])
        .assert()
        .success();

    // server unreachable: still exits 0
    rp_in(&home, &db).arg("tick").assert().success();

    rp_in(&home, &db)
        .arg("today")
        .assert()
        .success()
        .stdout(contains("Punched OUT").and(contains("2 punch(es) waiting")));

    rp_in(&home, &db)
        .args(["log", "--print", "--op", "notify"])
        .assert()
        .success()
        .stdout(contains("Automatic punch OUT"));
}

#[test]
fn tick_without_session_succeeds() {
    let db = setup_test_db("cli_tick_idle");
    let home = setup_home("cli_tick_idle", &db);
    init(&home, &db);

    rp_in(&home, &db).arg("tick").assert().success();
}

#[test]
fn device_fix_is_used_for_punches() {
    let db = setup_test_db("cli_device_fix");
    let home = setup_home("cli_device_fix", &db);
    init(&home, &db);

    rp_in(&home, &db)
        .args(["device", "fix", "--lat", "41.9028", "--lon", "12.4964"])
        .assert()
        .success();
    rp_in(&home, &db)
        .args(["device", "permission", "denied"])
        .assert()
        .success();

    rp_in(&home, &db)
        .args(["device", "show"])
        .assert()
        .success()
        .stdout(
            contains("device_fix")
                .and(contains("41.9028"))
                .and(contains("denied")),
        );
}

#[test]
fn sync_offline_keeps_punches() {
    let db = setup_test_db("cli_sync_offline");
    let home = setup_home("cli_sync_offline", &db);
    init(&home, &db);
    seed_session(&db, "alice");

    rp_in(&home, &db).args(["punch", "in"]).assert().success();
    rp_in(&home, &db)
        .args(["sync", "--now"])
        .assert()
        .success()
        .stdout(contains("Server unreachable"));
}

#[test]
fn version_flag_works() {
    rp().arg("--version")
        .assert()
        .success()
        .stdout(contains("rpunch"));
}
