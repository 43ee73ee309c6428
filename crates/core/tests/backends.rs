use std::fs;
use std::time::Duration;

use decomprove_core::model::Address;
use decomprove_core::services::backends::rizin::{
    parse_functions, FAKE_AFLJ_ENV, FAKE_PDG_ENV, FAKE_VERSION_ENV,
};
use decomprove_core::services::backends::{FixtureHost, RizinHost};
use decomprove_core::services::host::{
    DecompilerCollaborator, HostError, LoggingMonitor, ProgramCollaborator, DECOMPILE_TIMEOUT,
};
use tempfile::tempdir;

const FIXTURE: &str = r#"[
    {"name": "beta", "address": "0x200", "code": "int beta(void) { return 2; }"},
    {"name": "alpha", "address": "100", "code": "int alpha(){return 1;}"},
    {"name": "broken", "address": "0x300", "completed": false}
]"#;

#[test]
fn fixture_host_enumerates_and_resolves_by_address() {
    let host = FixtureHost::from_json(FIXTURE).unwrap();
    let functions = host.functions().unwrap();
    assert_eq!(functions.len(), 3);
    assert_eq!(functions[1].entry_address, Address(0x100));

    let handle = host.resolve("alpha", Address(0x100)).unwrap().expect("alpha resolves");
    assert_eq!(handle.name(), "alpha");
    assert!(host.resolve("ghost", Address(0xdead)).unwrap().is_none());
}

#[test]
fn fixture_host_decompiles_or_reports_incomplete() {
    let host = FixtureHost::from_json(FIXTURE).unwrap();
    let alpha = host.resolve("alpha", Address(0x100)).unwrap().unwrap();
    let result = host.decompile(&alpha, DECOMPILE_TIMEOUT, &LoggingMonitor).unwrap();
    assert!(result.completed);
    assert_eq!(result.c_code(), "int alpha(){return 1;}");

    let broken = host.resolve("broken", Address(0x300)).unwrap().unwrap();
    let result = host.decompile(&broken, DECOMPILE_TIMEOUT, &LoggingMonitor).unwrap();
    assert!(!result.completed);
    assert!(result.error_message.is_some());
}

#[test]
fn fixture_host_rejects_bad_addresses_and_missing_files() {
    let err = FixtureHost::from_json(r#"[{"name":"x","address":"zz"}]"#).unwrap_err();
    assert!(matches!(err, HostError::Fixture(_)), "got {err:?}");

    let err = FixtureHost::load(std::path::Path::new("does_not_exist.json")).unwrap_err();
    assert!(matches!(err, HostError::MissingBinary(_)), "got {err:?}");
}

#[test]
fn rizin_host_errors_for_missing_binary() {
    let err = RizinHost::new("does_not_exist.bin", None).unwrap_err();
    assert!(format!("{err:?}").contains("MissingBinary"));
}

#[test]
fn parses_aflj_and_skips_incomplete_entries() {
    let functions = parse_functions(
        r#"[{"offset":4096,"name":"main","size":32},{"name":"no_offset"},{"offset":8192,"name":"sym.helper"}]"#,
    )
    .unwrap();
    assert_eq!(functions.len(), 2);
    assert_eq!(functions[0].name(), "main");
    assert_eq!(functions[0].size, Some(32));
    assert_eq!(functions[1].entry_address(), Address(8192));

    assert!(parse_functions("not json").is_err());
}

#[test]
fn rizin_host_uses_fake_output_without_rizin_installed() {
    let temp = tempdir().unwrap();
    let bin = temp.path().join("bin");
    fs::write(&bin, b"bin").unwrap();

    // Fake rizin output to avoid an external dependency in CI.
    let aflj = temp.path().join("aflj.json");
    fs::write(&aflj, r#"[{"offset":4096,"name":"func_b"},{"offset":8192,"name":"func_a"}]"#)
        .unwrap();
    let pdg = temp.path().join("pdg.c");
    fs::write(&pdg, "void func_a(void)\n{\n  return;\n}\n").unwrap();
    let empty_pdg = temp.path().join("empty.c");
    fs::write(&empty_pdg, "\n").unwrap();

    std::env::set_var(FAKE_AFLJ_ENV, &aflj);
    std::env::set_var(FAKE_PDG_ENV, &pdg);
    std::env::set_var(FAKE_VERSION_ENV, "rizin 0.7.0-fake");

    let host = RizinHost::new(&bin, Some("rizin-not-installed".into())).unwrap();
    assert_eq!(host.version().unwrap(), "rizin 0.7.0-fake");

    let functions = host.functions().unwrap();
    assert_eq!(functions.len(), 2);
    // The listing is cached, so resolving does not read aflj output again.
    fs::remove_file(&aflj).unwrap();
    assert_eq!(host.functions().unwrap(), functions);
    let handle = host.resolve("func_a", Address(8192)).unwrap().expect("func_a resolves");
    let result = host.decompile(&handle, Duration::from_secs(5), &LoggingMonitor).unwrap();
    assert!(result.completed);
    assert!(result.c_code().contains("void func_a(void)"));

    std::env::set_var(FAKE_PDG_ENV, &empty_pdg);
    let result = host.decompile(&handle, Duration::from_secs(5), &LoggingMonitor).unwrap();
    assert!(!result.completed);

    std::env::remove_var(FAKE_AFLJ_ENV);
    std::env::remove_var(FAKE_PDG_ENV);
    std::env::remove_var(FAKE_VERSION_ENV);
}
