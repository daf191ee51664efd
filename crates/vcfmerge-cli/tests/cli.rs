use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::process::Output;
use tempfile::TempDir;

const CONTACTS: &str = "BEGIN:VCARD\r\n\
VERSION:3.0\r\n\
FN:Ada Lovelace\r\n\
TEL;TYPE=CELL:0151 234 5678\r\n\
EMAIL:Ada@Example.com\r\n\
END:VCARD\r\n\
BEGIN:VCARD\r\n\
VERSION:3.0\r\n\
FN:Grace Hopper\r\n\
TEL:+1 650-253-0000\r\n\
END:VCARD\r\n\
BEGIN:VCARD\r\n\
VERSION:3.0\r\n\
FN:Ada Lovelace \r\n\
TEL:+49 151 2345678\r\n\
TEL:0151 765 4321\r\n\
EMAIL:ada@example.com \r\n\
EMAIL:ada@engines.org\r\n\
BDAY:1815-12-10\r\n\
END:VCARD\r\n\
BEGIN:VCARD\r\n\
VERSION:3.0\r\n\
EMAIL:nobody@example.com\r\n\
END:VCARD\r\n";

fn run(dir: &Path, args: &[&str]) -> Output {
    cargo_bin_cmd!("vcfmerge")
        .current_dir(dir)
        .env("XDG_CONFIG_HOME", dir.join("xdg"))
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("run command")
}

fn write_input(dir: &Path, data: &str) -> String {
    let path = dir.join("contacts.vcf");
    fs::write(&path, data).expect("write input");
    path.to_str().expect("input path").to_string()
}

#[test]
fn cli_merges_duplicate_names() {
    let temp = TempDir::new().expect("temp dir");
    let input = write_input(temp.path(), CONTACTS);
    let output = temp.path().join("out.vcf");
    let output_arg = output.to_str().expect("output path");

    let result = run(temp.path(), &[&input, "-o", output_arg, "-c", "de"]);
    assert!(result.status.success(), "command failed: {:?}", result);
    let stdout = String::from_utf8(result.stdout).expect("utf8");
    assert_eq!(
        stdout.trim_end(),
        format!("Success! 2 unique contacts written to '{output_arg}'")
    );

    let merged = fs::read_to_string(&output).expect("read output");
    assert_eq!(merged.matches("BEGIN:VCARD").count(), 2);
    let ada = merged.find("FN:Ada Lovelace").expect("ada");
    let grace = merged.find("FN:Grace Hopper").expect("grace");
    assert!(ada < grace);
    assert!(merged.contains("TEL;TYPE=CELL:+491512345678\r\n"));
    assert!(merged.contains("TEL:+491517654321\r\n"));
    assert_eq!(merged.matches("+491512345678").count(), 1);
    assert!(merged.contains("TEL:+16502530000\r\n"));
    assert!(merged.contains("EMAIL:Ada@Example.com\r\n"));
    assert!(merged.contains("EMAIL:ada@engines.org\r\n"));
    assert_eq!(merged.to_ascii_lowercase().matches("ada@example.com").count(), 1);
    assert!(merged.contains("BDAY:1815-12-10\r\n"));
    assert!(!merged.contains("nobody@example.com"));
}

#[test]
fn cli_writes_default_output_in_working_dir() {
    let temp = TempDir::new().expect("temp dir");
    let input = write_input(temp.path(), CONTACTS);

    let result = run(temp.path(), &[&input]);
    assert!(result.status.success(), "command failed: {:?}", result);
    let stdout = String::from_utf8(result.stdout).expect("utf8");
    assert!(stdout.contains("written to 'merged_contacts.vcf'"));
    assert!(temp.path().join("merged_contacts.vcf").exists());
}

#[test]
fn cli_remerge_is_stable() {
    let temp = TempDir::new().expect("temp dir");
    let input = write_input(temp.path(), CONTACTS);
    let first = temp.path().join("first.vcf");
    let second = temp.path().join("second.vcf");

    let result = run(temp.path(), &[&input, "-o", first.to_str().expect("path")]);
    assert!(result.status.success(), "command failed: {:?}", result);
    let result = run(
        temp.path(),
        &[
            first.to_str().expect("path"),
            "-o",
            second.to_str().expect("path"),
        ],
    );
    assert!(result.status.success(), "command failed: {:?}", result);

    let first = fs::read_to_string(first).expect("first");
    let second = fs::read_to_string(second).expect("second");
    assert_eq!(first, second);
}

#[test]
fn cli_reports_missing_input() {
    let temp = TempDir::new().expect("temp dir");
    let missing = temp.path().join("missing.vcf");
    let missing_arg = missing.to_str().expect("path");
    let output = temp.path().join("out.vcf");

    let result = run(
        temp.path(),
        &[missing_arg, "-o", output.to_str().expect("path")],
    );
    assert_eq!(result.status.code(), Some(1));
    let stdout = String::from_utf8(result.stdout).expect("utf8");
    assert_eq!(
        stdout.trim_end(),
        format!("Error: The file '{missing_arg}' was not found.")
    );
    assert!(!output.exists());
}

#[test]
fn cli_without_arguments_prints_usage() {
    let temp = TempDir::new().expect("temp dir");
    let result = run(temp.path(), &[]);
    assert_eq!(result.status.code(), Some(1));
    assert!(result.stdout.is_empty());
    let stderr = String::from_utf8(result.stderr).expect("utf8");
    assert!(stderr.contains("Usage"), "stderr: {stderr}");
    assert!(stderr.contains("--country"));
}

#[test]
fn cli_json_report() {
    let temp = TempDir::new().expect("temp dir");
    let input = write_input(temp.path(), CONTACTS);

    let result = run(temp.path(), &[&input, "--json", "-c", "de"]);
    assert!(result.status.success(), "command failed: {:?}", result);
    let report: Value = serde_json::from_slice(&result.stdout).expect("parse json");
    assert_eq!(report["country"], "DE");
    assert_eq!(report["output"], "merged_contacts.vcf");
    assert_eq!(report["records_read"], 4);
    assert_eq!(report["skipped_nameless"], 1);
    assert_eq!(report["duplicates_merged"], 1);
    assert_eq!(report["unique_contacts"], 2);
    assert_eq!(report["phones_added"], 1);
    assert_eq!(report["emails_added"], 1);
    assert_eq!(report["birthdays_filled"], 1);
    assert_eq!(report["warnings"].as_array().map(Vec::len), Some(0));
}

#[test]
fn cli_uses_config_defaults() {
    let temp = TempDir::new().expect("temp dir");
    let input = write_input(
        temp.path(),
        "BEGIN:VCARD\nFN:Grace Hopper\nTEL:(650) 253-0000\nEND:VCARD\n",
    );
    let config_path = temp.path().join("vcfmerge.toml");
    fs::write(
        &config_path,
        "default_country = \"us\"\noutput = \"from-config.vcf\"\n",
    )
    .expect("write config");

    let result = run(
        temp.path(),
        &[&input, "--config", config_path.to_str().expect("path")],
    );
    assert!(result.status.success(), "command failed: {:?}", result);
    let merged = fs::read_to_string(temp.path().join("from-config.vcf")).expect("output");
    assert!(merged.contains("TEL:+16502530000\r\n"));
}

#[test]
fn cli_flags_override_config() {
    let temp = TempDir::new().expect("temp dir");
    let input = write_input(
        temp.path(),
        "BEGIN:VCARD\nFN:Ada\nTEL:0151 234 5678\nEND:VCARD\n",
    );
    let config_path = temp.path().join("vcfmerge.toml");
    fs::write(&config_path, "default_country = \"US\"\n").expect("write config");

    let result = run(
        temp.path(),
        &[
            &input,
            "--config",
            config_path.to_str().expect("path"),
            "--country",
            "de",
            "--output",
            "flag.vcf",
        ],
    );
    assert!(result.status.success(), "command failed: {:?}", result);
    let merged = fs::read_to_string(temp.path().join("flag.vcf")).expect("output");
    assert!(merged.contains("TEL:+491512345678\r\n"));
}

#[test]
fn cli_rejects_invalid_config() {
    let temp = TempDir::new().expect("temp dir");
    let input = write_input(temp.path(), CONTACTS);
    let config_path = temp.path().join("vcfmerge.toml");
    fs::write(&config_path, "default_country = \"Germany\"\n").expect("write config");

    let result = run(
        temp.path(),
        &[&input, "--config", config_path.to_str().expect("path")],
    );
    assert_eq!(result.status.code(), Some(3));
    let stderr = String::from_utf8(result.stderr).expect("utf8");
    assert!(stderr.contains("error: load config"), "stderr: {stderr}");
}

#[test]
fn cli_fails_on_malformed_vcf() {
    let temp = TempDir::new().expect("temp dir");
    let input = write_input(temp.path(), "BEGIN:VCARD\nFN:Ada\nbroken line\nEND:VCARD\n");

    let result = run(temp.path(), &[&input]);
    assert_eq!(result.status.code(), Some(1));
    let stderr = String::from_utf8(result.stderr).expect("utf8");
    assert!(stderr.contains("error: parse vcf file"), "stderr: {stderr}");
    assert!(!temp.path().join("merged_contacts.vcf").exists());
}

#[test]
fn cli_unknown_country_still_merges() {
    let temp = TempDir::new().expect("temp dir");
    let input = write_input(
        temp.path(),
        "BEGIN:VCARD\nFN:Ada\nTEL:0151 234 5678\nTEL:+49 151 7654321\nEND:VCARD\n",
    );

    let result = run(temp.path(), &[&input, "-c", "xx"]);
    assert!(result.status.success(), "command failed: {:?}", result);
    let merged = fs::read_to_string(temp.path().join("merged_contacts.vcf")).expect("output");
    assert!(merged.contains("TEL:01512345678\r\n"));
    assert!(merged.contains("TEL:+491517654321\r\n"));
}
