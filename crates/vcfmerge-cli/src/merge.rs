use crate::error::input_not_found;
use anyhow::{Context as _, Result};
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::{debug, info, warn};
use vcfmerge_config as config;
use vcfmerge_core::{MergeEngine, MergeReport, Region};
use vcfmerge_vcf::{parse_vcf, write_vcf, FileSource, VcfError, VcfSource};

#[derive(Debug)]
pub struct MergeArgs {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub country: Option<String>,
    pub config: Option<PathBuf>,
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct MergeSummary {
    input: String,
    output: String,
    country: String,
    #[serde(flatten)]
    report: MergeReport,
    warnings: Vec<String>,
}

pub fn merge_file(args: MergeArgs) -> Result<()> {
    let app_config = config::load(args.config.clone()).with_context(|| "load config")?;
    debug!(
        default_country = %app_config.default_country,
        output = %app_config.output.display(),
        "config resolved"
    );

    let output = args.output.unwrap_or(app_config.output);
    let country = args
        .country
        .unwrap_or(app_config.default_country)
        .to_ascii_uppercase();
    let region = match country.parse::<Region>() {
        Ok(region) => Some(region),
        Err(err) => {
            warn!(%err, "only numbers with a leading + will be converted to E.164");
            None
        }
    };

    let source = FileSource::new(&args.input);
    let data = match source.fetch_vcf() {
        Ok(data) => data,
        Err(VcfError::MissingInput(path)) => return Err(input_not_found(path)),
        Err(err) => return Err(err.into()),
    };
    let parsed = parse_vcf(&data)
        .with_context(|| format!("parse vcf file {}", source.source_name()))?;
    for warning in &parsed.warnings {
        warn!(source = source.source_name(), "{warning}");
    }
    debug!(records = parsed.records.len(), "vcf parsed");

    let mut engine = MergeEngine::new(region);
    for record in parsed.records {
        engine.ingest(record);
    }
    let (merged, report) = engine.finish();
    info!(
        unique = report.unique_contacts,
        duplicates = report.duplicates_merged,
        skipped = report.skipped_nameless,
        "merge finished"
    );

    let rendered = write_vcf(merged.records());
    fs::write(&output, rendered)
        .with_context(|| format!("write output file {}", output.display()))?;

    if args.json {
        return print_json(&MergeSummary {
            input: args.input.display().to_string(),
            output: output.display().to_string(),
            country,
            report,
            warnings: parsed.warnings,
        });
    }

    println!(
        "Success! {} unique contacts written to '{}'",
        report.unique_contacts,
        output.display()
    );
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
