//! On-disk run cache: one directory per run id holding `manifest.json` and,
//! for transition runs, one `path.jsonl` line per time node.

use crate::types::{PathRecord, RunManifest, RunType};
use crate::{ResultsError, ResultsResult};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

const MANIFEST_FILE: &str = "manifest.json";
const PATH_FILE: &str = "path.jsonl";

#[derive(Clone)]
pub struct RunStore {
    runs_dir: PathBuf,
}

impl RunStore {
    pub fn new(runs_dir: PathBuf) -> ResultsResult<Self> {
        fs::create_dir_all(&runs_dir)?;
        Ok(Self { runs_dir })
    }

    /// Cache for a scenario file: `<scenario dir>/.ramsey/runs`.
    pub fn for_scenario(scenario_path: &Path) -> ResultsResult<Self> {
        let scenario_dir = scenario_path
            .parent()
            .ok_or_else(|| ResultsError::InvalidPath {
                message: "scenario path has no parent directory".to_string(),
            })?;
        Self::new(scenario_dir.join(".ramsey").join("runs"))
    }

    fn run_dir(&self, run_id: &str) -> PathBuf {
        self.runs_dir.join(run_id)
    }

    pub fn has_run(&self, run_id: &str) -> bool {
        self.run_dir(run_id).join(MANIFEST_FILE).is_file()
    }

    /// Store a solved run. Steady runs carry no records; transition runs
    /// carry exactly one record per node, in node order.
    pub fn save_run(&self, manifest: &RunManifest, records: &[PathRecord]) -> ResultsResult<()> {
        check_records(manifest, records)?;

        let run_dir = self.run_dir(&manifest.run_id);
        fs::create_dir_all(&run_dir)?;

        let mut path_out = BufWriter::new(File::create(run_dir.join(PATH_FILE))?);
        for record in records {
            serde_json::to_writer(&mut path_out, record)?;
            path_out.write_all(b"\n")?;
        }
        path_out.flush()?;

        // Manifest last: `has_run` only sees complete runs.
        fs::write(
            run_dir.join(MANIFEST_FILE),
            serde_json::to_string_pretty(manifest)?,
        )?;
        Ok(())
    }

    pub fn load_manifest(&self, run_id: &str) -> ResultsResult<RunManifest> {
        if !self.has_run(run_id) {
            return Err(ResultsError::RunNotFound {
                run_id: run_id.to_string(),
            });
        }
        let content = fs::read_to_string(self.run_dir(run_id).join(MANIFEST_FILE))?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Read the stored path, rejecting records that are out of node order.
    pub fn load_path(&self, run_id: &str) -> ResultsResult<Vec<PathRecord>> {
        let file = self.run_dir(run_id).join(PATH_FILE);
        if !file.is_file() {
            return Err(ResultsError::RunNotFound {
                run_id: run_id.to_string(),
            });
        }

        let mut records = Vec::new();
        for line in BufReader::new(File::open(file)?).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: PathRecord = serde_json::from_str(&line)?;
            if record.node != records.len() {
                return Err(ResultsError::CorruptPath {
                    run_id: run_id.to_string(),
                    reason: format!(
                        "expected node {}, found node {}",
                        records.len(),
                        record.node
                    ),
                });
            }
            records.push(record);
        }
        Ok(records)
    }

    /// Manifest and path of one run, checked against each other.
    pub fn load_run(&self, run_id: &str) -> ResultsResult<(RunManifest, Vec<PathRecord>)> {
        let manifest = self.load_manifest(run_id)?;
        let records = self.load_path(run_id)?;
        check_records(&manifest, &records)?;
        Ok((manifest, records))
    }

    /// Runs recorded for `scenario_name`, oldest first.
    pub fn list_runs(&self, scenario_name: &str) -> ResultsResult<Vec<RunManifest>> {
        let mut runs = Vec::new();
        for entry in fs::read_dir(&self.runs_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let run_id = entry.file_name().to_string_lossy().into_owned();
            match self.load_manifest(&run_id) {
                Ok(manifest) if manifest.scenario_name == scenario_name => runs.push(manifest),
                Ok(_) => {}
                // Half-written or foreign directories are skipped.
                Err(ResultsError::RunNotFound { .. }) | Err(ResultsError::Json(_)) => {}
                Err(e) => return Err(e),
            }
        }
        runs.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(runs)
    }
}

fn check_records(manifest: &RunManifest, records: &[PathRecord]) -> ResultsResult<()> {
    let expected = match manifest.run_type {
        RunType::Steady => 0,
        RunType::Transition { nodes } => nodes,
    };
    if records.len() != expected {
        return Err(ResultsError::CorruptPath {
            run_id: manifest.run_id.clone(),
            reason: format!(
                "{} run expects {} records, got {}",
                manifest.run_type.label(),
                expected,
                records.len()
            ),
        });
    }
    if let Some((j, record)) = records.iter().enumerate().find(|(j, r)| r.node != *j) {
        return Err(ResultsError::CorruptPath {
            run_id: manifest.run_id.clone(),
            reason: format!("record {} is labelled node {}", j, record.node),
        });
    }
    Ok(())
}
