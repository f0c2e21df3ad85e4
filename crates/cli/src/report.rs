//! Result files written by `drift run`.

use anyhow::{Context, Result};
use drift_sim::evolution::EffectHistogram;
use drift_sim::simulation::{ChromosomeRow, DeathRecord, GenomeMap, YearStats};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const DEATH_HEADER: [&str; 23] = [
    "year",
    "cause",
    "id",
    "father",
    "mother",
    "sex",
    "birth_year",
    "age",
    "lifespan",
    "spouse",
    "birth_count",
    "latitude",
    "longitude",
    "fitness",
    "alleles",
    "blocks",
    "centromeres",
    "y_depth",
    "mito_depth",
    "min_genealogical",
    "max_genealogical",
    "mutations",
    "descendant",
];

/// Output file paths for one simulation name.
#[derive(Debug, Clone)]
pub struct ReportPaths {
    dir: PathBuf,
    name: String,
}

impl ReportPaths {
    pub fn new(dir: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            name: name.into(),
        }
    }

    pub fn results(&self) -> PathBuf {
        self.dir.join(format!("{}_results.csv", self.name))
    }

    pub fn deaths(&self, run: usize) -> PathBuf {
        self.dir.join(format!("{}-{run}_deaths.csv", self.name))
    }

    pub fn histogram(&self, run: usize) -> PathBuf {
        self.dir
            .join(format!("{}-{run}_mutation_histogram.csv", self.name))
    }

    pub fn genome_map(&self, run: usize) -> PathBuf {
        self.dir.join(format!("{}-{run}_genome_map.txt", self.name))
    }
}

/// Buffered comma-separated file with a header row.
pub struct CsvWriter {
    path: PathBuf,
    out: BufWriter<File>,
}

impl CsvWriter {
    pub fn create(path: &Path, header: &[&str]) -> Result<Self> {
        let file =
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
        let mut writer = Self {
            path: path.to_path_buf(),
            out: BufWriter::new(file),
        };
        writer.row(header)?;
        Ok(writer)
    }

    pub fn row<S: AsRef<str>>(&mut self, fields: &[S]) -> Result<()> {
        let line = fields
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(",");
        writeln!(self.out, "{line}")
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }

    pub fn stats(&mut self, stats: &YearStats) -> Result<()> {
        self.row(&stats.to_record())
    }

    pub fn deaths(&mut self, records: &[DeathRecord]) -> Result<()> {
        for record in records {
            self.row(&death_record(record))?;
        }
        Ok(())
    }

    pub fn finish(mut self) -> Result<()> {
        self.out
            .flush()
            .with_context(|| format!("Failed to flush {}", self.path.display()))
    }
}

fn optional_id(id: Option<u64>) -> String {
    id.map_or_else(|| "-1".to_string(), |id| id.to_string())
}

fn death_record(record: &DeathRecord) -> Vec<String> {
    let lineage = record.lineage;
    vec![
        record.year.to_string(),
        record.cause.tag().to_string(),
        record.id.to_string(),
        optional_id(record.father),
        optional_id(record.mother),
        record.sex.code().to_string(),
        record.birth_year.to_string(),
        record.age.to_string(),
        record.lifespan.to_string(),
        optional_id(record.spouse),
        record.birth_count.to_string(),
        record.latitude.to_string(),
        record.longitude.to_string(),
        record.fitness.to_string(),
        record.allele_count.to_string(),
        record.num_blocks.to_string(),
        record.centromere_count.to_string(),
        lineage.y_depth.to_string(),
        lineage.mito_depth.to_string(),
        lineage.min_genealogical.to_string(),
        lineage.max_genealogical.to_string(),
        record.mutation_count.to_string(),
        u8::from(lineage.is_descendant()).to_string(),
    ]
}

pub fn write_histogram(path: &Path, histogram: &EffectHistogram) -> Result<()> {
    let mut csv = CsvWriter::create(path, &["effect", "count"])?;
    for (bin, count) in histogram.iter() {
        csv.row(&[bin.to_string(), count.to_string()])?;
    }
    csv.finish()
}

/// One genome copy as `0`/`1` text, `|` between arms, `||` between chromosomes.
pub fn render_copy(rows: &[ChromosomeRow]) -> String {
    let bits = |arm: &[bool]| arm.iter().map(|&b| if b { '1' } else { '0' }).collect::<String>();
    rows.iter()
        .map(|row| format!("{}|{}", bits(&row.p), bits(&row.q)))
        .collect::<Vec<_>>()
        .join("||")
}

/// One line per genome copy: `id`, copy index, then the rendered bits.
pub fn write_genome_map(path: &Path, map: &GenomeMap) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut out = BufWriter::new(file);
    for entry in map.iter() {
        for (copy, rows) in entry.copies.iter().enumerate() {
            writeln!(out, "{}\t{copy}\t{}", entry.id, render_copy(rows))
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
    }
    out.flush()
        .with_context(|| format!("Failed to flush {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use drift_sim::simulation::GenomeMapEntry;
    use tempfile::tempdir;

    #[test]
    fn test_report_paths() {
        let paths = ReportPaths::new("out", "model");
        assert_eq!(paths.results(), PathBuf::from("out/model_results.csv"));
        assert_eq!(paths.deaths(2), PathBuf::from("out/model-2_deaths.csv"));
        assert_eq!(
            paths.genome_map(1),
            PathBuf::from("out/model-1_genome_map.txt")
        );
    }

    #[test]
    fn test_render_copy_delimiters() {
        let rows = vec![
            ChromosomeRow {
                p: vec![true, false],
                q: vec![true],
            },
            ChromosomeRow {
                p: vec![],
                q: vec![false, true],
            },
        ];
        assert_eq!(render_copy(&rows), "10|1|||01");
    }

    #[test]
    fn test_results_csv_has_header_and_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("results.csv");
        let mut csv = CsvWriter::create(&path, &YearStats::HEADER).unwrap();
        csv.stats(&YearStats::default()).unwrap();
        csv.finish().unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("run,year,n,"));
        assert_eq!(
            lines[1].split(',').count(),
            YearStats::HEADER.len()
        );
    }

    #[test]
    fn test_genome_map_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("map.txt");
        let row = ChromosomeRow {
            p: vec![true],
            q: vec![false],
        };
        let map = GenomeMap {
            entries: vec![GenomeMapEntry {
                id: 7,
                copies: [vec![row.clone()], vec![row]],
            }],
        };
        write_genome_map(&path, &map).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "7\t0\t1|0\n7\t1\t1|0\n");
    }
}
