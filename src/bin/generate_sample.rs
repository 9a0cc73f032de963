use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::StringArray;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const ROWS: usize = 2000;

const TOPICS: &[&str] = &[
    "coronavirus", "SARS-CoV-2", "influenza", "MERS", "respiratory", "viral",
    "pneumonia", "COVID-19", "antibody", "vaccine", "transmission", "outbreak",
];
const SUBJECTS: &[&str] = &[
    "patients", "infection", "replication", "epidemiology", "immunity", "mortality",
    "children", "hospitals", "diagnosis", "treatment", "surveillance", "models",
];
const TEMPLATES: &[&str] = &[
    "{t} {s} in Wuhan",
    "Clinical characteristics of {t} {s}",
    "A study of {t} {s} and public health",
    "{t}: {s} during the pandemic",
    "Novel {t} {s} detected by sequencing",
    "Modelling {t} {s} with network data",
];
const JOURNALS: &[&str] = &[
    "PLoS One", "bioRxiv", "BMJ", "Lancet", "Nature", "Journal of Virology",
    "Virology", "Emerging Infectious Diseases", "Science", "Cell",
];
const SOURCES: &[&str] = &["PMC", "Medline", "WHO", "Elsevier", "ArXiv", "MedRxiv"];
const SURNAMES: &[&str] = &[
    "Zhang", "Smith", "Wang", "Garcia", "Müller", "Rossi", "Kim", "Okafor", "Silva",
];
const FILLER: &[&str] = &[
    "we", "report", "the", "results", "of", "a", "cohort", "analysis", "showing",
    "increased", "risk", "among", "older", "adults", "with", "comorbidities", "and",
    "reduced", "viral", "load", "after", "treatment",
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.below(items.len())]
    }

    /// Skewed pick: earlier items come up more often.
    fn pick_skewed<'a>(&mut self, items: &[&'a str]) -> &'a str {
        let u = self.next_f64();
        items[((u * u) * items.len() as f64) as usize % items.len()]
    }
}

/// One metadata row. `None` is written as an empty cell / parquet null.
struct Row {
    title: Option<String>,
    abstract_text: Option<String>,
    authors: Option<String>,
    journal: Option<String>,
    publish_time: Option<String>,
    source_x: Option<String>,
}

fn publish_time(rng: &mut SimpleRng) -> Option<String> {
    // Mostly 2020, with a long tail back to 2002 and a few messy values.
    let year = if rng.chance(0.6) {
        2020
    } else {
        2002 + rng.below(18) as i32
    };
    let month = 1 + rng.below(12);
    let day = 1 + rng.below(28);
    let roll = rng.next_f64();
    if roll < 0.04 {
        None
    } else if roll < 0.06 {
        Some("not-a-date".to_string())
    } else if roll < 0.12 {
        Some(year.to_string())
    } else if roll < 0.15 {
        Some(format!("{year} Mar {day}"))
    } else {
        Some(format!("{year}-{month:02}-{day:02}"))
    }
}

fn generate(rng: &mut SimpleRng) -> Vec<Row> {
    (0..ROWS)
        .map(|_| {
            let title = if rng.chance(0.02) {
                None
            } else {
                let template = rng.pick(TEMPLATES);
                Some(
                    template
                        .replace("{t}", rng.pick_skewed(TOPICS))
                        .replace("{s}", rng.pick(SUBJECTS)),
                )
            };
            let abstract_text = if rng.chance(0.2) {
                None
            } else {
                let words = 20 + rng.below(250);
                Some(
                    (0..words)
                        .map(|_| rng.pick(FILLER))
                        .collect::<Vec<_>>()
                        .join(" "),
                )
            };
            let authors = if rng.chance(0.05) {
                None
            } else {
                let n = 1 + rng.below(6);
                Some(
                    (0..n)
                        .map(|_| {
                            let surname = rng.pick(SURNAMES);
                            let initial = (b'A' + rng.below(26) as u8) as char;
                            format!("{surname}, {initial}.")
                        })
                        .collect::<Vec<_>>()
                        .join("; "),
                )
            };
            let journal = if rng.chance(0.1) {
                None
            } else {
                Some(rng.pick_skewed(JOURNALS).to_string())
            };
            Row {
                title,
                abstract_text,
                authors,
                journal,
                publish_time: publish_time(rng),
                source_x: Some(rng.pick_skewed(SOURCES).to_string()),
            }
        })
        .collect()
}

const COLUMNS: [&str; 6] = ["title", "abstract", "authors", "journal", "publish_time", "source_x"];

fn cells(row: &Row) -> [Option<&str>; 6] {
    [
        row.title.as_deref(),
        row.abstract_text.as_deref(),
        row.authors.as_deref(),
        row.journal.as_deref(),
        row.publish_time.as_deref(),
        row.source_x.as_deref(),
    ]
}

fn write_csv(rows: &[Row], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    writer.write_record(COLUMNS)?;
    for row in rows {
        writer.write_record(cells(row).map(|c| c.unwrap_or("")))?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(rows: &[Row], path: &Path) -> Result<()> {
    let schema = Arc::new(Schema::new(
        COLUMNS
            .iter()
            .map(|name| Field::new(*name, DataType::Utf8, true))
            .collect::<Vec<_>>(),
    ));
    let columns = (0..COLUMNS.len())
        .map(|i| {
            let values: Vec<Option<&str>> = rows.iter().map(|r| cells(r)[i]).collect();
            Arc::new(StringArray::from(values)) as arrow::array::ArrayRef
        })
        .collect();
    let batch = RecordBatch::try_new(schema.clone(), columns)
        .context("Failed to create RecordBatch")?;

    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("Failed to create writer")?;
    writer.write(&batch).context("Failed to write batch")?;
    writer.close().context("Failed to close writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let mut rng = SimpleRng::new(42);
    let rows = generate(&mut rng);

    let csv_path = out_dir.join("metadata.csv");
    let parquet_path = out_dir.join("metadata.parquet");
    write_csv(&rows, &csv_path)?;
    write_parquet(&rows, &parquet_path)?;

    println!(
        "Wrote {} rows to {} and {}",
        rows.len(),
        csv_path.display(),
        parquet_path.display()
    );
    Ok(())
}
