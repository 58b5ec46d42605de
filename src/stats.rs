use std::io::Write;

use crate::errors::Result;
use crate::ga::Population;

/// Aggregate fitness of one generation.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GenerationStats {
    pub generation: usize,
    pub min: f64,
    pub mean: f64,
}

/// Append-only log with one record per generation.
#[derive(Debug, Clone, Default)]
pub struct StatisticsLog {
    records: Vec<GenerationStats>,
}

impl StatisticsLog {
    pub fn new() -> Self {
        StatisticsLog::default()
    }

    /// Record the min and mean fitness of an evaluated population.
    pub fn record(&mut self, generation: usize, population: &Population) -> GenerationStats {
        if let Some(last) = self.records.last() {
            assert!(generation > last.generation, "generations must be recorded in order");
        }
        let stats = GenerationStats {
            generation,
            min: population.min_fitness().raw(),
            mean: population.mean_fitness(),
        };
        self.records.push(stats);
        stats
    }

    pub fn records(&self) -> &[GenerationStats] {
        self.records.as_slice()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&GenerationStats> {
        self.records.last()
    }

    pub fn min_values(&self) -> Vec<f64> {
        self.records.iter().map(|record| record.min).collect()
    }

    pub fn mean_values(&self) -> Vec<f64> {
        self.records.iter().map(|record| record.mean).collect()
    }

    /// Write the log as tab separated values with a `generation, min, mean` header.
    pub fn write_tsv<W: Write>(&self, out: W) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .from_writer(out);

        writer.write_record(&["generation", "min", "mean"])?;
        for record in self.records.iter() {
            writer.write_record(&[
                record.generation.to_string(),
                record.min.to_string(),
                format!("{:.3}", record.mean),
            ])?;
        }
        writer.flush()?;
        Ok(())
    }
}
