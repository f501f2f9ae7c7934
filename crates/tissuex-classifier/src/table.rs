//! Tab-separated tables.
//!
//! Matrices and abundance tables share one layout: a header row
//! `gene<TAB>col1<TAB>col2…` followed by one row per gene. Empty cells and
//! `NA`/`NaN` read as missing. Parse errors report 1-based line and field
//! numbers. Sample annotations are a headed table with
//! `sample`, `body_part`, `mapping_rate` and `num_reads` columns.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use tissuex_common::{Result, TissuexError};

use crate::aggregate::{SampleAbundance, SampleAnnotation};
use crate::classify::ClassificationReport;
use crate::matrix::ExpressionMatrix;

const MISSING: &str = "NA";
const PART_SEPARATOR: &str = ",";

fn tsv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .from_reader(reader)
}

fn tsv_writer<W: Write>(writer: W) -> csv::Writer<W> {
    csv::WriterBuilder::new().delimiter(b'\t').from_writer(writer)
}

fn parse_cell(cell: &str, line: u64, column: usize) -> Result<f64> {
    let cell = cell.trim();
    if cell.is_empty() || cell.eq_ignore_ascii_case("na") || cell.eq_ignore_ascii_case("nan") {
        return Ok(f64::NAN);
    }
    cell.parse::<f64>().map_err(|_| TissuexError::Parse {
        line,
        column,
        message: format!("not a number: '{cell}'"),
    })
}

/// Row ids, column ids and values of a `gene × column` table.
fn read_labelled<R: Read>(reader: R) -> Result<(Vec<String>, Vec<String>, Vec<Vec<f64>>)> {
    let mut reader = tsv_reader(reader);
    let columns: Vec<String> = reader.headers()?.iter().skip(1).map(str::to_string).collect();

    let mut ids = Vec::new();
    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let id = record.get(0).unwrap_or_default().trim().to_string();
        let row = record
            .iter()
            .enumerate()
            .skip(1)
            .map(|(j, cell)| parse_cell(cell, line, j + 1))
            .collect::<Result<Vec<f64>>>()?;
        ids.push(id);
        rows.push(row);
    }
    Ok((ids, columns, rows))
}

pub fn read_matrix<R: Read>(reader: R) -> Result<ExpressionMatrix> {
    let (genes, body_parts, rows) = read_labelled(reader)?;
    ExpressionMatrix::new(genes, body_parts, rows)
}

pub fn read_matrix_path(path: impl AsRef<Path>) -> Result<ExpressionMatrix> {
    read_matrix(File::open(path)?)
}

pub fn read_abundance<R: Read>(reader: R) -> Result<SampleAbundance> {
    let (genes, samples, rows) = read_labelled(reader)?;
    SampleAbundance::new(genes, samples, rows)
}

pub fn read_abundance_path(path: impl AsRef<Path>) -> Result<SampleAbundance> {
    read_abundance(File::open(path)?)
}

pub fn read_annotations<R: Read>(reader: R) -> Result<Vec<SampleAnnotation>> {
    let mut reader = tsv_reader(reader);
    let annotations = reader
        .deserialize()
        .collect::<std::result::Result<Vec<SampleAnnotation>, csv::Error>>()?;
    Ok(annotations)
}

pub fn read_annotations_path(path: impl AsRef<Path>) -> Result<Vec<SampleAnnotation>> {
    read_annotations(File::open(path)?)
}

pub fn write_matrix<W: Write>(writer: W, matrix: &ExpressionMatrix) -> Result<()> {
    let mut w = tsv_writer(writer);
    let mut header = vec!["gene".to_string()];
    header.extend(matrix.body_parts().iter().cloned());
    w.write_record(&header)?;
    for (gene, row) in matrix.rows() {
        let mut fields = Vec::with_capacity(row.len() + 1);
        fields.push(gene.to_string());
        fields.extend(row.iter().map(|v| {
            if v.is_finite() {
                v.to_string()
            } else {
                MISSING.to_string()
            }
        }));
        w.write_record(&fields)?;
    }
    w.flush()?;
    Ok(())
}

/// One line per emitted gene: `gene score category specific_parts`, parts
/// joined with commas. Fails when a body part name contains a comma.
pub fn write_records<W: Write>(writer: W, report: &ClassificationReport, precision: usize) -> Result<()> {
    if let Some(part) = report.body_parts.iter().find(|p| p.contains(PART_SEPARATOR)) {
        return Err(TissuexError::invalid_input(format!(
            "body part '{part}' contains '{PART_SEPARATOR}' and cannot be listed in specific_parts"
        )));
    }
    let mut w = tsv_writer(writer);
    w.write_record(["gene", "score", "category", "specific_parts"])?;
    for r in &report.records {
        let score = format!("{:.*}", precision, r.score);
        let parts = r.specific_parts.join(PART_SEPARATOR);
        w.write_record([r.gene.as_str(), score.as_str(), r.category.as_str(), parts.as_str()])?;
    }
    w.flush()?;
    Ok(())
}
