//! Sample table → median matrix → classification.

use tissuex_classifier::table::{read_abundance, read_annotations, read_matrix, write_records};
use tissuex_classifier::{aggregate_medians, classify, ExpressionCategory};
use tissuex_common::SampleFilterConfig;
use pretty_assertions::assert_eq;
use tissuex_test_utils::{ids, ABUNDANCE_TSV, MATRIX_TSV, SAMPLES_TSV};

#[test]
fn test_filtered_samples_drive_classification() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let abundance = read_abundance(ABUNDANCE_TSV.as_bytes()).unwrap();
    let annotations = read_annotations(SAMPLES_TSV.as_bytes()).unwrap();

    let medians = aggregate_medians(&abundance, &annotations, &SampleFilterConfig::default()).unwrap();
    assert_eq!(medians.body_parts(), &ids(&["Seed", "Root"])[..]);
    assert_eq!(medians.row(0), &[100.0, 0.5]);

    let report = classify(&medians);
    let g1 = report.record("G1").unwrap();
    assert_eq!(g1.category, ExpressionCategory::Specific);
    assert_eq!(g1.specific_parts, ids(&["Seed"]));
    assert_eq!(report.record("G2").unwrap().category, ExpressionCategory::Weak);
    assert_eq!(report.null_genes, ids(&["G3"]));
}

#[test]
fn test_low_quality_run_would_change_the_call() {
    let abundance = read_abundance(ABUNDANCE_TSV.as_bytes()).unwrap();
    let annotations = read_annotations(SAMPLES_TSV.as_bytes()).unwrap();

    // keeping SRR006 lifts the Root median of G1 to 1.0
    let keep_all = SampleFilterConfig { min_mapping_rate: 0.0, min_reads: 0 };
    let medians = aggregate_medians(&abundance, &annotations, &keep_all).unwrap();
    let report = classify(&medians);
    assert_eq!(report.record("G1").unwrap().category, ExpressionCategory::Broad);
}

#[test]
fn test_matrix_tsv_to_records() {
    let report = classify(&read_matrix(MATRIX_TSV.as_bytes()).unwrap());
    let mut out = Vec::new();
    write_records(&mut out, &report, 2).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "gene\tscore\tcategory\tspecific_parts\nB\t0.71\tBroad\t\n"
    );
}
