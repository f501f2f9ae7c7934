//! Shared fixtures for tissuex tests.
//!
//! Fixtures are plain data (identifiers, value rows, TSV text) so that any
//! crate in the workspace can build its own types from them.

use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Body parts of the small atlas fixture.
pub const ATLAS_PARTS: [&str; 5] = ["Leaf", "Root", "Seed", "Flower", "Stem"];

pub fn ids(xs: &[&str]) -> Vec<String> {
    xs.iter().map(|s| s.to_string()).collect()
}

/// `prefix0001`, `prefix0002`, …
pub fn numbered_ids(prefix: &str, n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("{prefix}{i:04}")).collect()
}

/// Hand-picked genes, one per outcome, over [`ATLAS_PARTS`]:
///
/// | gene | expected |
/// |---|---|
/// | `NULL1` | Null |
/// | `WEAK1` | Weak |
/// | `BROAD1` | Broad |
/// | `SEED1` | Specific (Seed) |
/// | `DUAL1` | Specific (Leaf, Flower) |
/// | `GAP1` | excluded (missing Stem) |
pub fn atlas_fixture() -> (Vec<String>, Vec<String>, Vec<Vec<f64>>) {
    let genes = ids(&["NULL1", "WEAK1", "BROAD1", "SEED1", "DUAL1", "GAP1"]);
    let rows = vec![
        vec![0.0, 0.4, 1.0, 0.9, 0.0],
        vec![2.0, 3.5, 4.9, 1.5, 0.0],
        vec![40.0, 35.0, 12.0, 50.0, 28.0],
        vec![0.0, 0.0, 900.0, 0.0, 0.0],
        vec![900.0, 0.0, 0.0, 6.0, 0.0],
        vec![30.0, 2.0, 0.0, 0.0, f64::NAN],
    ];
    (genes, ids(&ATLAS_PARTS), rows)
}

/// Random non-negative expression rows. Roughly a third of the cells are
/// zero, the rest spread over several orders of magnitude, with an
/// occasional high spike so that every category shows up.
pub fn random_rows(seed: u64, n_genes: usize, n_parts: usize) -> Vec<Vec<f64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n_genes)
        .map(|_| {
            let scale: f64 = 10f64.powf(rng.gen_range(-1.0..3.0));
            (0..n_parts)
                .map(|_| {
                    if rng.gen_bool(0.33) {
                        0.0
                    } else if rng.gen_bool(0.05) {
                        scale * rng.gen_range(10.0..100.0)
                    } else {
                        scale * rng.gen_range(0.0..1.0)
                    }
                })
                .collect()
        })
        .collect()
}

pub const MATRIX_TSV: &str = "gene\tLeaf\tRoot\n\
                              A\t0.2\t0.1\n\
                              B\t10\t1\n";

/// Three replicate runs per body part; `SRR006` fails the mapping-rate gate.
pub const ABUNDANCE_TSV: &str = "gene\tSRR001\tSRR002\tSRR003\tSRR004\tSRR005\tSRR006\n\
                                 G1\t120\t80\t100\t0\t1\t500\n\
                                 G2\t3\t4\t2\t2\t3\t3\n\
                                 G3\t0.1\t0\t0.3\t0\t0.2\t0\n";

pub const SAMPLES_TSV: &str = "sample\tbody_part\tmapping_rate\tnum_reads\n\
                               SRR001\tSeed\t0.92\t21000000\n\
                               SRR002\tSeed\t0.88\t18000000\n\
                               SRR003\tSeed\t0.90\t25000000\n\
                               SRR004\tRoot\t0.81\t16000000\n\
                               SRR005\tRoot\t0.79\t19000000\n\
                               SRR006\tRoot\t0.12\t30000000\n";

/// Write `contents` to `dir/name` and return the path.
pub fn write_fixture(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("failed to write fixture");
    path
}

pub fn tempdir() -> tempfile::TempDir {
    tempfile::tempdir().expect("failed to create temp dir")
}
