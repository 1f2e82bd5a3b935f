//! Assertion helpers for tests.

use gbdedup::services::{BatchReport, ImageOutcome};
use pretty_assertions::assert_eq;

/// Outcomes of a batch keyed by source file name, in listing order.
pub fn outcomes(report: &BatchReport) -> Vec<(String, ImageOutcome)> {
    report
        .images
        .iter()
        .map(|image| {
            let name = image
                .source
                .file_name()
                .unwrap()
                .to_string_lossy()
                .into_owned();
            (name, image.outcome.clone())
        })
        .collect()
}

pub fn archived(identifier: &str) -> ImageOutcome {
    ImageOutcome::Archived {
        identifier: identifier.to_string(),
    }
}

pub fn duplicate(of: &str, distance: u32) -> ImageOutcome {
    ImageOutcome::Duplicate {
        of: of.to_string(),
        distance,
    }
}

/// Assert archived/duplicate/failed counts of a batch
pub fn assert_counts(report: &BatchReport, archived: usize, duplicates: usize, failed: usize) {
    assert_eq!(
        (report.archived(), report.duplicates(), report.failed()),
        (archived, duplicates, failed),
        "Unexpected batch counts: {:#?}",
        report.images
    );
}

/// Assert bytes are a PNG file
pub fn assert_png(bytes: &[u8]) {
    assert!(
        bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]),
        "Expected PNG image, got {} bytes starting with {:?}",
        bytes.len(),
        &bytes[..8.min(bytes.len())]
    );
}
