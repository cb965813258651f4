//! Analysis pipeline property tests
//!
//! Exercises the heuristic pipeline end-to-end through the orchestrator
//! and checks the invariants every result must satisfy: sample bounds,
//! proportion sums, clamp ranges, determinism, and the content-gate
//! routing policy.

use cytoscan_sa::models::{AnalysisParameters, AnalysisStatus, MediaKind};
use cytoscan_sa::services::{
    AnalysisOrchestrator, ByteSampler, MorphologyEstimator, MotionClassifier, UploadedMedia,
};

fn orchestrator() -> AnalysisOrchestrator {
    AnalysisOrchestrator::new(AnalysisParameters::default())
}

fn media(bytes: Vec<u8>, kind: MediaKind) -> UploadedMedia {
    UploadedMedia {
        bytes,
        kind,
        filename: "sample.bin".to_string(),
    }
}

/// Deterministic pseudo-noise buffer (no RNG in tests)
fn noise_buffer(len: usize) -> Vec<u8> {
    let mut value: u32 = 0x2545_F491;
    (0..len)
        .map(|_| {
            // xorshift keeps the byte distribution spread without rand
            value ^= value << 13;
            value ^= value >> 17;
            value ^= value << 5;
            (value & 0xFF) as u8
        })
        .collect()
}

#[test]
fn empty_buffer_yields_flagged_zero_result() {
    let outcome = orchestrator().analyze(&media(Vec::new(), MediaKind::Video));

    assert_eq!(outcome.status, AnalysisStatus::NoContentDetected);
    assert_eq!(outcome.cell_count, 0);
    assert_eq!(outcome.average_speed, 0.0);
    assert_eq!(outcome.motility_percent, 0.0);
    assert_eq!(outcome.concentration, 0.0);
    assert_eq!(outcome.total_motile_count, 0);
    assert_eq!(outcome.movement_pattern.static_, 100.0);
    assert_eq!(outcome.movement_pattern.linear, 0.0);
    assert_eq!(outcome.movement_pattern.circular, 0.0);
    assert_eq!(outcome.movement_pattern.hyperactive, 0.0);
}

#[test]
fn sample_count_respects_cap_for_all_buffer_sizes() {
    let cap = AnalysisParameters::default().sample_cap;
    let sampler = ByteSampler::new(cap);

    for len in [0, 1, 9, 10, cap - 1, cap, cap + 1, 123_456, 1_000_000] {
        let buffer = vec![0u8; len];
        let set = sampler.sample(&buffer);
        assert!(set.len() <= cap, "cap exceeded for len {}", len);

        if len > 0 && len <= cap {
            assert_eq!(set.len(), len, "short buffer not taken whole at len {}", len);
        }
        if len > cap {
            // Coverage: the last drawn sample sits near the end of the buffer
            assert!(set.stride() * (set.len() - 1) < len, "coverage hole at len {}", len);
        }
    }
}

#[test]
fn ten_byte_buffer_is_sampled_whole() {
    let buffer: Vec<u8> = (0..10).collect();
    let set = ByteSampler::new(AnalysisParameters::default().sample_cap).sample(&buffer);
    assert_eq!(set.as_slice(), buffer.as_slice());
    assert_eq!(set.stride(), 1);
}

#[test]
fn movement_proportions_always_sum_to_100() {
    let classifier = MotionClassifier::new(20.0, 10.0);

    // Degenerate all-zero-delta case included
    for avg in [0.0, 0.1, 3.0, 9.5, 10.5, 14.0, 19.5, 22.0, 60.0, 128.0, 255.0] {
        let p = classifier.classify(avg);
        assert_eq!(p.sum(), 100.0, "movement sum drifted at avg {}", avg);
    }

    // And end-to-end through the orchestrator
    for buffer in [vec![0u8; 65_536], noise_buffer(65_536)] {
        let outcome = orchestrator().analyze(&media(buffer, MediaKind::Video));
        assert_eq!(outcome.movement_pattern.sum(), 100.0);
    }
}

#[test]
fn morphology_proportions_always_sum_to_100() {
    let estimator = MorphologyEstimator::new();
    for delta in [0.0, 0.5, 4.0, 17.3, 64.0, 120.0, 200.0, 255.0] {
        let m = estimator.estimate(delta);
        assert_eq!(m.sum(), 100.0, "morphology sum drifted at delta {}", delta);
    }

    let outcome = orchestrator().analyze(&media(noise_buffer(65_536), MediaKind::Image));
    assert_eq!(outcome.status, AnalysisStatus::Completed);
    assert_eq!(outcome.morphology.sum(), 100.0);
}

#[test]
fn quality_score_stays_in_display_range_at_extremes() {
    let cases = [
        Vec::new(),
        vec![0u8; 65_536],
        vec![0xFFu8; 65_536],
        noise_buffer(65_536),
        noise_buffer(16),
        vec![7u8; 3],
    ];

    for bytes in cases {
        let outcome = orchestrator().analyze(&media(bytes, MediaKind::Video));
        assert!(
            (60.0..=98.0).contains(&outcome.quality_score),
            "quality {} out of display range",
            outcome.quality_score
        );
    }
}

#[test]
fn identical_buffers_yield_identical_results() {
    let bytes = noise_buffer(200_000);
    let orch = orchestrator();

    let first = orch.analyze(&media(bytes.clone(), MediaKind::Video));
    let second = orch.analyze(&media(bytes, MediaKind::Video));

    assert_eq!(first, second);
}

#[test]
fn constant_64k_buffer_fails_the_content_gate() {
    let outcome = orchestrator().analyze(&media(vec![0u8; 65_536], MediaKind::Video));
    assert_eq!(outcome.status, AnalysisStatus::NoContentDetected);
    assert_eq!(outcome.cell_count, 0);
}

#[test]
fn noisy_64k_buffer_passes_the_content_gate() {
    let outcome = orchestrator().analyze(&media(noise_buffer(65_536), MediaKind::Video));

    assert_eq!(outcome.status, AnalysisStatus::Completed);
    assert!(
        (1..=500).contains(&outcome.cell_count),
        "cell count {} outside realistic range",
        outcome.cell_count
    );
    assert!((0.0..=100.0).contains(&outcome.motility_percent));
    assert!(outcome.average_speed >= 0.0);
    assert!(outcome.concentration >= 0.0);
    assert!(outcome.total_motile_count <= outcome.cell_count);
}

#[test]
fn quality_is_still_assessed_when_no_content_is_found() {
    // Media quality is independent of whether biological content exists
    let outcome = orchestrator().analyze(&media(vec![0u8; 65_536], MediaKind::Image));
    assert_eq!(outcome.status, AnalysisStatus::NoContentDetected);
    assert!((60.0..=98.0).contains(&outcome.quality_score));
}

#[test]
fn seeded_jitter_is_deterministic_and_bounded() {
    let params = AnalysisParameters {
        jitter_seed: Some(99),
        ..Default::default()
    };
    let orch = AnalysisOrchestrator::new(params);
    let bytes = noise_buffer(65_536);

    let first = orch.analyze(&media(bytes.clone(), MediaKind::Video));
    let second = orch.analyze(&media(bytes, MediaKind::Video));

    assert_eq!(first, second);
    assert!((0.0..=100.0).contains(&first.motility_percent));
    assert!(first.average_speed >= 0.0);
    assert_eq!(first.movement_pattern.sum(), 100.0);
    assert_eq!(first.morphology.sum(), 100.0);
}

#[test]
fn processing_time_tracks_size_not_wall_clock() {
    let small = orchestrator().analyze(&media(noise_buffer(1024), MediaKind::Video));
    let large = orchestrator().analyze(&media(noise_buffer(8 * 1024 * 1024), MediaKind::Video));

    assert_eq!(small.processing_time_seconds, 3);
    assert!(large.processing_time_seconds > small.processing_time_seconds);
}
