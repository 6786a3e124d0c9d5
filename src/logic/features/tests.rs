//! Integration Tests for Feature Extraction
//!
//! Tests các sub-transforms ghép với nhau qua `StreamingExtractor`.

use std::collections::HashMap;

use crate::logic::dataset::Record;
use crate::logic::features::{
    artifacts::{ArtifactError, FittedArtifacts, TimeOrigin},
    encoder::OneHotEncoder,
    extractor::{ExtractError, FeatureExtractor, StreamingExtractor},
    hashing::FeatureHasher,
    layout::FeatureBlock,
    scaler::StandardScaler,
    tfidf::{Norm, TfidfVectorizer},
};

pub(crate) fn sample_artifacts() -> FittedArtifacts {
    let vocabulary: HashMap<String, usize> = [("syn", 0), ("ack", 1), ("who", 2), ("has", 3)]
        .into_iter()
        .map(|(t, i)| (t.to_string(), i))
        .collect();

    FittedArtifacts {
        feature_version: crate::logic::features::FEATURE_VERSION,
        time_origin: TimeOrigin::Zero,
        time_scaler: None,
        hasher: FeatureHasher::new(20),
        protocol_encoder: OneHotEncoder::new(vec!["ARP".into(), "TCP".into(), "UDP".into()]),
        length_scaler: StandardScaler { mean: 60.0, scale: 20.0 },
        info_vectorizer: TfidfVectorizer {
            vocabulary,
            idf: vec![1.0, 1.2, 1.5, 1.5],
            lowercase: true,
            norm: Norm::L2,
            sublinear_tf: false,
        },
    }
}

pub(crate) fn record(no: u64, time: f64, protocol: &str, length: u32) -> Record {
    Record {
        sequence_no: no,
        time,
        source: "192.168.0.10".into(),
        destination: "192.168.0.1".into(),
        protocol: protocol.into(),
        length,
        info: "[SYN] Seq=0".into(),
    }
}

#[test]
fn test_layout_width_matches_artifacts() {
    let extractor = StreamingExtractor::new(sample_artifacts());
    // time + 2 * 20 hash + 3 protocols + length + 4 terms
    assert_eq!(extractor.width(), 1 + 40 + 3 + 1 + 4);
    assert_eq!(extractor.layout().names()[0], "time_delta");
}

#[test]
fn test_previous_time_continuity() {
    let mut extractor = StreamingExtractor::new(sample_artifacts());
    let time_col = extractor.layout().span(FeatureBlock::TimeDelta).unwrap().start;

    let first = extractor.extract(&record(1, 5.0, "TCP", 60)).unwrap();
    let second = extractor.extract(&record(2, 5.2, "TCP", 60)).unwrap();
    let third = extractor.extract(&record(3, 5.5, "TCP", 60)).unwrap();

    assert_eq!(extractor.previous_time(), 5.5);
    assert_eq!(first.values[time_col], 5.0);
    assert!((second.values[time_col] - 0.2).abs() < 1e-6);
    assert!((third.values[time_col] - 0.3).abs() < 1e-6);
}

#[test]
fn test_first_record_origin_starts_at_zero_delta() {
    let mut artifacts = sample_artifacts();
    artifacts.time_origin = TimeOrigin::FirstRecord;
    let mut extractor = StreamingExtractor::new(artifacts);

    let first = extractor.extract(&record(1, 12.5, "TCP", 60)).unwrap();
    let second = extractor.extract(&record(2, 13.0, "TCP", 60)).unwrap();
    assert_eq!(first.values[0], 0.0);
    assert_eq!(second.values[0], 0.5);
}

#[test]
fn test_unseen_protocol_encodes_as_zero_block() {
    let mut extractor = StreamingExtractor::new(sample_artifacts());
    let span = extractor.layout().span(FeatureBlock::Protocol).unwrap();

    let vector = extractor.extract(&record(1, 0.1, "QUIC", 60)).unwrap();
    assert!(vector.values[span.range()].iter().all(|v| *v == 0.0));

    let vector = extractor.extract(&record(2, 0.2, "UDP", 60)).unwrap();
    assert_eq!(&vector.values[span.range()], &[0.0, 0.0, 1.0]);
}

#[test]
fn test_each_block_is_populated() {
    let mut extractor = StreamingExtractor::new(sample_artifacts());
    let layout = extractor.layout().clone();
    let vector = extractor.extract(&record(1, 0.5, "TCP", 80)).unwrap();

    let source = layout.span(FeatureBlock::SourceHash).unwrap();
    let destination = layout.span(FeatureBlock::DestinationHash).unwrap();
    let length = layout.span(FeatureBlock::Length).unwrap();
    let info = layout.span(FeatureBlock::Info).unwrap();

    assert_eq!(vector.values[source.range()].iter().map(|v| v.abs()).sum::<f32>(), 1.0);
    assert_eq!(vector.values[destination.range()].iter().map(|v| v.abs()).sum::<f32>(), 1.0);
    assert_eq!(vector.values[length.start], 1.0);
    // only "syn" is in the vocabulary → unit weight after L2
    assert!((vector.values[info.start] - 1.0).abs() < 1e-6);
    assert_eq!(vector.layout_hash, layout.hash());
}

#[test]
fn test_streaming_matches_column_wise_batch() {
    let rows = vec![
        Record { source: "10.0.0.1".into(), info: "[SYN] Seq=0".into(), ..record(1, 0.50, "TCP", 60) },
        Record { source: "10.0.0.2".into(), info: "[SYN, ACK]".into(), ..record(2, 0.75, "TCP", 100) },
        Record { source: "10.0.0.3".into(), info: "Who has 192.168.0.1?".into(), ..record(3, 2.00, "ARP", 42) },
        Record { source: "10.0.0.1".into(), info: "Initial".into(), ..record(4, 2.00, "QUIC", 1500) },
        Record { source: "10.0.0.4".into(), info: "ack ACK".into(), ..record(5, 3.25, "UDP", 20) },
    ];
    let artifacts = sample_artifacts();

    // Time column the way a batch pass builds it: first row against the
    // zero origin, then pairwise differences over the whole capture
    let times: Vec<f64> = rows.iter().map(|r| r.time).collect();
    let deltas: Vec<f64> = std::iter::once(times[0])
        .chain(times.windows(2).map(|w| w[1] - w[0]))
        .collect();
    assert_eq!(deltas, vec![0.50, 0.25, 1.25, 0.0, 1.25]);

    let protocols: [[f32; 3]; 5] = [
        [0.0, 1.0, 0.0],
        [0.0, 1.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 0.0, 0.0],
        [0.0, 0.0, 1.0],
    ];
    // (len - 60) / 20
    let lengths: [f32; 5] = [0.0, 2.0, -0.9, 72.0, -2.0];
    let syn_ack = (1.0f32 + 1.2 * 1.2).sqrt();
    let infos: [[f32; 4]; 5] = [
        [1.0, 0.0, 0.0, 0.0],
        [1.0 / syn_ack, 1.2 / syn_ack, 0.0, 0.0],
        [0.0, 0.0, std::f32::consts::FRAC_1_SQRT_2, std::f32::consts::FRAC_1_SQRT_2],
        [0.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
    ];

    let mut extractor = StreamingExtractor::new(sample_artifacts());
    for (i, row) in rows.iter().enumerate() {
        let mut want = vec![deltas[i] as f32];
        for address in [&row.source, &row.destination] {
            let mut block = vec![0.0f32; 20];
            let (index, sign) = artifacts.hasher.bucket(address);
            block[index] = sign;
            want.extend(block);
        }
        want.extend(protocols[i]);
        want.push(lengths[i]);
        want.extend(infos[i]);

        let got = extractor.extract(row).unwrap();
        assert_eq!(got.values.len(), want.len());
        for (col, (g, w)) in got.values.iter().zip(want.iter()).enumerate() {
            assert!((g - w).abs() < 1e-5, "row {} column {}: {} != {}", row.sequence_no, col, g, w);
        }
    }
}

#[test]
fn test_non_finite_feature_does_not_advance_state() {
    let mut artifacts = sample_artifacts();
    artifacts.length_scaler.mean = f64::NAN;
    let mut extractor = StreamingExtractor::new(artifacts);

    let err = extractor.extract(&record(1, 4.0, "TCP", 60)).unwrap_err();
    assert!(matches!(err, ExtractError::Malformed { sequence_no: 1, .. }));
    assert_eq!(extractor.previous_time(), 0.0);
}

#[test]
fn test_non_finite_time_does_not_advance_state() {
    let mut extractor = StreamingExtractor::new(sample_artifacts());
    extractor.extract(&record(1, 2.0, "TCP", 60)).unwrap();

    let err = extractor.extract(&record(2, f64::NAN, "TCP", 60)).unwrap_err();
    assert!(matches!(err, ExtractError::NonFiniteTime { sequence_no: 2, .. }));
    assert_eq!(extractor.previous_time(), 2.0);
}

#[test]
fn test_load_rejects_invalid_bundle() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("artifacts.json");

    let mut artifacts = sample_artifacts();
    artifacts.hasher.n_features = 0;
    std::fs::write(&path, serde_json::to_string(&artifacts).unwrap()).unwrap();
    assert!(matches!(FittedArtifacts::load(&path), Err(ArtifactError::Invalid { .. })));

    std::fs::write(&path, serde_json::to_string(&sample_artifacts()).unwrap()).unwrap();
    let loaded = FittedArtifacts::load(&path).unwrap();
    assert_eq!(loaded.layout().hash(), sample_artifacts().layout().hash());
}

#[test]
fn test_checksum_verification() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.bin");
    std::fs::write(&path, b"abc").unwrap();

    // sha256("abc")
    let digest = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";
    assert!(crate::logic::features::verify_checksum(&path, digest).is_ok());
    assert!(crate::logic::features::verify_checksum(&path, &digest.to_uppercase()).is_ok());
    assert!(matches!(
        crate::logic::features::verify_checksum(&path, "00"),
        Err(ArtifactError::ChecksumMismatch { .. })
    ));
}
