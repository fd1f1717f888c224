use super::*;

fn pcm(frames: usize) -> AudioPcm {
    AudioPcm {
        sample_rate: 10,
        channels: 2,
        interleaved_f32: (0..frames * 2).map(|i| i as f32 / 100.0).collect(),
    }
}

#[test]
fn fit_truncates_long_audio_and_pads_short_audio_with_silence() {
    let mut long = pcm(50);
    fit_to_duration(&mut long, 2.0);
    assert_eq!(long.frame_count(), 20);
    assert_eq!(long.interleaved_f32[39], 0.39);

    let mut short = pcm(5);
    fit_to_duration(&mut short, 1.0);
    assert_eq!(short.frame_count(), 10);
    assert_eq!(short.interleaved_f32[9], 0.09);
    assert!(short.interleaved_f32[10..].iter().all(|s| *s == 0.0));
}

#[test]
fn written_samples_are_clamped_little_endian_f32() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("mix.f32le");
    write_f32le_file(&[0.25, 2.0, -3.0], &path).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    let got: Vec<f32> = bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    assert_eq!(got, vec![0.25, 1.0, -1.0]);
}

#[test]
fn graph_stages_audio_and_removes_it_on_drop() {
    let dir = tempfile::tempdir().unwrap();
    let graph = AudioMixGraph::build(pcm(30), 2.0, dir.path())
        .unwrap()
        .unwrap();
    let path = graph.input().path.clone();
    assert_eq!(graph.input().sample_rate, 10);
    assert_eq!(graph.input().channels, 2);
    assert_eq!(std::fs::metadata(&path).unwrap().len(), 20 * 2 * 4);

    drop(graph);
    assert!(!path.exists());
}

#[test]
fn silent_sources_build_no_graph() {
    let dir = tempfile::tempdir().unwrap();
    let empty = AudioPcm {
        sample_rate: 48_000,
        channels: 2,
        interleaved_f32: Vec::new(),
    };
    assert!(AudioMixGraph::build(empty, 3.0, dir.path()).unwrap().is_none());
    assert!(AudioMixGraph::build(pcm(10), 0.0, dir.path()).unwrap().is_none());
}

#[test]
fn guard_deletes_its_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("x.bin");
    std::fs::write(&path, b"abc").unwrap();
    let guard = TempFileGuard::new(path.clone());
    assert_eq!(guard.path(), Some(path.as_path()));
    drop(guard);
    assert!(!path.exists());
}
