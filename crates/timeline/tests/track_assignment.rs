/// End-to-end checks of day grouping and track assignment
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use timeline::*;

// 2024-06-01T00:00:00Z
const JUNE_1: Seconds = 1_717_200_000.0;

fn resolver() -> ResolutionResolver {
    ResolutionResolver::with_seed(TrackLabels::default(), 42)
}

fn import(clips: Vec<Clip>) -> Timeline {
    let mut timeline = Timeline::new();
    timeline
        .import_clips(clips, &LayoutConfig::default(), &resolver())
        .unwrap();
    timeline
}

fn track_names(sector: &Sector) -> Vec<String> {
    sector.tracks.values().map(|t| t.name.clone()).collect()
}

fn random_day(seed: u64, count: usize) -> Vec<Clip> {
    let mut rng = StdRng::seed_from_u64(seed);
    let resolutions = [(1920, 1080), (3840, 2160), (1280, 720)];
    (0..count)
        .map(|i| {
            let start = JUNE_1 + rng.gen_range(0.0..3600.0);
            let duration = rng.gen_range(0.0..300.0);
            if rng.gen_bool(0.6) {
                let clip = Clip::video(format!("v{i}"), start, duration);
                match rng.gen_range(0..4) {
                    3 => clip,
                    r => {
                        let (w, h) = resolutions[r];
                        clip.with_resolution(w, h)
                    }
                }
            } else {
                Clip::audio(format!("a{i}"), start, duration)
            }
        })
        .collect()
}

#[test]
fn same_camera_overlap_shares_one_track() {
    let timeline = import(vec![
        Clip::video("a", JUNE_1, 10.0).with_resolution(1920, 1080),
        Clip::video("b", JUNE_1 + 5.0, 10.0).with_resolution(1920, 1080),
    ]);
    let sector = &timeline.sectors[0];
    assert_eq!(track_names(sector), vec!["Camera 1"]);
    let track = sector.tracks.values().next().unwrap();
    assert_eq!(track.combined_duration, 20.0);
    assert_eq!(track.start_time, JUNE_1);
    assert_eq!(track.end_time, JUNE_1 + 15.0);
}

#[test]
fn different_cameras_overlapping_get_separate_tracks() {
    let timeline = import(vec![
        Clip::video("a", JUNE_1, 10.0).with_resolution(1920, 1080),
        Clip::video("b", JUNE_1 + 5.0, 10.0).with_resolution(1280, 720),
    ]);
    assert_eq!(track_names(&timeline.sectors[0]), vec!["Camera 1", "Camera 2"]);
}

#[test]
fn audio_overlap_opens_second_track() {
    let timeline = import(vec![
        Clip::audio("a", JUNE_1, 5.0),
        Clip::audio("b", JUNE_1 + 5.0, 5.0),
        Clip::audio("c", JUNE_1 + 2.0, 6.0),
    ]);
    let sector = &timeline.sectors[0];
    let layout: Vec<(String, Vec<String>)> = sector
        .tracks
        .values()
        .map(|t| (t.name.clone(), t.clips.iter().map(|c| c.id.clone()).collect()))
        .collect();
    assert_eq!(
        layout,
        vec![
            ("Audio 1".to_string(), vec!["a".to_string(), "b".to_string()]),
            ("Audio 2".to_string(), vec!["c".to_string()]),
        ]
    );
}

#[test]
fn empty_import_creates_no_sector() {
    let timeline = import(Vec::new());
    assert!(timeline.sectors.is_empty());
}

#[test]
fn random_imports_keep_invariants() {
    for seed in 0..20 {
        let timeline = import(random_day(seed, 60));
        assert_eq!(timeline.clip_count(), 60, "seed {seed}");
        let violations = timeline.violations(&resolver());
        assert!(violations.is_empty(), "seed {seed}: {violations:?}");
    }
}

#[test]
fn audio_tracks_never_overlap() {
    let timeline = import(random_day(7, 80));
    for track in timeline.sectors.iter().flat_map(|s| s.tracks_of(MediaKind::Audio)) {
        for (i, a) in track.clips.iter().enumerate() {
            for b in &track.clips[i + 1..] {
                assert!(!do_time_ranges_overlap(a.start(), a.end(), b.start(), b.end()));
            }
        }
    }
}

#[test]
fn track_indices_unique_per_kind() {
    let timeline = import(random_day(11, 80));
    for sector in &timeline.sectors {
        for kind in [MediaKind::Video, MediaKind::Audio] {
            let mut indices: Vec<u32> = sector.tracks_of(kind).map(|t| t.index).collect();
            let total = indices.len();
            indices.sort_unstable();
            indices.dedup();
            assert_eq!(indices.len(), total);
            assert_eq!(indices, (1..=total as u32).collect::<Vec<_>>());
        }
    }
}

#[test]
fn naming_is_deterministic_across_runs() {
    let clips = random_day(3, 50);
    let first = import(clips.clone());
    let second = import(clips);
    let names = |t: &Timeline| -> Vec<Vec<String>> { t.sectors.iter().map(track_names).collect() };
    assert_eq!(names(&first), names(&second));
}

#[test]
fn caches_match_recomputation() {
    let timeline = import(random_day(5, 40));
    for sector in &timeline.sectors {
        for track in sector.tracks.values() {
            assert_eq!(&track.recomputed(), track);
            assert_eq!(track.time_ranges, calculate_time_ranges(&track.clips));
        }
        let mut fresh = sector.clone();
        fresh.recompute();
        assert_eq!(fresh.time_ranges, sector.time_ranges);
        assert_eq!((fresh.start_time, fresh.end_time), (sector.start_time, sector.end_time));
    }
}

#[test]
fn reimport_into_saved_project_extends_existing_tracks() {
    let config = LayoutConfig::default();
    let resolver = resolver();
    let mut timeline = Timeline::new();
    timeline
        .import_clips(
            vec![Clip::video("a", JUNE_1, 10.0).with_resolution(1920, 1080)],
            &config,
            &resolver,
        )
        .unwrap();

    // Persist and reload, then import an overlapping clip from the same camera.
    let saved = serde_json::to_string(&timeline).unwrap();
    let mut reloaded: Timeline = serde_json::from_str(&saved).unwrap();
    let report = reloaded
        .import_clips(
            vec![
                Clip::video("b", JUNE_1 + 5.0, 10.0).with_resolution(1920, 1080),
                Clip::video("c", JUNE_1 + 5.0, 10.0).with_resolution(1280, 720),
            ],
            &config,
            &resolver,
        )
        .unwrap();

    assert_eq!(report.sectors_created, 0);
    assert_eq!(report.tracks_created, 1);
    assert_eq!(track_names(&reloaded.sectors[0]), vec!["Camera 1", "Camera 2"]);
    assert!(reloaded.violations(&resolver).is_empty());
}

#[test]
fn localized_labels_drive_names() {
    let config = LayoutConfig {
        labels: TrackLabels {
            video: "Kamera {n}".to_string(),
            audio: "Ton {n}".to_string(),
        },
        ..LayoutConfig::default()
    };
    let mut timeline = Timeline::new();
    timeline
        .import_clips(
            vec![
                Clip::video("v1", JUNE_1, 10.0).with_resolution(1920, 1080),
                Clip::video("v2", JUNE_1, 10.0).with_resolution(1280, 720),
                Clip::audio("a1", JUNE_1, 10.0),
            ],
            &config,
            &ResolutionResolver::with_seed(config.labels.clone(), 1),
        )
        .unwrap();
    assert_eq!(
        track_names(&timeline.sectors[0]),
        vec!["Kamera 1", "Kamera 2", "Ton 1"]
    );
}

struct SerialResolver;

impl CameraIdResolver for SerialResolver {
    fn resolve(&self, clip: &Clip, _fallback_track_name: Option<&str>) -> String {
        clip.path.clone().unwrap_or_else(|| clip.id.clone())
    }
}

#[test]
fn custom_resolver_replaces_resolution_heuristic() {
    let mut timeline = Timeline::new();
    timeline
        .import_clips(
            vec![
                Clip::video("a", JUNE_1, 10.0)
                    .with_resolution(1920, 1080)
                    .with_path("SN-001"),
                Clip::video("b", JUNE_1 + 5.0, 10.0)
                    .with_resolution(1920, 1080)
                    .with_path("SN-002"),
                Clip::video("c", JUNE_1 + 5.0, 10.0)
                    .with_resolution(1280, 720)
                    .with_path("SN-001"),
            ],
            &LayoutConfig::default(),
            &SerialResolver,
        )
        .unwrap();
    let sector = &timeline.sectors[0];
    let layout: Vec<(String, usize)> = sector
        .tracks
        .values()
        .map(|t| (t.name.clone(), t.clips.len()))
        .collect();
    assert_eq!(
        layout,
        vec![("Camera 1".to_string(), 2), ("Camera 2".to_string(), 1)]
    );
}

#[test]
fn custom_resolver_layout_passes_check_with_same_resolver() {
    let mut timeline = Timeline::new();
    timeline
        .import_clips(
            vec![
                Clip::video("a", JUNE_1, 10.0)
                    .with_resolution(1920, 1080)
                    .with_path("SN-001"),
                Clip::video("c", JUNE_1 + 5.0, 10.0)
                    .with_resolution(1280, 720)
                    .with_path("SN-001"),
            ],
            &LayoutConfig::default(),
            &SerialResolver,
        )
        .unwrap();
    assert_eq!(timeline.track_count(), 1);
    assert!(timeline.violations(&SerialResolver).is_empty());
}
