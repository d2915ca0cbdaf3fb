use criterion::{black_box, criterion_group, criterion_main, Criterion};
use playlist_organizer::{CategoryRules, Classifier, Organizer, PlannerConfig, PlaylistSnapshot, VideoRef};

const TOPICS: [&str; 6] = [
    "Claude coding session",
    "Bitcoin trading basics",
    "Lofi piano for sleep",
    "Minecraft gameplay",
    "Python tutorial for beginners",
    "Random vlog",
];

fn synthetic_library(playlists: usize, videos_per_playlist: usize) -> Vec<PlaylistSnapshot> {
    (0..playlists)
        .map(|p| {
            let videos = (0..videos_per_playlist)
                .map(|v| {
                    let topic = TOPICS[(p + v) % TOPICS.len()];
                    VideoRef::new(format!("v{}_{}", p, v), format!("{} #{}", topic, v))
                        .with_description("watch this video about programming and music")
                        .with_playlist_item_id(format!("item{}_{}", p, v))
                })
                .collect();
            PlaylistSnapshot::new(format!("PL{}", p), format!("Mix {}", p % 10)).with_videos(videos)
        })
        .collect()
}

fn bench_classifier(c: &mut Criterion) {
    let rules = CategoryRules::default();
    let classifier = Classifier::new(&rules, 0.05);
    let video = VideoRef::new("v1", "Guitar Tutorial for Beginners")
        .with_description("learn guitar chords with this piano and music course");

    c.bench_function("classify_single_video", |b| {
        b.iter(|| black_box(classifier.classify(black_box(&video))))
    });
}

fn bench_planner(c: &mut Criterion) {
    let config = PlannerConfig {
        auto_delete_empty_playlists: true,
        suggest_renames: true,
        ..PlannerConfig::default()
    };
    let organizer = Organizer::new(CategoryRules::default(), config);

    let small = synthetic_library(20, 25);
    c.bench_function("plan_small_library", |b| {
        b.iter(|| black_box(organizer.plan(black_box(&small))))
    });

    let large = synthetic_library(200, 100);
    c.bench_function("plan_large_library", |b| {
        b.iter(|| black_box(organizer.plan(black_box(&large))))
    });
}

criterion_group!(benches, bench_classifier, bench_planner);
criterion_main!(benches);
