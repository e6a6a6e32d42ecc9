//! Integration tests for the sequential download loop
//!
//! A scripted provider replaces yt-dlp and tokio's paused clock makes the
//! pauses between downloads observable without real waiting.

mod common;

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tokio_test::{assert_err, assert_ok};

use common::{read_file, video, write_playlist, ScriptedProvider};
use yt_grabber::app::{
    create_shutdown_channel, DelayRange, DownloadEvent, Downloader, PlaylistFile,
};
use yt_grabber::errors::{DownloadError, PlaylistError};

fn playlist_of(ids: &[&str]) -> String {
    ids.iter().map(|id| format!("{}\n", video(id))).collect()
}

fn drain(mut events: mpsc::UnboundedReceiver<DownloadEvent>) -> Vec<DownloadEvent> {
    let mut collected = Vec::new();
    while let Ok(event) = events.try_recv() {
        collected.push(event);
    }
    collected
}

/// Every entry is fetched in order and marked
#[tokio::test(start_paused = true)]
async fn test_all_entries_succeed() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_playlist(&temp_dir, "playlist.txt", &playlist_of(&["a", "b", "c"])).await;
    let provider = Arc::new(ScriptedProvider::new());

    let mut downloader = Downloader::new(provider.clone(), DelayRange::disabled());
    let summary = assert_ok!(downloader.run(&PlaylistFile::new(&path)).await);

    assert_eq!(summary.total, 3);
    assert_eq!(summary.completed, 3);
    assert_eq!(provider.fetched(), vec![video("a"), video("b"), video("c")]);
    assert_eq!(
        read_file(&path).await,
        format!("# {}\n# {}\n# {}\n", video("a"), video("b"), video("c"))
    );
}

/// The first failure stops the run; earlier entries stay marked
#[tokio::test(start_paused = true)]
async fn test_failure_stops_run() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_playlist(
        &temp_dir,
        "playlist.txt",
        &playlist_of(&["a", "b", "c", "d"]),
    )
    .await;
    let provider = Arc::new(ScriptedProvider::new().failing_at(&video("c")));
    let (events_tx, events_rx) = mpsc::unbounded_channel();

    let pacing = DelayRange::new(Duration::from_secs(1), Duration::from_secs(2)).unwrap();
    let mut downloader = Downloader::new(provider.clone(), pacing)
        .with_rng(StdRng::seed_from_u64(7))
        .with_events(events_tx);
    let err = assert_err!(downloader.run(&PlaylistFile::new(&path)).await);

    match &err {
        DownloadError::Fetch {
            url,
            position,
            total,
            ..
        } => {
            assert_eq!(url, &video("c"));
            assert_eq!(*position, 3);
            assert_eq!(*total, 4);
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(err.to_string().contains("3/4"));

    // Later entries are never attempted
    assert_eq!(provider.fetched(), vec![video("a"), video("b"), video("c")]);
    assert_eq!(
        read_file(&path).await,
        format!(
            "# {}\n# {}\n{}\n{}\n",
            video("a"),
            video("b"),
            video("c"),
            video("d")
        )
    );

    // Pauses only between successful downloads, none after the failure
    drop(downloader);
    let events = drain(events_rx);
    let waits = events
        .iter()
        .filter(|event| matches!(event, DownloadEvent::Waiting { .. }))
        .count();
    assert_eq!(waits, 2);
    assert!(matches!(
        events.last(),
        Some(DownloadEvent::ItemStarted { position: 3, .. })
    ));
}

/// A failed first entry leaves the file untouched
#[tokio::test(start_paused = true)]
async fn test_failure_on_first_entry() {
    let temp_dir = TempDir::new().unwrap();
    let content = playlist_of(&["a", "b"]);
    let path = write_playlist(&temp_dir, "playlist.txt", &content).await;
    let provider = Arc::new(ScriptedProvider::new().failing_at(&video("a")));

    let mut downloader = Downloader::new(provider.clone(), DelayRange::default());
    let err = assert_err!(downloader.run(&PlaylistFile::new(&path)).await);

    assert!(matches!(err, DownloadError::Fetch { position: 1, .. }));
    assert_eq!(read_file(&path).await, content);
}

/// Nothing pending is a successful, empty run
#[tokio::test(start_paused = true)]
async fn test_empty_queue() {
    let temp_dir = TempDir::new().unwrap();
    let content = format!(": title=Done\n\n# {}\n", video("a"));
    let path = write_playlist(&temp_dir, "playlist.txt", &content).await;
    let provider = Arc::new(ScriptedProvider::new());
    let (events_tx, events_rx) = mpsc::unbounded_channel();

    let mut downloader =
        Downloader::new(provider.clone(), DelayRange::default()).with_events(events_tx);
    let summary = assert_ok!(downloader.run(&PlaylistFile::new(&path)).await);

    assert_eq!(summary.total, 0);
    assert_eq!(summary.completed, 0);
    assert!(provider.fetched().is_empty());
    assert_eq!(read_file(&path).await, content);

    drop(downloader);
    assert!(drain(events_rx).is_empty());
}

/// A missing playlist file is reported before anything is fetched
#[tokio::test]
async fn test_missing_playlist() {
    let temp_dir = TempDir::new().unwrap();
    let provider = Arc::new(ScriptedProvider::new());

    let mut downloader = Downloader::new(provider.clone(), DelayRange::disabled());
    let err = assert_err!(
        downloader
            .run(&PlaylistFile::new(temp_dir.path().join("absent.txt")))
            .await
    );

    assert!(matches!(
        err,
        DownloadError::Playlist(PlaylistError::NotFound { .. })
    ));
    assert!(provider.fetched().is_empty());
}

/// A zero maximum delay never sleeps
#[tokio::test(start_paused = true)]
async fn test_zero_max_delay_never_sleeps() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_playlist(&temp_dir, "playlist.txt", &playlist_of(&["a", "b", "c"])).await;
    let provider = Arc::new(ScriptedProvider::new());

    let pacing = DelayRange::new(Duration::from_secs(30), Duration::ZERO).unwrap();
    assert!(pacing.is_disabled());

    let mut downloader = Downloader::new(provider, pacing);
    let summary = assert_ok!(downloader.run(&PlaylistFile::new(&path)).await);

    assert_eq!(summary.completed, 3);
    assert!(summary.delays.is_empty());
    assert!(summary.elapsed < Duration::from_secs(1));
}

/// Pauses fall inside the range, happen only between items, and follow the rng
#[tokio::test(start_paused = true)]
async fn test_delays_within_bounds() {
    let min = Duration::from_secs(2);
    let max = Duration::from_secs(5);
    let pacing = DelayRange::new(min, max).unwrap();

    let mut runs = Vec::new();
    for _ in 0..2 {
        let temp_dir = TempDir::new().unwrap();
        let path = write_playlist(
            &temp_dir,
            "playlist.txt",
            &playlist_of(&["a", "b", "c", "d"]),
        )
        .await;

        let mut downloader = Downloader::new(Arc::new(ScriptedProvider::new()), pacing)
            .with_rng(StdRng::seed_from_u64(42));
        let summary = assert_ok!(downloader.run(&PlaylistFile::new(&path)).await);

        // No pause after the last item
        assert_eq!(summary.delays.len(), 3);
        for delay in &summary.delays {
            assert!(*delay >= min && *delay <= max, "delay {:?} out of range", delay);
        }
        assert!(summary.elapsed >= summary.total_delay());
        runs.push(summary.delays);
    }

    // Same seed, same pauses
    assert_eq!(runs[0], runs[1]);
}

/// A single pending entry is fetched without any pause
#[tokio::test(start_paused = true)]
async fn test_single_entry_has_no_pause() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_playlist(&temp_dir, "playlist.txt", &playlist_of(&["only"])).await;

    let pacing = DelayRange::new(Duration::from_secs(60), Duration::from_secs(60)).unwrap();
    let mut downloader = Downloader::new(Arc::new(ScriptedProvider::new()), pacing);
    let summary = assert_ok!(downloader.run(&PlaylistFile::new(&path)).await);

    assert_eq!(summary.completed, 1);
    assert!(summary.delays.is_empty());
    assert!(summary.elapsed < Duration::from_secs(60));
}

/// Shutdown during a fetch stops at that entry and keeps earlier marks
#[tokio::test(start_paused = true)]
async fn test_interrupt_during_fetch() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_playlist(&temp_dir, "playlist.txt", &playlist_of(&["a", "b", "c"])).await;
    let provider = Arc::new(ScriptedProvider::new().with_fetch_delay(Duration::from_secs(10)));

    let (shutdown_tx, shutdown_rx) = create_shutdown_channel();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(15)).await;
        let _ = shutdown_tx.send(());
    });

    let mut downloader =
        Downloader::new(provider.clone(), DelayRange::disabled()).with_shutdown(shutdown_rx);
    let err = assert_err!(downloader.run(&PlaylistFile::new(&path)).await);

    assert!(matches!(
        err,
        DownloadError::Interrupted {
            position: 2,
            total: 3
        }
    ));
    assert_eq!(provider.fetched(), vec![video("a"), video("b")]);
    assert_eq!(
        read_file(&path).await,
        format!("# {}\n{}\n{}\n", video("a"), video("b"), video("c"))
    );
}

/// Shutdown during a pause stops before the next fetch
#[tokio::test(start_paused = true)]
async fn test_interrupt_during_pause() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_playlist(&temp_dir, "playlist.txt", &playlist_of(&["a", "b", "c"])).await;
    let provider = Arc::new(ScriptedProvider::new());

    let (shutdown_tx, shutdown_rx) = create_shutdown_channel();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(5)).await;
        let _ = shutdown_tx.send(());
    });

    let pacing = DelayRange::new(Duration::from_secs(10), Duration::from_secs(10)).unwrap();
    let mut downloader = Downloader::new(provider.clone(), pacing).with_shutdown(shutdown_rx);
    let err = assert_err!(downloader.run(&PlaylistFile::new(&path)).await);

    assert!(matches!(
        err,
        DownloadError::Interrupted {
            position: 2,
            total: 3
        }
    ));
    assert_eq!(provider.fetched(), vec![video("a")]);
    assert_eq!(
        read_file(&path).await,
        format!("# {}\n{}\n{}\n", video("a"), video("b"), video("c"))
    );
}

/// Events describe the run in order
#[tokio::test(start_paused = true)]
async fn test_event_order() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_playlist(&temp_dir, "playlist.txt", &playlist_of(&["a", "b"])).await;
    let (events_tx, events_rx) = mpsc::unbounded_channel();

    let pacing = DelayRange::new(Duration::from_secs(3), Duration::from_secs(3)).unwrap();
    let mut downloader =
        Downloader::new(Arc::new(ScriptedProvider::new()), pacing).with_events(events_tx);
    let summary = assert_ok!(downloader.run(&PlaylistFile::new(&path)).await);
    drop(downloader);

    let events = drain(events_rx);
    assert_eq!(events.len(), 7);
    assert_eq!(events[0], DownloadEvent::RunStarted { total: 2 });
    assert!(matches!(
        &events[1],
        DownloadEvent::ItemStarted { position: 1, total: 2, url } if url == &video("a")
    ));
    match &events[2] {
        DownloadEvent::ItemCompleted {
            position, video, ..
        } => {
            assert_eq!(*position, 1);
            assert_eq!(video.id, "a");
        }
        other => panic!("unexpected event: {:?}", other),
    }
    assert_eq!(
        events[3],
        DownloadEvent::Waiting {
            delay: Duration::from_secs(3)
        }
    );
    assert!(matches!(
        &events[4],
        DownloadEvent::ItemStarted { position: 2, .. }
    ));
    assert!(matches!(
        &events[5],
        DownloadEvent::ItemCompleted { position: 2, .. }
    ));
    assert!(matches!(
        &events[6],
        DownloadEvent::RunFinished { completed: 2, .. }
    ));
    assert_eq!(summary.total_delay(), Duration::from_secs(3));
}
