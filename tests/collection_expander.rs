//! Integration tests for collection expansion
//!
//! A scripted provider serves canned flat listings; the tests check the
//! playlist files written from them.

mod common;

use tempfile::TempDir;
use tokio_test::{assert_err, assert_ok};

use common::{read_file, video, ScriptedProvider};
use yt_grabber::app::{
    CollectionExpander, CollectionKind, FlatEntry, FlatListing, PlaylistFile, UrlTransform,
};
use yt_grabber::errors::ExtractError;

const PLAYLIST_URL: &str = "https://www.youtube.com/playlist?list=PL123";
const CHANNEL_URL: &str = "https://www.youtube.com/@rustconf/videos";

/// A bare id and the full URL enumerate the same collection
#[tokio::test]
async fn test_bare_id_and_full_url_are_equivalent() {
    let temp_dir = TempDir::new().unwrap();
    let provider =
        ScriptedProvider::new().with_listing(PLAYLIST_URL, FlatListing::from_ids(["x1", "x2"]));
    let expander = CollectionExpander::new(&provider, CollectionKind::Playlist);

    let from_id = temp_dir.path().join("from_id.txt");
    let from_url = temp_dir.path().join("from_url.txt");
    assert_ok!(expander.expand("PL123", &from_id).await);
    assert_ok!(expander.expand(PLAYLIST_URL, &from_url).await);

    assert_eq!(provider.enumerated(), vec![PLAYLIST_URL, PLAYLIST_URL]);
    assert_eq!(read_file(&from_id).await, read_file(&from_url).await);
}

/// Output is one watch URL per line, in listing order, newline-terminated
#[tokio::test]
async fn test_output_format() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("playlist.txt");
    let provider = ScriptedProvider::new()
        .with_listing(PLAYLIST_URL, FlatListing::from_ids(["aaa", "bbb", "ccc"]));

    let summary = assert_ok!(
        CollectionExpander::new(&provider, CollectionKind::Playlist)
            .expand("PL123", &output)
            .await
    );

    assert_eq!(summary.written, 3);
    assert_eq!(summary.skipped, 0);
    assert_eq!(summary.collection_url, PLAYLIST_URL);
    assert_eq!(
        read_file(&output).await,
        format!("{}\n{}\n{}\n", video("aaa"), video("bbb"), video("ccc"))
    );

    // The written file is a valid queue
    let pending = PlaylistFile::new(&output).read_pending().await.unwrap();
    assert_eq!(pending, vec![video("aaa"), video("bbb"), video("ccc")]);
}

/// An empty collection writes nothing and leaves an existing file alone
#[tokio::test]
async fn test_empty_collection_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let provider = ScriptedProvider::new()
        .with_listing(PLAYLIST_URL, FlatListing::from_ids(Vec::<String>::new()));
    let expander = CollectionExpander::new(&provider, CollectionKind::Playlist);

    let fresh = temp_dir.path().join("fresh.txt");
    let err = assert_err!(expander.expand("PL123", &fresh).await);
    assert!(matches!(err, ExtractError::EmptyCollection { .. }));
    assert!(!fresh.exists());

    let existing = temp_dir.path().join("existing.txt");
    tokio::fs::write(&existing, "https://x/keep\n").await.unwrap();
    assert_err!(expander.expand("PL123", &existing).await);
    assert_eq!(read_file(&existing).await, "https://x/keep\n");
}

/// A listing without any member list counts as empty
#[tokio::test]
async fn test_missing_entries_is_empty() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("out.txt");
    let provider = ScriptedProvider::new().with_listing(
        PLAYLIST_URL,
        FlatListing {
            title: Some("Nothing here".to_string()),
            entries: None,
        },
    );

    let err = assert_err!(
        CollectionExpander::new(&provider, CollectionKind::Playlist)
            .expand("PL123", &output)
            .await
    );
    assert!(err.to_string().contains(PLAYLIST_URL));
    assert!(!output.exists());
}

/// Null members and members without an id are skipped
#[tokio::test]
async fn test_unusable_entries_skipped() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("out.txt");
    let listing = FlatListing {
        title: None,
        entries: Some(vec![
            Some(FlatEntry {
                id: Some("good1".to_string()),
                title: None,
            }),
            None,
            Some(FlatEntry {
                id: None,
                title: Some("[Private video]".to_string()),
            }),
            Some(FlatEntry {
                id: Some("good2".to_string()),
                title: None,
            }),
        ]),
    };
    let provider = ScriptedProvider::new().with_listing(PLAYLIST_URL, listing);

    let summary = assert_ok!(
        CollectionExpander::new(&provider, CollectionKind::Playlist)
            .expand("PL123", &output)
            .await
    );

    assert_eq!(summary.written, 2);
    assert_eq!(summary.skipped, 2);
    assert_eq!(
        read_file(&output).await,
        format!("{}\n{}\n", video("good1"), video("good2"))
    );
}

/// Channels are written oldest first unless told otherwise
#[tokio::test]
async fn test_channel_reversed_by_default() {
    let temp_dir = TempDir::new().unwrap();
    let provider = ScriptedProvider::new()
        .with_listing(CHANNEL_URL, FlatListing::from_ids(["newest", "middle", "oldest"]));

    let reversed = temp_dir.path().join("reversed.txt");
    let expander = CollectionExpander::new(&provider, CollectionKind::Channel);
    assert_eq!(expander.transform(), UrlTransform::Reverse);
    assert_ok!(expander.expand("@rustconf", &reversed).await);
    assert_eq!(
        read_file(&reversed).await,
        format!(
            "{}\n{}\n{}\n",
            video("oldest"),
            video("middle"),
            video("newest")
        )
    );

    let in_order = temp_dir.path().join("in_order.txt");
    assert_ok!(
        CollectionExpander::new(&provider, CollectionKind::Channel)
            .with_transform(UrlTransform::Identity)
            .expand("rustconf", &in_order)
            .await
    );
    assert_eq!(
        read_file(&in_order).await,
        format!(
            "{}\n{}\n{}\n",
            video("newest"),
            video("middle"),
            video("oldest")
        )
    );
}

/// An existing output file is replaced
#[tokio::test]
async fn test_existing_output_replaced() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("playlist.txt");
    tokio::fs::write(&output, "# https://old/1\nhttps://old/2\n")
        .await
        .unwrap();
    let provider =
        ScriptedProvider::new().with_listing(PLAYLIST_URL, FlatListing::from_ids(["new"]));

    assert_ok!(
        CollectionExpander::new(&provider, CollectionKind::Playlist)
            .expand("PL123", &output)
            .await
    );
    assert_eq!(read_file(&output).await, format!("{}\n", video("new")));
    assert!(!temp_dir.path().join("playlist.txt.tmp").exists());
}

/// Enumeration failures surface as fetch errors and write nothing
#[tokio::test]
async fn test_enumeration_failure() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("out.txt");
    let provider =
        ScriptedProvider::new().with_listing_error(PLAYLIST_URL, "ERROR: playlist does not exist");

    let err = assert_err!(
        CollectionExpander::new(&provider, CollectionKind::Playlist)
            .expand("PL123", &output)
            .await
    );
    assert!(matches!(err, ExtractError::Fetch(_)));
    assert!(!output.exists());
}
