use anyhow::Result;
use httpmock::prelude::*;
use small_raffle::core::history::{LEGACY_REGULAR_KEY, LEGACY_TEAM_MATCHING_KEY};
use small_raffle::domain::model::{DrawRecord, HistoryRecord, MatchRecord, MatchResult};
use small_raffle::domain::ports::LedgerStorage;
use small_raffle::{DirLegacyStorage, FileLedgerStorage, HistoryStore, HttpLedgerStorage, RaffleError};
use tempfile::TempDir;

fn regular(id: &str) -> DrawRecord {
    DrawRecord {
        id: id.to_string(),
        date: "2024-03-01 20:00:00".to_string(),
        items: vec!["Ayşe".into(), "Mehmet".into(), "Zeynep".into()],
        winner_count: 1,
        winners: vec!["Zeynep".into()],
    }
}

fn team_matching(id: &str) -> MatchRecord {
    MatchRecord {
        id: id.to_string(),
        date: "2024-03-01 20:05:00".to_string(),
        teams: vec!["T1".into(), "T2".into()],
        candidates: vec!["C1".into()],
        results: vec![
            MatchResult {
                team: "T2".into(),
                candidate: Some("C1".into()),
            },
            MatchResult {
                team: "T1".into(),
                candidate: None,
            },
        ],
    }
}

#[tokio::test]
async fn test_file_ledger_round_trip() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("nested").join("raffle-histories.json");
    let store = HistoryStore::new(FileLedgerStorage::new(&path));

    assert!(store.load().await?.is_empty());

    store.append(HistoryRecord::Regular(regular("1"))).await?;
    store
        .append(HistoryRecord::TeamMatching(team_matching("2")))
        .await?;
    store.append(HistoryRecord::Regular(regular("3"))).await?;

    let ledger = store.load().await?;
    assert_eq!(ledger.regular[0].id, "3");
    assert_eq!(ledger.regular[1].id, "1");
    assert_eq!(ledger.team_matching[0], team_matching("2"));

    // 檔案內容維持原本的 JSON 形狀
    let raw: serde_json::Value = serde_json::from_str(&tokio::fs::read_to_string(&path).await?)?;
    assert_eq!(raw["regular"][0]["winnerCount"], 1);
    assert!(raw["teamMatching"][0]["results"][1]["candidate"].is_null());
    Ok(())
}

#[tokio::test]
async fn test_corrupt_file_is_surfaced_and_preserved() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("raffle-histories.json");
    tokio::fs::write(&path, "{ not json").await?;
    let store = HistoryStore::new(FileLedgerStorage::new(&path));

    assert!(matches!(store.load().await, Err(RaffleError::SerializationError(_))));
    assert!(store.load_or_default().await.is_empty());
    assert!(store.append(HistoryRecord::Regular(regular("1"))).await.is_err());
    assert_eq!(tokio::fs::read_to_string(&path).await?, "{ not json");
    Ok(())
}

#[tokio::test]
async fn test_directory_migration_is_idempotent() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let legacy_dir = temp_dir.path().join("legacy");
    tokio::fs::create_dir_all(&legacy_dir).await?;
    tokio::fs::write(
        legacy_dir.join(format!("{}.json", LEGACY_REGULAR_KEY)),
        serde_json::to_string(&vec![regular("old")])?,
    )
    .await?;
    tokio::fs::write(
        legacy_dir.join(format!("{}.json", LEGACY_TEAM_MATCHING_KEY)),
        serde_json::to_string(&vec![team_matching("old-match")])?,
    )
    .await?;

    let store = HistoryStore::new(FileLedgerStorage::new(temp_dir.path().join("history.json")));
    store.append(HistoryRecord::Regular(regular("current"))).await?;
    let legacy = DirLegacyStorage::new(&legacy_dir);

    let first = store.migrate_legacy(&legacy).await?;
    assert_eq!(first.regular_migrated, 1);
    assert_eq!(first.team_matching_migrated, 1);
    let migrated = store.load().await?;
    let ids: Vec<_> = migrated.regular.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["old", "current"]);

    let second = store.migrate_legacy(&legacy).await?;
    assert!(second.is_noop());
    assert_eq!(store.load().await?, migrated);
    assert!(!legacy_dir.join(format!("{}.json", LEGACY_REGULAR_KEY)).exists());
    assert!(!legacy_dir.join(format!("{}.json", LEGACY_TEAM_MATCHING_KEY)).exists());
    Ok(())
}

#[tokio::test]
async fn test_http_ledger_missing_document_is_empty() -> Result<()> {
    let server = MockServer::start();
    let get_mock = server.mock(|when, then| {
        when.method(GET).path("/raffle-histories.json");
        then.status(404);
    });

    let storage = HttpLedgerStorage::new(&server.base_url());
    assert!(storage.read().await?.is_none());
    get_mock.assert();
    Ok(())
}

#[tokio::test]
async fn test_http_append_posts_full_ledger() -> Result<()> {
    let server = MockServer::start();
    let existing_record = serde_json::to_value(regular("1"))?;
    let existing = serde_json::json!({
        "regular": [existing_record],
        "teamMatching": []
    });

    let get_mock = server.mock(|when, then| {
        when.method(GET).path("/raffle-histories.json");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(existing);
    });
    let save_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/save-histories")
            .header("Content-Type", "application/json")
            .body_contains("\"teamMatching\":[{")
            .body_contains("\"id\":\"2\"");
        then.status(200);
    });

    let store = HistoryStore::new(HttpLedgerStorage::new(&format!("{}/", server.base_url())));
    store
        .append(HistoryRecord::TeamMatching(team_matching("2")))
        .await?;

    get_mock.assert();
    save_mock.assert();
    Ok(())
}

#[tokio::test]
async fn test_http_save_failure_is_returned() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/raffle-histories.json");
        then.status(404);
    });
    let save_mock = server.mock(|when, then| {
        when.method(POST).path("/api/save-histories");
        then.status(500);
    });

    let store = HistoryStore::new(HttpLedgerStorage::new(&server.base_url()));
    let err = store
        .append(HistoryRecord::Regular(regular("1")))
        .await
        .unwrap_err();

    save_mock.assert();
    assert!(matches!(err, RaffleError::Persistence { .. }));
    Ok(())
}
