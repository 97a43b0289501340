mod common;

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use common::{init_logging, listing, CannedPages, RecordingChannel};
use notice_core::{DedupState, KeywordFilter, SourceConfig};
use notice_engine::{
    CrawlSettings, DedupStore, JsonFileStore, NoticeWatcher, Renderers, RunError, RunOutcome,
    SourceCrawler,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const A_LIST: &str = "https://a.example.com/list.do?page={page}";
const B_LIST: &str = "https://b.example.com/board?p={page}";

fn source(name: &str, template: &str, pages: u32) -> SourceConfig {
    let mut source = SourceConfig::new(name, template);
    source.link_prefix = format!("https://{}.example.com/", name.to_lowercase());
    source.pages = pages;
    source
}

fn watcher(pages: CannedPages, store: JsonFileStore) -> NoticeWatcher {
    let crawler = SourceCrawler::new(
        Renderers::uniform(Arc::new(pages)),
        CrawlSettings {
            page_delay: Duration::ZERO,
        },
    );
    NoticeWatcher::new(crawler, Box::new(store))
}

fn a_page() -> CannedPages {
    CannedPages::new().page(
        "https://a.example.com/list.do?page=1",
        listing(&[
            ("바이오 지원사업 공고", "view.do?pblancId=100"),
            ("바이오 지원사업 공고", "view.do?pblancId=200"),
        ]),
    )
}

#[tokio::test]
async fn fresh_store_notifies_both_entries_and_records_them() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let store_path = temp.path().join("sent_titles.json");
    let channel = RecordingChannel::succeeding("mail");
    let watcher = watcher(a_page(), JsonFileStore::new(&store_path))
        .with_channel(Box::new(channel.clone()));

    let outcome = watcher
        .run(&[source("A", A_LIST, 1)], &KeywordFilter::parse("바이오"))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        RunOutcome::Notified {
            counts: vec![("A".to_string(), 2)]
        }
    );
    let sent = channel.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "[공고 알림] 새로운 공고 요약");
    assert_eq!(
        sent[0].body,
        "새로운 공고가 등록되었습니다.\n\n\
A\n\
1) 바이오 지원사업 공고\n https://a.example.com/view.do?pblancId=100\n\
2) 바이오 지원사업 공고\n https://a.example.com/view.do?pblancId=200\n"
    );
    let stored = JsonFileStore::new(&store_path).load();
    assert_eq!(stored.tokens("A"), vec!["100", "200"]);
}

#[tokio::test]
async fn known_token_is_left_out_and_store_grows() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let store = JsonFileStore::new(temp.path().join("sent_titles.json"));
    store
        .commit(&[("A", vec!["100"])].into_iter().collect())
        .unwrap();
    let channel = RecordingChannel::succeeding("mail");
    let watcher = watcher(a_page(), store.clone()).with_channel(Box::new(channel.clone()));

    let outcome = watcher
        .run(&[source("A", A_LIST, 1)], &KeywordFilter::parse("바이오"))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        RunOutcome::Notified {
            counts: vec![("A".to_string(), 1)]
        }
    );
    let body = &channel.sent()[0].body;
    assert!(body.contains("pblancId=200"));
    assert!(!body.contains("pblancId=100"));
    assert_eq!(store.load().tokens("A"), vec!["100", "200"]);
}

#[tokio::test]
async fn unreachable_source_does_not_stop_the_others() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let pages = a_page()
        .failing("https://b.example.com/board?p=1")
        .failing("https://b.example.com/board?p=2");
    let channel = RecordingChannel::succeeding("mail");
    let watcher = watcher(pages, JsonFileStore::new(temp.path().join("s.json")))
        .with_channel(Box::new(channel.clone()));

    let sources = [source("B", B_LIST, 2), source("A", A_LIST, 1)];
    let outcome = watcher
        .run(&sources, &KeywordFilter::parse("바이오"))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        RunOutcome::Notified {
            counts: vec![("A".to_string(), 2)]
        }
    );
    assert!(!channel.sent()[0].body.contains("\nB\n"));
}

#[tokio::test]
async fn failed_dispatch_leaves_store_untouched() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let store_path = temp.path().join("sent_titles.json");
    let store = JsonFileStore::new(&store_path);
    store
        .commit(&[("A", vec!["100"])].into_iter().collect())
        .unwrap();
    let before = fs::read_to_string(&store_path).unwrap();

    let watcher = watcher(a_page(), store.clone())
        .with_channel(Box::new(RecordingChannel::failing("mail")));

    let outcome = watcher
        .run(&[source("A", A_LIST, 1)], &KeywordFilter::parse("바이오"))
        .await
        .unwrap();

    match outcome {
        RunOutcome::DispatchFailed { failures } => {
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].channel, "mail");
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(fs::read_to_string(&store_path).unwrap(), before);
}

#[tokio::test]
async fn one_failing_channel_blocks_commit_even_if_another_succeeds() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let store_path = temp.path().join("sent_titles.json");
    let ok = RecordingChannel::succeeding("webhook");
    let watcher = watcher(a_page(), JsonFileStore::new(&store_path))
        .with_channel(Box::new(RecordingChannel::failing("mail")))
        .with_channel(Box::new(ok.clone()));

    let outcome = watcher
        .run(&[source("A", A_LIST, 1)], &KeywordFilter::parse("바이오"))
        .await
        .unwrap();

    assert!(matches!(outcome, RunOutcome::DispatchFailed { .. }));
    assert_eq!(ok.sent().len(), 1);
    assert!(!store_path.exists());
}

#[tokio::test]
async fn nothing_new_sends_nothing() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let store_path = temp.path().join("sent_titles.json");
    let channel = RecordingChannel::succeeding("mail");
    let watcher = watcher(a_page(), JsonFileStore::new(&store_path))
        .with_channel(Box::new(channel.clone()));

    let outcome = watcher
        .run(&[source("A", A_LIST, 1)], &KeywordFilter::parse("반도체"))
        .await
        .unwrap();

    assert_eq!(outcome, RunOutcome::NothingNew);
    assert!(channel.sent().is_empty());
    assert!(!store_path.exists());
}

#[tokio::test]
async fn second_run_over_unchanged_pages_is_quiet() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let store = JsonFileStore::new(temp.path().join("sent_titles.json"));
    let sources = [source("A", A_LIST, 1)];
    let keywords = KeywordFilter::parse("바이오");

    let first = watcher(a_page(), store.clone())
        .with_channel(Box::new(RecordingChannel::succeeding("mail")));
    assert!(matches!(
        first.run(&sources, &keywords).await.unwrap(),
        RunOutcome::Notified { .. }
    ));

    let channel = RecordingChannel::succeeding("mail");
    let second = watcher(a_page(), store).with_channel(Box::new(channel.clone()));
    assert_eq!(
        second.run(&sources, &keywords).await.unwrap(),
        RunOutcome::NothingNew
    );
    assert!(channel.sent().is_empty());
}

#[tokio::test]
async fn invalid_selector_only_skips_its_own_source() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let mut broken = source("B", B_LIST, 1);
    broken.selector = "a[".to_string();
    let watcher = watcher(a_page(), JsonFileStore::new(temp.path().join("s.json")))
        .with_channel(Box::new(RecordingChannel::succeeding("mail")));

    let outcome = watcher
        .run(&[broken, source("A", A_LIST, 1)], &KeywordFilter::parse("바이오"))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        RunOutcome::Notified {
            counts: vec![("A".to_string(), 2)]
        }
    );
}

#[tokio::test]
async fn digest_groups_follow_configuration_order() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let pages = a_page().page(
        "https://b.example.com/board?p=1",
        listing(&[("임상 B", "read?seq=7")]),
    );
    let watcher = watcher(pages, JsonFileStore::new(temp.path().join("s.json")))
        .with_channel(Box::new(RecordingChannel::succeeding("mail")));
    let known = DedupState::new();

    let digest = watcher
        .collect(
            &[source("B", B_LIST, 1), source("A", A_LIST, 1)],
            &KeywordFilter::parse("바이오,임상"),
            &known,
        )
        .await;

    let order: Vec<_> = digest
        .groups()
        .iter()
        .map(|group| group.source.as_str())
        .collect();
    assert_eq!(order, vec!["B", "A"]);
    assert_eq!(digest.groups()[0].entries[0].token, "7");
}

#[tokio::test]
async fn run_without_channels_is_refused() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let watcher = watcher(a_page(), JsonFileStore::new(temp.path().join("s.json")));

    let err = watcher
        .run(&[source("A", A_LIST, 1)], &KeywordFilter::parse("바이오"))
        .await
        .unwrap_err();

    assert!(matches!(err, RunError::NoChannels));
}
