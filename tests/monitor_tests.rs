use feedhook::{
    config::AppConfig,
    state::{build_monitor, LiveMonitor},
    tasks::feed_monitor::{CycleOutcome, LastSeen},
};
use serde_json::Value;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LISTING: &str = "https://bringatrailer.com/listing/1967-ford-mustang-fastback/";

fn feed_body(items: &[(&str, &str)]) -> String {
    let items: String = items
        .iter()
        .map(|(title, link)| {
            format!(
                r#"<item>
  <title>{title}</title>
  <link>{link}</link>
  <description><![CDATA[<p>This car is offered at no reserve &amp; ready.</p>]]></description>
  <pubDate>Mon, 15 Jan 2024 10:30:00 +0000</pubDate>
  <content:encoded><![CDATA[<p><img src="https://bringatrailer.com/wp-content/uploads/2024/01/mustang.jpg?fit=940%2C627" /></p>]]></content:encoded>
</item>"#
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:content="http://purl.org/rss/1.0/modules/content/"><channel>{items}</channel></rss>"#
    )
}

async fn mount_feed(server: &MockServer, body: String) {
    Mock::given(method("GET"))
        .and(path("/feed/"))
        .and(header_exists("accept"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/rss+xml"))
        .mount(server)
        .await;
}

fn webhook_monitor(server: &MockServer) -> LiveMonitor {
    let base = server.uri();
    let config = AppConfig::from_lookup(|key| match key {
        "FH_FEED_URL" => Some(format!("{base}/feed/")),
        "FH_WEBHOOK_URL" => Some(format!("{base}/webhook")),
        _ => None,
    })
    .unwrap();
    build_monitor(&config, config.require_transport().unwrap()).unwrap()
}

fn telegram_monitor(server: &MockServer) -> LiveMonitor {
    let base = server.uri();
    let config = AppConfig::from_lookup(|key| match key {
        "FH_FEED_URL" => Some(format!("{base}/feed/")),
        "FH_TELEGRAM_BOT_TOKEN" => Some("123:abc".to_string()),
        "FH_TELEGRAM_CHAT_ID" => Some("-100".to_string()),
        "FH_TELEGRAM_API_BASE_URL" => Some(base.clone()),
        _ => None,
    })
    .unwrap();
    build_monitor(&config, config.require_transport().unwrap()).unwrap()
}

#[tokio::test]
async fn test_webhook_receives_embed_for_newest_item() {
    let server = MockServer::start().await;
    mount_feed(
        &server,
        feed_body(&[
            ("1967 Ford Mustang Fastback", LISTING),
            ("Older Listing", "https://bringatrailer.com/listing/older/"),
        ]),
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/webhook"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let monitor = webhook_monitor(&server);
    let (last_seen, outcome) = monitor.run_cycle(LastSeen::empty()).await;

    assert_eq!(
        outcome,
        CycleOutcome::Notified {
            link: LISTING.to_string(),
            title: "1967 Ford Mustang Fastback".to_string(),
        }
    );
    assert_eq!(last_seen.link(), Some(LISTING));

    let requests = server.received_requests().await.unwrap();
    let webhook = requests
        .iter()
        .find(|r| r.url.path() == "/webhook")
        .expect("webhook should have been called");
    let body: Value = serde_json::from_slice(&webhook.body).unwrap();
    let embed = &body["embeds"][0];
    assert_eq!(body["embeds"].as_array().unwrap().len(), 1);
    assert_eq!(embed["title"], "1967 Ford Mustang Fastback");
    assert_eq!(embed["url"], LISTING);
    assert_eq!(embed["color"], 0xff6b35);
    assert_eq!(embed["timestamp"], "2024-01-15T10:30:00.000Z");
    assert_eq!(
        embed["description"],
        "This car is offered at no reserve & ready."
    );
    assert_eq!(
        embed["image"]["url"],
        "https://bringatrailer.com/wp-content/uploads/2024/01/mustang.jpg"
    );
    assert_eq!(embed["footer"]["text"], "Bring a Trailer");
}

#[tokio::test]
async fn test_unchanged_feed_posts_once() {
    let server = MockServer::start().await;
    mount_feed(&server, feed_body(&[("1967 Ford Mustang Fastback", LISTING)])).await;
    Mock::given(method("POST"))
        .and(path("/webhook"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let monitor = webhook_monitor(&server);
    let (last_seen, first) = monitor.run_cycle(LastSeen::empty()).await;
    let (last_seen, second) = monitor.run_cycle(last_seen).await;

    assert!(matches!(first, CycleOutcome::Notified { .. }));
    assert_eq!(
        second,
        CycleOutcome::Unchanged {
            link: LISTING.to_string()
        }
    );
    assert_eq!(last_seen.link(), Some(LISTING));
}

#[tokio::test]
async fn test_rejected_webhook_is_retried_next_cycle() {
    let server = MockServer::start().await;
    mount_feed(&server, feed_body(&[("1967 Ford Mustang Fastback", LISTING)])).await;
    Mock::given(method("POST"))
        .and(path("/webhook"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/webhook"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let monitor = webhook_monitor(&server);
    let (last_seen, first) = monitor.run_cycle(LastSeen::empty()).await;
    match first {
        CycleOutcome::DeliveryFailed { link, error } => {
            assert_eq!(link, LISTING);
            assert!(error.contains("500"), "unexpected error: {error}");
        }
        other => panic!("expected delivery failure, got {other:?}"),
    }
    assert_eq!(last_seen, LastSeen::empty());

    let (last_seen, second) = monitor.run_cycle(last_seen).await;
    assert!(matches!(second, CycleOutcome::Notified { .. }));
    assert_eq!(last_seen.link(), Some(LISTING));
}

#[tokio::test]
async fn test_feed_error_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/webhook"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let monitor = webhook_monitor(&server);
    let (last_seen, outcome) = monitor.run_cycle(LastSeen::empty()).await;

    assert!(matches!(outcome, CycleOutcome::FetchFailed { .. }));
    assert_eq!(last_seen, LastSeen::empty());
}

#[tokio::test]
async fn test_hanging_feed_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(feed_body(&[("1967 Ford Mustang Fastback", LISTING)]), "application/rss+xml")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/webhook"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let base = server.uri();
    let config = AppConfig::from_lookup(|key| match key {
        "FH_FEED_URL" => Some(format!("{base}/feed/")),
        "FH_WEBHOOK_URL" => Some(format!("{base}/webhook")),
        "FH_FETCH_TIMEOUT_SECS" => Some("1".to_string()),
        _ => None,
    })
    .unwrap();
    assert_eq!(config.fetch_timeout, Duration::from_secs(1));
    let monitor = build_monitor(&config, config.require_transport().unwrap()).unwrap();

    let (last_seen, outcome) = monitor.run_cycle(LastSeen::empty()).await;

    assert!(
        matches!(outcome, CycleOutcome::FetchFailed { .. }),
        "expected fetch failure, got {outcome:?}"
    );
    assert_eq!(last_seen, LastSeen::empty());
}

#[tokio::test]
async fn test_empty_feed_reports_no_items() {
    let server = MockServer::start().await;
    mount_feed(&server, feed_body(&[])).await;
    Mock::given(method("POST"))
        .and(path("/webhook"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let monitor = webhook_monitor(&server);
    let (_, outcome) = monitor.run_cycle(LastSeen::empty()).await;
    assert_eq!(outcome, CycleOutcome::NoItems);
}

#[tokio::test]
async fn test_telegram_receives_html_message() {
    let server = MockServer::start().await;
    mount_feed(&server, feed_body(&[("1967 Ford Mustang Fastback", LISTING)])).await;
    Mock::given(method("POST"))
        .and(path("/bot123:abc/sendMessage"))
        .and(body_partial_json(serde_json::json!({
            "chat_id": "-100",
            "parse_mode": "HTML"
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"ok": true, "result": {"message_id": 1}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let monitor = telegram_monitor(&server);
    let (last_seen, outcome) = monitor.run_cycle(LastSeen::empty()).await;

    assert!(matches!(outcome, CycleOutcome::Notified { .. }));
    assert_eq!(last_seen.link(), Some(LISTING));

    let requests = server.received_requests().await.unwrap();
    let message = requests
        .iter()
        .find(|r| r.url.path() == "/bot123:abc/sendMessage")
        .unwrap();
    let body: Value = serde_json::from_slice(&message.body).unwrap();
    let text = body["text"].as_str().unwrap();
    assert!(text.contains(&format!("<b><a href=\"{LISTING}\">1967 Ford Mustang Fastback</a></b>")));
    assert!(text.contains("no reserve &amp; ready."));
}

#[tokio::test]
async fn test_telegram_api_error_is_delivery_failure() {
    let server = MockServer::start().await;
    mount_feed(&server, feed_body(&[("1967 Ford Mustang Fastback", LISTING)])).await;
    Mock::given(method("POST"))
        .and(path("/bot123:abc/sendMessage"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            serde_json::json!({"ok": false, "description": "Bad Request: chat not found"}),
        ))
        .mount(&server)
        .await;

    let monitor = telegram_monitor(&server);
    let (last_seen, outcome) = monitor.run_cycle(LastSeen::empty()).await;

    match outcome {
        CycleOutcome::DeliveryFailed { error, .. } => assert!(error.contains("chat not found")),
        other => panic!("expected delivery failure, got {other:?}"),
    }
    assert_eq!(last_seen, LastSeen::empty());
}

#[tokio::test]
async fn test_preview_formats_without_sending() {
    let server = MockServer::start().await;
    mount_feed(&server, feed_body(&[("1967 Ford Mustang Fastback", LISTING)])).await;
    Mock::given(method("POST"))
        .and(path("/webhook"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let monitor = webhook_monitor(&server);
    let preview = monitor.preview().await.unwrap().expect("feed has an item");

    assert_eq!(preview.items_found, 1);
    assert_eq!(preview.item.link, LISTING);
    assert_eq!(preview.payload.timestamp, "2024-01-15T10:30:00.000Z");
}
