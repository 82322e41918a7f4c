use axum::Router;
use leadsync::{app::AppState, db, db::LeadStore, http};
use serde_json::json;
use tokio::task::JoinHandle;

async fn start_server() -> (String, JoinHandle<()>) {
    let pool = db::connect("sqlite://:memory:")
        .await
        .expect("connect memory sqlite");
    let state = AppState {
        store: LeadStore::new(pool),
    };
    let app: Router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), handle)
}

const FORM_EML: &str = concat!(
    "From: Website <forms@example.test>\r\n",
    "To: leads@example.test\r\n",
    "Subject: Engine enquiry\r\n",
    "Date: Tue, 04 Mar 2025 14:05:00 +0000\r\n",
    "MIME-Version: 1.0\r\n",
    "Content-Type: text/html; charset=utf-8\r\n",
    "\r\n",
    "<html><body>\r\n",
    "<span class=\"label\">Name:</span><span>Sam Mechanic</span><br />\r\n",
    "<span class=\"label\">Email:</span><span>user@example.com</span><br />\r\n",
    "<span class=\"label\">Phone:</span><span>0123 456</span><br />\r\n",
    "<span class=\"label\" id=\"make\">Make:</span><span class=\"mailInfo\">BMW</span><br />\r\n",
    "<span class=\"label\">Vehicle Series:</span><span>3 Series</span><br />\r\n",
    "<span class=\"label\">Year:</span><span>2014</span><br />\r\n",
    "<span class=\"label\">Used Condition:</span><span class=\"mailInfo\">on</span><br />\r\n",
    "<span class=\"label\">New Condition:</span><span class=\"mailInfo\">off</span><br />\r\n",
    "<span class=\"label\">Supply Only:</span><span class=\"mailInfo\">maybe</span><br />\r\n",
    "</body></html>\r\n",
);

#[tokio::test]
async fn ingest_raw_and_fetch_lead() {
    let (base, _srv) = start_server().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/ingest/raw", base))
        .body(FORM_EML.as_bytes().to_vec())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 201);
    let v: serde_json::Value = res.json().await.unwrap();
    assert_eq!(v["status"], "saved");
    let id = v["id"].as_str().unwrap().to_string();

    let res = client
        .get(format!("{}/leads/{}", base, id))
        .send()
        .await
        .unwrap();
    assert!(res.status().is_success());
    let lead: serde_json::Value = res.json().await.unwrap();
    assert_eq!(lead["id"], id.as_str());
    assert_eq!(lead["name"], "Sam Mechanic");
    assert_eq!(lead["email"], "user@example.com");
    assert_eq!(lead["number"], "0123 456");
    assert_eq!(lead["vehicle_brand"], "BMW");
    assert_eq!(lead["vehicle_model"], "3 Series");
    assert_eq!(lead["vehicle_series"], "3 Series");
    assert_eq!(lead["vehicle_reg"], "2014");
    assert_eq!(lead["used_condition"], true);
    assert_eq!(lead["new_condition"], false);
    assert!(lead.get("supply_only").is_none());
    assert_eq!(
        lead["source"],
        "email:Website <forms@example.test> - Engine enquiry"
    );
    assert!(lead["raw"].as_str().unwrap().contains("Sam Mechanic"));
    assert!(lead["received_at"].as_str().unwrap().starts_with("2025-03-04T14:05:00"));
}

#[tokio::test]
async fn redelivered_message_is_a_duplicate() {
    let (base, _srv) = start_server().await;
    let client = reqwest::Client::new();

    for expected in ["saved", "duplicate"] {
        let res = client
            .post(format!("{}/ingest/raw", base))
            .body(FORM_EML.as_bytes().to_vec())
            .send()
            .await
            .unwrap();
        assert!(res.status().is_success());
        let v: serde_json::Value = res.json().await.unwrap();
        assert_eq!(v["status"], expected);
    }

    let res = client.get(format!("{}/leads", base)).send().await.unwrap();
    let arr: serde_json::Value = res.json().await.unwrap();
    assert_eq!(arr.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn message_without_contact_is_skipped_and_logged() {
    let (base, _srv) = start_server().await;
    let client = reqwest::Client::new();

    let payload = json!({
        "sender": "Website <forms@example.test>",
        "subject": "Incomplete form",
        "content_type": "text",
        "body": "Name: Nobody\nMake: Ford\n",
    });
    let res = client
        .post(format!("{}/ingest", base))
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert!(res.status().is_success());
    let v: serde_json::Value = res.json().await.unwrap();
    assert_eq!(v["status"], "skipped");

    let res = client.get(format!("{}/leads", base)).send().await.unwrap();
    let arr: serde_json::Value = res.json().await.unwrap();
    assert!(arr.as_array().unwrap().is_empty());

    let res = client.get(format!("{}/logs", base)).send().await.unwrap();
    let logs: serde_json::Value = res.json().await.unwrap();
    let logs = logs.as_array().unwrap();
    assert!(logs.iter().any(|l| l["outcome"] == "skipped"
        && l["source"] == "email:Website <forms@example.test> - Incomplete form"));
}

#[tokio::test]
async fn extract_endpoint_does_not_store() {
    let (base, _srv) = start_server().await;
    let client = reqwest::Client::new();

    let payload = json!({
        "sender": "forms@example.test",
        "subject": "Preview",
        "received_at": "2025-03-04T14:05:00Z",
        "content_type": "html",
        "body": "<p><strong>Email:</strong> preview@example.com</p><p><b>Registration:</b> AB12CDE</p>",
    });
    let res = client
        .post(format!("{}/extract", base))
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert!(res.status().is_success());
    let v: serde_json::Value = res.json().await.unwrap();
    assert_eq!(v["fields"]["email"], "preview@example.com");
    assert_eq!(v["fields"]["vrm"], "AB12CDE");
    assert_eq!(v["lead"]["vehicle_vrm"], "AB12CDE");
    assert_eq!(v["lead"]["source"], "email:forms@example.test - Preview");

    let res = client.get(format!("{}/leads", base)).send().await.unwrap();
    let arr: serde_json::Value = res.json().await.unwrap();
    assert!(arr.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn list_filters_and_missing_lead() {
    let (base, _srv) = start_server().await;
    let client = reqwest::Client::new();

    for (email, minute) in [("alpha@example.com", "01"), ("beta@example.com", "02")] {
        let payload = json!({
            "sender": "forms@example.test",
            "subject": "Lead",
            "received_at": format!("2025-03-04T14:{minute}:00Z"),
            "content_type": "text",
            "body": format!("Email: {email}\n"),
        });
        let res = client
            .post(format!("{}/ingest", base))
            .json(&payload)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status().as_u16(), 201);
    }

    let res = client
        .get(format!("{}/leads?q=alpha", base))
        .send()
        .await
        .unwrap();
    let arr: serde_json::Value = res.json().await.unwrap();
    let arr = arr.as_array().unwrap();
    assert_eq!(arr.len(), 1);
    assert_eq!(arr[0]["email"], "alpha@example.com");

    let res = client
        .get(format!("{}/leads?limit=1", base))
        .send()
        .await
        .unwrap();
    let arr: serde_json::Value = res.json().await.unwrap();
    assert_eq!(arr[0]["email"], "beta@example.com");

    let res = client
        .get(format!("{}/leads/{}", base, uuid::Uuid::new_v4()))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 404);
}
