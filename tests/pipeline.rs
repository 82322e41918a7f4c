use chrono::{TimeZone, Utc};
use leadsync::{
    db::{self, LeadStore, ListParams},
    models::message::raw_message::{ContentType, RawMessage},
    pipeline::{self, BatchReport, Outcome},
    util::raw_message_from_eml,
};

async fn store() -> LeadStore {
    let pool = db::connect("sqlite://:memory:")
        .await
        .expect("connect memory sqlite");
    LeadStore::new(pool)
}

fn html_message(body: &str, minute: u32) -> RawMessage {
    RawMessage {
        sender: "Website <forms@example.test>".into(),
        subject: "Part request".into(),
        received_at: Some(Utc.with_ymd_and_hms(2025, 3, 4, 14, minute, 0).unwrap()),
        content_type: ContentType::Html,
        body: body.into(),
    }
}

#[tokio::test]
async fn labelled_spans_end_to_end() {
    let store = store().await;
    let msg = html_message(
        r#"<span class="label">Email:</span><span>user@example.com</span>
           <span class="label">Phone:</span><span>0123 456</span>"#,
        0,
    );
    let Outcome::Saved { id } = pipeline::ingest(&store, &msg).await.unwrap() else {
        panic!("expected the lead to be saved");
    };
    let stored = store.get(id).await.unwrap().expect("stored lead");
    assert_eq!(stored.lead.fields.email.as_deref(), Some("user@example.com"));
    assert_eq!(stored.lead.fields.number.as_deref(), Some("0123 456"));
    assert_eq!(stored.lead.raw, msg.body);
    assert_eq!(stored.lead.received_at, msg.received_at.unwrap());
}

#[tokio::test]
async fn plain_text_email_end_to_end() {
    let store = store().await;
    let eml = concat!(
        "From: forms@example.test\r\n",
        "Subject: Gearbox\r\n",
        "Date: Tue, 04 Mar 2025 14:05:00 +0000\r\n",
        "\r\n",
        "Name: Jo Bloggs\r\n",
        "Phone: 07700 900123\r\n",
        "Registration: AB12CDE\r\n",
        "Consider All Conditions: yes\r\n",
        "Additional Note: collect from\r\n",
        "the rear yard\r\n",
    );
    let msg = raw_message_from_eml(eml.as_bytes()).unwrap();
    let Outcome::Saved { id } = pipeline::ingest(&store, &msg).await.unwrap() else {
        panic!("expected the lead to be saved");
    };
    let fields = store.get(id).await.unwrap().unwrap().lead.fields;
    assert_eq!(fields.name.as_deref(), Some("Jo Bloggs"));
    assert_eq!(fields.number.as_deref(), Some("07700 900123"));
    assert_eq!(fields.email, None);
    assert_eq!(fields.vehicle_vrm.as_deref(), Some("AB12CDE"));
    assert_eq!(fields.vehicle_reg, None);
    assert_eq!(fields.consider_all_condition, Some(true));
    assert_eq!(fields.consider_both, Some(true));
    assert_eq!(fields.description.as_deref(), Some("collect from\nthe rear yard"));
}

#[tokio::test]
async fn rejected_message_stores_nothing() {
    let store = store().await;
    let msg = html_message("<p><b>Name:</b> Anonymous</p>", 0);
    assert_eq!(pipeline::ingest(&store, &msg).await.unwrap(), Outcome::Skipped);
    assert!(store.list(&ListParams::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn duplicates_are_ignored_not_reinserted() {
    let store = store().await;
    let msg = html_message(r#"<span class="label">Phone:</span><span>0123</span>"#, 7);
    assert!(matches!(
        pipeline::ingest(&store, &msg).await.unwrap(),
        Outcome::Saved { .. }
    ));
    assert_eq!(pipeline::ingest(&store, &msg).await.unwrap(), Outcome::Duplicate);

    // Same contact at a different time is a new lead.
    let later = html_message(&msg.body, 8);
    assert!(matches!(
        pipeline::ingest(&store, &later).await.unwrap(),
        Outcome::Saved { .. }
    ));
    assert_eq!(store.list(&ListParams::default()).await.unwrap().len(), 2);
}

#[tokio::test]
async fn one_failure_does_not_stop_the_batch() {
    let store = store().await;
    sqlx::query(
        "CREATE TRIGGER reject_boom BEFORE INSERT ON leads
         WHEN NEW.email = 'boom@example.com'
         BEGIN SELECT RAISE(ABORT, 'rejected by test'); END",
    )
    .execute(store.pool())
    .await
    .unwrap();

    let email = |addr: &str, minute| {
        html_message(
            &format!(r#"<span class="label">Email:</span><span>{addr}</span>"#),
            minute,
        )
    };
    let first = email("one@example.com", 1);
    let batch = vec![
        first.clone(),
        email("boom@example.com", 2),
        html_message("<p>no contact details</p>", 3),
        first,
        email("two@example.com", 4),
    ];
    let report = pipeline::ingest_batch(&store, batch).await;
    assert_eq!(
        report,
        BatchReport {
            saved: 2,
            duplicates: 1,
            skipped: 1,
            failed: 1,
        }
    );

    let outcomes: Vec<String> = store
        .recent_logs(50)
        .await
        .unwrap()
        .into_iter()
        .map(|l| l.outcome)
        .collect();
    assert_eq!(outcomes, ["saved", "failed", "skipped", "duplicate", "saved"]);
}

#[tokio::test]
async fn broken_audit_table_does_not_lose_leads() {
    let store = store().await;
    sqlx::query("DROP TABLE logs")
        .execute(store.pool())
        .await
        .unwrap();

    let msg = html_message(r#"<span class="label">Email:</span><span>kept@example.com</span>"#, 9);
    let Outcome::Saved { id } = pipeline::ingest(&store, &msg).await.unwrap() else {
        panic!("expected the lead to be saved");
    };
    assert!(store.get(id).await.unwrap().is_some());
    assert_eq!(pipeline::ingest(&store, &msg).await.unwrap(), Outcome::Duplicate);
    assert!(store.recent_logs(10).await.is_err());
}
