use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use leadsync::{
    db::{self, LeadStore, ListParams},
    smtp::{self, SmtpAuth},
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{tcp::OwnedReadHalf, tcp::OwnedWriteHalf, TcpListener, TcpStream};

async fn start_smtp(auth: Option<SmtpAuth>) -> (String, LeadStore) {
    let pool = db::connect("sqlite://:memory:")
        .await
        .expect("connect memory sqlite");
    let store = LeadStore::new(pool);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    let serve_store = store.clone();
    tokio::spawn(async move {
        smtp::serve(listener, serve_store, auth).await.unwrap();
    });
    (addr, store)
}

struct Client {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl Client {
    async fn connect(addr: &str) -> Self {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (r, w) = stream.into_split();
        let mut client = Client {
            reader: BufReader::new(r),
            writer: w,
        };
        assert!(client.line().await.starts_with("220"));
        client
    }

    async fn line(&mut self) -> String {
        let mut buf = String::new();
        self.reader.read_line(&mut buf).await.unwrap();
        buf.trim_end().to_string()
    }

    /// Send a command and return the final reply line.
    async fn cmd(&mut self, cmd: &str) -> String {
        self.writer
            .write_all(format!("{cmd}\r\n").as_bytes())
            .await
            .unwrap();
        loop {
            let line = self.line().await;
            if line.len() < 4 || line.as_bytes()[3] != b'-' {
                return line;
            }
        }
    }
}

const MESSAGE: &str = concat!(
    "From: Website <forms@example.test>\r\n",
    "Subject: Turbo wanted\r\n",
    "Date: Tue, 04 Mar 2025 14:05:00 +0000\r\n",
    "Content-Type: text/html\r\n",
    "\r\n",
    "<span class=\"label\">Email:</span><span>driver@example.com</span>\r\n",
    "<span class=\"label\">Vehicle Part:</span><span>Turbo</span>\r\n",
    "..\r\n",
);

#[tokio::test]
async fn delivered_message_becomes_a_lead() {
    let (addr, store) = start_smtp(None).await;
    let mut c = Client::connect(&addr).await;

    assert!(c.cmd("EHLO test").await.starts_with("250 "));
    assert!(c.cmd("MAIL FROM:<forms@example.test>").await.starts_with("250"));
    assert!(c.cmd("RCPT TO:<leads@example.test>").await.starts_with("250"));
    assert!(c.cmd("DATA").await.starts_with("354"));
    let reply = c.cmd(&format!("{MESSAGE}.")).await;
    assert!(reply.starts_with("250 OK lead="), "{reply}");

    // Redelivery of the same message.
    c.cmd("MAIL FROM:<forms@example.test>").await;
    c.cmd("RCPT TO:<leads@example.test>").await;
    c.cmd("DATA").await;
    assert_eq!(c.cmd(&format!("{MESSAGE}.")).await, "250 OK duplicate");
    assert!(c.cmd("QUIT").await.starts_with("221"));

    let leads = store.list(&ListParams::default()).await.unwrap();
    assert_eq!(leads.len(), 1);
    assert_eq!(leads[0].lead.fields.email.as_deref(), Some("driver@example.com"));
    assert_eq!(leads[0].lead.fields.vehicle_part.as_deref(), Some("Turbo"));
}

#[tokio::test]
async fn auth_is_enforced_when_configured() {
    let (addr, _store) = start_smtp(Some(SmtpAuth {
        user: "forms".into(),
        pass: "s3cret".into(),
    }))
    .await;
    let mut c = Client::connect(&addr).await;

    c.cmd("EHLO test").await;
    assert!(c.cmd("MAIL FROM:<x@example.test>").await.starts_with("530"));
    let bad = B64.encode(b"\0forms\0nope");
    assert!(c.cmd(&format!("AUTH PLAIN {bad}")).await.starts_with("535"));
    let good = B64.encode(b"\0forms\0s3cret");
    assert!(c.cmd(&format!("AUTH PLAIN {good}")).await.starts_with("235"));
    assert!(c.cmd("MAIL FROM:<x@example.test>").await.starts_with("250"));
}

#[tokio::test]
async fn data_requires_a_transaction() {
    let (addr, _store) = start_smtp(None).await;
    let mut c = Client::connect(&addr).await;
    assert!(c.cmd("DATA").await.starts_with("503"));
    assert!(c.cmd("NOOP").await.starts_with("250"));
    assert!(c.cmd("VRFY someone").await.starts_with("502"));
}
