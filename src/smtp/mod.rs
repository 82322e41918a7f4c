//! SMTP intake: form notifications delivered here are ingested as leads.
//!
//! Supports HELO/EHLO, optional AUTH PLAIN, MAIL FROM, RCPT TO, DATA, RSET, NOOP, QUIT.

use crate::{
    db::LeadStore,
    error::Result,
    pipeline::{self, Outcome},
    util::raw_message_from_eml,
};
use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use std::sync::Arc;
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{tcp::OwnedWriteHalf, TcpListener, TcpStream},
};
use tracing::{debug, error, info, warn};

/// Credentials required before MAIL FROM when configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpAuth {
    pub user: String,
    pub pass: String,
}

impl SmtpAuth {
    /// Check a base64 `AUTH PLAIN` token (`authzid\0user\0pass`).
    fn accepts(&self, token: &str) -> bool {
        let Ok(data) = B64.decode(token.trim()) else {
            return false;
        };
        let mut parts = data.split(|b| *b == 0).skip(1);
        let user = parts.next().unwrap_or_default();
        let pass = parts.next().unwrap_or_default();
        user == self.user.as_bytes() && pass == self.pass.as_bytes()
    }
}

pub async fn start_smtp(addr: &str, store: LeadStore, auth: Option<SmtpAuth>) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("smtp intake: {}", listener.local_addr()?);
    serve(listener, store, auth).await
}

/// Accept connections forever, one task per client.
pub async fn serve(listener: TcpListener, store: LeadStore, auth: Option<SmtpAuth>) -> Result<()> {
    let auth = auth.map(Arc::new);
    loop {
        let (stream, peer) = listener.accept().await?;
        let store = store.clone();
        let auth = auth.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_client(store, auth, stream).await {
                warn!("smtp connection error from {}: {}", peer, e);
            }
        });
    }
}

async fn reply(writer: &mut OwnedWriteHalf, line: &str) -> std::io::Result<()> {
    debug!("smtp => {}", line);
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\r\n").await?;
    writer.flush().await
}

async fn handle_client(
    store: LeadStore,
    auth: Option<Arc<SmtpAuth>>,
    stream: TcpStream,
) -> Result<()> {
    let (read_half, mut writer) = stream.into_split();
    let mut reader = BufReader::new(read_half);
    reply(&mut writer, "220 leadsync intake").await?;

    let mut authed = auth.is_none();
    let mut in_transaction = false;
    let mut buf = String::new();

    loop {
        buf.clear();
        if reader.read_line(&mut buf).await? == 0 {
            break;
        }
        let line = buf.trim_end_matches(['\r', '\n']).to_string();
        debug!("smtp <= {}", line);
        let upper = line.to_ascii_uppercase();

        if upper.starts_with("EHLO") || upper.starts_with("HELO") {
            writer.write_all(b"250-leadsync\r\n").await?;
            if auth.is_some() {
                writer.write_all(b"250-AUTH PLAIN\r\n").await?;
            }
            reply(&mut writer, "250 OK").await?;
        } else if upper.starts_with("AUTH PLAIN") {
            let Some(expected) = auth.as_deref() else {
                reply(&mut writer, "503 AUTH not required").await?;
                continue;
            };
            let mut token = line.get(10..).unwrap_or_default().trim().to_string();
            if token.is_empty() {
                reply(&mut writer, "334 ").await?;
                reader.read_line(&mut token).await?;
            }
            if expected.accepts(&token) {
                authed = true;
                reply(&mut writer, "235 Authentication successful").await?;
            } else {
                reply(&mut writer, "535 Authentication failed").await?;
            }
        } else if upper.starts_with("AUTH") {
            reply(&mut writer, "504 Unrecognized authentication type").await?;
        } else if upper.starts_with("MAIL FROM:") {
            if !authed {
                reply(&mut writer, "530 Authentication required").await?;
                continue;
            }
            in_transaction = true;
            reply(&mut writer, "250 OK").await?;
        } else if upper.starts_with("RCPT TO:") {
            if !in_transaction {
                reply(&mut writer, "503 MAIL FROM first").await?;
                continue;
            }
            reply(&mut writer, "250 Accepted").await?;
        } else if upper == "DATA" {
            if !in_transaction {
                reply(&mut writer, "503 MAIL FROM first").await?;
                continue;
            }
            reply(&mut writer, "354 End data with <CR><LF>.<CR><LF>").await?;
            let data = read_data(&mut reader).await?;
            in_transaction = false;
            let response = ingest_data(&store, &data).await;
            reply(&mut writer, &response).await?;
        } else if upper == "RSET" {
            in_transaction = false;
            reply(&mut writer, "250 OK").await?;
        } else if upper == "NOOP" {
            reply(&mut writer, "250 OK").await?;
        } else if upper == "QUIT" {
            reply(&mut writer, "221 Bye").await?;
            break;
        } else {
            reply(&mut writer, "502 Command not implemented").await?;
        }
    }
    Ok(())
}

/// Read a DATA payload up to the lone `.` line, undoing dot-stuffing.
/// Bytes are kept as sent; charset decoding is left to the MIME parser.
async fn read_data<R>(reader: &mut R) -> std::io::Result<Vec<u8>>
where
    R: AsyncBufReadExt + Unpin,
{
    let mut data = Vec::new();
    let mut line = Vec::new();
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line).await? == 0 {
            break;
        }
        if line == b".\r\n" || line == b".\n" {
            break;
        }
        let unstuffed = line.strip_prefix(b".").unwrap_or(&line[..]);
        data.extend_from_slice(unstuffed);
    }
    Ok(data)
}

/// Final reply for one delivered message.
async fn ingest_data(store: &LeadStore, data: &[u8]) -> String {
    let message = match raw_message_from_eml(data) {
        Ok(m) => m,
        Err(e) => {
            warn!("smtp parse error: {e}");
            return "554 Message could not be parsed".to_string();
        }
    };
    match pipeline::ingest(store, &message).await {
        Ok(Outcome::Saved { id }) => format!("250 OK lead={id}"),
        Ok(Outcome::Duplicate) => "250 OK duplicate".to_string(),
        Ok(Outcome::Skipped) => "250 OK skipped".to_string(),
        Err(e) => {
            error!("smtp store error: {e}");
            "451 Requested action aborted: local error".to_string()
        }
    }
}
