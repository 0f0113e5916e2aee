use super::{decode_payload, render_result, Dispatch};
use crate::error::DispatchError;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::Deserialize;
use std::time::Duration;
use tracing::info;

const DEFAULT_SMTP_PORT: u16 = 25;
const SMTP_TIMEOUT: Duration = Duration::from_secs(10);

/// `Config` block of a `builtin:smtp` manifest.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SmtpConfig {
    #[serde(rename = "AlertList")]
    pub alert_list: Vec<String>,
    #[serde(rename = "FromAddress")]
    pub from_address: String,
    #[serde(rename = "Subject")]
    pub subject: String,
    /// `host` or `host:port`.
    #[serde(rename = "SMTPServer")]
    pub smtp_server: String,
}

/// Mails every record of a payload to a fixed recipient list.
#[derive(Debug, Clone)]
pub struct SmtpSink {
    from: Mailbox,
    to: Vec<Mailbox>,
    subject: String,
    host: String,
    port: u16,
}

impl SmtpSink {
    pub fn from_config(config: SmtpConfig) -> Result<Self, String> {
        if config.alert_list.is_empty() {
            return Err("AlertList is empty".to_string());
        }
        if config.smtp_server.is_empty() {
            return Err("SMTPServer is not set".to_string());
        }

        let from = config
            .from_address
            .parse::<Mailbox>()
            .map_err(|e| format!("bad FromAddress '{}': {}", config.from_address, e))?;
        let to = config
            .alert_list
            .iter()
            .map(|addr| {
                addr.parse::<Mailbox>()
                    .map_err(|e| format!("bad AlertList entry '{}': {}", addr, e))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let (host, port) = split_server(&config.smtp_server)?;
        let subject = if config.subject.is_empty() {
            "Hostwatch alert".to_string()
        } else {
            config.subject
        };

        Ok(Self {
            from,
            to,
            subject,
            host,
            port,
        })
    }

    fn build_message(&self, body: String) -> Result<Message, DispatchError> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(self.subject.clone())
            .header(ContentType::TEXT_PLAIN);
        for to in &self.to {
            builder = builder.to(to.clone());
        }
        builder
            .body(body)
            .map_err(|e| DispatchError::Smtp(e.to_string()))
    }
}

fn split_server(server: &str) -> Result<(String, u16), String> {
    match server.rsplit_once(':') {
        Some((host, port)) => {
            let port = port
                .parse::<u16>()
                .map_err(|_| format!("bad SMTPServer port in '{}'", server))?;
            Ok((host.to_string(), port))
        }
        None => Ok((server.to_string(), DEFAULT_SMTP_PORT)),
    }
}

#[async_trait]
impl Dispatch for SmtpSink {
    async fn dispatch(&self, payload: &str, _succeeded: bool) -> Result<String, DispatchError> {
        let results = decode_payload(payload)?;
        if results.is_empty() {
            return Ok("nothing to send".to_string());
        }

        let body = results
            .iter()
            .map(render_result)
            .collect::<Vec<_>>()
            .join("\n");
        let message = self.build_message(body)?;

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(self.host.as_str())
            .port(self.port)
            .timeout(Some(SMTP_TIMEOUT))
            .build();
        mailer
            .send(message)
            .await
            .map_err(|e| DispatchError::Smtp(e.to_string()))?;

        info!(
            "📧 Sent {} result(s) to {} recipient(s) via {}:{}",
            results.len(),
            self.to.len(),
            self.host,
            self.port
        );
        Ok(format!("sent {} result(s)", results.len()))
    }
}
