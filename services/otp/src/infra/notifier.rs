use std::time::Duration;

use anyhow::Context as _;
use reqwest::Client;
use serde::Serialize;

use crate::domain::repository::Notifier;
use crate::domain::types::{ChallengePurpose, EmailAddress, OtpCode};

/// Upper bound on one delivery attempt; issuance never retries.
const DELIVERY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Serialize)]
struct DeliveryRequest<'a> {
    destination: &'a str,
    code: &'a str,
    purpose: ChallengePurpose,
}

/// Hands codes to a mail relay over HTTP. Any transport error or non-2xx
/// status counts as a failed delivery.
#[derive(Clone)]
pub struct HttpNotifier {
    client: Client,
    url: String,
}

impl HttpNotifier {
    pub fn new(url: impl Into<String>) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(DELIVERY_TIMEOUT)
            .build()
            .context("build notifier http client")?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl Notifier for HttpNotifier {
    async fn send(
        &self,
        destination: &EmailAddress,
        code: &OtpCode,
        purpose: ChallengePurpose,
    ) -> anyhow::Result<()> {
        self.client
            .post(&self.url)
            .json(&DeliveryRequest {
                destination: destination.as_str(),
                code: code.as_str(),
                purpose,
            })
            .send()
            .await
            .context("send to mail relay")?
            .error_for_status()
            .context("mail relay rejected delivery")?;
        Ok(())
    }
}
