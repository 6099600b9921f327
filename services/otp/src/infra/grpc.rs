use tonic::transport::Channel;

use vouch_proto::identity::{
    ConfirmEmailRequest, identity_service_client::IdentityServiceClient,
};

use crate::domain::repository::IdentityProvider;
use crate::domain::types::EmailAddress;

#[derive(Clone)]
pub struct GrpcIdentityProvider {
    client: IdentityServiceClient<Channel>,
}

impl GrpcIdentityProvider {
    pub fn new(channel: Channel) -> Self {
        Self {
            client: IdentityServiceClient::new(channel),
        }
    }
}

impl IdentityProvider for GrpcIdentityProvider {
    async fn confirm_email(&self, email: &EmailAddress) -> anyhow::Result<()> {
        let response = self
            .client
            .clone()
            .confirm_email(ConfirmEmailRequest {
                email: email.as_str().to_owned(),
            })
            .await
            .map_err(|status| anyhow::anyhow!("gRPC confirm_email failed: {status}"))?;
        if !response.into_inner().newly_confirmed {
            tracing::debug!("account was already confirmed");
        }
        Ok(())
    }
}
