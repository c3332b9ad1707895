use crate::models::Flat;
use async_trait::async_trait;
use tracing::{debug, info, warn};
use url::Url;

/// Device capability for handing a URL to another app
#[async_trait]
pub trait UrlLauncher: Send + Sync {
    async fn can_open(&self, url: &Url) -> anyhow::Result<bool>;

    async fn open(&self, url: &Url) -> anyhow::Result<()>;
}

pub fn share_message(flat: &Flat) -> String {
    format!(
        "Check out this flat in {} at {}, {}! Contact: {}",
        flat.city, flat.street_name, flat.street_number, flat.owner.email
    )
}

/// `whatsapp://send` link carrying `message`
pub fn whatsapp_url(message: &str) -> anyhow::Result<Url> {
    Ok(Url::parse_with_params("whatsapp://send", &[("text", message)])?)
}

/// Hand a prefilled message about `flat` to WhatsApp.
/// Returns whether the link was opened; failures are only logged.
pub async fn share_via_whatsapp(launcher: &dyn UrlLauncher, flat: &Flat) -> bool {
    let url = match whatsapp_url(&share_message(flat)) {
        Ok(url) => url,
        Err(err) => {
            warn!("Could not build share link for flat {}: {:#}", flat.id, err);
            return false;
        }
    };

    match launcher.can_open(&url).await {
        Ok(true) => {}
        Ok(false) => {
            info!("WhatsApp is not installed");
            return false;
        }
        Err(err) => {
            warn!("Error opening WhatsApp: {:#}", err);
            return false;
        }
    }

    match launcher.open(&url).await {
        Ok(()) => {
            debug!("Shared flat {} via WhatsApp", flat.id);
            true
        }
        Err(err) => {
            warn!("Error opening WhatsApp: {:#}", err);
            false
        }
    }
}
