use super::error::BootstrapError;
use common::config::ViewerConfig;
use common::fleet::AgentRecord;
use log::error;
use reqwest::{
    header::{HeaderMap, ACCEPT, USER_AGENT},
    ClientBuilder, StatusCode,
};

/// One-shot fetch of the full fleet, used before the feed is attached.
/// Failures surface to the caller; there is no retry at this layer
pub(crate) async fn fetch_fleet(config: &ViewerConfig) -> Result<Vec<AgentRecord>, BootstrapError> {
    let client_result = ClientBuilder::new().build();
    let client = match client_result {
        Ok(result) => result,
        Err(err) => {
            error!("[viewer] Could not create bootstrap client: {err:?}");
            return Err(BootstrapError::Fetch);
        }
    };

    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
            .parse()
            .unwrap(),
    );
    headers.insert(ACCEPT, "application/json".parse().unwrap());

    let response_result = client.get(config.agents_url()).headers(headers).send().await;
    let response = match response_result {
        Ok(result) => result,
        Err(err) => {
            error!("[viewer] Could not send bootstrap request: {err:?}");
            return Err(BootstrapError::FetchRequest);
        }
    };

    if response.status() != StatusCode::OK {
        error!(
            "[viewer] Non-200 response for bootstrap fetch: {}",
            response.status()
        );
        return Err(BootstrapError::BadResponse);
    }

    let fleet_result = response.json::<Vec<AgentRecord>>().await;
    let fleet = match fleet_result {
        Ok(result) => result,
        Err(err) => {
            error!("[viewer] Could not deserialize fleet listing: {err:?}");
            return Err(BootstrapError::BadBody);
        }
    };

    Ok(fleet)
}
