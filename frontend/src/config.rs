use gloo_storage::{LocalStorage, Storage};
use shared::{ClientConfig, ConfigOverrides};
use web_sys::UrlSearchParams;

const ENDPOINT_KEY: &str = "predict_endpoint";

/// `?endpoint=` beats the endpoint remembered from an earlier visit, which
/// beats the compiled-in default.
pub fn load_config() -> ClientConfig {
    let query_endpoint = query_param("endpoint");

    if let Some(endpoint) = &query_endpoint {
        if let Err(e) = LocalStorage::set(ENDPOINT_KEY, endpoint) {
            log::warn!("Could not remember endpoint override: {}", e);
        }
    }

    let overrides = ConfigOverrides {
        endpoint: query_endpoint.or_else(|| LocalStorage::get::<String>(ENDPOINT_KEY).ok()),
        timeout_ms: query_param("timeout_ms"),
    };

    ClientConfig::default().with_overrides(overrides)
}

fn query_param(name: &str) -> Option<String> {
    let search = web_sys::window()?.location().search().ok()?;
    UrlSearchParams::new_with_str(&search).ok()?.get(name)
}
