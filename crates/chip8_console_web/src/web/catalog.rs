use chip8_console::error::CatalogError;
use chip8_console::program::{parse_catalog, ProgramDescriptor};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

async fn fetch_text(url: &str) -> Result<String, CatalogError> {
    let window = web_sys::window().ok_or_else(|| CatalogError::Fetch("no window".into()))?;
    let resp = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|_| CatalogError::Fetch(format!("request for {url} failed")))?
        .dyn_into::<web_sys::Response>()
        .map_err(|_| CatalogError::Fetch("expected a Response".into()))?;

    if !resp.ok() {
        return Err(CatalogError::Fetch(format!("HTTP status {}", resp.status())));
    }

    let text = resp
        .text()
        .map_err(|_| CatalogError::Fetch("response body unavailable".into()))?;
    JsFuture::from(text)
        .await
        .ok()
        .and_then(|v| v.as_string())
        .ok_or_else(|| CatalogError::Fetch("response body is not text".into()))
}

/// Fetches and parses the metadata document. Any failure yields an empty list.
pub(super) async fn fetch_programs(url: &str) -> Vec<ProgramDescriptor> {
    let result = match fetch_text(url).await {
        Ok(raw) => parse_catalog(&raw),
        Err(e) => Err(e),
    };
    result.unwrap_or_else(|e| {
        web_sys::console::error_1(&format!("Failed to fetch {url}: {e}").into());
        Vec::new()
    })
}
