//! Browser downloads and clock access.

use crate::export::ExportArtifact;
use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use web_sys::wasm_bindgen::closure::Closure;
use web_sys::wasm_bindgen::{JsCast, JsValue};

/// How long an object URL outlives the click that started its download.
const REVOKE_DELAY_MS: i32 = 40_000;

fn js_error(err: JsValue) -> anyhow::Error {
    anyhow!("{}", err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

/// Saves `artifact` through a transient object URL and anchor element.
pub fn download(artifact: &ExportArtifact) -> Result<()> {
    let window = web_sys::window().ok_or_else(|| anyhow!("no window"))?;
    let document = window.document().ok_or_else(|| anyhow!("no document"))?;

    let bytes = js_sys::Uint8Array::from(artifact.bytes.as_slice());
    let parts = js_sys::Array::of1(&bytes);
    let options = web_sys::BlobPropertyBag::new();
    options.set_type(artifact.mime);
    let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &options)
        .map_err(js_error)?;

    let url = web_sys::Url::create_object_url_with_blob(&blob).map_err(js_error)?;
    let anchor: web_sys::HtmlAnchorElement = document
        .create_element("a")
        .map_err(js_error)?
        .dyn_into()
        .map_err(|element: web_sys::Element| js_error(element.into()))?;
    anchor.set_href(&url);
    anchor.set_download(&artifact.file_name);
    anchor.click();

    let revoke = Closure::once_into_js({
        let url = url.clone();
        move || {
            let _ = web_sys::Url::revoke_object_url(&url);
        }
    });
    let scheduled = window
        .set_timeout_with_callback_and_timeout_and_arguments_0(
            revoke.unchecked_ref(),
            REVOKE_DELAY_MS,
        )
        .is_ok();
    if !scheduled {
        web_sys::Url::revoke_object_url(&url).map_err(js_error)?;
    }
    Ok(())
}

/// Current UTC calendar date from the browser clock.
pub fn today_utc() -> Option<NaiveDate> {
    let now = js_sys::Date::new_0();
    NaiveDate::from_ymd_opt(
        now.get_utc_full_year() as i32,
        now.get_utc_month() + 1,
        now.get_utc_date(),
    )
}

/// Writes `message` to the browser console as an error.
pub fn console_error(message: &str) {
    web_sys::console::error_1(&JsValue::from_str(message));
}
