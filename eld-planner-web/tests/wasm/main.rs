#![cfg(target_arch = "wasm32")]

use eld_planner_core::Timer;
use eld_planner_web::dom;
use eld_planner_web::transport::BrowserTimer;
use std::time::Duration;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test::wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn js_errors_become_readable_messages() {
    assert_eq!(dom::js_error_message(&JsValue::from_str("boom")), "boom");
    let err: JsValue = js_sys::Error::new("bad key").into();
    assert_eq!(dom::js_error_message(&err), "bad key");
}

#[wasm_bindgen_test]
fn today_reads_the_browser_clock() {
    let today = dom::today().expect("browser date");
    assert!(today.format("%Y").to_string().parse::<i32>().unwrap() >= 2024);
}

#[wasm_bindgen_test]
async fn browser_timer_waits() {
    let before = js_sys::Date::now();
    BrowserTimer.sleep(Duration::from_millis(20)).await;
    assert!(js_sys::Date::now() - before >= 15.0);
}

#[wasm_bindgen_test]
fn save_file_leaves_no_anchor_behind() {
    dom::save_file(b"%PDF-1.4", "ELD_Logs_t1_2024-03-04.pdf", "application/pdf")
        .expect("download link");
    let doc = dom::document().expect("document");
    assert!(doc.query_selector("a[download]").expect("query").is_none());
}

#[wasm_bindgen_test]
async fn abandoned_timer_does_not_hold_up_the_winner() {
    let before = js_sys::Date::now();
    let long = Box::pin(BrowserTimer.sleep(Duration::from_secs(10)));
    let short = Box::pin(BrowserTimer.sleep(Duration::from_millis(20)));
    let winner = futures::future::select(long, short).await;
    assert!(matches!(winner, futures::future::Either::Right(_)));
    drop(winner);
    assert!(js_sys::Date::now() - before < 1_000.0);
}
