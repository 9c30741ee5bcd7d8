// Copyright 2026 the Vantage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! One-shot `setTimeout` timers.

use alloc::boxed::Box;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = "setTimeout")]
    fn set_timeout(handler: &JsValue, timeout_ms: i32) -> i32;

    #[wasm_bindgen(js_name = "clearTimeout")]
    fn clear_timeout(id: i32);
}

/// A pending `setTimeout` call.
///
/// Dropping the timer clears it if it has not fired yet. The callback must
/// not drop the `Timeout` that is running it; replace it on the next arm
/// instead.
pub(crate) struct Timeout {
    id: i32,
    _closure: Closure<dyn FnMut()>,
}

impl Timeout {
    /// Calls `callback` once after `delay_ms` milliseconds.
    pub(crate) fn new(delay_ms: u32, callback: impl FnOnce() + 'static) -> Self {
        let mut callback = Some(callback);
        let closure = Closure::wrap(Box::new(move || {
            if let Some(callback) = callback.take() {
                callback();
            }
        }) as Box<dyn FnMut()>);
        let id = set_timeout(closure.as_ref().unchecked_ref(), clamp_delay(delay_ms));
        Self {
            id,
            _closure: closure,
        }
    }
}

/// Browsers take the delay as a signed 32-bit count of milliseconds.
fn clamp_delay(delay_ms: u32) -> i32 {
    i32::try_from(delay_ms).unwrap_or(i32::MAX)
}

impl Drop for Timeout {
    fn drop(&mut self) {
        // Clearing a timer that already fired is a no-op.
        clear_timeout(self.id);
    }
}

impl core::fmt::Debug for Timeout {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Timeout")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}
