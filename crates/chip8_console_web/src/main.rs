// Trunk entrypoint. Does nothing unless built with `web` for wasm32.

fn main() {}

#[cfg(all(feature = "web", target_arch = "wasm32"))]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn wasm_start() {
    chip8_console_web::start();
}
