//! Tilt relay entry point
//!
//! Forwards device orientation frames between browser peers over WebSocket and
//! serves the built game from `STATIC_DIR`.

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let port = tilt_maze::relay::port_from_env();
    let static_dir = tilt_maze::relay::static_dir_from_env();
    tilt_maze::relay::serve(([0, 0, 0, 0], port).into(), static_dir).await;
}

#[cfg(target_arch = "wasm32")]
fn main() {}
