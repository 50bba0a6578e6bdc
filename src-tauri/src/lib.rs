use renewhire_portal::{config, server};
use std::sync::Arc;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tauri::Builder::default()
        .setup(|app| {
            if cfg!(debug_assertions) {
                app.handle().plugin(
                    tauri_plugin_log::Builder::default()
                        .level(log::LevelFilter::Info)
                        .build(),
                )?;
            }

            // Config is resolved before the window opens so errors surface at startup
            let mut config = config::AppConfig::load_from_args(["renewhire-desktop"])?;

            // The desktop app always keeps its session on disk so a restart
            // stays signed in while the token is valid
            config.session.storage = config::SessionBackend::File;
            config.server.host = "127.0.0.1".to_string();

            tauri::async_runtime::spawn(async move {
                log::info!(
                    "Starting embedded portal server on port {}",
                    config.server.port
                );

                if let Err(e) = server::start_server(Arc::new(config)).await {
                    log::error!("Portal server failed: {}", e);
                }
            });

            Ok(())
        })
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
