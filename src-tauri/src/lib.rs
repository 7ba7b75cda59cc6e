mod commands;
mod error;
mod models;
mod services;

use log::{info, warn};
use models::workflow_types::WorkflowSnapshot;
use services::config::ApiConfig;
use services::gateway::image_labeling::HfImageLabeler;
use services::gateway::video_search::YouTubeVideoSearch;
use services::gateway::zero_shot::HfZeroShotClassifier;
use services::workflow::Orchestrator;
use std::sync::Arc;
use tauri::{Emitter, Manager};

const WORKFLOW_CHANGED_EVENT: &str = "workflow-changed";

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tauri::Builder::default()
        .plugin(
            tauri_plugin_log::Builder::new()
                .level(log::LevelFilter::Info)
                .build(),
        )
        .plugin(tauri_plugin_opener::init())
        .plugin(tauri_plugin_dialog::init())
        .plugin(tauri_plugin_window_state::Builder::default().build())
        .setup(|app| {
            let config = ApiConfig::from_env();
            info!("Loaded API configuration: {:?}", config);
            for key in config.missing_keys() {
                warn!("{} is not set; requests will fail upstream authentication", key);
            }

            let labeler = HfImageLabeler::from_config(&config)?;
            let classifier = HfZeroShotClassifier::from_config(&config)?;
            let video_search = YouTubeVideoSearch::from_config(&config)?;

            let app_handle = app.handle().clone();
            let orchestrator = Orchestrator::new(
                Arc::new(labeler),
                Arc::new(classifier),
                Arc::new(video_search),
            )
            .with_listener(Arc::new(move |snapshot: &WorkflowSnapshot| {
                if let Err(e) = app_handle.emit(WORKFLOW_CHANGED_EVENT, snapshot) {
                    warn!("Failed to emit workflow update: {}", e);
                }
            }));
            app.manage(orchestrator);

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::workflow::get_workflow_state,
            commands::workflow::select_image,
            commands::workflow::select_image_bytes,
            commands::workflow::detect_image,
            commands::workflow::classify_detection,
            commands::workflow::open_recycling_guide,
            commands::workflow::close_recycling_guide,
            commands::links::open_video,
            commands::links::open_recycling_centers,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
