use crate::error::AppError;
use crate::models::video_types;
use crate::services::guide_service::RECYCLING_CENTERS_URL;
use log::info;
use tauri::AppHandle;
use tauri_plugin_opener::OpenerExt;

#[tauri::command]
pub fn open_video(app: AppHandle, video_id: String) -> Result<(), AppError> {
    if !is_video_id(&video_id) {
        return Err(format!("Invalid video id: {:?}", video_id).into());
    }
    let url = video_types::watch_url(&video_id);
    info!("Opening {}", url);
    app.opener().open_url(url, None::<&str>)?;
    Ok(())
}

#[tauri::command]
pub fn open_recycling_centers(app: AppHandle) -> Result<(), AppError> {
    app.opener().open_url(RECYCLING_CENTERS_URL, None::<&str>)?;
    Ok(())
}

/// YouTube ids are short and URL-safe; anything else is not forwarded to the browser.
fn is_video_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 64
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
