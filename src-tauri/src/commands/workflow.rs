use crate::error::AppError;
use crate::models::workflow_types::WorkflowSnapshot;
use crate::services::image_service;
use crate::services::workflow::Orchestrator;
use std::path::Path;
use tauri::State;

#[tauri::command]
pub async fn get_workflow_state(orchestrator: State<'_, Orchestrator>) -> Result<WorkflowSnapshot, AppError> {
    Ok(orchestrator.snapshot().await)
}

#[tauri::command]
pub async fn select_image(orchestrator: State<'_, Orchestrator>, path: String) -> Result<WorkflowSnapshot, AppError> {
    let image = image_service::load_image_file(Path::new(&path)).await?;
    Ok(orchestrator.select_image(image).await?)
}

/// Same as `select_image` for images the view already holds in memory (drag and drop).
#[tauri::command]
pub async fn select_image_bytes(
    orchestrator: State<'_, Orchestrator>,
    file_name: String,
    bytes: Vec<u8>,
    mime_type: Option<String>,
) -> Result<WorkflowSnapshot, AppError> {
    let image = image_service::load_image_bytes(file_name, bytes, mime_type)?;
    Ok(orchestrator.select_image(image).await?)
}

#[tauri::command]
pub async fn detect_image(orchestrator: State<'_, Orchestrator>) -> Result<WorkflowSnapshot, AppError> {
    Ok(orchestrator.detect().await?)
}

#[tauri::command]
pub async fn classify_detection(orchestrator: State<'_, Orchestrator>) -> Result<WorkflowSnapshot, AppError> {
    Ok(orchestrator.classify().await?)
}

#[tauri::command]
pub async fn open_recycling_guide(orchestrator: State<'_, Orchestrator>) -> Result<WorkflowSnapshot, AppError> {
    Ok(orchestrator.open_guide().await?)
}

#[tauri::command]
pub async fn close_recycling_guide(orchestrator: State<'_, Orchestrator>) -> Result<WorkflowSnapshot, AppError> {
    Ok(orchestrator.close_guide().await?)
}
