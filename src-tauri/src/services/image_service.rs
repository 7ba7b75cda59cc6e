use crate::error::AppError;
use crate::models::image_types::UploadedImage;
use base64::Engine;
use image::ImageReader;
use std::io::Cursor;
use std::path::Path;

pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

const IMAGE_TYPES: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("bmp", "image/bmp"),
    ("webp", "image/webp"),
    ("tiff", "image/tiff"),
    ("tif", "image/tiff"),
    ("ico", "image/x-icon"),
    ("svg", "image/svg+xml"),
];

pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    IMAGE_TYPES
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, mime)| *mime)
}

pub async fn load_image_file(path: &Path) -> Result<UploadedImage, AppError> {
    let mime_type = mime_for_path(path).ok_or_else(|| AppError {
        message: format!("Not an image file: {}", path.display()),
    })?;

    let metadata = tokio::fs::metadata(path).await.map_err(|e| AppError {
        message: format!("Failed to read {}: {}", path.display(), e),
    })?;
    if metadata.len() > MAX_IMAGE_BYTES as u64 {
        return Err(too_large(metadata.len() as usize));
    }

    let bytes = tokio::fs::read(path).await.map_err(|e| AppError {
        message: format!("Failed to read {}: {}", path.display(), e),
    })?;

    let file_name = path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();

    build_image(file_name, bytes, Some(mime_type.to_string()))
}

/// For bytes handed over directly by the view (drag and drop, clipboard).
pub fn load_image_bytes(
    file_name: String,
    bytes: Vec<u8>,
    mime_type: Option<String>,
) -> Result<UploadedImage, AppError> {
    let declared = mime_type
        .map(|m| m.trim().to_lowercase())
        .filter(|m| !m.is_empty())
        .or_else(|| mime_for_path(Path::new(&file_name)).map(str::to_string));
    build_image(file_name, bytes, declared)
}

fn build_image(
    file_name: String,
    bytes: Vec<u8>,
    declared_mime: Option<String>,
) -> Result<UploadedImage, AppError> {
    if bytes.is_empty() {
        return Err("Image file is empty".into());
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(too_large(bytes.len()));
    }

    let sniffed = image::guess_format(&bytes).ok();
    let mime_type = match (declared_mime, sniffed) {
        (Some(declared), _) if !declared.starts_with("image/") => {
            return Err(format!("Invalid file type: {} is not an image", declared).into());
        }
        // Trust the content over a wrong extension
        (_, Some(format)) => format.to_mime_type().to_string(),
        (Some(declared), None) => declared,
        (None, None) => return Err("Invalid file type: could not recognise image data".into()),
    };

    let (width, height) = match ImageReader::new(Cursor::new(&bytes))
        .with_guessed_format()
        .ok()
        .and_then(|reader| reader.into_dimensions().ok())
    {
        Some((w, h)) => (Some(w), Some(h)),
        None => (None, None),
    };

    let b64 = base64::engine::general_purpose::STANDARD.encode(&bytes);
    let preview_url = format!("data:{};base64,{}", mime_type, b64);

    Ok(UploadedImage {
        file_name,
        bytes,
        mime_type,
        width,
        height,
        preview_url,
    })
}

fn too_large(size: usize) -> AppError {
    AppError {
        message: format!(
            "Image is {:.1} MB; the limit is {} MB",
            size as f64 / (1024.0 * 1024.0),
            MAX_IMAGE_BYTES / (1024 * 1024)
        ),
    }
}
