use serde::Serialize;

/// An image chosen by the user. Lives only for the current session.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// `data:` URL used by the view to show the image.
    pub preview_url: String,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ImagePreview {
    pub file_name: String,
    pub mime_type: String,
    pub size: usize,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub preview_url: String,
}

impl UploadedImage {
    pub fn preview(&self) -> ImagePreview {
        ImagePreview {
            file_name: self.file_name.clone(),
            mime_type: self.mime_type.clone(),
            size: self.bytes.len(),
            width: self.width,
            height: self.height,
            preview_url: self.preview_url.clone(),
        }
    }
}
