use std::collections::HashMap;

use actix_multipart::Multipart;
use futures_util::TryStreamExt;

use crate::{
    error::{ApiError, ApiResult},
    images::ImageSource,
    utils::non_blank,
};

/// A fully buffered multipart form.
#[derive(Debug, Default)]
pub struct FormData {
    texts: HashMap<String, String>,
    files: HashMap<String, ImageSource>,
}

impl FormData {
    /// Buffers every field, rejecting forms whose fields add up to more than `max_bytes`.
    pub async fn read(mut payload: Multipart, max_bytes: usize) -> ApiResult<Self> {
        let mut form = FormData::default();
        let mut total = 0usize;

        while let Some(mut field) = payload
            .try_next()
            .await
            .map_err(|e| ApiError::bad_request(format!("Malformed form data: {}", e)))?
        {
            let disposition = field.content_disposition().cloned();
            let name = match disposition.as_ref().and_then(|d| d.get_name()) {
                Some(name) => name.to_string(),
                None => continue,
            };
            let file_name = disposition
                .as_ref()
                .and_then(|d| d.get_filename())
                .map(str::to_string);
            let content_type = field.content_type().map(|mime| mime.to_string());

            let mut data = Vec::new();
            while let Some(chunk) = field
                .try_next()
                .await
                .map_err(|e| ApiError::bad_request(format!("Malformed form data: {}", e)))?
            {
                total += chunk.len();
                if total > max_bytes {
                    return Err(ApiError::bad_request(format!(
                        "Form data exceeds the upload limit of {} bytes",
                        max_bytes
                    )));
                }
                data.extend_from_slice(&chunk);
            }

            match file_name {
                Some(file_name) => {
                    if data.is_empty() {
                        continue;
                    }
                    let content_type =
                        content_type.unwrap_or_else(|| "application/octet-stream".to_string());
                    form.files.insert(
                        name,
                        ImageSource::Bytes {
                            data,
                            file_name,
                            content_type,
                        },
                    );
                }
                None => {
                    let text = String::from_utf8(data).map_err(|_| {
                        ApiError::bad_request(format!("Form field {} is not valid UTF-8", name))
                    })?;
                    form.texts.insert(name, text);
                }
            }
        }

        Ok(form)
    }

    /// Trimmed text value, `None` if missing or blank.
    pub fn text(&self, name: &str) -> Option<String> {
        non_blank(self.texts.get(name).cloned())
    }

    pub fn take_file(&mut self, name: &str) -> Option<ImageSource> {
        self.files.remove(name)
    }

    #[cfg(test)]
    pub fn from_parts(texts: &[(&str, &str)], files: Vec<(&str, ImageSource)>) -> Self {
        Self {
            texts: texts
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            files: files
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        }
    }
}
