use std::path::Path;

use crate::api::errors::ApiError;

pub(crate) const MIN_PASSWORD_LEN: usize = 6;

pub(crate) fn validate_password_len(password: &str) -> Result<(), ApiError> {
    if password.chars().count() >= MIN_PASSWORD_LEN {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        )))
    }
}

/// Checks an uploaded exam file by name and declared MIME type. The bytes
/// themselves are never examined.
pub(crate) fn validate_material_upload(
    filename: &str,
    content_type: Option<&str>,
    allowed_extensions: &[String],
) -> Result<(), ApiError> {
    let extension = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .ok_or_else(|| {
            ApiError::BadRequest(format!("File '{filename}' must have an extension"))
        })?;

    if !allowed_extensions.iter().any(|allowed| allowed == &extension) {
        return Err(ApiError::BadRequest(format!("File extension '{extension}' is not allowed")));
    }

    // Browsers sometimes send a generic type for documents.
    let Some(mime) = content_type.map(|value| value.trim().to_ascii_lowercase()) else {
        return Ok(());
    };
    if mime.is_empty() || mime == "application/octet-stream" {
        return Ok(());
    }

    if mime_allowed_for_extension(&mime, &extension) {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!(
            "MIME type '{mime}' does not match extension '.{extension}'"
        )))
    }
}

fn mime_allowed_for_extension(mime: &str, extension: &str) -> bool {
    match extension {
        "pdf" => mime == "application/pdf",
        "doc" => mime == "application/msword",
        "docx" => {
            mime == "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        "jpg" | "jpeg" => matches!(mime, "image/jpeg" | "image/jpg"),
        "png" => mime == "image/png",
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allowed() -> Vec<String> {
        ["pdf", "doc", "docx", "jpg", "jpeg", "png"].iter().map(|ext| ext.to_string()).collect()
    }

    #[test]
    fn accepts_known_documents() {
        assert!(validate_material_upload("sheet.PDF", Some("application/pdf"), &allowed()).is_ok());
        assert!(validate_material_upload("scan.jpeg", Some("image/jpeg"), &allowed()).is_ok());
        assert!(validate_material_upload("notes.docx", None, &allowed()).is_ok());
        assert!(validate_material_upload(
            "notes.doc",
            Some("application/octet-stream"),
            &allowed()
        )
        .is_ok());
    }

    #[test]
    fn rejects_unknown_extension_and_mismatched_mime() {
        assert!(matches!(
            validate_material_upload("run.exe", None, &allowed()),
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(
            validate_material_upload("README", None, &allowed()),
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(
            validate_material_upload("scan.png", Some("image/jpeg"), &allowed()),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn password_length() {
        assert!(validate_password_len("secret").is_ok());
        assert!(validate_password_len("short").is_err());
    }
}
