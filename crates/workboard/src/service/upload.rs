//! Manuscript image uploads.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::BoardError;
use crate::gateway::RecordGateway;
use crate::model::ImageUpload;

static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Object name for an upload: `{unix_millis}_{filename}` with whitespace
/// runs replaced by a single underscore.
pub fn object_name(unix_millis: i64, filename: &str) -> String {
    format!("{}_{}", unix_millis, RE_WHITESPACE.replace_all(filename, "_"))
}

/// Uploads the image and returns its public URL.
pub async fn upload_image(
    gateway: &dyn RecordGateway,
    image: &ImageUpload,
    unix_millis: i64,
) -> Result<String, BoardError> {
    image.ensure_image()?;
    let name = object_name(unix_millis, &image.filename);
    gateway
        .upload_object(&name, image.bytes.clone(), &image.content_type)
        .await?;
    log::info!("Uploaded image {} ({} bytes)", name, image.bytes.len());
    Ok(gateway.public_url(&name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::SqliteGateway;

    #[test]
    fn test_object_name() {
        assert_eq!(
            object_name(1_700_000_000_000, "My Scan.png"),
            "1700000000000_My_Scan.png"
        );
        assert_eq!(
            object_name(1, "a \t\n b  c.jpg"),
            "1_a_b_c.jpg"
        );
        assert_eq!(object_name(2, "현수막 시안.png"), "2_현수막_시안.png");
    }

    #[tokio::test]
    async fn test_upload_rejects_non_image() {
        let gateway = SqliteGateway::open_in_memory().unwrap();
        let upload = ImageUpload::from_file_name("notes.txt", b"hello".to_vec());
        let err = upload_image(&gateway, &upload, 1).await.unwrap_err();
        assert!(matches!(err, BoardError::Validation(_)));
        assert!(gateway.object("1_notes.txt").unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upload_returns_public_url() {
        let gateway = SqliteGateway::open_in_memory().unwrap();
        let upload = ImageUpload::from_file_name("My Scan.png", vec![0x89, 0x50]);
        let url = upload_image(&gateway, &upload, 1_700_000_000_000).await.unwrap();
        assert_eq!(url, "local://objects/request-images/1700000000000_My_Scan.png");
        let stored = gateway.object("1700000000000_My_Scan.png").unwrap().unwrap();
        assert_eq!(stored.content_type, "image/png");
    }
}
