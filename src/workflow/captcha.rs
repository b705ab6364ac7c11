use std::future::Future;
use std::path::{Path, PathBuf};

use crate::Result;
use crate::error::CurlwrapError;
use inquire::Text;
use tracing::{info, warn};

/// Turns a captcha image into the code a human read off it.
pub trait CaptchaSolver {
    fn solve(&self, image_url: &str) -> impl Future<Output = Result<String>> + Send;
}

/// Saves the image locally and asks on the terminal.
///
/// Blocks until the user answers; there is no timeout.
pub struct PromptSolver {
    image_dir: PathBuf,
}

impl Default for PromptSolver {
    fn default() -> Self {
        Self::new(std::env::temp_dir())
    }
}

impl PromptSolver {
    const IMAGE_FILE: &'static str = "curlwrap-captcha.jpg";

    pub fn new(image_dir: impl Into<PathBuf>) -> Self {
        Self {
            image_dir: image_dir.into(),
        }
    }

    /// Prompt text pointing at the saved copy, or at the URL when saving failed.
    pub fn prompt_message(image_url: &str, saved: Option<&Path>) -> String {
        match saved {
            Some(path) => format!(
                "Enter the code from the image at {} ({})",
                path.display(),
                image_url
            ),
            None => format!("Enter the code from this image: {}", image_url),
        }
    }

    /// The image host does not filter clients, so a plain HTTP fetch works.
    async fn save_image(&self, image_url: &str) -> Result<PathBuf> {
        let bytes = reqwest::get(image_url)
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        let path = self.image_dir.join(Self::IMAGE_FILE);
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(CurlwrapError::IoError)?;
        Ok(path)
    }
}

impl CaptchaSolver for PromptSolver {
    async fn solve(&self, image_url: &str) -> Result<String> {
        let saved = match self.save_image(image_url).await {
            Ok(path) => {
                info!("Captcha image saved to {}", path.display());
                Some(path)
            }
            Err(e) => {
                warn!("Could not save captcha image: {}", e);
                None
            }
        };

        let message = Self::prompt_message(image_url, saved.as_deref());
        let code = tokio::task::spawn_blocking(move || Text::new(&message).prompt())
            .await
            .map_err(|e| CurlwrapError::CaptchaInput(e.to_string()))??;

        let code = code.trim().to_string();
        info!("Code entered: {}", code);
        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_names_saved_image() {
        let path = PathBuf::from("/tmp/curlwrap-captcha.jpg");
        let message =
            PromptSolver::prompt_message("https://dropapk.to/captchas/a.jpg", Some(&path));
        assert!(message.contains("/tmp/curlwrap-captcha.jpg"));
        assert!(message.contains("https://dropapk.to/captchas/a.jpg"));
    }

    #[test]
    fn test_prompt_falls_back_to_url() {
        let message = PromptSolver::prompt_message("https://dropapk.to/captchas/a.jpg", None);
        assert_eq!(
            message,
            "Enter the code from this image: https://dropapk.to/captchas/a.jpg"
        );
    }
}
