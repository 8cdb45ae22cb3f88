use anyhow::Result;
use mockito::Matcher;
use test_utils::png_fixture;

use super::OpenAi;
use crate::domain::models::ImageGenerationParams;
use crate::domain::models::ImageGenerator;

impl OpenAi {
    fn with_url(url: String) -> OpenAi {
        return OpenAi { url };
    }
}

fn params() -> ImageGenerationParams {
    return ImageGenerationParams {
        provider: "openai".to_string(),
        prompt: "a red fox".to_string(),
        ..ImageGenerationParams::default()
    };
}

#[tokio::test]
async fn it_generates_and_downloads_the_image() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let image_url = format!("{}/images/fox.png", server.url());

    let generate_mock = server
        .mock("POST", "/v1/images/generations")
        .match_header("Authorization", "Bearer sk-test-key")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "model": "dall-e-3",
            "prompt": "a red fox",
            "n": 1,
            "size": "1024x1024",
            "quality": "standard",
            "response_format": "url",
        })))
        .with_status(200)
        .with_body(serde_json::json!({ "data": [{ "url": image_url }] }).to_string())
        .create_async()
        .await;
    let image_mock = server
        .mock("GET", "/images/fox.png")
        .with_status(200)
        .with_body(png_fixture())
        .create_async()
        .await;

    let generator = OpenAi::with_url(server.url());
    let res = generator.generate("sk-test-key", &params()).await?;

    assert_eq!(res.image_url, image_url);
    assert_eq!(res.image_data, Some(png_fixture().to_vec()));
    generate_mock.assert_async().await;
    image_mock.assert_async().await;
    return Ok(());
}

#[tokio::test]
async fn it_surfaces_the_provider_error_message() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/images/generations")
        .with_status(400)
        .with_body(r#"{"error": {"message": "Your request was rejected by the safety system."}}"#)
        .create_async()
        .await;

    let generator = OpenAi::with_url(server.url());
    let res = generator.generate("sk-test-key", &params()).await;

    assert_eq!(
        res.unwrap_err().to_string(),
        "Your request was rejected by the safety system."
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn it_falls_back_to_the_status_code() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/images/generations")
        .with_status(502)
        .with_body("<html>bad gateway</html>")
        .create_async()
        .await;

    let generator = OpenAi::with_url(server.url());
    let res = generator.generate("sk-test-key", &params()).await;

    assert_eq!(res.unwrap_err().to_string(), "OpenAI API error: 502");
    mock.assert_async().await;
}
