use anyhow::Result;
use mockito::Matcher;
use test_utils::png_fixture;

use super::full_prompt;
use super::FalAi;
use crate::domain::models::ImageGenerationParams;
use crate::domain::models::ImageGenerator;

impl FalAi {
    fn with_url(url: String) -> FalAi {
        return FalAi { url };
    }
}

fn params() -> ImageGenerationParams {
    return ImageGenerationParams {
        provider: "fal-ai".to_string(),
        prompt: "a red fox".to_string(),
        ..ImageGenerationParams::default()
    };
}

#[test]
fn it_joins_positive_prompts() {
    let mut params = params();
    assert_eq!(full_prompt(&params), "a red fox");

    params.positive_prompt = Some("golden hour".to_string());
    assert_eq!(full_prompt(&params), "a red fox golden hour");
}

#[tokio::test]
async fn it_generates_with_the_default_model() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let image_url = format!("{}/files/fox.png", server.url());

    let generate_mock = server
        .mock("POST", "/fal-ai/flux-pro")
        .match_header("Authorization", "Key fal-test-key")
        .match_body(Matcher::Json(serde_json::json!({ "prompt": "a red fox" })))
        .with_status(200)
        .with_body(serde_json::json!({ "images": [{ "url": image_url }] }).to_string())
        .create_async()
        .await;
    let image_mock = server
        .mock("GET", "/files/fox.png")
        .with_status(200)
        .with_body(png_fixture())
        .create_async()
        .await;

    let generator = FalAi::with_url(server.url());
    let res = generator.generate("fal-test-key", &params()).await?;

    assert_eq!(res.image_url, image_url);
    assert_eq!(res.image_data, Some(png_fixture().to_vec()));
    generate_mock.assert_async().await;
    image_mock.assert_async().await;
    return Ok(());
}

#[tokio::test]
async fn it_sends_negative_prompts_and_reads_single_images() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let image_url = format!("{}/files/fox.png", server.url());

    let generate_mock = server
        .mock("POST", "/fal-ai/flux-schnell")
        .match_body(Matcher::Json(serde_json::json!({
            "prompt": "a red fox",
            "negative_prompt": "blurry",
        })))
        .with_status(200)
        .with_body(serde_json::json!({ "image": { "url": image_url } }).to_string())
        .create_async()
        .await;
    server
        .mock("GET", "/files/fox.png")
        .with_status(200)
        .with_body(png_fixture())
        .create_async()
        .await;

    let mut params = params();
    params.model = Some("fal-ai/flux-schnell".to_string());
    params.negative_prompt = Some("blurry".to_string());

    let generator = FalAi::with_url(server.url());
    let res = generator.generate("fal-test-key", &params).await?;

    assert_eq!(res.image_url, image_url);
    generate_mock.assert_async().await;
    return Ok(());
}

#[tokio::test]
async fn it_surfaces_detail_errors() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/fal-ai/flux-pro")
        .with_status(401)
        .with_body(r#"{"detail": "Invalid API key"}"#)
        .create_async()
        .await;

    let generator = FalAi::with_url(server.url());
    let res = generator.generate("fal-test-key", &params()).await;

    assert_eq!(res.unwrap_err().to_string(), "Invalid API key");
    mock.assert_async().await;
}

#[tokio::test]
async fn it_fails_without_an_image_url() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/fal-ai/flux-pro")
        .with_status(200)
        .with_body(r#"{"images": []}"#)
        .create_async()
        .await;

    let generator = FalAi::with_url(server.url());
    let res = generator.generate("fal-test-key", &params()).await;

    assert_eq!(
        res.unwrap_err().to_string(),
        "No image URL returned from Fal.ai"
    );
    mock.assert_async().await;
}
