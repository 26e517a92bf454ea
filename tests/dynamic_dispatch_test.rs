use btcqr::application::builder::QrBuilder;
use btcqr::domain::ports::{QrRenderer, QrRendererBox};
use btcqr::domain::render::{ImageFormat, RenderOptions};
use btcqr::infrastructure::qr_renderer::QrCodeRenderer;
use std::sync::Arc;

#[tokio::test]
async fn test_renderer_as_trait_object() {
    let renderer: QrRendererBox = Box::new(QrCodeRenderer::new());
    let options = RenderOptions {
        format: ImageFormat::Terminal,
        ..Default::default()
    };

    // Verify Send + Sync by spawning a task
    let handle = tokio::spawn(async move {
        renderer
            .render("bitcoin:addr?amount=1", &options)
            .await
            .unwrap()
    });

    let image = handle.await.unwrap();
    assert_eq!(image.payload, "bitcoin:addr?amount=1");
    assert_eq!(image.format, ImageFormat::Terminal);
}

#[tokio::test]
async fn test_builder_shared_across_tasks() {
    let builder = Arc::new(QrBuilder::new(Box::new(QrCodeRenderer::new())));

    let handles: Vec<_> = (1..=4)
        .map(|i| {
            let builder = Arc::clone(&builder);
            tokio::spawn(async move { builder.build("addr", f64::from(i), None).await })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let image = handle.await.unwrap().unwrap();
        assert_eq!(image.payload, format!("bitcoin:addr?amount={}", i + 1));
    }
}
