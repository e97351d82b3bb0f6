#![cfg(unix)]

use docqa_lib::core::config::RasterizerCommand;
use docqa_lib::core::errors::AppError;
use docqa_lib::sidecar::{PageRasterizer, SidecarRasterizer};

/// Runs `script` through `sh -c`; the PDF path and output directory arrive as
/// `$1` and `$2`.
fn shell(script: &str) -> SidecarRasterizer {
    SidecarRasterizer::new(RasterizerCommand {
        program: "sh".to_string(),
        args: vec!["-c".to_string(), script.to_string(), "rasterize".to_string()],
    })
}

#[tokio::test]
async fn successful_run_returns_page_images_in_order() {
    let dir = tempfile::tempdir().expect("tempdir");
    let pdf = dir.path().join("source.pdf");
    std::fs::write(&pdf, b"%PDF-1.4").expect("write pdf");
    let out = dir.path().join("pages");
    std::fs::create_dir_all(&out).expect("pages dir");

    let rasterizer = shell(
        r#"printf one > "$2/page-1.png"; printf two > "$2/page-2.png";
echo "rendering $1";
echo "{\"success\": true, \"pages\": 2, \"image_paths\": [\"$2/page-1.png\", \"$2/page-2.png\"]}""#,
    );
    let document = rasterizer.rasterize(&pdf, &out).await.expect("rasterized");

    assert_eq!(document.pages, 2);
    assert_eq!(document.image_paths, vec![out.join("page-1.png"), out.join("page-2.png")]);
    assert_eq!(std::fs::read(&document.image_paths[1]).expect("page 2"), b"two");
}

#[tokio::test]
async fn non_zero_exit_surfaces_reported_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let rasterizer = shell(
        r#"echo "{\"success\": false, \"error\": \"PDF file not found: $1\"}"; exit 1"#,
    );

    let err = rasterizer
        .rasterize(&dir.path().join("missing.pdf"), dir.path())
        .await
        .expect_err("exit 1");

    match err {
        AppError::Sidecar(message) => assert!(message.contains("PDF file not found"), "{message}"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn reported_failure_with_zero_exit_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let rasterizer = shell(r#"echo '{"success": false, "error": "encrypted pdf"}'"#);

    let err = rasterizer
        .rasterize(&dir.path().join("a.pdf"), dir.path())
        .await
        .expect_err("reported failure");
    assert!(err.to_string().contains("encrypted pdf"));
}

#[tokio::test]
async fn malformed_output_is_a_rasterizer_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let rasterizer = shell("echo 'ModuleNotFoundError: No module named fitz'");

    let err = rasterizer
        .rasterize(&dir.path().join("a.pdf"), dir.path())
        .await
        .expect_err("malformed output");
    assert_eq!(err.code(), "RASTERIZER_ERROR");
}

#[tokio::test]
async fn missing_program_is_a_rasterizer_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let rasterizer = SidecarRasterizer::new(RasterizerCommand {
        program: "docqa-no-such-rasterizer".to_string(),
        args: Vec::new(),
    });

    let err = rasterizer
        .rasterize(&dir.path().join("a.pdf"), dir.path())
        .await
        .expect_err("spawn failure");
    assert_eq!(err.code(), "RASTERIZER_ERROR");
}
