//! Server-rendered pages.

use axum::response::Html;

const ERROR_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8"/>
    <title>Error</title>
    <style>
        body { font-family: system-ui, sans-serif; margin: 4rem auto; max-width: 40rem; color: #333; }
        h1 { color: #b00020; }
    </style>
</head>
<body>
    <h1>Error</h1>
    <p>An error occurred while processing your request.</p>
    <p>Swapping to the development environment displays detailed information
    about the failure instead of this page.</p>
</body>
</html>
"#;

/// Page shown after the exception stage redirects a failed request.
pub(crate) async fn error_page() -> Html<&'static str> {
    Html(ERROR_PAGE)
}
