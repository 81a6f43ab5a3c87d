use utoipa::OpenApi;

use crate::routes::{chat, health, images, vision};

#[derive(OpenApi)]
#[openapi(info(
    title = "numid-server",
    description = "Chat, vision and SVG generation relayed to Google Gemini",
))]
pub struct ApiDoc;

pub fn get_docs() -> utoipa::openapi::OpenApi {
    let mut root = ApiDoc::openapi();
    root.merge(health::HealthApi::openapi());
    root.merge(chat::ChatApi::openapi());
    root.merge(vision::VisionApi::openapi());
    root.merge(images::ImagesApi::openapi());
    root
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = get_docs();
        for path in ["/health", "/api/chat", "/api/chat/stream", "/api/vision/describe", "/api/images/svg"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
