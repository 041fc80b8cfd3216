//! OpenAPI documentation configuration.
//!
//! All endpoints are annotated with `utoipa` and collected into [`ApiDoc`];
//! the rendered documentation is served at `/docs`.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

/// Bearer API key security scheme shared by all endpoints.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.security_schemes.insert(
                "bearer_key".to_string(),
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("API Key")
                        .description(Some(
                            "API key authentication. Include your key in the `Authorization` header:\n\n\
                            ```\nAuthorization: Bearer YOUR_API_KEY\n```",
                        ))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "brainctl API",
        description = "Control service for per-workspace knowledge stores ('brains'): \
                       brain management and quota-gated file ingestion."
    ),
    paths(
        crate::api::handlers::upload::upload_file,
        crate::api::handlers::brains::create_brain,
        crate::api::handlers::brains::list_brains,
        crate::api::handlers::brains::get_brain,
        crate::api::handlers::files::list_brain_files,
    ),
    components(schemas(
        crate::api::models::messages::IngestMessage,
        crate::api::models::messages::MessageType,
        crate::api::models::brains::BrainCreate,
        crate::api::models::brains::BrainResponse,
        crate::api::models::brains::BrainUsageResponse,
        crate::api::models::files::BrainFileResponse,
        crate::db::models::files::FileStatus,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "upload", description = "Quota-gated file upload"),
        (name = "brains", description = "Brain management"),
        (name = "files", description = "Brain file records"),
    )
)]
pub struct ApiDoc;
