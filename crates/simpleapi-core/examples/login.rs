// Minimal simpleapi server: one documented endpoint plus middleware
//
//   RUST_LOG=info cargo run -p simpleapi-core --example login --features native
//   curl -X POST 'localhost:8000/acme/login?role=admin' -H 'Authorization: Bearer t'
//   open http://localhost:8000/docs

use simpleapi_core::{
    field, handler, typed, App, AppConfig, Bind, Binder, Cors, Handler, Location, Logger,
    ParamDescriptor, Result, ServerConfig, StatusCode,
};
use std::sync::Arc;

struct LoginPost {
    tenant_id: String,
    authorization: String,
    role: Option<String>,
}

impl Bind for LoginPost {
    fn descriptors() -> Vec<ParamDescriptor> {
        vec![
            field::<String>(Location::Path, "tenantId"),
            field::<String>(Location::Header, "Authorization"),
            field::<Option<String>>(Location::Query, "role"),
        ]
    }

    fn bind(binder: &Binder<'_>) -> Result<Self> {
        Ok(Self {
            tenant_id: binder.path("tenantId")?,
            authorization: binder.header("Authorization")?,
            role: binder.query("role")?,
        })
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut app = App::with_config(AppConfig::new().title("Login demo"));

    app.endpoint("/{tenantId}/login")
        .post()
        .tag("auth")
        .response(200, "Logged in")
        .response(401, "Missing credentials")
        .handler(Arc::new(Logger::new()))
        .handler(Arc::new(Cors::permissive()))
        .handler(typed(|ctx, req: LoginPost| {
            if req.authorization.is_empty() {
                return ctx.json(StatusCode::UNAUTHORIZED, &serde_json::json!({ "status": "denied" }));
            }
            ctx.json(
                StatusCode::OK,
                &serde_json::json!({
                    "status": "OK",
                    "tenant": req.tenant_id,
                    "role": req.role,
                }),
            )
        }))
        .register()?;

    let health: Arc<dyn Handler> = handler(|ctx| ctx.text(StatusCode::OK, "ok"));
    app.get("/health", vec![health])?;

    simpleapi_core::run(app.build(), ServerConfig::new().port(8000))
}
