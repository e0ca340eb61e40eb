use bytes::Bytes;
use http::{Method, Response, StatusCode};
use signpost::{Middleware, Next, RequestContext, Router};

// A middleware which logs every dispatch with its outcome.
struct Logger;

impl Middleware for Logger {
    fn handle(&self, route_id: &str, cx: &RequestContext, next: Next<'_>) -> Response<Bytes> {
        let started = std::time::Instant::now();
        let res = next.run(cx);
        log::info!(
            "{} {} -> {} via {:?} in {:?}",
            cx.method(),
            cx.original_uri(),
            res.status(),
            route_id,
            started.elapsed()
        );
        res
    }
}

fn text(body: String) -> Response<Bytes> {
    Response::new(Bytes::from(body))
}

// A handler for the "/" page.
fn home(_: &RequestContext) -> Response<Bytes> {
    text("Home page".into())
}

// A handler for the "/users/{id:int}" page.
fn show_user(cx: &RequestContext) -> Response<Bytes> {
    let id = cx.param("id").and_then(|v| v.as_int()).unwrap_or(0);
    text(format!("Hello user {}", id))
}

// A handler for the "/admin" page, guarded by the "auth" check below.
fn admin(_: &RequestContext) -> Response<Bytes> {
    text("Admin console".into())
}

fn router() -> signpost::Result<Router> {
    Router::builder()
        .middleware(Logger)
        // Only safe methods may reach routes guarded by "auth".
        .named_middleware("auth", |_path: &str, method: &Method| {
            *method == Method::GET || *method == Method::HEAD
        })
        .route("/", home)
        .route_with("/admin", admin, &["auth"])
        .param_route("/users/{id:int}", show_user)
        .constraint("id", "[0-9]+")
        .name("user.show")
        .not_found(|cx: &RequestContext| {
            let mut res = text(format!("No such page: {}", cx.path()));
            *res.status_mut() = StatusCode::NOT_FOUND;
            res
        })
        .build()
}

fn main() -> signpost::Result<()> {
    env_logger::init();

    let router = router()?;

    for (method, path) in [
        (Method::GET, "/"),
        (Method::GET, "/users/42"),
        (Method::GET, "/users/forty-two"),
        (Method::GET, "/admin"),
        (Method::POST, "/admin"),
        (Method::GET, "/missing"),
    ] {
        let label = format!("{} {}", method, path);
        let res = router.dispatch(path, method, None);
        let body = String::from_utf8_lossy(res.body()).into_owned();
        println!("{:<22} {} {:?}", label, res.status(), body);
    }

    println!("user.show resolves to {}", router.url_for("user.show", &[("id", "7")])?);

    Ok(())
}
