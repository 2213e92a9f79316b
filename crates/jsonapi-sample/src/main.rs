use http::header::CONTENT_TYPE;
use http::Method;
use jsonapi_handler::tracing::setup_tracing;
use jsonapi_handler::{ApiRequest, PathParams, JSONAPI_MEDIA_TYPE};
use jsonapi_sample::lifecycle::ApiSystem;
use jsonapi_sample::model::{BOOKS, CHAPTERS};
use serde_json::json;
use tracing::{error, info, Instrument};

fn write(method: Method, params: PathParams, data: serde_json::Value) -> ApiRequest {
    ApiRequest::new(method, params)
        .with_header(CONTENT_TYPE, JSONAPI_MEDIA_TYPE)
        .with_body(json!({ "data": data }))
}

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    info!("Starting JSON:API sample");
    let system = ApiSystem::new().map_err(|e| e.to_string())?;

    let span = tracing::info_span!("seeding");
    async {
        let book = write(
            Method::POST,
            PathParams::collection(),
            json!({ "type": BOOKS, "attributes": { "title": "Dune", "date_published": "1965" } }),
        );
        let created = system.handle(BOOKS, &book).await.map_err(|e| e.to_string())?;
        info!(status = %created.status, "Book created");

        for (ordering, title) in ["Arrakis", "Foo", "Muad'Dib"].iter().enumerate() {
            let chapter = write(
                Method::POST,
                PathParams::collection(),
                json!({
                    "type": CHAPTERS,
                    "attributes": { "title": title, "ordering": ordering + 1 },
                    "links": { "book": { "type": BOOKS, "id": "1" } }
                }),
            );
            system.handle(CHAPTERS, &chapter).await.map_err(|e| e.to_string())?;
        }
        Ok::<_, String>(())
    }
    .instrument(span)
    .await?;

    let filtered =
        ApiRequest::new(Method::GET, PathParams::collection()).with_query("filter", "title:Foo");
    let found = system.handle(CHAPTERS, &filtered).await.map_err(|e| e.to_string())?;
    info!(data = %json!(found.data), "Chapters titled Foo");

    let related = ApiRequest::new(Method::GET, PathParams::related("1", "chapters"));
    let chapters = system.handle(BOOKS, &related).await.map_err(|e| e.to_string())?;
    info!(data = %json!(chapters.data), "Chapters of book 1");

    // Clearing a required attribute is rejected by the store and answered with 409.
    let clear = write(
        Method::PATCH,
        PathParams::single("2"),
        json!({ "type": CHAPTERS, "id": "2", "attributes": { "title": null } }),
    );
    match system.handle(CHAPTERS, &clear).await {
        Ok(response) => info!(status = %response.status, "Update unexpectedly succeeded"),
        Err(e) => error!(status = %e.status(), error = %e, "Update rejected"),
    }

    let delete = ApiRequest::new(Method::DELETE, PathParams::single("3"));
    let deleted = system.handle(CHAPTERS, &delete).await.map_err(|e| e.to_string())?;
    info!(status = %deleted.status, "Chapter deleted");

    system.shutdown().await?;

    info!("Sample completed successfully");
    Ok(())
}
