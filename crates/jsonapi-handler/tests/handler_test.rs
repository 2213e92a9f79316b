use http::header::{ACCEPT, CONTENT_TYPE};
use http::{Method, StatusCode};
use jsonapi_handler::mock::{Call, MockAdapter};
use jsonapi_handler::{
    validators, AdapterError, ApiRequest, HandlerError, Mode, PathParams, PrimaryData,
    RequestHandler, ResourceConfig, JSONAPI_MEDIA_TYPE,
};
use serde_json::{json, Value};

// --- Test Model ---

#[derive(Clone, Debug, PartialEq)]
struct Chapter {
    id: String,
    title: Option<String>,
}

impl Chapter {
    fn new(id: &str, title: &str) -> Self {
        Self {
            id: id.to_string(),
            title: Some(title.to_string()),
        }
    }
}

fn setup(method: Method) -> (RequestHandler<MockAdapter<Chapter>>, MockAdapter<Chapter>) {
    let mock = MockAdapter::new("chapters");
    let config = ResourceConfig::new("chapters")
        .with_attributes(["title", "ordering"])
        .with_method(method);
    (RequestHandler::new(config, mock.clone()), mock)
}

fn json_body(request: ApiRequest, body: Value) -> ApiRequest {
    request
        .with_header(CONTENT_TYPE, JSONAPI_MEDIA_TYPE)
        .with_body(body)
}

// --- read ---

#[tokio::test]
async fn test_read_collection_with_flat_filter() {
    let (handler, mock) = setup(Method::GET);
    mock.expect_read()
        .return_ok(PrimaryData::Collection(vec![Chapter::new("1", "Foo")]));

    let request = ApiRequest::new(Method::GET, PathParams::collection())
        .with_query("filter", "title:Foo");
    let data = handler.read(&request).await.unwrap();
    assert_eq!(data.len(), 1);

    match &mock.calls()[0] {
        Call::Read { query, mode } => {
            assert_eq!(*mode, Mode::Collection);
            assert_eq!(query.filter["title"], vec!["Foo"]);
            assert!(!query.filter.contains_key("id"));
        }
        other => panic!("unexpected call {:?}", other),
    }
    mock.verify();
}

#[tokio::test]
async fn test_read_single_pins_path_id_over_query_filter() {
    let (handler, mock) = setup(Method::GET);
    mock.expect_read()
        .return_ok(PrimaryData::Resource(Chapter::new("5", "Five")));

    let request = ApiRequest::new(Method::GET, PathParams::single("5"))
        .with_query("filter[id]", "9");
    handler.read(&request).await.unwrap();

    match &mock.calls()[0] {
        Call::Read { query, mode } => {
            assert_eq!(*mode, Mode::Single);
            assert_eq!(query.filter["id"], vec!["5"]);
        }
        other => panic!("unexpected call {:?}", other),
    }
}

#[tokio::test]
async fn test_read_empty_collection_is_not_an_error() {
    let (handler, mock) = setup(Method::GET);
    mock.expect_read().return_ok(PrimaryData::Collection(vec![]));

    let request = ApiRequest::new(Method::GET, PathParams::collection())
        .with_query("filter[title]", "Nope");
    let data = handler.read(&request).await.unwrap();
    assert!(data.is_empty());
}

#[tokio::test]
async fn test_read_related_loads_base_then_relation() {
    let (handler, mock) = setup(Method::GET);
    let base = Chapter::new("3", "Three");
    mock.expect_by_id("3").return_ok(Some(base));
    mock.expect_related()
        .return_ok(PrimaryData::Resource(Chapter::new("b1", "A Book")));

    let request = ApiRequest::new(Method::GET, PathParams::related("3", "book"))
        .with_query("include", "author");
    let data = handler.read(&request).await.unwrap();
    assert_eq!(data, PrimaryData::Resource(Chapter::new("b1", "A Book")));

    let calls = mock.calls();
    assert_eq!(
        calls[0],
        Call::ById {
            id: "3".into(),
            relation: Some("book".into())
        }
    );
    match &calls[1] {
        Call::Related { query, relation } => {
            assert_eq!(relation, "book");
            assert_eq!(query.include, Some(vec!["author".to_string()]));
            // Related reads are scoped by the query, not by the path id.
            assert!(!query.filter.contains_key("id"));
        }
        other => panic!("unexpected call {:?}", other),
    }
    mock.verify();
}

#[tokio::test]
async fn test_read_related_missing_base_is_not_found() {
    let (handler, mock) = setup(Method::GET);
    mock.expect_by_id("3").return_ok(None);

    let request = ApiRequest::new(Method::GET, PathParams::related("3", "book"));
    let err = handler.read(&request).await.unwrap_err();
    assert_eq!(err.status(), StatusCode::NOT_FOUND);
    assert!(err.is_tagged());
    mock.verify();
}

#[tokio::test]
async fn test_read_relation_linkage_is_unimplemented() {
    let (handler, mock) = setup(Method::GET);

    let request = ApiRequest::new(Method::GET, PathParams::relation("3", "book"));
    let err = handler.read(&request).await.unwrap_err();
    assert!(matches!(err, HandlerError::Unimplemented(_)));
    // No adapter work is attempted.
    assert!(mock.calls().is_empty());
}

#[tokio::test]
async fn test_read_propagates_adapter_failure() {
    let (handler, mock) = setup(Method::GET);
    mock.expect_read().return_err(AdapterError::Closed);

    let request = ApiRequest::new(Method::GET, PathParams::collection());
    let err = handler.read(&request).await.unwrap_err();
    assert!(matches!(err, HandlerError::Adapter(AdapterError::Closed)));
}

// --- create ---

#[tokio::test]
async fn test_create_with_existing_client_id_conflicts() {
    let (handler, mock) = setup(Method::POST);
    mock.expect_by_id("7").return_ok(Some(Chapter::new("7", "Seven")));

    let request = ApiRequest::new(Method::POST, PathParams::collection())
        .with_body(json!({
            "data": { "type": "chapters", "id": "7", "attributes": { "title": "Dup" } }
        }));
    let err = handler.create(&request).await.unwrap_err();
    assert_eq!(err.status(), StatusCode::CONFLICT);
    // Creation was never attempted.
    assert_eq!(mock.calls().len(), 1);
    mock.verify();
}

#[tokio::test]
async fn test_create_with_novel_client_id() {
    let (handler, mock) = setup(Method::POST);
    mock.expect_by_id("8").return_ok(None);
    mock.expect_create().return_ok(Chapter::new("8", "Eight"));

    let data = json!({ "type": "chapters", "id": "8", "attributes": { "title": "Eight" } });
    let request = ApiRequest::new(Method::POST, PathParams::collection())
        .with_body(json!({ "data": data }));
    let created = handler.create(&request).await.unwrap();
    assert_eq!(created.id, "8");

    assert_eq!(
        mock.calls()[1],
        Call::Create {
            method: Method::POST,
            data
        }
    );
    mock.verify();
}

#[tokio::test]
async fn test_create_without_id_skips_lookup() {
    let (handler, mock) = setup(Method::POST);
    mock.expect_create().return_ok(Chapter::new("1", "Generated"));

    let request = ApiRequest::new(Method::POST, PathParams::collection())
        .with_body(json!({
            "data": { "type": "chapters", "attributes": { "title": "Generated" } }
        }));
    handler.create(&request).await.unwrap();
    assert!(matches!(mock.calls()[0], Call::Create { .. }));
    mock.verify();
}

#[tokio::test]
async fn test_create_requires_data() {
    let (handler, _mock) = setup(Method::POST);
    let request = ApiRequest::new(Method::POST, PathParams::collection());
    let err = handler.create(&request).await.unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
}

// --- update ---

#[tokio::test]
async fn test_update_missing_target_is_not_found() {
    let (handler, mock) = setup(Method::PATCH);
    mock.expect_by_id("404").return_ok(None);

    let request = ApiRequest::new(Method::PATCH, PathParams::single("404"))
        .with_body(json!({ "data": { "type": "chapters", "id": "404" } }));
    let err = handler.update(&request).await.unwrap_err();
    assert_eq!(err.status(), StatusCode::NOT_FOUND);
    mock.verify();
}

#[tokio::test]
async fn test_update_passes_data_through() {
    let (handler, mock) = setup(Method::PATCH);
    mock.expect_by_id("2").return_ok(Some(Chapter::new("2", "Old")));
    mock.expect_update().return_ok(Chapter::new("2", "New"));

    let data = json!({ "type": "chapters", "id": "2", "attributes": { "title": "New" } });
    let request = ApiRequest::new(Method::PATCH, PathParams::single("2"))
        .with_body(json!({ "data": data }));
    let updated = handler.update(&request).await.unwrap();
    assert_eq!(updated.title.as_deref(), Some("New"));
    assert_eq!(
        mock.calls()[1],
        Call::Update {
            method: Method::PATCH,
            data
        }
    );
}

#[tokio::test]
async fn test_update_relation_rewrites_payload() {
    let (handler, mock) = setup(Method::PATCH);
    mock.expect_by_id("2").return_ok(Some(Chapter::new("2", "Two")));
    mock.expect_update().return_ok(Chapter::new("2", "Two"));

    let linkage = json!({ "type": "books", "id": "9" });
    let request = ApiRequest::new(Method::PATCH, PathParams::relation("2", "book"))
        .with_body(json!({ "data": linkage }));
    handler.update(&request).await.unwrap();

    match &mock.calls()[1] {
        Call::Update { data, .. } => {
            assert_eq!(data, &json!({ "type": "chapters", "links": { "book": linkage } }));
        }
        other => panic!("unexpected call {:?}", other),
    }
}

#[tokio::test]
async fn test_update_relation_to_null_clears_link() {
    let (handler, mock) = setup(Method::PATCH);
    mock.expect_by_id("2").return_ok(Some(Chapter::new("2", "Two")));
    mock.expect_update().return_ok(Chapter::new("2", "Two"));

    let request = ApiRequest::new(Method::PATCH, PathParams::relation("2", "book"))
        .with_body(json!({ "data": null }));
    handler.update(&request).await.unwrap();

    match &mock.calls()[1] {
        Call::Update { data, .. } => {
            assert_eq!(data, &json!({ "type": "chapters", "links": { "book": null } }));
        }
        other => panic!("unexpected call {:?}", other),
    }
}

#[tokio::test]
async fn test_update_relation_without_data_is_bad_request() {
    let (handler, mock) = setup(Method::PATCH);
    mock.expect_by_id("2").return_ok(Some(Chapter::new("2", "Two")));

    let request = ApiRequest::new(Method::PATCH, PathParams::relation("2", "book"));
    let err = handler.handle(&request).await.unwrap_err();

    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    assert!(mock
        .calls()
        .iter()
        .all(|call| !matches!(call, Call::Update { .. })));
}

#[tokio::test]
async fn test_update_not_null_violation_becomes_conflict() {
    let (handler, mock) = setup(Method::PATCH);
    mock.expect_by_id("2").return_ok(Some(Chapter::new("2", "Two")));
    mock.expect_update().return_err(AdapterError::Store(
        "NOT NULL constraint failed: chapters.title".into(),
    ));

    let request = ApiRequest::new(Method::PATCH, PathParams::single("2"))
        .with_body(json!({
            "data": { "type": "chapters", "id": "2", "attributes": { "title": null } }
        }));
    let err = handler.update(&request).await.unwrap_err();
    assert_eq!(err.status(), StatusCode::CONFLICT);
    assert!(err.to_string().contains("NOT NULL"));
}

#[tokio::test]
async fn test_update_other_adapter_errors_propagate_unchanged() {
    let (handler, mock) = setup(Method::PATCH);
    mock.expect_by_id("2").return_ok(Some(Chapter::new("2", "Two")));
    mock.expect_update()
        .return_err(AdapterError::Store("disk full".into()));

    let request = ApiRequest::new(Method::PATCH, PathParams::single("2"))
        .with_body(json!({ "data": { "type": "chapters", "id": "2" } }));
    let err = handler.update(&request).await.unwrap_err();
    assert!(matches!(err, HandlerError::Adapter(AdapterError::Store(ref m)) if m == "disk full"));
    assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

// --- destroy ---

#[tokio::test]
async fn test_destroy_missing_target_succeeds_with_nothing() {
    let (handler, mock) = setup(Method::DELETE);
    mock.expect_by_id("11").return_ok(None);

    let request = ApiRequest::new(Method::DELETE, PathParams::single("11"));
    let result = handler.destroy(&request).await.unwrap();
    assert!(result.is_none());
    mock.verify();
}

#[tokio::test]
async fn test_destroy_existing_target_calls_adapter() {
    let (handler, mock) = setup(Method::DELETE);
    mock.expect_by_id("12").return_ok(Some(Chapter::new("12", "Twelve")));
    mock.expect_destroy().return_ok(());

    let request = ApiRequest::new(Method::DELETE, PathParams::single("12"));
    let removed = handler.destroy(&request).await.unwrap();
    assert_eq!(removed, Some(Chapter::new("12", "Twelve")));
    assert_eq!(
        mock.calls()[1],
        Call::Destroy {
            method: Method::DELETE
        }
    );
    mock.verify();
}

// --- validate / handle ---

#[tokio::test]
async fn test_validate_rejects_unacceptable_accept() {
    let (handler, _mock) = setup(Method::GET);
    let request = ApiRequest::new(Method::GET, PathParams::collection())
        .with_header(ACCEPT, "application/vnd.api+json; ext=bulk");
    let err = handler.validate(&request).unwrap_err();
    assert_eq!(err.status, StatusCode::NOT_ACCEPTABLE);
}

#[tokio::test]
async fn test_validate_runs_resource_validators() {
    let mock = MockAdapter::<Chapter>::new("chapters");
    let config = ResourceConfig::new("chapters")
        .with_attributes(["title"])
        .with_validator(validators::type_matches)
        .with_validator(validators::known_attributes);
    let handler = RequestHandler::new(config, mock);

    let wrong_type = json_body(
        ApiRequest::new(Method::POST, PathParams::collection()),
        json!({ "data": { "type": "books" } }),
    );
    assert_eq!(handler.validate(&wrong_type).unwrap_err().status, StatusCode::CONFLICT);

    let unknown = json_body(
        ApiRequest::new(Method::POST, PathParams::collection()),
        json!({ "data": { "type": "chapters", "attributes": { "pages": 3 } } }),
    );
    assert_eq!(handler.validate(&unknown).unwrap_err().status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_handle_runs_the_configured_operation() {
    let (creator, mock) = setup(Method::POST);
    mock.expect_create().return_ok(Chapter::new("1", "One"));

    let request = json_body(
        ApiRequest::new(Method::POST, PathParams::collection()),
        json!({ "data": { "type": "chapters", "attributes": { "title": "One" } } }),
    );
    let response = creator.handle(&request).await.unwrap();
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.data, Some(PrimaryData::Resource(Chapter::new("1", "One"))));

    let (destroyer, mock) = setup(Method::DELETE);
    mock.expect_by_id("1").return_ok(None);
    let delete = ApiRequest::new(Method::DELETE, PathParams::single("1"));
    let response = destroyer.handle(&delete).await.unwrap();
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    assert!(response.data.is_none());
    mock.verify();
}

#[tokio::test]
async fn test_handle_passes_request_method_to_adapter_writes() {
    let (creator, mock) = setup(Method::POST);
    mock.expect_create().return_ok(Chapter::new("1", "One"));
    let request = json_body(
        ApiRequest::new(Method::POST, PathParams::collection()),
        json!({ "data": { "type": "chapters", "attributes": { "title": "One" } } }),
    );
    creator.handle(&request).await.unwrap();
    assert!(matches!(
        &mock.calls()[0],
        Call::Create { method, .. } if *method == Method::POST
    ));

    let (destroyer, mock) = setup(Method::DELETE);
    mock.expect_by_id("1").return_ok(Some(Chapter::new("1", "One")));
    mock.expect_destroy().return_ok(());
    let delete = ApiRequest::new(Method::DELETE, PathParams::single("1"));
    destroyer.handle(&delete).await.unwrap();
    assert!(matches!(
        &mock.calls()[1],
        Call::Destroy { method, .. } if *method == Method::DELETE
    ));
}

#[tokio::test]
async fn test_handle_rejects_method_other_than_configured() {
    let (handler, mock) = setup(Method::GET);
    let delete = ApiRequest::new(Method::DELETE, PathParams::single("1"));

    let err = handler.handle(&delete).await.unwrap_err();
    assert_eq!(err.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert!(mock.calls().is_empty());
}

#[tokio::test]
async fn test_handle_stops_on_validation_failure() {
    let (handler, mock) = setup(Method::POST);
    let request = ApiRequest::new(Method::POST, PathParams::collection())
        .with_body(json!({ "data": { "type": "chapters" } }));

    let err = handler.handle(&request).await.unwrap_err();
    assert_eq!(err.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(mock.calls().is_empty());
}

#[tokio::test]
async fn test_handle_rejects_unsupported_method() {
    let (handler, _mock) = setup(Method::GET);
    let request = ApiRequest::new(Method::PUT, PathParams::single("1"));
    let err = handler.handle(&request).await.unwrap_err();
    assert_eq!(err.status(), StatusCode::METHOD_NOT_ALLOWED);
}
