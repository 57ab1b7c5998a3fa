//! Drives `TodoClient` against a live server over real HTTP.
//!
//! The server runs on its own thread and runtime, bound to port 0; requests
//! go out through ureq so the client's request building and response parsing
//! are exercised end-to-end.

mod common;

use todo_core::{ClientError, HttpMethod, HttpRequest, HttpResponse, NewTodo, TodoClient};
use todo_server::{app, Authenticator};

/// Execute an `HttpRequest` using ureq and return an `HttpResponse`.
///
/// Status codes are returned as data so the client does the interpreting.
fn execute(req: HttpRequest) -> HttpResponse {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let auth = req.header("authorization").map(str::to_owned);
    let result = match (req.method, req.body) {
        (HttpMethod::Get, _) => {
            let mut builder = agent.get(&req.url);
            if let Some(auth) = &auth {
                builder = builder.header("authorization", auth);
            }
            builder.call()
        }
        (HttpMethod::Delete, _) => {
            let mut builder = agent.delete(&req.url);
            if let Some(auth) = &auth {
                builder = builder.header("authorization", auth);
            }
            builder.call()
        }
        (method, body) => {
            let mut builder = match method {
                HttpMethod::Put => agent.put(&req.url),
                _ => agent.post(&req.url),
            };
            if let Some(auth) = &auth {
                builder = builder.header("authorization", auth);
            }
            builder
                .content_type("application/json")
                .send(body.unwrap_or_default().as_bytes())
        }
    };
    let mut response = result.expect("HTTP transport error");

    HttpResponse {
        status: response.status().as_u16(),
        body: response.body_mut().read_to_string().unwrap_or_default(),
    }
}

/// Starts the server on a random port and returns its base URL.
fn spawn_server(auth: Option<Authenticator>) -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            let router = app(common::store(), auth, None);
            todo_server::run(listener, router, std::future::pending()).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

#[test]
fn lifecycle() {
    let client = TodoClient::new(&spawn_server(None));

    let todos = client.parse_list_todos(execute(client.build_list_todos())).unwrap();
    assert!(todos.is_empty(), "expected empty list");

    let input = NewTodo {
        message: "buy milk".to_string(),
    };
    let req = client.build_add_todo(&input).unwrap();
    let id = client.parse_add_todo(execute(req)).unwrap();

    let todos = client.parse_list_todos(execute(client.build_list_todos())).unwrap();
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0].id, id);
    assert_eq!(todos[0].message, "buy milk");
    assert!(!todos[0].complete);

    let req = client.build_complete_todo(&id).unwrap();
    client.parse_complete_todo(execute(req)).unwrap();
    let todos = client.parse_list_todos(execute(client.build_list_todos())).unwrap();
    assert!(todos[0].complete);

    client
        .parse_delete_todo(execute(client.build_delete_todo(&id)))
        .unwrap();
    let todos = client.parse_list_todos(execute(client.build_list_todos())).unwrap();
    assert!(todos.is_empty(), "expected empty list after delete");

    let err = client
        .parse_delete_todo(execute(client.build_delete_todo(&id)))
        .unwrap_err();
    assert!(matches!(err, ClientError::NotFound));

    let err = client
        .parse_complete_todo(execute(client.build_complete_todo(&id).unwrap()))
        .unwrap_err();
    assert!(matches!(err, ClientError::NotFound));
}

#[test]
fn bearer_token_round_trip() {
    let base_url = spawn_server(Some(common::authenticator()));

    let anonymous = TodoClient::new(&base_url);
    let err = anonymous
        .parse_list_todos(execute(anonymous.build_list_todos()))
        .unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized));

    let client = TodoClient::new(&base_url).with_bearer_token(common::valid_token());
    let req = client
        .build_add_todo(&NewTodo {
            message: "authenticated".to_string(),
        })
        .unwrap();
    let id = client.parse_add_todo(execute(req)).unwrap();
    let todos = client.parse_list_todos(execute(client.build_list_todos())).unwrap();
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0].id, id);
}
