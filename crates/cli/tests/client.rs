use std::io::Cursor;
use std::net::SocketAddr;

use bookstore_app::App;
use bookstore_cli::commands::{self, BookFields, Command, Outcome};
use bookstore_cli::console::SharedBuffer;
use bookstore_cli::{CatalogClient, ClientError, Console};
use bookstore_db::Database;
use bookstore_kernel::settings::Settings;
use bookstore_model::NewBook;
use pretty_assertions::assert_eq;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

struct Server {
    addr: SocketAddr,
    db: Database,
    stop: Option<oneshot::Sender<()>>,
}

impl Server {
    async fn start() -> Self {
        let db = Database::in_memory();
        let app = App::with_database(Settings::default(), db.clone())
            .await
            .unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (stop, stopped) = oneshot::channel::<()>();
        tokio::spawn(async move {
            app.serve_on(listener, async {
                stopped.await.ok();
            })
            .await
            .unwrap();
        });

        Self {
            addr,
            db,
            stop: Some(stop),
        }
    }

    fn client(&self) -> CatalogClient {
        CatalogClient::new(&format!("http://{}", self.addr)).unwrap()
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        if let Some(stop) = self.stop.take() {
            stop.send(()).ok();
        }
    }
}

fn dune() -> NewBook {
    NewBook {
        title: "Dune".into(),
        author: "Herbert".into(),
        publish_year: 1965,
    }
}

fn console(input: &str) -> (Console, SharedBuffer, SharedBuffer) {
    let out = SharedBuffer::default();
    let err = SharedBuffer::default();
    let console = Console::new(
        out.clone(),
        err.clone(),
        Cursor::new(input.to_string().into_bytes()),
        false,
    );
    (console, out, err)
}

#[tokio::test]
async fn crud_round_trip_over_http() {
    let server = Server::start().await;
    let client = server.client();
    let cancel = CancellationToken::new();

    let created = client.create(&dune(), &cancel).await.unwrap();
    assert_eq!(created.title, "Dune");

    let fetched = client.get(&created.id, &cancel).await.unwrap();
    assert_eq!(fetched, created);

    let edited = NewBook {
        title: "Dune Messiah".into(),
        publish_year: 1969,
        ..dune()
    };
    let updated = client.update(&created.id, &edited, &cancel).await.unwrap();
    assert_eq!(updated.title, "Dune Messiah");
    assert_eq!(updated.created_at, created.created_at);

    let listed = client.list(&cancel).await.unwrap();
    assert_eq!(listed.count, 1);

    let deleted = client.delete(&created.id, &cancel).await.unwrap();
    assert_eq!(deleted.id, created.id);

    let err = client.get(&created.id, &cancel).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn server_messages_reach_the_client() {
    let server = Server::start().await;
    let cancel = CancellationToken::new();

    let err = server
        .client()
        .get("doesnotexist", &cancel)
        .await
        .unwrap_err();
    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, 404);
            assert!(message.contains("doesnotexist"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn cancelled_requests_never_reach_the_server() {
    let server = Server::start().await;
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = server.client().create(&dune(), &cancel).await.unwrap_err();
    assert!(matches!(err, ClientError::Cancelled));
    assert!(server.db.store().find_all("books").await.unwrap().is_empty());
}

#[tokio::test]
async fn list_command_renders_the_table() {
    let server = Server::start().await;
    let client = server.client();
    let cancel = CancellationToken::new();
    client.create(&dune(), &cancel).await.unwrap();

    let (mut console, out, _) = console("");
    let outcome = commands::run(
        Command::List {
            view: Default::default(),
        },
        &client,
        &mut console,
        &cancel,
    )
    .await
    .unwrap();

    assert_eq!(outcome, Outcome::Done);
    assert!(out.contents().contains("Dune"));
    assert!(out.contents().contains("Publish Year"));
}

#[tokio::test]
async fn invalid_form_warns_without_inserting() {
    let server = Server::start().await;
    let cancel = CancellationToken::new();

    let (mut console, _, err) = console("");
    let outcome = commands::run(
        Command::Create {
            fields: BookFields {
                title: Some("Dune".into()),
                author: Some("Herbert".into()),
                publish_year: Some("-1".into()),
            },
        },
        &server.client(),
        &mut console,
        &cancel,
    )
    .await
    .unwrap();

    assert_eq!(outcome, Outcome::Failed);
    assert_eq!(
        err.contents(),
        "[warning] Publish Year must be a valid positive number\n"
    );
    assert!(server.db.store().find_all("books").await.unwrap().is_empty());
}

#[tokio::test]
async fn declined_delete_keeps_the_book() {
    let server = Server::start().await;
    let client = server.client();
    let cancel = CancellationToken::new();
    let created = client.create(&dune(), &cancel).await.unwrap();

    let (mut console, _, err) = console("n\n");
    let outcome = commands::run(
        Command::Delete {
            id: created.id.clone(),
            yes: false,
        },
        &client,
        &mut console,
        &cancel,
    )
    .await
    .unwrap();

    assert_eq!(outcome, Outcome::Done);
    assert!(err
        .contents()
        .starts_with("Are you sure you want to delete this book?"));
    assert!(err.contents().contains("[warning] Delete cancelled"));
    assert!(!err.contents().contains("[success]"));
    assert!(client.get(&created.id, &cancel).await.is_ok());
}

#[tokio::test]
async fn confirmed_delete_removes_the_book() {
    let server = Server::start().await;
    let client = server.client();
    let cancel = CancellationToken::new();
    let created = client.create(&dune(), &cancel).await.unwrap();

    let (mut console, _, err) = console("y\n");
    let outcome = commands::run(
        Command::Delete {
            id: created.id.clone(),
            yes: false,
        },
        &client,
        &mut console,
        &cancel,
    )
    .await
    .unwrap();

    assert_eq!(outcome, Outcome::Done);
    assert!(err.contents().contains("[success] Book Deleted Successfully."));
    assert!(client.get(&created.id, &cancel).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn edit_keeps_fields_that_were_not_given() {
    let server = Server::start().await;
    let client = server.client();
    let cancel = CancellationToken::new();
    let created = client.create(&dune(), &cancel).await.unwrap();

    let (mut console, _, err) = console("");
    let outcome = commands::run(
        Command::Edit {
            id: created.id.clone(),
            fields: BookFields {
                publish_year: Some("1966".into()),
                ..Default::default()
            },
        },
        &client,
        &mut console,
        &cancel,
    )
    .await
    .unwrap();

    assert_eq!(outcome, Outcome::Done);
    assert!(err.contents().contains("[success] Book Edited Successfully"));

    let fetched = client.get(&created.id, &cancel).await.unwrap();
    assert_eq!(fetched.title, "Dune");
    assert_eq!(fetched.author, "Herbert");
    assert_eq!(fetched.publish_year, 1966);
}

#[tokio::test]
async fn missing_book_is_reported_once_without_retry() {
    let server = Server::start().await;
    let cancel = CancellationToken::new();

    let (mut console, out, err) = console("");
    let outcome = commands::run(
        Command::Show {
            id: "doesnotexist".into(),
        },
        &server.client(),
        &mut console,
        &cancel,
    )
    .await
    .unwrap();

    assert_eq!(outcome, Outcome::Failed);
    assert_eq!(out.contents(), "");
    assert_eq!(err.contents().matches("[error]").count(), 1);
    assert!(!err.contents().contains("Retry?"));
}
