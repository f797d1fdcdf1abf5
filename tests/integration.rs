use rand::distributions::Alphanumeric;
use rand::Rng;
use serial_test::serial;
use std::fs;
use std::net::SocketAddr;
use tempfile::{tempdir, TempDir};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{sleep, timeout, Duration};

use filexfer::config::Config;
use filexfer::server::{run, serve};

struct TestServer {
    addr: SocketAddr,
    root: TempDir,
}

impl TestServer {
    async fn start() -> TestServer {
        let root = tempdir().unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let config = Config {
            bind: addr.ip(),
            port: addr.port(),
            root: root.path().to_path_buf(),
            max_line_length: 100,
        };
        tokio::spawn(serve(listener, config));

        TestServer { addr, root }
    }

    async fn connect(&self) -> TcpStream {
        let mut stream = TcpStream::connect(self.addr).await.unwrap();

        let mut greeting = [0; 6];
        stream.read_exact(&mut greeting).await.unwrap();
        assert_eq!(&greeting, b"HELLO\n");

        stream
    }

    /// Sends `request` after the greeting and returns everything received until the server
    /// closes the connection.
    async fn send(&self, request: &[u8]) -> Vec<u8> {
        let mut stream = self.connect().await;
        stream.write_all(request).await.unwrap();

        let mut response = vec![];
        stream.read_to_end(&mut response).await.unwrap();
        response
    }

    fn write(&self, name: &str, contents: &[u8]) {
        fs::write(self.root.path().join(name), contents).unwrap();
    }

    fn read(&self, name: &str) -> Vec<u8> {
        fs::read(self.root.path().join(name)).unwrap()
    }
}

fn random_body() -> String {
    let mut rng = rand::thread_rng();
    let lines = rng.gen_range(1..20);

    (0..lines)
        .map(|_| {
            let len = rng.gen_range(1..300);
            let line: String = (&mut rng)
                .sample_iter(&Alphanumeric)
                .take(len)
                .map(char::from)
                .collect();
            line + "\n"
        })
        .collect()
}

#[tokio::test]
async fn get_existing_file() {
    let server = TestServer::start().await;
    server.write("hello.txt", b"Hello, world!\n");

    let response = server.send(b"get hello.txt\n").await;

    assert_eq!(response, b"SERVER 200 OK\n\nHello, world!\n\n\n\n");
}

#[tokio::test]
async fn get_binary_file() {
    let server = TestServer::start().await;
    let contents: Vec<u8> = (0..=255u8).cycle().take(20_000).collect();
    server.write("data.bin", &contents);

    let response = server.send(b"get data.bin\n").await;

    let mut expected = b"SERVER 200 OK\n\n".to_vec();
    expected.extend_from_slice(&contents);
    expected.extend_from_slice(b"\n\n\n");
    assert_eq!(response, expected);
}

#[tokio::test]
async fn get_missing_file() {
    let server = TestServer::start().await;

    let response = server.send(b"get missing.txt\n").await;

    assert_eq!(response, b"SERVER 404 Not Found\n");
}

#[tokio::test]
async fn get_without_filename() {
    let server = TestServer::start().await;

    let response = server.send(b"get\n").await;

    assert_eq!(response, b"SERVER 500 Get Error\n");
}

#[tokio::test]
async fn commands_are_case_insensitive() {
    let server = TestServer::start().await;
    server.write("file.txt", b"same");

    let expected = b"SERVER 200 OK\n\nsame\n\n\n";
    for request in ["Get file.txt\n", "GET file.txt\n", "get file.txt\n"] {
        assert_eq!(server.send(request.as_bytes()).await, expected);
    }
}

#[tokio::test]
async fn put_stores_body() {
    let server = TestServer::start().await;

    let response = server.send(b"PUT upload.txt\nfirst\nsecond\n\n\n").await;

    assert_eq!(response, b"SERVER 200 OK\n\n");
    assert_eq!(server.read("upload.txt"), b"first\nsecond\n\n");
}

#[tokio::test]
async fn put_body_in_separate_writes() {
    let server = TestServer::start().await;

    let mut stream = server.connect().await;
    stream.write_all(b"put slow.txt\n").await.unwrap();
    let parts: [&[u8]; 4] = [b"one\n", b"two\n", b"\n", b"\n"];
    for part in parts {
        sleep(Duration::from_millis(10)).await;
        stream.write_all(part).await.unwrap();
    }

    let mut response = vec![];
    stream.read_to_end(&mut response).await.unwrap();

    assert_eq!(response, b"SERVER 200 OK\n\n");
    assert_eq!(server.read("slow.txt"), b"one\ntwo\n\n");
}

#[tokio::test]
async fn put_without_filename() {
    let server = TestServer::start().await;

    let response = server.send(b"put\n").await;

    assert_eq!(response, b"SERVER 501 Put Error\n");
}

#[tokio::test]
async fn put_into_missing_directory() {
    let server = TestServer::start().await;

    let response = server.send(b"put missing/dir/file.txt\n").await;

    assert_eq!(response, b"SERVER 501 Put Error\n");
}

#[tokio::test]
async fn put_then_get_round_trip() {
    let server = TestServer::start().await;
    let body = random_body();

    let mut request = b"put round.txt\n".to_vec();
    request.extend_from_slice(body.as_bytes());
    request.extend_from_slice(b"\n\n");

    assert_eq!(server.send(&request).await, b"SERVER 200 OK\n\n");

    // The first of the two terminating blank lines is stored with the body.
    let stored = format!("{}\n", body);
    assert_eq!(server.read("round.txt"), stored.as_bytes());

    let response = server.send(b"get round.txt\n").await;
    let expected = format!("SERVER 200 OK\n\n{}\n\n\n", stored);
    assert_eq!(response, expected.as_bytes());
}

#[tokio::test]
async fn put_line_as_long_as_the_read_buffer() {
    let server = TestServer::start().await;
    let line = "x".repeat(100) + "\n";

    let request = format!("put exact.txt\n{}\nsecond paragraph\n\n\n", line);
    assert_eq!(server.send(request.as_bytes()).await, b"SERVER 200 OK\n\n");

    let stored = format!("{}\nsecond paragraph\n\n", line);
    assert_eq!(server.read("exact.txt"), stored.as_bytes());
}

#[tokio::test]
async fn unknown_command() {
    let server = TestServer::start().await;

    let response = server.send(b"LIST\n").await;

    assert_eq!(response, b"SERVER 502 Command Error\n");
}

#[tokio::test]
async fn bye_closes_without_response() {
    let server = TestServer::start().await;

    let response = server.send(b"BYE\n").await;

    assert!(response.is_empty());
}

#[tokio::test]
async fn clients_are_served_one_at_a_time() {
    let server = TestServer::start().await;

    let mut first = server.connect().await;

    // The second client is queued but not greeted while the first one is connected.
    let mut second = TcpStream::connect(server.addr).await.unwrap();
    let mut greeting = [0; 6];
    let waiting = timeout(Duration::from_millis(200), second.read_exact(&mut greeting)).await;
    assert!(waiting.is_err());

    first.write_all(b"bye\n").await.unwrap();
    let mut response = vec![];
    first.read_to_end(&mut response).await.unwrap();
    assert!(response.is_empty());

    second.read_exact(&mut greeting).await.unwrap();
    assert_eq!(&greeting, b"HELLO\n");

    second.write_all(b"get nothing-here\n").await.unwrap();
    let mut response = vec![];
    second.read_to_end(&mut response).await.unwrap();
    assert_eq!(response, b"SERVER 404 Not Found\n");
}

#[tokio::test]
async fn reset_connection_stops_the_server() {
    let root = tempdir().unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    // The client aborts with a reset while it is still waiting in the accept queue.
    let client = TcpStream::connect(addr).await.unwrap();
    client.set_linger(Some(Duration::ZERO)).unwrap();
    drop(client);
    sleep(Duration::from_millis(50)).await;

    let config = Config {
        bind: addr.ip(),
        port: addr.port(),
        root: root.path().to_path_buf(),
        max_line_length: 100,
    };
    let result = timeout(Duration::from_secs(5), serve(listener, config)).await;

    assert!(matches!(result, Ok(Err(_))));
}

#[tokio::test]
#[serial]
async fn get_missing_file_on_port_9000() {
    tokio::spawn(run(Config::new(9000).unwrap()));
    sleep(Duration::from_millis(100)).await;

    let mut stream = TcpStream::connect("127.0.0.1:9000").await.unwrap();

    let mut greeting = [0; 6];
    stream.read_exact(&mut greeting).await.unwrap();
    assert_eq!(&greeting, b"HELLO\n");

    stream.write_all(b"get missing.txt\n").await.unwrap();

    let mut response = vec![];
    stream.read_to_end(&mut response).await.unwrap();
    assert_eq!(response, b"SERVER 404 Not Found\n");
}
