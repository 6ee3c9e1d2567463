use adulting_core::{GrowthNotifier, HttpGrowthNotifier, HttpNotifierConfig, NotifyError};
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;

#[derive(Debug)]
struct Recorded {
    request_line: String,
    body: String,
}

/// Serves `responses.len()` requests, one status per request.
fn serve(
    responses: Vec<u16>,
    on_request: impl Fn(usize) + Send + 'static,
) -> (String, Receiver<Recorded>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let (sender, receiver) = mpsc::channel();

    thread::spawn(move || {
        for (index, status) in responses.into_iter().enumerate() {
            let (stream, _) = listener.accept().unwrap();
            let recorded = read_request(&stream);
            sender.send(recorded).unwrap();
            on_request(index);
            respond(stream, status);
        }
    });
    (base, receiver)
}

fn read_request(stream: &TcpStream) -> Recorded {
    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    reader.read_line(&mut request_line).unwrap();

    let mut content_length = 0usize;
    loop {
        let mut header = String::new();
        reader.read_line(&mut header).unwrap();
        let header = header.trim_end();
        if header.is_empty() {
            break;
        }
        if let Some((name, value)) = header.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap();
            }
        }
    }
    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body).unwrap();

    Recorded {
        request_line: request_line.trim_end().to_string(),
        body: String::from_utf8(body).unwrap(),
    }
}

fn respond(mut stream: TcpStream, status: u16) {
    let response = format!(
        "HTTP/1.1 {status} Status\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
    );
    stream.write_all(response.as_bytes()).unwrap();
    stream.flush().unwrap();
}

fn notifier(base: &str) -> HttpGrowthNotifier {
    HttpGrowthNotifier::new(HttpNotifierConfig {
        state_url: format!("{base}/state"),
        number_url: format!("{base}/api/number"),
        timeout: Duration::from_secs(2),
    })
}

#[test]
fn dispatch_posts_stage_then_sends_growth() {
    let (base, requests) = serve(vec![200, 200], |_| {});
    let notifier = notifier(&base);

    let report = notifier.dispatch_blocking(60);
    assert_eq!(report.state, Some(Ok(())));
    assert_eq!(report.number, Some(Ok(())));
    assert!(!report.superseded);

    let state = requests.recv_timeout(Duration::from_secs(2)).unwrap();
    assert_eq!(state.request_line, "POST /state HTTP/1.1");
    let body: serde_json::Value = serde_json::from_str(&state.body).unwrap();
    assert_eq!(body, serde_json::json!({ "value": 2 }));

    let number = requests.recv_timeout(Duration::from_secs(2)).unwrap();
    assert_eq!(number.request_line, "GET /api/number?value=60 HTTP/1.1");
}

#[test]
fn error_statuses_are_reported_not_raised() {
    let (base, _requests) = serve(vec![500, 404], |_| {});
    let report = notifier(&base).dispatch_blocking(10);

    assert_eq!(report.state, Some(Err(NotifyError::Status(500))));
    assert_eq!(report.number, Some(Err(NotifyError::Status(404))));
}

#[test]
fn unreachable_endpoint_is_a_transport_error() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let report = notifier(&format!("http://127.0.0.1:{port}")).dispatch_blocking(100);

    assert!(matches!(report.state, Some(Err(NotifyError::Transport(_)))));
    assert!(matches!(report.number, Some(Err(NotifyError::Transport(_)))));
}

#[test]
fn cancel_skips_remaining_requests() {
    let (cancel_sender, cancel_receiver) = mpsc::channel::<()>();
    let (base, requests) = serve(vec![200], move |_| {
        // Hold the response until the test has cancelled.
        let _ = cancel_receiver.recv_timeout(Duration::from_secs(2));
    });
    let notifier = std::sync::Arc::new(notifier(&base));

    let worker = {
        let notifier = std::sync::Arc::clone(&notifier);
        thread::spawn(move || notifier.dispatch_blocking(30))
    };
    requests.recv_timeout(Duration::from_secs(2)).unwrap();
    notifier.cancel_pending();
    cancel_sender.send(()).unwrap();

    let report = worker.join().unwrap();
    assert!(report.superseded);
    assert_eq!(report.state, Some(Ok(())));
    assert_eq!(report.number, None);
}

#[test]
fn growth_changed_returns_before_delivery() {
    let (base, requests) = serve(vec![200, 200], |_| {});
    let notifier = notifier(&base);

    notifier.growth_changed(80);

    let state = requests.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(state.body, "{\"value\":3}");
    let number = requests.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(number.request_line.contains("value=80"));
}

#[test]
fn dropped_notifier_still_delivers() {
    let (base, requests) = serve(vec![200, 200], |_| {});
    {
        let notifier = notifier(&base);
        notifier.growth_changed(40);
    }

    let state = requests.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(state.body, "{\"value\":1}");
    let number = requests.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(number.request_line.contains("value=40"));
}

#[test]
fn wait_idle_returns_after_delivery() {
    let (base, requests) = serve(vec![200, 200], |_| {});
    let notifier = notifier(&base);

    notifier.growth_changed(90);
    assert!(notifier.wait_idle(Duration::from_secs(5)));
    assert_eq!(requests.try_iter().count(), 2);
}
