use mock_server::{MockState, Settings};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let mut settings = Settings::default();
    if let Ok(application) = std::env::var("PUSHWOOSH_APPLICATION_CODE") {
        settings.application = application;
    }
    if let Ok(auth) = std::env::var("PUSHWOOSH_ACCESS_TOKEN") {
        settings.auth = auth;
    }

    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    println!("mock pushwoosh listening on http://{addr}/json");
    mock_server::run(listener, MockState::new(settings)).await
}
