use citesync::core::CoreApp;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = CoreApp::run().await {
        eprintln!("\nError: {}\n", e);
        std::process::exit(1);
    }
}
