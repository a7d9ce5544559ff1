#[tokio::main]
async fn main() {
    event_booking::run().await;
}
