pub async fn liveness() -> &'static str {
    "home-sense server OK"
}
