/// Starts a mock login server with the given mocks registered.
///
/// Warning: when using `Mock::expect` ensure the returned server is not dropped before the test
/// completes, expectations are verified on drop.
pub async fn start_api_mock(mocks: Vec<wiremock::Mock>) -> wiremock::MockServer {
    let server = wiremock::MockServer::start().await;

    for mock in mocks {
        server.register(mock).await;
    }

    server
}
