// End-to-end tests for the capture-desk client core
//
// Each test gets its own in-process mock backend (axum on 127.0.0.1:0) and an
// in-memory session store through test-context lifecycle hooks. The mock
// counts every request so tests can assert that nothing hit the network.
//
// Tests that bind the default OAuth loopback port are marked #[serial].

mod test_bridge;
mod test_oauth;
mod test_session;
