mod caldav_mock;

// This file organizes the integration tests into a cohesive test suite.
// Each module tests a specific aspect of the application:
// - smoke_tests: Basic functionality tests to ensure nothing is broken
// - extraction_pipeline: Page snapshot to finished event, through the page actor
// - caldav_mock: Mocking the CalDAV server for testing the transport
