//! Live channel tests on paused time.

mod heartbeat_tests;
