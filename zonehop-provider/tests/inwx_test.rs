//! INWX live tests
//!
//! Run with:
//! ```bash
//! INWX_USERNAME=xxx INWX_PASSWORD=xxx TEST_ZONE=example.com \
//!     cargo test -p zonehop-provider --test inwx_test -- --ignored --nocapture --test-threads=1
//! ```

#![cfg(feature = "inwx")]

mod common;

use common::TestContext;

live_provider_tests!(TestContext::inwx, ["INWX_USERNAME", "INWX_PASSWORD"]);
