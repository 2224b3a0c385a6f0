//! Custom test assertions for error bodies.
//!
//! ```rust,ignore
//! body.assert_error_code("TOKEN_NOT_FOUND")
//!     .assert_error_message("Invalid token ID");
//! ```

use serde_json::Value;

/// Assertions over the `{"error": {"code", "message"}}` response body.
pub trait ErrorAssertions {
    /// Assert the error code.
    fn assert_error_code(&self, code: &str) -> &Self;

    /// Assert the error message.
    fn assert_error_message(&self, message: &str) -> &Self;
}

impl ErrorAssertions for Value {
    fn assert_error_code(&self, code: &str) -> &Self {
        let actual = self["error"]["code"].as_str();
        assert_eq!(
            actual,
            Some(code),
            "Expected error code {}, body was {}",
            code,
            self
        );
        self
    }

    fn assert_error_message(&self, message: &str) -> &Self {
        let actual = self["error"]["message"].as_str();
        assert_eq!(
            actual,
            Some(message),
            "Expected error message {:?}, body was {}",
            message,
            self
        );
        self
    }
}
