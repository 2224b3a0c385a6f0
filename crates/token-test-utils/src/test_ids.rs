//! Fixed test ids and keys for deterministic tests.

// Workspaces
pub const TEST_ADMIN_WORKSPACE: &str = "cluster-admin";
pub const TEST_WORKSPACE_A: &str = "ws-a";
pub const TEST_WORKSPACE_B: &str = "ws-b";
pub const TEST_UNKNOWN_WORKSPACE: &str = "ws-does-not-exist";

// Workspace signing keys
pub const TEST_SIGNING_KEY_ADMIN: &str = "sk_test_admin_do_not_use_in_production";
pub const TEST_SIGNING_KEY_A: &str = "sk_test_a_do_not_use_in_production";
pub const TEST_SIGNING_KEY_B: &str = "sk_test_b_do_not_use_in_production";

// Bearer keys
pub const TEST_ADMIN_KEY: &str = "test-admin-key";
pub const TEST_PRIMARY_KEY_A: &str = "test-primary-key-a";
pub const TEST_MEMBER_KEY_A: &str = "test-member-key-a";
pub const TEST_DISABLED_KEY_A: &str = "test-disabled-key-a";
pub const TEST_PRIMARY_KEY_B: &str = "test-primary-key-b";
pub const TEST_MEMBER_KEY_B: &str = "test-member-key-b";

// Token ids that never exist
pub const TEST_UNKNOWN_TOKEN_ID: &str = "00000000-0000-0000-0000-000000000000";
