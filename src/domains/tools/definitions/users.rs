//! User and contact tools.
//!
//! The user lifecycle tools (approve, suspend, restore, delete) are
//! registered so clients can discover them, but the remote API offers no
//! matching operation: whatever arguments they get, they report that the
//! feature is unavailable without calling out.

use std::sync::Arc;

use serde::Deserialize;

use super::NoParams;
use crate::domains::tools::outcome::ToolOutcome;
use crate::domains::tools::registry::ToolDefinition;
use crate::domains::tools::schema::{ParamSpec, ToolSchema};
use crate::tailscale::TailscaleApi;
use crate::tailscale::types::{ContactType, UpdateContactRequest};

const CONTACT_TYPES: &[&str] = &["account", "support", "security"];

#[derive(Debug, Deserialize)]
pub struct UserIdParams {
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateContactParams {
    pub contact_type: ContactType,
    pub email: String,
}

async fn list_users(api: Arc<dyn TailscaleApi>, _: NoParams) -> ToolOutcome {
    ToolOutcome::from_result("list users", "users", api.list_users().await)
}

async fn get_user(api: Arc<dyn TailscaleApi>, params: UserIdParams) -> ToolOutcome {
    ToolOutcome::from_result("get user", "user", api.get_user(&params.user_id).await)
}

async fn approve_user(_: Arc<dyn TailscaleApi>, _: NoParams) -> ToolOutcome {
    ToolOutcome::Unsupported("User approval functionality is not available in the current API")
}

async fn suspend_user(_: Arc<dyn TailscaleApi>, _: NoParams) -> ToolOutcome {
    ToolOutcome::Unsupported("User suspension functionality is not available in the current API")
}

async fn restore_user(_: Arc<dyn TailscaleApi>, _: NoParams) -> ToolOutcome {
    ToolOutcome::Unsupported(
        "User restoration functionality is not available in the current API",
    )
}

async fn delete_user(_: Arc<dyn TailscaleApi>, _: NoParams) -> ToolOutcome {
    ToolOutcome::Unsupported("User deletion functionality is not available in the current API")
}

async fn get_contacts(api: Arc<dyn TailscaleApi>, _: NoParams) -> ToolOutcome {
    ToolOutcome::from_result("get contacts", "contacts", api.contacts().await)
}

async fn update_contact(api: Arc<dyn TailscaleApi>, params: UpdateContactParams) -> ToolOutcome {
    let request = UpdateContactRequest {
        email: Some(params.email.clone()),
    };
    let result = api.update_contact(params.contact_type, &request).await;
    ToolOutcome::confirm("update contact", result, || {
        format!("Contact {} updated to {}", params.contact_type, params.email)
    })
}

fn user_id(description: &'static str) -> ParamSpec {
    ParamSpec::string("user_id", description).required()
}

/// Advertised on the lifecycle stubs but never enforced.
fn stub_user_id(description: &'static str) -> ParamSpec {
    ParamSpec::string("user_id", description)
}

/// User and contact tools, in registration order.
pub fn catalog() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            ToolSchema::new(
                "tailscale_users_list",
                "List the users of the tailnet with display name, login name, role, status and \
                 last-seen time. OAuth Scope: users:read.",
            ),
            list_users,
        ),
        ToolDefinition::new(
            ToolSchema::new(
                "tailscale_user_get",
                "Get one user of the tailnet: account details, role, device count and \
                 authentication status. OAuth Scope: users:read.",
            )
            .param(user_id("The user ID")),
            get_user,
        ),
        ToolDefinition::new(
            ToolSchema::new(
                "tailscale_user_approve",
                "Approve a user for tailnet access in tailnets that require user approval. \
                 Note: not available in the current API version. OAuth Scope: users:write.",
            )
            .param(stub_user_id("The user ID to approve")),
            approve_user,
        ),
        ToolDefinition::new(
            ToolSchema::new(
                "tailscale_user_suspend",
                "Suspend a user, revoking tailnet access while keeping them in the user list. \
                 Note: not available in the current API version. OAuth Scope: users:write.",
            )
            .param(stub_user_id("The user ID to suspend")),
            suspend_user,
        ),
        ToolDefinition::new(
            ToolSchema::new(
                "tailscale_user_restore",
                "Restore a suspended user to active status. Note: not available in the current \
                 API version. OAuth Scope: users:write.",
            )
            .param(stub_user_id("The user ID to restore")),
            restore_user,
        ),
        ToolDefinition::new(
            ToolSchema::new(
                "tailscale_user_delete",
                "Delete a user from the tailnet permanently. Note: not available in the current \
                 API version. OAuth Scope: users:write.",
            )
            .param(stub_user_id("The user ID to delete")),
            delete_user,
        ),
        ToolDefinition::new(
            ToolSchema::new(
                "tailscale_contacts_get",
                "Get the tailnet contact preferences used for account, support and security \
                 notifications. OAuth Scope: users:read.",
            ),
            get_contacts,
        ),
        ToolDefinition::new(
            ToolSchema::new(
                "tailscale_contact_update",
                "Update a tailnet contact email. 'account' receives billing and administrative \
                 mail, 'support' technical issues, 'security' security notifications. \
                 OAuth Scope: users:write.",
            )
            .param(
                ParamSpec::string("contact_type", "Type of contact (account, support, security)")
                    .one_of(CONTACT_TYPES)
                    .required(),
            )
            .param(ParamSpec::string("email", "Email address for the contact").required()),
            update_contact,
        ),
    ]
}
