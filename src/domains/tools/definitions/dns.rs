//! DNS and policy file tools.

use std::sync::Arc;

use serde::Deserialize;

use super::NoParams;
use crate::domains::tools::outcome::ToolOutcome;
use crate::domains::tools::registry::ToolDefinition;
use crate::domains::tools::schema::{ParamSpec, ToolSchema};
use crate::tailscale::TailscaleApi;
use crate::tailscale::types::DnsPreferences;

#[derive(Debug, Deserialize)]
pub struct NameserversParams {
    pub nameservers: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct DnsPreferencesParams {
    pub magic_dns: bool,
}

#[derive(Debug, Deserialize)]
pub struct SearchPathsParams {
    pub search_paths: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct PolicyParams {
    pub policy: String,
}

async fn get_nameservers(api: Arc<dyn TailscaleApi>, _: NoParams) -> ToolOutcome {
    ToolOutcome::from_result("get nameservers", "nameservers", api.nameservers().await)
}

async fn set_nameservers(api: Arc<dyn TailscaleApi>, params: NameserversParams) -> ToolOutcome {
    let result = api.set_nameservers(&params.nameservers).await;
    ToolOutcome::confirm("set nameservers", result, || {
        format!("DNS nameservers set to: {:?}", params.nameservers)
    })
}

async fn get_preferences(api: Arc<dyn TailscaleApi>, _: NoParams) -> ToolOutcome {
    ToolOutcome::from_result(
        "get DNS preferences",
        "preferences",
        api.dns_preferences().await,
    )
}

async fn set_preferences(api: Arc<dyn TailscaleApi>, params: DnsPreferencesParams) -> ToolOutcome {
    let preferences = DnsPreferences {
        magic_dns: params.magic_dns,
    };
    let result = api.set_dns_preferences(preferences).await;
    ToolOutcome::confirm("set DNS preferences", result, || {
        format!("DNS preferences updated: MagicDNS={}", params.magic_dns)
    })
}

async fn get_search_paths(api: Arc<dyn TailscaleApi>, _: NoParams) -> ToolOutcome {
    ToolOutcome::from_result("get search paths", "search paths", api.search_paths().await)
}

async fn set_search_paths(api: Arc<dyn TailscaleApi>, params: SearchPathsParams) -> ToolOutcome {
    let result = api.set_search_paths(&params.search_paths).await;
    ToolOutcome::confirm("set search paths", result, || {
        format!("DNS search paths set to: {:?}", params.search_paths)
    })
}

/// Returned verbatim: re-encoding would drop the HuJSON comments.
async fn get_policy(api: Arc<dyn TailscaleApi>, _: NoParams) -> ToolOutcome {
    match api.raw_policy().await {
        Ok(policy) => ToolOutcome::Success(policy),
        Err(source) => ToolOutcome::RemoteFailure {
            operation: "get policy",
            source,
        },
    }
}

async fn set_policy(api: Arc<dyn TailscaleApi>, params: PolicyParams) -> ToolOutcome {
    let result = api.set_policy(&params.policy).await;
    ToolOutcome::confirm("set policy", result, || {
        "Policy file updated successfully".to_string()
    })
}

async fn validate_policy(api: Arc<dyn TailscaleApi>, params: PolicyParams) -> ToolOutcome {
    match api.validate_policy(&params.policy).await {
        Ok(()) => ToolOutcome::Success("Policy validation passed".to_string()),
        Err(source) => ToolOutcome::PolicyRejected(source),
    }
}

/// DNS and policy tools, in registration order.
pub fn catalog() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            ToolSchema::new(
                "tailscale_dns_nameservers_get",
                "Get the DNS nameservers configured for the tailnet, i.e. the resolvers devices \
                 use. See /kb/1054/dns. OAuth Scope: dns:read.",
            ),
            get_nameservers,
        ),
        ToolDefinition::new(
            ToolSchema::new(
                "tailscale_dns_nameservers_set",
                "Replace the DNS nameservers of the tailnet with the given IP addresses, e.g. \
                 ['8.8.8.8', '1.1.1.1']. Applies to every device. See /kb/1054/dns. \
                 OAuth Scope: dns:write.",
            )
            .param(
                ParamSpec::string_array("nameservers", "List of DNS nameserver addresses")
                    .required(),
            ),
            set_nameservers,
        ),
        ToolDefinition::new(
            ToolSchema::new(
                "tailscale_dns_preferences_get",
                "Get the DNS preferences of the tailnet, including whether MagicDNS resolves \
                 device names like 'device-name.tailnet.ts.net'. OAuth Scope: dns:read.",
            ),
            get_preferences,
        ),
        ToolDefinition::new(
            ToolSchema::new(
                "tailscale_dns_preferences_set",
                "Enable or disable MagicDNS for the tailnet. OAuth Scope: dns:write.",
            )
            .param(ParamSpec::boolean("magic_dns", "Enable MagicDNS").required()),
            set_preferences,
        ),
        ToolDefinition::new(
            ToolSchema::new(
                "tailscale_dns_searchpaths_get",
                "Get the DNS search paths of the tailnet: domain suffixes appended to short \
                 hostnames, so 'server' can resolve to 'server.company.com'. \
                 OAuth Scope: dns:read.",
            ),
            get_search_paths,
        ),
        ToolDefinition::new(
            ToolSchema::new(
                "tailscale_dns_searchpaths_set",
                "Replace the DNS search paths of the tailnet. OAuth Scope: dns:write.",
            )
            .param(
                ParamSpec::string_array("search_paths", "List of DNS search paths").required(),
            ),
            set_search_paths,
        ),
        ToolDefinition::new(
            ToolSchema::new(
                "tailscale_policy_get",
                "Get the tailnet policy file (ACLs) as HuJSON text, exactly as stored, comments \
                 included. See /kb/1018/acls. OAuth Scope: acl:read.",
            ),
            get_policy,
        ),
        ToolDefinition::new(
            ToolSchema::new(
                "tailscale_policy_set",
                "Replace the tailnet policy file with the given HuJSON. Changes apply \
                 immediately to every device; run tailscale_policy_validate first. \
                 See /kb/1018/acls. OAuth Scope: acl:write.",
            )
            .param(
                ParamSpec::string("policy", "Policy file content in HuJSON format").required(),
            ),
            set_policy,
        ),
        ToolDefinition::new(
            ToolSchema::new(
                "tailscale_policy_validate",
                "Check a HuJSON policy file for syntax and rule errors without applying it. \
                 See /kb/1018/acls. OAuth Scope: acl:read.",
            )
            .param(
                ParamSpec::string("policy", "Policy file content in HuJSON format to validate")
                    .required(),
            ),
            validate_policy,
        ),
    ]
}
