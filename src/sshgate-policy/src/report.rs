//! Denial output shown to the SSH client.

use crate::config::Policy;
use crate::error::DenyReason;

/// Render the client-facing text for a refused command.
///
/// Terse mode prints `Denied` and nothing else. Otherwise the reason, the
/// allowed-command list and the help text are each included only when the
/// policy asks for them, so the result may be empty.
pub fn render_denial(policy: &Policy, reason: &DenyReason) -> String {
    let verbosity = policy.verbosity();
    if verbosity.terse {
        return "Denied\n".to_string();
    }

    let mut out = String::new();
    if verbosity.show_denied {
        out.push_str(&format!("Denied : {reason}\n"));
    }
    if verbosity.show_allowed {
        out.push_str(&format!(
            "Allowed : {}\n",
            policy.allowed_command_names().join(",")
        ));
    }
    if let Some(help) = policy.help_text() {
        out.push_str(help);
        out.push('\n');
    }
    out
}
